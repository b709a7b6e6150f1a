use std::collections::HashMap;

use regex::Regex;

use crate::{
    config::NormaliseConfig,
    error::VepError,
    table::{is_missing, path_name, read_table, write_table, Table},
};

pub const VARIANT_ID_COL: &str = "variant_id";
pub const GENE_SYMBOL_COL: &str = "Gene_symbol";
pub const TRANSCRIPT_COL: &str = "Transcript";
pub const UNKNOWN_GENE: &str = "UNKNOWN";
pub const VEP_CACHE_VERSION_COL: &str = "vep_cache_version";
pub const PLUGINS_VERSION_COL: &str = "plugins_version";
pub const DEFAULT_HGVS_COL: &str = "clinvar_hgvs";

/// Synonym -> canonical column names.  For each canonical name the first synonym (in this order)
/// present in a table is renamed, and only if the canonical column is not already there.
pub const COLUMN_SYNONYMS: [(&str, &str); 11] = [
    ("#Uploaded_variation", VARIANT_ID_COL),
    ("Uploaded_variation", VARIANT_ID_COL),
    ("SYMBOL", GENE_SYMBOL_COL),
    ("Gene_Symbol", GENE_SYMBOL_COL),
    ("gene_symbol", GENE_SYMBOL_COL),
    ("GENE_SYMBOL", GENE_SYMBOL_COL),
    ("gene", GENE_SYMBOL_COL),
    ("Feature", TRANSCRIPT_COL),
    ("transcript", TRANSCRIPT_COL),
    ("Transcript_ID", TRANSCRIPT_COL),
    ("transcript_id", TRANSCRIPT_COL),
];

/// Plugin score fields coerced to numbers when present
pub const NUMERIC_FIELDS: [&str; 16] = [
    "CADD_PHRED",
    "CADD_RAW",
    "REVEL",
    "REVEL_score",
    "am_pathogenicity",
    "AlphaMissense_score",
    "PrimateAI_score",
    "SpliceAI_pred_DS_AG",
    "SpliceAI_pred_DS_AL",
    "SpliceAI_pred_DS_DG",
    "SpliceAI_pred_DS_DL",
    "DANN_score",
    "GERP++_RS",
    "gnomADe_AF",
    "gnomADg_AF",
    "MAX_AF",
];

// Ensembl or RefSeq transcript accession, optionally versioned
const TRANSCRIPT_PATTERN: &str = r"\b((?:ENST\d+|[NX][MR]_\d+)(?:\.\d+)?)";

/// Rename synonym columns to their canonical names.  Returns the (old, new) pairs applied.
pub fn apply_renames(table: &mut Table) -> Vec<(String, String)> {
    let mut renamed = Vec::new();
    for (syn, canonical) in COLUMN_SYNONYMS.iter() {
        if table.has_column(canonical) {
            continue;
        }
        if let Some(ix) = table.col_index(syn) {
            table.rename_column(ix, canonical);
            renamed.push((syn.to_string(), canonical.to_string()))
        }
    }
    renamed
}

/// Find the column holding `canonical`: exact name, then a case-insensitive match of the name,
/// then its synonyms (exact, then case-insensitive)
pub fn resolve_column(table: &Table, canonical: &str) -> Option<usize> {
    let synonyms: Vec<&str> = COLUMN_SYNONYMS
        .iter()
        .filter(|(_, c)| *c == canonical)
        .map(|(s, _)| *s)
        .collect();
    let ci = |name: &str| {
        table
            .columns()
            .iter()
            .position(|c| c.eq_ignore_ascii_case(name))
    };
    table
        .col_index(canonical)
        .or_else(|| ci(canonical))
        .or_else(|| synonyms.iter().find_map(|&s| table.col_index(s)))
        .or_else(|| synonyms.iter().find_map(|&s| ci(s)))
}

/// Canonical numeric form of a value, or an empty string (null) if it does not parse
pub fn coerce_numeric(s: &str) -> String {
    match s.trim().parse::<f64>() {
        // Whole numbers print without a fraction, everything else in shortest round-trip form
        Ok(x) if x.is_finite() && x.fract() == 0.0 && x.abs() < 1e15 => format!("{}", x),
        Ok(x) if x.is_finite() => format!("{:?}", x),
        _ => String::new(),
    }
}

/// Transcript -> gene symbol lookup
#[derive(Debug, Default)]
pub struct TranscriptGeneMap {
    map: HashMap<String, String>,
}

impl TranscriptGeneMap {
    pub fn from_table(table: &Table, path: &str) -> anyhow::Result<Self> {
        let t_ix = resolve_column(table, TRANSCRIPT_COL)
            .ok_or_else(|| VepError::missing_column(TRANSCRIPT_COL, path))?;
        let g_ix = resolve_column(table, GENE_SYMBOL_COL)
            .ok_or_else(|| VepError::missing_column(GENE_SYMBOL_COL, path))?;
        let mut map = HashMap::new();
        for r in table.rows() {
            let (tx, gene) = (r[t_ix].trim(), r[g_ix].trim());
            if !is_missing(tx) && !is_missing(gene) {
                map.entry(tx.to_owned()).or_insert_with(|| gene.to_owned());
            }
        }
        debug!("Loaded {} transcript -> gene entries from {}", map.len(), path);
        Ok(Self { map })
    }

    pub fn len(&self) -> usize {
        self.map.len()
    }

    pub fn is_empty(&self) -> bool {
        self.map.is_empty()
    }

    /// Exact transcript first, then without its version suffix
    pub fn lookup(&self, tx: &str) -> Option<&str> {
        let tx = tx.trim();
        self.map
            .get(tx)
            .or_else(|| tx.split_once('.').and_then(|(base, _)| self.map.get(base)))
            .map(|s| s.as_str())
    }
}

pub struct Normaliser {
    gene_symbol_col: Option<String>,
    hgvs_col: String,
    tx_map: Option<TranscriptGeneMap>,
    vep_cache_version: Option<String>,
    plugins_version: Option<String>,
    tx_re: Regex,
}

impl Default for Normaliser {
    fn default() -> Self {
        Self {
            gene_symbol_col: None,
            hgvs_col: DEFAULT_HGVS_COL.to_owned(),
            tx_map: None,
            vep_cache_version: None,
            plugins_version: None,
            tx_re: Regex::new(TRANSCRIPT_PATTERN).expect("Invalid transcript pattern"),
        }
    }
}

impl Normaliser {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn gene_symbol_col(mut self, col: Option<String>) -> Self {
        self.gene_symbol_col = col;
        self
    }

    pub fn hgvs_col(mut self, col: &str) -> Self {
        self.hgvs_col = col.to_owned();
        self
    }

    pub fn tx_map(mut self, m: Option<TranscriptGeneMap>) -> Self {
        self.tx_map = m;
        self
    }

    pub fn vep_cache_version(mut self, v: Option<String>) -> Self {
        self.vep_cache_version = v;
        self
    }

    pub fn plugins_version(mut self, v: Option<String>) -> Self {
        self.plugins_version = v;
        self
    }

    /// First transcript accession found in free text
    pub fn extract_transcript<'a>(&self, s: &'a str) -> Option<&'a str> {
        self.tx_re
            .captures(s)
            .and_then(|c| c.get(1))
            .map(|m| m.as_str())
    }

    pub fn normalise(&self, table: &mut Table, path: &str) -> anyhow::Result<()> {
        for (old, new) in apply_renames(table) {
            debug!("Renamed column {} -> {}", old, new)
        }

        let g_ix = table.ensure_column(GENE_SYMBOL_COL);
        let t_ix = table.ensure_column(TRANSCRIPT_COL);

        // Override column wins where it has a value
        if let Some(col) = self.gene_symbol_col.as_deref() {
            let o_ix = table.require_column(col, path)?;
            let mut n = 0;
            for r in table.rows_mut() {
                if !is_missing(&r[o_ix]) {
                    r[g_ix] = r[o_ix].clone();
                    n += 1;
                }
            }
            debug!("Gene symbol taken from {} for {} rows", col, n)
        }

        // Only fall back to the HGVS text if no transcript is present anywhere
        if table.rows().iter().all(|r| is_missing(&r[t_ix])) {
            if let Some(h_ix) = table.col_index(&self.hgvs_col) {
                let mut n = 0;
                for r in table.rows_mut() {
                    if let Some(tx) = self.extract_transcript(&r[h_ix]) {
                        r[t_ix] = tx.to_owned();
                        n += 1;
                    }
                }
                info!("Extracted {} transcripts from {}", n, self.hgvs_col)
            }
        }

        if let Some(m) = self.tx_map.as_ref() {
            let mut n = 0;
            for r in table.rows_mut() {
                if is_missing(&r[g_ix]) {
                    if let Some(gene) = m.lookup(&r[t_ix]) {
                        r[g_ix] = gene.to_owned();
                        n += 1;
                    }
                }
            }
            debug!("Gene symbol found from transcript lookup for {} rows", n)
        }

        let mut n_unknown = 0;
        for r in table.rows_mut() {
            r[g_ix] = if is_missing(&r[g_ix]) {
                n_unknown += 1;
                UNKNOWN_GENE.to_owned()
            } else {
                r[g_ix].trim().to_uppercase()
            };
            r[t_ix] = r[t_ix].trim().to_owned();
        }
        if n_unknown > 0 {
            warn!("{} rows have no gene symbol", n_unknown)
        }

        for field in NUMERIC_FIELDS.iter() {
            if let Some(ix) = table.col_index(field) {
                trace!("Coercing {} to numeric", field);
                for r in table.rows_mut() {
                    r[ix] = coerce_numeric(&r[ix])
                }
            }
        }

        if let Some(v) = self.vep_cache_version.as_deref() {
            table.set_constant_column(VEP_CACHE_VERSION_COL, v)
        }
        if let Some(v) = self.plugins_version.as_deref() {
            table.set_constant_column(PLUGINS_VERSION_COL, v)
        }
        Ok(())
    }
}

pub fn run(cfg: &NormaliseConfig) -> anyhow::Result<()> {
    let tx_map = match cfg.transcript_gene_map() {
        Some(p) => {
            let t = read_table(Some(p))?;
            Some(TranscriptGeneMap::from_table(&t, &p.display().to_string())?)
        }
        None => None,
    };
    let normaliser = Normaliser::new()
        .gene_symbol_col(cfg.gene_symbol_col().map(|s| s.to_owned()))
        .hgvs_col(cfg.hgvs_col())
        .tx_map(tx_map)
        .vep_cache_version(cfg.vep_cache_version().map(|s| s.to_owned()))
        .plugins_version(cfg.plugins_version().map(|s| s.to_owned()));

    let mut table = read_table(cfg.input())?;
    normaliser.normalise(&mut table, &path_name(cfg.input()))?;
    write_table(&table, cfg.output())?;
    info!("Wrote {}", path_name(cfg.output()));
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn col<'a>(t: &'a Table, name: &str) -> Vec<&'a str> {
        let ix = t.col_index(name).unwrap();
        t.column_values(ix).collect()
    }

    #[test]
    fn symbol_and_feature_become_canonical() {
        let mut t = Table::from_rows(&["SYMBOL", "Feature"], &[vec!["GeneX", "ENST001"]]).unwrap();
        Normaliser::new().normalise(&mut t, "t").unwrap();
        assert_eq!(t.columns(), &["Gene_symbol", "Transcript"]);
        assert_eq!(col(&t, "Gene_symbol"), vec!["GENEX"]);
        assert_eq!(col(&t, "Transcript"), vec!["ENST001"]);
    }

    #[test]
    fn gene_symbols_are_trimmed_and_upper_cased() {
        let mut t = Table::from_rows(
            &["Gene_symbol", "Transcript"],
            &[vec!["  genex ", " ENST1 "], vec!["", "ENST2"], vec!["-", ""]],
        )
        .unwrap();
        Normaliser::new().normalise(&mut t, "t").unwrap();
        assert_eq!(col(&t, "Gene_symbol"), vec!["GENEX", "UNKNOWN", "UNKNOWN"]);
        assert_eq!(col(&t, "Transcript"), vec!["ENST1", "ENST2", ""]);
    }

    #[test]
    fn canonical_input_is_unchanged_apart_from_metadata() {
        let t0 = Table::from_rows(
            &["variant_id", "Gene_symbol", "Transcript", "CADD_PHRED"],
            &[
                vec!["chr1:1000:A>G", "GENE1", "ENST000001", "23.5"],
                vec!["chr2:2000:T>A", "UNKNOWN", "", ""],
            ],
        )
        .unwrap();
        let mut t = t0.clone();
        Normaliser::new().normalise(&mut t, "t").unwrap();
        assert_eq!(t, t0);

        Normaliser::new()
            .vep_cache_version(Some("109".into()))
            .plugins_version(Some("v1.0".into()))
            .normalise(&mut t, "t")
            .unwrap();
        assert_eq!(&t.columns()[..4], t0.columns());
        assert_eq!(&t.columns()[4..], &["vep_cache_version", "plugins_version"]);
        assert_eq!(t.get(1, "plugins_version"), Some("v1.0"));
    }

    #[test]
    fn rename_order_does_not_depend_on_column_order() {
        let mut a = Table::from_rows(&["gene", "SYMBOL"], &[vec!["a", "b"]]).unwrap();
        let mut b = Table::from_rows(&["SYMBOL", "gene"], &[vec!["b", "a"]]).unwrap();
        apply_renames(&mut a);
        apply_renames(&mut b);
        assert_eq!(a.get(0, "Gene_symbol"), Some("b"));
        assert_eq!(b.get(0, "Gene_symbol"), Some("b"));
        assert!(a.has_column("gene") && b.has_column("gene"));
    }

    #[test]
    fn existing_canonical_column_blocks_rename() {
        let mut t = Table::from_rows(&["Gene_symbol", "SYMBOL"], &[vec!["A", "B"]]).unwrap();
        assert!(apply_renames(&mut t).is_empty());
        assert_eq!(t.columns(), &["Gene_symbol", "SYMBOL"]);
    }

    #[test]
    fn uploaded_variation_becomes_variant_id() {
        let mut t = Table::from_rows(&["#Uploaded_variation"], &[vec!["rs1"]]).unwrap();
        Normaliser::new().normalise(&mut t, "t").unwrap();
        assert_eq!(t.columns(), &["variant_id", "Gene_symbol", "Transcript"]);
    }

    #[test]
    fn override_column_wins_when_set() {
        let mut t = Table::from_rows(
            &["SYMBOL", "HGNC"],
            &[vec!["old", "brca1"], vec!["tp53", ""]],
        )
        .unwrap();
        Normaliser::new()
            .gene_symbol_col(Some("HGNC".into()))
            .normalise(&mut t, "t")
            .unwrap();
        assert_eq!(col(&t, "Gene_symbol"), vec!["BRCA1", "TP53"]);

        let mut t = Table::from_rows(&["SYMBOL"], &[vec!["a"]]).unwrap();
        let e = Normaliser::new()
            .gene_symbol_col(Some("HGNC".into()))
            .normalise(&mut t, "in.tsv")
            .unwrap_err();
        assert_eq!(e.to_string(), "Missing column 'HGNC' in in.tsv");
    }

    #[test]
    fn transcript_from_hgvs_only_when_none_present() {
        let mut t = Table::from_rows(
            &["SYMBOL", "clinvar_hgvs"],
            &[
                vec!["A", "NM_007294.4(BRCA1):c.68_69del"],
                vec!["B", "ENST00000269305.9:c.215C>G"],
                vec!["C", "no accession here"],
            ],
        )
        .unwrap();
        Normaliser::new().normalise(&mut t, "t").unwrap();
        assert_eq!(
            col(&t, "Transcript"),
            vec!["NM_007294.4", "ENST00000269305.9", ""]
        );

        let mut t = Table::from_rows(
            &["Feature", "clinvar_hgvs"],
            &[vec!["ENST1", ""], vec!["", "NM_000546.6:c.1A>G"]],
        )
        .unwrap();
        Normaliser::new().normalise(&mut t, "t").unwrap();
        assert_eq!(col(&t, "Transcript"), vec!["ENST1", ""]);
    }

    #[test]
    fn gene_from_transcript_lookup() {
        let map_table = Table::from_rows(
            &["transcript", "gene"],
            &[vec!["ENST0001", "brca2"], vec!["NM_1.2", "TP53"]],
        )
        .unwrap();
        let m = TranscriptGeneMap::from_table(&map_table, "map.tsv").unwrap();
        assert_eq!(m.len(), 2);
        assert_eq!(m.lookup("ENST0001.7"), Some("brca2"));
        assert_eq!(m.lookup("NM_1.2"), Some("TP53"));
        assert_eq!(m.lookup("NM_1"), None);

        let mut t = Table::from_rows(
            &["SYMBOL", "Feature"],
            &[vec!["-", "ENST0001.7"], vec!["KEEP", "ENST0001"], vec!["", "ENST9"]],
        )
        .unwrap();
        Normaliser::new()
            .tx_map(Some(m))
            .normalise(&mut t, "t")
            .unwrap();
        assert_eq!(col(&t, "Gene_symbol"), vec!["BRCA2", "KEEP", "UNKNOWN"]);
    }

    #[test]
    fn lookup_table_needs_both_columns() {
        let t = Table::from_rows(&["transcript", "score"], &[vec!["ENST1", "1"]]).unwrap();
        let e = TranscriptGeneMap::from_table(&t, "map.tsv").unwrap_err();
        assert_eq!(e.to_string(), "Missing column 'Gene_symbol' in map.tsv");
    }

    #[test]
    fn numeric_fields_are_coerced() {
        assert_eq!(coerce_numeric(" 0.45 "), "0.45");
        assert_eq!(coerce_numeric("1.0"), "1");
        assert_eq!(coerce_numeric("-"), "");
        assert_eq!(coerce_numeric("likely_benign"), "");
        assert_eq!(coerce_numeric("NaN"), "");
        assert_eq!(coerce_numeric("1e-300"), "1e-300");
        assert_eq!(coerce_numeric("0.000012"), "1.2e-5");
        assert_eq!(coerce_numeric("2.5E+20"), "2.5e20");

        let mut t = Table::from_rows(
            &["REVEL", "Extra"],
            &[vec!["0.5", "x"], vec!["0.1&0.2", "0.1&0.2"]],
        )
        .unwrap();
        Normaliser::new().normalise(&mut t, "t").unwrap();
        assert_eq!(col(&t, "REVEL"), vec!["0.5", ""]);
        assert_eq!(col(&t, "Extra"), vec!["x", "0.1&0.2"]);
    }

    #[test]
    fn resolve_column_is_case_insensitive() {
        let t = Table::from_rows(&["TRANSCRIPT", "Gene"], &[vec!["a", "b"]]).unwrap();
        assert_eq!(resolve_column(&t, TRANSCRIPT_COL), Some(0));
        assert_eq!(resolve_column(&t, GENE_SYMBOL_COL), Some(1));
        assert_eq!(resolve_column(&t, VARIANT_ID_COL), None);
    }
}
