use std::{
    collections::HashSet,
    fs::{self, File},
    io::{self, BufWriter, Write},
};

use anyhow::Context;

use crate::{
    config::OverviewConfig,
    normalise::{GENE_SYMBOL_COL, TRANSCRIPT_COL, UNKNOWN_GENE, VARIANT_ID_COL},
    table::{path_name, read_table, Table},
};

const KEY_COLS: [&str; 3] = [VARIANT_ID_COL, GENE_SYMBOL_COL, TRANSCRIPT_COL];
const PREVIEW_COLS: usize = 12;

/// Per key column summary
#[derive(Debug, PartialEq, Eq)]
pub struct KeyStats {
    pub column: String,
    pub non_empty: usize,
    pub distinct: usize,
    pub sample: Vec<String>,
}

pub fn key_stats(t: &Table, head: usize) -> Vec<KeyStats> {
    KEY_COLS
        .iter()
        .filter_map(|c| t.col_index(c).map(|ix| (c, ix)))
        .map(|(c, ix)| {
            let vals: Vec<&str> = t.column_values(ix).map(|s| s.trim()).collect();
            let distinct: HashSet<&str> = vals.iter().copied().filter(|s| !s.is_empty()).collect();
            KeyStats {
                column: c.to_string(),
                non_empty: vals.iter().filter(|s| !s.is_empty()).count(),
                distinct: distinct.len(),
                sample: t.column_values(ix).take(head).map(|s| s.to_owned()).collect(),
            }
        })
        .collect()
}

pub fn count_unknown(t: &Table) -> usize {
    t.col_index(GENE_SYMBOL_COL)
        .map(|ix| {
            t.column_values(ix)
                .filter(|s| s.trim().eq_ignore_ascii_case(UNKNOWN_GENE))
                .count()
        })
        .unwrap_or(0)
}

pub fn write_overview<W: Write>(t: &Table, name: &str, head: usize, w: &mut W) -> io::Result<()> {
    writeln!(w, "Overview: {}", name)?;
    writeln!(w, "Rows: {}  Cols: {}", t.n_rows(), t.n_cols())?;
    let preview = &t.columns()[..t.n_cols().min(PREVIEW_COLS)];
    writeln!(
        w,
        "First columns ({} of {}): {}",
        preview.len(),
        t.n_cols(),
        preview.join(", ")
    )?;

    let stats = key_stats(t, head);
    if !stats.is_empty() {
        writeln!(w, "\nKey columns")?;
        writeln!(w, "Column\tNon-empty\tDistinct\tSample (head)")?;
        for s in stats.iter() {
            writeln!(
                w,
                "{}\t{}\t{}\t{}",
                s.column,
                s.non_empty,
                s.distinct,
                s.sample.join(", ")
            )?;
        }
    }

    let n_unknown = count_unknown(t);
    if n_unknown > 0 {
        warn!("{} rows have {}={}", n_unknown, GENE_SYMBOL_COL, UNKNOWN_GENE);
        writeln!(
            w,
            "\nWARNING: {} rows have {}={}",
            n_unknown, GENE_SYMBOL_COL, UNKNOWN_GENE
        )?;
    }

    let show: Vec<usize> = KEY_COLS.iter().filter_map(|c| t.col_index(c)).collect();
    if !show.is_empty() {
        let names: Vec<&str> = show.iter().map(|&i| t.columns()[i].as_str()).collect();
        writeln!(w, "\nHead {} of {}", head, names.join(", "))?;
        writeln!(w, "{}", names.join("\t"))?;
        for r in t.rows().iter().take(head) {
            let vals: Vec<&str> = show.iter().map(|&i| r[i].as_str()).collect();
            writeln!(w, "{}", vals.join("\t"))?;
        }
    }
    Ok(())
}

pub fn run(cfg: &OverviewConfig) -> anyhow::Result<()> {
    let name = path_name(cfg.input());
    let t = read_table(cfg.input())?;
    let mut w: Box<dyn Write> = match cfg.output() {
        Some(p) => {
            if let Some(dir) = p.parent().filter(|d| !d.as_os_str().is_empty()) {
                fs::create_dir_all(dir)
                    .with_context(|| format!("Error creating directory {}", dir.display()))?
            }
            Box::new(BufWriter::new(
                File::create(p).with_context(|| format!("Error creating {}", p.display()))?,
            ))
        }
        None => Box::new(BufWriter::new(io::stdout())),
    };
    write_overview(&t, &name, cfg.head(), &mut w)
        .and_then(|_| w.flush())
        .with_context(|| format!("Error writing overview of {}", name))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn merged() -> Table {
        Table::from_rows(
            &["variant_id", "Gene_symbol", "Transcript", "pLI"],
            &[
                vec!["chr1:1:A>G", "GENE1", "ENST1", "0.9"],
                vec!["chr1:2:A>G", "GENE1", "", "0.9"],
                vec!["chr1:3:A>G", "UNKNOWN", "ENST3", ""],
            ],
        )
        .unwrap()
    }

    #[test]
    fn key_column_statistics() {
        let stats = key_stats(&merged(), 2);
        assert_eq!(stats.len(), 3);
        assert_eq!(
            stats[1],
            KeyStats {
                column: "Gene_symbol".into(),
                non_empty: 3,
                distinct: 2,
                sample: vec!["GENE1".into(), "GENE1".into()],
            }
        );
        assert_eq!(stats[2].non_empty, 2);
        assert_eq!(count_unknown(&merged()), 1);
    }

    #[test]
    fn report_text() {
        let mut buf = Vec::new();
        write_overview(&merged(), "merged.tsv", 1, &mut buf).unwrap();
        let s = String::from_utf8(buf).unwrap();
        assert!(s.starts_with("Overview: merged.tsv\nRows: 3  Cols: 4\n"));
        assert!(s.contains("WARNING: 1 rows have Gene_symbol=UNKNOWN"));
        assert!(s.ends_with("variant_id\tGene_symbol\tTranscript\nchr1:1:A>G\tGENE1\tENST1\n"));
    }

    #[test]
    fn report_into_new_directory() {
        let dir = tempfile::tempdir().unwrap();
        let input = dir.path().join("merged.tsv");
        fs::write(&input, "variant_id\tGene_symbol\nv1\tGENE1\n").unwrap();
        let report = dir.path().join("reports").join("overview.txt");
        let m = crate::cli::overview_cli()
            .try_get_matches_from([
                "vep-overview",
                "-i",
                input.to_str().unwrap(),
                "-o",
                report.to_str().unwrap(),
            ])
            .unwrap();
        run(&crate::config::overview_config(&m)).unwrap();
        let s = fs::read_to_string(&report).unwrap();
        assert!(s.contains("Rows: 1  Cols: 2"));
    }

    #[test]
    fn table_without_keys() {
        let t = Table::from_rows(&["a"], &[vec!["1"]]).unwrap();
        let mut buf = Vec::new();
        write_overview(&t, "t", 5, &mut buf).unwrap();
        let s = String::from_utf8(buf).unwrap();
        assert!(!s.contains("Key columns"));
        assert!(!s.contains("Head"));
    }
}
