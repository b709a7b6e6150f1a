use std::collections::HashSet;

use crate::{
    config::FilterConfig,
    error::VepError,
    table::{is_missing, path_name, read_table, write_table, Table},
};

pub const CONSEQUENCE_COL: &str = "Consequence";
pub const CANONICAL_COL: &str = "CANONICAL";

// Tried in order; the first present column is used for the MANE check
pub const MANE_COLS: [&str; 3] = ["MANE_SELECT", "MANE", "MANE_select"];

const TERM_SEPARATORS: [char; 3] = ['&', ',', ';'];

/// Row selection on the consequence terms of a VEP table
#[derive(Debug, Clone)]
pub struct RowFilter {
    keep: HashSet<String>,
    consequence_col: String,
    require_canonical: bool,
    require_mane: bool,
}

impl RowFilter {
    pub fn new<I, S>(keep: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            keep: keep.into_iter().map(|s| s.into()).collect(),
            consequence_col: CONSEQUENCE_COL.to_owned(),
            require_canonical: false,
            require_mane: false,
        }
    }

    pub fn consequence_col(mut self, col: &str) -> Self {
        self.consequence_col = col.to_owned();
        self
    }

    pub fn require_canonical(mut self, x: bool) -> Self {
        self.require_canonical = x;
        self
    }

    pub fn require_mane(mut self, x: bool) -> Self {
        self.require_mane = x;
        self
    }

    pub fn keep(&self) -> &HashSet<String> {
        &self.keep
    }

    /// True if any term of a consequence value is in the keep set
    pub fn has_kept_term(&self, s: &str) -> bool {
        s.split(&TERM_SEPARATORS[..])
            .map(|t| t.trim())
            .any(|t| !t.is_empty() && self.keep.contains(t))
    }

    /// Filter `table` in place, returning the number of rows kept.  All required columns are
    /// checked before any row is looked at; `path` names the input in errors.
    pub fn apply(&self, table: &mut Table, path: &str) -> Result<usize, VepError> {
        let cons_ix = table.require_column(&self.consequence_col, path)?;
        let canon_ix = if self.require_canonical {
            Some(table.require_column(CANONICAL_COL, path)?)
        } else {
            None
        };
        let mane_ix = if self.require_mane {
            let ix = MANE_COLS
                .iter()
                .find_map(|c| table.col_index(c))
                .ok_or_else(|| VepError::missing_column(MANE_COLS.join("|"), path))?;
            Some(ix)
        } else {
            None
        };

        let n_in = table.n_rows();
        table.retain_rows(|r| {
            self.has_kept_term(&r[cons_ix])
                && canon_ix.map_or(true, |ix| r[ix].trim().eq_ignore_ascii_case("YES"))
                && mane_ix.map_or(true, |ix| !is_missing(&r[ix]))
        });
        let n_out = table.n_rows();
        info!("Kept {} of {} rows", n_out, n_in);
        Ok(n_out)
    }
}

pub fn run(cfg: &FilterConfig) -> anyhow::Result<()> {
    let name = path_name(cfg.input());
    let mut table = read_table(cfg.input())?;
    debug!("Filtering for consequences: {:?}", cfg.row_filter().keep());
    cfg.row_filter().apply(&mut table, &name)?;
    write_table(&table, cfg.output())?;
    info!("Wrote {}", path_name(cfg.output()));
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn vep_table() -> Table {
        Table::from_rows(
            &["Consequence", "CANONICAL", "MANE_SELECT"],
            &[
                vec!["missense_variant&splice_region_variant", "YES", "NM_000546.6"],
                vec!["synonymous_variant", "YES", "NM_1"],
                vec!["stop_gained", "", "-"],
                vec!["intron_variant,missense_variant", "yes", ""],
                vec!["Missense_variant", "YES", "NM_2"],
                vec!["splice_region_variant; stop_gained", "TRUE", "NM_3"],
            ],
        )
        .unwrap()
    }

    fn consequences(t: &Table) -> Vec<&str> {
        t.column_values(0).collect()
    }

    #[test]
    fn keeps_rows_with_any_kept_term() {
        let mut t = vep_table();
        let n = RowFilter::new(["missense_variant", "stop_gained"])
            .apply(&mut t, "t")
            .unwrap();
        assert_eq!(n, 4);
        assert_eq!(
            consequences(&t),
            vec![
                "missense_variant&splice_region_variant",
                "stop_gained",
                "intron_variant,missense_variant",
                "splice_region_variant; stop_gained"
            ]
        );
    }

    #[test]
    fn canonical_requires_yes_token() {
        let mut t = vep_table();
        RowFilter::new(["missense_variant", "stop_gained"])
            .require_canonical(true)
            .apply(&mut t, "t")
            .unwrap();
        // "TRUE" is not accepted, "yes" is
        assert_eq!(
            consequences(&t),
            vec![
                "missense_variant&splice_region_variant",
                "intron_variant,missense_variant"
            ]
        );
    }

    #[test]
    fn mane_requires_non_empty_value() {
        let mut t = vep_table();
        RowFilter::new(["missense_variant", "stop_gained"])
            .require_mane(true)
            .apply(&mut t, "t")
            .unwrap();
        assert_eq!(
            consequences(&t),
            vec![
                "missense_variant&splice_region_variant",
                "splice_region_variant; stop_gained"
            ]
        );
    }

    #[test]
    fn mane_column_fallback() {
        let mut t = Table::from_rows(
            &["Consequence", "MANE"],
            &[vec!["missense_variant", "ENST"], vec!["missense_variant", ""]],
        )
        .unwrap();
        let n = RowFilter::new(["missense_variant"])
            .require_mane(true)
            .apply(&mut t, "t")
            .unwrap();
        assert_eq!(n, 1);
    }

    #[test]
    fn end_to_end_canonical_row_passes() {
        let mut t = Table::from_rows(
            &["Consequence", "CANONICAL"],
            &[vec!["missense_variant&splice_region_variant", "YES"]],
        )
        .unwrap();
        let n = RowFilter::new(["missense_variant"])
            .require_canonical(true)
            .apply(&mut t, "t")
            .unwrap();
        assert_eq!(n, 1);
    }

    #[test]
    fn missing_columns_are_fatal() {
        let mut t = Table::from_rows(&["Feature"], &[vec!["ENST1"]]).unwrap();
        let e = RowFilter::new(["missense_variant"])
            .apply(&mut t, "in.tsv")
            .unwrap_err();
        assert_eq!(e.to_string(), "Missing column 'Consequence' in in.tsv");

        let mut t = Table::from_rows(&["Consequence"], &[vec!["synonymous_variant"]]).unwrap();
        let e = RowFilter::new(["missense_variant"])
            .require_canonical(true)
            .require_mane(true)
            .apply(&mut t, "in.tsv")
            .unwrap_err();
        assert!(matches!(e, VepError::MissingColumn { ref column, .. } if column == "CANONICAL"));
        // Rows are only touched once all columns are found
        assert_eq!(t.n_rows(), 1);
    }

    #[test]
    fn custom_consequence_column() {
        let mut t = Table::from_rows(&["csq"], &[vec!["stop_gained"], vec!["x"]]).unwrap();
        let n = RowFilter::new(["stop_gained"])
            .consequence_col("csq")
            .apply(&mut t, "t")
            .unwrap();
        assert_eq!(n, 1);
    }

    #[test]
    fn empty_and_placeholder_consequences_never_match() {
        let f = RowFilter::new(["missense_variant"]);
        assert!(!f.has_kept_term(""));
        assert!(!f.has_kept_term("-"));
        assert!(!f.has_kept_term("&&"));
        assert!(f.has_kept_term("&missense_variant"));
    }
}
