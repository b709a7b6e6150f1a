use std::{
    fs,
    io::{Read, Write},
    path::Path,
};

use anyhow::Context;
use compress_io::{compress::CompressIo, compress_type::CompressType};

use crate::error::VepError;

/// In-memory tab separated table.  Every row holds exactly one value per column.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Table {
    columns: Vec<String>,
    rows: Vec<Vec<String>>,
}

impl Table {
    pub fn new(columns: Vec<String>) -> Self {
        Self {
            columns,
            rows: Vec::new(),
        }
    }

    /// Build a table from string slices.  Short rows are padded, long rows rejected.
    pub fn from_rows<S: AsRef<str>>(columns: &[S], rows: &[Vec<S>]) -> anyhow::Result<Self> {
        let mut t = Self::new(columns.iter().map(|c| c.as_ref().to_owned()).collect());
        for r in rows {
            t.push_row(r.iter().map(|v| v.as_ref().to_owned()).collect())?
        }
        Ok(t)
    }

    #[inline]
    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    #[inline]
    pub fn rows(&self) -> &[Vec<String>] {
        &self.rows
    }

    #[inline]
    pub fn rows_mut(&mut self) -> &mut [Vec<String>] {
        &mut self.rows
    }

    #[inline]
    pub fn n_rows(&self) -> usize {
        self.rows.len()
    }

    #[inline]
    pub fn n_cols(&self) -> usize {
        self.columns.len()
    }

    pub fn col_index(&self, name: &str) -> Option<usize> {
        self.columns.iter().position(|c| c == name)
    }

    #[inline]
    pub fn has_column(&self, name: &str) -> bool {
        self.col_index(name).is_some()
    }

    /// Index of a column that must be present; `path` names the source in the error
    pub fn require_column(&self, name: &str, path: &str) -> Result<usize, VepError> {
        self.col_index(name)
            .ok_or_else(|| VepError::missing_column(name, path))
    }

    pub fn get(&self, row: usize, column: &str) -> Option<&str> {
        let ix = self.col_index(column)?;
        self.rows.get(row).map(|r| r[ix].as_str())
    }

    pub fn column_values(&self, ix: usize) -> impl Iterator<Item = &str> {
        self.rows.iter().map(move |r| r[ix].as_str())
    }

    pub fn push_row(&mut self, mut row: Vec<String>) -> anyhow::Result<()> {
        let n = self.columns.len();
        if row.len() > n {
            return Err(anyhow!(
                "Row has {} fields, header has {} columns",
                row.len(),
                n
            ));
        }
        row.resize(n, String::new());
        self.rows.push(row);
        Ok(())
    }

    pub fn rename_column(&mut self, ix: usize, name: &str) {
        self.columns[ix] = name.to_owned()
    }

    /// Append a column filled with `fill`, returning its index
    pub fn add_column(&mut self, name: &str, fill: &str) -> usize {
        self.columns.push(name.to_owned());
        for r in self.rows.iter_mut() {
            r.push(fill.to_owned())
        }
        self.columns.len() - 1
    }

    /// Index of `name`, appending it (empty) if absent
    pub fn ensure_column(&mut self, name: &str) -> usize {
        match self.col_index(name) {
            Some(ix) => ix,
            None => self.add_column(name, ""),
        }
    }

    /// Set every value of `name` to `value`, appending the column if needed
    pub fn set_constant_column(&mut self, name: &str, value: &str) {
        let ix = self.ensure_column(name);
        for r in self.rows.iter_mut() {
            r[ix].clear();
            r[ix].push_str(value);
        }
    }

    pub fn retain_rows<F: FnMut(&[String]) -> bool>(&mut self, mut f: F) {
        self.rows.retain(|r| f(r))
    }
}

/// Empty after trimming, or VEP's `-` placeholder
pub fn is_missing(s: &str) -> bool {
    matches!(s.trim(), "" | "-")
}

/// Name used for a path in messages; `None` stands for stdin/stdout
pub fn path_name(p: Option<&Path>) -> String {
    p.map(|p| p.display().to_string())
        .unwrap_or_else(|| "-".to_owned())
}

/// Read a (possibly compressed) table from a file or, if `path` is `None`, from stdin
pub fn read_table(path: Option<&Path>) -> anyhow::Result<Table> {
    let name = path_name(path);
    debug!("Reading table from {}", name);
    let mut rdr = match path {
        Some(p) => CompressIo::new().path(p).bufreader(),
        None => CompressIo::new().bufreader(),
    }
    .with_context(|| format!("Error opening input {}", name))?;

    let mut buf = String::new();
    rdr.read_to_string(&mut buf)
        .with_context(|| format!("Error reading from {}", name))?;

    let t = parse_table(&buf, &name)?;
    debug!(
        "Read {} rows and {} columns from {}",
        t.n_rows(),
        t.n_cols(),
        name
    );
    Ok(t)
}

/// Parse tab separated text.  Leading `##` metadata lines are skipped; the next line is the header.
pub fn parse_table(text: &str, name: &str) -> anyhow::Result<Table> {
    let mut rest = text.strip_prefix('\u{feff}').unwrap_or(text);
    let mut skipped = 0;
    while rest.starts_with("##") {
        skipped += 1;
        rest = match rest.find('\n') {
            Some(i) => &rest[i + 1..],
            None => "",
        }
    }
    if skipped > 0 {
        trace!("Skipped {} metadata lines in {}", skipped, name)
    }

    let mut rdr = csv::ReaderBuilder::new()
        .delimiter(b'\t')
        .has_headers(true)
        .flexible(true)
        .quoting(false)
        .from_reader(rest.as_bytes());

    let hdr = rdr
        .headers()
        .with_context(|| format!("Error reading header from {}", name))?;
    if hdr.is_empty() || (hdr.len() == 1 && hdr[0].trim().is_empty()) {
        return Err(anyhow!("Missing header line in {}", name));
    }
    let mut table = Table::new(hdr.iter().map(|s| s.trim().to_owned()).collect());

    for rec in rdr.records() {
        let rec = rec.with_context(|| format!("Error parsing {}", name))?;
        let line = rec.position().map(|p| p.line() as usize).unwrap_or(0) + skipped;
        table
            .push_row(rec.iter().map(|s| s.to_owned()).collect())
            .with_context(|| format!("{}:{} Malformed row", name, line))?;
    }
    Ok(table)
}

/// Write a table to a file or, if `path` is `None`, to stdout.  Output to a path ending in `.gz`
/// is gzip compressed.  Missing parent directories are created.
pub fn write_table(table: &Table, path: Option<&Path>) -> anyhow::Result<()> {
    let name = path_name(path);
    debug!("Writing {} rows to {}", table.n_rows(), name);
    let wrt = match path {
        Some(p) => {
            if let Some(dir) = p.parent().filter(|d| !d.as_os_str().is_empty()) {
                fs::create_dir_all(dir)
                    .with_context(|| format!("Error creating directory {}", dir.display()))?
            }
            if p.extension().map(|e| e == "gz").unwrap_or(false) {
                CompressIo::new()
                    .path(p)
                    .ctype(CompressType::Gzip)
                    .bufwriter()
            } else {
                CompressIo::new().path(p).bufwriter()
            }
        }
        None => CompressIo::new().bufwriter(),
    }
    .with_context(|| format!("Error opening output {}", name))?;

    let mut wrt = csv::WriterBuilder::new()
        .delimiter(b'\t')
        .quote_style(csv::QuoteStyle::Never)
        .from_writer(wrt);
    wrt.write_record(table.columns())
        .with_context(|| format!("Error writing header to {}", name))?;
    for r in table.rows() {
        wrt.write_record(r)
            .with_context(|| format!("Error writing to {}", name))?
    }
    let mut inner = wrt
        .into_inner()
        .map_err(|e| anyhow!("Error flushing output {}: {}", name, e.error()))?;
    inner
        .flush()
        .with_context(|| format!("Error flushing output {}", name))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_skips_metadata_and_pads() {
        let text = "## VEP output\n## more\n#Uploaded_variation\tSYMBOL\tExtra\nrs1\tBRCA1\tX=1\nrs2\tTP53\n";
        let t = parse_table(text, "test").unwrap();
        assert_eq!(t.columns(), &["#Uploaded_variation", "SYMBOL", "Extra"]);
        assert_eq!(t.n_rows(), 2);
        assert_eq!(t.get(1, "Extra"), Some(""));
        assert_eq!(t.get(0, "SYMBOL"), Some("BRCA1"));
    }

    #[test]
    fn parse_rejects_long_rows() {
        let e = parse_table("a\tb\n1\t2\t3\n", "long.tsv").unwrap_err();
        assert!(format!("{:#}", e).contains("long.tsv:2"));
    }

    #[test]
    fn parse_rejects_empty_input() {
        assert!(parse_table("", "empty").is_err());
        assert!(parse_table("## only meta\n", "meta").is_err());
    }

    #[test]
    fn missing_values() {
        assert!(is_missing(""));
        assert!(is_missing(" - "));
        assert!(!is_missing("ENST1"));
    }

    #[test]
    fn header_names_are_trimmed() {
        let t = parse_table(" a \tb\n1\t2\n", "t").unwrap();
        assert_eq!(t.columns(), &["a", "b"]);
    }

    #[test]
    fn column_edits() {
        let mut t = Table::from_rows(&["a", "b"], &[vec!["1", "2"], vec!["3", "4"]]).unwrap();
        t.set_constant_column("v", "x");
        t.set_constant_column("a", "y");
        assert_eq!(t.columns(), &["a", "b", "v"]);
        assert_eq!(t.column_values(0).collect::<Vec<_>>(), vec!["y", "y"]);
        assert_eq!(t.ensure_column("b"), 1);
        t.rename_column(1, "c");
        assert!(t.has_column("c") && !t.has_column("b"));
        assert!(matches!(
            t.require_column("b", "t.tsv"),
            Err(VepError::MissingColumn { .. })
        ));
    }

    #[test]
    fn write_then_read_file() {
        let dir = tempfile::tempdir().unwrap();
        let p = dir.path().join("sub").join("out.tsv");
        let t = Table::from_rows(&["a", "b"], &[vec!["1", ""], vec!["x y", "z"]]).unwrap();
        write_table(&t, Some(&p)).unwrap();
        let s = fs::read_to_string(&p).unwrap();
        assert_eq!(s, "a\tb\n1\t\nx y\tz\n");
        assert_eq!(read_table(Some(&p)).unwrap(), t);
    }

    #[test]
    fn quotes_are_plain_text() {
        let text = "id\tclinvar_trait\tHGVSp\nv1\t\"Breast_cancer\tc.1A>G \"p\"\nv2\tx\ty\nv3\tz\t\"\n";
        let t = parse_table(text, "q.tsv").unwrap();
        assert_eq!(t.n_rows(), 3);
        assert_eq!(t.get(0, "clinvar_trait"), Some("\"Breast_cancer"));
        assert_eq!(t.get(0, "HGVSp"), Some("c.1A>G \"p\""));
        assert_eq!(t.get(2, "HGVSp"), Some("\""));

        let dir = tempfile::tempdir().unwrap();
        let p = dir.path().join("q.tsv");
        write_table(&t, Some(&p)).unwrap();
        assert_eq!(fs::read_to_string(&p).unwrap(), text);
    }
}
