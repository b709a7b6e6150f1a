use std::{
    collections::{HashMap, HashSet},
    fmt,
    str::FromStr,
};

use crate::{
    config::MergeConfig,
    error::VepError,
    normalise::{resolve_column, GENE_SYMBOL_COL, TRANSCRIPT_COL},
    table::{is_missing, path_name, read_table, write_table, Table},
};

pub const CONSTRAINT_SUFFIX: &str = "_constraint";
pub const CONSTRAINT_VERSION_COL: &str = "constraint_version";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum JoinKey {
    GeneSymbol,
    Transcript,
}

impl JoinKey {
    /// Canonical key column in a normalised annotation table
    pub fn column(&self) -> &'static str {
        match self {
            Self::GeneSymbol => GENE_SYMBOL_COL,
            Self::Transcript => TRANSCRIPT_COL,
        }
    }

    /// Gene symbols are compared trimmed and upper-cased, transcripts trimmed only
    pub fn normalise(&self, s: &str) -> String {
        match self {
            Self::GeneSymbol => s.trim().to_uppercase(),
            Self::Transcript => s.trim().to_owned(),
        }
    }
}

impl FromStr for JoinKey {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "gene_symbol" => Ok(Self::GeneSymbol),
            "transcript" => Ok(Self::Transcript),
            _ => Err(format!(
                "Invalid join key '{}': must be 'gene_symbol' or 'transcript'",
                s
            )),
        }
    }
}

impl fmt::Display for JoinKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::GeneSymbol => write!(f, "gene_symbol"),
            Self::Transcript => write!(f, "transcript"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum JoinMode {
    Left,
    Inner,
}

impl FromStr for JoinMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "left" => Ok(Self::Left),
            "inner" => Ok(Self::Inner),
            _ => Err(format!(
                "Invalid join mode '{}': must be 'left' or 'inner'",
                s
            )),
        }
    }
}

impl fmt::Display for JoinMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Left => write!(f, "left"),
            Self::Inner => write!(f, "inner"),
        }
    }
}

/// Join of an annotation table against a constraint metrics table
#[derive(Debug, Clone)]
pub struct ConstraintMerge {
    key: JoinKey,
    mode: JoinMode,
    version: Option<String>,
}

impl ConstraintMerge {
    pub fn new(key: JoinKey, mode: JoinMode) -> Self {
        Self {
            key,
            mode,
            version: None,
        }
    }

    pub fn version(mut self, v: Option<String>) -> Self {
        self.version = v;
        self
    }

    pub fn key(&self) -> JoinKey {
        self.key
    }

    pub fn mode(&self) -> JoinMode {
        self.mode
    }

    /// Join `cons` onto `ann`.  Output has the annotation columns followed by the non-key
    /// constraint columns; clashing constraint names get `CONSTRAINT_SUFFIX`.
    pub fn merge(
        &self,
        ann: &Table,
        ann_path: &str,
        cons: &Table,
        cons_path: &str,
    ) -> anyhow::Result<Table> {
        let key_col = self.key.column();
        let l_ix = ann.require_column(key_col, ann_path)?;
        let r_ix = resolve_column(cons, key_col)
            .ok_or_else(|| VepError::missing_column(key_col, cons_path))?;
        debug!(
            "Joining {} on {} with {} column {}",
            ann_path,
            key_col,
            cons_path,
            cons.columns()[r_ix]
        );

        // Index constraint rows by normalised key.  First row wins.
        let mut index = HashMap::with_capacity(cons.n_rows());
        let mut n_dup = 0;
        for (i, r) in cons.rows().iter().enumerate() {
            if is_missing(&r[r_ix]) {
                continue;
            }
            let k = self.key.normalise(&r[r_ix]);
            if index.contains_key(&k) {
                n_dup += 1;
            } else {
                index.insert(k, i);
            }
        }
        if n_dup > 0 {
            warn!(
                "{} duplicate keys in {}; keeping the first row for each",
                n_dup, cons_path
            )
        }

        let r_cols: Vec<usize> = (0..cons.n_cols()).filter(|&i| i != r_ix).collect();
        let mut columns = ann.columns().to_vec();
        let mut used: HashSet<String> = columns.iter().cloned().collect();
        for &i in r_cols.iter() {
            let mut name = cons.columns()[i].clone();
            while used.contains(&name) {
                name.push_str(CONSTRAINT_SUFFIX)
            }
            used.insert(name.clone());
            columns.push(name);
        }

        let mut out = Table::new(columns);
        let mut matched = 0;
        for r in ann.rows() {
            let hit = if is_missing(&r[l_ix]) {
                None
            } else {
                index.get(&self.key.normalise(&r[l_ix]))
            };
            let mut row = r.clone();
            match hit {
                Some(&j) => {
                    matched += 1;
                    let cr = &cons.rows()[j];
                    row.extend(r_cols.iter().map(|&i| cr[i].clone()));
                }
                None if self.mode == JoinMode::Left => {
                    row.resize(row.len() + r_cols.len(), String::new())
                }
                None => continue,
            }
            out.push_row(row)?;
        }

        if matched == 0 && ann.n_rows() > 0 {
            warn!(
                "No overlap between {} and {} on {}",
                ann_path, cons_path, key_col
            )
        }
        info!(
            "Merged ({}) on '{}': {} of {} rows matched, {} rows out",
            self.mode,
            key_col,
            matched,
            ann.n_rows(),
            out.n_rows()
        );

        if let Some(v) = self.version.as_deref() {
            out.set_constant_column(CONSTRAINT_VERSION_COL, v)
        }
        Ok(out)
    }
}

pub fn run(cfg: &MergeConfig) -> anyhow::Result<()> {
    let (ann_name, cons_name) = (path_name(cfg.input()), cfg.constraint().display().to_string());
    debug!("Reading input: {}, constraint: {}", ann_name, cons_name);
    let ann = read_table(cfg.input())?;
    let cons = read_table(Some(cfg.constraint()))?;
    let merged = cfg.merger().merge(&ann, &ann_name, &cons, &cons_name)?;
    write_table(&merged, cfg.output())?;
    info!("Wrote {}", path_name(cfg.output()));
    Ok(())
}
