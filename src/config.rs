use std::{
    collections::BTreeMap,
    env,
    num::NonZeroUsize,
    path::{Path, PathBuf},
};

use clap::ArgMatches;

use super::{
    cli::{filter_cli, merge_cli, normalise_cli, overview_cli, pipeline_cli, run_cli},
    filter::RowFilter,
    merge::{ConstraintMerge, JoinKey, JoinMode},
    utils::{init_log, split_list, LogLevel},
};

// Path options where "-" means stdin/stdout
fn io_path(m: &ArgMatches, id: &str) -> Option<PathBuf> {
    m.get_one::<PathBuf>(id)
        .filter(|p| p.as_os_str() != "-")
        .map(|p| p.to_owned())
}

fn opt_string(m: &ArgMatches, id: &str) -> Option<String> {
    m.get_one::<String>(id).map(|s| s.to_owned())
}

fn keep_list(m: &ArgMatches) -> anyhow::Result<Vec<String>> {
    let s = m
        .get_one::<String>("keep_consequence")
        .expect("Missing default keep-consequence value");
    let v = split_list(s);
    if v.is_empty() {
        Err(anyhow!("No consequences given to keep ('{}')", s))
    } else {
        Ok(v)
    }
}

#[derive(Debug)]
pub struct FilterConfig {
    // Input file - if none, input from stdin
    input: Option<PathBuf>,
    // Output file - if none, output to stdout
    output: Option<PathBuf>,
    row_filter: RowFilter,
}

impl FilterConfig {
    pub fn input(&self) -> Option<&Path> {
        self.input.as_deref()
    }
    pub fn output(&self) -> Option<&Path> {
        self.output.as_deref()
    }
    pub fn row_filter(&self) -> &RowFilter {
        &self.row_filter
    }
}

pub fn filter_config(m: &ArgMatches) -> anyhow::Result<FilterConfig> {
    let col = m
        .get_one::<String>("consequence_column")
        .expect("Missing default consequence column");
    let row_filter = RowFilter::new(keep_list(m)?)
        .consequence_col(col)
        .require_canonical(m.get_flag("require_canonical"))
        .require_mane(m.get_flag("require_mane"));
    Ok(FilterConfig {
        input: io_path(m, "in_tsv"),
        output: io_path(m, "out_tsv"),
        row_filter,
    })
}

pub fn handle_filter_cli() -> anyhow::Result<FilterConfig> {
    let m = filter_cli().get_matches();
    init_log(&m);
    debug!("Processing command line options");
    filter_config(&m)
}

#[derive(Debug)]
pub struct NormaliseConfig {
    input: Option<PathBuf>,
    output: Option<PathBuf>,
    vep_cache_version: Option<String>,
    plugins_version: Option<String>,
    gene_symbol_col: Option<String>,
    hgvs_col: String,
    transcript_gene_map: Option<PathBuf>,
}

impl NormaliseConfig {
    pub fn input(&self) -> Option<&Path> {
        self.input.as_deref()
    }
    pub fn output(&self) -> Option<&Path> {
        self.output.as_deref()
    }
    pub fn vep_cache_version(&self) -> Option<&str> {
        self.vep_cache_version.as_deref()
    }
    pub fn plugins_version(&self) -> Option<&str> {
        self.plugins_version.as_deref()
    }
    pub fn gene_symbol_col(&self) -> Option<&str> {
        self.gene_symbol_col.as_deref()
    }
    pub fn hgvs_col(&self) -> &str {
        &self.hgvs_col
    }
    pub fn transcript_gene_map(&self) -> Option<&Path> {
        self.transcript_gene_map.as_deref()
    }
}

pub fn normalise_config(m: &ArgMatches) -> anyhow::Result<NormaliseConfig> {
    Ok(NormaliseConfig {
        input: io_path(m, "in_tsv"),
        output: io_path(m, "out_tsv"),
        vep_cache_version: opt_string(m, "vep_cache_version"),
        plugins_version: opt_string(m, "plugins_version"),
        gene_symbol_col: opt_string(m, "gene_symbol_column"),
        hgvs_col: opt_string(m, "hgvs_column").expect("Missing default hgvs column"),
        transcript_gene_map: m.get_one::<PathBuf>("transcript_gene_map").cloned(),
    })
}

pub fn handle_normalise_cli() -> anyhow::Result<NormaliseConfig> {
    let m = normalise_cli().get_matches();
    init_log(&m);
    debug!("Processing command line options");
    normalise_config(&m)
}

#[derive(Debug)]
pub struct MergeConfig {
    input: Option<PathBuf>,
    constraint: PathBuf,
    output: Option<PathBuf>,
    merger: ConstraintMerge,
}

impl MergeConfig {
    pub fn input(&self) -> Option<&Path> {
        self.input.as_deref()
    }
    pub fn constraint(&self) -> &Path {
        &self.constraint
    }
    pub fn output(&self) -> Option<&Path> {
        self.output.as_deref()
    }
    pub fn merger(&self) -> &ConstraintMerge {
        &self.merger
    }
}

pub fn merge_config(m: &ArgMatches) -> anyhow::Result<MergeConfig> {
    let key = *m.get_one::<JoinKey>("on").expect("Missing default join key");
    let mode = *m.get_one::<JoinMode>("how").expect("Missing default join mode");
    Ok(MergeConfig {
        input: io_path(m, "in_tsv"),
        constraint: m
            .get_one::<PathBuf>("constraint_tsv")
            .expect("Missing constraint table")
            .to_owned(),
        output: io_path(m, "out_tsv"),
        merger: ConstraintMerge::new(key, mode).version(opt_string(m, "constraint_version")),
    })
}

pub fn handle_merge_cli() -> anyhow::Result<MergeConfig> {
    let m = merge_cli().get_matches();
    init_log(&m);
    debug!("Processing command line options");
    merge_config(&m)
}

#[derive(Debug)]
pub struct OverviewConfig {
    input: Option<PathBuf>,
    output: Option<PathBuf>,
    head: usize,
}

impl OverviewConfig {
    pub fn input(&self) -> Option<&Path> {
        self.input.as_deref()
    }
    pub fn output(&self) -> Option<&Path> {
        self.output.as_deref()
    }
    pub fn head(&self) -> usize {
        self.head
    }
}

pub fn overview_config(m: &ArgMatches) -> OverviewConfig {
    OverviewConfig {
        input: io_path(m, "in_tsv"),
        output: io_path(m, "output"),
        head: *m.get_one::<usize>("head").expect("Missing default head value"),
    }
}

pub fn handle_overview_cli() -> anyhow::Result<OverviewConfig> {
    let m = overview_cli().get_matches();
    init_log(&m);
    Ok(overview_config(&m))
}

#[derive(Debug, Clone)]
pub struct PipelineConfig {
    in_tsv: PathBuf,
    constraint_tsv: PathBuf,
    out_dir: PathBuf,
    keep_consequence: String,
    require_canonical: bool,
    require_mane: bool,
    vep_cache_version: String,
    plugins_version: String,
    join_key: JoinKey,
    join_mode: JoinMode,
    constraint_version: Option<String>,
    gzip_out: bool,
    skip_overview: bool,
    // Passed on to each step
    log_level: LogLevel,
}

impl PipelineConfig {
    pub fn new<P: AsRef<Path>, Q: AsRef<Path>, R: AsRef<Path>>(
        in_tsv: P,
        constraint_tsv: Q,
        out_dir: R,
    ) -> Self {
        Self {
            in_tsv: in_tsv.as_ref().to_owned(),
            constraint_tsv: constraint_tsv.as_ref().to_owned(),
            out_dir: out_dir.as_ref().to_owned(),
            keep_consequence: "missense_variant,stop_gained".to_owned(),
            require_canonical: false,
            require_mane: false,
            vep_cache_version: "109".to_owned(),
            plugins_version: "v1.0".to_owned(),
            join_key: JoinKey::Transcript,
            join_mode: JoinMode::Left,
            constraint_version: None,
            gzip_out: false,
            skip_overview: false,
            log_level: LogLevel::Info,
        }
    }

    pub fn in_tsv(&self) -> &Path {
        &self.in_tsv
    }
    pub fn constraint_tsv(&self) -> &Path {
        &self.constraint_tsv
    }
    pub fn out_dir(&self) -> &Path {
        &self.out_dir
    }
    pub fn keep_consequence(&self) -> &str {
        &self.keep_consequence
    }
    pub fn require_canonical(&self) -> bool {
        self.require_canonical
    }
    pub fn require_mane(&self) -> bool {
        self.require_mane
    }
    pub fn vep_cache_version(&self) -> &str {
        &self.vep_cache_version
    }
    pub fn plugins_version(&self) -> &str {
        &self.plugins_version
    }
    pub fn join_key(&self) -> JoinKey {
        self.join_key
    }
    pub fn join_mode(&self) -> JoinMode {
        self.join_mode
    }
    pub fn constraint_version(&self) -> Option<&str> {
        self.constraint_version.as_deref()
    }
    pub fn gzip_out(&self) -> bool {
        self.gzip_out
    }
    pub fn skip_overview(&self) -> bool {
        self.skip_overview
    }
    pub fn log_level(&self) -> LogLevel {
        self.log_level
    }

    pub fn set_keep_consequence(&mut self, s: &str) {
        self.keep_consequence = s.to_owned()
    }
    pub fn set_require_canonical(&mut self, x: bool) {
        self.require_canonical = x
    }
    pub fn set_require_mane(&mut self, x: bool) {
        self.require_mane = x
    }
    pub fn set_versions(&mut self, vep_cache: &str, plugins: &str) {
        self.vep_cache_version = vep_cache.to_owned();
        self.plugins_version = plugins.to_owned();
    }
    pub fn set_join(&mut self, key: JoinKey, mode: JoinMode) {
        self.join_key = key;
        self.join_mode = mode;
    }
    pub fn set_constraint_version(&mut self, v: Option<String>) {
        self.constraint_version = v
    }
    pub fn set_gzip_out(&mut self, x: bool) {
        self.gzip_out = x
    }
    pub fn set_skip_overview(&mut self, x: bool) {
        self.skip_overview = x
    }
    pub fn set_log_level(&mut self, l: LogLevel) {
        self.log_level = l
    }
}

pub fn pipeline_config(m: &ArgMatches, log_level: LogLevel) -> anyhow::Result<PipelineConfig> {
    let get_path = |id: &str| {
        m.get_one::<PathBuf>(id)
            .expect("Missing required path")
            .to_owned()
    };
    let get_str = |id: &str| opt_string(m, id).expect("Missing default value");

    let mut cfg = PipelineConfig::new(
        get_path("in_tsv"),
        get_path("constraint_tsv"),
        get_path("out_dir"),
    );
    // Check here so a bad list fails before anything runs
    keep_list(m)?;
    cfg.set_keep_consequence(&get_str("keep_consequence"));
    cfg.set_require_canonical(m.get_flag("require_canonical"));
    cfg.set_require_mane(m.get_flag("require_mane"));
    cfg.set_versions(&get_str("vep_cache_version"), &get_str("plugins_version"));
    cfg.set_join(
        *m.get_one::<JoinKey>("on").expect("Missing default join key"),
        *m.get_one::<JoinMode>("how").expect("Missing default join mode"),
    );
    cfg.set_constraint_version(opt_string(m, "constraint_version"));
    cfg.set_gzip_out(m.get_flag("gzip_out"));
    cfg.set_skip_overview(m.get_flag("skip_overview"));
    cfg.set_log_level(log_level);
    Ok(cfg)
}

pub fn handle_pipeline_cli() -> anyhow::Result<PipelineConfig> {
    let m = pipeline_cli().get_matches();
    let level = init_log(&m);
    let level = if m.get_flag("quiet") {
        LogLevel::None
    } else {
        level
    };
    debug!("Processing command line options");
    pipeline_config(&m, level)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DatasetKind {
    File,
    Dir,
}

impl DatasetKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::File => "file",
            Self::Dir => "dir",
        }
    }
}

/// Directory a dataset's default location is relative to
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DatasetBase {
    Data,
    Plugins,
}

/// A VEP plugin dataset: option id (also the manifest key), long option name and default location
#[derive(Debug)]
pub struct Dataset {
    pub id: &'static str,
    pub long: &'static str,
    pub default_file: &'static str,
    pub base: DatasetBase,
    pub kind: DatasetKind,
    pub help: &'static str,
}

impl Dataset {
    pub fn default_display(&self) -> String {
        let base = match self.base {
            DatasetBase::Data => "$VEP_DATA_DIR",
            DatasetBase::Plugins => "$VEP_PLUGINS_DIR",
        };
        format!("{}/{}", base, self.default_file)
    }
}

const fn dataset(
    id: &'static str,
    long: &'static str,
    default_file: &'static str,
    help: &'static str,
) -> Dataset {
    Dataset {
        id,
        long,
        default_file,
        base: DatasetBase::Data,
        kind: DatasetKind::File,
        help,
    }
}

pub const DATASETS: [Dataset; 13] = [
    dataset(
        "alpha_missense",
        "alpha-missense",
        "AlphaMissense_hg38.tsv.gz",
        "AlphaMissense scores",
    ),
    dataset(
        "ancestral_allele",
        "ancestral-allele",
        "human_ancestor.fa.gz",
        "Human ancestral sequence (LOFTEE)",
    ),
    dataset(
        "cadd_snv",
        "cadd-snv",
        "cadd_whole_genome_SNVs_v1.7.tsv.gz",
        "CADD SNV scores",
    ),
    dataset(
        "cadd_indel",
        "cadd-indel",
        "cadd_gnomad.genomes.r4.0.indel.tsv.gz",
        "CADD indel scores",
    ),
    dataset("clinvar_vcf", "clinvar-vcf", "clinvar.vcf.gz", "ClinVar VCF"),
    dataset("dbnsfp", "dbnsfp", "dbNSFP4.9a_grch38.gz", "dbNSFP database"),
    dataset(
        "primate_ai",
        "primate-ai",
        "PrimateAI_scores_v0.2_GRCh38_sorted.tsv.bgz",
        "PrimateAI scores",
    ),
    dataset(
        "revel",
        "revel",
        "new_tabbed_revel_grch38.tsv.gz",
        "REVEL scores",
    ),
    dataset(
        "spliceai_snv",
        "spliceai-snv",
        "spliceai_scores.raw.snv.hg38.vcf.gz",
        "SpliceAI SNV scores",
    ),
    dataset(
        "spliceai_indel",
        "spliceai-indel",
        "spliceai_scores.raw.indel.hg38.vcf.gz",
        "SpliceAI indel scores",
    ),
    dataset(
        "splicevault",
        "splicevault",
        "SpliceVault_data_GRCh38.tsv.gz",
        "SpliceVault data",
    ),
    dataset(
        "loftee_conservation",
        "loftee-conservation",
        "phylocsf_gerp.sql",
        "LOFTEE conservation database",
    ),
    Dataset {
        id: "loftee_splice_dir",
        long: "loftee-splice-dir",
        default_file: "loftee/splice_data",
        base: DatasetBase::Plugins,
        kind: DatasetKind::Dir,
        help: "LOFTEE splice data directory",
    },
];

/// Runner defaults taken from the environment so container runs can mount references
#[derive(Debug, Clone)]
pub struct RunnerEnv {
    vep_exec: String,
    data_dir: PathBuf,
    plugins_dir: PathBuf,
    fasta: PathBuf,
}

impl RunnerEnv {
    pub fn from_env() -> Self {
        Self::from_vars(|k| env::var(k).ok())
    }

    pub fn from_vars<F: Fn(&str) -> Option<String>>(get: F) -> Self {
        let data_dir = PathBuf::from(get("VEP_DATA_DIR").unwrap_or_else(|| "/refs/vep/data".into()));
        let plugins_dir =
            PathBuf::from(get("VEP_PLUGINS_DIR").unwrap_or_else(|| "/refs/vep/Plugins".into()));
        let fasta = get("VEP_FASTA")
            .map(PathBuf::from)
            .unwrap_or_else(|| data_dir.join("Homo_sapiens.GRCh38.dna.primary_assembly.fa"));
        Self {
            vep_exec: get("VEP_EXEC").unwrap_or_else(|| "vep".into()),
            data_dir,
            plugins_dir,
            fasta,
        }
    }

    pub fn vep_exec(&self) -> &str {
        &self.vep_exec
    }
    pub fn data_dir(&self) -> &Path {
        &self.data_dir
    }
    pub fn plugins_dir(&self) -> &Path {
        &self.plugins_dir
    }
    pub fn fasta(&self) -> &Path {
        &self.fasta
    }

    pub fn default_dataset_path(&self, ds: &Dataset) -> PathBuf {
        match ds.base {
            DatasetBase::Data => self.data_dir.join(ds.default_file),
            DatasetBase::Plugins => self.plugins_dir.join(ds.default_file),
        }
    }
}

#[derive(Debug, Clone)]
pub struct RunConfig {
    sample: String,
    input_vcf: PathBuf,
    out_dir: PathBuf,
    vep_exec: String,
    cache_dir: PathBuf,
    plugins_dir: PathBuf,
    fasta: PathBuf,
    datasets: BTreeMap<&'static str, PathBuf>,
    assembly: String,
    species: String,
    threads: usize,
    dry_run: bool,
}

impl RunConfig {
    /// Configuration with every path at its environment default
    pub fn from_env(sample: &str, input_vcf: PathBuf, out_dir: PathBuf, env: &RunnerEnv) -> Self {
        let datasets = DATASETS
            .iter()
            .map(|ds| (ds.id, env.default_dataset_path(ds)))
            .collect();
        Self {
            sample: sample.to_owned(),
            input_vcf,
            out_dir,
            vep_exec: env.vep_exec().to_owned(),
            cache_dir: env.data_dir().to_owned(),
            plugins_dir: env.plugins_dir().to_owned(),
            fasta: env.fasta().to_owned(),
            datasets,
            assembly: "GRCh38".to_owned(),
            species: "homo_sapiens".to_owned(),
            threads: 1,
            dry_run: false,
        }
    }

    pub fn sample(&self) -> &str {
        &self.sample
    }
    pub fn input_vcf(&self) -> &Path {
        &self.input_vcf
    }
    pub fn out_dir(&self) -> &Path {
        &self.out_dir
    }
    pub fn vep_exec(&self) -> &str {
        &self.vep_exec
    }
    pub fn cache_dir(&self) -> &Path {
        &self.cache_dir
    }
    pub fn plugins_dir(&self) -> &Path {
        &self.plugins_dir
    }
    pub fn fasta(&self) -> &Path {
        &self.fasta
    }
    pub fn dataset(&self, id: &str) -> &Path {
        self.datasets
            .get(id)
            .map(|p| p.as_path())
            .expect("Unknown dataset id")
    }
    pub fn assembly(&self) -> &str {
        &self.assembly
    }
    pub fn species(&self) -> &str {
        &self.species
    }
    pub fn threads(&self) -> usize {
        self.threads
    }
    pub fn dry_run(&self) -> bool {
        self.dry_run
    }

    pub fn set_threads(&mut self, n: usize) {
        self.threads = n
    }
}

pub fn run_config(m: &ArgMatches, env: &RunnerEnv) -> anyhow::Result<RunConfig> {
    let sample = m.get_one::<String>("sample").expect("Missing sample");
    if sample.trim().is_empty() || sample.contains('/') {
        return Err(anyhow!("Invalid sample name '{}'", sample));
    }
    let input_vcf = m
        .get_one::<PathBuf>("input_vcf")
        .expect("Missing input VCF")
        .to_owned();
    let out_dir = m
        .get_one::<PathBuf>("out_dir")
        .expect("Missing default output directory")
        .to_owned();

    let mut cfg = RunConfig::from_env(sample, input_vcf, out_dir, env);

    if let Some(s) = opt_string(m, "vep_exec") {
        cfg.vep_exec = s
    }
    let path_opt = |id: &str| m.get_one::<PathBuf>(id).cloned();
    if let Some(p) = path_opt("vep_cache_dir") {
        cfg.cache_dir = p
    }
    if let Some(p) = path_opt("vep_plugins_dir") {
        cfg.plugins_dir = p
    }
    if let Some(p) = path_opt("reference_fasta") {
        cfg.fasta = p
    }
    for ds in DATASETS.iter() {
        if let Some(p) = path_opt(ds.id) {
            cfg.datasets.insert(ds.id, p);
        }
    }
    cfg.assembly = opt_string(m, "assembly").expect("Missing default assembly");
    cfg.species = opt_string(m, "species").expect("Missing default species");
    cfg.threads = m
        .get_one::<NonZeroUsize>("threads")
        .map(|i| usize::from(*i))
        .unwrap_or(1);
    cfg.dry_run = m.get_flag("dry_run");
    Ok(cfg)
}

pub fn handle_run_cli() -> anyhow::Result<RunConfig> {
    let m = run_cli().get_matches();
    init_log(&m);
    debug!("Processing command line options");
    run_config(&m, &RunnerEnv::from_env())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn filter_options() {
        let m = filter_cli()
            .try_get_matches_from([
                "vep-filter-consequence-mane",
                "-i",
                "in.tsv.gz",
                "--keep-consequence",
                "missense_variant, stop_gained",
                "--mane-only",
            ])
            .unwrap();
        let cfg = filter_config(&m).unwrap();
        assert_eq!(cfg.input(), Some(Path::new("in.tsv.gz")));
        assert_eq!(cfg.output(), None);
        assert!(cfg.row_filter().keep().contains("stop_gained"));
        assert!(cfg.row_filter().has_kept_term("stop_gained"));

        let m = filter_cli()
            .try_get_matches_from(["vep-filter-consequence-mane", "--keep-consequence", " , "])
            .unwrap();
        assert!(filter_config(&m).is_err());
    }

    #[test]
    fn merge_options_are_case_insensitive() {
        let m = merge_cli()
            .try_get_matches_from([
                "vep-merge-gnomad-constraint",
                "-c",
                "cons.tsv",
                "--on",
                "Transcript",
                "--how",
                " INNER ",
            ])
            .unwrap();
        let cfg = merge_config(&m).unwrap();
        assert_eq!(cfg.merger().key(), JoinKey::Transcript);
        assert_eq!(cfg.merger().mode(), JoinMode::Inner);
        assert_eq!(cfg.constraint(), Path::new("cons.tsv"));
    }

    #[test]
    fn bad_join_options_are_rejected() {
        for args in [["--on", "exon"], ["--how", "outer"]] {
            let r = merge_cli().try_get_matches_from(
                ["vep-merge-gnomad-constraint", "-c", "cons.tsv"]
                    .into_iter()
                    .chain(args),
            );
            assert!(r.is_err());
        }
    }

    #[test]
    fn pipeline_defaults() {
        let m = pipeline_cli()
            .try_get_matches_from(["vep-prepare-pipeline", "-i", "in.tsv", "-c", "cons.tsv"])
            .unwrap();
        let cfg = pipeline_config(&m, LogLevel::Info).unwrap();
        assert_eq!(cfg.out_dir(), Path::new("out"));
        assert_eq!(cfg.join_key(), JoinKey::Transcript);
        assert_eq!(cfg.join_mode(), JoinMode::Left);
        assert_eq!(cfg.vep_cache_version(), "109");
        assert_eq!(cfg.plugins_version(), "v1.0");
        assert_eq!(cfg.constraint_version(), None);
        assert!(!cfg.gzip_out() && !cfg.skip_overview());
    }

    #[test]
    fn runner_env_defaults() {
        let env = RunnerEnv::from_vars(|_| None);
        assert_eq!(env.vep_exec(), "vep");
        assert_eq!(
            env.fasta(),
            Path::new("/refs/vep/data/Homo_sapiens.GRCh38.dna.primary_assembly.fa")
        );
        let env = RunnerEnv::from_vars(|k| (k == "VEP_FASTA").then(|| "/x.fa".to_owned()));
        assert_eq!(env.fasta(), Path::new("/x.fa"));
    }

    #[test]
    fn run_options_override_env() {
        let env = RunnerEnv::from_vars(|k| (k == "VEP_DATA_DIR").then(|| "/d".to_owned()));
        let m = run_cli()
            .try_get_matches_from([
                "vep-run",
                "S1",
                "-i",
                "x.vcf.gz",
                "--revel",
                "/r/revel.tsv.gz",
                "--threads",
                "4",
                "--dry-run",
            ])
            .unwrap();
        let cfg = run_config(&m, &env).unwrap();
        assert_eq!(cfg.sample(), "S1");
        assert_eq!(cfg.dataset("revel"), Path::new("/r/revel.tsv.gz"));
        assert_eq!(cfg.dataset("dbnsfp"), Path::new("/d/dbNSFP4.9a_grch38.gz"));
        assert_eq!(
            cfg.dataset("loftee_splice_dir"),
            Path::new("/refs/vep/Plugins/loftee/splice_data")
        );
        assert_eq!(cfg.threads(), 4);
        assert!(cfg.dry_run());

        let m = run_cli()
            .try_get_matches_from(["vep-run", "S1", "-i", "x.vcf", "--threads", "0"]);
        assert!(m.is_err());
    }
}
