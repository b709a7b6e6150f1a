use std::{num::NonZeroUsize, path::PathBuf};

use clap::{command, value_parser, Arg, ArgAction, Command};

use super::{
    config::DATASETS,
    merge::{JoinKey, JoinMode},
    utils::LogLevel,
};

/// Logging options shared by every tool
pub fn add_log_args(cmd: Command) -> Command {
    cmd.arg(
        Arg::new("timestamp")
            .short('X')
            .long("timestamp")
            .value_parser(value_parser!(stderrlog::Timestamp))
            .value_name("GRANULARITY")
            .default_value("none")
            .help("Prepend log entries with a timestamp"),
    )
    .arg(
        Arg::new("loglevel")
            .short('l')
            .long("loglevel")
            .value_name("LOGLEVEL")
            .value_parser(value_parser!(LogLevel))
            .ignore_case(true)
            .default_value("info")
            .help("Set log level"),
    )
    .arg(
        Arg::new("quiet")
            .action(ArgAction::SetTrue)
            .long("quiet")
            .conflicts_with("loglevel")
            .help("Silence all output"),
    )
}

fn in_tsv_arg() -> Arg {
    Arg::new("in_tsv")
        .short('i')
        .long("in-tsv")
        .value_parser(value_parser!(PathBuf))
        .value_name("PATH")
        .default_value("-")
        .help("Input TSV (.tsv or .tsv.gz, '-' for stdin)")
}

fn out_tsv_arg() -> Arg {
    Arg::new("out_tsv")
        .short('o')
        .long("out-tsv")
        .value_parser(value_parser!(PathBuf))
        .value_name("PATH")
        .default_value("-")
        .help("Output TSV (gzip compressed if ending in .gz, '-' for stdout)")
}

fn keep_consequence_arg() -> Arg {
    Arg::new("keep_consequence")
        .long("keep-consequence")
        .value_parser(value_parser!(String))
        .value_name("TERMS")
        .default_value("missense_variant,stop_gained")
        .help("Comma separated consequences to keep")
}

fn require_canonical_arg() -> Arg {
    Arg::new("require_canonical")
        .action(ArgAction::SetTrue)
        .long("require-canonical")
        .help("Keep only rows with CANONICAL=YES")
}

fn require_mane_arg() -> Arg {
    Arg::new("require_mane")
        .action(ArgAction::SetTrue)
        .long("require-mane")
        .visible_alias("mane-only")
        .help("Keep only rows with a MANE transcript")
}

fn join_key_arg(default: &'static str) -> Arg {
    Arg::new("on")
        .long("on")
        .value_parser(value_parser!(JoinKey))
        .value_name("KEY")
        .default_value(default)
        .help("Join key: gene_symbol or transcript")
}

fn join_mode_arg() -> Arg {
    Arg::new("how")
        .long("how")
        .value_parser(value_parser!(JoinMode))
        .value_name("MODE")
        .default_value("left")
        .help("Join type: left or inner")
}

pub fn filter_cli() -> Command {
    add_log_args(
        command!("vep-filter-consequence-mane")
            .about("Filter VEP TSV by consequence and optionally canonical / MANE transcripts"),
    )
    .arg(in_tsv_arg())
    .arg(out_tsv_arg())
    .arg(keep_consequence_arg().short('c'))
    .arg(
        Arg::new("consequence_column")
            .long("consequence-column")
            .value_parser(value_parser!(String))
            .value_name("COLUMN")
            .default_value("Consequence")
            .help("Column holding the consequence terms"),
    )
    .arg(require_canonical_arg())
    .arg(require_mane_arg())
}

pub fn normalise_cli() -> Command {
    add_log_args(
        command!("vep-normalise-columns")
            .about("Normalise VEP TSV columns and add version metadata"),
    )
    .arg(in_tsv_arg())
    .arg(out_tsv_arg())
    .arg(
        Arg::new("vep_cache_version")
            .short('v')
            .long("vep-cache-version")
            .value_parser(value_parser!(String))
            .value_name("VERSION")
            .help("VEP cache version (added as column vep_cache_version)"),
    )
    .arg(
        Arg::new("plugins_version")
            .short('p')
            .long("plugins-version")
            .value_parser(value_parser!(String))
            .value_name("VERSION")
            .help("VEP plugins version (added as column plugins_version)"),
    )
    .arg(
        Arg::new("gene_symbol_column")
            .long("gene-symbol-column")
            .value_parser(value_parser!(String))
            .value_name("COLUMN")
            .help("Column whose non-empty values override the gene symbol"),
    )
    .arg(
        Arg::new("hgvs_column")
            .long("hgvs-column")
            .value_parser(value_parser!(String))
            .value_name("COLUMN")
            .default_value("clinvar_hgvs")
            .help("Free text column searched for transcript accessions if no transcript is present"),
    )
    .arg(
        Arg::new("transcript_gene_map")
            .long("transcript-gene-map")
            .value_parser(value_parser!(PathBuf))
            .value_name("PATH")
            .help("TSV with Transcript and Gene_symbol columns used to fill missing gene symbols"),
    )
}

pub fn merge_cli() -> Command {
    add_log_args(
        command!("vep-merge-gnomad-constraint")
            .about("Merge gnomAD constraint metrics onto annotations on gene symbol or transcript"),
    )
    .arg(in_tsv_arg().help("Normalised annotation TSV ('-' for stdin)"))
    .arg(
        Arg::new("constraint_tsv")
            .short('c')
            .long("constraint-tsv")
            .value_parser(value_parser!(PathBuf))
            .value_name("PATH")
            .required(true)
            .help("gnomAD constraint TSV (.tsv or .tsv.gz)"),
    )
    .arg(out_tsv_arg())
    .arg(join_key_arg("gene_symbol"))
    .arg(join_mode_arg())
    .arg(
        Arg::new("constraint_version")
            .short('v')
            .long("constraint-version")
            .value_parser(value_parser!(String))
            .value_name("TAG")
            .help("Provenance tag (e.g., gnomad-v4.1)"),
    )
}

pub fn overview_cli() -> Command {
    add_log_args(
        command!("vep-overview").about("Quick shape, column and key checks for a TSV"),
    )
    .arg(in_tsv_arg().help("TSV to inspect ('-' for stdin)"))
    .arg(
        Arg::new("output")
            .short('o')
            .long("output")
            .value_parser(value_parser!(PathBuf))
            .value_name("PATH")
            .default_value("-")
            .help("Report destination ('-' for stdout)"),
    )
    .arg(
        Arg::new("head")
            .long("head")
            .value_parser(value_parser!(usize))
            .value_name("N")
            .default_value("5")
            .help("Show first N rows of the key columns"),
    )
}

pub fn pipeline_cli() -> Command {
    add_log_args(
        command!("vep-prepare-pipeline")
            .about("One-shot pipeline: filter -> normalise -> merge -> (overview)"),
    )
    .arg(
        Arg::new("in_tsv")
            .short('i')
            .long("in-tsv")
            .value_parser(value_parser!(PathBuf))
            .value_name("PATH")
            .required(true)
            .help("VEP TSV input"),
    )
    .arg(
        Arg::new("constraint_tsv")
            .short('c')
            .long("constraint-tsv")
            .value_parser(value_parser!(PathBuf))
            .value_name("PATH")
            .required(true)
            .help("gnomAD constraint TSV(.gz)"),
    )
    .arg(
        Arg::new("out_dir")
            .short('o')
            .long("out-dir")
            .value_parser(value_parser!(PathBuf))
            .value_name("DIR")
            .default_value("out")
            .help("Output directory"),
    )
    .arg(keep_consequence_arg())
    .arg(require_canonical_arg())
    .arg(require_mane_arg())
    .arg(
        Arg::new("vep_cache_version")
            .long("vep-cache-version")
            .value_parser(value_parser!(String))
            .value_name("VERSION")
            .default_value("109"),
    )
    .arg(
        Arg::new("plugins_version")
            .long("plugins-version")
            .value_parser(value_parser!(String))
            .value_name("VERSION")
            .default_value("v1.0"),
    )
    .arg(join_key_arg("transcript"))
    .arg(join_mode_arg())
    .arg(
        Arg::new("constraint_version")
            .long("constraint-version")
            .value_parser(value_parser!(String))
            .value_name("TAG")
            .help("Annotate result with constraint version"),
    )
    .arg(
        Arg::new("gzip_out")
            .action(ArgAction::SetTrue)
            .long("gzip-out")
            .help("Write outputs as .tsv.gz"),
    )
    .arg(
        Arg::new("skip_overview")
            .action(ArgAction::SetTrue)
            .long("skip-overview")
            .help("Skip final overview"),
    )
}

pub fn run_cli() -> Command {
    let mut cmd = add_log_args(
        command!("vep-run")
            .about("Run Ensembl VEP with a stable set of plugins/flags and emit a reproducible manifest"),
    )
    .arg(
        Arg::new("sample")
            .value_parser(value_parser!(String))
            .value_name("SAMPLE")
            .required(true)
            .help("Sample name label (used for outputs/logs)"),
    )
    .arg(
        Arg::new("input_vcf")
            .short('i')
            .long("input-vcf")
            .value_parser(value_parser!(PathBuf))
            .value_name("PATH")
            .required(true)
            .help("Input VCF/BCF (gz OK)"),
    )
    .arg(
        Arg::new("out_dir")
            .short('o')
            .long("out-dir")
            .value_parser(value_parser!(PathBuf))
            .value_name("DIR")
            .default_value("out")
            .help("Output directory"),
    )
    .arg(
        Arg::new("vep_exec")
            .long("vep-exec")
            .value_parser(value_parser!(String))
            .value_name("EXEC")
            .help("VEP executable [default: $VEP_EXEC or vep]"),
    )
    .arg(
        Arg::new("vep_cache_dir")
            .long("vep-cache-dir")
            .value_parser(value_parser!(PathBuf))
            .value_name("DIR")
            .help("VEP cache directory [default: $VEP_DATA_DIR]"),
    )
    .arg(
        Arg::new("vep_plugins_dir")
            .long("vep-plugins-dir")
            .value_parser(value_parser!(PathBuf))
            .value_name("DIR")
            .help("VEP plugins directory [default: $VEP_PLUGINS_DIR]"),
    )
    .arg(
        Arg::new("reference_fasta")
            .long("reference-fasta")
            .value_parser(value_parser!(PathBuf))
            .value_name("PATH")
            .help("Reference FASTA [default: $VEP_FASTA]"),
    );

    for ds in DATASETS.iter() {
        cmd = cmd.arg(
            Arg::new(ds.id)
                .long(ds.long)
                .value_parser(value_parser!(PathBuf))
                .value_name("PATH")
                .help(format!("{} [default: {}]", ds.help, ds.default_display())),
        )
    }

    cmd.arg(
        Arg::new("assembly")
            .long("assembly")
            .value_parser(value_parser!(String))
            .default_value("GRCh38"),
    )
    .arg(
        Arg::new("species")
            .long("species")
            .value_parser(value_parser!(String))
            .default_value("homo_sapiens"),
    )
    .arg(
        Arg::new("threads")
            .short('t')
            .long("threads")
            .value_parser(value_parser!(NonZeroUsize))
            .value_name("INT")
            .default_value("1")
            .help("Number of VEP forks"),
    )
    .arg(
        Arg::new("dry_run")
            .action(ArgAction::SetTrue)
            .long("dry-run")
            .help("Print command and exit"),
    )
}
