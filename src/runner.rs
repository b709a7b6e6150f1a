use std::{
    collections::BTreeMap,
    fs::{self, File},
    io::{self, BufReader, BufWriter, Read, Write},
    path::{Path, PathBuf},
    process::{Command, Stdio},
};

use anyhow::Context;
use serde::Serialize;
use sha1::{Digest, Sha1};

use crate::{
    config::{DatasetKind, RunConfig, DATASETS},
    error::VepError,
    pipeline::exit_code,
};

// dbNSFP fields requested from the plugin
const DBNSFP_FIELDS: [&str; 33] = [
    "BayesDel_noAF_pred",
    "ClinPred_pred",
    "DANN_score",
    "DEOGEN2_pred",
    "FATHMM_pred",
    "GERP++_RS",
    "LRT_pred",
    "M-CAP_pred",
    "MetaLR_pred",
    "MetaSVM_pred",
    "MutationAssessor_pred",
    "MutationTaster_pred",
    "PROVEAN_pred",
    "Polyphen2_HVAR_pred",
    "PrimateAI_score",
    "SIFT_pred",
    "SiPhy_29way_logOdds",
    "genename",
    "rs_dbSNP",
    "clinvar_MedGen_id",
    "clinvar_OMIM_id",
    "clinvar_Orphanet_id",
    "clinvar_clnsig",
    "clinvar_hgvs",
    "clinvar_id",
    "clinvar_review",
    "clinvar_trait",
    "clinvar_var_source",
    "Eigen-phred_coding",
    "GenoCanyon_score",
    "fathmm-MKL_coding_pred",
    "phastCons100way_vertebrate",
    "phyloP100way_vertebrate",
];

/// Files written by a run, all under the output directory
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunOutputs {
    pub annotated: PathBuf,
    pub command_log: PathBuf,
    pub stdout_log: PathBuf,
    pub stderr_log: PathBuf,
    pub manifest: PathBuf,
}

impl RunOutputs {
    pub fn new(out_dir: &Path, sample: &str) -> Self {
        let f = |suffix: &str| out_dir.join(format!("{}_vep_{}", sample, suffix));
        Self {
            annotated: f("annotated.txt.gz"),
            command_log: f("command.log"),
            stdout_log: f("stdout.log"),
            stderr_log: f("stderr.log"),
            manifest: f("manifest.json"),
        }
    }
}

/// Reproducibility record written next to the VEP output
#[derive(Debug, Serialize)]
pub struct RunManifest {
    pub sample: String,
    pub input_vcf: String,
    pub output_tsv_gz: String,
    pub vep_exec: String,
    pub vep_cache_dir: String,
    pub vep_plugins_dir: String,
    pub reference_fasta: String,
    pub args: Vec<String>,
    pub versions: BTreeMap<String, String>,
    pub files_checksum: BTreeMap<String, Option<String>>,
}

fn dbnsfp_plugin(path: &Path) -> String {
    format!("dbNSFP,{},{}", path.display(), DBNSFP_FIELDS.join(","))
}

/// Full VEP command line, executable first
pub fn vep_args(cfg: &RunConfig, out: &RunOutputs) -> Vec<String> {
    let d = |id: &str| cfg.dataset(id).display().to_string();
    let plugins_dir = cfg.plugins_dir().display().to_string();
    let mut args: Vec<String> = vec![
        cfg.vep_exec().to_owned(),
        "--cache".into(),
        "--offline".into(),
        "--dir_cache".into(),
        cfg.cache_dir().display().to_string(),
        "--dir_plugins".into(),
        plugins_dir.clone(),
        "--input_file".into(),
        cfg.input_vcf().display().to_string(),
        "--output_file".into(),
        out.annotated.display().to_string(),
        "--species".into(),
        cfg.species().to_owned(),
        "--assembly".into(),
        cfg.assembly().to_owned(),
        "--tab".into(),
        "--force_overwrite".into(),
        "--fasta".into(),
        cfg.fasta().display().to_string(),
        "--mane_select".into(),
        "--check_existing".into(),
        "--individual_zyg".into(),
        "all".into(),
        "--everything".into(),
        "--safe".into(),
        "--verbose".into(),
    ];
    let plugins = [
        dbnsfp_plugin(cfg.dataset("dbnsfp")),
        format!("AlphaMissense,file={}", d("alpha_missense")),
        format!("PrimateAI,{}", d("primate_ai")),
        format!(
            "SpliceAI,snv={},indel={}",
            d("spliceai_snv"),
            d("spliceai_indel")
        ),
        format!(
            "LoF,loftee_path:{}/loftee,gerp_file:false,conservation_file:{},human_ancestor_fa:{},splice_data_dir:{}",
            plugins_dir,
            d("loftee_conservation"),
            d("ancestral_allele"),
            d("loftee_splice_dir")
        ),
        format!("SpliceVault,files={}", d("splicevault")),
        format!("CADD,snv={},indels={}", d("cadd_snv"), d("cadd_indel")),
        format!("REVEL,file={}", d("revel")),
    ];
    for p in plugins {
        args.push("--plugin".into());
        args.push(p);
    }
    if cfg.threads() > 1 {
        args.push("--fork".into());
        args.push(cfg.threads().to_string());
    }
    args
}

fn check_exists(p: &Path, kind: DatasetKind) -> Result<(), VepError> {
    let ok = match kind {
        DatasetKind::Dir => p.is_dir(),
        DatasetKind::File => p.is_file(),
    };
    if ok {
        Ok(())
    } else {
        Err(VepError::MissingResource {
            kind: kind.as_str(),
            path: p.display().to_string(),
        })
    }
}

/// Input, cache/plugin directories and every reference dataset must be present
pub fn check_resources(cfg: &RunConfig) -> Result<(), VepError> {
    check_exists(cfg.input_vcf(), DatasetKind::File)?;
    check_exists(cfg.cache_dir(), DatasetKind::Dir)?;
    check_exists(cfg.plugins_dir(), DatasetKind::Dir)?;
    check_exists(cfg.fasta(), DatasetKind::File)?;
    for ds in DATASETS.iter() {
        check_exists(cfg.dataset(ds.id), ds.kind)?
    }
    Ok(())
}

pub fn sha1_file(p: &Path) -> io::Result<String> {
    let mut rdr = BufReader::new(File::open(p)?);
    let mut hasher = Sha1::new();
    let mut buf = vec![0u8; 1 << 20];
    loop {
        let n = rdr.read(&mut buf)?;
        if n == 0 {
            break;
        }
        hasher.update(&buf[..n]);
    }
    Ok(format!("{:x}", hasher.finalize()))
}

/// Checksum of a regular file, `None` for anything else or on error
pub fn maybe_checksum(p: &Path) -> Option<String> {
    if p.is_file() {
        sha1_file(p)
            .map_err(|e| warn!("Could not checksum {}: {}", p.display(), e))
            .ok()
    } else {
        None
    }
}

pub fn build_manifest(cfg: &RunConfig, out: &RunOutputs, args: Vec<String>) -> RunManifest {
    let mut versions = BTreeMap::new();
    versions.insert("vep_exec".to_owned(), cfg.vep_exec().to_owned());
    versions.insert(
        env!("CARGO_PKG_NAME").to_owned(),
        env!("CARGO_PKG_VERSION").to_owned(),
    );

    let mut files_checksum = BTreeMap::new();
    files_checksum.insert("reference_fasta".to_owned(), maybe_checksum(cfg.fasta()));
    for ds in DATASETS.iter().filter(|d| d.kind == DatasetKind::File) {
        files_checksum.insert(ds.id.to_owned(), maybe_checksum(cfg.dataset(ds.id)));
    }
    files_checksum.insert("input_vcf".to_owned(), maybe_checksum(cfg.input_vcf()));
    files_checksum.insert("output_tsv_gz".to_owned(), maybe_checksum(&out.annotated));

    RunManifest {
        sample: cfg.sample().to_owned(),
        input_vcf: cfg.input_vcf().display().to_string(),
        output_tsv_gz: out.annotated.display().to_string(),
        vep_exec: cfg.vep_exec().to_owned(),
        vep_cache_dir: cfg.cache_dir().display().to_string(),
        vep_plugins_dir: cfg.plugins_dir().display().to_string(),
        reference_fasta: cfg.fasta().display().to_string(),
        args,
        versions,
        files_checksum,
    }
}

fn create_log(p: &Path) -> anyhow::Result<File> {
    File::create(p).with_context(|| format!("Error creating log file {}", p.display()))
}

pub fn run(cfg: &RunConfig) -> anyhow::Result<()> {
    check_resources(cfg)?;
    fs::create_dir_all(cfg.out_dir()).with_context(|| {
        format!(
            "Error creating output directory {}",
            cfg.out_dir().display()
        )
    })?;

    let out = RunOutputs::new(cfg.out_dir(), cfg.sample());
    info!(
        "VEP run for sample {}: {} -> {}",
        cfg.sample(),
        cfg.input_vcf().display(),
        out.annotated.display()
    );
    debug!(
        "Cache: {} plugins: {}",
        cfg.cache_dir().display(),
        cfg.plugins_dir().display()
    );

    let args = vep_args(cfg, &out);
    let cmd_str = args.join(" ");
    fs::write(&out.command_log, format!("{}\n", cmd_str))
        .with_context(|| format!("Error writing {}", out.command_log.display()))?;

    if cfg.dry_run() {
        info!("Dry run: printing command and exiting");
        let stdout = io::stdout();
        let mut w = stdout.lock();
        writeln!(w, "{}", cmd_str)?;
        return Ok(());
    }

    info!("$ {}", cmd_str);
    let status = Command::new(&args[0])
        .args(&args[1..])
        .stdout(Stdio::from(create_log(&out.stdout_log)?))
        .stderr(Stdio::from(create_log(&out.stderr_log)?))
        .status()
        .with_context(|| format!("Error starting {}", args[0]))?;
    if !status.success() {
        let code = exit_code(&status);
        error!(
            "VEP exited with code {} (see {})",
            code,
            out.stderr_log.display()
        );
        return Err(VepError::StepFailed {
            step: "vep".to_owned(),
            code,
        }
        .into());
    }

    let manifest = build_manifest(cfg, &out, args);
    let w = BufWriter::new(
        File::create(&out.manifest)
            .with_context(|| format!("Error creating {}", out.manifest.display()))?,
    );
    serde_json::to_writer_pretty(w, &manifest)
        .with_context(|| format!("Error writing {}", out.manifest.display()))?;

    info!(
        "VEP finished: out {} stderr {} manifest {}",
        out.annotated.display(),
        out.stderr_log.display(),
        out.manifest.display()
    );
    Ok(())
}
