use std::{
    env,
    ffi::{OsStr, OsString},
    fs,
    path::{Path, PathBuf},
    process::{Command, ExitStatus},
    time::{Duration, Instant},
};

use anyhow::Context;

use crate::{config::PipelineConfig, error::VepError};

pub const FILTER_CMD: &str = "vep-filter-consequence-mane";
pub const NORMALISE_CMD: &str = "vep-normalise-columns";
pub const MERGE_CMD: &str = "vep-merge-gnomad-constraint";
pub const OVERVIEW_CMD: &str = "vep-overview";

/// One tool invocation of the pipeline
#[derive(Debug, Clone)]
pub struct Step {
    title: &'static str,
    program: &'static str,
    args: Vec<OsString>,
}

impl Step {
    fn new(title: &'static str, program: &'static str) -> Self {
        Self {
            title,
            program,
            args: Vec::new(),
        }
    }

    fn arg<S: AsRef<OsStr>>(mut self, a: S) -> Self {
        self.args.push(a.as_ref().to_owned());
        self
    }

    fn opt<S: AsRef<OsStr>>(self, name: &str, val: S) -> Self {
        self.arg(name).arg(val)
    }

    fn flag(self, name: &str, set: bool) -> Self {
        if set {
            self.arg(name)
        } else {
            self
        }
    }

    #[inline]
    pub fn title(&self) -> &str {
        self.title
    }

    #[inline]
    pub fn program(&self) -> &str {
        self.program
    }

    #[inline]
    pub fn args(&self) -> &[OsString] {
        &self.args
    }

    pub fn command_line(&self) -> String {
        let mut s = self.program.to_owned();
        for a in self.args.iter() {
            s.push(' ');
            s.push_str(&a.to_string_lossy());
        }
        s
    }
}

/// Intermediate and final files written under the output directory
pub fn output_paths(cfg: &PipelineConfig) -> [PathBuf; 3] {
    let ext = if cfg.gzip_out() { "tsv.gz" } else { "tsv" };
    let f = |name: &str| cfg.out_dir().join(format!("{}.{}", name, ext));
    [f("filtered"), f("normalised"), f("merged")]
}

/// The fixed sequence filter -> normalise -> merge -> [overview]
pub fn plan(cfg: &PipelineConfig) -> Vec<Step> {
    let [filtered, normalised, merged] = output_paths(cfg);
    let level = cfg.log_level().to_string();

    let mut steps = vec![
        Step::new("filter", FILTER_CMD)
            .opt("--loglevel", &level)
            .opt("--in-tsv", cfg.in_tsv())
            .opt("--out-tsv", &filtered)
            .opt("--keep-consequence", cfg.keep_consequence())
            .flag("--require-canonical", cfg.require_canonical())
            .flag("--require-mane", cfg.require_mane()),
        Step::new("normalise", NORMALISE_CMD)
            .opt("--loglevel", &level)
            .opt("--in-tsv", &filtered)
            .opt("--out-tsv", &normalised)
            .opt("--vep-cache-version", cfg.vep_cache_version())
            .opt("--plugins-version", cfg.plugins_version()),
    ];

    let mut merge = Step::new("merge", MERGE_CMD)
        .opt("--loglevel", &level)
        .opt("--in-tsv", &normalised)
        .opt("--constraint-tsv", cfg.constraint_tsv())
        .opt("--out-tsv", &merged)
        .opt("--on", cfg.join_key().to_string())
        .opt("--how", cfg.join_mode().to_string());
    if let Some(v) = cfg.constraint_version() {
        merge = merge.opt("--constraint-version", v)
    }
    steps.push(merge);

    if !cfg.skip_overview() {
        steps.push(
            Step::new("overview", OVERVIEW_CMD)
                .opt("--loglevel", &level)
                .opt("--in-tsv", &merged),
        )
    }
    steps
}

#[cfg(unix)]
fn is_executable(p: &Path) -> bool {
    use std::os::unix::fs::PermissionsExt;
    p.metadata()
        .map(|m| m.is_file() && m.permissions().mode() & 0o111 != 0)
        .unwrap_or(false)
}

#[cfg(not(unix))]
fn is_executable(p: &Path) -> bool {
    p.is_file()
}

fn exe_name(name: &str) -> String {
    format!("{}{}", name, env::consts::EXE_SUFFIX)
}

/// Search a PATH style list of directories for an executable
pub fn find_in_path(name: &str, path_var: &OsStr) -> Option<PathBuf> {
    env::split_paths(path_var)
        .map(|d| d.join(exe_name(name)))
        .find(|p| is_executable(p))
}

/// Locate a pipeline tool: next to the running executable first, then on PATH
pub fn resolve_program(name: &str) -> Option<PathBuf> {
    env::current_exe()
        .ok()
        .and_then(|p| p.parent().map(|d| d.join(exe_name(name))))
        .filter(|p| is_executable(p))
        .or_else(|| env::var_os("PATH").and_then(|pv| find_in_path(name, &pv)))
}

/// Exit code of a finished child; death by signal maps to 128 + signal as a shell would
pub fn exit_code(status: &ExitStatus) -> i32 {
    if let Some(c) = status.code() {
        return c;
    }
    #[cfg(unix)]
    {
        use std::os::unix::process::ExitStatusExt;
        if let Some(sig) = status.signal() {
            return 128 + sig;
        }
    }
    1
}

fn run_step(step: &Step, program: &Path) -> anyhow::Result<Duration> {
    info!("$ {}", step.command_line());
    let t0 = Instant::now();
    let status = Command::new(program)
        .args(step.args())
        .status()
        .with_context(|| format!("Error starting {}", program.display()))?;
    if !status.success() {
        let code = exit_code(&status);
        error!("Step failed ({}) with exit code {}", step.title(), code);
        return Err(VepError::StepFailed {
            step: step.title().to_owned(),
            code,
        }
        .into());
    }
    let dt = t0.elapsed();
    info!("Finished {} ({:.2}s)", step.title(), dt.as_secs_f64());
    Ok(dt)
}

pub fn run(cfg: &PipelineConfig) -> anyhow::Result<()> {
    let steps = plan(cfg);

    // Check that every tool is available before touching the filesystem
    let mut programs = Vec::with_capacity(steps.len());
    for s in steps.iter() {
        let p = resolve_program(s.program())
            .ok_or_else(|| VepError::MissingCommand(s.program().to_owned()))?;
        debug!("Using {} for {}", p.display(), s.title());
        programs.push(p);
    }

    fs::create_dir_all(cfg.out_dir()).with_context(|| {
        format!(
            "Error creating output directory {}",
            cfg.out_dir().display()
        )
    })?;

    info!(
        "Pipeline in: {} constraint: {} out dir: {}",
        cfg.in_tsv().display(),
        cfg.constraint_tsv().display(),
        cfg.out_dir().display()
    );

    let mut total = Duration::ZERO;
    for (s, p) in steps.iter().zip(programs.iter()) {
        total += run_step(s, p)?;
    }

    let [filtered, normalised, merged] = output_paths(cfg);
    info!(
        "Pipeline complete -> {} (filtered: {}, normalised: {}; elapsed ~{:.2}s)",
        merged.display(),
        filtered.display(),
        normalised.display(),
        total.as_secs_f64()
    );
    Ok(())
}
