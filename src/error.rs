use std::process::ExitCode;

use thiserror::Error;

/// Failures whose identity or exit code matters to the caller.  Everything else travels as a
/// plain `anyhow::Error` and exits with code 1.
#[derive(Debug, Error)]
pub enum VepError {
    #[error("Missing column '{column}' in {path}")]
    MissingColumn { column: String, path: String },

    #[error("Missing required {kind}: {path}")]
    MissingResource { kind: &'static str, path: String },

    #[error("Missing required command in PATH: {0}")]
    MissingCommand(String),

    #[error("Step '{step}' failed with exit code {code}")]
    StepFailed { step: String, code: i32 },
}

impl VepError {
    pub fn missing_column<S: Into<String>, P: Into<String>>(column: S, path: P) -> Self {
        Self::MissingColumn {
            column: column.into(),
            path: path.into(),
        }
    }

    pub fn exit_code(&self) -> i32 {
        match self {
            Self::MissingColumn { .. } => 1,
            Self::MissingResource { .. } => 2,
            Self::MissingCommand(_) => 127,
            Self::StepFailed { code, .. } => *code,
        }
    }
}

/// Exit code for an error chain: the first `VepError` found decides, otherwise 1
pub fn error_exit_code(e: &anyhow::Error) -> i32 {
    e.chain()
        .find_map(|c| c.downcast_ref::<VepError>())
        .map(|v| v.exit_code())
        .unwrap_or(1)
}

/// Report the outcome of a tool run and turn it into the process exit status
pub fn finish(res: anyhow::Result<()>) -> ExitCode {
    match res {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!("{:#}", e);
            let code = error_exit_code(&e);
            ExitCode::from(u8::try_from(code).unwrap_or(1))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use anyhow::Context;

    #[test]
    fn exit_codes_follow_error_kind() {
        let e: anyhow::Error = VepError::MissingCommand("vep-overview".into()).into();
        assert_eq!(error_exit_code(&e), 127);

        let e = Err::<(), _>(VepError::StepFailed {
            step: "merge".into(),
            code: 3,
        })
        .context("Pipeline aborted")
        .unwrap_err();
        assert_eq!(error_exit_code(&e), 3);

        let e = anyhow!("something else");
        assert_eq!(error_exit_code(&e), 1);
    }

    #[test]
    fn missing_column_message() {
        let e = VepError::missing_column("Consequence", "in.tsv");
        assert_eq!(e.to_string(), "Missing column 'Consequence' in in.tsv");
        assert_eq!(e.exit_code(), 1);
    }
}
