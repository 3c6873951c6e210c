// ─────────────────────────────────────────────────────────────────────────────
//  snes-ide :: error
// ─────────────────────────────────────────────────────────────────────────────

use std::fmt::Write as _;
use std::path::PathBuf;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum LauncherError {
    #[error("Unknown option '{0}' (expected 0-6 or an action name, see `snes-ide --list`)")]
    UnknownAction(String),

    #[error("No suitable launcher found for '{action}' on {platform}; tried:{}", list_paths(.tried))]
    LauncherNotFound {
        action:   String,
        platform: String,
        tried:    Vec<PathBuf>,
    },

    #[error("Failed to start `{command}`: {source}")]
    Spawn {
        command: String,
        #[source]
        source:  std::io::Error,
    },

    #[error("No Python interpreter found to run {} (looked for: {})", .script.display(), .tried.join(", "))]
    MissingInterpreter {
        script: PathBuf,
        tried:  Vec<String>,
    },

    #[error("`{command}` exited with {}", describe_code(.code))]
    ExitStatus {
        command: String,
        code:    Option<i32>,
    },

    #[error("No option selected (input closed)")]
    NoSelection,

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl LauncherError {
    /// True when nothing was found, as opposed to something found that failed to run.
    pub fn is_resolution_failure(&self) -> bool {
        matches!(self, LauncherError::LauncherNotFound { .. } | LauncherError::UnknownAction(_))
    }

    pub fn is_execution_failure(&self) -> bool {
        matches!(
            self,
            LauncherError::Spawn { .. }
                | LauncherError::MissingInterpreter { .. }
                | LauncherError::ExitStatus { .. }
        )
    }
}

fn list_paths(paths: &[PathBuf]) -> String {
    let mut out = String::new();
    for p in paths {
        let _ = write!(out, "\n    {}", p.display());
    }
    out
}

fn describe_code(code: &Option<i32>) -> String {
    match code {
        Some(c) => format!("exit code {c}"),
        None    => "no exit code (terminated by signal)".into(),
    }
}

pub type Result<T> = std::result::Result<T, LauncherError>;

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn not_found_lists_every_path_on_its_own_line() {
        let err = LauncherError::LauncherNotFound {
            action:   "compiler".into(),
            platform: "linux".into(),
            tried:    vec![PathBuf::from("/a/compiler.sh"), PathBuf::from("/a/compiler")],
        };
        assert_eq!(
            err.to_string(),
            "No suitable launcher found for 'compiler' on linux; tried:\n    /a/compiler.sh\n    /a/compiler"
        );
        assert!(err.is_resolution_failure());
        assert!(!err.is_execution_failure());
    }

    #[test]
    fn exit_status_reports_code_or_signal() {
        let err = LauncherError::ExitStatus { command: "emulator.sh".into(), code: Some(3) };
        assert_eq!(err.to_string(), "`emulator.sh` exited with exit code 3");
        assert!(err.is_execution_failure());

        let err = LauncherError::ExitStatus { command: "x".into(), code: None };
        assert!(err.to_string().contains("signal"));
    }
}
