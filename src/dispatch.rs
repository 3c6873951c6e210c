// ─────────────────────────────────────────────────────────────────────────────
//  snes-ide :: dispatch  -  turn a resolved target into a process
// ─────────────────────────────────────────────────────────────────────────────

use std::ffi::{OsStr, OsString};
use std::fmt;
use std::path::{Path, PathBuf};
use std::process::Command;

use tracing::{debug, info};

use crate::emulator::EmulatorSource;
use crate::error::{LauncherError, Result};
use crate::platform::PlatformProfile;
use crate::resolver::{LauncherKind, ResolvedLauncher};

/// What the plan is going to start.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PlanTarget {
    /// A launcher file found by the generic search.
    Launcher(ResolvedLauncher),
    /// An editor CLI opening the project directory.
    Editor { name: &'static str },
    /// A native emulator binary.
    Emulator { source: EmulatorSource },
}

/// A fully resolved command line. Nothing has been spawned yet.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LaunchPlan {
    pub target:  PlanTarget,
    pub program: OsString,
    pub args:    Vec<OsString>,
    /// `program` is only the first interpreter name; nothing was found on
    /// PATH. Dry runs only, `execute` refuses such a plan.
    pub interpreter_missing: bool,
}

impl LaunchPlan {
    /// Plan for a generic launcher. `.py` files need an interpreter, which is
    /// looked up with `find_program`. With `dry_run` a missing interpreter is
    /// recorded on the plan instead of failing.
    pub fn for_launcher<F>(
        launcher:     ResolvedLauncher,
        profile:      &PlatformProfile,
        extra_args:   &[OsString],
        dry_run:      bool,
        find_program: F,
    ) -> Result<LaunchPlan>
    where
        F: Fn(&str) -> Option<PathBuf>,
    {
        let script: OsString = launcher.path.clone().into_os_string();

        let mut interpreter_missing = false;
        let (program, mut args): (OsString, Vec<OsString>) = match launcher.kind {
            LauncherKind::PythonScript => match find_interpreter(profile, &find_program) {
                Some(interpreter) => (interpreter.into_os_string(), vec![script]),
                None if dry_run => {
                    interpreter_missing = true;
                    let first = profile.interpreters.first().copied().unwrap_or("python");
                    (first.into(), vec![script])
                }
                None => return Err(missing_interpreter(&launcher.path, profile)),
            },
            LauncherKind::BatchFile => ("cmd".into(), vec!["/C".into(), script]),
            LauncherKind::Native    => (script, Vec::new()),
        };

        args.extend(extra_args.iter().cloned());
        Ok(LaunchPlan { target: PlanTarget::Launcher(launcher), program, args, interpreter_missing })
    }

    pub fn for_editor(name: &'static str, editor: &Path, project_dir: &Path) -> LaunchPlan {
        LaunchPlan {
            target:  PlanTarget::Editor { name },
            program: editor.as_os_str().to_owned(),
            args:    vec![project_dir.as_os_str().to_owned()],
            interpreter_missing: false,
        }
    }

    pub fn for_emulator(binary: &Path, source: EmulatorSource, extra_args: &[OsString]) -> LaunchPlan {
        LaunchPlan {
            target:  PlanTarget::Emulator { source },
            program: binary.as_os_str().to_owned(),
            args:    extra_args.to_vec(),
            interpreter_missing: false,
        }
    }

    /// Human readable command line, used in dry runs and error messages.
    pub fn command_line(&self) -> String {
        std::iter::once(self.program.as_os_str())
            .chain(self.args.iter().map(OsString::as_os_str))
            .map(quote)
            .collect::<Vec<_>>()
            .join(" ")
    }

    /// Spawn the plan and wait for it. Stdio is inherited.
    pub fn execute(&self) -> Result<()> {
        if self.interpreter_missing {
            if let PlanTarget::Launcher(l) = &self.target {
                return Err(LauncherError::MissingInterpreter {
                    script: l.path.clone(),
                    tried:  Vec::new(),
                });
            }
        }
        let command = self.command_line();
        info!(%command, "launching");

        let status = Command::new(&self.program)
            .args(&self.args)
            .status()
            .map_err(|source| LauncherError::Spawn { command: command.clone(), source })?;

        debug!(%command, ?status, "child exited");
        if status.success() {
            Ok(())
        } else {
            Err(LauncherError::ExitStatus { command, code: status.code() })
        }
    }
}

impl fmt::Display for LaunchPlan {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.command_line())
    }
}

fn missing_interpreter(script: &Path, profile: &PlatformProfile) -> LauncherError {
    LauncherError::MissingInterpreter {
        script: script.to_path_buf(),
        tried:  profile.interpreters.iter().map(|s| s.to_string()).collect(),
    }
}

/// First interpreter of the profile that `find_program` can locate.
pub fn find_interpreter<F>(profile: &PlatformProfile, find_program: F) -> Option<PathBuf>
where
    F: Fn(&str) -> Option<PathBuf>,
{
    profile.interpreters.iter().find_map(|name| find_program(name))
}

fn quote(s: &OsStr) -> String {
    let s = s.to_string_lossy();
    if s.is_empty() || s.contains(char::is_whitespace) {
        format!("\"{s}\"")
    } else {
        s.into_owned()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::action::Action;
    use crate::platform::Os;
    use pretty_assertions::assert_eq;

    fn launcher(path: &str, kind: LauncherKind) -> ResolvedLauncher {
        ResolvedLauncher { action: Action::Compiler, path: PathBuf::from(path), kind }
    }

    #[test]
    fn python_goes_through_first_available_interpreter() {
        let plan = LaunchPlan::for_launcher(
            launcher("/r/compiler.py", LauncherKind::PythonScript),
            Os::Linux.profile(),
            &["--fast".into()],
            false,
            |name| (name == "python").then(|| PathBuf::from("/usr/bin/python")),
        )
        .unwrap();
        assert_eq!(plan.program, OsString::from("/usr/bin/python"));
        assert_eq!(plan.args, vec![OsString::from("/r/compiler.py"), OsString::from("--fast")]);
    }

    #[test]
    fn python_without_interpreter_is_an_execution_failure() {
        let err = LaunchPlan::for_launcher(
            launcher("/r/compiler.py", LauncherKind::PythonScript),
            Os::Linux.profile(),
            &[],
            false,
            |_| None,
        )
        .unwrap_err();
        assert!(err.is_execution_failure());
        assert!(err.to_string().contains("python3, python"));
    }

    #[test]
    fn dry_run_tolerates_missing_interpreter() {
        let plan = LaunchPlan::for_launcher(
            launcher("/r/compiler.py", LauncherKind::PythonScript),
            Os::Linux.profile(),
            &[],
            true,
            |_| None,
        )
        .unwrap();
        assert!(plan.interpreter_missing);
        assert_eq!(plan.command_line(), "python3 /r/compiler.py");
        assert!(matches!(plan.execute(), Err(LauncherError::MissingInterpreter { .. })));
    }

    #[test]
    fn batch_files_go_through_cmd() {
        let plan = LaunchPlan::for_launcher(
            launcher("C:/snes/compiler.bat", LauncherKind::BatchFile),
            Os::Windows.profile(),
            &[],
            false,
            |_| None,
        )
        .unwrap();
        assert_eq!(plan.command_line(), "cmd /C C:/snes/compiler.bat");
    }

    #[test]
    fn native_launchers_run_directly() {
        let plan = LaunchPlan::for_launcher(
            launcher("/opt/snes ide/compiler.sh", LauncherKind::Native),
            Os::Linux.profile(),
            &[],
            false,
            |_| None,
        )
        .unwrap();
        assert_eq!(plan.command_line(), "\"/opt/snes ide/compiler.sh\"");
        assert!(plan.args.is_empty());
    }

    #[test]
    fn editor_opens_the_project_directory() {
        let plan = LaunchPlan::for_editor("code", Path::new("/usr/bin/code"), Path::new("/work/game"));
        assert_eq!(plan.target, PlanTarget::Editor { name: "code" });
        assert_eq!(plan.command_line(), "/usr/bin/code /work/game");
    }

    #[cfg(unix)]
    #[test]
    fn non_zero_exit_carries_code() {
        let tmp = tempfile::tempdir().unwrap();
        let script = tmp.path().join("fail.sh");
        std::fs::write(&script, "#!/bin/sh\nexit 7\n").unwrap();
        crate::resolver::ensure_executable(&script);

        let plan = LaunchPlan::for_launcher(
            launcher(script.to_str().unwrap(), LauncherKind::Native),
            Os::Linux.profile(),
            &[],
            false,
            |_| None,
        )
        .unwrap();
        match plan.execute() {
            Err(LauncherError::ExitStatus { code, .. }) => assert_eq!(code, Some(7)),
            other => panic!("expected ExitStatus, got {other:?}"),
        }
    }

    #[test]
    fn missing_program_is_a_spawn_failure() {
        let plan = LaunchPlan::for_emulator(
            Path::new("/no/such/dir/bsnes-nowhere"),
            EmulatorSource::Override,
            &[],
        );
        assert!(matches!(plan.execute(), Err(LauncherError::Spawn { .. })));
    }
}
