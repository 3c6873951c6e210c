// ─────────────────────────────────────────────────────────────────────────────
//  snes-ide :: launcher  -  action → launch plan
//
//  Generic actions go straight to the resolver. Two actions try something
//  better first and fall back to the resolver when that fails:
//
//    text-editor  an editor CLI found on PATH, opened on the project dir
//    emulator     SNES_IDE_BSNES_PATH, then a launcher inside SNESIDE_ROOT,
//                 then `bsnes` on PATH, then the bundled libs/bsnes layout
// ─────────────────────────────────────────────────────────────────────────────

use std::ffi::OsString;
use std::path::{Path, PathBuf};

use tracing::debug;

use crate::action::Action;
use crate::capability::Capabilities;
use crate::dispatch::LaunchPlan;
use crate::emulator::{self, EmulatorSource};
use crate::error::Result;
use crate::platform::PlatformProfile;
use crate::resolver::{self, ResolutionRequest};

/// One launch, fully described up front.
#[derive(Debug, Clone)]
pub struct LaunchRequest {
    pub action:            Action,
    pub profile:           &'static PlatformProfile,
    pub roots:             Vec<PathBuf>,
    /// SNESIDE_ROOT, if set. Also the first entry of `roots`.
    pub explicit_root:     Option<PathBuf>,
    pub emulator_override: Option<PathBuf>,
    pub project_dir:       PathBuf,
    /// Forwarded to the launched script or binary.
    pub extra_args:        Vec<OsString>,
    /// Plan only; a missing interpreter is reported, not fatal.
    pub dry_run:           bool,
}

impl LaunchRequest {
    pub fn resolution(&self) -> ResolutionRequest {
        ResolutionRequest::new(self.action, self.profile, self.roots.clone())
    }
}

/// Build the plan for `req`, using PATH for program lookups.
pub fn plan(req: &LaunchRequest, caps: &Capabilities) -> Result<LaunchPlan> {
    plan_with(req, caps, |name| which::which(name).ok())
}

pub fn plan_with<F>(req: &LaunchRequest, caps: &Capabilities, find_program: F) -> Result<LaunchPlan>
where
    F: Fn(&str) -> Option<PathBuf>,
{
    match req.action {
        Action::TextEditor => {
            if let Some(editor) = caps.editor.as_option() {
                return Ok(LaunchPlan::for_editor(editor.name, &editor.path, &req.project_dir));
            }
            debug!("no editor CLI available, falling back to launcher search");
        }
        Action::Emulator => {
            if let Some(plan) = native_emulator(req, &find_program)? {
                return Ok(plan);
            }
            debug!("no native emulator found, falling back to launcher search");
        }
        _ => {}
    }

    let launcher = resolver::resolve(&req.resolution())?;
    LaunchPlan::for_launcher(launcher, req.profile, &req.extra_args, req.dry_run, find_program)
}

fn native_emulator<F>(req: &LaunchRequest, find_program: &F) -> Result<Option<LaunchPlan>>
where
    F: Fn(&str) -> Option<PathBuf>,
{
    let os = req.profile.os;

    if let Some(p) = req.emulator_override.as_deref() {
        if let Some(found) = emulator::find_with(Some(p), &[], os, |_| None) {
            return Ok(Some(LaunchPlan::for_emulator(&found.path, found.source, &req.extra_args)));
        }
    }

    // A launcher inside the explicit root is the user's choice and beats
    // anything installed system-wide.
    if let Some(root) = req.explicit_root.as_deref() {
        if resolver::first_existing([root], req.action.base_name(), req.profile).is_some() {
            let scoped = ResolutionRequest::new(req.action, req.profile, vec![root.to_path_buf()]);
            let launcher = resolver::resolve(&scoped)?;
            return LaunchPlan::for_launcher(launcher, req.profile, &req.extra_args, req.dry_run, find_program)
                .map(Some);
        }
    }

    let found = emulator::find_with(None, &req.roots, os, |name| find_program(name));
    Ok(found.map(|f| LaunchPlan::for_emulator(&f.path, f.source, &req.extra_args)))
}

/// Project directory handed to editors: the explicit one, else the cwd.
pub fn project_dir(explicit: Option<&Path>) -> PathBuf {
    explicit
        .map(Path::to_path_buf)
        .or_else(|| std::env::current_dir().ok())
        .unwrap_or_else(|| PathBuf::from("."))
}

/// Short description of where a plan's program came from.
pub fn describe_source(plan: &LaunchPlan) -> String {
    use crate::dispatch::PlanTarget;
    match &plan.target {
        PlanTarget::Launcher(l)     => format!("launcher {}", l.path.display()),
        PlanTarget::Editor { name } => format!("editor `{name}`"),
        PlanTarget::Emulator { source } => match source {
            EmulatorSource::Override   => "emulator (SNES_IDE_BSNES_PATH)".into(),
            EmulatorSource::SystemPath => "emulator (PATH)".into(),
            EmulatorSource::Bundled    => "emulator (bundled)".into(),
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::capability::{Capability, EditorCli};
    use crate::dispatch::PlanTarget;
    use crate::error::LauncherError;
    use crate::platform::Os;
    use crate::resolver::LauncherKind;
    use pretty_assertions::assert_eq;
    use std::fs;

    fn touch(path: &Path) {
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(path, "#!/bin/sh\n").unwrap();
        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            fs::set_permissions(path, fs::Permissions::from_mode(0o755)).unwrap();
        }
    }

    fn request(action: Action, roots: Vec<PathBuf>, explicit: Option<PathBuf>) -> LaunchRequest {
        LaunchRequest {
            action,
            profile: Os::Linux.profile(),
            roots,
            explicit_root: explicit,
            emulator_override: None,
            project_dir: PathBuf::from("/work/game"),
            extra_args: Vec::new(),
            dry_run: false,
        }
    }

    fn on_path(name: &str) -> Option<PathBuf> {
        Some(PathBuf::from(format!("/usr/bin/{name}")))
    }

    #[test]
    fn editor_capability_short_circuits_search() {
        let mut caps = Capabilities::none();
        caps.editor = Capability::Available(EditorCli { name: "code", path: PathBuf::from("/usr/bin/code") });

        let plan = plan_with(&request(Action::TextEditor, vec![], None), &caps, |_| None).unwrap();
        assert_eq!(plan.target, PlanTarget::Editor { name: "code" });
        assert_eq!(plan.args, vec![OsString::from("/work/game")]);
    }

    #[test]
    fn editor_falls_back_to_launcher() {
        let tmp = tempfile::tempdir().unwrap();
        touch(&tmp.path().join("text-editor.sh"));

        let req = request(Action::TextEditor, vec![tmp.path().to_path_buf()], None);
        let plan = plan_with(&req, &Capabilities::none(), |_| None).unwrap();
        match plan.target {
            PlanTarget::Launcher(l) => assert_eq!(l.path, tmp.path().join("text-editor.sh")),
            other => panic!("unexpected target {other:?}"),
        }
    }

    #[test]
    fn explicit_root_emulator_beats_path_bsnes() {
        let custom = tempfile::tempdir().unwrap();
        let installed = tempfile::tempdir().unwrap();
        touch(&custom.path().join("emulator"));
        touch(&installed.path().join("emulator.sh"));

        let req = request(
            Action::Emulator,
            vec![custom.path().to_path_buf(), installed.path().to_path_buf()],
            Some(custom.path().to_path_buf()),
        );
        let plan = plan_with(&req, &Capabilities::none(), on_path).unwrap();
        match plan.target {
            PlanTarget::Launcher(l) => {
                assert_eq!(l.path, custom.path().join("emulator"));
                assert_eq!(l.kind, LauncherKind::Native);
            }
            other => panic!("unexpected target {other:?}"),
        }
    }

    #[test]
    fn path_bsnes_used_without_explicit_root() {
        let installed = tempfile::tempdir().unwrap();
        touch(&installed.path().join("emulator.sh"));

        let req = request(Action::Emulator, vec![installed.path().to_path_buf()], None);
        let plan = plan_with(&req, &Capabilities::none(), on_path).unwrap();
        assert_eq!(plan.target, PlanTarget::Emulator { source: EmulatorSource::SystemPath });
        assert_eq!(plan.program, OsString::from("/usr/bin/bsnes"));
    }

    #[test]
    fn emulator_falls_back_to_generic_search() {
        let installed = tempfile::tempdir().unwrap();
        touch(&installed.path().join("emulator.sh"));

        let req = request(Action::Emulator, vec![installed.path().to_path_buf()], None);
        let plan = plan_with(&req, &Capabilities::none(), |_| None).unwrap();
        assert!(matches!(plan.target, PlanTarget::Launcher(_)));
    }

    #[test]
    fn dry_run_resolves_python_launcher_without_interpreter() {
        let tmp = tempfile::tempdir().unwrap();
        fs::write(tmp.path().join("compiler.py"), "print('build')\n").unwrap();

        let mut req = request(Action::Compiler, vec![tmp.path().to_path_buf()], None);
        let err = plan_with(&req, &Capabilities::none(), |_| None).unwrap_err();
        assert!(matches!(err, LauncherError::MissingInterpreter { .. }));

        req.dry_run = true;
        let plan = plan_with(&req, &Capabilities::none(), |_| None).unwrap();
        assert!(plan.interpreter_missing);
        match plan.target {
            PlanTarget::Launcher(l) => assert_eq!(l.path, tmp.path().join("compiler.py")),
            other => panic!("unexpected target {other:?}"),
        }
    }

    #[test]
    fn nothing_anywhere_is_a_resolution_failure() {
        let empty = tempfile::tempdir().unwrap();
        let req = request(Action::Compiler, vec![empty.path().to_path_buf()], None);
        let err = plan_with(&req, &Capabilities::none(), |_| None).unwrap_err();
        assert!(matches!(err, LauncherError::LauncherNotFound { .. }));
    }
}
