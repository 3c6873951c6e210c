// ─────────────────────────────────────────────────────────────────────────────
//  snes-ide :: resolver  -  action → launcher file
//
//  Walks roots × extensions in order and returns the first candidate that is
//  an existing regular file. The search never depends on directory iteration
//  order, so the same tree always yields the same launcher.
// ─────────────────────────────────────────────────────────────────────────────

use std::path::{Path, PathBuf};

use tracing::debug;

use crate::action::Action;
use crate::error::{LauncherError, Result};
use crate::platform::PlatformProfile;

/// Everything a resolution depends on. Built once, never mutated.
#[derive(Debug, Clone)]
pub struct ResolutionRequest {
    pub action:  Action,
    pub profile: &'static PlatformProfile,
    pub roots:   Vec<PathBuf>,
}

/// How a resolved launcher has to be started.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LauncherKind {
    /// `.py`, run through an interpreter.
    PythonScript,
    /// `.bat` on Windows, run through the command shell.
    BatchFile,
    /// `.sh`, `.exe` or an extensionless executable, run directly.
    Native,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedLauncher {
    pub action: Action,
    pub path:   PathBuf,
    pub kind:   LauncherKind,
}

impl ResolutionRequest {
    pub fn new(action: Action, profile: &'static PlatformProfile, roots: Vec<PathBuf>) -> Self {
        Self { action, profile, roots }
    }

    /// Every candidate in search order: one per (root, extension).
    pub fn candidates(&self) -> Vec<PathBuf> {
        let base = self.action.base_name();
        self.roots
            .iter()
            .flat_map(|root| {
                self.profile
                    .extensions
                    .iter()
                    .map(move |ext| self.profile.candidate(root, base, ext))
            })
            .collect()
    }
}

/// Resolve the launcher for `req`.
///
/// POSIX shell scripts and bare executables come back with their exec bit
/// set (best-effort).
pub fn resolve(req: &ResolutionRequest) -> Result<ResolvedLauncher> {
    let found = first_existing(req.roots.iter().map(PathBuf::as_path), req.action.base_name(), req.profile);

    match found {
        Some(path) => {
            debug!(action = %req.action, path = %path.display(), "launcher resolved");
            if req.profile.wants_exec_bit(&path) {
                ensure_executable(&path);
            }
            let kind = classify(&path, req.profile);
            Ok(ResolvedLauncher { action: req.action, path, kind })
        }
        None => Err(LauncherError::LauncherNotFound {
            action:   req.action.base_name().to_owned(),
            platform: req.profile.os.name().to_owned(),
            tried:    req.candidates(),
        }),
    }
}

/// First `root/<base><ext>` that is a regular file, roots outermost.
pub fn first_existing<'a, I>(roots: I, base: &str, profile: &PlatformProfile) -> Option<PathBuf>
where
    I: IntoIterator<Item = &'a Path>,
{
    for root in roots {
        for ext in profile.extensions {
            let candidate = profile.candidate(root, base, ext);
            if candidate.is_file() {
                return Some(candidate);
            }
        }
    }
    None
}

pub fn classify(path: &Path, profile: &PlatformProfile) -> LauncherKind {
    let ext = path
        .extension()
        .and_then(|e| e.to_str())
        .map(str::to_ascii_lowercase);

    match ext.as_deref() {
        Some("py")                              => LauncherKind::PythonScript,
        Some("bat") | Some("cmd") if profile.os.is_windows() => LauncherKind::BatchFile,
        _                                       => LauncherKind::Native,
    }
}

/// Add the exec bits to `path` if none are set. Failures are logged and
/// otherwise ignored; the spawn that follows reports the real problem.
#[cfg(unix)]
pub fn ensure_executable(path: &Path) {
    use std::os::unix::fs::PermissionsExt;

    let meta = match std::fs::metadata(path) {
        Ok(m)  => m,
        Err(e) => {
            debug!(path = %path.display(), error = %e, "cannot stat launcher");
            return;
        }
    };
    let mode = meta.permissions().mode();
    if mode & 0o111 == 0o111 {
        return;
    }
    let perms = std::fs::Permissions::from_mode(mode | 0o111);
    if let Err(e) = std::fs::set_permissions(path, perms) {
        debug!(path = %path.display(), error = %e, "could not set exec bit");
    }
}

#[cfg(not(unix))]
pub fn ensure_executable(_path: &Path) {}
