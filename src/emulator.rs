// ─────────────────────────────────────────────────────────────────────────────
//  snes-ide :: emulator  -  native bsnes discovery
//
//  Looks for a bsnes binary in these locations, in order:
//
//  1. SNES_IDE_BSNES_PATH      (a binary, or a directory containing one)
//  2. `bsnes` on PATH
//  3. <root>/libs/bsnes/ for every search root:
//       windows  bsnes.exe
//       macos    *.app/Contents/MacOS/* up to two levels under mac/, then
//                any executable under mac/
//       linux    any executable under linux/
//
//  Directory scans are sorted by file name so results are reproducible.
// ─────────────────────────────────────────────────────────────────────────────

use std::path::{Path, PathBuf};

use tracing::debug;
use walkdir::WalkDir;

use crate::platform::Os;

pub const BSNES: &str = "bsnes";

/// Where an emulator binary came from, for the dry-run report.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EmulatorSource {
    Override,
    SystemPath,
    Bundled,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FoundEmulator {
    pub path:   PathBuf,
    pub source: EmulatorSource,
}

pub fn find_with<F>(
    override_path: Option<&Path>,
    roots:         &[PathBuf],
    os:            Os,
    path_lookup:   F,
) -> Option<FoundEmulator>
where
    F: Fn(&str) -> Option<PathBuf>,
{
    if let Some(p) = override_path.and_then(from_override) {
        return Some(FoundEmulator { path: p, source: EmulatorSource::Override });
    }

    if let Some(p) = path_lookup(BSNES) {
        return Some(FoundEmulator { path: p, source: EmulatorSource::SystemPath });
    }

    roots
        .iter()
        .find_map(|root| in_layout(&bundle_dir(root), os))
        .map(|p| FoundEmulator { path: p, source: EmulatorSource::Bundled })
}

/// `<root>/libs/bsnes`
pub fn bundle_dir(root: &Path) -> PathBuf {
    root.join("libs").join(BSNES)
}

/// Subdirectory of `libs/bsnes` holding the build for `os`.
pub fn platform_subdir(os: Os) -> &'static str {
    match os {
        Os::Windows => "",
        Os::MacOs   => "mac",
        Os::Linux   => "linux",
    }
}

fn from_override(path: &Path) -> Option<PathBuf> {
    if path.is_dir() {
        let mut children: Vec<PathBuf> = std::fs::read_dir(path)
            .ok()?
            .flatten()
            .map(|e| e.path())
            .collect();
        children.sort();
        return children.into_iter().find(|c| is_executable_file(c));
    }
    if is_executable_file(path) {
        return Some(path.to_path_buf());
    }
    debug!(path = %path.display(), "emulator override is not an executable file");
    None
}

/// Platform-specific lookup inside one `libs/bsnes` directory.
pub fn in_layout(base: &Path, os: Os) -> Option<PathBuf> {
    match os {
        Os::Windows => {
            let exe = base.join("bsnes.exe");
            exe.is_file().then_some(exe)
        }
        Os::MacOs => {
            let mac = base.join(platform_subdir(os));
            if !mac.is_dir() {
                return None;
            }
            app_bundle_executable(&mac).or_else(|| first_executable_below(&mac))
        }
        Os::Linux => {
            let linux = base.join(platform_subdir(os));
            if !linux.is_dir() {
                return None;
            }
            first_executable_below(&linux)
        }
    }
}

/// `<dir>/[<folder>/]*.app/Contents/MacOS/<first executable>`
fn app_bundle_executable(dir: &Path) -> Option<PathBuf> {
    let apps = WalkDir::new(dir)
        .min_depth(1)
        .max_depth(2)
        .sort_by_file_name()
        .into_iter()
        .flatten()
        .filter(|e| e.file_type().is_dir())
        .map(|e| e.into_path())
        .filter(|p| p.extension().is_some_and(|e| e == "app"));

    apps.into_iter().find_map(|app| {
        let macos = app.join("Contents").join("MacOS");
        let mut bins: Vec<PathBuf> = std::fs::read_dir(&macos)
            .ok()?
            .flatten()
            .map(|e| e.path())
            .collect();
        bins.sort();
        bins.into_iter().find(|b| is_executable_file(b))
    })
}

fn first_executable_below(dir: &Path) -> Option<PathBuf> {
    WalkDir::new(dir)
        .sort_by_file_name()
        .into_iter()
        .flatten()
        .map(|e| e.into_path())
        .find(|p| is_executable_file(p))
}

#[cfg(unix)]
pub fn is_executable_file(path: &Path) -> bool {
    use std::os::unix::fs::PermissionsExt;
    std::fs::metadata(path)
        .map(|m| m.is_file() && m.permissions().mode() & 0o111 != 0)
        .unwrap_or(false)
}

#[cfg(not(unix))]
pub fn is_executable_file(path: &Path) -> bool {
    path.is_file()
}
