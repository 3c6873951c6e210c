// ─────────────────────────────────────────────────────────────────────────────
//  snes-ide :: toolchain  -  expected devkitsnes binaries
//
//  Layout inside the bundle (names carry `.exe` only on Windows):
//
//    libs/pvsneslib/devkitsnes/bin/816-tcc
//    libs/pvsneslib/devkitsnes/bin/wla-65816
//    libs/pvsneslib/devkitsnes/bin/wlalink
//    libs/pvsneslib/devkitsnes/tools/816-opt
//    libs/pvsneslib/devkitsnes/tools/constify
// ─────────────────────────────────────────────────────────────────────────────

use std::path::{Path, PathBuf};

use crate::platform::PlatformProfile;

/// (subdirectory of devkitsnes, Windows file name)
pub const DEVKIT_BINARIES: &[(&str, &str)] = &[
    ("bin",   "816-tcc.exe"),
    ("bin",   "wla-65816.exe"),
    ("bin",   "wlalink.exe"),
    ("tools", "816-opt.exe"),
    ("tools", "constify.exe"),
];

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ToolStatus {
    pub path:    PathBuf,
    pub present: bool,
}

/// `<libs>/pvsneslib/devkitsnes`
pub fn devkit_dir(libs_dir: &Path) -> PathBuf {
    libs_dir.join("pvsneslib").join("devkitsnes")
}

/// Every expected toolchain binary for this platform, with presence flags.
pub fn inspect(libs_dir: &Path, profile: &PlatformProfile) -> Vec<ToolStatus> {
    let devkit = devkit_dir(libs_dir);
    DEVKIT_BINARIES
        .iter()
        .map(|(sub, name)| {
            let path = profile.bin_path(&devkit.join(sub), name);
            let present = path.is_file();
            ToolStatus { path, present }
        })
        .collect()
}

pub fn missing(libs_dir: &Path, profile: &PlatformProfile) -> Vec<PathBuf> {
    inspect(libs_dir, profile)
        .into_iter()
        .filter(|s| !s.present)
        .map(|s| s.path)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::platform::Os;
    use pretty_assertions::assert_eq;

    #[test]
    fn posix_names_have_no_exe_suffix() {
        let tmp = tempfile::tempdir().unwrap();
        let bin = devkit_dir(tmp.path()).join("bin");
        std::fs::create_dir_all(&bin).unwrap();
        std::fs::write(bin.join("816-tcc"), b"").unwrap();

        let missing = missing(tmp.path(), Os::Linux.profile());
        assert_eq!(missing.len(), 4);
        assert!(!missing.contains(&bin.join("816-tcc")));
        assert!(missing.contains(&devkit_dir(tmp.path()).join("tools").join("constify")));
    }

    #[test]
    fn windows_expects_exe_files() {
        let tmp = tempfile::tempdir().unwrap();
        let status = inspect(tmp.path(), Os::Windows.profile());
        assert!(status.iter().all(|s| s.path.extension().is_some_and(|e| e == "exe")));
        assert!(status.iter().all(|s| !s.present));
    }
}
