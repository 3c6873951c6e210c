// ─────────────────────────────────────────────────────────────────────────────
//  snes-ide :: roots  -  ordered search roots
//
//  1. SNESIDE_ROOT                 (explicit override, only if set)
//  2. ~/Desktop/snes-ide           (default installation)
//  3. <bundle>                     (directory holding the running executable)
//  4. <bundle>/tools
//  5. <bundle>/src/tools           (running from a source checkout)
// ─────────────────────────────────────────────────────────────────────────────

use std::path::{Path, PathBuf};

/// Directory name of the default desktop installation.
pub const DESKTOP_INSTALL: &str = "snes-ide";

/// Build the root list. Roots that do not exist are kept: they still count as
/// searched locations. Exact duplicates are dropped, first occurrence wins.
pub fn search_roots(
    explicit: Option<&Path>,
    home:     Option<&Path>,
    bundle:   &Path,
) -> Vec<PathBuf> {
    let mut roots = Vec::new();

    if let Some(root) = explicit {
        roots.push(root.to_path_buf());
    }
    if let Some(home) = home {
        roots.push(desktop_install(home));
    }
    roots.push(bundle.to_path_buf());
    roots.push(bundle.join("tools"));
    roots.push(bundle.join("src").join("tools"));

    let mut unique: Vec<PathBuf> = Vec::with_capacity(roots.len());
    for r in roots {
        if !unique.contains(&r) {
            unique.push(r);
        }
    }
    unique
}

pub fn desktop_install(home: &Path) -> PathBuf {
    home.join("Desktop").join(DESKTOP_INSTALL)
}

/// The bundle root: the directory of the running executable. When that
/// directory is itself `tools/` (a launcher copied next to its siblings) the
/// parent is used instead.
pub fn bundle_root() -> PathBuf {
    let exe_dir = std::env::current_exe()
        .ok()
        .and_then(|p| p.parent().map(Path::to_path_buf))
        .unwrap_or_else(|| PathBuf::from("."));

    match exe_dir.file_name().and_then(|n| n.to_str()) {
        Some("tools") => exe_dir.parent().map(Path::to_path_buf).unwrap_or(exe_dir),
        _ => exe_dir,
    }
}

pub fn home_dir() -> Option<PathBuf> {
    dirs::home_dir()
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn full_order_with_override() {
        let roots = search_roots(
            Some(Path::new("/custom")),
            Some(Path::new("/home/u")),
            Path::new("/opt/snes-ide"),
        );
        assert_eq!(
            roots,
            vec![
                PathBuf::from("/custom"),
                PathBuf::from("/home/u/Desktop/snes-ide"),
                PathBuf::from("/opt/snes-ide"),
                PathBuf::from("/opt/snes-ide/tools"),
                PathBuf::from("/opt/snes-ide/src/tools"),
            ]
        );
    }

    #[test]
    fn override_equal_to_bundle_is_not_repeated() {
        let roots = search_roots(Some(Path::new("/b")), None, Path::new("/b"));
        assert_eq!(
            roots,
            vec![PathBuf::from("/b"), PathBuf::from("/b/tools"), PathBuf::from("/b/src/tools")]
        );
    }
}
