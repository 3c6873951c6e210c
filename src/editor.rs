// ─────────────────────────────────────────────────────────────────────────────
//  snes-ide :: editor  -  code editor detection
// ─────────────────────────────────────────────────────────────────────────────

use std::path::PathBuf;

use tracing::debug;

use crate::capability::EditorCli;

/// Editor launchers in preference order. GUI editors first, then the macOS
/// `open` fallback, then terminal editors.
pub const EDITOR_PREFERENCE: &[&str] = &["code", "subl", "mate", "open", "nano", "vi"];

/// First preferred editor found on PATH.
pub fn detect() -> Option<EditorCli> {
    detect_with(|name| which::which(name).ok())
}

/// Same as [`detect`] with an injectable PATH lookup.
pub fn detect_with<F>(lookup: F) -> Option<EditorCli>
where
    F: Fn(&str) -> Option<PathBuf>,
{
    for &name in EDITOR_PREFERENCE {
        if let Some(path) = lookup(name) {
            debug!(editor = name, path = %path.display(), "editor detected");
            return Some(EditorCli { name, path });
        }
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn picks_highest_preference_present() {
        let found = detect_with(|name| match name {
            "vi" | "subl" => Some(PathBuf::from(format!("/usr/bin/{name}"))),
            _ => None,
        });
        assert_eq!(
            found,
            Some(EditorCli { name: "subl", path: PathBuf::from("/usr/bin/subl") })
        );
    }

    #[test]
    fn none_when_path_is_empty() {
        assert_eq!(detect_with(|_| None), None);
    }
}
