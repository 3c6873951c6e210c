// ─────────────────────────────────────────────────────────────────────────────
//  snes-ide :: capability  -  host features probed once per process
// ─────────────────────────────────────────────────────────────────────────────

use std::io::IsTerminal;
use std::path::PathBuf;

use crate::editor;

/// Result of a one-off probe.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Capability<T> {
    Available(T),
    Unavailable,
}

impl<T> Capability<T> {
    pub fn from_option(value: Option<T>) -> Self {
        match value {
            Some(v) => Capability::Available(v),
            None    => Capability::Unavailable,
        }
    }

    pub fn as_option(&self) -> Option<&T> {
        match self {
            Capability::Available(v) => Some(v),
            Capability::Unavailable  => None,
        }
    }

    pub fn is_available(&self) -> bool {
        matches!(self, Capability::Available(_))
    }
}

/// A detected editor command line launcher.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EditorCli {
    /// Name it was found under (`code`, `subl`, ...).
    pub name: &'static str,
    pub path: PathBuf,
}

#[derive(Debug, Clone)]
pub struct Capabilities {
    pub editor:      Capability<EditorCli>,
    /// Colored, interactive output on stdout.
    pub rich_output: Capability<()>,
}

impl Capabilities {
    pub fn detect(no_color: bool) -> Self {
        Capabilities {
            editor:      Capability::from_option(editor::detect()),
            rich_output: detect_rich_output(no_color),
        }
    }

    /// Colour decision only. For binaries that never open an editor.
    pub fn output_only(no_color: bool) -> Self {
        Capabilities {
            editor:      Capability::Unavailable,
            rich_output: detect_rich_output(no_color),
        }
    }

    /// Nothing available; used by dry runs in tests and scripted callers.
    pub fn none() -> Self {
        Capabilities {
            editor:      Capability::Unavailable,
            rich_output: Capability::Unavailable,
        }
    }
}

fn detect_rich_output(no_color: bool) -> Capability<()> {
    let disabled = no_color || std::env::var_os("NO_COLOR").is_some_and(|v| !v.is_empty());
    if !disabled && std::io::stdout().is_terminal() {
        Capability::Available(())
    } else {
        Capability::Unavailable
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn capability_option_round_trip() {
        let c = Capability::from_option(Some(3));
        assert!(c.is_available());
        assert_eq!(c.as_option(), Some(&3));
        assert_eq!(Capability::<u8>::from_option(None), Capability::Unavailable);
    }

    #[test]
    fn forced_no_color_disables_rich_output() {
        assert!(!detect_rich_output(true).is_available());
    }

    #[test]
    fn output_only_leaves_editor_unavailable() {
        let caps = Capabilities::output_only(true);
        assert_eq!(caps.editor, Capability::Unavailable);
        assert!(!caps.rich_output.is_available());
    }
}
