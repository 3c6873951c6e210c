// ─────────────────────────────────────────────────────────────────────────────
//  snes-ide :: action  -  the fixed menu of launchable actions
// ─────────────────────────────────────────────────────────────────────────────

use std::fmt;
use std::str::FromStr;

use crate::error::LauncherError;

/// A logical menu choice. Each one maps to a family of launcher files sharing
/// the same base name (`compiler.sh`, `compiler.bat`, ...).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Action {
    CreateProject,
    TextEditor,
    AudioTools,
    GraphicTools,
    OtherTools,
    Compiler,
    Emulator,
}

#[derive(Debug, Clone, Copy)]
pub struct ActionInfo {
    pub action: Action,
    pub index:  u8,
    /// Stem of the launcher files searched for in every root.
    pub base:   &'static str,
    pub label:  &'static str,
}

static ACTIONS: &[ActionInfo] = &[
    ActionInfo { action: Action::CreateProject, index: 0, base: "create-new-project", label: "Create a new SNES project" },
    ActionInfo { action: Action::TextEditor,    index: 1, base: "text-editor",        label: "Open the project in a text editor" },
    ActionInfo { action: Action::AudioTools,    index: 2, base: "audio-tools",        label: "Start an audio framework for SNES" },
    ActionInfo { action: Action::GraphicTools,  index: 3, base: "graphic-tools",      label: "Start a graphic framework for SNES" },
    ActionInfo { action: Action::OtherTools,    index: 4, base: "other-tools",        label: "Run an external framework for SNES" },
    ActionInfo { action: Action::Compiler,      index: 5, base: "compiler",           label: "Compile a SNES project" },
    ActionInfo { action: Action::Emulator,      index: 6, base: "emulator",           label: "Emulate a SNES project with bsnes" },
];

impl Action {
    pub fn catalog() -> &'static [ActionInfo] {
        ACTIONS
    }

    pub fn info(self) -> &'static ActionInfo {
        // every variant has exactly one row
        ACTIONS.iter().find(|i| i.action == self).unwrap_or(&ACTIONS[0])
    }

    pub fn from_index(index: u8) -> Option<Action> {
        ACTIONS.iter().find(|i| i.index == index).map(|i| i.action)
    }

    /// Accepts a menu index, the launcher base name, or a few short aliases.
    pub fn parse(raw: &str) -> Option<Action> {
        let s = raw.trim().to_ascii_lowercase();
        if let Ok(n) = s.parse::<u8>() {
            return Action::from_index(n);
        }
        let s = s.replace('_', "-");
        if let Some(info) = ACTIONS.iter().find(|i| i.base == s) {
            return Some(info.action);
        }
        match s.as_str() {
            "create-project" | "new-project" | "new" => Some(Action::CreateProject),
            "editor" | "edit"                       => Some(Action::TextEditor),
            "audio" | "tracker"                     => Some(Action::AudioTools),
            "graphics" | "graphic"                  => Some(Action::GraphicTools),
            "other"                                 => Some(Action::OtherTools),
            "compile" | "build"                     => Some(Action::Compiler),
            "emulate" | "run" | "bsnes"             => Some(Action::Emulator),
            _                                       => None,
        }
    }

    pub fn base_name(self) -> &'static str {
        self.info().base
    }

    pub fn index(self) -> u8 {
        self.info().index
    }

    pub fn label(self) -> &'static str {
        self.info().label
    }
}

impl FromStr for Action {
    type Err = LauncherError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Action::parse(s).ok_or_else(|| LauncherError::UnknownAction(s.to_owned()))
    }
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.base_name())
    }
}
