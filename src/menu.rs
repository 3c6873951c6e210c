// ─────────────────────────────────────────────────────────────────────────────
//  snes-ide :: menu  -  interactive numeric menu
// ─────────────────────────────────────────────────────────────────────────────

use std::io::{BufRead, Write};

use colored::Colorize;
use tracing::warn;

use crate::action::Action;
use crate::error::{LauncherError, Result};
use crate::settings::{Settings, ENV_OPTION};

/// Outcome of looking at the non-interactive sources of an action.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Selection {
    Action(Action),
    Menu,
}

/// `--option` > positional > SNESIDE_OPTION > menu.
///
/// A bad command-line value is an error. A bad SNESIDE_OPTION is logged and
/// the menu is shown instead.
pub fn select(flag: Option<&str>, positional: Option<&str>, settings: &Settings) -> Result<Selection> {
    if let Some(raw) = flag.or(positional) {
        return raw.parse().map(Selection::Action);
    }
    match settings.option.as_deref() {
        Some(raw) => match Action::parse(raw) {
            Some(action) => Ok(Selection::Action(action)),
            None => {
                warn!(value = raw, "ignoring unknown {ENV_OPTION}, showing the menu");
                Ok(Selection::Menu)
            }
        },
        None => Ok(Selection::Menu),
    }
}

/// Print the menu and read a choice, re-prompting on invalid entries.
/// End of input yields [`LauncherError::NoSelection`].
pub fn choose<R: BufRead, W: Write>(input: &mut R, out: &mut W) -> Result<Action> {
    writeln!(out, "{}\n", "Choose an option from the ones below:".bold())?;
    for info in Action::catalog() {
        writeln!(out, "  {} {}", format!("{}", info.index).cyan().bold(), info.label)?;
    }

    loop {
        write!(out, "\n{} ", ">".cyan())?;
        out.flush()?;

        let mut line = String::new();
        if input.read_line(&mut line)? == 0 {
            return Err(LauncherError::NoSelection);
        }

        match line.trim().parse::<u8>().ok().and_then(Action::from_index) {
            Some(action) => return Ok(action),
            None => writeln!(out, "\n{} try again", "INVALID ENTRY:".yellow().bold())?,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use std::io::Cursor;

    #[test]
    fn reprompts_until_valid() {
        colored::control::set_override(false);
        let mut input = Cursor::new("x\n9\n\n5\n");
        let mut out = Vec::new();

        assert_eq!(choose(&mut input, &mut out).unwrap(), Action::Compiler);

        let text = String::from_utf8(out).unwrap();
        assert_eq!(text.matches("INVALID ENTRY").count(), 3);
        assert!(text.contains("6 Emulate a SNES project with bsnes"));
    }

    fn env_option(value: &str) -> Settings {
        Settings { option: Some(value.into()), ..Default::default() }
    }

    #[test]
    fn flag_beats_positional_beats_environment() {
        let env = env_option("6");
        assert_eq!(select(Some("1"), Some("5"), &env).unwrap(), Selection::Action(Action::TextEditor));
        assert_eq!(select(None, Some("compiler"), &env).unwrap(), Selection::Action(Action::Compiler));
        assert_eq!(select(None, None, &env).unwrap(), Selection::Action(Action::Emulator));
        assert_eq!(select(None, None, &Settings::default()).unwrap(), Selection::Menu);
    }

    #[test]
    fn unknown_environment_option_falls_back_to_menu() {
        assert_eq!(select(None, None, &env_option("banana")).unwrap(), Selection::Menu);
        assert_eq!(select(None, None, &env_option("42")).unwrap(), Selection::Menu);
    }

    #[test]
    fn unknown_command_line_option_is_an_error() {
        let err = select(Some("banana"), Some("5"), &Settings::default()).unwrap_err();
        assert!(matches!(err, LauncherError::UnknownAction(v) if v == "banana"));
    }

    #[test]
    fn end_of_input_is_no_selection() {
        let mut input = Cursor::new("");
        let mut out = Vec::new();
        assert!(matches!(choose(&mut input, &mut out), Err(LauncherError::NoSelection)));
    }
}
