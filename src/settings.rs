// ─────────────────────────────────────────────────────────────────────────────
//  snes-ide :: settings  -  environment configuration
//
//    SNESIDE_ROOT          installation root searched before everything else
//    SNESIDE_OPTION        action to run without showing the menu
//    SNESIDE_DRY_RUN       resolve only, never spawn
//    SNES_IDE_BSNES_PATH   emulator binary (or directory holding it)
//    SNESIDE_LOG           tracing filter, e.g. `snes_ide=debug`
// ─────────────────────────────────────────────────────────────────────────────

use std::ffi::OsString;
use std::path::PathBuf;

pub const ENV_ROOT:       &str = "SNESIDE_ROOT";
pub const ENV_OPTION:     &str = "SNESIDE_OPTION";
pub const ENV_DRY_RUN:    &str = "SNESIDE_DRY_RUN";
pub const ENV_BSNES_PATH: &str = "SNES_IDE_BSNES_PATH";
pub const ENV_LOG:        &str = "SNESIDE_LOG";

/// Environment read once at startup and passed around by value.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Settings {
    pub root_override:     Option<PathBuf>,
    pub option:            Option<String>,
    pub dry_run:           bool,
    pub emulator_override: Option<PathBuf>,
}

impl Settings {
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var_os(key))
    }

    /// Build settings from any key lookup; tests pass a closure over a map.
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<OsString>,
    {
        let non_empty = |key: &str| lookup(key).filter(|v| !v.is_empty());

        Settings {
            root_override:     non_empty(ENV_ROOT).map(PathBuf::from),
            option:            non_empty(ENV_OPTION).map(|v| v.to_string_lossy().trim().to_owned()),
            dry_run:           non_empty(ENV_DRY_RUN).map(|v| is_truthy(&v.to_string_lossy())).unwrap_or(false),
            emulator_override: non_empty(ENV_BSNES_PATH).map(PathBuf::from),
        }
    }
}

/// Any non-empty value except the usual spellings of "off".
pub fn is_truthy(value: &str) -> bool {
    !matches!(
        value.trim().to_ascii_lowercase().as_str(),
        "" | "0" | "false" | "no" | "off"
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use std::collections::HashMap;

    fn settings(pairs: &[(&str, &str)]) -> Settings {
        let map: HashMap<String, OsString> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), OsString::from(v)))
            .collect();
        Settings::from_lookup(|k| map.get(k).cloned())
    }

    #[test]
    fn empty_environment_gives_defaults() {
        assert_eq!(settings(&[]), Settings::default());
    }

    #[test]
    fn reads_every_variable() {
        let s = settings(&[
            (ENV_ROOT, "/custom"),
            (ENV_OPTION, " 5 "),
            (ENV_DRY_RUN, "1"),
            (ENV_BSNES_PATH, "/opt/bsnes/bsnes"),
        ]);
        assert_eq!(s.root_override, Some(PathBuf::from("/custom")));
        assert_eq!(s.option.as_deref(), Some("5"));
        assert!(s.dry_run);
        assert_eq!(s.emulator_override, Some(PathBuf::from("/opt/bsnes/bsnes")));
    }

    #[test]
    fn empty_values_count_as_unset() {
        let s = settings(&[(ENV_ROOT, ""), (ENV_DRY_RUN, "")]);
        assert_eq!(s.root_override, None);
        assert!(!s.dry_run);
    }

    #[test]
    fn dry_run_falsy_spellings() {
        for v in ["0", "false", "No", "OFF"] {
            assert!(!settings(&[(ENV_DRY_RUN, v)]).dry_run, "{v}");
        }
        assert!(settings(&[(ENV_DRY_RUN, "yes")]).dry_run);
    }
}
