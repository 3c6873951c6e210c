// ─────────────────────────────────────────────────────────────────────────────
//  snes-ide-build :: manifest  -  what goes into the distribution
//
//  TOML, embedded at compile time from `snes-ide.toml` and replaceable with
//  `--manifest FILE`.
// ─────────────────────────────────────────────────────────────────────────────

use std::path::{Path, PathBuf};

use serde::Deserialize;

use snes_ide::Os;

use crate::error::{BuildError, Result};

const EMBEDDED: &str = include_str!("snes-ide.toml");

#[derive(Debug, Clone, Deserialize)]
pub struct Manifest {
    /// Default output directory, relative to the source root.
    #[serde(default = "default_out")]
    pub out:        PathBuf,
    #[serde(default = "default_docs")]
    pub docs:       PathBuf,
    #[serde(default = "default_libs_dir")]
    pub libs_dir:   PathBuf,
    #[serde(default = "default_tools_dir")]
    pub tools_dir:  PathBuf,
    #[serde(default = "default_dlls_dir")]
    pub dlls_dir:   PathBuf,
    #[serde(default)]
    pub root_files: Vec<PathBuf>,
    #[serde(default)]
    pub libs:       Vec<String>,
    #[serde(default, rename = "entry")]
    pub entries:    Vec<EntryPoint>,
    #[serde(default, rename = "archive")]
    pub archives:   Vec<Archive>,
}

fn default_out() -> PathBuf       { PathBuf::from("SNES-IDE-out") }
fn default_docs() -> PathBuf      { PathBuf::from("docs") }
fn default_libs_dir() -> PathBuf  { PathBuf::from("src/libs") }
fn default_tools_dir() -> PathBuf { PathBuf::from("src/tools") }
fn default_dlls_dir() -> PathBuf  { PathBuf::from("tools") }

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EntryKind {
    /// A binary of this package, built with cargo.
    Rust,
    /// A Python script copied as-is plus a shim that runs it.
    Script,
}

#[derive(Debug, Clone, Deserialize)]
pub struct EntryPoint {
    pub name:   String,
    pub kind:   EntryKind,
    /// Script path relative to the source root (scripts only).
    #[serde(default)]
    pub source: Option<PathBuf>,
    /// Destination directory inside the output; empty means the output root.
    #[serde(default)]
    pub dest:   PathBuf,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ArchiveKind {
    #[default]
    Zip,
    File,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct PrefixRule {
    pub from: String,
    pub to:   String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Archive {
    pub name:   String,
    pub url:    String,
    #[serde(default)]
    pub kind:   ArchiveKind,
    /// Hex digest, optionally prefixed with `SHA-256:`.
    #[serde(default)]
    pub sha256: Option<String>,
    /// Target systems this archive applies to; empty means all.
    #[serde(default)]
    pub os:     Vec<String>,
    #[serde(default)]
    pub rules:  Vec<PrefixRule>,
    /// Output path for `kind = "file"`.
    #[serde(default)]
    pub dest:   Option<PathBuf>,
}

impl Archive {
    pub fn applies_to(&self, os: Os) -> bool {
        self.os.is_empty() || self.os.iter().any(|o| o.parse::<Os>().is_ok_and(|parsed| parsed == os))
    }
}

impl Manifest {
    pub fn embedded() -> Result<Manifest> {
        Self::parse(EMBEDDED, "<embedded snes-ide.toml>")
    }

    pub fn load(path: &Path) -> Result<Manifest> {
        let text = std::fs::read_to_string(path)?;
        Self::parse(&text, &path.display().to_string())
    }

    pub fn parse(text: &str, origin: &str) -> Result<Manifest> {
        let manifest: Manifest = toml::from_str(text).map_err(|e| BuildError::Manifest {
            path:   origin.to_owned(),
            reason: e.to_string(),
        })?;
        manifest.check(origin)?;
        Ok(manifest)
    }

    fn check(&self, origin: &str) -> Result<()> {
        let bad = |reason: String| BuildError::Manifest { path: origin.to_owned(), reason };

        for entry in &self.entries {
            if entry.kind == EntryKind::Script && entry.source.is_none() {
                return Err(bad(format!("script entry '{}' has no `source`", entry.name)));
            }
        }
        for archive in &self.archives {
            match archive.kind {
                ArchiveKind::File if archive.dest.is_none() => {
                    return Err(bad(format!("file archive '{}' has no `dest`", archive.name)));
                }
                ArchiveKind::Zip if archive.rules.is_empty() => {
                    return Err(bad(format!("zip archive '{}' has no prefix rules", archive.name)));
                }
                _ => {}
            }
            if let Some(o) = archive.os.iter().find(|o| o.parse::<Os>().is_err()) {
                return Err(bad(format!("archive '{}' names unknown os '{}'", archive.name, o)));
            }
        }
        Ok(())
    }

    pub fn archives_for(&self, os: Os) -> impl Iterator<Item = &Archive> {
        self.archives.iter().filter(move |a| a.applies_to(os))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn embedded_manifest_parses() {
        let m = Manifest::embedded().unwrap();
        assert_eq!(m.out, PathBuf::from("SNES-IDE-out"));
        assert!(m.entries.iter().any(|e| e.name == "snes-ide" && e.kind == EntryKind::Rust));

        let linux: Vec<_> = m.archives_for(Os::Linux).map(|a| a.name.as_str()).collect();
        assert_eq!(linux, vec!["pvsneslib-linux", "pvsneslib-license"]);
        assert!(m.archives_for(Os::Windows).any(|a| a.name == "pvsneslib-windows"));
    }

    #[test]
    fn defaults_fill_missing_fields() {
        let m = Manifest::parse("", "test").unwrap();
        assert_eq!(m.tools_dir, PathBuf::from("src/tools"));
        assert!(m.archives.is_empty());
    }

    #[test]
    fn script_entry_needs_source() {
        let err = Manifest::parse("[[entry]]\nname = \"x\"\nkind = \"script\"\n", "test").unwrap_err();
        assert!(err.to_string().contains("no `source`"));
    }

    #[test]
    fn zip_archive_needs_rules() {
        let text = "[[archive]]\nname = \"a\"\nurl = \"https://example.invalid/a.zip\"\n";
        assert!(Manifest::parse(text, "test").is_err());
    }

    #[test]
    fn unknown_os_is_rejected() {
        let text = "[[archive]]\nname = \"a\"\nkind = \"file\"\nurl = \"u\"\ndest = \"x\"\nos = [\"amiga\"]\n";
        let err = Manifest::parse(text, "test").unwrap_err();
        assert!(err.to_string().contains("amiga"));
    }
}
