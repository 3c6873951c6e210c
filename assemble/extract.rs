// ─────────────────────────────────────────────────────────────────────────────
//  snes-ide-build :: extract  -  zip extraction with prefix rewriting
//
//  Every member name is matched against the archive's (from, to) rules, first
//  match wins, and lands at `<out>/<to><rest>`. Members matching no rule are
//  skipped. A rewritten path that is absolute or climbs with `..` aborts the
//  archive.
//
//  `common_root` finds the single folder some release zips wrap everything
//  in, so callers can strip it with a `(root, "")` rule.
// ─────────────────────────────────────────────────────────────────────────────

use std::fs;
use std::io::{self, Cursor};
use std::path::{Component, Path, PathBuf};

use tracing::debug;

use crate::error::{BuildError, Result};
use crate::manifest::PrefixRule;

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct ExtractStats {
    pub files:   usize,
    pub skipped: usize,
}

/// Destination of `name` relative to the output directory, `None` when no
/// rule matches.
pub fn rewrite_member(name: &str, rules: &[PrefixRule]) -> Result<Option<PathBuf>> {
    let Some(rule) = rules.iter().find(|r| name.starts_with(r.from.as_str())) else {
        return Ok(None);
    };

    let rewritten = format!("{}{}", rule.to, &name[rule.from.len()..]);
    let rel = PathBuf::from(rewritten.trim_end_matches('/'));

    if rel.as_os_str().is_empty() {
        return Ok(Some(rel));
    }
    if !is_contained(&rel) {
        return Err(BuildError::UnsafeMember(name.to_owned()));
    }
    Ok(Some(rel))
}

/// The `<dir>/` every member of `data` sits under, if there is exactly one.
/// A macOS `.app` bundle is content, never a wrapper, and is not reported.
pub fn common_root(data: &[u8]) -> Result<Option<String>> {
    let archive = zip::ZipArchive::new(Cursor::new(data))?;
    let mut root: Option<&str> = None;

    for name in archive.file_names() {
        let Some((first, _)) = name.split_once('/') else {
            return Ok(None);
        };
        match root {
            None => root = Some(first),
            Some(r) if r == first => {}
            Some(_) => return Ok(None),
        }
    }

    Ok(root
        .filter(|r| !r.is_empty() && !r.ends_with(".app"))
        .map(|r| format!("{r}/")))
}

fn is_contained(rel: &Path) -> bool {
    rel.components().all(|c| matches!(c, Component::Normal(_) | Component::CurDir))
}

/// Extract `data` under `out`, applying `rules`.
pub fn extract_zip(data: &[u8], out: &Path, rules: &[PrefixRule]) -> Result<ExtractStats> {
    let mut archive = zip::ZipArchive::new(Cursor::new(data))?;
    let mut stats = ExtractStats::default();

    for i in 0..archive.len() {
        let mut member = archive.by_index(i)?;
        let name = member.name().to_owned();

        let Some(rel) = rewrite_member(&name, rules)? else {
            stats.skipped += 1;
            continue;
        };
        if member.enclosed_name().is_none() {
            return Err(BuildError::UnsafeMember(name));
        }
        let dest = out.join(&rel);

        if member.is_dir() {
            fs::create_dir_all(&dest)?;
            continue;
        }
        if let Some(parent) = dest.parent() {
            fs::create_dir_all(parent)?;
        }
        let mut file = fs::File::create(&dest)?;
        io::copy(&mut member, &mut file)?;
        stats.files += 1;

        #[cfg(unix)]
        if let Some(mode) = member.unix_mode() {
            use std::os::unix::fs::PermissionsExt;
            fs::set_permissions(&dest, fs::Permissions::from_mode(mode & 0o7777))?;
        }
    }

    debug!(out = %out.display(), files = stats.files, skipped = stats.skipped, "extracted");
    Ok(stats)
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use std::io::Write;

    fn rules() -> Vec<PrefixRule> {
        vec![
            PrefixRule { from: "pvsneslib/devkitsnes/".into(), to: "libs/pvsneslib/devkitsnes/".into() },
            PrefixRule { from: "pvsneslib/".into(),            to: "libs/other/".into() },
        ]
    }

    pub(crate) fn zip_of(entries: &[(&str, &[u8], u32)]) -> Vec<u8> {
        let mut w = zip::ZipWriter::new(Cursor::new(Vec::new()));
        for (name, body, mode) in entries {
            let opts = zip::write::FileOptions::default().unix_permissions(*mode);
            w.start_file(*name, opts).unwrap();
            w.write_all(body).unwrap();
        }
        w.finish().unwrap().into_inner()
    }

    #[test]
    fn known_prefixes_are_rewritten_first_match_wins() {
        let r = rules();
        assert_eq!(
            rewrite_member("pvsneslib/devkitsnes/bin/816-tcc", &r).unwrap(),
            Some(PathBuf::from("libs/pvsneslib/devkitsnes/bin/816-tcc"))
        );
        assert_eq!(
            rewrite_member("pvsneslib/include/snes.h", &r).unwrap(),
            Some(PathBuf::from("libs/other/include/snes.h"))
        );
    }

    #[test]
    fn unknown_members_are_dropped() {
        assert_eq!(rewrite_member("README.txt", &rules()).unwrap(), None);
    }

    #[test]
    fn escaping_members_are_rejected() {
        let r = rules();
        assert!(matches!(
            rewrite_member("pvsneslib/../../etc/passwd", &r),
            Err(BuildError::UnsafeMember(_))
        ));
        let root = vec![PrefixRule { from: "x/".into(), to: "/".into() }];
        assert!(rewrite_member("x/etc/passwd", &root).is_err());
    }

    #[test]
    fn extracts_and_keeps_modes() {
        let tmp = tempfile::tempdir().unwrap();
        let data = zip_of(&[
            ("pvsneslib/devkitsnes/bin/wlalink", b"elf", 0o755),
            ("pvsneslib/readme.txt", b"hi", 0o644),
            ("LICENSE", b"mit", 0o644),
        ]);

        let stats = extract_zip(&data, tmp.path(), &rules()).unwrap();
        assert_eq!(stats, ExtractStats { files: 2, skipped: 1 });

        let bin = tmp.path().join("libs/pvsneslib/devkitsnes/bin/wlalink");
        assert_eq!(fs::read(&bin).unwrap(), b"elf");
        assert!(tmp.path().join("libs/other/readme.txt").is_file());
        assert!(!tmp.path().join("LICENSE").exists());

        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            assert_eq!(fs::metadata(&bin).unwrap().permissions().mode() & 0o777, 0o755);
        }
    }

    #[test]
    fn identity_rule_extracts_everything() {
        let tmp = tempfile::tempdir().unwrap();
        let data = zip_of(&[("bsnes-nightly/bsnes", b"bin", 0o755)]);
        let all = vec![PrefixRule { from: String::new(), to: String::new() }];

        let stats = extract_zip(&data, tmp.path(), &all).unwrap();
        assert_eq!(stats.files, 1);
        assert!(tmp.path().join("bsnes-nightly/bsnes").is_file());
    }

    #[test]
    fn single_wrapper_folder_is_reported() {
        let data = zip_of(&[
            ("bsnes-nightly/bsnes.exe", b"MZ", 0o644),
            ("bsnes-nightly/Database/Boards.bml", b"", 0o644),
        ]);
        assert_eq!(common_root(&data).unwrap(), Some("bsnes-nightly/".to_owned()));
    }

    #[test]
    fn no_common_root_for_flat_or_mixed_archives() {
        let flat = zip_of(&[("bsnes.exe", b"MZ", 0o644), ("Database/Boards.bml", b"", 0o644)]);
        assert_eq!(common_root(&flat).unwrap(), None);

        let mixed = zip_of(&[("a/bsnes", b"", 0o755), ("b/readme", b"", 0o644)]);
        assert_eq!(common_root(&mixed).unwrap(), None);

        let app = zip_of(&[("bsnes.app/Contents/MacOS/bsnes", b"", 0o755)]);
        assert_eq!(common_root(&app).unwrap(), None);
    }
}
