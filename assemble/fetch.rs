// ─────────────────────────────────────────────────────────────────────────────
//  snes-ide-build :: fetch  -  blocking downloads and release lookups
// ─────────────────────────────────────────────────────────────────────────────

use std::io::Read;

use serde::Deserialize;
use sha2::{Digest, Sha256};
use tracing::debug;

use snes_ide::Os;

use crate::error::{BuildError, Result};

pub const BSNES_LATEST_API: &str = "https://api.github.com/repos/bsnes-emu/bsnes/releases/latest";
const BSNES_NIGHTLY: &str = "https://github.com/bsnes-emu/bsnes/releases/download/nightly";

/// GET `url` into memory, then check the digest when one is given.
pub fn download(url: &str, sha256: Option<&str>) -> Result<Vec<u8>> {
    debug!(url, "GET");

    let resp = ureq::get(url)
        .set("User-Agent", concat!("snes-ide-build/", env!("CARGO_PKG_VERSION")))
        .call()
        .map_err(|e| BuildError::Download { url: url.to_owned(), reason: e.to_string() })?;

    let mut buf = Vec::new();
    resp.into_reader()
        .read_to_end(&mut buf)
        .map_err(|e| BuildError::Download { url: url.to_owned(), reason: e.to_string() })?;

    if let Some(expected) = sha256 {
        verify_sha256(url, &buf, expected)?;
    }
    debug!(url, bytes = buf.len(), "downloaded");
    Ok(buf)
}

pub fn verify_sha256(url: &str, data: &[u8], checksum_field: &str) -> Result<()> {
    let expected = checksum_field
        .strip_prefix("SHA-256:")
        .unwrap_or(checksum_field)
        .trim()
        .to_lowercase();

    let actual = hex::encode(Sha256::digest(data));
    if actual != expected {
        return Err(BuildError::ChecksumMismatch { url: url.to_owned(), expected, actual });
    }
    Ok(())
}

// ─────────────────────────────────────────────────────────────────────────────
//  bsnes releases
// ─────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Deserialize)]
pub struct Release {
    #[serde(default)]
    pub tag_name: String,
    #[serde(default)]
    pub assets:   Vec<Asset>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Asset {
    pub name:                 String,
    pub browser_download_url: String,
}

/// Name fragment identifying a platform's asset.
fn asset_marker(os: Os) -> &'static str {
    match os {
        Os::Windows => "windows",
        Os::MacOs   => "macos",
        Os::Linux   => "linux",
    }
}

/// First asset whose lowercased name carries the platform marker.
pub fn pick_asset(release: &Release, os: Os) -> Option<&Asset> {
    let marker = asset_marker(os);
    release
        .assets
        .iter()
        .find(|a| a.name.to_lowercase().contains(marker))
}

pub fn nightly_url(os: Os) -> String {
    format!("{BSNES_NIGHTLY}/bsnes-{}.zip", asset_marker(os))
}

/// Download URL for the latest bsnes build, falling back to the nightly
/// archive when the API call fails or lists no matching asset.
pub fn latest_bsnes_url(os: Os) -> String {
    let release = ureq::get(BSNES_LATEST_API)
        .set("Accept", "application/vnd.github+json")
        .set("User-Agent", concat!("snes-ide-build/", env!("CARGO_PKG_VERSION")))
        .call()
        .map_err(|e| e.to_string())
        .and_then(|r| r.into_json::<Release>().map_err(|e| e.to_string()));

    match release {
        Ok(rel) => match pick_asset(&rel, os) {
            Some(asset) => {
                debug!(tag = %rel.tag_name, asset = %asset.name, "bsnes release asset");
                asset.browser_download_url.clone()
            }
            None => nightly_url(os),
        },
        Err(e) => {
            debug!("release lookup failed, using nightly: {e}");
            nightly_url(os)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn release(names: &[&str]) -> Release {
        Release {
            tag_name: "v115".into(),
            assets:   names
                .iter()
                .map(|n| Asset { name: (*n).into(), browser_download_url: format!("https://dl/{n}") })
                .collect(),
        }
    }

    #[test]
    fn picks_platform_asset() {
        let rel = release(&["bsnes-windows.zip", "bsnes-macOS.zip", "bsnes-linux.zip"]);
        assert_eq!(pick_asset(&rel, Os::MacOs).unwrap().name, "bsnes-macOS.zip");
        assert_eq!(pick_asset(&rel, Os::Linux).unwrap().browser_download_url, "https://dl/bsnes-linux.zip");
        assert!(pick_asset(&release(&["source.tar.gz"]), Os::Windows).is_none());
    }

    #[test]
    fn nightly_fallback_url() {
        assert_eq!(
            nightly_url(Os::MacOs),
            "https://github.com/bsnes-emu/bsnes/releases/download/nightly/bsnes-macos.zip"
        );
    }

    #[test]
    fn checksum_accepts_prefixed_digest() {
        let digest = hex::encode(Sha256::digest(b"snes"));
        verify_sha256("u", b"snes", &format!("SHA-256:{}", digest.to_uppercase())).unwrap();
        let err = verify_sha256("u", b"snes", "00").unwrap_err();
        assert!(matches!(err, BuildError::ChecksumMismatch { .. }));
    }

    #[test]
    fn release_json_parses() {
        let json = r#"{"tag_name":"nightly","assets":[{"name":"bsnes-linux.zip","browser_download_url":"https://x/y.zip","size":1}]}"#;
        let rel: Release = serde_json::from_str(json).unwrap();
        assert_eq!(rel.assets.len(), 1);
    }
}
