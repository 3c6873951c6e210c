// ─────────────────────────────────────────────────────────────────────────────
//  snes-ide-build :: steps  -  the assembly steps, in execution order
//
//    1. Cleaning output          6. Copying wrappers
//    2. Copying root files       7. Copying DLLs (Windows)
//    3. Copying libs             8. Building entry points
//    4. Downloading toolchain    9. Fetching emulator (CI only)
//    5. Copying docs            10. Verifying layout
// ─────────────────────────────────────────────────────────────────────────────

use std::fs;
use std::path::{Path, PathBuf};
use std::process::Command;

use anyhow::{bail, Context as _};
use tracing::debug;
use walkdir::WalkDir;

use snes_ide::emulator;
use snes_ide::project::copy_tree;
use snes_ide::resolver::ensure_executable;
use snes_ide::settings::is_truthy;
use snes_ide::{toolchain, Os, PlatformProfile};

use crate::extract::{self, ExtractStats};
use crate::fetch;
use crate::manifest::{ArchiveKind, EntryKind, EntryPoint, Manifest, PrefixRule};
use crate::pipeline::{Progress, Step};
use crate::shim;

pub const ENV_GITHUB_ACTIONS: &str = "GITHUB_ACTIONS";
pub const ENV_CI_AUTO_FETCH:  &str = "SNES_IDE_CI_AUTO_FETCH";

/// Everything the steps read. Built once in `main`.
#[derive(Debug, Clone)]
pub struct Context {
    /// Source checkout.
    pub root:          PathBuf,
    pub out:           PathBuf,
    pub manifest:      Manifest,
    /// System the distribution is assembled for.
    pub os:            Os,
    pub skip_download: bool,
    pub no_compile:    bool,
    pub prebuilt:      Option<PathBuf>,
    pub ci_fetch:      bool,
}

impl Context {
    fn profile(&self) -> &'static PlatformProfile {
        self.os.profile()
    }

    fn libs_out(&self) -> PathBuf {
        self.out.join("libs")
    }

    fn tools_out(&self) -> PathBuf {
        self.out.join("tools")
    }
}

/// CI emulator fetch: `GITHUB_ACTIONS=true` and a truthy
/// `SNES_IDE_CI_AUTO_FETCH`.
pub fn ci_fetch_enabled<F>(lookup: F) -> bool
where
    F: Fn(&str) -> Option<String>,
{
    let in_actions = lookup(ENV_GITHUB_ACTIONS).is_some_and(|v| v.trim().eq_ignore_ascii_case("true"));
    let opted_in = lookup(ENV_CI_AUTO_FETCH).is_some_and(|v| is_truthy(&v));
    in_actions && opted_in
}

pub static STEPS: &[Step] = &[
    Step { name: "Cleaning output",        run: clean_output },
    Step { name: "Copying root files",     run: copy_root_files },
    Step { name: "Copying libs",           run: copy_libs },
    Step { name: "Downloading toolchain",  run: download_toolchain },
    Step { name: "Copying docs",           run: copy_docs },
    Step { name: "Copying wrappers",       run: copy_wrappers },
    Step { name: "Copying DLLs",           run: copy_dlls },
    Step { name: "Building entry points",  run: build_entry_points },
    Step { name: "Fetching emulator",      run: fetch_emulator },
    Step { name: "Verifying layout",       run: verify_layout },
];

// ─────────────────────────────────────────────────────────────────────────────
//  1-3  Output and copies
// ─────────────────────────────────────────────────────────────────────────────

fn clean_output(ctx: &Context) -> anyhow::Result<Progress> {
    let root = ctx.root.canonicalize().unwrap_or_else(|_| ctx.root.clone());
    let out = ctx.out.canonicalize().unwrap_or_else(|_| ctx.out.clone());
    if root.starts_with(&out) {
        bail!("refusing to clean {}: it contains the source root", ctx.out.display());
    }

    if ctx.out.exists() {
        fs::remove_dir_all(&ctx.out)
            .with_context(|| format!("cannot remove {}", ctx.out.display()))?;
    }
    fs::create_dir_all(&ctx.out)
        .with_context(|| format!("cannot create {}", ctx.out.display()))?;
    Ok(Progress::Done(ctx.out.display().to_string()))
}

fn copy_root_files(ctx: &Context) -> anyhow::Result<Progress> {
    for rel in &ctx.manifest.root_files {
        let src = ctx.root.join(rel);
        let dst = ctx.out.join(rel);
        if let Some(parent) = dst.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::copy(&src, &dst).with_context(|| format!("cannot copy {}", src.display()))?;
        debug!(src = %src.display(), dst = %dst.display(), "copied root file");
    }
    Ok(Progress::Done(format!("{} file(s)", ctx.manifest.root_files.len())))
}

fn copy_libs(ctx: &Context) -> anyhow::Result<Progress> {
    let src_libs = ctx.root.join(&ctx.manifest.libs_dir);
    let mut files = 0;
    for lib in &ctx.manifest.libs {
        let src = src_libs.join(lib);
        if !src.is_dir() {
            bail!("library directory not found: {}", src.display());
        }
        files += copy_tree(&src, &ctx.libs_out().join(lib))
            .with_context(|| format!("cannot copy {}", src.display()))?;
    }
    Ok(Progress::Done(format!("{} lib(s), {} file(s)", ctx.manifest.libs.len(), files)))
}

// ─────────────────────────────────────────────────────────────────────────────
//  4  Toolchain archives
// ─────────────────────────────────────────────────────────────────────────────

fn download_toolchain(ctx: &Context) -> anyhow::Result<Progress> {
    if ctx.skip_download {
        return Ok(Progress::Skipped("--skip-download".into()));
    }

    let mut fetched = 0;
    for archive in ctx.manifest.archives_for(ctx.os) {
        let data = fetch::download(&archive.url, archive.sha256.as_deref())
            .with_context(|| format!("archive '{}'", archive.name))?;

        match archive.kind {
            ArchiveKind::Zip => {
                let stats = extract::extract_zip(&data, &ctx.out, &archive.rules)
                    .with_context(|| format!("extracting '{}'", archive.name))?;
                debug!(archive = %archive.name, files = stats.files, skipped = stats.skipped, "archive done");
            }
            ArchiveKind::File => {
                let rel = archive.dest.as_deref().unwrap_or_else(|| Path::new(&archive.name));
                let dest = ctx.out.join(rel);
                if let Some(parent) = dest.parent() {
                    fs::create_dir_all(parent)?;
                }
                fs::write(&dest, &data).with_context(|| format!("cannot write {}", dest.display()))?;
            }
        }
        fetched += 1;
    }

    if fetched == 0 {
        return Ok(Progress::Skipped(format!("no archives for {}", ctx.os)));
    }
    Ok(Progress::Done(format!("{fetched} archive(s)")))
}

// ─────────────────────────────────────────────────────────────────────────────
//  5-7  Docs, wrappers, DLLs
// ─────────────────────────────────────────────────────────────────────────────

fn copy_docs(ctx: &Context) -> anyhow::Result<Progress> {
    let src = ctx.root.join(&ctx.manifest.docs);
    if !src.is_dir() {
        return Ok(Progress::Skipped(format!("no {} directory", ctx.manifest.docs.display())));
    }
    let files = copy_tree(&src, &ctx.out.join("docs"))
        .with_context(|| format!("cannot copy {}", src.display()))?;
    Ok(Progress::Done(format!("{files} file(s)")))
}

/// Copy every file under `src` with extension `ext` into `dst`, keeping the
/// relative layout.
fn copy_matching(src: &Path, dst: &Path, ext: &str) -> anyhow::Result<Vec<PathBuf>> {
    let mut copied = Vec::new();
    for entry in WalkDir::new(src).sort_by_file_name() {
        let entry = entry?;
        if !entry.file_type().is_file() {
            continue;
        }
        let matches = entry
            .path()
            .extension()
            .and_then(|e| e.to_str())
            .is_some_and(|e| e.eq_ignore_ascii_case(ext));
        if !matches {
            continue;
        }

        let rel = entry.path().strip_prefix(src)?;
        let dest = dst.join(rel);
        if let Some(parent) = dest.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::copy(entry.path(), &dest)
            .with_context(|| format!("cannot copy {}", entry.path().display()))?;
        copied.push(dest);
    }
    Ok(copied)
}

fn copy_wrappers(ctx: &Context) -> anyhow::Result<Progress> {
    let src = ctx.root.join(&ctx.manifest.tools_dir);
    if !src.is_dir() {
        bail!("wrapper directory not found: {}", src.display());
    }

    let profile = ctx.profile();
    let ext = profile.wrapper_ext.trim_start_matches('.');
    let copied = copy_matching(&src, &ctx.tools_out(), ext)?;

    if profile.needs_exec_bit {
        copied.iter().for_each(|p| ensure_executable(p));
    }
    Ok(Progress::Done(format!("{} {} wrapper(s)", copied.len(), profile.wrapper_ext)))
}

fn copy_dlls(ctx: &Context) -> anyhow::Result<Progress> {
    if !ctx.os.is_windows() {
        return Ok(Progress::Skipped("non-Windows target".into()));
    }
    let src = ctx.root.join(&ctx.manifest.dlls_dir);
    if !src.is_dir() {
        return Ok(Progress::Skipped(format!("no {} directory", ctx.manifest.dlls_dir.display())));
    }
    let copied = copy_matching(&src, &ctx.tools_out(), "dll")?;
    Ok(Progress::Done(format!("{} dll(s)", copied.len())))
}

// ─────────────────────────────────────────────────────────────────────────────
//  8  Entry points
// ─────────────────────────────────────────────────────────────────────────────

fn build_entry_points(ctx: &Context) -> anyhow::Result<Progress> {
    let rust: Vec<&EntryPoint> = ctx.manifest.entries.iter().filter(|e| e.kind == EntryKind::Rust).collect();

    let bin_dir = if rust.is_empty() {
        None
    } else if ctx.no_compile {
        let dir = ctx
            .prebuilt
            .clone()
            .context("--no-compile needs --prebuilt DIR holding the binaries")?;
        Some(dir)
    } else {
        Some(cargo_build(ctx, &rust)?)
    };

    let profile = ctx.profile();
    let mut placed = 0;

    for entry in &ctx.manifest.entries {
        let dest_dir = ctx.out.join(&entry.dest);
        fs::create_dir_all(&dest_dir)?;

        match entry.kind {
            EntryKind::Rust => {
                let Some(bin_dir) = bin_dir.as_deref() else { continue };
                let exe = profile.exe_name(&entry.name);
                let src = bin_dir.join(&exe);
                let dst = dest_dir.join(&exe);
                fs::copy(&src, &dst).with_context(|| format!("cannot copy {}", src.display()))?;
                ensure_executable(&dst);
            }
            EntryKind::Script => {
                let rel = entry.source.as_deref().context("script entry without source")?;
                let src = ctx.root.join(rel);
                let file = src
                    .file_name()
                    .and_then(|f| f.to_str())
                    .with_context(|| format!("bad script path {}", src.display()))?;
                fs::copy(&src, dest_dir.join(file))
                    .with_context(|| format!("cannot copy {}", src.display()))?;

                let (shim_name, body) = shim::shim_for(&entry.name, file, ctx.os);
                let shim_path = dest_dir.join(shim_name);
                fs::write(&shim_path, body)?;
                if profile.needs_exec_bit {
                    ensure_executable(&shim_path);
                }
            }
        }
        placed += 1;
    }

    Ok(Progress::Done(format!("{placed} entry point(s)")))
}

/// `cargo build --release --bin <name>...` in the source root; returns the
/// directory holding the binaries.
fn cargo_build(ctx: &Context, entries: &[&EntryPoint]) -> anyhow::Result<PathBuf> {
    if ctx.os != Os::current() {
        bail!(
            "cannot compile for {} on {}; build there or pass --no-compile --prebuilt DIR",
            ctx.os,
            Os::current(),
        );
    }

    let cargo = std::env::var_os("CARGO").unwrap_or_else(|| "cargo".into());
    let mut cmd = Command::new(cargo);
    cmd.current_dir(&ctx.root).args(["build", "--release"]);
    for e in entries {
        cmd.args(["--bin", e.name.as_str()]);
    }
    debug!(?cmd, "building entry points");

    let status = cmd.status().context("cannot run cargo")?;
    if !status.success() {
        bail!("cargo build failed ({status})");
    }
    Ok(ctx.root.join("target").join("release"))
}

// ─────────────────────────────────────────────────────────────────────────────
//  9-10  Emulator and verification
// ─────────────────────────────────────────────────────────────────────────────

fn fetch_emulator(ctx: &Context) -> anyhow::Result<Progress> {
    if !ctx.ci_fetch {
        return Ok(Progress::Skipped(format!(
            "needs {ENV_GITHUB_ACTIONS}=true and {ENV_CI_AUTO_FETCH}"
        )));
    }

    let url = fetch::latest_bsnes_url(ctx.os);
    let data = fetch::download(&url, None)?;
    let stats = install_emulator(&data, &ctx.out, ctx.os)
        .with_context(|| format!("extracting {url}"))?;
    let found = emulator::in_layout(&emulator::bundle_dir(&ctx.out), ctx.os)
        .with_context(|| format!("no bsnes binary in the {} archive from {url}", ctx.os))?;

    Ok(Progress::Done(format!("{} file(s), {}", stats.files, found.display())))
}

/// Unpack a bsnes release zip into `<out>/libs/bsnes/<platform>`, dropping
/// the release's wrapper folder so the binary sits where discovery looks.
fn install_emulator(data: &[u8], out: &Path, os: Os) -> crate::error::Result<ExtractStats> {
    let dest = emulator::bundle_dir(out).join(emulator::platform_subdir(os));
    let from = extract::common_root(data)?.unwrap_or_default();
    debug!(strip = %from, dest = %dest.display(), "installing emulator");
    extract::extract_zip(data, &dest, &[PrefixRule { from, to: String::new() }])
}

fn verify_layout(ctx: &Context) -> anyhow::Result<Progress> {
    let profile = ctx.profile();
    let mut missing = Vec::new();

    let launcher = ctx.out.join(profile.exe_name("snes-ide"));
    if !launcher.is_file() {
        missing.push(launcher);
    }
    let toolchain_checked = !ctx.skip_download;
    if toolchain_checked {
        missing.extend(toolchain::missing(&ctx.libs_out(), profile));
    }

    if !missing.is_empty() {
        let list: String = missing.iter().map(|p| format!("\n    {}", p.display())).collect();
        bail!("{} expected file(s) missing:{}", missing.len(), list);
    }

    if toolchain_checked {
        Ok(Progress::Done("launcher and toolchain present".into()))
    } else {
        Ok(Progress::Done("launcher present, toolchain not checked (--skip-download)".into()))
    }
}
