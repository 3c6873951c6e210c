// ─────────────────────────────────────────────────────────────────────────────
//  snes-ide-build  -  assemble the distributable SNES-IDE folder
//
//  USAGE
//  ─────
//    snes-ide-build                                   full build for this OS
//    snes-ide-build --skip-download                   no network
//    snes-ide-build --target-os windows --no-compile --prebuilt dist/win
//    snes-ide-build --manifest my.toml --out /tmp/snes-ide
// ─────────────────────────────────────────────────────────────────────────────

mod error;
mod extract;
mod fetch;
mod manifest;
mod pipeline;
mod shim;
mod steps;

use std::path::PathBuf;

use clap::Parser;
use colored::Colorize;
use tracing::debug;

use snes_ide::capability::Capabilities;
use snes_ide::logging::{self, LogConfig};
use snes_ide::Os;

use error::BuildError;
use manifest::Manifest;
use steps::Context;

// ─────────────────────────────────────────────────────────────────────────────
//  CLI definition (clap derive)
// ─────────────────────────────────────────────────────────────────────────────

#[derive(Parser)]
#[command(
    name    = "snes-ide-build",
    version = env!("CARGO_PKG_VERSION"),
    about   = "Assemble the SNES-IDE distribution folder",
    long_about = None,
)]
struct Cli {
    /// Source checkout  (default: current directory)
    #[arg(long, value_name = "DIR")]
    root: Option<PathBuf>,

    /// Output directory  (default: the manifest's `out`, under --root)
    #[arg(long, value_name = "DIR")]
    out: Option<PathBuf>,

    /// Distribution manifest  (default: the built-in one)
    #[arg(long, value_name = "FILE")]
    manifest: Option<PathBuf>,

    /// System to assemble for: windows, macos or linux  (default: this one)
    #[arg(long, value_name = "OS")]
    target_os: Option<Os>,

    /// Skip toolchain downloads
    #[arg(long)]
    skip_download: bool,

    /// Do not run cargo; take binaries from --prebuilt
    #[arg(long)]
    no_compile: bool,

    /// Directory with prebuilt snes-ide / create-new-project binaries
    #[arg(long, value_name = "DIR")]
    prebuilt: Option<PathBuf>,

    /// Debug logging on stderr
    #[arg(long, short = 'v')]
    verbose: bool,

    /// Disable colored output
    #[arg(long)]
    no_color: bool,
}

// ─────────────────────────────────────────────────────────────────────────────
//  Entry point
// ─────────────────────────────────────────────────────────────────────────────

fn main() {
    let cli = Cli::parse();

    if let Err(e) = logging::init(LogConfig { verbose: cli.verbose, log_file: None }) {
        eprintln!("{} cannot initialise logging: {}", "!".yellow(), e);
    }
    if !Capabilities::output_only(cli.no_color).rich_output.is_available() {
        colored::control::set_override(false);
    }

    let ctx = match context(cli) {
        Ok(ctx) => ctx,
        Err(e) => {
            render_setup_error(&e);
            std::process::exit(1);
        }
    };

    println!(
        "{} {} {}",
        "Assembling".cyan().bold(),
        format!("[target: {}]", ctx.os).dimmed(),
        format!("[out: {}]", ctx.out.display()).dimmed(),
    );
    println!("{}", "─".repeat(60).dimmed());

    let summary = pipeline::run(steps::STEPS, &ctx);
    summary.print();

    if !summary.is_success() {
        std::process::exit(1);
    }
}

fn context(cli: Cli) -> error::Result<Context> {
    let root = match cli.root {
        Some(r) => r,
        None => std::env::current_dir()?,
    };
    let manifest = match cli.manifest.as_deref() {
        Some(path) => Manifest::load(path)?,
        None => Manifest::embedded()?,
    };
    let out = cli.out.unwrap_or_else(|| root.join(&manifest.out));
    let ci_fetch = steps::ci_fetch_enabled(|k| std::env::var(k).ok());
    debug!(root = %root.display(), out = %out.display(), ci_fetch, "build context");

    Ok(Context {
        root,
        out,
        manifest,
        os:            cli.target_os.unwrap_or_else(Os::current),
        skip_download: cli.skip_download,
        no_compile:    cli.no_compile,
        prebuilt:      cli.prebuilt,
        ci_fetch,
    })
}

fn render_setup_error(e: &BuildError) {
    eprintln!("{} {}", "✗".red().bold(), e);
    if let BuildError::Manifest { .. } = e {
        eprintln!(
            "  {} see assemble/snes-ide.toml for the expected layout",
            "hint:".dimmed()
        );
    }
}
