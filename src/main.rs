// ─────────────────────────────────────────────────────────────────────────────
//  snes-ide  -  launcher for the bundled SNES development tools
//
//  USAGE
//  ─────
//    snes-ide                       interactive menu
//    snes-ide 5                     run the compiler launcher
//    snes-ide emulator -- game.sfc  forward arguments to the emulator
//    snes-ide --dry-run 1           show what would run
//    snes-ide --list                actions and search roots
// ─────────────────────────────────────────────────────────────────────────────

use std::ffi::OsString;
use std::io;
use std::path::PathBuf;

use clap::Parser;
use colored::Colorize;
use tracing::debug;

use snes_ide::capability::Capabilities;
use snes_ide::launcher::{self, LaunchRequest};
use snes_ide::logging::{self, LogConfig};
use snes_ide::platform::PlatformProfile;
use snes_ide::roots;
use snes_ide::menu::{self, Selection};
use snes_ide::{Action, LauncherError, Result, Settings};

// ─────────────────────────────────────────────────────────────────────────────
//  CLI definition (clap derive)
// ─────────────────────────────────────────────────────────────────────────────

#[derive(Parser)]
#[command(
    name    = "snes-ide",
    version = env!("CARGO_PKG_VERSION"),
    about   = "Launch the SNES-IDE tools (editor, compiler, emulator, ...)",
    long_about = None,
)]
struct Cli {
    /// Action to run: 0-6 or a name such as `compiler` or `emulator`
    option: Option<String>,

    /// Same as the positional OPTION, and takes precedence over it
    #[arg(long = "option", value_name = "N")]
    option_flag: Option<String>,

    /// Resolve and print the command without running it
    #[arg(long)]
    dry_run: bool,

    /// Installation root searched first  (overrides SNESIDE_ROOT)
    #[arg(long, value_name = "DIR")]
    root: Option<PathBuf>,

    /// Project directory handed to the text editor  (default: cwd)
    #[arg(long, value_name = "DIR")]
    project: Option<PathBuf>,

    /// Print the action table and search roots, then exit
    #[arg(long)]
    list: bool,

    /// Debug logging on stderr
    #[arg(long, short = 'v')]
    verbose: bool,

    /// Disable colored output
    #[arg(long)]
    no_color: bool,

    /// Arguments forwarded to the launched tool
    #[arg(last = true)]
    args: Vec<OsString>,
}

// ─────────────────────────────────────────────────────────────────────────────
//  Entry point
// ─────────────────────────────────────────────────────────────────────────────

fn main() {
    let cli = Cli::parse();

    if let Err(e) = logging::init(LogConfig { verbose: cli.verbose, log_file: None }) {
        eprintln!("{} cannot initialise logging: {}", "!".yellow(), e);
    }

    let caps = Capabilities::detect(cli.no_color);
    if !caps.rich_output.is_available() {
        colored::control::set_override(false);
    }

    let settings = Settings::from_env();

    if let Err(e) = run(cli, settings, &caps) {
        render_error(&e);
        std::process::exit(1);
    }
}

fn run(cli: Cli, settings: Settings, caps: &Capabilities) -> Result<()> {
    let profile = PlatformProfile::current();
    let explicit_root = cli.root.clone().or(settings.root_override.clone());
    let home = roots::home_dir();
    let search = roots::search_roots(explicit_root.as_deref(), home.as_deref(), &roots::bundle_root());
    debug!(roots = ?search, platform = %profile.os, "search roots");

    if cli.list {
        print_list(profile, &search);
        return Ok(());
    }

    let action = choose_action(&cli, &settings)?;
    let dry_run = cli.dry_run || settings.dry_run;

    let req = LaunchRequest {
        action,
        profile,
        roots:             search,
        explicit_root,
        emulator_override: settings.emulator_override.clone(),
        project_dir:       launcher::project_dir(cli.project.as_deref()),
        extra_args:        cli.args,
        dry_run,
    };

    let plan = launcher::plan(&req, caps)?;
    debug!(source = %launcher::describe_source(&plan), "plan ready");

    if dry_run {
        println!(
            "{} {} {}",
            "Dry run".cyan().bold(),
            format!("[{}]", action.base_name()).dimmed(),
            format!("[{}]", launcher::describe_source(&plan)).dimmed(),
        );
        println!("  {}", plan.command_line());
        if plan.interpreter_missing {
            println!(
                "  {} no Python interpreter on PATH (looked for: {})",
                "!".yellow(),
                profile.interpreters.join(", "),
            );
        }
        return Ok(());
    }

    println!(
        "{} {} {}",
        "Launching".cyan().bold(),
        action.label(),
        format!("[{}]", launcher::describe_source(&plan)).dimmed(),
    );
    plan.execute()
}

fn choose_action(cli: &Cli, settings: &Settings) -> Result<Action> {
    match menu::select(cli.option_flag.as_deref(), cli.option.as_deref(), settings)? {
        Selection::Action(action) => Ok(action),
        Selection::Menu => {
            let stdin = io::stdin();
            let mut input = stdin.lock();
            let mut out = io::stdout();
            menu::choose(&mut input, &mut out)
        }
    }
}

fn print_list(profile: &PlatformProfile, search: &[PathBuf]) {
    println!("{:<4} {:<16} {}", "N", "ACTION", "DESCRIPTION");
    println!("{}", "─".repeat(60).dimmed());
    for info in Action::catalog() {
        println!("{:<4} {:<16} {}", info.index, info.base, info.label);
    }

    println!("\n{} {}", "Search roots".bold(), format!("[{}]", profile.os).dimmed());
    for (i, root) in search.iter().enumerate() {
        let mark = if root.is_dir() { "✓".green() } else { "✗".red() };
        println!("  {} {} {}", mark, format!("{}.", i + 1).dimmed(), root.display());
    }
}

// ─────────────────────────────────────────────────────────────────────────────
//  Error rendering
// ─────────────────────────────────────────────────────────────────────────────

fn render_error(e: &LauncherError) {
    if e.is_resolution_failure() {
        eprintln!("{} {}", "✗ nothing to launch".red().bold(), e);
        eprintln!(
            "  {} set {} or pass {} to point at an installation",
            "hint:".dimmed(),
            "SNESIDE_ROOT".bold(),
            "--root DIR".bold(),
        );
    } else if e.is_execution_failure() {
        eprintln!("{} {}", "✗ launch failed".red().bold(), e);
    } else {
        eprintln!("{} {}", "✗".red().bold(), e);
    }
}
