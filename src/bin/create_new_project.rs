// ─────────────────────────────────────────────────────────────────────────────
//  create-new-project  -  copy the SNES project template into a new folder
//
//  USAGE
//  ─────
//    create-new-project                                 prompt for name/parent
//    create-new-project -n game -p ~/Projects           no prompts
//    create-new-project --ci -n game -p ~/Projects      JSON log, no pause
//
//  EXIT CODES
//  ──────────
//    0 ok   1 usage   2 name   3 parent   4 target exists
//    5 template not found   6 copy failure
// ─────────────────────────────────────────────────────────────────────────────

use std::io::{self, BufRead, IsTerminal, Write};
use std::path::{Path, PathBuf};

use clap::Parser;
use colored::Colorize;
use tracing::{debug, error};

use snes_ide::capability::Capabilities;
use snes_ide::logging::{self, LogConfig};
use snes_ide::project::{self, HeadlessLog, ProjectRequest, TemplateSearch};
use snes_ide::{roots, Os, Settings};

const EXIT_USAGE: i32 = 1;

// ─────────────────────────────────────────────────────────────────────────────
//  CLI definition (clap derive)
// ─────────────────────────────────────────────────────────────────────────────

#[derive(Parser)]
#[command(
    name    = "create-new-project",
    version = env!("CARGO_PKG_VERSION"),
    about   = "Create a new SNES-IDE project (interactive or headless)",
    long_about = None,
)]
struct Cli {
    /// Project name  (alphanumeric, underscore, hyphen)
    #[arg(long, short = 'n')]
    name: Option<String>,

    /// Parent folder where the project is created
    #[arg(long, short = 'p')]
    parent: Option<String>,

    /// Non-interactive mode for CI; requires --name and --parent
    #[arg(long, alias = "ci")]
    headless: bool,

    /// JSON log written in headless mode
    #[arg(long, value_name = "FILE")]
    log: Option<PathBuf>,

    /// Template directory  (skips the template search)
    #[arg(long, value_name = "DIR")]
    template: Option<PathBuf>,

    /// Debug logging
    #[arg(long)]
    debug: bool,

    /// Also write debug logs to FILE
    #[arg(long, value_name = "FILE")]
    debug_log: Option<PathBuf>,

    /// Disable colored output
    #[arg(long)]
    no_color: bool,
}

// ─────────────────────────────────────────────────────────────────────────────
//  Entry point
// ─────────────────────────────────────────────────────────────────────────────

fn main() {
    let cli = Cli::parse();

    let log_config = LogConfig { verbose: cli.debug, log_file: cli.debug_log.as_deref() };
    if let Err(e) = logging::init(log_config) {
        eprintln!("{} cannot open debug log: {}", "!".yellow(), e);
    }

    if !Capabilities::output_only(cli.no_color).rich_output.is_available() {
        colored::control::set_override(false);
    }

    let search = template_search(cli.template.clone());
    let code = if cli.headless {
        headless(&cli, search)
    } else {
        interactive(&cli, search)
    };
    std::process::exit(code);
}

fn template_search(explicit: Option<PathBuf>) -> TemplateSearch {
    let exe_dir = std::env::current_exe()
        .ok()
        .and_then(|p| p.parent().map(Path::to_path_buf));
    TemplateSearch {
        explicit,
        exe_dir,
        root: Settings::from_env().root_override,
        home: roots::home_dir(),
    }
}

// ─────────────────────────────────────────────────────────────────────────────
//  Headless
// ─────────────────────────────────────────────────────────────────────────────

fn headless(cli: &Cli, template: TemplateSearch) -> i32 {
    let (Some(name), Some(parent)) = (cli.name.as_deref(), cli.parent.as_deref()) else {
        eprintln!("{} --headless requires --name and --parent", "✗".red().bold());
        return EXIT_USAGE;
    };

    let mut log = HeadlessLog::started(name, parent);
    let log_path = cli.log.clone().unwrap_or_else(|| log.default_path());

    let req = ProjectRequest {
        name:   name.to_owned(),
        parent: project::normalize_path(parent, roots::home_dir().as_deref()),
        template,
        os:     Os::current(),
    };
    debug!(parent = %req.parent.display(), "normalized parent");

    let code = match project::create(&req) {
        Ok(created) => {
            log.succeed(&created.path);
            println!("{}", log.message);
            0
        }
        Err(e) => {
            error!("{e}");
            log.fail(e.to_string());
            eprintln!("{}", log.message);
            e.exit_code()
        }
    };

    if let Err(e) = log.write(&log_path) {
        debug!(path = %log_path.display(), "cannot write headless log: {e}");
    }
    code
}

// ─────────────────────────────────────────────────────────────────────────────
//  Interactive
// ─────────────────────────────────────────────────────────────────────────────

fn interactive(cli: &Cli, template: TemplateSearch) -> i32 {
    let stdin = io::stdin();
    let mut input = stdin.lock();
    let attached = io::stdin().is_terminal();

    let (name, parent) = match (cli.name.clone(), cli.parent.clone()) {
        (Some(n), Some(p)) => (n, p),
        (name, parent) => {
            println!("{}", "Welcome to the SNES-IDE project creator!".yellow().bold());
            println!("This tool creates a new SNES project from the bundled template.\n");

            let name = match name {
                Some(n) => n,
                None => match prompt(&mut input, "Project name (letters, digits, _ or -):") {
                    Some(n) => n,
                    None => return input_closed(),
                },
            };
            let parent = match parent {
                Some(p) => p,
                None => match prompt(&mut input, &parent_hint()) {
                    Some(p) => p,
                    None => return input_closed(),
                },
            };
            (name, parent)
        }
    };

    let req = ProjectRequest {
        name,
        parent: project::normalize_path(&parent, roots::home_dir().as_deref()),
        template,
        os: Os::current(),
    };
    debug!(name = %req.name, parent = %req.parent.display(), "creating project");

    let code = match project::create(&req) {
        Ok(created) => {
            println!(
                "\n{} project created {}",
                "✓".green().bold(),
                format!("[{} files]", created.files_copied).dimmed(),
            );
            println!("  {} {}", "location:".dimmed(), created.path.display().to_string().bold());
            0
        }
        Err(e) => {
            error!("{e}");
            eprintln!("{} {}", "✗ Error:".red().bold(), e);
            e.exit_code()
        }
    };

    if attached {
        pause(&mut input);
    }
    code
}

fn parent_hint() -> String {
    if Os::current().is_windows() {
        "Full path of the parent folder (e.g. C:\\Projects):".into()
    } else {
        "Full path of the parent folder (e.g. ~/Projects):".into()
    }
}

fn prompt<R: BufRead>(input: &mut R, label: &str) -> Option<String> {
    println!("{}", label.bold());
    print!("{} ", ">".cyan());
    let _ = io::stdout().flush();

    let mut line = String::new();
    match input.read_line(&mut line) {
        Ok(0) | Err(_) => None,
        Ok(_) => Some(line.trim().to_owned()),
    }
}

fn pause<R: BufRead>(input: &mut R) {
    println!("\nPress Enter to exit...");
    let mut line = String::new();
    let _ = input.read_line(&mut line);
}

fn input_closed() -> i32 {
    eprintln!("{} no interactive input available (use --headless)", "✗".red().bold());
    EXIT_USAGE
}
