// ─────────────────────────────────────────────────────────────────────────────
//  snes-ide-build :: pipeline  -  ordered steps, failures collected
//
//  Each step runs regardless of earlier failures. The summary lists every
//  step with its outcome and the process fails if any step failed.
// ─────────────────────────────────────────────────────────────────────────────

use std::time::{Duration, Instant};

use colored::Colorize;
use tracing::{error, info};

use crate::steps::Context;

/// What a step reports when it did not fail.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Progress {
    Done(String),
    Skipped(String),
}

pub type StepFn = fn(&Context) -> anyhow::Result<Progress>;

pub struct Step {
    pub name: &'static str,
    pub run:  StepFn,
}

#[derive(Debug)]
pub enum StepOutcome {
    Ok(String),
    Skipped(String),
    Failed(anyhow::Error),
}

#[derive(Debug)]
pub struct StepReport {
    pub name:    &'static str,
    pub outcome: StepOutcome,
    pub elapsed: Duration,
}

#[derive(Debug, Default)]
pub struct Summary {
    pub reports: Vec<StepReport>,
}

impl Summary {
    pub fn failed(&self) -> impl Iterator<Item = &StepReport> {
        self.reports.iter().filter(|r| matches!(r.outcome, StepOutcome::Failed(_)))
    }

    pub fn is_success(&self) -> bool {
        self.failed().next().is_none()
    }

    pub fn print(&self) {
        println!("\n{}", "Summary".bold());
        println!("{}", "─".repeat(60).dimmed());
        for r in &self.reports {
            let secs = format!("{:.2}s", r.elapsed.as_secs_f64()).dimmed();
            match &r.outcome {
                StepOutcome::Ok(detail) => {
                    println!("  {} {:<28} {} {}", "✓".green().bold(), r.name, detail.dimmed(), secs)
                }
                StepOutcome::Skipped(reason) => {
                    println!("  {} {:<28} {}", "-".yellow(), r.name, format!("skipped: {reason}").yellow())
                }
                StepOutcome::Failed(e) => {
                    println!("  {} {:<28} {}", "✗".red().bold(), r.name, format!("{e:#}").red())
                }
            }
        }

        let failed = self.failed().count();
        if failed == 0 {
            println!("\n{} distribution assembled", "✓".green().bold());
        } else {
            println!("\n{} {} step(s) failed", "✗".red().bold(), failed);
        }
    }
}

/// Run `steps` in order against `ctx`.
pub fn run(steps: &[Step], ctx: &Context) -> Summary {
    let mut summary = Summary::default();

    for step in steps {
        println!("{} {}", "→".cyan(), step.name);
        let t0 = Instant::now();

        let outcome = match (step.run)(ctx) {
            Ok(Progress::Done(detail)) => {
                info!(step = step.name, "{detail}");
                StepOutcome::Ok(detail)
            }
            Ok(Progress::Skipped(reason)) => {
                info!(step = step.name, "skipped: {reason}");
                StepOutcome::Skipped(reason)
            }
            Err(e) => {
                error!(step = step.name, "{e:#}");
                eprintln!("  {} {:#}", "✗".red().bold(), e);
                StepOutcome::Failed(e)
            }
        };

        summary.reports.push(StepReport { name: step.name, outcome, elapsed: t0.elapsed() });
    }

    summary
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::steps::tests::context;
    use pretty_assertions::assert_eq;

    fn ok(_: &Context) -> anyhow::Result<Progress> {
        Ok(Progress::Done("fine".into()))
    }

    fn boom(_: &Context) -> anyhow::Result<Progress> {
        anyhow::bail!("boom")
    }

    fn skip(_: &Context) -> anyhow::Result<Progress> {
        Ok(Progress::Skipped("not today".into()))
    }

    #[test]
    fn failure_does_not_stop_later_steps() {
        let tmp = tempfile::tempdir().unwrap();
        let ctx = context(tmp.path());
        let steps = [
            Step { name: "first",  run: ok },
            Step { name: "second", run: boom },
            Step { name: "third",  run: skip },
            Step { name: "fourth", run: ok },
        ];

        let summary = run(&steps, &ctx);
        assert_eq!(summary.reports.len(), 4);
        assert!(!summary.is_success());
        assert_eq!(summary.failed().map(|r| r.name).collect::<Vec<_>>(), vec!["second"]);
        assert!(matches!(summary.reports[2].outcome, StepOutcome::Skipped(_)));
        assert!(matches!(summary.reports[3].outcome, StepOutcome::Ok(_)));
    }

    #[test]
    fn skipped_is_not_failure() {
        let tmp = tempfile::tempdir().unwrap();
        let summary = run(&[Step { name: "only", run: skip }], &context(tmp.path()));
        assert!(summary.is_success());
    }
}
