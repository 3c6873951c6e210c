// ─────────────────────────────────────────────────────────────────────────────
//  snes_ide  -  shared library for the launcher, the project creator and the
//  distribution builder
// ─────────────────────────────────────────────────────────────────────────────

pub mod action;
pub mod capability;
pub mod dispatch;
pub mod editor;
pub mod emulator;
pub mod error;
pub mod launcher;
pub mod logging;
pub mod menu;
pub mod platform;
pub mod project;
pub mod resolver;
pub mod roots;
pub mod settings;
pub mod toolchain;

pub use action::Action;
pub use capability::{Capabilities, Capability};
pub use dispatch::{LaunchPlan, PlanTarget};
pub use error::{LauncherError, Result};
pub use launcher::LaunchRequest;
pub use platform::{Os, PlatformProfile};
pub use project::ProjectError;
pub use resolver::{resolve, ResolutionRequest, ResolvedLauncher};
pub use settings::Settings;
