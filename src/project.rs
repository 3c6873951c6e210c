// ─────────────────────────────────────────────────────────────────────────────
//  snes-ide :: project  -  new project creation from the bundled template
//
//  Order of checks, all before anything is written:
//
//    1. name     non-empty, [A-Za-z0-9_-] only
//    2. parent   exists, is a directory, is writable
//    3. target   <parent>/<name> does not exist yet
//    4. template first existing candidate directory
//
//  Then the template tree is copied to the target. A failed copy removes the
//  target again, which step 3 guarantees this run created.
// ─────────────────────────────────────────────────────────────────────────────

use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::time::{SystemTime, UNIX_EPOCH};

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, warn};
use walkdir::WalkDir;

use crate::platform::Os;

#[derive(Debug, Error)]
pub enum ProjectError {
    #[error("Project name cannot be empty")]
    EmptyName,

    #[error("Invalid project name '{0}'. Please use only alphanumeric characters, underscores, or hyphens.")]
    InvalidName(String),

    #[error("Path cannot be empty")]
    EmptyParent,

    #[error("The path does not exist: {}", .0.display())]
    ParentMissing(PathBuf),

    #[error("The path is not a directory: {}", .0.display())]
    ParentNotDirectory(PathBuf),

    #[error("Cannot write to directory {}: {source}", .path.display())]
    ParentNotWritable {
        path:   PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("Target project directory already exists: {}", .0.display())]
    TargetExists(PathBuf),

    #[error("Could not find template directory; tried:{}", list(.tried))]
    TemplateNotFound { tried: Vec<PathBuf> },

    #[error("Error copying files to {}: {source}", .target.display())]
    Copy {
        target: PathBuf,
        #[source]
        source: io::Error,
    },
}

impl ProjectError {
    /// Process exit code used by the headless helper.
    pub fn exit_code(&self) -> i32 {
        match self {
            ProjectError::EmptyName | ProjectError::InvalidName(_) => 2,
            ProjectError::EmptyParent
            | ProjectError::ParentMissing(_)
            | ProjectError::ParentNotDirectory(_)
            | ProjectError::ParentNotWritable { .. } => 3,
            ProjectError::TargetExists(_)            => 4,
            ProjectError::TemplateNotFound { .. }    => 5,
            ProjectError::Copy { .. }                => 6,
        }
    }
}

fn list(paths: &[PathBuf]) -> String {
    paths.iter().map(|p| format!("\n    {}", p.display())).collect()
}

// ─────────────────────────────────────────────────────────────────────────────
//  Validation
// ─────────────────────────────────────────────────────────────────────────────

pub fn validate_name(name: &str) -> Result<(), ProjectError> {
    if name.is_empty() {
        return Err(ProjectError::EmptyName);
    }
    if !name.chars().all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '-') {
        return Err(ProjectError::InvalidName(name.to_owned()));
    }
    Ok(())
}

/// Parent must exist, be a directory and accept a new file.
pub fn validate_parent(parent: &Path) -> Result<(), ProjectError> {
    if parent.as_os_str().is_empty() {
        return Err(ProjectError::EmptyParent);
    }
    if !parent.exists() {
        return Err(ProjectError::ParentMissing(parent.to_path_buf()));
    }
    if !parent.is_dir() {
        return Err(ProjectError::ParentNotDirectory(parent.to_path_buf()));
    }

    let marker = parent.join(format!(".write_test_{}", now_nanos()));
    fs::File::create(&marker)
        .and_then(|_| fs::remove_file(&marker))
        .map_err(|source| ProjectError::ParentNotWritable { path: parent.to_path_buf(), source })
}

pub fn validate_target(parent: &Path, name: &str) -> Result<PathBuf, ProjectError> {
    let target = parent.join(name);
    if target.exists() {
        return Err(ProjectError::TargetExists(target));
    }
    Ok(target)
}

/// Expand a leading `~` and make the path absolute. Existing paths are
/// canonicalized; others are joined onto the current directory.
pub fn normalize_path(raw: &str, home: Option<&Path>) -> PathBuf {
    let raw = raw.trim();
    let expanded = match (raw.strip_prefix('~'), home) {
        (Some(rest), Some(home)) if rest.is_empty() => home.to_path_buf(),
        (Some(rest), Some(home)) if rest.starts_with('/') || rest.starts_with('\\') => {
            home.join(&rest[1..])
        }
        _ => PathBuf::from(raw),
    };

    if expanded.as_os_str().is_empty() {
        return expanded;
    }
    if let Ok(canon) = expanded.canonicalize() {
        return canon;
    }
    if expanded.is_absolute() {
        expanded
    } else {
        std::env::current_dir().map(|cwd| cwd.join(&expanded)).unwrap_or(expanded)
    }
}

// ─────────────────────────────────────────────────────────────────────────────
//  Template lookup
// ─────────────────────────────────────────────────────────────────────────────

/// Inputs for the template search, gathered by the caller.
#[derive(Debug, Clone, Default)]
pub struct TemplateSearch {
    pub explicit: Option<PathBuf>,
    pub exe_dir:  Option<PathBuf>,
    pub root:     Option<PathBuf>,
    pub home:     Option<PathBuf>,
}

impl TemplateSearch {
    pub fn candidates(&self, os: Os) -> Vec<PathBuf> {
        let mut out = Vec::new();
        let template = |base: &Path| base.join("libs").join("template");

        if let Some(dir) = &self.explicit {
            out.push(dir.clone());
        }
        if let Some(exe) = &self.exe_dir {
            out.push(template(&exe.join("..")));
            out.push(template(exe));
        }
        if let Some(root) = &self.root {
            out.push(template(root));
        }
        if os == Os::MacOs {
            if let Some(exe) = &self.exe_dir {
                out.push(template(&exe.join("..").join("Resources")));
            }
        }
        if !os.is_windows() {
            out.push(PathBuf::from("/usr/local/share/snes-ide/libs/template"));
            out.push(PathBuf::from("/usr/share/snes-ide/libs/template"));
            if let Some(home) = &self.home {
                out.push(template(&home.join(".local").join("share").join("snes-ide")));
            }
        }
        out
    }

    pub fn find(&self, os: Os) -> Result<PathBuf, ProjectError> {
        let tried = self.candidates(os);
        for candidate in &tried {
            debug!(candidate = %candidate.display(), "checking template candidate");
            if candidate.is_dir() {
                return Ok(candidate.canonicalize().unwrap_or_else(|_| candidate.clone()));
            }
        }
        Err(ProjectError::TemplateNotFound { tried })
    }
}

// ─────────────────────────────────────────────────────────────────────────────
//  Creation
// ─────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone)]
pub struct ProjectRequest {
    pub name:     String,
    pub parent:   PathBuf,
    pub template: TemplateSearch,
    pub os:       Os,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CreatedProject {
    pub path:         PathBuf,
    pub template:     PathBuf,
    pub files_copied: usize,
}

/// Validate everything, then copy the template into `<parent>/<name>`.
pub fn create(req: &ProjectRequest) -> Result<CreatedProject, ProjectError> {
    validate_name(&req.name)?;
    validate_parent(&req.parent)?;
    let target = validate_target(&req.parent, &req.name)?;
    let template = req.template.find(req.os)?;

    debug!(template = %template.display(), target = %target.display(), "copying template");
    let files_copied = match copy_tree(&template, &target) {
        Ok(n) => n,
        Err(source) => {
            if let Err(e) = fs::remove_dir_all(&target) {
                warn!(target = %target.display(), error = %e, "cannot remove partial project");
            }
            return Err(ProjectError::Copy { target, source });
        }
    };

    Ok(CreatedProject { path: target, template, files_copied })
}

/// Recursively copy `src` into `dst`, creating directories as needed.
/// Returns the number of files copied.
pub fn copy_tree(src: &Path, dst: &Path) -> io::Result<usize> {
    fs::create_dir_all(dst)?;
    let mut copied = 0;

    for entry in WalkDir::new(src).min_depth(1).sort_by_file_name() {
        let entry = entry.map_err(io::Error::other)?;
        let rel = entry
            .path()
            .strip_prefix(src)
            .map_err(io::Error::other)?;
        let out = dst.join(rel);

        if entry.file_type().is_dir() {
            fs::create_dir_all(&out)?;
        } else {
            if let Some(parent) = out.parent() {
                fs::create_dir_all(parent)?;
            }
            fs::copy(entry.path(), &out)?;
            copied += 1;
        }
    }

    Ok(copied)
}

// ─────────────────────────────────────────────────────────────────────────────
//  Headless log
// ─────────────────────────────────────────────────────────────────────────────

/// JSON record written by the headless helper.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct HeadlessLog {
    pub timestamp:    u64,
    pub action:       String,
    pub name:         String,
    pub parent:       String,
    pub status:       String,
    pub message:      String,
    pub created_path: Option<String>,
}

impl HeadlessLog {
    pub fn started(name: &str, parent: &str) -> Self {
        HeadlessLog {
            timestamp:    now_secs(),
            action:       "create-new-project".into(),
            name:         name.to_owned(),
            parent:       parent.to_owned(),
            status:       "failed".into(),
            message:      String::new(),
            created_path: None,
        }
    }

    pub fn succeed(&mut self, created: &Path) {
        self.status = "ok".into();
        self.message = "Project created successfully.".into();
        self.created_path = Some(created.display().to_string());
    }

    pub fn fail(&mut self, message: impl Into<String>) {
        self.status = "failed".into();
        self.message = message.into();
    }

    /// Default location: `<tmp>/create-new-project-ci-<timestamp>.log`.
    pub fn default_path(&self) -> PathBuf {
        std::env::temp_dir().join(format!("create-new-project-ci-{}.log", self.timestamp))
    }

    /// Write as pretty JSON. Errors are returned, callers treat them as
    /// non-fatal.
    pub fn write(&self, path: &Path) -> io::Result<()> {
        let json = serde_json::to_string_pretty(self).map_err(io::Error::other)?;
        fs::write(path, json)
    }
}

fn now_secs() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs())
        .unwrap_or(0)
}

fn now_nanos() -> u128 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_nanos())
        .unwrap_or(0)
}
