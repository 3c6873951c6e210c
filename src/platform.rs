// ─────────────────────────────────────────────────────────────────────────────
//  snes-ide :: platform  -  per-OS capability table
//
//  Every OS-dependent decision the launcher and the builder make is read from
//  one row of PROFILES:
//
//    windows   .bat > .exe > .py    batch files go through `cmd /C`
//    macos     .sh  > .py  > (none) executable bit required
//    linux     .sh  > .py  > (none) executable bit required
// ─────────────────────────────────────────────────────────────────────────────

use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Os {
    Windows,
    MacOs,
    Linux,
}

/// How batch-style wrapper scripts are started.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ShellConvention {
    /// `cmd /C <script>`
    CmdSlashC,
    /// The kernel runs the script through its shebang.
    Direct,
}

#[derive(Debug, Clone)]
pub struct PlatformProfile {
    pub os:             Os,
    /// Launcher extensions in preference order; `""` means no extension.
    pub extensions:     &'static [&'static str],
    pub shell:          ShellConvention,
    /// Whether scripts and bare executables need the exec permission bit.
    pub needs_exec_bit: bool,
    /// Interpreter commands tried, in order, for `.py` launchers.
    pub interpreters:   &'static [&'static str],
    /// Suffix of native executables (`.exe` or nothing).
    pub exe_suffix:     &'static str,
    /// Extension of the wrapper scripts shipped in `tools/`.
    pub wrapper_ext:    &'static str,
}

static PROFILES: &[PlatformProfile] = &[
    PlatformProfile {
        os: Os::Windows,
        extensions: &[".bat", ".exe", ".py"],
        shell: ShellConvention::CmdSlashC,
        needs_exec_bit: false,
        interpreters: &["py", "python", "python3"],
        exe_suffix: ".exe",
        wrapper_ext: ".bat",
    },
    PlatformProfile {
        os: Os::MacOs,
        extensions: &[".sh", ".py", ""],
        shell: ShellConvention::Direct,
        needs_exec_bit: true,
        interpreters: &["python3", "python"],
        exe_suffix: "",
        wrapper_ext: ".sh",
    },
    PlatformProfile {
        os: Os::Linux,
        extensions: &[".sh", ".py", ""],
        shell: ShellConvention::Direct,
        needs_exec_bit: true,
        interpreters: &["python3", "python"],
        exe_suffix: "",
        wrapper_ext: ".sh",
    },
];

impl Os {
    /// The OS this binary was compiled for. BSDs and other unixes share the
    /// Linux row.
    pub fn current() -> Os {
        if cfg!(target_os = "windows") {
            Os::Windows
        } else if cfg!(target_os = "macos") {
            Os::MacOs
        } else {
            Os::Linux
        }
    }

    pub fn profile(self) -> &'static PlatformProfile {
        match self {
            Os::Windows => &PROFILES[0],
            Os::MacOs   => &PROFILES[1],
            Os::Linux   => &PROFILES[2],
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            Os::Windows => "windows",
            Os::MacOs   => "macos",
            Os::Linux   => "linux",
        }
    }

    pub fn is_windows(self) -> bool {
        self == Os::Windows
    }
}

impl fmt::Display for Os {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Os {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "windows" | "win" | "win32" | "win64" => Ok(Os::Windows),
            "macos" | "mac" | "darwin" | "osx"   => Ok(Os::MacOs),
            "linux"                              => Ok(Os::Linux),
            other => Err(format!("unknown platform '{other}' (expected windows, macos or linux)")),
        }
    }
}

impl PlatformProfile {
    pub fn current() -> &'static PlatformProfile {
        Os::current().profile()
    }

    /// `root/<base><ext>` for one extension of this profile.
    pub fn candidate(&self, root: &Path, base: &str, ext: &str) -> PathBuf {
        root.join(format!("{base}{ext}"))
    }

    /// Map a Windows-style binary name to this platform: `816-tcc.exe` stays
    /// as is on Windows and loses its `.exe` elsewhere.
    pub fn bin_name(&self, name: &str) -> String {
        if self.os.is_windows() {
            return name.to_owned();
        }
        let len = name.len();
        if len >= 4 && name.is_char_boundary(len - 4) && name[len - 4..].eq_ignore_ascii_case(".exe") {
            name[..len - 4].to_owned()
        } else {
            name.to_owned()
        }
    }

    pub fn bin_path(&self, base: &Path, name: &str) -> PathBuf {
        base.join(self.bin_name(name))
    }

    /// Native executable file name for a binary stem (`snes-ide` → `snes-ide.exe`).
    pub fn exe_name(&self, stem: &str) -> String {
        format!("{stem}{}", self.exe_suffix)
    }

    /// True for launchers the kernel executes itself and that therefore need
    /// the exec bit (`.sh` or extensionless) on this platform.
    pub fn wants_exec_bit(&self, path: &Path) -> bool {
        if !self.needs_exec_bit {
            return false;
        }
        match path.extension().and_then(|e| e.to_str()) {
            None       => true,
            Some("sh") => true,
            Some(_)    => false,
        }
    }
}
