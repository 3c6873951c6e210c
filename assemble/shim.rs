// ─────────────────────────────────────────────────────────────────────────────
//  snes-ide-build :: shim  -  launchers for script entry points
// ─────────────────────────────────────────────────────────────────────────────

use snes_ide::Os;

/// File name and body of the shim that runs `script` (a file name sitting
/// next to the shim).
pub fn shim_for(name: &str, script: &str, os: Os) -> (String, String) {
    if os.is_windows() {
        let body = format!(
            "@echo off\r\nrem Runs {script} with the Python launcher.\r\n\
             python \"%~dp0{script}\" %*\r\n"
        );
        (format!("{name}.bat"), body)
    } else {
        let body = format!(
            "#!/bin/sh\n# Runs {script} with python3.\n\
             exec python3 \"$(dirname \"$0\")/{script}\" \"$@\"\n"
        );
        (format!("{name}.sh"), body)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn posix_shim_execs_python3() {
        let (file, body) = shim_for("automatizer", "automatizer.py", Os::Linux);
        assert_eq!(file, "automatizer.sh");
        assert!(body.starts_with("#!/bin/sh\n"));
        assert!(body.contains("exec python3 \"$(dirname \"$0\")/automatizer.py\" \"$@\""));
    }

    #[test]
    fn windows_shim_is_a_batch_file() {
        let (file, body) = shim_for("automatizer", "automatizer.py", Os::Windows);
        assert_eq!(file, "automatizer.bat");
        assert!(body.contains("python \"%~dp0automatizer.py\" %*"));
        assert!(body.contains("\r\n"));
    }
}
