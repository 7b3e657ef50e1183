use crate::runner::CommandRunner;
use crate::RuntimeError;
use std::path::Path;
use std::process::Command;
use tracing::debug;

/// Runs programs as host processes and blocks until they exit.
#[derive(Debug, Default, Clone, Copy)]
pub struct HostRunner;

impl HostRunner {
    pub fn new() -> Self {
        Self
    }
}

impl CommandRunner for HostRunner {
    fn name(&self) -> &'static str {
        "host"
    }

    fn output(&self, dir: &Path, program: &str, args: &[String]) -> Result<String, RuntimeError> {
        debug!("exec: {program} {} (in {})", args.join(" "), dir.display());
        let result = Command::new(program)
            .args(args)
            .current_dir(dir)
            .output()
            .map_err(|source| RuntimeError::Spawn {
                program: program.to_owned(),
                source,
            })?;

        // stdout first, then stderr
        let mut output = String::from_utf8_lossy(&result.stdout).into_owned();
        output.push_str(&String::from_utf8_lossy(&result.stderr));

        if result.status.success() {
            Ok(output)
        } else {
            Err(RuntimeError::CommandFailed {
                program: program.to_owned(),
                status: result.status.to_string(),
                output,
            })
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn args(list: &[&str]) -> Vec<String> {
        list.iter().map(|s| (*s).to_owned()).collect()
    }

    #[test]
    fn captures_stdout_and_stderr() {
        let out = HostRunner::new()
            .output(
                Path::new("/"),
                "sh",
                &args(&["-c", "echo out; echo err 1>&2"]),
            )
            .unwrap();
        assert_eq!(out, "out\nerr\n");
    }

    #[test]
    fn runs_in_working_directory() {
        let dir = tempfile::tempdir().unwrap();
        let out = HostRunner::new()
            .output(dir.path(), "pwd", &[])
            .unwrap();
        let canonical = dir.path().canonicalize().unwrap();
        assert_eq!(out.trim(), canonical.to_string_lossy());
    }

    #[test]
    fn non_zero_exit_keeps_output() {
        let err = HostRunner::new()
            .output(Path::new("/"), "sh", &args(&["-c", "echo broken; exit 3"]))
            .unwrap_err();
        assert!(matches!(err, RuntimeError::CommandFailed { .. }));
        assert_eq!(err.output(), Some("broken\n"));
    }

    #[test]
    fn missing_program_is_spawn_error() {
        let err = HostRunner::new()
            .output(Path::new("/"), "aptstage-no-such-tool", &[])
            .unwrap_err();
        assert!(matches!(err, RuntimeError::Spawn { .. }));
    }
}
