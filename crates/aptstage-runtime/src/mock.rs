use crate::runner::CommandRunner;
use crate::tools::{APT_GET, DPKG};
use crate::RuntimeError;
use std::path::{Path, PathBuf};
use std::sync::{Mutex, PoisonError};

/// One recorded call to [`MockRunner::output`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Invocation {
    pub dir: PathBuf,
    pub program: String,
    pub args: Vec<String>,
}

impl Invocation {
    pub fn command_line(&self) -> String {
        let mut line = self.program.clone();
        for arg in &self.args {
            line.push(' ');
            line.push_str(arg);
        }
        line
    }

    pub fn has_arg(&self, arg: &str) -> bool {
        self.args.iter().any(|a| a == arg)
    }
}

#[derive(Debug, Clone)]
struct FailRule {
    program: String,
    needle: String,
    output: String,
}

/// Records every invocation instead of spawning processes.
///
/// `dpkg -x` and `apt-get ... install` leave marker files behind so callers
/// exercise the same filesystem paths as with real tools: extraction writes
/// `.deb-<stem>` into the target directory, and a download-only install drops
/// `<name>_0.0.0-mock_all.deb` into the `dir::cache` archives directory.
#[derive(Debug, Default)]
pub struct MockRunner {
    invocations: Mutex<Vec<Invocation>>,
    failures: Mutex<Vec<FailRule>>,
}

impl MockRunner {
    pub fn new() -> Self {
        Self::default()
    }

    /// Fail calls to `program` whose arguments contain `needle`, returning `output`.
    /// An empty needle matches every call to `program`.
    pub fn fail_on(&self, program: &str, needle: &str, output: &str) {
        self.failures
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(FailRule {
                program: program.to_owned(),
                needle: needle.to_owned(),
                output: output.to_owned(),
            });
    }

    pub fn invocations(&self) -> Vec<Invocation> {
        self.invocations
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    pub fn invocations_of(&self, program: &str) -> Vec<Invocation> {
        self.invocations()
            .into_iter()
            .filter(|i| i.program == program)
            .collect()
    }

    fn matching_failure(&self, program: &str, args: &[String]) -> Option<FailRule> {
        self.failures
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .iter()
            .find(|rule| {
                rule.program == program
                    && (rule.needle.is_empty() || args.iter().any(|a| a.contains(&rule.needle)))
            })
            .cloned()
    }
}

impl CommandRunner for MockRunner {
    fn name(&self) -> &'static str {
        "mock"
    }

    fn output(&self, dir: &Path, program: &str, args: &[String]) -> Result<String, RuntimeError> {
        self.invocations
            .lock()
            .map_err(|e| RuntimeError::RunnerUnavailable(format!("mock mutex poisoned: {e}")))?
            .push(Invocation {
                dir: dir.to_path_buf(),
                program: program.to_owned(),
                args: args.to_vec(),
            });

        if let Some(rule) = self.matching_failure(program, args) {
            return Err(RuntimeError::CommandFailed {
                program: program.to_owned(),
                status: "exit status: 100".to_owned(),
                output: rule.output,
            });
        }

        match program {
            DPKG => mock_extract(args)?,
            APT_GET => mock_download(args)?,
            _ => {}
        }

        Ok(format!("mock-exec: {program} {}\n", args.join(" ")))
    }
}

fn mock_extract(args: &[String]) -> Result<(), RuntimeError> {
    if let [flag, archive, dest] = args {
        if flag == "-x" {
            let dest = Path::new(dest);
            std::fs::create_dir_all(dest)?;
            let stem = Path::new(archive)
                .file_stem()
                .map(|s| s.to_string_lossy().into_owned())
                .unwrap_or_default();
            std::fs::write(
                dest.join(format!(".deb-{stem}")),
                format!("mock-unpacked:{archive}"),
            )?;
        }
    }
    Ok(())
}

fn mock_download(args: &[String]) -> Result<(), RuntimeError> {
    let Some(pos) = args.iter().position(|a| a == "--reinstall") else {
        return Ok(());
    };
    let Some(cache) = args.iter().find_map(|a| a.strip_prefix("dir::cache=")) else {
        return Ok(());
    };
    let archives = Path::new(cache).join("archives");
    std::fs::create_dir_all(&archives)?;
    for pkg in &args[pos + 1..] {
        std::fs::write(
            archives.join(format!("{pkg}_0.0.0-mock_all.deb")),
            format!("mock-deb:{pkg}"),
        )?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn args(list: &[&str]) -> Vec<String> {
        list.iter().map(|s| (*s).to_owned()).collect()
    }

    #[test]
    fn records_invocations_in_order() {
        let runner = MockRunner::new();
        runner
            .output(Path::new("/"), "apt-key", &args(&["adv", "x"]))
            .unwrap();
        runner
            .output(Path::new("/"), "apt-get", &args(&["update"]))
            .unwrap();

        let calls = runner.invocations();
        assert_eq!(calls.len(), 2);
        assert_eq!(calls[0].command_line(), "apt-key adv x");
        assert_eq!(calls[1].program, "apt-get");
        assert!(calls[1].has_arg("update"));
        assert_eq!(runner.invocations_of("apt-key").len(), 1);
    }

    #[test]
    fn scripted_failure_returns_output() {
        let runner = MockRunner::new();
        runner.fail_on("apt-key", "bad-url", "gpg: no valid OpenPGP data found");

        assert!(runner
            .output(Path::new("/"), "apt-key", &args(&["--fetch-keys", "good-url"]))
            .is_ok());
        let err = runner
            .output(Path::new("/"), "apt-key", &args(&["--fetch-keys", "bad-url"]))
            .unwrap_err();
        assert_eq!(err.output(), Some("gpg: no valid OpenPGP data found"));
        assert_eq!(runner.invocations().len(), 2);
    }

    #[test]
    fn empty_needle_fails_every_call() {
        let runner = MockRunner::new();
        runner.fail_on("dpkg", "", "boom");
        assert!(runner.output(Path::new("/"), "dpkg", &[]).is_err());
        assert!(runner.output(Path::new("/"), "apt-get", &[]).is_ok());
    }

    #[test]
    fn extract_leaves_marker() {
        let dir = tempfile::tempdir().unwrap();
        let dest = dir.path().join("install");
        let dest_str = dest.to_string_lossy().into_owned();
        let runner = MockRunner::new();
        runner
            .output(
                Path::new("/"),
                "dpkg",
                &args(&["-x", "/cache/foo.deb", dest_str.as_str()]),
            )
            .unwrap();
        assert_eq!(
            std::fs::read_to_string(dest.join(".deb-foo")).unwrap(),
            "mock-unpacked:/cache/foo.deb"
        );
    }

    #[test]
    fn download_only_install_populates_archives() {
        let dir = tempfile::tempdir().unwrap();
        let cache = dir.path().join("apt/cache");
        let runner = MockRunner::new();
        let option = format!("dir::cache={}", cache.display());
        runner
            .output(
                Path::new("/"),
                "apt-get",
                &args(&["-o", option.as_str(), "-y", "-d", "install", "--reinstall", "bar"]),
            )
            .unwrap();
        assert!(cache.join("archives/bar_0.0.0-mock_all.deb").is_file());
    }
}
