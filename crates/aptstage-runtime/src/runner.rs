use crate::RuntimeError;
use std::path::Path;

/// Capability to run an external program and capture its output.
///
/// Implementations return the combined stdout/stderr on success. A non-zero
/// exit must surface as [`RuntimeError::CommandFailed`] with the captured
/// output attached.
pub trait CommandRunner: Send + Sync {
    fn name(&self) -> &str;

    fn output(&self, dir: &Path, program: &str, args: &[String]) -> Result<String, RuntimeError>;
}

impl<T: CommandRunner + ?Sized> CommandRunner for std::sync::Arc<T> {
    fn name(&self) -> &str {
        (**self).name()
    }

    fn output(&self, dir: &Path, program: &str, args: &[String]) -> Result<String, RuntimeError> {
        (**self).output(dir, program, args)
    }
}

pub fn select_runner(name: &str) -> Result<Box<dyn CommandRunner>, RuntimeError> {
    match name {
        "host" => Ok(Box::new(crate::process::HostRunner::new())),
        "mock" => Ok(Box::new(crate::mock::MockRunner::new())),
        other => Err(RuntimeError::RunnerUnavailable(other.to_owned())),
    }
}
