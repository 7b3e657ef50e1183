use std::fmt;
use std::process::Command;

/// A missing prerequisite with actionable install instructions.
#[derive(Debug)]
pub struct MissingPrereq {
    pub name: &'static str,
    pub purpose: &'static str,
    pub install_hint: &'static str,
}

impl fmt::Display for MissingPrereq {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "  - {}: {} (install: {})",
            self.name, self.purpose, self.install_hint
        )
    }
}

fn command_exists(name: &str) -> bool {
    Command::new("which")
        .arg(name)
        .output()
        .map(|o| o.status.success())
        .unwrap_or(false)
}

/// Check that the tools driven by the pipeline are on `PATH`.
/// Returns a list of missing items. Empty list means all prerequisites are met.
pub fn check_apt_prereqs() -> Vec<MissingPrereq> {
    let mut missing = Vec::new();

    if !command_exists("apt-get") {
        missing.push(MissingPrereq {
            name: "apt-get",
            purpose: "refreshing package lists and downloading repository packages",
            install_hint: "part of apt (Debian/Ubuntu base system)",
        });
    }

    if !command_exists("apt-key") {
        missing.push(MissingPrereq {
            name: "apt-key",
            purpose: "importing trusted repository keys",
            install_hint: "part of apt before 2.5; on newer systems: apt install gnupg apt-key shim",
        });
    }

    if !command_exists("dpkg") {
        missing.push(MissingPrereq {
            name: "dpkg",
            purpose: "unpacking .deb archives into the install root",
            install_hint: "part of dpkg (Debian/Ubuntu base system)",
        });
    }

    missing
}

/// Format a list of missing prerequisites into a user-friendly error message.
pub fn format_missing(missing: &[MissingPrereq]) -> String {
    use std::fmt::Write as _;
    let mut msg = String::from("missing prerequisites:\n");
    for m in missing {
        let _ = writeln!(msg, "{m}");
    }
    msg.push_str("\naptstage drives these tools to stage packages.");
    msg
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_prereq_display() {
        let m = MissingPrereq {
            name: "dpkg",
            purpose: "unpacking archives",
            install_hint: "apt install dpkg",
        };
        let s = format!("{m}");
        assert!(s.contains("dpkg"));
        assert!(s.contains("unpacking archives"));
        assert!(s.contains("apt install dpkg"));
    }

    #[test]
    fn format_missing_produces_readable_output() {
        let items = vec![
            MissingPrereq {
                name: "apt-get",
                purpose: "downloads",
                install_hint: "apt",
            },
            MissingPrereq {
                name: "apt-key",
                purpose: "keys",
                install_hint: "gnupg",
            },
        ];
        let output = format_missing(&items);
        assert!(output.contains("missing prerequisites:"));
        assert!(output.contains("apt-get"));
        assert!(output.contains("apt-key"));
    }
}
