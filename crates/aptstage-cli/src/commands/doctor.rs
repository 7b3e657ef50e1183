use super::{colorize_status, json_pretty, StageArgs, EXIT_FAILURE, EXIT_SUCCESS};
use aptstage_schema::parse_manifest_file;
use aptstage_store::{AptLayout, ArchiveCache, HostAptFiles};

pub fn run(args: &StageArgs, json_output: bool) -> Result<u8, String> {
    let mut checks: Vec<Check> = Vec::new();
    let mut all_pass = true;

    check_prereqs(&mut checks, &mut all_pass);
    check_host(&HostAptFiles::new(&args.host_apt_dir), &mut checks, &mut all_pass);
    check_manifest(args, &mut checks, &mut all_pass);
    check_cache(&AptLayout::new(&args.cache_dir), &mut checks);

    print_results(&checks, all_pass, json_output)
}

fn check_prereqs(checks: &mut Vec<Check>, all_pass: &mut bool) {
    let missing = aptstage_runtime::check_apt_prereqs();
    if missing.is_empty() {
        checks.push(Check::pass("apt_tools", "apt-get, apt-key and dpkg found"));
    } else {
        *all_pass = false;
        checks.push(Check::fail(
            "apt_tools",
            &aptstage_runtime::format_missing(&missing),
        ));
    }
}

fn check_host(host: &HostAptFiles, checks: &mut Vec<Check>, all_pass: &mut bool) {
    let sources = host.sources_list();
    if sources.is_file() {
        checks.push(Check::pass(
            "host_sources",
            &format!("{} present", sources.display()),
        ));
    } else {
        *all_pass = false;
        checks.push(Check::fail(
            "host_sources",
            &format!("{} not found", sources.display()),
        ));
    }

    for (name, path) in [
        ("host_trusted", host.trusted_keys()),
        ("host_preferences", host.preferences()),
    ] {
        if path.is_file() {
            checks.push(Check::pass(name, &format!("{} present", path.display())));
        } else {
            checks.push(Check::info(
                name,
                &format!("{} absent (optional)", path.display()),
            ));
        }
    }
}

fn check_manifest(args: &StageArgs, checks: &mut Vec<Check>, all_pass: &mut bool) {
    if !args.manifest.exists() {
        *all_pass = false;
        checks.push(Check::fail(
            "manifest",
            &format!("{} not found", args.manifest.display()),
        ));
        return;
    }
    match parse_manifest_file(&args.manifest) {
        Ok(manifest) => {
            let packages = manifest.package_set();
            checks.push(Check::pass(
                "manifest",
                &format!(
                    "{}: {} keys, {} repos, {} direct and {} repository packages",
                    args.manifest.display(),
                    manifest.keys.len() + manifest.gpg_advanced_options.len(),
                    manifest.repos.len(),
                    packages.direct.len(),
                    packages.repository.len()
                ),
            ));
        }
        Err(e) => {
            *all_pass = false;
            checks.push(Check::fail("manifest", &e.to_string()));
        }
    }
}

fn check_cache(layout: &AptLayout, checks: &mut Vec<Check>) {
    if !layout.apt_dir().exists() {
        checks.push(Check::info(
            "cache",
            "Isolated apt root not initialized (will be created on first build)",
        ));
        return;
    }
    match ArchiveCache::new(layout).list_debs() {
        Ok(debs) => checks.push(Check::info(
            "cache",
            &format!("{} archives cached in {}", debs.len(), layout.archives_dir().display()),
        )),
        Err(e) => checks.push(Check::warn("cache", &format!("Cannot read archive cache: {e}"))),
    }
}

fn print_results(checks: &[Check], all_pass: bool, json_output: bool) -> Result<u8, String> {
    if json_output {
        let json = serde_json::json!({
            "healthy": all_pass,
            "checks": checks.iter().map(|c| serde_json::json!({
                "name": c.name,
                "status": c.status,
                "message": c.message,
            })).collect::<Vec<_>>(),
        });
        println!("{}", json_pretty(&json)?);
    } else {
        println!("aptstage doctor\n");
        for check in checks {
            println!("  {} {}", colorize_status(check.status), check.message);
        }
        println!();
        if all_pass {
            println!("All checks passed.");
        } else {
            println!("Some checks failed. See above for details.");
        }
    }
    Ok(if all_pass { EXIT_SUCCESS } else { EXIT_FAILURE })
}

struct Check {
    name: &'static str,
    status: &'static str,
    message: String,
}

impl Check {
    fn new(name: &'static str, status: &'static str, message: &str) -> Self {
        Self {
            name,
            status,
            message: message.to_owned(),
        }
    }

    fn pass(name: &'static str, message: &str) -> Self {
        Self::new(name, "pass", message)
    }

    fn fail(name: &'static str, message: &str) -> Self {
        Self::new(name, "fail", message)
    }

    fn warn(name: &'static str, message: &str) -> Self {
        Self::new(name, "warn", message)
    }

    fn info(name: &'static str, message: &str) -> Self {
        Self::new(name, "info", message)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    fn args(root: &std::path::Path) -> StageArgs {
        StageArgs {
            manifest: root.join("apt.yml"),
            cache_dir: root.join("cache"),
            install_dir: root.join("install"),
            host_apt_dir: root.join("etc-apt"),
            runner: "mock".to_owned(),
        }
    }

    #[test]
    fn missing_host_sources_fails() {
        let dir = tempfile::tempdir().unwrap();
        let mut checks = Vec::new();
        let mut ok = true;
        check_host(&HostAptFiles::new(dir.path()), &mut checks, &mut ok);
        assert!(!ok);
        assert_eq!(checks[0].status, "fail");
        assert_eq!(checks[1].status, "info");
    }

    #[test]
    fn valid_manifest_passes_with_counts() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(
            dir.path().join("apt.yml"),
            "packages:\n  - http://example.com/foo.deb\n  - bar\n",
        )
        .unwrap();
        let mut checks = Vec::new();
        let mut ok = true;
        check_manifest(&args(dir.path()), &mut checks, &mut ok);
        assert!(ok);
        assert!(checks[0].message.contains("1 direct and 1 repository packages"));
    }

    #[test]
    fn broken_manifest_fails() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("apt.yml"), "packages: {oops: [\n").unwrap();
        let mut checks = Vec::new();
        let mut ok = true;
        check_manifest(&args(dir.path()), &mut checks, &mut ok);
        assert!(!ok);
        assert_eq!(checks[0].status, "fail");
    }

    #[test]
    fn uninitialized_cache_is_info() {
        let dir = tempfile::tempdir().unwrap();
        let mut checks = Vec::new();
        check_cache(&AptLayout::new(dir.path()), &mut checks);
        assert_eq!(checks[0].status, "info");
        assert!(checks[0].message.contains("not initialized"));
    }
}
