pub mod build;
pub mod completions;
pub mod doctor;
pub mod download;
pub mod man_pages;

use aptstage_core::{Pipeline, RunOptions, RunReport};
use aptstage_store::{HostAptFiles, SYSTEM_APT_DIR};
use clap::Args;
use indicatif::{ProgressBar, ProgressStyle};
use std::path::PathBuf;
use std::time::Duration;
use tracing::debug;

pub const EXIT_SUCCESS: u8 = 0;
pub const EXIT_FAILURE: u8 = 1;
pub const EXIT_MANIFEST_ERROR: u8 = 2;
pub const EXIT_STORE_ERROR: u8 = 3;

/// Locations shared by every command that touches the isolated APT root.
#[derive(Debug, Clone, Args)]
pub struct StageArgs {
    /// Path to the YAML manifest.
    #[arg(long, default_value = "apt.yml")]
    pub manifest: PathBuf,
    /// Build cache directory; the isolated APT root lives in `<cache-dir>/apt`.
    #[arg(long, default_value = ".aptstage/cache")]
    pub cache_dir: PathBuf,
    /// Directory that archives are unpacked into.
    #[arg(long, default_value = ".aptstage/install")]
    pub install_dir: PathBuf,
    /// Host APT configuration copied into the isolated root.
    #[arg(long, default_value = SYSTEM_APT_DIR)]
    pub host_apt_dir: PathBuf,
    /// Command runner: `host` spawns apt-get/apt-key/dpkg, `mock` only records calls.
    #[arg(long, default_value = "host", hide = true)]
    pub runner: String,
}

impl StageArgs {
    pub fn pipeline(&self) -> Result<Pipeline, String> {
        let runner = aptstage_runtime::select_runner(&self.runner).map_err(|e| e.to_string())?;
        Ok(Pipeline::new(
            &self.manifest,
            &self.cache_dir,
            &self.install_dir,
            runner,
        )
        .with_host(HostAptFiles::new(&self.host_apt_dir)))
    }
}

/// Run the pipeline behind a spinner and return its report.
///
/// On failure the captured tool output, if any, goes to stderr before the
/// error is handed back for exit code mapping.
pub fn stage(
    args: &StageArgs,
    options: RunOptions,
    json: bool,
    progress: &str,
) -> Result<RunReport, String> {
    let mut pipeline = args.pipeline()?;
    debug!(
        "{} runner, manifest {}",
        pipeline.runner_name(),
        args.manifest.display()
    );
    let pb = if json { None } else { Some(spinner(progress)) };

    match pipeline.run(options) {
        Ok(report) => {
            if let Some(ref pb) = pb {
                spin_ok(pb, &summary(&report));
            }
            Ok(report)
        }
        Err(e) => {
            if let Some(ref pb) = pb {
                spin_fail(pb, "staging failed");
            }
            if let Some(output) = e.output().filter(|o| !o.trim().is_empty()) {
                eprintln!("{}", output.trim_end());
            }
            Err(e.to_string())
        }
    }
}

fn summary(report: &RunReport) -> String {
    let fetched = report.download.downloaded.len() + report.download.repository.len();
    if report.installed.is_empty() {
        format!("{fetched} packages downloaded")
    } else {
        format!(
            "{} archives unpacked into {}",
            report.installed.len(),
            report.install_dir
        )
    }
}

pub fn print_report(report: &RunReport) {
    println!(
        "keys: {}  repos: {} ({} pinned)",
        report.keys, report.repos, report.pins
    );
    print_list("downloaded", &report.download.downloaded);
    print_list("up to date", &report.download.skipped);
    print_list("from repositories", &report.download.repository);
    print_list("installed", &report.installed);
}

fn print_list(label: &str, items: &[String]) {
    if !items.is_empty() {
        println!("{label}: {}", items.join(", "));
    }
}

pub fn json_pretty(value: &impl serde::Serialize) -> Result<String, String> {
    serde_json::to_string_pretty(value).map_err(|e| format!("JSON serialization failed: {e}"))
}

pub fn spinner(msg: &str) -> ProgressBar {
    let pb = ProgressBar::new_spinner();
    if let Ok(style) = ProgressStyle::with_template("{spinner:.cyan} {msg}") {
        pb.set_style(style.tick_strings(&["⠋", "⠙", "⠹", "⠸", "⠼", "⠴", "⠦", "⠧", "⠇", "⠏"]));
    }
    pb.set_message(msg.to_owned());
    pb.enable_steady_tick(Duration::from_millis(80));
    pb
}

pub fn spin_ok(pb: &ProgressBar, msg: &str) {
    if let Ok(style) = ProgressStyle::with_template("{msg}") {
        pb.set_style(style);
    }
    pb.finish_with_message(format!("✓ {msg}"));
}

pub fn spin_fail(pb: &ProgressBar, msg: &str) {
    if let Ok(style) = ProgressStyle::with_template("{msg}") {
        pb.set_style(style);
    }
    pb.finish_with_message(format!("✗ {msg}"));
}

pub fn colorize_status(status: &str) -> String {
    use console::Style;
    match status {
        "pass" => Style::new().green().apply_to("✓").to_string(),
        "fail" => Style::new().red().bold().apply_to("✗").to_string(),
        "warn" => Style::new().yellow().apply_to("⚠").to_string(),
        _ => Style::new().dim().apply_to("ℹ").to_string(),
    }
}
