mod commands;

use clap::{Parser, Subcommand};
use clap_complete::Shell;
use commands::{StageArgs, EXIT_FAILURE, EXIT_MANIFEST_ERROR, EXIT_STORE_ERROR};
use std::path::PathBuf;
use std::process::ExitCode;

#[derive(Debug, Parser)]
#[command(
    name = "aptstage",
    version,
    about = "Stage APT packages into an application directory without touching the host"
)]
struct Cli {
    /// Output results as structured JSON.
    #[arg(long, default_value_t = false, global = true)]
    json: bool,

    /// Enable verbose (debug) logging output.
    #[arg(short, long, default_value_t = false, global = true)]
    verbose: bool,

    /// Enable trace-level logging (more detailed than --verbose).
    #[arg(long, default_value_t = false, global = true)]
    trace: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Configure keys and repositories, download every package and unpack it.
    Build {
        #[command(flatten)]
        stage: StageArgs,
    },
    /// Like build, but stop once the archive cache is populated.
    Download {
        #[command(flatten)]
        stage: StageArgs,
    },
    /// Check tools, host APT files, the manifest and the cache.
    Doctor {
        #[command(flatten)]
        stage: StageArgs,
    },
    /// Generate shell completions for bash, zsh, fish, elvish, or powershell.
    Completions {
        /// Shell to generate completions for.
        shell: Shell,
    },
    /// Generate man pages in the specified directory.
    ManPages {
        /// Output directory for man pages.
        #[arg(default_value = "man")]
        dir: PathBuf,
    },
}

fn main() -> ExitCode {
    let default_hook = std::panic::take_hook();
    std::panic::set_hook(Box::new(move |info| {
        let msg = info.to_string();
        if msg.contains("Broken pipe")
            || msg.contains("broken pipe")
            || msg.contains("os error 32")
            || msg.contains("failed printing to stdout")
        {
            std::process::exit(0);
        }
        default_hook(info);
    }));

    let cli = Cli::parse();

    let default_level = if cli.trace {
        "trace"
    } else if cli.verbose {
        "debug"
    } else {
        "warn"
    };
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_env("APTSTAGE_LOG")
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(default_level)),
        )
        .with_target(false)
        .without_time()
        .with_writer(std::io::stderr)
        .init();

    let json_output = cli.json;

    let spawns_tools = match &cli.command {
        Commands::Build { stage } | Commands::Download { stage } => stage.runner == "host",
        _ => false,
    };
    if spawns_tools && std::env::var("APTSTAGE_SKIP_PREREQS").as_deref() != Ok("1") {
        let missing = aptstage_runtime::check_apt_prereqs();
        if !missing.is_empty() {
            eprintln!("error: {}", aptstage_runtime::format_missing(&missing));
            return ExitCode::from(EXIT_FAILURE);
        }
    }

    let result = match cli.command {
        Commands::Build { stage } => commands::build::run(&stage, json_output),
        Commands::Download { stage } => commands::download::run(&stage, json_output),
        Commands::Doctor { stage } => commands::doctor::run(&stage, json_output),
        Commands::Completions { shell } => commands::completions::run::<Cli>(shell),
        Commands::ManPages { dir } => commands::man_pages::run::<Cli>(&dir),
    };

    match result {
        Ok(code) => ExitCode::from(code),
        Err(msg) => {
            eprintln!("error: {msg}");
            ExitCode::from(exit_code_for(&msg))
        }
    }
}

fn exit_code_for(msg: &str) -> u8 {
    if msg.starts_with("manifest error:")
        || msg.starts_with("failed to parse manifest")
        || msg.starts_with("failed to read manifest")
    {
        EXIT_MANIFEST_ERROR
    } else if msg.starts_with("store error:") {
        EXIT_STORE_ERROR
    } else {
        EXIT_FAILURE
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn cli_definition_is_consistent() {
        Cli::command().debug_assert();
    }

    #[test]
    fn stage_args_have_defaults() {
        let cli = Cli::try_parse_from(["aptstage", "build"]).unwrap();
        let Commands::Build { stage } = cli.command else {
            panic!("expected build");
        };
        assert_eq!(stage.manifest, PathBuf::from("apt.yml"));
        assert_eq!(stage.host_apt_dir, PathBuf::from("/etc/apt"));
        assert_eq!(stage.runner, "host");
    }

    #[test]
    fn global_flags_after_subcommand() {
        let cli = Cli::try_parse_from(["aptstage", "download", "--json", "-v"]).unwrap();
        assert!(cli.json);
        assert!(cli.verbose);
    }

    #[test]
    fn exit_codes_follow_error_category() {
        assert_eq!(
            exit_code_for("manifest error: failed to parse manifest: bad"),
            EXIT_MANIFEST_ERROR
        );
        assert_eq!(
            exit_code_for("store error: required host file not found: /etc/apt/sources.list"),
            EXIT_STORE_ERROR
        );
        assert_eq!(
            exit_code_for("runtime error: 'apt-get' exited with exit status: 100"),
            EXIT_FAILURE
        );
    }
}
