use super::{json_pretty, print_report, stage, StageArgs, EXIT_SUCCESS};
use aptstage_core::RunOptions;

/// Everything `build` does except unpacking into the install directory.
pub fn run(args: &StageArgs, json: bool) -> Result<u8, String> {
    let options = RunOptions { skip_install: true };
    let report = stage(args, options, json, "downloading packages...")?;
    if json {
        println!("{}", json_pretty(&report)?);
    } else {
        print_report(&report);
        println!("archives cached in {}", args.cache_dir.display());
    }
    Ok(EXIT_SUCCESS)
}
