use super::{json_pretty, print_report, stage, StageArgs, EXIT_SUCCESS};
use aptstage_core::RunOptions;

pub fn run(args: &StageArgs, json: bool) -> Result<u8, String> {
    let report = stage(args, RunOptions::default(), json, "staging packages...")?;
    if json {
        println!("{}", json_pretty(&report)?);
    } else {
        print_report(&report);
    }
    Ok(EXIT_SUCCESS)
}
