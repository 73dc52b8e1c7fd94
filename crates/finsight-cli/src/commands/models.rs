//! Model listing command

use anyhow::Result;
use finsight_core::AdvisorModel;

pub fn cmd_models() -> Result<()> {
    println!("Supported advisor models:\n");
    for model in AdvisorModel::all() {
        let marker = if *model == AdvisorModel::default() {
            " (default)"
        } else {
            ""
        };
        println!("  {}{}", model, marker);
    }
    println!();
    println!("Pick one with --model or FINSIGHT_MODEL.");
    Ok(())
}
