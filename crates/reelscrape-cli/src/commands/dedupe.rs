use crate::output::Output;
use color_eyre::eyre::eyre;
use color_eyre::Result;
use reel_core::dedupe_file;
use serde_json::json;
use std::path::Path;

pub fn run_dedupe(input: &Path, target: Option<&Path>, output: &Output) -> Result<()> {
    let report = dedupe_file(input, target).map_err(|e| eyre!("{:#}", e))?;
    let written_to = target.unwrap_or(input);

    if report.removed() == 0 {
        output.info(format!("No duplicates in {} ({} reviews)", input.display(), report.before));
    } else {
        output.success(format!(
            "Removed {} duplicate(s): {} -> {} reviews in {}",
            report.removed(),
            report.before,
            report.after,
            written_to.display()
        ));
    }
    output.json(&json!({
        "type": "dedupe",
        "input": input,
        "output": written_to,
        "before": report.before,
        "after": report.after,
        "removed": report.removed(),
    }));
    Ok(())
}
