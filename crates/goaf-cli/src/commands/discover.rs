//! Discover command - list subjects in the data directory.

use colored::Colorize;

use super::Context;

pub fn run(ctx: &Context, json_output: bool) -> Result<(), Box<dyn std::error::Error>> {
    let converter = ctx.converter(None)?;
    let subjects = converter.discover(&ctx.data_dir)?;

    if json_output {
        println!("{}", serde_json::to_string_pretty(&subjects)?);
        return Ok(());
    }

    if subjects.is_empty() {
        println!("No subjects found in {}", ctx.data_dir.display());
        return Ok(());
    }

    println!(
        "{} {}",
        subjects.len().to_string().white().bold(),
        "subject(s) found:".cyan().bold()
    );
    for subject in &subjects {
        println!("  {}", subject);
    }

    Ok(())
}
