//! Convert-all command - convert every subject in the data directory.

use std::path::PathBuf;

use colored::Colorize;

use super::Context;

pub fn run(
    ctx: &Context,
    output_dir: PathBuf,
    subjects: Vec<String>,
    survey_date: Option<String>,
) -> Result<(), Box<dyn std::error::Error>> {
    let converter = ctx.converter(survey_date)?;

    let subjects = if subjects.is_empty() {
        let found = converter.discover(&ctx.data_dir)?;
        if found.is_empty() {
            return Err(format!("No subjects found in {}", ctx.data_dir.display()).into());
        }
        println!(
            "{} {} subject(s): {}",
            "Discovered".cyan().bold(),
            found.len(),
            found.join(", ")
        );
        found
    } else {
        subjects
    };

    let summary = converter.batch_convert(&ctx.data_dir, Some(subjects.as_slice()), &output_dir)?;

    println!();
    for entry in &summary.entries {
        if entry.succeeded() && entry.errors.is_empty() {
            println!(
                "  {} {}: {} records in {} table(s)",
                "✓".green(),
                entry.subject,
                entry.records,
                entry.tables
            );
        } else if let Some(failure) = &entry.failure {
            println!("  {} {}: {}", "✗".red(), entry.subject, failure.red());
        } else {
            println!(
                "  {} {}: {} unreadable table(s)",
                "✗".red(),
                entry.subject,
                entry.errors.len()
            );
        }
    }
    println!();
    println!(
        "Succeeded: {}   Failed: {}   Records: {}",
        summary.succeeded().to_string().green(),
        summary.failed().to_string().red(),
        summary.total_records().to_string().white().bold()
    );
    println!(
        "{} {}",
        "Summary written to".green().bold(),
        output_dir.display()
    );

    if !summary.is_clean() {
        return Err("some subjects did not convert cleanly".into());
    }

    Ok(())
}
