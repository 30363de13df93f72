//! Convert command - turn one subject's tables into a document.

use std::path::PathBuf;

use colored::Colorize;
use goaf::TableOutcome;

use super::Context;

pub fn run(
    ctx: &Context,
    subject: String,
    output_dir: Option<PathBuf>,
    survey_date: Option<String>,
    json_output: bool,
) -> Result<(), Box<dyn std::error::Error>> {
    if !ctx.data_dir.is_dir() {
        return Err(format!("Data directory not found: {}", ctx.data_dir.display()).into());
    }

    let converter = ctx.converter(survey_date)?;
    let assembly = converter.convert_dir(&ctx.data_dir, &subject);
    let output_dir = output_dir.unwrap_or_else(|| ctx.data_dir.clone());
    let path = converter.write_document(&assembly, &output_dir)?;
    let report = assembly.report();

    if json_output {
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        println!(
            "{} {}",
            "Converting".cyan().bold(),
            subject.white().bold()
        );
        println!();

        for (table, outcome) in &assembly.outcomes {
            match outcome {
                TableOutcome::Loaded {
                    rows, provenance, ..
                } => println!(
                    "  {} {}: {} records ({})",
                    "✓".green(),
                    table,
                    rows.to_string().white().bold(),
                    provenance.encoding.label()
                ),
                TableOutcome::Absent { .. } => {
                    println!("  {} {}: not found", "-".yellow(), table)
                }
                TableOutcome::Unreadable { reason, .. } => {
                    println!("  {} {}: {}", "✗".red(), table, reason.red())
                }
            }
        }
        println!();

        for warning in &report.warnings {
            println!("  {} {}", "warning:".yellow(), warning);
        }

        let info = &assembly.dataset.subject_info;
        println!(
            "Subject id: {}   Tables: {}/{}   Records: {}",
            info.subject_id.white().bold(),
            assembly.dataset.populated_tables(),
            converter.registry().len(),
            assembly.dataset.total_records().to_string().white().bold()
        );
        println!("{} {}", "Wrote".green().bold(), path.display());
    }

    if assembly.has_errors() {
        return Err(format!(
            "{} table(s) could not be read",
            report.errors.len()
        )
        .into());
    }

    Ok(())
}
