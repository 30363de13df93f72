//! Validate command - check sources, document, and their agreement.

use std::fs;
use std::path::PathBuf;

use colored::Colorize;

use super::Context;

pub fn run(
    ctx: &Context,
    subject: String,
    document: Option<PathBuf>,
    report_path: Option<PathBuf>,
    json_output: bool,
) -> Result<(), Box<dyn std::error::Error>> {
    let converter = ctx.converter(None)?;
    let validator = ctx.validator()?;

    let document =
        document.unwrap_or_else(|| ctx.data_dir.join(converter.document_name(&subject)));
    if !document.exists() {
        return Err(format!(
            "Document not found: {}\nRun 'goaf convert {}' first.",
            document.display(),
            subject
        )
        .into());
    }

    let sources = converter.sources(&ctx.data_dir, &subject);
    let verification = validator.verify(&subject, &document, &sources)?;
    let text = verification.render_text();

    if json_output {
        println!("{}", serde_json::to_string_pretty(&verification)?);
    } else {
        println!("{}", text);
    }

    if let Some(path) = report_path {
        fs::write(&path, &text)?;
        println!("{} {}", "Report written to".green().bold(), path.display());
    }

    if !verification.passed() {
        return Err("verification failed".into());
    }

    Ok(())
}
