//! CLI argument definitions using clap.

use clap::{ArgAction, Parser, Subcommand};
use std::path::PathBuf;

/// goaf: convert and verify goaf census survey datasets
#[derive(Parser)]
#[command(name = "goaf")]
#[command(version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Directory holding the source tables
    #[arg(short, long, global = true, default_value = ".")]
    pub data_dir: PathBuf,

    /// Schema file (defaults to the built-in schema)
    #[arg(long, global = true)]
    pub schema: Option<PathBuf>,

    /// Source file extension
    #[arg(long, global = true, default_value = "csv")]
    pub extension: String,

    /// Increase log verbosity (-v debug, -vv trace)
    #[arg(short, long, global = true, action = ArgAction::Count)]
    pub verbose: u8,

    /// Only print warnings and errors
    #[arg(short, long, global = true, conflicts_with = "verbose")]
    pub quiet: bool,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Convert one subject's tables into a JSON document
    Convert {
        /// Subject (mine) name, as used in source file names
        #[arg(value_name = "SUBJECT")]
        subject: String,

        /// Directory for the document (default: the data directory)
        #[arg(short, long)]
        output_dir: Option<PathBuf>,

        /// Survey date recorded in the document
        #[arg(long)]
        survey_date: Option<String>,

        /// Print the conversion report as JSON
        #[arg(long)]
        json: bool,
    },

    /// Convert every subject found in the data directory
    ConvertAll {
        /// Directory for documents and the batch summary
        #[arg(short, long, default_value = "json_output")]
        output_dir: PathBuf,

        /// Convert only these subjects instead of discovering them
        #[arg(long, value_name = "SUBJECT")]
        subject: Vec<String>,

        /// Survey date recorded in every document
        #[arg(long)]
        survey_date: Option<String>,
    },

    /// Check sources, a document, and their agreement
    Validate {
        /// Subject (mine) name, as used in source file names
        #[arg(value_name = "SUBJECT")]
        subject: String,

        /// Document to check (default: <data-dir>/<SUBJECT>-采空区数据集.json)
        #[arg(long)]
        document: Option<PathBuf>,

        /// Write the text report to this file
        #[arg(short, long)]
        report: Option<PathBuf>,

        /// Print the reports as JSON
        #[arg(long)]
        json: bool,
    },

    /// List subjects found in the data directory
    Discover {
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
}
