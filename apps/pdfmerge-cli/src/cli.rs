//! Command-line arguments

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use pdfmerge_core::MergeConfig;

#[derive(Parser, Debug)]
#[command(name = "pdfmerge")]
#[command(version, about = "Select, reorder and merge PDF files")]
pub struct Args {
    /// TOML configuration file
    #[arg(short, long, global = true, env = "PDFMERGE_CONFIG")]
    pub config: Option<PathBuf>,

    /// Directory merged files are written to
    #[arg(long, global = true)]
    pub output_dir: Option<PathBuf>,

    /// Write the merged PDF without compressing streams
    #[arg(long, global = true)]
    pub no_compress: bool,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Merge the given PDFs, in the given order, into one file
    Merge {
        /// Input files; anything without a .pdf extension is ignored
        #[arg(required = true)]
        files: Vec<PathBuf>,

        /// Base name of the output file (".pdf" is appended)
        #[arg(short, long)]
        output_name: Option<String>,

        /// Merge order as 1-based positions in FILES, e.g. "3,1,2"; every
        /// input must be listed once, and skipped inputs drop out
        #[arg(long, value_delimiter = ',')]
        order: Option<Vec<usize>>,
    },

    /// Show page count, version and size of each PDF
    Info {
        #[arg(required = true)]
        files: Vec<PathBuf>,

        /// Print JSON instead of a table
        #[arg(long)]
        json: bool,
    },

    /// Interactive session: add, remove, reorder, then merge
    Shell {
        /// Files to start the session with
        files: Vec<PathBuf>,
    },
}

impl Args {
    /// Configuration file (if any) with command-line overrides applied
    pub fn load_config(&self) -> anyhow::Result<MergeConfig> {
        let mut config = match &self.config {
            Some(path) => MergeConfig::from_file(path)?,
            None => MergeConfig::default(),
        };

        if let Some(dir) = &self.output_dir {
            config.output_dir = Some(dir.clone());
        }
        if self.no_compress {
            config.compress = false;
        }

        Ok(config)
    }
}
