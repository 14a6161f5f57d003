//! CLI Module
//!
//! Command-line interface for the Sur stem shaping pipeline.

pub mod commands;

use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// Sur - shape separated stems into pseudo-instrument tracks
#[derive(Parser, Debug)]
#[command(name = "sur")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// JSON configuration file
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Shape one stem file (overwrites it unless the config says otherwise)
    #[command(name = "shape")]
    Shape {
        /// WAV file to shape
        path: PathBuf,

        /// Target stem: plucked-string, drone, bowed-string (or sitar, tanpura, sarangi)
        #[arg(short, long)]
        stem: String,

        /// Output directory, used by the output_dir policy
        #[arg(short, long)]
        output_dir: Option<PathBuf>,

        /// Print the report as JSON
        #[arg(long)]
        json: bool,
    },

    /// Derive pseudo-instrument stems from a separated "other" stem
    #[command(name = "derive")]
    Derive {
        /// The separator's "other" stem
        other: PathBuf,

        /// Directory receiving <instrument>.wav files
        #[arg(short, long)]
        output_dir: PathBuf,

        /// Stems to derive (defaults to all)
        #[arg(short, long, value_delimiter = ',')]
        stems: Vec<String>,
    },

    /// Print level and spectral information for a WAV file
    #[command(name = "analyze")]
    Analyze {
        /// WAV file to analyze
        path: PathBuf,

        /// Report the share of energy below this frequency
        #[arg(long, default_value_t = 400.0)]
        cutoff: f64,
    },

    /// List supported stem tags
    #[command(name = "stems")]
    Stems,
}
