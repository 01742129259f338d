use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "subforge")]
#[command(
    author,
    version,
    about = "Extract ASS/SSA subtitle tracks from Matroska files as SubRip"
)]
pub struct Cli {
    /// Path to config file
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(flatten)]
    pub extract: ExtractArgs,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(clap::Args, Debug)]
pub struct ExtractArgs {
    /// Matroska file or directory to scan recursively
    #[arg(default_value = ".")]
    pub path: PathBuf,

    /// Containers to process concurrently
    #[arg(short, long)]
    pub jobs: Option<usize>,

    /// Abort a single decode after this many seconds
    #[arg(long, value_name = "SECS")]
    pub timeout: Option<u64>,

    /// Print the run report as JSON instead of status lines
    #[arg(long)]
    pub json: bool,
}

impl Cli {
    /// Extraction options given alongside a subcommand they do not apply to.
    pub fn stray_extract_args(&self) -> bool {
        self.command.is_some() && !self.extract.is_default()
    }
}

impl ExtractArgs {
    fn is_default(&self) -> bool {
        self.path.as_os_str() == "."
            && self.jobs.is_none()
            && self.timeout.is_none()
            && !self.json
    }
}

#[derive(Subcommand)]
pub enum Commands {
    /// Serve the extractor over HTTP
    Serve {
        /// Host to bind to
        #[arg(long)]
        host: Option<String>,

        /// Port to listen on
        #[arg(short, long)]
        port: Option<u16>,
    },

    /// Check that required external tools are available
    CheckTools,
}
