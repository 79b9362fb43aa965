//! CLI definitions using clap.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand, ValueEnum};
use clap_complete::Shell;

/// yarn-prefetch - hermetic prefetch of yarn classic dependencies
#[derive(Parser)]
#[command(name = "yarn-prefetch")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Disable colored output
    #[arg(long, global = true)]
    pub no_color: bool,

    /// Config file layered over ~/.yarn-prefetch/config.toml
    #[arg(long, global = true, env = "YARN_PREFETCH_CONFIG")]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Fetch yarn dependencies into the offline mirror
    Fetch(FetchArgs),

    /// Check that projects can be fetched, without running yarn
    Check(CheckArgs),

    /// Print the environment for the offline build
    Env(EnvArgs),

    /// Generate shell completions
    Completions(CompletionsArgs),
}

#[derive(Args)]
pub struct FetchArgs {
    /// Repository root
    #[arg(short, long, default_value = ".")]
    pub source: PathBuf,

    /// Directory to write the offline mirror to
    #[arg(short, long)]
    pub output: PathBuf,

    /// Project subpath relative to the source directory (repeatable)
    #[arg(short, long = "package", value_name = "PATH")]
    pub packages: Vec<PathBuf>,

    /// Yarn executable to use
    #[arg(long, value_name = "PROGRAM")]
    pub yarn: Option<PathBuf>,

    /// Write the JSON result to a file instead of stdout
    #[arg(long, value_name = "FILE")]
    pub output_file: Option<PathBuf>,
}

#[derive(Args)]
pub struct CheckArgs {
    /// Repository root
    #[arg(short, long, default_value = ".")]
    pub source: PathBuf,

    /// Project subpath relative to the source directory (repeatable)
    #[arg(short, long = "package", value_name = "PATH")]
    pub packages: Vec<PathBuf>,
}

#[derive(Args)]
pub struct EnvArgs {
    /// Substitute this path for the output directory placeholder
    #[arg(long, value_name = "DIR")]
    pub output_dir: Option<String>,

    /// Output format
    #[arg(long, value_enum, default_value_t = EnvFormat::Env)]
    pub format: EnvFormat,
}

#[derive(Clone, Copy, ValueEnum)]
pub enum EnvFormat {
    /// `export NAME=VALUE` lines
    Env,
    /// JSON array of `{name, value}`
    Json,
}

#[derive(Args)]
pub struct CompletionsArgs {
    /// Shell to generate completions for
    #[arg(value_enum)]
    pub shell: Shell,
}
