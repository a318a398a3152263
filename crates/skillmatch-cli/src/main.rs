mod commands;

use camino::Utf8PathBuf;
use clap::{Args, Parser, Subcommand};
use skillmatch::AnchorStrategy;

/// Match artwork containers to skill-tree nodes by transformed position
#[derive(Debug, Parser)]
#[command(name = "skillmatch", version)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Match artifacts to nodes and write the artifact -> node id mapping
    Match {
        #[command(flatten)]
        inputs: InputArgs,
        /// Write the mapping JSON here instead of stdout
        #[arg(long)]
        output: Option<Utf8PathBuf>,
    },
    /// Report ambiguous node pairs, contested nodes and label mismatches
    Audit {
        #[command(flatten)]
        inputs: InputArgs,
        /// Exit with an error when anything is found
        #[arg(long)]
        strict: bool,
    },
    /// Print each node's position in artwork space
    Transform {
        /// Skill-tree config document
        #[arg(long)]
        config: Utf8PathBuf,
        /// Only nodes with maxPoints > 1
        #[arg(long)]
        multi_point_only: bool,
    },
}

#[derive(Debug, Args)]
struct InputArgs {
    /// Skill-tree config document
    #[arg(long)]
    config: Utf8PathBuf,
    /// Artifact document extracted from the artwork
    #[arg(long)]
    artifacts: Utf8PathBuf,
    /// Largest accepted distance, in artwork units
    #[arg(long)]
    tolerance: f64,
    /// Let several artifacts claim the same node
    #[arg(long)]
    non_exclusive: bool,
    /// Only match against nodes with maxPoints > 1
    #[arg(long)]
    multi_point_only: bool,
    /// How to anchor artifacts given as path data
    #[arg(long, default_value = "start-point")]
    anchor: AnchorStrategy,
}

fn main() -> miette::Result<()> {
    // Logs go to stderr so the mapping can be piped from stdout
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env().add_directive(tracing::Level::WARN.into()),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    match cli.command {
        Command::Match { inputs, output } => commands::run_match(&inputs.into(), output.as_deref()),
        Command::Audit { inputs, strict } => commands::run_audit(&inputs.into(), strict),
        Command::Transform {
            config,
            multi_point_only,
        } => commands::run_transform(&config, multi_point_only),
    }
}

impl From<InputArgs> for commands::Inputs {
    fn from(args: InputArgs) -> Self {
        commands::Inputs {
            config: args.config,
            artifacts: args.artifacts,
            tolerance: args.tolerance,
            exclusive: !args.non_exclusive,
            multi_point_only: args.multi_point_only,
            anchor: args.anchor,
        }
    }
}
