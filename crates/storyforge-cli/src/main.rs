mod assistant;
mod cmd;
mod output;

use clap::{Parser, Subcommand};
use cmd::config::ConfigSubcommand;
use std::path::PathBuf;

#[derive(Parser)]
#[command(
    name = "storyforge",
    about = "Generate test cases and user stories from work items and wiki pages with GitHub Copilot",
    version,
    propagate_version = true
)]
struct Cli {
    /// Settings file (default: ~/.storyforge/config.yaml)
    #[arg(long, global = true, env = "STORYFORGE_CONFIG")]
    config: Option<PathBuf>,

    /// Output as JSON
    #[arg(long, global = true, short = 'j')]
    json: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Generate a test case report for a tracker work item
    Testcases {
        /// Work item id
        ticket_id: String,

        /// Extra context appended to the prompt
        #[arg(long, default_value = "")]
        context: String,

        /// Append the report to the work item as a comment
        #[arg(long)]
        comment: bool,

        /// File the report as a child task with this title
        #[arg(long, value_name = "TITLE")]
        as_task: Option<String>,
    },

    /// Generate user stories from a wiki page
    Stories {
        /// Confluence page id
        page_id: String,

        /// Extra context appended to the prompt
        #[arg(long, default_value = "")]
        context: String,

        /// Write the stories to a JSON file instead of stdout
        #[arg(long, short = 'o', value_name = "FILE")]
        out: Option<PathBuf>,
    },

    /// Create backlog items from a stories file under a feature
    Push {
        /// Parent feature work item id
        feature_id: String,

        /// Stories file produced by `stories -o`
        #[arg(long, value_name = "FILE")]
        file: PathBuf,
    },

    /// Check Copilot authentication and client status
    Auth,

    /// Inspect and modify settings
    Config {
        #[command(subcommand)]
        subcommand: ConfigSubcommand,
    },
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(tracing::Level::WARN.into()),
        )
        .with_target(false)
        .init();

    let config = cli.config.as_deref();

    let result = match cli.command {
        Commands::Testcases {
            ticket_id,
            context,
            comment,
            as_task,
        } => {
            cmd::testcases::run(
                config,
                &ticket_id,
                &context,
                comment,
                as_task.as_deref(),
                cli.json,
            )
            .await
        }
        Commands::Stories {
            page_id,
            context,
            out,
        } => cmd::stories::run(config, &page_id, &context, out.as_deref(), cli.json).await,
        Commands::Push { feature_id, file } => {
            cmd::push::run(config, &feature_id, &file, cli.json).await
        }
        Commands::Auth => cmd::auth::run(config, cli.json).await,
        Commands::Config { subcommand } => cmd::config::run(config, subcommand, cli.json),
    };

    if let Err(e) = result {
        // Print the full error chain (anyhow's alternate Display)
        eprintln!("error: {e:#}");
        std::process::exit(1);
    }
}
