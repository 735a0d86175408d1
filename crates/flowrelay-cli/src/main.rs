//! flowrelay CLI: run the workflow API proxy or talk to the upstream directly.
//!
//! Reuses the same upstream client (flowrelay-core) and server bootstrap
//! (flowrelay-server) as the HTTP proxy.

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use flowrelay_cli::commands::{self, UpstreamArgs};
use flowrelay_core::ExecutionFilter;
use flowrelay_server::{DEFAULT_HOST, DEFAULT_PORT};

/// flowrelay: proxy for a workflow-automation REST API
#[derive(Parser)]
#[command(name = "flowrelay", version, about = "flowrelay: proxy for a workflow-automation REST API")]
pub struct Cli {
    #[command(flatten)]
    upstream: UpstreamArgs,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Start the HTTP proxy server
    Serve {
        /// Host to bind to
        #[arg(long, env = "HOST", default_value = DEFAULT_HOST)]
        host: String,
        /// Port to listen on
        #[arg(long, env = "PORT", default_value_t = DEFAULT_PORT)]
        port: u16,
    },

    /// Manage workflows on the upstream service
    Workflow {
        #[command(subcommand)]
        action: WorkflowAction,
    },

    /// Inspect workflow executions on the upstream service
    Execution {
        #[command(subcommand)]
        action: ExecutionAction,
    },
}

#[derive(Subcommand)]
enum WorkflowAction {
    /// List all workflows
    List,
    /// Get a workflow by ID
    Get {
        /// Workflow ID
        #[arg(long)]
        id: String,
    },
    /// Create a workflow from a JSON definition file
    Create {
        /// Path to the workflow JSON file
        file: PathBuf,
    },
    /// Replace a workflow with a JSON definition file
    Update {
        /// Workflow ID
        #[arg(long)]
        id: String,
        /// Path to the workflow JSON file
        file: PathBuf,
    },
    /// Activate a workflow
    Activate {
        /// Workflow ID
        #[arg(long)]
        id: String,
    },
    /// Deactivate a workflow
    Deactivate {
        /// Workflow ID
        #[arg(long)]
        id: String,
    },
    /// Execute a workflow
    Execute {
        /// Workflow ID
        #[arg(long)]
        id: String,
        /// Input payload as a JSON string
        #[arg(long)]
        input: Option<String>,
    },
    /// Delete a workflow
    Delete {
        /// Workflow ID
        #[arg(long)]
        id: String,
    },
}

#[derive(Subcommand)]
enum ExecutionAction {
    /// List executions
    List {
        /// Only executions of this workflow
        #[arg(long)]
        workflow_id: Option<String>,
        /// Only executions with this status (e.g. success, error, waiting)
        #[arg(long)]
        status: Option<String>,
        /// Maximum number of executions to return
        #[arg(long)]
        limit: Option<u32>,
    },
    /// Get an execution by ID
    Get {
        /// Execution ID
        #[arg(long)]
        id: String,
    },
}

#[tokio::main]
async fn main() {
    // .env values must be in place before the log filter and clap read the
    // environment
    let dotenv_files = flowrelay_core::config::load_dotenv();

    // Initialize tracing; stdout carries command output
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
                "flowrelay_core=info,flowrelay_server=info,flowrelay_cli=info,tower_http=info".into()
            }),
        )
        .with_writer(std::io::stderr)
        .init();

    for path in &dotenv_files {
        tracing::info!("Loaded environment from '{}'", path.display());
    }

    let cli = Cli::parse();

    let result = match cli.command {
        Some(Commands::Serve { host, port }) => match cli.upstream.to_config() {
            Ok(upstream) => commands::server::run(host, port, upstream).await,
            Err(e) => Err(e),
        },

        Some(Commands::Workflow { action }) => match cli.upstream.client() {
            Ok(client) => match action {
                WorkflowAction::List => commands::workflow::list(&client).await,
                WorkflowAction::Get { id } => commands::workflow::get(&client, &id).await,
                WorkflowAction::Create { file } => {
                    commands::workflow::create(&client, &file).await
                }
                WorkflowAction::Update { id, file } => {
                    commands::workflow::update(&client, &id, &file).await
                }
                WorkflowAction::Activate { id } => {
                    commands::workflow::set_active(&client, &id, true).await
                }
                WorkflowAction::Deactivate { id } => {
                    commands::workflow::set_active(&client, &id, false).await
                }
                WorkflowAction::Execute { id, input } => {
                    commands::workflow::execute(&client, &id, input.as_deref()).await
                }
                WorkflowAction::Delete { id } => commands::workflow::delete(&client, &id).await,
            },
            Err(e) => Err(e),
        },

        Some(Commands::Execution { action }) => match cli.upstream.client() {
            Ok(client) => match action {
                ExecutionAction::List {
                    workflow_id,
                    status,
                    limit,
                } => {
                    let filter = ExecutionFilter {
                        workflow_id,
                        status,
                        limit,
                    };
                    commands::execution::list(&client, &filter).await
                }
                ExecutionAction::Get { id } => commands::execution::get(&client, &id).await,
            },
            Err(e) => Err(e),
        },

        None => {
            // No subcommand, show help
            use clap::CommandFactory;
            Cli::command().print_help().ok();
            println!();
            Ok(())
        }
    };

    if let Err(e) = result {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}
