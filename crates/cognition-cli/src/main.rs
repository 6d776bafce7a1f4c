//! cognition-deploy: upload the experiment files of a repository checkout to Cognition.
//!
//! Inputs come from the action environment (`INPUT_PERSONAL-ACCESS-TOKEN`,
//! `INPUT_JSPSYCH-VERSION`) or the matching flags. The last public link is
//! published as the `link` output.

use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;

use anyhow::Context;
use clap::Parser;
use cognition_api_client::CognitionClient;
use cognition_cli::{discover, init_tracing, run, ExperimentUploader};
use cognition_core::{
    repository_name_from_event, DeployConfig, GithubActions, Pipeline, DEFAULT_ENDPOINT,
};

#[derive(Parser)]
#[command(name = "cognition-deploy", about = "Deploy experiment files to Cognition")]
struct Cli {
    /// Cognition personal access token
    #[arg(
        long,
        env = "INPUT_PERSONAL-ACCESS-TOKEN",
        default_value = "",
        hide_env_values = true
    )]
    token: String,

    /// jsPsych version sent with every file
    #[arg(long, env = "INPUT_JSPSYCH-VERSION")]
    jspsych_version: Option<String>,

    /// Resource API base URL
    #[arg(long, env = "COGNITION_ENDPOINT", default_value = DEFAULT_ENDPOINT)]
    endpoint: String,

    /// Repository name; read from the event payload when omitted
    #[arg(long)]
    repository: Option<String>,

    /// Webhook event payload written by the runner
    #[arg(long, env = "GITHUB_EVENT_PATH")]
    event_path: Option<PathBuf>,

    /// Directory scanned for experiment files
    #[arg(long, env = "GITHUB_WORKSPACE", default_value = ".")]
    workspace: PathBuf,
}

#[tokio::main]
async fn main() -> ExitCode {
    dotenvy::dotenv().ok();
    init_tracing();

    let cli = Cli::parse();
    let pipeline = Arc::new(GithubActions::from_env());

    let repository = cli
        .repository
        .unwrap_or_else(|| repository_name_from_event(cli.event_path.as_deref()));
    let config = DeployConfig::new(
        cli.token,
        cli.jspsych_version,
        cli.endpoint,
        repository,
        cli.workspace,
    );

    tracing::info!(
        url = %config.request_url(),
        workspace = %config.workspace.display(),
        jspsych_version = config.jspsych_version.as_deref().unwrap_or("-"),
        "Starting deployment"
    );

    match CognitionClient::new(config).context("Failed to create HTTP client") {
        Ok(client) => {
            let files = discover(client.config().workspace.clone());
            let uploader = ExperimentUploader::new(client, Arc::clone(&pipeline));
            run(files, &uploader, pipeline.as_ref()).await;
        }
        Err(e) => pipeline.set_failed(&format!("{:#}", e)),
    }

    if pipeline.is_failed() {
        ExitCode::FAILURE
    } else {
        ExitCode::SUCCESS
    }
}
