//! tektonctl
//!
//! Command-line client for Tekton resources: list, get, export, delete and
//! apply Tasks, Pipelines, PipelineRuns, TriggerBindings, TriggerTemplates
//! and EventListeners.

mod commands;

use anyhow::Result;
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use std::time::Duration;
use tekton_client::{CallContext, ClientConfig, TektonClient};
use tekton_crds::TektonKind;
use tracing::{debug, info};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
struct Cli {
    /// Kubeconfig to use; in-cluster configuration when unset
    #[arg(long, env = "TEKTON_KUBECONFIG", global = true)]
    kubeconfig: Option<PathBuf>,

    /// Kubeconfig context
    #[arg(long, env = "TEKTON_CONTEXT", global = true)]
    context: Option<String>,

    /// Target namespace
    #[arg(short, long, default_value = "default", global = true)]
    namespace: String,

    /// Prefix of the secret holding the namespace's bearer token
    #[arg(long, env = "TEKTON_SECRET_PREFIX", default_value = "", global = true)]
    secret_prefix: String,

    /// Bearer token; skips secret lookup
    #[arg(long, env = "TEKTON_TOKEN", hide_env_values = true, global = true)]
    token: Option<String>,

    /// Log requests and response bodies
    #[arg(long, env = "TEKTON_DEBUG", global = true)]
    debug: bool,

    /// Overall deadline in seconds
    #[arg(long, default_value_t = 30, global = true)]
    timeout: u64,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// List resources of a kind
    List {
        /// Resource kind, e.g. task or pipelineruns
        kind: TektonKind,
        /// Label selector
        #[arg(short = 'l', long)]
        selector: Option<String>,
        /// Field selector
        #[arg(long)]
        field_selector: Option<String>,
        /// Page size (server default 500)
        #[arg(long)]
        limit: Option<u32>,
        /// Follow continue tokens and return every page
        #[arg(long)]
        all: bool,
    },
    /// Print one resource as JSON
    Get { kind: TektonKind, name: String },
    /// Print one resource as manifest YAML, without status
    GetYaml { kind: TektonKind, name: String },
    /// Delete one resource
    Delete { kind: TektonKind, name: String },
    /// Create or update resources from a manifest file
    Apply {
        kind: TektonKind,
        /// Manifest file, `-` for stdin
        #[arg(short = 'f', long = "filename")]
        file: String,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let default_level = if cli.debug { "debug" } else { "info" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    if rustls::crypto::ring::default_provider().install_default().is_err() {
        debug!("rustls crypto provider already installed");
    }

    let timeout = Duration::from_secs(cli.timeout);
    let mut config = ClientConfig::new()
        .with_secret_prefix(cli.secret_prefix.clone())
        .with_debug(cli.debug)
        .with_timeout(timeout);
    if let Some(path) = &cli.kubeconfig {
        config = config.with_kubeconfig(path);
    }
    if let Some(context) = &cli.context {
        config = config.with_context(context);
    }
    if let Some(token) = &cli.token {
        config = config.with_bearer_token(token);
    }

    let client = TektonClient::new(config).await?;
    info!("Using namespace {}", cli.namespace);
    let ctx = CallContext::background().with_timeout(timeout);

    commands::run(&client, &ctx, &cli.namespace, cli.command).await
}
