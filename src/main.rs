mod config;
mod render;

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{CommandFactory, Parser, Subcommand, ValueEnum};
use serde::Serialize;
use tokio_util::sync::CancellationToken;

use k8sx_k8s::{ClientFactory, KubeClient};
use k8sx_search::{Query, namespace_access, search_all, select_contexts};

use crate::config::{FileConfig, Overrides, Settings};

/// k8sx - Find Kubernetes pods and services by IP or name
///
/// Without a subcommand the query is searched across every context and
/// every accessible namespace: by IP if it is a valid IP address, by pod
/// name (partial match) otherwise.
#[derive(Parser, Debug)]
#[command(name = "k8sx")]
#[command(author, version, about, long_about = None)]
#[command(args_conflicts_with_subcommands = true)]
struct Args {
    #[command(subcommand)]
    command: Option<Command>,

    /// IP address or pod name to search for
    #[arg(value_name = "QUERY")]
    query: Option<String>,

    #[command(flatten)]
    global: GlobalArgs,
}

#[derive(clap::Args, Debug)]
struct GlobalArgs {
    /// Path to kubeconfig file (default: $KUBECONFIG or ~/.kube/config)
    #[arg(long, global = true, value_name = "PATH")]
    kubeconfig: Option<PathBuf>,

    /// Namespaces to search, comma-separated (empty = discover accessible namespaces)
    #[arg(
        long,
        short = 'n',
        global = true,
        value_delimiter = ',',
        env = "K8S_SEARCH_NAMESPACES"
    )]
    namespaces: Vec<String>,

    /// Contexts to use, comma-separated (empty = all contexts, or the current one for `ns`)
    #[arg(long, global = true, value_delimiter = ',', env = "K8S_SEARCH_CONTEXT")]
    context: Vec<String>,

    /// Overall time budget for a search in seconds
    #[arg(long, global = true, value_name = "SECONDS")]
    timeout: Option<u64>,

    /// Number of contexts searched at the same time
    #[arg(long, global = true)]
    concurrency: Option<usize>,

    /// Don't look up the Deployment behind ReplicaSet-owned pods
    #[arg(long, global = true)]
    no_owners: bool,

    /// Output format
    #[arg(long, short = 'o', global = true, value_enum, default_value_t = OutputFormat::Table)]
    output: OutputFormat,

    /// Config file (default: ~/.k8sx/config.toml)
    #[arg(long, global = true, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Enable debug logging
    #[arg(long, short = 'v', global = true)]
    verbose: bool,
}

impl GlobalArgs {
    fn overrides(&self) -> Overrides {
        Overrides {
            kubeconfig: self.kubeconfig.clone(),
            namespaces: self.namespaces.clone(),
            contexts: self.context.clone(),
            timeout_secs: self.timeout,
            concurrency: self.concurrency,
            no_owners: self.no_owners,
        }
    }
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Search by IP or name (auto-detected) across all contexts and namespaces
    S {
        #[arg(value_name = "QUERY")]
        query: String,
    },

    /// Search pods and services by IP address
    Ip {
        #[arg(value_name = "ADDRESS")]
        address: String,
    },

    /// Search pods whose name contains SUBSTRING
    Name {
        #[arg(value_name = "SUBSTRING")]
        substring: String,
    },

    /// List all contexts from kubeconfig
    Ctx,

    /// List namespaces and whether you can list pods in them
    Ns,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
enum OutputFormat {
    Table,
    Json,
}

#[tokio::main]
async fn main() {
    let args = Args::parse();

    let default_level = if args.global.verbose {
        tracing::Level::DEBUG
    } else {
        tracing::Level::WARN
    };
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env().add_directive(default_level.into()),
        )
        .with_writer(std::io::stderr)
        .init();

    if let Err(e) = run_app(args).await {
        eprintln!("Error: {:#}", e);
        std::process::exit(1);
    }
}

async fn run_app(args: Args) -> Result<()> {
    let file = FileConfig::load(args.global.config.as_deref())?;
    let settings = Settings::resolve(args.global.overrides(), file);
    let output = args.global.output;

    let command = match (args.command, args.query) {
        (Some(command), _) => command,
        (None, Some(query)) => Command::S { query },
        (None, None) => {
            Args::command().print_help()?;
            return Ok(());
        }
    };

    match command {
        Command::S { query } => search(&settings, Query::parse(&query)?, output).await,
        Command::Ip { address } => search(&settings, Query::ip(&address)?, output).await,
        Command::Name { substring } => search(&settings, Query::name(&substring)?, output).await,
        Command::Ctx => list_contexts(&settings, output),
        Command::Ns => list_namespaces(&settings, output).await,
    }
}

fn print_json<T: Serialize + ?Sized>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

async fn search(settings: &Settings, query: Query, output: OutputFormat) -> Result<()> {
    let kube_client = KubeClient::new(settings.kubeconfig.as_deref())?;
    let contexts = select_contexts(kube_client.get_contexts(), &settings.contexts)?;
    let options = &settings.options;

    if output == OutputFormat::Table {
        let mode = if query.is_ip() { "IP" } else { "name" };
        eprintln!(
            "Searching {} context(s) by {}: {}",
            contexts.len(),
            mode,
            query.as_str()
        );
        if options.namespaces.is_empty() {
            eprintln!("No namespaces specified, discovering accessible namespaces...");
        } else {
            eprintln!("Namespaces: {}", options.namespaces.join(", "));
        }
    }

    // Ctrl-C stops the search but still prints what was found
    let cancel = CancellationToken::new();
    let interrupt = {
        let cancel = cancel.clone();
        tokio::spawn(async move {
            if tokio::signal::ctrl_c().await.is_ok() {
                cancel.cancel();
            }
        })
    };

    let report = search_all(&kube_client, &contexts, options, &query, cancel).await;
    interrupt.abort();
    let report = report?;

    match output {
        OutputFormat::Table => print!("{}", render::search_report(&report, &query)),
        OutputFormat::Json => print_json(&report)?,
    }

    Ok(())
}

fn list_contexts(settings: &Settings, output: OutputFormat) -> Result<()> {
    let kube_client = KubeClient::new(settings.kubeconfig.as_deref())?;
    let contexts = kube_client.get_contexts();

    match output {
        OutputFormat::Table => print!("{}", render::contexts(&contexts)),
        OutputFormat::Json => print_json(&contexts)?,
    }

    Ok(())
}

async fn list_namespaces(settings: &Settings, output: OutputFormat) -> Result<()> {
    let kube_client = KubeClient::new(settings.kubeconfig.as_deref())?;

    let context_name = settings
        .contexts
        .first()
        .cloned()
        .or_else(|| kube_client.current_context().map(String::from))
        .context("No context specified and no current context in kubeconfig")?;

    // Fails early with a clear message if the context doesn't exist
    select_contexts(
        kube_client.get_contexts(),
        std::slice::from_ref(&context_name),
    )?;

    let api = kube_client.connect(&context_name).await?;
    let rows = namespace_access(&api, settings.options.probe_concurrency)
        .await
        .with_context(|| format!("Failed to list namespaces in context {}", context_name))?;

    match output {
        OutputFormat::Table => print!("{}", render::namespace_access(&context_name, &rows)),
        OutputFormat::Json => print_json(&rows)?,
    }

    Ok(())
}
