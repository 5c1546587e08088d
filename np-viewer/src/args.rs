use crate::{core::Directions, k8s::Scope, output::Format, Query};
use anyhow::{Context, Result};
use clap::Parser;
use tracing_subscriber::EnvFilter;

#[derive(Debug, Parser)]
#[clap(
    name = "kubectl-np_viewer",
    about = "Lists the network policy rules that apply to pods"
)]
pub struct Args {
    #[clap(long, default_value = "warn", env = "KUBECTL_NP_VIEWER_LOG")]
    log_level: String,

    #[clap(long, value_enum, default_value = "plain")]
    log_format: LogFormat,

    #[clap(flatten)]
    client: kubert::ClientArgs,

    /// Only selects network policy rules of type ingress.
    #[clap(short, long)]
    ingress: bool,

    /// Only selects network policy rules of type egress.
    #[clap(short, long)]
    egress: bool,

    /// Selects network policy rules from all namespaces.
    #[clap(short = 'A', long)]
    all_namespaces: bool,

    /// The namespace to read. Defaults to the kubeconfig context's namespace.
    #[clap(short, long)]
    namespace: Option<String>,

    /// Only selects network policy rules that apply to the named pod.
    #[clap(short, long)]
    pod: Option<String>,

    #[clap(short, long, value_enum, default_value = "table")]
    output: Format,
}

#[derive(Copy, Clone, Debug, clap::ValueEnum)]
enum LogFormat {
    Plain,
    Json,
}

// === impl Args ===

impl Args {
    #[inline]
    pub async fn parse_and_run() -> Result<()> {
        Self::parse().run().await
    }

    pub async fn run(self) -> Result<()> {
        let Self {
            log_level,
            log_format,
            client,
            ingress,
            egress,
            all_namespaces,
            namespace,
            pod,
            output,
        } = self;

        init_tracing(&log_level, log_format)?;

        let client = client
            .try_client()
            .await
            .context("failed to read kubeconfig")?;

        let scope = if all_namespaces {
            Scope::All
        } else {
            Scope::Namespace(namespace.unwrap_or_else(|| client.default_namespace().to_string()))
        };
        let query = Query {
            scope,
            directions: Directions::new(ingress, egress),
            pod,
        };

        let rows = crate::run(&client, &query).await?;
        output.write(&rows, &mut std::io::stdout().lock())
    }
}

/// Logs to stderr so that stdout carries only the rendered rows.
fn init_tracing(filter: &str, format: LogFormat) -> Result<()> {
    let filter = EnvFilter::try_new(filter).context("invalid log level")?;
    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr);
    match format {
        LogFormat::Plain => builder.try_init(),
        LogFormat::Json => builder.json().try_init(),
    }
    .map_err(anyhow::Error::msg)
}
