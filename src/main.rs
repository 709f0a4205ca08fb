use std::{
    io,
    path::{Path, PathBuf},
    process::ExitCode,
};

use clap::{Args, CommandFactory, Parser, Subcommand};
use kube::config::Kubeconfig;
use kubemrr::{
    GetCommand, KubeMirrorClient, MirrorConfig, Overrides, clap_complete::CompleteEnv,
    config::read_kubeconfig, resource_value_completer, retry::RetryPolicy,
};
use tracing::warn;

#[derive(Debug, Parser)]
#[command(name = "kubemrr", version, about = "Query a Kubernetes object mirror")]
struct Cli {
    /// Path to the kubeconfig file. Defaults to $KUBECONFIG, then ~/.kube/config.
    #[arg(long, global = true, value_hint = clap::ValueHint::FilePath)]
    kubeconfig: Option<PathBuf>,

    /// Log debug details to stderr.
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// List objects of one resource type, e.g. `kubemrr get pods`.
    Get(GetArgs),
}

#[derive(Debug, Args)]
struct GetArgs {
    /// Resource type: short name, singular, plural or `<plural>.<group>`.
    #[arg(add = resource_value_completer())]
    resources: Vec<String>,

    /// kubectl-style overrides, e.g. "--context prod --namespace=blue".
    #[arg(long, value_name = "FLAGS", default_value = "", allow_hyphen_values = true)]
    kubectl_flags: String,

    /// How many times a failed list request is repeated. 0 sends it once.
    #[arg(long, value_name = "N", default_value_t = 2)]
    retries: usize,
}

fn init_logging(verbose: bool) {
    let filter = if verbose { "kubemrr=debug" } else { "kubemrr=info" };
    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(filter));

    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_writer(io::stderr)
        .init();
}

/// An explicit `--kubeconfig` must be readable; the default location may be absent.
fn load_kubeconfig(path: Option<&Path>) -> anyhow::Result<Kubeconfig> {
    match read_kubeconfig(path) {
        Ok(kubeconfig) => Ok(kubeconfig),
        Err(error) if path.is_none() => {
            warn!("no kubeconfig found ({error:#}), only --kubectl-flags apply");
            Ok(Kubeconfig::default())
        }
        Err(error) => Err(error),
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<ExitCode> {
    CompleteEnv::with_factory(Cli::command).complete();

    let cli = Cli::parse();
    init_logging(cli.verbose);

    let kubeconfig = load_kubeconfig(cli.kubeconfig.as_deref())?;
    match cli.command {
        Command::Get(args) => {
            let config = MirrorConfig::from_kubeconfig(&kubeconfig);
            let overrides = Overrides::parse(&args.kubectl_flags);
            let client = KubeMirrorClient::from_kubeconfig(kubeconfig, &overrides)
                .await
                .with_retry(RetryPolicy::from_retries(args.retries));
            let command = GetCommand::new(config, client);

            let outcome = command
                .run(
                    &args.resources,
                    &overrides,
                    &mut io::stdout().lock(),
                    &mut io::stderr().lock(),
                )
                .await?;
            Ok(outcome.into())
        }
    }
}
