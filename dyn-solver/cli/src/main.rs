use anyhow::{anyhow, Context, Result};
use clap::{builder::NonEmptyStringValueParser, Parser};
use dyn_solver::{webhook, Dns01Solver, Solver};
use tokio::sync::watch;
use tracing::info;

use config::Config;

mod config;

#[derive(Parser)]
#[command(author, version, about)]
struct Args {
    /// Path to the configuration file
    #[arg(short, long)]
    config: Option<String>,
    /// API group the solver is registered under
    #[arg(long, env = "GROUP_NAME", value_parser = NonEmptyStringValueParser::new())]
    group_name: String,
}

#[rocket::main]
async fn main() -> Result<()> {
    {
        use tracing_subscriber::{fmt, EnvFilter};
        let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
        fmt().with_env_filter(filter).init();
    }

    let args = Args::parse();
    let figment = config::load_config_figment(args.config.as_deref());
    let config: Config = figment
        .focus("core")
        .extract()
        .context("Failed to load configuration")?;

    let kube_config = kube::Config::infer()
        .await
        .context("Failed to infer kubernetes config")?;
    let (stop_tx, stop_rx) = watch::channel(false);
    let mut solver = Dns01Solver::from(config.build_solver());
    solver
        .initialize(kube_config, stop_rx)
        .await
        .context("Failed to initialize solver")?;

    info!(group = %args.group_name, "starting dyn webhook");
    let rocket = webhook::rocket(figment, &args.group_name, solver)
        .context("Failed to register solver")?;
    let result = rocket.launch().await;
    stop_tx.send(true).ok();
    result.map_err(|err| anyhow!("{err:?}")).context("Failed to launch rocket")?;
    Ok(())
}
