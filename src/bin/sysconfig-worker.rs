use anyhow::{Context, Result};
use clap::Parser;
use nef_rpc::{RpcRouter, RpcRouterConfig};
use nef_tools::config::WorkerArgs;
use nef_tools::sysconfig::SysconfigWorker;
use nef_tools::telemetry;
use tracing::info;

#[tokio::main]
async fn main() -> Result<()> {
    telemetry::init("info");
    let args = WorkerArgs::parse();

    let worker = match args.state {
        Some(path) => SysconfigWorker::load(path.clone())
            .await
            .with_context(|| format!("loading {}", path.display()))?,
        None => SysconfigWorker::default(),
    };

    let mut router = RpcRouter::new(RpcRouterConfig::new(args.bind));
    worker.register(&mut router, &args.worker)?;

    let bound = router.bind().await?;
    info!(endpoint = %bound.endpoint(), worker = %args.worker, "sysconfig worker ready");

    bound
        .run_until(async {
            let _ = tokio::signal::ctrl_c().await;
        })
        .await?;

    Ok(())
}
