//! Command-line driver for the wallet pipeline.
//!
//! ```text
//! explorer [LOCATION] [--provider NAME] [--delegate] [--donation ADA]
//! ```
//!
//! The wallet extension is simulated: a funded wallet on the configured network
//! is installed under `--provider` (default `eternl`).

use anyhow::{anyhow, bail, Result};
use clap::Parser;
use explorer::app::{DelegationTarget, ExplorerApp};
use explorer::AppEvent;
use lib_cardano::sim::{SimulatedProvider, SimulatedWallet};
use lib_core::config::init_config;
use lib_core::JsonFileStorage;
use shared::dto::delegation::{DelegationKind, DelegationRequest};
use shared::dto::wallet::ProviderType;
use std::sync::Arc;
use tracing::info;

#[derive(Debug, Parser)]
#[command(name = "explorer", about = "Connect a wallet and delegate to a pool or DRep")]
struct Args {
    /// Page location, e.g. `/pool/<id>?action=delegate`
    #[arg(default_value = "/")]
    location: String,

    /// Wallet extension to connect
    #[arg(long, default_value = "eternl")]
    provider: ProviderType,

    /// Delegate to the pool or DRep named by the location
    #[arg(long)]
    delegate: bool,

    /// Optional donation in ADA
    #[arg(long, value_name = "ADA")]
    donation: Option<f64>,
}

fn print_events(app: &ExplorerApp) {
    while let Some(event) = app.try_next_event() {
        match event {
            AppEvent::Toast { level, message } => println!("[{:?}] {}", level, message),
            AppEvent::DelegationFinished(outcome) => println!("{}", outcome.user_message()),
            other => println!("{:?}", other),
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();
    let config = init_config().map_err(|e| anyhow!(e))?;
    let _log_guard = explorer::debug::init();

    let storage = JsonFileStorage::shared(&config.storage_path)?;
    let provider = Arc::new(
        SimulatedProvider::new().with_wallet(args.provider, Arc::new(SimulatedWallet::funded(config.network))),
    );

    let app = ExplorerApp::new(
        config.clone(),
        storage,
        provider,
        ExplorerApp::notifier_for(config),
        args.location.clone(),
    )?;

    let reconnect = app.connection().reconnect_if_needed().await;
    info!(?reconnect, "Reconnection pass finished");

    if !app.wallet().snapshot().is_live() {
        match app.connect(args.provider).await {
            Ok(outcome) if outcome.needs_authorization => {
                // Stand-in for the sign-in flow the UI would open.
                if let Some(address) = &outcome.identity.address {
                    app.tokens().set_token(address, &uuid::Uuid::new_v4().to_string())?;
                }
            }
            Ok(_) => {}
            Err(err) => {
                print_events(&app);
                bail!(err.user_message());
            }
        }
    }

    app.start();
    tokio::time::sleep(config.settle_delay() * 2).await;
    print_events(&app);

    if args.delegate {
        let target = DelegationTarget::from_location(&args.location)
            .ok_or_else(|| anyhow!("--delegate needs a /pool/<id> or /drep/<id> location"))?;
        let mut request = match target.kind {
            DelegationKind::Pool => DelegationRequest::pool(target.ident),
            DelegationKind::Drep => DelegationRequest::drep(target.ident),
        };
        if let Some(ada) = args.donation {
            request = request.with_donation(ada);
        }

        let outcome = app.delegate(request)?.await?;
        info!(success = outcome.is_success(), "Delegation run finished");
    }

    print_events(&app);
    app.shutdown();
    Ok(())
}
