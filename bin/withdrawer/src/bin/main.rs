use action::{ConfirmationWaiter, L1Chain, RpcChain, Submission};
use clap::Parser;
use client::WithdrawalSigner;
use eyre::{eyre, WrapErr};
use serde_json::json;
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};
use withdrawal::{load_withdrawal, LifecycleState, ProofStrategy, Withdrawal, WithdrawalError};
use withdrawer::{
    config::{Cli, Command},
    StepOutcome, Withdrawer,
};

#[tokio::main]
async fn main() -> eyre::Result<()> {
    let cli = Cli::parse();

    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(&cli.log_level)),
        )
        .init();

    // First Ctrl-C stops anything new from being broadcast, a second one exits
    let cancel = CancellationToken::new();
    tokio::spawn({
        let cancel = cancel.clone();
        async move {
            if tokio::signal::ctrl_c().await.is_ok() {
                warn!("Interrupted, nothing new will be broadcast (press Ctrl-C again to exit now)");
                cancel.cancel();
            }
            if tokio::signal::ctrl_c().await.is_ok() {
                std::process::exit(130);
            }
        }
    });

    let result = match cli.command() {
        Command::SignMessage { message } => sign_message(&cli, &message).await,
        command => run(&cli, command == Command::Status, cancel).await,
    };

    // Waiting on L1 is a state, not a failure
    if let Err(e) = &result {
        if let Some(reason) = e.downcast_ref::<WithdrawalError>().filter(|e| e.is_pending()) {
            warn!(%reason, "Withdrawal cannot advance yet, run again later");
            if cli.json {
                println!("{}", json!({ "action": "none", "reason": reason.to_string() }));
            }
            return Ok(());
        }
    }

    result
}

async fn run(cli: &Cli, status_only: bool, cancel: CancellationToken) -> eyre::Result<()> {
    // Configuration errors surface before any chain I/O
    let profile = cli.network_profile()?;
    let gas = cli.gas_config()?;
    let source = cli.signer_source()?;
    let l2_tx_hash = cli
        .withdrawal
        .ok_or_else(|| eyre!("--withdrawal <L2 tx hash> is required"))?;

    info!("Loaded config:");
    info!("  Network: {}", profile.name);
    info!("  Strategy: {}", profile.proof_system.name());
    info!("  L1 Portal: {}", profile.portal);
    info!("  Withdrawal: {}", l2_tx_hash);
    if cli.dry_run {
        info!("  Mode: DRY-RUN (no transactions will be executed)");
    }

    let l1_provider = client::create_provider(&cli.l1_rpc)?;
    let l2_provider = client::create_provider(&profile.l2_rpc_url)?;
    let chain = RpcChain::new(l1_provider.clone());

    let chain_id = chain.chain_id().await?;
    let signer = WithdrawalSigner::open(source, chain_id).await?;
    info!(address = %signer.address(), chain_id, "Signer ready");

    let withdrawal = load_withdrawal(&l2_provider, l2_tx_hash)
        .await
        .wrap_err("failed to derive withdrawal from L2")?;

    let strategy = ProofStrategy::from_profile(&profile, l1_provider, l2_provider);
    let waiter = ConfirmationWaiter::new(cancel)
        .with_poll_interval(cli.poll_interval())
        .with_timeout(cli.confirmation_timeout());
    let submitter = action::Submitter::new(
        chain,
        signer.signer_fn(chain_id),
        signer.address(),
        gas,
        waiter,
    )
    .with_dry_run(cli.dry_run);

    let withdrawer = Withdrawer::new(strategy, submitter, withdrawal);

    if status_only {
        let state = withdrawer.lifecycle_state().await?;
        report_status(cli, withdrawer.withdrawal(), state);
        return Ok(());
    }

    let outcome = withdrawer.step().await?;
    report_outcome(cli, outcome)
}

async fn sign_message(cli: &Cli, message: &str) -> eyre::Result<()> {
    let source = cli.signer_source()?;
    let chain_id = RpcChain::new(client::create_provider(&cli.l1_rpc)?)
        .chain_id()
        .await?;
    let signer = WithdrawalSigner::open(source, chain_id).await?;

    let signature = signer.sign_message(message.as_bytes()).await?;
    let signature = alloy_primitives::hex::encode_prefixed(signature.as_bytes());

    if cli.json {
        println!(
            "{}",
            json!({ "address": signer.address(), "message": message, "signature": signature })
        );
    } else {
        println!("address:   {}", signer.address());
        println!("signature: {}", signature);
    }

    Ok(())
}

fn report_status(cli: &Cli, withdrawal: &Withdrawal, state: LifecycleState) {
    info!(withdrawal_hash = %withdrawal.hash, %state, "Withdrawal status");

    if cli.json {
        let proven_at = match state {
            LifecycleState::Proven { timestamp } => Some(timestamp),
            _ => None,
        };
        println!(
            "{}",
            json!({
                "l2_tx_hash": withdrawal.l2_tx_hash,
                "withdrawal_hash": withdrawal.hash,
                "l2_block": withdrawal.l2_block,
                "value": withdrawal.transaction.value,
                "state": state.to_string(),
                "proven_at": proven_at,
            })
        );
    } else {
        println!("withdrawal {}: {}", withdrawal.hash, state);
    }
}

fn report_outcome(cli: &Cli, outcome: StepOutcome) -> eyre::Result<()> {
    let (action, submission) = match outcome {
        StepOutcome::AlreadyFinalized => {
            if cli.json {
                println!("{}", json!({ "action": "none", "state": "finalized" }));
            } else {
                println!("withdrawal already finalized, nothing to do");
            }
            return Ok(());
        }
        StepOutcome::Proven(submission) => ("prove", submission),
        StepOutcome::Finalized(submission) => ("finalize", submission),
    };

    match submission {
        Submission::DryRun(preview) => {
            if cli.json {
                println!("{}", serde_json::to_string_pretty(&preview)?);
            } else {
                println!("{}", preview);
            }
        }
        Submission::Confirmed(status) => {
            if cli.json {
                println!(
                    "{}",
                    json!({
                        "action": action,
                        "tx_hash": status.tx_hash,
                        "block_number": status.block_number,
                        "gas_used": status.gas_used,
                    })
                );
            } else {
                println!("{} confirmed: {} (block {:?})", action, status.tx_hash, status.block_number);
            }
        }
    }

    Ok(())
}
