use anyhow::{bail, Context};
use rand::rngs::OsRng;
use std::sync::Arc;
use structopt::StructOpt;
use tracing::info;
use tracing_subscriber::EnvFilter;
use vote_circuits::{load_verifying_key, verify_wire, ProofBundle, VoteSecret, VoteValue};
use vote_prover::{
    api_client::LedgerClient,
    models::{Command, Opt, ProofRequest},
    node::ProverNode,
    proof::ProofManager,
    run_server, AppState, ProverConfig,
};

fn init_tracing() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("info,tower_http=debug")),
        )
        .with_target(true)
        .init();
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    init_tracing();

    let opt = Opt::from_args();
    let mut config = ProverConfig::from_env()?;
    if let Some(dir) = opt.artifacts {
        config.artifacts_dir = dir;
    }

    match opt.command {
        Command::Start { addr, timeout_secs } => {
            if let Some(addr) = addr {
                config.bind_addr = addr;
            }
            if let Some(secs) = timeout_secs {
                config.proof_timeout = std::time::Duration::from_secs(secs);
            }

            let node = ProverNode::new(
                config.artifacts_dir.clone(),
                Arc::new(ProofManager::new()),
                config.proof_timeout,
            );
            let state = AppState {
                node: Arc::new(node),
            };
            run_server(&config.bind_addr, state).await?;
        }
        Command::Prove {
            vote,
            nullifier_seed,
            secret,
        } => {
            let node = node_for(&config);
            let bundle = node
                .generate_proof(ProofRequest {
                    vote,
                    nullifier_seed,
                    secret,
                })
                .await?;
            println!("{}", serde_json::to_string_pretty(&bundle)?);
        }
        Command::Verify { proof } => {
            let raw = std::fs::read_to_string(&proof)
                .with_context(|| format!("reading {}", proof.display()))?;
            let bundle: ProofBundle = serde_json::from_str(&raw)?;
            let vk = load_verifying_key(&config.artifacts_dir)?;
            if !verify_wire(&bundle.proof, &bundle.public_signals, &vk)? {
                bail!("proof does not verify");
            }
            println!("proof is valid");
        }
        Command::Vote {
            vote,
            nullifier_seed,
            secret,
            ledger_url,
        } => {
            let node = node_for(&config);
            let bundle = match (nullifier_seed, secret) {
                (Some(nullifier_seed), Some(secret)) => {
                    node.generate_proof(ProofRequest {
                        vote,
                        nullifier_seed,
                        secret,
                    })
                    .await?
                }
                (None, None) => {
                    let vote = VoteValue::try_from(vote)?;
                    node.prove_secret(VoteSecret::random(vote, &mut OsRng))
                        .await?
                }
                _ => bail!("--nullifier-seed and --secret must be given together"),
            };

            let client = LedgerClient::new(ledger_url)?;
            let receipt = client.cast_vote(bundle).await?;
            info!(nullifier_hash = %receipt.nullifier_hash, "vote accepted by the ledger");
            println!("{}", serde_json::to_string_pretty(&receipt)?);
        }
        Command::Tally { ledger_url } => {
            let tally = LedgerClient::new(ledger_url)?.tally().await?;
            println!("{}", serde_json::to_string_pretty(&tally)?);
        }
        Command::Status {
            nullifier_hash,
            ledger_url,
        } => {
            let status = LedgerClient::new(ledger_url)?
                .nullifier_status(&nullifier_hash)
                .await?;
            println!("{}", serde_json::to_string_pretty(&status)?);
        }
    }

    Ok(())
}

fn node_for(config: &ProverConfig) -> ProverNode {
    ProverNode::new(
        config.artifacts_dir.clone(),
        Arc::new(ProofManager::new()),
        config.proof_timeout,
    )
}
