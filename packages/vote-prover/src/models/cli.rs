use std::net::SocketAddr;
use std::path::PathBuf;
use structopt::StructOpt;
use vote_circuits::FieldElement;

#[derive(Debug, StructOpt)]
#[structopt(name = "vote-prover", about = "usage of vote-prover commands.")]
pub struct Opt {
    /// directory holding vote.pk and vote.vk (overrides VOTE_ARTIFACTS_DIR)
    #[structopt(long, parse(from_os_str))]
    pub artifacts: Option<PathBuf>,

    #[structopt(subcommand)]
    pub command: Command,
}

#[derive(Debug, StructOpt)]
pub enum Command {
    /// start the prover node
    #[structopt(name = "start")]
    Start {
        /// address to listen on (overrides PROVER_BIND_ADDR)
        #[structopt(long)]
        addr: Option<SocketAddr>,
        /// proving timeout in seconds (overrides PROOF_TIMEOUT_SECS)
        #[structopt(long, parse(try_from_str = parse_timeout_secs))]
        timeout_secs: Option<u64>,
    },
    /// generate a vote proof and print it as JSON
    #[structopt(name = "prove")]
    Prove {
        /// 0 or 1
        #[structopt(long)]
        vote: u8,
        #[structopt(long)]
        nullifier_seed: String,
        #[structopt(long)]
        secret: String,
    },
    /// check a proof JSON file against the verifying key
    #[structopt(name = "verify")]
    Verify {
        #[structopt(long, parse(from_os_str))]
        proof: PathBuf,
    },
    /// prove a vote and submit it to the ledger
    #[structopt(name = "vote")]
    Vote {
        /// 0 or 1
        #[structopt(long)]
        vote: u8,
        /// fresh random value when omitted
        #[structopt(long)]
        nullifier_seed: Option<String>,
        /// fresh random value when omitted
        #[structopt(long)]
        secret: Option<String>,
        #[structopt(long, default_value = "http://localhost:8080")]
        ledger_url: String,
    },
    /// show the ledger's current tally
    #[structopt(name = "tally")]
    Tally {
        #[structopt(long, default_value = "http://localhost:8080")]
        ledger_url: String,
    },
    /// check whether a nullifier hash has been spent
    #[structopt(name = "status")]
    Status {
        #[structopt(long)]
        nullifier_hash: FieldElement,
        #[structopt(long, default_value = "http://localhost:8080")]
        ledger_url: String,
    },
}

fn parse_timeout_secs(value: &str) -> Result<u64, String> {
    match value.parse::<u64>() {
        Ok(0) => Err("timeout must be at least one second".to_string()),
        Ok(secs) => Ok(secs),
        Err(e) => Err(e.to_string()),
    }
}
