use std::env;
use std::net::SocketAddr;
use std::path::PathBuf;
use std::time::Duration;
use thiserror::Error;

pub const DEFAULT_BIND_ADDR: &str = "127.0.0.1:9000";
pub const DEFAULT_ARTIFACTS_DIR: &str = "artifacts";
pub const DEFAULT_PROOF_TIMEOUT_SECS: u64 = 60;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("{name} is invalid: {value:?}")]
    Invalid { name: &'static str, value: String },
}

#[derive(Debug, Clone)]
pub struct ProverConfig {
    pub bind_addr: SocketAddr,
    pub artifacts_dir: PathBuf,
    pub proof_timeout: Duration,
}

impl ProverConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        let bind_addr = env::var("PROVER_BIND_ADDR").unwrap_or_else(|_| DEFAULT_BIND_ADDR.into());
        let bind_addr = bind_addr.parse::<SocketAddr>().map_err(|_| ConfigError::Invalid {
            name: "PROVER_BIND_ADDR",
            value: bind_addr.clone(),
        })?;

        let artifacts_dir = env::var("VOTE_ARTIFACTS_DIR")
            .map(PathBuf::from)
            .unwrap_or_else(|_| PathBuf::from(DEFAULT_ARTIFACTS_DIR));

        let proof_timeout = match env::var("PROOF_TIMEOUT_SECS") {
            Ok(v) => v
                .parse::<u64>()
                .ok()
                .filter(|secs| *secs > 0)
                .ok_or(ConfigError::Invalid {
                    name: "PROOF_TIMEOUT_SECS",
                    value: v,
                })?,
            Err(_) => DEFAULT_PROOF_TIMEOUT_SECS,
        };

        Ok(Self {
            bind_addr,
            artifacts_dir,
            proof_timeout: Duration::from_secs(proof_timeout),
        })
    }
}
