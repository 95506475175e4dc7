use crate::models::{ErrorResponse, NullifierStatus, TallyCounts, VoteReceipt};
use reqwest::{Client, StatusCode};
use std::time::Duration;
use thiserror::Error;
use vote_circuits::{FieldElement, ProofBundle, VoteSubmission};

#[derive(Error, Debug)]
pub enum ApiError {
    #[error("Network error: {0}")]
    NetworkError(#[from] reqwest::Error),
    #[error("Vote already cast")]
    AlreadyVoted,
    #[error("Vote rejected: {0}")]
    Rejected(String),
    #[error("Server error: {0}")]
    ServerError(String),
}

/// HTTP client for the voting ledger.
pub struct LedgerClient {
    client: Client,
    base_url: String,
}

impl LedgerClient {
    pub fn new(base_url: String) -> Result<Self, ApiError> {
        let client = Client::builder().timeout(Duration::from_secs(10)).build()?;
        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }

    pub async fn cast_vote(&self, bundle: ProofBundle) -> Result<VoteReceipt, ApiError> {
        let response = self
            .client
            .post(format!("{}/api/votes", self.base_url))
            .json(&VoteSubmission::from(bundle))
            .send()
            .await?;

        match response.status() {
            status if status.is_success() => Ok(response.json::<VoteReceipt>().await?),
            StatusCode::CONFLICT => Err(ApiError::AlreadyVoted),
            status if status.is_client_error() => {
                Err(ApiError::Rejected(error_message(response).await))
            }
            _ => Err(ApiError::ServerError(error_message(response).await)),
        }
    }

    pub async fn tally(&self) -> Result<TallyCounts, ApiError> {
        let response = self
            .client
            .get(format!("{}/api/tally", self.base_url))
            .send()
            .await?;

        if response.status().is_success() {
            Ok(response.json::<TallyCounts>().await?)
        } else {
            Err(ApiError::ServerError(error_message(response).await))
        }
    }

    pub async fn nullifier_status(
        &self,
        nullifier_hash: &FieldElement,
    ) -> Result<NullifierStatus, ApiError> {
        let response = self
            .client
            .get(format!("{}/api/votes/{}", self.base_url, nullifier_hash))
            .send()
            .await?;

        if response.status().is_success() {
            Ok(response.json::<NullifierStatus>().await?)
        } else {
            Err(ApiError::ServerError(error_message(response).await))
        }
    }
}

async fn error_message(response: reqwest::Response) -> String {
    let status = response.status();
    match response.json::<ErrorResponse>().await {
        Ok(body) => body.error,
        Err(_) => status.to_string(),
    }
}
