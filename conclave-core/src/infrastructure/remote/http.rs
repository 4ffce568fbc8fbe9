use crate::domain::{SignatureEntry, TransactionMetadata};
use crate::foundation::{ConclaveError, TxId};
use crate::infrastructure::remote::{CosigningService, RemoteRecord};
use alloy_primitives::Address;
use async_trait::async_trait;
use reqwest::StatusCode;
use serde_json::json;

/// REST client for the co-signing service.
pub struct HttpCosigningService {
    client: reqwest::Client,
    base_url: String,
}

impl HttpCosigningService {
    pub fn new(base_url: impl Into<String>) -> Self {
        let base_url = base_url.into();
        Self { client: reqwest::Client::new(), base_url: base_url.trim_end_matches('/').to_string() }
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }
}

#[async_trait]
impl CosigningService for HttpCosigningService {
    async fn get_pending_for_account(&self, account: Address) -> Result<Vec<RemoteRecord>, ConclaveError> {
        let url = self.url(&format!("/api/v1/accounts/{}/transactions/pending", account));
        let response = self.client.get(&url).send().await?;
        if !response.status().is_success() {
            return Err(ConclaveError::network_error("get pending proposals", format!("{} from {url}", response.status())));
        }
        Ok(response.json().await?)
    }

    async fn get_by_identifier(&self, id: &TxId) -> Result<Option<RemoteRecord>, ConclaveError> {
        let url = self.url(&format!("/api/v1/transactions/{}", id));
        let response = self.client.get(&url).send().await?;
        if response.status() == StatusCode::NOT_FOUND {
            return Ok(None);
        }
        if !response.status().is_success() {
            return Err(ConclaveError::network_error("get proposal", format!("{} from {url}", response.status())));
        }
        Ok(Some(response.json().await?))
    }

    async fn propose(
        &self,
        id: &TxId,
        account: Address,
        metadata: &TransactionMetadata,
        founding: &SignatureEntry,
        proposer: Address,
    ) -> Result<(), ConclaveError> {
        let url = self.url(&format!("/api/v1/transactions/{}", id));
        let body = json!({
            "account": account,
            "metadata": metadata,
            "proposer": proposer,
            "signature": founding,
        });
        let response = self.client.post(&url).json(&body).send().await?;
        if !response.status().is_success() {
            return Err(ConclaveError::network_error("propose transaction", format!("{} from {url}", response.status())));
        }
        Ok(())
    }

    async fn confirm(&self, id: &TxId, confirmation: &SignatureEntry) -> Result<(), ConclaveError> {
        let url = self.url(&format!("/api/v1/transactions/{}/confirmations", id));
        let response = self.client.post(&url).json(confirmation).send().await?;
        if response.status() == StatusCode::NOT_FOUND {
            return Err(ConclaveError::RemoteNotFound(id.to_string()));
        }
        if !response.status().is_success() {
            return Err(ConclaveError::network_error("confirm transaction", format!("{} from {url}", response.status())));
        }
        Ok(())
    }
}
