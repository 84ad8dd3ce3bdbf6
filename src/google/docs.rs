use super::{check_status, endpoint, ApiError, DocsApi};
use crate::document::{DocsRequest, Document};
use async_trait::async_trait;
use serde::Serialize;

pub struct DocsClient {
    http: reqwest::Client,
    base_url: String,
    access_token: String,
}

impl DocsClient {
    pub fn new(http: reqwest::Client, base_url: &str, access_token: String) -> Self {
        Self {
            http,
            base_url: base_url.to_string(),
            access_token,
        }
    }
}

#[derive(Serialize)]
struct BatchUpdateBody {
    requests: Vec<DocsRequest>,
}

#[async_trait]
impl DocsApi for DocsClient {
    async fn get_document(&self, document_id: &str) -> Result<Document, ApiError> {
        let url = endpoint(&self.base_url, &["v1", "documents", document_id])?;
        let response = self
            .http
            .get(url)
            .bearer_auth(&self.access_token)
            .send()
            .await?;
        Ok(check_status(response).await?.json().await?)
    }

    async fn batch_update(
        &self,
        document_id: &str,
        requests: Vec<DocsRequest>,
    ) -> Result<(), ApiError> {
        let action = format!("{document_id}:batchUpdate");
        let url = endpoint(&self.base_url, &["v1", "documents", &action])?;
        let response = self
            .http
            .post(url)
            .bearer_auth(&self.access_token)
            .json(&BatchUpdateBody { requests })
            .send()
            .await?;
        check_status(response).await?;
        Ok(())
    }
}
