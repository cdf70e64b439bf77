use crate::adapters::parse_rows;
use crate::domain::model::{EnrollmentRecord, Row};
use crate::domain::ports::TabularStore;
use crate::utils::error::{LedgerError, Result};
use async_trait::async_trait;
use reqwest::{Client, RequestBuilder};
use serde::Serialize;
use std::time::Duration;

/// A published spreadsheet: rows come from its CSV export, appends go to a
/// values-append endpoint authorized by the shared service credential.
#[derive(Debug, Clone)]
pub struct SheetStore {
    client: Client,
    read_url: String,
    append_url: Option<String>,
    credential: Option<String>,
}

#[derive(Debug, Serialize)]
struct AppendRequest<'a> {
    values: [[&'a str; 5]; 1],
}

impl SheetStore {
    pub fn new(
        read_url: impl Into<String>,
        append_url: Option<String>,
        credential: Option<String>,
        timeout: Duration,
    ) -> Result<Self> {
        let client = Client::builder().timeout(timeout).build()?;
        Ok(Self {
            client,
            read_url: read_url.into(),
            append_url,
            credential,
        })
    }

    /// 沒有 append 端點時只能讀取
    pub fn is_read_only(&self) -> bool {
        self.append_url.is_none()
    }

    fn authorize(&self, request: RequestBuilder) -> RequestBuilder {
        match &self.credential {
            Some(token) => request.bearer_auth(token),
            None => request,
        }
    }
}

#[async_trait]
impl TabularStore for SheetStore {
    async fn read_all_rows(&self) -> Result<Vec<Row>> {
        tracing::debug!("Fetching enrollment sheet from: {}", self.read_url);
        let response = self.authorize(self.client.get(&self.read_url)).send().await?;

        let status = response.status();
        tracing::debug!("Sheet response status: {}", status);
        if !status.is_success() {
            return Err(LedgerError::SourceUnavailable {
                reason: format!("sheet returned HTTP {}", status),
            });
        }

        let body = response.bytes().await?;
        parse_rows(body.as_ref())
    }

    async fn append_row(&self, record: &EnrollmentRecord) -> Result<()> {
        let Some(append_url) = &self.append_url else {
            return Err(LedgerError::WriteFailed {
                reason: "no append endpoint configured; the sheet is read-only".to_string(),
            });
        };

        let body = AppendRequest {
            values: [record.to_values()],
        };
        tracing::debug!("Appending PRN {} via {}", record.prn, append_url);
        let response = self
            .authorize(self.client.post(append_url).json(&body))
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let detail = response.text().await.unwrap_or_default();
            return Err(LedgerError::WriteFailed {
                reason: format!("append returned HTTP {}: {}", status, detail.trim()),
            });
        }

        Ok(())
    }
}
