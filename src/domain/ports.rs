use crate::domain::catalog::Catalog;
use crate::domain::model::{EnrollmentRecord, Row};
use crate::utils::error::Result;
use async_trait::async_trait;
use std::time::Duration;

/// Shared append-only row store holding the enrollment records.
#[async_trait]
pub trait TabularStore: Send + Sync {
    async fn read_all_rows(&self) -> Result<Vec<Row>>;
    async fn append_row(&self, record: &EnrollmentRecord) -> Result<()>;
}

pub trait ConfigProvider: Send + Sync {
    fn catalog(&self) -> &Catalog;
    fn request_timeout(&self) -> Duration;
    fn serialize_writes(&self) -> bool;
    fn read_only(&self) -> bool;
}
