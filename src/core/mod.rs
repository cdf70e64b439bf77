pub mod admission;
pub mod ledger;
pub mod submission;

pub use crate::domain::catalog::Catalog;
pub use crate::domain::model::{Candidate, EnrollmentRecord, Row};
pub use crate::domain::ports::{ConfigProvider, TabularStore};
pub use crate::utils::error::Result;
