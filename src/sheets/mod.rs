pub mod auth;
pub mod client;
pub mod error;
pub mod types;

pub use auth::{SheetsAuth, ServiceAccountKey};
pub use client::{RowStore, SheetsClient};
pub use error::SheetsError;
pub use types::{col_index, col_letter, ValueRange};
