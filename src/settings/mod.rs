//! JSON-backed settings documents: AI settings and header appearance

mod ai;
mod header;

pub use ai::{AiSettings, AiSettingsStore};
pub use header::{HeaderSettings, HeaderSettingsStore};

use thiserror::Error;

use crate::store::StoreError;

#[derive(Debug, Error)]
pub enum SettingsError {
    #[error("{0}")]
    Invalid(String),

    #[error(transparent)]
    Store(#[from] StoreError),
}
