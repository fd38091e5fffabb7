use thiserror::Error;

#[derive(Error, Debug)]
pub enum AppError {
    #[error("Invalid month key '{key}': {reason}")]
    InvalidMonth { key: String, reason: String },

    #[error("Invalid category: {0}")]
    InvalidCategory(String),

    #[error("Invalid amount: {0}")]
    InvalidAmount(String),

    #[error("Storage error: {0}")]
    Storage(#[from] anyhow::Error),
}

impl AppError {
    pub fn invalid_month(key: impl Into<String>, reason: impl ToString) -> Self {
        AppError::InvalidMonth {
            key: key.into(),
            reason: reason.to_string(),
        }
    }
}
