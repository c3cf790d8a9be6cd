//! Error types of the cart crate.
//!
//! `CartError` is what callers of the store see. `StorageError` and
//! `ApiError` describe infrastructure failures; the store logs them and folds
//! them into the per-operation `CartError` bucket.

use thiserror::Error;

/// Failure of a cart operation, carrying the user-facing (pt-BR) message.
#[derive(Debug, Error, Copy, Clone, PartialEq, Eq)]
pub enum CartError {
    /// The requested quantity exceeds the available stock.
    #[error("Quantidade insuficiente em estoque")]
    StockInsufficient,
    #[error("Erro na adição do produto")]
    AddFailed,
    #[error("Erro na remoção do produto")]
    RemoveFailed,
    #[error("Erro ao alterar a quantidade do produto")]
    UpdateFailed,
}

impl CartError {
    /// Message meant to be shown to the shopper as-is (the `Display` output).
    pub fn user_message(&self) -> String {
        self.to_string()
    }

    /// Stable machine-readable code (logs, JSON output).
    pub fn code(&self) -> &'static str {
        match self {
            CartError::StockInsufficient => "stock_insufficient",
            CartError::AddFailed => "add_failed",
            CartError::RemoveFailed => "remove_failed",
            CartError::UpdateFailed => "update_failed",
        }
    }
}

/// Local storage failure.
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("sqlite error: {0}")]
    Sqlite(#[from] sqlx::Error),
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
    #[error("storage unavailable: {0}")]
    Unavailable(String),
}

/// Catalog / inventory endpoint failure.
#[derive(Debug, Error)]
pub enum ApiError {
    #[error("network error: {0}")]
    Network(String),
    #[error("API error ({0}): {1}")]
    Api(u16, String),
    #[error("parse error: {0}")]
    Parse(String),
    #[error("not found")]
    NotFound,
}

impl From<reqwest::Error> for ApiError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_decode() {
            ApiError::Parse(err.to_string())
        } else {
            ApiError::Network(err.to_string())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn user_messages_are_the_storefront_wording() {
        assert_eq!(
            CartError::StockInsufficient.user_message(),
            "Quantidade insuficiente em estoque"
        );
        assert_eq!(CartError::AddFailed.user_message(), "Erro na adição do produto");
        assert_eq!(CartError::RemoveFailed.user_message(), "Erro na remoção do produto");
        assert_eq!(
            CartError::UpdateFailed.user_message(),
            "Erro ao alterar a quantidade do produto"
        );
    }

    #[test]
    fn codes_are_distinct() {
        let codes = [
            CartError::StockInsufficient.code(),
            CartError::AddFailed.code(),
            CartError::RemoveFailed.code(),
            CartError::UpdateFailed.code(),
        ];
        for (i, a) in codes.iter().enumerate() {
            for b in &codes[i + 1..] {
                assert_ne!(a, b);
            }
        }
    }

    #[test]
    fn storage_error_wraps_serde() {
        let err = serde_json::from_str::<serde_json::Value>("{").unwrap_err();
        let err = StorageError::from(err);
        assert!(err.to_string().starts_with("serialization error"));
    }
}
