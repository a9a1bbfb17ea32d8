use thiserror::Error;

#[derive(Debug, Error)]
pub enum BizCaseError {
    #[error("Invalid input: {field} — {reason}")]
    InvalidInput { field: String, reason: String },

    #[error("Financial impossibility: {0}")]
    FinancialImpossibility(String),

    #[error("Insufficient data: {0}")]
    InsufficientData(String),

    #[error("Division by zero in {context}")]
    DivisionByZero { context: String },

    #[error("Serialization error: {0}")]
    SerializationError(String),
}

impl BizCaseError {
    pub(crate) fn invalid(field: &str, reason: impl Into<String>) -> Self {
        BizCaseError::InvalidInput {
            field: field.into(),
            reason: reason.into(),
        }
    }

    pub(crate) fn overflow(context: impl std::fmt::Display) -> Self {
        BizCaseError::FinancialImpossibility(format!("arithmetic overflow in {context}"))
    }
}

impl From<serde_json::Error> for BizCaseError {
    fn from(e: serde_json::Error) -> Self {
        BizCaseError::SerializationError(e.to_string())
    }
}
