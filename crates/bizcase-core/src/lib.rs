pub mod error;
pub mod projection;
pub mod time_value;
pub mod types;

#[cfg(feature = "scenarios")]
pub mod scenarios;

pub use error::BizCaseError;
pub use types::*;

/// Standard result type for all bizcase operations
pub type BizCaseResult<T> = Result<T, BizCaseError>;
