use thiserror::Error;

use crate::types::LoanId;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum EngineError {
    #[error("rounding drift on loan {loan_id} in month {month}: {detail}")]
    RoundingDrift {
        loan_id: LoanId,
        month: u32,
        detail: String,
    },

    #[error("loan not found: {id}")]
    LoanNotFound {
        id: LoanId,
    },

    #[error("invalid date: {message}")]
    InvalidDate {
        message: String,
    },

    #[error("invalid configuration: {message}")]
    InvalidConfiguration {
        message: String,
    },
}

pub type Result<T> = std::result::Result<T, EngineError>;
