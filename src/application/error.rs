use std::fmt;

use thiserror::Error;

use crate::config::ConfigError;
use crate::domain::{Cents, LedgerError, format_cents};

use super::ProviderError;

/// A blocking message shown to the user, the CLI counterpart of an alert dialog.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notice {
    pub title: String,
    pub message: String,
}

impl Notice {
    pub fn new(title: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            message: message.into(),
        }
    }
}

impl fmt::Display for Notice {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.title, self.message)
    }
}

fn money(cents: &Cents) -> String {
    format_cents(*cents)
}

#[derive(Error, Debug)]
pub enum AppError {
    #[error("Insufficient balance: balance {}, required {}", money(.balance), money(.required))]
    InsufficientBalance { balance: Cents, required: Cents },

    /// A wallet send larger than the balance.
    #[error("Insufficient balance for transfer: balance {}, required {}", money(.balance), money(.required))]
    TransferExceedsBalance { balance: Cents, required: Cents },

    /// A wallet provider call failed. Ledger state is unchanged.
    #[error("{message}")]
    Provider {
        message: String,
        #[source]
        source: ProviderError,
    },

    /// An unexpected failure of the current user action. Ledger state is unchanged.
    #[error("{title}: {message}")]
    OperationFailed { title: String, message: String },

    #[error("Service not found: {0}")]
    ServiceNotFound(String),

    #[error("Payment method not found: {0}")]
    PaymentMethodNotFound(String),

    #[error("No payment is pending")]
    NoPendingPayment,

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Invalid amount: {0}")]
    InvalidAmount(String),

    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),
}

impl AppError {
    pub fn operation_failed(title: impl Into<String>, message: impl Into<String>) -> Self {
        AppError::OperationFailed {
            title: title.into(),
            message: message.into(),
        }
    }

    pub fn provider(message: impl Into<String>, source: ProviderError) -> Self {
        AppError::Provider {
            message: message.into(),
            source,
        }
    }

    pub fn payment_failed() -> Self {
        Self::operation_failed("Payment Failed", "Please try again.")
    }

    /// The notice the user sees for this error.
    pub fn notice(&self) -> Notice {
        match self {
            AppError::InsufficientBalance { .. } => Notice::new(
                "Insufficient Balance",
                "Please add funds to your PYUSD wallet to continue.",
            ),
            AppError::TransferExceedsBalance { .. } => Notice::new("Error", "Insufficient balance"),
            AppError::OperationFailed { title, message } => Notice::new(title, message),
            AppError::Provider { message, .. } => Notice::new("Error", message),
            AppError::InvalidInput(message) | AppError::InvalidAmount(message) => {
                Notice::new("Error", message)
            }
            other => Notice::new("Error", other.to_string()),
        }
    }
}

impl From<LedgerError> for AppError {
    fn from(err: LedgerError) -> Self {
        match err {
            LedgerError::InsufficientBalance { balance, required } => {
                AppError::InsufficientBalance { balance, required }
            }
            LedgerError::UnknownService(id) => AppError::ServiceNotFound(id),
            LedgerError::UnknownPaymentMethod(id) => AppError::PaymentMethodNotFound(id),
            LedgerError::NoPendingPayment => AppError::NoPendingPayment,
            LedgerError::InvalidAmount(amount) => {
                AppError::InvalidAmount(format!("{} is not a valid amount", format_cents(amount)))
            }
            LedgerError::OperationFailed(_) => AppError::payment_failed(),
        }
    }
}
