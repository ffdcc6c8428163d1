use std::fmt;

use thiserror::Error;

/// Result type for gateway operations.
pub type LatipayResult<T> = Result<T, LatipayError>;

/// Gateway operation an error belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Operation {
    Transaction,
    Query,
    Refund,
}

impl Operation {
    pub fn as_str(&self) -> &'static str {
        match self {
            Operation::Transaction => "transaction",
            Operation::Query => "query",
            Operation::Refund => "refund",
        }
    }
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Gateway-reported business error codes, shared by every operation.
pub const ERROR_CODES: &[(&str, &str)] = &[
    ("201", "order not exist"),
    ("204", "Some fields from input are null"),
    (
        "205",
        "Cannot find out corresponding key for the user code or user is disabled or user is not activity",
    ),
    ("206", "Signature from Merchant request is wrong"),
    ("207", "Param is wrong"),
    ("300", "Gateway not exist"),
    ("301", "Wrong account info or currency info"),
    ("302", "Paycompany not exist"),
    ("303", "Wrong pay type from merchant"),
    ("304", "Wallet does not support this payment method"),
    ("305", "No margin plan for the merchant"),
    ("450", "Wallet not assign to user"),
    ("1", "FAIL"),
];

/// Look up the description of a gateway error code.
pub fn describe_code(code: &str) -> Option<&'static str> {
    ERROR_CODES
        .iter()
        .find(|(c, _)| *c == code)
        .map(|(_, text)| *text)
}

/// Failure of the underlying HTTP exchange.
#[derive(Debug, Error)]
#[error("{0}")]
pub struct TransportError(pub String);

/// Errors returned by Latipay gateway operations.
#[derive(Debug, Error)]
pub enum LatipayError {
    /// A required argument was missing or empty. Raised before any request is sent.
    #[error("invalid input: {0}")]
    InvalidInput(&'static str),

    /// The gateway answered with a non-zero code.
    #[error("{operation} request failed: {}", gateway_summary(.code, .message))]
    Gateway {
        operation: Operation,
        code: String,
        message: String,
    },

    /// The response signature did not match. Never a business error.
    #[error("invalid signature in {operation} response")]
    SignatureMismatch { operation: Operation },

    #[error("malformed {operation} response: {reason}")]
    MalformedResponse {
        operation: Operation,
        reason: String,
    },

    #[error("transport error: {0}")]
    Transport(#[from] TransportError),

    #[error("serialization error: {0}")]
    Serde(#[from] serde_json::Error),
}

impl LatipayError {
    /// Taxonomy text for a gateway error, if the code is known.
    pub fn description(&self) -> Option<&'static str> {
        match self {
            LatipayError::Gateway { code, .. } => describe_code(code),
            _ => None,
        }
    }

    /// Raw gateway code for a gateway error.
    pub fn code(&self) -> Option<&str> {
        match self {
            LatipayError::Gateway { code, .. } => Some(code),
            _ => None,
        }
    }

    pub fn operation(&self) -> Option<Operation> {
        match self {
            LatipayError::Gateway { operation, .. }
            | LatipayError::SignatureMismatch { operation }
            | LatipayError::MalformedResponse { operation, .. } => Some(*operation),
            _ => None,
        }
    }
}

fn gateway_summary(code: &str, message: &str) -> String {
    match describe_code(code) {
        Some(text) => format!("{text} (code {code}: {message})"),
        None => format!("code {code}: {message}"),
    }
}
