//! Signed request/response client for the Latipay payment gateway.
//!
//! Every request is signed with HMAC-SHA256 over a canonical `key=value&...`
//! message, and every transaction and query response is signature-verified
//! before a result is handed back.
//!
//! # Operations
//!
//! - **Transaction** ([`GatewayClient::transaction`]): create a hosted checkout, get a redirect URL
//! - **Query** ([`GatewayClient::query`]): fetch verified transaction state
//! - **Refund** ([`GatewayClient::refund`]): refund a settled order
//!
//! Callbacks are resolved through [`NotificationResolver`], which re-queries
//! the gateway instead of trusting the callback payload.
//!
//! # Quick example
//!
//! ```no_run
//! use latipay::{Credentials, GatewayClient, ReqwestTransport};
//!
//! # #[tokio::main]
//! # async fn main() {
//! let creds = Credentials::new("API_KEY", "U000000000", "W000000000");
//! let client = GatewayClient::new(creds, ReqwestTransport::new());
//!
//! let state = client.query("ORDER-1").await.unwrap();
//! println!("status: {:?}", state.status());
//! # }
//! ```

// Protocol primitives
pub mod constants;
pub mod credentials;
pub mod error;
pub mod fields;
pub mod response;
pub mod signer;

// Gateway operations
pub mod checkout;
pub mod client;
pub mod notification;
pub mod transport;

// Re-exports
pub use constants::*;
pub use credentials::Credentials;
pub use error::{describe_code, LatipayError, LatipayResult, Operation, TransportError};
pub use fields::{FieldSet, FieldValue};
pub use response::{QueryResponse, ResponseValidator};
pub use signer::Signer;

pub use checkout::CheckoutRequest;
pub use client::GatewayClient;
pub use notification::{Notification, NotificationResolver};
pub use transport::HttpTransport;

#[cfg(feature = "full")]
pub use transport::ReqwestTransport;
