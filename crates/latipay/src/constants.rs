/// Production API host.
pub const API_BASE: &str = "https://api.latipay.net";

/// Versioned path for transaction creation and status queries.
pub const TRANSACTION_PATH: &str = "/v2/transaction";

/// Refund path. Unversioned, unlike the transaction endpoints.
pub const REFUND_PATH: &str = "/refund";

/// Value of the `version` field sent with hosted checkout requests.
pub const PROTOCOL_VERSION: &str = "2.0";

/// Payment method that needs the gateway to render a QR code.
pub const WECHAT: &str = "wechat";

/// Status reported by the gateway once a payment has settled.
pub const STATUS_PAID: &str = "paid";

/// Runtime endpoint configuration. Decouples the client from the
/// production host so sandboxes and test servers can be targeted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Endpoints {
    pub api_base: String,
}

impl Endpoints {
    pub fn new(api_base: impl Into<String>) -> Self {
        Self {
            api_base: api_base.into().trim_end_matches('/').to_string(),
        }
    }

    pub fn transaction_url(&self) -> String {
        format!("{}{TRANSACTION_PATH}", self.api_base)
    }

    /// Status URL for one merchant reference; the reference is percent-encoded.
    pub fn query_url(&self, merchant_reference: &str) -> String {
        format!(
            "{}{TRANSACTION_PATH}/{}",
            self.api_base,
            urlencoding::encode(merchant_reference)
        )
    }

    pub fn refund_url(&self) -> String {
        format!("{}{REFUND_PATH}", self.api_base)
    }
}

impl Default for Endpoints {
    /// Defaults to the production host.
    fn default() -> Self {
        Self::new(API_BASE)
    }
}
