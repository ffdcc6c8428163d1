use serde::{Deserialize, Serialize};

use crate::constants::PROTOCOL_VERSION;
use crate::credentials::Credentials;
use crate::fields::FieldSet;

/// An order ready for hosted checkout.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CheckoutRequest {
    /// The merchant's order identifier.
    pub merchant_reference: String,
    pub amount: String,
    /// e.g. `alipay`, `wechat`, `polipay`.
    pub payment_method: String,
    /// Customer IP address.
    pub ip: String,
    pub product_name: String,
    pub return_url: String,
    /// Server-to-server notification URL. Defaults to `return_url`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub callback_url: Option<String>,
}

impl CheckoutRequest {
    /// Transaction fields for this order, not yet signed.
    pub fn to_fields(&self, credentials: &Credentials) -> FieldSet {
        let mut fields = FieldSet::new();
        fields.insert("version", PROTOCOL_VERSION);
        fields.insert("payment_method", &self.payment_method);
        fields.insert("ip", &self.ip);
        fields.insert("product_name", &self.product_name);
        fields.insert(
            "callback_url",
            self.callback_url.as_deref().unwrap_or(&self.return_url),
        );
        fields.insert("wallet_id", &credentials.wallet_id);
        fields.insert("amount", &self.amount);
        fields.insert("return_url", &self.return_url);
        fields.insert("merchant_reference", &self.merchant_reference);
        fields.insert("user_id", &credentials.user_id);
        fields
    }
}
