use std::collections::BTreeMap;

use crate::checkout::CheckoutRequest;
use crate::constants::{Endpoints, WECHAT};
use crate::credentials::Credentials;
use crate::error::{LatipayError, LatipayResult, Operation};
use crate::fields::FieldSet;
use crate::response::{parse_response, QueryResponse, ResponseValidator};
use crate::signer::Signer;
use crate::transport::{Headers, HttpTransport};

const JSON_HEADERS: Headers<'static> = &[("Content-Type", "application/json")];

/// Client for the Latipay transaction, query and refund endpoints.
///
/// Holds only immutable state, so one instance can serve concurrent callers.
/// Every response is code-checked and (for transaction and query)
/// signature-verified before a result is returned.
#[derive(Debug, Clone)]
pub struct GatewayClient<T> {
    credentials: Credentials,
    signer: Signer,
    endpoints: Endpoints,
    transport: T,
}

impl<T: HttpTransport> GatewayClient<T> {
    pub fn new(credentials: Credentials, transport: T) -> Self {
        Self {
            signer: credentials.signer(),
            credentials,
            endpoints: Endpoints::default(),
            transport,
        }
    }

    pub fn with_endpoints(mut self, endpoints: Endpoints) -> Self {
        self.endpoints = endpoints;
        self
    }

    pub fn credentials(&self) -> &Credentials {
        &self.credentials
    }

    pub fn endpoints(&self) -> &Endpoints {
        &self.endpoints
    }

    pub fn transport(&self) -> &T {
        &self.transport
    }

    pub fn signer(&self) -> &Signer {
        &self.signer
    }

    pub fn validator(&self) -> ResponseValidator<'_> {
        ResponseValidator::new(&self.signer)
    }

    /// Create a hosted checkout transaction and return its redirect URL.
    ///
    /// `present_qr=1` is added for WeChat payments and stripped otherwise.
    /// Any `signature` already in `fields` is replaced.
    pub async fn transaction(&self, mut fields: FieldSet) -> LatipayResult<String> {
        let operation = Operation::Transaction;
        fields.remove("signature");
        apply_present_qr(&mut fields);

        let signature = self.signer.sign(&fields);
        fields.insert("signature", signature);
        let body = serde_json::to_vec(&fields)?;

        let url = self.endpoints.transaction_url();
        tracing::debug!(
            operation = %operation,
            url = %url,
            merchant_reference = ?fields.get("merchant_reference").map(ToString::to_string),
            "sending gateway request"
        );
        let raw = self.transport.post(&url, body, JSON_HEADERS).await?;
        let response = parse_response(operation, &raw)?;
        self.validator().transaction(&response)
    }

    /// Build the transaction fields for a checkout request and submit them.
    pub async fn checkout_url(&self, request: &CheckoutRequest) -> LatipayResult<String> {
        self.transaction(request.to_fields(&self.credentials)).await
    }

    /// Fetch the authoritative state of a transaction by merchant reference.
    pub async fn query(&self, merchant_reference: &str) -> LatipayResult<QueryResponse> {
        let operation = Operation::Query;
        if merchant_reference.trim().is_empty() {
            return Err(LatipayError::InvalidInput("merchant reference is required"));
        }

        let url = self.signed_query_url(merchant_reference);
        tracing::debug!(
            operation = %operation,
            merchant_reference = %merchant_reference,
            "sending gateway request"
        );
        let raw = self.transport.get(&url, &[]).await?;
        let response = parse_response(operation, &raw)?;
        self.validator().query(merchant_reference, response)
    }

    /// The signed status URL for a merchant reference.
    ///
    /// The reference travels in the path; the remaining signed fields and
    /// the signature form the query string, sorted by name.
    pub fn signed_query_url(&self, merchant_reference: &str) -> String {
        let mut fields = FieldSet::new();
        fields.insert("user_id", &self.credentials.user_id);
        fields.insert("merchant_reference", merchant_reference);
        let signature = self.signer.sign(&fields);

        let mut params: BTreeMap<&str, String> = fields
            .present()
            .filter(|(k, _)| *k != "merchant_reference")
            .map(|(k, v)| (k, v.to_string()))
            .collect();
        params.insert("signature", signature);

        let query = url::form_urlencoded::Serializer::new(String::new())
            .extend_pairs(params.iter())
            .finish();
        format!("{}?{query}", self.endpoints.query_url(merchant_reference))
    }

    /// Refund (part of) a settled order. Returns the gateway's message.
    ///
    /// Refund responses carry no signature, so only the code is checked.
    pub async fn refund(
        &self,
        order_id: &str,
        refund_amount: &str,
        reference: Option<&str>,
    ) -> LatipayResult<String> {
        let operation = Operation::Refund;
        if order_id.trim().is_empty() {
            return Err(LatipayError::InvalidInput("order id is required"));
        }
        if refund_amount.trim().is_empty() {
            return Err(LatipayError::InvalidInput("refund amount is required"));
        }

        let mut fields = FieldSet::new();
        fields.insert("refund_amount", refund_amount);
        fields.insert("reference", reference.unwrap_or_default());
        fields.insert("user_id", &self.credentials.user_id);
        fields.insert("order_id", order_id);
        let signature = self.signer.sign(&fields);
        fields.insert("signature", signature);
        let body = serde_json::to_vec(&fields)?;

        let url = self.endpoints.refund_url();
        tracing::debug!(
            operation = %operation,
            url = %url,
            order_id = %order_id,
            "sending gateway request"
        );
        let raw = self.transport.post(&url, body, JSON_HEADERS).await?;
        let response = parse_response(operation, &raw)?;
        self.validator().refund(&response)
    }
}

/// WeChat checkouts must ask the gateway for a QR code; nothing else may.
fn apply_present_qr(fields: &mut FieldSet) {
    let is_wechat = fields
        .get("payment_method")
        .and_then(|v| v.as_str())
        .is_some_and(|m| m == WECHAT);
    if is_wechat {
        fields.insert("present_qr", "1");
    } else {
        fields.remove("present_qr");
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn present_qr_only_for_wechat() {
        let mut wechat: FieldSet = [("payment_method", "wechat")].into_iter().collect();
        apply_present_qr(&mut wechat);
        assert_eq!(wechat.get("present_qr").map(ToString::to_string).as_deref(), Some("1"));

        let mut alipay: FieldSet = [("payment_method", "alipay"), ("present_qr", "1")]
            .into_iter()
            .collect();
        apply_present_qr(&mut alipay);
        assert!(!alipay.contains_key("present_qr"));

        let mut none = FieldSet::new();
        apply_present_qr(&mut none);
        assert!(none.is_empty());
    }
}
