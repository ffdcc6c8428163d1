//! Gateway response parsing and validation.
//!
//! Every operation first checks the response `code`, then (for transaction
//! and query) verifies the response signature over a fixed concatenation of
//! response fields. Refund responses carry no verifiable signature.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::error::{LatipayError, LatipayResult, Operation};
use crate::signer::Signer;

/// Fields concatenated (in order, no separators) for a transaction response signature.
pub const TRANSACTION_SIGNED_FIELDS: &[&str] = &["nonce", "host_url"];

/// Fields concatenated (in order, no separators) for a query response signature.
pub const QUERY_SIGNED_FIELDS: &[&str] = &[
    "merchant_reference",
    "payment_method",
    "status",
    "currency",
    "amount",
];

/// Whether a response `code` denotes success.
///
/// The gateway sends the code as a string on some endpoints and as an
/// integer on others; exactly `"0"` and `0` are success.
pub fn is_success_code(code: &Value) -> bool {
    match code {
        Value::Number(n) => n.as_i64() == Some(0) || n.as_u64() == Some(0),
        Value::String(s) => s == "0",
        _ => false,
    }
}

/// Render a scalar response value the way it appears in signed messages.
fn scalar_text(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

/// A verified query response. Fields are read directly from the gateway's object.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct QueryResponse {
    fields: Map<String, Value>,
}

impl QueryResponse {
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.fields.get(key)
    }

    /// A scalar field rendered as text.
    pub fn field(&self, key: &str) -> Option<String> {
        self.fields.get(key).and_then(scalar_text)
    }

    pub fn status(&self) -> Option<String> {
        self.field("status")
    }

    pub fn amount(&self) -> Option<String> {
        self.field("amount")
    }

    pub fn currency(&self) -> Option<String> {
        self.field("currency")
    }

    pub fn payment_method(&self) -> Option<String> {
        self.field("payment_method")
    }

    pub fn merchant_reference(&self) -> Option<String> {
        self.field("merchant_reference")
    }

    pub fn order_id(&self) -> Option<String> {
        self.field("order_id")
    }

    pub fn as_map(&self) -> &Map<String, Value> {
        &self.fields
    }

    pub fn into_inner(self) -> Map<String, Value> {
        self.fields
    }
}

/// Parse a raw response body into a JSON object.
pub fn parse_response(operation: Operation, body: &[u8]) -> LatipayResult<Map<String, Value>> {
    match serde_json::from_slice::<Value>(body) {
        Ok(Value::Object(map)) => Ok(map),
        Ok(other) => Err(LatipayError::MalformedResponse {
            operation,
            reason: format!("expected JSON object, got {}", json_kind(&other)),
        }),
        Err(e) => Err(LatipayError::MalformedResponse {
            operation,
            reason: format!("invalid JSON: {e}"),
        }),
    }
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

/// Checks response codes and signatures for each gateway operation.
#[derive(Debug, Clone, Copy)]
pub struct ResponseValidator<'a> {
    signer: &'a Signer,
}

impl<'a> ResponseValidator<'a> {
    pub fn new(signer: &'a Signer) -> Self {
        Self { signer }
    }

    /// Validate a transaction response and return the checkout redirect URL.
    pub fn transaction(&self, response: &Map<String, Value>) -> LatipayResult<String> {
        let operation = Operation::Transaction;
        ensure_success(operation, response)?;
        self.verify(operation, response, TRANSACTION_SIGNED_FIELDS)?;

        let host_url = required_text(operation, response, "host_url")?;
        let nonce = required_text(operation, response, "nonce")?;
        Ok(format!("{host_url}/{nonce}"))
    }

    /// Validate a query response for `merchant_reference`. The whole object
    /// is returned once verified.
    ///
    /// A correctly signed response for a different order is rejected.
    pub fn query(
        &self,
        merchant_reference: &str,
        response: Map<String, Value>,
    ) -> LatipayResult<QueryResponse> {
        let operation = Operation::Query;
        ensure_success(operation, &response)?;
        self.verify(operation, &response, QUERY_SIGNED_FIELDS)?;

        let returned = required_text(operation, &response, "merchant_reference")?;
        if returned != merchant_reference {
            tracing::warn!(
                requested = %merchant_reference,
                returned = %returned,
                "query response belongs to another order"
            );
            return Err(LatipayError::MalformedResponse {
                operation,
                reason: format!(
                    "response is for merchant reference `{returned}`, expected `{merchant_reference}`"
                ),
            });
        }
        Ok(QueryResponse { fields: response })
    }

    /// Validate a refund response and return the gateway message.
    ///
    /// Only the code is checked: refund responses are not signed.
    pub fn refund(&self, response: &Map<String, Value>) -> LatipayResult<String> {
        ensure_success(Operation::Refund, response)?;
        Ok(response
            .get("message")
            .and_then(scalar_text)
            .unwrap_or_default())
    }

    fn verify(
        &self,
        operation: Operation,
        response: &Map<String, Value>,
        signed_fields: &[&str],
    ) -> LatipayResult<()> {
        let mut message = String::new();
        for key in signed_fields {
            message.push_str(&required_text(operation, response, key)?);
        }
        let signature = required_text(operation, response, "signature")?;

        if self.signer.verify(&message, &signature) {
            Ok(())
        } else {
            tracing::warn!(
                operation = %operation,
                "response signature mismatch; possible tampering or canonicalization bug"
            );
            Err(LatipayError::SignatureMismatch { operation })
        }
    }
}

/// Fail with a gateway error unless the response code is zero.
pub fn ensure_success(operation: Operation, response: &Map<String, Value>) -> LatipayResult<()> {
    let code = response
        .get("code")
        .ok_or_else(|| LatipayError::MalformedResponse {
            operation,
            reason: "missing code".to_string(),
        })?;
    if is_success_code(code) {
        return Ok(());
    }

    let code = scalar_text(code).unwrap_or_else(|| code.to_string());
    let message = response
        .get("message")
        .and_then(scalar_text)
        .unwrap_or_default();
    tracing::warn!(operation = %operation, code = %code, message = %message, "gateway returned error");
    Err(LatipayError::Gateway {
        operation,
        code,
        message,
    })
}

fn required_text(
    operation: Operation,
    response: &Map<String, Value>,
    key: &str,
) -> LatipayResult<String> {
    response
        .get(key)
        .and_then(scalar_text)
        .ok_or_else(|| LatipayError::MalformedResponse {
            operation,
            reason: format!("missing or non-scalar field `{key}`"),
        })
}
