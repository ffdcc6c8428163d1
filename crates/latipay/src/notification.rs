//! Callback and return handling.
//!
//! Inbound callbacks come from the open network. The only field read from
//! them is the token, which is used to re-query the gateway; every status
//! and amount exposed by [`Notification`] comes from a signature-verified
//! query response.

use crate::client::GatewayClient;
use crate::constants::STATUS_PAID;
use crate::error::{LatipayError, LatipayResult};
use crate::response::QueryResponse;
use crate::transport::HttpTransport;

/// Resolves callbacks into verified transaction state via the query endpoint.
#[derive(Debug)]
pub struct NotificationResolver<'c, T> {
    client: &'c GatewayClient<T>,
}

impl<'c, T: HttpTransport> NotificationResolver<'c, T> {
    pub fn new(client: &'c GatewayClient<T>) -> Self {
        Self { client }
    }

    /// Resolve a callback given its parameters (`token` or `Token`).
    pub async fn resolve<I, K, V>(&self, params: I) -> LatipayResult<Notification>
    where
        I: IntoIterator<Item = (K, V)>,
        K: AsRef<str>,
        V: AsRef<str>,
    {
        let token = extract_token(params)?;
        tracing::debug!(token = %token, "resolving gateway notification");
        let response = self.client.query(&token).await?;
        Ok(Notification { token, response })
    }

    /// Resolve a form-encoded callback body.
    pub async fn resolve_raw_post(&self, body: &str) -> LatipayResult<Notification> {
        self.resolve(url::form_urlencoded::parse(body.as_bytes())).await
    }

    /// Resolve a return redirect from its query string (leading `?`
    /// optional) or full URL.
    pub async fn resolve_return(&self, query_string: &str) -> LatipayResult<Notification> {
        self.resolve_raw_post(&return_query(query_string)).await
    }
}

impl<T: HttpTransport> GatewayClient<T> {
    pub fn notifications(&self) -> NotificationResolver<'_, T> {
        NotificationResolver::new(self)
    }
}

/// The query component of a return redirect.
///
/// Only an absolute URL with a host is split; anything else is taken as a
/// query string, so a literal `?` inside a value survives.
fn return_query(input: &str) -> String {
    match url::Url::parse(input) {
        Ok(url) if url.has_host() => url.query().unwrap_or_default().to_string(),
        _ => input.strip_prefix('?').unwrap_or(input).to_string(),
    }
}

/// Pull the lookup token out of callback parameters. `token` wins over `Token`.
pub fn extract_token<I, K, V>(params: I) -> LatipayResult<String>
where
    I: IntoIterator<Item = (K, V)>,
    K: AsRef<str>,
    V: AsRef<str>,
{
    let mut capitalized = None;
    for (key, value) in params {
        let value = value.as_ref().trim();
        if value.is_empty() {
            continue;
        }
        match key.as_ref() {
            "token" => return Ok(value.to_string()),
            "Token" if capitalized.is_none() => capitalized = Some(value.to_string()),
            _ => {}
        }
    }
    capitalized.ok_or(LatipayError::InvalidInput("callback token is required"))
}

/// A callback resolved against the gateway.
#[derive(Debug, Clone, PartialEq)]
pub struct Notification {
    token: String,
    response: QueryResponse,
}

impl Notification {
    /// The token the callback carried (the merchant reference).
    pub fn token(&self) -> &str {
        &self.token
    }

    pub fn complete(&self) -> bool {
        self.status().as_deref() == Some(STATUS_PAID)
    }

    pub fn status(&self) -> Option<String> {
        self.response.status()
    }

    /// Amount the gateway reports for the order.
    pub fn gross(&self) -> Option<String> {
        self.response.amount()
    }

    pub fn currency(&self) -> Option<String> {
        self.response.currency()
    }

    pub fn payment_method(&self) -> Option<String> {
        self.response.payment_method()
    }

    /// The gateway's order id.
    pub fn transaction_id(&self) -> Option<String> {
        self.response.order_id()
    }

    /// The merchant's order reference.
    pub fn item_id(&self) -> Option<String> {
        self.response.merchant_reference()
    }

    pub fn response(&self) -> &QueryResponse {
        &self.response
    }

    /// Always true: resolution already verified the gateway's signature,
    /// so there is nothing further to confirm.
    pub fn acknowledge(&self) -> bool {
        true
    }
}
