use crate::signer::Signer;

/// Merchant credentials issued by Latipay.
///
/// The api key is only ever used to derive signatures; `user_id` and
/// `wallet_id` travel as plain request fields.
#[derive(Clone)]
pub struct Credentials {
    api_key: String,
    pub user_id: String,
    pub wallet_id: String,
}

impl Credentials {
    pub fn new(
        api_key: impl Into<String>,
        user_id: impl Into<String>,
        wallet_id: impl Into<String>,
    ) -> Self {
        Self {
            api_key: api_key.into(),
            user_id: user_id.into(),
            wallet_id: wallet_id.into(),
        }
    }

    pub fn signer(&self) -> Signer {
        Signer::new(self.api_key.clone())
    }
}

impl std::fmt::Debug for Credentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Credentials")
            .field("api_key", &"[REDACTED]")
            .field("user_id", &self.user_id)
            .field("wallet_id", &self.wallet_id)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn debug_never_prints_api_key() {
        let creds = Credentials::new("7EE1-secret", "U007331000", "W007331000");
        let dbg = format!("{creds:?}");
        assert!(!dbg.contains("7EE1-secret"));
        assert!(dbg.contains("U007331000"));
        assert!(dbg.contains("[REDACTED]"));
    }
}
