use hmac::{Hmac, Mac};
use sha2::Sha256;
use subtle::ConstantTimeEq;

use crate::fields::FieldSet;

type HmacSha256 = Hmac<Sha256>;

/// Signs and verifies Latipay messages with the merchant api key.
///
/// The api key plays two roles: it is appended to the canonical message
/// and it is the HMAC key.
#[derive(Clone)]
pub struct Signer {
    secret: String,
}

impl Signer {
    pub fn new(secret: impl Into<String>) -> Self {
        Self {
            secret: secret.into(),
        }
    }

    /// Canonical message for a field set: present fields sorted by key,
    /// joined as `k=v&k=v`, with the secret appended.
    pub fn canonical_message(&self, fields: &FieldSet) -> String {
        let mut message = fields.canonical();
        message.push_str(&self.secret);
        message
    }

    /// Sign a field set. Returns the lowercase hex HMAC-SHA256 digest.
    pub fn sign(&self, fields: &FieldSet) -> String {
        self.sign_message(&self.canonical_message(fields))
    }

    /// Verify a response signature over an already-assembled message.
    ///
    /// The comparison runs in constant time over the hex text, so an
    /// uppercase or truncated signature is rejected like any other mismatch.
    pub fn verify(&self, message: &str, signature: &str) -> bool {
        let expected = self.sign_message(message);
        let (a, b) = (expected.as_bytes(), signature.as_bytes());
        a.len() == b.len() && bool::from(a.ct_eq(b))
    }

    /// HMAC-SHA256 over an arbitrary message, lowercase hex.
    pub fn sign_message(&self, message: &str) -> String {
        let mut mac =
            HmacSha256::new_from_slice(self.secret.as_bytes()).expect("HMAC accepts any key length");
        mac.update(message.as_bytes());
        hex::encode(mac.finalize().into_bytes())
    }
}

impl std::fmt::Debug for Signer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Signer")
            .field("secret", &"[REDACTED]")
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn hmac_hex(key: &str, message: &str) -> String {
        let mut mac = HmacSha256::new_from_slice(key.as_bytes()).unwrap();
        mac.update(message.as_bytes());
        hex::encode(mac.finalize().into_bytes())
    }

    #[test]
    fn test_sign_matches_manual_construction() {
        let signer = Signer::new("7EE1");
        let mut fields = FieldSet::new();
        fields.insert("user_id", "U007331000");
        fields.insert("merchant_reference", "22TEST");

        let expected = hmac_hex("7EE1", "merchant_reference=22TEST&user_id=U0073310007EE1");
        assert_eq!(signer.sign(&fields), expected);
    }

    #[test]
    fn test_sign_ignores_insertion_order() {
        let signer = Signer::new("secret");
        let mut a = FieldSet::new();
        a.insert("b", "2");
        a.insert("a", "1");
        a.insert("c", 3);
        let mut b = FieldSet::new();
        b.insert("c", 3);
        b.insert("a", "1");
        b.insert("b", "2");
        assert_eq!(signer.sign(&a), signer.sign(&b));
    }

    #[test]
    fn test_absent_fields_are_not_signed() {
        let signer = Signer::new("secret");
        let mut with_absent = FieldSet::new();
        with_absent.insert("amount", "1.00");
        with_absent.insert_absent("reference");
        let mut without = FieldSet::new();
        without.insert("amount", "1.00");

        assert_eq!(
            signer.canonical_message(&with_absent),
            "amount=1.00secret"
        );
        assert_eq!(signer.sign(&with_absent), signer.sign(&without));
    }

    #[test]
    fn test_verify_roundtrip() {
        let signer = Signer::new("secret");
        let mut fields = FieldSet::new();
        fields.insert("amount", "0.01");
        fields.insert("user_id", "U1");
        let sig = signer.sign(&fields);
        assert!(signer.verify(&signer.canonical_message(&fields), &sig));
    }

    #[test]
    fn test_verify_wrong_secret() {
        let sig = Signer::new("secret-1").sign_message("nonce-host");
        assert!(!Signer::new("secret-2").verify("nonce-host", &sig));
    }

    #[test]
    fn test_verify_tampered_message() {
        let signer = Signer::new("secret");
        let sig = signer.sign_message("original");
        assert!(!signer.verify("tampered", &sig));
    }

    #[test]
    fn test_verify_rejects_garbage() {
        let signer = Signer::new("secret");
        assert!(!signer.verify("body", "not-hex-zz"));
        assert!(!signer.verify("body", ""));
        let upper = signer.sign_message("body").to_uppercase();
        assert!(!signer.verify("body", &upper));
    }

    #[test]
    fn test_debug_redacts_secret() {
        let dbg = format!("{:?}", Signer::new("super-secret"));
        assert!(!dbg.contains("super-secret"));
    }
}
