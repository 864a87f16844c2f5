//! Chef signed-header authentication, protocol version 1.3
//!
//! Every request carries a SHA-256 hash of its body and an RSA PKCS#1 v1.5
//! signature over a canonical description of the request. The signature is
//! base64 encoded and split across `X-Ops-Authorization-N` headers.

use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine;
use chrono::{DateTime, Utc};
use rsa::pkcs1::DecodeRsaPrivateKey;
use rsa::pkcs1v15::SigningKey;
use rsa::pkcs8::DecodePrivateKey;
use rsa::signature::{SignatureEncoding, Signer};
use rsa::RsaPrivateKey;
use sha2::{Digest, Sha256};

use crate::error::{InventoryError, Result};

/// Signing protocol version
pub const SIGN_VERSION: &str = "1.3";

/// Chef server API version requested
pub const SERVER_API_VERSION: &str = "1";

/// Width of each `X-Ops-Authorization-N` header value
const AUTH_HEADER_WIDTH: usize = 60;

/// Signs Chef API requests as a given client
pub struct RequestSigner {
    user_id: String,
    key: SigningKey<Sha256>,
}

impl RequestSigner {
    /// Parse a PEM private key in PKCS#1 or PKCS#8 form
    pub fn from_pem(user_id: impl Into<String>, pem: &str) -> Result<Self> {
        let key = RsaPrivateKey::from_pkcs1_pem(pem)
            .or_else(|_| RsaPrivateKey::from_pkcs8_pem(pem))
            .map_err(|e| InventoryError::InvalidKey(e.to_string()))?;

        Ok(Self {
            user_id: user_id.into(),
            key: SigningKey::<Sha256>::new(key),
        })
    }

    /// Client name the requests are signed as
    pub fn user_id(&self) -> &str {
        &self.user_id
    }

    /// Compute the authentication headers for a request
    ///
    /// `path` is the URL path without query string.
    pub fn sign(
        &self,
        method: &str,
        path: &str,
        body: &[u8],
        timestamp: DateTime<Utc>,
    ) -> Result<Vec<(String, String)>> {
        let content_hash = content_hash(body);
        let timestamp = timestamp.format("%Y-%m-%dT%H:%M:%SZ").to_string();
        let canonical = canonical_request(method, path, &content_hash, &timestamp, &self.user_id);

        let signature = self
            .key
            .try_sign(canonical.as_bytes())
            .map_err(|e| InventoryError::InvalidKey(e.to_string()))?;
        let encoded = BASE64.encode(signature.to_bytes());

        let mut headers = vec![
            ("X-Ops-Sign".to_string(), format!("algorithm=sha256;version={}", SIGN_VERSION)),
            ("X-Ops-UserId".to_string(), self.user_id.clone()),
            ("X-Ops-Timestamp".to_string(), timestamp),
            ("X-Ops-Content-Hash".to_string(), content_hash),
            ("X-Ops-Server-API-Version".to_string(), SERVER_API_VERSION.to_string()),
        ];
        headers.extend(authorization_headers(&encoded));
        Ok(headers)
    }
}

/// Base64 SHA-256 of a request body
pub fn content_hash(body: &[u8]) -> String {
    BASE64.encode(Sha256::digest(body))
}

/// The string signed for a request
pub fn canonical_request(
    method: &str,
    path: &str,
    content_hash: &str,
    timestamp: &str,
    user_id: &str,
) -> String {
    format!(
        "Method:{}\nPath:{}\nX-Ops-Content-Hash:{}\nX-Ops-Sign:version={}\nX-Ops-Timestamp:{}\nX-Ops-UserId:{}\nX-Ops-Server-API-Version:{}",
        method.to_uppercase(),
        path,
        content_hash,
        SIGN_VERSION,
        timestamp,
        user_id,
        SERVER_API_VERSION,
    )
}

fn authorization_headers(signature: &str) -> Vec<(String, String)> {
    signature
        .as_bytes()
        .chunks(AUTH_HEADER_WIDTH)
        .enumerate()
        .map(|(i, chunk)| {
            (
                format!("X-Ops-Authorization-{}", i + 1),
                String::from_utf8_lossy(chunk).into_owned(),
            )
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use rsa::pkcs1::{EncodeRsaPrivateKey, LineEnding};
    use rsa::pkcs1v15::{Signature, VerifyingKey};
    use rsa::pkcs8::EncodePrivateKey;
    use rsa::signature::Verifier;

    fn test_key() -> RsaPrivateKey {
        let mut rng = rand::thread_rng();
        RsaPrivateKey::new(&mut rng, 1024).unwrap()
    }

    fn header<'a>(headers: &'a [(String, String)], name: &str) -> Option<&'a str> {
        headers
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, v)| v.as_str())
    }

    #[test]
    fn test_content_hash_of_empty_body() {
        assert_eq!(content_hash(b""), "47DEQpj8HBSa+/TImW+5JCeuQeRkm5NMpJWZG3hSuFU=");
    }

    #[test]
    fn test_canonical_request_layout() {
        let canonical = canonical_request("get", "/nodes/web-01", "HASH", "2024-01-01T00:00:00Z", "web-01");
        assert_eq!(
            canonical,
            "Method:GET\nPath:/nodes/web-01\nX-Ops-Content-Hash:HASH\nX-Ops-Sign:version=1.3\n\
             X-Ops-Timestamp:2024-01-01T00:00:00Z\nX-Ops-UserId:web-01\nX-Ops-Server-API-Version:1"
        );
    }

    #[test]
    fn test_signature_verifies() {
        let key = test_key();
        let pem = key.to_pkcs1_pem(LineEnding::LF).unwrap();
        let signer = RequestSigner::from_pem("web-01", &pem).unwrap();
        let now = Utc.with_ymd_and_hms(2024, 5, 1, 12, 30, 0).unwrap();

        let headers = signer.sign("GET", "/nodes/web-01", b"", now).unwrap();
        assert_eq!(header(&headers, "X-Ops-Timestamp"), Some("2024-05-01T12:30:00Z"));
        assert_eq!(header(&headers, "X-Ops-Sign"), Some("algorithm=sha256;version=1.3"));

        let encoded: String = headers
            .iter()
            .filter(|(n, _)| n.starts_with("X-Ops-Authorization-"))
            .map(|(_, v)| v.as_str())
            .collect();
        let signature = Signature::try_from(BASE64.decode(encoded).unwrap().as_slice()).unwrap();

        let canonical = canonical_request("GET", "/nodes/web-01", &content_hash(b""), "2024-05-01T12:30:00Z", "web-01");
        let verifier = VerifyingKey::<Sha256>::new(key.to_public_key());
        assert!(verifier.verify(canonical.as_bytes(), &signature).is_ok());
    }

    #[test]
    fn test_authorization_headers_are_chunked() {
        let key = test_key();
        let pem = key.to_pkcs8_pem(LineEnding::LF).unwrap();
        let signer = RequestSigner::from_pem("web-01", &pem).unwrap();

        let headers = signer.sign("GET", "/search/node", b"", Utc::now()).unwrap();
        let chunks: Vec<_> = headers
            .iter()
            .filter(|(n, _)| n.starts_with("X-Ops-Authorization-"))
            .collect();

        // 128-byte signature, 172 base64 chars
        assert_eq!(chunks.len(), 3);
        assert_eq!(chunks[0].0, "X-Ops-Authorization-1");
        assert!(chunks.iter().take(2).all(|(_, v)| v.len() == 60));
    }

    #[test]
    fn test_invalid_pem_rejected() {
        let result = RequestSigner::from_pem("web-01", "not a key");
        assert!(matches!(result, Err(InventoryError::InvalidKey(_))));
    }
}
