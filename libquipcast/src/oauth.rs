//! OAuth 1.0a request signing for the platform API
//!
//! Produces `Authorization: OAuth ...` headers using HMAC-SHA1 over the
//! request method, base URI and the sorted, percent-encoded parameter set
//! (OAuth protocol parameters plus query parameters). JSON request bodies are
//! not part of the signature.

use std::time::Duration;

use base64::{engine::general_purpose::STANDARD, Engine as _};
use hmac::{Hmac, Mac};
use reqwest::{Method, Url};
use secrecy::{ExposeSecret, SecretString};
use serde::Serialize;
use sha1::Sha1;

use crate::error::RequestError;

type HmacSha1 = Hmac<Sha1>;

const SIGNATURE_METHOD: &str = "HMAC-SHA1";
const OAUTH_VERSION: &str = "1.0";

/// Consumer and access-token credential pairs
#[derive(Debug)]
pub struct OAuthCredentials {
    pub consumer_key: String,
    pub consumer_secret: SecretString,
    pub token: String,
    pub token_secret: SecretString,
}

/// RFC 3986 percent-encoding (everything but `A-Z a-z 0-9 - . _ ~`)
fn encode(value: &str) -> String {
    urlencoding::encode(value).into_owned()
}

/// Scheme, host, optional non-default port and path, without query or fragment
fn base_uri(url: &Url) -> String {
    let host = url.host_str().unwrap_or_default().to_lowercase();
    let port = url.port().map(|p| format!(":{}", p)).unwrap_or_default();
    format!("{}://{}{}{}", url.scheme(), host, port, url.path())
}

/// Build the signature base string
///
/// `params` must already contain every OAuth protocol parameter except
/// `oauth_signature`; query parameters of `url` are added here.
pub fn signature_base_string(method: &Method, url: &Url, params: &[(String, String)]) -> String {
    let mut encoded: Vec<(String, String)> = params
        .iter()
        .map(|(k, v)| (encode(k), encode(v)))
        .chain(url.query_pairs().map(|(k, v)| (encode(&k), encode(&v))))
        .collect();
    encoded.sort();

    let normalized = encoded
        .iter()
        .map(|(k, v)| format!("{}={}", k, v))
        .collect::<Vec<_>>()
        .join("&");

    format!(
        "{}&{}&{}",
        method.as_str().to_uppercase(),
        encode(&base_uri(url)),
        encode(&normalized)
    )
}

/// HMAC-SHA1 over `base_string`, base64 encoded
pub fn sign(
    base_string: &str,
    consumer_secret: &str,
    token_secret: &str,
) -> Result<String, RequestError> {
    let key = format!("{}&{}", encode(consumer_secret), encode(token_secret));
    let mut mac = HmacSha1::new_from_slice(key.as_bytes()).map_err(|e| RequestError::Build {
        operation: "sign request",
        message: e.to_string(),
    })?;
    mac.update(base_string.as_bytes());
    Ok(STANDARD.encode(mac.finalize().into_bytes()))
}

impl OAuthCredentials {
    /// Compute the `Authorization` header value for one request
    pub fn authorization_header(
        &self,
        method: &Method,
        url: &Url,
        nonce: &str,
        timestamp: i64,
    ) -> Result<String, RequestError> {
        let mut params = vec![
            ("oauth_consumer_key".to_string(), self.consumer_key.clone()),
            ("oauth_nonce".to_string(), nonce.to_string()),
            ("oauth_signature_method".to_string(), SIGNATURE_METHOD.to_string()),
            ("oauth_timestamp".to_string(), timestamp.to_string()),
            ("oauth_token".to_string(), self.token.clone()),
            ("oauth_version".to_string(), OAUTH_VERSION.to_string()),
        ];

        let base = signature_base_string(method, url, &params);
        let signature = sign(
            &base,
            self.consumer_secret.expose_secret(),
            self.token_secret.expose_secret(),
        )?;
        params.push(("oauth_signature".to_string(), signature));
        params.sort();

        let fields = params
            .iter()
            .map(|(k, v)| format!("{}=\"{}\"", encode(k), encode(v)))
            .collect::<Vec<_>>()
            .join(", ");

        Ok(format!("OAuth {}", fields))
    }
}

/// HTTP client whose requests carry a fresh OAuth 1.0a signature
#[derive(Debug)]
pub struct SignedClient {
    http: reqwest::Client,
    credentials: OAuthCredentials,
}

impl SignedClient {
    /// Create a signed client with a per-request timeout
    pub fn new(
        credentials: OAuthCredentials,
        timeout: Duration,
        user_agent: &str,
    ) -> Result<Self, RequestError> {
        let http = reqwest::Client::builder()
            .timeout(timeout)
            .user_agent(user_agent)
            .build()
            .map_err(|e| RequestError::Build {
                operation: "create HTTP client",
                message: e.to_string(),
            })?;

        Ok(Self { http, credentials })
    }

    /// Signed `GET` request
    pub fn get(&self, url: Url) -> Result<reqwest::RequestBuilder, RequestError> {
        let header = self.sign_request(&Method::GET, &url)?;
        Ok(self
            .http
            .get(url)
            .header(reqwest::header::AUTHORIZATION, header))
    }

    /// Signed `POST` request with a JSON body
    pub fn post_json<T: Serialize + ?Sized>(
        &self,
        url: Url,
        body: &T,
    ) -> Result<reqwest::RequestBuilder, RequestError> {
        let header = self.sign_request(&Method::POST, &url)?;
        Ok(self
            .http
            .post(url)
            .header(reqwest::header::AUTHORIZATION, header)
            .json(body))
    }

    fn sign_request(&self, method: &Method, url: &Url) -> Result<String, RequestError> {
        let nonce = uuid::Uuid::new_v4().simple().to_string();
        let timestamp = chrono::Utc::now().timestamp();
        self.credentials
            .authorization_header(method, url, &nonce, timestamp)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn reference_credentials() -> OAuthCredentials {
        OAuthCredentials {
            consumer_key: "xvz1evFS4wEEPTGEFPHBog".to_string(),
            consumer_secret: "kAcSOqF21Fu85e7zjz7ZN2U4ZRhfV3WpwPAoE3Z7kBw".to_string().into(),
            token: "370773112-GmHxMAgYyLbNEtIKZeRNFsMKPR9EyMZeS9weJAEb".to_string(),
            token_secret: "LswwdoUaIvS8ltyTt5jkRh4J50vUPVVHtR2YPi5kE".to_string().into(),
        }
    }

    fn reference_params() -> Vec<(String, String)> {
        vec![
            ("status".to_string(), "Hello Ladies + Gentlemen, a signed OAuth request!".to_string()),
            ("oauth_consumer_key".to_string(), "xvz1evFS4wEEPTGEFPHBog".to_string()),
            ("oauth_nonce".to_string(), "kYjzVBB8Y0ZFabxSWbWovY3uYSQ2pTgmZeNu2VS4cg".to_string()),
            ("oauth_signature_method".to_string(), "HMAC-SHA1".to_string()),
            ("oauth_timestamp".to_string(), "1318622958".to_string()),
            ("oauth_token".to_string(), "370773112-GmHxMAgYyLbNEtIKZeRNFsMKPR9EyMZeS9weJAEb".to_string()),
            ("oauth_version".to_string(), "1.0".to_string()),
        ]
    }

    #[test]
    fn test_encode_is_rfc3986() {
        assert_eq!(encode("Ladies + Gentlemen"), "Ladies%20%2B%20Gentlemen");
        assert_eq!(encode("a-b.c_d~e"), "a-b.c_d~e");
        assert_eq!(encode("!*'()"), "%21%2A%27%28%29");
    }

    #[test]
    fn test_base_uri_drops_query_and_default_port() {
        let url = Url::parse("https://API.Twitter.com:443/2/users/42/tweets?max_results=10").unwrap();
        assert_eq!(base_uri(&url), "https://api.twitter.com/2/users/42/tweets");

        let local = Url::parse("http://127.0.0.1:8080/2/users/me").unwrap();
        assert_eq!(base_uri(&local), "http://127.0.0.1:8080/2/users/me");
    }

    #[test]
    fn test_signature_base_string_sorts_and_encodes() {
        let url = Url::parse("https://api.twitter.com/1.1/statuses/update.json?include_entities=true")
            .unwrap();
        let base = signature_base_string(&Method::POST, &url, &reference_params());

        assert!(base.starts_with(
            "POST&https%3A%2F%2Fapi.twitter.com%2F1.1%2Fstatuses%2Fupdate.json&include_entities%3Dtrue%26oauth_consumer_key%3D"
        ));
        assert!(base.ends_with(
            "oauth_version%3D1.0%26status%3DHello%2520Ladies%2520%252B%2520Gentlemen%252C%2520a%2520signed%2520OAuth%2520request%2521"
        ));
    }

    #[test]
    fn test_sign_matches_reference_vector() {
        let credentials = reference_credentials();
        let url = Url::parse("https://api.twitter.com/1.1/statuses/update.json?include_entities=true")
            .unwrap();
        let base = signature_base_string(&Method::POST, &url, &reference_params());

        let signature = sign(
            &base,
            credentials.consumer_secret.expose_secret(),
            credentials.token_secret.expose_secret(),
        )
        .unwrap();
        assert_eq!(signature, "hCtSmYh+iHYCEqBWrE7C7hYmtUk=");
    }

    #[test]
    fn test_authorization_header_fields() {
        let credentials = reference_credentials();
        let url = Url::parse("https://api.twitter.com/2/users/me").unwrap();
        let header = credentials
            .authorization_header(&Method::GET, &url, "abc123", 1_700_000_000)
            .unwrap();

        assert!(header.starts_with("OAuth oauth_consumer_key=\"xvz1evFS4wEEPTGEFPHBog\", "));
        assert!(header.contains("oauth_nonce=\"abc123\""));
        assert!(header.contains("oauth_signature_method=\"HMAC-SHA1\""));
        assert!(header.contains("oauth_timestamp=\"1700000000\""));
        assert!(header.contains("oauth_version=\"1.0\""));
        assert!(header.contains("oauth_signature=\""));
        // Secrets never appear in the header
        assert!(!header.contains("kAcSOqF21Fu85e7zjz7ZN2U4ZRhfV3WpwPAoE3Z7kBw"));
    }

    #[test]
    fn test_header_is_deterministic_for_fixed_nonce_and_time() {
        let credentials = reference_credentials();
        let url = Url::parse("https://api.twitter.com/2/users/42/tweets?max_results=10").unwrap();

        let first = credentials.authorization_header(&Method::GET, &url, "n", 1).unwrap();
        let second = credentials.authorization_header(&Method::GET, &url, "n", 1).unwrap();
        let other_query = credentials
            .authorization_header(
                &Method::GET,
                &Url::parse("https://api.twitter.com/2/users/42/tweets?max_results=5").unwrap(),
                "n",
                1,
            )
            .unwrap();

        assert_eq!(first, second);
        assert_ne!(first, other_query);
    }

    #[test]
    fn test_credentials_debug_redacts_secrets() {
        let debug = format!("{:?}", reference_credentials());
        assert!(debug.contains("xvz1evFS4wEEPTGEFPHBog"));
        assert!(!debug.contains("kAcSOqF21Fu85e7zjz7ZN2U4ZRhfV3WpwPAoE3Z7kBw"));
        assert!(!debug.contains("LswwdoUaIvS8ltyTt5jkRh4J50vUPVVHtR2YPi5kE"));
    }
}
