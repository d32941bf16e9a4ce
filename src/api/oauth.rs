//! OAuth 1.0a request signing (HMAC-SHA1) for user-context requests.

use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use hmac::{Hmac, Mac};
use rand::Rng;
use rand::distr::Alphanumeric;
use serde::Deserialize;
use sha1::Sha1;

use super::{ApiError, ApiResult};

type HmacSha1 = Hmac<Sha1>;

const NONCE_LEN: usize = 32;

/// Consumer and access key pairs, as stored in the credentials file.
#[derive(Clone, Deserialize)]
pub struct Credentials {
    pub consumer_key: String,
    pub consumer_secret: String,
    pub access_key: String,
    pub access_secret: String,
}

impl std::fmt::Debug for Credentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Credentials")
            .field("consumer_key", &self.consumer_key)
            .field("access_key", &self.access_key)
            .finish_non_exhaustive()
    }
}

/// RFC 3986 encoding: everything but `A-Z a-z 0-9 - . _ ~`.
pub fn percent_encode(s: &str) -> String {
    urlencoding::encode(s).into_owned()
}

/// The `oauth_*` protocol parameters, without the signature.
pub fn oauth_params(creds: &Credentials, nonce: &str, timestamp: i64) -> Vec<(String, String)> {
    vec![
        ("oauth_consumer_key".into(), creds.consumer_key.clone()),
        ("oauth_nonce".into(), nonce.to_string()),
        ("oauth_signature_method".into(), "HMAC-SHA1".into()),
        ("oauth_timestamp".into(), timestamp.to_string()),
        ("oauth_token".into(), creds.access_key.clone()),
        ("oauth_version".into(), "1.0".into()),
    ]
}

/// `METHOD&url&params`, each part percent-encoded; params sorted by encoded key then value.
pub fn signature_base_string(method: &str, url: &str, params: &[(String, String)]) -> String {
    let mut encoded: Vec<(String, String)> = params
        .iter()
        .map(|(k, v)| (percent_encode(k), percent_encode(v)))
        .collect();
    encoded.sort();
    let param_string = encoded
        .iter()
        .map(|(k, v)| format!("{k}={v}"))
        .collect::<Vec<_>>()
        .join("&");
    format!(
        "{}&{}&{}",
        method.to_uppercase(),
        percent_encode(url),
        percent_encode(&param_string)
    )
}

/// Base64 HMAC-SHA1 of `base` keyed with `consumer_secret&token_secret`.
pub fn sign(base: &str, consumer_secret: &str, token_secret: &str) -> ApiResult<String> {
    let key = format!(
        "{}&{}",
        percent_encode(consumer_secret),
        percent_encode(token_secret)
    );
    let mut mac =
        HmacSha1::new_from_slice(key.as_bytes()).map_err(|e| ApiError::Signing(e.to_string()))?;
    mac.update(base.as_bytes());
    Ok(STANDARD.encode(mac.finalize().into_bytes()))
}

/// Full `Authorization` header value for a request with the given query/body params.
pub fn authorization_header(
    creds: &Credentials,
    method: &str,
    url: &str,
    request_params: &[(String, String)],
    nonce: &str,
    timestamp: i64,
) -> ApiResult<String> {
    let mut oauth = oauth_params(creds, nonce, timestamp);
    let mut all = oauth.clone();
    all.extend_from_slice(request_params);
    let base = signature_base_string(method, url, &all);
    let signature = sign(&base, &creds.consumer_secret, &creds.access_secret)?;
    oauth.push(("oauth_signature".into(), signature));
    oauth.sort();
    let fields = oauth
        .iter()
        .map(|(k, v)| format!("{}=\"{}\"", percent_encode(k), percent_encode(v)))
        .collect::<Vec<_>>()
        .join(", ");
    Ok(format!("OAuth {fields}"))
}

/// Signs requests with fresh nonce and timestamp each time.
pub struct OAuthSigner {
    creds: Credentials,
}

impl OAuthSigner {
    pub fn new(creds: Credentials) -> Self {
        Self { creds }
    }

    pub fn header(
        &self,
        method: &str,
        url: &str,
        request_params: &[(String, String)],
    ) -> ApiResult<String> {
        let nonce: String = rand::rng()
            .sample_iter(Alphanumeric)
            .take(NONCE_LEN)
            .map(char::from)
            .collect();
        let timestamp = chrono::Utc::now().timestamp();
        authorization_header(
            &self.creds,
            method,
            url,
            request_params,
            &nonce,
            timestamp,
        )
    }
}
