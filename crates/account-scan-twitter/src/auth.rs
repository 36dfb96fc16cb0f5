use std::fmt;

use base64::{Engine, prelude::BASE64_STANDARD};
use chrono::Utc;
use ring::hmac;
use urlencoding::encode;

use crate::error::{Result, TwitterError};

pub const CONSUMER_KEY_VAR: &str = "TWITTER_CONSUMER_KEY";
pub const CONSUMER_SECRET_VAR: &str = "TWITTER_CONSUMER_SECRET";
pub const ACCESS_TOKEN_VAR: &str = "TWITTER_ACCESS_TOKEN";
pub const ACCESS_TOKEN_SECRET_VAR: &str = "TWITTER_ACCESS_TOKEN_SECRET";
pub const BEARER_TOKEN_VAR: &str = "TWITTER_BEARER_TOKEN";

const OAUTH_VARS: [&str; 4] = [
    CONSUMER_KEY_VAR,
    CONSUMER_SECRET_VAR,
    ACCESS_TOKEN_VAR,
    ACCESS_TOKEN_SECRET_VAR,
];

/// OAuth 1.0a user context keys.
#[derive(Clone, PartialEq, Eq)]
pub struct OAuth1Credentials {
    pub consumer_key: String,
    pub consumer_secret: String,
    pub access_token: String,
    pub access_token_secret: String,
}

impl fmt::Debug for OAuth1Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("OAuth1Credentials")
            .field("consumer_key", &self.consumer_key)
            .field("consumer_secret", &"<redacted>")
            .field("access_token", &self.access_token)
            .field("access_token_secret", &"<redacted>")
            .finish()
    }
}

impl OAuth1Credentials {
    /// `Authorization` header value for a request with the given query or form parameters.
    pub fn authorization(&self, method: &str, url: &str, params: &[(&str, &str)]) -> String {
        let nonce = nanoid::nanoid!(32);
        let timestamp = Utc::now().timestamp().to_string();
        self.authorization_with(method, url, params, &nonce, &timestamp)
    }

    pub(crate) fn authorization_with(
        &self,
        method: &str,
        url: &str,
        params: &[(&str, &str)],
        nonce: &str,
        timestamp: &str,
    ) -> String {
        let mut oauth = vec![
            ("oauth_consumer_key", self.consumer_key.as_str()),
            ("oauth_nonce", nonce),
            ("oauth_signature_method", "HMAC-SHA1"),
            ("oauth_timestamp", timestamp),
            ("oauth_token", self.access_token.as_str()),
            ("oauth_version", "1.0"),
        ];

        let signed: Vec<(&str, &str)> = params.iter().chain(oauth.iter()).copied().collect();
        let signature = self.signature(method, url, &signed);
        oauth.push(("oauth_signature", signature.as_str()));
        oauth.sort_unstable();

        let fields = oauth
            .iter()
            .map(|(key, value)| format!("{}=\"{}\"", encode(key), encode(value)))
            .collect::<Vec<_>>()
            .join(", ");

        format!("OAuth {fields}")
    }

    fn signature(&self, method: &str, url: &str, params: &[(&str, &str)]) -> String {
        let base = signature_base_string(method, url, params);
        let signing_key = format!(
            "{}&{}",
            encode(&self.consumer_secret),
            encode(&self.access_token_secret)
        );

        let key = hmac::Key::new(hmac::HMAC_SHA1_FOR_LEGACY_USE_ONLY, signing_key.as_bytes());
        BASE64_STANDARD.encode(hmac::sign(&key, base.as_bytes()).as_ref())
    }
}

/// `METHOD&url&params`, each part percent encoded, parameters sorted after encoding.
pub(crate) fn signature_base_string(method: &str, url: &str, params: &[(&str, &str)]) -> String {
    let mut encoded: Vec<(String, String)> = params
        .iter()
        .map(|(key, value)| (encode(key).into_owned(), encode(value).into_owned()))
        .collect();
    encoded.sort_unstable();

    let parameter_string = encoded
        .iter()
        .map(|(key, value)| format!("{key}={value}"))
        .collect::<Vec<_>>()
        .join("&");

    format!(
        "{}&{}&{}",
        method.to_uppercase(),
        encode(url),
        encode(&parameter_string)
    )
}

/// How requests to the API are authenticated.
#[derive(Clone, PartialEq, Eq)]
pub enum Credentials {
    OAuth1(OAuth1Credentials),
    /// App-only bearer token
    Bearer(String),
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Credentials::OAuth1(keys) => f.debug_tuple("OAuth1").field(keys).finish(),
            Credentials::Bearer(_) => f.debug_tuple("Bearer").field(&"<redacted>").finish(),
        }
    }
}

impl Credentials {
    /// Read credentials from the environment. The four OAuth 1.0a variables take precedence;
    /// `TWITTER_BEARER_TOKEN` is used when none of them is set.
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let get = |key: &str| lookup(key).filter(|value| !value.is_empty());
        let require = |key: &str| get(key).ok_or_else(|| TwitterError::EnvVar(key.to_string()));

        if OAUTH_VARS.iter().all(|key| get(key).is_none()) {
            return get(BEARER_TOKEN_VAR)
                .map(Credentials::Bearer)
                .ok_or_else(|| TwitterError::EnvVar(CONSUMER_KEY_VAR.to_string()));
        }

        Ok(Credentials::OAuth1(OAuth1Credentials {
            consumer_key: require(CONSUMER_KEY_VAR)?,
            consumer_secret: require(CONSUMER_SECRET_VAR)?,
            access_token: require(ACCESS_TOKEN_VAR)?,
            access_token_secret: require(ACCESS_TOKEN_SECRET_VAR)?,
        }))
    }

    pub fn authorization(&self, method: &str, url: &str, params: &[(&str, &str)]) -> String {
        match self {
            Credentials::OAuth1(keys) => keys.authorization(method, url, params),
            Credentials::Bearer(token) => format!("Bearer {token}"),
        }
    }
}
