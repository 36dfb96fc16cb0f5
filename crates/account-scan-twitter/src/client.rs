use std::time::Duration;

use account_scan_core::{
    AccountRef, GraphError, IdPage, ImageFetcher, ProfileRecord, QuotaStatus, Relation,
    SocialGraph,
};
use bytes::Bytes;
use reqwest::header::AUTHORIZATION;
use reqwest::{Client, StatusCode};
use serde::de::DeserializeOwned;
use tracing::debug;
use url::Url;

use crate::auth::Credentials;
use crate::endpoints::{ApiEndpoint, DEFAULT_BASE_URL, Endpoints};
use crate::error::{Result, TwitterError};
use crate::models::{ApiErrorsResponse, IdsResponse, RateLimitStatusResponse};

/// Client for the Twitter REST v1.1 API.
#[derive(Debug, Clone)]
pub struct TwitterClient {
    http: Client,
    credentials: Credentials,
    base_url: String,
}

impl TwitterClient {
    pub fn new(credentials: Credentials) -> Result<Self> {
        let http = Client::builder().timeout(Duration::from_secs(30)).build()?;

        Ok(Self {
            http,
            credentials,
            base_url: DEFAULT_BASE_URL.to_string(),
        })
    }

    /// Build a client from the `TWITTER_*` environment variables.
    pub fn from_env() -> Result<Self> {
        Self::new(Credentials::from_env()?)
    }

    /// Point the client at another API root, e.g. a mock server.
    pub fn with_base_url(mut self, base_url: &str) -> Result<Self> {
        Url::parse(base_url)?;
        self.base_url = base_url.trim_end_matches('/').to_string();
        Ok(self)
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    async fn get<T: DeserializeOwned>(&self, endpoint: ApiEndpoint) -> Result<T> {
        let url = endpoint.url(&self.base_url);
        let params = endpoint.params();
        let authorization = self.credentials.authorization("GET", &url, &params);

        debug!(url = %url, "GET");
        let response = self
            .http
            .get(&url)
            .header(AUTHORIZATION, authorization)
            .query(&params)
            .send()
            .await?;

        let status = response.status();
        let body = response.text().await?;

        if status == StatusCode::TOO_MANY_REQUESTS {
            return Err(TwitterError::RateLimit);
        }

        if !status.is_success() {
            let message = serde_json::from_str::<ApiErrorsResponse>(&body)
                .ok()
                .and_then(|response| response.errors.into_iter().next())
                .map(|error| error.message)
                .unwrap_or(body);

            if status == StatusCode::UNAUTHORIZED {
                return Err(TwitterError::Auth(message));
            }

            return Err(TwitterError::Api {
                status: status.as_u16(),
                message,
            });
        }

        Ok(serde_json::from_str(&body)?)
    }

    /// One page of follower or friend ids.
    pub async fn ids_page(
        &self,
        account: &AccountRef,
        relation: Relation,
        cursor: i64,
    ) -> Result<IdPage> {
        let response: IdsResponse = self
            .get(Endpoints::relation_ids(account, relation, cursor))
            .await?;

        Ok(response.into())
    }

    /// The full `users/show` document of an account.
    pub async fn user(&self, account: &AccountRef) -> Result<ProfileRecord> {
        self.get(Endpoints::user_show(account)).await
    }

    pub async fn quota(&self, family: &str, path: &str) -> Result<QuotaStatus> {
        let response: RateLimitStatusResponse =
            self.get(Endpoints::rate_limit_status(family)).await?;

        let entry = response.entry(family, path).ok_or_else(|| {
            TwitterError::InvalidResponse(format!("no rate limit entry for {family} {path}"))
        })?;

        QuotaStatus::try_from(entry)
    }

    /// Fetch a public media url. No credentials are sent.
    pub async fn download(&self, url: &str) -> Result<Bytes> {
        let response = self.http.get(url).send().await?;
        let status = response.status();

        if !status.is_success() {
            return Err(TwitterError::Api {
                status: status.as_u16(),
                message: format!("failed to download {url}"),
            });
        }

        Ok(response.bytes().await?)
    }
}

impl SocialGraph for TwitterClient {
    async fn id_page(
        &self,
        account: &AccountRef,
        relation: Relation,
        cursor: i64,
    ) -> std::result::Result<IdPage, GraphError> {
        Ok(self.ids_page(account, relation, cursor).await?)
    }

    async fn lookup_user(
        &self,
        account: &AccountRef,
    ) -> std::result::Result<ProfileRecord, GraphError> {
        Ok(self.user(account).await?)
    }

    async fn rate_limit_status(
        &self,
        family: &str,
        path: &str,
    ) -> std::result::Result<QuotaStatus, GraphError> {
        Ok(self.quota(family, path).await?)
    }
}

impl ImageFetcher for TwitterClient {
    async fn fetch_image(&self, url: &str) -> std::result::Result<Bytes, GraphError> {
        Ok(self.download(url).await?)
    }
}

#[cfg(test)]
mod tests {
    use super::TwitterClient;
    use crate::auth::Credentials;

    #[test]
    fn test_with_base_url() {
        let client = TwitterClient::new(Credentials::Bearer("token".to_string()))
            .unwrap()
            .with_base_url("http://127.0.0.1:8080/1.1/")
            .unwrap();

        assert_eq!(client.base_url(), "http://127.0.0.1:8080/1.1");
    }

    #[test]
    fn test_rejects_invalid_base_url() {
        let result = TwitterClient::new(Credentials::Bearer("token".to_string()))
            .unwrap()
            .with_base_url("not a url");

        assert!(result.is_err());
    }
}
