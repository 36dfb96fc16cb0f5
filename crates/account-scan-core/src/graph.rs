use std::future::Future;

use bytes::Bytes;

use crate::error::GraphError;
use crate::model::{AccountRef, IdPage, ProfileRecord, Relation};
use crate::quota::QuotaStatus;

/// Trait for remote social graph APIs
pub trait SocialGraph: Send + Sync {
    /// Fetch the page of `relation` identifiers of `account` starting at `cursor`
    /// (use [FIRST_CURSOR](crate::model::FIRST_CURSOR) for the first page).
    fn id_page(
        &self,
        account: &AccountRef,
        relation: Relation,
        cursor: i64,
    ) -> impl Future<Output = Result<IdPage, GraphError>> + Send;

    /// Look up a user's full profile document
    fn lookup_user(
        &self,
        account: &AccountRef,
    ) -> impl Future<Output = Result<ProfileRecord, GraphError>> + Send;

    /// Query the live rate limit of one endpoint, addressed by its resource family
    /// (e.g. `users`) and resource path (e.g. `/users/show/:id`).
    fn rate_limit_status(
        &self,
        family: &str,
        path: &str,
    ) -> impl Future<Output = Result<QuotaStatus, GraphError>> + Send;
}

/// Trait for downloading profile images
pub trait ImageFetcher: Send + Sync {
    fn fetch_image(&self, url: &str) -> impl Future<Output = Result<Bytes, GraphError>> + Send;
}
