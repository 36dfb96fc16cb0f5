//! Twitter REST v1.1 implementation of the account-scan [SocialGraph] and [ImageFetcher]
//! traits.
//!
//! # Example
//! ```
//! use account_scan_core::{AccountRef, IdCollector, Relation};
//! use account_scan_twitter::TwitterClient;
//!
//! // Requires the OAuth 1.0a variables (or `TWITTER_BEARER_TOKEN`) to be set.
//! let client = TwitterClient::from_env()?;
//! let ids = IdCollector::new(&client)
//!     .collect(&AccountRef::screen_name("@jack"), Relation::Followers, 1)
//!     .await?;
//! ```
//!
//! [SocialGraph]: account_scan_core::SocialGraph
//! [ImageFetcher]: account_scan_core::ImageFetcher

pub mod auth;
pub mod client;
pub mod endpoints;
pub mod error;
pub mod models;

pub use auth::{Credentials, OAuth1Credentials};
pub use client::TwitterClient;
pub use endpoints::{DEFAULT_BASE_URL, Endpoints};
pub use error::{Result, TwitterError};
