use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::{Instrument, debug, info_span};

use crate::error::{Result, ScanError};
use crate::graph::SocialGraph;

/// Named endpoint categories whose rate limit can be queried.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum QuotaCategory {
    FollowersList,
    FriendsList,
    FollowersIds,
    FriendsIds,
    FriendshipShow,
    Search,
    RateLimitStatus,
    UserLookup,
}

impl QuotaCategory {
    pub const ALL: [QuotaCategory; 8] = [
        QuotaCategory::FollowersList,
        QuotaCategory::FriendsList,
        QuotaCategory::FollowersIds,
        QuotaCategory::FriendsIds,
        QuotaCategory::FriendshipShow,
        QuotaCategory::Search,
        QuotaCategory::RateLimitStatus,
        QuotaCategory::UserLookup,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            QuotaCategory::FollowersList => "followers-list",
            QuotaCategory::FriendsList => "friends-list",
            QuotaCategory::FollowersIds => "followers-ids",
            QuotaCategory::FriendsIds => "friends-ids",
            QuotaCategory::FriendshipShow => "friendship-show",
            QuotaCategory::Search => "search",
            QuotaCategory::RateLimitStatus => "rate-limit-status",
            QuotaCategory::UserLookup => "user-lookup",
        }
    }

    /// Resource family and resource path of the category in the rate limit status document.
    pub fn resource(&self) -> (&'static str, &'static str) {
        match self {
            QuotaCategory::FollowersList => ("followers", "/followers/list"),
            QuotaCategory::FriendsList => ("friends", "/friends/list"),
            QuotaCategory::FollowersIds => ("followers", "/followers/ids"),
            QuotaCategory::FriendsIds => ("friends", "/friends/ids"),
            QuotaCategory::FriendshipShow => ("friendships", "/friendships/show"),
            QuotaCategory::Search => ("search", "/search/tweets"),
            QuotaCategory::RateLimitStatus => ("application", "/application/rate_limit_status"),
            QuotaCategory::UserLookup => ("users", "/users/show/:id"),
        }
    }
}

impl fmt::Display for QuotaCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for QuotaCategory {
    type Err = ScanError;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        QuotaCategory::ALL
            .into_iter()
            .find(|category| category.name() == s)
            .ok_or_else(|| ScanError::UnknownCategory(s.to_string()))
    }
}

/// Snapshot of one endpoint's rate limit window.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct QuotaStatus {
    pub limit: u32,
    pub remaining: u32,
    pub reset: DateTime<Utc>,
}

impl fmt::Display for QuotaStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}/{} remaining (resets at {})",
            self.remaining,
            self.limit,
            self.reset.to_rfc3339()
        )
    }
}

/// Reads the live remaining call budget of endpoint categories. Nothing is cached: each call
/// queries the remote API.
pub struct QuotaMonitor<'a, G> {
    graph: &'a G,
}

impl<'a, G: SocialGraph> QuotaMonitor<'a, G> {
    pub fn new(graph: &'a G) -> Self {
        Self { graph }
    }

    pub async fn remaining(&self, category: QuotaCategory) -> Result<QuotaStatus> {
        let (family, path) = category.resource();
        let status = self
            .graph
            .rate_limit_status(family, path)
            .instrument(info_span!("rate_limit_status", category = %category))
            .await?;

        debug!(
            category = %category,
            limit = status.limit,
            remaining = status.remaining,
            "quota status"
        );

        Ok(status)
    }

    /// Same as [QuotaMonitor::remaining] but takes the category by name. Unknown names are
    /// reported as [ScanError::UnknownCategory].
    pub async fn remaining_by_name(&self, name: &str) -> Result<QuotaStatus> {
        let category = name.parse::<QuotaCategory>()?;
        self.remaining(category).await
    }

    /// Whether at least `margin` calls are left for `category`.
    pub async fn has_headroom(&self, category: QuotaCategory, margin: u32) -> Result<bool> {
        Ok(self.remaining(category).await?.remaining >= margin)
    }
}

#[cfg(test)]
mod tests {
    use super::{QuotaCategory, QuotaMonitor};
    use crate::error::ScanError;
    use crate::test_utils::FakeGraph;

    #[test]
    fn test_category_names_round_trip() {
        for category in QuotaCategory::ALL {
            assert_eq!(category.name().parse::<QuotaCategory>().unwrap(), category);
        }
    }

    #[tokio::test]
    async fn test_remaining_maps_category_to_resource() {
        let graph = FakeGraph::default().with_quota(42);
        let monitor = QuotaMonitor::new(&graph);

        let status = monitor.remaining(QuotaCategory::UserLookup).await.unwrap();

        assert_eq!(status.remaining, 42);
        assert_eq!(
            graph.quota_requests(),
            vec![("users".to_string(), "/users/show/:id".to_string())]
        );
    }

    #[tokio::test]
    async fn test_remaining_is_never_cached() {
        let graph = FakeGraph::default().with_quota_sequence([300, 250]);
        let monitor = QuotaMonitor::new(&graph);

        let first = monitor.remaining(QuotaCategory::FollowersIds).await.unwrap();
        let second = monitor.remaining(QuotaCategory::FollowersIds).await.unwrap();

        assert_eq!((first.remaining, second.remaining), (300, 250));
        assert_eq!(graph.quota_requests().len(), 2);
    }

    #[tokio::test]
    async fn test_unknown_category_is_surfaced() {
        let graph = FakeGraph::default().with_quota(900);
        let monitor = QuotaMonitor::new(&graph);

        let err = monitor.remaining_by_name("API.get_user").await.unwrap_err();

        assert!(matches!(err, ScanError::UnknownCategory(ref name) if name == "API.get_user"));
        assert!(graph.quota_requests().is_empty());
    }

    #[tokio::test]
    async fn test_has_headroom() {
        let graph = FakeGraph::default().with_quota_sequence([100, 99]);
        let monitor = QuotaMonitor::new(&graph);

        assert!(monitor.has_headroom(QuotaCategory::UserLookup, 100).await.unwrap());
        assert!(!monitor.has_headroom(QuotaCategory::UserLookup, 100).await.unwrap());
    }
}
