use std::fmt;
use std::num::ParseIntError;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::error::ScanError;
use crate::quota::QuotaCategory;

/// Cursor value requesting the first page of an edge listing.
pub const FIRST_CURSOR: i64 = -1;

/// The remote API's stable integer key for an account.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct UserId(pub u64);

impl fmt::Display for UserId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for UserId {
    type Err = ParseIntError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        s.parse().map(UserId)
    }
}

impl From<u64> for UserId {
    fn from(id: u64) -> Self {
        UserId(id)
    }
}

/// How an account is addressed when talking to the remote API.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum AccountRef {
    Id(UserId),
    ScreenName(String),
}

impl AccountRef {
    /// Builds a screen name reference, dropping a leading `@`.
    pub fn screen_name(name: impl AsRef<str>) -> Self {
        let name = name.as_ref().trim();
        AccountRef::ScreenName(name.strip_prefix('@').unwrap_or(name).to_string())
    }
}

impl From<UserId> for AccountRef {
    fn from(id: UserId) -> Self {
        AccountRef::Id(id)
    }
}

impl fmt::Display for AccountRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AccountRef::Id(id) => write!(f, "{id}"),
            AccountRef::ScreenName(name) => write!(f, "@{name}"),
        }
    }
}

/// The edge of the social graph being listed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Relation {
    Followers,
    Friends,
}

impl Relation {
    pub fn as_str(&self) -> &'static str {
        match self {
            Relation::Followers => "followers",
            Relation::Friends => "friends",
        }
    }

    /// Quota category of the identifier listing endpoint for this relation.
    pub fn id_category(&self) -> QuotaCategory {
        match self {
            Relation::Followers => QuotaCategory::FollowersIds,
            Relation::Friends => QuotaCategory::FriendsIds,
        }
    }
}

impl fmt::Display for Relation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Relation {
    type Err = ScanError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "followers" => Ok(Relation::Followers),
            "friends" => Ok(Relation::Friends),
            other => Err(ScanError::InvalidRelation(other.to_string())),
        }
    }
}

/// One page of an edge listing. A `next_cursor` of `0` marks the last page.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct IdPage {
    pub ids: Vec<UserId>,
    pub next_cursor: i64,
}

impl IdPage {
    pub fn is_last(&self) -> bool {
        self.next_cursor == 0
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ExpandedUrl {
    #[serde(default)]
    pub expanded_url: Option<String>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct UrlEntity {
    #[serde(default)]
    pub urls: Vec<ExpandedUrl>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct UserEntities {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url: Option<UrlEntity>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// A user's profile document as returned by the remote user lookup.
///
/// The fields the pipeline reads are typed; everything else the remote document carries is kept
/// in `extra`, so a cached record serializes back to the full document.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProfileRecord {
    pub id: UserId,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub screen_name: String,
    #[serde(default)]
    pub location: Option<String>,
    #[serde(default)]
    pub profile_location: Value,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub followers_count: u64,
    #[serde(default)]
    pub friends_count: u64,
    #[serde(default)]
    pub following: Option<bool>,
    #[serde(default)]
    pub entities: UserEntities,
    #[serde(default)]
    pub profile_image_url_https: Option<String>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl ProfileRecord {
    /// Expanded URLs of the profile's website entity, empty when there is none.
    pub fn expanded_urls(&self) -> Vec<&str> {
        self.entities
            .url
            .as_ref()
            .map(|entity| {
                entity
                    .urls
                    .iter()
                    .filter_map(|url| url.expanded_url.as_deref())
                    .collect()
            })
            .unwrap_or_default()
    }

    pub fn account_url(&self) -> String {
        format!("https://twitter.com/{}", self.screen_name)
    }

    /// Last path segment of the profile image URL.
    pub fn image_file_name(&self) -> Option<&str> {
        self.profile_image_url_https
            .as_deref()
            .and_then(|url| url.rsplit('/').next())
            .filter(|name| !name.is_empty())
    }

    /// Display value of a named attribute, `None` when absent or null.
    ///
    /// Typed attributes are looked up first, then the untyped remainder of the document.
    pub fn field(&self, key: &str) -> Option<String> {
        match key {
            "id" => Some(self.id.to_string()),
            "name" => Some(self.name.clone()),
            "screen_name" => Some(self.screen_name.clone()),
            "location" => self.location.clone(),
            "profile_location" => display_value(&self.profile_location),
            "description" => self.description.clone(),
            "followers_count" => Some(self.followers_count.to_string()),
            "friends_count" => Some(self.friends_count.to_string()),
            "following" => self.following.map(|following| following.to_string()),
            "profile_image_url_https" => self.profile_image_url_https.clone(),
            other => self.extra.get(other).and_then(display_value),
        }
    }
}

fn display_value(value: &Value) -> Option<String> {
    match value {
        Value::Null => None,
        Value::String(s) => Some(s.clone()),
        // Place objects carry a human readable name
        Value::Object(place) => place
            .get("full_name")
            .or_else(|| place.get("name"))
            .and_then(Value::as_str)
            .map(str::to_string)
            .or_else(|| Some(value.to_string())),
        other => Some(other.to_string()),
    }
}
