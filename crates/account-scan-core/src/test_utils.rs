use std::collections::{HashMap, HashSet, VecDeque};
use std::sync::Mutex;

use bytes::Bytes;
use chrono::{TimeZone, Utc};
use serde_json::{Map, Value};

use crate::error::GraphError;
use crate::graph::{ImageFetcher, SocialGraph};
use crate::model::{AccountRef, FIRST_CURSOR, IdPage, ProfileRecord, Relation, UserEntities, UserId};
use crate::quota::QuotaStatus;

pub(crate) fn profile(id: u64, name: &str, followers: u64, friends: u64) -> ProfileRecord {
    ProfileRecord {
        id: UserId(id),
        name: name.to_string(),
        screen_name: format!("user{id}"),
        location: Some("Tokyo".to_string()),
        profile_location: Value::Null,
        description: Some(format!("bio of {name}")),
        followers_count: followers,
        friends_count: friends,
        following: Some(false),
        entities: UserEntities::default(),
        profile_image_url_https: Some(format!(
            "https://pbs.twimg.com/profile_images/{id}/img{id}_normal.jpg"
        )),
        extra: Map::new(),
    }
}

/// In-memory social graph that records every call it receives.
#[derive(Default)]
pub(crate) struct FakeGraph {
    users: HashMap<UserId, ProfileRecord>,
    pages: Vec<IdPage>,
    failing: HashSet<UserId>,
    quota: Mutex<VecDeque<u32>>,
    lookups: Mutex<Vec<AccountRef>>,
    cursors: Mutex<Vec<(Relation, i64)>>,
    quota_requests: Mutex<Vec<(String, String)>>,
    image_requests: Mutex<Vec<String>>,
}

impl FakeGraph {
    pub(crate) fn with_users(mut self, users: impl IntoIterator<Item = ProfileRecord>) -> Self {
        self.users
            .extend(users.into_iter().map(|user| (user.id, user)));
        self
    }

    /// Every page but the last points at the next one through its cursor.
    pub(crate) fn with_pages(mut self, pages: Vec<Vec<u64>>) -> Self {
        let count = pages.len();
        self.pages = pages
            .into_iter()
            .enumerate()
            .map(|(index, ids)| IdPage {
                ids: ids.into_iter().map(UserId).collect(),
                next_cursor: if index + 1 == count {
                    0
                } else {
                    index as i64 + 1
                },
            })
            .collect();
        self
    }

    pub(crate) fn failing_on(mut self, id: u64) -> Self {
        self.failing.insert(UserId(id));
        self
    }

    pub(crate) fn with_quota(self, remaining: u32) -> Self {
        self.with_quota_sequence([remaining])
    }

    /// Successive quota queries report these values; the last one repeats.
    pub(crate) fn with_quota_sequence(self, remaining: impl IntoIterator<Item = u32>) -> Self {
        *self.quota.lock().unwrap() = remaining.into_iter().collect();
        self
    }

    pub(crate) fn lookups(&self) -> Vec<AccountRef> {
        self.lookups.lock().unwrap().clone()
    }

    pub(crate) fn looked_up_ids(&self) -> Vec<u64> {
        self.lookups()
            .into_iter()
            .filter_map(|account| match account {
                AccountRef::Id(id) => Some(id.0),
                AccountRef::ScreenName(_) => None,
            })
            .collect()
    }

    pub(crate) fn cursors(&self) -> Vec<(Relation, i64)> {
        self.cursors.lock().unwrap().clone()
    }

    pub(crate) fn quota_requests(&self) -> Vec<(String, String)> {
        self.quota_requests.lock().unwrap().clone()
    }

    pub(crate) fn image_requests(&self) -> Vec<String> {
        self.image_requests.lock().unwrap().clone()
    }

    fn not_found() -> GraphError {
        GraphError::Api {
            status: 404,
            message: "User not found.".to_string(),
        }
    }
}

impl SocialGraph for FakeGraph {
    async fn id_page(
        &self,
        _account: &AccountRef,
        relation: Relation,
        cursor: i64,
    ) -> Result<IdPage, GraphError> {
        self.cursors.lock().unwrap().push((relation, cursor));

        let index = if cursor == FIRST_CURSOR {
            0
        } else {
            usize::try_from(cursor).unwrap()
        };

        Ok(self.pages.get(index).cloned().unwrap_or_default())
    }

    async fn lookup_user(&self, account: &AccountRef) -> Result<ProfileRecord, GraphError> {
        self.lookups.lock().unwrap().push(account.clone());

        match account {
            AccountRef::Id(id) if self.failing.contains(id) => Err(GraphError::Api {
                status: 503,
                message: "Over capacity".to_string(),
            }),
            AccountRef::Id(id) => self.users.get(id).cloned().ok_or_else(Self::not_found),
            AccountRef::ScreenName(name) => self
                .users
                .values()
                .find(|user| &user.screen_name == name)
                .cloned()
                .ok_or_else(Self::not_found),
        }
    }

    async fn rate_limit_status(&self, family: &str, path: &str) -> Result<QuotaStatus, GraphError> {
        self.quota_requests
            .lock()
            .unwrap()
            .push((family.to_string(), path.to_string()));

        let remaining = {
            let mut quota = self.quota.lock().unwrap();
            if quota.len() > 1 {
                quota.pop_front()
            } else {
                quota.front().copied()
            }
        }
        .unwrap_or(900);

        Ok(QuotaStatus {
            limit: 900,
            remaining,
            reset: Utc.timestamp_opt(1_700_000_000, 0).unwrap(),
        })
    }
}

impl ImageFetcher for FakeGraph {
    async fn fetch_image(&self, url: &str) -> Result<Bytes, GraphError> {
        self.image_requests.lock().unwrap().push(url.to_string());
        Ok(Bytes::from(format!("image bytes of {url}")))
    }
}
