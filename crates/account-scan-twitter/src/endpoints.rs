use account_scan_core::collector::MAX_PAGE_SIZE;
use account_scan_core::{AccountRef, Relation};

pub const DEFAULT_BASE_URL: &str = "https://api.twitter.com/1.1";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApiEndpoint {
    /// Path below the API base url, e.g. `/users/show.json`
    pub path: String,
    pub params: Vec<(String, String)>,
}

impl ApiEndpoint {
    fn new(path: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            params: Vec::new(),
        }
    }

    fn param(mut self, key: &str, value: impl ToString) -> Self {
        self.params.push((key.to_string(), value.to_string()));
        self
    }

    fn account(self, account: &AccountRef) -> Self {
        match account {
            AccountRef::Id(id) => self.param("user_id", id),
            AccountRef::ScreenName(name) => self.param("screen_name", name),
        }
    }

    pub fn url(&self, base_url: &str) -> String {
        format!("{base_url}{}", self.path)
    }

    pub fn params(&self) -> Vec<(&str, &str)> {
        self.params
            .iter()
            .map(|(key, value)| (key.as_str(), value.as_str()))
            .collect()
    }
}

pub struct Endpoints;

impl Endpoints {
    pub fn relation_ids(account: &AccountRef, relation: Relation, cursor: i64) -> ApiEndpoint {
        ApiEndpoint::new(format!("/{}/ids.json", relation.as_str()))
            .account(account)
            .param("cursor", cursor)
            .param("count", MAX_PAGE_SIZE)
            .param("stringify_ids", false)
    }

    pub fn user_show(account: &AccountRef) -> ApiEndpoint {
        ApiEndpoint::new("/users/show.json").account(account)
    }

    pub fn rate_limit_status(family: &str) -> ApiEndpoint {
        ApiEndpoint::new("/application/rate_limit_status.json").param("resources", family)
    }
}
