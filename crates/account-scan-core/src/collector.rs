use tracing::{Instrument, debug, info, info_span};

use crate::error::Result;
use crate::graph::SocialGraph;
use crate::model::{AccountRef, FIRST_CURSOR, Relation, UserId};

/// Largest number of identifiers the remote API returns per page.
pub const MAX_PAGE_SIZE: usize = 5000;

/// Pages through the followers or friends of an account.
pub struct IdCollector<'a, G> {
    graph: &'a G,
}

impl<'a, G: SocialGraph> IdCollector<'a, G> {
    pub fn new(graph: &'a G) -> Self {
        Self { graph }
    }

    /// Collect the `relation` identifiers of `account`, requesting at most `max_pages` pages.
    /// Identifiers are returned in the order the remote API lists them.
    pub async fn collect(
        &self,
        account: &AccountRef,
        relation: Relation,
        max_pages: usize,
    ) -> Result<Vec<UserId>> {
        let mut ids = Vec::new();
        let mut cursor = FIRST_CURSOR;

        for page_number in 1..=max_pages {
            let page = self
                .graph
                .id_page(account, relation, cursor)
                .instrument(info_span!("id_page", %account, %relation, page_number, cursor))
                .await?;

            debug!(
                page_number,
                count = page.ids.len(),
                next_cursor = page.next_cursor,
                "received identifier page"
            );

            let last = page.is_last();
            cursor = page.next_cursor;
            ids.extend(page.ids);

            if last {
                break;
            }
        }

        info!(%account, %relation, count = ids.len(), "collected identifiers");
        Ok(ids)
    }

    /// Same as [IdCollector::collect] with the relation given by name (`followers` or
    /// `friends`).
    pub async fn collect_named(
        &self,
        account: &AccountRef,
        relation: &str,
        max_pages: usize,
    ) -> Result<Vec<UserId>> {
        let relation = relation.parse::<Relation>()?;
        self.collect(account, relation, max_pages).await
    }
}
