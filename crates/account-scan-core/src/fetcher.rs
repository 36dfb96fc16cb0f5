use tracing::{Instrument, debug, info, info_span, warn};

use crate::error::{Result, ScanError};
use crate::graph::SocialGraph;
use crate::model::{AccountRef, ProfileRecord, UserId};
use crate::quota::{QuotaCategory, QuotaMonitor};
use crate::store::RecordStore;

/// How often [BatchFetcher::ensure_all] checks the user lookup quota, and how much of it must
/// be left to keep going.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BatchPolicy {
    /// Check after every `check_every`-th processed identifier. `0` disables the check.
    pub check_every: usize,
    /// Stop when fewer calls than this remain.
    pub min_remaining: u32,
}

impl Default for BatchPolicy {
    fn default() -> Self {
        Self {
            check_every: 100,
            min_remaining: 100,
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FetchOutcome {
    pub fetched: usize,
    pub skipped: usize,
    /// The quota guard stopped the batch before the end of the list.
    pub halted_early: bool,
}

impl FetchOutcome {
    pub fn processed(&self) -> usize {
        self.fetched + self.skipped
    }
}

/// Makes sure profile records are cached, calling the remote user lookup only on cache miss.
pub struct BatchFetcher<'a, G> {
    graph: &'a G,
    store: &'a RecordStore,
    policy: BatchPolicy,
}

impl<'a, G: SocialGraph> BatchFetcher<'a, G> {
    pub fn new(graph: &'a G, store: &'a RecordStore) -> Self {
        Self {
            graph,
            store,
            policy: BatchPolicy::default(),
        }
    }

    pub fn with_policy(mut self, policy: BatchPolicy) -> Self {
        self.policy = policy;
        self
    }

    async fn lookup(&self, account: &AccountRef) -> Result<ProfileRecord> {
        Ok(self
            .graph
            .lookup_user(account)
            .instrument(info_span!("lookup_user", %account))
            .await?)
    }

    /// Return the cached record of `id`, fetching and caching it first on a miss.
    pub async fn fetch_or_cache(&self, id: UserId) -> Result<ProfileRecord> {
        match self.store.read(id) {
            Ok(record) => return Ok(record),
            Err(ScanError::NotFound(_)) => {}
            Err(e) => return Err(e),
        }

        let record = self.lookup(&AccountRef::Id(id)).await?;
        self.store.write(id, &record)?;
        Ok(record)
    }

    /// Ensure every identifier in `ids` has a cached record, in order.
    ///
    /// A failed lookup aborts the batch with the error; records cached before it stay, so the
    /// same list can be passed again to resume. Running low on quota is not an error: the batch
    /// stops and the outcome is flagged `halted_early`.
    pub async fn ensure_all(&self, ids: &[UserId]) -> Result<FetchOutcome> {
        let monitor = QuotaMonitor::new(self.graph);
        let mut outcome = FetchOutcome::default();

        for (index, &id) in ids.iter().enumerate() {
            if self.store.exists(id) {
                debug!(%id, "cached, skipping lookup");
                outcome.skipped += 1;
            } else {
                let record = self.lookup(&AccountRef::Id(id)).await?;
                self.store.write(id, &record)?;
                outcome.fetched += 1;
            }

            let processed = index + 1;
            if self.policy.check_every == 0 || processed % self.policy.check_every != 0 {
                continue;
            }

            let status = monitor.remaining(QuotaCategory::UserLookup).await?;
            if status.remaining < self.policy.min_remaining {
                outcome.halted_early = processed < ids.len();
                warn!(
                    processed,
                    total = ids.len(),
                    remaining = status.remaining,
                    reset = %status.reset,
                    "user lookup quota running low, stopping batch"
                );
                break;
            }
        }

        info!(
            fetched = outcome.fetched,
            skipped = outcome.skipped,
            halted_early = outcome.halted_early,
            "batch fetch finished"
        );
        Ok(outcome)
    }

    /// Look up a screen name, cache its record and return the account's identifier.
    ///
    /// The lookup always goes to the remote API since screen names can change hands.
    pub async fn resolve_screen_name(&self, screen_name: &str) -> Result<UserId> {
        let record = self.lookup(&AccountRef::screen_name(screen_name)).await?;
        let id = record.id;
        self.store.write(id, &record)?;
        Ok(id)
    }
}
