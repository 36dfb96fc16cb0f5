use std::path::PathBuf;

use account_scan_core::{
    AccountRef, BatchFetcher, DEFAULT_FIELDS, FetchOutcome, Filter, IdCollector, ImageFetcher,
    ProfileRecord, QuotaMonitor, QuotaStatus, RecordStore, Relation, ReportRenderer, SocialGraph,
    UserId, render_plain,
};
use account_scan_twitter::TwitterClient;
use anyhow::Context;
use tracing::{info, warn};

use crate::cli::{Cli, Command};
use crate::config::Config;
use crate::viewer;

/// What a scan did.
#[derive(Debug, Clone)]
pub struct ScanSummary {
    pub target: UserId,
    pub relation: Relation,
    pub collected: usize,
    pub outcome: FetchOutcome,
    /// Records that passed the filter, in collection order
    pub filtered: Vec<ProfileRecord>,
    pub report: PathBuf,
}

/// Run the whole pipeline for `screen_name`: collect identifiers, cache their profiles,
/// filter them and write the report.
pub async fn scan<G>(
    graph: &G,
    config: &Config,
    screen_name: &str,
    relation: Relation,
) -> anyhow::Result<ScanSummary>
where
    G: SocialGraph + ImageFetcher,
{
    let store = RecordStore::new(&config.data_dir);
    let account = AccountRef::screen_name(screen_name);

    let ids = IdCollector::new(graph)
        .collect(&account, relation, config.pages)
        .await
        .with_context(|| format!("failed to list the {relation} of {account}"))?;

    let fetcher = BatchFetcher::new(graph, &store).with_policy(config.policy);
    let outcome = fetcher.ensure_all(&ids).await?;
    if outcome.halted_early {
        warn!(
            processed = outcome.processed(),
            total = ids.len(),
            "quota ran low, report covers the records cached so far; run again later to resume"
        );
    }

    let records = store.read_many(&ids)?;
    let filter = Filter::new(config.criteria.clone());
    let filtered = filter.select_all(records);
    info!(
        matched = filtered.len(),
        max_followers = filter.criteria().max_followers,
        max_friends = filter.criteria().max_friends,
        "filtered records"
    );

    let target_id = fetcher
        .resolve_screen_name(screen_name)
        .await
        .with_context(|| format!("failed to look up {account}"))?;
    let target = store.read(target_id)?;

    let renderer = ReportRenderer::new(graph, &config.images_dir, &config.reports_dir);
    let report = renderer.render(&target, &filtered, relation).await?;
    let report = renderer.write_report(target_id, &report)?;

    Ok(ScanSummary {
        target: target_id,
        relation,
        collected: ids.len(),
        outcome,
        filtered,
        report,
    })
}

/// Plain text blocks of up to `limit` cached records. Never touches the network.
pub fn cached_records(config: &Config, limit: Option<usize>) -> anyhow::Result<Vec<String>> {
    let store = RecordStore::new(&config.data_dir);
    let records = store.read_known(limit)?;

    Ok(records
        .iter()
        .map(|record| render_plain(record, &DEFAULT_FIELDS))
        .collect())
}

pub async fn quota<G: SocialGraph>(graph: &G, category: &str) -> anyhow::Result<QuotaStatus> {
    Ok(QuotaMonitor::new(graph).remaining_by_name(category).await?)
}

/// Quota left on the identifier listing endpoint of `relation`.
pub async fn relation_quota<G: SocialGraph>(
    graph: &G,
    relation: Relation,
) -> anyhow::Result<QuotaStatus> {
    Ok(QuotaMonitor::new(graph)
        .remaining(relation.id_category())
        .await?)
}

/// Entry point of the binary.
pub async fn execute(cli: Cli) -> anyhow::Result<()> {
    let config = Config::from_env()?.apply_cli(&cli);

    match &cli.command {
        Some(Command::Cached { limit }) => {
            for block in cached_records(&config, *limit)? {
                println!("{block}");
            }
        }
        Some(Command::Quota { category }) => {
            let client = TwitterClient::from_env()?;
            let status = quota(&client, category).await?;
            println!("{category}: {status}");
        }
        None => {
            let screen_name = cli
                .screen_name
                .as_deref()
                .context("a screen name is required")?;
            let relation = cli.relation.context("--type is required")?.into();

            let client = TwitterClient::from_env()?;
            let summary = scan(&client, &config, screen_name, relation).await?;

            if config.print_records {
                for record in &summary.filtered {
                    println!("{}", render_plain(record, &DEFAULT_FIELDS));
                }
            }

            println!("report: {}", summary.report.display());

            if config.open_report
                && let Err(e) = viewer::open(&summary.report)
            {
                warn!(error = %e, path = %summary.report.display(), "could not open report");
            }

            let status = relation_quota(&client, summary.relation).await?;
            println!("{}: {status}", summary.relation.id_category());
        }
    }

    Ok(())
}
