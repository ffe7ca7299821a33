//! Bounded worker pool over many brands.
//!
//! Jobs run under a semaphore and report back over a channel to the single
//! owner of the result set. A panicking job is contained and recorded as
//! `NotFound`; it never takes down the batch.

use std::collections::{BTreeMap, HashMap, HashSet};
use std::panic::AssertUnwindSafe;
use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use futures::FutureExt;
use rand::Rng;
use serde::{Deserialize, Serialize};
use tokio::sync::{mpsc, Semaphore};
use tokio::time::sleep;

use crate::model::{AssetSource, BrandIdentity, LogoFormat, ResolutionRecord};
use crate::services::resolver::Resolver;
use crate::slug::{SlugConflict, SlugRules, SlugTable};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BatchOptions {
    /// Maximum number of brands resolved at once (at least 1).
    pub concurrency: usize,
    /// Base pause before dispatching each job after the first.
    pub dispatch_delay: Duration,
    /// Upper bound of the random extra pause added to `dispatch_delay`.
    pub jitter: Duration,
}

impl Default for BatchOptions {
    fn default() -> Self {
        Self {
            concurrency: 10,
            dispatch_delay: Duration::from_millis(200),
            jitter: Duration::from_millis(250),
        }
    }
}

impl BatchOptions {
    /// No pauses between dispatches.
    pub fn immediate(concurrency: usize) -> Self {
        Self { concurrency, dispatch_delay: Duration::ZERO, jitter: Duration::ZERO }
    }
}

/// Everything a batch run produced, one record per input brand in input order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RunReport {
    pub generated_at: String,
    pub records: Vec<ResolutionRecord>,
    #[serde(default)]
    pub conflicts: Vec<SlugConflict>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RunSummary {
    pub attempted: usize,
    pub found: usize,
    pub fetched: usize,
    pub cached: usize,
    pub failed: usize,
    pub by_format: BTreeMap<LogoFormat, usize>,
    pub by_source: BTreeMap<String, usize>,
    pub failed_brands: Vec<String>,
    /// Groups of brands whose assets have identical content.
    pub duplicate_content: Vec<Vec<String>>,
}

impl RunReport {
    pub fn failed_brands(&self) -> Vec<&str> {
        self.records.iter().filter(|r| !r.is_found()).map(|r| r.brand.as_str()).collect()
    }

    pub fn summary(&self) -> RunSummary {
        let mut summary = RunSummary { attempted: self.records.len(), ..RunSummary::default() };
        let mut by_hash: BTreeMap<&str, Vec<String>> = BTreeMap::new();

        for record in &self.records {
            let Some(asset) = record.asset() else {
                summary.failed += 1;
                summary.failed_brands.push(record.brand.clone());
                continue;
            };
            summary.found += 1;
            match &asset.source {
                AssetSource::Cache => summary.cached += 1,
                AssetSource::Provider(_) => summary.fetched += 1,
            }
            *summary.by_format.entry(asset.format).or_default() += 1;
            *summary.by_source.entry(asset.source.to_string()).or_default() += 1;
            by_hash.entry(asset.sha256.as_str()).or_default().push(record.brand.clone());
        }

        summary.duplicate_content = by_hash.into_values().filter(|names| names.len() > 1).collect();
        summary
    }
}

/// Resolve every brand with bounded concurrency.
///
/// `on_record` is called once per brand as its record becomes final, in completion order.
pub async fn run_batch<F>(
    resolver: Arc<Resolver>,
    brands: Vec<BrandIdentity>,
    options: &BatchOptions,
    on_record: F,
) -> RunReport
where
    F: FnMut(&ResolutionRecord),
{
    run_batch_within(resolver, brands, &[], options, on_record).await
}

/// Like [`run_batch`], but slugs are assigned over `catalog` followed by `brands`.
///
/// Only `brands` are resolved. A selected brand whose slug is already owned by
/// an earlier catalog brand is reported as a conflict, even when that brand is
/// not part of this run.
pub async fn run_batch_within<F>(
    resolver: Arc<Resolver>,
    brands: Vec<BrandIdentity>,
    catalog: &[BrandIdentity],
    options: &BatchOptions,
    mut on_record: F,
) -> RunReport
where
    F: FnMut(&ResolutionRecord),
{
    let mut selected = HashSet::new();
    let brands: Vec<BrandIdentity> =
        brands.into_iter().filter(|b| selected.insert(b.name.clone())).collect();

    let table = slug_table(&brands, catalog, &selected, resolver.slug_rules());
    let mut records: HashMap<String, ResolutionRecord> = HashMap::new();
    for conflict in &table.conflicts {
        tracing::warn!(%conflict, "brand skipped");
        let slug = match conflict {
            SlugConflict::Collision { slug, .. } => slug.as_str(),
            SlugConflict::Empty { .. } => "",
        };
        let record = ResolutionRecord::not_found(conflict.brand(), slug);
        on_record(&record);
        records.insert(record.brand.clone(), record);
    }

    let (tx, mut rx) = mpsc::unbounded_channel();
    let dispatcher = tokio::spawn(dispatch(
        Arc::clone(&resolver),
        table.assigned,
        options.clone(),
        tx,
    ));

    while let Some(record) = rx.recv().await {
        on_record(&record);
        records.insert(record.brand.clone(), record);
    }
    if let Err(e) = dispatcher.await {
        tracing::error!(error = %e, "dispatcher stopped early");
    }

    let ordered = brands
        .iter()
        .map(|brand| {
            records.remove(&brand.name).unwrap_or_else(|| {
                tracing::warn!(brand = %brand.name, "no result recorded; marking as not found");
                let slug = resolver.slug_rules().slug(&brand.name);
                let record = ResolutionRecord::not_found(&brand.name, slug);
                on_record(&record);
                record
            })
        })
        .collect();

    RunReport {
        generated_at: Utc::now().to_rfc3339(),
        records: ordered,
        conflicts: table.conflicts,
    }
}

fn slug_table(
    brands: &[BrandIdentity],
    catalog: &[BrandIdentity],
    selected: &HashSet<String>,
    rules: &SlugRules,
) -> SlugTable {
    if catalog.is_empty() {
        return SlugTable::build(brands, rules);
    }

    let by_name: HashMap<&str, &BrandIdentity> =
        brands.iter().map(|b| (b.name.as_str(), b)).collect();
    let mut seen = HashSet::new();
    let universe: Vec<BrandIdentity> = catalog
        .iter()
        .map(|b| by_name.get(b.name.as_str()).copied().unwrap_or(b))
        .chain(brands.iter())
        .filter(|b| seen.insert(b.name.clone()))
        .cloned()
        .collect();

    let mut table = SlugTable::build(&universe, rules);
    table.retain_brands(selected);
    table
}

async fn dispatch(
    resolver: Arc<Resolver>,
    jobs: Vec<(BrandIdentity, String)>,
    options: BatchOptions,
    tx: mpsc::UnboundedSender<ResolutionRecord>,
) {
    let semaphore = Arc::new(Semaphore::new(options.concurrency.max(1)));

    for (index, (brand, slug)) in jobs.into_iter().enumerate() {
        if index > 0 {
            pause(options.dispatch_delay, options.jitter).await;
        }
        let Ok(permit) = Arc::clone(&semaphore).acquire_owned().await else {
            break;
        };

        let resolver = Arc::clone(&resolver);
        let tx = tx.clone();
        tokio::spawn(async move {
            let _permit = permit;
            let job = AssertUnwindSafe(resolver.resolve_as(&brand, &slug));
            let record = match job.catch_unwind().await {
                Ok(record) => record,
                Err(_) => {
                    tracing::warn!(brand = %brand.name, "resolution panicked");
                    ResolutionRecord::not_found(&brand.name, &slug)
                }
            };
            let _ = tx.send(record);
        });
    }
}

/// Sleep for `base` plus a uniformly random extra in `0..=jitter`.
pub async fn pause(base: Duration, jitter: Duration) {
    let extra_ms = match jitter.as_millis() as u64 {
        0 => 0,
        max => rand::rng().random_range(0..=max),
    };
    let total = base + Duration::from_millis(extra_ms);
    if !total.is_zero() {
        sleep(total).await;
    }
}
