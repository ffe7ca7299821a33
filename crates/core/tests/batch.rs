mod support;

use std::collections::HashSet;
use std::sync::Arc;

use logo_core::model::{BrandIdentity, Candidate, LogoFormat};
use logo_core::services::batch::pause;
use logo_core::services::{run_batch, run_batch_within, BatchOptions, Resolver};
use logo_core::slug::SlugConflict;
use support::{calls, fast_options, png_blob, Behavior, FakeProvider};
use tempfile::tempdir;

fn brands(n: usize) -> Vec<BrandIdentity> {
    (0..n).map(|i| BrandIdentity::new(format!("Brand {i:02}"))).collect()
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn fifty_brands_at_concurrency_ten_yield_fifty_records_and_files() {
    let temp = tempdir().expect("tempdir");
    let provider = FakeProvider::new("per-brand", Behavior::SvgPerBrand);
    let counter = provider.counter();
    let resolver = Arc::new(Resolver::new(vec![provider.into_arc()], temp.path(), fast_options()));

    let mut progress = Vec::new();
    let input = brands(50);
    let report = run_batch(resolver, input.clone(), &BatchOptions::immediate(10), |record| {
        progress.push(record.brand.clone())
    })
    .await;

    assert_eq!(report.records.len(), 50);
    assert_eq!(progress.len(), 50);
    assert_eq!(calls(&counter), 50);
    let names: Vec<&str> = report.records.iter().map(|r| r.brand.as_str()).collect();
    let expected: Vec<&str> = input.iter().map(|b| b.name.as_str()).collect();
    assert_eq!(names, expected, "records follow input order");

    let files: HashSet<String> = std::fs::read_dir(temp.path())
        .expect("list")
        .map(|e| e.expect("entry").file_name().to_string_lossy().to_string())
        .collect();
    assert_eq!(files.len(), 50);
    for record in &report.records {
        assert!(files.contains(&record.asset().expect("found").filename));
    }

    let summary = report.summary();
    assert_eq!((summary.attempted, summary.found, summary.failed), (50, 50, 0));
    assert_eq!(summary.by_format.get(&LogoFormat::Svg), Some(&50));
    assert!(summary.duplicate_content.is_empty());
}

#[tokio::test]
async fn slug_collisions_are_flagged_and_not_resolved() {
    let temp = tempdir().expect("tempdir");
    let provider = FakeProvider::new("per-brand", Behavior::SvgPerBrand);
    let counter = provider.counter();
    let resolver = Arc::new(Resolver::new(vec![provider.into_arc()], temp.path(), fast_options()));

    let input = vec![
        BrandIdentity::new("Sea Doo"),
        BrandIdentity::new("Sea-Doo"),
        BrandIdentity::new("Yamaha"),
    ];
    let report = run_batch(resolver, input, &BatchOptions::immediate(4), |_| {}).await;

    assert_eq!(calls(&counter), 2);
    assert_eq!(report.records.len(), 3);
    assert!(report.records[0].is_found());
    assert!(!report.records[1].is_found());
    assert_eq!(report.records[1].slug, "sea-doo");
    assert!(matches!(
        &report.conflicts[..],
        [SlugConflict::Collision { brand, kept, .. }] if brand == "Sea-Doo" && kept == "Sea Doo"
    ));
    assert_eq!(report.failed_brands(), vec!["Sea-Doo"]);
}

#[tokio::test]
async fn selected_brand_losing_a_catalog_collision_is_not_resolved() {
    let temp = tempdir().expect("tempdir");
    let provider = FakeProvider::new("per-brand", Behavior::SvgPerBrand);
    let counter = provider.counter();
    let resolver = Arc::new(Resolver::new(vec![provider.into_arc()], temp.path(), fast_options()));

    let catalog = vec![
        BrandIdentity::new("AC Schnitzer"),
        BrandIdentity::new("AC-Schnitzer"),
        BrandIdentity::new("Yamaha"),
    ];
    let selected = vec![BrandIdentity::new("AC-Schnitzer"), BrandIdentity::new("Yamaha")];
    let report =
        run_batch_within(resolver, selected, &catalog, &BatchOptions::immediate(2), |_| {}).await;

    assert_eq!(calls(&counter), 1);
    assert_eq!(report.records.len(), 2);
    assert!(!report.records[0].is_found());
    assert_eq!(report.records[0].slug, "ac-schnitzer");
    assert!(report.records[1].is_found());
    assert!(matches!(
        &report.conflicts[..],
        [SlugConflict::Collision { brand, kept, .. }]
            if brand == "AC-Schnitzer" && kept == "AC Schnitzer"
    ));
    assert!(!temp.path().join("ac-schnitzer.svg").exists());
}

#[tokio::test]
async fn a_panicking_job_does_not_sink_the_batch() {
    let temp = tempdir().expect("tempdir");
    let exploding = FakeProvider::new("boom", Behavior::Panics).needing_domain();
    let fallback = FakeProvider::new("per-brand", Behavior::SvgPerBrand);
    let resolver = Arc::new(Resolver::new(
        vec![exploding.into_arc(), fallback.into_arc()],
        temp.path(),
        fast_options(),
    ));

    let input = vec![
        BrandIdentity::new("Calm"),
        BrandIdentity::new("Volatile").with_domain("volatile.example"),
        BrandIdentity::new("Steady"),
    ];
    let report = run_batch(resolver, input, &BatchOptions::immediate(2), |_| {}).await;

    assert_eq!(report.records.len(), 3);
    assert!(report.records[0].is_found());
    assert!(!report.records[1].is_found());
    assert!(report.records[2].is_found());
    assert_eq!(report.summary().failed_brands, vec!["Volatile".to_string()]);
}

#[tokio::test]
async fn duplicate_names_produce_a_single_record() {
    let temp = tempdir().expect("tempdir");
    let resolver = Arc::new(Resolver::new(
        vec![FakeProvider::new("per-brand", Behavior::SvgPerBrand).into_arc()],
        temp.path(),
        fast_options(),
    ));
    let input = vec![BrandIdentity::new("Twice"), BrandIdentity::new("Twice")];
    let report = run_batch(resolver, input, &BatchOptions::immediate(2), |_| {}).await;
    assert_eq!(report.records.len(), 1);
    assert!(report.conflicts.is_empty());
}

#[tokio::test]
async fn summary_groups_identical_content() {
    let temp = tempdir().expect("tempdir");
    let placeholder = Candidate::new(png_blob(1200), Some(LogoFormat::Png));
    let resolver = Arc::new(Resolver::new(
        vec![FakeProvider::new("same", Behavior::Returns(vec![placeholder])).into_arc()],
        temp.path(),
        fast_options(),
    ));
    let input = vec![BrandIdentity::new("One"), BrandIdentity::new("Two")];
    let report = run_batch(resolver, input, &BatchOptions::immediate(2), |_| {}).await;

    let summary = report.summary();
    assert_eq!(summary.fetched, 2);
    assert_eq!(summary.duplicate_content, vec![vec!["One".to_string(), "Two".to_string()]]);
}

#[tokio::test]
async fn pause_without_delay_returns_immediately() {
    let started = std::time::Instant::now();
    pause(std::time::Duration::ZERO, std::time::Duration::ZERO).await;
    assert!(started.elapsed() < std::time::Duration::from_millis(50));
}

#[test]
fn default_batch_options_match_documented_values() {
    let options = BatchOptions::default();
    assert_eq!(options.concurrency, 10);
    assert_eq!(options.dispatch_delay.as_millis(), 200);
    assert_eq!(options.jitter.as_millis(), 250);
}
