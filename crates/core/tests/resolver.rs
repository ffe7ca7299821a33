mod support;

use std::time::Duration;

use logo_core::model::{AssetSource, AttemptResult, BrandIdentity, Candidate, LogoFormat};
use logo_core::services::{ProviderRegistry, ResolveError, ResolveOptions, Resolver};
use logo_core::slug::SlugRules;
use support::{calls, fast_options, png_blob, svg_logo, Behavior, FakeProvider};
use tempfile::tempdir;

fn valid_svg() -> Behavior {
    Behavior::Returns(vec![Candidate::new(svg_logo("fake"), Some(LogoFormat::Svg))])
}

#[tokio::test]
async fn first_valid_provider_short_circuits_the_rest() {
    let temp = tempdir().expect("tempdir");
    let first = FakeProvider::new("first", valid_svg());
    let second = FakeProvider::new("second", valid_svg());
    let third = FakeProvider::new("third", valid_svg());
    let (c1, c2, c3) = (first.counter(), second.counter(), third.counter());

    let resolver = Resolver::new(
        vec![first.into_arc(), second.into_arc(), third.into_arc()],
        temp.path(),
        fast_options(),
    );
    let record = resolver.resolve(&BrandIdentity::new("Acme")).await;

    let asset = record.asset().expect("found");
    assert_eq!(asset.filename, "acme.svg");
    assert_eq!(asset.source, AssetSource::Provider("first".into()));
    assert_eq!((calls(&c1), calls(&c2), calls(&c3)), (1, 0, 0));
    assert!(temp.path().join("acme.svg").is_file());
}

#[tokio::test]
async fn falls_back_past_timeouts_and_invalid_candidates() {
    let temp = tempdir().expect("tempdir");
    let html = Candidate::new(b"<html><body>404</body></html>".to_vec(), Some(LogoFormat::Png));
    let providers = vec![
        FakeProvider::new("slow", Behavior::Hangs).into_arc(),
        FakeProvider::new("garbage", Behavior::Returns(vec![html])).into_arc(),
        FakeProvider::new("good", valid_svg()).into_arc(),
    ];
    let resolver = Resolver::new(providers, temp.path(), fast_options());
    let record = resolver.resolve(&BrandIdentity::new("Fallback Co")).await;

    let asset = record.asset().expect("found");
    assert_eq!(asset.source, AssetSource::Provider("good".into()));
    assert_eq!(asset.filename, "fallback-co.svg");

    let results: Vec<&AttemptResult> = record.attempts.iter().map(|a| &a.result).collect();
    assert_eq!(results[0], &AttemptResult::TimedOut);
    assert!(matches!(results[1], AttemptResult::Rejected(reasons) if reasons.len() == 1));
    assert_eq!(results[2], &AttemptResult::Accepted(LogoFormat::Svg));
}

#[tokio::test]
async fn second_resolution_is_served_from_cache() {
    let temp = tempdir().expect("tempdir");
    let provider = FakeProvider::new("only", valid_svg());
    let counter = provider.counter();
    let resolver = Resolver::new(vec![provider.into_arc()], temp.path(), fast_options());
    let brand = BrandIdentity::new("Repeat");

    let first = resolver.resolve(&brand).await;
    let second = resolver.resolve(&brand).await;

    assert_eq!(calls(&counter), 1);
    let (a, b) = (first.asset().expect("first"), second.asset().expect("second"));
    assert_eq!(a.filename, b.filename);
    assert_eq!(a.sha256, b.sha256);
    assert_eq!(b.source, AssetSource::Cache);
    assert!(second.attempts.is_empty());
}

#[tokio::test]
async fn force_refetch_bypasses_cache() {
    let temp = tempdir().expect("tempdir");
    std::fs::write(temp.path().join("forced.png"), png_blob(900)).expect("seed");
    let provider = FakeProvider::new("only", valid_svg());
    let counter = provider.counter();
    let options = ResolveOptions { force_refetch: true, ..fast_options() };
    let resolver = Resolver::new(vec![provider.into_arc()], temp.path(), options);

    let record = resolver.resolve(&BrandIdentity::new("Forced")).await;
    assert_eq!(calls(&counter), 1);
    assert_eq!(record.asset().expect("found").format, LogoFormat::Svg);
    assert!(!temp.path().join("forced.png").exists());
}

#[tokio::test]
async fn domain_providers_are_skipped_without_a_domain() {
    let temp = tempdir().expect("tempdir");
    let needs_domain = FakeProvider::new("api", valid_svg()).needing_domain();
    let counter = needs_domain.counter();
    let resolver = Resolver::new(
        vec![needs_domain.into_arc(), FakeProvider::new("fallback", Behavior::Fails).into_arc()],
        temp.path(),
        fast_options(),
    );

    let record = resolver.resolve(&BrandIdentity::new("No Domain")).await;
    assert!(!record.is_found());
    assert_eq!(calls(&counter), 0);
    assert_eq!(record.attempts[0].result, AttemptResult::Skipped);
    assert!(matches!(record.attempts[1].result, AttemptResult::Failed(_)));

    let with_domain = BrandIdentity::new("No Domain").with_domain("nodomain.example");
    let record = resolver.resolve(&with_domain).await;
    assert!(record.is_found());
    assert_eq!(calls(&counter), 1);
}

#[tokio::test]
async fn candidates_are_tried_in_provider_order() {
    let temp = tempdir().expect("tempdir");
    let candidates = vec![
        Candidate::new(png_blob(50), Some(LogoFormat::Png)),
        Candidate::new(png_blob(900), Some(LogoFormat::Png)),
        Candidate::new(svg_logo("late"), Some(LogoFormat::Svg)),
    ];
    let resolver = Resolver::new(
        vec![FakeProvider::new("multi", Behavior::Returns(candidates)).into_arc()],
        temp.path(),
        fast_options(),
    );
    let record = resolver.resolve(&BrandIdentity::new("Multi")).await;
    assert_eq!(record.asset().expect("found").format, LogoFormat::Png);
}

#[tokio::test]
async fn exhausted_providers_yield_not_found_without_writing() {
    let temp = tempdir().expect("tempdir");
    let resolver = Resolver::new(
        vec![
            FakeProvider::new("down", Behavior::Fails).into_arc(),
            FakeProvider::new("empty", Behavior::Returns(Vec::new())).into_arc(),
        ],
        temp.path(),
        fast_options(),
    );
    let record = resolver.resolve(&BrandIdentity::new("Nobody")).await;
    assert!(!record.is_found());
    assert_eq!(record.attempts[1].result, AttemptResult::Empty);
    assert_eq!(std::fs::read_dir(temp.path()).expect("list").count(), 0);
}

#[tokio::test]
async fn brand_timeout_bounds_the_whole_resolution() {
    let temp = tempdir().expect("tempdir");
    let options = ResolveOptions {
        provider_timeout: Duration::from_millis(400),
        brand_timeout: Duration::from_millis(100),
        provider_delay: Duration::ZERO,
        ..ResolveOptions::default()
    };
    // The brand timeout is clamped above the provider timeout.
    assert_eq!(options.effective_brand_timeout(), Duration::from_millis(1400));

    let resolver = Resolver::new(
        vec![
            FakeProvider::new("hang-1", Behavior::Hangs).into_arc(),
            FakeProvider::new("hang-2", Behavior::Hangs).into_arc(),
            FakeProvider::new("hang-3", Behavior::Hangs).into_arc(),
            FakeProvider::new("hang-4", Behavior::Hangs).into_arc(),
            FakeProvider::new("good", valid_svg()).into_arc(),
        ],
        temp.path(),
        options,
    );
    let record = resolver.resolve(&BrandIdentity::new("Stuck")).await;
    assert!(!record.is_found());
    assert!(record.attempts.len() < 5);
}

#[tokio::test]
async fn empty_names_are_not_resolved() {
    let temp = tempdir().expect("tempdir");
    let provider = FakeProvider::new("only", valid_svg());
    let counter = provider.counter();
    let resolver = Resolver::new(vec![provider.into_arc()], temp.path(), fast_options());
    assert!(!resolver.resolve(&BrandIdentity::new("  ")).await.is_found());
    assert_eq!(calls(&counter), 0);
}

#[tokio::test]
async fn slug_overrides_name_the_asset() {
    let temp = tempdir().expect("tempdir");
    let resolver = Resolver::new(
        vec![FakeProvider::new("only", valid_svg()).into_arc()],
        temp.path(),
        fast_options(),
    )
    .with_slug_rules(SlugRules::default().with_override("H&R Springs", "handr"));
    let record = resolver.resolve(&BrandIdentity::new("H&R Springs")).await;
    assert_eq!(record.slug, "handr");
    assert_eq!(record.asset().expect("found").filename, "handr.svg");
}

#[test]
fn registry_orders_providers_and_rejects_unknown_names() {
    let mut registry = ProviderRegistry::new();
    registry
        .register(FakeProvider::new("b", Behavior::Fails))
        .register(FakeProvider::new("a", Behavior::Fails));
    assert_eq!(registry.names(), vec!["a".to_string(), "b".to_string()]);

    let ordered = registry.ordered(&["b".to_string(), "a".to_string()]).expect("known");
    let names: Vec<&str> = ordered.iter().map(|p| p.name()).collect();
    assert_eq!(names, vec!["b", "a"]);

    let err = registry.ordered(&["nope".to_string()]).err().expect("unknown");
    assert!(matches!(err, ResolveError::UnknownProvider { ref name, .. } if name == "nope"));
    assert!(err.to_string().contains("Available: a, b"));
}
