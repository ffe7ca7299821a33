use std::fs;
use std::path::Path;

use logo_core::model::BrandIdentity;
use logo_core::project::{ProjectConfig, ProjectContext, ProjectLayout};
use logo_core::slug::{SlugRules, SlugTable};
use logo_core::store::AssetStore;
use logofetch::commands::{
    build_resolver, init_project_command, load_context, load_context_or_default, missing_brands,
    provider_infos, provider_order, select_brands, sync_map_command,
};
use tempfile::tempdir;

fn init(root: &Path, catalog: &str) -> String {
    let root_str = root.to_str().expect("utf8 root").to_string();
    init_project_command(&root_str, Some("units".into())).expect("init");
    fs::write(root.join("brands.json"), catalog).expect("catalog");
    root_str
}

#[test]
fn init_writes_config_and_output_dir() {
    let dir = tempdir().expect("tempdir");
    let root = init(dir.path(), r#"{ "brands": [] }"#);
    let ctx = load_context(&root).expect("context");
    assert_eq!(ctx.config.name, "units");
    assert!(ctx.output_dir.is_dir());
}

#[test]
fn load_context_requires_a_project_but_default_does_not() {
    let dir = tempdir().expect("tempdir");
    let root = dir.path().to_str().expect("utf8");
    let err = load_context(root).expect_err("no project");
    assert!(err.to_string().contains("Failed to read project config"));

    let ctx = load_context_or_default(root).expect("defaults");
    assert_eq!(ctx.config, ProjectConfig::default());
}

#[test]
fn select_brands_skips_cached_unless_asked() {
    let dir = tempdir().expect("tempdir");
    fs::write(dir.path().join("cached.svg"), vec![1u8; 800]).expect("seed");
    let store = AssetStore::new(dir.path(), 500);
    let brands = vec![BrandIdentity::new("Cached"), BrandIdentity::new("Fresh")];
    let slugs = SlugTable::build(&brands, &SlugRules::default());

    let pending = select_brands(brands.clone(), &store, &slugs, false);
    assert_eq!(pending, vec![BrandIdentity::new("Fresh")]);
    assert_eq!(select_brands(brands, &store, &slugs, true).len(), 2);
}

#[test]
fn select_brands_keeps_a_brand_whose_slug_belongs_to_another() {
    let dir = tempdir().expect("tempdir");
    fs::write(dir.path().join("ac-schnitzer.svg"), vec![1u8; 800]).expect("seed");
    let store = AssetStore::new(dir.path(), 500);
    let catalog = vec![BrandIdentity::new("AC Schnitzer"), BrandIdentity::new("AC-Schnitzer")];
    let slugs = SlugTable::build(&catalog, &SlugRules::default());

    let pending = select_brands(catalog, &store, &slugs, false);
    assert_eq!(pending, vec![BrandIdentity::new("AC-Schnitzer")]);
}

#[test]
fn provider_order_override_is_trimmed() {
    let ctx = ProjectContext::from_parts(ProjectLayout::new("/tmp/x"), ProjectConfig::default());
    let names = vec![" direct ".to_string(), String::new(), "clearbit".to_string()];
    assert_eq!(provider_order(&ctx, Some(names.as_slice())), vec!["direct", "clearbit"]);
    assert_eq!(provider_order(&ctx, None), ctx.config.resolver.provider_order);
}

#[test]
fn build_resolver_follows_the_override() {
    let dir = tempdir().expect("tempdir");
    let root = init(dir.path(), r#"{ "brands": [ { "name": "Acme" } ] }"#);
    let ctx = load_context(&root).expect("context");
    let catalog = ctx.load_catalog().expect("catalog");

    let order = vec!["site-favicon".to_string(), "direct".to_string()];
    let resolver = build_resolver(&ctx, &catalog, false, Some(order.as_slice())).expect("resolver");
    assert_eq!(resolver.provider_names(), vec!["site-favicon", "direct"]);

    let err = build_resolver(&ctx, &catalog, false, Some(&["bogus".to_string()][..]))
        .err()
        .expect("unknown provider");
    assert!(err.to_string().contains("Unknown provider 'bogus'"));
}

#[test]
fn missing_and_sync_agree_on_what_is_on_disk() {
    let dir = tempdir().expect("tempdir");
    let root = init(
        dir.path(),
        r#"{ "brands": [ { "name": "Acme" }, { "name": "Beta" }, { "name": "Tiny" } ] }"#,
    );
    let logos = dir.path().join("public/logos");
    fs::write(logos.join("acme.svg"), vec![1u8; 900]).expect("acme");
    fs::write(logos.join("tiny.png"), vec![1u8; 10]).expect("tiny");

    let missing: Vec<String> =
        missing_brands(&root).expect("missing").into_iter().map(|m| m.name).collect();
    assert_eq!(missing, vec!["Beta".to_string(), "Tiny".to_string()]);

    assert_eq!(sync_map_command(&root).expect("sync"), 1);
    assert_eq!(sync_map_command(&root).expect("resync"), 0);
    let map = load_context(&root).expect("context").load_map().expect("map");
    assert_eq!(map.lookup("acme"), Some("/logos/acme.svg"));
}

#[test]
fn provider_infos_mark_unused_providers() {
    let dir = tempdir().expect("tempdir");
    let root = init(dir.path(), r#"{ "brands": [] }"#);
    let layout = ProjectLayout::new(dir.path());
    let mut config = logo_core::project::load_project_config(&layout).expect("config");
    config.resolver.provider_order = vec!["clearbit".into(), "direct".into()];
    logo_core::project::save_project_config(&layout, &config).expect("save");

    let infos = provider_infos(&root).expect("infos");
    assert_eq!(infos[0].name, "clearbit");
    assert_eq!(infos[0].position, Some(1));
    assert_eq!(infos[1].name, "direct");
    assert!(infos[2..].iter().all(|i| i.position.is_none()));
}
