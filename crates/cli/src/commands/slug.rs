use anyhow::{anyhow, Result};

use crate::commands::load_context_or_default;

/// Print the slug a brand name maps to and whether a logo exists for it.
pub fn slug_command(root: &str, name: &str) -> Result<()> {
    let ctx = load_context_or_default(root)?;
    let rules = ctx.slug_rules();
    let slug = rules.slug(name);
    if slug.is_empty() {
        return Err(anyhow!("'{}' has no usable characters for a slug", name));
    }

    let store = ctx.asset_store();
    println!("Name: {}", name);
    println!("Slug: {}", slug);
    if rules.is_overridden(name) {
        println!("Source: manual override");
    }
    match store.find_existing(&slug)? {
        Some(asset) => {
            let path = store.dir().join(&asset.filename);
            println!("Logo: {} ({} bytes)", path.display(), asset.size);
        }
        None => println!("Logo: (none in {})", store.dir().display()),
    }
    Ok(())
}
