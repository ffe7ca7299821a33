#![allow(dead_code)]

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use logo_core::model::{BrandIdentity, Candidate, LogoFormat};
use logo_core::services::{Provider, ProviderError, ResolveOptions};

pub const PNG_SIGNATURE: [u8; 8] = [0x89, b'P', b'N', b'G', b'\r', b'\n', 0x1a, b'\n'];

/// PNG signature followed by `filler` zero bytes.
pub fn png_blob(filler: usize) -> Vec<u8> {
    let mut bytes = PNG_SIGNATURE.to_vec();
    bytes.extend(std::iter::repeat(0u8).take(filler));
    bytes
}

/// A plausible SVG above both the SVG floor and the cache floor, unique per `label`.
pub fn svg_logo(label: &str) -> Vec<u8> {
    let path: String =
        (0..24).map(|i| format!("M{i} {i} L{} {i} L{} 30 Z ", 100 - i, 90 - i)).collect();
    format!(
        "<?xml version='1.0'?><svg xmlns='http://www.w3.org/2000/svg' width='120' height='40' \
         viewBox='0 0 120 40'><title>{label}</title><path d='{path}' fill='#1a1a1a' \
         stroke='#000' stroke-width='2'/></svg>"
    )
    .into_bytes()
}

pub fn fast_options() -> ResolveOptions {
    ResolveOptions {
        provider_timeout: Duration::from_millis(100),
        brand_timeout: Duration::from_secs(5),
        provider_delay: Duration::ZERO,
        ..ResolveOptions::default()
    }
}

#[derive(Clone)]
pub enum Behavior {
    /// Return these candidates.
    Returns(Vec<Candidate>),
    /// Return an SVG unique to the brand name.
    SvgPerBrand,
    Fails,
    Hangs,
    Panics,
}

/// Provider double that counts invocations.
pub struct FakeProvider {
    name: String,
    behavior: Behavior,
    needs_domain: bool,
    calls: Arc<AtomicUsize>,
}

impl FakeProvider {
    pub fn new(name: &str, behavior: Behavior) -> Self {
        Self {
            name: name.to_string(),
            behavior,
            needs_domain: false,
            calls: Arc::new(AtomicUsize::new(0)),
        }
    }

    pub fn needing_domain(mut self) -> Self {
        self.needs_domain = true;
        self
    }

    /// Shared counter of `fetch` calls, usable after the provider is moved.
    pub fn counter(&self) -> Arc<AtomicUsize> {
        Arc::clone(&self.calls)
    }

    pub fn into_arc(self) -> Arc<dyn Provider> {
        Arc::new(self)
    }
}

pub fn calls(counter: &Arc<AtomicUsize>) -> usize {
    counter.load(Ordering::SeqCst)
}

#[async_trait]
impl Provider for FakeProvider {
    fn name(&self) -> &str {
        &self.name
    }

    fn requires_domain(&self) -> bool {
        self.needs_domain
    }

    async fn fetch(
        &self,
        brand: &BrandIdentity,
        _slug: &str,
    ) -> Result<Vec<Candidate>, ProviderError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        match &self.behavior {
            Behavior::Returns(candidates) => Ok(candidates.clone()),
            Behavior::SvgPerBrand => {
                Ok(vec![Candidate::new(svg_logo(&brand.name), Some(LogoFormat::Svg))])
            }
            Behavior::Fails => Err(ProviderError::Status {
                url: format!("https://fake.invalid/{}", brand.name),
                status: 503,
            }),
            Behavior::Hangs => {
                tokio::time::sleep(Duration::from_secs(3600)).await;
                Ok(Vec::new())
            }
            Behavior::Panics => panic!("provider exploded for {}", brand.name),
        }
    }
}
