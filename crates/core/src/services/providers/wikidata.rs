//! Wikidata entity lookup, then the entity's logo file on Wikimedia Commons.
//!
//! Search hits are matched on their official website (P856) against the brand's
//! domain. Without a domain match, only the top hit of a long enough name is
//! trusted; short names are too ambiguous.

use std::collections::HashMap;

use async_trait::async_trait;
use reqwest::Url;
use serde::Deserialize;

use crate::model::{BrandIdentity, Candidate, LogoFormat};
use crate::services::providers::http::HttpFetcher;
use crate::services::resolver::{Provider, ProviderError};

pub const WIKIDATA_PROVIDER: &str = "wikidata";

const API_URL: &str = "https://www.wikidata.org/w/api.php";
const FILE_PATH_URL: &str = "https://commons.wikimedia.org/wiki/Special:FilePath/";

const SEARCH_LIMIT: &str = "6";

/// Names shorter than this only match through their website.
const MIN_FALLBACK_NAME_CHARS: usize = 5;

const WEBSITE: &str = "P856";
/// Logo image first, then the generic image claim.
const IMAGE_PROPERTIES: [&str; 2] = ["P154", "P18"];

#[derive(Debug, Deserialize)]
struct SearchResponse {
    #[serde(default)]
    search: Vec<SearchHit>,
}

#[derive(Debug, Deserialize)]
struct SearchHit {
    id: String,
}

#[derive(Debug, Deserialize)]
struct EntitiesResponse {
    #[serde(default)]
    entities: HashMap<String, Entity>,
}

#[derive(Debug, Default, Deserialize)]
struct Entity {
    #[serde(default)]
    claims: HashMap<String, Vec<Claim>>,
}

#[derive(Debug, Deserialize)]
struct Claim {
    mainsnak: Snak,
}

#[derive(Debug, Deserialize)]
struct Snak {
    #[serde(default)]
    datavalue: Option<DataValue>,
}

#[derive(Debug, Deserialize)]
struct DataValue {
    value: serde_json::Value,
}

impl Entity {
    fn first_string(&self, property: &str) -> Option<String> {
        let claim = self.claims.get(property)?.first()?;
        let value = claim.mainsnak.datavalue.as_ref()?.value.as_str()?.trim();
        (!value.is_empty()).then(|| value.to_string())
    }
}

/// The claims of one entity this provider cares about.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EntityClaims {
    pub website: Option<String>,
    pub logo_file: Option<String>,
}

/// Entity ids from a `wbsearchentities` response, best hit first.
pub fn search_ids(body: &[u8]) -> Result<Vec<String>, serde_json::Error> {
    let response: SearchResponse = serde_json::from_slice(body)?;
    Ok(response.search.into_iter().map(|hit| hit.id).collect())
}

/// Website and logo file per entity id from a `wbgetentities` response.
pub fn entity_claims(body: &[u8]) -> Result<HashMap<String, EntityClaims>, serde_json::Error> {
    let response: EntitiesResponse = serde_json::from_slice(body)?;
    Ok(response
        .entities
        .into_iter()
        .map(|(id, entity)| {
            let claims = EntityClaims {
                website: entity.first_string(WEBSITE),
                logo_file: IMAGE_PROPERTIES.iter().find_map(|p| entity.first_string(p)),
            };
            (id, claims)
        })
        .collect())
}

/// Host of a URL or bare domain, lowercased and without `www.`.
fn host_of(site: &str) -> Option<String> {
    let site = site.trim();
    let parsed = match Url::parse(site) {
        Ok(url) => url,
        Err(_) => Url::parse(&format!("https://{site}")).ok()?,
    };
    let host = parsed.host_str()?.to_ascii_lowercase();
    Some(host.strip_prefix("www.").map(str::to_string).unwrap_or(host))
}

/// Logo file of the entity that best matches `brand`, if any.
pub fn pick_logo_file(
    ids: &[String],
    entities: &HashMap<String, EntityClaims>,
    brand: &BrandIdentity,
) -> Option<String> {
    if let Some(target) = brand.domain.as_deref().and_then(host_of) {
        let matched = ids.iter().filter_map(|id| entities.get(id)).find(|claims| {
            claims.website.as_deref().and_then(host_of).as_deref() == Some(target.as_str())
        });
        if let Some(claims) = matched {
            return claims.logo_file.clone();
        }
    }

    if brand.name.trim().chars().count() < MIN_FALLBACK_NAME_CHARS {
        return None;
    }
    entities.get(ids.first()?)?.logo_file.clone()
}

/// Commons URL that redirects to the original upload of `file`.
pub fn file_path_url(file: &str) -> Option<String> {
    let mut url = Url::parse(FILE_PATH_URL).ok()?;
    url.path_segments_mut().ok()?.pop_if_empty().push(&file.replace(' ', "_"));
    Some(url.into())
}

fn api_url(params: &[(&str, &str)]) -> Result<String, ProviderError> {
    Url::parse_with_params(API_URL, params)
        .map(String::from)
        .map_err(|e| ProviderError::Transport { url: API_URL.to_string(), reason: e.to_string() })
}

fn decode(url: &str, err: serde_json::Error) -> ProviderError {
    ProviderError::Decode { url: url.to_string(), reason: err.to_string() }
}

/// Wikidata search plus Wikimedia Commons download. No key required.
pub struct WikidataProvider {
    http: HttpFetcher,
}

impl WikidataProvider {
    pub fn new(http: HttpFetcher) -> Self {
        Self { http }
    }
}

#[async_trait]
impl Provider for WikidataProvider {
    fn name(&self) -> &str {
        WIKIDATA_PROVIDER
    }

    fn description(&self) -> String {
        "Wikidata logo claim (P154) served from Wikimedia Commons".to_string()
    }

    async fn fetch(
        &self,
        brand: &BrandIdentity,
        _slug: &str,
    ) -> Result<Vec<Candidate>, ProviderError> {
        let search_url = api_url(&[
            ("action", "wbsearchentities"),
            ("format", "json"),
            ("language", "en"),
            ("type", "item"),
            ("limit", SEARCH_LIMIT),
            ("search", brand.name.trim()),
        ])?;
        let body = self.http.get(&search_url).await?;
        let ids = search_ids(&body).map_err(|e| decode(&search_url, e))?;
        if ids.is_empty() {
            return Ok(Vec::new());
        }

        let joined = ids.join("|");
        let entities_url = api_url(&[
            ("action", "wbgetentities"),
            ("format", "json"),
            ("props", "claims"),
            ("ids", joined.as_str()),
        ])?;
        let body = self.http.get(&entities_url).await?;
        let entities = entity_claims(&body).map_err(|e| decode(&entities_url, e))?;

        let Some(file) = pick_logo_file(&ids, &entities, brand) else {
            tracing::trace!(brand = %brand.name, "no matching wikidata entity with a logo");
            return Ok(Vec::new());
        };
        let Some(url) = file_path_url(&file) else {
            return Ok(Vec::new());
        };

        let bytes = self.http.get(&url).await?;
        Ok(vec![Candidate::new(bytes, LogoFormat::from_url(&file)).with_origin(url)])
    }
}
