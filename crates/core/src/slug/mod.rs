//! Slug derivation and collision detection.
//!
//! A slug is the file stem of a brand's logo asset. It is a pure function of the
//! brand name plus two tables supplied by configuration: manual overrides (exact
//! name -> slug) and character folds (e.g. `ö` -> `o`).

use std::collections::{BTreeMap, HashMap, HashSet};

use serde::{Deserialize, Serialize};

use crate::model::BrandIdentity;

/// Character folds applied after lowercasing. Characters without a fold that are
/// not `[a-z0-9]` end up as separators.
const DEFAULT_FOLDS: &[(char, &str)] = &[
    ('à', "a"),
    ('á', "a"),
    ('â', "a"),
    ('ã', "a"),
    ('ä', "a"),
    ('å', "a"),
    ('æ', "ae"),
    ('ç', "c"),
    ('č', "c"),
    ('ć', "c"),
    ('ď', "d"),
    ('è', "e"),
    ('é', "e"),
    ('ê', "e"),
    ('ë', "e"),
    ('ě', "e"),
    ('ì', "i"),
    ('í', "i"),
    ('î', "i"),
    ('ï', "i"),
    ('ł', "l"),
    ('ñ', "n"),
    ('ň', "n"),
    ('ò', "o"),
    ('ó', "o"),
    ('ô', "o"),
    ('õ', "o"),
    ('ö', "o"),
    ('ø', "o"),
    ('œ', "oe"),
    ('ř', "r"),
    ('š', "s"),
    ('ś', "s"),
    ('ß', "ss"),
    ('ť', "t"),
    ('ù', "u"),
    ('ú', "u"),
    ('û', "u"),
    ('ü', "u"),
    ('ů', "u"),
    ('ý', "y"),
    ('ÿ', "y"),
    ('ž', "z"),
    ('ź', "z"),
    ('ż', "z"),
];

/// Serializable slug tables, as stored in the project config.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SlugSettings {
    /// Exact brand name -> slug. Takes precedence over the generic rule.
    #[serde(default)]
    pub overrides: BTreeMap<String, String>,
    /// Extra single-character folds on top of the built-in table.
    #[serde(default)]
    pub folds: BTreeMap<String, String>,
}

/// Compiled slug rules.
#[derive(Debug, Clone)]
pub struct SlugRules {
    overrides: HashMap<String, String>,
    folds: HashMap<char, String>,
}

impl Default for SlugRules {
    fn default() -> Self {
        Self {
            overrides: HashMap::new(),
            folds: DEFAULT_FOLDS.iter().map(|(c, s)| (*c, s.to_string())).collect(),
        }
    }
}

impl SlugRules {
    /// Built-in folds extended by the configured tables.
    ///
    /// Fold keys longer than one character are ignored; override values are
    /// themselves normalised through the generic rule so a hand-written override
    /// can never produce an unsafe file name.
    pub fn from_settings(settings: &SlugSettings) -> Self {
        let mut rules = Self::default();
        for (from, to) in &settings.folds {
            let mut chars = from.chars();
            if let (Some(c), None) = (chars.next(), chars.next()) {
                for lower in c.to_lowercase() {
                    rules.folds.insert(lower, to.to_lowercase());
                }
            }
        }
        for (name, slug) in &settings.overrides {
            let normalized = rules.generic(slug);
            rules.overrides.insert(name.clone(), normalized);
        }
        rules
    }

    pub fn with_override(mut self, name: impl Into<String>, slug: impl Into<String>) -> Self {
        let slug = self.generic(&slug.into());
        self.overrides.insert(name.into(), slug);
        self
    }

    /// Slug for a brand name: the override if one exists, else the generic rule.
    pub fn slug(&self, name: &str) -> String {
        match self.overrides.get(name) {
            Some(slug) => slug.clone(),
            None => self.generic(name),
        }
    }

    /// Whether `name` has a manual override.
    pub fn is_overridden(&self, name: &str) -> bool {
        self.overrides.contains_key(name)
    }

    fn generic(&self, name: &str) -> String {
        let mut folded = String::with_capacity(name.len());
        for c in name.trim().chars().flat_map(char::to_lowercase) {
            match c {
                '&' => folded.push_str("and"),
                '\'' | '\u{2019}' | '`' => {}
                '/' => folded.push('-'),
                _ => match self.folds.get(&c) {
                    Some(replacement) => folded.push_str(replacement),
                    None => folded.push(c),
                },
            }
        }

        let mut slug = String::with_capacity(folded.len());
        let mut pending_dash = false;
        for c in folded.chars() {
            if c.is_ascii_lowercase() || c.is_ascii_digit() {
                if pending_dash && !slug.is_empty() {
                    slug.push('-');
                }
                pending_dash = false;
                slug.push(c);
            } else {
                pending_dash = true;
            }
        }
        slug
    }
}

/// Slug a name with the default rules.
pub fn slugify(name: &str) -> String {
    SlugRules::default().slug(name)
}

/// A brand that could not be given a slug of its own.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", tag = "kind")]
pub enum SlugConflict {
    /// `brand` derives the same slug as `kept`, which came earlier in the input.
    Collision { slug: String, kept: String, brand: String },
    /// The name has no `[a-z0-9]` content after folding.
    Empty { brand: String },
}

impl SlugConflict {
    pub fn brand(&self) -> &str {
        match self {
            SlugConflict::Collision { brand, .. } | SlugConflict::Empty { brand } => brand,
        }
    }
}

impl std::fmt::Display for SlugConflict {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SlugConflict::Collision { slug, kept, brand } => {
                write!(f, "'{brand}' collides with '{kept}' on slug '{slug}'")
            }
            SlugConflict::Empty { brand } => write!(f, "'{brand}' has an empty slug"),
        }
    }
}

/// Slug assignment for a whole batch.
///
/// The first brand (input order) keeps a slug. Later brands that derive the same
/// slug are reported as conflicts rather than allowed to overwrite the asset.
#[derive(Debug, Clone, Default)]
pub struct SlugTable {
    pub assigned: Vec<(BrandIdentity, String)>,
    pub conflicts: Vec<SlugConflict>,
}

impl SlugTable {
    pub fn build(brands: &[BrandIdentity], rules: &SlugRules) -> Self {
        let mut owners: HashMap<String, String> = HashMap::new();
        let mut table = SlugTable::default();

        for brand in brands {
            let slug = rules.slug(&brand.name);
            if slug.is_empty() {
                table.conflicts.push(SlugConflict::Empty { brand: brand.name.clone() });
                continue;
            }
            match owners.get(&slug) {
                // Exact duplicates of a name are the same brand, not a collision.
                Some(owner) if owner == &brand.name => continue,
                Some(owner) => table.conflicts.push(SlugConflict::Collision {
                    slug,
                    kept: owner.clone(),
                    brand: brand.name.clone(),
                }),
                None => {
                    owners.insert(slug.clone(), brand.name.clone());
                    table.assigned.push((brand.clone(), slug));
                }
            }
        }

        table
    }

    pub fn has_conflicts(&self) -> bool {
        !self.conflicts.is_empty()
    }

    /// Brand name -> assigned slug. Conflicted brands are absent.
    pub fn slugs_by_name(&self) -> HashMap<&str, &str> {
        self.assigned.iter().map(|(brand, slug)| (brand.name.as_str(), slug.as_str())).collect()
    }

    /// Drop every assignment and conflict whose brand is not in `names`.
    ///
    /// Slugs stay as they were assigned over the full input, so a kept brand
    /// that lost a collision to a dropped one is still reported.
    pub fn retain_brands(&mut self, names: &HashSet<String>) {
        self.assigned.retain(|(brand, _)| names.contains(&brand.name));
        self.conflicts.retain(|conflict| names.contains(conflict.brand()));
    }
}
