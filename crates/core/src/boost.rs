//! Boost resolution: turns a caller's selected boost keys into a cost delta
//! and a chance multiplier.
//!
//! Each selected key is looked up first in the case's own overrides (only
//! active ones count), then in the global default catalog. Keys found in
//! neither place contribute nothing and are reported back as ignored.

use serde::Serialize;

use crate::types::Money;

// ---------------------------------------------------------------------------
// Constants
// ---------------------------------------------------------------------------

/// Sentinel key meaning "no boost selected". Never resolves from the
/// default catalog.
pub const NO_BOOST: &str = "none";

/// Multiplicative identity used when no boost resolves.
pub const IDENTITY_MULTIPLIER: f64 = 1.0;

/// Maximum number of boost keys accepted in a single request.
pub const MAX_SELECTED_BOOSTS: usize = 16;

// ---------------------------------------------------------------------------
// Types
// ---------------------------------------------------------------------------

/// Concrete cost and multiplier of a boost.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BoostTerms {
    pub cost_delta: Money,
    pub chance_multiplier: f64,
}

/// Entry from the global default boost catalog.
#[derive(Debug, Clone)]
pub struct DefaultBoost {
    pub key: String,
    pub terms: BoostTerms,
}

/// Per-case override of a boost. Inactive overrides are skipped and the
/// default catalog entry (if any) applies instead.
#[derive(Debug, Clone)]
pub struct CaseBoostOverride {
    pub key: String,
    pub terms: BoostTerms,
    pub is_active: bool,
}

/// Where a resolved boost took its terms from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum BoostSource {
    CaseOverride,
    DefaultCatalog,
}

/// A selected boost that resolved to concrete terms.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AppliedBoost {
    pub key: String,
    pub source: BoostSource,
    pub terms: BoostTerms,
}

/// Aggregate of all resolved boosts for one opening.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ResolvedBoosts {
    /// Sum of `cost_delta` over all applied boosts.
    pub additional_cost: Money,
    /// Product of `chance_multiplier` over all applied boosts (1 if none).
    pub chance_multiplier: f64,
    pub applied: Vec<AppliedBoost>,
    /// Selected keys that matched neither an active override nor the
    /// default catalog.
    pub ignored: Vec<String>,
}

impl Default for ResolvedBoosts {
    fn default() -> Self {
        Self {
            additional_cost: Money::ZERO,
            chance_multiplier: IDENTITY_MULTIPLIER,
            applied: Vec::new(),
            ignored: Vec::new(),
        }
    }
}

// ---------------------------------------------------------------------------
// Resolution
// ---------------------------------------------------------------------------

/// Resolve the selected boost keys against case overrides and defaults.
///
/// Duplicate keys in `selected` are only counted once, in the order they
/// first appear.
pub fn resolve_boosts<S: AsRef<str>>(
    selected: &[S],
    overrides: &[CaseBoostOverride],
    defaults: &[DefaultBoost],
) -> ResolvedBoosts {
    let mut resolved = ResolvedBoosts::default();
    let mut seen: Vec<&str> = Vec::with_capacity(selected.len());

    for key in selected.iter().map(AsRef::as_ref) {
        if seen.contains(&key) {
            continue;
        }
        seen.push(key);

        let Some((source, terms)) = lookup(key, overrides, defaults) else {
            if key != NO_BOOST {
                resolved.ignored.push(key.to_string());
            }
            continue;
        };

        resolved.additional_cost += terms.cost_delta;
        resolved.chance_multiplier *= terms.chance_multiplier;
        resolved.applied.push(AppliedBoost {
            key: key.to_string(),
            source,
            terms: terms.clone(),
        });
    }

    resolved
}

fn lookup<'a>(
    key: &str,
    overrides: &'a [CaseBoostOverride],
    defaults: &'a [DefaultBoost],
) -> Option<(BoostSource, &'a BoostTerms)> {
    if let Some(o) = overrides.iter().find(|o| o.is_active && o.key == key) {
        return Some((BoostSource::CaseOverride, &o.terms));
    }
    if key == NO_BOOST {
        return None;
    }
    defaults
        .iter()
        .find(|d| d.key == key)
        .map(|d| (BoostSource::DefaultCatalog, &d.terms))
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
