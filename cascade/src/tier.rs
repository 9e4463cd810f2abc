use serde::Deserialize;
use serde::Serialize;

/// Static description of one stage in a selection chain.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TierSpec {
    /// Stable key used in logs and tickets (e.g. `district`).
    pub key: &'static str,

    /// Human-facing label (e.g. `District`).
    pub label: &'static str,
}

/// One selectable entry of a tier.
///
/// `value` is what the selection stores and what downstream fetches use;
/// `label` is what the UI shows. For plain-string tiers the two are equal,
/// but e.g. KPI districts select by `district_id` while displaying
/// `district_name`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OptionItem {
    pub value: String,
    pub label: String,
}

impl OptionItem {
    pub fn new(value: impl Into<String>, label: impl Into<String>) -> Self {
        Self {
            value: value.into(),
            label: label.into(),
        }
    }

    /// An option whose stored value and display label coincide.
    pub fn plain(value: impl Into<String>) -> Self {
        let value = value.into();
        Self {
            label: value.clone(),
            value,
        }
    }
}

/// The currently selected value of every tier, in dependency order.
///
/// An empty string means "unselected". The controller maintains the chain
/// invariant: a non-empty value at tier `i` implies non-empty values at
/// every tier before `i`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Selections {
    values: Vec<String>,
}

impl Selections {
    pub(crate) fn new(tier_count: usize) -> Self {
        Self {
            values: vec![String::new(); tier_count],
        }
    }

    pub fn tier_count(&self) -> usize {
        self.values.len()
    }

    /// Selected value of `tier`, or `""` when unselected or out of range.
    pub fn value(&self, tier: usize) -> &str {
        self.values.get(tier).map(String::as_str).unwrap_or("")
    }

    pub fn is_set(&self, tier: usize) -> bool {
        !self.value(tier).is_empty()
    }

    /// True when every tier strictly before `tier` has a value.
    pub fn upstream_set(&self, tier: usize) -> bool {
        (0..tier).all(|t| self.is_set(t))
    }

    pub fn all_set(&self) -> bool {
        self.values.iter().all(|v| !v.is_empty())
    }

    /// Index of the deepest selected tier, if any.
    pub fn highest_set(&self) -> Option<usize> {
        self.values.iter().rposition(|v| !v.is_empty())
    }

    pub(crate) fn set(&mut self, tier: usize, value: String) {
        if let Some(slot) = self.values.get_mut(tier) {
            *slot = value;
        }
    }

    pub(crate) fn clear_from(&mut self, tier: usize) {
        for slot in self.values.iter_mut().skip(tier) {
            slot.clear();
        }
    }
}
