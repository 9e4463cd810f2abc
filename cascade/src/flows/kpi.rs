//! KPI dashboard: State → District → Data Source → Year, terminated by the
//! KPI-row fetch. District selections store the numeric `district_id`
//! (as a string) while displaying `district_name`, mirroring the backend's
//! query parameters.

use serde::Deserialize;
use serde::Deserializer;
use serde::Serialize;

use crate::error::FetchError;
use crate::flow::Flow;
use crate::tier::Selections;
use crate::tier::TierSpec;

pub const TIER_STATE: usize = 0;
pub const TIER_DISTRICT: usize = 1;
pub const TIER_SOURCE: usize = 2;
pub const TIER_YEAR: usize = 3;

const TIERS: [TierSpec; 4] = [
    TierSpec {
        key: "state",
        label: "State",
    },
    TierSpec {
        key: "district",
        label: "District",
    },
    TierSpec {
        key: "source",
        label: "Data Source",
    },
    TierSpec {
        key: "year",
        label: "Year",
    },
];

/// One indicator row of the terminal fetch.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct KpiRow {
    pub kpi_id: i64,
    pub kpi_name: String,

    /// Numeric value; some backends store these as strings, so decoding is
    /// lenient.
    #[serde(default, deserialize_with = "lenient_opt_f64")]
    pub kpi_value: Option<f64>,

    #[serde(default)]
    pub unit: Option<String>,

    #[serde(default)]
    pub category: Option<String>,

    pub state_name: String,
    pub district_name: String,
}

/// Accept a number, a numeric string, or null.
fn lenient_opt_f64<'de, D>(deserializer: D) -> Result<Option<f64>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = Option::<serde_json::Value>::deserialize(deserializer)?;
    Ok(match raw {
        None | Some(serde_json::Value::Null) => None,
        Some(serde_json::Value::Number(n)) => n.as_f64(),
        Some(serde_json::Value::String(s)) => s.trim().parse().ok(),
        Some(_) => None,
    })
}

pub struct KpiFlow;

impl Flow for KpiFlow {
    type Results = Vec<KpiRow>;

    fn tiers(&self) -> &'static [TierSpec] {
        &TIERS
    }

    fn prompt(&self, tier: usize, selections: &Selections) -> String {
        match tier {
            TIER_STATE => "Please select a State.".to_string(),
            TIER_DISTRICT => format!(
                "Please select a District in {}.",
                selections.value(TIER_STATE)
            ),
            TIER_SOURCE => "Please select a Data Source.".to_string(),
            _ => "Please select a Year.".to_string(),
        }
    }

    fn empty_options_message(&self, tier: usize, selections: &Selections) -> String {
        match tier {
            TIER_SOURCE => "No data sources available for this district.".to_string(),
            TIER_YEAR => format!(
                "No years available for {} in this district.",
                selections.value(TIER_SOURCE)
            ),
            _ => self.prompt(tier, selections),
        }
    }

    fn options_error_message(
        &self,
        tier: usize,
        selections: &Selections,
        err: &FetchError,
    ) -> String {
        match tier {
            TIER_STATE => format!("Failed to load states. Error: {err}."),
            TIER_DISTRICT => format!(
                "Failed to load districts for {}. Error: {err}.",
                selections.value(TIER_STATE)
            ),
            TIER_SOURCE => {
                format!("Failed to load available sources for selected district. Error: {err}.")
            }
            _ => format!(
                "Failed to load available years for {}. Error: {err}.",
                selections.value(TIER_SOURCE)
            ),
        }
    }

    fn results_is_empty(&self, results: &Self::Results) -> bool {
        results.is_empty()
    }

    fn empty_results_message(&self, _selections: &Selections) -> String {
        "No KPI data found for the selected criteria.".to_string()
    }

    fn results_message(&self, results: &Self::Results, selections: &Selections) -> String {
        // Geographic names come from the returned rows, which carry the
        // canonical spelling; source and year echo the selections.
        let geo = results
            .first()
            .map(|row| (row.state_name.as_str(), row.district_name.as_str()))
            .unwrap_or_default();
        format!(
            "Displaying data for {} > {} > {} > {}",
            geo.0,
            geo.1,
            selections.value(TIER_SOURCE),
            selections.value(TIER_YEAR)
        )
    }

    fn terminal_error_message(&self, _selections: &Selections, err: &FetchError) -> String {
        format!("Failed to load KPI data. Error: {err}.")
    }
}
