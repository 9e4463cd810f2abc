//! Referral facility lookup: State → District → Subdistrict → Facility,
//! terminated by a referral search that asks the backend for the closest
//! next-level facility.

use std::fmt;

use serde::Deserialize;
use serde::Serialize;

use crate::error::FetchError;
use crate::flow::Flow;
use crate::tier::Selections;
use crate::tier::TierSpec;

pub const TIER_STATE: usize = 0;
pub const TIER_DISTRICT: usize = 1;
pub const TIER_SUBDISTRICT: usize = 2;
pub const TIER_FACILITY: usize = 3;

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
        key: "subdistrict",
        label: "Subdistrict",
    },
    TierSpec {
        key: "facility",
        label: "Facility",
    },
];

/// Facility-type ladder used for display context on the referral page.
///
/// The actual "next level" computation happens server-side; this enum only
/// labels what the backend already decided.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum FacilityType {
    SubCentre,
    PrimaryHealthCentre,
    CommunityHealthCentre,
    SubdivisionalHospital,
    DistrictHospital,
    MedicalCollege,
}

impl FacilityType {
    /// Parse the backend's type code (e.g. `SUB_CEN`, `S_T_H`).
    pub fn parse(code: &str) -> Option<Self> {
        match code.trim() {
            "SUB_CEN" => Some(FacilityType::SubCentre),
            "PHC" => Some(FacilityType::PrimaryHealthCentre),
            "CHC" => Some(FacilityType::CommunityHealthCentre),
            "S_T_H" => Some(FacilityType::SubdivisionalHospital),
            "District Hospital" => Some(FacilityType::DistrictHospital),
            "Medical College" => Some(FacilityType::MedicalCollege),
            _ => None,
        }
    }

    pub fn code(self) -> &'static str {
        match self {
            FacilityType::SubCentre => "SUB_CEN",
            FacilityType::PrimaryHealthCentre => "PHC",
            FacilityType::CommunityHealthCentre => "CHC",
            FacilityType::SubdivisionalHospital => "S_T_H",
            FacilityType::DistrictHospital => "District Hospital",
            FacilityType::MedicalCollege => "Medical College",
        }
    }

    /// The tier a patient is referred up to, if any.
    pub fn next_level(self) -> Option<FacilityType> {
        match self {
            FacilityType::SubCentre => Some(FacilityType::PrimaryHealthCentre),
            FacilityType::PrimaryHealthCentre => Some(FacilityType::CommunityHealthCentre),
            FacilityType::CommunityHealthCentre => Some(FacilityType::SubdivisionalHospital),
            FacilityType::SubdivisionalHospital => Some(FacilityType::DistrictHospital),
            FacilityType::DistrictHospital => Some(FacilityType::MedicalCollege),
            FacilityType::MedicalCollege => None,
        }
    }
}

impl fmt::Display for FacilityType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

/// One facility as returned by the referral endpoint. The backend keys
/// these objects with spreadsheet-style column names.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Facility {
    #[serde(rename = "Facility Name")]
    pub name: String,

    #[serde(rename = "Facility Type")]
    pub facility_type: String,

    #[serde(rename = "District Name", default)]
    pub district: String,

    #[serde(rename = "Latitude", default)]
    pub latitude: Option<f64>,

    #[serde(rename = "Longitude", default)]
    pub longitude: Option<f64>,

    /// Only present on next-level entries, computed by the backend.
    #[serde(rename = "Distance (km)", default)]
    pub distance_km: Option<f64>,
}

/// Body of `POST /api/referral`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReferralRequest {
    pub selected_state: String,
    pub selected_district: String,
    pub selected_subdistrict: String,
    pub selected_facility_name: String,
}

impl ReferralRequest {
    pub fn from_selections(selections: &Selections) -> Self {
        Self {
            selected_state: selections.value(TIER_STATE).to_string(),
            selected_district: selections.value(TIER_DISTRICT).to_string(),
            selected_subdistrict: selections.value(TIER_SUBDISTRICT).to_string(),
            selected_facility_name: selections.value(TIER_FACILITY).to_string(),
        }
    }
}

/// Payload of a successful referral search. The next-level fields are
/// absent when the start facility is already at the top of the ladder or
/// the district has no higher-level facility.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReferralResults {
    pub start_facility: Facility,

    #[serde(default)]
    pub closest_next_level_facility: Option<Facility>,

    /// Sorted by ascending distance by the backend.
    #[serde(default)]
    pub all_next_level_facilities: Vec<Facility>,
}

pub struct ReferralFlow;

impl Flow for ReferralFlow {
    type Results = ReferralResults;

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
            TIER_SUBDISTRICT => "Please select a Subdistrict.".to_string(),
            _ => "Please select a Facility.".to_string(),
        }
    }

    fn options_error_message(
        &self,
        tier: usize,
        _selections: &Selections,
        err: &FetchError,
    ) -> String {
        let what = match tier {
            TIER_STATE => "states",
            TIER_DISTRICT => "districts",
            TIER_SUBDISTRICT => "subdistricts",
            _ => "facility names",
        };
        format!("Failed to load {what} from API. Error: {err}.")
    }

    fn results_is_empty(&self, results: &Self::Results) -> bool {
        results.closest_next_level_facility.is_none() && results.all_next_level_facilities.is_empty()
    }

    fn empty_results_message(&self, selections: &Selections) -> String {
        format!(
            "No next-level facilities found for {}.",
            selections.value(TIER_FACILITY)
        )
    }

    fn results_message(&self, _results: &Self::Results, selections: &Selections) -> String {
        format!(
            "Displaying referral results for {}.",
            selections.value(TIER_FACILITY)
        )
    }

    fn terminal_error_message(&self, _selections: &Selections, err: &FetchError) -> String {
        match err {
            // The backend sends a human-readable `{error}` body on failure;
            // show it verbatim.
            FetchError::Backend(message) => message.clone(),
            _ => format!("Failed to perform referral search. Error: {err}."),
        }
    }
}
