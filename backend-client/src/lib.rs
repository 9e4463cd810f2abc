//! HTTP client for the healthcare-data REST backend.
//!
//! Thin `reqwest` wrapper exposing the referral and KPI endpoint families,
//! plus ticket-driven dispatch helpers so a caller holding a
//! [`FetchTicket`](healthnav_cascade::FetchTicket) can resolve it with one
//! call. Every request carries a bounded timeout; failures are mapped into
//! the engine's [`FetchError`] taxonomy.

use std::time::Duration;

use anyhow::Context;
use anyhow::Result;
use anyhow::anyhow;
use serde::Deserialize;
use serde::de::DeserializeOwned;
use tracing::debug;
use url::Url;

use healthnav_cascade::FetchError;
use healthnav_cascade::OptionItem;
use healthnav_cascade::Selections;
use healthnav_cascade::flows::KpiRow;
use healthnav_cascade::flows::ReferralRequest;
use healthnav_cascade::flows::ReferralResults;
use healthnav_cascade::flows::kpi;
use healthnav_cascade::flows::referral;

/// Default backend location for local development.
pub const DEFAULT_BASE_URL: &str = "http://localhost:5000";

const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

#[derive(Clone)]
pub struct BackendClient {
    http: reqwest::Client,
    base_url: Url,
}

impl BackendClient {
    pub fn new(base_url: &str) -> Result<Self> {
        Self::with_timeout(base_url, DEFAULT_TIMEOUT)
    }

    pub fn with_timeout(base_url: &str, timeout: Duration) -> Result<Self> {
        let base_url = Url::parse(base_url)
            .with_context(|| format!("invalid backend base URL: {base_url}"))?;
        if base_url.cannot_be_a_base() {
            return Err(anyhow!("backend base URL cannot carry paths: {base_url}"));
        }
        let http = reqwest::Client::builder().timeout(timeout).build()?;
        Ok(Self { http, base_url })
    }

    // --- Referral endpoints ---

    pub async fn referral_states(&self) -> Result<Vec<String>, FetchError> {
        self.get_json(self.path_url(&["api", "states"])).await
    }

    pub async fn referral_districts(&self, state: &str) -> Result<Vec<String>, FetchError> {
        self.get_json(self.path_url(&["api", "districts", state]))
            .await
    }

    pub async fn referral_subdistricts(
        &self,
        state: &str,
        district: &str,
    ) -> Result<Vec<String>, FetchError> {
        self.get_json(self.path_url(&["api", "subdistricts", state, district]))
            .await
    }

    pub async fn referral_facilities(
        &self,
        state: &str,
        district: &str,
        subdistrict: &str,
    ) -> Result<Vec<String>, FetchError> {
        self.get_json(self.path_url(&["api", "facilities", state, district, subdistrict]))
            .await
    }

    /// `POST /api/referral`. A non-2xx response normally carries a JSON
    /// `{error}` body, which is surfaced as [`FetchError::Backend`].
    pub async fn referral_search(
        &self,
        request: &ReferralRequest,
    ) -> Result<ReferralResults, FetchError> {
        let url = self.path_url(&["api", "referral"]);
        debug!(%url, "POST referral search");
        let resp = self
            .http
            .post(url)
            .json(request)
            .send()
            .await
            .map_err(into_fetch_error)?;
        let status = resp.status();
        if !status.is_success() {
            let body = resp.text().await.unwrap_or_default();
            if let Ok(api_error) = serde_json::from_str::<ApiErrorBody>(&body) {
                return Err(FetchError::Backend(api_error.error));
            }
            return Err(FetchError::Http {
                status: status.as_u16(),
                body,
            });
        }
        resp.json()
            .await
            .map_err(|err| FetchError::Decode(err.to_string()))
    }

    // --- KPI endpoints (all under /api/kpi) ---

    pub async fn kpi_states(&self) -> Result<Vec<OptionItem>, FetchError> {
        let rows: Vec<StateRow> = self.get_json(self.path_url(&["api", "kpi", "states"])).await?;
        Ok(rows
            .into_iter()
            .map(|row| OptionItem::plain(row.state_name))
            .collect())
    }

    pub async fn kpi_districts(&self, state: &str) -> Result<Vec<OptionItem>, FetchError> {
        let mut url = self.path_url(&["api", "kpi", "districts"]);
        url.query_pairs_mut().append_pair("state", state);
        let rows: Vec<DistrictRow> = self.get_json(url).await?;
        Ok(rows
            .into_iter()
            .map(|row| OptionItem::new(row.district_id.to_string(), row.district_name))
            .collect())
    }

    pub async fn kpi_sources(&self, district_id: &str) -> Result<Vec<OptionItem>, FetchError> {
        let mut url = self.path_url(&["api", "kpi", "available-sources"]);
        url.query_pairs_mut().append_pair("districtId", district_id);
        let sources: Vec<String> = self.get_json(url).await?;
        Ok(sources.into_iter().map(OptionItem::plain).collect())
    }

    pub async fn kpi_years(
        &self,
        district_id: &str,
        source: &str,
    ) -> Result<Vec<OptionItem>, FetchError> {
        let mut url = self.path_url(&["api", "kpi", "available-years"]);
        url.query_pairs_mut()
            .append_pair("districtId", district_id)
            .append_pair("source", source);
        let years: Vec<serde_json::Value> = self.get_json(url).await?;
        Ok(years.iter().filter_map(year_option).collect())
    }

    pub async fn kpi_data(
        &self,
        district_id: &str,
        source: &str,
        year: &str,
    ) -> Result<Vec<KpiRow>, FetchError> {
        let mut url = self.path_url(&["api", "kpi", "kpi-data"]);
        url.query_pairs_mut()
            .append_pair("districtId", district_id)
            .append_pair("source", source)
            .append_pair("year", year);
        self.get_json(url).await
    }

    // --- Ticket-driven dispatch ---

    /// Resolve an options ticket of the referral flow.
    pub async fn referral_options(
        &self,
        tier: usize,
        selections: &Selections,
    ) -> Result<Vec<OptionItem>, FetchError> {
        let state = selections.value(referral::TIER_STATE);
        let district = selections.value(referral::TIER_DISTRICT);
        let subdistrict = selections.value(referral::TIER_SUBDISTRICT);
        let names = match tier {
            referral::TIER_STATE => self.referral_states().await?,
            referral::TIER_DISTRICT => self.referral_districts(state).await?,
            referral::TIER_SUBDISTRICT => self.referral_subdistricts(state, district).await?,
            referral::TIER_FACILITY => {
                self.referral_facilities(state, district, subdistrict).await?
            }
            _ => {
                return Err(FetchError::Transport(format!(
                    "no referral options endpoint for tier {tier}"
                )));
            }
        };
        Ok(names.into_iter().map(OptionItem::plain).collect())
    }

    /// Resolve the referral flow's terminal ticket.
    pub async fn referral_search_for(
        &self,
        selections: &Selections,
    ) -> Result<ReferralResults, FetchError> {
        self.referral_search(&ReferralRequest::from_selections(selections))
            .await
    }

    /// Resolve an options ticket of the KPI flow.
    pub async fn kpi_options(
        &self,
        tier: usize,
        selections: &Selections,
    ) -> Result<Vec<OptionItem>, FetchError> {
        match tier {
            kpi::TIER_STATE => self.kpi_states().await,
            kpi::TIER_DISTRICT => self.kpi_districts(selections.value(kpi::TIER_STATE)).await,
            kpi::TIER_SOURCE => self.kpi_sources(selections.value(kpi::TIER_DISTRICT)).await,
            kpi::TIER_YEAR => {
                self.kpi_years(
                    selections.value(kpi::TIER_DISTRICT),
                    selections.value(kpi::TIER_SOURCE),
                )
                .await
            }
            _ => Err(FetchError::Transport(format!(
                "no KPI options endpoint for tier {tier}"
            ))),
        }
    }

    /// Resolve the KPI flow's terminal ticket.
    pub async fn kpi_data_for(&self, selections: &Selections) -> Result<Vec<KpiRow>, FetchError> {
        self.kpi_data(
            selections.value(kpi::TIER_DISTRICT),
            selections.value(kpi::TIER_SOURCE),
            selections.value(kpi::TIER_YEAR),
        )
        .await
    }

    // --- Plumbing ---

    /// Build `base_url` + percent-encoded path segments. Referral path
    /// parameters are user-visible place names, so encoding matters.
    fn path_url(&self, segments: &[&str]) -> Url {
        let mut url = self.base_url.clone();
        if let Ok(mut path) = url.path_segments_mut() {
            path.pop_if_empty();
            for segment in segments {
                path.push(segment);
            }
        }
        url
    }

    async fn get_json<T: DeserializeOwned>(&self, url: Url) -> Result<T, FetchError> {
        debug!(%url, "GET");
        let resp = self.http.get(url).send().await.map_err(into_fetch_error)?;
        let status = resp.status();
        if !status.is_success() {
            let body = resp.text().await.unwrap_or_default();
            return Err(FetchError::Http {
                status: status.as_u16(),
                body,
            });
        }
        resp.json()
            .await
            .map_err(|err| FetchError::Decode(err.to_string()))
    }
}

fn into_fetch_error(err: reqwest::Error) -> FetchError {
    if err.is_timeout() {
        FetchError::Timeout
    } else {
        FetchError::Transport(err.to_string())
    }
}

/// Years arrive as JSON numbers or strings depending on how the backend
/// stores them; normalize either into a plain option.
fn year_option(value: &serde_json::Value) -> Option<OptionItem> {
    match value {
        serde_json::Value::Number(n) => Some(OptionItem::plain(n.to_string())),
        serde_json::Value::String(s) => Some(OptionItem::plain(s.clone())),
        _ => None,
    }
}

#[derive(Deserialize)]
struct ApiErrorBody {
    error: String,
}

#[derive(Deserialize)]
struct StateRow {
    state_name: String,
}

#[derive(Deserialize)]
struct DistrictRow {
    district_id: i64,
    district_name: String,
}
