//! Cascading-selection engine for the healthcare-data client.
//!
//! A [`CascadeController`] owns an ordered chain of dependent selection
//! tiers (State → District → …). Selecting a value in one tier atomically
//! clears everything downstream and hands the caller a [`FetchTicket`]
//! describing the next fetch to run. The controller never performs I/O
//! itself: the caller executes the fetch and feeds the outcome back through
//! [`CascadeController::apply_options`] / [`CascadeController::apply_terminal`],
//! where a per-tier generation counter silently discards responses that
//! arrive after the triggering selection has been superseded.
//!
//! The referral facility lookup and the KPI dashboard are instantiations
//! of the same engine with different [`Flow`] implementations; see
//! [`flows`].

mod controller;
mod error;
mod flow;
pub mod flows;
pub mod grouping;
mod tier;

pub use controller::ApplyOutcome;
pub use controller::CascadeController;
pub use controller::FetchTarget;
pub use controller::FetchTicket;
pub use controller::Status;
pub use error::FetchError;
pub use flow::Flow;
pub use tier::OptionItem;
pub use tier::Selections;
pub use tier::TierSpec;
