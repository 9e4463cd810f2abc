//! The two selection chains of the application: the referral facility
//! lookup and the KPI dashboard. Both are four-tier instantiations of the
//! same engine with their own wire models and message literals.

pub mod kpi;
pub mod referral;

pub use kpi::KpiFlow;
pub use kpi::KpiRow;
pub use referral::Facility;
pub use referral::FacilityType;
pub use referral::ReferralFlow;
pub use referral::ReferralRequest;
pub use referral::ReferralResults;
