//! Terminal front end for the referral lookup and KPI dashboard flows.

mod interactive;
pub mod render;

pub use interactive::run_kpi;
pub use interactive::run_referral;
