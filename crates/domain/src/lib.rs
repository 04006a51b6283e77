//! Domain entities and invariants.

#![forbid(unsafe_code)]

mod account;
mod eligibility;
mod policy;
mod prefixes;

pub use account::{Account, MILLIS_PER_DAY};
pub use eligibility::{EligibilityRules, ExclusionReason, filter_eligible, filter_eligible_with};
pub use policy::RetentionPolicy;
pub use prefixes::{DEFAULT_EXCLUDED_PREFIXES, ExcludedPrefixes};
