//! Pure business rules. No I/O; everything here is synchronous and unit-tested.

pub mod ad_rules;
pub mod listing;
pub mod owner;
pub mod profile_rules;
