//! Core domain entities for netprofile.
//!
//! A [`Profile`] is a named network configuration record. Each one carries a
//! [`ProfileId`] that stays stable for the lifetime of the record, so callers can
//! hold on to it across insertions and removals without it silently pointing at
//! a different record.

mod profile;
mod profile_id;

pub use profile::{Mode, Profile};
pub use profile_id::ProfileId;
