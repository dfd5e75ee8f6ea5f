//! The three resolution policies.

pub(crate) mod blind;
pub(crate) mod latest;
pub(crate) mod merge;
