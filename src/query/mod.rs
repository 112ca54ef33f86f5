//! Non-persistent geometric queries: clipping and plane cuts.

pub mod clip;
pub mod split;
