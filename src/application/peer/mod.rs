//! Peer cohort selection and averaging.

pub mod averager;
pub mod selector;

pub use averager::average;
pub use selector::select_peers;
