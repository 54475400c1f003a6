//! The [View] holds the set of members a node samples from.
mod view;

pub use view::*;
