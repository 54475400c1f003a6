//! Snowball: a metastable decision engine.
//!
//! Every question is decided by its own [Instance], which is fed one quorum result per
//! round by the [RoundDriver]. The [Engine] actor owns the instances, schedules their
//! rounds and answers the preference queries of other nodes.
mod color;
mod engine;
mod instance;
mod params;
mod round;
mod sampler;
mod tally;
mod transport;

pub use color::Color;
pub use engine::*;
pub use instance::{Instance, Snapshot};
pub use params::Parameters;
pub use round::{ColorSet, RoundDriver};
pub use sampler::{Membership, Sampler, UniformSampler};
pub use tally::Tally;
pub use transport::{QueryFuture, Transport};

#[derive(Debug, Clone, PartialEq)]
pub enum Error {
    /// `alpha` must lie in `(0, 1]`
    InvalidAlpha(f64),
    /// At least one peer must be sampled per round
    InvalidSample(usize),
    /// At least one successful round is needed to decide
    InvalidBeta(usize),
    /// A round needs a non-zero response window of whole milliseconds
    InvalidTimeout,
    /// Durations are kept in whole milliseconds
    InvalidInterval,
}

impl std::error::Error for Error {}

impl std::fmt::Display for Error {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        write!(f, "{:?}", self)
    }
}

pub type Result<T> = std::result::Result<T, Error>;
