use super::{Error, Result};

use std::convert::TryFrom;
use std::time::Duration;

/// Snowball safety and scheduling parameters.
///
/// Parameters are validated when constructed (or deserialized), so an engine can never
/// be started with a nonsensical configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "RawParameters", into = "RawParameters")]
pub struct Parameters {
    /// The fraction of sampled members that must agree on a color for a round to count.
    alpha: f64,
    /// The number of members, out of the known population, to sample with queries.
    sample: usize,
    /// The number of consecutive successful rounds needed to decide.
    beta: usize,
    /// The timeout of the query communication of a round.
    timeout: Duration,
    /// The interval between rounds of the same question.
    interval: Duration,
    /// The number of re-samples when a round fails to get a quorum.
    retries: usize,
}

impl Parameters {
    pub fn new(
        alpha: f64,
        sample: usize,
        beta: usize,
        timeout: Duration,
        interval: Duration,
        retries: usize,
    ) -> Result<Self> {
        if !(alpha > 0.0 && alpha <= 1.0) {
            return Err(Error::InvalidAlpha(alpha));
        }
        if sample < 1 {
            return Err(Error::InvalidSample(sample));
        }
        if beta < 1 {
            return Err(Error::InvalidBeta(beta));
        }
        if timeout == Duration::from_secs(0) || !whole_millis(timeout) {
            return Err(Error::InvalidTimeout);
        }
        if !whole_millis(interval) {
            return Err(Error::InvalidInterval);
        }
        Ok(Parameters { alpha, sample, beta, timeout, interval, retries })
    }

    pub fn alpha(&self) -> f64 {
        self.alpha
    }

    pub fn sample(&self) -> usize {
        self.sample
    }

    pub fn beta(&self) -> usize {
        self.beta
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    pub fn interval(&self) -> Duration {
        self.interval
    }

    pub fn retries(&self) -> usize {
        self.retries
    }

    /// The number of same-colored responses needed to accept a round, `ceil(alpha * k)`.
    ///
    /// This is relative to the requested sample size, not to the number of peers which
    /// actually answered.
    pub fn quorum(&self) -> usize {
        let exact = self.alpha * self.sample as f64;
        let rounded = exact.round();
        // `0.7 * 10` is `7.000000000000001` in floating point
        let quorum = if (exact - rounded).abs() < 1e-9 { rounded } else { exact.ceil() };
        std::cmp::max(quorum as usize, 1)
    }
}

// Durations are stored in milliseconds.
fn whole_millis(duration: Duration) -> bool {
    duration.subsec_nanos() % 1_000_000 == 0
}

impl Default for Parameters {
    fn default() -> Self {
        Parameters {
            alpha: 0.8,
            sample: 20,
            beta: 15,
            timeout: Duration::from_millis(1000),
            interval: Duration::from_millis(50),
            retries: 2,
        }
    }
}

/// The on-disk shape of [Parameters], with durations in milliseconds.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RawParameters {
    pub alpha: f64,
    pub sample: usize,
    pub beta: usize,
    pub timeout_ms: u64,
    #[serde(default)]
    pub interval_ms: u64,
    #[serde(default)]
    pub retries: usize,
}

impl TryFrom<RawParameters> for Parameters {
    type Error = Error;

    fn try_from(raw: RawParameters) -> Result<Self> {
        Parameters::new(
            raw.alpha,
            raw.sample,
            raw.beta,
            Duration::from_millis(raw.timeout_ms),
            Duration::from_millis(raw.interval_ms),
            raw.retries,
        )
    }
}

impl From<Parameters> for RawParameters {
    fn from(params: Parameters) -> Self {
        RawParameters {
            alpha: params.alpha,
            sample: params.sample,
            beta: params.beta,
            timeout_ms: params.timeout.as_millis() as u64,
            interval_ms: params.interval.as_millis() as u64,
            retries: params.retries,
        }
    }
}
