use crate::colored::Colorize;
use crate::id::Id;

use super::sampler::{Membership, Sampler};
use super::tally::Tally;
use super::transport::Transport;
use super::{Color, Parameters};

use futures::future::join_all;
use tokio::time::{sleep_until, timeout_at, Instant};
use tracing::debug;

use std::collections::HashSet;
use std::iter::FromIterator;
use std::sync::Arc;

/// The legal colors of a question. An empty set admits every color.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ColorSet(HashSet<Color>);

impl ColorSet {
    pub fn any() -> Self {
        ColorSet(HashSet::new())
    }

    pub fn admits(&self, color: &Color) -> bool {
        self.0.is_empty() || self.0.contains(color)
    }

    pub fn is_unrestricted(&self) -> bool {
        self.0.is_empty()
    }
}

impl FromIterator<Color> for ColorSet {
    fn from_iter<I: IntoIterator<Item = Color>>(iter: I) -> Self {
        ColorSet(iter.into_iter().collect())
    }
}

/// Runs query rounds: sample, query, tally, retry.
///
/// The driver holds no per-question state and is shared by the round loops of every
/// question on a node.
pub struct RoundDriver {
    params: Parameters,
    /// The identity of this node, never sampled.
    node_id: Id,
    view: Arc<dyn Membership>,
    sampler: Arc<dyn Sampler>,
    transport: Arc<dyn Transport>,
}

impl RoundDriver {
    pub fn new(
        params: Parameters,
        node_id: Id,
        view: Arc<dyn Membership>,
        sampler: Arc<dyn Sampler>,
        transport: Arc<dyn Transport>,
    ) -> Self {
        RoundDriver { params, node_id, view, sampler, transport }
    }

    pub fn params(&self) -> &Parameters {
        &self.params
    }

    pub fn node_id(&self) -> Id {
        self.node_id
    }

    /// Runs one round for `question` and returns the color which obtained a quorum, or
    /// `None` if every one of the `retries + 1` attempts fell short.
    ///
    /// Each attempt draws a fresh sample and gets a fresh `timeout`. Responses which miss
    /// the deadline, abstain, or name a color outside `colors` are not counted.
    pub async fn run_round(&self, question: Id, colors: &ColorSet) -> Option<Color> {
        let quorum = self.params.quorum();
        let attempts = self.params.retries() + 1;
        for attempt in 1..=attempts {
            let deadline = Instant::now() + self.params.timeout();
            let peers = self.sampler.sample(self.view.as_ref(), self.params.sample(), &self.node_id);
            if peers.is_empty() {
                debug!(
                    "[{}] {} attempt {}/{}: nobody to sample",
                    "snowball".cyan(),
                    question,
                    attempt,
                    attempts
                );
                // Nobody can answer within this window either
                sleep_until(deadline).await;
                continue;
            }

            let queries = peers.iter().map(|peer| {
                let responder = peer.id;
                let query = self.transport.query(peer, question, deadline);
                async move { (responder, timeout_at(deadline, query).await.ok().flatten()) }
            });
            let responses = join_all(queries).await;

            let mut tally = Tally::new(quorum);
            for (responder, response) in responses {
                match response {
                    Some(color) if colors.admits(&color) => {
                        let _ = tally.insert(responder, color);
                    }
                    Some(color) => {
                        debug!("[{}] {} voted illegal color {}", "snowball".cyan(), responder, color)
                    }
                    None => (),
                }
            }
            if let Some(color) = tally.decide() {
                return Some(color);
            }
            debug!(
                "[{}] {} attempt {}/{}: no quorum of {} in {}/{} responses {}",
                "snowball".cyan(),
                question,
                attempt,
                attempts,
                quorum,
                tally.len(),
                peers.len(),
                tally
            );
        }
        None
    }
}
