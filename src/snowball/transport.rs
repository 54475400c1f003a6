use crate::id::Id;
use crate::peer::Peer;

use super::Color;

use std::future::Future;
use std::pin::Pin;

use tokio::time::Instant;

pub type QueryFuture = Pin<Box<dyn Future<Output = Option<Color>>>>;

/// Asks a peer for its current preference on a question.
///
/// The returned future resolves to `None` when the peer abstains, is unreachable, or
/// misses `deadline`. Callers also enforce the deadline, so an implementation may
/// resolve late without holding up a round. Many queries are in flight at once.
pub trait Transport {
    fn query(&self, peer: &Peer, question: Id, deadline: Instant) -> QueryFuture;
}
