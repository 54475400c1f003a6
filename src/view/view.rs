use crate::colored::Colorize;
use crate::id::Id;
use crate::peer::Peer;
use crate::snowball::Membership;

use tracing::debug;

use std::collections::HashMap;
use std::sync::{RwLock, RwLockReadGuard, RwLockWriteGuard};
use std::time::{Duration, Instant};

/// How long a member which refused a connection is left out of samples.
const UNREACHABLE_COOLDOWN: Duration = Duration::from_secs(5);

#[derive(Debug, Clone)]
struct Member {
    peer: Peer,
    /// Set while the member is considered unreachable.
    unreachable_since: Option<Instant>,
}

/// The members known to this node.
///
/// The view is shared between the node setup (which seeds it), the transport (which
/// reports unreachable members) and every round in flight (which reads it), so the table
/// sits behind a lock. The node itself is never a member. An unreachable member is
/// sampled again once `cooldown` has passed, so a restarted peer is eventually retried.
#[derive(Debug)]
pub struct View {
    self_id: Id,
    cooldown: Duration,
    members: RwLock<HashMap<Id, Member>>,
}

impl View {
    pub fn new(self_id: Id) -> Self {
        Self::with_cooldown(self_id, UNREACHABLE_COOLDOWN)
    }

    pub fn with_cooldown(self_id: Id, cooldown: Duration) -> Self {
        View { self_id, cooldown, members: RwLock::new(HashMap::new()) }
    }

    // A panicking writer leaves the table consistent: every write is a single map operation.
    fn read(&self) -> RwLockReadGuard<'_, HashMap<Id, Member>> {
        self.members.read().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    fn write(&self) -> RwLockWriteGuard<'_, HashMap<Id, Member>> {
        self.members.write().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    /// Seeds the view, returns the number of new members.
    pub fn init(&self, peers: Vec<Peer>) -> usize {
        peers.into_iter().filter(|peer| self.insert(*peer)).count()
    }

    /// Returns `false` if the peer is this node or was already known under the same address.
    pub fn insert(&self, peer: Peer) -> bool {
        if peer.id == self.self_id {
            return false;
        }
        let mut members = self.write();
        match members.insert(peer.id, Member { peer, unreachable_since: None }) {
            Some(previous) if previous.peer == peer => false,
            _ => {
                debug!("[{}] inserted {}", "view".yellow(), peer);
                true
            }
        }
    }

    /// Leaves a member out of samples for the cooldown, or until it is marked reachable.
    pub fn mark_unreachable(&self, id: &Id) -> bool {
        match self.write().get_mut(id) {
            Some(member) => {
                if member.unreachable_since.is_none() {
                    debug!("[{}] {} unreachable", "view".yellow(), member.peer);
                }
                member.unreachable_since = Some(Instant::now());
                true
            }
            None => false,
        }
    }

    pub fn mark_reachable(&self, id: &Id) -> bool {
        // read first: answering peers are marked on every query
        match self.read().get(id) {
            Some(member) if member.unreachable_since.is_none() => return true,
            Some(_) => (),
            None => return false,
        }
        match self.write().get_mut(id) {
            Some(member) => {
                debug!("[{}] {} reachable", "view".yellow(), member.peer);
                member.unreachable_since = None;
                true
            }
            None => false,
        }
    }

    /// The number of known members, reachable or not.
    pub fn len(&self) -> usize {
        self.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.read().is_empty()
    }

    pub fn peers(&self) -> Vec<Peer> {
        self.read().values().map(|member| member.peer).collect()
    }
}

impl Membership for View {
    fn reachable_members(&self) -> Vec<Peer> {
        self.read()
            .values()
            .filter(|member| match member.unreachable_since {
                Some(since) => since.elapsed() >= self.cooldown,
                None => true,
            })
            .map(|member| member.peer)
            .collect()
    }
}
