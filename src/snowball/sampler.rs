use crate::id::Id;
use crate::peer::Peer;

use rand::seq::SliceRandom;

use std::collections::HashSet;

/// The set of members a node currently believes to be reachable.
pub trait Membership {
    fn reachable_members(&self) -> Vec<Peer>;
}

/// Draws the peers queried in one attempt of a round.
///
/// Implementations are shared by every instance and must return an independent sample
/// on each call.
pub trait Sampler {
    /// Returns at most `k` distinct members of `view`, never including `exclude`.
    fn sample(&self, view: &dyn Membership, k: usize, exclude: &Id) -> Vec<Peer>;
}

/// Samples uniformly at random without replacement. When the view holds fewer than `k`
/// eligible members all of them are returned.
#[derive(Debug, Clone, Copy, Default)]
pub struct UniformSampler;

impl Sampler for UniformSampler {
    fn sample(&self, view: &dyn Membership, k: usize, exclude: &Id) -> Vec<Peer> {
        let mut seen = HashSet::new();
        let eligible: Vec<Peer> = view
            .reachable_members()
            .into_iter()
            .filter(|peer| peer.id != *exclude && seen.insert(peer.id))
            .collect();
        let mut rng = rand::thread_rng();
        eligible.choose_multiple(&mut rng, k).cloned().collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Fixed(Vec<Peer>);

    impl Membership for Fixed {
        fn reachable_members(&self) -> Vec<Peer> {
            self.0.clone()
        }
    }

    fn peers(n: u16) -> Vec<Peer> {
        (0..n).map(|i| Peer::from_ip(format!("127.0.0.1:{}", 1000 + i).parse().unwrap())).collect()
    }

    #[test]
    fn test_sample_is_distinct_and_excludes_self() {
        let members = peers(10);
        let self_id = members[3].id;
        let view = Fixed(members.clone());
        for _ in 0..50 {
            let sample = UniformSampler.sample(&view, 5, &self_id);
            assert_eq!(sample.len(), 5);
            let ids: HashSet<Id> = sample.iter().map(|p| p.id).collect();
            assert_eq!(ids.len(), 5);
            assert!(!ids.contains(&self_id));
        }
    }

    #[test]
    fn test_sample_degrades_to_view_size() {
        let members = peers(3);
        let self_id = members[0].id;
        // duplicates in the view are only sampled once
        let mut with_duplicates = members.clone();
        with_duplicates.push(members[1]);
        let view = Fixed(with_duplicates);
        let sample = UniformSampler.sample(&view, 5, &self_id);
        assert_eq!(sample.len(), 2);
        assert!(UniformSampler.sample(&Fixed(vec![]), 5, &self_id).is_empty());
    }

    #[test]
    fn test_sample_covers_the_view() {
        let members = peers(6);
        let view = Fixed(members.clone());
        let mut seen = HashSet::new();
        for _ in 0..200 {
            for peer in UniformSampler.sample(&view, 2, &Id::zero()) {
                seen.insert(peer.id);
            }
        }
        assert_eq!(seen.len(), 6);
    }
}
