use crate::id::Id;

use std::collections::{HashMap, HashSet};

/// Counts the colors reported during one attempt of a round.
///
/// Each responder is counted at most once. A color wins the attempt when its count
/// reaches the quorum, which is fixed up-front from the requested sample size.
#[derive(Debug, Clone)]
pub struct Tally<C: Eq + std::hash::Hash + Clone> {
    quorum: usize,
    responders: HashSet<Id>,
    votes: HashMap<C, usize>,
}

impl<C> std::fmt::Display for Tally<C>
where
    C: Eq + std::hash::Hash + Clone + std::fmt::Debug,
{
    fn fmt(&self, fmt: &mut std::fmt::Formatter) -> std::fmt::Result {
        write!(fmt, "T(q = {}, n = {}) {:?}", self.quorum, self.responders.len(), self.votes)
    }
}

impl<C> Tally<C>
where
    C: Eq + std::hash::Hash + Clone,
{
    pub fn new(quorum: usize) -> Self {
        Tally { quorum, responders: HashSet::new(), votes: HashMap::new() }
    }

    /// The number of responses counted so far.
    pub fn len(&self) -> usize {
        self.responders.len()
    }

    pub fn is_empty(&self) -> bool {
        self.responders.is_empty()
    }

    pub fn contains(&self, responder: &Id) -> bool {
        self.responders.contains(responder)
    }

    /// Records the vote of `responder`. Returns `false` for a duplicate responder.
    pub fn insert(&mut self, responder: Id, color: C) -> bool {
        if !self.responders.insert(responder) {
            return false;
        }
        *self.votes.entry(color).or_insert(0) += 1;
        true
    }

    pub fn count(&self, color: &C) -> usize {
        self.votes.get(color).cloned().unwrap_or(0)
    }

    /// The color holding a quorum, if any.
    ///
    /// With `alpha <= 0.5` two colors may both reach the quorum; a tie at the top is then
    /// treated as a split vote and no color wins.
    pub fn decide(&self) -> Option<C> {
        let mut best: Option<(&C, usize)> = None;
        let mut tied = false;
        for (color, n) in self.votes.iter() {
            match best {
                Some((_, m)) if *n < m => (),
                Some((_, m)) if *n == m => tied = true,
                _ => {
                    best = Some((color, *n));
                    tied = false;
                }
            }
        }
        match best {
            Some((color, n)) if n >= self.quorum && !tied => Some(color.clone()),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tally(quorum: usize, votes: &[char]) -> Tally<char> {
        let mut t = Tally::new(quorum);
        for (i, c) in votes.iter().enumerate() {
            assert!(t.insert(Id::new(&[i as u8]), *c));
        }
        t
    }

    #[test]
    fn test_quorum_sensitivity() {
        // sample = 5, alpha = 0.6 => quorum = 3
        assert_eq!(tally(3, &['A', 'A', 'A', 'B']).decide(), Some('A'));
        assert_eq!(tally(3, &['A', 'A', 'B', 'B']).decide(), None);
        assert_eq!(tally(3, &[]).decide(), None);
        assert_eq!(tally(3, &['B', 'B', 'B', 'B', 'A']).decide(), Some('B'));
    }

    #[test]
    fn test_duplicate_responder() {
        let mut t = Tally::new(2);
        let id = Id::new(b"responder");
        assert!(t.insert(id, 'A'));
        assert!(!t.insert(id, 'A'));
        assert!(t.contains(&id));
        assert_eq!(t.len(), 1);
        assert_eq!(t.count(&'A'), 1);
        assert_eq!(t.decide(), None);
    }

    #[test]
    fn test_split_at_low_alpha() {
        // alpha = 0.4 of 5 => quorum 2, both colors reach it
        assert_eq!(tally(2, &['A', 'A', 'B', 'B']).decide(), None);
        assert_eq!(tally(2, &['A', 'A', 'B', 'B', 'B']).decide(), Some('B'));
    }
}
