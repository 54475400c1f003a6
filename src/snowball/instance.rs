use std::collections::HashMap;

/// The state of one Snowball decision.
///
/// An `Instance` is pure state: it is fed the result of every round through
/// [transition][Instance::transition] and never performs I/O. It has exactly one
/// writer (the round loop of its question); everyone else reads [Snapshot]s.
#[derive(Debug, Clone)]
pub struct Instance<C: Eq + std::hash::Hash + Clone> {
    /// Accumulated number of successful rounds per color.
    confidence: HashMap<C, usize>,
    /// The currently preferred color (`None` until the first successful round).
    preferred: Option<C>,
    /// Consecutive rounds confirming `preferred`.
    streak: usize,
    /// The finalization threshold.
    beta: usize,
    decided: bool,
}

/// A consistent, immutable view of an [Instance].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Snapshot<C> {
    pub preferred: Option<C>,
    pub streak: usize,
    pub decided: bool,
}

impl<C> Default for Snapshot<C> {
    fn default() -> Self {
        Snapshot { preferred: None, streak: 0, decided: false }
    }
}

impl<C> Instance<C>
where
    C: Eq + std::hash::Hash + Clone,
{
    pub fn new(beta: usize) -> Self {
        Instance { confidence: HashMap::new(), preferred: None, streak: 0, beta, decided: false }
    }

    /// Applies the outcome of one round.
    ///
    /// `None` is a stall (no quorum after all retries) and leaves the instance untouched.
    /// A decided instance ignores every further round.
    pub fn transition(&mut self, result: Option<C>) {
        if self.decided {
            return;
        }
        let color = match result {
            Some(color) => color,
            None => return,
        };
        let count = {
            let count = self.confidence.entry(color.clone()).or_insert(0);
            *count += 1;
            *count
        };
        match self.preferred.clone() {
            None => {
                self.preferred = Some(color);
                self.streak = 1;
            }
            Some(preferred) => {
                if count > self.confidence(&preferred) {
                    // The competing color has overtaken the incumbent
                    self.preferred = Some(color);
                    self.streak = 1;
                } else if color == preferred {
                    self.streak += 1;
                } else {
                    // A minority result breaks the run without switching
                    self.streak = 1;
                }
            }
        }
        if self.streak >= self.beta {
            self.decided = true;
        }
    }

    /// The confidence accumulated by `color` (zero if never observed).
    pub fn confidence(&self, color: &C) -> usize {
        self.confidence.get(color).cloned().unwrap_or(0)
    }

    pub fn preferred(&self) -> Option<&C> {
        self.preferred.as_ref()
    }

    pub fn streak(&self) -> usize {
        self.streak
    }

    pub fn is_decided(&self) -> bool {
        self.decided
    }

    /// The final color, once decided.
    pub fn decision(&self) -> Option<&C> {
        if self.decided {
            self.preferred.as_ref()
        } else {
            None
        }
    }

    pub fn snapshot(&self) -> Snapshot<C> {
        Snapshot { preferred: self.preferred.clone(), streak: self.streak, decided: self.decided }
    }
}
