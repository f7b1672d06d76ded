//! Fair random selection: uniform choice among the least-picked members.

use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::SeedableRng;

use super::{Pick, Roster, Standing};

/// Owns the roster table and the RNG that draws from it.
pub struct Selector {
    roster: Roster,
    rng: StdRng,
}

impl Selector {
    pub fn new(roster: Roster) -> Self {
        Self {
            roster,
            rng: StdRng::from_entropy(),
        }
    }

    /// Deterministic draws, for tests and reproducible demos.
    pub fn with_seed(roster: Roster, seed: u64) -> Self {
        Self {
            roster,
            rng: StdRng::seed_from_u64(seed),
        }
    }

    pub fn roster(&self) -> &Roster {
        &self.roster
    }

    /// Choose uniformly among the entries at the minimum pick count and
    /// bump the winner's count. `None` when the roster is empty.
    pub fn pick(&mut self) -> Option<Pick> {
        let candidates = self.roster.candidates();
        let &index = candidates.choose(&mut self.rng)?;
        self.roster.record_pick(index, chrono::Utc::now())
    }

    pub fn standings(&self) -> Vec<Standing> {
        self.roster.standings()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::roster::RosterEntry;
    use std::collections::HashSet;

    fn roster(n: usize) -> Roster {
        Roster::new(
            (0..n)
                .map(|i| RosterEntry::new(format!("U{}", i), format!("Student {}", i), ""))
                .collect(),
        )
    }

    #[test]
    fn test_empty_roster_picks_nothing() {
        let mut selector = Selector::with_seed(Roster::default(), 1);
        assert!(selector.pick().is_none());
    }

    #[test]
    fn test_first_round_visits_everyone_once() {
        let mut selector = Selector::with_seed(roster(6), 42);
        let ids: HashSet<String> = (0..6)
            .map(|_| selector.pick().unwrap().member_id)
            .collect();
        assert_eq!(ids.len(), 6);
        assert!(selector.roster().entries().iter().all(|e| e.count == 1));
    }

    #[test]
    fn test_only_least_picked_is_eligible() {
        let mut entries: Vec<RosterEntry> = roster(3).entries().to_vec();
        entries[0].count = 5;
        entries[1].count = 2;
        entries[2].count = 5;
        let mut selector = Selector::with_seed(Roster::new(entries), 7);
        let pick = selector.pick().unwrap();
        assert_eq!(pick.member_id, "U1");
        assert_eq!(pick.count, 3);
    }

    #[test]
    fn test_pick_stamps_last_picked() {
        let mut selector = Selector::with_seed(roster(1), 3);
        assert!(selector.roster().entries()[0].last_picked.is_none());
        selector.pick().unwrap();
        assert!(selector.roster().entries()[0].last_picked.is_some());
    }

    #[test]
    fn test_same_seed_same_sequence() {
        let mut a = Selector::with_seed(roster(10), 99);
        let mut b = Selector::with_seed(roster(10), 99);
        for _ in 0..25 {
            assert_eq!(a.pick(), b.pick());
        }
    }
}
