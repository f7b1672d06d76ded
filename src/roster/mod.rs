pub mod builder;
pub mod selector;

pub use builder::{build_roster, RosterFilter};
pub use selector::Selector;

use chrono::{DateTime, Utc};
use serde::Serialize;

/// One member eligible to be called on.
#[derive(Debug, Clone, PartialEq)]
pub struct RosterEntry {
    pub member_id: String,
    pub username: Option<String>,
    pub name: String,
    pub avatar_url: String,
    pub count: u32,
    pub last_picked: Option<DateTime<Utc>>,
}

impl RosterEntry {
    pub fn new(member_id: impl Into<String>, name: impl Into<String>, avatar_url: impl Into<String>) -> Self {
        Self {
            member_id: member_id.into(),
            username: None,
            name: name.into(),
            avatar_url: avatar_url.into(),
            count: 0,
            last_picked: None,
        }
    }
}

/// Result of a selection.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Pick {
    pub member_id: String,
    pub name: String,
    pub avatar_url: String,
    /// Pick count after this selection.
    pub count: u32,
}

/// Per-member tally exposed by `/standings`.
#[derive(Debug, Clone, Serialize)]
pub struct Standing {
    pub name: String,
    pub username: Option<String>,
    pub count: u32,
    pub last_picked: Option<DateTime<Utc>>,
}

/// The in-memory roster table. Order is the order members were fetched in.
#[derive(Debug, Clone, Default)]
pub struct Roster {
    entries: Vec<RosterEntry>,
}

impl Roster {
    pub fn new(entries: Vec<RosterEntry>) -> Self {
        Self { entries }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn entries(&self) -> &[RosterEntry] {
        &self.entries
    }

    pub fn min_count(&self) -> Option<u32> {
        self.entries.iter().map(|e| e.count).min()
    }

    /// Indices of every entry sitting at the minimum pick count.
    pub fn candidates(&self) -> Vec<usize> {
        let Some(min) = self.min_count() else {
            return Vec::new();
        };
        self.entries
            .iter()
            .enumerate()
            .filter(|(_, e)| e.count == min)
            .map(|(i, _)| i)
            .collect()
    }

    fn record_pick(&mut self, index: usize, at: DateTime<Utc>) -> Option<Pick> {
        let entry = self.entries.get_mut(index)?;
        entry.count = entry.count.saturating_add(1);
        entry.last_picked = Some(at);
        Some(Pick {
            member_id: entry.member_id.clone(),
            name: entry.name.clone(),
            avatar_url: entry.avatar_url.clone(),
            count: entry.count,
        })
    }

    pub fn standings(&self) -> Vec<Standing> {
        self.entries
            .iter()
            .map(|e| Standing {
                name: e.name.clone(),
                username: e.username.clone(),
                count: e.count,
                last_picked: e.last_picked,
            })
            .collect()
    }
}

/// Keep the entries whose mask slot is `true`. Entries past the end of the
/// mask are kept.
pub fn apply_keep_mask(entries: Vec<RosterEntry>, keep: &[bool]) -> Vec<RosterEntry> {
    entries
        .into_iter()
        .enumerate()
        .filter(|(i, _)| keep.get(*i).copied().unwrap_or(true))
        .map(|(_, e)| e)
        .collect()
}
