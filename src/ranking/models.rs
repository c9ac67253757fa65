use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::collections::HashMap;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RankingEntry {
    pub member_id: String,
    pub points: i32,
    /// 1-based competition rank, tied entries share a rank
    pub rank: u32,
    /// Join order, breaks ties between equal points
    pub seq: u64,
}

impl RankingEntry {
    fn new(member_id: String, seq: u64) -> Self {
        Self {
            member_id,
            points: 0,
            rank: 0,
            seq,
        }
    }

    fn standing_order(&self, other: &Self) -> Ordering {
        other
            .points
            .cmp(&self.points)
            .then_with(|| self.seq.cmp(&other.seq))
    }
}

/// Standings of a single Kup.
///
/// Entries are kept sorted descending by points with join order as the tie
/// breaker, and ranked with standard competition ranking (1, 1, 3, 4).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RankingTable {
    pub kup_id: String,
    entries: Vec<RankingEntry>,
    next_seq: u64,
    pub updated_at: DateTime<Utc>,
    /// Start time of the full rebuild this table reflects. Gradings after
    /// this instant make the table stale.
    pub as_of: Option<DateTime<Utc>>,
}

impl RankingTable {
    pub fn new(kup_id: impl Into<String>, members: &[String]) -> Self {
        let mut table = Self {
            kup_id: kup_id.into(),
            entries: Vec::with_capacity(members.len()),
            next_seq: 0,
            updated_at: Utc::now(),
            as_of: None,
        };
        for member in members {
            table.push_entry(member.clone());
        }
        table.rerank();
        table
    }

    pub fn entries(&self) -> &[RankingEntry] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn entry(&self, member_id: &str) -> Option<&RankingEntry> {
        self.entries.iter().find(|e| e.member_id == member_id)
    }

    /// Whether results graded at `last_graded_at` are not yet reflected
    pub fn is_stale(&self, last_graded_at: Option<DateTime<Utc>>) -> bool {
        match (last_graded_at, self.as_of) {
            (None, _) => false,
            (Some(_), None) => true,
            (Some(graded), Some(as_of)) => graded >= as_of,
        }
    }

    pub fn top(&self, n: usize) -> Vec<RankingEntry> {
        self.entries.iter().take(n).cloned().collect()
    }

    /// Adds a zero-point entry for a new participant
    pub fn add_member(&mut self, member_id: &str) -> bool {
        if self.entry(member_id).is_some() {
            return false;
        }
        self.push_entry(member_id.to_string());
        self.rerank();
        true
    }

    pub fn remove_member(&mut self, member_id: &str) -> bool {
        let before = self.entries.len();
        self.entries.retain(|e| e.member_id != member_id);
        let removed = self.entries.len() != before;
        if removed {
            self.rerank();
        }
        removed
    }

    /// Replaces every entry's points with the given totals.
    ///
    /// The entry set is reconciled with `members`: missing participants are
    /// added, former ones dropped. Members without a total get zero.
    pub fn rebuild(&mut self, members: &[String], totals: &HashMap<String, i32>) {
        self.entries.retain(|e| members.contains(&e.member_id));
        for member in members {
            if self.entry(member).is_none() {
                self.push_entry(member.clone());
            }
        }
        for entry in &mut self.entries {
            entry.points = totals.get(&entry.member_id).copied().unwrap_or_default();
        }
        self.sort();
        self.rerank();
    }

    /// Adjusts points by per-member deltas.
    ///
    /// Sorting is skipped when the adjusted entries are still in standing
    /// order. Returns true when the order changed. Unknown members are
    /// ignored.
    pub fn apply_deltas(&mut self, deltas: &HashMap<String, i32>) -> bool {
        for entry in &mut self.entries {
            if let Some(delta) = deltas.get(&entry.member_id) {
                entry.points += delta;
            }
        }

        let in_order = self
            .entries
            .windows(2)
            .all(|pair| pair[0].standing_order(&pair[1]) != Ordering::Greater);
        if !in_order {
            self.sort();
        }
        self.rerank();
        !in_order
    }

    /// Assigns competition ranks to the already sorted entries
    pub fn rerank(&mut self) {
        let mut previous: Option<(i32, u32)> = None;
        for (index, entry) in self.entries.iter_mut().enumerate() {
            entry.rank = match previous {
                Some((points, rank)) if points == entry.points => rank,
                _ => index as u32 + 1,
            };
            previous = Some((entry.points, entry.rank));
        }
        self.updated_at = Utc::now();
    }

    fn sort(&mut self) {
        self.entries.sort_by(|a, b| a.standing_order(b));
    }

    fn push_entry(&mut self, member_id: String) {
        let entry = RankingEntry::new(member_id, self.next_seq);
        self.next_seq += 1;
        // New entries have zero points; keep them after members with equal points.
        let position = self
            .entries
            .iter()
            .position(|e| e.standing_order(&entry) == Ordering::Greater)
            .unwrap_or(self.entries.len());
        self.entries.insert(position, entry);
    }
}
