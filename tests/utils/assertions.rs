//! Test assertion helpers - fluent API for verifying standings
#![allow(dead_code)] // Test utilities may not all be used in every test

use std::sync::Arc;

use kupscore::RankingTable;

use super::setup::TestSetup;

// ============================================================================
// Assertion Helpers
// ============================================================================

pub struct RankingAssertion {
    table: Arc<RankingTable>,
}

impl RankingAssertion {
    /// Loads the committed table of a Kup
    pub async fn for_kup(setup: &TestSetup, kup_id: &str) -> Self {
        let table = setup
            .scoring_service
            .ranking_table(kup_id)
            .await
            .expect("Kup should have a ranking table");
        Self { table }
    }

    /// Assert a member's points and rank
    pub fn has_entry(self, member_id: &str, points: i32, rank: u32) -> Self {
        let entry = self
            .table
            .entry(member_id)
            .unwrap_or_else(|| panic!("{} should have a ranking entry", member_id));
        assert_eq!(entry.points, points, "{} has wrong points", member_id);
        assert_eq!(entry.rank, rank, "{} has wrong rank", member_id);
        self
    }

    /// Assert the order of members from first to last
    pub fn in_order(self, members: &[&str]) -> Self {
        let actual: Vec<&str> = self.table.entries().iter().map(|e| e.member_id.as_str()).collect();
        assert_eq!(actual, members, "Standings are in the wrong order");
        self
    }

    pub fn has_participants(self, count: usize) -> Self {
        assert_eq!(self.table.len(), count, "Wrong number of ranking entries");
        self
    }

    pub fn table(&self) -> Arc<RankingTable> {
        self.table.clone()
    }
}
