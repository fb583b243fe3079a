//! World-wide counters and the narrative news feed.

use eco_core::{AnimalId, Error, HuntStats, Result};
use serde::{Deserialize, Serialize};
use tracing::info;

/// A chronological feed of human-readable world events.
///
/// Consumers drain it once per turn.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct NewsFeed {
    items: Vec<String>,
}

impl NewsFeed {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, item: String) {
        self.items.push(item);
    }

    pub fn items(&self) -> &[String] {
        &self.items
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Take every pending item, leaving the feed empty.
    pub fn drain(&mut self) -> Vec<String> {
        std::mem::take(&mut self.items)
    }
}

/// Turn counter, ID allocator, generation high-water mark and hunt tally.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Ledger {
    turn: u64,
    next_id: u64,
    highest_generation: u32,
    hunts: HuntStats,
    news: NewsFeed,
}

impl Default for Ledger {
    fn default() -> Self {
        Self {
            turn: 0,
            next_id: 0,
            highest_generation: 1,
            hunts: HuntStats::default(),
            news: NewsFeed::default(),
        }
    }
}

impl Ledger {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn turn(&self) -> u64 {
        self.turn
    }

    pub fn advance_turn(&mut self) -> u64 {
        self.turn += 1;
        self.turn
    }

    /// Allocate the next animal ID. The first ID handed out is 1.
    pub fn next_id(&mut self) -> Result<AnimalId> {
        self.next_id = self.next_id.checked_add(1).ok_or(Error::IdOverflow)?;
        Ok(AnimalId(self.next_id))
    }

    #[cfg(test)]
    pub(crate) fn set_next_id(&mut self, last_issued: u64) {
        self.next_id = last_issued;
    }

    pub fn highest_generation(&self) -> u32 {
        self.highest_generation
    }

    pub fn record_generation(&mut self, generation: u32) {
        self.highest_generation = self.highest_generation.max(generation);
    }

    pub fn hunts(&self) -> &HuntStats {
        &self.hunts
    }

    pub fn record_fight(&mut self, won: bool) {
        self.hunts.record_fight(won);
    }

    /// Add a news item, prefixed with the current turn.
    pub fn report(&mut self, message: impl AsRef<str>) {
        let item = format!("{}: {}", self.turn, message.as_ref());
        info!(event = "news", turn = self.turn, "{}", message.as_ref());
        self.news.push(item);
    }

    pub fn news(&self) -> &NewsFeed {
        &self.news
    }

    pub fn drain_news(&mut self) -> Vec<String> {
        self.news.drain()
    }
}
