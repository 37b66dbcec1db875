//! Per-game high score leaderboards
//!
//! Persisted to LocalStorage, tracks the top 10 scores of each game.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::games::GameKind;

/// Maximum number of high scores to keep per game
pub const MAX_HIGH_SCORES: usize = 10;

/// A single high score entry
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HighScoreEntry {
    pub score: u64,
    /// Unix timestamp (ms) when achieved
    pub timestamp: f64,
}

/// Leaderboards keyed by game, each sorted best first
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct HighScores {
    pub boards: BTreeMap<GameKind, Vec<HighScoreEntry>>,
}

impl HighScores {
    /// LocalStorage key (used only in wasm32)
    #[allow(dead_code)]
    const STORAGE_KEY: &'static str = "arcade_pack_highscores";

    pub fn new() -> Self {
        Self::default()
    }

    pub fn entries(&self, kind: GameKind) -> &[HighScoreEntry] {
        self.boards.get(&kind).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Check if a score qualifies for a game's leaderboard
    pub fn qualifies(&self, kind: GameKind, score: u64) -> bool {
        if score == 0 {
            return false;
        }
        let entries = self.entries(kind);
        if entries.len() < MAX_HIGH_SCORES {
            return true;
        }
        entries.last().map(|e| score > e.score).unwrap_or(true)
    }

    /// Rank a score would achieve (1-indexed, None if it doesn't qualify)
    pub fn potential_rank(&self, kind: GameKind, score: u64) -> Option<usize> {
        if !self.qualifies(kind, score) {
            return None;
        }
        let entries = self.entries(kind);
        let rank = entries.iter().position(|e| score > e.score);
        Some(rank.unwrap_or(entries.len()) + 1)
    }

    /// Add a score if it qualifies, returning the rank achieved (1-indexed)
    pub fn add_score(&mut self, kind: GameKind, score: u64, timestamp: f64) -> Option<usize> {
        if !self.qualifies(kind, score) {
            return None;
        }

        let entries = self.boards.entry(kind).or_default();
        let entry = HighScoreEntry { score, timestamp };

        // Ties go below existing entries
        let rank = match entries.iter().position(|e| score > e.score) {
            Some(i) => {
                entries.insert(i, entry);
                i + 1
            }
            None => {
                entries.push(entry);
                entries.len()
            }
        };
        entries.truncate(MAX_HIGH_SCORES);

        log::info!("New {} high score {} (rank {})", kind.title(), score, rank);
        Some(rank)
    }

    pub fn top_score(&self, kind: GameKind) -> Option<u64> {
        self.entries(kind).first().map(|e| e.score)
    }

    pub fn is_empty(&self) -> bool {
        self.boards.values().all(Vec::is_empty)
    }

    /// Load high scores from LocalStorage (WASM only)
    #[cfg(target_arch = "wasm32")]
    pub fn load() -> Self {
        let storage = web_sys::window()
            .and_then(|w| w.local_storage().ok())
            .flatten();

        if let Some(storage) = storage {
            if let Ok(Some(json)) = storage.get_item(Self::STORAGE_KEY) {
                match serde_json::from_str::<HighScores>(&json) {
                    Ok(scores) => {
                        log::info!("Loaded high scores for {} games", scores.boards.len());
                        return scores;
                    }
                    Err(e) => log::warn!("Discarding corrupt high scores: {e}"),
                }
            }
        }

        log::info!("No high scores found, starting fresh");
        Self::new()
    }

    /// Save high scores to LocalStorage (WASM only)
    #[cfg(target_arch = "wasm32")]
    pub fn save(&self) {
        let storage = web_sys::window()
            .and_then(|w| w.local_storage().ok())
            .flatten();

        if let Some(storage) = storage {
            if let Ok(json) = serde_json::to_string(self) {
                if storage.set_item(Self::STORAGE_KEY, &json).is_err() {
                    log::warn!("Could not save high scores");
                }
            }
        }
    }

    /// Native stubs
    #[cfg(not(target_arch = "wasm32"))]
    pub fn load() -> Self {
        Self::new()
    }

    #[cfg(not(target_arch = "wasm32"))]
    pub fn save(&self) {
        // No-op for native
    }
}

/// Milliseconds since the Unix epoch
#[cfg(target_arch = "wasm32")]
pub fn now_ms() -> f64 {
    js_sys::Date::now()
}

#[cfg(not(target_arch = "wasm32"))]
pub fn now_ms() -> f64 {
    std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .map(|d| d.as_secs_f64() * 1000.0)
        .unwrap_or(0.0)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_zero_never_qualifies() {
        let mut hs = HighScores::new();
        assert!(!hs.qualifies(GameKind::Flappy, 0));
        assert!(hs.add_score(GameKind::Flappy, 0, 0.0).is_none());
        assert!(hs.is_empty());
    }

    #[test]
    fn test_ranks_sorted_descending() {
        let mut hs = HighScores::new();
        assert_eq!(hs.add_score(GameKind::Snake, 5, 1.0), Some(1));
        assert_eq!(hs.add_score(GameKind::Snake, 9, 2.0), Some(1));
        assert_eq!(hs.add_score(GameKind::Snake, 7, 3.0), Some(2));
        // Ties land after the existing score
        assert_eq!(hs.potential_rank(GameKind::Snake, 7), Some(3));
        let scores: Vec<u64> = hs.entries(GameKind::Snake).iter().map(|e| e.score).collect();
        assert_eq!(scores, vec![9, 7, 5]);
        assert_eq!(hs.top_score(GameKind::Snake), Some(9));
    }

    #[test]
    fn test_boards_are_separate() {
        let mut hs = HighScores::new();
        hs.add_score(GameKind::Slicing, 100, 1.0);
        assert_eq!(hs.top_score(GameKind::Slicing), Some(100));
        assert_eq!(hs.top_score(GameKind::Omd), None);
        assert_eq!(hs.potential_rank(GameKind::Omd, 1), Some(1));
    }

    #[test]
    fn test_full_board_keeps_top_ten() {
        let mut hs = HighScores::new();
        for s in 1..=MAX_HIGH_SCORES as u64 {
            hs.add_score(GameKind::Army, s * 10, s as f64);
        }
        assert!(!hs.qualifies(GameKind::Army, 10));
        assert_eq!(hs.add_score(GameKind::Army, 5, 0.0), None);
        assert_eq!(hs.add_score(GameKind::Army, 15, 0.0), Some(10));
        let board = hs.entries(GameKind::Army);
        assert_eq!(board.len(), MAX_HIGH_SCORES);
        assert_eq!(board.last().map(|e| e.score), Some(15));
    }

    #[test]
    fn test_serializes_by_game() {
        let mut hs = HighScores::new();
        hs.add_score(GameKind::Spacewar, 3, 42.0);
        let json = serde_json::to_string(&hs).expect("serialize");
        let back: HighScores = serde_json::from_str(&json).expect("deserialize");
        assert_eq!(back.entries(GameKind::Spacewar), hs.entries(GameKind::Spacewar));
    }
}
