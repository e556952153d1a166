//! Finished-session summary and text helpers.

use serde::{Deserialize, Serialize};

use super::controller::SessionStatus;
use crate::core::Difficulty;
use crate::scoring::Grade;

/// Outcome of the last finished session.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionResult {
    pub difficulty: Difficulty,
    pub status: SessionStatus,
    pub move_count: u32,
    pub elapsed_seconds: u32,
    pub matched_pairs: u32,
    pub score: u32,
    pub grade: Grade,
    pub is_new_best: bool,
}

impl SessionResult {
    #[must_use]
    pub fn is_win(&self) -> bool {
        self.status == SessionStatus::Won
    }

    /// Elapsed time as `MM:SS`.
    #[must_use]
    pub fn clock(&self) -> String {
        format_clock(self.elapsed_seconds)
    }

    /// One-line brag text, with the game url appended when given.
    #[must_use]
    pub fn share_text(&self, url: Option<&str>) -> String {
        let mut text = format!(
            "I scored {} points in Memory Match ({} mode) with {} efficiency! \
             Time: {}, Moves: {}. Can you beat me?",
            self.score,
            self.difficulty,
            self.grade,
            self.clock(),
            self.move_count
        );
        if let Some(url) = url {
            text.push(' ');
            text.push_str(url);
        }
        text
    }
}

/// Format seconds as zero-padded `MM:SS`. Minutes keep growing past 99.
#[must_use]
pub fn format_clock(seconds: u32) -> String {
    format!("{:02}:{:02}", seconds / 60, seconds % 60)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn result() -> SessionResult {
        SessionResult {
            difficulty: Difficulty::Medium,
            status: SessionStatus::Won,
            move_count: 8,
            elapsed_seconds: 75,
            matched_pairs: 4,
            score: 2650,
            grade: Grade::APlus,
            is_new_best: true,
        }
    }

    #[test]
    fn test_format_clock() {
        assert_eq!(format_clock(0), "00:00");
        assert_eq!(format_clock(9), "00:09");
        assert_eq!(format_clock(75), "01:15");
        assert_eq!(format_clock(6000), "100:00");
    }

    #[test]
    fn test_share_text() {
        let r = result();
        assert_eq!(
            r.share_text(None),
            "I scored 2650 points in Memory Match (medium mode) with A+ efficiency! \
             Time: 01:15, Moves: 8. Can you beat me?"
        );
        let text = r.share_text(Some("https://example.test/memory"));
        assert!(text.ends_with("me? https://example.test/memory"));
    }

    #[test]
    fn test_is_win() {
        let mut r = result();
        assert!(r.is_win());
        r.status = SessionStatus::Lost;
        assert!(!r.is_win());
    }
}
