//! Estimated reading time of a post

use serde::{Deserialize, Serialize};

/// Average adult reading speed used by the site
pub const WORDS_PER_MINUTE: u32 = 250;

const MINUTE: u64 = 60;
const HOUR: u64 = 60 * MINUTE;
const DAY: u64 = 24 * HOUR;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReadingTime {
    pub hours: u64,
    pub minutes: u64,
    pub seconds: u64,
}

impl ReadingTime {
    pub fn from_word_count(word_count: usize, words_per_minute: u32) -> Self {
        let wpm = f64::from(words_per_minute.max(1));
        let total_seconds = (word_count as f64 / wpm) * MINUTE as f64;
        Self::from_seconds(total_seconds.floor() as u64)
    }

    /// Split a duration into hours, minutes and seconds, wrapping at one day
    pub fn from_seconds(seconds: u64) -> Self {
        let mut remaining = seconds % DAY;
        let hours = remaining / HOUR;
        remaining %= HOUR;
        let minutes = remaining / MINUTE;
        remaining %= MINUTE;

        Self {
            hours,
            minutes,
            seconds: remaining,
        }
    }

    /// Human label shown next to the post date, e.g. `4 mins`
    pub fn label(&self) -> String {
        if self.hours != 0 {
            if self.hours == 1 {
                "1 hour".to_string()
            } else {
                format!("{} hours", self.hours)
            }
        } else if self.minutes != 0 {
            if self.seconds >= 30 {
                format!("{} mins", self.minutes + 1)
            } else if self.minutes == 1 {
                "1 min".to_string()
            } else {
                format!("{} mins", self.minutes)
            }
        } else if self.seconds != 0 {
            "< 1 min".to_string()
        } else {
            String::new()
        }
    }
}
