use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum IntervalKind {
    Focus,
    Break,
}

impl IntervalKind {
    pub fn flipped(self) -> Self {
        match self {
            IntervalKind::Focus => IntervalKind::Break,
            IntervalKind::Break => IntervalKind::Focus,
        }
    }
}

/// Configured full lengths for the two interval kinds, in seconds.
///
/// Focus and break lengths are independent; the engine restores the full
/// length for the active mode on every reset and mode change.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct IntervalLengths {
    pub focus_secs: u64,
    pub break_secs: u64,
}

impl IntervalLengths {
    pub fn of(&self, kind: IntervalKind) -> u64 {
        match kind {
            IntervalKind::Focus => self.focus_secs,
            IntervalKind::Break => self.break_secs,
        }
    }
}

impl Default for IntervalLengths {
    fn default() -> Self {
        Self {
            focus_secs: 25 * 60,
            break_secs: 5 * 60,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_lengths() {
        let lengths = IntervalLengths::default();
        assert_eq!(lengths.of(IntervalKind::Focus), 1500);
        assert_eq!(lengths.of(IntervalKind::Break), 300);
    }

    #[test]
    fn flipped_alternates() {
        assert_eq!(IntervalKind::Focus.flipped(), IntervalKind::Break);
        assert_eq!(IntervalKind::Break.flipped(), IntervalKind::Focus);
    }

    #[test]
    fn kind_serializes_lowercase() {
        assert_eq!(
            serde_json::to_string(&IntervalKind::Focus).unwrap(),
            "\"focus\""
        );
        assert_eq!(
            serde_json::to_string(&IntervalKind::Break).unwrap(),
            "\"break\""
        );
    }
}
