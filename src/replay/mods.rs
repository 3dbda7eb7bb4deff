//! Gameplay modifier bit field.

use serde::{Serialize, Serializer};
use std::fmt;

static MOD_NAMES: [(u32, &str); 31] = [
    (1 << 0, "NoFail"),
    (1 << 1, "Easy"),
    (1 << 2, "TouchDevice"),
    (1 << 3, "Hidden"),
    (1 << 4, "HardRock"),
    (1 << 5, "SuddenDeath"),
    (1 << 6, "DoubleTime"),
    (1 << 7, "Relax"),
    (1 << 8, "HalfTime"),
    (1 << 9, "Nightcore"),
    (1 << 10, "Flashlight"),
    (1 << 11, "Autoplay"),
    (1 << 12, "SpunOut"),
    (1 << 13, "Autopilot"),
    (1 << 14, "Perfect"),
    (1 << 15, "Key4"),
    (1 << 16, "Key5"),
    (1 << 17, "Key6"),
    (1 << 18, "Key7"),
    (1 << 19, "Key8"),
    (1 << 20, "FadeIn"),
    (1 << 21, "Random"),
    (1 << 22, "Cinema"),
    (1 << 23, "TargetPractice"),
    (1 << 24, "Key9"),
    (1 << 25, "KeyCoop"),
    (1 << 26, "Key1"),
    (1 << 27, "Key3"),
    (1 << 28, "Key2"),
    (1 << 29, "ScoreV2"),
    (1 << 30, "Mirror"),
];

/// Modifier flags of a replay.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Mods(pub u32);

impl Mods {
    pub const TARGET_PRACTICE: u32 = 1 << 23;

    pub fn contains(self, bit: u32) -> bool {
        self.0 & bit == bit
    }

    /// Names of all set modifiers, in bit order.
    pub fn names(self) -> Vec<&'static str> {
        MOD_NAMES
            .iter()
            .filter(|(bit, _)| self.0 & bit != 0)
            .map(|(_, name)| *name)
            .collect()
    }
}

impl fmt::Display for Mods {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.names().join(", "))
    }
}

impl Serialize for Mods {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_seq(self.names())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn lists_set_mods_in_bit_order() {
        let mods = Mods((1 << 6) | (1 << 3) | (1 << 9));
        assert_eq!(mods.names(), vec!["Hidden", "DoubleTime", "Nightcore"]);
        assert_eq!(mods.to_string(), "Hidden, DoubleTime, Nightcore");
        assert!(Mods::default().names().is_empty());
    }
}
