//! The fixed catalogue of moods an entry can be tagged with

use serde::{Deserialize, Serialize};
use std::fmt;

/// A named mood category with an intensity score (1 = lowest, 7 = highest)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum MoodSmiley {
    Happy,
    Sad,
    Angry,
    Anxious,
    Neutral,
    Confused,
    Shocked,
}

/// Catalogue in display order (the order of the picker row)
pub const MOODS: [MoodSmiley; 7] = [
    MoodSmiley::Happy,
    MoodSmiley::Sad,
    MoodSmiley::Angry,
    MoodSmiley::Anxious,
    MoodSmiley::Neutral,
    MoodSmiley::Confused,
    MoodSmiley::Shocked,
];

impl MoodSmiley {
    pub fn name(self) -> &'static str {
        match self {
            MoodSmiley::Happy => "Happy",
            MoodSmiley::Sad => "Sad",
            MoodSmiley::Angry => "Angry",
            MoodSmiley::Anxious => "Anxious",
            MoodSmiley::Neutral => "Neutral",
            MoodSmiley::Confused => "Confused",
            MoodSmiley::Shocked => "Shocked",
        }
    }

    /// Intensity score in 1..=7
    pub fn score(self) -> u8 {
        match self {
            MoodSmiley::Happy => 7,
            MoodSmiley::Sad => 1,
            MoodSmiley::Angry => 2,
            MoodSmiley::Anxious => 3,
            MoodSmiley::Neutral => 5,
            MoodSmiley::Confused => 4,
            MoodSmiley::Shocked => 6,
        }
    }

    /// Iconify icon id, included in `--export` output
    pub fn icon(self) -> &'static str {
        match self {
            MoodSmiley::Happy => "icomoon-free:happy2",
            MoodSmiley::Sad => "fluent-mdl2:sad-solid",
            MoodSmiley::Angry => "fa-solid:angry",
            MoodSmiley::Anxious => "emojione-v1:anxious-face-with-sweat",
            MoodSmiley::Neutral => "twemoji:neutral-face",
            MoodSmiley::Confused => "emojione-v1:confused-face",
            MoodSmiley::Shocked => "icomoon-free:shocked2",
        }
    }

    /// Terminal glyph used by the picker
    pub fn glyph(self) -> &'static str {
        match self {
            MoodSmiley::Happy => "😄",
            MoodSmiley::Sad => "😢",
            MoodSmiley::Angry => "😠",
            MoodSmiley::Anxious => "😰",
            MoodSmiley::Neutral => "😐",
            MoodSmiley::Confused => "😕",
            MoodSmiley::Shocked => "😲",
        }
    }

    /// Position in [`MOODS`]
    pub fn index(self) -> usize {
        MOODS.iter().position(|m| *m == self).unwrap_or(0)
    }
}

impl fmt::Display for MoodSmiley {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}
