//! Built-in rulesets, backtracking variants and extraction parameters.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::space::TileState;

/// A built-in ruleset shipped with every engine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Preset {
    /// Deep sea through shore to deep forest.
    Terrain,
    /// Single-pixel flowers growing from a ground row.
    FlowersSinglepixel,
    /// Sea, shore and land.
    TerrainSimple,
    /// Alternating black and white cells.
    Checkers,
    /// Three colors alternating diagonally.
    Stripes,
}

impl Preset {
    /// Every preset, in catalog order.
    pub const ALL: [Preset; 5] = [
        Preset::Terrain,
        Preset::FlowersSinglepixel,
        Preset::TerrainSimple,
        Preset::Checkers,
        Preset::Stripes,
    ];

    /// Catalog name of the preset.
    pub fn as_str(self) -> &'static str {
        match self {
            Preset::Terrain => "terrain",
            Preset::FlowersSinglepixel => "flowers_singlepixel",
            Preset::TerrainSimple => "terrain_simple",
            Preset::Checkers => "checkers",
            Preset::Stripes => "stripes",
        }
    }

    /// State the bottom-left cell is collapsed to right after a grid is built.
    ///
    /// Only rulesets that grow from a fixed ground row have one.
    pub fn ground_anchor(self) -> Option<TileState> {
        match self {
            Preset::FlowersSinglepixel => Some(0),
            _ => None,
        }
    }

    /// Look up a preset by catalog name.
    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|preset| preset.as_str() == name)
    }
}

impl fmt::Display for Preset {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Preset {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::from_name(s).ok_or_else(|| format!("unknown preset: {s}"))
    }
}

/// Strategy used to recover from contradictions.
///
/// "No backtracking" is expressed as `Option::<BacktrackVariant>::None`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BacktrackVariant {
    /// Throw the whole grid away and start over.
    Reset,
    /// Reset a growing area around the contradiction.
    GradualReset,
}

impl BacktrackVariant {
    pub const ALL: [BacktrackVariant; 2] = [BacktrackVariant::Reset, BacktrackVariant::GradualReset];

    pub fn as_str(self) -> &'static str {
        match self {
            BacktrackVariant::Reset => "reset",
            BacktrackVariant::GradualReset => "gradual_reset",
        }
    }
}

impl fmt::Display for BacktrackVariant {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Parameters of the overlapping rule extraction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExtractionOptions {
    /// Patterns are `n` by `n` pixels.
    pub n: usize,
    /// Wrap around the sample edges when scanning.
    pub periodic_input: bool,
    /// Number of symmetry variants (1..=8) taken from each pattern.
    pub symmetry: usize,
}

impl Default for ExtractionOptions {
    fn default() -> Self {
        Self {
            n: 3,
            periodic_input: true,
            symmetry: 2,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn preset_names_round_trip() {
        for preset in Preset::ALL {
            assert_eq!(preset.as_str().parse::<Preset>(), Ok(preset));
            let json = serde_json::to_string(&preset).unwrap();
            assert_eq!(json, format!("\"{}\"", preset.as_str()));
        }
        assert!("village".parse::<Preset>().is_err());
    }

    #[test]
    fn only_flowers_are_ground_anchored() {
        let anchored: Vec<_> = Preset::ALL
            .into_iter()
            .filter(|preset| preset.ground_anchor().is_some())
            .collect();
        assert_eq!(anchored, vec![Preset::FlowersSinglepixel]);
    }

    #[test]
    fn backtrack_variant_wire_names() {
        let parsed: Option<BacktrackVariant> = serde_json::from_str("\"gradual_reset\"").unwrap();
        assert_eq!(parsed, Some(BacktrackVariant::GradualReset));

        let none: Option<BacktrackVariant> = serde_json::from_str("null").unwrap();
        assert_eq!(none, None);
    }
}
