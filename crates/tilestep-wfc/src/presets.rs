//! Built-in rulesets.

use std::collections::{BTreeSet, HashMap, HashSet};

use tilestep_core::{Direction2D, Preset, TileState};

use crate::rules::RuleSet;

use Direction2D::{Down as DOWN, Left as LEFT, Right as RIGHT, Up as UP};

/// Rules of a catalog preset.
pub fn rules(preset: Preset) -> RuleSet {
    match preset {
        Preset::Terrain => terrain::rules(),
        Preset::FlowersSinglepixel => flowers_singlepixel::rules(),
        Preset::TerrainSimple => terrain_simple::rules(),
        Preset::Checkers => checkers::rules(),
        Preset::Stripes => stripes::rules(),
    }
}

/// Every pair in `chain` may touch its successor on all four sides, and
/// every state may touch itself horizontally and vertically.
fn layered(chain: &[TileState]) -> HashSet<(TileState, Direction2D, TileState)> {
    let mut allowed = HashSet::new();
    for &state in chain {
        allowed.insert((state, UP, state));
        allowed.insert((state, RIGHT, state));
    }
    for pair in chain.windows(2) {
        for direction in Direction2D::ALL {
            allowed.insert((pair[0], direction, pair[1]));
        }
    }
    allowed
}

/// Alternating black and white cells.
pub mod checkers {
    use super::*;

    pub const STATE_BLACK: TileState = 0;
    pub const STATE_WHITE: TileState = 1;

    pub fn rules() -> RuleSet {
        let allowed = Direction2D::ALL
            .into_iter()
            .map(|direction| (STATE_BLACK, direction, STATE_WHITE))
            .collect();
        RuleSet::new(
            BTreeSet::from([STATE_BLACK, STATE_WHITE]),
            allowed,
            HashMap::new(),
            HashMap::from([(STATE_BLACK, 0xff000000), (STATE_WHITE, 0xffffffff)]),
        )
    }
}

/// Three colors alternating diagonally.
pub mod stripes {
    use super::*;

    pub const STATE_ONE: TileState = 2;
    pub const STATE_MIDDLE: TileState = 3;
    pub const STATE_TWO: TileState = 4;

    pub fn rules() -> RuleSet {
        let allowed = HashSet::from([
            (STATE_ONE, DOWN, STATE_MIDDLE),
            (STATE_ONE, RIGHT, STATE_MIDDLE),
            (STATE_MIDDLE, DOWN, STATE_TWO),
            (STATE_MIDDLE, RIGHT, STATE_TWO),
            (STATE_TWO, DOWN, STATE_ONE),
            (STATE_TWO, RIGHT, STATE_ONE),
        ]);
        RuleSet::new(
            BTreeSet::from([STATE_ONE, STATE_MIDDLE, STATE_TWO]),
            allowed,
            HashMap::new(),
            HashMap::from([
                (STATE_ONE, 0xffff0000),
                (STATE_MIDDLE, 0xff00ff00),
                (STATE_TWO, 0xff0000ff),
            ]),
        )
    }
}

/// Sea, shore, land. Sea never touches land.
pub mod terrain_simple {
    use super::*;

    pub const STATE_SEA: TileState = 2;
    pub const STATE_SHORE: TileState = 3;
    pub const STATE_LAND: TileState = 4;

    pub fn rules() -> RuleSet {
        RuleSet::new(
            BTreeSet::from([STATE_SEA, STATE_SHORE, STATE_LAND]),
            layered(&[STATE_SEA, STATE_SHORE, STATE_LAND]),
            HashMap::new(),
            HashMap::from([
                (STATE_SEA, 0xff0000ff),
                (STATE_SHORE, 0xfffff8dc),
                (STATE_LAND, 0xff008000),
            ]),
        )
    }
}

/// Deepest sea through shore to deep forest.
pub mod terrain {
    use super::*;

    pub const STATE_DEEP_SEA2: TileState = 0;
    pub const STATE_DEEP_SEA: TileState = 1;
    pub const STATE_SEA: TileState = 2;
    pub const STATE_SHORE: TileState = 3;
    pub const STATE_LAND: TileState = 4;
    pub const STATE_FOREST: TileState = 5;
    pub const STATE_FOREST2: TileState = 6;

    pub fn rules() -> RuleSet {
        let chain = [
            STATE_DEEP_SEA2,
            STATE_DEEP_SEA,
            STATE_SEA,
            STATE_SHORE,
            STATE_LAND,
            STATE_FOREST,
            STATE_FOREST2,
        ];
        RuleSet::new(
            BTreeSet::from(chain),
            layered(&chain),
            HashMap::new(),
            HashMap::from([
                (STATE_DEEP_SEA2, 0xff000071),
                (STATE_DEEP_SEA, 0xff00008b),
                (STATE_SEA, 0xff0000ff),
                (STATE_SHORE, 0xfffff8dc),
                (STATE_LAND, 0xff008000),
                (STATE_FOREST, 0xff006400),
                (STATE_FOREST2, 0xff005b00),
            ]),
        )
    }
}

/// Flowers growing out of a ground row, framed by edge tiles.
pub mod flowers_singlepixel {
    use super::*;

    pub const STATE_GROUND: TileState = 0;
    pub const STATE_SOIL: TileState = 1;
    pub const STATE_SKY: TileState = 2;
    pub const STATE_STEM: TileState = 3;
    pub const STATE_BRANCH: TileState = 4;
    pub const STATE_BRANCH_L: TileState = 5;
    pub const STATE_BRANCH_R: TileState = 6;
    pub const STATE_FLOWER: TileState = 7;
    pub const STATE_CURVE_L: TileState = 8;
    pub const STATE_CURVE_R: TileState = 9;
    pub const STATE_EDGE_L: TileState = 10;
    pub const STATE_EDGE_R: TileState = 11;
    pub const STATE_EDGE_TOP: TileState = 12;

    pub fn rules() -> RuleSet {
        let possible = BTreeSet::from([
            STATE_GROUND,
            STATE_SOIL,
            STATE_SKY,
            STATE_STEM,
            STATE_BRANCH,
            STATE_BRANCH_L,
            STATE_BRANCH_R,
            STATE_FLOWER,
            STATE_CURVE_L,
            STATE_CURVE_R,
            STATE_EDGE_L,
            STATE_EDGE_R,
            STATE_EDGE_TOP,
        ]);
        let allowed = HashSet::from([
            // ground row
            (STATE_GROUND, LEFT, STATE_GROUND),
            (STATE_GROUND, RIGHT, STATE_GROUND),
            (STATE_GROUND, LEFT, STATE_EDGE_L),
            (STATE_GROUND, RIGHT, STATE_EDGE_R),
            (STATE_GROUND, UP, STATE_EDGE_L),
            (STATE_GROUND, UP, STATE_EDGE_R),
            // soil
            (STATE_SOIL, DOWN, STATE_GROUND),
            (STATE_STEM, DOWN, STATE_SOIL),
            (STATE_SOIL, LEFT, STATE_EDGE_L),
            (STATE_SOIL, RIGHT, STATE_EDGE_R),
            (STATE_SOIL, LEFT, STATE_SOIL),
            (STATE_SOIL, RIGHT, STATE_SOIL),
            // stems
            (STATE_STEM, DOWN, STATE_GROUND),
            (STATE_SOIL, LEFT, STATE_STEM),
            (STATE_SOIL, RIGHT, STATE_STEM),
            (STATE_BRANCH, DOWN, STATE_STEM),
            (STATE_CURVE_L, DOWN, STATE_STEM),
            (STATE_CURVE_R, DOWN, STATE_STEM),
            // branches
            (STATE_BRANCH_L, LEFT, STATE_BRANCH),
            (STATE_BRANCH_L, LEFT, STATE_CURVE_L),
            (STATE_BRANCH_R, RIGHT, STATE_BRANCH),
            (STATE_BRANCH_R, RIGHT, STATE_CURVE_R),
            (STATE_BRANCH_L, DOWN, STATE_SKY),
            (STATE_BRANCH_R, DOWN, STATE_SKY),
            (STATE_STEM, DOWN, STATE_BRANCH_L),
            (STATE_STEM, DOWN, STATE_BRANCH_R),
            (STATE_BRANCH, DOWN, STATE_BRANCH_L),
            (STATE_BRANCH, DOWN, STATE_BRANCH_R),
            (STATE_CURVE_L, DOWN, STATE_BRANCH_L),
            (STATE_CURVE_L, DOWN, STATE_BRANCH_R),
            (STATE_CURVE_R, DOWN, STATE_BRANCH_L),
            (STATE_CURVE_R, DOWN, STATE_BRANCH_R),
            // sky above soil and plants
            (STATE_SKY, DOWN, STATE_SOIL),
            (STATE_SKY, DOWN, STATE_FLOWER),
            (STATE_FLOWER, DOWN, STATE_STEM),
            (STATE_FLOWER, DOWN, STATE_BRANCH_L),
            (STATE_FLOWER, DOWN, STATE_BRANCH_R),
            (STATE_SKY, DOWN, STATE_BRANCH),
            (STATE_SKY, DOWN, STATE_CURVE_L),
            (STATE_SKY, DOWN, STATE_CURVE_R),
            (STATE_EDGE_TOP, DOWN, STATE_SKY),
            // sky and frame
            (STATE_SKY, DOWN, STATE_SKY),
            (STATE_SKY, LEFT, STATE_SKY),
            (STATE_SKY, LEFT, STATE_EDGE_L),
            (STATE_SKY, RIGHT, STATE_EDGE_R),
            (STATE_EDGE_L, DOWN, STATE_EDGE_L),
            (STATE_EDGE_R, DOWN, STATE_EDGE_R),
            (STATE_EDGE_L, UP, STATE_EDGE_TOP),
            (STATE_EDGE_R, UP, STATE_EDGE_TOP),
            (STATE_EDGE_TOP, LEFT, STATE_EDGE_TOP),
            (STATE_EDGE_TOP, LEFT, STATE_EDGE_L),
            (STATE_EDGE_TOP, RIGHT, STATE_EDGE_R),
            // sky beside plants
            (STATE_SKY, RIGHT, STATE_STEM),
            (STATE_SKY, LEFT, STATE_STEM),
            (STATE_SKY, RIGHT, STATE_BRANCH_R),
            (STATE_SKY, LEFT, STATE_CURVE_R),
            (STATE_SKY, LEFT, STATE_BRANCH_L),
            (STATE_SKY, RIGHT, STATE_CURVE_L),
            (STATE_SKY, RIGHT, STATE_FLOWER),
            (STATE_SKY, LEFT, STATE_FLOWER),
        ]);
        let weights = HashMap::from([
            (STATE_SOIL, 11),
            (STATE_SKY, 10),
            (STATE_FLOWER, 4),
            (STATE_BRANCH, 8),
            (STATE_CURVE_L, 3),
            (STATE_CURVE_R, 3),
        ]);
        let representations = HashMap::from([
            (STATE_GROUND, 0xff000000),
            (STATE_SOIL, 0xff250500),
            (STATE_SKY, 0xfffff8dc),
            (STATE_EDGE_L, 0xff000000),
            (STATE_EDGE_R, 0xff000000),
            (STATE_EDGE_TOP, 0xff000000),
            (STATE_STEM, 0xff006400),
            (STATE_BRANCH, 0xff008000),
            (STATE_BRANCH_L, 0xff008000),
            (STATE_BRANCH_R, 0xff008000),
            (STATE_FLOWER, 0xffffbb55),
            (STATE_CURVE_L, 0xff006400),
            (STATE_CURVE_R, 0xff006400),
        ]);
        RuleSet::new(possible, allowed, weights, representations)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn every_preset_is_self_consistent() {
        for preset in Preset::ALL {
            let rules = rules(preset);
            assert!(!rules.possible.is_empty(), "{preset} has no states");
            for (a, _, b) in &rules.allowed {
                assert!(rules.possible.contains(a), "{preset}: unknown {a}");
                assert!(rules.possible.contains(b), "{preset}: unknown {b}");
            }
            for state in &rules.possible {
                assert!(rules.represent(*state).is_some(), "{preset}: {state} has no color");
            }
        }
    }

    #[test]
    fn presets_are_deterministic() {
        for preset in Preset::ALL {
            assert_eq!(rules(preset), rules(preset));
        }
    }

    #[test]
    fn ground_anchor_is_a_known_state() {
        for preset in Preset::ALL {
            if let Some(ground) = preset.ground_anchor() {
                assert!(rules(preset).possible.contains(&ground));
            }
        }
    }

    #[test]
    fn sea_never_touches_land() {
        use terrain_simple::{STATE_LAND, STATE_SEA};
        let rules = terrain_simple::rules();
        for direction in Direction2D::ALL {
            assert!(!rules.allowed.contains(&(STATE_SEA, direction, STATE_LAND)));
        }
    }
}
