//! Integration tests for the reference engine.
//!
//! These tests drive the engine only through the `tilestep-core` traits,
//! the same way the session controller does.
//!
//! Run with: `cargo test --package tilestep-wfc --test engine_integration`

use std::io::Cursor;

use anyhow::Result;
use image::{DynamicImage, ImageFormat, Rgba, RgbaImage};
use tilestep_core::{
    BacktrackVariant, Dimensions, Direction2D, ExtractionOptions, GenerationEngine, GridHandle,
    Preset, RuleData,
};
use tilestep_wfc::{Backtracker, WfcEngine, WfcHandle};

/// Helper to build a handle for a preset.
fn handle(engine: &WfcEngine, preset: Preset, size: usize, seed: u64) -> Result<WfcHandle> {
    let rules = engine.preset_rules(preset)?;
    Ok(engine.create_handle(seed, rules, Dimensions::new(size, size))?)
}

/// Encode a small striped sample as PNG.
fn striped_png() -> Vec<u8> {
    let mut img = RgbaImage::new(4, 4);
    for y in 0..4 {
        for x in 0..4 {
            let pixel = if x % 2 == 0 {
                [20, 120, 220, 255]
            } else {
                [240, 240, 240, 255]
            };
            img.put_pixel(x, y, Rgba(pixel));
        }
    }
    let mut bytes = Vec::new();
    DynamicImage::ImageRgba8(img)
        .write_to(&mut Cursor::new(&mut bytes), ImageFormat::Png)
        .expect("encode sample");
    bytes
}

#[test]
fn simple_presets_finish_with_reset_backtracking() -> Result<()> {
    let engine = WfcEngine::new();
    engine.initialize()?;

    for preset in [
        Preset::Checkers,
        Preset::Stripes,
        Preset::TerrainSimple,
        Preset::Terrain,
    ] {
        let mut h = handle(&engine, preset, 8, 17)?;
        let mut strategy = engine.build_strategy(BacktrackVariant::Reset);
        let result = h.run(10_000, Some(&mut strategy));
        assert_eq!(result, Some(true), "{preset} did not finish");
        assert!(h.is_finished());
        assert!(h.history_len() > 0);
    }
    Ok(())
}

#[test]
fn same_seed_renders_the_same_grid() -> Result<()> {
    let engine = WfcEngine::new();
    let render = |seed| -> Result<String> {
        let mut h = handle(&engine, Preset::Terrain, 6, seed)?;
        h.run(12, None);
        Ok(h.render(60, 60, None))
    };
    assert_eq!(render(1234)?, render(1234)?);
    Ok(())
}

#[test]
fn rendering_the_past_does_not_move_the_live_position() -> Result<()> {
    let engine = WfcEngine::new();
    let mut h = handle(&engine, Preset::TerrainSimple, 5, 8)?;
    for _ in 0..4 {
        h.tick(None);
    }

    let len = h.history_len();
    let live = h.render(50, 50, None);
    let past = h.render(50, 50, Some(1));

    assert_eq!(h.render(50, 50, Some(1)), past);
    assert_eq!(h.render(50, 50, Some(len)), live);
    assert_eq!(h.history_len(), len);
    assert_eq!(h.render(50, 50, None), live);
    Ok(())
}

#[test]
fn ground_anchor_collapse_is_accepted() -> Result<()> {
    let engine = WfcEngine::new();
    let mut h = handle(&engine, Preset::FlowersSinglepixel, 6, 3)?;
    let ground = Preset::FlowersSinglepixel.ground_anchor().expect("anchored");

    let result = h.collapse(0, 5, Some(ground))?;
    assert_ne!(result, None);
    assert_eq!(h.history_len(), 1);

    let tile = h.grid().tile(tilestep_core::Location2D::new(0, 5)).expect("in grid");
    assert_eq!(tile.len(), 1);
    Ok(())
}

#[test]
fn gradual_reset_keeps_flowers_going() -> Result<()> {
    let engine = WfcEngine::new();
    let mut h = handle(&engine, Preset::FlowersSinglepixel, 8, 21)?;
    let mut strategy: Backtracker = engine.build_strategy(BacktrackVariant::GradualReset);

    for _ in 0..64 {
        h.tick(Some(&mut strategy));
    }
    assert!(h.history_len() > 0);
    assert_eq!(h.dimensions(), Dimensions::new(8, 8));
    Ok(())
}

#[test]
fn extracted_rules_drive_a_grid() -> Result<()> {
    let engine = WfcEngine::new();
    let options = ExtractionOptions {
        n: 2,
        periodic_input: true,
        symmetry: 1,
    };

    let serialized = engine.extract_rules(&striped_png(), &options)?;
    let rules = engine.deserialize_rules(&serialized)?;

    // two column patterns that must alternate horizontally
    assert_eq!(rules.possible.len(), 2);
    assert_eq!(rules.check(&[0, 1], &[0], Direction2D::Right), vec![1]);

    let mut h = engine.create_handle(5, rules, Dimensions::new(6, 3))?;
    assert_eq!(h.run(100, None), Some(true));
    Ok(())
}
