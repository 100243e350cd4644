//! Presets command implementation.

use tilestep_core::{BacktrackVariant, Preset};

/// Print the preset catalog.
pub fn execute() {
    println!("Presets:");
    for preset in Preset::ALL {
        match preset.ground_anchor() {
            Some(state) => println!("  {:<22} (ground anchor: state {})", preset.as_str(), state),
            None => println!("  {}", preset),
        }
    }

    println!();
    println!("Backtrackers:");
    for variant in BacktrackVariant::ALL {
        println!("  {}", variant);
    }
}
