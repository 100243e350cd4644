//! SVG rendering of grid states.

use std::fmt::Write;

use tilestep_core::Dimensions;

use crate::grid::Tile;
use crate::rules::RuleSet;

/// Render `tiles` into an SVG of `total_w` by `total_h` pixels.
///
/// Each cell is filled with the average color of its remaining states.
/// Cells without any representable state are left out.
pub fn render_svg(
    rules: &RuleSet,
    dimensions: Dimensions,
    tiles: &[Tile],
    total_w: usize,
    total_h: usize,
) -> String {
    let cell_w = total_w as f64 / dimensions.width as f64;
    let cell_h = total_h as f64 / dimensions.height as f64;

    let mut out = format!(r#"<svg width="{total_w}" height="{total_h}">"#);
    for (index, tile) in tiles.iter().enumerate() {
        let location = dimensions.location_of(index);
        let colors: Vec<u32> = tile.iter().filter_map(|state| rules.represent(*state)).collect();
        let Some(fill) = average_color(&colors) else {
            continue;
        };
        let x = location.x as f64 * cell_w;
        let y = location.y as f64 * cell_h;
        let _ = write!(
            out,
            r#"<rect x="{x}" y="{y}" width="{cell_w}" height="{cell_h}" fill="{fill}" />"#
        );
    }
    out.push_str("</svg>");
    out
}

/// Average ARGB colors channel by channel into a CSS `rgba()` value.
fn average_color(colors: &[u32]) -> Option<String> {
    if colors.is_empty() {
        return None;
    }
    let channel = |shift: u32| {
        let sum: u32 = colors.iter().map(|color| (color >> shift) & 0xff).sum();
        (sum as f64 / colors.len() as f64).round() as u8
    };
    let alpha = channel(24) as f64 / 255.0;
    Some(format!(
        "rgba({},{},{},{alpha:.2})",
        channel(16),
        channel(8),
        channel(0)
    ))
}

#[cfg(test)]
mod tests {
    use std::collections::BTreeSet;

    use super::*;
    use crate::presets::checkers::{self, STATE_BLACK, STATE_WHITE};

    #[test]
    fn collapsed_cells_use_their_state_color() {
        let rules = checkers::rules();
        let tiles = vec![
            BTreeSet::from([STATE_BLACK]),
            BTreeSet::from([STATE_WHITE]),
        ];
        let svg = render_svg(&rules, Dimensions::new(2, 1), &tiles, 20, 10);

        assert!(svg.starts_with(r#"<svg width="20" height="10">"#));
        assert!(svg.ends_with("</svg>"));
        assert!(svg.contains(
            r#"<rect x="0" y="0" width="10" height="10" fill="rgba(0,0,0,1.00)" />"#
        ));
        assert!(svg.contains(
            r#"<rect x="10" y="0" width="10" height="10" fill="rgba(255,255,255,1.00)" />"#
        ));
    }

    #[test]
    fn undecided_cells_are_averaged() {
        assert_eq!(
            average_color(&[0xff000000, 0xffffffff]).as_deref(),
            Some("rgba(128,128,128,1.00)")
        );
        assert_eq!(average_color(&[]), None);
    }

    #[test]
    fn empty_cells_are_skipped() {
        let rules = checkers::rules();
        let tiles = vec![BTreeSet::new()];
        let svg = render_svg(&rules, Dimensions::new(1, 1), &tiles, 8, 8);
        assert_eq!(svg, r#"<svg width="8" height="8"></svg>"#);
    }
}
