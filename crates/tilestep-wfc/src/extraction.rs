//! Overlapping N×N rule extraction from sample images.

use std::collections::{BTreeSet, HashMap, HashSet};

use tilestep_core::{Direction2D, EngineError, EngineResult, ExtractionOptions, TileState};
use tracing::info;

use crate::rules::RuleSet;

/// Decode `image` and derive a ruleset from its N×N patterns.
///
/// Each distinct pattern becomes one state, numbered in discovery order.
/// Its weight is how often it occurs and its color is its top-left pixel.
pub fn extract_rules(image: &[u8], options: &ExtractionOptions) -> EngineResult<RuleSet> {
    let decoded =
        image::load_from_memory(image).map_err(|e| EngineError::invalid_image(e.to_string()))?;
    let rgba = decoded.to_rgba8();
    let (width, height) = rgba.dimensions();
    let bitmap: Vec<u32> = rgba
        .pixels()
        .map(|pixel| {
            let [r, g, b, a] = pixel.0;
            (a as u32) << 24 | (r as u32) << 16 | (g as u32) << 8 | b as u32
        })
        .collect();

    extract_from_bitmap(&bitmap, width as usize, height as usize, options)
}

/// Derive a ruleset from an ARGB bitmap.
pub(crate) fn extract_from_bitmap(
    bitmap: &[u32],
    width: usize,
    height: usize,
    options: &ExtractionOptions,
) -> EngineResult<RuleSet> {
    validate(width, height, options)?;

    let (patterns, weights) = collect_patterns(bitmap, width, height, options);
    let n = options.n;

    let states: Vec<TileState> = (0..patterns.len() as TileState).collect();
    let mut allowed = HashSet::new();
    for (i, p1) in patterns.iter().enumerate() {
        for (j, p2) in patterns.iter().enumerate() {
            for direction in Direction2D::ALL {
                if edges_match(p1, p2, direction, n) {
                    allowed.insert((states[i], direction, states[j]));
                }
            }
        }
    }

    let weights: HashMap<TileState, usize> = states.iter().copied().zip(weights).collect();
    let representations: HashMap<TileState, u32> = states
        .iter()
        .copied()
        .zip(patterns.iter().map(|pattern| pattern[0]))
        .collect();

    info!(
        width,
        height,
        n,
        symmetry = options.symmetry,
        periodic = options.periodic_input,
        patterns = states.len(),
        adjacencies = allowed.len(),
        "rules_extracted"
    );

    Ok(RuleSet::new(
        BTreeSet::from_iter(states),
        allowed,
        weights,
        representations,
    ))
}

fn validate(width: usize, height: usize, options: &ExtractionOptions) -> EngineResult<()> {
    if width == 0 || height == 0 {
        return Err(EngineError::invalid_image("sample is empty"));
    }
    if options.n == 0 {
        return Err(EngineError::invalid_options("n must be at least 1"));
    }
    if !(1..=8).contains(&options.symmetry) {
        return Err(EngineError::invalid_options(format!(
            "symmetry must be between 1 and 8, got {}",
            options.symmetry
        )));
    }
    if !options.periodic_input && (options.n > width || options.n > height) {
        return Err(EngineError::invalid_options(format!(
            "n = {} does not fit a {width}x{height} sample",
            options.n
        )));
    }
    Ok(())
}

/// Scan the bitmap for unique patterns and count them.
fn collect_patterns(
    bitmap: &[u32],
    width: usize,
    height: usize,
    options: &ExtractionOptions,
) -> (Vec<Vec<u32>>, Vec<usize>) {
    let n = options.n;
    let (xmax, ymax) = if options.periodic_input {
        (width, height)
    } else {
        (width - n + 1, height - n + 1)
    };

    let mut patterns: Vec<Vec<u32>> = Vec::new();
    let mut weights: Vec<usize> = Vec::new();
    let mut seen: HashMap<Vec<u32>, usize> = HashMap::new();

    for y in 0..ymax {
        for x in 0..xmax {
            let base = pattern(|dx, dy| bitmap[(x + dx) % width + ((y + dy) % height) * width], n);
            for variant in symmetries(base, n).into_iter().take(options.symmetry) {
                if let Some(&index) = seen.get(&variant) {
                    weights[index] += 1;
                } else {
                    seen.insert(variant.clone(), patterns.len());
                    patterns.push(variant);
                    weights.push(1);
                }
            }
        }
    }

    (patterns, weights)
}

/// The eight rotations and reflections of a pattern, starting with itself.
fn symmetries(base: Vec<u32>, n: usize) -> Vec<Vec<u32>> {
    let mut variants = Vec::with_capacity(8);
    let mut current = base;
    for _ in 0..4 {
        let reflected = reflect(&current, n);
        let rotated = rotate(&current, n);
        variants.push(current);
        variants.push(reflected);
        current = rotated;
    }
    variants
}

fn pattern(f: impl Fn(usize, usize) -> u32, n: usize) -> Vec<u32> {
    let mut result = vec![0; n * n];
    for y in 0..n {
        for x in 0..n {
            result[x + y * n] = f(x, y);
        }
    }
    result
}

fn rotate(p: &[u32], n: usize) -> Vec<u32> {
    pattern(|x, y| p[n - 1 - y + x * n], n)
}

fn reflect(p: &[u32], n: usize) -> Vec<u32> {
    pattern(|x, y| p[n - 1 - x + y * n], n)
}

/// Whether `p2` may sit in `direction` of `p1`: the touching rows or
/// columns must be identical.
fn edges_match(p1: &[u32], p2: &[u32], direction: Direction2D, n: usize) -> bool {
    match direction {
        Direction2D::Right => (0..n).all(|i| p1[(n - 1) + i * n] == p2[i * n]),
        Direction2D::Left => (0..n).all(|i| p1[i * n] == p2[(n - 1) + i * n]),
        Direction2D::Up => (0..n).all(|i| p1[i] == p2[i + (n - 1) * n]),
        Direction2D::Down => (0..n).all(|i| p1[i + (n - 1) * n] == p2[i]),
    }
}

#[cfg(test)]
mod tests {
    use std::io::Cursor;

    use image::{DynamicImage, ImageFormat, Rgba, RgbaImage};

    use super::*;

    const RED: u32 = 0xffff0000;
    const GREEN: u32 = 0xff00ff00;

    fn png(size: u32, color: impl Fn(u32, u32) -> [u8; 4]) -> Vec<u8> {
        let mut img = RgbaImage::new(size, size);
        for y in 0..size {
            for x in 0..size {
                img.put_pixel(x, y, Rgba(color(x, y)));
            }
        }
        let mut bytes = Vec::new();
        DynamicImage::ImageRgba8(img)
            .write_to(&mut Cursor::new(&mut bytes), ImageFormat::Png)
            .unwrap();
        bytes
    }

    fn options(n: usize, symmetry: usize, periodic_input: bool) -> ExtractionOptions {
        ExtractionOptions {
            n,
            periodic_input,
            symmetry,
        }
    }

    #[test]
    fn checkerboard_yields_two_patterns() {
        let bytes = png(4, |x, y| {
            if (x + y) % 2 == 0 {
                [255, 0, 0, 255]
            } else {
                [0, 255, 0, 255]
            }
        });
        let rules = extract_rules(&bytes, &options(2, 1, true)).unwrap();

        assert_eq!(rules.possible, BTreeSet::from([0, 1]));
        assert_eq!(rules.represent(0), Some(RED));
        assert_eq!(rules.represent(1), Some(GREEN));
        assert_eq!(rules.weight(0), 8);
        assert_eq!(rules.weight(1), 8);
        for direction in Direction2D::ALL {
            assert!(rules.allowed.contains(&(0, direction, 1)));
            assert!(!rules.allowed.contains(&(0, direction, 0)));
        }
    }

    #[test]
    fn symmetry_never_loses_patterns() {
        let bytes = png(3, |x, y| [(x * 60) as u8, (y * 60) as u8, 0, 255]);
        let plain = extract_rules(&bytes, &options(2, 1, false)).unwrap();
        let symmetric = extract_rules(&bytes, &options(2, 8, false)).unwrap();
        assert!(symmetric.possible.len() >= plain.possible.len());
        assert_eq!(plain.possible.len(), 4);
    }

    #[test]
    fn oversized_pattern_is_rejected_without_wrapping() {
        let bytes = png(2, |_, _| [0, 0, 0, 255]);
        assert!(matches!(
            extract_rules(&bytes, &options(3, 1, false)),
            Err(EngineError::InvalidOptions { .. })
        ));
        assert!(extract_rules(&bytes, &options(3, 1, true)).is_ok());
    }

    #[test]
    fn garbage_bytes_are_not_an_image() {
        assert!(matches!(
            extract_rules(b"definitely not a png", &ExtractionOptions::default()),
            Err(EngineError::InvalidImage { .. })
        ));
    }

    #[test]
    fn rotate_and_reflect() {
        let p = pattern(|x, y| (x + y * 3) as u32, 3);
        assert_eq!(rotate(&p, 3), vec![2, 5, 8, 1, 4, 7, 0, 3, 6]);
        assert_eq!(reflect(&p, 3), vec![2, 1, 0, 5, 4, 3, 8, 7, 6]);
        assert_eq!(symmetries(p.clone(), 3)[0], p);
        assert_eq!(rotate(&rotate(&rotate(&rotate(&p, 3), 3), 3), 3), p);
    }

    #[test]
    fn edges_match_is_directional() {
        let left = pattern(|x, y| if x == 1 { 7 + y as u32 } else { 0 }, 2);
        let right = pattern(|x, y| if x == 0 { 7 + y as u32 } else { 1 }, 2);
        assert!(edges_match(&left, &right, Direction2D::Right, 2));
        assert!(edges_match(&right, &left, Direction2D::Left, 2));
        assert!(!edges_match(&left, &right, Direction2D::Left, 2));
    }
}
