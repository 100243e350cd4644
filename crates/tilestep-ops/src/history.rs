//! Rendering a handle, live or as of a past history step.

use tilestep_core::{Dimensions, GridHandle};

use crate::responses::RenderedState;

/// Render `handle` into a square `output_size` frame.
///
/// With `t`, the frame shows history step `t`, clamped to the history
/// length, and the clamped position is echoed back. Reading the past never
/// moves the live position: the next step continues from the latest one.
pub fn render<H: GridHandle>(handle: &H, output_size: usize, t: Option<usize>) -> RenderedState {
    let history_len = handle.history_len();
    let position = t.map(|t| t.min(history_len));
    let Dimensions { width, height } = handle.dimensions();

    RenderedState {
        width,
        height,
        rendered: handle.render(output_size, output_size, position),
        history_len,
        history_position: position,
        seed: handle.seed(),
    }
}
