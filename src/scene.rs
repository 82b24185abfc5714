//! The red triangle
//!
//! Window parameters, geometry, and the display callback. Everything here is
//! a constant: every redraw produces the same frame.

use redtri_render::{DrawError, Gl, Primitive};

use crate::toolkit::{DisplayMode, ToolkitError, ToolkitState};

pub const WINDOW_WIDTH: u32 = 400;
pub const WINDOW_HEIGHT: u32 = 400;
pub const WINDOW_TITLE: &str = "FreeGLUT Test";

/// Opaque black
pub const CLEAR_COLOR: [f32; 4] = [0.0, 0.0, 0.0, 1.0];

pub const RED: [f32; 3] = [1.0, 0.0, 0.0];

/// Counter-clockwise, in normalized device coordinates
pub const TRIANGLE: [[f32; 2]; 3] = [[-0.5, -0.5], [0.5, -0.5], [0.0, 0.5]];

/// Draw one frame: clear, the triangle, swap
pub fn display(gl: &mut Gl<'_>) -> Result<(), DrawError> {
    gl.clear()?;

    gl.begin(Primitive::Triangles)?;
    gl.color3f(RED[0], RED[1], RED[2]);
    for [x, y] in TRIANGLE {
        gl.vertex2f(x, y)?;
    }
    gl.end()?;

    gl.swap_buffers()
}

/// Configure the toolkit: double-buffered RGB window, black clear color,
/// and [`display`] as the display callback
pub fn setup(state: &mut ToolkitState) -> Result<(), ToolkitError> {
    state.init_display_mode(DisplayMode::DOUBLE | DisplayMode::RGB);
    state.create_window(WINDOW_WIDTH, WINDOW_HEIGHT, WINDOW_TITLE)?;
    state.set_clear_color(CLEAR_COLOR[0], CLEAR_COLOR[1], CLEAR_COLOR[2], CLEAR_COLOR[3]);
    state.display_func(display);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_triangle_is_counter_clockwise() {
        let [a, b, c] = TRIANGLE;
        let area = (b[0] - a[0]) * (c[1] - a[1]) - (b[1] - a[1]) * (c[0] - a[0]);
        assert!(area > 0.0);
    }

    #[test]
    fn test_triangle_inside_visible_area() {
        assert!(TRIANGLE.iter().flatten().all(|v| (-1.0..=1.0).contains(v)));
    }
}
