//! Integration tests for the rendered frame
//!
//! These run the program's setup and display callback against the software
//! framebuffer:
//! 1. The window request matches the program constants
//! 2. One redraw issues exactly one clear, one draw and one swap
//! 3. The frame is a red triangle on black, identical on every redraw

use image::{Rgba, RgbaImage};
use redtri::scene::{self, TRIANGLE, WINDOW_HEIGHT, WINDOW_TITLE, WINDOW_WIDTH};
use redtri::toolkit::{ToolkitOptions, ToolkitState};
use redtri_render::{Buffering, FrameStats, Framebuffer};

const BLACK: Rgba<u8> = Rgba([0, 0, 0, 255]);
const RED: Rgba<u8> = Rgba([255, 0, 0, 255]);

fn setup() -> (ToolkitState, Framebuffer) {
    let mut state = ToolkitState::new(ToolkitOptions::default());
    scene::setup(&mut state).unwrap();
    let framebuffer = Framebuffer::new(WINDOW_WIDTH, WINDOW_HEIGHT, Buffering::Double);
    (state, framebuffer)
}

/// Signed distance in pixels from `p` to the edge `a -> b`
fn edge_distance(a: [f32; 2], b: [f32; 2], p: [f32; 2]) -> f32 {
    let cross = (b[0] - a[0]) * (p[1] - a[1]) - (b[1] - a[1]) * (p[0] - a[0]);
    cross / ((b[0] - a[0]).powi(2) + (b[1] - a[1]).powi(2)).sqrt()
}

/// Reference bitmap and a mask of pixels within one pixel of an edge
fn reference_frame() -> (RgbaImage, Vec<bool>) {
    let to_px = |v: [f32; 2]| {
        [
            (v[0] + 1.0) * 0.5 * WINDOW_WIDTH as f32,
            (1.0 - v[1]) * 0.5 * WINDOW_HEIGHT as f32,
        ]
    };
    let [a, b, c] = TRIANGLE.map(to_px);

    let mut image = RgbaImage::from_pixel(WINDOW_WIDTH, WINDOW_HEIGHT, BLACK);
    let mut near_edge = vec![false; (WINDOW_WIDTH * WINDOW_HEIGHT) as usize];
    for (x, y, pixel) in image.enumerate_pixels_mut() {
        let p = [x as f32 + 0.5, y as f32 + 0.5];
        let d = [edge_distance(a, b, p), edge_distance(b, c, p), edge_distance(c, a, p)];
        // Either winding
        let inside = d.iter().all(|&d| d < 0.0) || d.iter().all(|&d| d > 0.0);
        if inside {
            *pixel = RED;
        }
        near_edge[(y * WINDOW_WIDTH + x) as usize] = d.iter().any(|d| d.abs() <= 1.0);
    }
    (image, near_edge)
}

#[test]
fn test_window_request_matches_constants() {
    let (state, _) = setup();
    let window = state.window().expect("setup should create a window");
    assert_eq!(window.width, 400);
    assert_eq!(window.height, 400);
    assert_eq!(window.title, "FreeGLUT Test");
    assert_eq!(window.title, WINDOW_TITLE);
    assert!(window.display_mode.is_double_buffered());
    assert!(state.has_display_callback());
    assert_eq!(state.gl_state().clear_color, [0.0, 0.0, 0.0, 1.0]);
}

#[test]
fn test_single_redraw_issues_one_of_each() {
    let (mut state, mut fb) = setup();
    state.redisplay(&mut fb).unwrap();
    assert_eq!(
        fb.stats(),
        FrameStats {
            clears: 1,
            draws: 1,
            presents: 1
        }
    );
}

#[test]
fn test_background_is_black() {
    let (mut state, mut fb) = setup();
    state.redisplay(&mut fb).unwrap();
    for (x, y) in [(0, 0), (399, 0), (0, 399), (399, 399), (10, 10), (200, 50), (200, 350)] {
        assert_eq!(fb.front().get_pixel(x, y), &BLACK, "pixel ({}, {})", x, y);
    }
}

#[test]
fn test_centroid_is_red() {
    let (mut state, mut fb) = setup();
    state.redisplay(&mut fb).unwrap();
    // NDC (0, -1/6) maps to (200, 233.3)
    assert_eq!(fb.front().get_pixel(200, 233), &RED);
}

#[test]
fn test_frames_are_identical() {
    let (mut state, mut fb) = setup();
    state.redisplay(&mut fb).unwrap();
    let first = fb.front().clone();
    for _ in 0..4 {
        state.redisplay(&mut fb).unwrap();
        assert_eq!(fb.front(), &first);
    }
    assert_eq!(fb.stats().presents, 5);
}

#[test]
fn test_frame_matches_reference() {
    let (mut state, mut fb) = setup();
    state.redisplay(&mut fb).unwrap();
    let (reference, near_edge) = reference_frame();

    let mut mismatches = 0;
    for (i, (actual, expected)) in fb.front().pixels().zip(reference.pixels()).enumerate() {
        if near_edge[i] {
            assert!(actual == &RED || actual == &BLACK);
            continue;
        }
        if actual != expected {
            mismatches += 1;
        }
    }
    assert_eq!(mismatches, 0);

    let red_pixels = fb.front().pixels().filter(|p| **p == RED).count();
    // Triangle covers 200x200 / 2 pixels
    assert!((19_000..=21_000).contains(&red_pixels), "{} red pixels", red_pixels);
}
