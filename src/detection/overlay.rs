use image::{Rgb, RgbImage};
use imageproc::drawing::draw_line_segment_mut;

use crate::models::{LineSegment, PolarLine};

/// How far polar lines are extended on each side of their foot point
const POLAR_EXTENT: f32 = 1000.0;

/// Color and width for drawn lines
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LineStyle {
    pub color: Rgb<u8>,
    pub thickness: u32,
}

impl Default for LineStyle {
    fn default() -> Self {
        Self {
            color: Rgb([255, 0, 0]),
            thickness: 2,
        }
    }
}

/// Two far-apart points on a polar line.
///
/// The foot point `(rho·cos θ, rho·sin θ)` is pushed 1000 px along the line
/// direction each way; coordinates are truncated toward zero.
pub fn polar_line_endpoints(line: PolarLine) -> ((i32, i32), (i32, i32)) {
    let a = line.theta.cos();
    let b = line.theta.sin();
    let x0 = a * line.rho;
    let y0 = b * line.rho;
    let start = (
        (x0 + POLAR_EXTENT * (-b)) as i32,
        (y0 + POLAR_EXTENT * a) as i32,
    );
    let end = (
        (x0 - POLAR_EXTENT * (-b)) as i32,
        (y0 - POLAR_EXTENT * a) as i32,
    );
    (start, end)
}

/// Draw infinite (rho, theta) lines onto `img` in place.
///
/// Lines with non-finite parameters produce no pixels.
pub fn draw_polar_lines(lines: &[PolarLine], img: &mut RgbImage, style: LineStyle) {
    for line in lines {
        if !(line.rho.is_finite() && line.theta.is_finite()) {
            continue;
        }
        let (start, end) = polar_line_endpoints(*line);
        draw_thick_line(img, start, end, style);
    }
}

/// Draw segments between their endpoints onto `img` in place.
///
/// An empty slice leaves the image untouched.
pub fn draw_segments(lines: &[LineSegment], img: &mut RgbImage, style: LineStyle) {
    if lines.is_empty() {
        return;
    }
    for line in lines {
        draw_thick_line(img, line.start(), line.end(), style);
    }
}

/// Stamp a 1px line `thickness` times in a square around the ideal line.
/// Pixels outside the image are skipped.
fn draw_thick_line(img: &mut RgbImage, start: (i32, i32), end: (i32, i32), style: LineStyle) {
    let thickness = style.thickness.max(1) as i32;
    let offset = (thickness - 1) / 2;
    for oy in 0..thickness {
        for ox in 0..thickness {
            let dx = (ox - offset) as f32;
            let dy = (oy - offset) as f32;
            draw_line_segment_mut(
                img,
                (start.0 as f32 + dx, start.1 as f32 + dy),
                (end.0 as f32 + dx, end.1 as f32 + dy),
                style.color,
            );
        }
    }
}
