//! Hough line detection on binary edge maps.
//!
//! [`detect_segments`] is a progressive probabilistic Hough transform: edge
//! points are visited in random order and each one votes into a (rho, theta)
//! accumulator. As soon as a bin reaches the vote threshold, the line through
//! the current point is walked in both directions over the remaining edge
//! points, tolerating gaps of up to `max_line_gap` pixels. Walked points are
//! removed from further consideration and, if the segment is long enough,
//! their votes are taken back out of the accumulator.

use std::f64::consts::PI;

use anyhow::Result;
use image::GrayImage;
use imageproc::hough::{LineDetectionOptions, detect_lines};
use rand::prelude::*;

use crate::error::InspectError;
use crate::models::{LineSegment, PolarLine};

/// Fixed-point precision used while stepping along a line
const SHIFT: u32 = 16;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct HoughParams {
    /// Distance resolution of the accumulator in pixels
    pub rho: f64,
    /// Angle resolution of the accumulator in radians
    pub theta: f64,
    /// Minimum accumulator votes for a line candidate
    pub threshold: u32,
    /// Segments shorter than this along both axes are dropped
    pub min_line_length: u32,
    /// Largest run of missing edge pixels bridged inside one segment
    pub max_line_gap: u32,
    /// Stop after this many segments
    pub max_lines: Option<usize>,
    /// Seed for the point visiting order
    pub seed: u64,
}

impl Default for HoughParams {
    fn default() -> Self {
        Self {
            rho: 1.0,
            theta: PI / 180.0,
            threshold: 50,
            min_line_length: 100,
            max_line_gap: 10,
            max_lines: None,
            seed: u64::MAX,
        }
    }
}

impl HoughParams {
    pub fn validate(&self) -> Result<()> {
        if !(self.rho.is_finite() && self.rho > 0.0) {
            return Err(InspectError::invalid_parameter("rho", self.rho).into());
        }
        if !(self.theta.is_finite() && self.theta > 0.0) {
            return Err(InspectError::invalid_parameter("theta", self.theta).into());
        }
        if self.threshold == 0 {
            return Err(InspectError::invalid_parameter("threshold", self.threshold).into());
        }
        Ok(())
    }
}

struct Accumulator {
    votes: Vec<i32>,
    num_rho: usize,
    num_angle: usize,
    // cos/sin per angle bin, pre-divided by the rho resolution
    trig: Vec<(f64, f64)>,
}

impl Accumulator {
    fn new(width: u32, height: u32, params: &HoughParams) -> Self {
        let num_angle = ((PI / params.theta).round() as usize).max(1);
        let num_rho = ((((width + height) * 2 + 1) as f64 / params.rho).round() as usize).max(1);
        let irho = 1.0 / params.rho;

        let trig = (0..num_angle)
            .map(|n| {
                let angle = n as f64 * params.theta;
                (angle.cos() * irho, angle.sin() * irho)
            })
            .collect();

        Self {
            votes: vec![0; num_angle * num_rho],
            num_rho,
            num_angle,
            trig,
        }
    }

    #[inline]
    fn index(&self, n: usize, x: i64, y: i64) -> usize {
        let (cos_t, sin_t) = self.trig[n];
        let r = (x as f64 * cos_t + y as f64 * sin_t).round() as i64 + (self.num_rho as i64 - 1) / 2;
        let r = r.clamp(0, self.num_rho as i64 - 1) as usize;
        n * self.num_rho + r
    }

    /// Vote for every line through (x, y); returns the best bin and its count
    fn vote(&mut self, x: i64, y: i64) -> (usize, i32) {
        let mut best = (0usize, 0i32);
        for n in 0..self.num_angle {
            let idx = self.index(n, x, y);
            self.votes[idx] += 1;
            if self.votes[idx] > best.1 {
                best = (n, self.votes[idx]);
            }
        }
        best
    }

    fn unvote(&mut self, x: i64, y: i64) {
        for n in 0..self.num_angle {
            let idx = self.index(n, x, y);
            self.votes[idx] -= 1;
        }
    }
}

/// Walk state for one direction along a candidate line
#[derive(Clone, Copy)]
struct Walker {
    x: i64,
    y: i64,
    dx: i64,
    dy: i64,
    x_major: bool,
}

impl Walker {
    fn pixel(&self) -> (i64, i64) {
        if self.x_major {
            (self.x, self.y >> SHIFT)
        } else {
            (self.x >> SHIFT, self.y)
        }
    }

    fn advance(&mut self) {
        self.x += self.dx;
        self.y += self.dy;
    }
}

/// Detect line segments in a binary edge map.
///
/// Any nonzero pixel counts as an edge point. The result may be empty.
pub fn detect_segments(edges: &GrayImage, params: &HoughParams) -> Result<Vec<LineSegment>> {
    params.validate()?;

    let (width, height) = edges.dimensions();
    let (w, h) = (width as i64, height as i64);
    let mut lines = Vec::new();
    if width == 0 || height == 0 {
        return Ok(lines);
    }

    let mut acc = Accumulator::new(width, height, params);
    let mut mask = vec![false; (width * height) as usize];
    let mut points: Vec<(i64, i64)> = Vec::new();
    for (x, y, p) in edges.enumerate_pixels() {
        if p[0] != 0 {
            mask[(y * width + x) as usize] = true;
            points.push((x as i64, y as i64));
        }
    }

    tracing::trace!("Hough: {} edge points", points.len());

    let mut rng = StdRng::seed_from_u64(params.seed);
    let threshold = params.threshold as i32;
    let gap_limit = params.max_line_gap as i64;
    let min_length = params.min_line_length as i64;
    let at = |x: i64, y: i64| (y * w + x) as usize;

    let mut count = points.len();
    while count > 0 {
        // Draw a random remaining point
        let idx = rng.random_range(0..count);
        let (px, py) = points[idx];
        points[idx] = points[count - 1];
        count -= 1;

        // Already claimed by an earlier segment
        if !mask[at(px, py)] {
            continue;
        }

        let (best_n, best_votes) = acc.vote(px, py);
        if best_votes < threshold {
            continue;
        }

        // Direction of the winning line, stepped along its major axis in fixed point
        let (cos_t, sin_t) = acc.trig[best_n];
        let a = -sin_t;
        let b = cos_t;
        let start = if a.abs() > b.abs() {
            Walker {
                x: px,
                y: (py << SHIFT) + (1 << (SHIFT - 1)),
                dx: if a > 0.0 { 1 } else { -1 },
                dy: (b * (1i64 << SHIFT) as f64 / a.abs()).round() as i64,
                x_major: true,
            }
        } else {
            Walker {
                x: (px << SHIFT) + (1 << (SHIFT - 1)),
                y: py,
                dx: (a * (1i64 << SHIFT) as f64 / b.abs()).round() as i64,
                dy: if b > 0.0 { 1 } else { -1 },
                x_major: false,
            }
        };

        let walker_for = |k: usize| {
            let mut walker = start;
            if k > 0 {
                walker.dx = -walker.dx;
                walker.dy = -walker.dy;
            }
            walker
        };

        // Find the extent of the segment in both directions
        let mut ends = [(px, py); 2];
        for (k, end) in ends.iter_mut().enumerate() {
            let mut walker = walker_for(k);
            let mut gap = 0;
            loop {
                let (x, y) = walker.pixel();
                if x < 0 || x >= w || y < 0 || y >= h {
                    break;
                }
                if mask[at(x, y)] {
                    gap = 0;
                    *end = (x, y);
                } else {
                    gap += 1;
                    if gap > gap_limit {
                        break;
                    }
                }
                walker.advance();
            }
        }

        let good_line = (ends[1].0 - ends[0].0).abs() >= min_length
            || (ends[1].1 - ends[0].1).abs() >= min_length;

        // Claim the walked points; give back their votes if the segment is kept
        for (k, end) in ends.iter().enumerate() {
            let mut walker = walker_for(k);
            loop {
                let (x, y) = walker.pixel();
                if mask[at(x, y)] {
                    if good_line {
                        acc.unvote(x, y);
                    }
                    mask[at(x, y)] = false;
                }
                if (x, y) == *end {
                    break;
                }
                walker.advance();
            }
        }

        if good_line {
            lines.push(LineSegment::new(
                ends[0].0 as i32,
                ends[0].1 as i32,
                ends[1].0 as i32,
                ends[1].1 as i32,
            ));
            if params.max_lines.is_some_and(|max| lines.len() >= max) {
                break;
            }
        }
    }

    Ok(lines)
}

/// Standard Hough transform returning infinite lines as (rho, theta in radians)
pub fn detect_polar_lines(edges: &GrayImage, vote_threshold: u32, suppression_radius: u32) -> Vec<PolarLine> {
    let options = LineDetectionOptions {
        vote_threshold,
        suppression_radius,
    };
    detect_lines(edges, options)
        .into_iter()
        .map(|line| PolarLine::new(line.r, (line.angle_in_degrees as f32).to_radians()))
        .collect()
}
