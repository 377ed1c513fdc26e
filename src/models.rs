/// Line segment given by its two integer endpoints, as returned by the
/// probabilistic Hough transform.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LineSegment {
    pub x1: i32,
    pub y1: i32,
    pub x2: i32,
    pub y2: i32,
}

impl LineSegment {
    pub fn new(x1: i32, y1: i32, x2: i32, y2: i32) -> Self {
        Self { x1, y1, x2, y2 }
    }

    pub fn start(&self) -> (i32, i32) {
        (self.x1, self.y1)
    }

    pub fn end(&self) -> (i32, i32) {
        (self.x2, self.y2)
    }

    pub fn length(&self) -> f32 {
        let dx = (self.x2 - self.x1) as f32;
        let dy = (self.y2 - self.y1) as f32;
        (dx * dx + dy * dy).sqrt()
    }

    /// Direction from the end point towards the start point, in `[0, 2π)`.
    pub fn angle(&self) -> f32 {
        let angle = ((self.y1 - self.y2) as f32).atan2((self.x1 - self.x2) as f32);
        if angle < 0.0 {
            angle + 2.0 * std::f32::consts::PI
        } else {
            angle
        }
    }

    /// Smallest y of the two endpoints
    pub fn top(&self) -> i32 {
        self.y1.min(self.y2)
    }
}

/// Infinite line in Hesse normal form: distance from the origin and the angle
/// of the normal, in radians.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PolarLine {
    pub rho: f32,
    pub theta: f32,
}

impl PolarLine {
    pub fn new(rho: f32, theta: f32) -> Self {
        Self { rho, theta }
    }
}
