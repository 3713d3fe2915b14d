// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-Storyweb-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of Storyweb and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

//! Scalar geometry shared by socket placement and connector routing.
//!
//! Angles are degrees, 0 = east, positive follows conventional screen
//! rotation (90 = north with y growing downward).

/// A point in scene or connector-local coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Point {
    x: f64,
    y: f64,
}

impl Point {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    pub fn x(&self) -> f64 {
        self.x
    }

    pub fn y(&self) -> f64 {
        self.y
    }

    pub fn offset(&self, dx: f64, dy: f64) -> Self {
        Self::new(self.x + dx, self.y + dy)
    }

    pub fn delta_to(&self, other: Point) -> (f64, f64) {
        (other.x - self.x, other.y - self.y)
    }

    pub fn distance_to(&self, other: Point) -> f64 {
        let (dx, dy) = self.delta_to(other);
        (dx * dx + dy * dy).sqrt()
    }

    /// Screen-rotation angle from this point towards `other`, in degrees.
    pub fn angle_to(&self, other: Point) -> f64 {
        let (dx, dy) = self.delta_to(other);
        (-dy).atan2(dx).to_degrees()
    }
}

/// An axis-aligned rectangle, origin at the top-left corner.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Rect {
    x: f64,
    y: f64,
    width: f64,
    height: f64,
}

impl Rect {
    pub fn new(x: f64, y: f64, width: f64, height: f64) -> Self {
        Self { x, y, width, height }
    }

    pub fn x(&self) -> f64 {
        self.x
    }

    pub fn y(&self) -> f64 {
        self.y
    }

    pub fn width(&self) -> f64 {
        self.width
    }

    pub fn height(&self) -> f64 {
        self.height
    }

    pub fn right(&self) -> f64 {
        self.x + self.width
    }

    pub fn bottom(&self) -> f64 {
        self.y + self.height
    }

    pub fn center(&self) -> Point {
        Point::new(self.x + self.width / 2.0, self.y + self.height / 2.0)
    }

    pub fn contains(&self, point: Point) -> bool {
        point.x() >= self.x
            && point.x() <= self.right()
            && point.y() >= self.y
            && point.y() <= self.bottom()
    }

    pub fn intersects(&self, other: &Rect) -> bool {
        self.x <= other.right()
            && other.x <= self.right()
            && self.y <= other.bottom()
            && other.y <= self.bottom()
    }

    /// The smallest rect spanning two corner points, in any corner order.
    pub fn spanning(a: Point, b: Point) -> Self {
        let x = a.x().min(b.x());
        let y = a.y().min(b.y());
        Self::new(x, y, (a.x() - b.x()).abs(), (a.y() - b.y()).abs())
    }
}

/// Position on the ring of radius `radius` around `center` for a screen
/// rotation angle in degrees.
pub fn ring_point(center: Point, radius: f64, angle_deg: f64) -> Point {
    let radians = (-angle_deg).to_radians();
    Point::new(
        center.x() + radius * radians.cos(),
        center.y() + radius * radians.sin(),
    )
}

/// Pointer angle relative to `center`, the inverse of [`ring_point`].
pub fn pointer_angle(center: Point, pointer: Point) -> f64 {
    center.angle_to(pointer)
}

/// A quadratic bezier in connector-local coordinates: start is the origin,
/// `control` and `end` are relative to it.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct QuadCurve {
    control: Point,
    end: Point,
}

impl QuadCurve {
    pub fn new(control: Point, end: Point) -> Self {
        Self { control, end }
    }

    pub fn control(&self) -> Point {
        self.control
    }

    pub fn end(&self) -> Point {
        self.end
    }

    pub fn point_at(&self, t: f64) -> Point {
        let t = t.clamp(0.0, 1.0);
        let mt = 1.0 - t;
        // B(t) with B(0) = (0, 0).
        let x = 2.0 * mt * t * self.control.x() + t * t * self.end.x();
        let y = 2.0 * mt * t * self.control.y() + t * t * self.end.y();
        Point::new(x, y)
    }

    /// Tangent direction at the curve's end, as a screen-rotation angle.
    pub fn end_angle(&self) -> f64 {
        self.point_at(0.98).angle_to(self.end)
    }

    /// Arclength approximated by uniform subdivision.
    pub fn length(&self, segments: usize) -> f64 {
        let segments = segments.max(1);
        let mut length = 0.0;
        let mut prev = Point::default();
        for i in 1..=segments {
            let next = self.point_at(i as f64 / segments as f64);
            length += prev.distance_to(next);
            prev = next;
        }
        length
    }

    /// The point at the given fraction of total arclength.
    pub fn point_at_length_fraction(&self, fraction: f64, segments: usize) -> Point {
        let segments = segments.max(1);
        let target = self.length(segments) * fraction.clamp(0.0, 1.0);
        let mut walked = 0.0;
        let mut prev = Point::default();
        for i in 1..=segments {
            let next = self.point_at(i as f64 / segments as f64);
            let step = prev.distance_to(next);
            if walked + step >= target && step > 0.0 {
                let within = (target - walked) / step;
                return Point::new(
                    prev.x() + (next.x() - prev.x()) * within,
                    prev.y() + (next.y() - prev.y()) * within,
                );
            }
            walked += step;
            prev = next;
        }
        self.end
    }
}

#[cfg(test)]
mod tests {
    use super::{ring_point, Point, QuadCurve, Rect};

    #[test]
    fn ring_point_maps_cardinal_angles_to_screen_directions() {
        let center = Point::new(100.0, 100.0);

        let east = ring_point(center, 10.0, 0.0);
        assert!((east.x() - 110.0).abs() < 1e-9);
        assert!((east.y() - 100.0).abs() < 1e-9);

        let north = ring_point(center, 10.0, 90.0);
        assert!((north.x() - 100.0).abs() < 1e-9);
        assert!((north.y() - 90.0).abs() < 1e-9);

        let south = ring_point(center, 10.0, 270.0);
        assert!((south.y() - 110.0).abs() < 1e-9);
    }

    #[test]
    fn angle_to_is_inverse_of_ring_point() {
        let center = Point::new(50.0, 50.0);
        for angle in [0.0, 45.0, 90.0, 135.0, 180.0] {
            let on_ring = ring_point(center, 20.0, angle);
            let measured = center.angle_to(on_ring);
            assert!(
                (measured - angle).abs() < 1e-6,
                "angle {angle} measured as {measured}"
            );
        }
    }

    #[test]
    fn rect_spanning_normalizes_corner_order() {
        let rect = Rect::spanning(Point::new(30.0, 40.0), Point::new(10.0, 20.0));
        assert_eq!(rect, Rect::new(10.0, 20.0, 20.0, 20.0));
        assert!(rect.contains(Point::new(15.0, 25.0)));
        assert!(!rect.contains(Point::new(35.0, 25.0)));
    }

    #[test]
    fn quad_curve_starts_at_origin_and_ends_at_end() {
        let curve = QuadCurve::new(Point::new(0.0, 50.0), Point::new(100.0, 100.0));
        assert_eq!(curve.point_at(0.0), Point::default());
        assert_eq!(curve.point_at(1.0), curve.end());
    }

    #[test]
    fn quad_curve_length_is_at_least_the_chord() {
        let curve = QuadCurve::new(Point::new(0.0, 60.0), Point::new(120.0, 0.0));
        let chord = Point::default().distance_to(curve.end());
        assert!(curve.length(64) >= chord);
    }

    #[test]
    fn quad_curve_midlength_point_is_on_the_curve() {
        let curve = QuadCurve::new(Point::new(50.0, 50.0), Point::new(100.0, 0.0));
        let mid = curve.point_at_length_fraction(0.5, 64);
        assert!(mid.x() > 0.0 && mid.x() < 100.0);
        assert!(mid.y() > 0.0);
    }
}
