// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-Storyweb-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of Storyweb and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

//! Connector path computation.
//!
//! Paths are expressed in connector-local coordinates pinned to the source
//! socket center: the `origin` is the only scene-space value, everything
//! else (end, control point, anchors) is relative to it. A curved control
//! point therefore commutes with node movement.

use crate::geometry::{Point, QuadCurve};
use crate::model::ConnectorShape;

/// Endpoints closer than this degrade an auto-curved connector to a line.
pub const PROXIMITY_DY: f64 = 5.0;
pub const PROXIMITY_DX: f64 = 100.0;

/// Edge length of the circular icon badge drawn on a connector.
pub const ICON_BADGE_SIZE: f64 = 32.0;
/// Vertical gap between an icon badge and the label below it.
pub const LABEL_GAP: f64 = 4.0;

const ARC_SEGMENTS: usize = 64;

/// A drawable connector path with arrowhead rotations and icon/label
/// anchors, all in connector-local coordinates except `origin`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ConnectorPath {
    origin: Point,
    end: Point,
    control: Option<Point>,
    start_angle: f64,
    end_angle: f64,
    icon_anchor: Option<Point>,
    label_anchor: Option<Point>,
}

impl ConnectorPath {
    /// Scene position of the path's local origin (the source socket center).
    pub fn origin(&self) -> Point {
        self.origin
    }

    pub fn end(&self) -> Point {
        self.end
    }

    pub fn control(&self) -> Option<Point> {
        self.control
    }

    /// Arrowhead rotation at the source end, pointing out of the path.
    pub fn start_angle(&self) -> f64 {
        self.start_angle
    }

    /// Arrowhead rotation at the target end.
    pub fn end_angle(&self) -> f64 {
        self.end_angle
    }

    /// Center of the icon badge, when the connector carries an icon.
    pub fn icon_anchor(&self) -> Option<Point> {
        self.icon_anchor
    }

    /// Top-center anchor of the text label, when the connector carries one.
    pub fn label_anchor(&self) -> Option<Point> {
        self.label_anchor
    }
}

/// Computes the path from `origin` (source socket center, scene space) to
/// `target` (target socket center, scene space).
pub fn route(
    origin: Point,
    target: Point,
    shape: ConnectorShape,
    has_icon: bool,
    has_label: bool,
) -> ConnectorPath {
    let (dx, dy) = origin.delta_to(target);
    let end = Point::new(dx, dy);

    let (midpoint, start_angle, end_angle) = match shape {
        ConnectorShape::Linear => {
            let end_angle = Point::default().angle_to(end);
            let start_angle = end.angle_to(Point::default());
            (Point::new(dx / 2.0, dy / 2.0), start_angle, end_angle)
        }
        ConnectorShape::Curved { control } => {
            let curve = QuadCurve::new(control, end);
            let start_angle = curve.point_at(0.02).angle_to(Point::default());
            (
                curve.point_at_length_fraction(0.5, ARC_SEGMENTS),
                start_angle,
                curve.end_angle(),
            )
        }
    };

    let icon_anchor = has_icon.then_some(midpoint);
    let label_anchor = has_label.then(|| {
        if has_icon {
            midpoint.offset(0.0, ICON_BADGE_SIZE / 2.0 + LABEL_GAP)
        } else {
            midpoint
        }
    });

    ConnectorPath {
        origin,
        end,
        control: shape.control_point(),
        start_angle,
        end_angle,
        icon_anchor,
        label_anchor,
    }
}

/// Whether two socket centers are close enough that a curve would look
/// cramped and the connector should fall back to a straight line.
pub fn in_proximity(dx: f64, dy: f64) -> bool {
    dy.abs() < PROXIMITY_DY || dx.abs() < PROXIMITY_DX
}

/// Control point for a freshly drawn curved connector, before the user has
/// dragged it anywhere. Sockets on the lower half of a node bow the curve
/// the other way.
pub fn default_control_point(dx: f64, dy: f64, source_angle: f64) -> Point {
    if source_angle <= 180.0 {
        Point::new(0.0, dy / 2.0)
    } else {
        Point::new(dx / 2.0, -dy / 2.0)
    }
}

#[cfg(test)]
mod tests {
    use super::{default_control_point, in_proximity, route, ConnectorPath, ICON_BADGE_SIZE};
    use crate::geometry::Point;
    use crate::model::ConnectorShape;

    fn linear(origin: Point, target: Point) -> ConnectorPath {
        route(origin, target, ConnectorShape::Linear, false, false)
    }

    #[test]
    fn linear_route_ends_at_target_relative_to_origin() {
        let path = linear(Point::new(100.0, 100.0), Point::new(300.0, 150.0));
        assert_eq!(path.origin(), Point::new(100.0, 100.0));
        assert_eq!(path.end(), Point::new(200.0, 50.0));
        assert_eq!(path.control(), None);
    }

    #[test]
    fn linear_arrow_angle_points_along_the_segment() {
        let east = linear(Point::default(), Point::new(100.0, 0.0));
        assert!((east.end_angle() - 0.0).abs() < 1e-9);

        let north = linear(Point::new(0.0, 100.0), Point::new(0.0, 0.0));
        assert!((north.end_angle() - 90.0).abs() < 1e-9);

        let back = linear(Point::new(100.0, 0.0), Point::new(0.0, 0.0));
        assert!((back.end_angle().abs() - 180.0).abs() < 1e-9);
    }

    #[test]
    fn start_angle_points_back_out_of_the_source() {
        let path = linear(Point::default(), Point::new(100.0, 0.0));
        assert!((path.start_angle().abs() - 180.0).abs() < 1e-9);
    }

    #[test]
    fn curved_route_keeps_the_explicit_control_point() {
        let control = Point::new(10.0, 80.0);
        let path = route(
            Point::new(50.0, 50.0),
            Point::new(250.0, 250.0),
            ConnectorShape::Curved { control },
            false,
            false,
        );
        assert_eq!(path.control(), Some(control));
        assert_eq!(path.end(), Point::new(200.0, 200.0));
    }

    #[test]
    fn icon_sits_at_half_arclength_and_label_below_it() {
        let path = route(
            Point::default(),
            Point::new(200.0, 0.0),
            ConnectorShape::Linear,
            true,
            true,
        );
        let icon = path.icon_anchor().expect("icon anchor");
        let label = path.label_anchor().expect("label anchor");
        assert_eq!(icon, Point::new(100.0, 0.0));
        assert!(label.y() > icon.y() + ICON_BADGE_SIZE / 2.0 - 1e-9);
        assert_eq!(label.x(), icon.x());
    }

    #[test]
    fn label_without_icon_centers_on_the_path() {
        let path = route(
            Point::default(),
            Point::new(200.0, 100.0),
            ConnectorShape::Linear,
            false,
            true,
        );
        assert_eq!(path.icon_anchor(), None);
        assert_eq!(path.label_anchor(), Some(Point::new(100.0, 50.0)));
    }

    #[test]
    fn proximity_degrades_short_or_flat_spans() {
        assert!(in_proximity(50.0, 300.0));
        assert!(in_proximity(500.0, 2.0));
        assert!(!in_proximity(150.0, 80.0));
    }

    #[test]
    fn default_control_point_mirrors_for_lower_sockets() {
        let upper = default_control_point(200.0, 100.0, 90.0);
        assert_eq!(upper, Point::new(0.0, 50.0));

        let lower = default_control_point(200.0, 100.0, 270.0);
        assert_eq!(lower, Point::new(100.0, -50.0));
    }
}
