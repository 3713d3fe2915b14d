// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-Storyweb-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of Storyweb and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

use super::ids::{ConnectorId, NodeId};
use crate::geometry::Point;

pub const DEFAULT_PEN_WIDTH: u32 = 2;

/// Address of a socket: the owning node plus the socket's angle in degrees.
#[derive(Debug, Clone, PartialEq)]
pub struct SocketRef {
    node_id: NodeId,
    angle: f64,
}

impl SocketRef {
    pub fn new(node_id: NodeId, angle: f64) -> Self {
        Self { node_id, angle }
    }

    pub fn node_id(&self) -> &NodeId {
        &self.node_id
    }

    pub fn angle(&self) -> f64 {
        self.angle
    }

    pub fn set_angle(&mut self, angle: f64) {
        self.angle = angle;
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PenStyle {
    Solid,
    Dash,
    Dot,
}

impl PenStyle {
    pub fn tag(&self) -> &'static str {
        match self {
            Self::Solid => "solid",
            Self::Dash => "dash",
            Self::Dot => "dot",
        }
    }

    pub fn from_tag(tag: &str) -> Option<Self> {
        match tag {
            "solid" => Some(Self::Solid),
            "dash" => Some(Self::Dash),
            "dot" => Some(Self::Dot),
            _ => None,
        }
    }
}

/// How the connector's path is routed between its sockets.
///
/// The curved control point lives in the connector's local coordinate space,
/// pinned to the source socket: moving the source node carries the curve
/// along without invalidating a user-dragged control point.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ConnectorShape {
    Linear,
    Curved { control: Point },
}

impl ConnectorShape {
    pub fn control_point(&self) -> Option<Point> {
        match self {
            Self::Linear => None,
            Self::Curved { control } => Some(*control),
        }
    }
}

/// A directed, styled edge between two sockets on distinct nodes.
#[derive(Debug, Clone, PartialEq)]
pub struct Connector {
    connector_id: ConnectorId,
    source: SocketRef,
    target: SocketRef,
    shape: ConnectorShape,
    pen_style: PenStyle,
    pen_width: u32,
    color: Option<String>,
    icon: Option<String>,
    text: Option<String>,
    arrow_start: bool,
    arrow_end: bool,
}

impl Connector {
    pub fn new(connector_id: ConnectorId, source: SocketRef, target: SocketRef) -> Self {
        Self {
            connector_id,
            source,
            target,
            shape: ConnectorShape::Linear,
            pen_style: PenStyle::Solid,
            pen_width: DEFAULT_PEN_WIDTH,
            color: None,
            icon: None,
            text: None,
            arrow_start: false,
            arrow_end: true,
        }
    }

    pub fn connector_id(&self) -> &ConnectorId {
        &self.connector_id
    }

    pub fn source(&self) -> &SocketRef {
        &self.source
    }

    pub fn target(&self) -> &SocketRef {
        &self.target
    }

    pub fn set_source(&mut self, source: SocketRef) {
        self.source = source;
    }

    pub fn set_target(&mut self, target: SocketRef) {
        self.target = target;
    }

    pub fn touches(&self, node_id: &NodeId) -> bool {
        self.source.node_id() == node_id || self.target.node_id() == node_id
    }

    pub fn shape(&self) -> ConnectorShape {
        self.shape
    }

    pub fn set_shape(&mut self, shape: ConnectorShape) {
        self.shape = shape;
    }

    pub fn pen_style(&self) -> PenStyle {
        self.pen_style
    }

    pub fn set_pen_style(&mut self, pen_style: PenStyle) {
        self.pen_style = pen_style;
    }

    pub fn pen_width(&self) -> u32 {
        self.pen_width
    }

    pub fn set_pen_width(&mut self, pen_width: u32) {
        self.pen_width = pen_width;
    }

    /// Explicit color override; `None` means the connector renders with the
    /// target node's current color.
    pub fn color(&self) -> Option<&str> {
        self.color.as_deref()
    }

    pub fn set_color<T: Into<String>>(&mut self, color: Option<T>) {
        self.color = color.map(Into::into);
    }

    pub fn icon(&self) -> Option<&str> {
        self.icon.as_deref()
    }

    pub fn set_icon<T: Into<String>>(&mut self, icon: Option<T>) {
        self.icon = icon.map(Into::into);
    }

    pub fn text(&self) -> Option<&str> {
        self.text.as_deref()
    }

    pub fn set_text<T: Into<String>>(&mut self, text: Option<T>) {
        self.text = text.map(Into::into);
    }

    pub fn arrow_start(&self) -> bool {
        self.arrow_start
    }

    pub fn arrow_end(&self) -> bool {
        self.arrow_end
    }

    pub fn set_arrowheads(&mut self, start: bool, end: bool) {
        self.arrow_start = start;
        self.arrow_end = end;
    }
}

#[cfg(test)]
mod tests {
    use super::{Connector, ConnectorShape, PenStyle, SocketRef, DEFAULT_PEN_WIDTH};
    use crate::geometry::Point;
    use crate::model::{ConnectorId, NodeId};

    fn connector() -> Connector {
        Connector::new(
            ConnectorId::new("c1").expect("connector id"),
            SocketRef::new(NodeId::new("a").expect("node id"), 0.0),
            SocketRef::new(NodeId::new("b").expect("node id"), 180.0),
        )
    }

    #[test]
    fn new_connector_defaults_to_linear_solid_with_end_arrow() {
        let connector = connector();
        assert_eq!(connector.shape(), ConnectorShape::Linear);
        assert_eq!(connector.pen_style(), PenStyle::Solid);
        assert_eq!(connector.pen_width(), DEFAULT_PEN_WIDTH);
        assert_eq!(connector.color(), None);
        assert!(!connector.arrow_start());
        assert!(connector.arrow_end());
    }

    #[test]
    fn touches_matches_either_endpoint() {
        let connector = connector();
        let a = NodeId::new("a").expect("node id");
        let b = NodeId::new("b").expect("node id");
        let c = NodeId::new("c").expect("node id");
        assert!(connector.touches(&a));
        assert!(connector.touches(&b));
        assert!(!connector.touches(&c));
    }

    #[test]
    fn curved_shape_exposes_its_control_point() {
        let mut connector = connector();
        assert_eq!(connector.shape().control_point(), None);

        let control = Point::new(12.5, -40.0);
        connector.set_shape(ConnectorShape::Curved { control });
        assert_eq!(connector.shape().control_point(), Some(control));
    }

    #[test]
    fn pen_style_tags_round_trip() {
        for style in [PenStyle::Solid, PenStyle::Dash, PenStyle::Dot] {
            assert_eq!(PenStyle::from_tag(style.tag()), Some(style));
        }
        assert_eq!(PenStyle::from_tag("wavy"), None);
    }
}
