// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-Storyweb-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of Storyweb and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

use super::ids::{EntityId, ImageRef, NodeId};
use crate::geometry::Point;

/// Built-in event subtypes understood by the default icon catalog.
pub const SUBTYPE_GOAL: &str = "goal";
pub const SUBTYPE_CONFLICT: &str = "conflict";
pub const SUBTYPE_BACKSTORY: &str = "backstory";
pub const SUBTYPE_DISTURBANCE: &str = "disturbance";
pub const SUBTYPE_QUESTION: &str = "question";
pub const SUBTYPE_SETUP: &str = "setup";
pub const SUBTYPE_FORESHADOWING: &str = "foreshadowing";

pub const DEFAULT_FONT_SIZE: u32 = 12;
pub const DEFAULT_NODE_COLOR: &str = "#000000";

/// The closed set of node variants.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NodeKind {
    Character,
    Event,
    Note,
    Image,
    Icon,
}

impl NodeKind {
    pub fn tag(&self) -> &'static str {
        match self {
            Self::Character => "character",
            Self::Event => "event",
            Self::Note => "note",
            Self::Image => "image",
            Self::Icon => "icon",
        }
    }

    pub fn from_tag(tag: &str) -> Option<Self> {
        match tag {
            "character" => Some(Self::Character),
            "event" => Some(Self::Event),
            "note" => Some(Self::Note),
            "image" => Some(Self::Image),
            "icon" => Some(Self::Icon),
            _ => None,
        }
    }

    /// Whether this variant carries an explicit width/height pair and a
    /// resize handle.
    pub fn resizable(&self) -> bool {
        matches!(self, Self::Note | Self::Image)
    }
}

/// A positioned, typed visual entity in a diagram.
///
/// Position and explicit sizes are clamped non-negative at every write; the
/// rest of the fields are plain data that the item layer interprets.
#[derive(Debug, Clone, PartialEq)]
pub struct Node {
    node_id: NodeId,
    kind: NodeKind,
    subtype: String,
    x: f64,
    y: f64,
    size: u32,
    width: Option<f64>,
    height: Option<f64>,
    color: String,
    icon: Option<String>,
    text: Option<String>,
    bold: bool,
    italic: bool,
    underline: bool,
    entity_ref: Option<EntityId>,
    image_ref: Option<ImageRef>,
    transparent: bool,
}

impl Node {
    pub fn new(node_id: NodeId, kind: NodeKind, x: f64, y: f64) -> Self {
        Self {
            node_id,
            kind,
            subtype: String::new(),
            x: x.max(0.0),
            y: y.max(0.0),
            size: DEFAULT_FONT_SIZE,
            width: None,
            height: None,
            color: DEFAULT_NODE_COLOR.to_owned(),
            icon: None,
            text: None,
            bold: false,
            italic: false,
            underline: false,
            entity_ref: None,
            image_ref: None,
            transparent: false,
        }
    }

    pub fn node_id(&self) -> &NodeId {
        &self.node_id
    }

    pub fn kind(&self) -> NodeKind {
        self.kind
    }

    pub fn subtype(&self) -> &str {
        &self.subtype
    }

    pub fn set_subtype(&mut self, subtype: impl Into<String>) {
        self.subtype = subtype.into();
    }

    pub fn x(&self) -> f64 {
        self.x
    }

    pub fn y(&self) -> f64 {
        self.y
    }

    pub fn position(&self) -> Point {
        Point::new(self.x, self.y)
    }

    pub fn set_position(&mut self, position: Point) {
        self.x = position.x().max(0.0);
        self.y = position.y().max(0.0);
    }

    pub fn size(&self) -> u32 {
        self.size
    }

    pub fn set_size(&mut self, size: u32) {
        self.size = size;
    }

    pub fn width(&self) -> Option<f64> {
        self.width
    }

    pub fn height(&self) -> Option<f64> {
        self.height
    }

    pub fn set_explicit_size(&mut self, width: f64, height: f64) {
        self.width = Some(width.max(0.0));
        self.height = Some(height.max(0.0));
    }

    pub fn clear_explicit_size(&mut self) {
        self.width = None;
        self.height = None;
    }

    pub fn color(&self) -> &str {
        &self.color
    }

    pub fn set_color(&mut self, color: impl Into<String>) {
        self.color = color.into();
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

    pub fn bold(&self) -> bool {
        self.bold
    }

    pub fn italic(&self) -> bool {
        self.italic
    }

    pub fn underline(&self) -> bool {
        self.underline
    }

    pub fn set_font_settings(
        &mut self,
        size: Option<u32>,
        bold: Option<bool>,
        italic: Option<bool>,
        underline: Option<bool>,
    ) {
        if let Some(size) = size {
            self.size = size;
        }
        if let Some(bold) = bold {
            self.bold = bold;
        }
        if let Some(italic) = italic {
            self.italic = italic;
        }
        if let Some(underline) = underline {
            self.underline = underline;
        }
    }

    pub fn entity_ref(&self) -> Option<&EntityId> {
        self.entity_ref.as_ref()
    }

    pub fn set_entity_ref(&mut self, entity_ref: Option<EntityId>) {
        self.entity_ref = entity_ref;
    }

    pub fn image_ref(&self) -> Option<&ImageRef> {
        self.image_ref.as_ref()
    }

    pub fn set_image_ref(&mut self, image_ref: Option<ImageRef>) {
        self.image_ref = image_ref;
    }

    pub fn transparent(&self) -> bool {
        self.transparent
    }

    pub fn set_transparent(&mut self, transparent: bool) {
        self.transparent = transparent;
    }

    /// Re-type the node in place, preserving id and position.
    ///
    /// Derived presentation fields (icon, color, size) are reset so the item
    /// layer re-derives them for the new kind/subtype.
    pub fn convert_kind(&mut self, kind: NodeKind, subtype: impl Into<String>) {
        self.kind = kind;
        self.subtype = subtype.into();
        self.icon = None;
        self.color = DEFAULT_NODE_COLOR.to_owned();
        self.size = DEFAULT_FONT_SIZE;
        if !kind.resizable() {
            self.width = None;
            self.height = None;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::{Node, NodeKind, DEFAULT_FONT_SIZE, DEFAULT_NODE_COLOR};
    use crate::geometry::Point;
    use crate::model::NodeId;

    fn node(kind: NodeKind) -> Node {
        Node::new(NodeId::new("n1").expect("node id"), kind, 10.0, 20.0)
    }

    #[test]
    fn new_node_clamps_negative_position() {
        let node = Node::new(
            NodeId::new("n1").expect("node id"),
            NodeKind::Event,
            -5.0,
            -1.0,
        );
        assert_eq!(node.x(), 0.0);
        assert_eq!(node.y(), 0.0);
    }

    #[test]
    fn set_position_clamps_negative_coordinates() {
        let mut node = node(NodeKind::Event);
        node.set_position(Point::new(-3.0, 40.0));
        assert_eq!(node.position(), Point::new(0.0, 40.0));
    }

    #[test]
    fn font_settings_update_only_the_given_fields() {
        let mut node = node(NodeKind::Event);
        node.set_font_settings(Some(18), None, Some(true), None);
        assert_eq!(node.size(), 18);
        assert!(!node.bold());
        assert!(node.italic());
        assert!(!node.underline());
    }

    #[test]
    fn convert_kind_preserves_id_and_position_and_resets_presentation() {
        let mut node = node(NodeKind::Event);
        node.set_icon(Some("goal"));
        node.set_color("#ff0000");
        node.set_size(20);

        node.convert_kind(NodeKind::Icon, "comment");

        assert_eq!(node.node_id().as_str(), "n1");
        assert_eq!(node.position(), Point::new(10.0, 20.0));
        assert_eq!(node.kind(), NodeKind::Icon);
        assert_eq!(node.subtype(), "comment");
        assert_eq!(node.icon(), None);
        assert_eq!(node.color(), DEFAULT_NODE_COLOR);
        assert_eq!(node.size(), DEFAULT_FONT_SIZE);
    }

    #[test]
    fn kind_tags_round_trip() {
        for kind in [
            NodeKind::Character,
            NodeKind::Event,
            NodeKind::Note,
            NodeKind::Image,
            NodeKind::Icon,
        ] {
            assert_eq!(NodeKind::from_tag(kind.tag()), Some(kind));
        }
        assert_eq!(NodeKind::from_tag("sticker"), None);
    }
}
