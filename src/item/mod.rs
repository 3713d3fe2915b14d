// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-Storyweb-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of Storyweb and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

//! Per-variant node behaviors behind a small capability surface.
//!
//! The scene and the command stack never branch on type names; everything
//! they need goes through `compute_bounds`, `socket_layout`/`socket_point`,
//! `paint_spec`, and the resize helpers in this module, which dispatch on
//! [`NodeKind`] into the variant submodules.

pub mod character;
pub mod event;
pub mod icon;
pub mod image;
pub mod note;

use std::collections::BTreeMap;

use crate::geometry::{pointer_angle, ring_point, Point, Rect};
use crate::layout::metrics::{FontSpec, TextMeasurer};
use crate::model::{
    Node, NodeKind, SUBTYPE_BACKSTORY, SUBTYPE_CONFLICT, SUBTYPE_DISTURBANCE,
    SUBTYPE_FORESHADOWING, SUBTYPE_GOAL, SUBTYPE_QUESTION, SUBTYPE_SETUP,
};

/// The eight canonical socket angles of rectangular variants, E/NE/N/NW/W/SW/S/SE.
pub const FIXED_SOCKET_ANGLES: [f64; 8] =
    [0.0, 45.0, 90.0, 135.0, 180.0, 225.0, 270.0, 315.0];

/// Pointer distance within which a socket position counts as hit.
pub const SOCKET_HIT_RADIUS: f64 = 8.0;

/// Edge length of the square resize handle of resizable variants.
pub const RESIZE_HANDLE_SIZE: f64 = 12.0;

/// How a variant exposes its sockets.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum SocketLayout {
    /// Pre-allocated sockets at canonical angles.
    Fixed(&'static [f64]),
    /// One socket that follows the pointer angle while hovered/selected.
    Mobile,
}

pub fn socket_layout(kind: NodeKind) -> SocketLayout {
    match kind {
        NodeKind::Character | NodeKind::Icon => SocketLayout::Mobile,
        NodeKind::Event | NodeKind::Note | NodeKind::Image => {
            SocketLayout::Fixed(&FIXED_SOCKET_ANGLES)
        }
    }
}

/// Width of the margin band between a variant's body and its outer bounds.
pub fn margin(kind: NodeKind) -> f64 {
    match kind {
        NodeKind::Character => character::MARGIN,
        NodeKind::Event => event::MARGIN,
        NodeKind::Note => note::MARGIN,
        NodeKind::Image => image::MARGIN,
        NodeKind::Icon => icon::MARGIN,
    }
}

/// Outer bounds of a node at its current position.
///
/// Deterministic and side-effect-free: the scene queries this before
/// committing a resize, and socket placement derives from it.
pub fn compute_bounds(node: &Node, measurer: &dyn TextMeasurer) -> Rect {
    match node.kind() {
        NodeKind::Character => character::bounds(node),
        NodeKind::Event => event::bounds(node, measurer),
        NodeKind::Note => note::bounds(node),
        NodeKind::Image => image::bounds(node),
        NodeKind::Icon => icon::bounds(node),
    }
}

/// Socket center for a given angle, on the ring that runs through the
/// middle of the node's margin band.
pub fn socket_point(node: &Node, bounds: Rect, angle: f64) -> Point {
    let m = margin(node.kind());
    let rx = bounds.width() / 2.0 - m / 2.0;
    let ry = bounds.height() / 2.0 - m / 2.0;
    let center = bounds.center();
    let radians = (-angle).to_radians();
    Point::new(
        center.x() + rx * radians.cos(),
        center.y() + ry * radians.sin(),
    )
}

/// The socket under the pointer, if any.
///
/// Fixed layouts test each canonical socket; mobile layouts test the ring
/// itself and return the pointer's own angle, which is how the single
/// movable socket tracks the pointer.
pub fn socket_at(node: &Node, bounds: Rect, pointer: Point) -> Option<f64> {
    match socket_layout(node.kind()) {
        SocketLayout::Fixed(angles) => angles
            .iter()
            .copied()
            .find(|&angle| socket_point(node, bounds, angle).distance_to(pointer) <= SOCKET_HIT_RADIUS),
        SocketLayout::Mobile => {
            let m = margin(node.kind());
            let radius = bounds.width() / 2.0 - m / 2.0;
            let center = bounds.center();
            let angle = pointer_angle(center, pointer);
            let on_ring = ring_point(center, radius, angle);
            (on_ring.distance_to(pointer) <= SOCKET_HIT_RADIUS).then_some(angle)
        }
    }
}

/// Snaps an arbitrary angle to the nearest canonical socket of a fixed
/// layout; mobile layouts keep the angle as-is.
pub fn snap_socket_angle(kind: NodeKind, angle: f64) -> f64 {
    match socket_layout(kind) {
        SocketLayout::Mobile => angle,
        SocketLayout::Fixed(_) => {
            let normalized = angle.rem_euclid(360.0);
            (normalized / 45.0).round().rem_euclid(8.0) * 45.0
        }
    }
}

/// The resize handle rect of resizable variants, bottom-right corner.
pub fn resize_handle(node: &Node, bounds: Rect) -> Option<Rect> {
    node.kind().resizable().then(|| {
        Rect::new(
            bounds.right() - RESIZE_HANDLE_SIZE,
            bounds.bottom() - RESIZE_HANDLE_SIZE,
            RESIZE_HANDLE_SIZE,
            RESIZE_HANDLE_SIZE,
        )
    })
}

/// Maps an outer-bounds resize to the node's stored explicit size.
/// Image nodes keep their aspect ratio. Non-resizable kinds ignore this.
pub fn apply_outer_resize(node: &mut Node, outer_width: f64, outer_height: f64) {
    match node.kind() {
        NodeKind::Note => note::apply_outer_resize(node, outer_width, outer_height),
        NodeKind::Image => image::apply_outer_resize(node, outer_width, outer_height),
        _ => {}
    }
}

/// Renderer-agnostic paint data for one node.
#[derive(Debug, Clone, PartialEq)]
pub struct PaintSpec {
    frame: Rect,
    body: BodyShape,
    selection_outline: Rect,
    text: Option<TextSpec>,
    icon: Option<IconSpec>,
    color: String,
    transparent: bool,
}

impl PaintSpec {
    pub fn frame(&self) -> Rect {
        self.frame
    }

    pub fn body(&self) -> &BodyShape {
        &self.body
    }

    /// Rect to outline when the node is selected.
    pub fn selection_outline(&self) -> Rect {
        self.selection_outline
    }

    pub fn text(&self) -> Option<&TextSpec> {
        self.text.as_ref()
    }

    pub fn icon(&self) -> Option<&IconSpec> {
        self.icon.as_ref()
    }

    pub fn color(&self) -> &str {
        &self.color
    }

    pub fn transparent(&self) -> bool {
        self.transparent
    }

    pub(crate) fn new(
        frame: Rect,
        body: BodyShape,
        selection_outline: Rect,
        text: Option<TextSpec>,
        icon: Option<IconSpec>,
        color: String,
        transparent: bool,
    ) -> Self {
        Self { frame, body, selection_outline, text, icon, color, transparent }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum BodyShape {
    RoundedRect { rect: Rect, corner_radius: f64 },
    /// Avatar square resolved from the node's entity reference, or a
    /// placeholder when unresolved.
    Avatar { rect: Rect },
    /// Image area resolved from the node's image reference, or a
    /// placeholder while empty/pending.
    Picture { rect: Rect },
    Glyph { rect: Rect },
}

#[derive(Debug, Clone, PartialEq)]
pub struct TextSpec {
    rect: Rect,
    content: String,
    font: FontSpec,
}

impl TextSpec {
    pub(crate) fn new(rect: Rect, content: String, font: FontSpec) -> Self {
        Self { rect, content, font }
    }

    pub fn rect(&self) -> Rect {
        self.rect
    }

    pub fn content(&self) -> &str {
        &self.content
    }

    pub fn font(&self) -> &FontSpec {
        &self.font
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct IconSpec {
    rect: Rect,
    name: String,
    color: String,
}

impl IconSpec {
    pub(crate) fn new(rect: Rect, name: String, color: String) -> Self {
        Self { rect, name, color }
    }

    pub fn rect(&self) -> Rect {
        self.rect
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn color(&self) -> &str {
        &self.color
    }
}

pub fn paint_spec(node: &Node, measurer: &dyn TextMeasurer) -> PaintSpec {
    match node.kind() {
        NodeKind::Character => character::paint(node),
        NodeKind::Event => event::paint(node, measurer),
        NodeKind::Note => note::paint(node),
        NodeKind::Image => image::paint(node),
        NodeKind::Icon => icon::paint(node),
    }
}

/// Immutable subtype → icon lookup, injected into the scene instead of
/// living as an ambient global.
#[derive(Debug, Clone)]
pub struct IconCatalog {
    by_subtype: BTreeMap<String, String>,
}

impl IconCatalog {
    pub fn empty() -> Self {
        Self { by_subtype: BTreeMap::new() }
    }

    /// The catalog of built-in event subtypes.
    pub fn builtin() -> Self {
        let mut catalog = Self::empty();
        for (subtype, icon) in [
            (SUBTYPE_GOAL, "target"),
            (SUBTYPE_CONFLICT, "swords"),
            (SUBTYPE_BACKSTORY, "history"),
            (SUBTYPE_DISTURBANCE, "bolt"),
            (SUBTYPE_QUESTION, "question-sign"),
            (SUBTYPE_SETUP, "seedling"),
            (SUBTYPE_FORESHADOWING, "crystal-ball"),
        ] {
            catalog.insert(subtype, icon);
        }
        catalog
    }

    pub fn insert(&mut self, subtype: impl Into<String>, icon: impl Into<String>) {
        self.by_subtype.insert(subtype.into(), icon.into());
    }

    pub fn icon_for(&self, subtype: &str) -> Option<&str> {
        self.by_subtype.get(subtype).map(String::as_str)
    }
}

impl Default for IconCatalog {
    fn default() -> Self {
        Self::builtin()
    }
}

#[cfg(test)]
mod tests {
    use super::{
        compute_bounds, snap_socket_angle, socket_at, socket_layout, socket_point, IconCatalog,
        SocketLayout, FIXED_SOCKET_ANGLES,
    };
    use crate::layout::metrics::CharCellMeasurer;
    use crate::model::{Node, NodeId, NodeKind, SUBTYPE_GOAL};

    fn node(kind: NodeKind) -> Node {
        Node::new(NodeId::new("n1").expect("node id"), kind, 100.0, 100.0)
    }

    #[test]
    fn socket_point_is_deterministic() {
        let node = node(NodeKind::Event);
        let bounds = compute_bounds(&node, &CharCellMeasurer);
        for angle in FIXED_SOCKET_ANGLES {
            let first = socket_point(&node, bounds, angle);
            let second = socket_point(&node, bounds, angle);
            assert_eq!(first, second, "angle {angle}");
        }
    }

    #[test]
    fn east_socket_sits_right_of_center_on_the_margin_band() {
        let node = node(NodeKind::Character);
        let bounds = compute_bounds(&node, &CharCellMeasurer);
        let east = socket_point(&node, bounds, 0.0);
        let center = bounds.center();
        assert!(east.x() > center.x());
        assert!((east.y() - center.y()).abs() < 1e-9);
        assert!(east.x() < bounds.right());
    }

    #[test]
    fn fixed_layouts_hit_only_canonical_sockets() {
        let node = node(NodeKind::Event);
        let bounds = compute_bounds(&node, &CharCellMeasurer);
        let east = socket_point(&node, bounds, 0.0);

        assert_eq!(socket_at(&node, bounds, east), Some(0.0));
        assert_eq!(socket_at(&node, bounds, bounds.center()), None);
    }

    #[test]
    fn mobile_layouts_return_the_pointer_angle() {
        let node = node(NodeKind::Character);
        let bounds = compute_bounds(&node, &CharCellMeasurer);
        let probe = socket_point(&node, bounds, 30.0);

        let hit = socket_at(&node, bounds, probe).expect("on ring");
        assert!((hit - 30.0).abs() < 1.0);
    }

    #[test]
    fn snap_rounds_to_nearest_canonical_angle_for_fixed_layouts() {
        assert_eq!(snap_socket_angle(NodeKind::Event, 47.0), 45.0);
        assert_eq!(snap_socket_angle(NodeKind::Event, 350.0), 0.0);
        assert_eq!(snap_socket_angle(NodeKind::Note, -44.0), 315.0);
        assert_eq!(snap_socket_angle(NodeKind::Character, 123.4), 123.4);
    }

    #[test]
    fn character_and_icon_variants_expose_a_mobile_socket() {
        assert_eq!(socket_layout(NodeKind::Character), SocketLayout::Mobile);
        assert_eq!(socket_layout(NodeKind::Icon), SocketLayout::Mobile);
        assert!(matches!(
            socket_layout(NodeKind::Event),
            SocketLayout::Fixed(_)
        ));
    }

    #[test]
    fn builtin_catalog_maps_known_subtypes() {
        let catalog = IconCatalog::builtin();
        assert_eq!(catalog.icon_for(SUBTYPE_GOAL), Some("target"));
        assert_eq!(catalog.icon_for("unheard-of"), None);
    }
}
