// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-Storyweb-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of Storyweb and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

//! The image variant: a resizable picture frame. The actual pixels live
//! behind the persistence adapter; while the reference is unset or the
//! upload is pending the frame paints as a placeholder. Resizing keeps the
//! frame's aspect ratio.

use super::{BodyShape, PaintSpec};
use crate::geometry::Rect;
use crate::model::Node;

pub const MARGIN: f64 = 10.0;
pub const DEFAULT_EDGE: f64 = 170.0;
pub const MIN_EDGE: f64 = 40.0;

pub fn body_size(node: &Node) -> (f64, f64) {
    (
        node.width().unwrap_or(DEFAULT_EDGE),
        node.height().unwrap_or(DEFAULT_EDGE),
    )
}

pub fn bounds(node: &Node) -> Rect {
    let (width, height) = body_size(node);
    Rect::new(node.x(), node.y(), width + MARGIN, height + MARGIN)
}

/// Aspect-locked resize: the width leads, the height follows the stored
/// ratio.
pub fn apply_outer_resize(node: &mut Node, outer_width: f64, _outer_height: f64) {
    let (width, height) = body_size(node);
    let ratio = if height > 0.0 { width / height } else { 1.0 };
    let new_width = (outer_width - MARGIN).max(MIN_EDGE);
    node.set_explicit_size(new_width, new_width / ratio);
}

pub fn paint(node: &Node) -> PaintSpec {
    let frame = bounds(node);
    let (width, height) = body_size(node);
    let body = Rect::new(
        frame.x() + MARGIN / 2.0,
        frame.y() + MARGIN / 2.0,
        width,
        height,
    );
    PaintSpec::new(
        frame,
        BodyShape::Picture { rect: body },
        body,
        None,
        None,
        node.color().to_owned(),
        node.transparent(),
    )
}

#[cfg(test)]
mod tests {
    use super::{apply_outer_resize, bounds, DEFAULT_EDGE, MARGIN};
    use crate::model::{Node, NodeId, NodeKind};

    fn image() -> Node {
        Node::new(NodeId::new("i1").expect("node id"), NodeKind::Image, 0.0, 0.0)
    }

    #[test]
    fn default_frame_is_square() {
        let rect = bounds(&image());
        assert_eq!(rect.width(), DEFAULT_EDGE + MARGIN);
        assert_eq!(rect.width(), rect.height());
    }

    #[test]
    fn resize_keeps_the_aspect_ratio() {
        let mut node = image();
        node.set_explicit_size(200.0, 100.0);
        apply_outer_resize(&mut node, 310.0, 9999.0);
        assert_eq!(node.width(), Some(300.0));
        assert_eq!(node.height(), Some(150.0));
    }
}
