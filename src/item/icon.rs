// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-Storyweb-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of Storyweb and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

//! The icon variant: a small fixed-size sticker glyph (comments, markers).

use super::{BodyShape, IconSpec, PaintSpec};
use crate::geometry::Rect;
use crate::model::Node;

pub const SIZE: f64 = 28.0;
pub const MARGIN: f64 = 0.0;

pub fn bounds(node: &Node) -> Rect {
    Rect::new(node.x(), node.y(), SIZE, SIZE)
}

pub fn paint(node: &Node) -> PaintSpec {
    let frame = bounds(node);
    let icon = node
        .icon()
        .map(|name| IconSpec::new(frame, name.to_owned(), node.color().to_owned()));
    PaintSpec::new(
        frame,
        BodyShape::Glyph { rect: frame },
        frame,
        None,
        icon,
        node.color().to_owned(),
        node.transparent(),
    )
}

#[cfg(test)]
mod tests {
    use super::{bounds, paint, SIZE};
    use crate::model::{Node, NodeId, NodeKind};

    #[test]
    fn sticker_bounds_are_fixed() {
        let node = Node::new(NodeId::new("s1").expect("node id"), NodeKind::Icon, 5.0, 6.0);
        let rect = bounds(&node);
        assert_eq!(rect.width(), SIZE);
        assert_eq!(rect.height(), SIZE);
    }

    #[test]
    fn paint_carries_the_node_icon() {
        let mut node = Node::new(NodeId::new("s1").expect("node id"), NodeKind::Icon, 0.0, 0.0);
        node.set_icon(Some("comment"));
        let spec = paint(&node);
        assert_eq!(spec.icon().expect("icon").name(), "comment");
    }
}
