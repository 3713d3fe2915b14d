// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-Storyweb-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of Storyweb and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

//! The note variant: a resizable rounded panel holding free-form text.
//! Its stored width/height describe the body; the outer bounds add the
//! margin band once.

use super::{BodyShape, PaintSpec, TextSpec};
use crate::geometry::Rect;
use crate::layout::metrics::FontSpec;
use crate::model::Node;

pub const MARGIN: f64 = 10.0;
pub const PADDING: f64 = 8.0;
pub const CORNER_RADIUS: f64 = 6.0;
pub const DEFAULT_WIDTH: f64 = 190.0;
pub const DEFAULT_HEIGHT: f64 = 60.0;

/// Smallest body size a resize can reach.
pub const MIN_EDGE: f64 = 40.0;

pub fn body_size(node: &Node) -> (f64, f64) {
    (
        node.width().unwrap_or(DEFAULT_WIDTH),
        node.height().unwrap_or(DEFAULT_HEIGHT),
    )
}

pub fn bounds(node: &Node) -> Rect {
    let (width, height) = body_size(node);
    Rect::new(node.x(), node.y(), width + MARGIN, height + MARGIN)
}

pub fn apply_outer_resize(node: &mut Node, outer_width: f64, outer_height: f64) {
    node.set_explicit_size(
        (outer_width - MARGIN).max(MIN_EDGE),
        (outer_height - MARGIN).max(MIN_EDGE),
    );
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
    let text_rect = Rect::new(
        body.x() + PADDING,
        body.y() + PADDING,
        (width - PADDING * 2.0).max(0.0),
        (height - PADDING * 2.0).max(0.0),
    );
    let text = node
        .text()
        .filter(|t| !t.is_empty())
        .map(|t| TextSpec::new(text_rect, t.to_owned(), FontSpec::of_node(node)));

    PaintSpec::new(
        frame,
        BodyShape::RoundedRect { rect: body, corner_radius: CORNER_RADIUS },
        body,
        text,
        None,
        node.color().to_owned(),
        node.transparent(),
    )
}
