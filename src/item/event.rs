// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-Storyweb-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of Storyweb and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

//! The event variant: a rounded label sized by its text, with an optional
//! leading subtype icon.

use super::{BodyShape, IconSpec, PaintSpec, TextSpec};
use crate::geometry::Rect;
use crate::layout::metrics::{FontSpec, TextMeasurer};
use crate::model::Node;

pub const MARGIN: f64 = 30.0;
pub const PADDING: f64 = 20.0;
pub const CORNER_RADIUS: f64 = 24.0;
pub const PLACEHOLDER_TEXT: &str = "New event";

/// Leading icon edge relative to the text line height.
const ICON_TEXT_FACTOR: f64 = 1.25;
const ICON_TEXT_SPACING: f64 = 3.0;

pub fn display_text(node: &Node) -> &str {
    match node.text() {
        Some(text) if !text.is_empty() => text,
        _ => PLACEHOLDER_TEXT,
    }
}

fn icon_edge(node: &Node, text_height: f64) -> f64 {
    if node.icon().is_some() {
        text_height * ICON_TEXT_FACTOR
    } else {
        0.0
    }
}

pub fn bounds(node: &Node, measurer: &dyn TextMeasurer) -> Rect {
    let font = FontSpec::of_node(node);
    let text = measurer.measure(display_text(node), &font);
    let icon = icon_edge(node, text.height());
    Rect::new(
        node.x(),
        node.y(),
        text.width() + icon + (MARGIN + PADDING) * 2.0,
        text.height() + (MARGIN + PADDING) * 2.0,
    )
}

pub fn paint(node: &Node, measurer: &dyn TextMeasurer) -> PaintSpec {
    let font = FontSpec::of_node(node);
    let text = measurer.measure(display_text(node), &font);
    let icon = icon_edge(node, text.height());
    let frame = bounds(node, measurer);

    let nested = Rect::new(
        frame.x() + MARGIN,
        frame.y() + MARGIN,
        frame.width() - MARGIN * 2.0,
        frame.height() - MARGIN * 2.0,
    );
    let text_rect = Rect::new(
        frame.x() + MARGIN + PADDING + icon,
        frame.y() + MARGIN + PADDING,
        text.width(),
        text.height(),
    );
    let icon_spec = node.icon().map(|name| {
        let rect = Rect::new(
            frame.x() + MARGIN + PADDING - ICON_TEXT_SPACING,
            frame.y() + MARGIN + (nested.height() - icon) / 2.0,
            icon,
            icon,
        );
        IconSpec::new(rect, name.to_owned(), node.color().to_owned())
    });

    PaintSpec::new(
        frame,
        BodyShape::RoundedRect { rect: nested, corner_radius: CORNER_RADIUS },
        nested,
        Some(TextSpec::new(text_rect, display_text(node).to_owned(), font)),
        icon_spec,
        node.color().to_owned(),
        node.transparent(),
    )
}
