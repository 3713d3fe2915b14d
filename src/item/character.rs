// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-Storyweb-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of Storyweb and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

//! The character variant: a fixed-size avatar square whose entity reference
//! resolves to a display object through the persistence adapter. An
//! unresolved reference paints as a placeholder.

use super::{BodyShape, PaintSpec};
use crate::geometry::Rect;
use crate::model::Node;

pub const SIZE: f64 = 68.0;
pub const MARGIN: f64 = 20.0;

pub fn bounds(node: &Node) -> Rect {
    Rect::new(
        node.x(),
        node.y(),
        SIZE + MARGIN * 2.0,
        SIZE + MARGIN * 2.0,
    )
}

pub fn paint(node: &Node) -> PaintSpec {
    let frame = bounds(node);
    let avatar = Rect::new(frame.x() + MARGIN, frame.y() + MARGIN, SIZE, SIZE);
    PaintSpec::new(
        frame,
        BodyShape::Avatar { rect: avatar },
        avatar,
        None,
        None,
        node.color().to_owned(),
        node.transparent(),
    )
}
