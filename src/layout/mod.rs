// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-Storyweb-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of Storyweb and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

//! Geometry derived from model state: text measurement and connector
//! routing. Socket placement lives with the node variants in `item`.

pub mod metrics;
pub mod routing;

pub use metrics::{CharCellMeasurer, FontSpec, TextMeasurer, TextSize};
pub use routing::{
    default_control_point, in_proximity, route, ConnectorPath, ICON_BADGE_SIZE, LABEL_GAP,
    PROXIMITY_DX, PROXIMITY_DY,
};
