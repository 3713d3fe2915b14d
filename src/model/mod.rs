// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-Storyweb-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of Storyweb and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

//! The persistent diagram data model.
//!
//! Everything in here is plain data addressed by typed ids; behavior that
//! depends on a node's variant lives in the `item` module.

pub mod connector;
pub mod diagram;
pub mod ids;
pub mod node;

pub use connector::{Connector, ConnectorShape, PenStyle, SocketRef, DEFAULT_PEN_WIDTH};
pub use diagram::{Diagram, DiagramError, RemovedNode};
pub use ids::{
    ConnectorId, DiagramId, EntityId, Id, IdError, ImageRef, NodeId,
};
pub use node::{
    Node, NodeKind, DEFAULT_FONT_SIZE, DEFAULT_NODE_COLOR, SUBTYPE_BACKSTORY, SUBTYPE_CONFLICT,
    SUBTYPE_DISTURBANCE, SUBTYPE_FORESHADOWING, SUBTYPE_GOAL, SUBTYPE_QUESTION, SUBTYPE_SETUP,
};
