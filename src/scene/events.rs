// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-Storyweb-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of Storyweb and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

//! Host-visible scene events.
//!
//! The scene queues these during input callbacks; the host drains the queue
//! once per frame and drives its chrome (toolbars, property panels, inline
//! editors) from them.

use crate::model::{ConnectorId, NodeId};

/// Reference to a selectable diagram item.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum ItemRef {
    Node(NodeId),
    Connector(ConnectorId),
}

#[derive(Debug, Clone, PartialEq)]
pub enum SceneEvent {
    ItemAdded { node_id: NodeId },
    ItemRemoved { item: ItemRef },
    ItemMoved { node_id: NodeId },
    ConnectorLinked { connector_id: ConnectorId },
    SelectionChanged { selected: Vec<ItemRef> },
    /// The user asked to edit an item (double click / typing on selection).
    EditRequested { item: ItemRef },
    AdditionCancelled,
    /// A save failed; the in-memory diagram keeps the change and the host
    /// decides how to notify/retry.
    PersistenceFailed { reason: String },
}
