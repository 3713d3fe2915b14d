// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-Storyweb-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of Storyweb and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

//! The undo/redo command stack.
//!
//! Every mutating user action becomes a [`Command`] carrying the target id
//! and the captured old/new values. `apply` and `revert` are pure replays
//! of those values; nothing is re-derived, so a round trip restores state
//! exactly. Mergeable commands (text, font size) coalesce with the entry on
//! top of the stack instead of growing it, which bounds the stack to one
//! entry per logical edit session.

use crate::geometry::Point;
use crate::model::{
    Connector, ConnectorId, ConnectorShape, Diagram, DiagramError, Node, NodeId, NodeKind,
    PenStyle, RemovedNode, SocketRef,
};

/// Presentation fields replaced wholesale when a node is re-typed.
#[derive(Debug, Clone, PartialEq)]
pub struct TypeSnapshot {
    pub kind: NodeKind,
    pub subtype: String,
    pub icon: Option<String>,
    pub color: String,
    pub size: u32,
}

impl TypeSnapshot {
    pub fn of(node: &Node) -> Self {
        Self {
            kind: node.kind(),
            subtype: node.subtype().to_owned(),
            icon: node.icon().map(ToOwned::to_owned),
            color: node.color().to_owned(),
            size: node.size(),
        }
    }

    fn restore(&self, node: &mut Node) {
        node.convert_kind(self.kind, self.subtype.clone());
        node.set_icon(self.icon.clone());
        node.set_color(self.color.clone());
        node.set_size(self.size);
    }
}

/// Merge classes for commands that absorb follow-up edits.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MergeKind {
    Text,
    FontSize,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Command {
    AddNode {
        node: Node,
    },
    RemoveNode {
        removed: RemovedNode,
    },
    /// Delete of a whole selection as one undo entry. `connectors` holds
    /// edges that were selected on their own; edges touching a removed node
    /// are captured inside that node's cascade instead.
    RemoveSelection {
        nodes: Vec<RemovedNode>,
        connectors: Vec<Connector>,
    },
    Link {
        connector: Connector,
    },
    RemoveConnector {
        connector: Connector,
    },
    Relink {
        connector_id: ConnectorId,
        old_source: SocketRef,
        old_target: SocketRef,
        new_source: SocketRef,
        new_target: SocketRef,
    },
    MoveNode {
        node_id: NodeId,
        old: Point,
        new: Point,
    },
    ResizeNode {
        node_id: NodeId,
        old: (Option<f64>, Option<f64>),
        new: (f64, f64),
    },
    SetText {
        node_id: NodeId,
        old: Option<String>,
        new: Option<String>,
    },
    SetFontSize {
        node_id: NodeId,
        old: u32,
        new: u32,
    },
    Retype {
        node_id: NodeId,
        old: TypeSnapshot,
        new: TypeSnapshot,
    },
    SetNodeColor {
        node_id: NodeId,
        old: String,
        new: String,
    },
    SetNodeIcon {
        node_id: NodeId,
        old: Option<String>,
        new: Option<String>,
    },
    SetConnectorColor {
        connector_id: ConnectorId,
        old: Option<String>,
        new: Option<String>,
    },
    SetPenStyle {
        connector_id: ConnectorId,
        old: PenStyle,
        new: PenStyle,
    },
    SetPenWidth {
        connector_id: ConnectorId,
        old: u32,
        new: u32,
    },
    SetConnectorText {
        connector_id: ConnectorId,
        old: Option<String>,
        new: Option<String>,
    },
    SetConnectorIcon {
        connector_id: ConnectorId,
        old: Option<String>,
        new: Option<String>,
    },
    SetConnectorShape {
        connector_id: ConnectorId,
        old: ConnectorShape,
        new: ConnectorShape,
    },
}

impl Command {
    pub fn merge_key(&self) -> Option<(MergeKind, &NodeId)> {
        match self {
            Self::SetText { node_id, .. } => Some((MergeKind::Text, node_id)),
            Self::SetFontSize { node_id, .. } => Some((MergeKind::FontSize, node_id)),
            _ => None,
        }
    }

    /// Folds a follow-up command with the same merge key into this one by
    /// taking over its new value.
    fn merge_from(&mut self, other: Command) {
        match (self, other) {
            (Self::SetText { new, .. }, Self::SetText { new: next, .. }) => *new = next,
            (Self::SetFontSize { new, .. }, Self::SetFontSize { new: next, .. }) => *new = next,
            _ => unreachable!("merge_from requires matching merge keys"),
        }
    }

    pub fn apply(&self, diagram: &mut Diagram) -> Result<(), DiagramError> {
        match self {
            Self::AddNode { node } => diagram.add_node(node.clone()),
            Self::RemoveNode { removed } => {
                diagram.remove_node(removed.node.node_id()).map(|_| ())
            }
            Self::RemoveSelection { nodes, connectors } => {
                for connector in connectors {
                    diagram.remove_connector(connector.connector_id())?;
                }
                for removed in nodes {
                    diagram.remove_node(removed.node.node_id())?;
                }
                Ok(())
            }
            Self::Link { connector } => diagram.add_connector(connector.clone()),
            Self::RemoveConnector { connector } => diagram
                .remove_connector(connector.connector_id())
                .map(|_| ()),
            Self::Relink {
                connector_id,
                new_source,
                new_target,
                ..
            } => with_connector(diagram, connector_id, |c| {
                c.set_source(new_source.clone());
                c.set_target(new_target.clone());
            }),
            Self::MoveNode { node_id, new, .. } => {
                with_node(diagram, node_id, |n| n.set_position(*new))
            }
            Self::ResizeNode { node_id, new, .. } => {
                with_node(diagram, node_id, |n| n.set_explicit_size(new.0, new.1))
            }
            Self::SetText { node_id, new, .. } => {
                with_node(diagram, node_id, |n| n.set_text(new.clone()))
            }
            Self::SetFontSize { node_id, new, .. } => {
                with_node(diagram, node_id, |n| n.set_size(*new))
            }
            Self::Retype { node_id, new, .. } => {
                with_node(diagram, node_id, |n| new.restore(n))
            }
            Self::SetNodeColor { node_id, new, .. } => {
                with_node(diagram, node_id, |n| n.set_color(new.clone()))
            }
            Self::SetNodeIcon { node_id, new, .. } => {
                with_node(diagram, node_id, |n| n.set_icon(new.clone()))
            }
            Self::SetConnectorColor { connector_id, new, .. } => {
                with_connector(diagram, connector_id, |c| c.set_color(new.clone()))
            }
            Self::SetPenStyle { connector_id, new, .. } => {
                with_connector(diagram, connector_id, |c| c.set_pen_style(*new))
            }
            Self::SetPenWidth { connector_id, new, .. } => {
                with_connector(diagram, connector_id, |c| c.set_pen_width(*new))
            }
            Self::SetConnectorText { connector_id, new, .. } => {
                with_connector(diagram, connector_id, |c| c.set_text(new.clone()))
            }
            Self::SetConnectorIcon { connector_id, new, .. } => {
                with_connector(diagram, connector_id, |c| c.set_icon(new.clone()))
            }
            Self::SetConnectorShape { connector_id, new, .. } => {
                with_connector(diagram, connector_id, |c| c.set_shape(*new))
            }
        }
    }

    pub fn revert(&self, diagram: &mut Diagram) -> Result<(), DiagramError> {
        match self {
            Self::AddNode { node } => diagram.remove_node(node.node_id()).map(|_| ()),
            Self::RemoveNode { removed } => diagram.restore_node(removed.clone()),
            Self::RemoveSelection { nodes, connectors } => {
                for removed in nodes {
                    diagram.restore_node(removed.clone())?;
                }
                for connector in connectors {
                    diagram.add_connector(connector.clone())?;
                }
                Ok(())
            }
            Self::Link { connector } => diagram
                .remove_connector(connector.connector_id())
                .map(|_| ()),
            Self::RemoveConnector { connector } => diagram.add_connector(connector.clone()),
            Self::Relink {
                connector_id,
                old_source,
                old_target,
                ..
            } => with_connector(diagram, connector_id, |c| {
                c.set_source(old_source.clone());
                c.set_target(old_target.clone());
            }),
            Self::MoveNode { node_id, old, .. } => {
                with_node(diagram, node_id, |n| n.set_position(*old))
            }
            Self::ResizeNode { node_id, old, .. } => {
                with_node(diagram, node_id, |n| match old {
                    (Some(width), Some(height)) => n.set_explicit_size(*width, *height),
                    _ => n.clear_explicit_size(),
                })
            }
            Self::SetText { node_id, old, .. } => {
                with_node(diagram, node_id, |n| n.set_text(old.clone()))
            }
            Self::SetFontSize { node_id, old, .. } => {
                with_node(diagram, node_id, |n| n.set_size(*old))
            }
            Self::Retype { node_id, old, .. } => {
                with_node(diagram, node_id, |n| old.restore(n))
            }
            Self::SetNodeColor { node_id, old, .. } => {
                with_node(diagram, node_id, |n| n.set_color(old.clone()))
            }
            Self::SetNodeIcon { node_id, old, .. } => {
                with_node(diagram, node_id, |n| n.set_icon(old.clone()))
            }
            Self::SetConnectorColor { connector_id, old, .. } => {
                with_connector(diagram, connector_id, |c| c.set_color(old.clone()))
            }
            Self::SetPenStyle { connector_id, old, .. } => {
                with_connector(diagram, connector_id, |c| c.set_pen_style(*old))
            }
            Self::SetPenWidth { connector_id, old, .. } => {
                with_connector(diagram, connector_id, |c| c.set_pen_width(*old))
            }
            Self::SetConnectorText { connector_id, old, .. } => {
                with_connector(diagram, connector_id, |c| c.set_text(old.clone()))
            }
            Self::SetConnectorIcon { connector_id, old, .. } => {
                with_connector(diagram, connector_id, |c| c.set_icon(old.clone()))
            }
            Self::SetConnectorShape { connector_id, old, .. } => {
                with_connector(diagram, connector_id, |c| c.set_shape(*old))
            }
        }
    }
}

fn with_node(
    diagram: &mut Diagram,
    node_id: &NodeId,
    mutate: impl FnOnce(&mut Node),
) -> Result<(), DiagramError> {
    let node = diagram
        .node_mut(node_id)
        .ok_or_else(|| DiagramError::MissingNode {
            node_id: node_id.clone(),
        })?;
    mutate(node);
    Ok(())
}

fn with_connector(
    diagram: &mut Diagram,
    connector_id: &ConnectorId,
    mutate: impl FnOnce(&mut Connector),
) -> Result<(), DiagramError> {
    let connector =
        diagram
            .connector_mut(connector_id)
            .ok_or_else(|| DiagramError::MissingConnector {
                connector_id: connector_id.clone(),
            })?;
    mutate(connector);
    Ok(())
}

/// Undo/redo history. Pushing applies the command, merges where possible,
/// and clears the redo side.
#[derive(Debug, Default)]
pub struct CommandStack {
    undo: Vec<Command>,
    redo: Vec<Command>,
}

impl CommandStack {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn undo_depth(&self) -> usize {
        self.undo.len()
    }

    pub fn can_undo(&self) -> bool {
        !self.undo.is_empty()
    }

    pub fn can_redo(&self) -> bool {
        !self.redo.is_empty()
    }

    /// Applies `command` to the diagram and records it for undo.
    ///
    /// If the command failed to apply the stack is left untouched.
    pub fn push(&mut self, diagram: &mut Diagram, command: Command) -> Result<(), DiagramError> {
        command.apply(diagram)?;
        self.redo.clear();

        let merges_into_top = match (
            command.merge_key(),
            self.undo.last().and_then(Command::merge_key),
        ) {
            (Some(incoming), Some(top)) => incoming == top,
            _ => false,
        };
        if merges_into_top {
            self.undo
                .last_mut()
                .expect("top entry checked above")
                .merge_from(command);
            return Ok(());
        }

        self.undo.push(command);
        Ok(())
    }

    /// Reverts the most recent command. Returns false when there is nothing
    /// to undo.
    pub fn undo(&mut self, diagram: &mut Diagram) -> Result<bool, DiagramError> {
        let Some(command) = self.undo.pop() else {
            return Ok(false);
        };
        command.revert(diagram)?;
        self.redo.push(command);
        Ok(true)
    }

    /// Re-applies the most recently undone command. Returns false when
    /// there is nothing to redo.
    pub fn redo(&mut self, diagram: &mut Diagram) -> Result<bool, DiagramError> {
        let Some(command) = self.redo.pop() else {
            return Ok(false);
        };
        command.apply(diagram)?;
        self.undo.push(command);
        Ok(true)
    }
}
