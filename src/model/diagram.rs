// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-Storyweb-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of Storyweb and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

use std::fmt;

use super::connector::Connector;
use super::ids::{ConnectorId, DiagramId, NodeId};
use super::node::Node;

/// The aggregate of all nodes and connectors for one editor instance; the
/// unit of persistence.
///
/// Nodes and connectors live in flat, insertion-ordered tables (insertion
/// order doubles as z-order); all cross-references between them are ids, so
/// the aggregate owns everything and there are no reference cycles.
#[derive(Debug, Clone, PartialEq)]
pub struct Diagram {
    diagram_id: DiagramId,
    title: String,
    nodes: Vec<Node>,
    connectors: Vec<Connector>,
    loaded: bool,
}

impl Diagram {
    pub fn new(diagram_id: DiagramId, title: impl Into<String>) -> Self {
        Self {
            diagram_id,
            title: title.into(),
            nodes: Vec::new(),
            connectors: Vec::new(),
            loaded: false,
        }
    }

    pub fn diagram_id(&self) -> &DiagramId {
        &self.diagram_id
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    pub fn set_title(&mut self, title: impl Into<String>) {
        self.title = title.into();
    }

    pub fn loaded(&self) -> bool {
        self.loaded
    }

    pub fn mark_loaded(&mut self) {
        self.loaded = true;
    }

    /// Nodes in z-order, back of the slice on top.
    pub fn nodes(&self) -> &[Node] {
        &self.nodes
    }

    pub fn connectors(&self) -> &[Connector] {
        &self.connectors
    }

    pub fn node(&self, node_id: &NodeId) -> Option<&Node> {
        self.nodes.iter().find(|n| n.node_id() == node_id)
    }

    pub fn node_mut(&mut self, node_id: &NodeId) -> Option<&mut Node> {
        self.nodes.iter_mut().find(|n| n.node_id() == node_id)
    }

    pub fn connector(&self, connector_id: &ConnectorId) -> Option<&Connector> {
        self.connectors
            .iter()
            .find(|c| c.connector_id() == connector_id)
    }

    pub fn connector_mut(&mut self, connector_id: &ConnectorId) -> Option<&mut Connector> {
        self.connectors
            .iter_mut()
            .find(|c| c.connector_id() == connector_id)
    }

    /// Connectors touching any socket of the given node.
    pub fn connectors_of<'a>(
        &'a self,
        node_id: &'a NodeId,
    ) -> impl Iterator<Item = &'a Connector> + 'a {
        self.connectors.iter().filter(move |c| c.touches(node_id))
    }

    pub fn add_node(&mut self, node: Node) -> Result<(), DiagramError> {
        if self.node(node.node_id()).is_some() {
            return Err(DiagramError::DuplicateNode {
                node_id: node.node_id().clone(),
            });
        }
        self.nodes.push(node);
        Ok(())
    }

    /// Removes a node and every connector touching it.
    ///
    /// The removed node and the cascaded connectors are returned so that an
    /// undo command can restore the prior state exactly.
    pub fn remove_node(&mut self, node_id: &NodeId) -> Result<RemovedNode, DiagramError> {
        let index = self
            .nodes
            .iter()
            .position(|n| n.node_id() == node_id)
            .ok_or_else(|| DiagramError::MissingNode {
                node_id: node_id.clone(),
            })?;

        let node = self.nodes.remove(index);
        let mut connectors = Vec::new();
        self.connectors.retain(|c| {
            if c.touches(node_id) {
                connectors.push(c.clone());
                false
            } else {
                true
            }
        });

        Ok(RemovedNode { node, connectors, z_index: index })
    }

    /// Restores a node previously removed with [`Diagram::remove_node`],
    /// back at its captured z-position.
    pub fn restore_node(&mut self, removed: RemovedNode) -> Result<(), DiagramError> {
        if self.node(removed.node.node_id()).is_some() {
            return Err(DiagramError::DuplicateNode {
                node_id: removed.node.node_id().clone(),
            });
        }
        let index = removed.z_index.min(self.nodes.len());
        self.nodes.insert(index, removed.node);
        for connector in removed.connectors {
            self.add_connector(connector)?;
        }
        Ok(())
    }

    pub fn add_connector(&mut self, connector: Connector) -> Result<(), DiagramError> {
        if self.connector(connector.connector_id()).is_some() {
            return Err(DiagramError::DuplicateConnector {
                connector_id: connector.connector_id().clone(),
            });
        }
        if connector.source().node_id() == connector.target().node_id() {
            return Err(DiagramError::SelfLink {
                node_id: connector.source().node_id().clone(),
            });
        }
        for socket in [connector.source(), connector.target()] {
            if self.node(socket.node_id()).is_none() {
                return Err(DiagramError::MissingNode {
                    node_id: socket.node_id().clone(),
                });
            }
        }
        self.connectors.push(connector);
        Ok(())
    }

    pub fn remove_connector(
        &mut self,
        connector_id: &ConnectorId,
    ) -> Result<Connector, DiagramError> {
        let index = self
            .connectors
            .iter()
            .position(|c| c.connector_id() == connector_id)
            .ok_or_else(|| DiagramError::MissingConnector {
                connector_id: connector_id.clone(),
            })?;
        Ok(self.connectors.remove(index))
    }
}

/// A node removed from the diagram together with the connectors that were
/// cascaded away with it and its position in the z-order.
#[derive(Debug, Clone, PartialEq)]
pub struct RemovedNode {
    pub node: Node,
    pub connectors: Vec<Connector>,
    pub z_index: usize,
}

#[derive(Debug, Clone, PartialEq)]
pub enum DiagramError {
    DuplicateNode { node_id: NodeId },
    DuplicateConnector { connector_id: ConnectorId },
    MissingNode { node_id: NodeId },
    MissingConnector { connector_id: ConnectorId },
    SelfLink { node_id: NodeId },
}

impl fmt::Display for DiagramError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::DuplicateNode { node_id } => {
                write!(f, "node already exists (id={node_id})")
            }
            Self::DuplicateConnector { connector_id } => {
                write!(f, "connector already exists (id={connector_id})")
            }
            Self::MissingNode { node_id } => write!(f, "node not found (id={node_id})"),
            Self::MissingConnector { connector_id } => {
                write!(f, "connector not found (id={connector_id})")
            }
            Self::SelfLink { node_id } => {
                write!(f, "connector endpoints belong to the same node (id={node_id})")
            }
        }
    }
}

impl std::error::Error for DiagramError {}

#[cfg(test)]
mod tests {
    use super::{Diagram, DiagramError};
    use crate::model::{
        Connector, ConnectorId, DiagramId, Node, NodeId, NodeKind, SocketRef,
    };

    fn diagram() -> Diagram {
        Diagram::new(DiagramId::new("d1").expect("diagram id"), "Web")
    }

    fn node(id: &str) -> Node {
        Node::new(NodeId::new(id).expect("node id"), NodeKind::Event, 0.0, 0.0)
    }

    fn link(id: &str, from: &str, to: &str) -> Connector {
        Connector::new(
            ConnectorId::new(id).expect("connector id"),
            SocketRef::new(NodeId::new(from).expect("node id"), 0.0),
            SocketRef::new(NodeId::new(to).expect("node id"), 180.0),
        )
    }

    #[test]
    fn add_node_rejects_duplicate_ids() {
        let mut diagram = diagram();
        diagram.add_node(node("a")).expect("first add");
        let result = diagram.add_node(node("a"));
        assert_eq!(
            result,
            Err(DiagramError::DuplicateNode {
                node_id: NodeId::new("a").expect("node id"),
            })
        );
    }

    #[test]
    fn add_connector_rejects_self_link() {
        let mut diagram = diagram();
        diagram.add_node(node("a")).expect("add");
        let result = diagram.add_connector(link("c1", "a", "a"));
        assert_eq!(
            result,
            Err(DiagramError::SelfLink {
                node_id: NodeId::new("a").expect("node id"),
            })
        );
        assert!(diagram.connectors().is_empty());
    }

    #[test]
    fn add_connector_rejects_dangling_endpoints() {
        let mut diagram = diagram();
        diagram.add_node(node("a")).expect("add");
        let result = diagram.add_connector(link("c1", "a", "ghost"));
        assert!(matches!(result, Err(DiagramError::MissingNode { .. })));
    }

    #[test]
    fn remove_node_cascades_to_touching_connectors() {
        let mut diagram = diagram();
        diagram.add_node(node("a")).expect("add a");
        diagram.add_node(node("b")).expect("add b");
        diagram.add_node(node("c")).expect("add c");
        diagram.add_connector(link("ab", "a", "b")).expect("link ab");
        diagram.add_connector(link("cb", "c", "b")).expect("link cb");
        diagram.add_connector(link("ac", "a", "c")).expect("link ac");

        let removed = diagram
            .remove_node(&NodeId::new("b").expect("node id"))
            .expect("remove");

        assert_eq!(removed.connectors.len(), 2);
        assert_eq!(diagram.nodes().len(), 2);
        assert_eq!(diagram.connectors().len(), 1);
        assert!(diagram
            .connectors()
            .iter()
            .all(|c| !c.touches(&NodeId::new("b").expect("node id"))));
    }

    #[test]
    fn restore_node_round_trips_a_removal() {
        let mut diagram = diagram();
        diagram.add_node(node("a")).expect("add a");
        diagram.add_node(node("b")).expect("add b");
        diagram.add_connector(link("ab", "a", "b")).expect("link");

        let before = diagram.clone();
        let removed = diagram
            .remove_node(&NodeId::new("b").expect("node id"))
            .expect("remove");
        diagram.restore_node(removed).expect("restore");

        assert_eq!(diagram, before);
    }

    #[test]
    fn restore_node_reenters_at_its_old_z_position() {
        let mut diagram = diagram();
        diagram.add_node(node("a")).expect("add a");
        diagram.add_node(node("b")).expect("add b");
        diagram.add_node(node("c")).expect("add c");

        let removed = diagram
            .remove_node(&NodeId::new("a").expect("node id"))
            .expect("remove");
        assert_eq!(removed.z_index, 0);
        diagram.restore_node(removed).expect("restore");

        let order: Vec<&str> = diagram.nodes().iter().map(|n| n.node_id().as_str()).collect();
        assert_eq!(order, vec!["a", "b", "c"]);
    }

    #[test]
    fn insertion_order_is_preserved_as_z_order() {
        let mut diagram = diagram();
        diagram.add_node(node("bottom")).expect("add");
        diagram.add_node(node("top")).expect("add");
        let order: Vec<&str> = diagram.nodes().iter().map(|n| n.node_id().as_str()).collect();
        assert_eq!(order, vec!["bottom", "top"]);
    }
}
