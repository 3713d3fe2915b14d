// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-Storyweb-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of Storyweb and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

//! The interactive scene: a state machine over pointer/keyboard input.
//!
//! The scene owns the diagram and is the only writer to it. Input arrives
//! through three pointer callbacks (down/move/up) plus key-down and a clock
//! tick; every mutation goes through the command stack and triggers a save,
//! except live drag positions, which persist once via the settle timer.
//!
//! States: `Idle`, `AdditionPending`, `LinkDrawing`, `Dragging`, `Resizing`
//! and the rubber-band selection. Escape or a right/middle click cancels
//! any transient state; pointer release always resolves to a definite
//! commit-or-cancel, the machine cannot stick.

pub mod events;

pub use events::{ItemRef, SceneEvent};

use std::collections::{BTreeMap, BTreeSet, VecDeque};
use std::sync::Arc;

use smallvec::SmallVec;

use crate::geometry::{Point, QuadCurve, Rect};
use crate::item::{self, IconCatalog, PaintSpec, SocketLayout};
use crate::layout::metrics::{CharCellMeasurer, TextMeasurer};
use crate::layout::routing::{self, ConnectorPath};
use crate::model::{
    Connector, ConnectorId, ConnectorShape, Diagram, DiagramId, Node, NodeId, NodeKind,
    PenStyle, SocketRef, DEFAULT_NODE_COLOR,
};
use crate::ops::{Command, CommandStack, TypeSnapshot};
use crate::store::{DisplayEntity, ImageBlob, PersistenceAdapter, StoreError};

/// How long a finished drag may rest before its position is persisted.
pub const DRAG_SETTLE_MS: u64 = 1000;

const CONNECTOR_HIT_TOLERANCE: f64 = 6.0;
const PATH_HIT_SAMPLES: usize = 32;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PointerButton {
    Left,
    Right,
    Middle,
}

/// The keyboard strokes the scene reacts to. Shortcut chords (Ctrl/Cmd+C
/// and friends) are resolved by the host before they get here.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SceneKey {
    Escape,
    Delete,
    Backspace,
    Copy,
    Paste,
}

#[derive(Debug, Clone, PartialEq)]
pub enum SceneState {
    Idle,
    AdditionPending {
        kind: NodeKind,
        subtype: String,
    },
    LinkDrawing {
        source: SocketRef,
        pointer: Point,
    },
    Dragging {
        node_id: NodeId,
        grab: Point,
        start: Point,
        moved: bool,
    },
    Resizing {
        node_id: NodeId,
        start_outer: (f64, f64),
        start_pointer: Point,
        old_explicit: (Option<f64>, Option<f64>),
    },
    RubberBand {
        origin: Point,
        rect: Rect,
    },
}

#[derive(Debug, Clone, Copy)]
struct SettleTimer {
    deadline_ms: u64,
}

/// One interactive diagram editor instance.
pub struct Scene {
    diagram: Diagram,
    adapter: Arc<dyn PersistenceAdapter>,
    measurer: Box<dyn TextMeasurer>,
    icons: IconCatalog,
    stack: CommandStack,
    state: SceneState,
    selection: BTreeSet<ItemRef>,
    copied: Option<(NodeKind, String)>,
    events: VecDeque<SceneEvent>,
    incidence: BTreeMap<NodeId, SmallVec<[ConnectorId; 2]>>,
    last_pointer: Point,
    settle: Option<SettleTimer>,
    pending_images: BTreeSet<NodeId>,
    next_id: u64,
}

impl Scene {
    pub fn new(
        diagram_id: DiagramId,
        title: impl Into<String>,
        adapter: Arc<dyn PersistenceAdapter>,
    ) -> Self {
        Self {
            diagram: Diagram::new(diagram_id, title),
            adapter,
            measurer: Box::new(CharCellMeasurer),
            icons: IconCatalog::builtin(),
            stack: CommandStack::new(),
            state: SceneState::Idle,
            selection: BTreeSet::new(),
            copied: None,
            events: VecDeque::new(),
            incidence: BTreeMap::new(),
            last_pointer: Point::default(),
            settle: None,
            pending_images: BTreeSet::new(),
            next_id: 1,
        }
    }

    pub fn with_measurer(mut self, measurer: Box<dyn TextMeasurer>) -> Self {
        self.measurer = measurer;
        self
    }

    pub fn with_icons(mut self, icons: IconCatalog) -> Self {
        self.icons = icons;
        self
    }

    /// Loads the diagram through the adapter on first use. Idempotent: once
    /// content is in, further calls are no-ops. A missing diagram starts
    /// empty; other load failures keep the scene unhydrated so a later call
    /// can retry.
    pub fn hydrate(&mut self) {
        if self.diagram.loaded() {
            return;
        }
        match self.adapter.load(self.diagram.diagram_id()) {
            Ok(diagram) => {
                self.diagram = diagram;
                self.diagram.mark_loaded();
                self.rebuild_incidence();
            }
            Err(StoreError::UnknownDiagram { .. }) => {
                self.diagram.mark_loaded();
            }
            Err(err) => {
                log::warn!("hydrate failed: {err}");
                self.emit(SceneEvent::PersistenceFailed { reason: err.to_string() });
            }
        }
    }

    pub fn diagram(&self) -> &Diagram {
        &self.diagram
    }

    pub fn state(&self) -> &SceneState {
        &self.state
    }

    pub fn selection(&self) -> &BTreeSet<ItemRef> {
        &self.selection
    }

    pub fn drain_events(&mut self) -> Vec<SceneEvent> {
        self.events.drain(..).collect()
    }

    pub fn can_undo(&self) -> bool {
        self.stack.can_undo()
    }

    pub fn can_redo(&self) -> bool {
        self.stack.can_redo()
    }

    // ---- palette / addition mode ----------------------------------------

    /// Arms addition mode: the next left release places a node of the given
    /// kind/subtype. Any transient state is cancelled first.
    pub fn begin_addition(&mut self, kind: NodeKind, subtype: impl Into<String>) {
        self.cancel_transient_state();
        self.state = SceneState::AdditionPending { kind, subtype: subtype.into() };
    }

    // ---- pointer protocol ------------------------------------------------

    pub fn pointer_pressed(&mut self, button: PointerButton, pos: Point, _now_ms: u64) {
        self.last_pointer = pos;

        match button {
            PointerButton::Right | PointerButton::Middle => {
                self.cancel_transient_state();
                return;
            }
            PointerButton::Left => {}
        }

        match &self.state {
            SceneState::Idle => self.press_in_idle(pos),
            // Addition and link placement resolve on release.
            _ => {}
        }
    }

    fn press_in_idle(&mut self, pos: Point) {
        // Sockets sit inside node bounds, so test them before node bodies.
        if self.socket_hit(pos).is_some() {
            return;
        }

        if let Some(node_id) = self.topmost_node_at(pos) {
            if let Some(handle) = self.resize_handle_of(&node_id) {
                if handle.contains(pos) {
                    let node = self.diagram.node(&node_id).expect("hit node exists");
                    let old_explicit = (node.width(), node.height());
                    let bounds = self.bounds_of(node);
                    self.state = SceneState::Resizing {
                        node_id: node_id.clone(),
                        start_outer: (bounds.width(), bounds.height()),
                        start_pointer: pos,
                        old_explicit,
                    };
                    self.select_only(ItemRef::Node(node_id));
                    return;
                }
            }

            let node = self.diagram.node(&node_id).expect("hit node exists");
            let start = node.position();
            self.state = SceneState::Dragging {
                node_id: node_id.clone(),
                grab: Point::new(pos.x() - start.x(), pos.y() - start.y()),
                start,
                moved: false,
            };
            self.select_only(ItemRef::Node(node_id));
            return;
        }

        if let Some(connector_id) = self.connector_hit(pos) {
            self.select_only(ItemRef::Connector(connector_id));
            return;
        }

        self.clear_selection();
        self.state = SceneState::RubberBand { origin: pos, rect: Rect::spanning(pos, pos) };
    }

    pub fn pointer_moved(&mut self, pos: Point, _now_ms: u64) {
        self.last_pointer = pos;
        match &mut self.state {
            SceneState::LinkDrawing { pointer, .. } => *pointer = pos,
            SceneState::Dragging { node_id, grab, moved, .. } => {
                let node_id = node_id.clone();
                let target = Point::new(pos.x() - grab.x(), pos.y() - grab.y());
                *moved = true;
                if let Some(node) = self.diagram.node_mut(&node_id) {
                    node.set_position(target);
                }
            }
            SceneState::Resizing { node_id, start_outer, start_pointer, .. } => {
                let node_id = node_id.clone();
                let outer_width = start_outer.0 + (pos.x() - start_pointer.x());
                let outer_height = start_outer.1 + (pos.y() - start_pointer.y());
                if let Some(node) = self.diagram.node_mut(&node_id) {
                    item::apply_outer_resize(node, outer_width, outer_height);
                }
            }
            SceneState::RubberBand { origin, rect } => {
                *rect = Rect::spanning(*origin, pos);
                let rect = *rect;
                self.select_intersecting(rect);
            }
            SceneState::Idle | SceneState::AdditionPending { .. } => {}
        }
    }

    pub fn pointer_released(&mut self, button: PointerButton, pos: Point, now_ms: u64) {
        self.last_pointer = pos;

        if !matches!(button, PointerButton::Left) {
            // Right/middle releases were already handled as cancels on press.
            return;
        }

        match std::mem::replace(&mut self.state, SceneState::Idle) {
            SceneState::Idle => {
                if let Some((node_id, angle)) = self.socket_hit(pos) {
                    self.start_link(node_id, angle, pos);
                }
            }
            SceneState::AdditionPending { kind, subtype } => {
                self.place_new_node(kind, &subtype, pos);
            }
            SceneState::LinkDrawing { source, pointer } => {
                match self.socket_hit(pos) {
                    Some((target_node, target_angle))
                        if &target_node != source.node_id() =>
                    {
                        self.commit_link(&source, target_node, target_angle);
                    }
                    Some(_) => {
                        // Same-node target: rejected, keep drawing.
                        self.state = SceneState::LinkDrawing { source, pointer };
                    }
                    None => {
                        // Released over empty space: discard the placeholder.
                    }
                }
            }
            SceneState::Dragging { node_id, start, moved, .. } => {
                let current = self
                    .diagram
                    .node(&node_id)
                    .map(Node::position)
                    .unwrap_or(start);
                if moved && current != start {
                    self.push_undoable(
                        Command::MoveNode { node_id: node_id.clone(), old: start, new: current },
                        false,
                    );
                    self.settle = Some(SettleTimer { deadline_ms: now_ms + DRAG_SETTLE_MS });
                    self.emit(SceneEvent::ItemMoved { node_id });
                }
            }
            SceneState::Resizing { node_id, old_explicit, .. } => {
                let new_explicit = self
                    .diagram
                    .node(&node_id)
                    .and_then(|n| n.width().zip(n.height()));
                if let Some(new) = new_explicit {
                    if old_explicit != (Some(new.0), Some(new.1)) {
                        self.push_undoable(
                            Command::ResizeNode { node_id, old: old_explicit, new },
                            true,
                        );
                    }
                }
            }
            SceneState::RubberBand { .. } => {
                self.emit_selection_changed();
            }
        }
    }

    /// Hard cancel, for pointer-capture loss or the view going away while a
    /// transient state is active.
    pub fn pointer_cancelled(&mut self) {
        match &self.state {
            SceneState::Dragging { node_id, start, .. } => {
                let node_id = node_id.clone();
                let start = *start;
                if let Some(node) = self.diagram.node_mut(&node_id) {
                    node.set_position(start);
                }
            }
            SceneState::Resizing { node_id, old_explicit, .. } => {
                let node_id = node_id.clone();
                let old = *old_explicit;
                if let Some(node) = self.diagram.node_mut(&node_id) {
                    match old {
                        (Some(width), Some(height)) => node.set_explicit_size(width, height),
                        _ => node.clear_explicit_size(),
                    }
                }
            }
            _ => {}
        }
        self.cancel_transient_state();
    }

    pub fn pointer_double_clicked(&mut self, pos: Point) {
        self.last_pointer = pos;
        if let Some(node_id) = self.topmost_node_at(pos) {
            self.select_only(ItemRef::Node(node_id.clone()));
            self.emit(SceneEvent::EditRequested { item: ItemRef::Node(node_id) });
        } else if let Some(connector_id) = self.connector_hit(pos) {
            self.select_only(ItemRef::Connector(connector_id.clone()));
            self.emit(SceneEvent::EditRequested { item: ItemRef::Connector(connector_id) });
        }
    }

    // ---- keyboard protocol -----------------------------------------------

    pub fn key_pressed(&mut self, key: SceneKey) {
        match key {
            SceneKey::Escape => {
                if matches!(self.state, SceneState::Idle) {
                    self.clear_selection();
                    self.emit_selection_changed();
                } else {
                    self.cancel_transient_state();
                }
            }
            SceneKey::Delete | SceneKey::Backspace => self.delete_selection(),
            SceneKey::Copy => {
                if let Some(ItemRef::Node(node_id)) = self.single_selected() {
                    if let Some(node) = self.diagram.node(&node_id) {
                        self.copied = Some((node.kind(), node.subtype().to_owned()));
                    }
                }
            }
            SceneKey::Paste => {
                if let Some((kind, subtype)) = self.copied.clone() {
                    self.place_new_node(kind, &subtype, self.last_pointer);
                }
            }
        }
    }

    /// Clock callback; fires the drag-settle save when its deadline passes.
    pub fn tick(&mut self, now_ms: u64) {
        if let Some(settle) = self.settle {
            if now_ms >= settle.deadline_ms {
                self.settle = None;
                self.save_diagram();
            }
        }
    }

    // ---- undo / redo -----------------------------------------------------

    pub fn undo(&mut self) -> bool {
        match self.stack.undo(&mut self.diagram) {
            Ok(done) => {
                if done {
                    self.after_history_change();
                }
                done
            }
            Err(err) => {
                log::warn!("undo failed: {err}");
                false
            }
        }
    }

    pub fn redo(&mut self) -> bool {
        match self.stack.redo(&mut self.diagram) {
            Ok(done) => {
                if done {
                    self.after_history_change();
                }
                done
            }
            Err(err) => {
                log::warn!("redo failed: {err}");
                false
            }
        }
    }

    fn after_history_change(&mut self) {
        self.rebuild_incidence();
        self.prune_selection();
        self.save_diagram();
    }

    // ---- editor-panel mutators -------------------------------------------

    /// Text edit; merges with a preceding text edit of the same node.
    pub fn set_node_text(&mut self, node_id: &NodeId, text: Option<String>) {
        let Some(node) = self.diagram.node(node_id) else {
            return;
        };
        let old = node.text().map(ToOwned::to_owned);
        if old == text {
            return;
        }
        self.push_undoable(
            Command::SetText { node_id: node_id.clone(), old, new: text },
            true,
        );
    }

    /// Font-size edit; merges while a size slider is dragged.
    pub fn set_node_font_size(&mut self, node_id: &NodeId, size: u32) {
        let Some(node) = self.diagram.node(node_id) else {
            return;
        };
        let old = node.size();
        if old == size {
            return;
        }
        self.push_undoable(
            Command::SetFontSize { node_id: node_id.clone(), old, new: size },
            true,
        );
    }

    pub fn set_node_color(&mut self, node_id: &NodeId, color: impl Into<String>) {
        let Some(node) = self.diagram.node(node_id) else {
            return;
        };
        let old = node.color().to_owned();
        let new = color.into();
        if old == new {
            return;
        }
        self.push_undoable(
            Command::SetNodeColor { node_id: node_id.clone(), old, new },
            true,
        );
    }

    pub fn set_node_icon(&mut self, node_id: &NodeId, icon: Option<String>) {
        let Some(node) = self.diagram.node(node_id) else {
            return;
        };
        let old = node.icon().map(ToOwned::to_owned);
        if old == icon {
            return;
        }
        self.push_undoable(
            Command::SetNodeIcon { node_id: node_id.clone(), old, new: icon },
            true,
        );
    }

    /// Re-types a node in place (e.g. a generic event into a "goal"),
    /// deriving the new icon from the catalog.
    pub fn retype_node(&mut self, node_id: &NodeId, kind: NodeKind, subtype: impl Into<String>) {
        let Some(node) = self.diagram.node(node_id) else {
            return;
        };
        let subtype = subtype.into();
        let old = TypeSnapshot::of(node);
        let new = TypeSnapshot {
            kind,
            icon: self.icons.icon_for(&subtype).map(ToOwned::to_owned),
            color: DEFAULT_NODE_COLOR.to_owned(),
            size: crate::model::DEFAULT_FONT_SIZE,
            subtype,
        };
        if old == new {
            return;
        }
        self.push_undoable(Command::Retype { node_id: node_id.clone(), old, new }, true);
    }

    pub fn set_connector_pen_style(&mut self, connector_id: &ConnectorId, pen_style: PenStyle) {
        let Some(connector) = self.diagram.connector(connector_id) else {
            return;
        };
        let old = connector.pen_style();
        if old == pen_style {
            return;
        }
        self.push_undoable(
            Command::SetPenStyle { connector_id: connector_id.clone(), old, new: pen_style },
            true,
        );
    }

    pub fn set_connector_pen_width(&mut self, connector_id: &ConnectorId, pen_width: u32) {
        let Some(connector) = self.diagram.connector(connector_id) else {
            return;
        };
        let old = connector.pen_width();
        if old == pen_width {
            return;
        }
        self.push_undoable(
            Command::SetPenWidth { connector_id: connector_id.clone(), old, new: pen_width },
            true,
        );
    }

    pub fn set_connector_color(&mut self, connector_id: &ConnectorId, color: Option<String>) {
        let Some(connector) = self.diagram.connector(connector_id) else {
            return;
        };
        let old = connector.color().map(ToOwned::to_owned);
        if old == color {
            return;
        }
        self.push_undoable(
            Command::SetConnectorColor { connector_id: connector_id.clone(), old, new: color },
            true,
        );
    }

    pub fn set_connector_text(&mut self, connector_id: &ConnectorId, text: Option<String>) {
        let Some(connector) = self.diagram.connector(connector_id) else {
            return;
        };
        let old = connector.text().map(ToOwned::to_owned);
        if old == text {
            return;
        }
        self.push_undoable(
            Command::SetConnectorText { connector_id: connector_id.clone(), old, new: text },
            true,
        );
    }

    pub fn set_connector_icon(&mut self, connector_id: &ConnectorId, icon: Option<String>) {
        let Some(connector) = self.diagram.connector(connector_id) else {
            return;
        };
        let old = connector.icon().map(ToOwned::to_owned);
        if old == icon {
            return;
        }
        self.push_undoable(
            Command::SetConnectorIcon { connector_id: connector_id.clone(), old, new: icon },
            true,
        );
    }

    /// Drag of a curved connector's control point (or straightening it).
    pub fn set_connector_shape(&mut self, connector_id: &ConnectorId, shape: ConnectorShape) {
        let Some(connector) = self.diagram.connector(connector_id) else {
            return;
        };
        let old = connector.shape();
        if old == shape {
            return;
        }
        self.push_undoable(
            Command::SetConnectorShape { connector_id: connector_id.clone(), old, new: shape },
            true,
        );
    }

    /// Reattaches a connector to different sockets.
    pub fn relink_connector(
        &mut self,
        connector_id: &ConnectorId,
        source: SocketRef,
        target: SocketRef,
    ) {
        let Some(connector) = self.diagram.connector(connector_id) else {
            return;
        };
        if source.node_id() == target.node_id() {
            log::warn!(
                "relink rejected: both endpoints on node {}",
                source.node_id()
            );
            return;
        }
        let command = Command::Relink {
            connector_id: connector_id.clone(),
            old_source: connector.source().clone(),
            old_target: connector.target().clone(),
            new_source: source,
            new_target: target,
        };
        self.push_undoable(command, true);
        self.rebuild_incidence();
    }

    // ---- queries for the host renderer -----------------------------------

    pub fn node_bounds(&self, node_id: &NodeId) -> Option<Rect> {
        self.diagram.node(node_id).map(|n| self.bounds_of(n))
    }

    pub fn node_paint(&self, node_id: &NodeId) -> Option<PaintSpec> {
        self.diagram
            .node(node_id)
            .map(|n| item::paint_spec(n, self.measurer.as_ref()))
    }

    /// Socket angle/position pairs for a node; the mobile socket of
    /// character/icon variants reports the current pointer angle.
    pub fn socket_positions_of(&self, node_id: &NodeId) -> Vec<(f64, Point)> {
        let Some(node) = self.diagram.node(node_id) else {
            return Vec::new();
        };
        let bounds = self.bounds_of(node);
        match item::socket_layout(node.kind()) {
            SocketLayout::Fixed(angles) => angles
                .iter()
                .map(|&angle| (angle, item::socket_point(node, bounds, angle)))
                .collect(),
            SocketLayout::Mobile => {
                let angle = crate::geometry::pointer_angle(bounds.center(), self.last_pointer);
                vec![(angle, item::socket_point(node, bounds, angle))]
            }
        }
    }

    pub fn resize_handle_of(&self, node_id: &NodeId) -> Option<Rect> {
        let node = self.diagram.node(node_id)?;
        item::resize_handle(node, self.bounds_of(node))
    }

    /// Connector ids incident to the node's sockets, in insertion order.
    pub fn incident_connectors(&self, node_id: &NodeId) -> &[ConnectorId] {
        self.incidence
            .get(node_id)
            .map(|ids| ids.as_slice())
            .unwrap_or(&[])
    }

    /// The routed path for a connector, or `None` while an endpoint is
    /// missing (a dangling connector renders as nothing, not a crash).
    pub fn connector_path(&self, connector_id: &ConnectorId) -> Option<ConnectorPath> {
        let connector = self.diagram.connector(connector_id)?;
        let origin = self.socket_scene_point(connector.source())?;
        let target = self.socket_scene_point(connector.target())?;
        Some(routing::route(
            origin,
            target,
            connector.shape(),
            connector.icon().is_some(),
            connector.text().is_some(),
        ))
    }

    /// The placeholder path while link-drawing.
    pub fn link_preview(&self) -> Option<ConnectorPath> {
        let SceneState::LinkDrawing { source, pointer } = &self.state else {
            return None;
        };
        let origin = self.socket_scene_point(source)?;
        Some(routing::route(
            origin,
            *pointer,
            ConnectorShape::Linear,
            false,
            false,
        ))
    }

    /// While link-drawing: whether a link to the given node is allowed.
    /// Used to flag hovered sockets before commit.
    pub fn link_allowed(&self, node_id: &NodeId) -> bool {
        match &self.state {
            SceneState::LinkDrawing { source, .. } => source.node_id() != node_id,
            _ => false,
        }
    }

    /// Effective render color: explicit override, else the target node's
    /// color, so a recolored node restyles its incoming connectors.
    pub fn connector_render_color(&self, connector_id: &ConnectorId) -> Option<String> {
        let connector = self.diagram.connector(connector_id)?;
        if let Some(color) = connector.color() {
            return Some(color.to_owned());
        }
        Some(
            self.diagram
                .node(connector.target().node_id())
                .map(|n| n.color().to_owned())
                .unwrap_or_else(|| DEFAULT_NODE_COLOR.to_owned()),
        )
    }

    /// Resolves a node's entity reference to its display projection.
    /// `None` means: paint the placeholder.
    pub fn resolve_entity_of(&self, node_id: &NodeId) -> Option<DisplayEntity> {
        let entity = self.diagram.node(node_id)?.entity_ref()?.clone();
        self.adapter.resolve_entity(&entity)
    }

    // ---- image lifecycle -------------------------------------------------

    /// Starts image acquisition for an image node. Returns the blob if the
    /// adapter resolved immediately; either way the node stays pending
    /// until [`Scene::image_delivered`]. A request while one is pending is
    /// ignored.
    pub fn request_image(&mut self, node_id: &NodeId) -> Option<ImageBlob> {
        let Some(node) = self.diagram.node(node_id) else {
            return None;
        };
        if node.kind() != NodeKind::Image {
            return None;
        }
        if self.pending_images.contains(node_id) {
            log::debug!("image request for {node_id} already pending");
            return None;
        }
        self.pending_images.insert(node_id.clone());
        self.adapter.request_image_upload(node_id)
    }

    pub fn image_pending(&self, node_id: &NodeId) -> bool {
        self.pending_images.contains(node_id)
    }

    /// Completes image acquisition: the host stored the blob and hands back
    /// the reference (or `None` if the user cancelled).
    pub fn image_delivered(
        &mut self,
        node_id: &NodeId,
        image_ref: Option<crate::model::ImageRef>,
    ) {
        if !self.pending_images.remove(node_id) {
            return;
        }
        if let Some(image_ref) = image_ref {
            if let Some(node) = self.diagram.node_mut(node_id) {
                node.set_image_ref(Some(image_ref));
                self.save_diagram();
            }
        }
    }

    pub fn load_image(&self, image_ref: &crate::model::ImageRef) -> Option<ImageBlob> {
        self.adapter.load_image(image_ref)
    }

    // ---- internals -------------------------------------------------------

    fn cancel_transient_state(&mut self) {
        if matches!(self.state, SceneState::AdditionPending { .. }) {
            self.emit(SceneEvent::AdditionCancelled);
        }
        self.state = SceneState::Idle;
    }

    fn start_link(&mut self, node_id: NodeId, angle: f64, pointer: Point) {
        let angle = self
            .diagram
            .node(&node_id)
            .map(|n| item::snap_socket_angle(n.kind(), angle))
            .unwrap_or(angle);
        self.state = SceneState::LinkDrawing {
            source: SocketRef::new(node_id, angle),
            pointer,
        };
    }

    fn commit_link(&mut self, source: &SocketRef, target_node: NodeId, target_angle: f64) {
        let target_angle = self
            .diagram
            .node(&target_node)
            .map(|n| item::snap_socket_angle(n.kind(), target_angle))
            .unwrap_or(target_angle);
        let target = SocketRef::new(target_node, target_angle);

        let (Some(origin), Some(end)) = (
            self.socket_scene_point(source),
            self.socket_scene_point(&target),
        ) else {
            log::warn!("link dropped: an endpoint disappeared mid-draw");
            return;
        };
        let (dx, dy) = origin.delta_to(end);
        let shape = if routing::in_proximity(dx, dy) {
            ConnectorShape::Linear
        } else {
            ConnectorShape::Curved {
                control: routing::default_control_point(dx, dy, source.angle()),
            }
        };

        let connector_id = self.allocate_connector_id();
        let mut connector = Connector::new(connector_id.clone(), source.clone(), target);
        connector.set_shape(shape);

        if self.push_undoable(Command::Link { connector }, true) {
            self.rebuild_incidence();
            self.emit(SceneEvent::ConnectorLinked { connector_id });
        }
    }

    fn place_new_node(&mut self, kind: NodeKind, subtype: &str, pos: Point) {
        let origin = addition_origin(kind, pos);
        let node_id = self.allocate_node_id();
        let mut node = Node::new(node_id.clone(), kind, origin.x(), origin.y());
        node.set_subtype(subtype);
        if let Some(icon) = self.icons.icon_for(subtype) {
            node.set_icon(Some(icon.to_owned()));
        }

        if self.push_undoable(Command::AddNode { node }, true) {
            self.emit(SceneEvent::ItemAdded { node_id: node_id.clone() });
            self.select_only(ItemRef::Node(node_id));
        }
    }

    fn delete_selection(&mut self) {
        if self.selection.is_empty() {
            return;
        }

        let selected_nodes: Vec<NodeId> = self
            .selection
            .iter()
            .filter_map(|item| match item {
                ItemRef::Node(node_id) => Some(node_id.clone()),
                ItemRef::Connector(_) => None,
            })
            .collect();
        let node_set: BTreeSet<&NodeId> = selected_nodes.iter().collect();

        // Connectors selected on their own; edges touching a removed node
        // are captured inside that node's cascade below.
        let mut consumed: BTreeSet<ConnectorId> = BTreeSet::new();
        let mut connectors = Vec::new();
        for item in &self.selection {
            let ItemRef::Connector(connector_id) = item else {
                continue;
            };
            let Some(connector) = self.diagram.connector(connector_id) else {
                continue;
            };
            if node_set.contains(connector.source().node_id())
                || node_set.contains(connector.target().node_id())
            {
                continue;
            }
            consumed.insert(connector_id.clone());
            connectors.push(connector.clone());
        }

        let mut nodes = Vec::new();
        for node_id in &selected_nodes {
            let Some(z_index) = self
                .diagram
                .nodes()
                .iter()
                .position(|n| n.node_id() == node_id)
            else {
                continue;
            };
            let node = self.diagram.nodes()[z_index].clone();
            let cascade: Vec<Connector> = self
                .diagram
                .connectors_of(node_id)
                .filter(|c| !consumed.contains(c.connector_id()))
                .cloned()
                .collect();
            consumed.extend(cascade.iter().map(|c| c.connector_id().clone()));
            nodes.push(crate::model::RemovedNode { node, connectors: cascade, z_index });
        }
        // Ascending z keeps the sequential re-inserts of an undo exact.
        nodes.sort_by_key(|removed| removed.z_index);

        let removed_items: Vec<ItemRef> = self.selection.iter().cloned().collect();
        if self.push_undoable(Command::RemoveSelection { nodes, connectors }, true) {
            self.rebuild_incidence();
            self.selection.clear();
            for item in removed_items {
                self.emit(SceneEvent::ItemRemoved { item });
            }
            self.emit_selection_changed();
        }
    }

    /// Applies a command through the stack. Failures are logged and leave
    /// both the diagram and the stack untouched.
    fn push_undoable(&mut self, command: Command, save: bool) -> bool {
        match self.stack.push(&mut self.diagram, command) {
            Ok(()) => {
                if save {
                    self.save_diagram();
                }
                true
            }
            Err(err) => {
                log::warn!("command rejected: {err}");
                false
            }
        }
    }

    fn save_diagram(&mut self) {
        if let Err(err) = self.adapter.save(&self.diagram) {
            // Optimistic: the in-memory state keeps the change.
            log::warn!("save failed: {err}");
            self.emit(SceneEvent::PersistenceFailed { reason: err.to_string() });
        }
    }

    fn rebuild_incidence(&mut self) {
        self.incidence.clear();
        for connector in self.diagram.connectors() {
            for node_id in [
                connector.source().node_id(),
                connector.target().node_id(),
            ] {
                self.incidence
                    .entry(node_id.clone())
                    .or_default()
                    .push(connector.connector_id().clone());
            }
        }
    }

    fn prune_selection(&mut self) {
        let before = self.selection.len();
        let diagram = &self.diagram;
        self.selection.retain(|item| match item {
            ItemRef::Node(node_id) => diagram.node(node_id).is_some(),
            ItemRef::Connector(connector_id) => diagram.connector(connector_id).is_some(),
        });
        if self.selection.len() != before {
            self.emit_selection_changed();
        }
    }

    fn select_only(&mut self, item: ItemRef) {
        if self.selection.len() == 1 && self.selection.contains(&item) {
            return;
        }
        self.selection.clear();
        self.selection.insert(item);
        self.emit_selection_changed();
    }

    fn clear_selection(&mut self) {
        self.selection.clear();
    }

    fn select_intersecting(&mut self, rect: Rect) {
        self.selection.clear();
        for node in self.diagram.nodes() {
            if self.bounds_of(node).intersects(&rect) {
                self.selection.insert(ItemRef::Node(node.node_id().clone()));
            }
        }
    }

    fn emit_selection_changed(&mut self) {
        let selected = self.selection.iter().cloned().collect();
        self.emit(SceneEvent::SelectionChanged { selected });
    }

    fn single_selected(&self) -> Option<ItemRef> {
        if self.selection.len() == 1 {
            self.selection.iter().next().cloned()
        } else {
            None
        }
    }

    fn emit(&mut self, event: SceneEvent) {
        self.events.push_back(event);
    }

    fn bounds_of(&self, node: &Node) -> Rect {
        item::compute_bounds(node, self.measurer.as_ref())
    }

    fn socket_scene_point(&self, socket: &SocketRef) -> Option<Point> {
        let node = self.diagram.node(socket.node_id())?;
        Some(item::socket_point(node, self.bounds_of(node), socket.angle()))
    }

    fn topmost_node_at(&self, pos: Point) -> Option<NodeId> {
        self.diagram
            .nodes()
            .iter()
            .rev()
            .find(|node| self.bounds_of(node).contains(pos))
            .map(|node| node.node_id().clone())
    }

    fn socket_hit(&self, pos: Point) -> Option<(NodeId, f64)> {
        self.diagram.nodes().iter().rev().find_map(|node| {
            item::socket_at(node, self.bounds_of(node), pos)
                .map(|angle| (node.node_id().clone(), angle))
        })
    }

    fn connector_hit(&self, pos: Point) -> Option<ConnectorId> {
        for connector in self.diagram.connectors().iter().rev() {
            let Some(path) = self.connector_path(connector.connector_id()) else {
                continue;
            };
            if path_distance(&path, pos) <= CONNECTOR_HIT_TOLERANCE {
                return Some(connector.connector_id().clone());
            }
        }
        None
    }

    fn allocate_node_id(&mut self) -> NodeId {
        loop {
            let candidate = NodeId::new(format!("n:{:04}", self.next_id))
                .expect("generated node id is a valid segment");
            self.next_id += 1;
            if self.diagram.node(&candidate).is_none() {
                return candidate;
            }
        }
    }

    fn allocate_connector_id(&mut self) -> ConnectorId {
        loop {
            let candidate = ConnectorId::new(format!("c:{:04}", self.next_id))
                .expect("generated connector id is a valid segment");
            self.next_id += 1;
            if self.diagram.connector(&candidate).is_none() {
                return candidate;
            }
        }
    }
}

/// New nodes land with the click on their content, not their outer corner,
/// mirroring how palettes drop items in the editors.
fn addition_origin(kind: NodeKind, pos: Point) -> Point {
    let offset = match kind {
        NodeKind::Event => item::event::MARGIN + item::event::PADDING,
        NodeKind::Character => item::character::MARGIN,
        NodeKind::Note | NodeKind::Image | NodeKind::Icon => 0.0,
    };
    Point::new((pos.x() - offset).max(0.0), (pos.y() - offset).max(0.0))
}

/// Minimum distance from a point to the sampled path.
fn path_distance(path: &ConnectorPath, pos: Point) -> f64 {
    let origin = path.origin();
    let local = Point::new(pos.x() - origin.x(), pos.y() - origin.y());

    match path.control() {
        None => segment_distance(Point::default(), path.end(), local),
        Some(control) => {
            let curve = QuadCurve::new(control, path.end());
            let mut best = f64::MAX;
            let mut prev = Point::default();
            for i in 1..=PATH_HIT_SAMPLES {
                let next = curve.point_at(i as f64 / PATH_HIT_SAMPLES as f64);
                best = best.min(segment_distance(prev, next, local));
                prev = next;
            }
            best
        }
    }
}

fn segment_distance(a: Point, b: Point, p: Point) -> f64 {
    let (abx, aby) = a.delta_to(b);
    let (apx, apy) = a.delta_to(p);
    let len_sq = abx * abx + aby * aby;
    if len_sq == 0.0 {
        return a.distance_to(p);
    }
    let t = ((apx * abx + apy * aby) / len_sq).clamp(0.0, 1.0);
    p.distance_to(Point::new(a.x() + abx * t, a.y() + aby * t))
}
