// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-Storyweb-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of Storyweb and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

use std::env;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::{SystemTime, UNIX_EPOCH};

use rstest::{fixture, rstest};

use super::{DiagramFolder, WriteDurability};
use crate::geometry::Point;
use crate::model::{
    Connector, ConnectorId, ConnectorShape, Diagram, DiagramId, EntityId, ImageRef, Node,
    NodeId, NodeKind, PenStyle, SocketRef,
};
use crate::store::{DisplayEntity, ImageBlob, PersistenceAdapter, StoreError};

static TEMP_DIR_COUNTER: AtomicUsize = AtomicUsize::new(0);

struct TempDir {
    path: std::path::PathBuf,
}

impl TempDir {
    fn new(prefix: &str) -> Self {
        let nanos = SystemTime::now().duration_since(UNIX_EPOCH).unwrap_or_default().as_nanos();
        let counter = TEMP_DIR_COUNTER.fetch_add(1, Ordering::Relaxed);
        let mut path = env::temp_dir();
        path.push(format!("storyweb-{prefix}-{}-{nanos}-{counter}", std::process::id()));
        std::fs::create_dir_all(&path).unwrap();
        Self { path }
    }

    fn path(&self) -> &std::path::Path {
        &self.path
    }
}

impl Drop for TempDir {
    fn drop(&mut self) {
        let _ = std::fs::remove_dir_all(&self.path);
    }
}

struct FolderTestCtx {
    tmp: TempDir,
    folder: DiagramFolder,
}

impl FolderTestCtx {
    fn new(prefix: &str) -> Self {
        let tmp = TempDir::new(prefix);
        let folder = DiagramFolder::new(tmp.path()).with_durability(WriteDurability::Fast);
        Self { tmp, folder }
    }
}

#[fixture]
fn ctx() -> FolderTestCtx {
    FolderTestCtx::new("diagram-folder")
}

fn node_id(id: &str) -> NodeId {
    NodeId::new(id).expect("node id")
}

fn sample_diagram() -> Diagram {
    let mut diagram = Diagram::new(DiagramId::new("d1").expect("diagram id"), "Story Web");

    let mut character = Node::new(node_id("char"), NodeKind::Character, 50.0, 50.0);
    character.set_entity_ref(Some(EntityId::new("e:alice").expect("entity id")));
    diagram.add_node(character).expect("add character");

    let mut event = Node::new(node_id("event"), NodeKind::Event, 300.0, 50.0);
    event.set_text(Some("Inciting incident"));
    event.set_subtype("disturbance");
    event.set_icon(Some("bolt"));
    event.set_font_settings(Some(16), Some(true), None, Some(true));
    diagram.add_node(event).expect("add event");

    let mut note = Node::new(node_id("note"), NodeKind::Note, 80.0, 300.0);
    note.set_text(Some("Check the timeline here"));
    note.set_explicit_size(220.0, 90.0);
    diagram.add_node(note).expect("add note");

    let mut image = Node::new(node_id("image"), NodeKind::Image, 400.0, 300.0);
    image.set_image_ref(Some(ImageRef::new("map.png").expect("image ref")));
    image.set_explicit_size(200.0, 120.0);
    diagram.add_node(image).expect("add image");

    let mut sticker = Node::new(node_id("sticker"), NodeKind::Icon, 200.0, 10.0);
    sticker.set_icon(Some("comment"));
    diagram.add_node(sticker).expect("add sticker");

    let mut straight = Connector::new(
        ConnectorId::new("c:straight").expect("connector id"),
        SocketRef::new(node_id("char"), 15.0),
        SocketRef::new(node_id("event"), 180.0),
    );
    straight.set_pen_style(PenStyle::Dash);
    straight.set_text(Some("causes"));
    diagram.add_connector(straight).expect("add straight");

    let mut curved = Connector::new(
        ConnectorId::new("c:curved").expect("connector id"),
        SocketRef::new(node_id("event"), 270.0),
        SocketRef::new(node_id("note"), 90.0),
    );
    curved.set_shape(ConnectorShape::Curved { control: Point::new(12.5, -48.25) });
    curved.set_color(Some("#884400"));
    curved.set_icon(Some("heart"));
    diagram.add_connector(curved).expect("add curved");

    diagram.mark_loaded();
    diagram
}

#[rstest]
fn save_then_load_round_trips_every_variant(ctx: FolderTestCtx) {
    let diagram = sample_diagram();
    ctx.folder.save(&diagram).expect("save");

    let loaded = ctx
        .folder
        .load(diagram.diagram_id())
        .expect("load");
    assert_eq!(loaded, diagram);
}

#[rstest]
fn load_of_a_missing_diagram_reports_unknown(ctx: FolderTestCtx) {
    let missing = DiagramId::new("ghost").expect("diagram id");
    let result = ctx.folder.load(&missing);
    assert!(matches!(result, Err(StoreError::UnknownDiagram { .. })));
}

#[rstest]
fn save_leaves_no_temp_file_behind(ctx: FolderTestCtx) {
    let diagram = sample_diagram();
    ctx.folder.save(&diagram).expect("save");

    let leftovers: Vec<_> = std::fs::read_dir(ctx.tmp.path())
        .expect("read dir")
        .filter_map(Result::ok)
        .filter(|e| e.file_name().to_string_lossy().ends_with(".tmp"))
        .collect();
    assert!(leftovers.is_empty());
}

#[rstest]
fn dangling_connector_is_skipped_but_nodes_survive(ctx: FolderTestCtx) {
    let path = ctx.folder.diagram_path(&DiagramId::new("partial").expect("diagram id"));
    std::fs::write(
        &path,
        r##"{
  "diagram_id": "partial",
  "title": "Partial",
  "nodes": [
    { "node_id": "a", "kind": "event", "x": 0.0, "y": 0.0, "size": 12, "color": "#000000" }
  ],
  "connectors": [
    {
      "connector_id": "c1",
      "source_node_id": "a",
      "source_angle": 0.0,
      "target_node_id": "gone",
      "target_angle": 180.0
    }
  ]
}"##,
    )
    .expect("write");

    let loaded = ctx
        .folder
        .load(&DiagramId::new("partial").expect("diagram id"))
        .expect("load");
    assert_eq!(loaded.nodes().len(), 1);
    assert!(loaded.connectors().is_empty());
}

#[rstest]
fn unknown_node_kind_falls_back_to_event(ctx: FolderTestCtx) {
    let path = ctx.folder.diagram_path(&DiagramId::new("odd").expect("diagram id"));
    std::fs::write(
        &path,
        r##"{
  "diagram_id": "odd",
  "title": "Odd",
  "nodes": [
    { "node_id": "a", "kind": "hologram", "x": 5.0, "y": 5.0, "size": 12, "color": "#123456" }
  ]
}"##,
    )
    .expect("write");

    let loaded = ctx
        .folder
        .load(&DiagramId::new("odd").expect("diagram id"))
        .expect("load");
    let node = loaded.node(&node_id("a")).expect("node");
    assert_eq!(node.kind(), NodeKind::Event);
    assert_eq!(node.color(), "#123456");
}

#[rstest]
fn self_link_in_the_file_is_dropped_on_load(ctx: FolderTestCtx) {
    let path = ctx.folder.diagram_path(&DiagramId::new("loop").expect("diagram id"));
    std::fs::write(
        &path,
        r##"{
  "diagram_id": "loop",
  "title": "Loop",
  "nodes": [
    { "node_id": "a", "kind": "event", "x": 0.0, "y": 0.0, "size": 12, "color": "#000000" }
  ],
  "connectors": [
    {
      "connector_id": "c1",
      "source_node_id": "a",
      "source_angle": 0.0,
      "target_node_id": "a",
      "target_angle": 180.0
    }
  ]
}"##,
    )
    .expect("write");

    let loaded = ctx
        .folder
        .load(&DiagramId::new("loop").expect("diagram id"))
        .expect("load");
    assert!(loaded.connectors().is_empty());
}

#[rstest]
fn resolve_entity_uses_the_seeded_lookup(ctx: FolderTestCtx) {
    let alice = EntityId::new("e:alice").expect("entity id");
    let folder = DiagramFolder::new(ctx.tmp.path()).with_entities(
        [(alice.clone(), DisplayEntity::new("Alice").with_color("#aa2244"))]
            .into_iter()
            .collect(),
    );

    let resolved = folder.resolve_entity(&alice).expect("resolved");
    assert_eq!(resolved.name(), "Alice");
    assert_eq!(resolved.color(), Some("#aa2244"));

    let ghost = EntityId::new("e:ghost").expect("entity id");
    assert_eq!(folder.resolve_entity(&ghost), None);
}

#[rstest]
fn load_image_reads_blob_bytes(ctx: FolderTestCtx) {
    let images = ctx.tmp.path().join("images");
    std::fs::create_dir_all(&images).expect("mkdir");
    std::fs::write(images.join("map.png"), b"not-really-a-png").expect("write");

    let blob = ctx
        .folder
        .load_image(&ImageRef::new("map.png").expect("image ref"))
        .expect("blob");
    assert_eq!(blob.data(), b"not-really-a-png");
    assert_eq!(blob.mime(), "image/png");
}

#[rstest]
fn parent_traversal_image_refs_are_refused(ctx: FolderTestCtx) {
    assert_eq!(
        ctx.folder.load_image(&ImageRef::new("..").expect("image ref")),
        None
    );
}

#[test]
fn image_blob_round_trip_preserves_bytes() {
    let blob = ImageBlob::new(vec![1, 2, 3], "image/png");
    assert_eq!(blob.data(), &[1, 2, 3]);
    assert_eq!(blob.mime(), "image/png");
}
