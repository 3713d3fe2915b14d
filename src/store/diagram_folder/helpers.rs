// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-Storyweb-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of Storyweb and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

/// Folder persistence helpers: serde DTOs, model conversion, and the
/// atomic write primitive.

#[derive(Debug, Clone, Serialize, Deserialize)]
struct DiagramJson {
    diagram_id: String,
    title: String,
    #[serde(default)]
    nodes: Vec<NodeJson>,
    #[serde(default)]
    connectors: Vec<ConnectorJson>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
struct NodeJson {
    node_id: String,
    kind: String,
    #[serde(default)]
    subtype: String,
    x: f64,
    y: f64,
    size: u32,
    #[serde(default)]
    width: Option<f64>,
    #[serde(default)]
    height: Option<f64>,
    color: String,
    #[serde(default)]
    icon: Option<String>,
    #[serde(default)]
    text: Option<String>,
    #[serde(default)]
    bold: bool,
    #[serde(default)]
    italic: bool,
    #[serde(default)]
    underline: bool,
    #[serde(default)]
    entity_ref: Option<String>,
    #[serde(default)]
    image_ref: Option<String>,
    #[serde(default)]
    transparent: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
struct ConnectorJson {
    connector_id: String,
    source_node_id: String,
    source_angle: f64,
    target_node_id: String,
    target_angle: f64,
    #[serde(default)]
    pen: PenStyleJson,
    #[serde(default = "default_pen_width")]
    width: u32,
    #[serde(default)]
    color: Option<String>,
    #[serde(default)]
    icon: Option<String>,
    #[serde(default)]
    text: Option<String>,
    #[serde(default)]
    cp_x: Option<f64>,
    #[serde(default)]
    cp_y: Option<f64>,
    #[serde(default)]
    arrow_start: bool,
    #[serde(default = "default_true")]
    arrow_end: bool,
}

fn default_pen_width() -> u32 {
    DEFAULT_PEN_WIDTH
}

fn default_true() -> bool {
    true
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
enum PenStyleJson {
    #[default]
    Solid,
    Dash,
    Dot,
}

impl From<PenStyle> for PenStyleJson {
    fn from(pen: PenStyle) -> Self {
        match pen {
            PenStyle::Solid => Self::Solid,
            PenStyle::Dash => Self::Dash,
            PenStyle::Dot => Self::Dot,
        }
    }
}

impl From<PenStyleJson> for PenStyle {
    fn from(pen: PenStyleJson) -> Self {
        match pen {
            PenStyleJson::Solid => Self::Solid,
            PenStyleJson::Dash => Self::Dash,
            PenStyleJson::Dot => Self::Dot,
        }
    }
}

fn diagram_to_json(diagram: &Diagram) -> DiagramJson {
    DiagramJson {
        diagram_id: diagram.diagram_id().to_string(),
        title: diagram.title().to_owned(),
        nodes: diagram.nodes().iter().map(node_to_json).collect(),
        connectors: diagram.connectors().iter().map(connector_to_json).collect(),
    }
}

fn node_to_json(node: &Node) -> NodeJson {
    NodeJson {
        node_id: node.node_id().to_string(),
        kind: node.kind().tag().to_owned(),
        subtype: node.subtype().to_owned(),
        x: node.x(),
        y: node.y(),
        size: node.size(),
        width: node.width(),
        height: node.height(),
        color: node.color().to_owned(),
        icon: node.icon().map(ToOwned::to_owned),
        text: node.text().map(ToOwned::to_owned),
        bold: node.bold(),
        italic: node.italic(),
        underline: node.underline(),
        entity_ref: node.entity_ref().map(ToString::to_string),
        image_ref: node.image_ref().map(ToString::to_string),
        transparent: node.transparent(),
    }
}

fn connector_to_json(connector: &Connector) -> ConnectorJson {
    let control = connector.shape().control_point();
    ConnectorJson {
        connector_id: connector.connector_id().to_string(),
        source_node_id: connector.source().node_id().to_string(),
        source_angle: connector.source().angle(),
        target_node_id: connector.target().node_id().to_string(),
        target_angle: connector.target().angle(),
        pen: connector.pen_style().into(),
        width: connector.pen_width(),
        color: connector.color().map(ToOwned::to_owned),
        icon: connector.icon().map(ToOwned::to_owned),
        text: connector.text().map(ToOwned::to_owned),
        cp_x: control.map(|p| p.x()),
        cp_y: control.map(|p| p.y()),
        arrow_start: connector.arrow_start(),
        arrow_end: connector.arrow_end(),
    }
}

fn diagram_from_json(json: DiagramJson) -> Result<Diagram, StoreError> {
    let diagram_id =
        DiagramId::new(json.diagram_id.clone()).map_err(|source| StoreError::InvalidId {
            field: "diagram_id",
            value: json.diagram_id,
            source: Box::new(source),
        })?;

    let mut diagram = Diagram::new(diagram_id, json.title);

    for node_json in json.nodes {
        let node = node_from_json(node_json)?;
        if let Err(err) = diagram.add_node(node) {
            log::warn!("skipping node: {err}");
        }
    }

    for connector_json in json.connectors {
        let connector = connector_from_json(connector_json)?;
        if let Err(err) = diagram.add_connector(connector) {
            // A reference into a missing node or a self-link in the file is
            // recovered by dropping the connector, never by failing the load.
            log::warn!("skipping connector: {err}");
        }
    }

    diagram.mark_loaded();
    Ok(diagram)
}

fn node_from_json(json: NodeJson) -> Result<Node, StoreError> {
    let node_id = NodeId::new(json.node_id.clone()).map_err(|source| StoreError::InvalidId {
        field: "nodes[].node_id",
        value: json.node_id,
        source: Box::new(source),
    })?;

    let kind = NodeKind::from_tag(&json.kind).unwrap_or_else(|| {
        log::warn!("unknown node kind '{}', falling back to event", json.kind);
        NodeKind::Event
    });

    let mut node = Node::new(node_id, kind, json.x, json.y);
    node.set_subtype(json.subtype);
    node.set_size(json.size);
    if let (Some(width), Some(height)) = (json.width, json.height) {
        node.set_explicit_size(width, height);
    }
    node.set_color(json.color);
    node.set_icon(json.icon);
    node.set_text(json.text);
    node.set_font_settings(None, Some(json.bold), Some(json.italic), Some(json.underline));
    node.set_entity_ref(parse_optional_ref(json.entity_ref, "entity_ref"));
    node.set_image_ref(parse_optional_ref(json.image_ref, "image_ref"));
    node.set_transparent(json.transparent);
    Ok(node)
}

fn parse_optional_ref<T>(raw: Option<String>, field: &str) -> Option<Id<T>> {
    let raw = raw?;
    match Id::<T>::new(raw) {
        Ok(id) => Some(id),
        Err(err) => {
            log::warn!("dropping invalid {field}: {err}");
            None
        }
    }
}

fn connector_from_json(json: ConnectorJson) -> Result<Connector, StoreError> {
    let connector_id =
        ConnectorId::new(json.connector_id.clone()).map_err(|source| StoreError::InvalidId {
            field: "connectors[].connector_id",
            value: json.connector_id,
            source: Box::new(source),
        })?;
    let source_node_id =
        NodeId::new(json.source_node_id.clone()).map_err(|source| StoreError::InvalidId {
            field: "connectors[].source_node_id",
            value: json.source_node_id,
            source: Box::new(source),
        })?;
    let target_node_id =
        NodeId::new(json.target_node_id.clone()).map_err(|source| StoreError::InvalidId {
            field: "connectors[].target_node_id",
            value: json.target_node_id,
            source: Box::new(source),
        })?;

    let mut connector = Connector::new(
        connector_id,
        SocketRef::new(source_node_id, json.source_angle),
        SocketRef::new(target_node_id, json.target_angle),
    );
    if let (Some(cp_x), Some(cp_y)) = (json.cp_x, json.cp_y) {
        connector.set_shape(ConnectorShape::Curved { control: Point::new(cp_x, cp_y) });
    }
    connector.set_pen_style(json.pen.into());
    connector.set_pen_width(json.width);
    connector.set_color(json.color);
    connector.set_icon(json.icon);
    connector.set_text(json.text);
    connector.set_arrowheads(json.arrow_start, json.arrow_end);
    Ok(connector)
}

fn write_atomic(path: &Path, bytes: &[u8], durability: WriteDurability) -> std::io::Result<()> {
    let mut tmp = path.as_os_str().to_owned();
    tmp.push(".tmp");
    let tmp = PathBuf::from(tmp);

    {
        let mut file = fs::File::create(&tmp)?;
        file.write_all(bytes)?;
        if durability == WriteDurability::Durable {
            file.sync_all()?;
        }
    }
    fs::rename(&tmp, path)?;

    if durability == WriteDurability::Durable {
        if let Some(parent) = path.parent() {
            // Directory fsync is best-effort; not every platform allows it.
            if let Ok(dir) = fs::File::open(parent) {
                let _ = dir.sync_all();
            }
        }
    }
    Ok(())
}

fn mime_of(path: &Path) -> &'static str {
    match path.extension().and_then(|e| e.to_str()) {
        Some("png") => "image/png",
        Some("jpg") | Some("jpeg") => "image/jpeg",
        Some("gif") => "image/gif",
        Some("webp") => "image/webp",
        _ => "application/octet-stream",
    }
}
