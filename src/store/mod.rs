// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-Storyweb-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of Storyweb and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

//! The persistence boundary.
//!
//! The engine talks to its host exclusively through [`PersistenceAdapter`]:
//! diagram load/save, entity resolution for character nodes, and image
//! acquisition for image nodes. `save` failures are surfaced, never fatal —
//! the in-memory diagram keeps the change and the host decides how to retry.

pub mod diagram_folder;
pub mod memory;

use std::fmt;
use std::io;
use std::path::PathBuf;

use crate::model::{Diagram, DiagramId, EntityId, IdError, ImageRef, NodeId};

pub use diagram_folder::{DiagramFolder, WriteDurability};
pub use memory::MemoryAdapter;

/// Display projection of a host-owned entity (a character, usually).
#[derive(Debug, Clone, PartialEq)]
pub struct DisplayEntity {
    name: String,
    avatar: Option<ImageRef>,
    color: Option<String>,
}

impl DisplayEntity {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            avatar: None,
            color: None,
        }
    }

    pub fn with_avatar(mut self, avatar: ImageRef) -> Self {
        self.avatar = Some(avatar);
        self
    }

    pub fn with_color(mut self, color: impl Into<String>) -> Self {
        self.color = Some(color.into());
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn avatar(&self) -> Option<&ImageRef> {
        self.avatar.as_ref()
    }

    pub fn color(&self) -> Option<&str> {
        self.color.as_deref()
    }
}

/// Raw image bytes handed across the adapter boundary.
#[derive(Debug, Clone, PartialEq)]
pub struct ImageBlob {
    data: Vec<u8>,
    mime: String,
}

impl ImageBlob {
    pub fn new(data: Vec<u8>, mime: impl Into<String>) -> Self {
        Self { data, mime: mime.into() }
    }

    pub fn data(&self) -> &[u8] {
        &self.data
    }

    pub fn mime(&self) -> &str {
        &self.mime
    }
}

/// Outward calls the engine makes; the host implements this once per
/// backing store.
///
/// All calls are synchronous from the engine's point of view. Image
/// acquisition is the one boundary allowed to defer: an implementation may
/// return `None` from [`PersistenceAdapter::request_image_upload`] and
/// deliver the blob later through `Scene::image_delivered`.
pub trait PersistenceAdapter {
    fn load(&self, diagram_id: &DiagramId) -> Result<Diagram, StoreError>;

    fn save(&self, diagram: &Diagram) -> Result<(), StoreError>;

    /// Resolves an entity reference to its display projection. `None` means
    /// the entity is gone and the node should render a placeholder.
    fn resolve_entity(&self, entity: &EntityId) -> Option<DisplayEntity>;

    /// Asks the host to pick/upload an image for the given node.
    fn request_image_upload(&self, node_id: &NodeId) -> Option<ImageBlob>;

    fn load_image(&self, image_ref: &ImageRef) -> Option<ImageBlob>;
}

#[derive(Debug)]
pub enum StoreError {
    Io {
        path: PathBuf,
        source: io::Error,
    },
    Json {
        path: PathBuf,
        source: serde_json::Error,
    },
    InvalidId {
        field: &'static str,
        value: String,
        source: Box<IdError>,
    },
    UnknownDiagram {
        diagram_id: DiagramId,
    },
    PathOutsideStore {
        root: PathBuf,
        path: PathBuf,
    },
}

impl fmt::Display for StoreError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Io { path, source } => {
                write!(f, "io error at {}: {source}", path.display())
            }
            Self::Json { path, source } => {
                write!(f, "invalid json at {}: {source}", path.display())
            }
            Self::InvalidId { field, value, source } => {
                write!(f, "invalid id in field {field} ('{value}'): {source}")
            }
            Self::UnknownDiagram { diagram_id } => {
                write!(f, "diagram not found (id={diagram_id})")
            }
            Self::PathOutsideStore { root, path } => {
                write!(
                    f,
                    "path {} escapes store root {}",
                    path.display(),
                    root.display()
                )
            }
        }
    }
}

impl std::error::Error for StoreError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Io { source, .. } => Some(source),
            Self::Json { source, .. } => Some(source),
            Self::InvalidId { source, .. } => Some(source),
            Self::UnknownDiagram { .. } | Self::PathOutsideStore { .. } => None,
        }
    }
}
