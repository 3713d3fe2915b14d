// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-Storyweb-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of Storyweb and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

//! JSON folder persistence.
//!
//! One file per diagram (`<id>.diagram.json`) under a root directory, plus
//! an `images/` subdirectory for blobs. Writes are atomic (temp file plus
//! rename); `WriteDurability::Durable` additionally fsyncs. Dangling
//! references inside a file are skipped on load with a warning — a partial
//! file must never take the editor down.

use std::collections::BTreeMap;
use std::fs;
use std::io::Write as _;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use super::{DisplayEntity, ImageBlob, PersistenceAdapter, StoreError};
use crate::geometry::Point;
use crate::model::{
    Connector, ConnectorId, ConnectorShape, Diagram, DiagramId, EntityId, Id, ImageRef, Node,
    NodeId, NodeKind, PenStyle, SocketRef, DEFAULT_PEN_WIDTH,
};

const DIAGRAM_FILE_SUFFIX: &str = ".diagram.json";
const IMAGES_DIR: &str = "images";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum WriteDurability {
    /// Atomic rename only.
    Fast,
    /// Atomic rename plus fsync of file and directory.
    #[default]
    Durable,
}

/// Stores diagrams as JSON files in a directory.
#[derive(Debug)]
pub struct DiagramFolder {
    root: PathBuf,
    durability: WriteDurability,
    entities: BTreeMap<EntityId, DisplayEntity>,
}

impl DiagramFolder {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self {
            root: root.into(),
            durability: WriteDurability::default(),
            entities: BTreeMap::new(),
        }
    }

    pub fn with_durability(mut self, durability: WriteDurability) -> Self {
        self.durability = durability;
        self
    }

    /// Seeds the entity lookup used by `resolve_entity`. The host keeps
    /// this current; a missing entry renders as a placeholder.
    pub fn with_entities(mut self, entities: BTreeMap<EntityId, DisplayEntity>) -> Self {
        self.entities = entities;
        self
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn durability(&self) -> WriteDurability {
        self.durability
    }

    pub fn diagram_path(&self, diagram_id: &DiagramId) -> PathBuf {
        self.root
            .join(format!("{}{DIAGRAM_FILE_SUFFIX}", diagram_id.as_str()))
    }

    fn image_path(&self, image_ref: &ImageRef) -> Result<PathBuf, StoreError> {
        // Ids cannot contain '/', but "." and ".." are still valid segments.
        if matches!(image_ref.as_str(), "." | "..") || image_ref.as_str().contains('\\') {
            return Err(StoreError::PathOutsideStore {
                root: self.root.clone(),
                path: PathBuf::from(image_ref.as_str()),
            });
        }
        Ok(self.root.join(IMAGES_DIR).join(image_ref.as_str()))
    }
}

impl PersistenceAdapter for DiagramFolder {
    fn load(&self, diagram_id: &DiagramId) -> Result<Diagram, StoreError> {
        let path = self.diagram_path(diagram_id);
        let bytes = match fs::read(&path) {
            Ok(bytes) => bytes,
            Err(source) if source.kind() == std::io::ErrorKind::NotFound => {
                return Err(StoreError::UnknownDiagram {
                    diagram_id: diagram_id.clone(),
                });
            }
            Err(source) => return Err(StoreError::Io { path, source }),
        };
        let json: DiagramJson = serde_json::from_slice(&bytes)
            .map_err(|source| StoreError::Json { path: path.clone(), source })?;
        diagram_from_json(json)
    }

    fn save(&self, diagram: &Diagram) -> Result<(), StoreError> {
        let path = self.diagram_path(diagram.diagram_id());
        let json = diagram_to_json(diagram);
        let bytes = serde_json::to_vec_pretty(&json)
            .map_err(|source| StoreError::Json { path: path.clone(), source })?;
        fs::create_dir_all(&self.root).map_err(|source| StoreError::Io {
            path: self.root.clone(),
            source,
        })?;
        write_atomic(&path, &bytes, self.durability)
            .map_err(|source| StoreError::Io { path, source })
    }

    fn resolve_entity(&self, entity: &EntityId) -> Option<DisplayEntity> {
        self.entities.get(entity).cloned()
    }

    fn request_image_upload(&self, _node_id: &NodeId) -> Option<ImageBlob> {
        // Picking an image is host UI; the folder store only serves blobs.
        None
    }

    fn load_image(&self, image_ref: &ImageRef) -> Option<ImageBlob> {
        let path = match self.image_path(image_ref) {
            Ok(path) => path,
            Err(err) => {
                log::warn!("refusing image path: {err}");
                return None;
            }
        };
        match fs::read(&path) {
            Ok(data) => Some(ImageBlob::new(data, mime_of(&path))),
            Err(err) => {
                log::warn!("image {} unreadable: {err}", path.display());
                None
            }
        }
    }
}

// DTO structs and model conversion.
include!("diagram_folder/helpers.rs");

#[cfg(test)]
mod tests;
