// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-Storyweb-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of Storyweb and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

//! In-memory adapter for tests and embedded hosts.

use std::cell::{Cell, RefCell};
use std::collections::BTreeMap;

use super::{DisplayEntity, ImageBlob, PersistenceAdapter, StoreError};
use crate::model::{Diagram, DiagramId, EntityId, ImageRef, NodeId};

/// Keeps every saved diagram in a map and counts `save` calls, which is
/// what the write-amplification tests assert against. `fail_saves` makes
/// every save return an error without touching the stored state, to
/// exercise the optimistic-save path.
#[derive(Debug, Default)]
pub struct MemoryAdapter {
    diagrams: RefCell<BTreeMap<DiagramId, Diagram>>,
    entities: RefCell<BTreeMap<EntityId, DisplayEntity>>,
    images: RefCell<BTreeMap<ImageRef, ImageBlob>>,
    save_count: Cell<usize>,
    fail_saves: Cell<bool>,
}

impl MemoryAdapter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn put_diagram(&self, diagram: Diagram) {
        self.diagrams
            .borrow_mut()
            .insert(diagram.diagram_id().clone(), diagram);
    }

    pub fn diagram(&self, diagram_id: &DiagramId) -> Option<Diagram> {
        self.diagrams.borrow().get(diagram_id).cloned()
    }

    pub fn put_entity(&self, entity_id: EntityId, entity: DisplayEntity) {
        self.entities.borrow_mut().insert(entity_id, entity);
    }

    pub fn put_image(&self, image_ref: ImageRef, blob: ImageBlob) {
        self.images.borrow_mut().insert(image_ref, blob);
    }

    pub fn save_count(&self) -> usize {
        self.save_count.get()
    }

    pub fn reset_save_count(&self) {
        self.save_count.set(0);
    }

    pub fn set_fail_saves(&self, fail: bool) {
        self.fail_saves.set(fail);
    }
}

impl PersistenceAdapter for MemoryAdapter {
    fn load(&self, diagram_id: &DiagramId) -> Result<Diagram, StoreError> {
        self.diagram(diagram_id)
            .ok_or_else(|| StoreError::UnknownDiagram {
                diagram_id: diagram_id.clone(),
            })
    }

    fn save(&self, diagram: &Diagram) -> Result<(), StoreError> {
        self.save_count.set(self.save_count.get() + 1);
        if self.fail_saves.get() {
            return Err(StoreError::UnknownDiagram {
                diagram_id: diagram.diagram_id().clone(),
            });
        }
        self.put_diagram(diagram.clone());
        Ok(())
    }

    fn resolve_entity(&self, entity: &EntityId) -> Option<DisplayEntity> {
        self.entities.borrow().get(entity).cloned()
    }

    fn request_image_upload(&self, _node_id: &NodeId) -> Option<ImageBlob> {
        None
    }

    fn load_image(&self, image_ref: &ImageRef) -> Option<ImageBlob> {
        self.images.borrow().get(image_ref).cloned()
    }
}

#[cfg(test)]
mod tests {
    use super::MemoryAdapter;
    use crate::model::{Diagram, DiagramId};
    use crate::store::PersistenceAdapter;

    #[test]
    fn save_then_load_round_trips() {
        let adapter = MemoryAdapter::new();
        let diagram_id = DiagramId::new("d1").expect("diagram id");
        let diagram = Diagram::new(diagram_id.clone(), "Web");

        adapter.save(&diagram).expect("save");
        let loaded = adapter.load(&diagram_id).expect("load");
        assert_eq!(loaded, diagram);
        assert_eq!(adapter.save_count(), 1);
    }

    #[test]
    fn failing_saves_still_count_but_store_nothing() {
        let adapter = MemoryAdapter::new();
        adapter.set_fail_saves(true);
        let diagram_id = DiagramId::new("d1").expect("diagram id");
        let diagram = Diagram::new(diagram_id.clone(), "Web");

        assert!(adapter.save(&diagram).is_err());
        assert_eq!(adapter.save_count(), 1);
        assert!(adapter.load(&diagram_id).is_err());
    }
}
