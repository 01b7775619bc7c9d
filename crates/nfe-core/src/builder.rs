//! Sink for completed entities.

use nfe_model::{CompletedEntity, EntityKind};

use crate::error::BuilderError;

/// Receives completed entities one at a time, in emission order.
///
/// Implementors own every output concern (element names, nesting, escaping)
/// and may refuse an entity; the refusal aborts the conversion.
pub trait DocumentBuilder {
    fn emit(&mut self, entity: CompletedEntity) -> Result<(), BuilderError>;
}

impl<B: DocumentBuilder + ?Sized> DocumentBuilder for &mut B {
    fn emit(&mut self, entity: CompletedEntity) -> Result<(), BuilderError> {
        (**self).emit(entity)
    }
}

/// Builder that keeps every entity it receives.
#[derive(Debug, Clone, Default)]
pub struct RecordingBuilder {
    entities: Vec<CompletedEntity>,
}

impl RecordingBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn entities(&self) -> &[CompletedEntity] {
        &self.entities
    }

    pub fn into_entities(self) -> Vec<CompletedEntity> {
        self.entities
    }

    pub fn kinds(&self) -> Vec<EntityKind> {
        self.entities.iter().map(|entity| entity.kind).collect()
    }

    pub fn len(&self) -> usize {
        self.entities.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entities.is_empty()
    }
}

impl DocumentBuilder for RecordingBuilder {
    fn emit(&mut self, entity: CompletedEntity) -> Result<(), BuilderError> {
        self.entities.push(entity);
        Ok(())
    }
}
