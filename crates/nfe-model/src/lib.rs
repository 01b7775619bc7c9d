//! Shared data model for the NF-e flat-file converter.
//!
//! Records arrive as pipe-delimited lines ([`SourceLine`]), are split into
//! [`RawRecord`]s, bound into [`AttributeSet`]s and finally leave the
//! assembler as [`CompletedEntity`] values tagged with an [`EntityKind`].

pub mod attributes;
pub mod code;
pub mod entity;
pub mod record;

pub use attributes::AttributeSet;
pub use code::RecordCode;
pub use entity::{CompletedEntity, EntityKind, Trigger};
pub use record::{RawRecord, SourceLine};

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn completed_entity_serializes() {
        let mut attributes = AttributeSet::new();
        attributes.insert("versao", "4.00");
        let entity = CompletedEntity {
            kind: EntityKind::InfNFe,
            attributes,
            trigger: Trigger::Record {
                code: RecordCode::normalize("A"),
                line_number: 2,
            },
        };
        let json = serde_json::to_string(&entity).expect("serialize entity");
        assert!(json.contains("\"kind\":\"InfNFe\""));
        assert!(json.contains("\"versao\":\"4.00\""));
    }
}
