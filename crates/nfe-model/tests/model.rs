//! Tests for nfe-model types.

use nfe_model::{AttributeSet, CompletedEntity, EntityKind, RawRecord, RecordCode, Trigger};

#[test]
fn raw_record_exposes_normalized_code() {
    let record = RawRecord {
        fields: vec!["c02a".to_string(), "12345678909".to_string()],
        line_number: 7,
    };
    assert_eq!(record.code(), RecordCode::normalize("C02A"));
    assert_eq!(record.value(1), Some("12345678909"));
    assert_eq!(record.value(2), None);
}

#[test]
fn empty_record_has_empty_code() {
    let record = RawRecord {
        fields: vec![],
        line_number: 1,
    };
    assert!(record.code().is_empty());
}

#[test]
fn entity_round_trips_through_json() {
    let attributes: AttributeSet = [("XNome", "Acme"), ("CNPJ", "12345678901234")]
        .into_iter()
        .collect();
    let entity = CompletedEntity {
        kind: EntityKind::Emit,
        attributes,
        trigger: Trigger::EndOfDocument,
    };
    let json = serde_json::to_string(&entity).expect("serialize entity");
    let round: CompletedEntity = serde_json::from_str(&json).expect("deserialize entity");
    assert_eq!(round, entity);
    assert_eq!(round.line_number(), None);
}

#[test]
fn attribute_order_follows_insertion() {
    let attributes: AttributeSet = [("b", "2"), ("a", "1"), ("c", "3")].into_iter().collect();
    let names: Vec<&str> = attributes.names().collect();
    assert_eq!(names, vec!["b", "a", "c"]);
}

#[test]
fn entity_tags_match_layout_names() {
    assert_eq!(EntityKind::InfNFe.tag(), "infNFe");
    assert_eq!(EntityKind::AutXml.tag(), "autXML");
    assert_eq!(EntityKind::IssqnTot.tag(), "ISSQNtot");
    assert_eq!(EntityKind::GIbsUfTot.to_string(), "gIBSUF");
}
