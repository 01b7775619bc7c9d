//! Record-level assembly behavior against small in-memory layouts.

use nfe_core::{ConversionOptions, ConvertError, Converter, RecordingBuilder, Slot};
use nfe_ingest::Document;
use nfe_model::{EntityKind, RecordCode, SourceLine, Trigger};
use nfe_schema::{LayoutVersion, SchemaRegistry};

const LAYOUTS: &[&str] = &[
    "A|versao|Id|pk_nItem|",
    "C|XNome|XFant|IE|IEST|IM|CNAE|CRT|",
    "C02|CNPJ|",
    "H|item|infAdProd|",
    "I|cProd|xProd|",
    "LA|cProdANP|descANP|",
    "LA07|qBCProd|vAliqProd|vCIDE|",
    "M|vTotTrib|",
    "O|clEnq|CNPJProd|cSelo|qSelo|cEnq|",
    "O07|CST|vIPI|",
    "O08|CST|",
    "Q|",
    "Q05|CST|vPIS|",
    "Q07|vBC|pPIS|",
    "R|vPIS|",
    "R02|vBC|pPIS|",
    "R05|indSomaPISST|",
    "S|",
    "S02|CST|vBC|pCOFINS|vCOFINS|",
    "W|",
    "W02|vBC|vICMS|vNF|",
    "W06C|qBCMono|vICMSMono|",
    "W17|vServ|vBC|vISS|",
    "X26|qVol|esp|",
    "X33|nLacre|",
    "YA|tPag|vPag|CNPJ|tBand|cAut|tpIntegra|",
];

fn registry(version: LayoutVersion) -> SchemaRegistry {
    SchemaRegistry::from_layouts(version, LAYOUTS.iter().copied()).unwrap()
}

fn document(lines: &[&str]) -> Document {
    Document {
        index: 1,
        lines: lines
            .iter()
            .enumerate()
            .map(|(index, text)| SourceLine::new(index + 1, *text))
            .collect(),
    }
}

fn convert(
    version: LayoutVersion,
    lines: &[&str],
) -> (Result<nfe_core::ConversionReport, ConvertError>, RecordingBuilder) {
    let registry = registry(version);
    let converter = Converter::new(&registry, ConversionOptions::default()).unwrap();
    let mut builder = RecordingBuilder::new();
    let result = converter.convert(&document(lines), &mut builder);
    (result, builder)
}

fn record_trigger(code: &str, line_number: usize) -> Trigger {
    Trigger::Record {
        code: RecordCode::normalize(code),
        line_number,
    }
}

#[test]
fn direct_emit_and_terminal_merge() {
    let registry = SchemaRegistry::from_layouts(
        LayoutVersion::V400,
        ["A|versao|Id|pk_nItem|", "C|XNome|XFant|IE|IEST|IM|CNAE|CRT|", "C02|CNPJ|"],
    )
    .unwrap();
    let converter = Converter::new(&registry, ConversionOptions::default()).unwrap();
    let mut builder = RecordingBuilder::new();
    let report = converter
        .convert(
            &document(&["A|1.0|ID123|1|", "C|Acme|Shop|IE1||0|", "C02|12345678901234|"]),
            &mut builder,
        )
        .unwrap();

    assert_eq!(builder.kinds(), [EntityKind::InfNFe, EntityKind::Emit]);
    let entities = builder.entities();
    assert_eq!(entities[0].attributes.get("versao"), Some("1.0"));
    assert_eq!(entities[0].attributes.get("Id"), Some("ID123"));
    assert_eq!(entities[0].trigger, record_trigger("A", 1));

    let emit = &entities[1];
    assert_eq!(emit.attributes.get("XNome"), Some("Acme"));
    assert_eq!(emit.attributes.get("XFant"), Some("Shop"));
    assert_eq!(emit.attributes.get("CNPJ"), Some("12345678901234"));
    assert_eq!(emit.attributes.get("CPF"), Some(""));
    assert_eq!(emit.trigger, record_trigger("C02", 3));

    insta::assert_json_snapshot!(report, @r#"
    {
      "document_index": 1,
      "records": 3,
      "entities": 2,
      "by_kind": {
        "InfNFe": 1,
        "Emit": 1
      }
    }
    "#);
}

#[test]
fn continuation_before_its_opener_fails() {
    let (result, builder) = convert(
        LayoutVersion::V400,
        &["A|4.00|NFe1||", "C02|12345678901234|", "C|Acme|||||3|"],
    );
    match result.unwrap_err() {
        ConvertError::MissingContext {
            code,
            context,
            line_number,
        } => {
            assert_eq!(code, "C02");
            assert_eq!(context, "an open emit group");
            assert_eq!(line_number, 2);
        }
        other => panic!("unexpected error: {other}"),
    }
    assert!(builder.is_empty());
}

#[test]
fn later_continuation_overwrites_earlier_value() {
    let (result, builder) = convert(
        LayoutVersion::V400,
        &["A|4.00|NFe1||", "H|1||", "O|||||999|", "O07|50|10.00|", "O08|53|"],
    );
    result.unwrap();
    assert_eq!(builder.kinds(), [EntityKind::InfNFe, EntityKind::Ipi]);
    let ipi = &builder.entities()[1];
    assert_eq!(ipi.attributes.get("CST"), Some("53"));
    assert_eq!(ipi.attributes.get("vIPI"), Some("10.00"));
    assert_eq!(ipi.attributes.get("cEnq"), Some("999"));
    assert_eq!(ipi.attributes.get("vBC"), Some(""));
    assert_eq!(ipi.attributes.get("item"), Some("1"));
}

#[test]
fn unknown_record_type_aborts_without_output() {
    let (result, builder) = convert(LayoutVersion::V400, &["A|4.00|NFe1||", "ZZ9|x|"]);
    match result.unwrap_err() {
        ConvertError::UnrecognizedRecordType {
            code,
            line,
            line_number,
        } => {
            assert_eq!(code, "ZZ9");
            assert_eq!(line, "ZZ9|x|");
            assert_eq!(line_number, 2);
        }
        other => panic!("unexpected error: {other}"),
    }
    assert!(builder.is_empty());
}

#[test]
fn handled_code_missing_from_layouts_is_unrecognized() {
    let (result, builder) = convert(LayoutVersion::V400, &["A|4.00|NFe1||", "B|35|"]);
    assert!(matches!(
        result.unwrap_err(),
        ConvertError::UnrecognizedRecordType { ref code, line_number: 2, .. } if code == "B"
    ));
    assert!(builder.is_empty());
}

#[test]
fn blank_record_inside_document_fails() {
    let (result, _) = convert(LayoutVersion::V400, &["A|4.00|NFe1||", "  "]);
    assert!(matches!(
        result.unwrap_err(),
        ConvertError::EmptyRecord { line_number: 2 }
    ));
}

#[test]
fn item_records_require_a_current_item() {
    let (result, _) = convert(LayoutVersion::V400, &["A|4.00|NFe1||", "I|001|Cafe|"]);
    assert!(matches!(
        result.unwrap_err(),
        ConvertError::MissingContext { ref context, .. } if context == "a current item"
    ));

    let (result, _) = convert(
        LayoutVersion::V400,
        &["A|4.00|NFe1||", "H|1||", "I|001|Cafe|", "H|||", "I|002|Leite|"],
    );
    assert!(matches!(
        result.unwrap_err(),
        ConvertError::MissingContext { line_number: 5, .. }
    ));
}

#[test]
fn item_records_are_stamped_with_current_item() {
    let (result, builder) = convert(
        LayoutVersion::V400,
        &["A|4.00|NFe1||", "H|1|Lote 7|", "I|001|Cafe|", "H|2||", "I|002|Leite|"],
    );
    result.unwrap();
    assert_eq!(
        builder.kinds(),
        [
            EntityKind::InfNFe,
            EntityKind::InfAdProd,
            EntityKind::Prod,
            EntityKind::Prod
        ]
    );
    let items: Vec<_> = builder.entities()[1..]
        .iter()
        .map(|entity| entity.attributes.get("item"))
        .collect();
    assert_eq!(items, [Some("1"), Some("1"), Some("2")]);
}

#[test]
fn pisst_is_flushed_by_the_next_tax_group() {
    let (result, builder) = convert(
        LayoutVersion::V400,
        &[
            "A|4.00|NFe1||",
            "H|1||",
            "R|0.50|",
            "R02|100.00|0.65|",
            "S|",
            "S02|01|100.00|7.60|7.60|",
        ],
    );
    result.unwrap();
    assert_eq!(
        builder.kinds(),
        [EntityKind::InfNFe, EntityKind::PisSt, EntityKind::Cofins]
    );
    let pisst = &builder.entities()[1];
    assert_eq!(pisst.trigger, record_trigger("S", 5));
    assert_eq!(pisst.attributes.get("vPIS"), Some("0.50"));
    assert_eq!(pisst.attributes.get("vBC"), Some("100.00"));
    assert_eq!(pisst.attributes.get("indSomaPISST"), Some(""));
    assert_eq!(pisst.attributes.get("item"), Some("1"));
}

#[test]
fn pisst_closes_on_its_own_terminal_record() {
    let (result, builder) = convert(
        LayoutVersion::V400,
        &["A|4.00|NFe1||", "H|1||", "R|0.50|", "R02|100.00|0.65|", "R05|1|", "S|"],
    );
    result.unwrap();
    assert_eq!(builder.kinds(), [EntityKind::InfNFe, EntityKind::PisSt]);
    let pisst = &builder.entities()[1];
    assert_eq!(pisst.trigger, record_trigger("R05", 5));
    assert_eq!(pisst.attributes.get("indSomaPISST"), Some("1"));
}

#[test]
fn pisst_closes_on_r02_for_layout_310() {
    let (result, builder) = convert(
        LayoutVersion::V310,
        &["A|3.10|NFe1||", "H|1||", "R|0.50|", "R02|100.00|0.65|"],
    );
    result.unwrap();
    let pisst = &builder.entities()[1];
    assert_eq!(pisst.kind, EntityKind::PisSt);
    assert_eq!(pisst.trigger, record_trigger("R02", 4));
}

#[test]
fn q05_merges_only_cst_for_layout_310() {
    let lines = [
        "A|3.10|NFe1||",
        "H|1||",
        "Q|",
        "Q05|99|1.00|",
        "Q07|2.00|1.65|",
    ];

    let (result, builder) = convert(LayoutVersion::V310, &lines);
    result.unwrap();
    let pis = &builder.entities()[1];
    assert_eq!(pis.kind, EntityKind::Pis);
    assert_eq!(pis.attributes.get("CST"), Some("99"));
    assert_eq!(pis.attributes.get("vPIS"), Some(""));
    assert_eq!(pis.attributes.get("pPIS"), Some("1.65"));

    let (result, builder) = convert(LayoutVersion::V400, &lines);
    result.unwrap();
    assert_eq!(builder.entities()[1].attributes.get("vPIS"), Some("1.00"));
    assert_eq!(builder.entities()[1].attributes.get("CST"), Some("99"));
}

#[test]
fn ya_is_a_payment_detail_for_layout_310() {
    let lines = ["A|3.10|NFe1||", "YA|03|37.50|11222333000181|01|AUT9|1|"];

    let (result, builder) = convert(LayoutVersion::V310, &lines);
    result.unwrap();
    assert_eq!(builder.kinds(), [EntityKind::InfNFe, EntityKind::DetPag]);
    let detail = &builder.entities()[1];
    assert_eq!(detail.trigger, record_trigger("YA", 2));
    assert_eq!(detail.attributes.get("tPag"), Some("03"));
    assert_eq!(detail.attributes.get("cAut"), Some("AUT9"));

    let (result, builder) = convert(LayoutVersion::V400, &lines);
    result.unwrap();
    assert_eq!(builder.kinds(), [EntityKind::InfNFe]);
}

#[test]
fn comb_is_flushed_before_imposto() {
    let (result, builder) = convert(
        LayoutVersion::V400,
        &[
            "A|4.00|NFe1||",
            "H|1||",
            "LA|210203001|GLP|",
            "LA07|1.0000|0.1000|0.10|",
            "M|12.34|",
        ],
    );
    result.unwrap();
    assert_eq!(
        builder.kinds(),
        [EntityKind::InfNFe, EntityKind::Comb, EntityKind::Imposto]
    );
    let comb = &builder.entities()[1];
    assert_eq!(comb.trigger, record_trigger("M", 5));
    assert_eq!(comb.attributes.get("cProdANP"), Some("210203001"));
    assert_eq!(comb.attributes.get("vCIDE"), Some("0.10"));
    assert_eq!(comb.attributes.get("item"), Some("1"));
}

#[test]
fn open_comb_is_flushed_at_end_of_document() {
    let (result, builder) = convert(
        LayoutVersion::V400,
        &["A|4.00|NFe1||", "H|3||", "LA|210203001|GLP|"],
    );
    result.unwrap();
    let comb = &builder.entities()[1];
    assert_eq!(comb.kind, EntityKind::Comb);
    assert_eq!(comb.trigger, Trigger::EndOfDocument);
    assert_eq!(comb.attributes.get("item"), Some("3"));
}

#[test]
fn totals_emit_in_fixed_order_at_end() {
    let (result, builder) = convert(
        LayoutVersion::V400,
        &[
            "A|4.00|NFe1||",
            "W|",
            "W17|50.00|50.00|2.50|",
            "W02|100.00|18.00|150.00|",
            "W06C|1.0000|0.50|",
        ],
    );
    let report = result.unwrap();
    assert_eq!(
        builder.kinds(),
        [EntityKind::InfNFe, EntityKind::IcmsTot, EntityKind::IssqnTot]
    );
    let icms_tot = &builder.entities()[1];
    assert_eq!(icms_tot.trigger, Trigger::EndOfDocument);
    assert_eq!(icms_tot.attributes.get("vBC"), Some("100.00"));
    assert_eq!(icms_tot.attributes.get("vICMSMono"), Some("0.50"));
    assert_eq!(builder.entities()[2].attributes.get("vBC"), Some("50.00"));
    assert_eq!(report.records, 5);
}

#[test]
fn unterminated_group_is_discarded() {
    let (result, builder) = convert(LayoutVersion::V400, &["A|4.00|NFe1||", "C|Acme|||||3|"]);
    result.unwrap();
    assert_eq!(builder.kinds(), [EntityKind::InfNFe]);
}

#[test]
fn reopening_replaces_the_pending_group() {
    let (result, builder) = convert(
        LayoutVersion::V400,
        &["A|4.00|NFe1||", "C|First|||||3|", "C|Second|||||3|", "C02|1|"],
    );
    result.unwrap();
    assert_eq!(builder.entities()[1].attributes.get("XNome"), Some("Second"));
}

#[test]
fn volumes_are_numbered_and_stamp_seals() {
    let (result, builder) = convert(
        LayoutVersion::V400,
        &["A|4.00|NFe1||", "X26|1|CX|", "X26|2|PALETE|", "X33|L-77|"],
    );
    result.unwrap();
    let volumes: Vec<_> = builder
        .entities()
        .iter()
        .map(|entity| (entity.kind, entity.attributes.get("volume")))
        .collect();
    assert_eq!(
        volumes,
        [
            (EntityKind::InfNFe, None),
            (EntityKind::Vol, Some("1")),
            (EntityKind::Vol, Some("2")),
            (EntityKind::Lacres, Some("2")),
        ]
    );
}

#[test]
fn assembler_exposes_pending_state() {
    let registry = registry(LayoutVersion::V400);
    let converter = Converter::new(&registry, ConversionOptions::default()).unwrap();
    let mut assembler = converter.assembler();
    assembler
        .process_line(&SourceLine::new(1, "A|4.00|NFe1||"))
        .unwrap();
    assembler.process_line(&SourceLine::new(2, "H|7||")).unwrap();
    assembler
        .process_line(&SourceLine::new(3, "LA|210203001|GLP|"))
        .unwrap();

    assert!(assembler.is_open(Slot::Comb));
    assert!(!assembler.is_open(Slot::PisSt));
    assert_eq!(assembler.counter(nfe_core::Counter::Item), Some("7"));
    assert_eq!(assembler.records(), 3);
    assert_eq!(assembler.emitted().len(), 1);

    let entities = assembler.finish().unwrap();
    assert_eq!(entities.len(), 2);
}
