//! Conversion against the pinned layouts shipped with the workspace.

use nfe_core::{ConversionOptions, Converter, HandlerTable, RecordingBuilder, load_registry};
use nfe_ingest::{IngestOptions, parse_input};
use nfe_model::EntityKind;
use nfe_schema::{LayoutVersion, layouts_root};

const SAMPLE: &str = "\
NOTAFISCAL|1|
A|4.00|NFe35250112345678000195550010000000011000000019||
B|35|00000001|Venda de mercadoria|55|1|1|2025-01-10T10:00:00-03:00||1|1|3550308|1|1|9|2|1|1|1|0|0|nfe-txt 0.1||||||
C|Padaria São José Ltda|Padaria|123456789012||||3|
C02|12345678000195|
C05|Rua das Flores|100||Centro|3550308|Sao Paulo|SP|01001000|1058|Brasil|1133334444|
E|Cliente & Filhos|1|987654321098||||
E02|98765432000110|
E05|Av. Brasil|200||Jardins|3550308|Sao Paulo|SP|01402000|1058|Brasil||
H|1||
I|001|7891234567890|Café torrado 500g|09012100|||5102|UN|2.0000|15.0000000000|30.00|7891234567890|UN|2.0000|15.0000000000|||||1|||||||
M|3.50|
N|
N02|0|00|3|30.00|18.00|5.40|||
Q|
Q02|01|30.00|1.65|0.50|
S|
S02|01|30.00|7.60|2.28|
W|
W02|30.00|5.40|0.00|0.00|0.00|0.00|0.00|0.00|30.00|0.00|0.00|0.00|0.00|0.00|0.00|0.50|2.28|0.00|30.00|3.50||||
X|9|
Y|0.00|
YA01A|0|01||30.00||||
";

#[test]
fn every_layout_code_has_a_handler() {
    for version in LayoutVersion::ALL {
        let registry = load_registry(&layouts_root(), version).unwrap();
        let table = HandlerTable::for_registry(&registry).unwrap();
        assert_eq!(table.version(), version);
        assert!(registry.codes().all(|code| table.get(code).is_some()));
    }
}

#[test]
fn converts_sample_document() {
    let registry = load_registry(&layouts_root(), LayoutVersion::V400).unwrap();
    let converter = Converter::new(&registry, ConversionOptions::default()).unwrap();
    let documents = parse_input(SAMPLE.as_bytes(), &IngestOptions::default()).unwrap();
    assert_eq!(documents.len(), 1);

    let mut builder = RecordingBuilder::new();
    let report = converter.convert(&documents[0], &mut builder).unwrap();
    assert_eq!(report.records, 22);
    assert_eq!(
        builder.kinds(),
        [
            EntityKind::InfNFe,
            EntityKind::Ide,
            EntityKind::Emit,
            EntityKind::EnderEmit,
            EntityKind::Dest,
            EntityKind::EnderDest,
            EntityKind::Prod,
            EntityKind::Imposto,
            EntityKind::Icms,
            EntityKind::Pis,
            EntityKind::Cofins,
            EntityKind::Transp,
            EntityKind::Pag,
            EntityKind::DetPag,
            EntityKind::IcmsTot,
        ]
    );

    let emit = &builder.entities()[2];
    assert_eq!(emit.attributes.get("XNome"), Some("Padaria Sao Jose Ltda"));
    assert_eq!(emit.attributes.get("CNPJ"), Some("12345678000195"));
    let dest = &builder.entities()[4];
    assert_eq!(dest.attributes.get("xNome"), Some("Cliente e Filhos"));
    let prod = &builder.entities()[6];
    assert_eq!(prod.attributes.get("xProd"), Some("Cafe torrado 500g"));
    assert_eq!(prod.attributes.get("item"), Some("1"));
    assert_eq!(prod.attributes.get("NCM"), Some("09012100"));
    assert_eq!(prod.attributes.get("cBenef"), Some(""));
    assert_eq!(prod.attributes.get("CFOP"), Some("5102"));
    assert_eq!(prod.attributes.get("uCom"), Some("UN"));
    assert_eq!(prod.attributes.get("vProd"), Some("30.00"));
    assert_eq!(prod.attributes.get("indTot"), Some("1"));
}
