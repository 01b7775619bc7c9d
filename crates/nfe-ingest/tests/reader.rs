use std::fs;

use nfe_ingest::{IngestError, IngestOptions, read_input};

#[test]
fn reads_latin1_file_with_two_documents() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("notas.txt");
    let mut bytes = b"NOTAFISCAL|2|\r\nA|4.00|NFe1|\r\nC|Padaria S".to_vec();
    bytes.push(0xe3);
    bytes.extend_from_slice(b"o Jos\xe9|\r\nA|4.00|NFe2|\r\n");
    fs::write(&path, bytes).unwrap();

    let documents = read_input(&path, &IngestOptions::default()).unwrap();
    assert_eq!(documents.len(), 2);
    assert_eq!(documents[0].lines[1].text, "C|Padaria São José|");
    assert_eq!(documents[0].lines[1].number, 3);
    assert_eq!(documents[1].index, 2);
}

#[test]
fn missing_file_reports_path() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("absent.txt");
    let err = read_input(&path, &IngestOptions::default()).unwrap_err();
    assert!(matches!(err, IngestError::Io { .. }));
    assert!(err.to_string().contains("absent.txt"));
}
