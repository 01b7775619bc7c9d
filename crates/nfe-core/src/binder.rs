use nfe_model::{AttributeSet, RawRecord};
use nfe_schema::RecordLayout;

use crate::sanitize::sanitize;

/// Bind positional values to the names declared by `layout`.
///
/// Position `i` of the layout takes `fields[i]`; missing trailing values bind
/// as empty strings and values past the layout are ignored. Every bound value
/// is sanitized. Unnamed positions are skipped.
pub fn bind(record: &RawRecord, layout: &RecordLayout) -> AttributeSet {
    let mut attributes = AttributeSet::new();
    for (index, name) in layout.fields().iter().enumerate() {
        if name.is_empty() {
            continue;
        }
        let raw = record.value(index + 1).unwrap_or_default();
        attributes.insert(name.as_str(), sanitize(raw));
    }
    attributes
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(fields: &[&str]) -> RawRecord {
        RawRecord {
            fields: fields.iter().map(|field| field.to_string()).collect(),
            line_number: 1,
        }
    }

    #[test]
    fn pads_missing_trailing_values() {
        let layout = RecordLayout::parse("C|XNome|XFant|IE|IEST|").unwrap();
        let attributes = bind(&record(&["C", "Acme", "Loja"]), &layout);
        assert_eq!(attributes.len(), 4);
        assert_eq!(attributes.get("XFant"), Some("Loja"));
        assert_eq!(attributes.get("IE"), Some(""));
        assert_eq!(attributes.get("IEST"), Some(""));
    }

    #[test]
    fn ignores_values_beyond_layout() {
        let layout = RecordLayout::parse("C02|CNPJ|").unwrap();
        let attributes = bind(&record(&["C02", "12345678000195", "extra", ""]), &layout);
        assert_eq!(attributes.len(), 1);
        assert_eq!(attributes.get("CNPJ"), Some("12345678000195"));
    }

    #[test]
    fn sanitizes_and_skips_unnamed_positions() {
        let layout = RecordLayout::parse("UC03||vIBS|vCBS|").unwrap();
        let attributes = bind(&record(&["UC03", "ignored", " 1.50 ", "2,00"]), &layout);
        assert_eq!(attributes.names().collect::<Vec<_>>(), ["vIBS", "vCBS"]);
        assert_eq!(attributes.get("vIBS"), Some("1.50"));
    }
}
