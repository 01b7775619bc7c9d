//! Choice groups selected by tax situation codes.

use nfe_model::{AttributeSet, EntityKind};

use crate::common::{Element, STAMPS};

/// ICMS group element for an ICMS-family entity, chosen from its `CST` or
/// `CSOSN`. `None` when the code has no group.
pub fn icms_group(kind: EntityKind, fields: &AttributeSet) -> Option<&'static str> {
    let cst = fields.get("CST").unwrap_or_default();
    match kind {
        EntityKind::Icms => match cst {
            "00" => Some("ICMS00"),
            "02" => Some("ICMS02"),
            "10" => Some("ICMS10"),
            "15" => Some("ICMS15"),
            "20" => Some("ICMS20"),
            "30" => Some("ICMS30"),
            "40" | "41" | "50" => Some("ICMS40"),
            "51" => Some("ICMS51"),
            "53" => Some("ICMS53"),
            "60" => Some("ICMS60"),
            "61" => Some("ICMS61"),
            "70" => Some("ICMS70"),
            "90" => Some("ICMS90"),
            _ => None,
        },
        EntityKind::IcmsPart => matches!(cst, "10" | "90").then_some("ICMSPart"),
        EntityKind::IcmsSt => matches!(cst, "41" | "60").then_some("ICMSST"),
        EntityKind::IcmsSn => match fields.get("CSOSN").unwrap_or_default() {
            "101" => Some("ICMSSN101"),
            "102" | "103" | "300" | "400" => Some("ICMSSN102"),
            "201" => Some("ICMSSN201"),
            "202" | "203" => Some("ICMSSN202"),
            "500" => Some("ICMSSN500"),
            "900" => Some("ICMSSN900"),
            _ => None,
        },
        _ => None,
    }
}

pub fn is_icms(kind: EntityKind) -> bool {
    matches!(
        kind,
        EntityKind::Icms | EntityKind::IcmsPart | EntityKind::IcmsSt | EntityKind::IcmsSn
    )
}

/// `ICMS` wrapper holding the selected group.
pub fn icms_element(kind: EntityKind, fields: &AttributeSet) -> Option<Element> {
    let group = icms_group(kind, fields)?;
    let mut icms = Element::new("ICMS");
    icms.push(Element::group(group, fields, STAMPS));
    Some(icms)
}

const IPI_TRIB: &[&str] = &["vBC", "pIPI", "qUnid", "vUnid", "vIPI"];

/// `IPI` with `IPITrib` for taxed CSTs (00, 49, 50, 99) and `IPINT` otherwise.
pub fn ipi_element(fields: &AttributeSet) -> Element {
    let cst = fields.get("CST").unwrap_or_default();
    let mut outer_skip = vec!["CST", "clEnq"];
    outer_skip.extend_from_slice(IPI_TRIB);
    outer_skip.extend_from_slice(STAMPS);
    let mut ipi = Element::group("IPI", fields, &outer_skip);

    let taxed = matches!(cst, "00" | "49" | "50" | "99");
    let mut inner = Element::new(if taxed { "IPITrib" } else { "IPINT" });
    if !cst.is_empty() {
        inner.push(Element::leaf("CST", cst));
    }
    if taxed {
        for name in IPI_TRIB {
            if let Some(value) = fields.non_empty(name) {
                inner.push(Element::leaf(*name, value));
            }
        }
    }
    ipi.push(inner);
    ipi
}

/// `PIS` or `COFINS` with the inner group picked from the CST.
pub fn contribution_element(tag: &str, fields: &AttributeSet) -> Element {
    let cst = fields.get("CST").unwrap_or_default();
    let suffix = match cst {
        "01" | "02" => "Aliq",
        "03" => "Qtde",
        "04" | "05" | "06" | "07" | "08" | "09" => "NT",
        _ => "Outr",
    };
    let mut outer = Element::new(tag);
    outer.push(Element::group(format!("{tag}{suffix}"), fields, STAMPS));
    outer
}
