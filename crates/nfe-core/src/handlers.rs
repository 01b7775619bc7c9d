//! Closed dispatch table binding every record-type code to one behavior.
//!
//! The table is the grammar of the assembler: each code is permanently bound
//! to exactly one [`Handler`]. Version differences are expressed as override
//! rows applied on top of the base table, and groups without a closing record
//! are ended by the [`BOUNDARY_RULES`].

use std::collections::HashMap;
use std::sync::OnceLock;

use nfe_model::{EntityKind, RecordCode};
use nfe_schema::{LayoutVersion, SchemaRegistry};

use crate::error::{ConvertError, Result};

/// Ambient context values stamped onto later records.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Counter {
    /// Current item number, set by `H`.
    Item,
    /// Current import declaration number, set by `I18`.
    ImportDeclaration,
    /// Current transported volume, incremented by `X26`.
    Volume,
}

impl Counter {
    /// Attribute name the counter is stamped under.
    pub fn attribute(self) -> &'static str {
        match self {
            Counter::Item => "item",
            Counter::ImportDeclaration => "nDI",
            Counter::Volume => "volume",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CounterUpdate {
    /// Take the value of the named attribute; a blank value unsets the counter.
    FromAttribute(&'static str),
    /// Add one to the current value, starting from 1.
    Increment,
}

/// Pending storage for an entity assembled from several records.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Slot {
    RefNfp,
    Emit,
    Dest,
    Retirada,
    Entrega,
    AutXml,
    Comb,
    Ipi,
    Pis,
    PisSt,
    Cofins,
    CofinsSt,
    Transporta,
    IcmsTot,
    IssqnTot,
    RetTrib,
    IsTot,
    IbsCbsTot,
    GIbs,
    GIbsUf,
    GIbsMun,
    GCbs,
    GMono,
    NfTot,
}

impl Slot {
    pub fn kind(self) -> EntityKind {
        match self {
            Slot::RefNfp => EntityKind::RefNFP,
            Slot::Emit => EntityKind::Emit,
            Slot::Dest => EntityKind::Dest,
            Slot::Retirada => EntityKind::Retirada,
            Slot::Entrega => EntityKind::Entrega,
            Slot::AutXml => EntityKind::AutXml,
            Slot::Comb => EntityKind::Comb,
            Slot::Ipi => EntityKind::Ipi,
            Slot::Pis => EntityKind::Pis,
            Slot::PisSt => EntityKind::PisSt,
            Slot::Cofins => EntityKind::Cofins,
            Slot::CofinsSt => EntityKind::CofinsSt,
            Slot::Transporta => EntityKind::Transporta,
            Slot::IcmsTot => EntityKind::IcmsTot,
            Slot::IssqnTot => EntityKind::IssqnTot,
            Slot::RetTrib => EntityKind::RetTrib,
            Slot::IsTot => EntityKind::IsTot,
            Slot::IbsCbsTot => EntityKind::IbsCbsTot,
            Slot::GIbs => EntityKind::GIbsTot,
            Slot::GIbsUf => EntityKind::GIbsUfTot,
            Slot::GIbsMun => EntityKind::GIbsMunTot,
            Slot::GCbs => EntityKind::GCbsTot,
            Slot::GMono => EntityKind::GMonoTot,
            Slot::NfTot => EntityKind::NfTot,
        }
    }

    pub fn name(self) -> &'static str {
        self.kind().tag()
    }

    /// Counters stamped onto the entity when the slot is emitted.
    pub fn stamps(self) -> &'static [Counter] {
        match self {
            Slot::Comb | Slot::Ipi | Slot::Pis | Slot::PisSt | Slot::Cofins | Slot::CofinsSt => {
                ITEM
            }
            _ => NONE,
        }
    }
}

/// Emission performed by a context setter after updating its counter.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Emission {
    pub kind: EntityKind,
    pub stamps: &'static [Counter],
    /// Emit only when this attribute is present and not blank.
    pub required: Option<&'static str>,
}

/// Behavior bound to a record-type code.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Handler {
    /// Stamp counters and emit the record as a complete entity.
    Emit {
        kind: EntityKind,
        stamps: &'static [Counter],
    },
    /// Update a counter from the record, then optionally emit it.
    SetContext {
        counter: Counter,
        update: CounterUpdate,
        emit: Option<Emission>,
    },
    /// Open `slot` with the record, inserting blanks for `prefill` names the
    /// record did not bind.
    Open {
        slot: Slot,
        prefill: &'static [&'static str],
    },
    /// Merge into an open slot without emitting; `only` restricts the names
    /// merged.
    Continue {
        slot: Slot,
        only: Option<&'static [&'static str]>,
    },
    /// Merge into an open slot, emit it and clear it.
    Close { slot: Slot },
    /// Merge into a document-wide slot emitted by the finalizer.
    Accumulate { slot: Slot },
    /// Group marker without data.
    Marker,
}

impl Handler {
    pub fn behavior(&self) -> &'static str {
        match self {
            Handler::Emit { .. } => "direct-emit",
            Handler::SetContext { .. } => "context-setter",
            Handler::Open { .. } => "slot-opener",
            Handler::Continue { .. } => "continuer",
            Handler::Close { .. } => "terminal-continuer",
            Handler::Accumulate { .. } => "cumulative-merge",
            Handler::Marker => "marker",
        }
    }
}

/// `code`, when seen while `flushes` is open, emits `flushes` first.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BoundaryRule {
    pub code: &'static str,
    pub flushes: Slot,
}

/// Groups without a dedicated closing record.
///
/// `comb` ends at the mandatory `M` of its item. `PISST` may end with the
/// optional `R05`; otherwise the next tax group or item ends it.
pub const BOUNDARY_RULES: &[BoundaryRule] = &[
    BoundaryRule {
        code: "M",
        flushes: Slot::Comb,
    },
    BoundaryRule {
        code: "S",
        flushes: Slot::PisSt,
    },
    BoundaryRule {
        code: "T",
        flushes: Slot::PisSt,
    },
    BoundaryRule {
        code: "U",
        flushes: Slot::PisSt,
    },
    BoundaryRule {
        code: "UA",
        flushes: Slot::PisSt,
    },
    BoundaryRule {
        code: "UB",
        flushes: Slot::PisSt,
    },
    BoundaryRule {
        code: "UC",
        flushes: Slot::PisSt,
    },
    BoundaryRule {
        code: "H",
        flushes: Slot::PisSt,
    },
    BoundaryRule {
        code: "W",
        flushes: Slot::PisSt,
    },
];

const NONE: &[Counter] = &[];
const ITEM: &[Counter] = &[Counter::Item];
const ITEM_DI: &[Counter] = &[Counter::Item, Counter::ImportDeclaration];
const VOLUME: &[Counter] = &[Counter::Volume];

const DOC_IDS: &[&str] = &["CNPJ", "CPF"];

const fn emit(kind: EntityKind) -> Handler {
    Handler::Emit { kind, stamps: NONE }
}

const fn item(kind: EntityKind) -> Handler {
    Handler::Emit { kind, stamps: ITEM }
}

const fn open(slot: Slot, prefill: &'static [&'static str]) -> Handler {
    Handler::Open { slot, prefill }
}

const fn merge(slot: Slot) -> Handler {
    Handler::Continue { slot, only: None }
}

const fn close(slot: Slot) -> Handler {
    Handler::Close { slot }
}

const fn total(slot: Slot) -> Handler {
    Handler::Accumulate { slot }
}

#[rustfmt::skip]
const BASE: &[(&str, Handler)] = &[
    // identification and references
    ("A", emit(EntityKind::InfNFe)),
    ("B", emit(EntityKind::Ide)),
    ("BA", Handler::Marker),
    ("BA02", emit(EntityKind::RefNFe)),
    ("BA02A", emit(EntityKind::RefNFeSig)),
    ("BA03", emit(EntityKind::RefNF)),
    ("BA10", open(Slot::RefNfp, DOC_IDS)),
    ("BA13", close(Slot::RefNfp)),
    ("BA14", close(Slot::RefNfp)),
    ("BA19", emit(EntityKind::RefCTe)),
    ("BA20", emit(EntityKind::RefECF)),
    ("BB", emit(EntityKind::CompraGov)),
    ("BC", Handler::Marker),
    ("BC01", emit(EntityKind::PagAntecipado)),
    ("BD", emit(EntityKind::Avulsa)),
    // parties
    ("C", open(Slot::Emit, DOC_IDS)),
    ("C02", close(Slot::Emit)),
    ("C02A", close(Slot::Emit)),
    ("C05", emit(EntityKind::EnderEmit)),
    ("E", open(Slot::Dest, &["CNPJ", "CPF", "idEstrangeiro"])),
    ("E02", close(Slot::Dest)),
    ("E03", close(Slot::Dest)),
    ("E03A", close(Slot::Dest)),
    ("E05", emit(EntityKind::EnderDest)),
    ("F", open(Slot::Retirada, DOC_IDS)),
    ("F02", close(Slot::Retirada)),
    ("F02A", close(Slot::Retirada)),
    ("G", open(Slot::Entrega, DOC_IDS)),
    ("G02", close(Slot::Entrega)),
    ("G02A", close(Slot::Entrega)),
    ("GA", open(Slot::AutXml, DOC_IDS)),
    ("GA02", close(Slot::AutXml)),
    ("GA03", close(Slot::AutXml)),
    // items
    ("H", Handler::SetContext {
        counter: Counter::Item,
        update: CounterUpdate::FromAttribute("item"),
        emit: Some(Emission {
            kind: EntityKind::InfAdProd,
            stamps: ITEM,
            required: Some("infAdProd"),
        }),
    }),
    ("I", item(EntityKind::Prod)),
    ("I05A", item(EntityKind::Nve)),
    ("I05C", item(EntityKind::Cest)),
    ("I05D", Handler::Marker),
    ("I05E", Handler::Marker),
    ("I06A", item(EntityKind::GCred)),
    ("I18", Handler::SetContext {
        counter: Counter::ImportDeclaration,
        update: CounterUpdate::FromAttribute("nDI"),
        emit: Some(Emission { kind: EntityKind::Di, stamps: ITEM, required: None }),
    }),
    ("I25", Handler::Emit { kind: EntityKind::Adi, stamps: ITEM_DI }),
    ("I50", item(EntityKind::DetExport)),
    ("I52", item(EntityKind::ExportInd)),
    ("I80", item(EntityKind::Rastro)),
    ("I81", item(EntityKind::InfProdNff)),
    ("I82", item(EntityKind::InfProdEmb)),
    ("JA", item(EntityKind::VeicProd)),
    ("K", item(EntityKind::Med)),
    ("L", item(EntityKind::Arma)),
    ("LA", open(Slot::Comb, &[])),
    ("LA07", merge(Slot::Comb)),
    ("LA11", item(EntityKind::Encerrante)),
    ("LA18", item(EntityKind::OrigComb)),
    ("LB", item(EntityKind::Recopi)),
    // item taxes
    ("M", item(EntityKind::Imposto)),
    ("N", Handler::Marker),
    ("N02", item(EntityKind::Icms)),
    ("N02A", item(EntityKind::Icms)),
    ("N03", item(EntityKind::Icms)),
    ("N03A", item(EntityKind::Icms)),
    ("N04", item(EntityKind::Icms)),
    ("N05", item(EntityKind::Icms)),
    ("N06", item(EntityKind::Icms)),
    ("N07", item(EntityKind::Icms)),
    ("N07A", item(EntityKind::Icms)),
    ("N08", item(EntityKind::Icms)),
    ("N08A", item(EntityKind::Icms)),
    ("N09", item(EntityKind::Icms)),
    ("N10", item(EntityKind::Icms)),
    ("N10A", item(EntityKind::IcmsPart)),
    ("N10B", item(EntityKind::IcmsSt)),
    ("N10C", item(EntityKind::IcmsSn)),
    ("N10D", item(EntityKind::IcmsSn)),
    ("N10E", item(EntityKind::IcmsSn)),
    ("N10F", item(EntityKind::IcmsSn)),
    ("N10G", item(EntityKind::IcmsSn)),
    ("N10H", item(EntityKind::IcmsSn)),
    ("NA", item(EntityKind::IcmsUfDest)),
    ("O", open(Slot::Ipi, &["CST", "vIPI", "vBC", "pIPI", "qUnid", "vUnid"])),
    ("O07", merge(Slot::Ipi)),
    ("O08", close(Slot::Ipi)),
    ("O10", close(Slot::Ipi)),
    ("O11", close(Slot::Ipi)),
    ("P", item(EntityKind::Ii)),
    ("Q", open(Slot::Pis, &["vBC", "pPIS", "vPIS", "qBCProd", "vAliqProd"])),
    ("Q02", close(Slot::Pis)),
    ("Q03", close(Slot::Pis)),
    ("Q04", close(Slot::Pis)),
    ("Q05", merge(Slot::Pis)),
    ("Q07", close(Slot::Pis)),
    ("Q10", close(Slot::Pis)),
    ("R", open(Slot::PisSt, &["vBC", "pPIS", "vPIS", "qBCProd", "vAliqProd", "indSomaPISST"])),
    ("R02", merge(Slot::PisSt)),
    ("R04", merge(Slot::PisSt)),
    ("R05", close(Slot::PisSt)),
    ("S", open(Slot::Cofins, &["vBC", "pCOFINS", "vCOFINS", "qBCProd", "vAliqProd"])),
    ("S02", close(Slot::Cofins)),
    ("S03", close(Slot::Cofins)),
    ("S04", close(Slot::Cofins)),
    ("S05", merge(Slot::Cofins)),
    ("S07", close(Slot::Cofins)),
    ("S09", close(Slot::Cofins)),
    ("T", open(Slot::CofinsSt, &["vBC", "pCOFINS", "qBCProd", "vAliqProd"])),
    ("T02", close(Slot::CofinsSt)),
    ("T04", close(Slot::CofinsSt)),
    ("U", item(EntityKind::Issqn)),
    ("UA", item(EntityKind::ImpostoDevol)),
    ("UB", item(EntityKind::Is)),
    ("UC", item(EntityKind::IbsCbs)),
    ("UC01", item(EntityKind::GIbsCbs)),
    ("UC01A", item(EntityKind::GIbsUf)),
    ("UC01B", item(EntityKind::GIbsMun)),
    ("UC01C", item(EntityKind::GCbs)),
    ("UC01D", item(EntityKind::GTribRegular)),
    ("UC01E", item(EntityKind::GIbsCredPres)),
    ("UC01F", item(EntityKind::GCbsCredPres)),
    ("UC01G", item(EntityKind::GTribCompraGov)),
    ("UC02", item(EntityKind::GIbsCbsMono)),
    ("UC02A", item(EntityKind::GMonoPadrao)),
    ("UC02B", item(EntityKind::GMonoReten)),
    ("UC02C", item(EntityKind::GMonoRet)),
    ("UC02D", item(EntityKind::GMonoDif)),
    ("UC03", item(EntityKind::GTransfCred)),
    ("UC04", item(EntityKind::GCredPresIbsZfm)),
    // totals
    ("W", Handler::Marker),
    ("W02", total(Slot::IcmsTot)),
    ("W04C", Handler::Marker),
    ("W04E", Handler::Marker),
    ("W04G", Handler::Marker),
    ("W04H", Handler::Marker),
    ("W06A", Handler::Marker),
    ("W06B", Handler::Marker),
    ("W06C", total(Slot::IcmsTot)),
    ("W17", total(Slot::IssqnTot)),
    ("W23", total(Slot::RetTrib)),
    ("W24", total(Slot::IsTot)),
    ("W25", total(Slot::IbsCbsTot)),
    ("W25A", total(Slot::GIbs)),
    ("W25A1", total(Slot::GIbsUf)),
    ("W25A2", total(Slot::GIbsMun)),
    ("W25B", total(Slot::GCbs)),
    ("W25C", total(Slot::GMono)),
    ("W26", total(Slot::NfTot)),
    // transport
    ("X", emit(EntityKind::Transp)),
    ("X03", open(Slot::Transporta, DOC_IDS)),
    ("X04", close(Slot::Transporta)),
    ("X05", close(Slot::Transporta)),
    ("X11", emit(EntityKind::RetTransp)),
    ("X18", emit(EntityKind::VeicTransp)),
    ("X22", emit(EntityKind::Reboque)),
    ("X25A", emit(EntityKind::Vagao)),
    ("X25B", emit(EntityKind::Balsa)),
    ("X26", Handler::SetContext {
        counter: Counter::Volume,
        update: CounterUpdate::Increment,
        emit: Some(Emission { kind: EntityKind::Vol, stamps: VOLUME, required: None }),
    }),
    ("X33", Handler::Emit { kind: EntityKind::Lacres, stamps: VOLUME }),
    // payment and billing
    ("Y", emit(EntityKind::Pag)),
    ("YA", Handler::Marker),
    ("YA01A", emit(EntityKind::DetPag)),
    ("YA04", emit(EntityKind::Card)),
    ("Y02", emit(EntityKind::Fat)),
    ("Y07", emit(EntityKind::Dup)),
    ("YB", emit(EntityKind::InfIntermed)),
    // additional information
    ("Z", emit(EntityKind::InfAdic)),
    ("Z04", emit(EntityKind::ObsCont)),
    ("Z07", emit(EntityKind::ObsFisco)),
    ("Z10", emit(EntityKind::ProcRef)),
    ("ZA", emit(EntityKind::Exporta)),
    ("ZB", emit(EntityKind::Compra)),
    ("ZC", emit(EntityKind::Cana)),
    ("ZC04", emit(EntityKind::ForDia)),
    ("ZC10", emit(EntityKind::Deduc)),
    ("ZD", emit(EntityKind::InfRespTec)),
    ("ZX01", emit(EntityKind::InfNFeSupl)),
    ("ZPDF", Handler::Marker),
    ("ZPDF_END", Handler::Marker),
    ("Z_USER", Handler::Marker),
];

/// Layout 3.10: `vPIS` of `Q05` was carried by `Q07`, and there is no `R05`.
#[rustfmt::skip]
const V310_OVERRIDES: &[(&str, Handler)] = &[
    ("Q05", Handler::Continue { slot: Slot::Pis, only: Some(&["CST"]) }),
    ("R02", close(Slot::PisSt)),
    ("R04", close(Slot::PisSt)),
    // 3.10 has no YA01A: YA carries the payment detail with its card fields.
    ("YA", emit(EntityKind::DetPag)),
];

fn overrides(version: LayoutVersion) -> &'static [(&'static str, Handler)] {
    match version {
        LayoutVersion::V310 => V310_OVERRIDES,
        LayoutVersion::V400 => &[],
    }
}

/// Handlers and boundary rules for one layout version.
#[derive(Debug)]
pub struct HandlerTable {
    version: LayoutVersion,
    handlers: HashMap<RecordCode, Handler>,
    boundaries: HashMap<RecordCode, Vec<Slot>>,
}

impl HandlerTable {
    pub fn for_version(version: LayoutVersion) -> Self {
        let mut handlers: HashMap<RecordCode, Handler> = BASE
            .iter()
            .map(|(code, handler)| (RecordCode::normalize(code), *handler))
            .collect();
        for (code, handler) in overrides(version) {
            handlers.insert(RecordCode::normalize(code), *handler);
        }

        let mut boundaries: HashMap<RecordCode, Vec<Slot>> = HashMap::new();
        for rule in BOUNDARY_RULES {
            boundaries
                .entry(RecordCode::normalize(rule.code))
                .or_default()
                .push(rule.flushes);
        }

        Self {
            version,
            handlers,
            boundaries,
        }
    }

    /// Cached table for the registry's version, checked against every code
    /// the registry declares.
    pub fn for_registry(registry: &SchemaRegistry) -> Result<&'static HandlerTable> {
        let table = default_table(registry.version());
        let mut unmapped: Vec<String> = registry
            .codes()
            .filter(|code| !table.handlers.contains_key(*code))
            .map(ToString::to_string)
            .collect();
        if !unmapped.is_empty() {
            unmapped.sort();
            return Err(ConvertError::UnmappedLayout {
                version: registry.version().to_string(),
                codes: unmapped,
            });
        }
        Ok(table)
    }

    pub fn version(&self) -> LayoutVersion {
        self.version
    }

    pub fn get(&self, code: &RecordCode) -> Option<&Handler> {
        self.handlers.get(code)
    }

    /// Slots flushed when `code` arrives, before its own handler runs.
    pub fn boundaries(&self, code: &RecordCode) -> &[Slot] {
        self.boundaries.get(code).map(Vec::as_slice).unwrap_or_default()
    }

    pub fn codes(&self) -> impl Iterator<Item = &RecordCode> {
        self.handlers.keys()
    }

    pub fn len(&self) -> usize {
        self.handlers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.handlers.is_empty()
    }
}

static V310_TABLE: OnceLock<HandlerTable> = OnceLock::new();
static V400_TABLE: OnceLock<HandlerTable> = OnceLock::new();

/// Returns the handler table for `version`, built on first access.
pub fn default_table(version: LayoutVersion) -> &'static HandlerTable {
    match version {
        LayoutVersion::V310 => V310_TABLE.get_or_init(|| HandlerTable::for_version(version)),
        LayoutVersion::V400 => V400_TABLE.get_or_init(|| HandlerTable::for_version(version)),
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashSet;

    use super::*;

    #[test]
    fn base_table_has_no_duplicate_codes() {
        let mut seen = HashSet::new();
        for (code, _) in BASE {
            assert!(seen.insert(*code), "{code} bound twice");
        }
    }

    #[test]
    fn overrides_replace_base_rows() {
        let v310 = default_table(LayoutVersion::V310);
        let v400 = default_table(LayoutVersion::V400);
        let q05 = RecordCode::normalize("Q05");
        assert_eq!(
            v400.get(&q05),
            Some(&Handler::Continue {
                slot: Slot::Pis,
                only: None
            })
        );
        assert_eq!(
            v310.get(&q05),
            Some(&Handler::Continue {
                slot: Slot::Pis,
                only: Some(&["CST"])
            })
        );
        let r02 = RecordCode::normalize("R02");
        assert_eq!(v310.get(&r02), Some(&Handler::Close { slot: Slot::PisSt }));
        assert_eq!(v400.get(&r02).map(Handler::behavior), Some("continuer"));
        let ya = RecordCode::normalize("YA");
        assert_eq!(v310.get(&ya), Some(&emit(EntityKind::DetPag)));
        assert_eq!(v400.get(&ya), Some(&Handler::Marker));
        assert_eq!(v310.len(), v400.len());
    }

    #[test]
    fn boundary_rules_resolve_by_code() {
        let table = default_table(LayoutVersion::V400);
        assert_eq!(table.boundaries(&RecordCode::normalize("m")), [Slot::Comb]);
        assert_eq!(table.boundaries(&RecordCode::normalize("S")), [Slot::PisSt]);
        assert!(table.boundaries(&RecordCode::normalize("I")).is_empty());
    }

    #[test]
    fn boundary_slots_are_opened_by_some_code() {
        let table = default_table(LayoutVersion::V400);
        for rule in BOUNDARY_RULES {
            assert!(
                table
                    .codes()
                    .filter_map(|code| table.get(code))
                    .any(|handler| {
                        matches!(handler, Handler::Open { slot, .. } if *slot == rule.flushes)
                    }),
                "{:?} is never opened",
                rule.flushes
            );
        }
    }

    #[test]
    fn every_slot_reports_its_entity_kind() {
        assert_eq!(Slot::PisSt.name(), "PISST");
        assert_eq!(Slot::GIbsUf.kind(), EntityKind::GIbsUfTot);
        assert_eq!(Slot::Comb.stamps(), [Counter::Item]);
        assert!(Slot::IcmsTot.stamps().is_empty());
    }

    #[test]
    fn unmapped_layout_codes_are_rejected() {
        let registry =
            SchemaRegistry::from_layouts(LayoutVersion::V400, ["A|versao|", "QQ9|x|", "C02|CNPJ|"])
                .unwrap();
        let err = HandlerTable::for_registry(&registry).unwrap_err();
        assert!(matches!(
            err,
            ConvertError::UnmappedLayout { ref codes, .. } if codes == &["QQ9".to_string()]
        ));
    }
}
