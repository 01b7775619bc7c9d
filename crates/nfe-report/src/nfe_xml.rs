//! NF-e XML document builder.

use std::collections::{BTreeMap, HashSet};
use std::fs::{self, File};
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use nfe_core::{BuilderError, DocumentBuilder};
use nfe_model::{AttributeSet, CompletedEntity, EntityKind};
use quick_xml::Writer;
use quick_xml::events::{BytesDecl, Event};
use tracing::debug;

use crate::common::{Element, NFE_NS, STAMPS, ensure_output_dir};
use crate::groups::{contribution_element, icms_element, icms_group, ipi_element, is_icms};

/// Options for XML output.
#[derive(Debug, Clone)]
pub struct XmlOptions {
    /// Spaces per nesting level; 0 writes everything on one line.
    pub indent: usize,
    pub declaration: bool,
}

impl Default for XmlOptions {
    fn default() -> Self {
        Self {
            indent: 2,
            declaration: true,
        }
    }
}

impl XmlOptions {
    pub fn with_indent(mut self, indent: usize) -> Self {
        self.indent = indent;
        self
    }

    pub fn with_declaration(mut self, declaration: bool) -> Self {
        self.declaration = declaration;
        self
    }
}

const DOCUMENT_IDS: &[&str] = &["CNPJ", "CPF", "idEstrangeiro"];
const ADI_SKIP: &[&str] = &["item", "volume", "nDI"];

/// Card fields a 3.10 `detPag` carries inline.
const CARD_FIELDS: &[&str] = &["tpIntegra", "CNPJ", "tBand", "cAut"];
const DET_PAG_SKIP: &[&str] = &["item", "volume", "tpIntegra", "CNPJ", "tBand", "cAut"];

/// Child order of `prod`. Layout field order differs from it for `cBarra`,
/// `cBarraTrib` and the item detail records.
const PROD_ORDER: &[&str] = &[
    "cProd",
    "cEAN",
    "cBarra",
    "xProd",
    "NCM",
    "NVE",
    "CEST",
    "indEscala",
    "CNPJFab",
    "cBenef",
    "gCred",
    "EXTIPI",
    "CFOP",
    "uCom",
    "qCom",
    "vUnCom",
    "vProd",
    "cEANTrib",
    "cBarraTrib",
    "uTrib",
    "qTrib",
    "vUnTrib",
    "vFrete",
    "vSeg",
    "vDesc",
    "vOutro",
    "indTot",
    "indBemMovelUsado",
    "DI",
    "detExport",
    "xPed",
    "nItemPed",
    "nFCI",
    "rastro",
    "infProdNFF",
    "infProdEmb",
    "veicProd",
    "med",
    "arma",
    "comb",
    "nRECOPI",
];

/// Reference kinds wrapped in `NFref` inside `ide`.
const REFERENCES: &[EntityKind] = &[
    EntityKind::RefNFe,
    EntityKind::RefNFeSig,
    EntityKind::RefNF,
    EntityKind::RefNFP,
    EntityKind::RefCTe,
    EntityKind::RefECF,
];

/// Entities placed under `det`, keyed by their `item` stamp.
fn is_item_kind(kind: EntityKind) -> bool {
    use EntityKind as K;
    matches!(
        kind,
        K::InfAdProd
            | K::Prod
            | K::Nve
            | K::Cest
            | K::GCred
            | K::Di
            | K::Adi
            | K::DetExport
            | K::ExportInd
            | K::Rastro
            | K::InfProdNff
            | K::InfProdEmb
            | K::VeicProd
            | K::Med
            | K::Arma
            | K::Comb
            | K::Encerrante
            | K::OrigComb
            | K::Recopi
            | K::Imposto
            | K::Icms
            | K::IcmsPart
            | K::IcmsSt
            | K::IcmsSn
            | K::IcmsUfDest
            | K::Ipi
            | K::Ii
            | K::Pis
            | K::PisSt
            | K::Cofins
            | K::CofinsSt
            | K::Issqn
            | K::ImpostoDevol
            | K::Is
            | K::IbsCbs
            | K::GIbsCbs
            | K::GIbsUf
            | K::GIbsMun
            | K::GCbs
            | K::GTribRegular
            | K::GIbsCredPres
            | K::GCbsCredPres
            | K::GTribCompraGov
            | K::GIbsCbsMono
            | K::GMonoPadrao
            | K::GMonoReten
            | K::GMonoRet
            | K::GMonoDif
            | K::GTransfCred
            | K::GCredPresIbsZfm
    )
}

/// Key under which a kind may appear at most once (per item for item kinds).
fn singleton_key(kind: EntityKind) -> Option<EntityKind> {
    use EntityKind as K;
    match kind {
        K::Icms | K::IcmsPart | K::IcmsSt | K::IcmsSn => Some(K::Icms),
        K::InfNFe
        | K::Ide
        | K::CompraGov
        | K::Avulsa
        | K::Emit
        | K::EnderEmit
        | K::Dest
        | K::EnderDest
        | K::Retirada
        | K::Entrega
        | K::Prod
        | K::Imposto
        | K::InfAdProd
        | K::Comb
        | K::Ipi
        | K::Ii
        | K::Pis
        | K::PisSt
        | K::Cofins
        | K::CofinsSt
        | K::Issqn
        | K::IcmsUfDest
        | K::ImpostoDevol
        | K::Is
        | K::IbsCbs
        | K::IcmsTot
        | K::IssqnTot
        | K::RetTrib
        | K::IsTot
        | K::IbsCbsTot
        | K::GIbsTot
        | K::GIbsUfTot
        | K::GIbsMunTot
        | K::GCbsTot
        | K::GMonoTot
        | K::NfTot
        | K::Transp
        | K::Transporta
        | K::RetTransp
        | K::VeicTransp
        | K::Vagao
        | K::Balsa
        | K::Pag
        | K::Fat
        | K::InfIntermed
        | K::InfAdic
        | K::Exporta
        | K::Compra
        | K::Cana
        | K::InfRespTec
        | K::InfNFeSupl => Some(kind),
        _ => None,
    }
}

fn stamp_number(entity: &CompletedEntity, stamp: &str) -> std::result::Result<usize, BuilderError> {
    let raw = entity.attributes.get(stamp).unwrap_or_default();
    raw.parse::<usize>()
        .ok()
        .filter(|number| *number > 0)
        .ok_or_else(|| {
            BuilderError::new(format!(
                "{} has {stamp} {raw:?}, expected a positive integer",
                entity.kind
            ))
        })
}

/// Collects the entities of one document and renders them as an NF-e tree.
///
/// Validation happens as entities arrive; the tree is only built on
/// [`to_element`](Self::to_element), since some groups (`comb`, totals)
/// complete after their children.
#[derive(Debug, Clone)]
pub struct XmlDocumentBuilder {
    document_index: usize,
    options: XmlOptions,
    entities: Vec<CompletedEntity>,
    seen: HashSet<(usize, EntityKind)>,
    volumes: usize,
}

impl XmlDocumentBuilder {
    pub fn new(document_index: usize, options: XmlOptions) -> Self {
        Self {
            document_index,
            options,
            entities: Vec::new(),
            seen: HashSet::new(),
            volumes: 0,
        }
    }

    pub fn document_index(&self) -> usize {
        self.document_index
    }

    /// Accepted entities in emission order.
    pub fn entities(&self) -> &[CompletedEntity] {
        &self.entities
    }

    fn document_level(&self, kind: EntityKind) -> impl Iterator<Item = &AttributeSet> {
        self.entities
            .iter()
            .filter(move |entity| entity.kind == kind)
            .map(|entity| &entity.attributes)
    }

    fn single(&self, kind: EntityKind) -> Option<&AttributeSet> {
        self.document_level(kind).next()
    }

    fn push_group(&self, parent: &mut Element, kind: EntityKind) {
        for fields in self.document_level(kind) {
            parent.push(Element::group(kind.tag(), fields, STAMPS));
        }
    }

    /// Build the `NFe` element tree.
    pub fn to_element(&self) -> std::result::Result<Element, BuilderError> {
        let header = self
            .single(EntityKind::InfNFe)
            .ok_or_else(|| BuilderError::new("document has no infNFe"))?;

        let mut inf = Element::new("infNFe")
            .with_attribute("versao", header.get("versao").unwrap_or_default())
            .with_attribute("Id", header.get("Id").unwrap_or_default());

        inf.push(self.ide());
        if let Some(fields) = self.single(EntityKind::Emit) {
            inf.push(self.party("emit", fields, EntityKind::EnderEmit, &["xFant", "xNome"]));
        }
        self.push_group(&mut inf, EntityKind::Avulsa);
        if let Some(fields) = self.single(EntityKind::Dest) {
            inf.push(self.party("dest", fields, EntityKind::EnderDest, &["xNome"]));
        }
        for kind in [EntityKind::Retirada, EntityKind::Entrega, EntityKind::AutXml] {
            for fields in self.document_level(kind) {
                let mut element = Element::group(kind.tag(), fields, STAMPS);
                element.move_to_front(DOCUMENT_IDS);
                inf.push(element);
            }
        }
        for (item, entities) in self.items() {
            inf.push(det(item, &entities));
        }
        if let Some(total) = self.total() {
            inf.push(total);
        }
        if let Some(transp) = self.transp() {
            inf.push(transp);
        }
        if let Some(cobr) = self.cobr() {
            inf.push(cobr);
        }
        if let Some(pag) = self.pag() {
            inf.push(pag);
        }
        self.push_group(&mut inf, EntityKind::InfIntermed);
        if let Some(fields) = self.single(EntityKind::InfAdic) {
            let mut element = Element::group("infAdic", fields, STAMPS);
            self.push_group(&mut element, EntityKind::ObsCont);
            self.push_group(&mut element, EntityKind::ObsFisco);
            self.push_group(&mut element, EntityKind::ProcRef);
            inf.push(element);
        }
        self.push_group(&mut inf, EntityKind::Exporta);
        self.push_group(&mut inf, EntityKind::Compra);
        if let Some(fields) = self.single(EntityKind::Cana) {
            let mut element = Element::group("cana", fields, STAMPS);
            self.push_group(&mut element, EntityKind::ForDia);
            self.push_group(&mut element, EntityKind::Deduc);
            inf.push(element);
        }
        self.push_group(&mut inf, EntityKind::InfRespTec);

        let mut nfe = Element::new("NFe").with_attribute("xmlns", NFE_NS);
        nfe.push(inf);
        self.push_group(&mut nfe, EntityKind::InfNFeSupl);
        Ok(nfe)
    }

    fn ide(&self) -> Element {
        let mut ide = self
            .single(EntityKind::Ide)
            .map(|fields| Element::group("ide", fields, STAMPS))
            .unwrap_or_else(|| Element::new("ide"));
        for entity in self.entities.iter().filter(|e| REFERENCES.contains(&e.kind)) {
            let mut reference = Element::new("NFref");
            reference.push(Element::group_or_leaf(
                entity.kind.tag(),
                &entity.attributes,
                STAMPS,
            ));
            ide.push(reference);
        }
        self.push_group(&mut ide, EntityKind::CompraGov);
        let mut advances = self.document_level(EntityKind::PagAntecipado).peekable();
        if advances.peek().is_some() {
            let mut group = Element::new(EntityKind::PagAntecipado.tag());
            for fields in advances {
                group.push_fields(fields, STAMPS);
            }
            ide.push(group);
        }
        ide
    }

    fn party(
        &self,
        tag: &str,
        fields: &AttributeSet,
        address: EntityKind,
        anchors: &[&str],
    ) -> Element {
        let mut element = Element::group(tag, fields, STAMPS);
        element.move_to_front(DOCUMENT_IDS);
        if let Some(fields) = self.single(address) {
            element.insert_after(anchors, Element::group(address.tag(), fields, STAMPS));
        }
        element
    }

    fn items(&self) -> BTreeMap<usize, Vec<&CompletedEntity>> {
        let mut items: BTreeMap<usize, Vec<&CompletedEntity>> = BTreeMap::new();
        for entity in self.entities.iter().filter(|e| is_item_kind(e.kind)) {
            if let Ok(item) = stamp_number(entity, "item") {
                items.entry(item).or_default().push(entity);
            }
        }
        items
    }

    fn total(&self) -> Option<Element> {
        let mut total = Element::new("total");
        self.push_group(&mut total, EntityKind::IcmsTot);
        self.push_group(&mut total, EntityKind::IssqnTot);
        self.push_group(&mut total, EntityKind::RetTrib);
        self.push_group(&mut total, EntityKind::IsTot);

        let mut ibscbs = self
            .single(EntityKind::IbsCbsTot)
            .map(|fields| Element::group("IBSCBSTot", fields, STAMPS))
            .unwrap_or_else(|| Element::new("IBSCBSTot"));
        if let Some(fields) = self.single(EntityKind::GIbsTot) {
            let mut gibs = Element::new("gIBS");
            self.push_group(&mut gibs, EntityKind::GIbsUfTot);
            self.push_group(&mut gibs, EntityKind::GIbsMunTot);
            gibs.push_fields(fields, STAMPS);
            ibscbs.push(gibs);
        }
        self.push_group(&mut ibscbs, EntityKind::GCbsTot);
        self.push_group(&mut ibscbs, EntityKind::GMonoTot);
        if !ibscbs.is_empty() {
            total.push(ibscbs);
        }
        if let Some(fields) = self.single(EntityKind::NfTot) {
            total.push_fields(fields, STAMPS);
        }
        (!total.is_empty()).then_some(total)
    }

    fn transp(&self) -> Option<Element> {
        let fields = self.single(EntityKind::Transp)?;
        let mut transp = Element::group("transp", fields, STAMPS);
        if let Some(fields) = self.single(EntityKind::Transporta) {
            let mut element = Element::group("transporta", fields, STAMPS);
            element.move_to_front(DOCUMENT_IDS);
            transp.push(element);
        }
        for kind in [
            EntityKind::RetTransp,
            EntityKind::VeicTransp,
            EntityKind::Reboque,
            EntityKind::Vagao,
            EntityKind::Balsa,
            EntityKind::Vol,
        ] {
            self.push_group(&mut transp, kind);
        }
        for entity in self.entities.iter().filter(|e| e.kind == EntityKind::Lacres) {
            let Ok(volume) = stamp_number(entity, "volume") else {
                continue;
            };
            if let Some(vol) = transp
                .children
                .iter_mut()
                .filter(|child| child.name == "vol")
                .nth(volume - 1)
            {
                vol.push(Element::group("lacres", &entity.attributes, STAMPS));
            }
        }
        Some(transp)
    }

    fn cobr(&self) -> Option<Element> {
        let mut cobr = Element::new("cobr");
        self.push_group(&mut cobr, EntityKind::Fat);
        self.push_group(&mut cobr, EntityKind::Dup);
        (!cobr.is_empty()).then_some(cobr)
    }

    fn pag(&self) -> Option<Element> {
        let mut pag = Element::new("pag");
        for entity in &self.entities {
            match entity.kind {
                EntityKind::DetPag => {
                    let fields = &entity.attributes;
                    let mut detail = Element::group("detPag", fields, DET_PAG_SKIP);
                    let mut card = Element::new("card");
                    for name in CARD_FIELDS {
                        if let Some(value) = fields.non_empty(name) {
                            card.push(Element::leaf(*name, value));
                        }
                    }
                    if !card.is_empty() {
                        detail.push(card);
                    }
                    pag.push(detail);
                }
                EntityKind::Card => {
                    let card = Element::group("card", &entity.attributes, STAMPS);
                    match pag.last_child_mut("detPag") {
                        Some(detail) => detail.push(card),
                        None => pag.push(card),
                    }
                }
                _ => {}
            }
        }
        if let Some(fields) = self.single(EntityKind::Pag) {
            pag.push_fields(fields, STAMPS);
        }
        (!pag.is_empty()).then_some(pag)
    }

    /// Render to an XML string.
    pub fn to_xml_string(&self) -> Result<String> {
        let root = self.to_element()?;
        let buffer = Vec::new();
        let mut writer = if self.options.indent > 0 {
            Writer::new_with_indent(buffer, b' ', self.options.indent)
        } else {
            Writer::new(buffer)
        };
        if self.options.declaration {
            writer.write_event(Event::Decl(BytesDecl::new("1.0", Some("UTF-8"), None)))?;
        }
        root.write(&mut writer)?;
        let xml = String::from_utf8(writer.into_inner()).context("xml output is not utf-8")?;
        Ok(xml)
    }

    /// Write the document to `output_path`.
    pub fn write_xml(&self, output_path: &Path) -> Result<()> {
        let root = self.to_element()?;
        if let Some(parent) = output_path.parent()
            && !parent.as_os_str().is_empty()
        {
            fs::create_dir_all(parent).with_context(|| format!("create {}", parent.display()))?;
        }
        let file = File::create(output_path)
            .with_context(|| format!("create {}", output_path.display()))?;
        let buffer = BufWriter::new(file);
        let mut writer = if self.options.indent > 0 {
            Writer::new_with_indent(buffer, b' ', self.options.indent)
        } else {
            Writer::new(buffer)
        };
        if self.options.declaration {
            writer.write_event(Event::Decl(BytesDecl::new("1.0", Some("UTF-8"), None)))?;
        }
        root.write(&mut writer)?;
        writer
            .into_inner()
            .flush()
            .with_context(|| format!("flush {}", output_path.display()))?;
        Ok(())
    }
}

impl DocumentBuilder for XmlDocumentBuilder {
    fn emit(&mut self, entity: CompletedEntity) -> std::result::Result<(), BuilderError> {
        let kind = entity.kind;
        let scope = if is_item_kind(kind) {
            stamp_number(&entity, "item")?
        } else {
            0
        };

        let key = singleton_key(kind);
        if let Some(key) = key
            && self.seen.contains(&(scope, key))
        {
            return Err(match scope {
                0 => BuilderError::new(format!("duplicate {kind}")),
                item => BuilderError::new(format!("duplicate {kind} for item {item}")),
            });
        }
        if is_icms(kind) && icms_group(kind, &entity.attributes).is_none() {
            return Err(BuilderError::new(format!(
                "{kind} with CST {:?} / CSOSN {:?} has no ICMS group",
                entity.attributes.get("CST").unwrap_or_default(),
                entity.attributes.get("CSOSN").unwrap_or_default()
            )));
        }
        if kind == EntityKind::Lacres {
            let volume = stamp_number(&entity, "volume")?;
            if volume > self.volumes {
                return Err(BuilderError::new(format!(
                    "lacres refers to volume {volume} but only {} were emitted",
                    self.volumes
                )));
            }
        }

        if let Some(key) = key {
            self.seen.insert((scope, key));
        }
        if kind == EntityKind::Vol {
            self.volumes += 1;
        }

        debug!(document = self.document_index, kind = %kind, scope, "accepted entity");
        self.entities.push(entity);
        Ok(())
    }
}

/// `det` element of one item.
fn det(item: usize, entities: &[&CompletedEntity]) -> Element {
    let of_kind = move |kind: EntityKind| {
        entities
            .iter()
            .filter(move |entity| entity.kind == kind)
            .map(|entity| &entity.attributes)
    };
    let single = |kind: EntityKind| of_kind(kind).next();

    let mut prod = single(EntityKind::Prod)
        .map(|fields| Element::group("prod", fields, STAMPS))
        .unwrap_or_else(|| Element::new("prod"));
    for entity in entities {
        match entity.kind {
            EntityKind::Nve | EntityKind::Cest | EntityKind::Recopi => {
                prod.push_fields(&entity.attributes, STAMPS);
            }
            EntityKind::GCred
            | EntityKind::Di
            | EntityKind::DetExport
            | EntityKind::Rastro
            | EntityKind::InfProdNff
            | EntityKind::InfProdEmb
            | EntityKind::VeicProd
            | EntityKind::Med
            | EntityKind::Arma
            | EntityKind::Comb => {
                prod.push(Element::group(entity.kind.tag(), &entity.attributes, STAMPS));
            }
            _ => {}
        }
    }
    // Children that may arrive before their parent group.
    for entity in entities {
        let (parent, skip) = match entity.kind {
            EntityKind::Adi => ("DI", ADI_SKIP),
            EntityKind::ExportInd => ("detExport", STAMPS),
            EntityKind::Encerrante | EntityKind::OrigComb => ("comb", STAMPS),
            _ => continue,
        };
        let child = Element::group(entity.kind.tag(), &entity.attributes, skip);
        let target = match entity.kind {
            EntityKind::Adi => {
                let number = entity.attributes.get("nDI").unwrap_or_default();
                let position = prod
                    .children
                    .iter()
                    .rposition(|c| c.name == "DI" && c.text_of("nDI") == Some(number));
                match position {
                    Some(index) => prod.children.get_mut(index),
                    None => prod.last_child_mut(parent),
                }
            }
            _ => prod.last_child_mut(parent),
        };
        match target {
            Some(target) => target.push(child),
            None => prod.push(child),
        }
    }
    prod.order_children(PROD_ORDER);

    let mut imposto = single(EntityKind::Imposto)
        .map(|fields| Element::group("imposto", fields, STAMPS))
        .unwrap_or_else(|| Element::new("imposto"));
    for entity in entities.iter().filter(|entity| is_icms(entity.kind)) {
        if let Some(icms) = icms_element(entity.kind, &entity.attributes) {
            imposto.push(icms);
        }
    }
    if let Some(fields) = single(EntityKind::Ipi) {
        imposto.push(ipi_element(fields));
    }
    for kind in [EntityKind::Ii, EntityKind::Issqn] {
        if let Some(fields) = single(kind) {
            imposto.push(Element::group(kind.tag(), fields, STAMPS));
        }
    }
    if let Some(fields) = single(EntityKind::Pis) {
        imposto.push(contribution_element("PIS", fields));
    }
    if let Some(fields) = single(EntityKind::PisSt) {
        imposto.push(Element::group("PISST", fields, STAMPS));
    }
    if let Some(fields) = single(EntityKind::Cofins) {
        imposto.push(contribution_element("COFINS", fields));
    }
    for kind in [EntityKind::CofinsSt, EntityKind::IcmsUfDest, EntityKind::Is] {
        if let Some(fields) = single(kind) {
            imposto.push(Element::group(kind.tag(), fields, STAMPS));
        }
    }
    if let Some(ibscbs) = ibscbs(&of_kind) {
        imposto.push(ibscbs);
    }

    let mut det = Element::new("det").with_attribute("nItem", &item.to_string());
    det.push(prod);
    if !imposto.is_empty() {
        det.push(imposto);
    }
    if let Some(fields) = single(EntityKind::ImpostoDevol) {
        det.push(Element::group("impostoDevol", fields, STAMPS));
    }
    if let Some(text) =
        single(EntityKind::InfAdProd).and_then(|fields| fields.non_empty("infAdProd"))
    {
        det.push(Element::leaf("infAdProd", text));
    }
    det
}

/// `IBSCBS` of one item with its nested groups.
fn ibscbs<'a, F, I>(of_kind: &F) -> Option<Element>
where
    F: Fn(EntityKind) -> I,
    I: Iterator<Item = &'a AttributeSet>,
{
    let nested = |tag: &str, own: EntityKind, children: &[EntityKind]| -> Option<Element> {
        let own_fields = of_kind(own).next();
        let mut element = Element::new(tag);
        if let Some(fields) = own_fields {
            element.push_fields(fields, STAMPS);
        }
        for kind in children {
            for fields in of_kind(*kind) {
                element.push(Element::group(kind.tag(), fields, STAMPS));
            }
        }
        (!element.is_empty() || own_fields.is_some()).then_some(element)
    };

    let mut outer = Element::new("IBSCBS");
    if let Some(fields) = of_kind(EntityKind::IbsCbs).next() {
        outer.push_fields(fields, STAMPS);
    }
    if let Some(group) = nested(
        "gIBSCBS",
        EntityKind::GIbsCbs,
        &[
            EntityKind::GIbsUf,
            EntityKind::GIbsMun,
            EntityKind::GCbs,
            EntityKind::GTribRegular,
            EntityKind::GIbsCredPres,
            EntityKind::GCbsCredPres,
            EntityKind::GTribCompraGov,
        ],
    ) {
        outer.push(group);
    }
    if let Some(group) = nested(
        "gIBSCBSMono",
        EntityKind::GIbsCbsMono,
        &[
            EntityKind::GMonoPadrao,
            EntityKind::GMonoReten,
            EntityKind::GMonoRet,
            EntityKind::GMonoDif,
        ],
    ) {
        outer.push(group);
    }
    for kind in [EntityKind::GTransfCred, EntityKind::GCredPresIbsZfm] {
        for fields in of_kind(kind) {
            outer.push(Element::group(kind.tag(), fields, STAMPS));
        }
    }
    (!outer.is_empty()).then_some(outer)
}

/// Write one `nfe-<n>.xml` per document into `output_dir`.
pub fn write_xml_outputs(
    output_dir: &Path,
    documents: &[XmlDocumentBuilder],
) -> Result<Vec<PathBuf>> {
    let dir = ensure_output_dir(output_dir)?;
    let mut outputs = Vec::new();
    for document in documents {
        let path = dir.join(format!("nfe-{}.xml", document.document_index()));
        document
            .write_xml(&path)
            .with_context(|| format!("write {}", path.display()))?;
        outputs.push(path);
    }
    Ok(outputs)
}
