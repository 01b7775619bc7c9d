//! Completed entities handed to document builders.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::attributes::AttributeSet;
use crate::code::RecordCode;

/// Closed set of entity kinds the assembler can emit.
///
/// Each kind corresponds to one group of the NF-e document; [`tag`](Self::tag)
/// is the element name used by the XML layout.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum EntityKind {
    InfNFe,
    Ide,
    RefNFe,
    RefNFeSig,
    RefNF,
    RefNFP,
    RefCTe,
    RefECF,
    CompraGov,
    PagAntecipado,
    Avulsa,
    Emit,
    EnderEmit,
    Dest,
    EnderDest,
    Retirada,
    Entrega,
    AutXml,
    InfAdProd,
    Prod,
    Nve,
    Cest,
    GCred,
    Di,
    Adi,
    DetExport,
    ExportInd,
    Rastro,
    InfProdNff,
    InfProdEmb,
    VeicProd,
    Med,
    Arma,
    Comb,
    Encerrante,
    OrigComb,
    Recopi,
    Imposto,
    Icms,
    IcmsPart,
    IcmsSt,
    IcmsSn,
    IcmsUfDest,
    Ipi,
    Ii,
    Pis,
    PisSt,
    Cofins,
    CofinsSt,
    Issqn,
    ImpostoDevol,
    Is,
    IbsCbs,
    GIbsCbs,
    GIbsUf,
    GIbsMun,
    GCbs,
    GTribRegular,
    GIbsCredPres,
    GCbsCredPres,
    GTribCompraGov,
    GIbsCbsMono,
    GMonoPadrao,
    GMonoReten,
    GMonoRet,
    GMonoDif,
    GTransfCred,
    GCredPresIbsZfm,
    IcmsTot,
    IssqnTot,
    RetTrib,
    IsTot,
    IbsCbsTot,
    GIbsTot,
    GIbsUfTot,
    GIbsMunTot,
    GCbsTot,
    GMonoTot,
    NfTot,
    Transp,
    Transporta,
    RetTransp,
    VeicTransp,
    Reboque,
    Vagao,
    Balsa,
    Vol,
    Lacres,
    Pag,
    DetPag,
    Card,
    Fat,
    Dup,
    InfIntermed,
    InfAdic,
    ObsCont,
    ObsFisco,
    ProcRef,
    Exporta,
    Compra,
    Cana,
    ForDia,
    Deduc,
    InfRespTec,
    InfNFeSupl,
}

impl EntityKind {
    /// Element name of this entity in the NF-e layout.
    pub fn tag(self) -> &'static str {
        match self {
            EntityKind::InfNFe => "infNFe",
            EntityKind::Ide => "ide",
            EntityKind::RefNFe => "refNFe",
            EntityKind::RefNFeSig => "refNFeSig",
            EntityKind::RefNF => "refNF",
            EntityKind::RefNFP => "refNFP",
            EntityKind::RefCTe => "refCTe",
            EntityKind::RefECF => "refECF",
            EntityKind::CompraGov => "gCompraGov",
            EntityKind::PagAntecipado => "gPagAntecipado",
            EntityKind::Avulsa => "avulsa",
            EntityKind::Emit => "emit",
            EntityKind::EnderEmit => "enderEmit",
            EntityKind::Dest => "dest",
            EntityKind::EnderDest => "enderDest",
            EntityKind::Retirada => "retirada",
            EntityKind::Entrega => "entrega",
            EntityKind::AutXml => "autXML",
            EntityKind::InfAdProd => "infAdProd",
            EntityKind::Prod => "prod",
            EntityKind::Nve => "NVE",
            EntityKind::Cest => "CEST",
            EntityKind::GCred => "gCred",
            EntityKind::Di => "DI",
            EntityKind::Adi => "adi",
            EntityKind::DetExport => "detExport",
            EntityKind::ExportInd => "exportInd",
            EntityKind::Rastro => "rastro",
            EntityKind::InfProdNff => "infProdNFF",
            EntityKind::InfProdEmb => "infProdEmb",
            EntityKind::VeicProd => "veicProd",
            EntityKind::Med => "med",
            EntityKind::Arma => "arma",
            EntityKind::Comb => "comb",
            EntityKind::Encerrante => "encerrante",
            EntityKind::OrigComb => "origComb",
            EntityKind::Recopi => "nRECOPI",
            EntityKind::Imposto => "imposto",
            EntityKind::Icms => "ICMS",
            EntityKind::IcmsPart => "ICMSPart",
            EntityKind::IcmsSt => "ICMSST",
            EntityKind::IcmsSn => "ICMSSN",
            EntityKind::IcmsUfDest => "ICMSUFDest",
            EntityKind::Ipi => "IPI",
            EntityKind::Ii => "II",
            EntityKind::Pis => "PIS",
            EntityKind::PisSt => "PISST",
            EntityKind::Cofins => "COFINS",
            EntityKind::CofinsSt => "COFINSST",
            EntityKind::Issqn => "ISSQN",
            EntityKind::ImpostoDevol => "impostoDevol",
            EntityKind::Is => "IS",
            EntityKind::IbsCbs => "IBSCBS",
            EntityKind::GIbsCbs => "gIBSCBS",
            EntityKind::GIbsUf => "gIBSUF",
            EntityKind::GIbsMun => "gIBSMun",
            EntityKind::GCbs => "gCBS",
            EntityKind::GTribRegular => "gTribRegular",
            EntityKind::GIbsCredPres => "gIBSCredPres",
            EntityKind::GCbsCredPres => "gCBSCredPres",
            EntityKind::GTribCompraGov => "gTribCompraGov",
            EntityKind::GIbsCbsMono => "gIBSCBSMono",
            EntityKind::GMonoPadrao => "gMonoPadrao",
            EntityKind::GMonoReten => "gMonoReten",
            EntityKind::GMonoRet => "gMonoRet",
            EntityKind::GMonoDif => "gMonoDif",
            EntityKind::GTransfCred => "gTransfCred",
            EntityKind::GCredPresIbsZfm => "gCredPresIBSZFM",
            EntityKind::IcmsTot => "ICMSTot",
            EntityKind::IssqnTot => "ISSQNtot",
            EntityKind::RetTrib => "retTrib",
            EntityKind::IsTot => "ISTot",
            EntityKind::IbsCbsTot => "IBSCBSTot",
            EntityKind::GIbsTot => "gIBS",
            EntityKind::GIbsUfTot => "gIBSUF",
            EntityKind::GIbsMunTot => "gIBSMun",
            EntityKind::GCbsTot => "gCBS",
            EntityKind::GMonoTot => "gMono",
            EntityKind::NfTot => "vNFTot",
            EntityKind::Transp => "transp",
            EntityKind::Transporta => "transporta",
            EntityKind::RetTransp => "retTransp",
            EntityKind::VeicTransp => "veicTransp",
            EntityKind::Reboque => "reboque",
            EntityKind::Vagao => "vagao",
            EntityKind::Balsa => "balsa",
            EntityKind::Vol => "vol",
            EntityKind::Lacres => "lacres",
            EntityKind::Pag => "pag",
            EntityKind::DetPag => "detPag",
            EntityKind::Card => "card",
            EntityKind::Fat => "fat",
            EntityKind::Dup => "dup",
            EntityKind::InfIntermed => "infIntermed",
            EntityKind::InfAdic => "infAdic",
            EntityKind::ObsCont => "obsCont",
            EntityKind::ObsFisco => "obsFisco",
            EntityKind::ProcRef => "procRef",
            EntityKind::Exporta => "exporta",
            EntityKind::Compra => "compra",
            EntityKind::Cana => "cana",
            EntityKind::ForDia => "forDia",
            EntityKind::Deduc => "deduc",
            EntityKind::InfRespTec => "infRespTec",
            EntityKind::InfNFeSupl => "infNFeSupl",
        }
    }
}

impl fmt::Display for EntityKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.tag())
    }
}

/// What caused an entity to be emitted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Trigger {
    /// Emitted while processing the record at `line_number`.
    Record { code: RecordCode, line_number: usize },
    /// Flushed by the finalizer after the last record.
    EndOfDocument,
}

/// Fully merged, emission-ready attribute set.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CompletedEntity {
    pub kind: EntityKind,
    pub attributes: AttributeSet,
    pub trigger: Trigger,
}

impl CompletedEntity {
    pub fn line_number(&self) -> Option<usize> {
        match &self.trigger {
            Trigger::Record { line_number, .. } => Some(*line_number),
            Trigger::EndOfDocument => None,
        }
    }
}
