//! NF-e output generation.
//!
//! - **XML**: [`XmlDocumentBuilder`] places completed entities in the NF-e
//!   tree and serializes it with quick-xml.
//! - **JSON**: the entity list of each document, as emitted.

mod common;
mod groups;
mod json;
mod nfe_xml;

pub use common::{Element, NFE_NS};
pub use groups::icms_group;
pub use json::{ENTITY_DUMP_SCHEMA, EntityDump, write_json, write_json_outputs};
pub use nfe_xml::{XmlDocumentBuilder, XmlOptions, write_xml_outputs};
