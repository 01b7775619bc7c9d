//! Shared utilities for NF-e output generation.

use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use nfe_model::AttributeSet;
use quick_xml::Writer;
use quick_xml::events::{BytesEnd, BytesStart, BytesText, Event};

/// NF-e namespace.
pub const NFE_NS: &str = "http://www.portalfiscal.inf.br/nfe";

/// Stamp attributes added by the assembler; never written as fields.
pub const STAMPS: &[&str] = &["item", "volume"];

/// Layout spellings that differ from the element name.
const FIELD_ALIASES: &[(&str, &str)] = &[("XNome", "xNome"), ("XFant", "xFant")];

/// Element name for a layout attribute.
pub fn field_tag(name: &str) -> &str {
    FIELD_ALIASES
        .iter()
        .find(|(from, _)| *from == name)
        .map_or(name, |(_, to)| *to)
}

/// Create `dir` (and parents) if missing.
pub fn ensure_output_dir(dir: &Path) -> Result<PathBuf> {
    fs::create_dir_all(dir).with_context(|| format!("create {}", dir.display()))?;
    Ok(dir.to_path_buf())
}

/// In-memory XML element.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Element {
    pub name: String,
    pub attributes: Vec<(String, String)>,
    pub text: Option<String>,
    pub children: Vec<Element>,
}

impl Element {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }

    pub fn leaf(name: impl Into<String>, text: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            text: Some(text.into()),
            ..Self::default()
        }
    }

    /// Element holding one leaf per non-empty attribute not listed in `skip`.
    pub fn group(name: impl Into<String>, fields: &AttributeSet, skip: &[&str]) -> Self {
        let mut element = Self::new(name);
        element.push_fields(fields, skip);
        element
    }

    /// Like [`group`](Self::group), but collapses to a bare leaf when the only
    /// field carries the element's own name (`refNFe`, `refCTe`).
    pub fn group_or_leaf(name: &str, fields: &AttributeSet, skip: &[&str]) -> Self {
        let mut filled = fields
            .iter()
            .filter(|(field, value)| !value.is_empty() && !skip.contains(&field.as_str()));
        if let (Some((field, value)), None) = (filled.next(), filled.next())
            && field == name
        {
            return Self::leaf(name, value.as_str());
        }
        Self::group(name, fields, skip)
    }

    pub fn with_attribute(mut self, name: &str, value: &str) -> Self {
        if !value.is_empty() {
            self.attributes.push((name.to_string(), value.to_string()));
        }
        self
    }

    pub fn push(&mut self, child: Element) {
        self.children.push(child);
    }

    pub fn push_fields(&mut self, fields: &AttributeSet, skip: &[&str]) {
        for (name, value) in fields.iter() {
            if value.is_empty() || skip.contains(&name.as_str()) {
                continue;
            }
            self.children.push(Self::leaf(field_tag(name), value.as_str()));
        }
    }

    /// Insert `child` right after the last child named in `anchors`, or at the
    /// end when none is present.
    pub fn insert_after(&mut self, anchors: &[&str], child: Element) {
        let position = self
            .children
            .iter()
            .rposition(|existing| anchors.contains(&existing.name.as_str()));
        match position {
            Some(index) => self.children.insert(index + 1, child),
            None => self.children.push(child),
        }
    }

    /// Move the children named in `names` to the front, keeping their order.
    pub fn move_to_front(&mut self, names: &[&str]) {
        let (mut front, rest): (Vec<_>, Vec<_>) = self
            .children
            .drain(..)
            .partition(|child| names.contains(&child.name.as_str()));
        front.extend(rest);
        self.children = front;
    }

    /// Reorder children by their position in `order`, keeping the relative
    /// order of repeated names. Unlisted children go last.
    pub fn order_children(&mut self, order: &[&str]) {
        self.children.sort_by_key(|child| {
            order
                .iter()
                .position(|name| *name == child.name)
                .unwrap_or(order.len())
        });
    }

    pub fn child(&self, name: &str) -> Option<&Element> {
        self.children.iter().find(|child| child.name == name)
    }

    pub fn last_child_mut(&mut self, name: &str) -> Option<&mut Element> {
        self.children.iter_mut().rev().find(|child| child.name == name)
    }

    pub fn children_named<'a>(&'a self, name: &'a str) -> impl Iterator<Item = &'a Element> {
        self.children.iter().filter(move |child| child.name == name)
    }

    /// Text of the first child leaf called `name`.
    pub fn text_of(&self, name: &str) -> Option<&str> {
        self.child(name).and_then(|child| child.text.as_deref())
    }

    pub fn is_empty(&self) -> bool {
        self.attributes.is_empty() && self.text.is_none() && self.children.is_empty()
    }

    pub fn write<W: Write>(&self, writer: &mut Writer<W>) -> Result<()> {
        let mut start = BytesStart::new(self.name.as_str());
        for (name, value) in &self.attributes {
            start.push_attribute((name.as_str(), value.as_str()));
        }
        if self.text.is_none() && self.children.is_empty() {
            writer.write_event(Event::Empty(start))?;
            return Ok(());
        }
        writer.write_event(Event::Start(start))?;
        if let Some(text) = &self.text {
            writer.write_event(Event::Text(BytesText::new(text)))?;
        }
        for child in &self.children {
            child.write(writer)?;
        }
        writer.write_event(Event::End(BytesEnd::new(self.name.as_str())))?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn fields(pairs: &[(&str, &str)]) -> AttributeSet {
        pairs.iter().copied().collect()
    }

    #[test]
    fn test_group_skips_blank_and_stamped_fields() {
        let element = Element::group(
            "emit",
            &fields(&[("XNome", "Acme"), ("IE", ""), ("item", "1")]),
            STAMPS,
        );
        assert_eq!(element.children.len(), 1);
        assert_eq!(element.text_of("xNome"), Some("Acme"));
    }

    #[test]
    fn test_group_or_leaf_collapses_self_named_field() {
        let element = Element::group_or_leaf("refNFe", &fields(&[("refNFe", "3525")]), STAMPS);
        assert_eq!(element.text.as_deref(), Some("3525"));
        let element =
            Element::group_or_leaf("refNF", &fields(&[("cUF", "35"), ("nNF", "1")]), STAMPS);
        assert_eq!(element.children.len(), 2);
    }

    #[test]
    fn test_insert_after_and_move_to_front() {
        let mut element = Element::group(
            "dest",
            &fields(&[("xNome", "Cliente"), ("IE", "1"), ("CNPJ", "9")]),
            STAMPS,
        );
        element.move_to_front(&["CNPJ", "CPF"]);
        element.insert_after(&["xNome"], Element::new("enderDest"));
        let names: Vec<_> = element.children.iter().map(|c| c.name.as_str()).collect();
        assert_eq!(names, ["CNPJ", "xNome", "enderDest", "IE"]);
    }

    #[test]
    fn test_order_children_is_stable() {
        let mut element = Element::new("prod");
        for (name, text) in [
            ("CFOP", "5102"),
            ("NVE", "AA0001"),
            ("NCM", "0901"),
            ("NVE", "AA0002"),
            ("extra", "x"),
        ] {
            element.push(Element::leaf(name, text));
        }
        element.order_children(&["NCM", "NVE", "CFOP"]);
        let texts: Vec<_> = element
            .children
            .iter()
            .filter_map(|c| c.text.as_deref())
            .collect();
        assert_eq!(texts, ["0901", "AA0001", "AA0002", "5102", "x"]);
    }

    #[test]
    fn test_writes_escaped_text() {
        let mut writer = Writer::new(Vec::new());
        Element::leaf("xNome", "A<B")
            .write(&mut writer)
            .unwrap();
        let xml = String::from_utf8(writer.into_inner()).unwrap();
        assert_eq!(xml, "<xNome>A&lt;B</xNome>");
    }
}
