// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! DOM-style XML document over the value model.
//!
//! The document owns every node; navigation and mutation go through node
//! ids, the arena form of the classic parent/sibling pointer tree. Child
//! and attribute order is document order and is preserved. Parsing is
//! delegated to `roxmltree` under a parse mask; formatting honors a
//! format mask and a configurable indentation sequence.

#[cfg(test)]
mod tests;

use crate::error::{MError, MErrorCode, MResult};
use crate::reflect::{MClass, PropertyDef, PropertyGetter, PropertySetter, ServiceDef, ServiceMethod};
use crate::stream::Stream;
use crate::variant::{Variant, VariantKind};

// Parse mask bits, mirroring the wrapped parser's flags.
pub const PARSE_PI: u32 = 0x0001;
pub const PARSE_COMMENTS: u32 = 0x0002;
pub const PARSE_CDATA: u32 = 0x0004;
pub const PARSE_WS_PCDATA: u32 = 0x0008;
pub const PARSE_ESCAPES: u32 = 0x0010;
pub const PARSE_EOL: u32 = 0x0020;
pub const PARSE_DECLARATION: u32 = 0x0100;
pub const PARSE_TRIM_PCDATA: u32 = 0x0800;
pub const PARSE_DEFAULT: u32 = PARSE_CDATA | PARSE_ESCAPES | PARSE_EOL;

// Format mask bits.
pub const FORMAT_INDENT: u32 = 0x01;
pub const FORMAT_RAW: u32 = 0x04;
pub const FORMAT_NO_DECLARATION: u32 = 0x08;
pub const FORMAT_NO_ESCAPES: u32 = 0x10;
pub const FORMAT_DEFAULT: u32 = FORMAT_INDENT;

/// Node kind; the numeric values are part of the reflected surface.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum XmlNodeType {
    /// Document tree root; has neither name nor value.
    Document = 1,
    /// Element, the most common type; named, no value.
    Element = 2,
    /// Plain character data.
    Pcdata = 3,
    /// Character data block `<![CDATA[...]]>`.
    Cdata = 4,
    /// Comment `<!-- ... -->`.
    Comment = 5,
    /// Processing instruction `<?name value?>`.
    Pi = 6,
    /// Document declaration `<?xml version="1.0"?>`.
    Declaration = 7,
    /// Document type declaration `<!DOCTYPE doc>`.
    Doctype = 8,
}

impl XmlNodeType {
    fn has_name(self) -> bool {
        matches!(
            self,
            XmlNodeType::Element | XmlNodeType::Pi | XmlNodeType::Declaration | XmlNodeType::Doctype
        )
    }

    fn has_value(self) -> bool {
        matches!(
            self,
            XmlNodeType::Pcdata
                | XmlNodeType::Cdata
                | XmlNodeType::Comment
                | XmlNodeType::Pi
                | XmlNodeType::Doctype
        )
    }

    fn has_children(self) -> bool {
        matches!(self, XmlNodeType::Document | XmlNodeType::Element)
    }
}

/// Node id within its document.
pub type XmlNodeId = usize;

struct XmlNodeData {
    node_type: XmlNodeType,
    name: String,
    value: String,
    parent: Option<XmlNodeId>,
    children: Vec<XmlNodeId>,
    attributes: Vec<(String, String)>,
}

impl XmlNodeData {
    fn new(node_type: XmlNodeType, parent: Option<XmlNodeId>) -> Self {
        XmlNodeData {
            node_type,
            name: String::new(),
            value: String::new(),
            parent,
            children: Vec::new(),
            attributes: Vec::new(),
        }
    }
}

/// XML document owning its node tree.
pub struct XmlDocument {
    nodes: Vec<XmlNodeData>,
    parse_mask: u32,
    format_mask: u32,
    indentation: String,
    path_delimiter: char,
}

impl Default for XmlDocument {
    fn default() -> Self {
        Self::new()
    }
}

impl XmlDocument {
    pub fn new() -> Self {
        XmlDocument {
            nodes: vec![XmlNodeData::new(XmlNodeType::Document, None)],
            parse_mask: PARSE_DEFAULT,
            format_mask: FORMAT_DEFAULT,
            indentation: "\t".to_string(),
            path_delimiter: '/',
        }
    }

    /// Drop every node, leaving an empty document root.
    pub fn clear(&mut self) {
        self.nodes = vec![XmlNodeData::new(XmlNodeType::Document, None)];
    }

    /// The document root.
    pub fn root(&self) -> XmlNodeId {
        0
    }

    pub fn parse_mask(&self) -> u32 {
        self.parse_mask
    }

    pub fn set_parse_mask(&mut self, mask: u32) {
        self.parse_mask = mask;
    }

    pub fn format_mask(&self) -> u32 {
        self.format_mask
    }

    pub fn set_format_mask(&mut self, mask: u32) {
        self.format_mask = mask;
    }

    pub fn indentation_sequence(&self) -> &str {
        &self.indentation
    }

    pub fn set_indentation_sequence(&mut self, sequence: &str) {
        self.indentation = sequence.to_string();
    }

    pub fn path_delimiter(&self) -> char {
        self.path_delimiter
    }

    pub fn set_path_delimiter(&mut self, delimiter: char) {
        self.path_delimiter = delimiter;
    }

    // Node access -------------------------------------------------------

    fn node(&self, id: XmlNodeId) -> MResult<&XmlNodeData> {
        self.nodes.get(id).ok_or_else(|| bad_node(id))
    }

    fn node_mut(&mut self, id: XmlNodeId) -> MResult<&mut XmlNodeData> {
        self.nodes.get_mut(id).ok_or_else(|| bad_node(id))
    }

    pub fn node_type(&self, id: XmlNodeId) -> MResult<XmlNodeType> {
        Ok(self.node(id)?.node_type)
    }

    /// Name; nonempty only for Element, Pi, Declaration, and Doctype.
    pub fn name(&self, id: XmlNodeId) -> MResult<&str> {
        Ok(&self.node(id)?.name)
    }

    pub fn set_name(&mut self, id: XmlNodeId, name: &str) -> MResult<()> {
        let node = self.node_mut(id)?;
        if !node.node_type.has_name() {
            return Err(MError::software(
                MErrorCode::OperationNotSupported,
                format!("Node of type {:?} cannot have a name", node.node_type),
            ));
        }
        node.name = name.to_string();
        Ok(())
    }

    pub fn value(&self, id: XmlNodeId) -> MResult<&str> {
        Ok(&self.node(id)?.value)
    }

    pub fn set_value(&mut self, id: XmlNodeId, value: &str) -> MResult<()> {
        let node = self.node_mut(id)?;
        if !node.node_type.has_value() {
            return Err(MError::software(
                MErrorCode::OperationNotSupported,
                format!("Node of type {:?} cannot have a value", node.node_type),
            ));
        }
        node.value = value.to_string();
        Ok(())
    }

    pub fn parent(&self, id: XmlNodeId) -> MResult<Option<XmlNodeId>> {
        Ok(self.node(id)?.parent)
    }

    pub fn children(&self, id: XmlNodeId) -> MResult<&[XmlNodeId]> {
        Ok(&self.node(id)?.children)
    }

    /// First child with the given element name, in document order.
    pub fn child_by_name(&self, id: XmlNodeId, name: &str) -> MResult<Option<XmlNodeId>> {
        for &child in &self.node(id)?.children {
            if self.nodes[child].name == name {
                return Ok(Some(child));
            }
        }
        Ok(None)
    }

    /// The single top element of the document.
    pub fn document_element(&self) -> Option<XmlNodeId> {
        self.nodes[0]
            .children
            .iter()
            .copied()
            .find(|&c| self.nodes[c].node_type == XmlNodeType::Element)
    }

    /// Append a child node; only Document and Element can carry children.
    pub fn append_child(&mut self, parent: XmlNodeId, node_type: XmlNodeType) -> MResult<XmlNodeId> {
        let parent_type = self.node(parent)?.node_type;
        if !parent_type.has_children() {
            return Err(MError::software(
                MErrorCode::OperationNotSupported,
                format!("Node of type {:?} cannot have children", parent_type),
            ));
        }
        let id = self.nodes.len();
        self.nodes.push(XmlNodeData::new(node_type, Some(parent)));
        self.nodes[parent].children.push(id);
        Ok(id)
    }

    /// Append a named element child.
    pub fn append_element(&mut self, parent: XmlNodeId, name: &str) -> MResult<XmlNodeId> {
        let id = self.append_child(parent, XmlNodeType::Element)?;
        self.nodes[id].name = name.to_string();
        Ok(id)
    }

    /// Detach a child from its parent; the node stays in the arena but is
    /// no longer reachable.
    pub fn remove_child(&mut self, parent: XmlNodeId, child: XmlNodeId) -> MResult<bool> {
        let children = &mut self.node_mut(parent)?.children;
        match children.iter().position(|&c| c == child) {
            Some(at) => {
                children.remove(at);
                self.nodes[child].parent = None;
                Ok(true)
            }
            None => Ok(false),
        }
    }

    // Attributes --------------------------------------------------------

    pub fn attributes(&self, id: XmlNodeId) -> MResult<&[(String, String)]> {
        Ok(&self.node(id)?.attributes)
    }

    pub fn all_attribute_names(&self, id: XmlNodeId) -> MResult<Vec<String>> {
        Ok(self.node(id)?.attributes.iter().map(|(n, _)| n.clone()).collect())
    }

    pub fn is_attribute_present(&self, id: XmlNodeId, name: &str) -> MResult<bool> {
        Ok(self.node(id)?.attributes.iter().any(|(n, _)| n == name))
    }

    pub fn get_attribute(&self, id: XmlNodeId, name: &str) -> MResult<Option<&str>> {
        Ok(self
            .node(id)?
            .attributes
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, v)| v.as_str()))
    }

    /// Fetch an attribute that must exist.
    pub fn get_existing_attribute(&self, id: XmlNodeId, name: &str) -> MResult<&str> {
        self.get_attribute(id, name)?
            .ok_or_else(|| MError::unknown_item(name))
    }

    /// Set an attribute, replacing in place or appending at the end so
    /// attribute order is preserved.
    pub fn set_attribute(&mut self, id: XmlNodeId, name: &str, value: &str) -> MResult<()> {
        let node = self.node_mut(id)?;
        if node.node_type != XmlNodeType::Element && node.node_type != XmlNodeType::Declaration {
            return Err(MError::software(
                MErrorCode::OperationNotSupported,
                format!("Node of type {:?} cannot have attributes", node.node_type),
            ));
        }
        match node.attributes.iter_mut().find(|(n, _)| n == name) {
            Some((_, v)) => *v = value.to_string(),
            None => node.attributes.push((name.to_string(), value.to_string())),
        }
        Ok(())
    }

    /// Remove an attribute; false when there is no such attribute.
    pub fn remove_attribute(&mut self, id: XmlNodeId, name: &str) -> MResult<bool> {
        let node = self.node_mut(id)?;
        match node.attributes.iter().position(|(n, _)| n == name) {
            Some(at) => {
                node.attributes.remove(at);
                Ok(true)
            }
            None => Ok(false),
        }
    }

    /// Remove an attribute that must exist.
    pub fn remove_existing_attribute(&mut self, id: XmlNodeId, name: &str) -> MResult<()> {
        if !self.remove_attribute(id, name)? {
            return Err(MError::unknown_item(name));
        }
        Ok(())
    }

    pub fn remove_all_attributes(&mut self, id: XmlNodeId) -> MResult<()> {
        self.node_mut(id)?.attributes.clear();
        Ok(())
    }

    // Text and path -----------------------------------------------------

    /// Text of an element: the value of its first PCDATA child; empty for
    /// anything else.
    pub fn text(&self, id: XmlNodeId) -> MResult<String> {
        let node = self.node(id)?;
        for &child in &node.children {
            if self.nodes[child].node_type == XmlNodeType::Pcdata {
                return Ok(self.nodes[child].value.clone());
            }
        }
        Ok(String::new())
    }

    /// Assign element text, creating the PCDATA child when absent.
    pub fn set_text(&mut self, id: XmlNodeId, text: &str) -> MResult<()> {
        if self.node(id)?.node_type != XmlNodeType::Element {
            return Err(MError::software(
                MErrorCode::OperationNotSupported,
                "Only an element can be assigned text",
            ));
        }
        let existing = self.node(id)?.children.iter().copied().find(|&c| {
            self.nodes[c].node_type == XmlNodeType::Pcdata
        });
        match existing {
            Some(child) => self.nodes[child].value = text.to_string(),
            None => {
                let child = self.append_child(id, XmlNodeType::Pcdata)?;
                self.nodes[child].value = text.to_string();
            }
        }
        Ok(())
    }

    /// Ancestor names joined with the path delimiter, root first.
    pub fn path(&self, id: XmlNodeId) -> MResult<String> {
        let mut names = Vec::new();
        let mut current = Some(id);
        while let Some(node) = current {
            let data = self.node(node)?;
            if data.node_type != XmlNodeType::Document {
                names.push(data.name.clone());
            }
            current = data.parent;
        }
        names.reverse();
        let delimiter = self.path_delimiter.to_string();
        Ok(format!("{}{}", delimiter, names.join(&delimiter)))
    }

    // Reading -----------------------------------------------------------

    /// Read from a source chosen by shape: a trimmed text starting with
    /// `<` and ending with `>` is in-place XML, anything else is a file
    /// name.
    pub fn read(&mut self, source: &str) -> MResult<()> {
        let trimmed = source.trim_start_matches('\u{FEFF}').trim();
        if trimmed.starts_with('<') && trimmed.ends_with('>') {
            self.read_from_string(source)
        } else {
            let text = std::fs::read_to_string(source)
                .map_err(|e| MError::from_system(&e, &format!("Cannot read '{}'", source)))?;
            self.read_from_string(&text)
        }
    }

    /// Parse the whole document from text, honoring the parse mask.
    pub fn read_from_string(&mut self, text: &str) -> MResult<()> {
        let mut text = text.trim_start_matches('\u{FEFF}').to_string();
        if self.parse_mask & PARSE_EOL != 0 {
            text = text.replace("\r\n", "\n").replace('\r', "\n");
        }
        let parsed = roxmltree::Document::parse(&text).map_err(|e| {
            MError::plain(
                MErrorCode::BadFileFormat,
                format!("XML is bad or corrupt: {}", e),
            )
        })?;

        self.clear();
        if self.parse_mask & PARSE_DECLARATION != 0 {
            self.capture_declaration(&text)?;
        }
        let root = self.root();
        self.build_subtree(root, parsed.root())?;
        Ok(())
    }

    /// Read the remaining bytes of a stream as one document.
    pub fn read_from_stream(&mut self, stream: &mut Stream) -> MResult<()> {
        let bytes = stream.read_all()?;
        let text = String::from_utf8(bytes).map_err(|_| {
            MError::plain(MErrorCode::BadFileFormat, "XML is not valid UTF-8")
        })?;
        self.read_from_string(&text)
    }

    /// The declaration is not materialized by the parser; recover it from
    /// the document prefix.
    fn capture_declaration(&mut self, text: &str) -> MResult<()> {
        let trimmed = text.trim_start();
        if let Some(rest) = trimmed.strip_prefix("<?xml") {
            if let Some(end) = rest.find("?>") {
                let id = self.nodes.len();
                let mut node = XmlNodeData::new(XmlNodeType::Declaration, Some(0));
                node.name = "xml".to_string();
                for piece in rest[..end].split_whitespace() {
                    if let Some((name, value)) = piece.split_once('=') {
                        node.attributes.push((
                            name.to_string(),
                            value.trim_matches(|c| c == '"' || c == '\'').to_string(),
                        ));
                    }
                }
                self.nodes.push(node);
                self.nodes[0].children.push(id);
            }
        }
        Ok(())
    }

    fn build_subtree(&mut self, into: XmlNodeId, from: roxmltree::Node<'_, '_>) -> MResult<()> {
        for child in from.children() {
            if child.is_element() {
                let id = self.append_element(into, child.tag_name().name())?;
                for attribute in child.attributes() {
                    self.nodes[id]
                        .attributes
                        .push((attribute.name().to_string(), attribute.value().to_string()));
                }
                self.build_subtree(id, child)?;
            } else if child.is_text() {
                let raw = child.text().unwrap_or("");
                let keep_ws = self.parse_mask & PARSE_WS_PCDATA != 0;
                if raw.trim().is_empty() && !keep_ws {
                    continue;
                }
                let value = if self.parse_mask & PARSE_TRIM_PCDATA != 0 {
                    raw.trim()
                } else {
                    raw
                };
                let id = self.append_child(into, XmlNodeType::Pcdata)?;
                self.nodes[id].value = value.to_string();
            } else if child.is_comment() {
                if self.parse_mask & PARSE_COMMENTS != 0 {
                    let id = self.append_child(into, XmlNodeType::Comment)?;
                    self.nodes[id].value = child.text().unwrap_or("").to_string();
                }
            } else if child.is_pi() && self.parse_mask & PARSE_PI != 0 {
                let pi = child.pi().expect("pi node");
                let id = self.append_child(into, XmlNodeType::Pi)?;
                self.nodes[id].name = pi.target.to_string();
                self.nodes[id].value = pi.value.unwrap_or("").to_string();
            }
        }
        Ok(())
    }

    // Writing -----------------------------------------------------------

    /// Serialize the document honoring the format mask.
    pub fn as_string(&self) -> MResult<String> {
        let mut out = String::new();
        let has_declaration = self.nodes[0]
            .children
            .iter()
            .any(|&c| self.nodes[c].node_type == XmlNodeType::Declaration);
        if self.format_mask & FORMAT_NO_DECLARATION == 0 && !has_declaration {
            out.push_str("<?xml version=\"1.0\"?>");
            self.newline(&mut out);
        }
        for &child in &self.nodes[0].children {
            self.write_node(&mut out, child, 0)?;
        }
        Ok(out)
    }

    /// Write the serialized document to a stream.
    pub fn write_to_stream(&self, stream: &mut Stream) -> MResult<()> {
        stream.write(self.as_string()?.as_bytes())
    }

    fn indented(&self) -> bool {
        self.format_mask & FORMAT_INDENT != 0 && self.format_mask & FORMAT_RAW == 0
    }

    fn newline(&self, out: &mut String) {
        if self.format_mask & FORMAT_RAW == 0 {
            out.push('\n');
        }
    }

    fn push_indent(&self, out: &mut String, depth: usize) {
        if self.indented() {
            for _ in 0..depth {
                out.push_str(&self.indentation);
            }
        }
    }

    fn write_node(&self, out: &mut String, id: XmlNodeId, depth: usize) -> MResult<()> {
        let node = &self.nodes[id];
        match node.node_type {
            XmlNodeType::Document => {}
            XmlNodeType::Element => {
                self.push_indent(out, depth);
                out.push('<');
                out.push_str(&node.name);
                for (name, value) in &node.attributes {
                    out.push(' ');
                    out.push_str(name);
                    out.push_str("=\"");
                    self.push_escaped(out, value, true);
                    out.push('"');
                }
                if node.children.is_empty() {
                    out.push_str(" />");
                    self.newline(out);
                    return Ok(());
                }
                // A single PCDATA child stays on the element's line
                let only_text = node.children.len() == 1
                    && self.nodes[node.children[0]].node_type == XmlNodeType::Pcdata;
                out.push('>');
                if only_text {
                    self.push_escaped(out, &self.nodes[node.children[0]].value, false);
                } else {
                    self.newline(out);
                    for &child in &node.children {
                        self.write_node(out, child, depth + 1)?;
                    }
                    self.push_indent(out, depth);
                }
                out.push_str("</");
                out.push_str(&node.name);
                out.push('>');
                self.newline(out);
            }
            XmlNodeType::Pcdata => {
                self.push_indent(out, depth);
                self.push_escaped(out, &node.value, false);
                self.newline(out);
            }
            XmlNodeType::Cdata => {
                self.push_indent(out, depth);
                out.push_str("<![CDATA[");
                out.push_str(&node.value);
                out.push_str("]]>");
                self.newline(out);
            }
            XmlNodeType::Comment => {
                self.push_indent(out, depth);
                out.push_str("<!--");
                out.push_str(&node.value);
                out.push_str("-->");
                self.newline(out);
            }
            XmlNodeType::Pi => {
                self.push_indent(out, depth);
                out.push_str("<?");
                out.push_str(&node.name);
                if !node.value.is_empty() {
                    out.push(' ');
                    out.push_str(&node.value);
                }
                out.push_str("?>");
                self.newline(out);
            }
            XmlNodeType::Declaration => {
                out.push_str("<?");
                out.push_str(&node.name);
                for (name, value) in &node.attributes {
                    out.push(' ');
                    out.push_str(name);
                    out.push_str("=\"");
                    out.push_str(value);
                    out.push('"');
                }
                out.push_str("?>");
                self.newline(out);
            }
            XmlNodeType::Doctype => {
                out.push_str("<!DOCTYPE ");
                out.push_str(&node.name);
                if !node.value.is_empty() {
                    out.push(' ');
                    out.push_str(&node.value);
                }
                out.push('>');
                self.newline(out);
            }
        }
        Ok(())
    }

    fn push_escaped(&self, out: &mut String, text: &str, attribute: bool) {
        if self.format_mask & FORMAT_NO_ESCAPES != 0 {
            out.push_str(text);
            return;
        }
        for c in text.chars() {
            match c {
                '&' => out.push_str("&amp;"),
                '<' => out.push_str("&lt;"),
                '>' => out.push_str("&gt;"),
                '"' if attribute => out.push_str("&quot;"),
                c => out.push(c),
            }
        }
    }
}

#[track_caller]
fn bad_node(id: XmlNodeId) -> MError {
    MError::software(
        MErrorCode::IndexOutOfRange,
        format!("Node {} does not exist in the document", id),
    )
}

// Reflection -------------------------------------------------------------

impl crate::reflect::MObject for XmlDocument {
    fn class(&self) -> &'static MClass {
        &XML_DOCUMENT_CLASS
    }

    fn as_any(&self) -> &dyn std::any::Any {
        self
    }

    fn as_any_mut(&mut self) -> &mut dyn std::any::Any {
        self
    }
}

pub static XML_DOCUMENT_CLASS: MClass = MClass {
    name: "XmlDocument",
    type_name: "XmlDocument",
    parent: Some(&crate::reflect::OBJECT_CLASS),
    properties: &[
        PropertyDef::enumeration("NodeDocument", XmlNodeType::Document as u32),
        PropertyDef::enumeration("NodeElement", XmlNodeType::Element as u32),
        PropertyDef::enumeration("NodePcdata", XmlNodeType::Pcdata as u32),
        PropertyDef::enumeration("NodeCdata", XmlNodeType::Cdata as u32),
        PropertyDef::enumeration("NodeComment", XmlNodeType::Comment as u32),
        PropertyDef::enumeration("NodePi", XmlNodeType::Pi as u32),
        PropertyDef::enumeration("NodeDeclaration", XmlNodeType::Declaration as u32),
        PropertyDef::enumeration("NodeDoctype", XmlNodeType::Doctype as u32),
        PropertyDef::enumeration("ParsePi", PARSE_PI),
        PropertyDef::enumeration("ParseComments", PARSE_COMMENTS),
        PropertyDef::enumeration("ParseCdata", PARSE_CDATA),
        PropertyDef::enumeration("ParseWsPcdata", PARSE_WS_PCDATA),
        PropertyDef::enumeration("ParseEscapes", PARSE_ESCAPES),
        PropertyDef::enumeration("ParseEol", PARSE_EOL),
        PropertyDef::enumeration("ParseDeclaration", PARSE_DECLARATION),
        PropertyDef::enumeration("ParseTrimPcdata", PARSE_TRIM_PCDATA),
        PropertyDef::enumeration("ParseDefault", PARSE_DEFAULT),
        PropertyDef::enumeration("FormatIndent", FORMAT_INDENT),
        PropertyDef::enumeration("FormatRaw", FORMAT_RAW),
        PropertyDef::enumeration("FormatNoDeclaration", FORMAT_NO_DECLARATION),
        PropertyDef::enumeration("FormatNoEscapes", FORMAT_NO_ESCAPES),
        PropertyDef::enumeration("FormatDefault", FORMAT_DEFAULT),
        PropertyDef::read_write(
            "ParseMask",
            VariantKind::UInt,
            PropertyGetter::Object(|o| {
                Ok(Variant::UInt(o.downcast_ref::<XmlDocument>()?.parse_mask()))
            }),
            PropertySetter::Object(|o, v| {
                o.downcast_mut::<XmlDocument>()?.set_parse_mask(v.as_uint()?);
                Ok(())
            }),
        ),
        PropertyDef::read_write(
            "FormatMask",
            VariantKind::UInt,
            PropertyGetter::Object(|o| {
                Ok(Variant::UInt(o.downcast_ref::<XmlDocument>()?.format_mask()))
            }),
            PropertySetter::Object(|o, v| {
                o.downcast_mut::<XmlDocument>()?.set_format_mask(v.as_uint()?);
                Ok(())
            }),
        ),
        PropertyDef::read_write(
            "IndentationSequence",
            VariantKind::String,
            PropertyGetter::Object(|o| {
                Ok(Variant::from(
                    o.downcast_ref::<XmlDocument>()?.indentation_sequence(),
                ))
            }),
            PropertySetter::Object(|o, v| {
                o.downcast_mut::<XmlDocument>()?.set_indentation_sequence(&v.as_string()?);
                Ok(())
            }),
        ),
        PropertyDef::readonly(
            "AsString",
            VariantKind::String,
            PropertyGetter::Object(|o| {
                Ok(Variant::from(o.downcast_ref::<XmlDocument>()?.as_string()?))
            }),
        ),
    ],
    services: &[
        ServiceDef::of(
            "Read",
            ServiceMethod::Mut1(|o, source| {
                o.downcast_mut::<XmlDocument>()?.read(&source.as_string()?)?;
                Ok(Variant::Empty)
            }),
            "(source: String)",
        ),
        ServiceDef::of(
            "Clear",
            ServiceMethod::Mut0(|o| {
                o.downcast_mut::<XmlDocument>()?.clear();
                Ok(Variant::Empty)
            }),
            "()",
        ),
        ServiceDef::of(
            "New",
            ServiceMethod::Class0(|| {
                Ok(Variant::from_object(std::sync::Arc::new(XmlDocument::new())))
            }),
            "() -> XmlDocument",
        ),
    ],
};
