// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Tests of the XML document model.

use super::*;
use std::io::Write;

const SAMPLE: &str = r#"<?xml version="1.0"?>
<tables>
    <table kind="ST" number="1">
        <name>GEN_CONFIG_TBL</name>
        <field offset="0">FORMAT_CONTROL_1</field>
        <field offset="1">FORMAT_CONTROL_2</field>
    </table>
    <table kind="MT" number="0" />
</tables>
"#;

#[test]
fn test_parse_structure() {
    let mut doc = XmlDocument::new();
    doc.read_from_string(SAMPLE).unwrap();

    let tables = doc.document_element().unwrap();
    assert_eq!(doc.name(tables).unwrap(), "tables");
    assert_eq!(doc.node_type(tables).unwrap(), XmlNodeType::Element);

    let children = doc.children(tables).unwrap().to_vec();
    assert_eq!(children.len(), 2);
    let table = children[0];
    assert_eq!(doc.name(table).unwrap(), "table");
    assert_eq!(doc.get_attribute(table, "kind").unwrap(), Some("ST"));
    assert_eq!(doc.get_attribute(table, "number").unwrap(), Some("1"));
    assert_eq!(doc.get_attribute(table, "bogus").unwrap(), None);
}

#[test]
fn test_attribute_order_preserved() {
    let mut doc = XmlDocument::new();
    doc.read_from_string(SAMPLE).unwrap();
    let table = doc.children(doc.document_element().unwrap()).unwrap()[0];
    assert_eq!(doc.all_attribute_names(table).unwrap(), ["kind", "number"]);
}

#[test]
fn test_text_accessor() {
    let mut doc = XmlDocument::new();
    doc.read_from_string(SAMPLE).unwrap();
    let table = doc.children(doc.document_element().unwrap()).unwrap()[0];
    let name = doc.child_by_name(table, "name").unwrap().unwrap();
    assert_eq!(doc.text(name).unwrap(), "GEN_CONFIG_TBL");

    // Assigning creates the PCDATA child when absent
    let fresh = doc.append_element(table, "unit").unwrap();
    assert_eq!(doc.text(fresh).unwrap(), "");
    doc.set_text(fresh, "kWh").unwrap();
    assert_eq!(doc.text(fresh).unwrap(), "kWh");
    doc.set_text(fresh, "V").unwrap();
    assert_eq!(doc.text(fresh).unwrap(), "V");
    // Still a single PCDATA child
    assert_eq!(doc.children(fresh).unwrap().len(), 1);
}

#[test]
fn test_child_lookup_first_match() {
    let mut doc = XmlDocument::new();
    doc.read_from_string(SAMPLE).unwrap();
    let table = doc.children(doc.document_element().unwrap()).unwrap()[0];
    let field = doc.child_by_name(table, "field").unwrap().unwrap();
    assert_eq!(doc.get_attribute(field, "offset").unwrap(), Some("0"));
    assert!(doc.child_by_name(table, "missing").unwrap().is_none());
}

#[test]
fn test_path() {
    let mut doc = XmlDocument::new();
    doc.read_from_string(SAMPLE).unwrap();
    let table = doc.children(doc.document_element().unwrap()).unwrap()[0];
    let name = doc.child_by_name(table, "name").unwrap().unwrap();
    assert_eq!(doc.path(name).unwrap(), "/tables/table/name");

    doc.set_path_delimiter('.');
    assert_eq!(doc.path(name).unwrap(), ".tables.table.name");
}

#[test]
fn test_mutators_validate_node_kinds() {
    let mut doc = XmlDocument::new();
    let root = doc.root();
    let element = doc.append_element(root, "top").unwrap();
    let pcdata = doc.append_child(element, XmlNodeType::Pcdata).unwrap();

    // A leaf kind cannot carry children
    let err = doc.append_child(pcdata, XmlNodeType::Element).unwrap_err();
    assert_eq!(err.code(), crate::error::MErrorCode::OperationNotSupported);
    // A PCDATA node has no name
    let err = doc.set_name(pcdata, "x").unwrap_err();
    assert_eq!(err.code(), crate::error::MErrorCode::OperationNotSupported);
    // An element has no value
    let err = doc.set_value(element, "x").unwrap_err();
    assert_eq!(err.code(), crate::error::MErrorCode::OperationNotSupported);
    // Text lands on elements only
    let err = doc.set_text(pcdata, "x").unwrap_err();
    assert_eq!(err.code(), crate::error::MErrorCode::OperationNotSupported);
}

#[test]
fn test_attribute_mutation() {
    let mut doc = XmlDocument::new();
    let element = doc.append_element(doc.root(), "e").unwrap();
    doc.set_attribute(element, "a", "1").unwrap();
    doc.set_attribute(element, "b", "2").unwrap();
    doc.set_attribute(element, "a", "9").unwrap(); // replace in place
    assert_eq!(doc.all_attribute_names(element).unwrap(), ["a", "b"]);
    assert_eq!(doc.get_attribute(element, "a").unwrap(), Some("9"));

    assert!(doc.remove_attribute(element, "a").unwrap());
    assert!(!doc.remove_attribute(element, "a").unwrap());
    let err = doc.remove_existing_attribute(element, "a").unwrap_err();
    assert_eq!(err.code(), crate::error::MErrorCode::UnknownItem);
    assert!(doc.is_attribute_present(element, "b").unwrap());

    // Only elements and declarations have attributes
    let pcdata = doc.append_child(element, XmlNodeType::Pcdata).unwrap();
    assert!(doc.set_attribute(pcdata, "a", "1").is_err());
}

#[test]
fn test_write_and_reparse() {
    let mut doc = XmlDocument::new();
    doc.read_from_string(SAMPLE).unwrap();
    let text = doc.as_string().unwrap();
    assert!(text.starts_with("<?xml"));

    let mut again = XmlDocument::new();
    again.read_from_string(&text).unwrap();
    let tables = again.document_element().unwrap();
    assert_eq!(again.children(tables).unwrap().len(), 2);
    let table = again.children(tables).unwrap()[0];
    assert_eq!(again.get_attribute(table, "kind").unwrap(), Some("ST"));
    let name = again.child_by_name(table, "name").unwrap().unwrap();
    assert_eq!(again.text(name).unwrap(), "GEN_CONFIG_TBL");
}

#[test]
fn test_escapes_round_trip() {
    let mut doc = XmlDocument::new();
    let element = doc.append_element(doc.root(), "e").unwrap();
    doc.set_attribute(element, "a", "x<y&\"z\"").unwrap();
    doc.set_text(element, "1 < 2 & 3 > 2").unwrap();
    let text = doc.as_string().unwrap();

    let mut again = XmlDocument::new();
    again.read_from_string(&text).unwrap();
    let element = again.document_element().unwrap();
    assert_eq!(again.get_attribute(element, "a").unwrap(), Some("x<y&\"z\""));
    assert_eq!(again.text(element).unwrap(), "1 < 2 & 3 > 2");
}

#[test]
fn test_parse_masks() {
    let source = "<a><!-- note --><?pi data?><b>x</b></a>";

    let mut doc = XmlDocument::new();
    doc.read_from_string(source).unwrap();
    // Comments and PIs are dropped by default
    let a = doc.document_element().unwrap();
    assert_eq!(doc.children(a).unwrap().len(), 1);

    let mut doc = XmlDocument::new();
    doc.set_parse_mask(PARSE_DEFAULT | PARSE_COMMENTS | PARSE_PI);
    doc.read_from_string(source).unwrap();
    let a = doc.document_element().unwrap();
    let children = doc.children(a).unwrap().to_vec();
    assert_eq!(children.len(), 3);
    assert_eq!(doc.node_type(children[0]).unwrap(), XmlNodeType::Comment);
    assert_eq!(doc.value(children[0]).unwrap(), " note ");
    assert_eq!(doc.node_type(children[1]).unwrap(), XmlNodeType::Pi);
    assert_eq!(doc.name(children[1]).unwrap(), "pi");
}

#[test]
fn test_declaration_capture() {
    let mut doc = XmlDocument::new();
    doc.set_parse_mask(PARSE_DEFAULT | PARSE_DECLARATION);
    doc.read_from_string("<?xml version=\"1.0\" encoding=\"UTF-8\"?><a/>").unwrap();
    let first = doc.children(doc.root()).unwrap()[0];
    assert_eq!(doc.node_type(first).unwrap(), XmlNodeType::Declaration);
    assert_eq!(doc.get_attribute(first, "version").unwrap(), Some("1.0"));
    assert_eq!(doc.get_attribute(first, "encoding").unwrap(), Some("UTF-8"));
}

#[test]
fn test_bad_xml_reported() {
    let mut doc = XmlDocument::new();
    let err = doc.read_from_string("<a><b></a>").unwrap_err();
    assert_eq!(err.code(), crate::error::MErrorCode::BadFileFormat);
}

#[test]
fn test_read_heuristic_inline_vs_file() {
    // Inline XML: starts with '<' and ends with '>'
    let mut doc = XmlDocument::new();
    doc.read("  <a><b/></a>  ").unwrap();
    assert!(doc.document_element().is_some());

    // Anything else is a file name
    let mut file = tempfile::NamedTempFile::new().unwrap();
    file.write_all(b"<top><x>1</x></top>").unwrap();
    let mut doc = XmlDocument::new();
    doc.read(file.path().to_str().unwrap()).unwrap();
    let top = doc.document_element().unwrap();
    assert_eq!(doc.name(top).unwrap(), "top");

    let mut doc = XmlDocument::new();
    assert!(doc.read("no-such-file.xml").is_err());
}

#[test]
fn test_stream_round_trip() {
    let mut doc = XmlDocument::new();
    doc.read_from_string("<a><b>text</b></a>").unwrap();

    let mut stream = crate::stream::Stream::memory();
    doc.write_to_stream(&mut stream).unwrap();
    stream.set_position(0).unwrap();

    let mut again = XmlDocument::new();
    again.read_from_stream(&mut stream).unwrap();
    let a = again.document_element().unwrap();
    let b = again.child_by_name(a, "b").unwrap().unwrap();
    assert_eq!(again.text(b).unwrap(), "text");
}

#[test]
fn test_format_masks() {
    let mut doc = XmlDocument::new();
    doc.read_from_string("<a><b>x</b></a>").unwrap();

    doc.set_format_mask(FORMAT_INDENT);
    let indented = doc.as_string().unwrap();
    assert!(indented.contains("\t<b>x</b>"));

    doc.set_format_mask(FORMAT_RAW | FORMAT_NO_DECLARATION);
    let raw = doc.as_string().unwrap();
    assert_eq!(raw, "<a><b>x</b></a>");

    doc.set_format_mask(FORMAT_INDENT);
    doc.set_indentation_sequence("  ");
    assert!(doc.as_string().unwrap().contains("  <b>x</b>"));
}

#[test]
fn test_ws_pcdata_mask() {
    let source = "<a> <b/> </a>";
    let mut doc = XmlDocument::new();
    doc.read_from_string(source).unwrap();
    let a = doc.document_element().unwrap();
    assert_eq!(doc.children(a).unwrap().len(), 1); // whitespace dropped

    let mut doc = XmlDocument::new();
    doc.set_parse_mask(PARSE_DEFAULT | PARSE_WS_PCDATA);
    doc.read_from_string(source).unwrap();
    let a = doc.document_element().unwrap();
    assert_eq!(doc.children(a).unwrap().len(), 3);
}

#[test]
fn test_remove_child() {
    let mut doc = XmlDocument::new();
    doc.read_from_string("<a><b/><c/></a>").unwrap();
    let a = doc.document_element().unwrap();
    let b = doc.child_by_name(a, "b").unwrap().unwrap();
    assert!(doc.remove_child(a, b).unwrap());
    assert!(!doc.remove_child(a, b).unwrap());
    assert_eq!(doc.children(a).unwrap().len(), 1);
    assert!(doc.child_by_name(a, "b").unwrap().is_none());
}

#[test]
fn test_reflected_surface() {
    use crate::reflect::MObject;
    let mut object = XmlDocument::new();
    let obj: &mut dyn MObject = &mut object;
    obj.call1("Read", &crate::variant::Variant::from("<a><b>7</b></a>")).unwrap();
    let text = obj.get_property("AsString").unwrap().as_string().unwrap();
    assert!(text.contains("<b>7</b>"));
    assert_eq!(
        obj.get_property("NodeElement").unwrap().as_uint().unwrap(),
        XmlNodeType::Element as u32
    );
    obj.set_property("FormatMask", &crate::variant::Variant::UInt(FORMAT_RAW)).unwrap();
    assert_eq!(obj.get_property("FormatMask").unwrap().as_uint().unwrap(), FORMAT_RAW);
}
