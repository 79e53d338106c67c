//! Thin element writer over quick-xml.

use quick_xml::Writer;
use quick_xml::events::{BytesCData, BytesDecl, BytesEnd, BytesStart, BytesText, Event};

use crate::error::ExportError;

const CDATA_END: &str = "]]>";

/// Split `content` into CDATA-safe pieces: no piece contains `]]>`.
///
/// Concatenating the pieces gives back `content`.
pub(crate) fn cdata_sections(content: &str) -> Vec<&str> {
    let mut sections = Vec::new();
    let mut rest = content;
    while let Some(pos) = rest.find(CDATA_END) {
        // Cut between "]]" and ">".
        let (head, tail) = rest.split_at(pos + 2);
        sections.push(head);
        rest = tail;
    }
    sections.push(rest);
    sections
}

pub(crate) struct XmlWriter {
    inner: Writer<Vec<u8>>,
}

impl XmlWriter {
    /// Writer with two-space indentation and an XML declaration already written.
    pub(crate) fn new() -> Result<Self, ExportError> {
        let mut writer = Self {
            inner: Writer::new_with_indent(Vec::new(), b' ', 2),
        };
        writer.write(Event::Decl(BytesDecl::new("1.0", Some("UTF-8"), None)))?;
        Ok(writer)
    }

    fn write(&mut self, event: Event<'_>) -> Result<(), ExportError> {
        self.inner
            .write_event(event)
            .map_err(|e| ExportError::Xml(e.to_string()))
    }

    pub(crate) fn start(&mut self, name: &str, attributes: &[(&str, &str)]) -> Result<(), ExportError> {
        let element = BytesStart::new(name).with_attributes(attributes.iter().copied());
        self.write(Event::Start(element))
    }

    pub(crate) fn end(&mut self, name: &str) -> Result<(), ExportError> {
        self.write(Event::End(BytesEnd::new(name)))
    }

    /// `<name>text</name>` with `text` escaped.
    pub(crate) fn text_element(&mut self, name: &str, text: &str) -> Result<(), ExportError> {
        self.start(name, &[])?;
        self.write(Event::Text(BytesText::new(text)))?;
        self.end(name)
    }

    /// `<text>` element holding `content` as CDATA.
    pub(crate) fn cdata_text(&mut self, content: &str) -> Result<(), ExportError> {
        self.start("text", &[])?;
        for section in cdata_sections(content) {
            self.write(Event::CData(BytesCData::new(section)))?;
        }
        self.end("text")
    }

    pub(crate) fn finish(self) -> Result<String, ExportError> {
        String::from_utf8(self.inner.into_inner()).map_err(|e| ExportError::Xml(e.to_string()))
    }
}
