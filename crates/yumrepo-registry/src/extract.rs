//! Forward-only extraction of record fragments from a metadata document.
//!
//! Only one pass is made over the decompressed bytes. Each element whose local
//! name matches the record tag is cut out verbatim, together with the namespace
//! declarations in scope at that point, and parsed later only when a field is
//! first read.

use std::{fmt::Display, sync::Arc};

use quick_xml::{
    events::{BytesStart, Event},
    name::QName,
    Reader,
};
use roxmltree::{Document, Node};

use crate::error::{RegistryError, Result};

/// The verbatim markup of one record.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RecordFragment {
    xml: String,
    scope: Arc<str>,
}

impl RecordFragment {
    pub fn new<S: Into<String>>(xml: S) -> Self {
        Self::with_scope(xml, Arc::from(""))
    }

    /// `scope` holds ` xmlns..="..."` declarations inherited from ancestors.
    pub fn with_scope<S: Into<String>>(xml: S, scope: Arc<str>) -> Self {
        Self {
            xml: xml.into(),
            scope,
        }
    }

    pub fn as_str(&self) -> &str {
        &self.xml
    }

    pub fn namespace_scope(&self) -> &str {
        &self.scope
    }

    /// Parses the fragment and hands its root element to `visit`.
    pub fn view<T, F>(&self, visit: F) -> std::result::Result<T, roxmltree::Error>
    where
        F: FnOnce(Node<'_, '_>) -> T,
    {
        if self.scope.is_empty() {
            let doc = Document::parse(&self.xml)?;
            return Ok(visit(doc.root_element()));
        }

        let wrapped = format!("<scope{}>{}</scope>", self.scope, self.xml);
        let doc = Document::parse(&wrapped)?;
        let root = doc.root_element();
        Ok(visit(root.first_element_child().unwrap_or(root)))
    }
}

/// Iterator over the record fragments of one document.
pub struct StreamingRecordExtractor<'i> {
    reader: Reader<&'i [u8]>,
    input: &'i [u8],
    tag: Vec<u8>,
    document: String,
    namespaces: Vec<Vec<(String, String)>>,
    scope: Option<Arc<str>>,
    root_closed: bool,
    done: bool,
}

impl<'i> StreamingRecordExtractor<'i> {
    pub fn new(input: &'i [u8], tag: &str) -> Self {
        Self {
            reader: Reader::from_reader(input),
            input,
            tag: tag.as_bytes().to_vec(),
            document: "metadata".to_string(),
            namespaces: Vec::new(),
            scope: None,
            root_closed: false,
            done: false,
        }
    }

    /// Name used for the document in parse errors.
    pub fn with_document<S: Into<String>>(mut self, document: S) -> Self {
        self.document = document.into();
        self
    }

    fn byte_offset(&self) -> usize {
        self.reader.buffer_position() as usize
    }

    /// Offset of the `<` that opened the element just read.
    fn tag_start(&self) -> usize {
        let end = self.byte_offset().min(self.input.len());
        self.input[..end]
            .iter()
            .rposition(|&b| b == b'<')
            .unwrap_or(0)
    }

    fn fragment(&mut self, begin: usize, end: usize) -> Result<RecordFragment> {
        let input = self.input;
        let end = end.min(input.len());
        let xml = std::str::from_utf8(&input[begin..end])
            .map_err(|err| RegistryError::parse(&self.document, err))?;
        Ok(RecordFragment::with_scope(xml, self.current_scope()))
    }

    fn current_scope(&mut self) -> Arc<str> {
        if let Some(scope) = &self.scope {
            return scope.clone();
        }

        let mut declared: Vec<&(String, String)> = Vec::new();
        for decl in self.namespaces.iter().flatten() {
            match declared.iter_mut().find(|slot| slot.0 == decl.0) {
                Some(slot) => *slot = decl,
                None => declared.push(decl),
            }
        }

        let scope: Arc<str> = declared
            .iter()
            .map(|(key, value)| format!(" {key}=\"{value}\""))
            .collect::<String>()
            .into();
        self.scope = Some(scope.clone());
        scope
    }

    fn push_namespaces(&mut self, start: &BytesStart<'_>) {
        let decls: Vec<(String, String)> = start
            .attributes()
            .flatten()
            .filter(|attr| {
                let key = attr.key.as_ref();
                key == b"xmlns" || key.starts_with(b"xmlns:")
            })
            .map(|attr| {
                (
                    String::from_utf8_lossy(attr.key.as_ref()).into_owned(),
                    String::from_utf8_lossy(&attr.value).into_owned(),
                )
            })
            .collect();

        if !decls.is_empty() {
            self.scope = None;
        }
        self.namespaces.push(decls);
    }

    fn pop_namespaces(&mut self) {
        if self.namespaces.pop().is_some_and(|decls| !decls.is_empty()) {
            self.scope = None;
        }
    }

    fn fail<D: Display>(&mut self, reason: D) -> Option<Result<RecordFragment>> {
        self.done = true;
        let reason = format!("{reason} at byte {}", self.byte_offset());
        Some(Err(RegistryError::parse(&self.document, reason)))
    }

    /// Marks the root as closed once no element is open anymore.
    fn close_if_top_level(&mut self) {
        if self.namespaces.is_empty() {
            self.root_closed = true;
        }
    }
}

impl Iterator for StreamingRecordExtractor<'_> {
    type Item = Result<RecordFragment>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.done {
            return None;
        }

        loop {
            let event = match self.reader.read_event() {
                Ok(event) => event,
                Err(err) => return self.fail(err),
            };

            if self.root_closed && matches!(event, Event::Start(_) | Event::Empty(_)) {
                return self.fail("content after the root element");
            }

            match event {
                Event::Start(start) if start.local_name().as_ref() == self.tag.as_slice() => {
                    let begin = self.tag_start();
                    let name = start.name().as_ref().to_vec();
                    // Consumes the whole subtree, so nested elements with the
                    // same name belong to this record and its end tag is never
                    // seen by this loop.
                    if let Err(err) = self.reader.read_to_end(QName(&name)) {
                        return self.fail(err);
                    }
                    let end = self.byte_offset();
                    self.close_if_top_level();
                    return Some(self.fragment(begin, end));
                }
                Event::Empty(start) if start.local_name().as_ref() == self.tag.as_slice() => {
                    let begin = self.tag_start();
                    let end = self.byte_offset();
                    self.close_if_top_level();
                    return Some(self.fragment(begin, end));
                }
                Event::Start(start) => self.push_namespaces(&start),
                Event::Empty(_) => self.close_if_top_level(),
                Event::End(_) => {
                    self.pop_namespaces();
                    self.close_if_top_level();
                }
                // quick-xml does not report elements left open at the end.
                Event::Eof if !self.namespaces.is_empty() => {
                    return self.fail("unexpected end of document");
                }
                Event::Eof => {
                    self.done = true;
                    return None;
                }
                _ => {}
            }
        }
    }
}

/// Collects every `tag` fragment of `input`.
pub fn extract(input: &[u8], tag: &str) -> Result<Vec<RecordFragment>> {
    StreamingRecordExtractor::new(input, tag).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::query;

    #[test]
    fn test_extracts_fragments_in_order() {
        let xml = br#"<metadata packages="2"><package><name>a</name></package>
<package><name>b</name></package></metadata>"#;

        let fragments = extract(xml, "package").unwrap();
        assert_eq!(fragments.len(), 2);
        assert_eq!(fragments[0].as_str(), "<package><name>a</name></package>");
        assert_eq!(fragments[1].as_str(), "<package><name>b</name></package>");
    }

    #[test]
    fn test_nested_same_name_is_not_emitted_twice() {
        let xml = br#"<metadata>
<package><name>outer</name><package><name>inner</name></package></package>
<package><name>next</name></package>
</metadata>"#;

        let fragments = extract(xml, "package").unwrap();
        assert_eq!(fragments.len(), 2);
        assert!(fragments[0].as_str().contains("<name>inner</name>"));
        assert!(fragments[0].as_str().ends_with("</package></package>"));
        assert_eq!(fragments[1].as_str(), "<package><name>next</name></package>");
    }

    #[test]
    fn test_empty_element_is_a_record() {
        let xml = br#"<otherdata><package name="a"/><package name="b"></package></otherdata>"#;

        let fragments = extract(xml, "package").unwrap();
        assert_eq!(fragments.len(), 2);
        assert_eq!(fragments[0].as_str(), r#"<package name="a"/>"#);
    }

    #[test]
    fn test_fragment_carries_namespace_scope() {
        let xml = br#"<metadata xmlns="urn:common" xmlns:rpm="urn:rpm">
<package><format><rpm:license>GPLv3+</rpm:license></format></package>
</metadata>"#;

        let fragments = extract(xml, "package").unwrap();
        assert_eq!(
            fragments[0].namespace_scope(),
            r#" xmlns="urn:common" xmlns:rpm="urn:rpm""#
        );

        let license = fragments[0]
            .view(|node| query::text(node, "format/license"))
            .unwrap();
        assert_eq!(license, "GPLv3+");
    }

    #[test]
    fn test_no_matches() {
        let fragments = extract(b"<metadata packages=\"0\"/>", "package").unwrap();
        assert!(fragments.is_empty());

        let fragments = extract(b"", "package").unwrap();
        assert!(fragments.is_empty());
    }

    #[test]
    fn test_malformed_document() {
        let xml = b"<metadata><package><name>a</name></metadata>";

        let result = StreamingRecordExtractor::new(xml, "package")
            .with_document("primary.xml.gz")
            .collect::<Result<Vec<_>>>();
        assert!(matches!(
            result,
            Err(RegistryError::MetadataParse { document, .. }) if document == "primary.xml.gz"
        ));
    }

    #[test]
    fn test_truncated_between_records() {
        let xml = b"<metadata packages=\"3\"><package><name>a</name></package><package><name>b</name></package>";

        let mut records = StreamingRecordExtractor::new(xml, "package").with_document("primary.xml.gz");
        assert!(records.next().is_some_and(|r| r.is_ok()));
        assert!(records.next().is_some_and(|r| r.is_ok()));
        assert!(matches!(
            records.next(),
            Some(Err(RegistryError::MetadataParse { document, .. })) if document == "primary.xml.gz"
        ));
        assert!(records.next().is_none());
    }

    #[test]
    fn test_content_after_root() {
        let xml = b"<metadata><package><name>a</name></package></metadata><package><name>junk</name></package>";

        let result = extract(xml, "package");
        assert!(matches!(result, Err(RegistryError::MetadataParse { .. })));
    }

    #[test]
    fn test_second_root_after_empty_root() {
        let xml = b"<metadata packages=\"0\"/><metadata><package/></metadata>";

        assert!(extract(xml, "package").is_err());
    }
}
