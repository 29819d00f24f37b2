//! Path lookups over a parsed record.
//!
//! A path is a `/`-separated list of element local names, optionally ending
//! in `@attribute`. `.` stays on the current node and `*` matches any child
//! element. Namespace prefixes are ignored, so `format/provides/entry/@name`
//! matches `<rpm:provides><rpm:entry name=".."/></rpm:provides>`.

use roxmltree::Node;

/// One node selected by a path.
#[derive(Clone, Copy, Debug)]
pub enum Selection<'a, 'input> {
    Element(Node<'a, 'input>),
    Attribute(&'a str),
}

impl Selection<'_, '_> {
    /// Text content of an element or the value of an attribute.
    pub fn value(&self) -> String {
        match self {
            Selection::Element(node) => text_content(*node),
            Selection::Attribute(value) => (*value).to_string(),
        }
    }
}

pub fn select<'a, 'input>(node: Node<'a, 'input>, path: &str) -> Vec<Selection<'a, 'input>> {
    let mut current = vec![node];
    let mut steps = path.split('/').filter(|step| !step.is_empty()).peekable();

    while let Some(step) = steps.next() {
        if let Some(name) = step.strip_prefix('@') {
            if steps.peek().is_some() {
                return Vec::new();
            }
            return current
                .iter()
                .filter_map(|node| attribute(*node, name))
                .map(Selection::Attribute)
                .collect();
        }

        if step == "." {
            continue;
        }

        current = current
            .iter()
            .flat_map(|node| node.children())
            .filter(|child| child.is_element() && (step == "*" || child.tag_name().name() == step))
            .collect();
    }

    current.into_iter().map(Selection::Element).collect()
}

/// Elements selected by `path`; attribute steps select nothing.
pub fn elements<'a, 'input>(node: Node<'a, 'input>, path: &str) -> Vec<Node<'a, 'input>> {
    select(node, path)
        .into_iter()
        .filter_map(|selection| {
            match selection {
                Selection::Element(node) => Some(node),
                Selection::Attribute(_) => None,
            }
        })
        .collect()
}

/// The value of every selected node, in document order.
pub fn values(node: Node<'_, '_>, path: &str) -> Vec<String> {
    select(node, path).iter().map(Selection::value).collect()
}

/// The values of every selected node concatenated; empty when nothing matches.
pub fn text(node: Node<'_, '_>, path: &str) -> String {
    select(node, path).iter().map(Selection::value).collect()
}

/// Concatenated text of all descendant text nodes.
pub fn text_content(node: Node<'_, '_>) -> String {
    node.descendants()
        .filter(|n| n.is_text())
        .filter_map(|n| n.text())
        .collect()
}

fn attribute<'a>(node: Node<'a, '_>, name: &str) -> Option<&'a str> {
    node.attributes()
        .find(|attr| attr.name() == name)
        .map(|attr| attr.value())
}

#[cfg(test)]
mod tests {
    use roxmltree::Document;

    use super::*;

    const XML: &str = r#"<package xmlns="urn:common" xmlns:rpm="urn:rpm" type="rpm">
  <name>readline</name>
  <version epoch="0" ver="6.0" rel="3.el6"/>
  <description>line one
line <b>two</b></description>
  <format>
    <rpm:provides>
      <rpm:entry name="readline"/>
      <rpm:entry name="libreadline.so.6"/>
    </rpm:provides>
    <rpm:requires/>
  </format>
</package>"#;

    #[test]
    fn test_element_text() {
        let doc = Document::parse(XML).unwrap();
        let root = doc.root_element();

        assert_eq!(text(root, "name"), "readline");
        assert_eq!(text(root, "description"), "line one\nline two");
    }

    #[test]
    fn test_attributes() {
        let doc = Document::parse(XML).unwrap();
        let root = doc.root_element();

        assert_eq!(text(root, "@type"), "rpm");
        assert_eq!(text(root, "version/@ver"), "6.0");
        assert_eq!(text(root, "./version/@rel"), "3.el6");
    }

    #[test]
    fn test_prefixed_elements_match_by_local_name() {
        let doc = Document::parse(XML).unwrap();
        let root = doc.root_element();

        assert_eq!(
            values(root, "format/provides/entry/@name"),
            vec!["readline", "libreadline.so.6"]
        );
        assert_eq!(elements(root, "format/*").len(), 2);
    }

    #[test]
    fn test_missing_path_is_empty() {
        let doc = Document::parse(XML).unwrap();
        let root = doc.root_element();

        assert!(values(root, "format/requires/entry/@name").is_empty());
        assert_eq!(text(root, "packager"), "");
        assert_eq!(text(root, "version/@missing"), "");
        assert!(select(root, "@type/name").is_empty());
    }
}
