use crate::error::{EngineError, Result};
use std::path::{Path, PathBuf};
use xmltree::{Element, XMLNode};

/// Element and attribute names of the payment document vocabulary.
pub mod tags {
    pub const BS_MESSAGE: &str = "BSMessage";
    pub const BS_HEAD: &str = "BSHead";
    pub const DOCUMENTS: &str = "Documents";
    pub const ID: &str = "ID";
    pub const DATE_TIME: &str = "DateTime";
    pub const PAYER: &str = "Payer";
    pub const AMOUNT: &str = "Amount";
    pub const CURR_CODE: &str = "CurrCode";
    pub const IP: &str = "IP";
    pub const DOCUMENT_DATE: &str = "DocumentDate";
    pub const CODE_REV: &str = "CodeRev";
    pub const PAY_TYPE_PARAM: &str = "PayTypeParam";
    pub const PAY_GRND_PARAM: &str = "PayGrndParam";
    pub const DOC_REF: &str = "DocRef";
}

/// A payment document parsed from one source file.
///
/// The source path is the document's identity in diagnostics and audit events.
/// The raw bytes are kept for schema validation.
#[derive(Debug, Clone, PartialEq)]
pub struct ParsedDocument {
    source: PathBuf,
    raw: Vec<u8>,
    root: Element,
}

impl ParsedDocument {
    /// Parses raw XML bytes read from `source`.
    pub fn parse(source: impl Into<PathBuf>, bytes: &[u8]) -> Result<Self> {
        let root = Element::parse(bytes).map_err(|e| EngineError::XmlError(e.to_string()))?;
        Ok(Self {
            source: source.into(),
            raw: bytes.to_vec(),
            root,
        })
    }

    pub fn source(&self) -> &Path {
        &self.source
    }

    /// File name of the source, used in user-facing messages.
    pub fn file_name(&self) -> String {
        file_name_of(&self.source)
    }

    pub fn raw(&self) -> &[u8] {
        &self.raw
    }

    pub fn root(&self) -> &Element {
        &self.root
    }

    pub fn into_root(self) -> Element {
        self.root
    }

    /// Trimmed text of the first element named `tag`, in document order.
    pub fn value_of(&self, tag: &str) -> Option<String> {
        find_element(&self.root, tag)
            .and_then(|element| element.get_text())
            .map(|text| text.trim().to_string())
    }

    /// Trimmed texts of every element named `tag` inside the body container,
    /// in document order.
    pub fn body_values_of(&self, tag: &str) -> Vec<String> {
        find_element(&self.root, tags::DOCUMENTS)
            .map(|body| values_of(body, tag))
            .unwrap_or_default()
    }
}

/// Trimmed texts of every element named `tag` under `element`, depth-first.
pub fn values_of(element: &Element, tag: &str) -> Vec<String> {
    let mut values = Vec::new();
    collect_values(element, tag, &mut values);
    values
}

fn collect_values(element: &Element, tag: &str, values: &mut Vec<String>) {
    if element.name == tag {
        if let Some(text) = element.get_text() {
            values.push(text.trim().to_string());
        }
        return;
    }
    for child in &element.children {
        if let XMLNode::Element(child) = child {
            collect_values(child, tag, values);
        }
    }
}

pub fn file_name_of(path: &Path) -> String {
    path.file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string())
}

/// Depth-first search for the first element with the given local name,
/// starting at (and including) `element`.
pub fn find_element<'a>(element: &'a Element, name: &str) -> Option<&'a Element> {
    if element.name == name {
        return Some(element);
    }
    element.children.iter().find_map(|child| match child {
        XMLNode::Element(child) => find_element(child, name),
        _ => None,
    })
}

pub fn find_element_mut<'a>(element: &'a mut Element, name: &str) -> Option<&'a mut Element> {
    if element.name == name {
        return Some(element);
    }
    for child in element.children.iter_mut() {
        if let XMLNode::Element(child) = child
            && let Some(found) = find_element_mut(child, name)
        {
            return Some(found);
        }
    }
    None
}
