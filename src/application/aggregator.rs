use crate::domain::document::{ParsedDocument, find_element, find_element_mut, tags};
use crate::domain::ports::Clock;
use crate::error::{EngineError, Result};
use std::collections::BTreeMap;
use uuid::Uuid;
use xmltree::{EmitterConfig, Element, XMLNode};

const XML_NAMESPACE: &str = "http://www.w3.org/XML/1998/namespace";
const XMLNS_NAMESPACE: &str = "http://www.w3.org/2000/xmlns/";

/// The merged document being built for one batch.
///
/// The first accepted document becomes the envelope. Every later one
/// contributes the children of its header and of its body container, in
/// acceptance order.
#[derive(Debug, Default)]
pub struct TargetDocument {
    root: Option<Element>,
    merged: usize,
}

impl TargetDocument {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of documents merged so far.
    pub fn len(&self) -> usize {
        self.merged
    }

    pub fn is_empty(&self) -> bool {
        self.merged == 0
    }

    pub fn root(&self) -> Option<&Element> {
        self.root.as_ref()
    }

    pub fn accept(&mut self, document: ParsedDocument) -> Result<()> {
        let file = document.file_name();
        let Some(target) = self.root.as_mut() else {
            self.root = Some(document.into_root());
            self.merged = 1;
            tracing::debug!(file = %file, "envelope taken from first document");
            return Ok(());
        };

        for tag in [tags::BS_HEAD, tags::DOCUMENTS] {
            if find_element(target, tag).is_none() {
                return Err(EngineError::MergeError(format!(
                    "merged document has no {tag} element"
                )));
            }
        }

        let mut source = document.into_root();
        let head = take_children(&mut source, tags::BS_HEAD, &file)?;
        let body = take_children(&mut source, tags::DOCUMENTS, &file)?;
        tracing::debug!(
            file = %file,
            head = head.len(),
            body = body.len(),
            "appending document fragments"
        );

        append_children(target, tags::BS_HEAD, head)?;
        append_children(target, tags::DOCUMENTS, body)?;
        self.merged += 1;
        Ok(())
    }

    /// Stamps the envelope with a fresh message id and the clock's time, then
    /// normalizes the tree.
    pub fn finalize(&mut self, clock: &dyn Clock, timestamp_format: &str) -> Result<()> {
        let root = self
            .root
            .as_mut()
            .ok_or_else(|| EngineError::MergeError("no documents were merged".to_string()))?;
        let envelope = find_element_mut(root, tags::BS_MESSAGE).ok_or_else(|| {
            EngineError::MergeError(format!("merged document has no {} element", tags::BS_MESSAGE))
        })?;
        envelope
            .attributes
            .insert(tags::ID.to_string(), Uuid::new_v4().to_string());
        envelope.attributes.insert(
            tags::DATE_TIME.to_string(),
            clock.now().format(timestamp_format).to_string(),
        );

        normalize(root, &BTreeMap::new());
        Ok(())
    }

    /// Indented XML with a declaration.
    pub fn serialize(&self) -> Result<Vec<u8>> {
        let root = self
            .root
            .as_ref()
            .ok_or_else(|| EngineError::MergeError("no documents were merged".to_string()))?;
        let mut bytes = Vec::new();
        root.write_with_config(&mut bytes, EmitterConfig::new().perform_indent(true))
            .map_err(|e| EngineError::XmlError(e.to_string()))?;
        Ok(bytes)
    }
}

fn take_children(root: &mut Element, tag: &str, file: &str) -> Result<Vec<XMLNode>> {
    find_element_mut(root, tag)
        .map(|element| std::mem::take(&mut element.children))
        .ok_or_else(|| EngineError::MergeError(format!("{file} has no {tag} element")))
}

fn append_children(root: &mut Element, tag: &str, children: Vec<XMLNode>) -> Result<()> {
    let container = find_element_mut(root, tag).ok_or_else(|| {
        EngineError::MergeError(format!("merged document has no {tag} element"))
    })?;
    container.children.extend(children);
    Ok(())
}

fn is_predefined(prefix: &str, uri: &str) -> bool {
    matches!(
        (prefix, uri),
        ("xml", XML_NAMESPACE) | ("xmlns", XMLNS_NAMESPACE) | ("", "")
    )
}

/// Merges adjacent text nodes, drops blank text between elements and removes
/// namespace bindings already in scope.
fn normalize(element: &mut Element, in_scope: &BTreeMap<String, String>) {
    let mut scope = in_scope.clone();
    if let Some(namespaces) = element.namespaces.as_mut() {
        namespaces
            .0
            .retain(|prefix, uri| !is_predefined(prefix, uri) && in_scope.get(prefix) != Some(&*uri));
        scope.extend(
            namespaces
                .0
                .iter()
                .map(|(prefix, uri)| (prefix.clone(), uri.clone())),
        );
        if namespaces.0.is_empty() {
            element.namespaces = None;
        }
    }

    let has_elements = element
        .children
        .iter()
        .any(|child| matches!(child, XMLNode::Element(_)));
    let mut children: Vec<XMLNode> = Vec::with_capacity(element.children.len());
    for child in std::mem::take(&mut element.children) {
        match child {
            XMLNode::Text(text) => {
                if let Some(XMLNode::Text(previous)) = children.last_mut() {
                    previous.push_str(&text);
                } else {
                    children.push(XMLNode::Text(text));
                }
            }
            XMLNode::Element(mut nested) => {
                normalize(&mut nested, &scope);
                children.push(XMLNode::Element(nested));
            }
            other => children.push(other),
        }
    }
    children.retain(|child| match child {
        XMLNode::Text(text) => !(text.is_empty() || (has_elements && text.trim().is_empty())),
        _ => true,
    });
    element.children = children;
}
