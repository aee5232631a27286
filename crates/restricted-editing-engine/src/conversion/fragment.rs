use std::collections::HashMap;

use crate::editing::Marker;

/// Node of a model fragment produced by upcasting
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ModelNode {
    Text(String),
    /// Separator between two blocks
    BlockBreak,
    /// Zero-width placeholder for one end of a marker.
    ///
    /// The first placeholder with a given name is the start boundary, the
    /// second is the end boundary.
    MarkerBoundary { name: String },
}

/// Converted content before it is inserted into a document.
///
/// Positions inside a fragment are node indexes, so boundary placeholders
/// take up a position of their own until they are extracted.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ModelFragment {
    pub nodes: Vec<ModelNode>,
}

/// Plain text plus the markers that were bracketed by placeholders, with
/// ranges relative to the start of `text`
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ExtractedContent {
    pub text: String,
    pub markers: Vec<Marker>,
}

impl ModelFragment {
    /// Remove boundary placeholders, turning each start/end pair into a
    /// marker range over the remaining text.
    ///
    /// Markers are returned in the order their end boundary appears. A
    /// placeholder without a partner is dropped.
    pub fn extract(&self) -> ExtractedContent {
        let mut text = String::new();
        let mut markers = Vec::new();
        let mut open: HashMap<&str, usize> = HashMap::new();

        for node in &self.nodes {
            match node {
                ModelNode::Text(chunk) => text.push_str(chunk),
                ModelNode::BlockBreak => text.push('\n'),
                ModelNode::MarkerBoundary { name } => match open.remove(name.as_str()) {
                    Some(start) => markers.push(Marker {
                        name: name.clone(),
                        range: start..text.len(),
                    }),
                    None => {
                        open.insert(name.as_str(), text.len());
                    }
                },
            }
        }

        for name in open.keys() {
            log::warn!("dropping marker boundary `{name}` without a matching end");
        }

        ExtractedContent { text, markers }
    }
}
