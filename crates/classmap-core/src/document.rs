//! Graph documents and the JSON writer

use std::collections::HashSet;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::{AnalysisError, Result};

/// A node of a view document.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct GraphNode {
    pub id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub short_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub long_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub hover_name: Option<String>,
    #[serde(rename = "type")]
    pub node_type: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub parent: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reference: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub filename: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// Presentation tags.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub classes: Vec<String>,
}

impl GraphNode {
    pub fn new(id: impl Into<String>, node_type: impl Into<String>) -> Self {
        GraphNode {
            id: id.into(),
            node_type: node_type.into(),
            ..Default::default()
        }
    }

    pub fn tag(&mut self, tag: impl Into<String>) {
        self.classes.push(tag.into());
    }

    pub fn has_tag(&self, tag: &str) -> bool {
        self.classes.iter().any(|c| c == tag)
    }
}

/// A directed edge of a view document.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct GraphEdge {
    pub source: String,
    pub target: String,
    #[serde(rename = "type")]
    pub edge_type: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub classes: Vec<String>,
}

impl GraphEdge {
    pub fn new(source: impl Into<String>, target: impl Into<String>, edge_type: impl Into<String>) -> Self {
        GraphEdge {
            source: source.into(),
            target: target.into(),
            edge_type: edge_type.into(),
            ..Default::default()
        }
    }

    pub fn tag(&mut self, tag: impl Into<String>) {
        self.classes.push(tag.into());
    }

    pub fn has_tag(&self, tag: &str) -> bool {
        self.classes.iter().any(|c| c == tag)
    }
}

/// `{title?, nodes, edges}`. Nodes are unique by id; the first one added
/// for an id is kept.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct GraphDocument {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    pub nodes: Vec<GraphNode>,
    pub edges: Vec<GraphEdge>,
    #[serde(skip)]
    node_ids: HashSet<String>,
}

impl GraphDocument {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_title(title: impl Into<String>) -> Self {
        GraphDocument {
            title: Some(title.into()),
            ..Default::default()
        }
    }

    /// Add a node unless one with the same id is already present.
    pub fn add_node(&mut self, node: GraphNode) -> bool {
        if !self.node_ids.insert(node.id.clone()) {
            return false;
        }
        self.nodes.push(node);
        true
    }

    pub fn add_edge(&mut self, edge: GraphEdge) {
        self.edges.push(edge);
    }

    pub fn contains_node(&self, id: &str) -> bool {
        self.node_ids.contains(id) || self.nodes.iter().any(|n| n.id == id)
    }

    pub fn node(&self, id: &str) -> Option<&GraphNode> {
        self.nodes.iter().find(|n| n.id == id)
    }

    pub fn edges_between<'a>(&'a self, source: &'a str, target: &'a str) -> impl Iterator<Item = &'a GraphEdge> {
        self.edges
            .iter()
            .filter(move |e| e.source == source && e.target == target)
    }

    pub fn to_json(&self, pretty: bool) -> serde_json::Result<String> {
        if pretty {
            serde_json::to_string_pretty(self)
        } else {
            serde_json::to_string(self)
        }
    }
}

/// A document together with the file stem it is written under.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NamedView {
    pub name: String,
    pub document: GraphDocument,
}

/// Path a view named `name` is written to inside `dir`.
pub fn view_path(dir: &Path, name: &str) -> PathBuf {
    dir.join(format!("{name}.json"))
}

/// Write each view to `<dir>/<name>.json`, creating `dir` if needed.
/// Returns the number of files written.
pub fn write_views(views: &[NamedView], dir: &Path, pretty: bool) -> Result<usize> {
    std::fs::create_dir_all(dir).map_err(|source| AnalysisError::Write {
        path: dir.to_path_buf(),
        source,
    })?;

    for view in views {
        let json = view.document.to_json(pretty).map_err(|source| AnalysisError::Serialize {
            name: view.name.clone(),
            source,
        })?;
        let path = view_path(dir, &view.name);
        std::fs::write(&path, json).map_err(|source| AnalysisError::Write {
            path: path.clone(),
            source,
        })?;
        tracing::debug!("Wrote {}", path.display());
    }

    tracing::info!("Wrote {} views to {}", views.len(), dir.display());
    Ok(views.len())
}
