//! Projection of the symbol table into view documents
//!
//! Three projections are produced: one global document, one ego-graph per
//! class, and an internal/external pair per namespace. Every projection walks
//! the arenas in insertion order, so output is stable across runs.

use std::collections::{BTreeSet, HashSet};

use petgraph::graphmap::DiGraphMap;
use petgraph::visit::Dfs;

use crate::document::{GraphDocument, GraphEdge, GraphNode, NamedView};
use crate::model::{ClassEntry, Connection, ConnectionKind, MemberUsage, Method, UsageKind};
use crate::symbols::{SymbolTable, SEPARATOR};

/// Id of the focal node in a per-class view.
pub const FOCAL_NODE: &str = "class";

const PREFIX_LIMIT: usize = 50;
const PARAMS_LIMIT: usize = 30;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ViewOptions {
    /// File stem of the global view.
    pub global_name: String,
    pub classes: bool,
    pub namespaces: bool,
    /// Leave utility classes out of the global and namespace views.
    pub hide_utility: bool,
}

impl Default for ViewOptions {
    fn default() -> Self {
        ViewOptions {
            global_name: "classes".to_string(),
            classes: true,
            namespaces: true,
            hide_utility: false,
        }
    }
}

/// `namespace` followed by the id with every `::` written as `_1_1`.
pub fn namespace_reference(id: &str) -> String {
    format!("namespace{}", id.replace(SEPARATOR, "_1_1"))
}

/// The export's reference id, or one derived from the qualified name when
/// the export did not supply it.
pub fn class_reference(class: &ClassEntry) -> String {
    if class.reference.is_empty() {
        format!("class{}", class.id.replace(SEPARATOR, "_1_1"))
    } else {
        class.reference.clone()
    }
}

/// Build every view enabled in `options`.
pub fn build_views(table: &SymbolTable, options: &ViewOptions) -> Vec<NamedView> {
    let mut views = vec![NamedView {
        name: options.global_name.clone(),
        document: global_view(table, options.hide_utility),
    }];

    if options.classes {
        for class in table.classes.values() {
            views.push(NamedView {
                name: class_reference(class),
                document: class_view(table, class),
            });
        }
    }

    if options.namespaces {
        let tree = NamespaceTree::new(table);
        for id in table.namespaces.keys() {
            let reference = namespace_reference(id);
            let (internal, external) = namespace_views(table, &tree, id, options.hide_utility);
            views.push(NamedView {
                name: format!("{reference}_internal"),
                document: internal,
            });
            views.push(NamedView {
                name: format!("{reference}_external"),
                document: external,
            });
        }
    }

    tracing::info!("Built {} views", views.len());
    views
}

// ── Node and edge rendering ────────────────────────────────

fn non_empty(text: &str) -> Option<String> {
    Some(text).filter(|t| !t.is_empty()).map(str::to_string)
}

fn namespace_node(table: &SymbolTable, id: &str, present: &dyn Fn(&str) -> bool) -> GraphNode {
    let mut node = GraphNode::new(id, "namespace");
    if let Some(namespace) = table.namespace(id) {
        node.short_name = Some(namespace.name.clone());
        node.parent = namespace.parent_id.clone().filter(|p| present(p.as_str()));
    }
    node.long_name = Some(id.to_string());
    node
}

fn class_node(class: &ClassEntry, node_type: &str) -> GraphNode {
    let mut node = GraphNode::new(&class.id, node_type);
    node.short_name = Some(class.name.clone());
    node.long_name = Some(class.id.clone());
    node.reference = Some(class_reference(class));
    node.filename = non_empty(&class.file);
    node.description = non_empty(&class.description);
    if class.is_hidden() {
        node.tag("utility");
    }
    node
}

/// Class node of the global and namespace views, anchored to its namespace
/// when that namespace is part of the document.
fn placed_class_node(class: &ClassEntry, present: &dyn Fn(&str) -> bool) -> GraphNode {
    let mut node = class_node(class, class.kind.as_str());
    node.parent = class.namespace_id.clone().filter(|n| present(n.as_str()));
    node
}

fn connection_edge(source: &str, connection: &Connection) -> GraphEdge {
    let edge_type = match connection.kind {
        ConnectionKind::MemberItem => "member",
        _ => "derives",
    };
    let mut edge = GraphEdge::new(source, &connection.target_id, edge_type);
    edge.description = non_empty(&connection.code);

    let direct = match connection.kind {
        ConnectionKind::DirectInheritance => true,
        ConnectionKind::IndirectInheritance => false,
        ConnectionKind::MemberItem => !connection.template_argument,
    };
    edge.tag(if direct { "direct" } else { "indirect" });
    if connection.is_virtual {
        edge.tag("virtual");
    }
    edge.tag(connection.protection.as_str());
    if connection.inferred {
        edge.tag("inferred");
    }
    edge
}

/// Rendered signature of a method: the possibly shortened form and the full
/// one.
pub fn method_signature(method: &Method) -> (String, String) {
    let mut prefix = format!("{} ", method.protection.as_str());
    if method.is_virtual {
        prefix.push_str("virtual ");
    }
    if !method.return_type.is_empty() {
        prefix.push_str(&method.return_type);
        prefix.push(' ');
    }
    prefix.push_str(&method.name);
    prefix.push('(');

    let params = method
        .params
        .iter()
        .map(|p| format!("{} {}", p.type_name, p.name))
        .collect::<Vec<_>>()
        .join(", ");

    let mut suffix = String::from(")");
    if method.is_const {
        suffix.push_str(" const");
    }
    if method.has_override_keyword {
        suffix.push_str(" override");
    }

    let shown = if params.is_empty() {
        String::new()
    } else if prefix.chars().count() >= PREFIX_LIMIT {
        "...".to_string()
    } else if params.chars().count() > PARAMS_LIMIT {
        let head: String = params.chars().take(PARAMS_LIMIT).collect();
        format!("{head}...")
    } else {
        params.clone()
    };

    (
        format!("{prefix}{shown}{suffix}"),
        format!("{prefix}{params}{suffix}"),
    )
}

fn method_node(class: &ClassEntry, method: &Method) -> GraphNode {
    let (long_name, hover_name) = method_signature(method);
    let mut node = GraphNode::new(&method.id, "method");
    node.short_name = Some(method.name.clone());
    node.long_name = Some(long_name);
    node.hover_name = Some(hover_name);
    node.parent = Some(FOCAL_NODE.to_string());
    node.description = non_empty(&method.brief_description);

    node.tag(method.protection.as_str());
    if method.name == class.name {
        node.tag("constructor");
    } else if method.name.starts_with('~') {
        node.tag("destructor");
    } else if method.name.contains("operator") {
        node.tag("operator");
    }
    if method.is_const {
        node.tag("const");
    }
    if method.is_virtual {
        node.tag("virtual");
    }
    if method.has_override_keyword {
        node.tag("override");
    }
    node
}

// ── Global view ────────────────────────────────────────────

/// Every namespace and class with their connection and parent edges.
pub fn global_view(table: &SymbolTable, hide_utility: bool) -> GraphDocument {
    let included = |class: &ClassEntry| !(hide_utility && class.is_hidden());
    let class_present = |id: &str| table.class(id).is_some_and(included);
    let namespace_present = |id: &str| table.namespaces.contains(id);

    let mut doc = GraphDocument::new();
    for id in table.namespaces.keys() {
        doc.add_node(namespace_node(table, id, &namespace_present));
    }
    for class in table.classes.values().filter(|c| included(c)) {
        doc.add_node(placed_class_node(class, &namespace_present));
    }

    for class in table.classes.values().filter(|c| included(c)) {
        for connection in &class.connections {
            if class_present(connection.target_id.as_str()) {
                doc.add_edge(connection_edge(&class.id, connection));
            }
        }
        if let Some(parent) = class.parent_id.as_deref().filter(|p| class_present(*p)) {
            doc.add_edge(GraphEdge::new(&class.id, parent, "parent"));
        }
    }
    doc
}

// ── Per-class view ─────────────────────────────────────────

/// Ego-graph of one class: its parent, connection targets, methods,
/// members and the classes that refer to it.
pub fn class_view(table: &SymbolTable, class: &ClassEntry) -> GraphDocument {
    let mut doc = GraphDocument::with_title(&class.id);

    let mut focal = GraphNode::new(FOCAL_NODE, "object");
    focal.short_name = Some(class.id.clone());
    focal.long_name = Some(class.id.clone());
    focal.filename = non_empty(&class.file);
    focal.description = non_empty(&class.description);
    doc.add_node(focal);

    if let Some(parent) = class.parent_id.as_deref().and_then(|p| table.class(p)) {
        doc.add_node(class_node(parent, "parent"));
    }
    for connection in &class.connections {
        if let Some(target) = table.class(&connection.target_id) {
            doc.add_node(class_node(target, "connection"));
        }
    }
    for method in &class.methods {
        doc.add_node(method_node(class, method));
    }
    for member in &class.members {
        let mut node = GraphNode::new(&member.name, "member");
        node.short_name = Some(member.name.clone());
        node.long_name = Some(format!(
            "{} {} {}",
            member.protection.as_str(),
            member.type_name,
            member.name
        ));
        node.parent = Some(FOCAL_NODE.to_string());
        node.description = non_empty(&member.brief_description);
        node.tag(member.protection.as_str());
        doc.add_node(node);
    }

    let collaborators = collaborators(table, class);
    for id in &collaborators {
        if let Some(other) = table.class(id) {
            doc.add_node(class_node(other, "collaborator"));
        }
    }

    if let Some(parent) = class.parent_id.as_deref().filter(|p| table.classes.contains(p)) {
        doc.add_edge(GraphEdge::new(FOCAL_NODE, parent, "parent"));
    }

    for (method_id, base_id) in &class.overrides {
        doc.add_edge(GraphEdge::new(method_id, base_id, "override"));
    }

    for usage in &class.usages {
        if usage.kind == UsageKind::ClassUsage && !table.classes.contains(&usage.target_id) {
            continue;
        }
        doc.add_edge(usage_edge(&usage.source_method_id, &usage.target_id, usage));
    }

    for connection in &class.connections {
        if !table.classes.contains(&connection.target_id) {
            continue;
        }
        let source = match (&connection.kind, &connection.member) {
            (ConnectionKind::MemberItem, Some(member)) => member.as_str(),
            _ => FOCAL_NODE,
        };
        doc.add_edge(connection_edge(source, connection));
    }

    for id in &collaborators {
        let Some(other) = table.class(id) else {
            continue;
        };
        if other.parent_id.as_deref() == Some(class.id.as_str()) {
            doc.add_edge(GraphEdge::new(&other.id, FOCAL_NODE, "parent"));
        }
        for connection in other.connections.iter().filter(|c| c.target_id == class.id) {
            let mut edge = connection_edge(&other.id, connection);
            edge.target = FOCAL_NODE.to_string();
            doc.add_edge(edge);
        }
        for usage in uses(other, &class.id) {
            doc.add_edge(usage_edge(&other.id, FOCAL_NODE, usage));
        }
    }
    doc
}

/// Class usages in `class`'s methods that name `target`.
fn uses<'a>(class: &'a ClassEntry, target: &'a str) -> impl Iterator<Item = &'a MemberUsage> {
    class
        .usages
        .iter()
        .filter(move |u| u.kind == UsageKind::ClassUsage && u.target_id == target)
}

fn usage_edge(source: &str, target: &str, usage: &MemberUsage) -> GraphEdge {
    let mut edge = GraphEdge::new(source, target, usage.kind.edge_type());
    edge.description = non_empty(&usage.code);
    if !usage.certain {
        edge.tag("uncertain");
    }
    edge
}

/// Classes nested in, connected to or using `class`, plus the classes its
/// own methods were seen using. Sorted by id.
fn collaborators(table: &SymbolTable, class: &ClassEntry) -> BTreeSet<String> {
    let mut found = BTreeSet::new();
    for other in table.classes.values().filter(|o| o.id != class.id) {
        let nested = other.parent_id.as_deref() == Some(class.id.as_str());
        let connected = other.connections.iter().any(|c| c.target_id == class.id);
        if nested || connected || uses(other, &class.id).next().is_some() {
            found.insert(other.id.clone());
        }
    }
    for usage in class.usages.iter().filter(|u| u.kind == UsageKind::ClassUsage) {
        if table.classes.contains(&usage.target_id) {
            found.insert(usage.target_id.clone());
        }
    }
    found
}

// ── Namespace views ────────────────────────────────────────

/// Namespace hierarchy as a directed parent → child graph.
pub struct NamespaceTree<'a> {
    graph: DiGraphMap<&'a str, ()>,
}

impl<'a> NamespaceTree<'a> {
    pub fn new(table: &'a SymbolTable) -> Self {
        let mut graph = DiGraphMap::new();
        for (id, namespace) in table.namespaces.iter() {
            graph.add_node(id);
            if let Some(parent) = namespace.parent_id.as_deref().and_then(|p| table.namespaces.key(p)) {
                graph.add_edge(parent, id, ());
            }
        }
        NamespaceTree { graph }
    }

    /// `root` and every namespace below it.
    pub fn subtree(&self, root: &str) -> HashSet<&'a str> {
        let mut found = HashSet::new();
        let Some(start) = self.graph.nodes().find(|n| *n == root) else {
            return found;
        };
        let mut dfs = Dfs::new(&self.graph, start);
        while let Some(node) = dfs.next(&self.graph) {
            found.insert(node);
        }
        found
    }
}

/// Registered namespaces from `id` up to the root.
fn namespace_chain<'a>(table: &'a SymbolTable, id: &str) -> Vec<&'a str> {
    let mut chain = Vec::new();
    let mut current = table.namespaces.key(id);
    while let Some(ns) = current {
        if chain.contains(&ns) {
            break;
        }
        chain.push(ns);
        current = table
            .namespace(ns)
            .and_then(|n| n.parent_id.as_deref())
            .and_then(|p| table.namespaces.key(p));
    }
    chain
}

/// Internal and external views of the namespace `root`.
pub fn namespace_views(
    table: &SymbolTable,
    tree: &NamespaceTree<'_>,
    root: &str,
    hide_utility: bool,
) -> (GraphDocument, GraphDocument) {
    let subtree = tree.subtree(root);
    let included = |class: &&ClassEntry| !(hide_utility && class.is_hidden());

    let internal: HashSet<&str> = table
        .classes
        .values()
        .filter(included)
        .filter(|c| c.namespace_id.as_deref().is_some_and(|n| subtree.contains(n)))
        .map(|c| c.id.as_str())
        .collect();

    let mut outside: HashSet<&str> = HashSet::new();
    for class in table.classes.values().filter(included) {
        let inside = internal.contains(class.id.as_str());
        for connection in &class.connections {
            let target_inside = internal.contains(connection.target_id.as_str());
            if inside && !target_inside {
                if let Some(target) = table.class(&connection.target_id).filter(included) {
                    outside.insert(target.id.as_str());
                }
            } else if !inside && target_inside {
                outside.insert(class.id.as_str());
            }
        }
    }

    let mut anchors: HashSet<&str> = subtree.clone();
    for id in &outside {
        if let Some(namespace) = table.class(id).and_then(|c| c.namespace_id.as_deref()) {
            anchors.extend(namespace_chain(table, namespace));
        }
    }

    let internal_doc = namespace_document(table, root, &subtree, &internal, &HashSet::new());
    let external_doc = namespace_document(table, root, &anchors, &internal, &outside);
    (internal_doc, external_doc)
}

fn namespace_document(
    table: &SymbolTable,
    root: &str,
    namespaces: &HashSet<&str>,
    internal: &HashSet<&str>,
    outside: &HashSet<&str>,
) -> GraphDocument {
    let present_namespace = |id: &str| namespaces.contains(id);
    let present_class = |id: &str| internal.contains(id) || outside.contains(id);

    let mut doc = GraphDocument::with_title(root);
    for id in table.namespaces.keys().filter(|id| namespaces.contains(id)) {
        doc.add_node(namespace_node(table, id, &present_namespace));
    }

    let classes: Vec<&ClassEntry> = table
        .classes
        .values()
        .filter(|c| present_class(c.id.as_str()))
        .collect();
    for class in &classes {
        doc.add_node(placed_class_node(class, &present_namespace));
    }

    for class in &classes {
        let inside = internal.contains(class.id.as_str());
        for connection in &class.connections {
            if !present_class(connection.target_id.as_str()) {
                continue;
            }
            if inside || internal.contains(connection.target_id.as_str()) {
                doc.add_edge(connection_edge(&class.id, connection));
            }
        }
        if let Some(parent) = class.parent_id.as_deref().filter(|p| present_class(*p)) {
            doc.add_edge(GraphEdge::new(&class.id, parent, "parent"));
        }
    }
    doc
}
