//! Symbol table: namespaces and classes keyed by qualified name

use std::collections::HashSet;

use crate::arena::Arena;
use crate::model::{ClassEntry, Declarations, Namespace};

pub const SEPARATOR: &str = "::";

/// Last `::` segment of a qualified name.
pub fn last_segment(name: &str) -> &str {
    match name.rfind(SEPARATOR) {
        Some(pos) => &name[pos + SEPARATOR.len()..],
        None => name,
    }
}

/// Everything before the last `::` segment, or "" for an unqualified name.
pub fn without_last_segment(name: &str) -> &str {
    match name.rfind(SEPARATOR) {
        Some(pos) => &name[..pos],
        None => "",
    }
}

/// Namespace and class arenas shared by every analysis stage.
#[derive(Debug, Clone, Default)]
pub struct SymbolTable {
    pub namespaces: Arena<Namespace>,
    pub classes: Arena<ClassEntry>,
}

impl SymbolTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register namespaces and classes and compute each class's namespace
    /// and enclosing class.
    pub fn build(declarations: Declarations) -> Self {
        let mut table = SymbolTable::new();

        for qualified in declarations.namespaces {
            let namespace = Namespace {
                name: last_segment(&qualified).to_string(),
                parent_id: Some(without_last_segment(&qualified))
                    .filter(|p| !p.is_empty())
                    .map(str::to_string),
                id: qualified.clone(),
            };
            table.namespaces.insert(qualified, namespace);
        }

        let ids: HashSet<&str> = declarations
            .classes
            .iter()
            .map(|c| c.qualified_name.as_str())
            .collect();

        let mut placements = Vec::with_capacity(declarations.classes.len());
        for decl in &declarations.classes {
            placements.push(table.place(&decl.qualified_name, &ids));
        }

        for (decl, (namespace_id, parent_id)) in declarations.classes.into_iter().zip(placements) {
            if decl.qualified_name.is_empty() {
                tracing::warn!("Skipping class record without a qualified name (ref {})", decl.id);
                continue;
            }
            let id = decl.qualified_name.clone();
            let name = last_segment(&id).to_string();
            let mut entry = ClassEntry::new(decl, name);
            entry.namespace_id = namespace_id;
            entry.parent_id = parent_id;

            tracing::debug!(
                "Class {} (namespace: {:?}, parent: {:?})",
                id,
                entry.namespace_id,
                entry.parent_id
            );
            if !table.classes.insert(id.clone(), entry) {
                tracing::warn!("Duplicate class {}, keeping the first record", id);
            }
        }

        tracing::info!(
            "Symbol table: {} namespaces, {} classes",
            table.namespaces.len(),
            table.classes.len()
        );
        table
    }

    /// Compute (namespace id, enclosing class id) for a qualified class name.
    fn place(&self, qualified: &str, class_ids: &HashSet<&str>) -> (Option<String>, Option<String>) {
        let mut prefix = without_last_segment(qualified);
        let parent_id = Some(prefix)
            .filter(|p| !p.is_empty() && class_ids.contains(p))
            .map(str::to_string);

        let mut namespace_id = None;
        while !prefix.is_empty() {
            if !class_ids.contains(prefix) && self.namespaces.contains(prefix) {
                namespace_id = Some(prefix.to_string());
                break;
            }
            prefix = without_last_segment(prefix);
        }
        (namespace_id, parent_id)
    }

    pub fn class(&self, id: &str) -> Option<&ClassEntry> {
        self.classes.get(id)
    }

    pub fn namespace(&self, id: &str) -> Option<&Namespace> {
        self.namespaces.get(id)
    }

    /// Look a type token up as a class id: exactly, then inside `scope` and
    /// each enclosing namespace of `scope` in turn.
    pub fn lookup_class(&self, token: &str, scope: Option<&str>) -> Option<&str> {
        let token = token.trim_start_matches(SEPARATOR);
        if token.is_empty() {
            return None;
        }
        if let Some(id) = self.classes.key(token) {
            return Some(id);
        }

        let mut prefix = scope.unwrap_or("");
        while !prefix.is_empty() {
            let candidate = format!("{prefix}{SEPARATOR}{token}");
            if let Some(id) = self.classes.key(&candidate) {
                return Some(id);
            }
            prefix = without_last_segment(prefix);
        }
        None
    }
}
