//! Virtual method override resolution along inheritance connections

use crate::model::{ClassEntry, ConnectionKind, Method};
use crate::symbols::SymbolTable;

fn same_signature(method: &Method, candidate: &Method) -> bool {
    candidate.is_virtual
        && candidate.name == method.name
        && candidate.is_const == method.is_const
        && candidate.params.len() == method.params.len()
}

/// Base classes to search, direct bases first, then indirect ones. A class
/// named in its own base's template arguments (`Base<Derived>`) is skipped.
fn candidates(class: &ClassEntry) -> impl Iterator<Item = &str> {
    let of_kind = move |kind: ConnectionKind| {
        class
            .connections
            .iter()
            .filter(move |c| c.kind == kind && c.target_id != class.id)
            .map(|c| c.target_id.as_str())
    };
    of_kind(ConnectionKind::DirectInheritance).chain(of_kind(ConnectionKind::IndirectInheritance))
}

/// Find which base class (if any) `method` of `class` overrides. Only the
/// class's own connections are inspected; transitive bases are reachable
/// through the indirect shortcuts added during resolution.
pub fn find_override<'a>(table: &'a SymbolTable, class: &ClassEntry, method: &Method) -> Option<&'a str> {
    if !method.is_virtual {
        return None;
    }
    candidates(class)
        .filter_map(|id| table.classes.key(id).zip(table.class(id)))
        .find(|(_, base)| base.methods.iter().any(|m| same_signature(method, m)))
        .map(|(id, _)| id)
}

/// Record overrides for every virtual method in the table.
pub fn resolve_overrides(table: &mut SymbolTable) -> usize {
    let mut found: Vec<(String, String, String)> = Vec::new();

    for class in table.classes.values() {
        for method in &class.methods {
            if let Some(base) = find_override(table, class, method) {
                found.push((class.id.clone(), method.id.clone(), base.to_string()));
            }
        }
    }

    let count = found.len();
    for (class_id, method_id, base_id) in found {
        if let Some(class) = table.classes.get_mut(&class_id) {
            class.overrides.insert(method_id, base_id);
        }
    }

    tracing::info!("Resolved {} method overrides", count);
    count
}
