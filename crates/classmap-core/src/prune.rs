//! Orphan pruning: drop classes and namespaces nothing points at

use std::collections::HashSet;

use crate::symbols::SymbolTable;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PruneReport {
    pub classes: usize,
    pub namespaces: usize,
}

impl PruneReport {
    pub fn is_empty(&self) -> bool {
        self.classes == 0 && self.namespaces == 0
    }
}

/// Remove orphans until nothing changes. Running it twice removes nothing
/// the second time.
pub fn prune(table: &mut SymbolTable) -> PruneReport {
    let report = PruneReport {
        classes: prune_classes(table),
        namespaces: prune_namespaces(table),
    };
    tracing::info!(
        "Pruned {} classes and {} namespaces",
        report.classes,
        report.namespaces
    );
    report
}

/// A class survives when it has a connection, is a connection target, or
/// encloses another class.
fn prune_classes(table: &mut SymbolTable) -> usize {
    let mut removed = 0;
    loop {
        let referenced: HashSet<String> = table
            .classes
            .values()
            .flat_map(|c| {
                c.connections
                    .iter()
                    .map(|conn| conn.target_id.clone())
                    .chain(c.parent_id.clone())
            })
            .collect();

        let count = table.classes.retain(|id, class| {
            let keep = !class.connections.is_empty() || referenced.contains(id);
            if !keep {
                tracing::debug!("Pruning class {}", id);
            }
            keep
        });
        if count == 0 {
            return removed;
        }
        removed += count;
    }
}

/// A namespace survives when it holds a surviving class or is an ancestor
/// of a namespace that survives.
fn prune_namespaces(table: &mut SymbolTable) -> usize {
    let mut removed = 0;
    loop {
        let occupied: HashSet<&str> = table
            .classes
            .values()
            .filter_map(|c| c.namespace_id.as_deref())
            .collect();
        let mut candidates: HashSet<String> = table
            .namespaces
            .keys()
            .filter(|id| !occupied.contains(id))
            .map(str::to_string)
            .collect();

        let mut changed = true;
        while changed {
            changed = false;
            for namespace in table.namespaces.values() {
                if candidates.contains(&namespace.id) {
                    continue;
                }
                if let Some(parent) = &namespace.parent_id {
                    changed |= candidates.remove(parent);
                }
            }
        }

        let count = table.namespaces.retain(|id, _| {
            let keep = !candidates.contains(id);
            if !keep {
                tracing::debug!("Pruning namespace {}", id);
            }
            keep
        });
        if count == 0 {
            return removed;
        }
        removed += count;
    }
}
