//! Pipeline driver owning the symbol table

use crate::document::NamedView;
use crate::error::Result;
use crate::model::Declarations;
use crate::overrides::resolve_overrides;
use crate::prune::{prune, PruneReport};
use crate::resolver::{add_ancestor_shortcuts, resolve_connections};
use crate::symbols::SymbolTable;
use crate::usage::{detect_usages, SourceProvider, UsageReport};
use crate::utility::classify;
use crate::views::{build_views, ViewOptions};

/// Counts from the resolution stages.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ResolveReport {
    pub connections: usize,
    pub utility: usize,
    pub shortcuts: usize,
    pub overrides: usize,
}

/// Runs the analysis stages in order over one owned [`SymbolTable`].
///
/// Usage: `new` → `resolve` → `detect_usages` (optional) → `prune` →
/// `build_views`. Views only read the table.
#[derive(Debug, Clone)]
pub struct Analyzer {
    table: SymbolTable,
}

impl Analyzer {
    pub fn new(declarations: Declarations) -> Self {
        Analyzer {
            table: SymbolTable::build(declarations),
        }
    }

    /// Connections, utility classification, ancestor shortcuts, overrides.
    pub fn resolve(&mut self) -> ResolveReport {
        let connections = resolve_connections(&mut self.table);
        let utility = classify(&mut self.table);
        let shortcuts = add_ancestor_shortcuts(&mut self.table);
        let overrides = resolve_overrides(&mut self.table);
        ResolveReport {
            connections,
            utility,
            shortcuts,
            overrides,
        }
    }

    pub fn detect_usages(&mut self, sources: &dyn SourceProvider) -> Result<UsageReport> {
        detect_usages(&mut self.table, sources)
    }

    pub fn prune(&mut self) -> PruneReport {
        prune(&mut self.table)
    }

    pub fn build_views(&self, options: &ViewOptions) -> Vec<NamedView> {
        build_views(&self.table, options)
    }

    pub fn table(&self) -> &SymbolTable {
        &self.table
    }

    pub fn into_table(self) -> SymbolTable {
        self.table
    }
}
