//! Classmap core: symbol resolution and graph view construction

pub mod analyzer;
pub mod arena;
pub mod document;
pub mod error;
pub mod model;
pub mod overrides;
pub mod prune;
pub mod resolver;
pub mod symbols;
pub mod usage;
pub mod utility;
pub mod views;


#[cfg(test)]
pub mod test_utils;

pub use analyzer::{Analyzer, ResolveReport};
pub use arena::Arena;
pub use document::{write_views, GraphDocument, GraphEdge, GraphNode, NamedView};
pub use error::{AnalysisError, Result};
pub use model::{
    ClassDecl, ClassEntry, ClassKind, Connection, ConnectionKind, DeclKind, Declarations, InheritanceDecl, Member,
    MemberUsage, Method, Namespace, Param, Protection, SourceLine, SourceListing, Span, UsageKind,
};
pub use prune::PruneReport;
pub use symbols::SymbolTable;
pub use usage::{ClassIndex, MemorySources, SourceProvider, UsageMatcher, UsageReport};
pub use views::{build_views, method_signature, namespace_reference, ViewOptions};
