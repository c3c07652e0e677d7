//! Core data structures for declarations and the resolved symbol table

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// Access level of a member, method or inheritance entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum Protection {
    Private,
    Protected,
    /// Anything the export did not label explicitly.
    #[default]
    Package,
    Public,
}

impl Protection {
    pub fn as_str(self) -> &'static str {
        match self {
            Protection::Private => "private",
            Protection::Protected => "protected",
            Protection::Package => "package",
            Protection::Public => "public",
        }
    }

    /// Keyword used in connection snippets. Package access has none.
    pub fn keyword(self) -> Option<&'static str> {
        match self {
            Protection::Package => None,
            other => Some(other.as_str()),
        }
    }
}

/// Compound kind as it appears in the declaration export.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum DeclKind {
    #[default]
    Class,
    Struct,
}

/// Resolved kind of a class entry. Abstract compounds become interfaces.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ClassKind {
    Class,
    Struct,
    Interface,
}

impl ClassKind {
    pub fn as_str(self) -> &'static str {
        match self {
            ClassKind::Class => "class",
            ClassKind::Struct => "struct",
            ClassKind::Interface => "interface",
        }
    }
}

// ── Declaration records (ingest input) ─────────────────────

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase", default)]
pub struct InheritanceDecl {
    pub target_type_name: String,
    pub protection: Protection,
    pub is_virtual: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct Param {
    #[serde(rename = "type")]
    pub type_name: String,
    pub name: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase", default)]
pub struct Method {
    pub name: String,
    pub id: String,
    pub brief_description: String,
    pub return_type: String,
    pub is_const: bool,
    pub is_virtual: bool,
    pub has_override_keyword: bool,
    pub protection: Protection,
    pub params: Vec<Param>,
    pub body_file: String,
    pub body_begin_line: Option<u32>,
    pub body_end_line: Option<u32>,
}

impl Method {
    /// Inclusive body line range, if the export recorded a usable one.
    pub fn body_range(&self) -> Option<(u32, u32)> {
        match (self.body_begin_line, self.body_end_line) {
            (Some(begin), Some(end)) if begin <= end => Some((begin, end)),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase", default)]
pub struct Member {
    pub name: String,
    #[serde(rename = "type")]
    pub type_name: String,
    pub protection: Protection,
    pub brief_description: String,
}

/// One class or struct compound from the export.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase", default)]
pub struct ClassDecl {
    /// External reference id assigned by the documentation generator.
    pub id: String,
    pub qualified_name: String,
    pub kind: DeclKind,
    pub is_abstract: bool,
    pub source_file: String,
    pub brief_description: String,
    pub inheritance: Vec<InheritanceDecl>,
    pub methods: Vec<Method>,
    pub members: Vec<Member>,
}

impl ClassDecl {
    pub fn class_kind(&self) -> ClassKind {
        match (self.is_abstract, self.kind) {
            (true, _) => ClassKind::Interface,
            (false, DeclKind::Class) => ClassKind::Class,
            (false, DeclKind::Struct) => ClassKind::Struct,
        }
    }
}

/// Everything the symbol table is built from.
#[derive(Debug, Clone, Default)]
pub struct Declarations {
    pub namespaces: Vec<String>,
    pub classes: Vec<ClassDecl>,
}

impl Declarations {
    pub fn extend(&mut self, other: Declarations) {
        self.namespaces.extend(other.namespaces);
        self.classes.extend(other.classes);
    }
}

// ── Source listings (usage detection input) ────────────────

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase", default)]
pub struct Span {
    pub text: String,
    pub is_comment: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct SourceLine {
    pub number: u32,
    pub spans: Vec<Span>,
}

impl SourceLine {
    /// Full line text, comments included.
    pub fn text(&self) -> String {
        self.spans.iter().map(|s| s.text.as_str()).collect()
    }

    /// Line text with comment spans left out.
    pub fn code(&self) -> String {
        self.spans
            .iter()
            .filter(|s| !s.is_comment)
            .map(|s| s.text.as_str())
            .collect()
    }
}

/// Highlighted program listing of one source file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct SourceListing {
    pub file: String,
    pub lines: Vec<SourceLine>,
}

// ── Resolved entities ──────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Namespace {
    pub id: String,
    pub name: String,
    pub parent_id: Option<String>,
}

/// How a connection target was reached.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ConnectionKind {
    DirectInheritance,
    IndirectInheritance,
    MemberItem,
}

/// Typed class → class edge.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Connection {
    pub target_id: String,
    pub kind: ConnectionKind,
    /// Target came from template-argument text rather than the type itself.
    pub template_argument: bool,
    pub is_virtual: bool,
    pub protection: Protection,
    pub code: String,
    /// Originating member for `MemberItem` connections.
    pub member: Option<String>,
    /// Added by the ancestor shortcut pass, not declared.
    pub inferred: bool,
}

impl Connection {
    pub fn is_inheritance(&self) -> bool {
        matches!(
            self.kind,
            ConnectionKind::DirectInheritance | ConnectionKind::IndirectInheritance
        )
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum UsageKind {
    MethodCall,
    MemberAccess,
    ClassUsage,
}

impl UsageKind {
    pub fn edge_type(self) -> &'static str {
        match self {
            UsageKind::MemberAccess => "access",
            UsageKind::MethodCall => "call",
            UsageKind::ClassUsage => "use",
        }
    }
}

/// Heuristically detected reference from a method body.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MemberUsage {
    pub source_method_id: String,
    /// Member name, method id or class id depending on `kind`.
    pub target_id: String,
    pub kind: UsageKind,
    pub code: String,
    /// False when the name matched more than one overload.
    pub certain: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClassEntry {
    pub id: String,
    pub name: String,
    pub reference: String,
    pub kind: ClassKind,
    pub namespace_id: Option<String>,
    pub parent_id: Option<String>,
    pub file: String,
    pub description: String,
    pub inheritance: Vec<InheritanceDecl>,
    pub methods: Vec<Method>,
    pub members: Vec<Member>,
    pub connections: Vec<Connection>,
    pub usages: Vec<MemberUsage>,
    /// Method id → id of the base class whose method it overrides.
    pub overrides: BTreeMap<String, String>,
    utility: bool,
}

impl ClassEntry {
    pub fn new(decl: ClassDecl, name: String) -> Self {
        ClassEntry {
            kind: decl.class_kind(),
            id: decl.qualified_name,
            name,
            reference: decl.id,
            namespace_id: None,
            parent_id: None,
            file: decl.source_file,
            description: decl.brief_description,
            inheritance: decl.inheritance,
            methods: decl.methods,
            members: decl.members,
            connections: Vec::new(),
            usages: Vec::new(),
            overrides: BTreeMap::new(),
            utility: false,
        }
    }

    /// Merge new utility evidence. The flag never goes back to false.
    pub fn mark_utility(&mut self, evidence: bool) {
        self.utility |= evidence;
    }

    /// Raw classifier result, interfaces included.
    pub fn is_utility(&self) -> bool {
        self.utility
    }

    /// Utility status as published: interfaces are never utility.
    pub fn is_hidden(&self) -> bool {
        self.utility && self.kind != ClassKind::Interface
    }

    pub fn method(&self, id: &str) -> Option<&Method> {
        self.methods.iter().find(|m| m.id == id)
    }
}
