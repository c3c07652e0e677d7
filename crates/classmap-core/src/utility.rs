//! Utility classification: which classes are implementation detail

use std::collections::HashMap;

use crate::model::{ConnectionKind, Protection};
use crate::resolver::{split_template, tokens, ARGUMENT_DELIMITERS};
use crate::symbols::{last_segment, SymbolTable};

/// Why a class was flagged. Only used for logging and tests.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UtilityEvidence {
    Nested,
    DirectBase,
    DirectMember,
    MethodSignature,
}

/// Flag nested classes, direct bases, direct member types, and classes that
/// appear in non-private method signatures of other classes.
///
/// Evidence is merged into each entry, so the order of the rules does not
/// matter and an already flagged class stays flagged.
pub fn classify(table: &mut SymbolTable) -> usize {
    let evidence = collect_evidence(table);

    let mut flagged = 0;
    for (id, reason) in evidence {
        if let Some(class) = table.classes.get_mut(&id) {
            if !class.is_utility() {
                flagged += 1;
                tracing::debug!("Utility class {} ({:?})", id, reason);
            }
            class.mark_utility(true);
        }
    }

    tracing::info!("Classified {} utility classes", flagged);
    flagged
}

pub fn collect_evidence(table: &SymbolTable) -> Vec<(String, UtilityEvidence)> {
    let short_names = unique_short_names(table);
    let mut evidence = Vec::new();

    for class in table.classes.values() {
        if class.parent_id.is_some() {
            evidence.push((class.id.clone(), UtilityEvidence::Nested));
        }

        for connection in &class.connections {
            if connection.template_argument || connection.target_id == class.id {
                continue;
            }
            match connection.kind {
                ConnectionKind::DirectInheritance => {
                    evidence.push((connection.target_id.clone(), UtilityEvidence::DirectBase));
                }
                ConnectionKind::MemberItem => {
                    if class.parent_id.as_deref() != Some(connection.target_id.as_str()) {
                        evidence.push((connection.target_id.clone(), UtilityEvidence::DirectMember));
                    }
                }
                ConnectionKind::IndirectInheritance => {}
            }
        }

        let namespace = class.namespace_id.as_deref();
        for method in class.methods.iter().filter(|m| m.protection != Protection::Private) {
            let signature = std::iter::once(method.return_type.as_str())
                .chain(method.params.iter().map(|p| p.type_name.as_str()));
            for type_expr in signature {
                let (head, arguments) = split_template(type_expr);
                for token in tokens(head, ARGUMENT_DELIMITERS).chain(tokens(arguments, ARGUMENT_DELIMITERS)) {
                    let target = table
                        .lookup_class(token, namespace)
                        .or_else(|| short_names.get(last_segment(token)).copied().flatten());
                    if let Some(target) = target.filter(|t| *t != class.id) {
                        evidence.push((target.to_string(), UtilityEvidence::MethodSignature));
                    }
                }
            }
        }
    }
    evidence
}

/// Short name → class id, or `None` when the short name is ambiguous.
fn unique_short_names(table: &SymbolTable) -> HashMap<&str, Option<&str>> {
    let mut names: HashMap<&str, Option<&str>> = HashMap::new();
    for (id, class) in table.classes.iter() {
        names
            .entry(class.name.as_str())
            .and_modify(|existing| *existing = None)
            .or_insert(Some(id));
    }
    names
}
