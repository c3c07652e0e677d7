//! Resolution of type expressions into class connections

use std::collections::{HashSet, VecDeque};

use crate::model::{ClassKind, Connection, ConnectionKind, Protection};
use crate::symbols::SymbolTable;

/// Delimiters inside the type itself (`const Foo&`, `Bar *`).
const DIRECT_DELIMITERS: &[char] = &[' ', '\t', '\n', '\r', '&', '*'];
/// Delimiters inside template-argument text.
pub(crate) const ARGUMENT_DELIMITERS: &[char] = &[',', '<', '>', ' ', '\t', '\n', '\r', '&', '*'];

/// Split a type expression at its first `<` into the type part and the
/// template-argument part.
pub fn split_template(type_expr: &str) -> (&str, &str) {
    match type_expr.find('<') {
        Some(pos) => (&type_expr[..pos], &type_expr[pos + 1..]),
        None => (type_expr, ""),
    }
}

pub(crate) fn tokens<'a>(text: &'a str, delimiters: &'a [char]) -> impl Iterator<Item = &'a str> {
    text.split(delimiters).filter(|t| !t.is_empty())
}

fn snippet(type_expr: &str, protection: Protection, is_virtual: bool) -> String {
    let mut code = String::new();
    if let Some(keyword) = protection.keyword() {
        code.push_str(keyword);
        code.push(' ');
    }
    if is_virtual {
        code.push_str("virtual ");
    }
    code.push_str(type_expr);
    code
}

/// Resolve every class name mentioned in `type_expr`.
///
/// Names in the type part produce `DirectInheritance` connections, names in
/// template arguments produce `IndirectInheritance` ones. Unknown names are
/// dropped. Each target appears at most once per kind.
pub fn resolve(
    table: &SymbolTable,
    type_expr: &str,
    namespace_id: Option<&str>,
    protection: Protection,
    is_virtual: bool,
) -> Vec<Connection> {
    let (direct, indirect) = split_template(type_expr);
    let code = snippet(type_expr, protection, is_virtual);

    let mut seen: HashSet<(&str, ConnectionKind)> = HashSet::new();
    let mut result = Vec::new();
    let parts = [
        (direct, DIRECT_DELIMITERS, ConnectionKind::DirectInheritance),
        (indirect, ARGUMENT_DELIMITERS, ConnectionKind::IndirectInheritance),
    ];

    for (text, delimiters, kind) in parts {
        for token in tokens(text, delimiters) {
            let Some(target) = table.lookup_class(token, namespace_id) else {
                continue;
            };
            if !seen.insert((target, kind)) {
                continue;
            }
            result.push(Connection {
                target_id: target.to_string(),
                kind,
                template_argument: kind == ConnectionKind::IndirectInheritance,
                is_virtual,
                protection,
                code: code.clone(),
                member: None,
                inferred: false,
            });
        }
    }
    result
}

/// Resolve inheritance lists and member types of every class.
pub fn resolve_connections(table: &mut SymbolTable) -> usize {
    let mut resolved = Vec::with_capacity(table.classes.len());

    for class in table.classes.values() {
        let namespace = class.namespace_id.as_deref();
        let mut connections = Vec::new();

        for base in &class.inheritance {
            connections.extend(resolve(
                table,
                &base.target_type_name,
                namespace,
                base.protection,
                base.is_virtual,
            ));
        }

        for member in &class.members {
            for mut connection in resolve(table, &member.type_name, namespace, member.protection, false) {
                connection.kind = ConnectionKind::MemberItem;
                connection.code.push(' ');
                connection.code.push_str(&member.name);
                connection.member = Some(member.name.clone());
                connections.push(connection);
            }
        }

        resolved.push((class.id.clone(), connections));
    }

    let mut total = 0;
    for (id, connections) in resolved {
        total += connections.len();
        if let Some(class) = table.classes.get_mut(&id) {
            class.connections = connections;
        }
    }

    tracing::info!("Resolved {} connections", total);
    total
}

/// Give every class with a hidden direct base a shortcut to that base's
/// nearest visible, non-interface ancestor.
pub fn add_ancestor_shortcuts(table: &mut SymbolTable) -> usize {
    let mut additions: Vec<(String, Connection)> = Vec::new();

    for class in table.classes.values() {
        for connection in &class.connections {
            if connection.kind != ConnectionKind::DirectInheritance {
                continue;
            }
            let Some(base) = table.class(&connection.target_id) else {
                continue;
            };
            if !base.is_hidden() {
                continue;
            }
            let Some(ancestor) = nearest_visible_ancestor(table, &base.id) else {
                continue;
            };
            if ancestor == class.id {
                continue;
            }
            let known = class
                .connections
                .iter()
                .chain(additions.iter().filter(|(id, _)| *id == class.id).map(|(_, c)| c))
                .any(|c| c.is_inheritance() && c.target_id == ancestor);
            if known {
                continue;
            }

            tracing::debug!("Shortcut {} -> {} (via {})", class.id, ancestor, base.id);
            additions.push((
                class.id.clone(),
                Connection {
                    target_id: ancestor.to_string(),
                    kind: ConnectionKind::IndirectInheritance,
                    template_argument: false,
                    is_virtual: connection.is_virtual,
                    protection: connection.protection,
                    code: format!("{} (via {})", ancestor, base.id),
                    member: None,
                    inferred: true,
                },
            ));
        }
    }

    let count = additions.len();
    for (id, connection) in additions {
        if let Some(class) = table.classes.get_mut(&id) {
            class.connections.push(connection);
        }
    }
    if count > 0 {
        tracing::info!("Added {} ancestor shortcuts", count);
    }
    count
}

/// Breadth-first walk up the inheritance connections of `start`.
fn nearest_visible_ancestor<'a>(table: &'a SymbolTable, start: &str) -> Option<&'a str> {
    let mut visited: HashSet<&str> = HashSet::new();
    let mut queue: VecDeque<&str> = VecDeque::new();
    visited.insert(start);
    queue.push_back(table.classes.key(start)?);

    while let Some(current) = queue.pop_front() {
        let Some(class) = table.class(current) else {
            continue;
        };
        for connection in class.connections.iter().filter(|c| c.is_inheritance()) {
            let Some(target) = table.classes.key(&connection.target_id) else {
                continue;
            };
            if !visited.insert(target) {
                continue;
            }
            if let Some(ancestor) = table.class(target) {
                if !ancestor.is_utility() && ancestor.kind != ClassKind::Interface {
                    return Some(target);
                }
            }
            queue.push_back(target);
        }
    }
    None
}
