//! Heuristic detection of member, method and class usage in method bodies
//!
//! Each body line is split into identifier tokens once and the tokens are
//! looked up in per-class name maps. Each source unit (one export file) is
//! analysed on its own rayon task; findings go into a `DashMap` keyed by
//! class id and are merged into the symbol table once every unit is done.

use std::collections::{BTreeMap, BTreeSet, HashMap, HashSet};
use std::sync::LazyLock;

use dashmap::DashMap;
use rayon::prelude::*;
use regex::Regex;

use crate::error::{AnalysisError, Result};
use crate::model::{ClassEntry, MemberUsage, Method, SourceLine, SourceListing, UsageKind};
use crate::symbols::{SymbolTable, SEPARATOR};

/// Supplies highlighted source listings, one independent unit at a time.
pub trait SourceProvider: Sync {
    /// Names of the units, in a stable order.
    fn units(&self) -> Vec<String>;

    /// Load the listings contained in one unit.
    fn load(&self, unit: &str) -> Result<Vec<SourceListing>>;
}

/// Listings already in memory, one unit per distinct file name.
#[derive(Debug, Clone, Default)]
pub struct MemorySources(pub Vec<SourceListing>);

impl SourceProvider for MemorySources {
    fn units(&self) -> Vec<String> {
        let mut seen = HashSet::new();
        self.0
            .iter()
            .filter(|l| seen.insert(l.file.as_str()))
            .map(|l| l.file.clone())
            .collect()
    }

    fn load(&self, unit: &str) -> Result<Vec<SourceListing>> {
        Ok(self.0.iter().filter(|l| l.file == unit).cloned().collect())
    }
}

/// Remove `"..."` literals, honouring `\"` inside them. An unterminated
/// literal is left alone.
pub fn strip_string_literals(text: &str) -> String {
    let mut out = text.to_string();
    while let Some(start) = out.find('"') {
        let mut end = start;
        let close = loop {
            match out[end + 1..].find('"') {
                Some(offset) => {
                    end += 1 + offset;
                    if out.as_bytes()[end - 1] != b'\\' {
                        break Some(end);
                    }
                }
                None => break None,
            }
        };
        let Some(end) = close else {
            break;
        };
        out.replace_range(start..=end, "");
    }
    out
}

/// Code text of a body line: comments and string literals removed, and on
/// the first line everything before the opening brace dropped.
pub fn code_text(line: &SourceLine, first_line: bool) -> Option<String> {
    let text = strip_string_literals(&line.code());
    if first_line {
        let start = text.find('{')?;
        return Some(text[start..].to_string());
    }
    Some(text)
}

/// Identifier, possibly `::`-qualified. Every line is scanned with this one
/// pattern; candidate names are then looked up in hash maps.
static IDENTIFIER: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\w+(?:::\w+)*").expect("Invalid identifier regex"));

/// Lookup of the classes a method body may name.
///
/// Another class is usable under its short name when it shares the current
/// class's namespace, otherwise under its id with the leading segments it
/// shares with the current class id removed. When two classes share a key the
/// one registered first wins. Keys are resolved on demand, so nothing is
/// precomputed per pair of classes.
#[derive(Debug)]
pub struct ClassIndex<'a> {
    table: &'a SymbolTable,
    by_name: HashMap<&'a str, Vec<&'a str>>,
    by_body_file: HashMap<&'a str, Vec<&'a ClassEntry>>,
}

impl<'a> ClassIndex<'a> {
    pub fn new(table: &'a SymbolTable) -> Self {
        let mut by_name: HashMap<&'a str, Vec<&'a str>> = HashMap::new();
        let mut by_body_file: HashMap<&'a str, Vec<&'a ClassEntry>> = HashMap::new();
        for (id, class) in table.classes.iter() {
            by_name.entry(class.name.as_str()).or_default().push(id);

            let mut files: Vec<&str> = class
                .methods
                .iter()
                .filter(|m| m.body_range().is_some())
                .map(|m| m.body_file.as_str())
                .collect();
            files.sort_unstable();
            files.dedup();
            for file in files {
                by_body_file.entry(file).or_default().push(class);
            }
        }
        ClassIndex {
            table,
            by_name,
            by_body_file,
        }
    }

    pub fn table(&self) -> &'a SymbolTable {
        self.table
    }

    /// Classes with at least one method body in `file`, in registration order.
    pub fn with_bodies_in(&self, file: &str) -> &[&'a ClassEntry] {
        self.by_body_file.get(file).map(Vec::as_slice).unwrap_or_default()
    }

    /// The class `key` names from inside `class`, if any.
    pub fn usable(&self, class: &ClassEntry, key: &str) -> Option<&'a str> {
        if key.is_empty() {
            return None;
        }
        let mut best: Option<(usize, &'a str)> = None;
        let mut consider = |id: &'a str| {
            if id == class.id {
                return;
            }
            if let Some(position) = self.table.classes.position(id) {
                if best.is_none_or(|(p, _)| position < p) {
                    best = Some((position, id));
                }
            }
        };

        for &id in self.by_name.get(key).into_iter().flatten() {
            if self.table.class(id).is_some_and(|c| c.namespace_id == class.namespace_id) {
                consider(id);
            }
        }

        for prefix in qualifier_prefixes(&class.id) {
            let candidate = if prefix.is_empty() {
                key.to_string()
            } else {
                format!("{prefix}{SEPARATOR}{key}")
            };
            let Some(id) = self.table.classes.key(&candidate) else {
                continue;
            };
            let other_namespace = self.table.class(id).is_some_and(|c| c.namespace_id != class.namespace_id);
            if other_namespace && strip_shared_prefix(id, &class.id) == key {
                consider(id);
            }
        }

        best.map(|(_, id)| id)
    }
}

/// "", then every `::` prefix of `id`, then `id` itself.
fn qualifier_prefixes(id: &str) -> impl Iterator<Item = &str> {
    std::iter::once("")
        .chain(id.match_indices(SEPARATOR).map(move |(pos, _)| &id[..pos]))
        .chain(std::iter::once(id))
}

pub fn strip_shared_prefix<'a>(other: &'a str, current: &str) -> &'a str {
    let mut rest = other;
    for part in current.split(SEPARATOR) {
        match rest.strip_prefix(part).and_then(|r| r.strip_prefix(SEPARATOR)) {
            Some(remaining) => rest = remaining,
            None => break,
        }
    }
    rest
}

/// A usage found on one line of code text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UsageMatch {
    pub kind: UsageKind,
    pub target_id: String,
    pub certain: bool,
}

/// One name candidate inside a line: a run of `::` segments of an
/// identifier token.
struct Candidate<'t> {
    name: &'t str,
    /// Text after the name.
    rest: &'t str,
    /// Preceded by a valid boundary.
    bounded: bool,
}

/// Every contiguous segment run of every identifier token in `text`.
///
/// A run starts on a boundary when the text before it, whitespace aside, is
/// empty or does not end in `.` or `>`. Runs after the first segment follow
/// `::` and always do.
fn candidates(text: &str) -> Vec<Candidate<'_>> {
    let mut found = Vec::new();
    for token in IDENTIFIER.find_iter(text) {
        let mut starts = vec![token.start()];
        let mut ends = Vec::new();
        for (pos, _) in token.as_str().match_indices(SEPARATOR) {
            ends.push(token.start() + pos);
            starts.push(token.start() + pos + SEPARATOR.len());
        }
        ends.push(token.end());

        for (i, &start) in starts.iter().enumerate() {
            let bounded = i > 0 || !text[..start].trim_end().ends_with(['.', '>']);
            for &end in &ends[i..] {
                found.push(Candidate {
                    name: &text[start..end],
                    rest: &text[end..],
                    bounded,
                });
            }
        }
    }
    found
}

/// Name lookups for one class's members and methods.
///
/// Member access is a name followed by any non-identifier character, a call
/// is a name followed by `(`, and a class usage is a key followed by a
/// character that is neither an identifier character nor `:`.
#[derive(Debug)]
pub struct UsageMatcher<'a> {
    class: &'a ClassEntry,
    index: &'a ClassIndex<'a>,
    members: HashMap<&'a str, usize>,
    methods: HashMap<&'a str, Vec<usize>>,
}

impl<'a> UsageMatcher<'a> {
    pub fn new(index: &'a ClassIndex<'a>, class: &'a ClassEntry) -> Self {
        let mut members = HashMap::new();
        for (i, member) in class.members.iter().enumerate() {
            members.entry(member.name.as_str()).or_insert(i);
        }
        let mut methods: HashMap<&str, Vec<usize>> = HashMap::new();
        for (i, method) in class.methods.iter().enumerate() {
            methods.entry(method.name.as_str()).or_default().push(i);
        }
        UsageMatcher {
            class,
            index,
            members,
            methods,
        }
    }

    /// Usages on one line of code text inside `caller`, a method of the
    /// class. Members come first in declaration order, then methods, then
    /// classes in registration order; each target at most once.
    pub fn find(&self, caller: &Method, text: &str) -> Vec<UsageMatch> {
        let mut members: BTreeSet<usize> = BTreeSet::new();
        let mut methods: BTreeSet<usize> = BTreeSet::new();
        let mut classes: BTreeMap<usize, &str> = BTreeMap::new();

        for candidate in candidates(text).into_iter().filter(|c| c.bounded) {
            let next = candidate.rest.chars().next();

            if next.is_some() {
                if let Some(&i) = self.members.get(candidate.name) {
                    members.insert(i);
                }
            }

            if candidate.rest.trim_start().starts_with('(') {
                for &i in self.methods.get(candidate.name).into_iter().flatten() {
                    if !caller.is_const || self.class.methods[i].is_const {
                        methods.insert(i);
                    }
                }
            }

            if next.is_some_and(|c| c != ':' && !is_identifier_char(c)) {
                if let Some(id) = self.index.usable(self.class, candidate.name) {
                    if let Some(position) = self.index.table().classes.position(id) {
                        classes.insert(position, id);
                    }
                }
            }
        }

        let mut found = Vec::new();
        for i in members {
            found.push(UsageMatch {
                kind: UsageKind::MemberAccess,
                target_id: self.class.members[i].name.clone(),
                certain: true,
            });
        }
        for i in methods {
            let target = &self.class.methods[i];
            let overloads = self.methods.get(target.name.as_str()).map_or(0, Vec::len);
            found.push(UsageMatch {
                kind: UsageKind::MethodCall,
                target_id: target.id.clone(),
                certain: overloads < 2,
            });
        }
        for id in classes.into_values() {
            found.push(UsageMatch {
                kind: UsageKind::ClassUsage,
                target_id: id.to_string(),
                certain: true,
            });
        }
        found
    }
}

fn is_identifier_char(c: char) -> bool {
    c == '_' || c.is_alphanumeric()
}

/// Usages in one listing, as (owning class id, usage) in discovery order.
/// Matchers are built only for classes with a method body in this file.
pub fn detect_listing(index: &ClassIndex<'_>, listing: &SourceListing) -> Vec<(String, MemberUsage)> {
    let mut found = Vec::new();

    for &class in index.with_bodies_in(&listing.file) {
        let bodies = class
            .methods
            .iter()
            .filter(|m| m.body_file == listing.file)
            .filter_map(|m| m.body_range().map(|range| (m, range)));
        let matcher = UsageMatcher::new(index, class);

        for (method, (begin, end)) in bodies {
            let body = listing
                .lines
                .iter()
                .filter(|l| (begin..=end).contains(&l.number));

            for line in body {
                let Some(text) = code_text(line, line.number == begin) else {
                    continue;
                };
                let matches = matcher.find(method, &text);
                if matches.is_empty() {
                    continue;
                }
                let code = format!("{}({}):\n{}", listing.file, line.number, line.text().trim());
                for m in matches {
                    found.push((
                        class.id.clone(),
                        MemberUsage {
                            source_method_id: method.id.clone(),
                            target_id: m.target_id,
                            kind: m.kind,
                            code: code.clone(),
                            certain: m.certain,
                        },
                    ));
                }
            }
        }
    }
    found
}

/// Outcome of the usage detection stage.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct UsageReport {
    pub units: usize,
    pub usages: usize,
}

/// Run usage detection over every unit of `sources` in parallel and append
/// the findings to the owning classes.
///
/// A unit that fails to load is reported but does not stop the others;
/// usages from successful units are merged before the error is returned.
pub fn detect_usages(table: &mut SymbolTable, sources: &dyn SourceProvider) -> Result<UsageReport> {
    let units = sources.units();
    let found: DashMap<String, Vec<(usize, MemberUsage)>> = DashMap::new();

    let failures: Vec<AnalysisError> = {
        let classes = ClassIndex::new(table);

        units
            .par_iter()
            .enumerate()
            .filter_map(|(index, unit)| {
                let listings = match sources.load(unit) {
                    Ok(listings) => listings,
                    Err(e) => {
                        tracing::warn!("Usage detection skipped {}: {}", unit, e);
                        return Some(e);
                    }
                };
                for listing in &listings {
                    for (class_id, usage) in detect_listing(&classes, listing) {
                        found.entry(class_id).or_default().push((index, usage));
                    }
                }
                tracing::debug!("Analysed source unit {}", unit);
                None
            })
            .collect()
    };

    let mut total = 0;
    for (class_id, mut usages) in found {
        usages.sort_by_key(|(index, _)| *index);
        total += usages.len();
        if let Some(class) = table.classes.get_mut(&class_id) {
            class.usages.extend(usages.into_iter().map(|(_, usage)| usage));
        }
    }

    tracing::info!("Detected {} usages in {} source units", total, units.len());
    if !failures.is_empty() {
        return Err(AnalysisError::UsageDetection(failures));
    }
    Ok(UsageReport {
        units: units.len(),
        usages: total,
    })
}
