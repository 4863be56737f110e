//! Qualified-member completion: `qualifier.<prefix>` against an inferred
//! class hierarchy.

use std::collections::HashSet;

use once_cell::sync::Lazy;
use regex::Regex;

use pps_syntax::ast::{ClassDecl, MethodDecl};

use super::member;
use super::ParseResult;

static DOT_PREFIX: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"([A-Za-z_$][\w$]*)\s*\.\s*([A-Za-z_$][\w$]*)?$").unwrap());

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CompletionKind {
    Method,
    Property,
    Field,
}

#[derive(Debug, Clone)]
pub struct CompletionEntry {
    pub label: String,
    pub kind: CompletionKind,
    pub detail: String,
    /// UTF-16 column where the replaced prefix begins (just after the dot).
    pub replace_start: u32,
    /// UTF-16 column where it ends (the cursor).
    pub replace_end: u32,
}

/// Member completions at a 0-based (line, character) position. Only fires
/// when the text immediately before the cursor reads `identifier . prefix`.
pub fn completions_at(parsed: &ParseResult, line_idx: usize, col: usize) -> Vec<CompletionEntry> {
    let line = parsed.line(line_idx);
    let prefix_text: String = line.chars().take(col).collect();
    let Some(caps) = DOT_PREFIX.captures(&prefix_text) else {
        return Vec::new();
    };
    let qualifier = caps.get(1).map(|m| m.as_str().to_string()).unwrap_or_default();
    let typed = caps.get(2).map(|m| m.as_str().to_string()).unwrap_or_default();
    let replace_end = prefix_text.encode_utf16().count() as u32;
    let replace_start = replace_end - typed.encode_utf16().count() as u32;

    let class = if qualifier == "this" {
        parsed.script.find_enclosing_class(line_idx as u32 + 1)
    } else {
        member::infer_qualifier_type(parsed, line_idx, &qualifier)
            .and_then(|ty| parsed.script.find_class(&ty))
    };
    let Some(class) = class else {
        return Vec::new();
    };

    let mut entries = Vec::new();
    let mut visited: HashSet<String> = HashSet::new();
    let mut seen_names: HashSet<String> = HashSet::new();
    let mut current = Some(class);
    let typed_lower = typed.to_lowercase();

    while let Some(class) = current {
        if !visited.insert(class.name.clone()) {
            break;
        }
        collect_class_members(class, &typed_lower, &mut seen_names, &mut entries, replace_start, replace_end);
        current = class
            .superclass
            .as_deref()
            .and_then(|sup| parsed.script.find_class(sup));
    }
    entries
}

fn collect_class_members(
    class: &ClassDecl,
    typed_lower: &str,
    seen: &mut HashSet<String>,
    out: &mut Vec<CompletionEntry>,
    replace_start: u32,
    replace_end: u32,
) {
    for method in &class.methods {
        if method.name == class.name {
            // Constructors are not completable members.
            continue;
        }
        if !method.name.to_lowercase().starts_with(typed_lower) || !seen.insert(method.name.clone()) {
            continue;
        }
        let overloads: Vec<&MethodDecl> = class.methods.iter().filter(|m| m.name == method.name).collect();
        out.push(CompletionEntry {
            label: method.name.clone(),
            kind: CompletionKind::Method,
            detail: method_summary(&overloads),
            replace_start,
            replace_end,
        });
    }
    for field in &class.fields {
        if !field.name.to_lowercase().starts_with(typed_lower) || !seen.insert(field.name.clone()) {
            continue;
        }
        let kind = if field.is_property {
            CompletionKind::Property
        } else {
            CompletionKind::Field
        };
        let detail = field
            .declared_type
            .clone()
            .unwrap_or_else(|| "def".to_string());
        out.push(CompletionEntry {
            label: field.name.clone(),
            kind,
            detail,
            replace_start,
            replace_end,
        });
    }
}

/// Compact signature summary for a method, noting extra overloads rather
/// than listing each.
fn method_summary(overloads: &[&MethodDecl]) -> String {
    let first = overloads[0];
    let params: Vec<String> = first
        .params
        .iter()
        .map(|p| match &p.declared_type {
            Some(ty) => format!("{} {}", ty, p.name),
            None => p.name.clone(),
        })
        .collect();
    let mut summary = format!("{}({})", first.name, params.join(", "));
    match overloads.len() {
        0 | 1 => {}
        2 => summary.push_str(" (+1 overload)"),
        n => summary.push_str(&format!(" (+{} overloads)", n - 1)),
    }
    summary
}
