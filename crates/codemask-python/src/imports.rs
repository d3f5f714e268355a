//! Names bound by import statements.
//!
//! Imported names refer to other modules' exports, so they are left alone
//! for the whole run, together with every reference to them.

use rustc_hash::FxHashSet;

fn is_identifier(word: &str) -> bool {
    let mut chars = word.chars();
    chars
        .next()
        .is_some_and(|c| c == '_' || c.is_alphabetic())
        && chars.all(|c| c == '_' || c.is_alphanumeric())
}

/// The name an `item [as alias]` clause binds, with `dotted` allowing a
/// module path whose first component is what `import a.b` binds.
fn bound_name(item: &str, dotted: bool) -> Option<&str> {
    let mut words = item.split_whitespace();
    let target = words.next()?;
    match (words.next(), words.next()) {
        (Some("as"), Some(alias)) if is_identifier(alias) => Some(alias),
        (None, _) => {
            let first = if dotted {
                target.split('.').next()?
            } else {
                target
            };
            is_identifier(first).then_some(first)
        }
        _ => None,
    }
}

/// Join lines continued by open parentheses or trailing backslashes.
fn logical_lines(text: &str) -> Vec<String> {
    let mut lines = Vec::new();
    let mut current = String::new();
    let mut depth = 0usize;
    for line in text.lines() {
        let line = line.trim_end();
        let (body, continued) = match line.strip_suffix('\\') {
            Some(body) => (body, true),
            None => (line, false),
        };
        for c in body.chars() {
            match c {
                '(' => depth += 1,
                ')' => depth = depth.saturating_sub(1),
                _ => {}
            }
        }
        if !current.is_empty() {
            current.push(' ');
        }
        current.push_str(body.trim());
        if depth == 0 && !continued {
            lines.push(std::mem::take(&mut current));
        }
    }
    if !current.is_empty() {
        lines.push(current);
    }
    lines
}

/// Every name bound by an `import` or `from ... import` statement in `text`.
pub fn collect(text: &str) -> FxHashSet<String> {
    let mut names = FxHashSet::default();
    for line in logical_lines(text) {
        if let Some(rest) = line.strip_prefix("import ") {
            for item in rest.split(',') {
                if let Some(name) = bound_name(item, true) {
                    names.insert(name.to_string());
                }
            }
        } else if let Some(rest) = line.strip_prefix("from ") {
            let Some((_, items)) = rest.split_once(" import ") else {
                continue;
            };
            let items = items.trim().trim_start_matches('(').trim_end_matches(')');
            for item in items.split(',') {
                if let Some(name) = bound_name(item, false) {
                    names.insert(name.to_string());
                }
            }
        }
    }
    names
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sorted(text: &str) -> Vec<String> {
        let mut names: Vec<String> = collect(text).into_iter().collect();
        names.sort();
        names
    }

    #[test]
    fn test_plain_imports() {
        assert_eq!(sorted("import os, sys"), ["os", "sys"]);
        assert_eq!(sorted("import numpy as np"), ["np"]);
        assert_eq!(sorted("import os.path"), ["os"]);
        assert_eq!(sorted("import a.b as c"), ["c"]);
    }

    #[test]
    fn test_from_imports() {
        assert_eq!(sorted("from x import y as z, w"), ["w", "z"]);
        assert_eq!(sorted("from . import sibling"), ["sibling"]);
        assert_eq!(sorted("from os import *"), Vec::<String>::new());
    }

    #[test]
    fn test_parenthesized_multiline_import() {
        let text = "from typing import (\n    Any,\n    Dict as Mapping,\n)\nx = 1";
        assert_eq!(sorted(text), ["Any", "Mapping"]);
    }

    #[test]
    fn test_indented_import_inside_function() {
        assert_eq!(sorted("def f():\n    import json\n    return json"), ["json"]);
    }
}
