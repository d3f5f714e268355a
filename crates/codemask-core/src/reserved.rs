//! Identifiers that are never renamed.

use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

/// JavaScript globals and special names.
pub const JS_GLOBALS: &[&str] = &[
    "Array", "BigInt", "Boolean", "Date", "Error", "Function", "Infinity", "JSON", "Map", "Math",
    "NaN", "Number", "Object", "Promise", "Proxy", "Reflect", "RegExp", "Set", "String", "Symbol",
    "console", "window", "globalThis", "global", "self", "document", "setTimeout", "clearTimeout",
    "setInterval", "clearInterval", "fetch", "require", "exports", "module", "alert", "URL",
    "URLSearchParams", "undefined", "arguments",
];

/// Python keywords, soft keywords included.
pub const PY_KEYWORDS: &[&str] = &[
    "False", "None", "True", "and", "as", "assert", "async", "await", "break", "case", "class",
    "continue", "def", "del", "elif", "else", "except", "finally", "for", "from", "global", "if",
    "import", "in", "is", "lambda", "match", "nonlocal", "not", "or", "pass", "raise", "return",
    "try", "while", "with", "yield",
];

/// Python builtins left alone.
pub const PY_BUILTINS: &[&str] = &[
    "print", "len", "range", "int", "sum", "open", "super", "property", "ValueError",
];

/// SQL keywords, types and common functions. `USER` and `ROLE` are left
/// out on purpose: they are common table and column names.
pub const SQL_KEYWORDS: &[&str] = &[
    "SELECT", "FROM", "WHERE", "GROUP", "BY", "ORDER", "HAVING", "LIMIT", "OFFSET", "JOIN",
    "INNER", "LEFT", "RIGHT", "FULL", "OUTER", "ON", "USING", "AS", "DISTINCT", "UNION", "ALL",
    "EXCEPT", "INTERSECT", "AND", "OR", "NOT", "IN", "IS", "NULL", "BETWEEN", "LIKE", "ILIKE",
    "EXISTS", "ANY", "SOME", "INSERT", "INTO", "VALUES", "UPDATE", "SET", "DELETE", "CREATE",
    "TABLE", "DATABASE", "ALTER", "DROP", "RENAME", "TRUNCATE", "INT", "INTEGER", "BIGINT",
    "SMALLINT", "TINYINT", "DECIMAL", "NUMERIC", "FLOAT", "REAL", "CHAR", "VARCHAR", "TEXT",
    "DATE", "TIME", "TIMESTAMP", "BOOLEAN", "COUNT", "SUM", "AVG", "MIN", "MAX", "NOW",
    "COALESCE", "CAST", "CONVERT", "BEGIN", "COMMIT", "ROLLBACK", "SAVEPOINT", "TRANSACTION",
    "GRANT", "REVOKE", "WITH", "CASE", "WHEN", "THEN", "ELSE", "END", "DEFAULT", "PRIMARY", "KEY",
    "FOREIGN", "REFERENCES", "CHECK", "INDEX", "VIEW", "IF", "ASC", "DESC", "ESCAPE", "OVER",
    "PARTITION", "WINDOW", "RANK", "DENSE_RANK", "ROW_NUMBER", "ADD", "COLUMN", "RETURNING",
    // Join and statement words the clause walker depends on.
    "CROSS", "NATURAL", "LATERAL", "RECURSIVE", "TO", "CONFLICT", "DO", "NOTHING", "TRUE",
    "FALSE", "INTERVAL", "UNIQUE", "CONSTRAINT", "NULLS",
];

/// A closed set of reserved identifiers.
///
/// Case-insensitive sets store and compare upper-cased names.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReservedSet {
    names: BTreeSet<String>,
    #[serde(default)]
    case_insensitive: bool,
}

impl ReservedSet {
    pub fn new<I, S>(names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            names: names.into_iter().map(Into::into).collect(),
            case_insensitive: false,
        }
    }

    /// A set that matches regardless of ASCII case.
    pub fn case_insensitive<I, S>(names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            names: names
                .into_iter()
                .map(|n| n.into().to_ascii_uppercase())
                .collect(),
            case_insensitive: true,
        }
    }

    pub fn javascript() -> Self {
        Self::new(JS_GLOBALS.iter().copied())
    }

    pub fn python() -> Self {
        Self::new(PY_KEYWORDS.iter().chain(PY_BUILTINS).copied())
    }

    pub fn sql() -> Self {
        Self::case_insensitive(SQL_KEYWORDS.iter().copied())
    }

    pub fn contains(&self, name: &str) -> bool {
        if self.case_insensitive {
            self.names.contains(&name.to_ascii_uppercase())
        } else {
            self.names.contains(name)
        }
    }

    pub fn insert(&mut self, name: impl Into<String>) {
        let name = name.into();
        if self.case_insensitive {
            self.names.insert(name.to_ascii_uppercase());
        } else {
            self.names.insert(name);
        }
    }

    /// Replace the names, keeping the case rule.
    pub fn replace<I, S>(&mut self, names: I)
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.names.clear();
        self.extend(names);
    }

    pub fn len(&self) -> usize {
        self.names.len()
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.names.iter().map(String::as_str)
    }
}

impl<S: Into<String>> Extend<S> for ReservedSet {
    fn extend<I: IntoIterator<Item = S>>(&mut self, iter: I) {
        for name in iter {
            self.insert(name);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_js_globals() {
        let set = ReservedSet::javascript();
        assert!(set.contains("console"));
        assert!(set.contains("undefined"));
        assert!(!set.contains("Console"));
    }

    #[test]
    fn test_sql_is_case_insensitive() {
        let set = ReservedSet::sql();
        assert!(set.contains("select"));
        assert!(set.contains("Select"));
        assert!(!set.contains("user"));
        assert!(!set.contains("role"));
    }

    #[test]
    fn test_extend_keeps_case_rule() {
        let mut set = ReservedSet::sql();
        set.extend(["tenant"]);
        assert!(set.contains("TENANT"));
    }

    #[test]
    fn test_python_has_soft_keywords() {
        let set = ReservedSet::python();
        assert!(set.contains("match"));
        assert!(set.contains("print"));
        assert!(!set.contains("self"));
    }
}
