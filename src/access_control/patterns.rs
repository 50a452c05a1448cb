//! Pattern matching for access control
//!
//! Compiles `pattern → permission` tables into a precedence-ordered matcher.
//!
//! Pattern syntax (leading and trailing `/` are ignored):
//! - `Work Notes` - exact name
//! - `Work*` - prefix
//! - `*/Confidential` - suffix
//! - `Work*/Draft*` - `*` inside a pattern matches within one path segment
//! - `Projects/**` - `**` matches across `/`
//!
//! When several patterns match, the winner is picked by class
//! (exact, prefix, suffix, single-level wildcard, recursive), then by the
//! number of literal characters, then by path depth, then by pattern text.

use crate::config::PermissionLevel;
use crate::error::ConfigError;
use regex::Regex;
use serde::Serialize;
use std::cmp::Ordering;
use std::collections::HashMap;
use std::fmt;

/// Structural class of a compiled pattern, in precedence order
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum PatternKind {
    Exact,
    Prefix,
    Suffix,
    Regex,
    Recursive,
}

impl PatternKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            PatternKind::Exact => "exact",
            PatternKind::Prefix => "prefix",
            PatternKind::Suffix => "suffix",
            PatternKind::Regex => "regex",
            PatternKind::Recursive => "recursive",
        }
    }
}

impl fmt::Display for PatternKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

#[derive(Debug)]
enum Matcher {
    Exact(String),
    Prefix(String),
    Suffix(String),
    Regex(Regex),
}

/// A single compiled pattern
#[derive(Debug)]
pub struct Pattern {
    source: String,
    permission: PermissionLevel,
    kind: PatternKind,
    matcher: Matcher,
    segments: usize,
    literal_chars: usize,
}

impl Pattern {
    /// Compile a raw pattern string
    pub fn compile(raw: &str, permission: PermissionLevel) -> Result<Self, ConfigError> {
        let normalized = normalize(raw);
        if normalized.is_empty() {
            return Err(ConfigError::InvalidPattern {
                pattern: raw.to_string(),
                reason: "pattern is empty".to_string(),
            });
        }

        let stars = normalized.matches('*').count();
        let kind = if stars == 0 {
            PatternKind::Exact
        } else if normalized.contains("**") {
            PatternKind::Recursive
        } else if stars == 1 && normalized.ends_with('*') {
            PatternKind::Prefix
        } else if stars == 1 && normalized.starts_with('*') {
            PatternKind::Suffix
        } else {
            PatternKind::Regex
        };

        let matcher = match kind {
            PatternKind::Exact => Matcher::Exact(normalized.to_string()),
            PatternKind::Prefix => Matcher::Prefix(normalized.trim_end_matches('*').to_string()),
            PatternKind::Suffix => {
                Matcher::Suffix(normalized.trim_start_matches('*').to_string())
            }
            PatternKind::Regex | PatternKind::Recursive => {
                let regex = Regex::new(&glob_to_regex(normalized)).map_err(|e| {
                    ConfigError::InvalidPattern {
                        pattern: raw.to_string(),
                        reason: e.to_string(),
                    }
                })?;
                Matcher::Regex(regex)
            }
        };

        Ok(Self {
            source: raw.to_string(),
            permission,
            kind,
            matcher,
            segments: normalized.split('/').filter(|s| !s.is_empty()).count(),
            literal_chars: normalized.chars().filter(|c| *c != '*').count(),
        })
    }

    /// Original pattern text as configured
    pub fn source(&self) -> &str {
        &self.source
    }

    pub fn permission(&self) -> PermissionLevel {
        self.permission
    }

    pub fn kind(&self) -> PatternKind {
        self.kind
    }

    /// Match against an already normalized candidate
    fn matches(&self, candidate: &str) -> bool {
        match &self.matcher {
            Matcher::Exact(literal) => candidate == literal,
            Matcher::Prefix(prefix) => candidate.starts_with(prefix.as_str()),
            Matcher::Suffix(suffix) => candidate.ends_with(suffix.as_str()),
            Matcher::Regex(regex) => {
                // Callers are inconsistent about leading slashes
                regex.is_match(candidate)
                    || regex.is_match(&format!("/{}", candidate))
                    || candidate
                        .strip_prefix('/')
                        .is_some_and(|stripped| regex.is_match(stripped))
            }
        }
    }

    fn precedence(&self, other: &Self) -> Ordering {
        self.kind
            .cmp(&other.kind)
            .then_with(|| other.literal_chars.cmp(&self.literal_chars))
            .then_with(|| other.segments.cmp(&self.segments))
            .then_with(|| self.source.cmp(&other.source))
    }
}

/// Result of a successful pattern lookup
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PatternMatch<'a> {
    pub permission: PermissionLevel,
    pub pattern: &'a str,
}

/// Compiled, precedence-ordered pattern table
#[derive(Debug, Default)]
pub struct PatternSet {
    patterns: Vec<Pattern>,
}

impl PatternSet {
    /// Compile a pattern table. Fails on the first invalid pattern.
    pub fn compile(table: &HashMap<String, PermissionLevel>) -> Result<Self, ConfigError> {
        let mut patterns = table
            .iter()
            .map(|(raw, permission)| Pattern::compile(raw, *permission))
            .collect::<Result<Vec<_>, _>>()?;

        patterns.sort_by(|a, b| a.precedence(b));

        Ok(Self { patterns })
    }

    /// Create an empty set (matches nothing)
    pub fn empty() -> Self {
        Self {
            patterns: Vec::new(),
        }
    }

    /// Find the highest-precedence pattern matching `value`
    pub fn find_match(&self, value: &str) -> Option<PatternMatch<'_>> {
        let candidate = normalize(value);
        self.patterns
            .iter()
            .find(|p| p.matches(candidate))
            .map(|p| PatternMatch {
                permission: p.permission,
                pattern: p.source.as_str(),
            })
    }

    /// Patterns in precedence order
    pub fn patterns(&self) -> &[Pattern] {
        &self.patterns
    }

    pub fn is_empty(&self) -> bool {
        self.patterns.is_empty()
    }

    pub fn len(&self) -> usize {
        self.patterns.len()
    }
}

fn normalize(value: &str) -> &str {
    value.trim_matches('/')
}

/// `**` crosses path separators, a lone `*` stays within one segment
fn glob_to_regex(pattern: &str) -> String {
    let mut re = String::from("^");
    for (i, part) in pattern.split("**").enumerate() {
        if i > 0 {
            re.push_str(".*");
        }
        for (j, piece) in part.split('*').enumerate() {
            if j > 0 {
                re.push_str("[^/]*");
            }
            re.push_str(&regex::escape(piece));
        }
    }
    re.push('$');
    re
}

#[cfg(test)]
mod tests {
    use super::*;

    fn set(entries: &[(&str, PermissionLevel)]) -> PatternSet {
        let table = entries
            .iter()
            .map(|(p, l)| (p.to_string(), *l))
            .collect::<HashMap<_, _>>();
        PatternSet::compile(&table).unwrap()
    }

    fn kind_of(raw: &str) -> PatternKind {
        Pattern::compile(raw, PermissionLevel::Read).unwrap().kind()
    }

    #[test]
    fn test_classification() {
        assert_eq!(kind_of("Work Notes"), PatternKind::Exact);
        assert_eq!(kind_of("/Projects/Alpha/"), PatternKind::Exact);
        assert_eq!(kind_of("Work*"), PatternKind::Prefix);
        assert_eq!(kind_of("*/Confidential"), PatternKind::Suffix);
        assert_eq!(kind_of("Work*/Draft*"), PatternKind::Regex);
        assert_eq!(kind_of("Pro*ects"), PatternKind::Regex);
        assert_eq!(kind_of("/Projects/**"), PatternKind::Recursive);
        assert_eq!(kind_of("**"), PatternKind::Recursive);
    }

    #[test]
    fn test_empty_set_matches_nothing() {
        let patterns = PatternSet::empty();
        assert!(patterns.is_empty());
        assert_eq!(patterns.find_match("anything"), None);
        assert_eq!(patterns.find_match(""), None);
    }

    #[test]
    fn test_empty_pattern_rejected() {
        for raw in ["", "/", "//"] {
            let result = Pattern::compile(raw, PermissionLevel::Read);
            assert!(matches!(result, Err(ConfigError::InvalidPattern { .. })));
        }
    }

    #[test]
    fn test_exact_match() {
        let patterns = set(&[("Work Notes", PermissionLevel::Write)]);
        assert_eq!(
            patterns.find_match("Work Notes").map(|m| m.permission),
            Some(PermissionLevel::Write)
        );
        assert_eq!(patterns.find_match("Work Notes 2"), None);
        assert_eq!(patterns.find_match("work notes"), None);
    }

    #[test]
    fn test_slashes_are_normalized() {
        let patterns = set(&[("/Projects/Alpha/", PermissionLevel::Read)]);
        assert!(patterns.find_match("Projects/Alpha").is_some());
        assert!(patterns.find_match("/Projects/Alpha").is_some());
        assert!(patterns.find_match("Projects/Alpha/").is_some());
    }

    #[test]
    fn test_prefix_and_suffix() {
        let patterns = set(&[
            ("Work*", PermissionLevel::Write),
            ("*Archive", PermissionLevel::Read),
        ]);
        assert_eq!(
            patterns.find_match("Work Projects").unwrap().pattern,
            "Work*"
        );
        assert_eq!(
            patterns.find_match("2023 Archive").unwrap().pattern,
            "*Archive"
        );
        assert_eq!(patterns.find_match("Personal"), None);
    }

    #[test]
    fn test_single_star_stays_in_segment() {
        let patterns = set(&[("Work*/Draft*", PermissionLevel::Read)]);
        assert!(patterns.find_match("Work Projects/Draft A").is_some());
        assert!(patterns.find_match("Work/Sub/Draft A").is_none());
        assert!(patterns.find_match("Draft A").is_none());
    }

    #[test]
    fn test_recursive_crosses_segments() {
        let patterns = set(&[("/Projects/**", PermissionLevel::Read)]);
        assert!(patterns.find_match("Projects/a").is_some());
        assert!(patterns.find_match("Projects/a/b/c").is_some());
        assert!(patterns.find_match("Other/a").is_none());
    }

    #[test]
    fn test_regex_metacharacters_are_literal() {
        let patterns = set(&[
            ("C++ (notes)*", PermissionLevel::Read),
            ("Q1.*.md", PermissionLevel::Write),
        ]);
        assert!(patterns.find_match("C++ (notes) v2").is_some());
        assert!(patterns.find_match("CC (notes)").is_none());
        assert!(patterns.find_match("Q1.plan.md").is_some());
        assert!(patterns.find_match("Q1Xplan.md").is_none());
    }

    #[test]
    fn test_exact_beats_recursive() {
        let patterns = set(&[
            ("/**", PermissionLevel::None),
            ("Work Notes", PermissionLevel::Write),
        ]);
        let hit = patterns.find_match("Work Notes").unwrap();
        assert_eq!(hit.pattern, "Work Notes");
        assert_eq!(hit.permission, PermissionLevel::Write);
        assert_eq!(
            patterns.find_match("Other").unwrap().permission,
            PermissionLevel::None
        );
    }

    #[test]
    fn test_more_specific_wins() {
        let patterns = set(&[
            ("/Projects/**", PermissionLevel::Read),
            ("/Projects/public_*", PermissionLevel::Write),
        ]);
        for candidate in ["Projects/public_docs", "/Projects/public_", "Projects/public_x/"] {
            assert_eq!(
                patterns.find_match(candidate).unwrap().pattern,
                "/Projects/public_*",
                "candidate {candidate}"
            );
        }
        assert_eq!(
            patterns.find_match("Projects/private").unwrap().pattern,
            "/Projects/**"
        );
    }

    #[test]
    fn test_longer_literal_wins_within_class() {
        let patterns = set(&[
            ("Work*", PermissionLevel::Write),
            ("Work Archive*", PermissionLevel::Read),
        ]);
        assert_eq!(
            patterns.find_match("Work Archive 2023").unwrap().pattern,
            "Work Archive*"
        );
        assert_eq!(patterns.find_match("Work Today").unwrap().pattern, "Work*");
    }

    #[test]
    fn test_deeper_path_wins_on_equal_literals() {
        let patterns = set(&[
            ("ab*", PermissionLevel::Read),
            ("a/*", PermissionLevel::Write),
        ]);
        // Both have two literal characters; "a/*" has two segments
        let ordered: Vec<_> = patterns.patterns().iter().map(|p| p.source()).collect();
        assert_eq!(ordered, vec!["a/*", "ab*"]);
    }

    #[test]
    fn test_ties_break_on_pattern_text() {
        let patterns = set(&[
            ("b*x", PermissionLevel::Write),
            ("a*x", PermissionLevel::Read),
            ("*x", PermissionLevel::None),
        ]);
        let ordered: Vec<_> = patterns.patterns().iter().map(|p| p.source()).collect();
        assert_eq!(ordered, vec!["*x", "a*x", "b*x"]);
    }

    #[test]
    fn test_find_match_is_idempotent() {
        let patterns = set(&[
            ("Work*", PermissionLevel::Write),
            ("**", PermissionLevel::Read),
            ("*Notes", PermissionLevel::None),
        ]);
        for candidate in ["Work Notes", "My Notes", "x/y", ""] {
            assert_eq!(patterns.find_match(candidate), patterns.find_match(candidate));
        }
    }

    #[test]
    fn test_none_permission_is_a_match() {
        let patterns = set(&[("Private*", PermissionLevel::None)]);
        let hit = patterns.find_match("Private Docs").unwrap();
        assert_eq!(hit.permission, PermissionLevel::None);
    }

    #[test]
    fn test_glob_to_regex() {
        assert_eq!(glob_to_regex("a*b"), "^a[^/]*b$");
        assert_eq!(glob_to_regex("a/**"), "^a/.*$");
        assert_eq!(glob_to_regex("a.b/**/c*"), "^a\\.b/.*/c[^/]*$");
    }
}
