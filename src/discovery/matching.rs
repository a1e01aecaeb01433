//! Title-based reconciliation between remote candidates and the local
//! library.
//!
//! The two catalogs share no identifier, so matching goes through a
//! normalized title key with a year tie-break. Pure functions; a matching
//! pass never touches the network.

use crate::models::{Candidate, LibraryItem};
use std::collections::{HashMap, HashSet};

/// Canonical form of a title for matching: lowercase, parenthetical
/// content stripped, non-alphanumeric runs collapsed to single spaces,
/// trimmed. Idempotent.
///
/// "The Matrix (1999)" and "the matrix" normalize to the same key.
pub fn normalize_title(title: &str) -> String {
    let stripped = strip_parentheticals(title);

    let mut normalized = String::with_capacity(stripped.len());
    for c in stripped.to_lowercase().chars() {
        if c.is_ascii_alphanumeric() {
            normalized.push(c);
        } else if !normalized.is_empty() && !normalized.ends_with(' ') {
            normalized.push(' ');
        }
    }
    normalized.trim_end().to_string()
}

/// Remove `(...)` groups, replacing each with a separator. An unmatched
/// `(` is not a group; the text after it is kept.
fn strip_parentheticals(title: &str) -> String {
    let mut out = String::with_capacity(title.len());
    let mut rest = title;
    while let Some(start) = rest.find('(') {
        let Some(len) = rest[start..].find(')') else {
            break;
        };
        out.push_str(&rest[..start]);
        out.push(' ');
        rest = &rest[start + len + 1..];
    }
    out.push_str(rest);
    out
}

/// Resolve candidates against the library by normalized title.
///
/// Deterministic given stable input ordering. Each library item is claimed
/// by at most one candidate per pass; a candidate with no unclaimed
/// same-kind item under its title key is silently skipped. When the
/// candidate carries a year, an exact production-year match is preferred
/// over the first remaining item in library order.
pub fn match_candidates(library: &[LibraryItem], candidates: &[Candidate]) -> Vec<LibraryItem> {
    let mut by_title: HashMap<String, Vec<&LibraryItem>> = HashMap::new();
    for item in library {
        let key = normalize_title(&item.name);
        if key.is_empty() {
            continue;
        }
        by_title.entry(key).or_default().push(item);
    }

    let mut used_ids: HashSet<&str> = HashSet::new();
    let mut matched = Vec::new();

    for candidate in candidates {
        let key = normalize_title(&candidate.title);
        if key.is_empty() {
            continue;
        }
        let Some(pool) = by_title.get(&key) else {
            continue;
        };

        let eligible: Vec<&LibraryItem> = pool
            .iter()
            .copied()
            .filter(|item| item.kind == candidate.kind && !used_ids.contains(item.id.as_str()))
            .collect();
        if eligible.is_empty() {
            continue;
        }

        let picked = candidate
            .year
            .and_then(|year| {
                eligible
                    .iter()
                    .copied()
                    .find(|item| item.production_year == Some(year))
            })
            .unwrap_or(eligible[0]);

        used_ids.insert(picked.id.as_str());
        matched.push(picked.clone());
    }

    matched
}
