//! Column resolution against header spelling variance.
//!
//! Every report and importer describes the headers it needs as an alias table
//! (logical name -> ordered candidate spellings) and resolves them through
//! [`resolve_column`]. Three passes, strictest first:
//!
//! 1. case-insensitive equality after trimming and collapsing whitespace runs
//! 2. equality after dropping spaces, underscores, `%` and parentheses
//! 3. containment either way on the pass-2 form, for strings of 3+ chars
//!
//! Tables built with [`AliasTable::exact_only`] stop after pass 2.

use serde::Deserialize;

use crate::error::ReconError;

/// Minimum normalized length for the containment pass. Shorter tokens
/// ("WH", "No") match far too many headers.
const MIN_CONTAINMENT_LEN: usize = 3;

/// A logical field plus its acceptable header spellings, in preference order.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct ColumnAlias {
    pub name: String,
    pub candidates: Vec<String>,
}

impl ColumnAlias {
    pub fn new(name: &str, candidates: &[&str]) -> Self {
        Self {
            name: name.to_string(),
            candidates: candidates.iter().map(|c| c.to_string()).collect(),
        }
    }

    pub fn resolve<'h>(&self, headers: &'h [String]) -> Option<&'h str> {
        resolve_column(headers, &self.candidates)
    }
}

/// Ordered set of column aliases.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AliasTable {
    aliases: Vec<ColumnAlias>,
    exact_only: bool,
}

/// Outcome of resolving several logical fields against one header row.
#[derive(Debug, Clone, Default)]
pub struct Resolution {
    /// (logical name, column index) for every field that resolved.
    pub found: Vec<(String, usize)>,
    /// Logical names that did not resolve.
    pub missing: Vec<String>,
}

impl Resolution {
    pub fn index_of(&self, name: &str) -> Option<usize> {
        self.found.iter().find(|(n, _)| n == name).map(|(_, i)| *i)
    }
}

impl AliasTable {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, name: &str, candidates: &[&str]) -> Self {
        self.insert(ColumnAlias::new(name, candidates));
        self
    }

    /// Skip the containment pass. For sheets whose headers are short, generic
    /// words ("Name", "Date") that would otherwise match unrelated columns.
    pub fn exact_only(mut self) -> Self {
        self.exact_only = true;
        self
    }

    fn index_in(&self, headers: &[String], candidates: &[String]) -> Option<usize> {
        if self.exact_only {
            resolve_index_exact(headers, candidates)
        } else {
            resolve_index(headers, candidates)
        }
    }

    /// Add or replace the alias for `alias.name`.
    pub fn insert(&mut self, alias: ColumnAlias) {
        if let Some(existing) = self.aliases.iter_mut().find(|a| a.name == alias.name) {
            *existing = alias;
        } else {
            self.aliases.push(alias);
        }
    }

    pub fn get(&self, name: &str) -> Option<&ColumnAlias> {
        self.aliases.iter().find(|a| a.name == name)
    }

    pub fn iter(&self) -> impl Iterator<Item = &ColumnAlias> {
        self.aliases.iter()
    }

    pub fn len(&self) -> usize {
        self.aliases.len()
    }

    pub fn is_empty(&self) -> bool {
        self.aliases.is_empty()
    }

    /// Resolve `fields` against `headers`, collecting every miss.
    pub fn resolve_all(&self, headers: &[String], fields: &[&str]) -> Result<Resolution, ReconError> {
        let mut resolution = Resolution::default();
        for &field in fields {
            let alias = self
                .get(field)
                .ok_or_else(|| ReconError::UnknownField(field.to_string()))?;
            match self.index_in(headers, &alias.candidates) {
                Some(idx) => {
                    log::debug!("column '{}' -> '{}'", field, headers[idx]);
                    resolution.found.push((field.to_string(), idx));
                }
                None => resolution.missing.push(field.to_string()),
            }
        }
        Ok(resolution)
    }

    /// Like [`resolve_all`](Self::resolve_all), but every field is required.
    pub fn require(&self, sheet: &str, headers: &[String], fields: &[&str]) -> Result<Resolution, ReconError> {
        let resolution = self.resolve_all(headers, fields)?;
        if resolution.missing.is_empty() {
            Ok(resolution)
        } else {
            Err(ReconError::MissingColumns {
                sheet: sheet.to_string(),
                fields: resolution.missing,
            })
        }
    }
}

impl FromIterator<ColumnAlias> for AliasTable {
    fn from_iter<T: IntoIterator<Item = ColumnAlias>>(iter: T) -> Self {
        let mut table = Self::new();
        for alias in iter {
            table.insert(alias);
        }
        table
    }
}

/// Trim, lowercase, and collapse internal whitespace runs to one space.
fn fold_exact(s: &str) -> String {
    s.split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
        .to_lowercase()
}

/// Lowercase with spaces, underscores, `%` and parentheses removed.
fn fold_loose(s: &str) -> String {
    s.chars()
        .filter(|c| !c.is_whitespace() && !matches!(c, '_' | '%' | '(' | ')'))
        .flat_map(char::to_lowercase)
        .collect()
}

/// Return the header that best matches any of `candidates`, or `None`.
pub fn resolve_column<'h>(headers: &'h [String], candidates: &[String]) -> Option<&'h str> {
    resolve_index(headers, candidates).map(|i| headers[i].as_str())
}

/// Index form of [`resolve_column`].
pub fn resolve_index(headers: &[String], candidates: &[String]) -> Option<usize> {
    resolve_index_exact(headers, candidates).or_else(|| resolve_contained(headers, candidates))
}

/// Passes 1 and 2 only.
pub fn resolve_index_exact(headers: &[String], candidates: &[String]) -> Option<usize> {
    let exact: Vec<String> = headers.iter().map(|h| fold_exact(h)).collect();
    for cand in candidates {
        let c = fold_exact(cand);
        if c.is_empty() {
            continue;
        }
        if let Some(i) = exact.iter().position(|h| *h == c) {
            return Some(i);
        }
    }

    let loose: Vec<String> = headers.iter().map(|h| fold_loose(h)).collect();
    for cand in candidates {
        let c = fold_loose(cand);
        if c.is_empty() {
            continue;
        }
        if let Some(i) = loose.iter().position(|h| *h == c) {
            return Some(i);
        }
    }

    None
}

fn resolve_contained(headers: &[String], candidates: &[String]) -> Option<usize> {
    let loose: Vec<String> = headers.iter().map(|h| fold_loose(h)).collect();
    for cand in candidates {
        let c = fold_loose(cand);
        if c.chars().count() < MIN_CONTAINMENT_LEN {
            continue;
        }
        let hit = loose.iter().position(|h| {
            !h.is_empty()
                && (h.contains(c.as_str())
                    || (h.chars().count() >= MIN_CONTAINMENT_LEN && c.contains(h.as_str())))
        });
        if let Some(i) = hit {
            return Some(i);
        }
    }

    None
}
