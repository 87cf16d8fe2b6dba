//! Alias-tolerant column resolution

use crate::error::{FlowcastError, Result};
use serde::{Deserialize, Serialize};

/// Maps canonical column names to the spelling variants seen in real exports.
///
/// Matching is normalized: trimmed, case-folded, with whitespace and
/// separator characters stripped, so "Value Date", "ValueDate" and
/// " value_date " all resolve to the same canonical column.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AliasTable {
    entries: Vec<AliasEntry>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
struct AliasEntry {
    canonical: String,
    variants: Vec<String>,
}

impl Default for AliasTable {
    fn default() -> Self {
        Self::new(&[
            ("date", &["date", "value date", "transaction date", "txn date", "posting date"][..]),
            ("amount", &["amount", "value", "transaction amount", "net amount"][..]),
            ("withdrawal", &["withdrawal", "withdrawal amt", "withdrawal amount", "debit"][..]),
            ("deposit", &["deposit", "deposit amt", "deposit amount", "credit"][..]),
        ])
    }
}

impl AliasTable {
    /// Build a table from (canonical, variants) pairs. The canonical name is
    /// always accepted as its own variant.
    pub fn new(pairs: &[(&str, &[&str])]) -> Self {
        let entries = pairs
            .iter()
            .map(|(canonical, variants)| {
                let mut vs: Vec<String> = variants.iter().map(|v| v.to_string()).collect();
                if !variants.iter().any(|v| normalize(v) == normalize(canonical)) {
                    vs.push(canonical.to_string());
                }
                AliasEntry { canonical: canonical.to_string(), variants: vs }
            })
            .collect();
        Self { entries }
    }

    /// Resolve a canonical column name to the actual header present in
    /// `headers`. Exactly one header must match; zero or several is a
    /// `ColumnResolution` error listing the available columns.
    pub fn resolve(&self, canonical: &str, headers: &[String]) -> Result<String> {
        let entry = self
            .entries
            .iter()
            .find(|e| e.canonical == canonical)
            .ok_or_else(|| FlowcastError::ColumnResolution {
                column: canonical.to_string(),
                reason: "no alias entry configured".to_string(),
                available: headers.to_vec(),
            })?;

        let normalized_variants: Vec<String> = entry.variants.iter().map(|v| normalize(v)).collect();
        let matches: Vec<&String> = headers
            .iter()
            .filter(|h| normalized_variants.contains(&normalize(h)))
            .collect();

        match matches.as_slice() {
            [single] => Ok((*single).clone()),
            [] => Err(FlowcastError::ColumnResolution {
                column: canonical.to_string(),
                reason: "no matching header".to_string(),
                available: headers.to_vec(),
            }),
            many => Err(FlowcastError::ColumnResolution {
                column: canonical.to_string(),
                reason: format!(
                    "ambiguous, {} headers match: {}",
                    many.len(),
                    many.iter().map(|s| s.as_str()).collect::<Vec<_>>().join(", ")
                ),
                available: headers.to_vec(),
            }),
        }
    }
}

/// Trim, case-fold and strip separators so spelling variants compare equal.
fn normalize(name: &str) -> String {
    name.chars()
        .filter(|c| c.is_ascii_alphanumeric())
        .collect::<String>()
        .to_lowercase()
}
