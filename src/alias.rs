//! Canonical identifiers for origin-system names.
//!
//! Upstream services disagree on how they spell a system: `Salesforce`,
//! `salesforce_crm`, `SFDC` and ` SalesForce ` all refer to one node. Every
//! spelling is folded to lowercase words, looked up in the alias tables, and
//! joined with `_`.

use std::collections::BTreeMap;

use once_cell::sync::Lazy;
use regex::Regex;

static SEPARATOR_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"[^a-z0-9]+").expect("valid separator regex"));

const MAX_ALIAS_HOPS: usize = 4;

const BUILTIN_ALIASES: &[(&str, &str)] = &[
    ("sfdc", "salesforce"),
    ("sf", "salesforce"),
    ("salesforce crm", "salesforce"),
    ("sales force", "salesforce"),
    ("hs", "hubspot"),
    ("hubspot crm", "hubspot"),
    ("hub spot", "hubspot"),
    ("pg", "postgres"),
    ("postgresql", "postgres"),
    ("postgres db", "postgres"),
    ("postgresql db", "postgres"),
    ("mysql db", "mysql"),
    ("mssql", "sql server"),
    ("ms sql", "sql server"),
    ("microsoft sql server", "sql server"),
    ("gsheets", "google sheets"),
    ("g sheets", "google sheets"),
    ("netsuite erp", "netsuite"),
    ("net suite", "netsuite"),
    ("sap erp", "sap"),
    ("zendesk support", "zendesk"),
    ("stripe payments", "stripe"),
    ("snowflake dw", "snowflake"),
    ("mongo", "mongodb"),
    ("mongo db", "mongodb"),
];

/// Folds raw names to `lowercase words separated by single spaces`.
pub fn fold_name(raw: &str) -> String {
    let lower = raw.trim().to_ascii_lowercase();
    SEPARATOR_RE.replace_all(&lower, " ").trim().to_string()
}

#[derive(Debug, Clone)]
pub struct AliasTable {
    aliases: BTreeMap<String, String>,
}

impl AliasTable {
    /// Built-in aliases with `extra` layered on top. Keys and values of
    /// `extra` may use any spelling.
    pub fn new(extra: &BTreeMap<String, String>) -> Self {
        let mut aliases: BTreeMap<String, String> = BTreeMap::new();
        for (alias, canonical) in BUILTIN_ALIASES {
            aliases.insert((*alias).to_string(), (*canonical).to_string());
        }
        for (alias, canonical) in extra {
            aliases.insert(fold_name(alias), fold_name(canonical));
        }
        Self { aliases }
    }

    /// Follows alias links (`sfdc -> salesforce -> crm`) to the final key.
    pub fn canonicalize(&self, raw: &str) -> String {
        let mut key = fold_name(raw);
        for _ in 0..MAX_ALIAS_HOPS {
            match self.aliases.get(&key) {
                Some(next) if *next != key => key = next.clone(),
                _ => break,
            }
        }
        key.replace(' ', "_")
    }

    /// Registers `alias` as another spelling of `canonical` (already a
    /// canonical key). Existing aliases win.
    pub fn register(&mut self, alias: &str, canonical: &str) {
        let folded = fold_name(alias);
        if folded.is_empty() || folded.replace(' ', "_") == canonical {
            return;
        }
        self.aliases
            .entry(folded)
            .or_insert_with(|| canonical.replace('_', " "));
    }
}

impl Default for AliasTable {
    fn default() -> Self {
        Self::new(&BTreeMap::new())
    }
}
