use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{ResubError, Result};

/// One find/replace rule. Rules live in an ordered list; list order is
/// application order. The JSON wire name for `use_regex` is `regex`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReplaceRule {
    pub alias: String,
    pub find: String,
    pub replace: String,
    #[serde(rename = "regex", default)]
    pub use_regex: bool,
}

impl ReplaceRule {
    pub fn literal(alias: &str, find: &str, replace: &str) -> Self {
        ReplaceRule {
            alias: alias.to_string(),
            find: find.to_string(),
            replace: replace.to_string(),
            use_regex: false,
        }
    }

    pub fn regex(alias: &str, find: &str, replace: &str) -> Self {
        ReplaceRule {
            use_regex: true,
            ..ReplaceRule::literal(alias, find, replace)
        }
    }
}

pub fn validate_rules(rules: &[ReplaceRule]) -> Result<()> {
    for (index, rule) in rules.iter().enumerate() {
        if rule.alias.is_empty() {
            return Err(ResubError::InvalidRule {
                index,
                alias: rule.alias.clone(),
                reason: "alias must not be empty".to_string(),
            });
        }
        if rule.find.is_empty() {
            return Err(ResubError::InvalidRule {
                index,
                alias: rule.alias.clone(),
                reason: "find text must not be empty".to_string(),
            });
        }
    }
    Ok(())
}

/// Loads an ordered rule list from a JSON array of
/// `{alias, find, replace, regex}` objects. A malformed file is an error and
/// leaves the caller's in-memory rules untouched.
pub fn load_rules(path: &Path) -> Result<Vec<ReplaceRule>> {
    let data = fs::read_to_string(path).map_err(|err| ResubError::file_read(path, err))?;
    let rules: Vec<ReplaceRule> =
        serde_json::from_str(&data).map_err(|err| ResubError::RuleParse {
            path: path.display().to_string(),
            reason: err.to_string(),
        })?;
    validate_rules(&rules)?;
    Ok(rules)
}

/// Writes the rule list as pretty-printed UTF-8 JSON.
pub fn save_rules(path: &Path, rules: &[ReplaceRule]) -> Result<()> {
    let json = serde_json::to_string_pretty(rules).map_err(|err| ResubError::RuleParse {
        path: path.display().to_string(),
        reason: err.to_string(),
    })?;
    fs::write(path, json).map_err(|err| ResubError::file_write(path, err))
}
