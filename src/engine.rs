use regex::{Captures, RegexBuilder};

use crate::report::Reporter;
use crate::rules::ReplaceRule;

#[derive(Debug)]
pub struct EngineOutcome {
    pub text: String,
    pub modified: bool,
    pub total_replacements: usize,
    /// (alias, count) for every rule that replaced at least once.
    pub per_rule: Vec<(String, usize)>,
}

/// Applies rules strictly in list order; each rule sees the output of the
/// previous one. A rule with an invalid regex pattern is logged and skipped,
/// the remaining rules still run.
pub fn apply_rules(content: &str, rules: &[ReplaceRule], reporter: &dyn Reporter) -> EngineOutcome {
    let mut text = content.to_string();
    let mut total = 0usize;
    let mut per_rule = Vec::new();

    for rule in rules {
        let count = if rule.use_regex {
            apply_regex(&mut text, rule, reporter)
        } else {
            apply_literal(&mut text, rule)
        };

        if count > 0 {
            total += count;
            per_rule.push((rule.alias.clone(), count));
            reporter.log(&format!(
                "applied rule '{}' ({count} replacement(s))",
                rule.alias
            ));
        }
    }

    EngineOutcome {
        modified: total > 0,
        total_replacements: total,
        per_rule,
        text,
    }
}

/// Replaces every non-overlapping occurrence left to right. The count is the
/// number of substitutions actually performed by this scan, independent of
/// how often the replacement text appears in the result.
fn apply_literal(text: &mut String, rule: &ReplaceRule) -> usize {
    if rule.find.is_empty() {
        return 0;
    }

    let mut out = String::with_capacity(text.len());
    let mut count = 0usize;
    let mut last = 0usize;
    for (idx, hit) in text.match_indices(rule.find.as_str()) {
        out.push_str(&text[last..idx]);
        out.push_str(&rule.replace);
        last = idx + hit.len();
        count += 1;
    }

    if count > 0 {
        out.push_str(&text[last..]);
        *text = out;
    }
    count
}

fn apply_regex(text: &mut String, rule: &ReplaceRule, reporter: &dyn Reporter) -> usize {
    let regex = match RegexBuilder::new(&rule.find)
        .dot_matches_new_line(true)
        .build()
    {
        Ok(regex) => regex,
        Err(err) => {
            reporter.log(&format!(
                "warning: skipping rule '{}': invalid pattern: {err}",
                rule.alias
            ));
            return 0;
        }
    };

    let mut count = 0usize;
    let replaced = regex.replace_all(text.as_str(), |caps: &Captures<'_>| {
        count += 1;
        let mut expansion = String::new();
        caps.expand(&rule.replace, &mut expansion);
        expansion
    });

    if count > 0 {
        let owned = replaced.into_owned();
        *text = owned;
    }
    count
}
