//! Smart parsing rule evaluation.
//!
//! Rules for a field run in descending priority order (stable for ties),
//! each one rewriting the output of the previous. A rule whose pattern does
//! not compile is skipped and logged; its siblings still run.
//!
//! This module contains no database access. The caller loads the rules and
//! decides when to normalize a field.

use std::borrow::Cow;

use regex::{NoExpand, Regex};
use serde::Serialize;
use uuid::Uuid;

use crate::models::parsing_rule::{RuleFieldType, SmartParsingRule};

/// Errors raised while evaluating a single rule.
#[derive(Debug, thiserror::Error)]
pub enum RuleError {
    #[error("Invalid pattern in rule '{name}': {source}")]
    InvalidPattern {
        name: String,
        #[source]
        source: regex::Error,
    },
}

/// Outcome of running every active rule for a field over a value.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RuleApplication {
    pub text: String,
    /// Rules that changed the text, in evaluation order.
    pub applied_rule_ids: Vec<Uuid>,
    /// Rules skipped because their pattern does not compile.
    pub skipped_rule_ids: Vec<Uuid>,
}

/// Active rules for `field`, highest priority first. Ties keep input order.
pub fn active_rules_for(
    rules: &[SmartParsingRule],
    field: RuleFieldType,
) -> Vec<&SmartParsingRule> {
    let mut selected: Vec<&SmartParsingRule> = rules
        .iter()
        .filter(|r| r.is_active && r.field_type == field)
        .collect();
    selected.sort_by(|a, b| b.priority.cmp(&a.priority));
    selected
}

/// Check that a pattern would compile the way [`apply_rule`] compiles it.
pub fn validate_pattern(pattern: &str, is_regex: bool) -> Result<(), regex::Error> {
    compile(pattern, is_regex).map(|_| ())
}

/// Apply one rule to `text`.
///
/// Regex rules compile the pattern as written and expand `$1`-style group
/// references in the replacement. Literal rules replace every
/// case-insensitive occurrence of the pattern with the replacement verbatim.
pub fn apply_rule(rule: &SmartParsingRule, text: &str) -> Result<String, RuleError> {
    let re = compile(&rule.pattern, rule.is_regex).map_err(|source| RuleError::InvalidPattern {
        name: rule.name.clone(),
        source,
    })?;

    let replaced = if rule.is_regex {
        let replacement = braced_group_refs(&rule.replacement, re.captures_len());
        re.replace_all(text, replacement.as_ref()).into_owned()
    } else {
        re.replace_all(text, NoExpand(&rule.replacement)).into_owned()
    };
    Ok(replaced)
}

/// Run every active rule for `field` over `text` in priority order.
pub fn apply_rules(
    rules: &[SmartParsingRule],
    field: RuleFieldType,
    text: &str,
) -> RuleApplication {
    let mut current = text.to_string();
    let mut applied_rule_ids = Vec::new();
    let mut skipped_rule_ids = Vec::new();

    for rule in active_rules_for(rules, field) {
        match apply_rule(rule, &current) {
            Ok(next) => {
                if next != current {
                    applied_rule_ids.push(rule.id);
                    current = next;
                }
            }
            Err(e) => {
                tracing::warn!(rule_id = %rule.id, error = %e, "Skipping malformed parsing rule");
                skipped_rule_ids.push(rule.id);
            }
        }
    }

    RuleApplication {
        text: current,
        applied_rule_ids,
        skipped_rule_ids,
    }
}

fn compile(pattern: &str, is_regex: bool) -> Result<Regex, regex::Error> {
    if is_regex {
        Regex::new(pattern)
    } else {
        Regex::new(&format!("(?i){}", regex::escape(pattern)))
    }
}

/// Rewrite `$1`..`$99` as `${1}`..`${99}` so a group reference followed by
/// letters (`$1oz`) still means the group. A second digit only joins the
/// reference when that group exists (`group_count` includes group 0), so with
/// one group `$10ml` is group 1 followed by `0ml`.
fn braced_group_refs(replacement: &str, group_count: usize) -> Cow<'_, str> {
    if !replacement.contains('$') {
        return Cow::Borrowed(replacement);
    }
    let mut out = String::with_capacity(replacement.len() + 4);
    let mut chars = replacement.chars().peekable();
    while let Some(c) = chars.next() {
        if c != '$' {
            out.push(c);
            continue;
        }
        match chars.peek() {
            Some('$') => {
                chars.next();
                out.push_str("$$");
            }
            Some(&first) if first.is_ascii_digit() => {
                chars.next();
                let mut group = String::from(first);
                if let Some(&second) = chars.peek().filter(|d| d.is_ascii_digit()) {
                    let two_digit = format!("{first}{second}");
                    if two_digit.parse::<usize>().is_ok_and(|n| n < group_count) {
                        group = two_digit;
                        chars.next();
                    }
                }
                out.push_str(&format!("${{{group}}}"));
            }
            _ => out.push('$'),
        }
    }
    Cow::Owned(out)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    fn rule(
        name: &str,
        field: RuleFieldType,
        pattern: &str,
        replacement: &str,
        is_regex: bool,
        priority: i32,
    ) -> SmartParsingRule {
        SmartParsingRule {
            id: Uuid::new_v4(),
            name: name.to_string(),
            field_type: field,
            pattern: pattern.to_string(),
            replacement: replacement.to_string(),
            is_regex,
            priority,
            is_active: true,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    #[test]
    fn regex_rule_replaces_word() {
        let r = rule("od", RuleFieldType::DosePattern, r"\bOD\b", "1-0-0", true, 0);
        assert_eq!(apply_rule(&r, "Take OD").unwrap(), "Take 1-0-0");
    }

    #[test]
    fn regex_rule_expands_group_references() {
        let r = rule("oz", RuleFieldType::Quantity, r"(\d+)\s*ounce", "$1oz", true, 0);
        assert_eq!(apply_rule(&r, "2 ounce").unwrap(), "2oz");
    }

    #[test]
    fn regex_rule_keeps_escaped_dollar() {
        let r = rule("cost", RuleFieldType::Quantity, r"(\d+)", "$$$1", true, 0);
        assert_eq!(apply_rule(&r, "5").unwrap(), "$5");
    }

    #[test]
    fn literal_rule_is_case_insensitive_and_verbatim() {
        let r = rule("tabs", RuleFieldType::DoseForm, "Tabs", "tablets ($1)", false, 0);
        assert_eq!(apply_rule(&r, "4 TABS").unwrap(), "4 tablets ($1)");
    }

    #[test]
    fn literal_rule_escapes_metacharacters() {
        let r = rule("dot", RuleFieldType::Quantity, "1.5", "3/2", false, 0);
        assert_eq!(apply_rule(&r, "1.5oz 105").unwrap(), "3/2oz 105");
    }

    #[test]
    fn higher_priority_rule_runs_first() {
        let low = rule("low", RuleFieldType::DosePattern, "OD", "0-0-1", false, 5);
        let high = rule("high", RuleFieldType::DosePattern, "OD", "1-0-0", false, 10);
        let rules = vec![low.clone(), high.clone()];

        let ordered = active_rules_for(&rules, RuleFieldType::DosePattern);
        assert_eq!(ordered[0].id, high.id);
        assert_eq!(ordered[1].id, low.id);

        let result = apply_rules(&rules, RuleFieldType::DosePattern, "OD");
        assert_eq!(result.text, "1-0-0");
        assert_eq!(result.applied_rule_ids, vec![high.id]);
    }

    #[test]
    fn equal_priorities_keep_input_order() {
        let a = rule("a", RuleFieldType::Duration, "wk", "week", false, 3);
        let b = rule("b", RuleFieldType::Duration, "week", "weeks", false, 3);
        let rules = vec![a.clone(), b.clone()];
        let ordered = active_rules_for(&rules, RuleFieldType::Duration);
        assert_eq!(ordered[0].id, a.id);
        assert_eq!(ordered[1].id, b.id);
        assert_eq!(apply_rules(&rules, RuleFieldType::Duration, "2 wk").text, "2 weeks");
    }

    #[test]
    fn inactive_rules_are_excluded() {
        let mut r = rule("off", RuleFieldType::Quantity, "bottle", "2oz", false, 1);
        r.is_active = false;
        let rules = vec![r];
        assert!(active_rules_for(&rules, RuleFieldType::Quantity).is_empty());
        assert_eq!(apply_rules(&rules, RuleFieldType::Quantity, "bottle").text, "bottle");
    }

    #[test]
    fn other_fields_are_ignored() {
        let r = rule("form", RuleFieldType::DoseForm, "tabs", "tablets", false, 1);
        let rules = vec![r];
        assert!(active_rules_for(&rules, RuleFieldType::Quantity).is_empty());
    }

    #[test]
    fn malformed_rule_is_skipped_and_siblings_apply() {
        let broken = rule("broken", RuleFieldType::DosePattern, r"(\bOD", "x", true, 10);
        let good = rule("good", RuleFieldType::DosePattern, r"\bBD\b", "1-0-1", true, 1);
        let rules = vec![broken.clone(), good.clone()];

        let result = apply_rules(&rules, RuleFieldType::DosePattern, "BD");
        assert_eq!(result.text, "1-0-1");
        assert_eq!(result.skipped_rule_ids, vec![broken.id]);
        assert_eq!(result.applied_rule_ids, vec![good.id]);
    }

    #[test]
    fn apply_rule_reports_invalid_pattern() {
        let broken = rule("broken", RuleFieldType::Quantity, "[", "", true, 0);
        let err = apply_rule(&broken, "x").unwrap_err();
        assert!(err.to_string().contains("broken"));
    }

    #[test]
    fn validate_pattern_only_checks_regex_syntax_for_regex_rules() {
        assert!(validate_pattern("[", true).is_err());
        assert!(validate_pattern("[", false).is_ok());
    }

    #[test]
    fn trailing_digit_after_the_last_group_is_literal() {
        let r = rule("unit", RuleFieldType::Quantity, r"(\d)x", "$10ml", true, 0);
        assert_eq!(apply_rule(&r, "3x").unwrap(), "30ml");
    }

    #[test]
    fn two_digit_group_ref_when_the_group_exists() {
        let pattern = r"(a)(b)(c)(d)(e)(f)(g)(h)(i)(j)(k)";
        let r = rule("eleven", RuleFieldType::Quantity, pattern, "$11!", true, 0);
        assert_eq!(apply_rule(&r, "abcdefghijk").unwrap(), "k!");
    }

    #[test]
    fn group_refs_are_braced() {
        assert_eq!(braced_group_refs("$1oz", 2), "${1}oz");
        assert_eq!(braced_group_refs("$12-$3", 13), "${12}-${3}");
        assert_eq!(braced_group_refs("$12-$3", 4), "${1}2-${3}");
        assert_eq!(braced_group_refs("${name}", 2), "${name}");
        assert_eq!(braced_group_refs("plain", 1), "plain");
    }
}
