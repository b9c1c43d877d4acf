//! Rule tag parser.
//!
//! Grammar: rules are separated by `;`, each either a bare name or
//! `name(p1, p2, ...)`. One `Match(/.../)` or `NoMatch(/.../)` clause may
//! appear anywhere; it is cut out before splitting so the pattern can
//! contain `;`, `,` and parentheses.

use regex::Regex;

use crate::error::{Error, Result};
use crate::registry::{Param, Registry};

const PATTERN_CLOSE: &str = "/)";

/// One parsed rule, ready for dispatch.
#[derive(Debug, Clone, PartialEq)]
pub struct Rule {
    name: String,
    params: Vec<Param>,
    key: String,
}

impl Rule {
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Coerced parameters, excluding the key.
    pub fn params(&self) -> &[Param] {
        &self.params
    }

    /// `"<field>.<rule>.<label>"`
    pub fn key(&self) -> &str {
        &self.key
    }
}

fn rule_key(field: &str, name: &str, label: &str) -> String {
    let label = if label.is_empty() { field } else { label };
    format!("{field}.{name}.{label}")
}

/// Whether `index` starts a clause: start of tag, or after `;` or whitespace.
fn at_clause_start(tag: &str, index: usize) -> bool {
    tag[..index]
        .chars()
        .next_back()
        .map_or(true, |c| c == ';' || c.is_whitespace())
}

/// Location of a regex clause inside a tag.
struct PatternClause {
    name: &'static str,
    start: usize,
    pattern_start: usize,
}

fn find_pattern_clause(tag: &str) -> Option<PatternClause> {
    const OPEN: &str = "Match(/";

    tag.match_indices(OPEN).find_map(|(index, _)| {
        let pattern_start = index + OPEN.len();
        if tag[..index].ends_with("No") && at_clause_start(tag, index - 2) {
            Some(PatternClause {
                name: "NoMatch",
                start: index - 2,
                pattern_start,
            })
        } else if at_clause_start(tag, index) {
            Some(PatternClause {
                name: "Match",
                start: index,
                pattern_start,
            })
        } else {
            None
        }
    })
}

fn parse_clause(clause: &str, field: &str, label: &str, registry: &Registry) -> Result<Rule> {
    let (name, raw) = match clause.find('(') {
        None => (clause, Vec::new()),
        Some(open) => {
            let close = clause
                .find(')')
                .filter(|&close| close > open)
                .ok_or_else(|| Error::Malformed(clause.to_string()))?;
            if !clause[close + 1..].trim().is_empty() {
                return Err(Error::Malformed(clause.to_string()));
            }
            let inner = clause[open + 1..close].trim();
            let raw = if inner.is_empty() {
                Vec::new()
            } else {
                inner.split(',').map(str::trim).collect()
            };
            (clause[..open].trim(), raw)
        }
    };

    let kinds = registry.param_kinds(name)?;
    if kinds.len() != raw.len() {
        return Err(Error::ParamCount {
            name: name.to_string(),
            expected: kinds.len(),
            found: raw.len(),
        });
    }

    let params = kinds
        .iter()
        .zip(raw)
        .map(|(kind, text)| kind.coerce(text))
        .collect::<Result<Vec<_>>>()?;

    Ok(Rule {
        name: name.to_string(),
        params,
        key: rule_key(field, name, label),
    })
}

fn parse_clauses(
    text: &str,
    field: &str,
    label: &str,
    registry: &Registry,
    rules: &mut Vec<Rule>,
) -> Result<()> {
    for clause in text.split(';').map(str::trim).filter(|c| !c.is_empty()) {
        rules.push(parse_clause(clause, field, label, registry)?);
    }
    Ok(())
}

/// Parse a rule tag into its rules, in declaration order.
///
/// Any error discards the whole list.
///
/// ## Example
///
/// ```rust
/// use tagvalid::{parse_tag, Param, Registry};
///
/// let rules = parse_tag("Required;Min(3)", "Age", "年龄", &Registry::new()).unwrap();
/// assert_eq!(rules[1].key(), "Age.Min.年龄");
/// assert_eq!(rules[1].params(), &[Param::Int(3)]);
/// ```
pub fn parse_tag(tag: &str, field: &str, label: &str, registry: &Registry) -> Result<Vec<Rule>> {
    let tag = tag.trim();
    let mut rules = Vec::new();

    let Some(clause) = find_pattern_clause(tag) else {
        parse_clauses(tag, field, label, registry, &mut rules)?;
        return Ok(rules);
    };

    let end = tag
        .rfind(PATTERN_CLOSE)
        .filter(|&end| end >= clause.pattern_start)
        .ok_or(Error::InvalidMatch(clause.name))?;
    let regex = Regex::new(&tag[clause.pattern_start..end])?;

    parse_clauses(&tag[..clause.start], field, label, registry, &mut rules)?;
    // A replaced or missing Match/NoMatch still surfaces as UnknownRule.
    registry.param_kinds(clause.name)?;
    rules.push(Rule {
        name: clause.name.to_string(),
        params: vec![Param::Regex(regex)],
        key: rule_key(field, clause.name, label),
    });
    parse_clauses(
        &tag[end + PATTERN_CLOSE.len()..],
        field,
        label,
        registry,
        &mut rules,
    )?;

    Ok(rules)
}
