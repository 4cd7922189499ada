//! Pre-flight checks on caller input.
//!
//! Operations that declare constraints run `validate` before anything is
//! prepared. The first violated rule aborts the call. Validation only reads
//! its input.

use std::fmt;
use std::sync::OnceLock;

use regex::Regex;

use crate::error::ValidationError;

/// A value under validation. `None` means the caller left it unset.
#[derive(Debug, Clone, Copy)]
pub enum Value<'a> {
    Str(Option<&'a str>),
    Int(Option<i64>),
}

impl Value<'_> {
    fn is_present(&self) -> bool {
        match self {
            Value::Str(v) => v.is_some(),
            Value::Int(v) => v.is_some(),
        }
    }
}

impl<'a> From<&'a str> for Value<'a> {
    fn from(v: &'a str) -> Self {
        Value::Str(Some(v))
    }
}

impl<'a> From<Option<&'a str>> for Value<'a> {
    fn from(v: Option<&'a str>) -> Self {
        Value::Str(v)
    }
}

impl From<Option<i32>> for Value<'_> {
    fn from(v: Option<i32>) -> Self {
        Value::Int(v.map(i64::from))
    }
}

/// A regular expression compiled on first use and kept afterwards.
///
/// Declared as a `static` so every check against it shares one compiled
/// `Regex`.
pub struct Pattern {
    source: &'static str,
    compiled: OnceLock<Result<Regex, regex::Error>>,
}

impl Pattern {
    pub const fn new(source: &'static str) -> Self {
        Self {
            source,
            compiled: OnceLock::new(),
        }
    }

    pub fn source(&self) -> &'static str {
        self.source
    }

    pub fn regex(&self) -> Result<&Regex, &regex::Error> {
        self.compiled.get_or_init(|| Regex::new(self.source)).as_ref()
    }
}

impl fmt::Debug for Pattern {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("Pattern").field(&self.source).finish()
    }
}

impl PartialEq for Pattern {
    fn eq(&self, other: &Self) -> bool {
        self.source == other.source
    }
}

impl Eq for Pattern {}

/// A single declared rule.
///
/// `Required` and `ReadOnly` look at presence. Every other rule applies only
/// when the value is present, so an optional value that was left unset
/// passes them.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Rule {
    Required,
    ReadOnly,
    MaxLength(usize),
    MinLength(usize),
    Pattern(&'static Pattern),
    InclusiveMinimum(i64),
}

impl Rule {
    fn name(&self) -> &'static str {
        match self {
            Rule::Required => "Required",
            Rule::ReadOnly => "ReadOnly",
            Rule::MaxLength(_) => "MaxLength",
            Rule::MinLength(_) => "MinLength",
            Rule::Pattern(_) => "Pattern",
            Rule::InclusiveMinimum(_) => "InclusiveMinimum",
        }
    }

    fn expected(&self) -> String {
        match self {
            Rule::Required => "a value".to_string(),
            Rule::ReadOnly => "no value".to_string(),
            Rule::MaxLength(n) => format!("at most {n} characters"),
            Rule::MinLength(n) => format!("at least {n} characters"),
            Rule::Pattern(p) => match p.regex() {
                Ok(_) => format!("match for {}", p.source()),
                Err(e) => format!("a valid pattern, but {} does not compile: {e}", p.source()),
            },
            Rule::InclusiveMinimum(n) => format!(">= {n}"),
        }
    }
}

/// The rules declared for one field.
#[derive(Debug, Clone)]
pub struct Check<'a> {
    pub target: &'static str,
    pub value: Value<'a>,
    pub rules: &'static [Rule],
}

impl<'a> Check<'a> {
    pub fn new(target: &'static str, value: impl Into<Value<'a>>, rules: &'static [Rule]) -> Self {
        Self {
            target,
            value: value.into(),
            rules,
        }
    }
}

/// Runs every check in order and returns the first violation.
pub fn validate(checks: &[Check<'_>]) -> Result<(), ValidationError> {
    for check in checks {
        for rule in check.rules {
            if !satisfies(&check.value, rule) {
                return Err(ValidationError {
                    field: check.target.to_string(),
                    rule: rule.name(),
                    expected: rule.expected(),
                });
            }
        }
    }
    Ok(())
}

fn satisfies(value: &Value<'_>, rule: &Rule) -> bool {
    match rule {
        Rule::Required => return value.is_present(),
        Rule::ReadOnly => return !value.is_present(),
        _ => {}
    }

    match (value, rule) {
        (Value::Str(Some(s)), Rule::MaxLength(n)) => s.chars().count() <= *n,
        (Value::Str(Some(s)), Rule::MinLength(n)) => s.chars().count() >= *n,
        (Value::Str(Some(s)), Rule::Pattern(p)) => match p.regex() {
            Ok(re) => re.is_match(s),
            Err(e) => {
                tracing::error!(pattern = p.source(), error = %e, "validation pattern does not compile");
                false
            }
        },
        (Value::Int(Some(v)), Rule::InclusiveMinimum(n)) => v >= n,
        _ => true,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    static LOWERCASE: Pattern = Pattern::new(r"^[a-z]+$");
    static NAME_RULES: &[Rule] = &[Rule::MaxLength(10), Rule::MinLength(1), Rule::Pattern(&LOWERCASE)];

    #[test]
    fn valid_input_passes() {
        assert!(validate(&[Check::new("name", "abc", NAME_RULES)]).is_ok());
    }

    #[test]
    fn reports_field_rule_and_bound() {
        let err = validate(&[Check::new("name", "abcdefghijkl", NAME_RULES)]).unwrap_err();
        assert_eq!(err.field, "name");
        assert_eq!(err.rule, "MaxLength");
        assert_eq!(err.expected, "at most 10 characters");
    }

    #[test]
    fn empty_string_fails_min_length() {
        let err = validate(&[Check::new("name", "", NAME_RULES)]).unwrap_err();
        assert_eq!(err.rule, "MinLength");
    }

    #[test]
    fn pattern_mismatch() {
        let err = validate(&[Check::new("name", "ABC", NAME_RULES)]).unwrap_err();
        assert_eq!(err.rule, "Pattern");
    }

    #[test]
    fn unset_optional_skips_chained_rules() {
        let rules: &[Rule] = &[Rule::InclusiveMinimum(1)];
        assert!(validate(&[Check::new("top", None::<i32>, rules)]).is_ok());
        let err = validate(&[Check::new("top", Some(0i32), rules)]).unwrap_err();
        assert_eq!(err.field, "top");
        assert_eq!(err.expected, ">= 1");
    }

    #[test]
    fn required_and_read_only() {
        let err = validate(&[Check::new("parameters.location", None::<&str>, &[Rule::Required])])
            .unwrap_err();
        assert_eq!(err.rule, "Required");

        let err = validate(&[Check::new("parameters.id", Some("x"), &[Rule::ReadOnly])]).unwrap_err();
        assert_eq!(err.rule, "ReadOnly");
    }

    #[test]
    fn first_violation_wins() {
        let err = validate(&[
            Check::new("a", "ok", NAME_RULES),
            Check::new("b", Value::Int(Some(0)), &[Rule::InclusiveMinimum(10)]),
            Check::new("c", "", NAME_RULES),
        ])
        .unwrap_err();
        assert_eq!(err.field, "b");
    }

    #[test]
    fn pattern_compiles_once() {
        let first: *const Regex = LOWERCASE.regex().unwrap();
        assert!(validate(&[Check::new("name", "abc", NAME_RULES)]).is_ok());
        let second: *const Regex = LOWERCASE.regex().unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn broken_pattern_is_reported() {
        static BROKEN: Pattern = Pattern::new(r"^[a-z");
        static RULES: &[Rule] = &[Rule::Pattern(&BROKEN)];
        assert!(BROKEN.regex().is_err());
        let err = validate(&[Check::new("name", "abc", RULES)]).unwrap_err();
        assert_eq!(err.rule, "Pattern");
        assert!(err.expected.contains("does not compile"), "{}", err.expected);
    }

    #[test]
    fn length_counts_characters() {
        let rules: &[Rule] = &[Rule::MaxLength(3)];
        assert!(validate(&[Check::new("n", "äöü", rules)]).is_ok());
    }
}
