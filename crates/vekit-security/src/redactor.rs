//! PII redaction engine

use regex::{Captures, Regex};
use serde::{Deserialize, Serialize};
use vekit_core::{Error, Result};

/// Built-in PII rules, applied in this order
pub const DEFAULT_PII_RULES: &[(&str, &str)] = &[
    ("phone number", r"1[3-9]\d{9}"),
    // 17 digits plus a check digit or X
    ("ID card number", r"\d{17}[\dXx]"),
    (
        "email",
        r"[A-Za-z0-9._%+-]+@[A-Za-z0-9.-]+\.[A-Z|a-z]{2,}",
    ),
];

/// A named pattern; matches are replaced with `[<name> Hidden]`
#[derive(Debug, Clone)]
pub struct RedactionRule {
    name: String,
    pattern: Regex,
}

impl RedactionRule {
    pub fn new(name: impl Into<String>, pattern: &str) -> Result<Self> {
        let name = name.into();
        let pattern = Regex::new(pattern).map_err(|e| {
            Error::Configuration(format!("Invalid pattern for rule '{}': {}", name, e))
        })?;
        Ok(Self { name, pattern })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn placeholder(&self) -> String {
        format!("[{} Hidden]", self.name)
    }
}

/// Per-rule match count from one redaction pass
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RedactionInfo {
    pub rule: String,
    pub count: usize,
}

/// Ordered, immutable rule set
#[derive(Debug, Clone)]
pub struct Redactor {
    rules: Vec<RedactionRule>,
}

impl Redactor {
    pub fn new(rules: Vec<RedactionRule>) -> Self {
        Self { rules }
    }

    /// Compile `(name, pattern)` pairs in order
    pub fn from_patterns<N, P>(patterns: impl IntoIterator<Item = (N, P)>) -> Result<Self>
    where
        N: Into<String>,
        P: AsRef<str>,
    {
        let rules = patterns
            .into_iter()
            .map(|(name, pattern)| RedactionRule::new(name, pattern.as_ref()))
            .collect::<Result<Vec<_>>>()?;
        Ok(Self::new(rules))
    }

    /// The built-in phone / ID card / email rule set
    pub fn pii() -> Self {
        let rules = DEFAULT_PII_RULES
            .iter()
            .map(|(name, pattern)| RedactionRule {
                name: (*name).to_string(),
                pattern: Regex::new(pattern).expect("built-in PII pattern must compile"),
            })
            .collect();
        Self::new(rules)
    }

    pub fn rules(&self) -> &[RedactionRule] {
        &self.rules
    }

    /// Redact PII from text
    pub fn redact(&self, text: &str) -> String {
        self.redact_with_report(text).0
    }

    /// Absent input redacts to the empty string
    pub fn redact_optional(&self, text: Option<&str>) -> String {
        self.redact(text.unwrap_or_default())
    }

    /// Redact and report how many matches each rule replaced
    ///
    /// Each rule runs over the output of the previous one, so when two
    /// patterns could claim the same span the earlier rule wins.
    pub fn redact_with_report(&self, text: &str) -> (String, Vec<RedactionInfo>) {
        let mut result = text.to_string();
        let mut report = Vec::new();

        for rule in &self.rules {
            let placeholder = rule.placeholder();
            let mut count = 0;

            let replaced = rule.pattern.replace_all(&result, |caps: &Captures| {
                let found = &caps[0];
                count += 1;
                tracing::info!(rule = %rule.name, value = %found, "detected PII, hidden");
                placeholder.clone()
            });
            let replaced = replaced.into_owned();

            if count > 0 {
                report.push(RedactionInfo {
                    rule: rule.name.clone(),
                    count,
                });
            }
            result = replaced;
        }

        (result, report)
    }
}

impl Default for Redactor {
    fn default() -> Self {
        Self::pii()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_phone_redaction() {
        let redactor = Redactor::pii();
        assert_eq!(
            redactor.redact("call me at 13812345678"),
            "call me at [phone number Hidden]"
        );
    }

    #[test]
    fn test_id_card_redaction() {
        let redactor = Redactor::pii();
        let (redacted, report) = redactor.redact_with_report("id: 11010220000101001X.");

        assert_eq!(redacted, "id: [ID card number Hidden].");
        assert_eq!(
            report,
            vec![RedactionInfo {
                rule: "ID card number".to_string(),
                count: 1
            }]
        );
    }

    #[test]
    fn test_email_redaction() {
        let redactor = Redactor::pii();
        assert_eq!(
            redactor.redact("mail zhang.san+news@example.com.cn now"),
            "mail [email Hidden] now"
        );
    }

    #[test]
    fn test_multiple_matches_counted() {
        let redactor = Redactor::pii();
        let text = "a 13900000000 b 15811112222 c bob@test.io";
        let (redacted, report) = redactor.redact_with_report(text);

        assert_eq!(
            redacted,
            "a [phone number Hidden] b [phone number Hidden] c [email Hidden]"
        );
        assert_eq!(report.len(), 2);
        assert_eq!(report[0].rule, "phone number");
        assert_eq!(report[0].count, 2);
        assert_eq!(report[1].count, 1);
    }

    #[test]
    fn test_earlier_rule_wins_overlap() {
        // The embedded phone number is consumed before the ID rule runs,
        // leaving too few digits for an ID match.
        let redactor = Redactor::pii();
        let redacted = redactor.redact("110105138123456789");
        assert_eq!(redacted, "110105[phone number Hidden]9");
    }

    #[test]
    fn test_rule_order_changes_outcome() {
        let id_first = Redactor::from_patterns([
            ("ID card number", r"\d{17}[\dXx]"),
            ("phone number", r"1[3-9]\d{9}"),
        ])
        .unwrap();
        assert_eq!(
            id_first.redact("110105138123456789"),
            "[ID card number Hidden]"
        );
    }

    #[test]
    fn test_no_pii() {
        let redactor = Redactor::pii();
        let content = "Just some normal text, 12345.";

        let (redacted, report) = redactor.redact_with_report(content);

        assert_eq!(redacted, content);
        assert!(report.is_empty());
    }

    #[test]
    fn test_absent_and_empty_input() {
        let redactor = Redactor::pii();
        assert_eq!(redactor.redact_optional(None), "");
        assert_eq!(redactor.redact(""), "");
    }

    #[test]
    fn test_idempotent_on_own_output() {
        let redactor = Redactor::pii();
        let text = "phone 13812345678, id 11010220000101001x, mail a.b@c.org";

        let once = redactor.redact(text);
        let (twice, report) = redactor.redact_with_report(&once);

        assert_eq!(once, twice);
        assert!(report.is_empty());
    }

    #[test]
    fn test_deterministic() {
        let redactor = Redactor::pii();
        let text = "13812345678 / x@y.com / 13812345678";
        assert_eq!(redactor.redact(text), redactor.redact(text));
    }

    #[test]
    fn test_invalid_pattern_is_configuration_error() {
        let result = Redactor::from_patterns([("broken", "(unclosed")]);
        assert!(matches!(result, Err(Error::Configuration(_))));
    }
}
