//! Blocked-word guardrail for incoming text

/// Words rejected by the default guardrail
pub const DEFAULT_BLOCKED_WORDS: &[&str] = &["zanghua", "minganci", "bukexiangdeshi"];

/// Reply returned in place of processing blocked input
pub const REFUSAL_MESSAGE: &str =
    "Sorry, the content you sent contains inappropriate words, and I cannot process it.";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Verdict {
    Allowed,
    Blocked { word: String },
}

impl Verdict {
    pub fn is_blocked(&self) -> bool {
        matches!(self, Verdict::Blocked { .. })
    }
}

/// Case-insensitive substring blacklist
#[derive(Debug, Clone)]
pub struct Guardrail {
    words: Vec<String>,
}

impl Guardrail {
    pub fn new<I, S>(words: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let words = words
            .into_iter()
            .map(|w| w.as_ref().trim().to_lowercase())
            .filter(|w| !w.is_empty())
            .collect();
        Self { words }
    }

    pub fn words(&self) -> &[String] {
        &self.words
    }

    /// First blocked word found in `text` wins
    pub fn check(&self, text: &str) -> Verdict {
        let lowered = text.to_lowercase();
        match self.words.iter().find(|w| lowered.contains(w.as_str())) {
            Some(word) => {
                tracing::warn!(word = %word, "blocked word in input, request rejected");
                Verdict::Blocked { word: word.clone() }
            }
            None => Verdict::Allowed,
        }
    }
}

impl Default for Guardrail {
    fn default() -> Self {
        Self::new(DEFAULT_BLOCKED_WORDS)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_blocks_case_insensitively() {
        let guardrail = Guardrail::default();
        assert_eq!(
            guardrail.check("please say MinGanCi now"),
            Verdict::Blocked {
                word: "minganci".to_string()
            }
        );
    }

    #[test]
    fn test_allows_clean_text() {
        let guardrail = Guardrail::default();
        assert_eq!(guardrail.check("write an article about tea"), Verdict::Allowed);
    }

    #[test]
    fn test_ignores_blank_words() {
        let guardrail = Guardrail::new(["", "  ", "Foo"]);
        assert_eq!(guardrail.words(), &["foo".to_string()]);
        assert!(guardrail.check("a FOOD blog").is_blocked());
    }
}
