//! Content moderation: blocked-word screening for input, PII redaction for output

pub mod guardrail;
pub mod redactor;

pub use guardrail::{DEFAULT_BLOCKED_WORDS, Guardrail, REFUSAL_MESSAGE, Verdict};
pub use redactor::{DEFAULT_PII_RULES, RedactionInfo, RedactionRule, Redactor};

/// Input screening and output sanitizing around a model or tool call
#[derive(Debug, Clone, Default)]
pub struct ContentFilter {
    guardrail: Guardrail,
    redactor: Redactor,
}

impl ContentFilter {
    pub fn new(guardrail: Guardrail, redactor: Redactor) -> Self {
        Self {
            guardrail,
            redactor,
        }
    }

    /// `Err` carries the refusal to send back instead of calling the model
    pub fn screen_input(&self, text: &str) -> std::result::Result<(), &'static str> {
        match self.guardrail.check(text) {
            Verdict::Allowed => Ok(()),
            Verdict::Blocked { .. } => Err(REFUSAL_MESSAGE),
        }
    }

    pub fn sanitize_output(&self, text: &str) -> String {
        self.redactor.redact(text)
    }

    pub fn guardrail(&self) -> &Guardrail {
        &self.guardrail
    }

    pub fn redactor(&self) -> &Redactor {
        &self.redactor
    }
}
