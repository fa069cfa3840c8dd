//! Option grammar for console commands
//!
//! Declarative description of a command's accepted flags, used to validate
//! and parse raw input tokens. Grammars are plain values with no knowledge
//! of the registry or handlers, so they can be tested on their own.

use std::collections::HashMap;
use std::fmt::Write as _;

use thiserror::Error;

/// Value type accepted by a declared option
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OptType {
    /// Boolean switch, present or absent
    Flag,
    /// Takes one token, parsed as a signed integer
    Integer,
    /// Takes one token verbatim
    Text,
}

impl OptType {
    fn value_hint(&self) -> &'static str {
        match self {
            OptType::Flag => "",
            OptType::Integer => " <integer>",
            OptType::Text => " <value>",
        }
    }
}

/// A single declared option within a grammar
#[derive(Debug, Clone)]
pub struct OptSpec {
    name: String,
    ty: OptType,
    required: bool,
    description: String,
}

/// Parse failures surfaced to the dispatcher
///
/// `HelpRequested` is not a hard failure: it carries the usage text and is
/// rendered as plain output, while the other variants are error-framed.
/// Either way the handler is not invoked for the line.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum GrammarError {
    #[error("missing required option: -{0}")]
    MissingRequired(String),

    #[error("option -{name} expects {expected}, got '{value}'")]
    InvalidType {
        name: String,
        expected: &'static str,
        value: String,
    },

    #[error("unknown option: {0}")]
    UnknownOption(String),

    #[error("option -{0} expects a value")]
    MissingValue(String),

    #[error("{0}")]
    HelpRequested(String),
}

/// Parsed value for one option
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OptValue {
    Flag(bool),
    Integer(i64),
    Text(String),
}

/// Option values collected from one input line
#[derive(Debug, Clone, Default)]
pub struct ParsedOptions {
    values: HashMap<String, OptValue>,
}

impl ParsedOptions {
    /// Whether a flag option was present
    pub fn flag(&self, name: &str) -> bool {
        matches!(self.values.get(name), Some(OptValue::Flag(true)))
    }

    /// Value of an integer option, if given
    pub fn integer(&self, name: &str) -> Option<i64> {
        match self.values.get(name) {
            Some(OptValue::Integer(v)) => Some(*v),
            _ => None,
        }
    }

    /// Value of a text option, if given
    pub fn text(&self, name: &str) -> Option<&str> {
        match self.values.get(name) {
            Some(OptValue::Text(v)) => Some(v.as_str()),
            _ => None,
        }
    }
}

/// Declarative grammar for one command's options
#[derive(Debug, Clone, Default)]
pub struct OptionGrammar {
    banner: String,
    opts: Vec<OptSpec>,
}

impl OptionGrammar {
    /// Create a grammar with a one-line banner shown in usage text
    pub fn new(banner: impl Into<String>) -> Self {
        Self {
            banner: banner.into(),
            opts: Vec::new(),
        }
    }

    /// Declare an option. Duplicate names are a construction-time defect.
    pub fn opt(
        mut self,
        name: impl Into<String>,
        ty: OptType,
        required: bool,
        description: impl Into<String>,
    ) -> Self {
        let name = name.into();
        assert!(
            self.opts.iter().all(|o| o.name != name),
            "duplicate option -{name} in grammar"
        );
        self.opts.push(OptSpec {
            name,
            ty,
            required,
            description: description.into(),
        });
        self
    }

    /// Usage text: banner plus one line per declared option
    pub fn usage(&self) -> String {
        let mut text = self.banner.clone();
        for opt in &self.opts {
            let lead = format!("-{}{}", opt.name, opt.ty.value_hint());
            let _ = write!(text, "\n  {:<16} {}", lead, opt.description);
            if opt.required {
                text.push_str(" (required)");
            }
        }
        let _ = write!(text, "\n  {:<16} Show this message", "-h, --help");
        text
    }

    /// Parse raw argument tokens against the grammar.
    ///
    /// Returns the collected option values and the leftover positional
    /// tokens in their original order. A help flag anywhere in the input
    /// short-circuits with `HelpRequested` carrying the usage text.
    pub fn parse(&self, tokens: &[String]) -> Result<(ParsedOptions, Vec<String>), GrammarError> {
        if tokens.iter().any(|t| t == "-h" || t == "--help") {
            return Err(GrammarError::HelpRequested(self.usage()));
        }

        let mut parsed = ParsedOptions::default();
        let mut leftover = Vec::new();
        let mut iter = tokens.iter();

        while let Some(token) = iter.next() {
            if !token.starts_with('-') || token == "-" {
                leftover.push(token.clone());
                continue;
            }

            let name = token.trim_start_matches('-');
            let Some(spec) = self.opts.iter().find(|o| o.name == name) else {
                return Err(GrammarError::UnknownOption(token.clone()));
            };

            match spec.ty {
                OptType::Flag => {
                    parsed
                        .values
                        .insert(spec.name.clone(), OptValue::Flag(true));
                }
                OptType::Integer => {
                    let value = iter
                        .next()
                        .ok_or_else(|| GrammarError::MissingValue(spec.name.clone()))?;
                    let parsed_value = value.parse::<i64>().map_err(|_| {
                        GrammarError::InvalidType {
                            name: spec.name.clone(),
                            expected: "an integer",
                            value: value.clone(),
                        }
                    })?;
                    parsed
                        .values
                        .insert(spec.name.clone(), OptValue::Integer(parsed_value));
                }
                OptType::Text => {
                    let value = iter
                        .next()
                        .ok_or_else(|| GrammarError::MissingValue(spec.name.clone()))?;
                    parsed
                        .values
                        .insert(spec.name.clone(), OptValue::Text(value.clone()));
                }
            }
        }

        for spec in &self.opts {
            if spec.required && !parsed.values.contains_key(&spec.name) {
                return Err(GrammarError::MissingRequired(spec.name.clone()));
            }
        }

        Ok((parsed, leftover))
    }
}
