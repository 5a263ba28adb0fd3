//! Option declarations and the lenient option binder.

use std::collections::HashMap;

use thiserror::Error;

/// Tokens that request a command's help unless the command declares them.
pub const HELP_SWITCHES: [&str; 3] = ["-h", "-?", "--help"];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OptionKind {
    /// A switch; presence is the whole value.
    NoValue,
    /// Takes exactly one value.
    SingleValue,
    /// Takes one value per occurrence.
    MultipleValue,
}

impl OptionKind {
    pub fn takes_value(self) -> bool {
        !matches!(self, OptionKind::NoValue)
    }
}

/// A declared option, e.g. `-u <value>`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OptionSpec {
    pub name: String,
    pub description: String,
    pub kind: OptionKind,
}

impl OptionSpec {
    pub fn new(name: impl Into<String>, description: impl Into<String>, kind: OptionKind) -> Self {
        Self {
            name: name.into(),
            description: description.into(),
            kind,
        }
    }

    pub fn no_value(name: impl Into<String>, description: impl Into<String>) -> Self {
        Self::new(name, description, OptionKind::NoValue)
    }

    pub fn single_value(name: impl Into<String>, description: impl Into<String>) -> Self {
        Self::new(name, description, OptionKind::SingleValue)
    }

    pub fn multiple_value(name: impl Into<String>, description: impl Into<String>) -> Self {
        Self::new(name, description, OptionKind::MultipleValue)
    }

    /// Usage form shown in generated help, e.g. `-u <value>`.
    pub fn usage(&self) -> String {
        match self.kind {
            OptionKind::NoValue => self.name.clone(),
            OptionKind::SingleValue => format!("{} <value>", self.name),
            OptionKind::MultipleValue => format!("{} <value> ...", self.name),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum OptionError {
    #[error("Option '{option}' requires a value.")]
    MissingValue { option: String },

    #[error("Option '{option}' does not accept another value.")]
    UnexpectedValue { option: String },
}

impl OptionError {
    pub fn option(&self) -> &str {
        match self {
            OptionError::MissingValue { option } | OptionError::UnexpectedValue { option } => {
                option
            }
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct OptionValue {
    present: bool,
    values: Vec<String>,
}

impl OptionValue {
    pub fn is_present(&self) -> bool {
        self.present
    }

    pub fn has_value(&self) -> bool {
        !self.values.is_empty()
    }

    /// First bound value.
    pub fn value(&self) -> Option<&str> {
        self.values.first().map(String::as_str)
    }

    pub fn values(&self) -> &[String] {
        &self.values
    }
}

/// Result of binding a token list against a command's declared options.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ParsedOptions {
    values: HashMap<String, OptionValue>,
    positional: Vec<String>,
    help_requested: bool,
}

impl ParsedOptions {
    pub fn get(&self, name: &str) -> Option<&OptionValue> {
        self.values.get(name)
    }

    pub fn is_present(&self, name: &str) -> bool {
        self.get(name).is_some_and(OptionValue::is_present)
    }

    pub fn value(&self, name: &str) -> Option<&str> {
        self.get(name).and_then(OptionValue::value)
    }

    pub fn values(&self, name: &str) -> &[String] {
        self.get(name).map(OptionValue::values).unwrap_or_default()
    }

    pub fn positional(&self) -> &[String] {
        &self.positional
    }

    /// Positional tokens joined by a single space.
    pub fn positional_text(&self) -> String {
        self.positional.join(" ")
    }

    pub fn help_requested(&self) -> bool {
        self.help_requested
    }
}

/// Binds `tokens` (command name excluded) against `specs`.
///
/// Unknown tokens, including unknown option-like ones, are collected as
/// positional tokens.
pub fn parse_options(
    specs: &[OptionSpec],
    tokens: &[String],
) -> Result<ParsedOptions, OptionError> {
    let find = |name: &str| specs.iter().find(|spec| spec.name == name);

    let mut parsed = ParsedOptions {
        values: specs
            .iter()
            .map(|spec| (spec.name.clone(), OptionValue::default()))
            .collect(),
        ..ParsedOptions::default()
    };

    let mut index = 0usize;
    while index < tokens.len() {
        let token = &tokens[index];
        index += 1;

        if let Some(spec) = find(token) {
            if !spec.kind.takes_value() {
                parsed.mark_present(spec);
                continue;
            }
            let value = match tokens.get(index) {
                Some(next) if find(next).is_none() => next.clone(),
                _ => {
                    return Err(OptionError::MissingValue {
                        option: spec.name.clone(),
                    })
                }
            };
            index += 1;
            parsed.bind(spec, value)?;
            continue;
        }

        if let Some((spec, value)) = split_inline(token).and_then(|(name, value)| {
            find(name).map(|spec| (spec, value))
        }) {
            if !spec.kind.takes_value() {
                return Err(OptionError::UnexpectedValue {
                    option: spec.name.clone(),
                });
            }
            if value.is_empty() {
                return Err(OptionError::MissingValue {
                    option: spec.name.clone(),
                });
            }
            parsed.bind(spec, value.to_string())?;
            continue;
        }

        if HELP_SWITCHES.contains(&token.as_str()) {
            parsed.help_requested = true;
            continue;
        }

        parsed.positional.push(token.clone());
    }

    Ok(parsed)
}

/// Splits `name=value` or `name:value` at the first separator.
fn split_inline(token: &str) -> Option<(&str, &str)> {
    let at = token.find(['=', ':'])?;
    if at == 0 {
        return None;
    }
    Some((&token[..at], &token[at + 1..]))
}

impl ParsedOptions {
    fn entry(&mut self, spec: &OptionSpec) -> &mut OptionValue {
        self.values.entry(spec.name.clone()).or_default()
    }

    fn mark_present(&mut self, spec: &OptionSpec) {
        self.entry(spec).present = true;
    }

    fn bind(&mut self, spec: &OptionSpec, value: String) -> Result<(), OptionError> {
        let entry = self.entry(spec);
        if spec.kind == OptionKind::SingleValue && entry.has_value() {
            return Err(OptionError::UnexpectedValue {
                option: spec.name.clone(),
            });
        }
        entry.present = true;
        entry.values.push(value);
        Ok(())
    }
}
