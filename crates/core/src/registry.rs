//! Command definitions and the name-keyed registry.
//!
//! Lookup follows the handler table of the RPC server: a
//! `parking_lot::RwLock<HashMap<..>>` written during startup and read by every
//! request afterwards.

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use parking_lot::RwLock;
use thiserror::Error;
use tracing::debug;

use crate::command::Command;
use crate::format::align_columns;
use crate::options::{OptionSpec, HELP_SWITCHES};

/// A registered command. Immutable once registered.
#[derive(Clone)]
pub struct CommandDefinition {
    name: String,
    description: String,
    command: Arc<dyn Command>,
    options: Vec<OptionSpec>,
    builtin: bool,
    enabled: bool,
    visible_for_help: bool,
    tab_completion: bool,
}

impl fmt::Debug for CommandDefinition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CommandDefinition")
            .field("name", &self.name)
            .field("description", &self.description)
            .field("options", &self.options)
            .field("builtin", &self.builtin)
            .field("enabled", &self.enabled)
            .field("visible_for_help", &self.visible_for_help)
            .field("tab_completion", &self.tab_completion)
            .finish_non_exhaustive()
    }
}

impl CommandDefinition {
    pub fn new<C>(name: impl Into<String>, description: impl Into<String>, command: C) -> Self
    where
        C: Command + 'static,
    {
        Self::from_arc(name, description, Arc::new(command))
    }

    pub fn from_arc(
        name: impl Into<String>,
        description: impl Into<String>,
        command: Arc<dyn Command>,
    ) -> Self {
        let options = command.options();
        Self {
            name: name.into(),
            description: description.into(),
            command,
            options,
            builtin: false,
            enabled: true,
            visible_for_help: true,
            tab_completion: true,
        }
    }

    pub fn builtin(mut self) -> Self {
        self.builtin = true;
        self
    }

    pub fn with_enabled(mut self, enabled: bool) -> Self {
        self.enabled = enabled;
        self
    }

    pub fn with_visible_for_help(mut self, visible: bool) -> Self {
        self.visible_for_help = visible;
        self
    }

    pub fn with_tab_completion(mut self, enabled: bool) -> Self {
        self.tab_completion = enabled;
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn description(&self) -> &str {
        &self.description
    }

    pub fn command(&self) -> &Arc<dyn Command> {
        &self.command
    }

    pub fn options(&self) -> &[OptionSpec] {
        &self.options
    }

    pub fn is_builtin(&self) -> bool {
        self.builtin
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    pub fn is_visible_for_help(&self) -> bool {
        self.visible_for_help
    }

    pub fn is_tab_completion_enabled(&self) -> bool {
        self.tab_completion
    }

    /// Generated usage text for `<name> --help` and option errors.
    pub fn help_lines(&self) -> Vec<String> {
        let mut lines = Vec::new();
        if !self.description.is_empty() {
            lines.push(self.description.clone());
            lines.push(String::new());
        }

        if self.options.is_empty() {
            lines.push(format!("Usage: {}", self.name));
            return lines;
        }

        lines.push(format!("Usage: {} [options]", self.name));
        lines.push(String::new());
        lines.push("Options:".to_string());

        let mut rows: Vec<(String, String)> = self
            .options
            .iter()
            .map(|spec| (format!("  {}", spec.usage()), spec.description.clone()))
            .collect();
        if !self.options.iter().any(|spec| HELP_SWITCHES.contains(&spec.name.as_str())) {
            rows.push(("  -h | --help".to_string(), "Show help information".to_string()));
        }
        lines.extend(align_columns(&rows));
        lines
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RegistryError {
    #[error("command '{0}' is already registered")]
    DuplicateCommand(String),
}

#[derive(Default)]
pub struct CommandRegistry {
    commands: RwLock<HashMap<String, Arc<CommandDefinition>>>,
}

impl fmt::Debug for CommandRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CommandRegistry")
            .field("commands", &self.names())
            .finish()
    }
}

impl CommandRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(
        &self,
        definition: CommandDefinition,
    ) -> Result<Arc<CommandDefinition>, RegistryError> {
        let mut commands = self.commands.write();
        if commands.contains_key(definition.name()) {
            return Err(RegistryError::DuplicateCommand(definition.name.clone()));
        }

        debug!(
            target: "webterm",
            command = %definition.name,
            builtin = definition.builtin,
            enabled = definition.enabled,
            "registered command"
        );

        let definition = Arc::new(definition);
        commands.insert(definition.name.clone(), Arc::clone(&definition));
        Ok(definition)
    }

    /// Exact, case-sensitive lookup.
    pub fn resolve(&self, name: &str) -> Option<Arc<CommandDefinition>> {
        self.commands.read().get(name).cloned()
    }

    pub fn contains(&self, name: &str) -> bool {
        self.commands.read().contains_key(name)
    }

    /// Snapshot of the definitions accepted by `predicate`, built-ins first,
    /// each group sorted by name.
    pub fn list<P>(&self, predicate: P) -> Listing<P>
    where
        P: Fn(&CommandDefinition) -> bool,
    {
        let mut definitions: Vec<_> = self.commands.read().values().cloned().collect();
        definitions.sort_by(|a, b| {
            b.builtin
                .cmp(&a.builtin)
                .then_with(|| a.name.cmp(&b.name))
        });
        Listing {
            definitions,
            predicate,
        }
    }

    /// All registered names, sorted.
    pub fn names(&self) -> Vec<String> {
        let mut names: Vec<_> = self.commands.read().keys().cloned().collect();
        names.sort();
        names
    }

    pub fn len(&self) -> usize {
        self.commands.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.commands.read().is_empty()
    }
}

/// Filtered view over a registry snapshot. Every call to [`Listing::iter`]
/// starts from the beginning.
pub struct Listing<P> {
    definitions: Vec<Arc<CommandDefinition>>,
    predicate: P,
}

impl<P> Listing<P>
where
    P: Fn(&CommandDefinition) -> bool,
{
    pub fn iter(&self) -> impl Iterator<Item = &Arc<CommandDefinition>> + '_ {
        self.definitions
            .iter()
            .filter(move |definition| (self.predicate)(definition.as_ref()))
    }
}
