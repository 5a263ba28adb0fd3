//! The capability every terminal command implements.

use async_trait::async_trait;

use crate::context::{CommandContext, HostContext};
use crate::jobs::Question;
use crate::options::OptionSpec;

/// Exit status of a finished command.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct CommandResult {
    pub status: i32,
}

impl CommandResult {
    pub const SUCCESS: Self = Self { status: 0 };
    pub const ERROR: Self = Self { status: 1 };

    pub const fn new(status: i32) -> Self {
        Self { status }
    }

    pub fn is_success(&self) -> bool {
        self.status == 0
    }
}

impl Default for CommandResult {
    fn default() -> Self {
        Self::SUCCESS
    }
}

/// What a command hands back to the pipeline.
pub enum Completion {
    /// The command finished.
    Exit(CommandResult),
    /// The command suspends until the client answers the question.
    Ask(Question),
}

impl Completion {
    pub fn exit() -> Self {
        Completion::Exit(CommandResult::SUCCESS)
    }

    pub fn is_exit(&self) -> bool {
        matches!(self, Completion::Exit(_))
    }
}

impl std::fmt::Debug for Completion {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Completion::Exit(result) => f.debug_tuple("Exit").field(result).finish(),
            Completion::Ask(question) => f.debug_tuple("Ask").field(question).finish(),
        }
    }
}

/// A terminal command.
///
/// Only `execute` is required. The remaining methods let a command narrow
/// who may run it, hide it from `help` or opt out of tab completion.
#[async_trait]
pub trait Command: Send + Sync {
    /// Options bound before `execute` runs. Read once at registration.
    fn options(&self) -> Vec<OptionSpec> {
        Vec::new()
    }

    fn is_authorized(&self, _host: &HostContext) -> bool {
        true
    }

    fn is_visible_for_help(&self, _host: &HostContext) -> bool {
        true
    }

    fn is_tab_completion_enabled(&self) -> bool {
        true
    }

    async fn execute(&self, ctx: &mut CommandContext) -> anyhow::Result<Completion>;
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::jobs::{InputMode, WriteFileJob};

    #[test]
    fn exit_and_ask_completions() {
        assert!(Completion::exit().is_exit());
        assert!(matches!(Completion::exit(), Completion::Exit(result) if result.is_success()));
        assert!(!CommandResult::ERROR.is_success());

        let job = WriteFileJob::new(b"x".to_vec(), "x.txt", "text/plain");
        let ask = Completion::Ask(Question::new("Name?", InputMode::Text, Box::new(job)));
        assert!(!ask.is_exit());
    }
}
