//! Questions asked by commands and the jobs that resume them.

use std::fmt;
use std::panic::AssertUnwindSafe;
use std::sync::Arc;

use async_trait::async_trait;
use futures::FutureExt;
use tracing::debug;

use super::{Job, JobContext, JobPool};
use crate::command::{CommandResult, Completion};
use crate::context::{CommandContext, CommandRequest};
use crate::fault::panic_error;
use crate::options::ParsedOptions;
use crate::registry::CommandDefinition;
use crate::response::{Directive, Response};

/// How the client collects the answer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputMode {
    Text,
    /// Input is masked while typed and not kept in history.
    Masked,
}

/// How the raw answer is interpreted before the handler sees it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Expect {
    Text,
    Confirmation,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Answer {
    Text(String),
    Confirmed(bool),
}

impl Answer {
    pub fn text(&self) -> Option<&str> {
        match self {
            Answer::Text(text) => Some(text),
            Answer::Confirmed(_) => None,
        }
    }

    pub fn is_confirmed(&self) -> bool {
        matches!(self, Answer::Confirmed(true))
    }
}

/// Continuation of a command once the client answers.
#[async_trait]
pub trait AnswerHandler: Send + Sync {
    async fn on_answer(
        self: Box<Self>,
        answer: Answer,
        ctx: &mut CommandContext,
    ) -> anyhow::Result<Completion>;
}

/// A pending question together with the job that receives its answer.
pub struct Question {
    lines: Vec<String>,
    mode: InputMode,
    job: Box<dyn Job>,
}

impl fmt::Debug for Question {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Question")
            .field("lines", &self.lines)
            .field("mode", &self.mode)
            .finish_non_exhaustive()
    }
}

impl Question {
    pub fn new(text: impl AsRef<str>, mode: InputMode, job: Box<dyn Job>) -> Self {
        Self {
            lines: text.as_ref().lines().map(str::to_string).collect(),
            mode,
            job,
        }
    }

    pub fn lines(&self) -> &[String] {
        &self.lines
    }

    pub fn mode(&self) -> InputMode {
        self.mode
    }
}

/// Applies a finished command's completion to its response.
///
/// An `Ask` stores the job and registers a pre-send hook that writes the
/// question text, switches the client input mode and queues the job, in that
/// order. Returns the exit status, or `None` while a question is pending.
pub(crate) fn settle(
    completion: Completion,
    response: &mut Response,
    jobs: &JobPool,
) -> Option<CommandResult> {
    let Question { lines, mode, job } = match completion {
        Completion::Exit(result) => return Some(result),
        Completion::Ask(question) => question,
    };

    let key = jobs.push(job);
    debug!(target: "webterm", key = %key, masked = mode == InputMode::Masked, "question asked");

    response.on_sending(move |response| {
        for line in lines {
            response.write_text(line);
        }
        response.add_directive(Directive::set_prompt(""));
        response.add_directive(Directive::SetHistory { enabled: false });

        let before_send = match mode {
            InputMode::Masked => {
                response.add_directive(Directive::SetMask { enabled: true });
                vec![Directive::SetMask { enabled: false }]
            }
            InputMode::Text => Vec::new(),
        };
        response.add_directive(Directive::QueueJob {
            key: key.to_string(),
            before_send,
        });
    });
    None
}

/// Resumes the command that asked a question.
pub struct AnswerJob {
    definition: Arc<CommandDefinition>,
    expect: Expect,
    handler: Box<dyn AnswerHandler>,
}

impl AnswerJob {
    pub fn new(
        definition: Arc<CommandDefinition>,
        expect: Expect,
        handler: Box<dyn AnswerHandler>,
    ) -> Self {
        Self {
            definition,
            expect,
            handler,
        }
    }
}

#[async_trait]
impl Job for AnswerJob {
    async fn execute(self: Box<Self>, ctx: &mut JobContext) -> anyhow::Result<()> {
        let services = Arc::clone(ctx.services());
        let AnswerJob {
            definition,
            expect,
            handler,
        } = *self;

        ctx.add_directive(Directive::SetHistory { enabled: true });
        ctx.add_directive(Directive::set_prompt(services.settings().prompt.clone()));

        let input = ctx.input().to_string();
        let answer = match expect {
            Expect::Text => Answer::Text(input.clone()),
            Expect::Confirmation => Answer::Confirmed(input.trim().eq_ignore_ascii_case("yes")),
        };

        let request = CommandRequest::new(input, definition.name(), Vec::new());
        let mut command_ctx = CommandContext::new(
            definition,
            request,
            ParsedOptions::default(),
            ctx.host().clone(),
            Arc::clone(&services),
        )
        .with_response(std::mem::take(ctx.response_mut()));

        let outcome = AssertUnwindSafe(handler.on_answer(answer, &mut command_ctx))
            .catch_unwind()
            .await;
        *ctx.response_mut() = command_ctx.into_response();

        let completion = outcome.map_err(panic_error)??;
        settle(completion, ctx.response_mut(), services.jobs());
        Ok(())
    }
}
