//! Per-request state handed to commands.

use std::net::SocketAddr;
use std::sync::Arc;

use crate::command::{CommandResult, Completion};
use crate::jobs::{AnswerHandler, AnswerJob, Expect, InputMode, Job, JobKey, Question, WriteFileJob};
use crate::options::{OptionValue, ParsedOptions};
use crate::registry::CommandDefinition;
use crate::response::{Directive, Response};
use crate::services::Services;

/// Identity of the caller as established by the host. Never persisted.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct HostContext {
    pub user: Option<String>,
    pub roles: Vec<String>,
    pub remote_addr: Option<SocketAddr>,
}

impl HostContext {
    pub fn anonymous() -> Self {
        Self::default()
    }

    pub fn with_user(mut self, user: impl Into<String>) -> Self {
        self.user = Some(user.into());
        self
    }

    pub fn with_role(mut self, role: impl Into<String>) -> Self {
        self.roles.push(role.into());
        self
    }

    pub fn with_remote_addr(mut self, addr: SocketAddr) -> Self {
        self.remote_addr = Some(addr);
        self
    }

    pub fn is_authenticated(&self) -> bool {
        self.user.is_some()
    }

    pub fn is_in_role(&self, role: &str) -> bool {
        self.roles.iter().any(|r| r == role)
    }
}

/// The raw input of a command request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandRequest {
    pub input: String,
    pub name: String,
    pub args: Vec<String>,
}

impl CommandRequest {
    pub fn new(input: impl Into<String>, name: impl Into<String>, args: Vec<String>) -> Self {
        Self {
            input: input.into(),
            name: name.into(),
            args,
        }
    }
}

/// Everything a command sees while it runs. Owned by a single execution.
pub struct CommandContext {
    definition: Arc<CommandDefinition>,
    request: CommandRequest,
    options: ParsedOptions,
    response: Response,
    host: HostContext,
    services: Arc<Services>,
}

impl std::fmt::Debug for CommandContext {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CommandContext")
            .field("command", &self.definition.name())
            .field("request", &self.request)
            .field("options", &self.options)
            .field("response", &self.response)
            .field("host", &self.host)
            .finish_non_exhaustive()
    }
}

impl CommandContext {
    pub fn new(
        definition: Arc<CommandDefinition>,
        request: CommandRequest,
        options: ParsedOptions,
        host: HostContext,
        services: Arc<Services>,
    ) -> Self {
        Self {
            definition,
            request,
            options,
            response: Response::new(),
            host,
            services,
        }
    }

    /// Continues writing into an existing response.
    pub fn with_response(mut self, response: Response) -> Self {
        self.response = response;
        self
    }

    pub fn definition(&self) -> &Arc<CommandDefinition> {
        &self.definition
    }

    pub fn request(&self) -> &CommandRequest {
        &self.request
    }

    pub fn options(&self) -> &ParsedOptions {
        &self.options
    }

    pub fn option(&self, name: &str) -> Option<&OptionValue> {
        self.options.get(name)
    }

    pub fn host(&self) -> &HostContext {
        &self.host
    }

    pub fn services(&self) -> &Arc<Services> {
        &self.services
    }

    pub fn response(&self) -> &Response {
        &self.response
    }

    pub fn response_mut(&mut self) -> &mut Response {
        &mut self.response
    }

    pub fn into_response(self) -> Response {
        self.response
    }

    pub fn write_text(&mut self, text: impl Into<String>) {
        self.response.write_text(text);
    }

    pub fn write_success(&mut self, text: impl Into<String>) {
        self.response.write_success(text);
    }

    pub fn write_error(&mut self, text: impl Into<String>) {
        self.response.write_error(text);
    }

    pub fn write_empty_line(&mut self) {
        self.response.write_empty_line();
    }

    pub fn add_directive(&mut self, directive: Directive) {
        self.response.add_directive(directive);
    }

    pub fn exit(&self) -> Completion {
        Completion::exit()
    }

    pub fn exit_with_status(&self, status: i32) -> Completion {
        Completion::Exit(CommandResult::new(status))
    }

    pub fn exit_with_error(&mut self, text: impl Into<String>) -> Completion {
        self.write_error(text);
        Completion::Exit(CommandResult::ERROR)
    }

    /// Writes the command's generated help and exits.
    pub fn exit_with_help(&mut self) -> Completion {
        for line in self.definition.help_lines() {
            self.response.write_text(line);
        }
        Completion::exit()
    }

    /// Stores `job` in the pool and queues it for the client to run.
    pub fn add_job<J>(&mut self, job: J) -> JobKey
    where
        J: Job + 'static,
    {
        let key = self.services.jobs().push(Box::new(job));
        self.response.add_directive(Directive::queue_job(key.as_str()));
        key
    }

    /// Queues a download of `data` as `file_name`.
    pub fn write_file(
        &mut self,
        data: impl Into<Vec<u8>>,
        file_name: impl Into<String>,
        mime_type: impl Into<String>,
    ) -> JobKey {
        self.add_job(WriteFileJob::new(data, file_name, mime_type))
    }

    /// Asks for a line of text; `handler` receives the answer.
    pub fn ask_text<H>(&self, question: impl Into<String>, handler: H) -> Completion
    where
        H: AnswerHandler + 'static,
    {
        self.ask(question.into(), InputMode::Text, Expect::Text, Box::new(handler))
    }

    /// Like [`CommandContext::ask_text`] with the client input masked.
    pub fn ask_password<H>(&self, question: impl Into<String>, handler: H) -> Completion
    where
        H: AnswerHandler + 'static,
    {
        self.ask(question.into(), InputMode::Masked, Expect::Text, Box::new(handler))
    }

    /// Asks a yes/no question. Only `yes` approves.
    pub fn ask_confirmation<H>(&self, question: impl Into<String>, handler: H) -> Completion
    where
        H: AnswerHandler + 'static,
    {
        let mut question = question.into();
        question.push_str("\nOnly 'yes' will be accepted to approve.\nEnter a value:");
        self.ask(question, InputMode::Text, Expect::Confirmation, Box::new(handler))
    }

    fn ask(
        &self,
        question: String,
        mode: InputMode,
        expect: Expect,
        handler: Box<dyn AnswerHandler>,
    ) -> Completion {
        let job = AnswerJob::new(Arc::clone(&self.definition), expect, handler);
        Completion::Ask(Question::new(question, mode, Box::new(job)))
    }
}
