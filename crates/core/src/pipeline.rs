//! Per-request execution: resolve, authorize, parse, execute, assemble.

use std::fmt;
use std::panic::AssertUnwindSafe;
use std::sync::Arc;

use futures::FutureExt;
use thiserror::Error;
use tracing::{debug, error};

use crate::builtins::UPLOAD;
use crate::command::CommandResult;
use crate::context::{CommandContext, CommandRequest, HostContext};
use crate::fault::{panic_error, render_fault};
use crate::files::FileUpload;
use crate::jobs::{settle, JobContext, JobError, JobKey};
use crate::options::{parse_options, OptionError};
use crate::registry::CommandDefinition;
use crate::response::{Envelope, Response};
use crate::services::{HelpEntry, Services};

/// Written after rejected input.
pub const USAGE_HINT: &str = "Type 'help' to list the available commands.";

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum Rejection {
    #[error("empty input")]
    EmptyInput,

    #[error("command '{0}' was not found")]
    UnknownCommand(String),

    #[error("command '{0}' is disabled")]
    DisabledCommand(String),

    #[error("not authorized to run '{0}'")]
    Unauthorized(String),

    #[error("invalid options for '{command}': {source}")]
    InvalidOptions {
        command: String,
        #[source]
        source: OptionError,
    },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Stage {
    Received,
    Resolving,
    Authorizing,
    Parsing,
    Executing,
    Assembling,
    Done,
    Rejected(Rejection),
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Stage::Received => f.write_str("received"),
            Stage::Resolving => f.write_str("resolving"),
            Stage::Authorizing => f.write_str("authorizing"),
            Stage::Parsing => f.write_str("parsing"),
            Stage::Executing => f.write_str("executing"),
            Stage::Assembling => f.write_str("assembling"),
            Stage::Done => f.write_str("done"),
            Stage::Rejected(_) => f.write_str("rejected"),
        }
    }
}

/// Outcome of a command request.
#[derive(Debug)]
pub struct Execution {
    /// `Done` or `Rejected`.
    pub stage: Stage,
    /// Exit status; `None` when rejected, faulted or waiting for an answer.
    pub status: Option<CommandResult>,
    pub envelope: Envelope,
}

impl Execution {
    pub fn is_rejected(&self) -> bool {
        matches!(self.stage, Stage::Rejected(_))
    }

    pub fn rejection(&self) -> Option<&Rejection> {
        match &self.stage {
            Stage::Rejected(rejection) => Some(rejection),
            _ => None,
        }
    }
}

/// Outcome of a job request.
#[derive(Debug)]
pub struct JobExecution {
    pub outcome: Result<(), JobError>,
    pub envelope: Envelope,
}

/// Drives every request kind against a set of [`Services`].
#[derive(Debug, Clone)]
pub struct Pipeline {
    services: Arc<Services>,
}

impl Pipeline {
    pub fn new(services: Arc<Services>) -> Self {
        Self { services }
    }

    pub fn services(&self) -> &Arc<Services> {
        &self.services
    }

    /// Runs one line of command input.
    pub async fn execute(&self, input: &str, host: HostContext) -> Execution {
        let mut response = Response::new();
        let mut stage = Stage::Received;

        let Some((name, args)) = crate::tokenizer::split_command(input) else {
            response.write_text(USAGE_HINT);
            return self.reject(Rejection::EmptyInput, response);
        };

        advance(&mut stage, Stage::Resolving, &name);
        let definition = match self.services.registry().resolve(&name) {
            Some(definition) if definition.is_enabled() => definition,
            Some(_) => {
                write_not_found(&mut response, &name);
                return self.reject(Rejection::DisabledCommand(name), response);
            }
            None => {
                write_not_found(&mut response, &name);
                return self.reject(Rejection::UnknownCommand(name), response);
            }
        };

        advance(&mut stage, Stage::Authorizing, &name);
        if !self.services.authorization().is_authorized(&definition, &host) {
            self.services
                .unauthorized()
                .on_unauthorized(&definition, &host, &mut response);
            return self.reject(Rejection::Unauthorized(name), response);
        }

        advance(&mut stage, Stage::Parsing, &name);
        let options = match parse_options(definition.options(), &args) {
            Ok(options) => options,
            Err(err) => {
                response.write_error(err.to_string());
                write_help(&mut response, &definition);
                return self.reject(
                    Rejection::InvalidOptions {
                        command: name,
                        source: err,
                    },
                    response,
                );
            }
        };

        if options.help_requested() {
            write_help(&mut response, &definition);
            advance(&mut stage, Stage::Done, &name);
            return Execution {
                stage,
                status: Some(CommandResult::SUCCESS),
                envelope: response.finish(),
            };
        }

        advance(&mut stage, Stage::Executing, &name);
        let request = CommandRequest::new(input, name.clone(), args);
        let mut ctx = CommandContext::new(
            Arc::clone(&definition),
            request,
            options,
            host,
            Arc::clone(&self.services),
        )
        .with_response(response);

        let outcome = AssertUnwindSafe(definition.command().execute(&mut ctx))
            .catch_unwind()
            .await;

        advance(&mut stage, Stage::Assembling, &name);
        let mut response = ctx.into_response();
        let completion = match outcome {
            Ok(Ok(completion)) => Ok(completion),
            Ok(Err(err)) => Err(err),
            Err(payload) => Err(panic_error(payload)),
        };
        let status = match completion {
            Ok(completion) => settle(completion, &mut response, self.services.jobs()),
            Err(err) => {
                error!(
                    target: "webterm",
                    command = %name,
                    error = %format!("{err:#}"),
                    "command failed"
                );
                render_fault(&mut response, &err, self.services.settings().display_exceptions);
                None
            }
        };

        advance(&mut stage, Stage::Done, &name);
        debug!(
            target: "webterm",
            command = %name,
            status = status.map(|s| s.status),
            "command finished"
        );
        Execution {
            stage,
            status,
            envelope: response.finish(),
        }
    }

    /// Resumes the job stored under `key` with the client's `input`.
    pub async fn run_job(&self, key: &str, input: &str, host: HostContext) -> JobExecution {
        let key = JobKey::from(key);
        let mut ctx = JobContext::new(host, input, Arc::clone(&self.services));
        let outcome = self.services.jobs().run(&key, &mut ctx).await;
        JobExecution {
            outcome,
            envelope: ctx.into_response().finish(),
        }
    }

    /// Greeting and prompt for a freshly loaded terminal.
    pub fn initialize(&self, host: &HostContext) -> Envelope {
        let mut response = Response::new();
        self.services
            .behaviour()
            .on_initialize(host, self.services.settings(), &mut response);
        response.finish()
    }

    pub fn help_entries(&self, host: &HostContext) -> Vec<HelpEntry> {
        self.services.help_entries(host)
    }

    /// Command names starting with `partial` that `host` may complete.
    pub fn complete(&self, partial: &str, host: &HostContext) -> Vec<String> {
        let authorization = self.services.authorization();
        let partial = partial.trim_start();
        let mut names: Vec<String> = self
            .services
            .registry()
            .list(|definition| {
                definition.name().starts_with(partial)
                    && authorization.is_tab_completion_enabled(definition, host)
            })
            .iter()
            .map(|definition| definition.name().to_string())
            .collect();
        names.sort();
        names
    }

    /// Stores an uploaded file.
    pub async fn upload(&self, file: FileUpload, host: HostContext) -> Envelope {
        let mut response = Response::new();

        let authorization = self.services.authorization();
        let allowed = self.services.registry().resolve(UPLOAD).is_some_and(|definition| {
            definition.is_enabled() && authorization.is_authorized(&definition, &host)
        });
        if !allowed {
            debug!(target: "webterm", file = %file.name, "upload rejected");
            response.write_error("File upload is not enabled.");
            return response.finish();
        }

        let name = file.name.clone();
        let size = file.data.len();
        match self.services.files().store(file, &host).await {
            Ok(id) => {
                debug!(target: "webterm", file = %name, size, id = %id, "file uploaded");
                response.write_success("File upload completed, the file ID is:");
                response.write_text(id);
            }
            Err(err) => {
                error!(
                    target: "webterm",
                    file = %name,
                    error = %format!("{err:#}"),
                    "upload failed"
                );
                let display_exceptions = self.services.settings().display_exceptions;
                render_fault(&mut response, &err, display_exceptions);
            }
        }
        response.finish()
    }

    fn reject(&self, rejection: Rejection, response: Response) -> Execution {
        debug!(target: "webterm", stage = "rejected", reason = %rejection, "request rejected");
        Execution {
            stage: Stage::Rejected(rejection),
            status: None,
            envelope: response.finish(),
        }
    }
}

fn advance(stage: &mut Stage, next: Stage, command: &str) {
    debug!(target: "webterm", command, from = %stage, to = %next, "stage");
    *stage = next;
}

fn write_not_found(response: &mut Response, name: &str) {
    response.write_error(format!("Command '{name}' was not found."));
    response.write_text(USAGE_HINT);
}

fn write_help(response: &mut Response, definition: &CommandDefinition) {
    for line in definition.help_lines() {
        response.write_text(line);
    }
}
