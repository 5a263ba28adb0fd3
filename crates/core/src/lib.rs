//! # webterm core
//!
//! Command processing and interactive job engine for a browser-hosted
//! terminal served over stateless HTTP requests.
//!
//! ## Features
//!
//! - **Tokenizer and option binding**: quote-aware splitting and lenient,
//!   declaration-driven option parsing
//! - **Command registry**: commands registered by value with their option
//!   declarations computed once
//! - **Pipeline**: resolve, authorize, parse, execute and assemble a response
//!   for each request
//! - **Job pool**: keyed continuations that let a command ask a question and
//!   resume on the next request
//! - **Built-ins**: `help`, `clear`, `reset`, `license`, `shortcuts`,
//!   `upload` and `files`
//!
//! ## Example
//!
//! ```rust,no_run
//! use async_trait::async_trait;
//! use webterm_core::{
//!     Command, CommandContext, CommandDefinition, Completion, HostContext, Pipeline, Services,
//! };
//!
//! struct Hello;
//!
//! #[async_trait]
//! impl Command for Hello {
//!     async fn execute(&self, ctx: &mut CommandContext) -> anyhow::Result<Completion> {
//!         ctx.write_success("Hello!");
//!         Ok(ctx.exit())
//!     }
//! }
//!
//! # async fn run() -> anyhow::Result<()> {
//! let services = Services::builder().build()?;
//! services
//!     .registry()
//!     .register(CommandDefinition::new("hello", "Says hello", Hello))?;
//!
//! let pipeline = Pipeline::new(services);
//! let execution = pipeline.execute("hello", HostContext::anonymous()).await;
//! println!("{}", serde_json::to_string(&execution.envelope)?);
//! # Ok(())
//! # }
//! ```

pub mod auth;
pub mod behaviour;
pub mod builtins;
pub mod command;
pub mod context;
pub mod fault;
pub mod files;
pub mod format;
pub mod jobs;
pub mod options;
pub mod pipeline;
pub mod registry;
pub mod response;
pub mod services;
pub mod settings;
pub mod tokenizer;

pub use auth::{
    AuthorizationHandler, DefaultAuthorization, DefaultUnauthorizedHandler, UnauthorizedHandler,
};
pub use behaviour::{DefaultTerminalBehaviour, TerminalBehaviour};
pub use command::{Command, CommandResult, Completion};
pub use context::{CommandContext, CommandRequest, HostContext};
pub use fault::GENERIC_ERROR;
pub use files::{FileInfo, FileStorage, FileUpload, MemoryFileStorage, StoredFile};
pub use jobs::{
    Answer, AnswerHandler, Job, JobContext, JobError, JobKey, JobPool, PurgeTask, Question,
    WriteFileJob, EXPIRED_MESSAGE,
};
pub use options::{OptionError, OptionKind, OptionSpec, OptionValue, ParsedOptions};
pub use pipeline::{Execution, JobExecution, Pipeline, Rejection, Stage, USAGE_HINT};
pub use registry::{CommandDefinition, CommandRegistry, RegistryError};
pub use response::{Directive, Envelope, Message, MessageKind, Response};
pub use services::{HelpEntry, Services, ServicesBuilder};
pub use settings::{BuiltinSettings, SettingsError, TerminalSettings};
