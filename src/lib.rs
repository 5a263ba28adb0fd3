//! # webterm
//!
//! A browser-hosted command-line terminal served over stateless HTTP
//! requests. The client sends a line of text; the server tokenizes it,
//! runs the registered command and answers with output messages plus
//! client directives. Commands that need more input park a continuation in
//! the job pool and resume on the next request.
//!
//! ## Crates
//!
//! - [`core`]: tokenizer, option parser, registry, pipeline, job pool and
//!   the built-in commands
//! - [`server`]: the axum transport
//!
//! ## Example
//!
//! ```no_run
//! use webterm::core::{Pipeline, Services};
//! use webterm::server::{bind, router, serve, ServerSettings};
//!
//! # async fn run() -> Result<(), Box<dyn std::error::Error>> {
//! let services = Services::builder().build()?;
//! let settings = ServerSettings::default();
//! let listener = bind(&settings).await?;
//! serve(listener, router(Pipeline::new(services), settings), async {}).await?;
//! # Ok(())
//! # }
//! ```

pub use webterm_core as core;
pub use webterm_server as server;

pub use webterm_core::{
    Command, CommandContext, CommandDefinition, Completion, Envelope, HostContext, Pipeline,
    Services, TerminalSettings,
};
pub use webterm_server::{router, ServerSettings};
