//! # webterm-server
//!
//! HTTP front end for the webterm command engine. Every browser request is
//! a stateless POST carrying the raw input line (or a job key), answered
//! with a JSON [`Envelope`](webterm_core::Envelope) of messages and
//! directives.
//!
//! ## Routes
//!
//! All routes live under the configured base path (`/webterm` by default):
//!
//! | Method | Path               | Purpose                                |
//! |--------|--------------------|----------------------------------------|
//! | POST   | `/api/initialize`  | greeting and initial prompt            |
//! | POST   | `/api/request`     | run one command line                   |
//! | POST   | `/api/job?key=..`  | resume a queued job with the input     |
//! | GET    | `/api/commands`    | commands visible to the caller         |
//! | POST   | `/api/complete`    | tab completion for a partial name      |
//! | POST   | `/api/upload`      | store an uploaded file                 |
//!
//! ## Example
//!
//! ```no_run
//! use webterm_core::{Pipeline, Services};
//! use webterm_server::{bind, router, serve, ServerSettings};
//!
//! # async fn run() -> anyhow::Result<()> {
//! let services = Services::builder().build()?;
//! let settings = ServerSettings::default();
//! let listener = bind(&settings).await?;
//! let app = router(Pipeline::new(services), settings);
//! serve(listener, app, async {
//!     let _ = tokio::signal::ctrl_c().await;
//! })
//! .await?;
//! # Ok(())
//! # }
//! ```

pub mod error;
mod host;
pub mod routes;
pub mod server;
pub mod settings;
pub mod wire;

pub use error::ServerError;
pub use host::Caller;
pub use routes::{router, AppState};
pub use server::{bind, serve};
pub use settings::ServerSettings;
pub use wire::{CommandsResponse, CompleteResponse, InputBody, UploadBody};
