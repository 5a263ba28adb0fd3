//! Keyed continuations resumed by later requests.

mod ask;
mod pool;
mod write_file;

use std::fmt;
use std::sync::Arc;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;

use crate::context::HostContext;
use crate::response::{Directive, Response};
use crate::services::Services;

pub use ask::{Answer, AnswerHandler, AnswerJob, Expect, InputMode, Question};
pub(crate) use ask::settle;
pub use pool::{JobPool, PurgeTask, EXPIRED_MESSAGE};
pub use write_file::WriteFileJob;

/// Opaque, unguessable key of a pooled job.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct JobKey(String);

impl JobKey {
    pub fn generate() -> Self {
        Self(Uuid::new_v4().simple().to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for JobKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<String> for JobKey {
    fn from(value: String) -> Self {
        Self(value)
    }
}

impl From<&str> for JobKey {
    fn from(value: &str) -> Self {
        Self(value.to_string())
    }
}

/// A suspended piece of command logic. Consumed when it runs.
#[async_trait]
pub trait Job: Send + Sync {
    async fn execute(self: Box<Self>, ctx: &mut JobContext) -> anyhow::Result<()>;
}

#[derive(Debug, Error)]
pub enum JobError {
    #[error("job '{0}' has expired or does not exist")]
    NotFound(JobKey),

    #[error("job '{key}' failed")]
    Fault {
        key: JobKey,
        #[source]
        source: anyhow::Error,
    },
}

impl JobError {
    pub fn is_not_found(&self) -> bool {
        matches!(self, JobError::NotFound(_))
    }
}

/// State handed to a job when a follow-up request resumes it.
pub struct JobContext {
    host: HostContext,
    input: String,
    response: Response,
    services: Arc<Services>,
}

impl fmt::Debug for JobContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("JobContext")
            .field("host", &self.host)
            .field("input", &self.input)
            .field("response", &self.response)
            .finish_non_exhaustive()
    }
}

impl JobContext {
    pub fn new(host: HostContext, input: impl Into<String>, services: Arc<Services>) -> Self {
        Self {
            host,
            input: input.into(),
            response: Response::new(),
            services,
        }
    }

    pub fn host(&self) -> &HostContext {
        &self.host
    }

    /// Raw text the client sent with the follow-up request.
    pub fn input(&self) -> &str {
        &self.input
    }

    pub fn services(&self) -> &Arc<Services> {
        &self.services
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

    pub fn add_directive(&mut self, directive: Directive) {
        self.response.add_directive(directive);
    }
}
