//! Authorization hooks consulted by the pipeline.

use tracing::debug;

use crate::builtins::HELP;
use crate::context::HostContext;
use crate::registry::CommandDefinition;
use crate::response::Response;

/// Decides who may run, see and complete a command.
///
/// The defaults defer to the definition's flags and the command's own
/// overrides; a host replaces this to add role checks and the like.
pub trait AuthorizationHandler: Send + Sync {
    fn is_authorized(&self, definition: &CommandDefinition, host: &HostContext) -> bool {
        definition.command().is_authorized(host)
    }

    /// `help` itself is never listed.
    fn is_visible_for_help(&self, definition: &CommandDefinition, host: &HostContext) -> bool {
        definition.name() != HELP
            && definition.is_enabled()
            && definition.is_visible_for_help()
            && definition.command().is_visible_for_help(host)
            && self.is_authorized(definition, host)
    }

    fn is_tab_completion_enabled(
        &self,
        definition: &CommandDefinition,
        host: &HostContext,
    ) -> bool {
        definition.is_enabled()
            && definition.is_tab_completion_enabled()
            && definition.command().is_tab_completion_enabled()
            && self.is_authorized(definition, host)
    }
}

#[derive(Debug, Default, Clone, Copy)]
pub struct DefaultAuthorization;

impl AuthorizationHandler for DefaultAuthorization {}

/// Writes the response for a denied command.
pub trait UnauthorizedHandler: Send + Sync {
    fn on_unauthorized(
        &self,
        definition: &CommandDefinition,
        host: &HostContext,
        response: &mut Response,
    );
}

#[derive(Debug, Default, Clone, Copy)]
pub struct DefaultUnauthorizedHandler;

impl UnauthorizedHandler for DefaultUnauthorizedHandler {
    fn on_unauthorized(
        &self,
        definition: &CommandDefinition,
        host: &HostContext,
        response: &mut Response,
    ) {
        debug!(
            target: "webterm",
            command = definition.name(),
            user = host.user.as_deref().unwrap_or("-"),
            "unauthorized"
        );
        response.write_error("Unauthorized");
    }
}
