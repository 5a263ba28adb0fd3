use crate::context::HostContext;
use crate::response::{Directive, Response};
use crate::settings::TerminalSettings;

/// Hook for the terminal's initialization request.
pub trait TerminalBehaviour: Send + Sync {
    fn on_initialize(
        &self,
        host: &HostContext,
        settings: &TerminalSettings,
        response: &mut Response,
    );
}

/// Writes the configured greeting and sets the prompt.
#[derive(Debug, Default, Clone, Copy)]
pub struct DefaultTerminalBehaviour;

impl TerminalBehaviour for DefaultTerminalBehaviour {
    fn on_initialize(
        &self,
        _host: &HostContext,
        settings: &TerminalSettings,
        response: &mut Response,
    ) {
        for line in &settings.greeting {
            response.write_text(line.clone());
        }
        response.add_directive(Directive::set_prompt(settings.prompt.clone()));
    }
}
