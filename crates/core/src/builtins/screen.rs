use async_trait::async_trait;

use crate::command::{Command, Completion};
use crate::context::CommandContext;
use crate::response::Directive;

#[derive(Debug, Default, Clone, Copy)]
pub struct Clear;

#[async_trait]
impl Command for Clear {
    async fn execute(&self, ctx: &mut CommandContext) -> anyhow::Result<Completion> {
        ctx.add_directive(Directive::ClearTerminal);
        Ok(ctx.exit())
    }
}

/// Clears the screen and history, then reloads the client.
#[derive(Debug, Default, Clone, Copy)]
pub struct Reset;

#[async_trait]
impl Command for Reset {
    async fn execute(&self, ctx: &mut CommandContext) -> anyhow::Result<Completion> {
        ctx.add_directive(Directive::ClearTerminal);
        ctx.add_directive(Directive::ClearHistory);
        ctx.add_directive(Directive::Reload { force: true });
        Ok(ctx.exit())
    }
}
