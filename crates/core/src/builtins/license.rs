use async_trait::async_trait;

use crate::command::{Command, Completion};
use crate::context::CommandContext;

#[derive(Debug, Default, Clone, Copy)]
pub struct License;

#[async_trait]
impl Command for License {
    async fn execute(&self, ctx: &mut CommandContext) -> anyhow::Result<Completion> {
        let license = ctx.services().settings().license.clone();
        for line in license.lines() {
            ctx.write_text(line);
        }
        Ok(ctx.exit())
    }
}
