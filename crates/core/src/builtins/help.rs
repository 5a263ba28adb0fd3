use async_trait::async_trait;

use crate::command::{Command, Completion};
use crate::context::CommandContext;
use crate::format::align_columns;

/// Lists the commands the caller can see.
#[derive(Debug, Default, Clone, Copy)]
pub struct Help;

#[async_trait]
impl Command for Help {
    async fn execute(&self, ctx: &mut CommandContext) -> anyhow::Result<Completion> {
        let entries = ctx.services().help_entries(ctx.host());
        let rows: Vec<_> = entries
            .iter()
            .map(|entry| (entry.name.as_str(), entry.description.as_str()))
            .collect();

        ctx.write_text("List of supported commands:");
        for line in align_columns(&rows) {
            ctx.write_text(line);
        }
        ctx.write_empty_line();
        Ok(ctx.exit())
    }
}
