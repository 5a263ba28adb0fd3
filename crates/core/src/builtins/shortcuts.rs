use async_trait::async_trait;

use crate::command::{Command, Completion};
use crate::context::CommandContext;
use crate::format::align_columns;

const SHORTCUTS: [(&str, &str); 8] = [
    ("Tab", "Complete the command name"),
    ("Up / Down", "Browse the command history"),
    ("Ctrl+A", "Move the cursor to the beginning of the line"),
    ("Ctrl+E", "Move the cursor to the end of the line"),
    ("Ctrl+U", "Delete everything before the cursor"),
    ("Ctrl+K", "Delete everything after the cursor"),
    ("Ctrl+L", "Clear the terminal"),
    ("Ctrl+C", "Cancel the current input"),
];

/// Keyboard shortcuts understood by the client.
#[derive(Debug, Default, Clone, Copy)]
pub struct Shortcuts;

#[async_trait]
impl Command for Shortcuts {
    async fn execute(&self, ctx: &mut CommandContext) -> anyhow::Result<Completion> {
        ctx.write_text("Keyboard shortcuts:");
        for line in align_columns(&SHORTCUTS) {
            ctx.write_text(line);
        }
        Ok(ctx.exit())
    }
}
