use async_trait::async_trait;

use crate::command::{Command, Completion};
use crate::context::CommandContext;
use crate::response::Directive;

/// Opens the client's file picker. The chosen file arrives as an upload
/// request.
#[derive(Debug, Default, Clone, Copy)]
pub struct Upload;

#[async_trait]
impl Command for Upload {
    async fn execute(&self, ctx: &mut CommandContext) -> anyhow::Result<Completion> {
        ctx.add_directive(Directive::BeginUpload);
        Ok(ctx.exit())
    }
}
