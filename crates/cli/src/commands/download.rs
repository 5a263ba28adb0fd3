use async_trait::async_trait;
use webterm_core::{Command, CommandContext, Completion, OptionSpec};

const DEFAULT_FILE_NAME: &str = "download.txt";

/// `download [-n <file name>] <text...>`
pub struct Download;

#[async_trait]
impl Command for Download {
    fn options(&self) -> Vec<OptionSpec> {
        vec![OptionSpec::single_value("-n", "File name (default download.txt)")]
    }

    async fn execute(&self, ctx: &mut CommandContext) -> anyhow::Result<Completion> {
        let text = ctx.options().positional_text();
        if text.is_empty() {
            return Ok(ctx.exit_with_help());
        }

        let file_name = ctx
            .options()
            .value("-n")
            .unwrap_or(DEFAULT_FILE_NAME)
            .to_string();
        ctx.write_text(format!("Downloading '{file_name}'."));
        ctx.write_file(text.into_bytes(), file_name, "text/plain");
        Ok(ctx.exit())
    }
}
