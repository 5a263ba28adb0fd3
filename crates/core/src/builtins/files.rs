use async_trait::async_trait;

use crate::command::{Command, Completion};
use crate::context::CommandContext;
use crate::format::align_columns;
use crate::options::OptionSpec;

/// Manages files stored through `upload`.
#[derive(Debug, Default, Clone, Copy)]
pub struct Files;

#[async_trait]
impl Command for Files {
    fn options(&self) -> Vec<OptionSpec> {
        vec![
            OptionSpec::no_value("-l", "List the uploaded files"),
            OptionSpec::single_value("-d", "Download the file with the given id"),
            OptionSpec::single_value("-r", "Remove the file with the given id"),
        ]
    }

    async fn execute(&self, ctx: &mut CommandContext) -> anyhow::Result<Completion> {
        let storage = ctx.services().files().clone();

        if let Some(id) = ctx.options().value("-d").map(str::to_string) {
            return match storage.get(&id).await? {
                Some(file) => {
                    ctx.write_file(file.data, file.info.name.clone(), file.info.mime_type);
                    ctx.write_text(format!("Downloading '{}'.", file.info.name));
                    Ok(ctx.exit())
                }
                None => Ok(ctx.exit_with_error(format!("File '{id}' was not found."))),
            };
        }

        if let Some(id) = ctx.options().value("-r").map(str::to_string) {
            return if storage.remove(&id).await? {
                ctx.write_success(format!("File '{id}' was removed."));
                Ok(ctx.exit())
            } else {
                Ok(ctx.exit_with_error(format!("File '{id}' was not found.")))
            };
        }

        if ctx.options().is_present("-l") {
            let files = storage.list().await?;
            if files.is_empty() {
                ctx.write_text("No files.");
                return Ok(ctx.exit());
            }
            let rows: Vec<_> = files
                .iter()
                .map(|file| {
                    (
                        file.id.clone(),
                        format!("{} ({}, {} bytes)", file.name, file.mime_type, file.size),
                    )
                })
                .collect();
            for line in align_columns(&rows) {
                ctx.write_text(line);
            }
            return Ok(ctx.exit());
        }

        Ok(ctx.exit_with_help())
    }
}
