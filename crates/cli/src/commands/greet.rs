use async_trait::async_trait;
use webterm_core::{Answer, AnswerHandler, Command, CommandContext, Completion};

/// Asks for a name, then whether to shout the greeting.
pub struct Greet;

#[async_trait]
impl Command for Greet {
    async fn execute(&self, ctx: &mut CommandContext) -> anyhow::Result<Completion> {
        let name = ctx.options().positional_text();
        if !name.is_empty() {
            ctx.write_text(format!("Hello {name}!"));
            return Ok(ctx.exit());
        }
        Ok(ctx.ask_text("What is your name?", OnName))
    }
}

struct OnName;

#[async_trait]
impl AnswerHandler for OnName {
    async fn on_answer(
        self: Box<Self>,
        answer: Answer,
        ctx: &mut CommandContext,
    ) -> anyhow::Result<Completion> {
        let name = answer.text().unwrap_or_default().trim().to_string();
        if name.is_empty() {
            return Ok(ctx.exit_with_error("A name is required."));
        }
        Ok(ctx.ask_confirmation("Shout the greeting?", OnShout { name }))
    }
}

struct OnShout {
    name: String,
}

#[async_trait]
impl AnswerHandler for OnShout {
    async fn on_answer(
        self: Box<Self>,
        answer: Answer,
        ctx: &mut CommandContext,
    ) -> anyhow::Result<Completion> {
        let greeting = format!("Hello {}!", self.name);
        if answer.is_confirmed() {
            ctx.write_success(greeting.to_uppercase());
        } else {
            ctx.write_text(greeting);
        }
        Ok(ctx.exit())
    }
}
