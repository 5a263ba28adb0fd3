use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use tracing::debug;
use webterm_core::{Answer, AnswerHandler, Command, CommandContext, Completion, OptionSpec};

const INVALID_CREDENTIALS: &str = "Invalid username or password.";

/// `login -u <user> [-p <password>]`; asks for the password when `-p` is
/// omitted.
pub struct Login {
    accounts: Arc<HashMap<String, String>>,
}

impl Login {
    pub fn new(accounts: HashMap<String, String>) -> Self {
        Self {
            accounts: Arc::new(accounts),
        }
    }

    /// A single `demo` / `demo` account.
    pub fn demo() -> Self {
        Self::new(HashMap::from([("demo".to_string(), "demo".to_string())]))
    }
}

fn check(
    accounts: &HashMap<String, String>,
    user: &str,
    password: &str,
    ctx: &mut CommandContext,
) -> Completion {
    if accounts.get(user).is_some_and(|expected| expected == password) {
        ctx.write_success(format!("Hello {user}!"));
        ctx.exit()
    } else {
        debug!(target: "webterm", user = %user, "login failed");
        ctx.exit_with_error(INVALID_CREDENTIALS)
    }
}

#[async_trait]
impl Command for Login {
    fn options(&self) -> Vec<OptionSpec> {
        vec![
            OptionSpec::single_value("-u", "User name"),
            OptionSpec::single_value("-p", "Password"),
        ]
    }

    async fn execute(&self, ctx: &mut CommandContext) -> anyhow::Result<Completion> {
        let Some(user) = ctx.options().value("-u").map(str::to_string) else {
            return Ok(ctx.exit_with_help());
        };

        match ctx.options().value("-p").map(str::to_string) {
            Some(password) => Ok(check(&self.accounts, &user, &password, ctx)),
            None => Ok(ctx.ask_password(
                "Password:",
                OnPassword {
                    accounts: Arc::clone(&self.accounts),
                    user,
                },
            )),
        }
    }
}

struct OnPassword {
    accounts: Arc<HashMap<String, String>>,
    user: String,
}

#[async_trait]
impl AnswerHandler for OnPassword {
    async fn on_answer(
        self: Box<Self>,
        answer: Answer,
        ctx: &mut CommandContext,
    ) -> anyhow::Result<Completion> {
        let password = answer.text().unwrap_or_default();
        Ok(check(&self.accounts, &self.user, password, ctx))
    }
}
