//! Sample commands registered by the `webterm` binary.

mod download;
mod greet;
mod login;

use webterm_core::{CommandDefinition, CommandRegistry, RegistryError};

pub use download::Download;
pub use greet::Greet;
pub use login::Login;

/// Registers the sample commands next to the built-ins.
pub fn register_demo_commands(registry: &CommandRegistry) -> Result<(), RegistryError> {
    registry.register(CommandDefinition::new(
        "login",
        "Checks a user name and password",
        Login::demo(),
    ))?;
    registry.register(CommandDefinition::new(
        "greet",
        "Asks for your name and greets you",
        Greet,
    ))?;
    registry.register(CommandDefinition::new(
        "download",
        "Downloads the given text as a file",
        Download,
    ))?;
    Ok(())
}
