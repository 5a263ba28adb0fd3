//! Commands every terminal ships with.

mod files;
mod help;
mod license;
mod screen;
mod shortcuts;
mod upload;

use crate::registry::{CommandDefinition, CommandRegistry, RegistryError};
use crate::settings::TerminalSettings;

pub use files::Files;
pub use help::Help;
pub use license::License;
pub use screen::{Clear, Reset};
pub use shortcuts::Shortcuts;
pub use upload::Upload;

pub const HELP: &str = "help";
pub const CLEAR: &str = "clear";
pub const RESET: &str = "reset";
pub const LICENSE: &str = "license";
pub const SHORTCUTS: &str = "shortcuts";
pub const UPLOAD: &str = "upload";
pub const FILES: &str = "files";

/// Registers the built-ins, applying the per-name overrides in `settings`.
pub fn register_builtins(
    registry: &CommandRegistry,
    settings: &TerminalSettings,
) -> Result<(), RegistryError> {
    let definitions = [
        CommandDefinition::new(HELP, "Displays help", Help),
        CommandDefinition::new(CLEAR, "Clears the terminal", Clear),
        CommandDefinition::new(RESET, "Resets the terminal and its history", Reset),
        CommandDefinition::new(LICENSE, "License information", License),
        CommandDefinition::new(SHORTCUTS, "Displays keyboard shortcuts", Shortcuts),
        CommandDefinition::new(UPLOAD, "Uploads a file", Upload),
        CommandDefinition::new(FILES, "Lists, downloads and removes uploaded files", Files),
    ];

    for definition in definitions {
        let overrides = settings.builtin(definition.name());
        registry.register(
            definition
                .builtin()
                .with_enabled(overrides.enabled)
                .with_visible_for_help(overrides.visible_for_help)
                .with_tab_completion(overrides.tab_completion),
        )?;
    }
    Ok(())
}
