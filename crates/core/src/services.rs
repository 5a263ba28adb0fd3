//! The shared bundle every request and job works against.

use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::auth::{
    AuthorizationHandler, DefaultAuthorization, DefaultUnauthorizedHandler, UnauthorizedHandler,
};
use crate::behaviour::{DefaultTerminalBehaviour, TerminalBehaviour};
use crate::builtins;
use crate::context::HostContext;
use crate::files::{FileStorage, MemoryFileStorage};
use crate::jobs::JobPool;
use crate::registry::{CommandRegistry, RegistryError};
use crate::settings::TerminalSettings;

/// One row of the `help` listing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HelpEntry {
    pub name: String,
    pub description: String,
    pub builtin: bool,
}

/// Shared services. Everything but the job pool and file storage is fixed
/// after startup.
pub struct Services {
    registry: Arc<CommandRegistry>,
    jobs: Arc<JobPool>,
    authorization: Arc<dyn AuthorizationHandler>,
    unauthorized: Arc<dyn UnauthorizedHandler>,
    behaviour: Arc<dyn TerminalBehaviour>,
    files: Arc<dyn FileStorage>,
    settings: Arc<TerminalSettings>,
}

impl std::fmt::Debug for Services {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Services")
            .field("registry", &self.registry)
            .field("jobs", &self.jobs)
            .field("settings", &self.settings)
            .finish_non_exhaustive()
    }
}

impl Services {
    pub fn builder() -> ServicesBuilder {
        ServicesBuilder::default()
    }

    pub fn registry(&self) -> &Arc<CommandRegistry> {
        &self.registry
    }

    pub fn jobs(&self) -> &Arc<JobPool> {
        &self.jobs
    }

    pub fn authorization(&self) -> &dyn AuthorizationHandler {
        self.authorization.as_ref()
    }

    pub fn unauthorized(&self) -> &dyn UnauthorizedHandler {
        self.unauthorized.as_ref()
    }

    pub fn behaviour(&self) -> &dyn TerminalBehaviour {
        self.behaviour.as_ref()
    }

    pub fn files(&self) -> &Arc<dyn FileStorage> {
        &self.files
    }

    pub fn settings(&self) -> &TerminalSettings {
        &self.settings
    }

    /// Commands visible to `host`, built-ins first.
    pub fn help_entries(&self, host: &HostContext) -> Vec<HelpEntry> {
        let authorization = self.authorization();
        self.registry
            .list(|definition| authorization.is_visible_for_help(definition, host))
            .iter()
            .map(|definition| HelpEntry {
                name: definition.name().to_string(),
                description: definition.description().to_string(),
                builtin: definition.is_builtin(),
            })
            .collect()
    }
}

pub struct ServicesBuilder {
    settings: TerminalSettings,
    registry: Option<Arc<CommandRegistry>>,
    authorization: Arc<dyn AuthorizationHandler>,
    unauthorized: Arc<dyn UnauthorizedHandler>,
    behaviour: Arc<dyn TerminalBehaviour>,
    files: Arc<dyn FileStorage>,
    builtins: bool,
}

impl Default for ServicesBuilder {
    fn default() -> Self {
        Self {
            settings: TerminalSettings::default(),
            registry: None,
            authorization: Arc::new(DefaultAuthorization),
            unauthorized: Arc::new(DefaultUnauthorizedHandler),
            behaviour: Arc::new(DefaultTerminalBehaviour),
            files: Arc::new(MemoryFileStorage::new()),
            builtins: true,
        }
    }
}

impl ServicesBuilder {
    pub fn settings(mut self, settings: TerminalSettings) -> Self {
        self.settings = settings;
        self
    }

    /// Uses an existing registry instead of a fresh one.
    pub fn registry(mut self, registry: Arc<CommandRegistry>) -> Self {
        self.registry = Some(registry);
        self
    }

    pub fn authorization<A>(mut self, handler: A) -> Self
    where
        A: AuthorizationHandler + 'static,
    {
        self.authorization = Arc::new(handler);
        self
    }

    pub fn unauthorized_handler<U>(mut self, handler: U) -> Self
    where
        U: UnauthorizedHandler + 'static,
    {
        self.unauthorized = Arc::new(handler);
        self
    }

    pub fn behaviour<B>(mut self, behaviour: B) -> Self
    where
        B: TerminalBehaviour + 'static,
    {
        self.behaviour = Arc::new(behaviour);
        self
    }

    pub fn file_storage(mut self, files: Arc<dyn FileStorage>) -> Self {
        self.files = files;
        self
    }

    /// Skips registering the built-in commands.
    pub fn without_builtins(mut self) -> Self {
        self.builtins = false;
        self
    }

    pub fn build(self) -> Result<Arc<Services>, RegistryError> {
        let registry = self.registry.unwrap_or_default();
        if self.builtins {
            builtins::register_builtins(&registry, &self.settings)?;
        }

        Ok(Arc::new(Services {
            registry,
            jobs: Arc::new(JobPool::from_settings(&self.settings)),
            authorization: self.authorization,
            unauthorized: self.unauthorized,
            behaviour: self.behaviour,
            files: self.files,
            settings: Arc::new(self.settings),
        }))
    }
}
