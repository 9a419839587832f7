use std::fmt;
use std::path::PathBuf;
use std::sync::OnceLock;

use anyhow::Result;
use serde::{Deserialize, Serialize};

use restamp_domain::current_project_root;

use crate::config::{Config, EnvSnapshot, GlobalOptions};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum CommandGroup {
    Build,
    Publish,
}

impl fmt::Display for CommandGroup {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            CommandGroup::Build => "build",
            CommandGroup::Publish => "publish",
        };
        write!(f, "{name}")
    }
}

#[derive(Clone, Copy, Debug)]
pub struct CommandInfo {
    pub group: CommandGroup,
    pub name: &'static str,
}

impl CommandInfo {
    #[must_use]
    pub const fn new(group: CommandGroup, name: &'static str) -> Self {
        Self { group, name }
    }
}

pub struct CommandContext<'a> {
    pub global: &'a GlobalOptions,
    config: Config,
    project_root: OnceLock<PathBuf>,
}

impl<'a> CommandContext<'a> {
    #[must_use]
    pub fn new(global: &'a GlobalOptions) -> Self {
        let env = EnvSnapshot::capture();
        let config = Config::from_snapshot(&env);
        Self {
            global,
            config,
            project_root: OnceLock::new(),
        }
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Resolves the current project's root directory.
    ///
    /// # Errors
    /// Returns an error if no manifest is found from the working directory
    /// upwards.
    pub fn project_root(&self) -> Result<PathBuf> {
        if let Some(path) = self.project_root.get() {
            Ok(path.clone())
        } else {
            let path = current_project_root()?;
            let _ = self.project_root.set(path.clone());
            Ok(path)
        }
    }

    #[cfg(test)]
    pub(crate) fn testing(global: &'a GlobalOptions, env: EnvSnapshot, root: PathBuf) -> Self {
        let config = Config::from_snapshot(&env);
        let project_root = OnceLock::new();
        let _ = project_root.set(root);
        Self {
            global,
            config,
            project_root,
        }
    }
}
