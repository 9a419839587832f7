//! Per-invocation name/version override values.

/// Environment fallback for `--override-name`.
pub const NAME_ENV_VAR: &str = "PROJECT_OVERRIDE_NAME";
/// Environment fallback for `--override-version`.
pub const VERSION_ENV_VAR: &str = "PROJECT_OVERRIDE_VERSION";

/// Override values resolved once per invocation and immutable afterwards.
///
/// Resolution order per field: flag value, else environment value, else no
/// override. Empty values count as unset.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Overrides {
    pub name: Option<String>,
    pub version: Option<String>,
}

impl Overrides {
    #[must_use]
    pub fn resolve(
        flag_name: Option<&str>,
        flag_version: Option<&str>,
        env_name: Option<&str>,
        env_version: Option<&str>,
    ) -> Self {
        Self {
            name: pick(flag_name, env_name),
            version: pick(flag_version, env_version),
        }
    }

    /// Whether at least one field is overridden. The rewriter is only invoked
    /// when this holds.
    #[must_use]
    pub fn is_active(&self) -> bool {
        self.name.is_some() || self.version.is_some()
    }
}

fn pick(flag: Option<&str>, env: Option<&str>) -> Option<String> {
    flag.filter(|value| !value.is_empty())
        .or_else(|| env.filter(|value| !value.is_empty()))
        .map(ToOwned::to_owned)
}
