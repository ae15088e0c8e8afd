//! Deployment environment selecting the `{environment}.toml` layer

use clap::ValueEnum;

/// Which `{environment}.toml` overlay the loader reads.
///
/// Parsed from `CERTCACHE_APP_ENV` or `--env`; both accept the same names and
/// short aliases, case-insensitively.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum Environment {
    #[default]
    #[value(alias = "dev")]
    Development,
    Test,
    #[value(alias = "stage")]
    Staging,
    #[value(alias = "prod")]
    Production,
}

impl Environment {
    pub const ENV_VAR: &'static str = "CERTCACHE_APP_ENV";

    /// Unset or unrecognised values fall back to `Development`.
    pub fn from_env() -> Self {
        std::env::var(Self::ENV_VAR)
            .ok()
            .and_then(|s| <Self as ValueEnum>::from_str(s.trim(), true).ok())
            .unwrap_or_default()
    }

    /// File stem of the overlay, e.g. `production` for `production.toml`
    pub fn as_str(&self) -> &'static str {
        match self {
            Environment::Development => "development",
            Environment::Test => "test",
            Environment::Staging => "staging",
            Environment::Production => "production",
        }
    }
}

impl std::fmt::Display for Environment {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}
