//! Database Config

use clap::Args;
use promo_engine_app::database::RepositoryConfig;

/// Database settings.
#[derive(Debug, Args)]
pub struct DatabaseConfig {
    /// `PostgreSQL` connection string
    #[arg(long, env = "DATABASE_URL", hide_env_values = true)]
    pub database_url: String,

    /// Log every repository statement at debug level
    #[arg(long, env = "DATABASE_LOG_STATEMENTS", default_value_t = false)]
    pub log_statements: bool,
}

impl DatabaseConfig {
    /// Repository switches derived from these settings.
    #[must_use]
    pub fn repository(&self) -> RepositoryConfig {
        RepositoryConfig {
            log_statements: self.log_statements,
        }
    }
}
