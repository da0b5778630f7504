use clap::{Args, Parser, Subcommand};
use promo_engine::catalog::Catalog;
use promo_engine_app::{context::AppContext, database::RepositoryConfig, settings::EngineSettings};

mod coupons;
mod resolve;
mod seed;

#[derive(Debug, Parser)]
#[command(name = "promos", about = "Promotion engine CLI", long_about = None)]
pub(crate) struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Load a fixture catalog into the database
    Seed(seed::SeedArgs),

    /// Resolve the promos a search request is entitled to
    Resolve(resolve::ResolveArgs),

    /// List a customer's coupons
    Coupons(coupons::CouponsArgs),
}

impl Cli {
    pub(crate) async fn run(self) -> Result<(), String> {
        match self.command {
            Commands::Seed(args) => seed::run(args).await,
            Commands::Resolve(args) => resolve::run(args).await,
            Commands::Coupons(args) => coupons::run(args).await,
        }
    }
}

/// Where promos are read from.
#[derive(Debug, Args)]
pub(crate) struct SourceArgs {
    /// PostgreSQL connection string
    #[arg(
        long,
        env = "DATABASE_URL",
        hide_env_values = true,
        required_unless_present = "catalog"
    )]
    database_url: Option<String>,

    /// Serve a fixture catalog from memory instead of the database
    #[arg(long, conflicts_with = "database_url")]
    catalog: Option<String>,

    /// Fixture directory holding `promos/<catalog>.yml`
    #[arg(long, default_value = "fixtures")]
    fixtures: String,
}

impl SourceArgs {
    pub(crate) async fn context(&self) -> Result<AppContext, String> {
        let settings = EngineSettings::default();

        if let Some(name) = &self.catalog {
            let catalog = Catalog::load_with_locale(&self.fixtures, name, &settings.locale)
                .map_err(|error| format!("failed to load catalog: {error}"))?;

            return Ok(AppContext::in_memory(catalog, settings));
        }

        let Some(database_url) = &self.database_url else {
            return Err("either --database-url or --catalog is required".to_string());
        };

        AppContext::from_database_url(database_url, RepositoryConfig::default(), settings)
            .await
            .map_err(|error| format!("failed to initialise app: {error}"))
    }
}
