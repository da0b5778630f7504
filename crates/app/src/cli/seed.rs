use clap::Args;
use promo_engine::catalog::Catalog;
use promo_engine_app::{context::AppContext, database::RepositoryConfig, settings::EngineSettings};

#[derive(Debug, Args)]
pub(crate) struct SeedArgs {
    /// PostgreSQL connection string
    #[arg(long, env = "DATABASE_URL", hide_env_values = true)]
    database_url: String,

    /// Fixture directory holding `promos/<catalog>.yml`
    #[arg(long, default_value = "fixtures")]
    fixtures: String,

    /// Catalog name
    #[arg(long, default_value = "checkout")]
    catalog: String,
}

pub(crate) async fn run(args: SeedArgs) -> Result<(), String> {
    let settings = EngineSettings::default();

    let catalog = Catalog::load_with_locale(&args.fixtures, &args.catalog, &settings.locale)
        .map_err(|error| format!("failed to load catalog: {error}"))?;

    let ctx =
        AppContext::from_database_url(&args.database_url, RepositoryConfig::default(), settings)
            .await
            .map_err(|error| format!("failed to initialise app: {error}"))?;

    let promo_count = catalog.promos.len();
    let user_promo_count = catalog.user_promos.len();

    for promo in catalog.promos {
        ctx.promos
            .upsert_promo(promo)
            .await
            .map_err(|error| format!("failed to seed promo: {error}"))?;
    }

    for row in catalog.user_promos {
        ctx.promos
            .refresh_user_promo(row)
            .await
            .map_err(|error| format!("failed to seed user promo: {error}"))?;
    }

    println!("seeded catalog: {}", args.catalog);
    println!("promos: {promo_count}");
    println!("user_promos: {user_promo_count}");

    Ok(())
}
