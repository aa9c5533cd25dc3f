mod generate;

use anyhow::Result;
use clap::{Parser, Subcommand};
use forage_core::ai::{AiCache, AiConfig};
use forage_core::{IngredientCatalog, MealType};
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "forage")]
#[command(about = "Forage recipe generator", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// List the popular ingredients and their ids
    Ingredients,
    /// Generate a recipe from ingredients and save it
    Generate {
        /// Ingredient id (repeat for several)
        #[arg(long = "ingredient", short = 'i', required = true)]
        ingredients: Vec<u32>,
        /// Meal type: breakfast, lunch, dinner or any
        #[arg(long, default_value = "any")]
        meal: MealType,
        /// Use the offline fake generator instead of the AI service
        #[arg(long)]
        fake: bool,
        /// Regenerate once more after the first recipe, bypassing cached responses
        #[arg(long)]
        regenerate: bool,
    },
    /// Manage the AI response cache
    Cache {
        #[command(subcommand)]
        action: CacheAction,
    },
}

#[derive(Subcommand)]
enum CacheAction {
    /// Show how many responses are cached
    Stats,
    /// Delete all cached responses
    Clear,
}

fn init_tracing() {
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let fmt_layer = tracing_subscriber::fmt::layer().with_writer(std::io::stderr);

    tracing_subscriber::registry()
        .with(env_filter)
        .with(fmt_layer)
        .init();
}

#[tokio::main]
async fn main() -> Result<()> {
    init_tracing();
    let cli = Cli::parse();

    match cli.command {
        Commands::Ingredients => {
            list_ingredients();
        }
        Commands::Generate {
            ingredients,
            meal,
            fake,
            regenerate,
        } => {
            generate::generate(&ingredients, meal, fake, regenerate).await?;
        }
        Commands::Cache { action } => {
            let cache = AiCache::new(AiConfig::cache_dir_from_env());
            match action {
                CacheAction::Stats => {
                    let stats = cache.stats();
                    println!("Cache directory: {}", cache.dir().display());
                    println!("Cached responses: {}", stats.cached_responses);
                }
                CacheAction::Clear => {
                    cache.clear()?;
                    println!("Cleared {}", cache.dir().display());
                }
            }
        }
    }

    Ok(())
}

fn list_ingredients() {
    let catalog = IngredientCatalog::builtin();
    for ingredient in catalog.popular() {
        println!("{:>6}  {}", ingredient.id, ingredient.name);
    }
}
