use anyhow::Result;
use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use souschef::{cli, config};

#[derive(Parser)]
#[command(
    name = "souschef",
    version,
    about = "AI recipe engine — generate, annotate, and search recipes"
)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Generate a recipe from a free-form request
    Generate {
        /// What to cook, in plain language (e.g. "vegetarian pasta for two")
        intent: String,
        /// Owner the recipe is stored under
        #[arg(long, default_value = "default")]
        owner: String,
        /// Dietary preference (repeatable)
        #[arg(long = "dietary")]
        dietary: Vec<String>,
        /// Allergen to exclude (repeatable)
        #[arg(long = "allergen")]
        allergens: Vec<String>,
    },
    /// Modify an existing recipe, recomputing macros and embedding
    Modify {
        /// ID of the recipe to modify
        recipe_id: String,
        /// Scale every quantity by this factor
        #[arg(long)]
        scale: Option<f64>,
        /// Ingredient substitution as from=to (repeatable)
        #[arg(long = "substitute")]
        substitutions: Vec<String>,
        /// New dietary constraint (repeatable)
        #[arg(long = "dietary")]
        dietary: Vec<String>,
        /// Free-form modification request
        #[arg(long)]
        request: Option<String>,
    },
    /// Generate recipes for every prompt in a file (one per line)
    Batch {
        /// Path to the prompt file
        file: String,
        #[arg(long, default_value = "default")]
        owner: String,
    },
    /// List a user's recipes
    List {
        #[arg(long, default_value = "default")]
        owner: String,
        /// Show favorited recipes instead of owned ones
        #[arg(long)]
        favorites: bool,
    },
    /// Find recipes semantically similar to an existing one
    Similar {
        recipe_id: String,
        #[arg(long, default_value_t = 5)]
        limit: usize,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Load config (for log level and provider settings)
    let config = config::SousConfig::load()?;

    // Initialize tracing with the configured log level, on stderr so stdout
    // stays clean for command output.
    let filter = EnvFilter::try_new(&config.server.log_level)
        .unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    match cli.command {
        Command::Generate {
            intent,
            owner,
            dietary,
            allergens,
        } => {
            cli::generate::generate(&config, &intent, &owner, dietary, allergens).await?;
        }
        Command::Modify {
            recipe_id,
            scale,
            substitutions,
            dietary,
            request,
        } => {
            cli::modify::modify(&config, &recipe_id, scale, substitutions, dietary, request)
                .await?;
        }
        Command::Batch { file, owner } => {
            cli::batch::batch(&config, &file, &owner).await?;
        }
        Command::List { owner, favorites } => {
            cli::list::list(&config, &owner, favorites)?;
        }
        Command::Similar { recipe_id, limit } => {
            cli::list::similar(&config, &recipe_id, limit).await?;
        }
    }

    Ok(())
}
