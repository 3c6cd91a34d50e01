mod commands;
mod config;
mod server;

use anyhow::Result;
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use std::process;

use crate::commands::{
    cmd_favorite_add, cmd_favorite_list, cmd_favorite_remove, cmd_item_add, cmd_item_delete,
    cmd_item_list, cmd_item_search, cmd_recipe_add, cmd_recipe_delete, cmd_recipe_search,
    cmd_user_add, cmd_user_delete, cmd_user_search,
};
use crate::config::Config;
use larder_core::service::PantryService;

#[derive(Parser)]
#[command(
    name = "larder",
    version,
    about = "A household pantry and recipe tracker",
    long_about = "Track who keeps what in the pantry, the recipes they cook,\n\
                  and the ones they come back to. Run `larder serve` to expose\n\
                  the same data over a REST API."
)]
struct Cli {
    /// Path to the database file (default: platform data directory)
    #[arg(long, global = true, value_name = "PATH")]
    db: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Start the REST API server
    Serve {
        /// Port to listen on
        #[arg(short, long, default_value = "8080")]
        port: u16,
        /// Address to bind to (default: 127.0.0.1, use 0.0.0.0 to expose to network)
        #[arg(short, long, default_value = "127.0.0.1")]
        bind: String,
    },
    /// Manage users
    User {
        #[command(subcommand)]
        command: UserCommands,
    },
    /// Manage pantry items
    Item {
        #[command(subcommand)]
        command: ItemCommands,
    },
    /// Manage recipes
    Recipe {
        #[command(subcommand)]
        command: RecipeCommands,
    },
    /// Manage favorite recipes
    Favorite {
        #[command(subcommand)]
        command: FavoriteCommands,
    },
}

#[derive(Subcommand)]
enum UserCommands {
    /// Register a new user (the password is hashed before storage)
    Add {
        username: String,
        email: String,
        password: String,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
    /// Look up a user by email
    Search {
        email: String,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
    /// Delete a user by email, along with their items, recipes and favorites
    Delete {
        email: String,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
}

#[derive(Subcommand)]
enum ItemCommands {
    /// Add a pantry item for a user
    Add {
        /// Item name
        name: String,
        /// Expiry date (YYYY-MM-DD)
        expiry: String,
        /// Owning user ID
        #[arg(long)]
        user: i64,
        /// Quantity on the shelf
        #[arg(short, long, default_value = "1")]
        quantity: i64,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
    /// Search pantry items by name (case-insensitive substring)
    Search {
        name: String,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
    /// List all pantry items for a user
    List {
        /// Owning user ID
        #[arg(long)]
        user: i64,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
    /// Delete a pantry item by ID
    Delete {
        item_id: i64,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
}

#[derive(Subcommand)]
enum RecipeCommands {
    /// Add a recipe for a user
    Add {
        /// Recipe name
        name: String,
        /// Preparation instructions
        instructions: String,
        /// Owning user ID
        #[arg(long)]
        user: i64,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
    /// Look up a recipe by exact name
    Search {
        name: String,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
    /// Delete a recipe by exact name
    Delete {
        name: String,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
}

#[derive(Subcommand)]
enum FavoriteCommands {
    /// Mark a recipe as a favorite for a user
    Add {
        /// User ID
        #[arg(long)]
        user: i64,
        /// Recipe ID
        #[arg(long)]
        recipe: i64,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
    /// List a user's favorites
    List {
        /// User ID
        #[arg(long)]
        user: i64,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
    /// Remove a favorite by ID
    Remove {
        favorite_id: i64,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    if let Err(e) = run(cli).await {
        eprintln!("Error: {e:#}");
        process::exit(1);
    }
}

async fn run(cli: Cli) -> Result<()> {
    let config = Config::load(cli.db)?;
    let svc = PantryService::new(&config.db_path)?;

    match cli.command {
        Commands::Serve { port, bind } => server::start_server(svc, port, &bind).await,
        Commands::User { command } => match command {
            UserCommands::Add {
                username,
                email,
                password,
                json,
            } => cmd_user_add(&svc, &username, &email, &password, json),
            UserCommands::Search { email, json } => cmd_user_search(&svc, &email, json),
            UserCommands::Delete { email, json } => cmd_user_delete(&svc, &email, json),
        },
        Commands::Item { command } => match command {
            ItemCommands::Add {
                name,
                expiry,
                user,
                quantity,
                json,
            } => cmd_item_add(&svc, &name, quantity, &expiry, user, json),
            ItemCommands::Search { name, json } => cmd_item_search(&svc, &name, json),
            ItemCommands::List { user, json } => cmd_item_list(&svc, user, json),
            ItemCommands::Delete { item_id, json } => cmd_item_delete(&svc, item_id, json),
        },
        Commands::Recipe { command } => match command {
            RecipeCommands::Add {
                name,
                instructions,
                user,
                json,
            } => cmd_recipe_add(&svc, &name, &instructions, user, json),
            RecipeCommands::Search { name, json } => cmd_recipe_search(&svc, &name, json),
            RecipeCommands::Delete { name, json } => cmd_recipe_delete(&svc, &name, json),
        },
        Commands::Favorite { command } => match command {
            FavoriteCommands::Add { user, recipe, json } => {
                cmd_favorite_add(&svc, user, recipe, json)
            }
            FavoriteCommands::List { user, json } => cmd_favorite_list(&svc, user, json),
            FavoriteCommands::Remove { favorite_id, json } => {
                cmd_favorite_remove(&svc, favorite_id, json)
            }
        },
    }
}
