use anyhow::Context;
use clap::{Parser, Subcommand};
use devcamper_cli::admin::create_admin;
use devcamper_cli::seeder::{self, SeedConfig};
use devcamper_config::DatabaseConfig;
use devcamper_db::init_db_pool;
use dialoguer::{Confirm, Input, Password};
use dotenvy::dotenv;
use sqlx::PgPool;

#[derive(Parser)]
#[command(name = "devcamper-cli")]
#[command(about = "DevCamper CLI - Administrative tools for the DevCamper API", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Create a new administrator account
    CreateAdmin {
        /// Display name
        #[arg(short = 'n', long)]
        name: Option<String>,

        /// Email address
        #[arg(short = 'e', long)]
        email: Option<String>,

        /// Password (will be prompted securely if not provided)
        #[arg(short = 'p', long)]
        password: Option<String>,
    },
    /// Seed the database with fake publishers, bootcamps, courses and reviews
    Seed {
        /// Number of publishers (one bootcamp each)
        #[arg(short = 'b', long, default_value = "5")]
        publishers: usize,

        /// Number of reviewer accounts
        #[arg(short = 'r', long, default_value = "10")]
        reviewers: usize,

        /// Number of courses per bootcamp
        #[arg(long, default_value = "4")]
        courses: usize,

        /// Number of reviews per bootcamp
        #[arg(long, default_value = "3")]
        reviews: usize,
    },
    /// Delete all data, including admin accounts
    Destroy {
        /// Skip the confirmation prompt
        #[arg(short = 'y', long)]
        yes: bool,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenv().ok();

    let config = DatabaseConfig::from_env()?;
    let pool = init_db_pool(&config)
        .await
        .context("Failed to connect to database")?;

    let cli = Cli::parse();

    match cli.command {
        Commands::CreateAdmin {
            name,
            email,
            password,
        } => handle_create_admin(&pool, name, email, password).await,
        Commands::Seed {
            publishers,
            reviewers,
            courses,
            reviews,
        } => {
            let config = SeedConfig {
                publishers,
                reviewers,
                courses_per_bootcamp: courses,
                reviews_per_bootcamp: reviews,
            };
            seeder::seed_all(&pool, config)
                .await
                .context("Error seeding database")
        }
        Commands::Destroy { yes } => handle_destroy(&pool, yes).await,
    }
}

async fn handle_create_admin(
    pool: &PgPool,
    name: Option<String>,
    email: Option<String>,
    password: Option<String>,
) -> anyhow::Result<()> {
    let name = match name {
        Some(name) => name,
        None => Input::new().with_prompt("Name").interact_text()?,
    };

    let email: String = match email {
        Some(email) => email,
        None => Input::new().with_prompt("Email address").interact_text()?,
    };

    let password = match password {
        Some(password) => password,
        None => Password::new()
            .with_prompt("Password")
            .with_confirmation("Confirm password", "Passwords don't match")
            .interact()?,
    };

    let id = create_admin(pool, &name, &email, &password)
        .await
        .context("Error creating admin")?;

    println!("\n✅ Admin created successfully!");
    println!("   ID: {}", id);
    println!("   Email: {}", email);
    println!("   Name: {}", name);
    Ok(())
}

async fn handle_destroy(pool: &PgPool, yes: bool) -> anyhow::Result<()> {
    let confirmed = yes
        || Confirm::new()
            .with_prompt("This deletes every user, bootcamp, course and review. Continue?")
            .default(false)
            .interact()?;

    if !confirmed {
        println!("Aborted");
        return Ok(());
    }

    seeder::destroy_all(pool)
        .await
        .context("Error destroying data")
}
