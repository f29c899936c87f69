use clap::{Parser, Subcommand};
use dialoguer::{Input, Password};
use dotenvy::dotenv;
use edunexus_cli::seeder::{self, SeedConfig};
use edunexus_models::Role;
use sqlx::PgPool;

#[derive(Parser)]
#[command(name = "edunexus-cli")]
#[command(about = "EduNexus CLI - administrative tools for EduNexus", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Create an admin (or staff) account for the dashboard
    CreateAdmin {
        #[arg(short = 'n', long)]
        name: Option<String>,

        #[arg(short = 'e', long)]
        email: Option<String>,

        /// Prompted securely when omitted
        #[arg(short = 'p', long)]
        password: Option<String>,

        /// Create a staff account instead of an admin
        #[arg(long)]
        staff: bool,
    },
    /// Seed categories, courses, centres and students with fake data
    Seed {
        #[arg(short = 'c', long, default_value = "5")]
        centres: usize,

        #[arg(long, default_value = "20")]
        students: usize,

        #[arg(long, default_value = "4")]
        categories: usize,

        /// Courses per category
        #[arg(long, default_value = "3")]
        courses: usize,
    },
    /// Remove everything created by `seed`
    ClearSeed,
}

#[tokio::main]
async fn main() {
    dotenv().ok();
    let cli = Cli::parse();

    let pool = edunexus_db::init_db_pool().await;
    if let Err(e) = edunexus_db::run_migrations(&pool).await {
        fail("running migrations", e);
    }

    match cli.command {
        Commands::CreateAdmin {
            name,
            email,
            password,
            staff,
        } => handle_create_admin(&pool, name, email, password, staff).await,
        Commands::Seed {
            centres,
            students,
            categories,
            courses,
        } => {
            let config = SeedConfig::new(centres)
                .with_catalog(categories, courses)
                .with_students(students);
            if let Err(e) = seeder::seed_all(&pool, config).await {
                fail("seeding database", e);
            }
        }
        Commands::ClearSeed => {
            if let Err(e) = seeder::clear_all(&pool).await {
                fail("clearing seeded data", e);
            }
        }
    }
}

fn fail(action: &str, e: impl std::fmt::Display) -> ! {
    eprintln!("\n❌ Error {action}: {e}");
    std::process::exit(1);
}

fn prompt(label: &str) -> String {
    Input::new()
        .with_prompt(label)
        .interact_text()
        .unwrap_or_else(|e| fail("reading input", e))
}

async fn handle_create_admin(
    pool: &PgPool,
    name: Option<String>,
    email: Option<String>,
    password: Option<String>,
    staff: bool,
) {
    let name = name.unwrap_or_else(|| prompt("Name"));
    let email = email.unwrap_or_else(|| prompt("Email address"));
    let password = password.unwrap_or_else(|| {
        Password::new()
            .with_prompt("Password")
            .with_confirmation("Confirm password", "Passwords don't match")
            .interact()
            .unwrap_or_else(|e| fail("reading password", e))
    });

    let role = if staff { Role::Staff } else { Role::Admin };
    match create_user(pool, &name, &email, &password, role).await {
        Ok(()) => {
            println!("\n✅ {} account created", role);
            println!("   Email: {email}");
            println!("   Name:  {name}");
        }
        Err(e) => fail("creating account", e),
    }
}

async fn create_user(
    db: &PgPool,
    name: &str,
    email: &str,
    password: &str,
    role: Role,
) -> Result<(), Box<dyn std::error::Error>> {
    if password.len() < 8 {
        return Err("Password must be at least 8 characters".into());
    }

    let hashed = edunexus_core::hash_password(password)
        .map_err(|e| format!("Failed to hash password: {}", e.error))?;

    let inserted = sqlx::query_scalar::<_, uuid::Uuid>(
        "INSERT INTO users (id, name, email, password, role)
         VALUES ($1, $2, $3, $4, $5)
         ON CONFLICT (email) DO NOTHING
         RETURNING id",
    )
    .bind(uuid::Uuid::new_v4())
    .bind(name)
    .bind(email.trim().to_lowercase())
    .bind(&hashed)
    .bind(role)
    .fetch_optional(db)
    .await?;

    match inserted {
        Some(_) => Ok(()),
        None => Err("A user with this email already exists".into()),
    }
}
