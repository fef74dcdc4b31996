use std::fs;
use std::sync::Arc;

use anyhow::bail;
use chrono::Utc;
use clap::{Parser, Subcommand};
use rand::Rng;
use rand::distributions::Alphanumeric;
use tracing::info;
use tracing_subscriber::EnvFilter;
use uuid::Uuid;

use collabsphere::auth::{JwtKeys, hash_password};
use collabsphere::config::ServerConfig;
use collabsphere::server::{AppState, create_router};
use collabsphere::store::{SqliteStore, Store};
use collabsphere::types::{Role, User};

fn random_secret() -> String {
    rand::thread_rng()
        .sample_iter(&Alphanumeric)
        .take(64)
        .map(char::from)
        .collect()
}

fn random_password() -> String {
    rand::thread_rng()
        .sample_iter(&Alphanumeric)
        .take(20)
        .map(char::from)
        .collect()
}

fn build_user(email: &str, password: &str, role: Role) -> anyhow::Result<User> {
    Ok(User {
        id: Uuid::new_v4().to_string(),
        email: email.to_string(),
        full_name: None,
        password_hash: hash_password(password)?,
        role,
        dept_id: None,
        is_active: true,
        created_at: Utc::now(),
    })
}

#[cfg(unix)]
fn set_restrictive_permissions(path: &std::path::Path) {
    use std::os::unix::fs::PermissionsExt;
    if let Err(e) = fs::set_permissions(path, fs::Permissions::from_mode(0o600)) {
        tracing::warn!("Failed to set permissions on {}: {e}", path.display());
    }
}

#[derive(Parser)]
#[command(name = "collabsphere")]
#[command(about = "A project-based learning backend", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Administrative commands
    Admin {
        #[command(subcommand)]
        command: AdminCommands,
    },

    /// Start the server
    Serve {
        /// Host to bind to
        #[arg(long, default_value = "127.0.0.1")]
        host: String,

        /// Port to bind to
        #[arg(long, short, default_value = "8080")]
        port: u16,

        /// Data directory for the database and JWT secret
        #[arg(long, default_value = "./data")]
        data_dir: String,

        /// Access token lifetime in hours
        #[arg(long, default_value = "12")]
        token_ttl_hours: i64,
    },
}

#[derive(Subcommand)]
enum AdminCommands {
    /// Initialize the server (create database, JWT secret and admin account)
    Init {
        /// Data directory for the database and JWT secret
        #[arg(long, default_value = "./data")]
        data_dir: String,

        /// Email for the initial admin account
        #[arg(long, default_value = "admin@collabsphere.local")]
        admin_email: String,

        /// Skip interactive prompts
        #[arg(long)]
        non_interactive: bool,
    },
}

fn run_init(data_dir: String, admin_email: String, non_interactive: bool) -> anyhow::Result<()> {
    let config = ServerConfig {
        data_dir: data_dir.into(),
        ..ServerConfig::default()
    };
    fs::create_dir_all(&config.data_dir)?;

    let store = SqliteStore::new(config.db_path())?;
    store.initialize()?;

    let credentials_file = config.data_dir.join(".admin_credentials");

    if store.has_admin_user()? {
        bail!(
            "Server already initialized. Admin credentials were written to: {}",
            credentials_file.display()
        );
    }

    let secret_path = config.secret_path();
    if !secret_path.exists() {
        fs::write(&secret_path, random_secret())?;
        #[cfg(unix)]
        set_restrictive_permissions(&secret_path);
    }

    let password = random_password();
    let admin = build_user(&admin_email, &password, Role::Admin)?;
    store.create_user(&admin)?;

    fs::write(&credentials_file, format!("{admin_email}\n{password}\n"))?;
    #[cfg(unix)]
    set_restrictive_permissions(&credentials_file);

    println!();
    println!("========================================");
    println!("Admin account (save this, it won't be shown again):");
    println!();
    println!("  email:    {admin_email}");
    println!("  password: {password}");
    println!();
    println!("Credentials also written to: {}", credentials_file.display());
    println!("========================================");
    println!();

    if !non_interactive {
        create_default_user_prompt(&store)?;
    }

    Ok(())
}

fn create_default_user_prompt(store: &SqliteStore) -> anyhow::Result<()> {
    let create_user = inquire::Confirm::new("Would you like to create an additional account?")
        .with_default(false)
        .prompt()?;

    if !create_user {
        return Ok(());
    }

    let email = inquire::Text::new("Email:")
        .with_validator(|input: &str| {
            if input.trim().is_empty() || !input.contains('@') {
                Err("Enter a valid email address".into())
            } else {
                Ok(inquire::validator::Validation::Valid)
            }
        })
        .prompt()?;

    let role_name = inquire::Select::new(
        "Role:",
        vec!["STAFF", "HEAD_DEPT", "LECTURER", "STUDENT"],
    )
    .prompt()?;
    let role = match Role::parse(role_name) {
        Some(role) => role,
        None => bail!("Unknown role: {role_name}"),
    };

    let password = random_password();
    let user = build_user(&email, &password, role)?;
    store.create_user(&user)?;

    println!();
    println!("========================================");
    println!("Created {role_name} account '{email}' with password:");
    println!();
    println!("  {password}");
    println!();
    println!("========================================");
    println!();

    Ok(())
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env().add_directive("collabsphere=info".parse()?))
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Admin { command } => match command {
            AdminCommands::Init {
                data_dir,
                admin_email,
                non_interactive,
            } => {
                run_init(data_dir, admin_email, non_interactive)?;
            }
        },
        Commands::Serve {
            host,
            port,
            data_dir,
            token_ttl_hours,
        } => {
            let config = ServerConfig {
                host,
                port,
                data_dir: data_dir.into(),
                token_ttl_hours,
            };

            let secret_path = config.secret_path();
            if !secret_path.exists() {
                bail!(
                    "Server not initialized. Run 'collabsphere admin init' first to create the database and admin account."
                );
            }

            let store = SqliteStore::new(config.db_path())?;
            if !store.has_admin_user()? {
                bail!(
                    "Server not initialized. Run 'collabsphere admin init' first to create the database and admin account."
                );
            }

            let secret = fs::read(&secret_path)?;
            let jwt = JwtKeys::new(secret.trim_ascii(), config.token_ttl());

            let state = Arc::new(AppState::new(Arc::new(store), jwt));

            let app = create_router(state);
            let addr = config.socket_addr()?;

            info!("Starting server on {}", addr);

            let listener = tokio::net::TcpListener::bind(addr).await?;
            axum::serve(listener, app).await?;
        }
    }

    Ok(())
}
