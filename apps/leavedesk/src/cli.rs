//! # CLI Module
//!
//! Command-line interface for LeaveDesk: the `serve` entry point plus
//! administrative commands that work on the database file directly.

use crate::api::{self, AppState};
use crate::config::{DEV_JWT_SECRET, ServerConfig};
use chrono::{NaiveDate, Utc};
use clap::{Args, Parser, Subcommand};
use leavedesk_core::roster::{parse_roster, seed};
use leavedesk_core::{
    DEFAULT_COST, PasswordHasher, RedbStore, Role, RosterEntry, SeedReport, UserProfile,
};
use serde_json::json;
use std::error::Error;
use std::path::{Path, PathBuf};
use tracing::{info, warn};

pub type CliResult = Result<(), Box<dyn Error>>;

// =============================================================================
// ARGUMENTS
// =============================================================================

/// LeaveDesk - leave requests, team calendar and chat
#[derive(Debug, Parser)]
#[command(name = "leavedesk", version, about, long_about = None)]
pub struct Cli {
    /// Database file
    #[arg(long, global = true, env = "LEAVEDESK_DB", default_value = "leavedesk.redb")]
    pub db: PathBuf,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Run the HTTP server
    Serve(ServeArgs),

    /// Create a new database
    Init {
        /// Replace an existing database
        #[arg(long)]
        force: bool,
    },

    /// Create employees from a JSON roster, skipping existing emails
    SeedEmployees {
        /// Roster file: an array of {name, email, employeeId, phone?, dateOfJoining?}
        #[arg(long)]
        file: PathBuf,

        #[arg(long, env = "LEAVEDESK_BCRYPT_COST", default_value_t = DEFAULT_COST)]
        bcrypt_cost: u32,
    },

    /// Create a lead account if the email is not taken
    SeedLead(LeadArgs),

    /// List every account with per-role totals
    Roster {
        /// Output JSON
        #[arg(long)]
        json: bool,
    },

    /// Reset an account to the default password
    ResetPassword {
        email: String,

        #[arg(long, env = "LEAVEDESK_BCRYPT_COST", default_value_t = DEFAULT_COST)]
        bcrypt_cost: u32,
    },

    /// Delete expired login sessions
    PurgeSessions,
}

#[derive(Debug, Clone, Args)]
pub struct LeadArgs {
    #[arg(long)]
    pub name: String,
    #[arg(long)]
    pub email: String,
    #[arg(long)]
    pub employee_id: String,
    #[arg(long)]
    pub phone: Option<String>,
    /// YYYY-MM-DD; today when omitted
    #[arg(long)]
    pub date_of_joining: Option<NaiveDate>,

    #[arg(long, env = "LEAVEDESK_BCRYPT_COST", default_value_t = DEFAULT_COST)]
    pub bcrypt_cost: u32,
}

#[derive(Debug, Clone, Args)]
pub struct ServeArgs {
    /// Address to listen on
    #[arg(long, env = "LEAVEDESK_BIND", default_value = "127.0.0.1:3000")]
    pub bind: String,

    /// HS256 key for API tokens
    #[arg(long, env = "JWT_SECRET", hide_env_values = true)]
    pub jwt_secret: Option<String>,

    /// Comma-separated origins allowed for CORS with credentials
    #[arg(
        long,
        env = "ALLOWED_ORIGINS",
        value_delimiter = ',',
        default_value = "http://localhost:3000"
    )]
    pub allowed_origins: Vec<String>,

    /// Mark the session cookie Secure
    #[arg(long, env = "LEAVEDESK_SECURE_COOKIES")]
    pub secure_cookies: bool,

    #[arg(long, env = "LEAVEDESK_BCRYPT_COST", default_value_t = DEFAULT_COST)]
    pub bcrypt_cost: u32,

    /// Login attempts allowed per email per minute
    #[arg(long, env = "LEAVEDESK_LOGIN_PER_MINUTE", default_value_t = 10)]
    pub login_per_minute: u32,
}

impl ServeArgs {
    pub fn into_config(self) -> ServerConfig {
        let jwt_secret = match self.jwt_secret {
            Some(secret) if !secret.trim().is_empty() => secret,
            _ => {
                warn!("JWT_SECRET not set; using the development signing key");
                DEV_JWT_SECRET.to_string()
            }
        };
        ServerConfig {
            bind: self.bind,
            jwt_secret,
            allowed_origins: self
                .allowed_origins
                .into_iter()
                .map(|o| o.trim().to_string())
                .filter(|o| !o.is_empty())
                .collect(),
            secure_cookies: self.secure_cookies,
            bcrypt_cost: self.bcrypt_cost,
            login_per_minute: self.login_per_minute,
            ..ServerConfig::default()
        }
    }
}

// =============================================================================
// COMMANDS
// =============================================================================

/// Open an existing database, pointing at `init` when it is missing.
pub fn open_store(db_path: &Path) -> Result<RedbStore, Box<dyn Error>> {
    if !db_path.exists() {
        return Err(format!(
            "Database {} not found. Run `leavedesk init` first.",
            db_path.display()
        )
        .into());
    }
    Ok(RedbStore::open(db_path)?)
}

pub fn cmd_init(db_path: &Path, force: bool) -> CliResult {
    if db_path.exists() {
        if !force {
            return Err(format!(
                "Database {} already exists. Use --force to replace it.",
                db_path.display()
            )
            .into());
        }
        std::fs::remove_file(db_path)?;
    }
    RedbStore::create(db_path)?;
    println!("Initialized database at {}", db_path.display());
    Ok(())
}

fn print_report(report: &SeedReport) {
    for (name, code) in &report.created {
        println!("Created: {} ({})", name, code);
    }
    for name in &report.skipped {
        println!("Skipped (email exists): {}", name);
    }
    println!(
        "{} created, {} skipped",
        report.created.len(),
        report.skipped.len()
    );
}

pub fn cmd_seed_employees(db_path: &Path, file: &Path, bcrypt_cost: u32) -> Result<SeedReport, Box<dyn Error>> {
    let store = open_store(db_path)?;
    let entries = parse_roster(&std::fs::read_to_string(file)?)?;
    let hasher = PasswordHasher::new(bcrypt_cost);

    let report = seed(&store, &hasher, &entries, Role::Employee, Utc::now())?;
    print_report(&report);
    if !report.created.is_empty() {
        println!("Default password for new accounts: {}", leavedesk_core::DEFAULT_PASSWORD);
    }
    Ok(report)
}

pub fn cmd_seed_lead(db_path: &Path, lead: LeadArgs) -> Result<SeedReport, Box<dyn Error>> {
    let store = open_store(db_path)?;
    let hasher = PasswordHasher::new(lead.bcrypt_cost);
    let now = Utc::now();
    let entry = RosterEntry {
        name: lead.name,
        email: lead.email,
        employee_id: lead.employee_id,
        phone: lead.phone,
        date_of_joining: Some(lead.date_of_joining.unwrap_or_else(|| now.date_naive())),
    };

    let report = seed(&store, &hasher, &[entry], Role::Lead, now)?;
    print_report(&report);
    Ok(report)
}

pub fn cmd_roster(db_path: &Path, json_output: bool) -> CliResult {
    let store = open_store(db_path)?;
    let users = store.list_users(None)?;
    let employees = users.iter().filter(|u| u.role == Role::Employee).count();
    let leads = users.len() - employees;

    if json_output {
        let profiles: Vec<UserProfile> = users.iter().map(|u| u.profile()).collect();
        let out = json!({
            "total": users.len(),
            "employees": employees,
            "leads": leads,
            "users": profiles,
        });
        println!("{}", serde_json::to_string_pretty(&out)?);
    } else {
        println!("Total users in database: {}", users.len());
        for user in &users {
            println!("  - {} ({}) - {}", user.name, user.role, user.email);
        }
        println!("Employees: {}", employees);
        println!("Leads: {}", leads);
    }
    Ok(())
}

pub fn cmd_reset_password(db_path: &Path, email: &str, bcrypt_cost: u32) -> CliResult {
    let store = open_store(db_path)?;
    let user = store
        .find_user_by_email(email)?
        .ok_or_else(|| format!("No user with email {}", email.trim()))?;

    let hash = PasswordHasher::new(bcrypt_cost).hash_default()?;
    let revoked = store.reset_password(user.id, hash, Utc::now())?;
    println!(
        "Password for {} reset to the default ({} session(s) signed out)",
        user.email, revoked
    );
    Ok(())
}

pub fn cmd_purge_sessions(db_path: &Path) -> CliResult {
    let store = open_store(db_path)?;
    let removed = store.purge_expired_sessions(Utc::now())?;
    println!("Removed {} expired session(s)", removed);
    Ok(())
}

pub async fn cmd_serve(db_path: &Path, args: ServeArgs) -> CliResult {
    let store = RedbStore::create(db_path)?;
    let config = args.into_config();
    info!(db = %db_path.display(), bind = %config.bind, "starting LeaveDesk");

    let users = store.count_users(None)?;
    if users == 0 {
        warn!("database has no users; seed one with `leavedesk seed-lead`");
    }

    api::serve(AppState::new(store, config)).await?;
    Ok(())
}

/// Run the parsed command.
pub async fn dispatch(cli: Cli) -> CliResult {
    let db = cli.db.as_path();
    match cli.command {
        Commands::Serve(args) => cmd_serve(db, args).await,
        Commands::Init { force } => cmd_init(db, force),
        Commands::SeedEmployees { file, bcrypt_cost } => {
            cmd_seed_employees(db, &file, bcrypt_cost).map(|_| ())
        }
        Commands::SeedLead(lead) => cmd_seed_lead(db, lead).map(|_| ()),
        Commands::Roster { json } => cmd_roster(db, json),
        Commands::ResetPassword { email, bcrypt_cost } => {
            cmd_reset_password(db, &email, bcrypt_cost)
        }
        Commands::PurgeSessions => cmd_purge_sessions(db),
    }
}
