//! User directory example
//!
//! A small command-line address book backed by a SQLite database,
//! demonstrating the model layer end to end.
//!
//! # Commands
//!
//! - `add` - Insert a new user
//! - `list` - Print all users, optionally sorted
//! - `show` - Look a user up by UUID
//! - `remove` - Delete a user by UUID
//! - `count` - Print the number of stored users

use clap::{Parser, Subcommand};
use rowmodel_core::{
    Database, DatabaseConfig, EnvConfig, FieldMap, Model, PrimaryKey, SortOrder, Value,
};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;
use uuid::Uuid;

const USERS_SCHEMA: &str = "CREATE TABLE IF NOT EXISTS `users` (
    user_uuid VARCHAR(128),
    first_name VARCHAR(50),
    last_name VARCHAR(50),
    date_of_birth DATE
)";

/// User directory command-line tool.
#[derive(Parser)]
#[command(name = "user-directory")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Path to a JSON database configuration file
    #[arg(global = true, short, long)]
    config: Option<PathBuf>,

    /// Path to the SQLite database file (ignored when --config is set)
    #[arg(global = true, short, long, default_value = "users.sqlite3")]
    database: PathBuf,

    /// Enable verbose output
    #[arg(global = true, short, long)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Insert a new user
    Add {
        /// First name
        first_name: String,

        /// Last name
        #[arg(short, long)]
        last_name: Option<String>,

        /// Date of birth (YYYY-MM-DD)
        #[arg(short, long)]
        date_of_birth: Option<String>,
    },

    /// Print all users
    List {
        /// Column to sort by
        #[arg(short, long)]
        sort: Option<String>,

        /// Sort descending instead of ascending
        #[arg(long)]
        desc: bool,
    },

    /// Look a user up by UUID
    Show {
        /// The user's UUID
        uuid: String,
    },

    /// Delete a user by UUID
    Remove {
        /// The user's UUID
        uuid: String,
    },

    /// Print the number of stored users
    Count,
}

/// A directory entry, keyed by UUID.
#[derive(Debug, Clone)]
struct User {
    fields: FieldMap,
}

impl Model for User {
    fn table() -> &'static str {
        "users"
    }

    fn primary_key() -> PrimaryKey {
        PrimaryKey::Single("user_uuid")
    }

    fn from_fields(fields: FieldMap) -> Self {
        Self { fields }
    }

    fn fields(&self) -> &FieldMap {
        &self.fields
    }

    fn fields_mut(&mut self) -> &mut FieldMap {
        &mut self.fields
    }
}

impl User {
    fn new(first_name: &str, last_name: Option<&str>, date_of_birth: Option<&str>) -> Self {
        let mut user = Self::create();
        user.set_data(vec![
            (
                "user_uuid".to_string(),
                Value::from(Uuid::new_v4().to_string()),
            ),
            ("first_name".to_string(), Value::from(first_name)),
            ("last_name".to_string(), Value::from(last_name)),
            ("date_of_birth".to_string(), Value::from(date_of_birth)),
        ]);
        user
    }

    fn describe(&self) -> String {
        let text = |key: &str| match self.value(key) {
            Some(Value::Text(text)) => text.clone(),
            _ => String::from("-"),
        };
        format!(
            "{}  {} {}  (born {})",
            text("user_uuid"),
            text("first_name"),
            text("last_name"),
            text("date_of_birth"),
        )
    }
}

fn open_database(cli: &Cli) -> Result<Database, Box<dyn std::error::Error>> {
    let config = match &cli.config {
        Some(path) => DatabaseConfig::from_file(path)?,
        None => DatabaseConfig::single(
            "local",
            EnvConfig {
                adapter: "sqlite".to_string(),
                name: cli.database.display().to_string(),
                host: "localhost".to_string(),
                user: String::new(),
                pass: String::new(),
                port: 0,
                charset: "utf8".to_string(),
            },
        ),
    };
    tracing::debug!(dsn = %config.active_env()?.dsn(), "connecting");
    let mut db = Database::new(Some(&config))?;
    db.connect()?;
    db.execute(USERS_SCHEMA, &[])?;
    Ok(db)
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    // Initialize logging
    let filter = if cli.verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::new("info")
    };
    tracing_subscriber::fmt().with_env_filter(filter).init();

    let db = open_database(&cli)?;

    match &cli.command {
        Commands::Add {
            first_name,
            last_name,
            date_of_birth,
        } => {
            let mut user = User::new(first_name, last_name.as_deref(), date_of_birth.as_deref());
            if user.save(&db)? {
                println!("added {}", user.describe());
            } else {
                eprintln!("insert failed");
            }
        }
        Commands::List { sort, desc } => {
            let order = match sort {
                Some(column) => {
                    let direction = if *desc { SortOrder::Desc } else { SortOrder::Asc };
                    vec![(column.clone(), direction)]
                }
                None => Vec::new(),
            };
            for user in User::fetch_all(&db, &order)? {
                println!("{}", user.describe());
            }
        }
        Commands::Show { uuid } => match User::find_by_id(&db, uuid.as_str())? {
            Some(user) => println!("{}", user.describe()),
            None => eprintln!("no user with UUID {uuid}"),
        },
        Commands::Remove { uuid } => match User::find_by_id(&db, uuid.as_str())? {
            Some(mut user) => {
                if user.delete(&db)? {
                    println!("removed {uuid}");
                } else {
                    eprintln!("delete failed for {uuid}");
                }
            }
            None => eprintln!("no user with UUID {uuid}"),
        },
        Commands::Count => match User::count(&db)? {
            Some(count) => println!("{count}"),
            None => eprintln!("count failed"),
        },
    }

    Ok(())
}
