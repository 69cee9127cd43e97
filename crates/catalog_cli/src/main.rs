//! `catalog` command-line entry point.
//!
//! # Responsibility
//! - Map flags and `CATALOG_*` variables onto [`CatalogConfig`].
//! - Run one catalog operation per invocation and print JSON on stdout.

use catalog_core::db::open_with_config;
use catalog_core::{
    default_log_level, init_logging_from_config, CatalogConfig, Category, CategoryField,
    CategoryRepository, CategoryService, PageRequest, ProductField, ProductRepository,
    ProductService, Sort, SqliteCategoryRepository, SqliteProductRepository,
};
use clap::{Args, Parser, Subcommand};
use log::info;
use rusqlite::Connection;
use serde::Serialize;
use std::error::Error;
use std::path::PathBuf;
use std::process;
use std::time::Duration;

/// Manage catalog categories and products stored in SQLite
#[derive(Parser)]
#[command(name = "catalog", version, about)]
struct Cli {
    /// SQLite database file (in-memory when omitted)
    #[arg(long, global = true, env = "CATALOG_DB_PATH")]
    db: Option<PathBuf>,

    /// Milliseconds to wait on a locked database
    #[arg(long, global = true, env = "CATALOG_BUSY_TIMEOUT_MS", default_value_t = 5_000)]
    busy_timeout_ms: u64,

    /// One of trace, debug, info, warn, error
    #[arg(long, global = true, env = "CATALOG_LOG_LEVEL")]
    log_level: Option<String>,

    /// Absolute directory for log files (logging disabled when omitted)
    #[arg(long, global = true, env = "CATALOG_LOG_DIR")]
    log_dir: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Category operations
    #[command(subcommand)]
    Category(CategoryCommand),

    /// Product operations
    #[command(subcommand)]
    Product(ProductCommand),
}

#[derive(Subcommand)]
enum CategoryCommand {
    /// Create categories in one transaction
    Add {
        #[arg(required = true)]
        names: Vec<String>,
    },

    /// Show one category
    Get { id: i64 },

    /// List every category
    List {
        /// Sort expression, e.g. `name,desc;id`
        #[arg(long, default_value = "")]
        sort: String,
    },

    /// Categories whose name matches a LIKE pattern
    Like { pattern: String },

    /// Rename a category
    Rename { id: i64, name: String },
}

#[derive(Subcommand)]
enum ProductCommand {
    /// Create a product under an existing category
    Add {
        category_id: i64,
        name: String,
        price: i64,
    },

    /// Products of the category with this exact name
    List {
        category: String,
        #[arg(long, default_value = "")]
        sort: String,
    },

    /// One page of products of a category, with totals
    Page {
        category: String,
        #[command(flatten)]
        paging: Paging,
    },

    /// Products whose name matches a LIKE pattern, with totals
    Search {
        pattern: String,
        #[command(flatten)]
        paging: Paging,
    },

    /// Count products, optionally within one category
    Count {
        #[arg(long)]
        category: Option<String>,
    },

    /// Set a product price to zero
    ZeroPrice { id: i64 },

    /// Delete products by exact name
    Delete {
        name: String,
        /// Use a single bulk statement instead of row-by-row deletes
        #[arg(long)]
        bulk: bool,
    },

    /// Walk the products of a category slice by slice
    Slices {
        category_id: i64,
        #[arg(long, default_value_t = 10)]
        size: u32,
    },
}

#[derive(Args)]
struct Paging {
    #[arg(long, default_value_t = 0)]
    page: u32,
    #[arg(long, default_value_t = 10)]
    size: u32,
    #[arg(long, default_value = "")]
    sort: String,
}

impl Paging {
    fn request(&self) -> Result<PageRequest<ProductField>, Box<dyn Error>> {
        Ok(PageRequest::of_sorted(
            self.page,
            self.size,
            Sort::parse(&self.sort)?,
        )?)
    }
}

fn main() {
    let cli = Cli::parse();

    if let Err(e) = run(cli) {
        eprintln!("ERROR:{e}");
        process::exit(1);
    }
}

fn run(cli: Cli) -> Result<(), Box<dyn Error>> {
    let config = CatalogConfig {
        db_path: cli.db,
        busy_timeout: Duration::from_millis(cli.busy_timeout_ms),
        log_level: cli
            .log_level
            .unwrap_or_else(|| default_log_level().to_string()),
        log_dir: cli.log_dir,
    };
    init_logging_from_config(&config)?;

    let conn = open_with_config(&config)?;
    info!("event=cli_start module=cli status=ok");

    match cli.command {
        Command::Category(command) => run_category(&conn, command),
        Command::Product(command) => run_product(&conn, command),
    }
}

fn run_category(conn: &Connection, command: CategoryCommand) -> Result<(), Box<dyn Error>> {
    let repo = SqliteCategoryRepository::try_new(conn)?;
    let service = CategoryService::new(conn);

    match command {
        CategoryCommand::Add { names } => {
            print_json(&service.create_categories(names.as_slice())?)
        }
        CategoryCommand::Get { id } => print_json(&repo.find_by_id(id)?),
        CategoryCommand::List { sort } => {
            let sort = Sort::<CategoryField>::parse(&sort)?;
            print_json(&repo.find_all(&sort)?)
        }
        CategoryCommand::Like { pattern } => print_json(&repo.find_all_by_name_like(&pattern)?),
        CategoryCommand::Rename { id, name } => print_json(&service.rename(id, &name)?),
    }
}

fn run_product(conn: &Connection, command: ProductCommand) -> Result<(), Box<dyn Error>> {
    let repo = SqliteProductRepository::try_new(conn)?;
    let service = ProductService::new(conn);

    match command {
        ProductCommand::Add {
            category_id,
            name,
            price,
        } => print_json(&service.create_product(category_id, &name, price)?),
        ProductCommand::List { category, sort } => {
            let sort = Sort::<ProductField>::parse(&sort)?;
            print_json(&repo.find_all_by_category_name(&category, &sort)?)
        }
        ProductCommand::Page { category, paging } => {
            print_json(&repo.find_page_by_category_name(&category, &paging.request()?)?)
        }
        ProductCommand::Search { pattern, paging } => {
            print_json(&repo.search_product(&pattern, &paging.request()?)?)
        }
        ProductCommand::Count { category } => {
            let count = match category.as_deref() {
                Some(name) => repo.count_by_category_name(name)?,
                None => repo.count()?,
            };
            print_json(&serde_json::json!({ "count": count }))
        }
        ProductCommand::ZeroPrice { id } => print_json(&service.zero_price(id)?),
        ProductCommand::Delete { name, bulk } => {
            let deleted = if bulk {
                service.bulk_delete_by_name(&name)?
            } else {
                service.delete_by_name(&name)?
            };
            print_json(&serde_json::json!({ "deleted": deleted }))
        }
        ProductCommand::Slices { category_id, size } => {
            let category = load_category(conn, category_id)?;
            print_json(&service.collect_category_slices(&category, size)?)
        }
    }
}

fn load_category(conn: &Connection, id: i64) -> Result<Category, Box<dyn Error>> {
    SqliteCategoryRepository::try_new(conn)?
        .find_by_id(id)?
        .ok_or_else(|| format!("category not found: {id}").into())
}

fn print_json<T: Serialize + ?Sized>(value: &T) -> Result<(), Box<dyn Error>> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}
