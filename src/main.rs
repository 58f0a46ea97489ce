// file: src/main.rs
// description: commandline application entry point with command handling
// reference: application bootstrap and orchestration

use anyhow::{Context, Result};
use clap::{ArgAction, Parser, Subcommand};
use serial_vault::corpus;
use serial_vault::utils::logging::{
    format_error, format_info, format_match_label, format_success, format_warning, init_logger,
};
use serial_vault::{
    Config, DocumentProcessor, DocumentQueries, DocumentStore, IngestOrchestrator, PageLookup,
    PdfExtractor, SchemaManager, SerialSearch, SqliteClient, Validator,
};
use std::path::PathBuf;
use std::sync::Arc;
use tracing::{error, info, warn};

const PREVIEW_CHARS: usize = 300;

#[derive(Parser)]
#[command(name = "serial_vault")]
#[command(version)]
#[command(about = "PDF repository with serial-number search over page text", long_about = None)]
struct Cli {
    #[arg(
        short,
        long,
        value_name = "FILE",
        default_value = "config/default.toml"
    )]
    config: PathBuf,

    #[arg(long, default_value_t = true, action = ArgAction::Set)]
    color: bool,

    #[arg(short, long, action = ArgAction::SetTrue)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Start the HTTP server
    Serve,

    Verify {
        #[arg(long)]
        create_schema: bool,
    },

    Stats,

    Reset {
        #[arg(long)]
        confirm: bool,
    },

    /// Upload every PDF found under a directory
    Ingest {
        path: PathBuf,

        #[arg(long, value_name = "NUM")]
        limit: Option<usize>,
    },

    /// Find pages mentioning a serial number
    Search {
        serial: String,

        #[arg(short, long, value_name = "ID")]
        document: Option<i64>,
    },

    /// Print the text of one page
    Page { document: i64, page: u32 },

    List,

    Delete { id: i64 },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    init_logger(cli.color, cli.verbose);
    colored::control::set_override(cli.color);

    info!("Loading configuration from: {}", cli.config.display());

    let config = if cli.config.exists() {
        Config::load(Some(cli.config.as_path())).context("Failed to load configuration")?
    } else {
        warn!(
            "Config file {} not found, using default configuration",
            cli.config.display()
        );
        Config::default_config()
    };

    if let Commands::Serve = cli.command {
        return serial_vault::server::serve(&config)
            .await
            .context("HTTP server failed");
    }

    let client = SqliteClient::new(config.database.clone())
        .await
        .context("Failed to open the database")?;

    let outcome = match cli.command {
        Commands::Serve => Ok(()),
        Commands::Verify { create_schema } => cmd_verify(&client, create_schema).await,
        Commands::Stats => cmd_stats(&client).await,
        Commands::Reset { confirm } => cmd_reset(&client, confirm).await,
        Commands::Ingest { path, limit } => cmd_ingest(&config, &client, path, limit, cli.color).await,
        Commands::Search { serial, document } => {
            cmd_search(&config, &client, &serial, document).await
        }
        Commands::Page { document, page } => cmd_page(&config, &client, document, page).await,
        Commands::List => cmd_list(&client).await,
        Commands::Delete { id } => cmd_delete(&config, &client, id).await,
    };

    client.close().await;

    if let Err(e) = &outcome {
        error!("{:#}", e);
    }
    outcome
}

fn open_store(config: &Config) -> Result<Arc<DocumentStore>> {
    let store = DocumentStore::from_config(&config.storage).context("Failed to open storage")?;
    Ok(Arc::new(store))
}

fn processor(config: &Config, client: &SqliteClient) -> Result<DocumentProcessor> {
    Ok(DocumentProcessor::new(
        client.clone(),
        open_store(config)?,
        Arc::new(PdfExtractor::new()),
    ))
}

async fn ensure_schema(client: &SqliteClient) -> Result<()> {
    SchemaManager::new(client)
        .initialize()
        .await
        .context("Failed to initialize schema")
}

async fn cmd_verify(client: &SqliteClient, create_schema: bool) -> Result<()> {
    info!("Verifying database schema");

    if !client.ping().await? {
        return Err(anyhow::anyhow!("Database connection failed"));
    }

    info!("Database connection successful");

    let schema_manager = SchemaManager::new(client);

    if schema_manager.verify_schema().await? {
        println!("{}", format_success("Schema verification passed - all tables exist"));
    } else if create_schema {
        info!("Creating schema");
        schema_manager
            .initialize()
            .await
            .context("Failed to create schema")?;
        println!("{}", format_success("Schema created successfully"));
    } else {
        println!(
            "{}",
            format_warning("Some tables are missing. Use --create-schema to create them")
        );
    }

    Ok(())
}

async fn cmd_stats(client: &SqliteClient) -> Result<()> {
    let schema_manager = SchemaManager::new(client);
    if !schema_manager.verify_schema().await? {
        println!("{}", format_warning("Schema not initialized; run verify --create-schema"));
        return Ok(());
    }

    let queries = DocumentQueries::new(client);
    let documents = queries.count_documents().await?;
    let pages = queries.count_all_pages().await?;

    println!("{}", format_info(&format!("Database: {}", client.uri())));
    println!("{}", format_info(&format!("Documents: {}", documents)));
    println!("{}", format_info(&format!("Page rows: {}", pages)));

    Ok(())
}

async fn cmd_reset(client: &SqliteClient, confirm: bool) -> Result<()> {
    if !confirm {
        println!(
            "{}",
            format_error("This will delete all data. Use --confirm to proceed")
        );
        return Ok(());
    }

    warn!("Resetting database - all data will be lost");

    let schema_manager = SchemaManager::new(client);
    schema_manager
        .drop_all_tables()
        .await
        .context("Failed to drop tables")?;
    schema_manager
        .initialize()
        .await
        .context("Failed to recreate schema")?;

    println!("{}", format_success("Database reset complete"));
    Ok(())
}

async fn cmd_ingest(
    config: &Config,
    client: &SqliteClient,
    path: PathBuf,
    limit: Option<usize>,
    colored: bool,
) -> Result<()> {
    ensure_schema(client).await?;

    let processor = Arc::new(processor(config, client)?);
    let orchestrator = IngestOrchestrator::new(processor, config.ingest.clone(), colored);

    let stats = orchestrator
        .run(&path, limit)
        .await
        .with_context(|| format!("Ingest of {} failed", path.display()))?;

    println!(
        "{}",
        format_success(&format!(
            "Ingested {} documents ({} pages), {} failed",
            stats.documents_created, stats.pages_stored, stats.files_failed
        ))
    );

    Ok(())
}

async fn cmd_search(
    config: &Config,
    client: &SqliteClient,
    serial: &str,
    document: Option<i64>,
) -> Result<()> {
    let serial = Validator::validate_serial(Some(serial))?;
    let corpus = corpus::for_store(client.clone(), open_store(config)?);
    let search = SerialSearch::new(corpus, config.search.clone());

    let results = search
        .search(&serial, document)
        .await
        .context("Serial search failed")?;

    if results.is_empty() {
        println!("{}", format_warning(&format!("No pages mention serial {}", serial)));
        return Ok(());
    }

    println!("\nResults for serial \"{}\" ({} found)\n", serial, results.len());
    println!("{}", "=".repeat(80));

    for (idx, result) in results.iter().enumerate() {
        println!(
            "\n{}. [{}] {} (document {}) page {}/{}",
            idx + 1,
            format_match_label(result.exact_match, result.possible_match),
            result.document_name,
            result.document_id,
            result.page_number,
            result.page_count
        );

        if let (Some(text), Some(position)) = (&result.matched_text, result.match_position) {
            println!("   Match: \"{}\" at {}", text, position);
        }

        if let Some(context) = &result.match_context {
            println!("   Context: {}", Validator::truncate_text(context, PREVIEW_CHARS));
        }
    }

    println!("\n{}", "=".repeat(80));
    Ok(())
}

async fn cmd_page(config: &Config, client: &SqliteClient, document: i64, page: u32) -> Result<()> {
    let corpus = corpus::for_store(client.clone(), open_store(config)?);
    let record = PageLookup::new(corpus)
        .get_page(document, page)
        .await
        .with_context(|| format!("Could not load page {} of document {}", page, document))?;

    println!(
        "{}",
        format_info(&format!(
            "{} (document {}) page {}/{}",
            record.nombre, record.id, record.numero_pagina, record.num_paginas
        ))
    );
    println!("{}", record.contenido);
    Ok(())
}

async fn cmd_list(client: &SqliteClient) -> Result<()> {
    let documents = DocumentQueries::new(client).list().await?;

    if documents.is_empty() {
        println!("{}", format_info("No documents stored"));
        return Ok(());
    }

    for doc in documents {
        println!(
            "{:>6}  {:<40}  {:>4} pages  {}",
            doc.id,
            Validator::truncate_text(&doc.nombre, 40),
            doc.num_paginas,
            doc.fecha_subida.format("%Y-%m-%d %H:%M")
        );
    }

    Ok(())
}

async fn cmd_delete(config: &Config, client: &SqliteClient, id: i64) -> Result<()> {
    let document = processor(config, client)?
        .delete(id)
        .await
        .with_context(|| format!("Could not delete document {}", id))?;

    println!(
        "{}",
        format_success(&format!("Deleted document {} ({})", id, document.nombre))
    );
    Ok(())
}
