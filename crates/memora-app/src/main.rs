//! Memora binary - composition root.
//!
//! 1. Parse CLI args and load configuration from TOML
//! 2. Initialize tracing
//! 3. Build the embedding service, embedder, and in-memory store
//! 4. Register the built-in skills
//! 5. Run one command; Ctrl-C cancels in-flight embedding calls

mod cli;

use std::sync::Arc;

use clap::Parser;
use tokio_util::sync::CancellationToken;

use memora_core::config::MemoraConfig;
use memora_skills::{register_memory_skills, SkillRegistry};
use memora_vector::{embedding, Embedder, InMemoryVectorStore, VectorStore};

use cli::{CliArgs, Command};

fn init_tracing(level: &str) {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(level)),
        )
        .with_writer(std::io::stderr)
        .init();
}

/// Embed each memory under `m0`, `m1`, ... then search for `query`.
async fn run_search(
    store: &dyn VectorStore,
    config: &MemoraConfig,
    query: &str,
    memories: &[String],
    limit: Option<usize>,
    cancel: &CancellationToken,
) -> Result<(), Box<dyn std::error::Error>> {
    for (i, text) in memories.iter().enumerate() {
        store.remember(&format!("m{}", i), text, cancel).await?;
    }
    tracing::info!(count = store.len(), "Memories embedded");

    let limit = config
        .search
        .clamp_limit(limit.unwrap_or(config.search.default_limit));
    let hits = store.search(query, limit, cancel).await?;

    for hit in hits {
        println!(
            "{}",
            serde_json::json!({ "id": hit.record_id, "similarity": hit.similarity })
        );
    }
    Ok(())
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = CliArgs::parse();

    // Config is read before tracing so the file can pick the log level. A
    // warn-level subscriber covers the load so a fallback is still reported.
    let config_file = args.resolve_config_path();
    let bootstrap = tracing_subscriber::fmt()
        .with_max_level(tracing::Level::WARN)
        .with_writer(std::io::stderr)
        .finish();
    let config = tracing::subscriber::with_default(bootstrap, || {
        MemoraConfig::load_or_default(&config_file)
    });
    init_tracing(&args.resolve_log_level(&config.general.log_level));

    tracing::info!(
        "Starting Memora v{} (config: {})",
        env!("CARGO_PKG_VERSION"),
        config_file.display()
    );
    config.validate()?;

    // Embedding service + store.
    let service = embedding::from_config(&config.embedding)?;
    let embedder = Arc::new(Embedder::new_dyn(service, config.embedding.model.as_str()));
    let store: Arc<dyn VectorStore> = Arc::new(InMemoryVectorStore::new(embedder));
    tracing::info!(model = %config.embedding.model, "Vector store ready");

    let cancel = CancellationToken::new();
    {
        let cancel = cancel.clone();
        tokio::spawn(async move {
            if tokio::signal::ctrl_c().await.is_ok() {
                tracing::warn!("Interrupt received, cancelling");
                cancel.cancel();
            }
        });
    }

    let mut registry = SkillRegistry::new();
    register_memory_skills(
        &mut registry,
        Arc::clone(&store),
        config.search.default_limit,
        cancel.clone(),
    );

    match args.command {
        Command::Search {
            query,
            memories,
            limit,
        } => run_search(store.as_ref(), &config, &query, &memories, limit, &cancel).await?,
        Command::Skills => {
            for skill in registry.list() {
                println!("{}\t{}", skill.name(), skill.description());
            }
        }
        Command::Skill { name, input } => {
            let output = registry.execute(&name, &input).await?;
            println!("{}", output);
        }
    }

    Ok(())
}
