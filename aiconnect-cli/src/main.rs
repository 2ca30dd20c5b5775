use std::process::ExitCode;

use aiconnect_cli::{Cli, Command, Console, Settings, read_document};
use aiconnect_rag::{
    ChatSession, IngestionPipeline, QueryPipeline, UploadedDocument, upload_status,
};
use anyhow::Result;
use clap::Parser;

#[tokio::main]
async fn main() -> ExitCode {
    dotenvy::dotenv().ok();
    let cli = Cli::parse();
    let _ = aiconnect_telemetry::init_with_format("aiconnect", cli.settings.log_format);

    match run(cli).await {
        Ok(code) => code,
        Err(e) => {
            eprintln!("Error: {e:#}");
            ExitCode::FAILURE
        }
    }
}

async fn run(cli: Cli) -> Result<ExitCode> {
    let settings = cli.settings;
    match cli.command {
        Command::Ingest { path, name, description } => {
            let document = read_document(&path, name, description).await?;
            ingest(&settings, &document).await
        }
        Command::Ask { question, show_sources } => {
            ask(&settings, &question.join(" "), show_sources).await
        }
        Command::Chat => {
            chat(&settings).await?;
            Ok(ExitCode::SUCCESS)
        }
    }
}

async fn ingestion_pipeline(settings: &Settings) -> Result<IngestionPipeline> {
    Ok(IngestionPipeline::builder()
        .embedding_provider(settings.embedding_provider()?)
        .vector_store(settings.vector_store().await?)
        .build()?)
}

async fn ingest(settings: &Settings, document: &UploadedDocument) -> Result<ExitCode> {
    let pipeline = ingestion_pipeline(settings).await?;
    let result = pipeline.ingest(document).await;
    let status = upload_status(&result);
    if result.is_err() {
        eprintln!("{status}");
        return Ok(ExitCode::FAILURE);
    }
    println!("{status}");
    Ok(ExitCode::SUCCESS)
}

async fn ask(settings: &Settings, question: &str, show_sources: bool) -> Result<ExitCode> {
    let query = QueryPipeline::builder()
        .embedding_provider(settings.embedding_provider()?)
        .vector_store(settings.vector_store().await?)
        .llm(settings.llm()?)
        .build()?;

    let answer = match query.answer(question).await {
        Ok(answer) => answer,
        Err(e) => {
            eprintln!("Error: {e}");
            return Ok(ExitCode::FAILURE);
        }
    };
    println!("{answer}");

    if show_sources && !answer.sources().is_empty() {
        println!("\nSources:");
        for (i, hit) in answer.sources().iter().enumerate() {
            println!("  [{}] {} ({:.3}) {:?}", i + 1, hit.collection, hit.score, hit.metadata);
            println!("      {}", preview(&hit.text));
        }
    }
    Ok(ExitCode::SUCCESS)
}

async fn chat(settings: &Settings) -> Result<()> {
    let embedder = settings.embedding_provider()?;
    let store = settings.vector_store().await?;
    let ingestion = IngestionPipeline::builder()
        .embedding_provider(embedder.clone())
        .vector_store(store.clone())
        .build()?;
    let query = QueryPipeline::builder()
        .embedding_provider(embedder)
        .vector_store(store)
        .llm(settings.llm()?)
        .build()?;

    let session = ChatSession::new(settings.access_gate());
    Console::new(session, ingestion, query).run().await
}

fn preview(text: &str) -> String {
    const LIMIT: usize = 120;
    let line = text.lines().next().unwrap_or_default();
    match line.char_indices().nth(LIMIT) {
        Some((end, _)) => format!("{}...", &line[..end]),
        None => line.to_string(),
    }
}
