use anyhow::{Context, Result};
use clap::Parser;
use futures::future::join_all;
use std::sync::Arc;

use draftsmith::cli::{Args, Command};
use draftsmith::config::AppConfig;
use draftsmith::models::SocialPlatform;
use draftsmith::pipeline::{
    analyze_post_seo, narrate_post, optimize_post_seo, refine_post, run_generation_pipeline,
    socialize_post, PipelineContext,
};
use draftsmith::providers::{LocalBlobStore, OpenAiCompatClient, OpenAiSpeechClient, TavilySearchClient};
use draftsmith::store::{PostStore, SqlitePostStore};
use draftsmith_sdk::{log_file_saved, log_info, ProgressReporter};

fn build_context(config: &AppConfig, args: &Args) -> Result<PipelineContext> {
    let generation = Arc::new(OpenAiCompatClient::new(
        &config.providers.generation_api_key,
        &config.providers.generation_base_url,
    ));
    let research = Arc::new(TavilySearchClient::new(
        &config.providers.research_api_key,
        &config.providers.research_base_url,
    ));
    let speech = Arc::new(OpenAiSpeechClient::new(
        &config.providers.generation_api_key,
        &config.providers.generation_base_url,
    ));
    let blobs = Arc::new(LocalBlobStore::new(
        config.storage.media_dir.clone(),
        &config.storage.media_base_url,
    ));

    let database_path = args
        .database
        .clone()
        .unwrap_or_else(|| config.storage.database_path.clone());
    let store = Arc::new(SqlitePostStore::new(database_path)?);

    Ok(PipelineContext {
        generation,
        research,
        speech,
        blobs,
        store,
        models: config.models.clone(),
        pipeline: config.pipeline.clone(),
        reporter: ProgressReporter::default(),
    })
}

/// Mirror pipeline progress to the console until the channel closes
fn attach_console_printer(ctx: &PipelineContext) {
    let mut rx = ctx.reporter.subscribe();
    tokio::spawn(async move {
        while let Ok(update) = rx.recv().await {
            println!("{}", update.render());
        }
    });
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenv::dotenv().ok();
    let args = Args::parse();

    let config = AppConfig::from_env()?;
    let ctx = build_context(&config, &args)?;
    attach_console_printer(&ctx);

    match &args.command {
        Command::Generate { output, no_wait, .. } => {
            let request = args
                .command
                .to_generation_request()
                .expect("generate command carries a request");
            let outcome = run_generation_pipeline(&ctx, &args.owner, request).await?;

            println!();
            log_info!("Post id: {}", outcome.post.id);
            if let Some(path) = output {
                tokio::fs::write(path, &outcome.document.markdown)
                    .await
                    .with_context(|| format!("failed to write {}", path.display()))?;
                log_file_saved!(path.display());
            }

            if !outcome.side_tasks.is_empty() && !*no_wait {
                log_info!("Waiting for image/audio enrichment (use --no-wait to skip)...");
                join_all(outcome.side_tasks).await;
            }
        }

        Command::Refine { post, notes } => {
            let refined = refine_post(&ctx, &args.owner, post, notes.as_deref()).await?;
            println!("{}", refined.content);
        }

        Command::SeoAnalyze { post } => {
            let report = analyze_post_seo(&ctx, &args.owner, post).await?;
            println!("Score: {}/100", report.score);
            println!("Meta title: {}", report.meta_title);
            println!("Meta description: {}", report.meta_description);
            println!("Keywords: {}", report.keywords.join(", "));
            println!("Suggestions:");
            for suggestion in &report.suggestions {
                println!("  - {}", suggestion);
            }
        }

        Command::SeoOptimize { post, suggestion } => {
            let suggestions = if suggestion.is_empty() {
                let report = analyze_post_seo(&ctx, &args.owner, post).await?;
                log_info!("Applying {} suggestions from a fresh analysis", report.suggestions.len());
                report.suggestions
            } else {
                suggestion.clone()
            };
            let optimized = optimize_post_seo(&ctx, &args.owner, post, &suggestions).await?;
            println!("{}", optimized.content);
        }

        Command::Social { post, platform } => {
            let platforms: Vec<SocialPlatform> = if platform.is_empty() {
                vec![
                    SocialPlatform::Twitter,
                    SocialPlatform::Linkedin,
                    SocialPlatform::Facebook,
                ]
            } else {
                platform.clone()
            };
            let outcomes = socialize_post(&ctx, &args.owner, post, &platforms).await?;
            for (platform, outcome) in outcomes {
                match outcome {
                    Ok(social) => {
                        println!("--- {} ---", platform.as_str());
                        println!("{}", social.content);
                        println!("{}", social.hashtags.join(" "));
                    }
                    Err(e) => eprintln!("{} failed: {}", platform.as_str(), e),
                }
            }
        }

        Command::Narrate { post } => {
            let url = narrate_post(&ctx, &args.owner, post).await?;
            log_file_saved!(url);
        }

        Command::List { limit } => {
            let posts = ctx.store.list_posts(&args.owner, *limit, 0)?;
            if posts.is_empty() {
                log_info!("No posts yet");
            }
            for post in posts {
                println!(
                    "{}  {:9}  {}  {}",
                    post.id,
                    post.status.as_str(),
                    post.created_at.format("%Y-%m-%d %H:%M"),
                    post.topic
                );
            }
        }

        Command::Show { post } => {
            let Some(found) = ctx.store.get_post(post, &args.owner)? else {
                anyhow::bail!("post {} not found", post);
            };
            println!("topic: {}", found.topic);
            println!("status: {}", found.status.as_str());
            println!(
                "cover_image: {}",
                found.cover_image.as_deref().unwrap_or("(none)")
            );
            println!("audio_url: {}", found.audio_url.as_deref().unwrap_or("(none)"));
            println!();
            println!("{}", found.content);
        }
    }

    Ok(())
}
