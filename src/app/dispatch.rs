use crate::cli::commands::Commands;
use anyhow::{Context, Result};
use postwright::{
    Config, FormattedText, IncomingPost, extract_links, primary_text, rewrite_with_config,
};
use serde::Deserialize;
use std::path::Path;

/// A single message or a whole album.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum PostInput {
    Album(Vec<IncomingPost>),
    Single(Box<IncomingPost>),
}

fn read_post(path: &Path) -> Result<FormattedText> {
    let raw = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read {}", path.display()))?;
    let input: PostInput = serde_json::from_str(&raw)
        .with_context(|| format!("{} is not a Bot API message or album", path.display()))?;
    let text = match input {
        PostInput::Album(mut batch) => {
            batch.sort_by_key(|p| p.message_id);
            primary_text(&batch)
        }
        PostInput::Single(post) => post.formatted_text(),
    };
    Ok(text.unwrap_or_default())
}

fn print_json(value: &impl serde::Serialize) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

pub async fn dispatch(command: Commands, config: Config) -> Result<()> {
    match command {
        Commands::Canonicalize { urls } => {
            let canonicalizer = config.canonicalizer();
            for url in urls {
                println!("{}", canonicalizer.canonicalize(&url));
            }
            Ok(())
        }

        Commands::Tokenize { input } => {
            let post = read_post(&input)?;
            let extraction = extract_links(&post.content, &post.annotations);
            print_json(&serde_json::json!({
                "text": extraction.text,
                "tokens": extraction.tokens,
                "warnings": extraction.warnings,
            }))
        }

        Commands::Rewrite { input, instruction } => {
            let post = read_post(&input)?;
            let mut config = config;
            if let Some(path) = instruction {
                config.rewrite.style_rules = std::fs::read_to_string(&path)
                    .with_context(|| format!("Failed to read {}", path.display()))?;
            }

            let rewritten = rewrite_with_config(&config, &post).await?;
            print_json(&rewritten)
        }
    }
}
