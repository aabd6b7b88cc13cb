use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;
use std::time::Duration;

use clap::{Args, Parser, Subcommand};
use tracing_subscriber::EnvFilter;
use ytsent_sentiment::{Analyzer, TfidfXgbModel};
use ytsent_youtube::YoutubeClient;

#[derive(Debug, Parser)]
#[command(name = "ytsent-cli")]
#[command(about = "Video comment sentiment command line interface")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Fetch and classify every comment on a video, then print the summary JSON.
    Analyze {
        link: String,
        #[arg(long)]
        pretty: bool,
    },
    /// Print the video identifier parsed from a link.
    VideoId { link: String },
    /// Load both model artifacts and report their shape.
    CheckArtifacts(ArtifactPaths),
}

#[derive(Debug, Args)]
struct ArtifactPaths {
    #[arg(
        long,
        env = "YTSENT_VECTORIZER_PATH",
        default_value = "./models/tfidf_vectorizer.json"
    )]
    vectorizer: PathBuf,
    #[arg(
        long,
        env = "YTSENT_MODEL_PATH",
        default_value = "./models/review_sentiment_model.json"
    )]
    model: PathBuf,
}

#[tokio::main]
async fn main() -> anyhow::Result<ExitCode> {
    dotenvy::dotenv().ok();
    let env_filter = EnvFilter::try_from_default_env().or_else(|_| EnvFilter::try_new("warn"))?;
    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    match cli.command {
        Commands::Analyze { link, pretty } => {
            analyze(&link, pretty).await?;
        }
        Commands::VideoId { link } => match ytsent_core::extract_video_id(&link) {
            Some(id) => println!("{id}"),
            None => {
                eprintln!("no video id found in {link:?}");
                return Ok(ExitCode::FAILURE);
            }
        },
        Commands::CheckArtifacts(paths) => {
            let model = TfidfXgbModel::load(&paths.vectorizer, &paths.model)?;
            let info = model.info();
            println!("vectorizer: {}", paths.vectorizer.display());
            println!("model:      {}", paths.model.display());
            println!("vocabulary size: {}", info.vocabulary_size);
            println!("trees:           {}", info.trees);
            println!("features:        {}", info.features);
        }
    }

    Ok(ExitCode::SUCCESS)
}

async fn analyze(link: &str, pretty: bool) -> anyhow::Result<()> {
    let config = ytsent_core::load_app_config()?;
    tracing::debug!(?config, "configuration loaded");
    let model = TfidfXgbModel::load(&config.vectorizer_path, &config.model_path)?;
    let client = YoutubeClient::from_config(&config)?;
    let analyzer = Analyzer::new(Arc::new(client), Arc::new(model))
        .with_max_comments(config.max_comments)
        .with_deadline(Duration::from_secs(config.analyze_deadline_secs));

    let result = analyzer.analyze_link(link).await?;
    let json = if pretty {
        serde_json::to_string_pretty(&result)?
    } else {
        serde_json::to_string(&result)?
    };
    println!("{json}");
    Ok(())
}

#[cfg(test)]
mod tests {
    use clap::CommandFactory;

    use super::*;

    #[test]
    fn cli_definition_is_consistent() {
        Cli::command().debug_assert();
    }

    #[test]
    fn parses_analyze_with_pretty_flag() {
        let cli = Cli::try_parse_from([
            "ytsent-cli",
            "analyze",
            "https://youtu.be/dQw4w9WgXcQ",
            "--pretty",
        ])
        .expect("parse");
        assert!(matches!(
            cli.command,
            Commands::Analyze { ref link, pretty: true } if link == "https://youtu.be/dQw4w9WgXcQ"
        ));
    }

    #[test]
    fn check_artifacts_accepts_path_overrides() {
        let cli = Cli::try_parse_from([
            "ytsent-cli",
            "check-artifacts",
            "--vectorizer",
            "/tmp/v.json",
            "--model",
            "/tmp/m.json",
        ])
        .expect("parse");
        let Commands::CheckArtifacts(paths) = cli.command else {
            panic!("expected check-artifacts");
        };
        assert_eq!(paths.vectorizer, PathBuf::from("/tmp/v.json"));
        assert_eq!(paths.model, PathBuf::from("/tmp/m.json"));
    }

    #[test]
    fn subcommand_is_required() {
        assert!(Cli::try_parse_from(["ytsent-cli"]).is_err());
    }
}
