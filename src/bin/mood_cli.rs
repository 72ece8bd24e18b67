use anyhow::Result;
use clap::Parser;
use std::io::{self, BufRead, Write};

use moodify::config::LanguageConfig;
use moodify::emotion::EmotionInferer;
use moodify::language::{LanguageClient, TextAnalyzer};
use moodify::recommend::{RecommendationEngine, RecommendationKind};

/// Analyse one line of text from the terminal.
#[derive(Parser, Debug)]
#[command(name = "mood-cli", version, about)]
struct Args {
    /// Recommendation type: songs, quotes or activities
    #[arg(short = 't', long = "type", default_value = "songs")]
    kind: RecommendationKind,

    /// Text to analyse; prompts on stdin when omitted
    text: Option<String>,
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt().with_writer(io::stderr).init();
    let args = Args::parse();

    let client = LanguageClient::new(LanguageConfig::from_env()?)?;

    let text = match args.text {
        Some(text) => text,
        None => {
            print!("How are you feeling? ");
            io::stdout().flush()?;
            let mut line = String::new();
            io::stdin().lock().read_line(&mut line)?;
            line
        }
    };

    let analysis = client.analyze(&text).await?;
    let outcome = EmotionInferer::default().analyze(Some(&analysis));

    if let Some(sentiment) = analysis.sentiment {
        println!("Overall sentiment: {}", sentiment.label.as_str());
        println!(
            "Scores ➤ Positive: {:.2}, Neutral: {:.2}, Negative: {:.2}",
            sentiment.scores.positive, sentiment.scores.neutral, sentiment.scores.negative
        );
    }
    println!(
        "🎭 Detected emotion: {} ({:.2})",
        outcome.emotion.as_str().to_uppercase(),
        outcome.confidence
    );

    let recommendation = RecommendationEngine::default().get_recommendation(outcome.emotion, args.kind);
    println!("💡 {} recommendation: {}", args.kind, recommendation);

    Ok(())
}
