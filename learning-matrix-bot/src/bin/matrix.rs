use clap::Parser;
use learning_matrix_bot::explain::TemplateExplainer;
use learning_matrix_bot::signal_feed::SyntheticSignalFeed;
use learning_matrix_bot::{LearnRequest, LearningSession, SessionConfig};
use std::sync::Arc;

#[derive(Parser, Debug)]
#[command(name = "matrix")]
struct Args {
    /// Concepts to learn; repeat the flag for several.
    #[arg(long = "concept")]
    concepts: Vec<String>,

    #[arg(long, default_value_t = 1_024)]
    shots: u64,

    /// Fixed sampling seed; omit for OS entropy.
    #[arg(long)]
    seed: Option<u64>,

    /// Attach the synthetic signal feed to each request.
    #[arg(long, default_value_t = false)]
    with_signal: bool,

    #[arg(long, default_value_t = 7, env = "MATRIX_SIGNAL_SEED")]
    signal_seed: u64,

    /// Samples per channel in each signal window.
    #[arg(long, default_value_t = 64)]
    window: usize,
}

fn default_concepts() -> Vec<String> {
    ["Photosynthesis", "Bayes' theorem", "Plate tectonics"]
        .into_iter()
        .map(str::to_owned)
        .collect()
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    let args = Args::parse();
    let concepts = if args.concepts.is_empty() {
        default_concepts()
    } else {
        args.concepts.clone()
    };

    let mut cfg = SessionConfig::default();
    cfg.engine.shots = args.shots;
    let session = LearningSession::new(cfg, Arc::new(TemplateExplainer));
    let mut feed = SyntheticSignalFeed::new(args.signal_seed);

    for concept in &concepts {
        let channels = args.with_signal.then(|| feed.next_window(args.window));
        let record = session
            .learn(LearnRequest {
                concept: concept.clone(),
                channels,
                seed: args.seed,
            })
            .await?;
        println!(
            "{:<24} mastery {:>6.2}%  outcomes {:>3}  depth {}  {}",
            record.concept,
            record.mastery.percent(),
            record.distribution.support(),
            record.circuit.depth(),
            record.explanation
        );
    }

    println!("{}", serde_json::to_string_pretty(&session.snapshot_kv())?);
    Ok(())
}
