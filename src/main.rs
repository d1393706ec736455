use clap::Parser;
use std::error::Error;
use std::path::PathBuf;

use reasoning_mcts::data::load_data::{group_by_subject, load_examples};
use reasoning_mcts::logging::setup_logging;
use reasoning_mcts::mcts::{MCTSHyperparameters, MctsEngine, RewardScheme, SimulationPolicy};
use reasoning_mcts::reasoning::chat_client::{ChatProvider, ChatProviderConfig};
use reasoning_mcts::reasoning::offline::OfflineProvider;
use reasoning_mcts::reasoning::ReasoningProvider;
use reasoning_mcts::recording::{render_tree, summarize, ResultWriter};

#[derive(clap::ValueEnum, Clone, Debug, PartialEq, Eq)]
enum ProviderKind {
    /// Template observations, no network
    Offline,
    /// OpenAI-compatible chat-completions endpoints
    Chat,
}

#[derive(Parser, Debug)]
#[command(
    name = "reasoning_mcts",
    about = "Search reasoning-action orderings with MCTS over a multiple-choice QA dataset."
)]
struct Config {
    /// JSONL file of examples
    #[arg(short = 'd', long, default_value = "data/problems.jsonl")]
    data: PathBuf,

    /// JSON file with hyperparameters; flags below override it
    #[arg(long)]
    config: Option<PathBuf>,

    /// Rollouts per example
    #[arg(short = 'r', long)]
    rollouts: Option<usize>,

    /// UCB1 exploration constant
    #[arg(short = 'c', long)]
    exploration: Option<f64>,

    #[arg(long, value_enum)]
    policy: Option<SimulationPolicy>,

    #[arg(long, value_enum)]
    reward: Option<RewardScheme>,

    /// Offer the FINISH action once a reasoning step has been taken
    #[arg(long, default_value_t = false)]
    allow_finish: bool,

    /// RNG seed for random rollouts
    #[arg(short = 's', long)]
    seed: Option<u64>,

    /// Examples searched per subject (0 = all)
    #[arg(short = 'n', long, default_value_t = 3)]
    per_subject: usize,

    #[arg(long, value_enum, default_value = "offline")]
    provider: ProviderKind,

    /// Directory image references are resolved against (chat provider)
    #[arg(long)]
    image_dir: Option<PathBuf>,

    /// Worker threads for the batch (0 = one per core)
    #[arg(short = 'w', long, default_value_t = 0)]
    workers: usize,

    /// Append results to this JSONL file
    #[arg(short = 'o', long)]
    output: Option<PathBuf>,

    /// Also write logs to rotated files in this directory
    #[arg(long)]
    log_dir: Option<PathBuf>,
}

impl Config {
    fn hyperparameters(&self) -> Result<MCTSHyperparameters, Box<dyn Error>> {
        let mut hp = match &self.config {
            Some(path) => MCTSHyperparameters::load(path)?,
            None => MCTSHyperparameters::default(),
        };
        if let Some(rollouts) = self.rollouts {
            hp.rollouts = rollouts;
        }
        if let Some(c) = self.exploration {
            hp.exploration_constant = c;
        }
        if let Some(policy) = self.policy {
            hp.simulation_policy = policy;
        }
        if let Some(reward) = self.reward {
            hp.reward_scheme = reward;
        }
        if let Some(seed) = self.seed {
            hp.seed = seed;
        }
        hp.allow_finish |= self.allow_finish;
        Ok(hp)
    }

    fn provider(&self) -> Result<Box<dyn ReasoningProvider>, Box<dyn Error>> {
        Ok(match self.provider {
            ProviderKind::Offline => Box::new(OfflineProvider),
            ProviderKind::Chat => {
                let mut config = ChatProviderConfig::from_env();
                if let Some(dir) = &self.image_dir {
                    config.image_dir = dir.clone();
                }
                if config.text.api_key.is_none() {
                    log::warn!(
                        "REASONING_API_KEY is not set; text requests will be unauthenticated"
                    );
                }
                Box::new(ChatProvider::new(config)?)
            }
        })
    }
}

fn main() -> Result<(), Box<dyn Error>> {
    let args = Config::parse();
    let _logger = setup_logging("info", args.log_dir.as_deref())?;

    let hp = args.hyperparameters()?;
    let provider = args.provider()?;
    let engine = MctsEngine::new(provider.as_ref(), hp.clone())?;

    if args.workers > 0 {
        rayon::ThreadPoolBuilder::new()
            .num_threads(args.workers)
            .build_global()?;
    }

    log::info!(
        "Starting search: data={}, rollouts={}, c={}, policy={:?}, reward={:?}, finish={}, seed={}",
        args.data.display(),
        hp.rollouts,
        hp.exploration_constant,
        hp.simulation_policy,
        hp.reward_scheme,
        hp.allow_finish,
        hp.seed
    );

    let examples = load_examples(&args.data)?;
    if examples.is_empty() {
        return Err(format!("No examples found in '{}'", args.data.display()).into());
    }

    let mut writer = match &args.output {
        Some(path) => Some(ResultWriter::open(path)?),
        None => None,
    };

    let mut total = 0usize;
    let mut total_correct = 0usize;

    for (subject, mut group) in group_by_subject(examples) {
        if args.per_subject > 0 {
            group.truncate(args.per_subject);
        }
        log::info!("Subject '{}': searching {} examples", subject, group.len());

        let results = engine.search_batch(&group);
        let correct = results.iter().filter(|r| r.correct).count();

        for result in &results {
            println!("{}", summarize(result));
            print!("{}", render_tree(result));
            println!("{}", serde_json::to_string(result)?);
            if let Some(writer) = writer.as_mut() {
                writer.write_result(&subject, result)?;
            }
        }

        log::info!("Subject '{}': {}/{} correct", subject, correct, results.len());
        total += results.len();
        total_correct += correct;
    }

    if let Some(writer) = writer {
        writer.close()?;
    }

    log::info!(
        "Done: {}/{} correct ({:.1}%)",
        total_correct,
        total,
        100.0 * total_correct as f64 / total.max(1) as f64
    );
    Ok(())
}
