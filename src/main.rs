// Glycopilot CLI
use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};

use glycopilot_lib::cascade::{CascadeEngine, PolicyProfile, CANONICAL_PROFILE};
use glycopilot_lib::config::{self, read_json};
use glycopilot_lib::knowledge::KnowledgeBase;
use glycopilot_lib::models::{DrugClass, EvaluationRequest};

#[derive(Parser)]
#[command(name = "glycopilot")]
#[command(version)]
#[command(about = "Type 2 diabetes medication rule cascade", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Evaluate a patient request and print the plan as JSON
    Evaluate {
        /// Request file: { "patient": {...}, "regimen": [...] }
        #[arg(value_name = "REQUEST")]
        request: PathBuf,

        /// Policy profile JSON file (overrides --profile)
        #[arg(long, value_name = "POLICY")]
        policy: Option<PathBuf>,

        /// Named policy profile
        #[arg(long, default_value = CANONICAL_PROFILE)]
        profile: String,

        /// Knowledge base JSON file (defaults to the built-in table)
        #[arg(long, value_name = "KNOWLEDGE")]
        knowledge: Option<PathBuf>,

        /// Pretty-print the plan
        #[arg(long)]
        pretty: bool,
    },

    /// Print knowledge base entries
    Compendium {
        /// Single drug class (all classes when omitted)
        class: Option<String>,

        /// Knowledge base JSON file (defaults to the built-in table)
        #[arg(long, value_name = "KNOWLEDGE")]
        knowledge: Option<PathBuf>,
    },

    /// Compare two drug classes head to head
    Compare {
        left: String,
        right: String,

        /// Only print attributes that differ
        #[arg(long)]
        differing: bool,

        /// Knowledge base JSON file (defaults to the built-in table)
        #[arg(long, value_name = "KNOWLEDGE")]
        knowledge: Option<PathBuf>,
    },
}

fn main() -> Result<()> {
    glycopilot_lib::init_tracing();
    tracing::debug!("{} v{}", config::APP_NAME, config::APP_VERSION);

    let cli = Cli::parse();
    match cli.command {
        Commands::Evaluate {
            request,
            policy,
            profile,
            knowledge,
            pretty,
        } => evaluate_command(&request, policy.as_deref(), &profile, knowledge.as_deref(), pretty),
        Commands::Compendium { class, knowledge } => {
            compendium_command(class.as_deref(), knowledge.as_deref())
        }
        Commands::Compare {
            left,
            right,
            differing,
            knowledge,
        } => compare_command(&left, &right, differing, knowledge.as_deref()),
    }
}

fn load_knowledge(path: Option<&Path>) -> Result<KnowledgeBase> {
    match path {
        Some(path) => KnowledgeBase::load(path)
            .with_context(|| format!("Failed to load knowledge base: {}", path.display())),
        None => KnowledgeBase::builtin().context("Built-in knowledge base is invalid"),
    }
}

fn load_policy(path: Option<&Path>, profile: &str) -> Result<PolicyProfile> {
    match path {
        Some(path) => PolicyProfile::load(path)
            .with_context(|| format!("Failed to load policy: {}", path.display())),
        None => PolicyProfile::named(profile).context("Failed to select policy profile"),
    }
}

fn parse_class(name: &str) -> Result<DrugClass> {
    name.parse::<DrugClass>()
        .with_context(|| format!("Unknown drug class '{name}'"))
}

fn print_json<T: serde::Serialize>(value: &T, pretty: bool) -> Result<()> {
    let out = if pretty {
        serde_json::to_string_pretty(value)?
    } else {
        serde_json::to_string(value)?
    };
    println!("{out}");
    Ok(())
}

fn evaluate_command(
    request_path: &Path,
    policy_path: Option<&Path>,
    profile: &str,
    knowledge_path: Option<&Path>,
    pretty: bool,
) -> Result<()> {
    let knowledge = load_knowledge(knowledge_path)?;
    let policy = load_policy(policy_path, profile)?;
    let engine = CascadeEngine::new(Arc::new(knowledge), Arc::new(policy))
        .context("Failed to build cascade engine")?;
    tracing::debug!(profile = %engine.policy().name, "Cascade engine ready");

    let request: EvaluationRequest = read_json(request_path)
        .with_context(|| format!("Failed to read request: {}", request_path.display()))?;
    let plan = engine
        .evaluate_request(request)
        .context("Evaluation rejected")?;

    print_json(&plan, pretty)
}

fn compendium_command(class: Option<&str>, knowledge_path: Option<&Path>) -> Result<()> {
    let knowledge = load_knowledge(knowledge_path)?;
    match class {
        Some(name) => {
            let entry = knowledge.capability_of(parse_class(name)?)?;
            print_json(entry, true)
        }
        None => {
            let entries: Vec<_> = knowledge.entries().collect();
            print_json(&entries, true)
        }
    }
}

fn compare_command(
    left: &str,
    right: &str,
    differing: bool,
    knowledge_path: Option<&Path>,
) -> Result<()> {
    let knowledge = load_knowledge(knowledge_path)?;
    let comparison = knowledge.compare(parse_class(left)?, parse_class(right)?)?;

    println!("{:<20} {:<28} {:<28}", "", comparison.left.label(), comparison.right.label());
    let rows: Vec<_> = if differing {
        comparison.differing().collect()
    } else {
        comparison.rows.iter().collect()
    };
    for row in rows {
        let marker = if row.differs() { "*" } else { " " };
        println!("{marker}{:<19} {:<28} {:<28}", row.attribute, row.left, row.right);
    }
    Ok(())
}
