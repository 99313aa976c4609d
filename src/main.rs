//! tagscope CLI: browse tag compatibility and build films.

use std::path::PathBuf;
use std::sync::Arc;

use clap::{Parser, Subcommand};
use miette::{IntoDiagnostic, Result};

use tagscope::audience::display_order;
use tagscope::category::{Category, CategoryResolver};
use tagscope::display::{PoolFilter, pretty_category, pretty_tag_name};
use tagscope::index::CompatibilityIndex;
use tagscope::loader::load_metadata;
use tagscope::paths::AppPaths;
use tagscope::recommend::recommend;
use tagscope::settings::Settings;
use tagscope::snapshot::ConfigSnapshot;
use tagscope::unlock::{ManualUnlocks, Unlocks};

#[derive(Parser)]
#[command(name = "tagscope", version, about = "Tag compatibility browser and film builder")]
struct Cli {
    /// Game project directory (contains `Data/Configs`).
    #[arg(long, global = true)]
    project_root: Option<PathBuf>,

    /// Settings file to use instead of the XDG default.
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Summarize the loaded data: categories, counts and samples.
    Inspect,

    /// List categories with their tag counts.
    Categories,

    /// List the tags filed under a category.
    Items {
        /// Category name, e.g. "Theme" or "Supporting Character".
        category: String,
    },

    /// Show the tags a tag is compatible with.
    Related {
        tag: String,

        /// Show tags that point at this tag instead.
        #[arg(long)]
        incoming: bool,
    },

    /// Show which category each tag resolves to, and why.
    Resolve {
        #[arg(required = true)]
        tags: Vec<String>,
    },

    /// Compute the agnostic score of a selection.
    Score {
        tags: Vec<String>,

        /// Show every pair and intermediate value.
        #[arg(long)]
        explain: bool,

        /// Print JSON.
        #[arg(long)]
        json: bool,
    },

    /// Evaluate every candidate addition to a selection.
    Recommend {
        tags: Vec<String>,

        /// Only consider candidates whose key contains this text.
        #[arg(long)]
        filter: Option<String>,

        /// Only consider unlocked candidates.
        #[arg(long)]
        only_unlocked: bool,

        /// Number of candidates to print.
        #[arg(long, default_value = "15")]
        top: usize,

        /// Print JSON.
        #[arg(long)]
        json: bool,
    },

    /// Show the audience distribution of a selection.
    Audience { tags: Vec<String> },

    /// Manage manually unlocked tags.
    Unlocks {
        #[command(subcommand)]
        action: UnlockAction,
    },

    /// Show or create the settings file.
    Settings {
        #[command(subcommand)]
        action: SettingsAction,
    },
}

#[derive(Subcommand)]
enum UnlockAction {
    /// List manual and start unlocks.
    List,
    /// Unlock tags by hand.
    Add {
        #[arg(required = true)]
        tags: Vec<String>,
    },
    /// Remove manual unlocks.
    Remove {
        #[arg(required = true)]
        tags: Vec<String>,
    },
}

#[derive(Subcommand)]
enum SettingsAction {
    /// Print the effective settings as TOML.
    Show,
    /// Write a settings file with every default spelled out.
    Init {
        /// Overwrite an existing file.
        #[arg(long)]
        force: bool,
    },
}

fn main() -> Result<()> {
    miette::set_hook(Box::new(|_| {
        Box::new(
            miette::MietteHandlerOpts::new()
                .terminal_links(true)
                .unicode(true)
                .context_lines(3)
                .build(),
        )
    }))
    .ok(); // Ignore error if hook already set (e.g., in tests)

    let cli = Cli::parse();
    let (settings_path, settings) = Settings::discover(cli.config.as_deref())?;

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(&settings.log_level)),
        )
        .with_writer(std::io::stderr)
        .init();

    let project_root = cli
        .project_root
        .clone()
        .unwrap_or_else(|| settings.project_root());
    let layout = settings.layout_for(&project_root);

    match cli.command {
        Commands::Inspect => {
            let snapshot = ConfigSnapshot::load(&layout)?;
            let index = snapshot.index();
            println!("{}", snapshot.info());

            println!("Categories found:");
            for cat in index.categories() {
                println!("- {}: {} items", pretty_category(cat), index.items(cat).len());
            }

            println!("\nSamples:");
            for cat in index.categories() {
                let keys: Vec<&str> = index.items(cat).into_iter().take(5).collect();
                if keys.is_empty() {
                    println!("[{}] -> (none)", pretty_category(cat));
                } else {
                    println!("[{}] -> {}", pretty_category(cat), keys.join(", "));
                    let preview: Vec<String> = index
                        .related(keys[0])
                        .into_iter()
                        .take(5)
                        .map(|(k, v)| format!("{k}:{v:.3}"))
                        .collect();
                    if preview.is_empty() {
                        println!("  related({}): (none)", keys[0]);
                    } else {
                        println!("  related({}): {}", keys[0], preview.join(", "));
                    }
                }
                println!();
            }
        }

        Commands::Categories => {
            let snapshot = ConfigSnapshot::load(&layout)?;
            let index = snapshot.index();
            for (cat, tags) in index.tags_by_category() {
                println!("{:<24} {:>5}", pretty_category(cat), tags.len());
            }
            println!(
                "{} tags across {} categories",
                index.tag_count(),
                index.categories().len()
            );
        }

        Commands::Items { category } => {
            let snapshot = ConfigSnapshot::load(&layout)?;
            let index = snapshot.index();
            let Some(cat) = find_category(index, &category) else {
                let known: Vec<String> = index.categories().into_iter().map(pretty_category).collect();
                miette::bail!(
                    help = format!("known categories: {}", known.join(", ")),
                    "no tags filed under category {category:?}"
                );
            };
            for tag in index.items(&cat) {
                println!("{tag:<40} {}", pretty_tag_name(tag));
            }
        }

        Commands::Related { tag, incoming } => {
            let snapshot = ConfigSnapshot::load(&layout)?;
            let index = snapshot.index();
            let edges = if incoming {
                index.incoming(&tag)
            } else {
                index.related(&tag)
            };
            println!(
                "{} [{}] {} {} tags",
                tag,
                pretty_category(&index.category_of(&tag)),
                if incoming { "<-" } else { "->" },
                edges.len()
            );
            let mut edges: Vec<(String, f64)> = edges.into_iter().collect();
            edges.sort_by(|a, b| b.1.total_cmp(&a.1));
            for (other, score) in edges {
                println!("  {score:>7.3}  {other}");
            }
        }

        Commands::Resolve { tags } => {
            let metadata = Arc::new(load_metadata(&layout));
            let resolver = CategoryResolver::layered(metadata);
            for tag in &tags {
                let (cat, tier) = resolver.resolve_traced(tag);
                println!(
                    "{tag:<40} {:<22} ({})",
                    pretty_category(&cat),
                    tier.map(|t| t.name()).unwrap_or("fallback")
                );
            }
        }

        Commands::Score {
            tags,
            explain,
            json,
        } => {
            let snapshot = ConfigSnapshot::load(&layout)?;
            let engine = snapshot.engine();
            let precision = digits(engine.variables().score_precision);

            if json {
                let breakdown = engine.breakdown(&tags);
                let out = serde_json::to_string_pretty(&breakdown).into_diagnostic()?;
                println!("{out}");
            } else if explain {
                let breakdown = engine.breakdown(&tags);
                for pair in &breakdown.pairs {
                    println!(
                        "  {:<32} {:<32} compat {:>6}  genre {:>6}  -> {}",
                        pair.a,
                        pair.b,
                        fmt_opt(pair.compatibility),
                        fmt_opt(pair.genre),
                        pair.contribution
                            .map(|c| format!("{c:.3}"))
                            .unwrap_or_else(|| "excluded".into())
                    );
                }
                println!(
                    "pairs: {} ({} contributing)  mean: {}  normalized: {}",
                    breakdown.pairs.len(),
                    breakdown.contributing(),
                    fmt_opt(breakdown.mean),
                    fmt_opt(breakdown.normalized)
                );
                println!("Score: {:.*}", precision, breakdown.score);
            } else {
                println!("Score: {:.*}", precision, engine.score(&tags));
            }
        }

        Commands::Recommend {
            tags,
            filter,
            only_unlocked,
            top,
            json,
        } => {
            let snapshot = ConfigSnapshot::load(&layout)?;
            let engine = snapshot.engine();
            let precision = digits(engine.variables().score_precision);

            let unlocks = only_unlocked.then(|| {
                Unlocks::load(
                    snapshot.metadata(),
                    settings.unlocks.start_year,
                    &layout.manual_unlocks,
                )
            });
            let pool = PoolFilter {
                query: filter.as_deref(),
                unlocked: unlocks.as_ref(),
            }
            .apply(snapshot.index().tags());

            let rec = recommend(&engine, &tags, &pool);

            if json {
                let out = serde_json::to_string_pretty(&rec).into_diagnostic()?;
                println!("{out}");
                return Ok(());
            }

            println!("Current score: {:.*}", precision, rec.current_score);
            match &rec.best {
                Some(best) => println!("Recommended:   {best} ({})", pretty_tag_name(best)),
                None => println!("Recommended:   (no candidates)"),
            }

            let mut ranked: Vec<_> = rec.outcomes.iter().collect();
            ranked.sort_by(|a, b| b.score.total_cmp(&a.score));
            for outcome in ranked.into_iter().take(top) {
                println!(
                    "  {:>5.*}  {:>+6.*}  {:<9} {}{}",
                    precision,
                    outcome.score,
                    precision,
                    outcome.delta,
                    rec.band(outcome.delta),
                    outcome.tag,
                    if rec.is_best(&outcome.tag) { "  <- recommended" } else { "" }
                );
            }
        }

        Commands::Audience { tags } => {
            let snapshot = ConfigSnapshot::load_lenient(&layout);
            let shares = display_order(snapshot.audience().distribution(&tags, snapshot.metadata()));
            if shares.is_empty() {
                println!("No audience groups configured.");
            }
            for share in &shares {
                println!("{:<16} {:>5.1}", share.label(), share.percent);
            }
        }

        Commands::Unlocks { action } => match action {
            UnlockAction::List => {
                let unlocks = Unlocks::load(
                    &load_metadata(&layout),
                    settings.unlocks.start_year,
                    &layout.manual_unlocks,
                );
                println!(
                    "Manual unlocks ({}) in {}:",
                    unlocks.manual().len(),
                    unlocks.manual().path().display()
                );
                for tag in unlocks.manual().iter() {
                    println!("  {tag}");
                }
                println!(
                    "Unlocked at start ({}): {}",
                    settings.unlocks.start_year,
                    unlocks.start().len()
                );
                println!("Effective: {}", unlocks.effective().len());
            }
            UnlockAction::Add { tags } => {
                let mut manual = ManualUnlocks::load(&layout.manual_unlocks);
                let added = tags.into_iter().filter(|t| manual.add(t.as_str())).count();
                manual.save()?;
                println!("Added {added}; {} manual unlocks.", manual.len());
            }
            UnlockAction::Remove { tags } => {
                let mut manual = ManualUnlocks::load(&layout.manual_unlocks);
                let removed = tags.iter().filter(|t| manual.remove(t)).count();
                manual.save()?;
                println!("Removed {removed}; {} manual unlocks.", manual.len());
            }
        },

        Commands::Settings { action } => match action {
            SettingsAction::Show => {
                println!("# {}", settings_path.display());
                println!("# data: {}", layout.configs_dir.display());
                let out = toml::to_string_pretty(&settings).into_diagnostic()?;
                print!("{out}");
            }
            SettingsAction::Init { force } => {
                if settings_path.exists() && !force {
                    miette::bail!(
                        help = "pass --force to overwrite it",
                        "settings file already exists: {}",
                        settings_path.display()
                    );
                }
                if cli.config.is_none() {
                    AppPaths::resolve()?.ensure_dirs()?;
                }
                let fresh = Settings {
                    project_root: cli.project_root.clone(),
                    ..Default::default()
                };
                fresh.save(&settings_path)?;
                println!("Wrote {}", settings_path.display());
            }
        },
    }

    Ok(())
}

/// Match a category by its label or display name, ignoring case and spaces.
fn find_category(index: &CompatibilityIndex, query: &str) -> Option<Category> {
    let squash = |s: &str| -> String {
        s.chars()
            .filter(|c| !c.is_whitespace())
            .flat_map(char::to_lowercase)
            .collect()
    };
    let wanted = squash(query);
    index
        .categories()
        .into_iter()
        .find(|cat| squash(cat.as_str()) == wanted)
        .cloned()
}

fn digits(precision: i32) -> usize {
    usize::try_from(precision).unwrap_or(0)
}

fn fmt_opt(value: Option<f64>) -> String {
    value.map(|v| format!("{v:.3}")).unwrap_or_else(|| "-".into())
}
