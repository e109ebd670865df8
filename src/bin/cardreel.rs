use std::path::{Path, PathBuf};

use anyhow::Context as _;
use clap::{Args, Parser, Subcommand};
use tracing_subscriber::{layer::SubscriberExt as _, util::SubscriberInitExt as _};

use cardreel::{
    AnimationTimeline, AutoConfirm, BatchOutcome, BatchRun, BatchScheduler, CardLayer,
    CardRecord, CardVideoPipeline, CatalogQuery, JsonCatalog, Narrator, Produce, PromptGate,
    ReelError, ShortsCropper, SourceProvider, StudioConfig, WorkItem, card_audio_items,
    card_work_items, render_at, shorts_work_items, summarize,
};

#[derive(Parser, Debug)]
#[command(name = "cardreel", version)]
struct Cli {
    #[command(flatten)]
    common: CommonArgs,

    #[command(subcommand)]
    cmd: Command,
}

#[derive(Args, Debug)]
struct CommonArgs {
    /// Studio config JSON (defaults apply to anything it omits).
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Base directory for relative paths in the config.
    #[arg(long, global = true)]
    root: Option<PathBuf>,

    /// Maximum concurrent workers (default: available parallelism minus one).
    #[arg(long, global = true)]
    jobs: Option<usize>,

    /// Skip the confirmation prompt.
    #[arg(long, short = 'y', global = true)]
    yes: bool,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Produce narrated card videos for catalog cards.
    Cards(CardsArgs),
    /// Crop every full video into a vertical short (requires `ffmpeg` on PATH).
    Shorts,
    /// Render one card layer frame as a PNG.
    Preview(PreviewArgs),
}

#[derive(Args, Debug)]
struct CardsArgs {
    /// Local card database dump (`{"data": [...]}`).
    #[arg(long)]
    catalog: PathBuf,

    /// Card database search URL to select cards with.
    #[arg(long, conflicts_with = "name")]
    url: Option<String>,

    /// Exact card name; repeatable.
    #[arg(long)]
    name: Vec<String>,

    /// Produce only the narration audio, not the videos.
    #[arg(long)]
    audio_only: bool,
}

#[derive(Args, Debug)]
struct PreviewArgs {
    /// Card image.
    #[arg(long)]
    image: PathBuf,

    /// Clip duration in seconds.
    #[arg(long)]
    duration: f64,

    /// Time to sample, in seconds.
    #[arg(long)]
    at: f64,

    /// Output PNG path.
    #[arg(long)]
    out: PathBuf,
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let cli = Cli::parse();
    let cfg = load_config(&cli.common)?;
    match cli.cmd {
        Command::Cards(args) => cmd_cards(&cfg, args, cli.common.yes),
        Command::Shorts => cmd_shorts(&cfg, cli.common.yes),
        Command::Preview(args) => cmd_preview(&cfg, args),
    }
}

fn load_config(common: &CommonArgs) -> anyhow::Result<StudioConfig> {
    let mut cfg = match &common.config {
        Some(path) => StudioConfig::from_path(path)?,
        None => StudioConfig::default(),
    };
    if let Some(root) = &common.root {
        cfg = cfg.with_root(root);
    }
    if let Some(jobs) = common.jobs {
        cfg.concurrency = Some(jobs);
    }
    cfg.validate()?;
    Ok(cfg)
}

fn cmd_cards(cfg: &StudioConfig, args: CardsArgs, yes: bool) -> anyhow::Result<()> {
    let catalog = JsonCatalog::from_path(&args.catalog)?;
    let cards = select_cards(&catalog, &args)?;
    if args.audio_only {
        let narrator = Narrator::from_config(cfg)?;
        return run_batch(card_audio_items(cards, cfg), cfg, yes, &narrator);
    }
    let pipeline = CardVideoPipeline::from_config(cfg)?;
    run_batch(card_work_items(cards, cfg), cfg, yes, &pipeline)
}

fn select_cards(catalog: &JsonCatalog, args: &CardsArgs) -> anyhow::Result<Vec<CardRecord>> {
    if !args.name.is_empty() {
        let mut cards = Vec::with_capacity(args.name.len());
        for name in &args.name {
            match catalog.find_by_name(name) {
                Ok(card) => cards.push(card),
                Err(ReelError::NotFound(msg)) => {
                    tracing::warn!(name = %name, "skipping unknown card");
                    eprintln!("not found: {msg}");
                }
                Err(e) => return Err(e.into()),
            }
        }
        return Ok(cards);
    }

    let query = match &args.url {
        Some(url) => CatalogQuery::from_db_url(url)?,
        None => CatalogQuery::all(),
    };
    tracing::debug!(api_url = %query.api_url(), "catalog query");
    Ok(catalog.fetch(&query)?)
}

fn cmd_shorts(cfg: &StudioConfig, yes: bool) -> anyhow::Result<()> {
    let items = shorts_work_items(cfg)?;
    let cropper = ShortsCropper::new(&cfg.shorts);
    run_batch(items, cfg, yes, &cropper)
}

fn run_batch<S, F>(
    items: Vec<WorkItem<S>>,
    cfg: &StudioConfig,
    yes: bool,
    produce: &F,
) -> anyhow::Result<()>
where
    S: Send,
    F: Produce<S>,
{
    let mut run = BatchRun::new(items);
    if let Some(jobs) = cfg.concurrency {
        run = run.with_concurrency_limit(jobs);
    }

    let scheduler = BatchScheduler::new();
    let outcome = if yes {
        scheduler.run(run, &mut AutoConfirm, produce)?
    } else {
        scheduler.run(run, &mut PromptGate::stdio(), produce)?
    };

    match outcome {
        BatchOutcome::Cancelled {
            pending,
            already_present,
        } => {
            eprintln!(
                "cancelled: 0 produced, {} not started, {already_present} already present",
                pending.len()
            );
        }
        BatchOutcome::Completed(results) => {
            let summary = summarize(results);
            eprintln!("{summary}");
            for result in summary.results.iter().filter(|r| !r.success()) {
                if let Some(cause) = result.cause() {
                    eprintln!("  failed: {}: {cause}", result.identity());
                }
            }
        }
    }
    Ok(())
}

fn cmd_preview(cfg: &StudioConfig, args: PreviewArgs) -> anyhow::Result<()> {
    let layer = CardLayer::open(&args.image, cfg.render.canvas)?;
    let timeline = AnimationTimeline::new(args.duration, cfg.animation.clone())?;
    let frame = render_at(&layer, &timeline, args.at);

    ensure_parent(&args.out)?;
    frame
        .save_with_format(&args.out, image::ImageFormat::Png)
        .with_context(|| format!("write png '{}'", args.out.display()))?;

    eprintln!("wrote {}", args.out.display());
    Ok(())
}

fn ensure_parent(path: &Path) -> anyhow::Result<()> {
    if let Some(parent) = path.parent()
        && !parent.as_os_str().is_empty()
    {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("create output dir '{}'", parent.display()))?;
    }
    Ok(())
}
