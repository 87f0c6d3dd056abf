//! storyshelf CLI - conversation to picture book

use std::path::{Path, PathBuf};
use std::time::Duration;

use clap::{Args, Parser, Subcommand};
use colored::Colorize;
use indicatif::{ProgressBar, ProgressStyle};

use storyshelf::{
    ArtifactStore, GitPublisher, OpenAiClient, OpenAiConfig, PipelineOptions, PlanPrompt,
    ProjectLayout, Stage, StageMarker, StoryShelf,
};

type CliResult<T = ()> = Result<T, Box<dyn std::error::Error>>;

#[derive(Parser)]
#[command(name = "storyshelf")]
#[command(version)]
#[command(about = "Turn a recorded conversation into an illustrated picture book", long_about = None)]
struct Cli {
    /// Project root directory
    #[arg(long, global = true, env = "STORYSHELF_ROOT", default_value = ".")]
    root: PathBuf,

    /// OpenAI API key
    #[arg(long, global = true, env = "OPENAI_API_KEY", hide_env_values = true)]
    api_key: Option<String>,

    /// OpenAI API base URL
    #[arg(long, global = true, env = "OPENAI_BASE_URL")]
    base_url: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Transcribe the recorded conversation
    Transcribe {
        /// Audio file, relative to the project root
        #[arg(value_name = "FILE")]
        audio: Option<PathBuf>,
    },

    /// Generate the book plan from the transcript
    Plan {
        #[command(flatten)]
        plan: PlanArgs,
    },

    /// Generate missing page images
    Images {
        /// Image size (e.g. 1024x1024)
        #[arg(long)]
        size: Option<String>,
    },

    /// Compose the book PDF
    Pdf,

    /// Publish the current book to the shelf
    Publish,

    /// Rebuild the shelf page
    Shelf,

    /// Run the whole pipeline: plan, images, PDF, publish, shelf, git
    Run {
        #[command(flatten)]
        plan: PlanArgs,

        /// Image size (e.g. 1024x1024)
        #[arg(long)]
        size: Option<String>,

        /// Keep an existing valid plan instead of generating a new one
        #[arg(long)]
        reuse_plan: bool,

        /// Commit but do not push
        #[arg(long)]
        no_push: bool,

        /// Skip git entirely
        #[arg(long)]
        no_git: bool,

        /// Commit message
        #[arg(short, long)]
        message: Option<String>,
    },

    /// Show the current plan and page image status
    Info,

    /// Show version information
    Version,
}

#[derive(Args)]
struct PlanArgs {
    /// Number of pages
    #[arg(long, default_value_t = 10)]
    pages: u32,

    /// Target reader age
    #[arg(long, default_value = "12-15")]
    age: String,

    /// Book language
    #[arg(long, default_value = "ja")]
    language: String,

    /// Illustration style (default: soft watercolor)
    #[arg(long)]
    style: Option<String>,
}

impl From<PlanArgs> for PlanPrompt {
    fn from(args: PlanArgs) -> Self {
        let mut prompt = PlanPrompt::new()
            .with_page_count(args.pages)
            .with_target_age(args.age)
            .with_language(args.language);
        if let Some(style) = args.style {
            prompt = prompt.with_style_bible(style);
        }
        prompt
    }
}

fn main() {
    env_logger::init();

    let cli = Cli::parse();
    log::debug!("Project root: {}", cli.root.display());
    let shelf = StoryShelf::open(&cli.root);
    let api_key = cli.api_key.as_deref();
    let base_url = cli.base_url.as_deref();

    let result = match cli.command {
        Commands::Transcribe { audio } => cmd_transcribe(&cli.root, api_key, base_url, audio),
        Commands::Plan { plan } => cmd_plan(&shelf, api_key, base_url, plan),
        Commands::Images { size } => cmd_images(&shelf, api_key, base_url, size.as_deref()),
        Commands::Pdf => cmd_pdf(&shelf),
        Commands::Publish => cmd_publish(&shelf),
        Commands::Shelf => cmd_shelf(&shelf),
        Commands::Run {
            plan,
            size,
            reuse_plan,
            no_push,
            no_git,
            message,
        } => {
            let options = run_options(plan, size, reuse_plan, message);
            cmd_run(&shelf, api_key, base_url, options, !no_git, !no_push)
        }
        Commands::Info => cmd_info(&shelf),
        Commands::Version => {
            cmd_version();
            Ok(())
        }
    };

    if let Err(e) = result {
        eprintln!("{}: {}", "Error".red().bold(), e);
        std::process::exit(1);
    }
}

fn client(api_key: Option<&str>, base_url: Option<&str>) -> CliResult<OpenAiClient> {
    let mut config = OpenAiConfig::new(api_key.unwrap_or_default());
    if let Some(url) = base_url {
        config = config.with_base_url(url);
    }
    Ok(OpenAiClient::new(config)?)
}

fn spinner(message: &str) -> CliResult<ProgressBar> {
    let pb = ProgressBar::new_spinner();
    pb.set_style(ProgressStyle::default_spinner().template("{spinner:.green} {msg}")?);
    pb.enable_steady_tick(Duration::from_millis(100));
    pb.set_message(message.to_string());
    Ok(pb)
}

fn run_options(
    plan: PlanArgs,
    size: Option<String>,
    reuse_plan: bool,
    message: Option<String>,
) -> PipelineOptions {
    let mut options = PipelineOptions::new()
        .with_prompt(plan.into())
        .with_reuse_plan(reuse_plan);
    if let Some(size) = size {
        options = options.with_image_size(size);
    }
    if let Some(message) = message {
        options = options.with_commit_message(message);
    }
    options
}

fn cmd_transcribe(
    root: &Path,
    api_key: Option<&str>,
    base_url: Option<&str>,
    audio: Option<PathBuf>,
) -> CliResult {
    let mut layout = ProjectLayout::default();
    if let Some(audio) = audio {
        layout = layout.with_audio(audio);
    }
    let shelf = StoryShelf::open(root).with_layout(layout);
    let client = client(api_key, base_url)?;

    let pb = spinner("Transcribing audio...")?;
    let text = shelf.transcribe(&client);
    pb.finish_and_clear();
    let text = text?;

    println!(
        "{} {} ({} chars)",
        "Saved to".green(),
        shelf.layout().transcript.display(),
        text.chars().count()
    );
    Ok(())
}

fn cmd_plan(
    shelf: &StoryShelf,
    api_key: Option<&str>,
    base_url: Option<&str>,
    args: PlanArgs,
) -> CliResult {
    let client = client(api_key, base_url)?;

    let pb = spinner("Generating book plan...")?;
    let plan = shelf.plan(&client, args.into());
    pb.finish_and_clear();
    let plan = plan?;

    println!("{} {}", "Title:".bold(), plan.display_title());
    println!("{} {}", "Pages:".bold(), plan.page_count());
    println!(
        "{} {}",
        "Saved to".green(),
        shelf.layout().plan.display()
    );
    Ok(())
}

fn cmd_images(
    shelf: &StoryShelf,
    api_key: Option<&str>,
    base_url: Option<&str>,
    size: Option<&str>,
) -> CliResult {
    let client = client(api_key, base_url)?;

    let pb = spinner("Generating page images...")?;
    let report = shelf.images(&client, size);
    pb.finish_and_clear();
    let report = report?;

    for page in &report.skipped {
        println!("  {} page {:02} (already exists)", "skip".dimmed(), page);
    }
    for page in &report.generated {
        println!("  {} page {:02}", "saved".green(), page);
    }
    println!(
        "\n{} {} generated, {} skipped ({} pages)",
        "Done!".green().bold(),
        report.generated.len(),
        report.skipped.len(),
        report.total()
    );
    Ok(())
}

fn cmd_pdf(shelf: &StoryShelf) -> CliResult {
    let pb = spinner("Composing PDF...")?;
    let pages = shelf.make_pdf();
    pb.finish_and_clear();
    let pages = pages?;

    println!(
        "{} {} ({} pages)",
        "Saved to".green(),
        shelf.layout().document.display(),
        pages
    );
    Ok(())
}

fn cmd_publish(shelf: &StoryShelf) -> CliResult {
    let book = shelf.publish()?;

    println!("{}", "Published book:".green().bold());
    println!("  {} id: {}", "├─".dimmed(), book.id);
    println!("  {} path: {}", "├─".dimmed(), book.dir.display());
    println!("  {} pages: {}", "└─".dimmed(), book.pages);
    Ok(())
}

fn cmd_shelf(shelf: &StoryShelf) -> CliResult {
    let entries = shelf.build_shelf()?;

    println!(
        "{} {} ({} books)",
        "Shelf generated:".green().bold(),
        shelf.layout().index.display(),
        entries.len()
    );
    for entry in &entries {
        println!("  {} {}  {}", "•".dimmed(), entry.label(), entry.title);
    }
    Ok(())
}

fn cmd_run(
    shelf: &StoryShelf,
    api_key: Option<&str>,
    base_url: Option<&str>,
    options: PipelineOptions,
    git: bool,
    push: bool,
) -> CliResult {
    let client = client(api_key, base_url)?;
    let git_publisher = GitPublisher::new(shelf.store().root()).with_push(push);

    let pb = spinner("Starting pipeline...")?;
    let mut pipeline = shelf
        .pipeline(&client, &client)
        .with_options(options)
        .on_stage(|stage: Stage| pb.set_message(format!("{}...", stage_label(stage))));
    if git {
        pipeline = pipeline.with_version_publisher(&git_publisher);
    }

    let report = pipeline.run();
    pb.finish_and_clear();
    let report = report?;

    println!("{}", "Pipeline complete!".green().bold());
    println!("  {} title: {}", "├─".dimmed(), report.plan.display_title());
    println!(
        "  {} images: {} generated, {} skipped",
        "├─".dimmed(),
        report.images.generated.len(),
        report.images.skipped.len()
    );
    println!("  {} pdf: {} pages", "├─".dimmed(), report.document_pages);
    println!("  {} book: {}", "├─".dimmed(), report.book.dir.display());
    println!("  {} shelf: {} books", "├─".dimmed(), report.shelf_size);
    println!(
        "  {} git: {}",
        "└─".dimmed(),
        match (report.versioned, push) {
            (false, _) => "skipped",
            (true, true) => "committed and pushed",
            (true, false) => "committed",
        }
    );
    Ok(())
}

fn stage_label(stage: Stage) -> &'static str {
    match stage {
        Stage::Planning => "Generating book plan",
        Stage::Imaging => "Generating page images",
        Stage::Composing => "Composing PDF",
        Stage::Publishing => "Publishing book",
        Stage::CatalogBuilding => "Rebuilding shelf",
        Stage::VersionPublishing => "Committing to git",
    }
}

fn cmd_info(shelf: &StoryShelf) -> CliResult {
    let layout = shelf.layout();
    let plan = shelf.load_plan()?;

    println!("{}", "Book Plan".cyan().bold());
    println!("{}", "─".repeat(40).dimmed());
    println!("{}: {}", "File".bold(), layout.plan.display());
    println!("{}: {}", "Title".bold(), plan.display_title());
    if !plan.target_age.is_empty() {
        println!("{}: {}", "Target age".bold(), plan.target_age);
    }
    println!("{}: {}", "Pages".bold(), plan.page_count());
    println!("{}: {}", "Characters".bold(), plan.characters.len());
    for character in &plan.characters {
        println!("  {} {}", "•".dimmed(), character.name);
    }

    println!();
    println!("{}", "Page Images".cyan().bold());
    println!("{}", "─".repeat(40).dimmed());

    let markers = shelf.image_markers(&plan);
    let done = markers.iter().filter(|(_, m)| m.is_completed()).count();
    for (page, marker) in &markers {
        match marker {
            StageMarker::Completed(artifact) => {
                println!("  {:02} {} {}", page, "done".green(), artifact.path.display())
            }
            StageMarker::Pending => println!("  {:02} {}", page, "pending".yellow()),
        }
    }
    println!();
    println!("{}: {}/{}", "Completed".bold(), done, markers.len());
    println!(
        "{}: {}",
        "PDF".bold(),
        if shelf.store().exists(&layout.document) {
            "Yes"
        } else {
            "No"
        }
    );

    Ok(())
}

fn cmd_version() {
    println!("{} {}", "storyshelf".cyan().bold(), env!("CARGO_PKG_VERSION"));
    println!("Conversation to picture book pipeline");
    println!();
    println!("License: MIT");
}
