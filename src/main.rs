use std::path::{
    Path,
    PathBuf,
};

use clap::{
    Parser,
    Subcommand,
};
use pointlearn::{
    app::{
        load_config,
        AppContext,
        HomePage,
        ScenePage,
        WordFilter,
    },
    audio::AudioManifest,
    catalog::{
        compare_catalogs,
        ImageSource,
        SceneCatalog,
    },
    core::logging::init_logging,
    display::DisplayMode,
    layout::Size,
    persistence::get_app_data_dir,
    PointLearnError,
    WordStatus,
};
use tracing::{
    debug,
    error,
};

const MANIFEST_FILE: &str = "audio_manifest.json";

/// Scene-based English vocabulary trainer
#[derive(Parser, Debug)]
#[command(name = "pointlearn", version, long_about = None)]
struct Args {
    /// Directory holding config.json and saved progress
    #[arg(long, env = "POINTLEARN_DATA_DIR")]
    data_dir: Option<PathBuf>,

    /// Log at debug level
    #[arg(short, long)]
    verbose: bool,

    /// Write session metrics as JSON to this file after the command, `-` for stdout
    #[arg(long, value_name = "PATH")]
    metrics: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// List scenes with learning progress
    Scenes {
        #[arg(long, default_value = "all")]
        theme: String,
    },
    /// Show a scene's hotspots and labels
    Show {
        scene: String,
        /// all, unmarked, known or unknown
        #[arg(long, default_value = "all")]
        filter: String,
        /// Comma-separated label modes (english, phonetic, chinese) or "none"
        #[arg(long)]
        modes: Option<String>,
    },
    /// Mark a word as known, unknown or unmarked
    Mark { word: String, status: String },
    /// Play a word's audio through the fallback chain
    Play {
        word: String,
        /// Audio path or URL tried when no local asset plays
        #[arg(long)]
        reference: Option<String>,
    },
    /// Compute hotspot positions for an image and container size
    Layout {
        scene: String,
        /// Natural image size, e.g. 1200x1600
        #[arg(long)]
        natural: String,
        /// Container size, e.g. 600x1000
        #[arg(long)]
        container: String,
    },
    /// Clear progress for one scene or everything
    Reset {
        #[arg(long)]
        scene: Option<String>,
    },
    /// Overall learning statistics
    Stats,
    /// Build the audio manifest from the audio directory
    Manifest {
        #[arg(long)]
        output: Option<PathBuf>,
    },
    /// Report differences between the active catalog and another catalog file
    Compare { other: PathBuf },
}

#[tokio::main]
async fn main() {
    let args = Args::parse();

    if let Err(e) = init_logging(args.verbose) {
        eprintln!("Failed to initialize logging: {}", e);
    }

    if let Err(e) = run(args).await {
        error!("{}", e);
        std::process::exit(1);
    }
}

async fn run(args: Args) -> Result<(), PointLearnError> {
    let data_dir = args.data_dir.unwrap_or_else(get_app_data_dir);
    let config = load_config(&data_dir);
    debug!("Data directory: {}", data_dir.display());

    let mut context = AppContext::load(config, &data_dir)?;

    let result = run_command(&mut context, args.command, &data_dir).await;
    if let Err(e) = &result {
        context.metrics.record_error("command", e);
    }

    match args.metrics {
        Some(path) if path.as_os_str() == "-" => println!("{}", context.metrics.to_json()?),
        Some(path) => {
            context.metrics.export(&path)?;
            debug!("Metrics written to {}", path.display());
        }
        None => {}
    }
    result
}

async fn run_command(
    context: &mut AppContext,
    command: Command,
    data_dir: &Path,
) -> Result<(), PointLearnError> {
    match command {
        Command::Scenes { theme } => list_scenes(context, &theme),
        Command::Show { scene, filter, modes } => {
            show_scene(context, &scene, &filter, modes.as_deref())
        }
        Command::Mark { word, status } => mark_word(context, &word, &status),
        Command::Play { word, reference } => play_word(context, &word, reference).await,
        Command::Layout { scene, natural, container } => {
            layout_scene(context, &scene, &natural, &container)
        }
        Command::Reset { scene } => {
            match scene {
                Some(scene) => {
                    context.progress.reset_scene(&scene)?;
                    println!("Progress for {} cleared", scene);
                }
                None => {
                    context.progress.reset_all();
                    println!("All progress cleared");
                }
            }
            Ok(())
        }
        Command::Stats => {
            print_stats(context);
            Ok(())
        }
        Command::Manifest { output } => {
            let output = output
                .or_else(|| context.config.manifest_path.clone())
                .unwrap_or_else(|| data_dir.join(MANIFEST_FILE));
            build_manifest(context, output)
        }
        Command::Compare { other } => compare_with(context, &other),
    }
}

fn list_scenes(context: &AppContext, theme: &str) -> Result<(), PointLearnError> {
    let mut home = HomePage::new();
    if !home.switch_theme(context, theme) {
        return Err(PointLearnError::Custom(format!("Unknown theme: {}", theme)));
    }

    let themes: Vec<&str> = home.themes(context).iter().map(|theme| theme.id.as_str()).collect();
    println!("Themes: {}", themes.join(", "));

    for card in home.cards(context) {
        println!(
            "{:<16} {:<18} {:<10} {:>3}%  {:<12} [{}]",
            card.id,
            card.name,
            card.localized_name.as_deref().unwrap_or(""),
            card.progress.percentage,
            card.progress.text(),
            card.badge().class_name()
        );
    }
    Ok(())
}

fn show_scene(
    context: &mut AppContext,
    scene_id: &str,
    filter: &str,
    modes: Option<&str>,
) -> Result<(), PointLearnError> {
    let mut page = ScenePage::new(context.config.resize_debounce());
    page.load_scene(context, scene_id)?;
    page.switch_filter(filter.parse()?);
    if let Some(modes) = modes {
        page.set_modes(DisplayMode::parse_list(modes)?);
    }

    if let Some(scene) = page.scene() {
        println!("{} ({})", scene.name, scene.display_name());
    }
    match page.image() {
        Some(ImageSource::Local(path)) => println!("Image: {}", path.display()),
        Some(ImageSource::Placeholder(url)) => println!("Image: {} (placeholder)", url),
        None => {}
    }

    let counts = page.counts();
    let tabs: Vec<String> = WordFilter::ALL
        .iter()
        .map(|tab| {
            let marker = if *tab == page.filter() { "*" } else { "" };
            format!("{}{} {}", marker, tab, counts.get(*tab))
        })
        .collect();
    println!("{}", tabs.join(" | "));

    for hotspot in page.hotspots(context).into_iter().filter(|hotspot| hotspot.visible) {
        let labels: Vec<String> = hotspot
            .labels
            .labels
            .iter()
            .map(|label| format!("{}@{}px", label.text, label.offset_y))
            .collect();
        println!("  [{:<8}] {:<18} {}", hotspot.status.as_str(), hotspot.word, labels.join("  "));
    }

    page.leave(context);
    Ok(())
}

fn mark_word(context: &mut AppContext, word: &str, status: &str) -> Result<(), PointLearnError> {
    let status: WordStatus = status.parse()?;
    let catalog = context.catalog.clone();
    let (scene, entry) = catalog.find_entry(word).ok_or_else(|| {
        PointLearnError::Custom(format!("Word not found in any scene: {}", word))
    })?;

    context.progress.set_status(entry.key(), status);
    println!(
        "{} marked {} ({})",
        entry.word,
        status,
        context.progress.get_scene_progress(&scene.id).text()
    );
    Ok(())
}

async fn play_word(
    context: &AppContext,
    word: &str,
    reference: Option<String>,
) -> Result<(), PointLearnError> {
    let reference = reference.or_else(|| {
        context.catalog.find_entry(word).map(|(_, entry)| entry.audio_ref.clone())
    });

    match context.play_word(word, reference.as_deref()).await {
        Some(tier) => println!("Played '{}' via {}", word, tier),
        None => println!("Nothing audible for '{}'", word),
    }
    Ok(())
}

fn layout_scene(
    context: &mut AppContext,
    scene_id: &str,
    natural: &str,
    container: &str,
) -> Result<(), PointLearnError> {
    let natural = Size::parse(natural)?;
    let container = Size::parse(container)?;

    let mut page = ScenePage::new(context.config.resize_debounce());
    page.load_scene(context, scene_id)?;
    page.resize_now(container);
    page.on_image_loaded(natural);

    if let Some(aspect) = page.aspect_class() {
        println!("Aspect: {:?}", aspect);
    }
    for hotspot in page.hotspots(context) {
        if let Some(placement) = hotspot.placement {
            println!("  {:<18} left={:.1}px top={:.1}px", hotspot.word, placement.left, placement.top);
        }
    }

    page.leave(context);
    Ok(())
}

fn print_stats(context: &AppContext) {
    let stats = context.progress.learning_stats();
    println!(
        "Marked: {}  Known: {}  Unknown: {}  Unmarked: {}",
        stats.total_marked, stats.known, stats.unknown, stats.unmarked
    );

    for scene in context.catalog.get_all() {
        let progress = context.progress.get_scene_progress(&scene.id);
        println!("  {:<16} {:>3}%  {}", scene.id, progress.percentage, progress.text());
    }
}

fn build_manifest(context: &AppContext, output: PathBuf) -> Result<(), PointLearnError> {
    let report = AudioManifest::build(&context.catalog, &context.config.audio_dir);
    report.manifest.save(&output)?;

    println!("Mapped {} words to audio, saved to {}", report.manifest.len(), output.display());
    if !report.unmapped.is_empty() {
        println!("Without audio: {}", report.unmapped.join(", "));
    }
    Ok(())
}

fn compare_with(context: &AppContext, other: &Path) -> Result<(), PointLearnError> {
    let other = SceneCatalog::load(other)?;
    let divergences = compare_catalogs(&context.catalog, &other);

    if divergences.is_empty() {
        println!("Catalogs match");
    } else {
        for divergence in &divergences {
            println!("  {}", divergence);
        }
        println!("{} divergences", divergences.len());
    }
    Ok(())
}
