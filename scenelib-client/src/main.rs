//! scenelib - terminal front end for the scene library
//!
//! Drives the library store, search controller and remote client from the
//! command line. Notices go to the terminal; deletes ask for confirmation
//! unless `--yes` is given.

use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::{Args as ClapArgs, Parser, Subcommand};
use scenelib_client::client::RenderQuality;
use scenelib_client::dashboard::DashboardSummary;
use scenelib_client::notify::{
    Confirmer, FixedConfirmer, Notifier, TerminalConfirmer, TerminalNotifier,
    TracingNotifier,
};
use scenelib_client::store::{DeleteOutcome, LibrarySnapshot};
use scenelib_client::view::ViewState;
use scenelib_client::{
    LibraryResult, LibraryStore, Mutation, RemoteClient, SceneBackend, SearchController,
};
use scenelib_common::config::{load_config, ClientSettings};
use scenelib_common::normalizer::FieldInput;
use scenelib_common::{SceneDraft, SceneRecord};
use tracing::{debug, info, warn};

/// Command-line arguments for scenelib
#[derive(Parser, Debug)]
#[command(name = "scenelib")]
#[command(about = "Browse and edit the ML animation scene library")]
#[command(version)]
struct Args {
    /// Scene service base URL (overrides environment and config file)
    #[arg(long, global = true)]
    backend_url: Option<String>,

    /// Path to config.toml (default: platform config directory)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Send notices to the log instead of the terminal
    #[arg(long, global = true)]
    headless: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// List every scene
    List,
    /// Search scenes by concept or narration (blank lists everything)
    Search { query: String },
    /// Show dashboard statistics
    Stats,
    /// Show one scene in full
    Show { id: i64 },
    /// Create a new scene
    Create(SceneFields),
    /// Edit an existing scene (id cannot change)
    Update {
        id: i64,
        #[command(flatten)]
        fields: SceneFields,
    },
    /// Delete a scene
    Delete {
        id: i64,
        /// Skip the confirmation prompt
        #[arg(short, long)]
        yes: bool,
    },
    /// Check service health
    Health,
    /// Generate narration audio for a scene
    GenerateAudio { id: i64 },
    /// Start rendering animations
    Render {
        /// Scene to render (repeatable; default: all)
        #[arg(long = "scene")]
        scenes: Vec<i64>,
        /// low, medium or high
        #[arg(long, default_value = "medium")]
        quality: RenderQuality,
    },
    /// List rendered videos
    Videos,
}

/// Editor fields; multi-line values use `\n`
#[derive(ClapArgs, Debug)]
struct SceneFields {
    /// Scene id (fixed when updating)
    #[arg(long = "id")]
    scene_id: Option<i64>,
    #[arg(long)]
    concept: Option<String>,
    #[arg(long)]
    explanation: Option<String>,
    #[arg(long)]
    equations: Option<String>,
    /// none, linear_regression, loss_curve, gradient_descent, neural_network
    #[arg(long)]
    visual: Option<String>,
    #[arg(long)]
    narration: Option<String>,
}

impl SceneFields {
    /// Overlay the given flags on a draft
    fn apply(self, mut draft: SceneDraft) -> SceneDraft {
        if let Some(id) = self.scene_id {
            draft.scene_id = id;
        }
        if let Some(concept) = self.concept {
            draft.concept = concept;
        }
        if let Some(text) = self.explanation {
            draft.explanation = FieldInput::Text(unescape_newlines(&text));
        }
        if let Some(text) = self.equations {
            draft.equations = FieldInput::Text(unescape_newlines(&text));
        }
        if let Some(visual) = self.visual {
            draft.visual = visual;
        }
        if let Some(narration) = self.narration {
            draft.narration = narration;
        }
        draft
    }
}

fn unescape_newlines(text: &str) -> String {
    text.replace("\\n", "\n")
}

#[tokio::main]
async fn main() -> Result<ExitCode> {
    let args = Args::parse();

    // Config file sets the default log level; RUST_LOG still wins
    let loaded = load_config(args.config.as_deref());
    let settings = ClientSettings::from_toml(args.backend_url.as_deref(), loaded.config);

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(&settings.log_level)),
        )
        .with_writer(std::io::stderr)
        .init();

    if let Some(problem) = &loaded.problem {
        warn!("{}; using defaults", problem);
    }
    if let Some(path) = &loaded.source {
        debug!("Loaded config from {}", path.display());
    }
    info!(
        backend = %settings.backend_url,
        log_level = %settings.log_level,
        "scenelib v{}",
        env!("CARGO_PKG_VERSION")
    );

    let client = Arc::new(
        RemoteClient::from_settings(&settings).context("Failed to build HTTP client")?,
    );
    let backend: Arc<dyn SceneBackend> = client.clone();
    let notifier: Arc<dyn Notifier> = if args.headless {
        Arc::new(TracingNotifier)
    } else {
        Arc::new(TerminalNotifier)
    };
    let store = Arc::new(LibraryStore::new(backend, notifier));

    let outcome = run(args.command, &client, &store).await?;
    Ok(if outcome { ExitCode::SUCCESS } else { ExitCode::FAILURE })
}

/// Execute one command; `Ok(false)` means a failure was already shown
async fn run(command: Command, client: &RemoteClient, store: &Arc<LibraryStore>) -> Result<bool> {
    match command {
        Command::List => {
            let result = store.refresh().await;
            let snapshot = store.snapshot().await;
            print_scenes(&snapshot);
            Ok(result.is_ok())
        }
        Command::Search { query } => {
            let controller = SearchController::new(Arc::clone(store));
            let result = controller.search(&query).await;
            let snapshot = store.snapshot().await;
            print_scenes(&snapshot);
            Ok(result.is_ok())
        }
        Command::Stats => {
            let result = store.refresh().await;
            let snapshot = store.snapshot().await;
            print_dashboard(&DashboardSummary::from_snapshot(&snapshot));
            Ok(result.is_ok())
        }
        Command::Show { id } => report(client.get(id).await.map(|scene| print_scene_full(&scene))),
        Command::Create(fields) => {
            let draft = fields.apply(open_editor(None));
            Ok(store.mutate(Mutation::Create(draft)).await.is_ok())
        }
        Command::Update { id, fields } => {
            let existing = match client.get(id).await {
                Ok(scene) => scene,
                Err(e) => return report::<()>(Err(e)),
            };
            let draft = fields.apply(open_editor(Some(existing)));
            let mutation = Mutation::Update {
                original_id: id,
                draft,
            };
            Ok(store.mutate(mutation).await.is_ok())
        }
        Command::Delete { id, yes } => {
            let confirmer: Box<dyn Confirmer> = if yes {
                Box::new(FixedConfirmer(true))
            } else {
                Box::new(TerminalConfirmer)
            };
            let result: LibraryResult<DeleteOutcome> =
                store.request_delete(id, confirmer.as_ref()).await;
            if let Ok(DeleteOutcome::Cancelled) = result {
                println!("Cancelled");
            }
            Ok(result.is_ok())
        }
        Command::Health => report(client.health().await.map(|h| {
            println!("{} ({})", h.status, h.service);
        })),
        Command::GenerateAudio { id } => report(client.generate_audio(id).await.map(|job| {
            println!("{} (scene {})", job.message, job.scene_id);
        })),
        Command::Render { scenes, quality } => {
            let ids = if scenes.is_empty() {
                None
            } else {
                Some(scenes.as_slice())
            };
            report(client.render(ids, quality).await.map(|job| {
                println!("{}: {} [{}]", job.message, job.render_id, job.status);
            }))
        }
        Command::Videos => report(client.list_videos().await.map(|videos| {
            if videos.is_empty() {
                println!("No videos rendered yet");
            }
            for video in videos {
                println!("{:>12}  {}  ({})", video.size, video.filename, video.path);
            }
        })),
    }
}

/// Editor buffer for a new scene (`None`) or an existing one
fn open_editor(scene: Option<SceneRecord>) -> SceneDraft {
    let mut view = ViewState::Library;
    view.open_editor(scene);
    view.editor_draft()
        .map(|(draft, _)| draft)
        .unwrap_or_default()
}

/// Print a direct client failure; the store reports its own
fn report<T>(result: Result<T, scenelib_client::ClientError>) -> Result<bool> {
    match result {
        Ok(_) => Ok(true),
        Err(e) => {
            debug!(error = ?e, "Request failed");
            eprintln!("✗ {}", e);
            Ok(false)
        }
    }
}

fn print_scenes(snapshot: &LibrarySnapshot) {
    if !snapshot.last_query.is_empty() {
        println!("Results for \"{}\":", snapshot.last_query);
    }
    if snapshot.scenes.is_empty() {
        println!("No scenes found");
        return;
    }
    for scene in &snapshot.scenes {
        println!("[{}] {} ({})", scene.scene_id, scene.concept, scene.visual);
        if let Some(preview) = scene.preview().filter(|p| !p.is_empty()) {
            println!("     {}", preview);
        }
        if let Some(eq) = scene.headline_equation().filter(|e| !e.is_empty()) {
            println!("     {}", eq);
        }
    }
}

fn print_scene_full(scene: &SceneRecord) {
    println!("Scene {}: {}", scene.scene_id, scene.concept);
    println!("Visual: {}", scene.visual);
    println!("Explanation:");
    for line in &scene.explanation {
        println!("  - {}", line);
    }
    println!("Equations:");
    for line in &scene.equations {
        println!("  - {}", line);
    }
    if !scene.narration.is_empty() {
        println!("Narration: {}", scene.narration);
    }
}

fn print_dashboard(summary: &DashboardSummary) {
    println!("Total scenes: {}", summary.total_scenes);
    println!("Animations:   {}", summary.animation_types);
    println!("Audio files:  {}", summary.audio_files);

    if !summary.distribution.is_empty() {
        println!();
        println!("Visual types:");
        for share in &summary.distribution {
            let bar = "█".repeat((share.fraction * 20.0).round() as usize);
            println!("  {:<18} {:<20} {}", share.label, bar, share.count);
        }
    }

    if !summary.recent.is_empty() {
        println!();
        println!("Recent scenes:");
        for scene in &summary.recent {
            println!("  [{}] {}", scene.scene_id, scene.concept);
        }
    }
}
