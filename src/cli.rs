use crate::catalog::{DEFAULT_COLOR_SCHEME, DEFAULT_TEMPLATE};
use crate::form::FormState;
use crate::history::HistoryStore;
use crate::model::{
    ControllerEvent, DocumentUpload, GenerationReport, InputMode, LifecycleState,
    FALLBACK_DOCUMENT_TITLE,
};
use crate::notify::NotificationManager;
use crate::orchestrator::{
    download_artifact, process_generation_success, run_controller, GenerationController,
    UiCommand,
};
use crate::progress::{ProgressSimulator, SimulatorConfig};
use crate::service::{GenerationService, HttpGenerationService, ServiceConfig, DEFAULT_BASE_URL};
use crate::storage::{default_data_dir, FileStore};
use crate::text_summary;
use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::mpsc;

/// Output line routing for stdout/stderr writer.
enum OutputLine {
    Stdout(String),
    Stderr(String),
}

/// Spawn a blocking writer for stdout/stderr to avoid blocking async tasks.
fn spawn_output_writer() -> (
    mpsc::UnboundedSender<OutputLine>,
    tokio::task::JoinHandle<()>,
) {
    let (tx, mut rx) = mpsc::unbounded_channel::<OutputLine>();
    let handle = tokio::task::spawn_blocking(move || {
        let stdout = std::io::stdout();
        let stderr = std::io::stderr();
        let mut out = std::io::LineWriter::new(stdout.lock());
        let mut err = std::io::LineWriter::new(stderr.lock());

        while let Some(line) = rx.blocking_recv() {
            match line {
                OutputLine::Stdout(msg) => {
                    let _ = writeln!(out, "{}", msg);
                }
                OutputLine::Stderr(msg) => {
                    let _ = writeln!(err, "{}", msg);
                }
            }
        }

        let _ = out.flush();
        let _ = err.flush();
    });
    (tx, handle)
}

#[derive(Debug, Parser, Clone)]
#[command(
    name = "eduslide",
    version,
    about = "Generate presentations from a topic or a PDF with the EduSlide service"
)]
pub struct Cli {
    /// Base URL of the generation service API
    #[arg(long, global = true, default_value = DEFAULT_BASE_URL)]
    pub base_url: String,

    /// Timeout for generation and download requests
    #[arg(long, global = true, default_value = "5m")]
    pub timeout: humantime::Duration,

    /// Directory holding presentation history (defaults to the user data directory)
    #[arg(long, global = true)]
    pub data_dir: Option<PathBuf>,

    /// Increase log verbosity (-v, -vv, -vvv)
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    pub verbose: u8,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand, Clone)]
pub enum Command {
    /// Generate a presentation and wait for it to be ready
    Generate(GenerateArgs),
    /// Show or edit the recent presentations list
    History {
        #[command(subcommand)]
        action: Option<HistoryAction>,
    },
    /// Download a generated presentation by filename
    Download {
        filename: String,
        /// Directory to save into
        #[arg(long, default_value = ".")]
        output_dir: PathBuf,
    },
    /// List available templates and color schemes
    Templates,
}

#[derive(Debug, Subcommand, Clone)]
pub enum HistoryAction {
    /// List recent presentations, newest first
    List,
    /// Remove one entry by id
    Delete { id: String },
    /// Remove every entry
    Clear,
}

#[derive(Debug, Args, Clone)]
pub struct GenerateArgs {
    /// Topic to build the presentation around
    #[arg(long, conflicts_with = "document")]
    pub topic: Option<String>,

    /// Number of slides for a topic (clamped to 5-10)
    #[arg(long, default_value_t = 10)]
    pub slides: u32,

    /// PDF document to build the presentation from
    #[arg(long)]
    pub document: Option<PathBuf>,

    /// Slides per detected chapter for a document (clamped to 2-10)
    #[arg(long, default_value_t = 10)]
    pub slides_per_chapter: u32,

    /// Template id (see `eduslide templates`)
    #[arg(long, default_value = DEFAULT_TEMPLATE)]
    pub template: String,

    /// Color scheme id (see `eduslide templates`)
    #[arg(long, default_value = DEFAULT_COLOR_SCHEME)]
    pub color_scheme: String,

    /// Extra instructions passed to the generator
    #[arg(long)]
    pub instructions: Option<String>,

    /// Also produce a PDF copy
    #[arg(long)]
    pub pdf: bool,

    /// Ask the generator to include images
    #[arg(long)]
    pub images: bool,

    /// Download the finished artifacts into this directory
    #[arg(long)]
    pub download: Option<PathBuf>,

    /// Print a JSON report instead of text
    #[arg(long)]
    pub json: bool,

    /// Use --auto-save true or --auto-save false to override
    #[arg(long, default_value_t = true, action = clap::ArgAction::Set)]
    pub auto_save: bool,

    /// Show the "presentation ready" notification
    #[arg(long, default_value_t = true, action = clap::ArgAction::Set)]
    pub notifications: bool,

    /// Interval between simulated progress steps
    #[arg(long, default_value = "500ms", hide = true)]
    pub progress_tick: humantime::Duration,

    /// Interval between status message changes
    #[arg(long, default_value = "2s", hide = true)]
    pub message_interval: humantime::Duration,
}

pub async fn run(args: Cli) -> Result<()> {
    match args.command.clone() {
        Command::Generate(gen) => run_generate(&args, gen).await,
        Command::History { action } => run_history(&args, action.unwrap_or(HistoryAction::List)),
        Command::Download {
            filename,
            output_dir,
        } => run_download(&args, &filename, &output_dir).await,
        Command::Templates => {
            for line in text_summary::build_catalog_summary().lines {
                println!("{line}");
            }
            Ok(())
        }
    }
}

/// Build a `ServiceConfig` from CLI arguments.
pub fn build_service_config(args: &Cli) -> ServiceConfig {
    ServiceConfig {
        base_url: args.base_url.clone(),
        timeout: Duration::from(args.timeout),
        user_agent: format!("eduslide/{}", env!("CARGO_PKG_VERSION")),
    }
}

pub fn build_simulator_config(gen: &GenerateArgs) -> SimulatorConfig {
    SimulatorConfig {
        tick_interval: Duration::from(gen.progress_tick),
        message_interval: Duration::from(gen.message_interval),
        ..Default::default()
    }
}

fn data_dir(args: &Cli) -> PathBuf {
    args.data_dir.clone().unwrap_or_else(default_data_dir)
}

/// Out-of-range counts are clamped by the form, so only narrow here.
fn saturate_u8(value: u32) -> u8 {
    u8::try_from(value).unwrap_or(u8::MAX)
}

/// Fill a form from generate arguments, reading the document if one was given.
pub async fn build_form(gen: &GenerateArgs) -> Result<FormState> {
    let mut form = FormState::default();
    form.set_template(gen.template.clone());
    form.set_color_scheme(gen.color_scheme.clone());
    form.set_slide_count(saturate_u8(gen.slides));
    form.set_slides_per_chapter(saturate_u8(gen.slides_per_chapter));
    form.set_generate_pdf(gen.pdf);
    form.set_use_images(gen.images);
    if let Some(text) = gen.instructions.as_deref() {
        form.set_custom_instructions(text);
    }

    if let Some(path) = gen.document.as_deref() {
        form.set_input_mode(InputMode::Document);
        let bytes = tokio::fs::read(path)
            .await
            .with_context(|| format!("read document {}", path.display()))?;
        let filename = path
            .file_name()
            .and_then(|n| n.to_str())
            .unwrap_or(FALLBACK_DOCUMENT_TITLE)
            .to_string();
        form.attach_document(DocumentUpload::new(filename, bytes));
    } else {
        form.set_input_mode(InputMode::Topic);
        form.set_topic(gen.topic.clone().unwrap_or_default());
    }
    Ok(form)
}

fn form_title(form: &FormState) -> String {
    match form.input_mode() {
        InputMode::Topic => form.topic().to_string(),
        InputMode::Document => form
            .document()
            .map(|d| d.filename.clone())
            .unwrap_or_else(|| FALLBACK_DOCUMENT_TITLE.to_string()),
    }
}

fn http_service(args: &Cli) -> Result<Arc<dyn GenerationService>> {
    let service = HttpGenerationService::new(&build_service_config(args))
        .context("create HTTP client")?;
    Ok(Arc::new(service))
}

async fn run_generate(args: &Cli, gen: GenerateArgs) -> Result<()> {
    let form = build_form(&gen).await?;
    let title = form_title(&form);
    let service = http_service(args)?;

    let history = HistoryStore::open(FileStore::new(data_dir(args)));
    let controller =
        GenerationController::new(history, ProgressSimulator::new(build_simulator_config(&gen)))
            .with_history_recording(gen.auto_save);
    let notifications = NotificationManager::new(gen.notifications && !gen.json);

    let (out_tx, out_handle) = spawn_output_writer();
    let (event_tx, mut event_rx) = mpsc::unbounded_channel::<ControllerEvent>();
    let (cmd_tx, cmd_rx) = mpsc::unbounded_channel::<UiCommand>();

    let started = Instant::now();
    let ctl_handle = tokio::spawn(run_controller(
        controller,
        service.clone(),
        notifications,
        event_tx,
        cmd_rx,
    ));

    let _ = cmd_tx.send(UiCommand::Submit(Box::new(form)));
    // Quit waits for the submission to resolve.
    let _ = cmd_tx.send(UiCommand::Quit);

    let mut last_line = String::new();
    let mut final_state = None;
    while let Some(ev) = event_rx.recv().await {
        match ev {
            ControllerEvent::Progress(snap) => {
                if gen.json {
                    continue;
                }
                let line = text_summary::progress_line(&snap);
                if line != last_line {
                    let _ = out_tx.send(OutputLine::Stderr(line.clone()));
                    last_line = line;
                }
            }
            ControllerEvent::State(state) => {
                if state.is_terminal() {
                    final_state = Some(state);
                }
            }
            ControllerEvent::Notification(Some(n)) => {
                let _ = out_tx.send(OutputLine::Stderr(format!("{} {}", n.title, n.body)));
            }
            ControllerEvent::Info(msg) => {
                let _ = out_tx.send(OutputLine::Stderr(msg));
            }
            ControllerEvent::Notification(None) | ControllerEvent::History(_) => {}
        }
    }
    ctl_handle.await.context("controller task failed")??;
    let elapsed = started.elapsed();

    let mut report = GenerationReport {
        state: final_state
            .as_ref()
            .map(LifecycleState::label)
            .unwrap_or("failed"),
        elapsed,
        title: title.clone(),
        template: gen.template.clone(),
        color_scheme: gen.color_scheme.clone(),
        result: None,
        error: None,
        downloaded: Vec::new(),
    };

    let outcome = match final_state {
        Some(LifecycleState::Success(result)) => {
            let processed =
                process_generation_success(service.as_ref(), &result, gen.download.as_deref())
                    .await;
            if !gen.json {
                for line in text_summary::build_text_summary(&title, &result).lines {
                    let _ = out_tx.send(OutputLine::Stdout(line));
                }
                for msg in &processed.messages {
                    let _ = out_tx.send(OutputLine::Stderr(msg.clone()));
                }
            }
            report.result = Some(result);
            report.downloaded = processed.downloaded;
            Ok(())
        }
        Some(LifecycleState::Failed(err)) => {
            let message = err.message();
            report.error = Some(message.clone());
            Err(anyhow::anyhow!(message))
        }
        _ => Err(anyhow::anyhow!("generation did not complete")),
    };

    if gen.json {
        let out = serde_json::to_string_pretty(&report)?;
        let _ = out_tx.send(OutputLine::Stdout(out));
    }

    drop(out_tx);
    let _ = out_handle.await;
    outcome
}

fn run_history(args: &Cli, action: HistoryAction) -> Result<()> {
    let mut history = HistoryStore::open(FileStore::new(data_dir(args)));
    match action {
        HistoryAction::List => {
            for line in text_summary::build_history_summary(history.entries()).lines {
                println!("{line}");
            }
        }
        HistoryAction::Delete { id } => {
            if history.get(&id).is_none() {
                eprintln!("No history entry with id {id}");
            }
            history.delete(&id);
        }
        HistoryAction::Clear => {
            history.clear();
            eprintln!("History cleared");
        }
    }
    Ok(())
}

async fn run_download(args: &Cli, filename: &str, output_dir: &Path) -> Result<()> {
    let service = http_service(args)?;
    let path = download_artifact(service.as_ref(), filename, output_dir).await?;
    println!("Saved: {}", path.display());
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(argv: &[&str]) -> Cli {
        Cli::try_parse_from(argv).unwrap()
    }

    #[test]
    fn generate_defaults_match_form_defaults() {
        let cli = parse(&["eduslide", "generate", "--topic", "Bees"]);
        let Command::Generate(gen) = cli.command else {
            panic!("expected generate");
        };
        assert_eq!(gen.slides, 10);
        assert_eq!(gen.template, "executive");
        assert_eq!(gen.color_scheme, "ocean");
        assert!(gen.auto_save);
        assert_eq!(Duration::from(gen.progress_tick), Duration::from_millis(500));
        assert_eq!(cli.base_url, DEFAULT_BASE_URL);
    }

    #[test]
    fn topic_and_document_conflict() {
        assert!(Cli::try_parse_from([
            "eduslide",
            "generate",
            "--topic",
            "Bees",
            "--document",
            "bees.pdf"
        ])
        .is_err());
    }

    #[tokio::test]
    async fn build_form_clamps_and_reads_document() {
        let dir = tempfile::tempdir().unwrap();
        let pdf = dir.path().join("notes.pdf");
        std::fs::write(&pdf, b"%PDF-1.4").unwrap();

        let cli = parse(&[
            "eduslide",
            "generate",
            "--document",
            pdf.to_str().unwrap(),
            "--slides-per-chapter",
            "1",
        ]);
        let Command::Generate(gen) = cli.command else {
            panic!("expected generate");
        };
        let form = build_form(&gen).await.unwrap();
        assert_eq!(form.input_mode(), InputMode::Document);
        assert_eq!(form.slides_per_chapter(), 2);
        assert_eq!(form.document().unwrap().filename, "notes.pdf");
        assert_eq!(form_title(&form), "notes.pdf");
    }

    #[tokio::test]
    async fn oversized_slide_counts_are_clamped_not_rejected() {
        let cli = parse(&[
            "eduslide",
            "generate",
            "--topic",
            "Bees",
            "--slides",
            "300",
            "--slides-per-chapter",
            "70000",
        ]);
        let Command::Generate(gen) = cli.command else {
            panic!("expected generate");
        };
        let form = build_form(&gen).await.unwrap();
        assert_eq!(form.slide_count(), 10);
        assert_eq!(form.slides_per_chapter(), 10);
    }

    #[tokio::test]
    async fn missing_topic_still_builds_a_form() {
        let cli = parse(&["eduslide", "generate", "--slides", "50"]);
        let Command::Generate(gen) = cli.command else {
            panic!("expected generate");
        };
        let form = build_form(&gen).await.unwrap();
        assert_eq!(form.slide_count(), 10);
        assert!(form.validate().is_err());
    }
}
