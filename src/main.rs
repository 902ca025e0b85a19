mod api;
mod app;
mod config;
mod controller;
mod dom;
mod error;
mod models;
mod render;
mod ui;

use std::io::Write;
use std::path::PathBuf;
use std::time::{Duration, Instant};

use api::{HttpVideoApi, VideoApi};
use app::{App, InputMode, View};
use clap::{Parser, Subcommand};
use config::Config;
use controller::{DELETE_CONFIRMATION, ViewController};
use crossterm::event::{self, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers};
use dom::{MemoryDocument, ids};
use error::AppError;
use render::{URL_DISPLAY_MAX, embed_source, format_date, truncate_str, truncate_url};
use tracing::info;
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

/// Preview, save and browse videos in a video library
#[derive(Parser)]
#[command(version, about)]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,

    /// Base URL of the library backend
    #[arg(long, global = true, env = config::API_URL_ENV)]
    api_url: Option<String>,

    /// Path to a JSON config file
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the interactive UI (default)
    Run {
        /// Start on the library page
        #[arg(short, long)]
        library: bool,
    },
    /// Preview a video URL without saving it
    Preview {
        url: String,
    },
    /// Preview a video URL and save it to the library
    Save {
        url: String,
    },
    /// List saved videos
    List,
    /// Show one saved video
    Show {
        id: i64,
    },
    /// Delete a saved video
    Delete {
        id: i64,
        /// Skip the confirmation prompt
        #[arg(short, long)]
        yes: bool,
    },
}

fn init_tracing(interactive: bool) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    // The interactive UI owns the terminal, so its logs go to a file or nowhere
    if interactive {
        match open_log_file(Config::log_path()) {
            Ok(file) => tracing_subscriber::registry()
                .with(filter)
                .with(
                    tracing_subscriber::fmt::layer()
                        .with_ansi(false)
                        .with_writer(std::sync::Mutex::new(file)),
                )
                .init(),
            Err(e) => eprintln!("Warning: logging disabled: {}", e),
        }
        return;
    }

    tracing_subscriber::registry()
        .with(filter)
        .with(
            tracing_subscriber::fmt::layer()
                .with_target(false)
                .with_writer(std::io::stderr),
        )
        .init();
}

fn open_log_file(path: Option<PathBuf>) -> std::io::Result<std::fs::File> {
    let path = path.ok_or_else(|| {
        std::io::Error::new(
            std::io::ErrorKind::NotFound,
            "no cache directory for the log file",
        )
    })?;
    let with_path = |e: std::io::Error| {
        std::io::Error::new(e.kind(), format!("{}: {}", path.display(), e))
    };
    if let Some(dir) = path.parent() {
        std::fs::create_dir_all(dir).map_err(with_path)?;
    }
    std::fs::OpenOptions::new()
        .create(true)
        .append(true)
        .open(&path)
        .map_err(with_path)
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    let command = cli.command.unwrap_or(Commands::Run { library: false });

    init_tracing(matches!(command, Commands::Run { .. }));

    let config = match Config::resolve(cli.config.as_deref(), cli.api_url) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Error: {}", e.user_message());
            std::process::exit(1);
        }
    };
    let api = HttpVideoApi::new(&config.api_base_url)?;
    info!("Using backend at {}", api.base_url());

    let result = match command {
        Commands::Run { library } => {
            let view = if library { View::Library } else { View::Home };
            run_tui(api, view).await
        }
        Commands::Preview { url } => preview(api, &url).await,
        Commands::Save { url } => save(api, &url).await,
        Commands::List => list(api).await,
        Commands::Show { id } => show(api, id).await,
        Commands::Delete { id, yes } => delete(api, id, yes).await,
    };

    if let Err(e) = result {
        eprintln!("Error: {}", e.user_message());
        std::process::exit(1);
    }

    Ok(())
}

// ── One-shot commands ──

fn home_controller<A: VideoApi>(api: A, url: &str) -> ViewController<A, MemoryDocument> {
    let mut doc = MemoryDocument::home_page();
    doc.set_value(ids::VIDEO_URL, url);
    ViewController::new(api, doc)
}

async fn preview<A: VideoApi>(api: A, url: &str) -> Result<(), AppError> {
    let mut controller = home_controller(api, url);
    let video = controller.preview_video().await?;

    println!("Title:  {}", video.title);
    println!("Source: {}", video.source_url);
    if let Some(src) = embed_source(&video.embed_html) {
        println!("Player: {}", src);
    }
    if let Some(thumbnail) = video.thumbnail.as_deref().filter(|t| !t.is_empty()) {
        println!("Thumb:  {}", thumbnail);
    }
    Ok(())
}

async fn save<A: VideoApi>(api: A, url: &str) -> Result<(), AppError> {
    let mut controller = home_controller(api, url);
    let video = controller.preview_video().await?;
    let ack = controller.save_video().await?;
    println!("Saved \"{}\" as video #{}", video.title, ack.id);
    if !ack.message.is_empty() {
        println!("{}", ack.message);
    }
    Ok(())
}

async fn list<A: VideoApi>(api: A) -> Result<(), AppError> {
    let mut controller = ViewController::new(api, MemoryDocument::library_page());
    controller.load_library().await?;

    if controller.library().is_empty() {
        println!("Library is empty.");
        return Ok(());
    }
    for video in controller.library() {
        println!(
            "{:>5}  {:<10}  {:<40}  {}",
            video.id,
            format_date(&video.created_at),
            truncate_str(&video.title, 40),
            truncate_url(&video.source_url, URL_DISPLAY_MAX)
        );
    }
    Ok(())
}

async fn show<A: VideoApi>(api: A, id: i64) -> Result<(), AppError> {
    let mut controller = ViewController::new(api, MemoryDocument::library_page());
    controller.open_video_modal(id).await?;

    if let Some(video) = controller.modal_video() {
        println!("ID:     {}", video.id);
        println!("Title:  {}", video.title);
        println!("Source: {}", video.source_url);
        println!("Saved:  {}", format_date(&video.created_at));
        if let Some(src) = embed_source(&video.embed_html) {
            println!("Player: {}", src);
        }
        if let Some(url) = video.video_url.as_deref().filter(|u| !u.is_empty()) {
            println!("Video:  {}", url);
        }
    }
    controller.close_modal();
    Ok(())
}

async fn delete<A: VideoApi>(api: A, id: i64, yes: bool) -> Result<(), AppError> {
    let mut doc = MemoryDocument::library_page();
    doc.answer_next_confirm(yes || prompt_confirm(DELETE_CONFIRMATION)?);

    let mut controller = ViewController::new(api, doc);
    if controller.delete_video(id).await? {
        println!(
            "Deleted video #{} ({} remaining)",
            id,
            controller.library().len()
        );
    } else {
        println!("Cancelled.");
    }
    Ok(())
}

fn prompt_confirm(message: &str) -> Result<bool, AppError> {
    eprint!("{} [y/N] ", message);
    std::io::stderr().flush()?;
    let mut answer = String::new();
    std::io::stdin().read_line(&mut answer)?;
    Ok(matches!(
        answer.trim().to_ascii_lowercase().as_str(),
        "y" | "yes"
    ))
}

// ── Interactive UI ──

async fn run_tui<A: VideoApi>(api: A, view: View) -> Result<(), AppError> {
    let mut app = App::new(api, view);
    app.init().await;

    // Init terminal
    let mut terminal = ratatui::init();

    // Main loop
    let result = run_app(&mut terminal, &mut app).await;

    // Restore terminal
    ratatui::restore();
    result
}

async fn run_app<A: VideoApi>(
    terminal: &mut ratatui::DefaultTerminal,
    app: &mut App<A>,
) -> Result<(), AppError> {
    loop {
        app.tick(Instant::now());
        terminal.draw(|frame| ui::render(app, frame))?;

        if app.should_quit {
            return Ok(());
        }

        // Requests run after the frame showing their busy state
        if app.is_busy() {
            app.run_queued().await;
            discard_pending_input()?;
            continue;
        }

        // Poll for events with a 250ms timeout
        if event::poll(Duration::from_millis(250))? {
            if let Event::Key(key) = event::read()? {
                if key.kind != KeyEventKind::Press {
                    continue;
                }
                handle_key(app, key).await;
            }
        }
    }
}

/// Drop keys typed while a request was in flight, as a disabled control
/// would.
fn discard_pending_input() -> std::io::Result<()> {
    while event::poll(Duration::ZERO)? {
        event::read()?;
    }
    Ok(())
}

async fn handle_key<A: VideoApi>(app: &mut App<A>, key: KeyEvent) {
    // Ctrl+C always quits
    if key.code == KeyCode::Char('c') && key.modifiers.contains(KeyModifiers::CONTROL) {
        app.should_quit = true;
        return;
    }

    // Delete confirmation takes every key until answered
    if app.pending_delete.is_some() {
        match key.code {
            KeyCode::Char('y') | KeyCode::Char('Y') => app.answer_delete(true).await,
            KeyCode::Char('n') | KeyCode::Char('N') | KeyCode::Esc => {
                app.answer_delete(false).await
            }
            _ => {}
        }
        return;
    }

    // If help is showing, any key closes it
    if app.show_help {
        app.show_help = false;
        return;
    }

    if app.input_mode == InputMode::Editing {
        handle_url_input(app, key);
        return;
    }

    if key.code == KeyCode::Char('?') {
        app.show_help = true;
        return;
    }

    if app.modal_open() {
        handle_modal_key(app, key).await;
        return;
    }

    match app.view {
        View::Home => handle_home_key(app, key),
        View::Library => handle_library_key(app, key),
    }
}

fn handle_url_input<A: VideoApi>(app: &mut App<A>, key: KeyEvent) {
    match key.code {
        KeyCode::Enter => {
            app.input_mode = InputMode::Normal;
            app.submit_url();
        }
        KeyCode::Esc => {
            app.input_mode = InputMode::Normal;
        }
        KeyCode::Backspace => app.pop_char(),
        KeyCode::Char(c) => app.push_char(c),
        _ => {}
    }
}

fn handle_home_key<A: VideoApi>(app: &mut App<A>, key: KeyEvent) {
    match key.code {
        KeyCode::Char('q') => app.should_quit = true,
        KeyCode::Char('i') | KeyCode::Char('/') => app.input_mode = InputMode::Editing,
        KeyCode::Enter | KeyCode::Char('p') => app.submit_url(),
        KeyCode::Char('s') => app.save(),
        KeyCode::Char('+') | KeyCode::Char('=') => app.cycle_speed(true),
        KeyCode::Char('-') => app.cycle_speed(false),
        KeyCode::Char('x') => app.clear_input(),
        KeyCode::Tab | KeyCode::Char('l') => app.switch_view(app.view.toggle()),
        _ => {}
    }
}

fn handle_library_key<A: VideoApi>(app: &mut App<A>, key: KeyEvent) {
    match key.code {
        KeyCode::Char('q') => app.should_quit = true,
        KeyCode::Down | KeyCode::Char('j') => app.list_next(),
        KeyCode::Up | KeyCode::Char('k') => app.list_prev(),
        KeyCode::Enter => app.open_selected(),
        KeyCode::Char('d') | KeyCode::Delete => app.request_delete(),
        KeyCode::Char('r') => app.reload_library(),
        KeyCode::Tab | KeyCode::Char('h') => app.switch_view(app.view.toggle()),
        _ => {}
    }
}

async fn handle_modal_key<A: VideoApi>(app: &mut App<A>, key: KeyEvent) {
    match key.code {
        KeyCode::Esc | KeyCode::Char('q') => app.close_modal().await,
        KeyCode::Char('+') | KeyCode::Char('=') => app.cycle_speed(true),
        KeyCode::Char('-') => app.cycle_speed(false),
        _ => {}
    }
}
