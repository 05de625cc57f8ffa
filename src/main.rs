use std::io;
use std::time::{Duration, Instant};

use crossterm::event::KeyEventKind;
use crossterm::{
    event::{self, Event},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::prelude::*;

mod api;
mod app;
mod config;
mod controller;
mod error;
mod models;
mod services;
mod tui;

use app::App;
use config::Config;
use error::{AppError, Result};
use models::RequestStatus;
use services::TerminalClipboard;
use tui::{draw, handle_key_event};

#[derive(Debug, Default, PartialEq)]
struct CliArgs {
    local: bool,
    backend: Option<String>,
    summarize: Option<String>,
    huggingface: bool,
    health: bool,
}

fn parse_args(args: &[String]) -> Result<CliArgs> {
    let mut parsed = CliArgs::default();
    let mut iter = args.iter().skip(1);

    while let Some(arg) = iter.next() {
        match arg.as_str() {
            "--local" => parsed.local = true,
            "--hf" => parsed.huggingface = true,
            "--health" => parsed.health = true,
            "--backend" => {
                let url = iter
                    .next()
                    .ok_or_else(|| AppError::Config("--backend needs a URL".to_string()))?;
                parsed.backend = Some(url.clone());
            }
            "--summarize" => {
                let url = iter
                    .next()
                    .ok_or_else(|| AppError::Config("--summarize needs a URL".to_string()))?;
                parsed.summarize = Some(url.clone());
            }
            other => return Err(AppError::Config(format!("Unknown argument: {other}"))),
        }
    }

    if parsed.huggingface && parsed.summarize.is_none() {
        return Err(AppError::Config("--hf requires --summarize <URL>".to_string()));
    }

    Ok(parsed)
}

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize logging (only show warnings and errors by default)
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(tracing::Level::WARN.into()),
        )
        .with_writer(std::io::stderr)
        .init();

    let args: Vec<String> = std::env::args().collect();
    let cli = parse_args(&args)?;

    // Load configuration; CLI overrides last for this session only
    let mut config = Config::load()?;
    if cli.local {
        config.use_local_host();
    }
    if let Some(url) = cli.backend.clone() {
        config.backend_url = Some(url);
    }

    let mut app = App::new(&config, Box::new(TerminalClipboard))?;

    if cli.health {
        let health = app.check_health().await?;
        println!("{}", health);
        return Ok(());
    }

    // Headless one-shot summary
    if let Some(url) = cli.summarize {
        let status = run_headless(&mut app, &url, cli.huggingface).await;
        if status == RequestStatus::Failed {
            std::process::exit(1);
        }
        return Ok(());
    }

    // Setup terminal
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    app.start_health_check();

    // Run the app
    let result = run_app(&mut terminal, &mut app).await;

    // Restore terminal
    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;

    if let Err(e) = result {
        eprintln!("Error: {}", e);
    }

    Ok(())
}

async fn run_headless(app: &mut App, url: &str, huggingface: bool) -> RequestStatus {
    let controller = &mut app.controller;

    let mut status = match controller.submit_primary(url) {
        Ok(()) => controller.settle().await,
        Err(e) => {
            eprintln!("Error: {}", e);
            return RequestStatus::Failed;
        }
    };

    if huggingface && status == RequestStatus::Succeeded {
        status = match controller.submit_secondary(url, None) {
            Ok(()) => controller.settle().await,
            Err(e) => {
                eprintln!("Error: {}", e);
                return RequestStatus::Failed;
            }
        };
    }

    let state = controller.state();
    println!("{}", textwrap::fill(state.summary(), 80));
    if let Some(image) = &state.preview_image_url {
        println!("\nPreview: {}", image);
    }
    if state.used_secondary_model {
        println!("(summarized with Hugging Face)");
    }

    status
}

async fn run_app<B: Backend>(terminal: &mut Terminal<B>, app: &mut App) -> Result<()> {
    loop {
        terminal.draw(|frame| draw(frame, app))?;

        // Advance spinner animation
        app.tick_spinner();

        // Poll for a settled summary request
        app.poll_summary_result();

        // Poll for the startup health probe
        app.poll_health_result();

        app.poll_theme_change();
        app.check_timers(Instant::now());

        // Poll for events with timeout to allow async operations
        if event::poll(Duration::from_millis(100))? {
            if let Event::Key(key) = event::read()? {
                if key.kind == KeyEventKind::Press {
                    if let Some(action) =
                        handle_key_event(key, app.input_active, app.show_help, app.page)
                    {
                        let should_quit = app.handle_action(action)?;
                        if should_quit {
                            return Ok(());
                        }
                    }
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn args(list: &[&str]) -> Vec<String> {
        std::iter::once("takeaways")
            .chain(list.iter().copied())
            .map(String::from)
            .collect()
    }

    #[test]
    fn no_arguments_runs_the_tui() {
        assert_eq!(parse_args(&args(&[])).unwrap(), CliArgs::default());
    }

    #[test]
    fn headless_flags_are_parsed() {
        let parsed = parse_args(&args(&[
            "--local",
            "--summarize",
            "https://example.com",
            "--hf",
        ]))
        .unwrap();

        assert!(parsed.local);
        assert!(parsed.huggingface);
        assert_eq!(parsed.summarize.as_deref(), Some("https://example.com"));
    }

    #[test]
    fn missing_values_and_unknown_flags_are_errors() {
        assert!(parse_args(&args(&["--backend"])).is_err());
        assert!(parse_args(&args(&["--hf"])).is_err());
        assert!(parse_args(&args(&["--refresh"])).is_err());
    }
}
