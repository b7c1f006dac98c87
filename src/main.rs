use anyhow::{Context, Result};
use clap::{Arg, Command};
use crossterm::{
    event::{self, DisableMouseCapture, EnableMouseCapture},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{backend::CrosstermBackend, Terminal};
use std::{
    io,
    path::PathBuf,
    time::{Duration, Instant},
};

use sallgood_chat::api::ChatClient;
use sallgood_chat::app::App;
use sallgood_chat::config::Config;
use sallgood_chat::{logging, ui};

const BANNER: &str = r#"
  ___     _ _                     _    ___ _         _
 / __| __| | |  __ _ ___  ___  __| |  / __| |_  __ _| |_
 \__ \/ _` | | / _` / _ \/ _ \/ _` | | (__| ' \/ _` |  _|
 |___/\__,_|_| \__, \___/\___/\__,_|  \___|_||_\__,_|\__|
               |___/
"#;

fn show_startup_banner(server: &str) {
    print!("\x1B[2J\x1B[1;1H");

    for line in BANNER.lines() {
        println!("\x1B[38;5;33m{}\x1B[0m", line);
    }

    println!("\n\x1B[38;5;39mServer: {}\x1B[0m", server);
    println!("\x1B[38;5;45mPress Enter to continue...\x1B[0m\n");

    let _ = std::io::Read::read(&mut std::io::stdin(), &mut [0u8; 1]);
}

#[tokio::main]
async fn main() -> Result<()> {
    let matches = Command::new("sallgood-chat")
        .version(env!("CARGO_PKG_VERSION"))
        .about("Terminal chat screen for a remote HTTP chat bot")
        .arg(
            Arg::new("server")
                .short('s')
                .long("server")
                .value_name("URL")
                .help("Base address of the chat server, e.g. http://10.0.2.2:8000"),
        )
        .arg(
            Arg::new("config")
                .long("config")
                .value_name("PATH")
                .value_parser(clap::value_parser!(PathBuf))
                .help("Config file (defaults to <config dir>/sallgood-chat/config.toml)"),
        )
        .arg(
            Arg::new("check")
                .long("check")
                .action(clap::ArgAction::SetTrue)
                .help("Only run the connection test and exit"),
        )
        .arg(
            Arg::new("no-logo")
                .long("no-logo")
                .action(clap::ArgAction::SetTrue)
                .help("Skip the startup banner"),
        )
        .get_matches();

    let config = Config::load(matches.get_one::<PathBuf>("config").map(|p| p.as_path()))?
        .with_server(matches.get_one::<String>("server").map(|s| s.as_str()))?;

    logging::init_tracing(&config.log_path())?;
    tracing::info!(server = %config.server_url, "starting");

    let client = ChatClient::new(&config.server_url, config.request_timeout())
        .context("failed to build HTTP client")?;

    if matches.get_flag("check") {
        return run_check(&client).await;
    }

    if !matches.get_flag("no-logo") {
        show_startup_banner(client.base_url());
    }

    // Setup terminal
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen, EnableMouseCapture)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let mut app = App::new(client);
    app.mount();
    let res = run_app(&mut terminal, &mut app).await;

    // Restore terminal
    disable_raw_mode()?;
    execute!(
        terminal.backend_mut(),
        LeaveAlternateScreen,
        DisableMouseCapture
    )?;
    terminal.show_cursor()?;

    if let Err(err) = res {
        tracing::error!(error = ?err, "chat screen exited with an error");
        println!("Error: {:?}", err);
    }

    Ok(())
}

async fn run_check(client: &ChatClient) -> Result<()> {
    match client.health_check().await {
        Ok(report) => {
            println!("{}: {}", client.base_url(), report.summary());
            if report.is_degraded() {
                if let Some(detail) = &report.detail {
                    println!("detail: {}", detail);
                }
            }
            Ok(())
        }
        Err(e) => {
            eprintln!("{}: {}", client.base_url(), sallgood_chat::app::CONNECTION_ERROR_BODY);
            Err(e).context("connection test failed")
        }
    }
}

async fn run_app(
    terminal: &mut Terminal<CrosstermBackend<std::io::Stdout>>,
    app: &mut App,
) -> Result<()> {
    let mut last_tick = Instant::now();
    let tick_rate = Duration::from_millis(250);

    loop {
        terminal.draw(|f| ui::draw(f, app))?;

        let timeout_duration = tick_rate
            .checked_sub(last_tick.elapsed())
            .unwrap_or_else(|| Duration::from_secs(0));

        if event::poll(timeout_duration)? {
            let event = event::read()?;
            app.handle_input(event)?;
        }

        if last_tick.elapsed() >= tick_rate {
            app.on_tick();
            last_tick = Instant::now();
        }

        if app.should_quit {
            return Ok(());
        }

        // Let spawned network tasks make progress between polls.
        tokio::task::yield_now().await;
    }
}
