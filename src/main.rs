mod app;
mod cli;
mod config;
mod model;
mod network;
mod ui;

use anyhow::{anyhow, Result};
use app::App;
use config::ClientConfig;
use log::info;
use network::{IoEvent, Network};
use network::requests::ApiClient;
use std::{
  fs,
  path::{Path, PathBuf},
  sync::Arc,
  time::Duration,
};
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::sync::Mutex;

const LOG_FILE_NAME: &str = "jukectl.log";

const HELP_TEXT: &str = "\
commands:
  search <text>   free-text search (also: /<text>)
  n / p           next / previous search result page
  add <num>       queue the track with that result number
  play, stop      start / stop playback
  skip            skip the current track
  toggle          play if stopped, stop if playing
  ls              show the current page
  page <n>        jump to page n
  status          show the playbar
  back            return to the previous screen
  q               quit";

fn setup_logging(log_path: &Path, debug: bool) -> Result<()> {
  if let Some(log_dir) = log_path.parent() {
    if !log_dir.exists() {
      fs::create_dir_all(log_dir)
        .map_err(|e| anyhow!("failed to create log directory {}: {}", log_dir.display(), e))?;
    }
  }

  // define format of log messages.
  fern::Dispatch::new()
    .format(|out, message, record| {
      out.finish(format_args!(
        "{}[{}][{}] {}",
        chrono::Local::now().format("[%Y-%m-%d][%H:%M:%S]"),
        record.target(),
        record.level(),
        message
      ))
    })
    .level(if debug {
      log::LevelFilter::Debug
    } else {
      log::LevelFilter::Info
    })
    .chain(fern::log_file(log_path)?)
    .apply()
    .map_err(|e| anyhow!("failed to initialize logger: {}", e))?;

  Ok(())
}

fn default_log_path(client_config: &mut ClientConfig) -> Result<PathBuf> {
  if client_config.path_to_config.is_none() {
    client_config.get_or_build_paths()?;
  }
  match &client_config.path_to_config {
    Some(paths) => match paths.config_file_path.parent() {
      Some(dir) => Ok(dir.join(LOG_FILE_NAME)),
      None => Err(anyhow!("config path has no parent directory")),
    },
    None => Err(anyhow!("no config directory available for the log file")),
  }
}

#[tokio::main]
async fn main() -> Result<()> {
  let matches = cli::clap_app().get_matches();

  let mut client_config = ClientConfig::new();
  client_config.load_config(matches.get_one::<PathBuf>("config"))?;

  if let Some(server_url) = matches.get_one::<String>("server-url") {
    client_config.server_url = server_url.clone();
  }
  if let Some(poll_interval) = matches.get_one::<u64>("poll-interval") {
    client_config.poll_interval_milliseconds = *poll_interval;
  }
  if let Some(page_size) = matches.get_one::<usize>("page-size") {
    if *page_size > 0 {
      client_config.page_size = *page_size;
    }
  }

  let log_path = match matches.get_one::<PathBuf>("log-file") {
    Some(path) => path.clone(),
    None => default_log_path(&mut client_config)?,
  };
  setup_logging(&log_path, matches.get_flag("debug"))?;

  let api = ApiClient::new(&client_config.server_url)?;

  let (sync_io_tx, sync_io_rx) = std::sync::mpsc::channel::<IoEvent>();
  let app = Arc::new(Mutex::new(App::new(sync_io_tx, &client_config)));
  info!("app state initialized");

  let cloned_app = Arc::clone(&app);
  std::thread::spawn(move || {
    let mut network = Network::new(api, &app);
    start_tokio(sync_io_rx, &mut network);
  });

  info!(
    "connecting to {} (poll every {} ms)",
    client_config.server_url, client_config.poll_interval_milliseconds
  );
  run_shell(&client_config, &cloned_app).await
}

#[tokio::main]
async fn start_tokio(io_rx: std::sync::mpsc::Receiver<IoEvent>, network: &mut Network) {
  while let Ok(io_event) = io_rx.recv() {
    network.handle_network_event(io_event).await;
  }
}

async fn run_shell(client_config: &ClientConfig, app: &Arc<Mutex<App>>) -> Result<()> {
  println!(
    "jukectl - connected to {} (type 'help' for commands)",
    client_config.server_url
  );

  // First poll fires immediately; the interval below takes over afterwards.
  {
    let mut app = app.lock().await;
    app.request_play_status();
  }

  let mut tick =
    tokio::time::interval(Duration::from_millis(client_config.tick_rate_milliseconds));
  let mut lines = BufReader::new(tokio::io::stdin()).lines();

  loop {
    tokio::select! {
      _ = tick.tick() => {
        let mut app = app.lock().await;
        app.update_on_tick();
        if app.needs_redraw {
          app.needs_redraw = false;
          println!("{}", ui::render(&app));
        }
        if let Some(message) = app.take_api_error() {
          eprintln!("error: {}", message);
        }
      }
      line = lines.next_line() => {
        match line? {
          Some(line) => {
            if !handle_command(&line, app).await {
              break;
            }
          }
          // stdin closed
          None => break,
        }
      }
    }
  }

  app.lock().await.close_io_channel();
  info!("shutting down");
  Ok(())
}

/// Execute one shell line. Returns false when the user asked to quit.
async fn handle_command(line: &str, app: &Arc<Mutex<App>>) -> bool {
  let line = line.trim();
  if line.is_empty() {
    return true;
  }

  // mps-style search shorthand: "/ac dc"
  if let Some(query) = line.strip_prefix('/') {
    dispatch_search(query.trim_start(), app).await;
    return true;
  }

  let (command, rest) = match line.split_once(char::is_whitespace) {
    Some((command, rest)) => (command, rest.trim()),
    None => (line, ""),
  };

  match command {
    "help" | "h" => println!("{}", HELP_TEXT),
    "q" | "quit" | "exit" => return false,
    "search" => dispatch_search(rest, app).await,
    "n" | "next" => dispatch_search_page(model::SearchDirection::Next, app).await,
    "p" | "prev" => dispatch_search_page(model::SearchDirection::Prev, app).await,
    "add" => match rest.parse::<u32>() {
      Ok(number) => {
        let mut app = app.lock().await;
        let generation = app.begin_playlist_refresh();
        app.dispatch(IoEvent::AddSong(number, generation));
      }
      Err(_) => println!("usage: add <track number>"),
    },
    "play" => dispatch_play_control(model::PlayCommand::Play, app).await,
    "stop" => dispatch_play_control(model::PlayCommand::Stop, app).await,
    "skip" => dispatch_play_control(model::PlayCommand::Skip, app).await,
    "toggle" | "invert" => {
      let mut app = app.lock().await;
      let command = app.invert_play_command();
      app.dispatch(IoEvent::PlayControl(command));
    }
    "ls" | "list" => {
      let app = app.lock().await;
      println!("{}", ui::render(&app));
    }
    "page" => match rest.parse::<usize>() {
      Ok(page) => {
        let mut app = app.lock().await;
        app.set_current_page(page);
        app.needs_redraw = false;
        println!("{}", ui::render(&app));
      }
      Err(_) => println!("usage: page <number>"),
    },
    "status" => {
      let app = app.lock().await;
      println!("{}", ui::format_playbar(&app));
    }
    "back" => {
      let mut app = app.lock().await;
      app.pop_navigation_stack();
    }
    _ => println!("unknown command '{}', type 'help'", command),
  }

  true
}

async fn dispatch_search(query: &str, app: &Arc<Mutex<App>>) {
  let mut app = app.lock().await;
  let generation = app.begin_playlist_refresh();
  app.dispatch(IoEvent::GetSearchResults(query.to_string(), generation));
}

async fn dispatch_search_page(direction: model::SearchDirection, app: &Arc<Mutex<App>>) {
  let mut app = app.lock().await;
  let generation = app.begin_playlist_refresh();
  app.dispatch(IoEvent::GetSearchPage(direction, generation));
}

async fn dispatch_play_control(command: model::PlayCommand, app: &Arc<Mutex<App>>) {
  let mut app = app.lock().await;
  app.dispatch(IoEvent::PlayControl(command));
}
