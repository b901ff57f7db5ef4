use crate::config::ClientConfig;
use crate::model::{PlToken, PlayCommand, PlayStatus, PlaylistPayload, Track};
use crate::network::IoEvent;
use log::{debug, error, info};
use std::sync::mpsc::Sender;
use std::time::Instant;

pub const DEFAULT_ROUTE: RouteId = RouteId::Playlist;

/// The screens of the original web client, minus the templating. Mutating
/// operations still navigate between them so the shell knows what to render.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum RouteId {
  Playlist,
  Search,
  Error,
}

/// Client-side window onto the current track list. Holds no data of its own;
/// `App::paginate` decides visibility against it.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct PageCursor {
  /// 1-based, like the pagination widget it replaces.
  pub current_page: usize,
  pub page_size: usize,
}

impl PageCursor {
  pub fn new(page_size: usize) -> PageCursor {
    PageCursor {
      current_page: 1,
      page_size,
    }
  }

  pub fn reset(&mut self) {
    self.current_page = 1;
  }

  /// Zero-based half-open index window `[begin, end)` of the visible page.
  pub fn window(&self) -> (usize, usize) {
    let begin = (self.current_page - 1) * self.page_size;
    (begin, begin + self.page_size)
  }
}

pub struct App {
  navigation_stack: Vec<RouteId>,
  io_tx: Option<Sender<IoEvent>>,
  /// The displayed playlist or search result list. Always replaced wholesale,
  /// never patched, so stale partial state cannot linger.
  pub songs: Vec<Track>,
  pub total_items: usize,
  pub cursor: PageCursor,
  /// Token of the last playlist the server handed us. `None` until the first
  /// tokened response arrives, which makes the first poll fetch the playlist.
  pub last_seen_token: Option<PlToken>,
  /// Bumped before every operation that will replace `songs`; a response
  /// carrying an older generation is dropped instead of applied.
  playlist_generation: u64,
  pub percent_elapsed: f64,
  pub now_playing: Option<String>,
  pub is_playing: bool,
  pub is_loading: bool,
  pub is_fetching_play_status: bool,
  pub instant_since_last_play_status_poll: Instant,
  pub poll_interval_milliseconds: u64,
  pub api_error: String,
  /// Set whenever state changed in a way the shell should repaint.
  pub needs_redraw: bool,
}

impl Default for App {
  fn default() -> Self {
    App {
      navigation_stack: vec![DEFAULT_ROUTE],
      io_tx: None,
      songs: vec![],
      total_items: 0,
      cursor: PageCursor::new(crate::config::DEFAULT_PAGE_SIZE),
      last_seen_token: None,
      playlist_generation: 0,
      percent_elapsed: 0.0,
      now_playing: None,
      is_playing: false,
      is_loading: false,
      is_fetching_play_status: false,
      instant_since_last_play_status_poll: Instant::now(),
      poll_interval_milliseconds: crate::config::DEFAULT_POLL_INTERVAL_MS,
      api_error: String::new(),
      needs_redraw: false,
    }
  }
}

impl App {
  pub fn new(io_tx: Sender<IoEvent>, client_config: &ClientConfig) -> App {
    App {
      io_tx: Some(io_tx),
      cursor: PageCursor::new(client_config.page_size),
      poll_interval_milliseconds: client_config.poll_interval_milliseconds,
      ..App::default()
    }
  }

  // Send a network event to the network thread
  pub fn dispatch(&mut self, action: IoEvent) {
    // `is_loading` will be set to false again after the async action has finished in network/mod.rs
    self.is_loading = true;
    if let Some(io_tx) = &self.io_tx {
      if let Err(e) = io_tx.send(action) {
        self.is_loading = false;
        error!("error from dispatch: {}", e);
      };
    }
  }

  // Close the IO channel to allow the network thread to exit gracefully
  pub fn close_io_channel(&mut self) {
    self.io_tx = None;
  }

  pub fn current_route(&self) -> RouteId {
    *self.navigation_stack.last().unwrap_or(&DEFAULT_ROUTE)
  }

  pub fn push_navigation_stack(&mut self, next: RouteId) {
    if self.current_route() != next {
      self.navigation_stack.push(next);
    }
  }

  pub fn pop_navigation_stack(&mut self) -> Option<RouteId> {
    if self.navigation_stack.len() == 1 {
      None
    } else {
      self.navigation_stack.pop()
    }
  }

  pub fn update_on_tick(&mut self) {
    self.poll_play_status();
  }

  /// Fire a status fetch when the poll interval elapsed and no fetch is in
  /// flight. Failures do not cancel the schedule; the next tick retries.
  fn poll_play_status(&mut self) {
    let elapsed = self
      .instant_since_last_play_status_poll
      .elapsed()
      .as_millis();

    if !self.is_fetching_play_status && elapsed >= u128::from(self.poll_interval_milliseconds) {
      self.request_play_status();
    }
  }

  /// One poll tick: mark the fetch in flight and hand it to the network thread.
  /// Also used for the immediate poll at startup.
  pub fn request_play_status(&mut self) {
    self.is_fetching_play_status = true;
    self.dispatch(IoEvent::GetPlayStatus);
  }

  /// Apply one `/api/playstatus` response. Progress and track title are taken
  /// unconditionally; the play/pause indicator flips only on an actual change;
  /// a token mismatch triggers exactly one playlist refetch.
  pub fn apply_play_status(&mut self, status: PlayStatus) {
    self.is_fetching_play_status = false;
    self.instant_since_last_play_status_poll = Instant::now();

    self.percent_elapsed = status.percent_elapsed;
    self.now_playing = Some(status.now_playing);

    if status.is_playing != self.is_playing {
      self.is_playing = status.is_playing;
      info!(
        "playback {}",
        if self.is_playing { "started" } else { "stopped" }
      );
      self.needs_redraw = true;
    }

    if self.last_seen_token.as_ref() != Some(&status.pl_token) {
      debug!("playlist token changed to {}, refetching", status.pl_token);
      let generation = self.begin_playlist_refresh();
      self.dispatch(IoEvent::GetPlaylist(generation));
    }
  }

  /// Error path of a poll tick: keep all prior state, restart the interval.
  pub fn play_status_fetch_failed(&mut self) {
    self.is_fetching_play_status = false;
    self.instant_since_last_play_status_poll = Instant::now();
  }

  /// Reserve the next playlist generation for an operation that is about to
  /// replace `songs`. The returned value must be passed back with the response.
  pub fn begin_playlist_refresh(&mut self) -> u64 {
    self.playlist_generation += 1;
    self.playlist_generation
  }

  /// Replace the playlist with a tokened server payload. Returns false when
  /// the response was superseded by a newer operation and got dropped.
  pub fn apply_playlist(&mut self, generation: u64, payload: PlaylistPayload) -> bool {
    if generation != self.playlist_generation {
      debug!(
        "dropping stale playlist response (generation {} < {})",
        generation, self.playlist_generation
      );
      return false;
    }
    self.last_seen_token = Some(payload.header.pl_token);
    self.replace_songs(payload.songs);
    true
  }

  /// Playlist payload arriving from an explicit add: apply it, then show the
  /// playlist screen like the original client did.
  pub fn apply_added_playlist(&mut self, generation: u64, payload: PlaylistPayload) {
    if self.apply_playlist(generation, payload) {
      self.push_navigation_stack(RouteId::Playlist);
    }
  }

  /// Search results carry no token; the displayed list is replaced wholesale
  /// and the view navigates to the search screen.
  pub fn apply_search_results(&mut self, generation: u64, songs: Vec<Track>) {
    if generation != self.playlist_generation {
      debug!("dropping stale search response (generation {})", generation);
      return;
    }
    self.replace_songs(songs);
    self.push_navigation_stack(RouteId::Search);
  }

  fn replace_songs(&mut self, songs: Vec<Track>) {
    self.songs = songs;
    self.total_items = self.songs.len();
    self.cursor.reset();
    self.needs_redraw = true;
  }

  /// True iff `track`'s position in the current list falls inside the visible
  /// page window. Absent tracks are never visible.
  pub fn paginate(&self, track: &Track) -> bool {
    let (begin, end) = self.cursor.window();
    match self.songs.iter().position(|song| song == track) {
      Some(index) => begin <= index && index < end,
      None => false,
    }
  }

  pub fn total_pages(&self) -> usize {
    if self.total_items == 0 {
      1
    } else {
      self.total_items.div_ceil(self.cursor.page_size)
    }
  }

  /// View-level page change; clamped, never fetches.
  pub fn set_current_page(&mut self, page: usize) {
    self.cursor.current_page = page.clamp(1, self.total_pages());
    self.needs_redraw = true;
  }

  /// Resolve the `invert` pseudo-command against the last known play state.
  pub fn invert_play_command(&self) -> PlayCommand {
    if self.is_playing {
      PlayCommand::Stop
    } else {
      PlayCommand::Play
    }
  }

  pub fn handle_error(&mut self, e: anyhow::Error) {
    self.push_navigation_stack(RouteId::Error);
    self.api_error = e.to_string();
    error!("{}", e);
  }

  /// Hand the pending error to the shell (once) and leave the error screen.
  pub fn take_api_error(&mut self) -> Option<String> {
    if self.api_error.is_empty() {
      return None;
    }
    let message = std::mem::take(&mut self.api_error);
    if self.current_route() == RouteId::Error {
      self.pop_navigation_stack();
    }
    Some(message)
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::model::SearchDirection;
  use serde_json::json;
  use std::sync::mpsc::{channel, Receiver};

  fn test_app() -> (App, Receiver<IoEvent>) {
    let (tx, rx) = channel();
    let mut config = ClientConfig::new();
    config.page_size = 10;
    (App::new(tx, &config), rx)
  }

  fn track(title: &str) -> Track {
    Track {
      title: title.to_string(),
      ..Track::default()
    }
  }

  fn status(playing: bool, token: serde_json::Value) -> PlayStatus {
    serde_json::from_value(json!({
      "percentElapsed": 50.0,
      "nowPlaying": "Current",
      "isplaying": playing,
      "pl_token": token
    }))
    .unwrap()
  }

  fn payload(token: serde_json::Value, titles: &[&str]) -> PlaylistPayload {
    serde_json::from_value(json!({
      "header": { "pl_token": token },
      "songs": titles.iter().map(|t| json!({ "title": t })).collect::<Vec<_>>()
    }))
    .unwrap()
  }

  fn drain_playlist_fetches(rx: &Receiver<IoEvent>) -> Vec<u64> {
    let mut generations = vec![];
    while let Ok(event) = rx.try_recv() {
      if let IoEvent::GetPlaylist(generation) = event {
        generations.push(generation);
      }
    }
    generations
  }

  #[test]
  fn unchanged_token_never_touches_the_playlist() {
    let (mut app, rx) = test_app();

    // Establish a baseline playlist under token "A".
    app.apply_play_status(status(true, json!("A")));
    let generations = drain_playlist_fetches(&rx);
    assert_eq!(generations.len(), 1);
    app.apply_playlist(generations[0], payload(json!("A"), &["One", "Two"]));
    app.set_current_page(1);

    let before = app.songs.clone();
    for _ in 0..5 {
      app.apply_play_status(status(true, json!("A")));
    }

    assert_eq!(app.songs, before);
    assert_eq!(app.cursor.current_page, 1);
    assert!(drain_playlist_fetches(&rx).is_empty());
  }

  #[test]
  fn token_change_triggers_one_refetch_and_resets_cursor() {
    let (mut app, rx) = test_app();

    app.apply_play_status(status(true, json!("A")));
    let first = drain_playlist_fetches(&rx);
    assert_eq!(first.len(), 1);
    app.apply_playlist(first[0], payload(json!("A"), &["One"; 25]));

    // Wander off page 1, then let the server bump the token.
    app.set_current_page(3);
    app.apply_play_status(status(true, json!("B")));

    let second = drain_playlist_fetches(&rx);
    assert_eq!(second.len(), 1, "exactly one refetch per token change");
    // The play indicator did not move even though the token did.
    assert!(app.is_playing);

    app.apply_playlist(second[0], payload(json!("B"), &["Fresh"]));
    assert_eq!(app.cursor.current_page, 1);
    assert_eq!(app.last_seen_token, Some(PlToken::from_value(json!("B"))));
  }

  #[test]
  fn play_indicator_flips_only_on_change() {
    let (mut app, _rx) = test_app();
    assert!(!app.is_playing);

    app.apply_play_status(status(true, json!(1)));
    assert!(app.is_playing);
    app.needs_redraw = false;

    // Same play state on the next tick: no redraw-worthy flip.
    app.apply_play_status(status(true, json!(1)));
    assert!(app.is_playing);
    assert!(!app.needs_redraw);

    app.apply_play_status(status(false, json!(1)));
    assert!(!app.is_playing);
    assert!(app.needs_redraw);
  }

  #[test]
  fn progress_and_title_update_unconditionally() {
    let (mut app, _rx) = test_app();
    app.apply_play_status(status(true, json!(1)));
    let later = PlayStatus {
      percent_elapsed: 80.0,
      now_playing: "Next Song".to_string(),
      ..status(true, json!(1))
    };
    app.apply_play_status(later);
    assert_eq!(app.percent_elapsed, 80.0);
    assert_eq!(app.now_playing.as_deref(), Some("Next Song"));
  }

  #[test]
  fn failed_poll_leaves_state_untouched() {
    let (mut app, _rx) = test_app();
    app.apply_play_status(status(true, json!("A")));
    let elapsed = app.percent_elapsed;

    app.request_play_status();
    assert!(app.is_fetching_play_status);
    app.play_status_fetch_failed();

    assert!(!app.is_fetching_play_status);
    assert!(app.is_playing);
    assert_eq!(app.percent_elapsed, elapsed);
  }

  #[test]
  fn poll_guard_prevents_overlapping_fetches() {
    let (mut app, rx) = test_app();
    // Zero interval: every tick is due.
    app.poll_interval_milliseconds = 0;

    app.update_on_tick();
    app.update_on_tick();
    app.update_on_tick();

    let polls = {
      let mut count = 0;
      while let Ok(event) = rx.try_recv() {
        if matches!(event, IoEvent::GetPlayStatus) {
          count += 1;
        }
      }
      count
    };
    assert_eq!(polls, 1, "in-flight guard must hold until the response lands");
  }

  #[test]
  fn paginate_matches_the_visible_window() {
    let (mut app, _rx) = test_app();
    let titles: Vec<String> = (0..25).map(|i| format!("Song {}", i)).collect();
    let generation = app.begin_playlist_refresh();
    app.apply_search_results(generation, titles.iter().map(|t| track(t)).collect());

    app.set_current_page(2);
    assert!(!app.paginate(&track("Song 9")));
    assert!(app.paginate(&track("Song 10")));
    assert!(app.paginate(&track("Song 19")));
    assert!(!app.paginate(&track("Song 20")));

    // Absent track: index -1 in the original, never visible.
    assert!(!app.paginate(&track("Not In The List")));
  }

  #[test]
  fn invert_resolves_against_last_known_state() {
    let (mut app, _rx) = test_app();
    app.is_playing = true;
    assert_eq!(app.invert_play_command(), PlayCommand::Stop);
    app.is_playing = false;
    assert_eq!(app.invert_play_command(), PlayCommand::Play);
  }

  #[test]
  fn added_playlist_applies_token_cursor_and_route() {
    let (mut app, _rx) = test_app();
    app.push_navigation_stack(RouteId::Search);

    let generation = app.begin_playlist_refresh();
    app.apply_added_playlist(generation, payload(json!("X"), &["A", "B", "C", "D", "E"]));

    assert_eq!(app.songs.len(), 5);
    assert_eq!(app.total_items, 5);
    assert_eq!(app.last_seen_token, Some(PlToken::from_value(json!("X"))));
    assert_eq!(app.cursor.current_page, 1);
    assert_eq!(app.current_route(), RouteId::Playlist);
  }

  #[test]
  fn empty_search_results_are_not_an_error() {
    let (mut app, _rx) = test_app();
    let generation = app.begin_playlist_refresh();
    app.apply_search_results(generation, vec![]);

    assert!(app.songs.is_empty());
    assert_eq!(app.total_items, 0);
    assert!(app.api_error.is_empty());
    assert_eq!(app.current_route(), RouteId::Search);
  }

  #[test]
  fn stale_generation_responses_are_dropped() {
    let (mut app, _rx) = test_app();
    let stale = app.begin_playlist_refresh();
    let fresh = app.begin_playlist_refresh();

    assert!(!app.apply_playlist(stale, payload(json!("OLD"), &["Old"])));
    assert!(app.songs.is_empty());
    assert!(app.last_seen_token.is_none());

    assert!(app.apply_playlist(fresh, payload(json!("NEW"), &["New"])));
    assert_eq!(app.songs.len(), 1);
  }

  #[test]
  fn stale_search_results_are_dropped_too() {
    let (mut app, _rx) = test_app();
    let stale = app.begin_playlist_refresh();
    let _fresh = app.begin_playlist_refresh();

    app.apply_search_results(stale, vec![track("Old Result")]);
    assert!(app.songs.is_empty());
    assert_eq!(app.current_route(), RouteId::Playlist);
  }

  #[test]
  fn errors_surface_once_then_clear() {
    let (mut app, _rx) = test_app();
    app.handle_error(anyhow::anyhow!("jukebox API 500 failed"));
    assert_eq!(app.current_route(), RouteId::Error);

    let message = app.take_api_error();
    assert_eq!(message.as_deref(), Some("jukebox API 500 failed"));
    assert_eq!(app.current_route(), RouteId::Playlist);
    assert!(app.take_api_error().is_none());
  }

  #[test]
  fn search_direction_vocabulary_is_fixed() {
    assert_eq!(SearchDirection::Next.as_str(), "searchnext");
    assert_eq!(SearchDirection::Prev.as_str(), "searchprev");
  }
}
