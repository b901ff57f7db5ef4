use crate::app::{App, RouteId};

const PROGRESS_BAR_WIDTH: usize = 30;

/// One-line playback indicator, e.g.
/// `▶ Back in Black [============>.................] 42%`.
pub fn format_playbar(app: &App) -> String {
  let marker = if app.is_playing { "▶" } else { "■" };
  let title = app.now_playing.as_deref().unwrap_or("-");
  let pct = app.percent_elapsed.clamp(0.0, 100.0);
  let filled = ((pct / 100.0) * PROGRESS_BAR_WIDTH as f64).round() as usize;
  let filled = filled.min(PROGRESS_BAR_WIDTH);

  format!(
    "{} {} [{}{}] {:.0}%",
    marker,
    title,
    "=".repeat(filled),
    ".".repeat(PROGRESS_BAR_WIDTH - filled),
    pct
  )
}

/// The visible page of the track list, one row per track, numbered by absolute
/// position so the numbers line up with what `add` expects.
pub fn format_song_rows(app: &App) -> String {
  let mut rows = vec![];
  for (index, track) in app.songs.iter().enumerate() {
    if !app.paginate(track) {
      continue;
    }
    let duration = if track.timestring.trim().is_empty() {
      String::new()
    } else {
      format!("  ({})", track.timestring.trim())
    };
    rows.push(format!("{:>4}  {}{}", index, track.title, duration));
  }
  if rows.is_empty() {
    rows.push("  (no tracks)".to_string());
  }
  rows.join("\n")
}

pub fn format_page_footer(app: &App) -> String {
  let loading = if app.is_loading { "  …" } else { "" };
  format!(
    "page {}/{} - {} tracks{}",
    app.cursor.current_page,
    app.total_pages(),
    app.total_items,
    loading
  )
}

/// Full repaint: playbar, screen title, visible rows, footer.
pub fn render(app: &App) -> String {
  let screen = match app.current_route() {
    RouteId::Playlist => "playlist",
    RouteId::Search => "search results",
    RouteId::Error => "error",
  };
  format!(
    "{}\n-- {} --\n{}\n{}",
    format_playbar(app),
    screen,
    format_song_rows(app),
    format_page_footer(app)
  )
}
