use serde::Deserialize;
use serde_json::Value;
use std::fmt;

/// Opaque playlist version marker handed out by the server with every playlist
/// and every status response. The server currently sends an integer, but the
/// client must not depend on that: equality is the only operation.
#[derive(Clone, Debug, Default, PartialEq, Deserialize)]
#[serde(transparent)]
pub struct PlToken(Value);

impl PlToken {
  #[cfg(test)]
  pub fn from_value(value: Value) -> Self {
    PlToken(value)
  }
}

impl fmt::Display for PlToken {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    write!(f, "{}", self.0)
  }
}

/// One entry of the playlist or of a search result page. Display metadata is
/// passed through untouched; only `title` is required on the wire.
#[derive(Clone, Debug, Default, PartialEq, Deserialize)]
pub struct Track {
  #[serde(default)]
  pub ytid: String,
  pub title: String,
  /// Duration in seconds.
  #[serde(default)]
  pub length: u64,
  #[serde(default)]
  pub timestring: String,
  #[serde(default)]
  pub thumb: Option<String>,
}

#[derive(Clone, Debug, Deserialize)]
pub struct PlaylistHeader {
  pub pl_token: PlToken,
}

/// Wire shape of `/api/playlist/get` and `/api/playlist/add/:num`. Older server
/// revisions returned a bare track array without a token; the object shape is
/// the one this client speaks.
#[derive(Clone, Debug, Deserialize)]
pub struct PlaylistPayload {
  pub header: PlaylistHeader,
  pub songs: Vec<Track>,
}

/// One `/api/playstatus` response, recomputed in full on every poll tick.
#[derive(Clone, Debug, Deserialize)]
pub struct PlayStatus {
  #[serde(rename = "percentElapsed", default)]
  pub percent_elapsed: f64,
  /// Title of the active track, or a server-provided placeholder when idle.
  #[serde(rename = "nowPlaying", default)]
  pub now_playing: String,
  // The server spells this `isplaying`; some revisions used camelCase.
  #[serde(rename = "isplaying", alias = "isPlaying", default)]
  pub is_playing: bool,
  pub pl_token: PlToken,
}

/// Commands accepted by `/api/playctrl/:cmd`. The user-facing `invert`
/// pseudo-command never reaches the wire; it resolves to one of these first.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PlayCommand {
  Play,
  Stop,
  Skip,
}

impl PlayCommand {
  pub fn as_str(self) -> &'static str {
    match self {
      PlayCommand::Play => "play",
      PlayCommand::Stop => "stop",
      PlayCommand::Skip => "skip",
    }
  }
}

/// Server-side result paging directions for `/api/search/:direction`.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SearchDirection {
  Next,
  Prev,
}

impl SearchDirection {
  pub fn as_str(self) -> &'static str {
    match self {
      SearchDirection::Next => "searchnext",
      SearchDirection::Prev => "searchprev",
    }
  }
}
