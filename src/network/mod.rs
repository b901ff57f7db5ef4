pub mod playback;
pub mod playlist;
pub mod requests;
pub mod search;

use crate::app::App;
use crate::model::{PlayCommand, SearchDirection};
use requests::ApiClient;
use std::sync::Arc;
use tokio::sync::Mutex;

// Re-export traits
use self::playback::PlaybackNetwork;
use self::playlist::PlaylistNetwork;
use self::search::SearchNetwork;

/// Work items sent from the interactive side to the network thread. Playlist-
/// replacing events carry the generation reserved for them, so the response can
/// be rejected if something newer replaced the playlist in the meantime.
#[derive(Debug)]
pub enum IoEvent {
  GetPlayStatus,
  GetPlaylist(u64),
  GetSearchResults(String, u64),
  GetSearchPage(SearchDirection, u64),
  AddSong(u32, u64),
  PlayControl(PlayCommand),
}

pub struct Network {
  pub api: ApiClient,
  pub app: Arc<Mutex<App>>,
}

impl Network {
  pub fn new(api: ApiClient, app: &Arc<Mutex<App>>) -> Self {
    Network {
      api,
      app: Arc::clone(app),
    }
  }

  pub async fn handle_network_event(&mut self, io_event: IoEvent) {
    match io_event {
      IoEvent::GetPlayStatus => {
        self.get_play_status().await;
      }
      IoEvent::GetPlaylist(generation) => {
        self.get_playlist(generation).await;
      }
      IoEvent::GetSearchResults(query, generation) => {
        self.get_search_results(query, generation).await;
      }
      IoEvent::GetSearchPage(direction, generation) => {
        self.get_search_page(direction, generation).await;
      }
      IoEvent::AddSong(number, generation) => {
        self.add_song(number, generation).await;
      }
      IoEvent::PlayControl(command) => {
        self.play_control(command).await;
      }
    };

    {
      let mut app = self.app.lock().await;
      app.is_loading = false;
    }
  }

  async fn handle_error(&mut self, e: anyhow::Error) {
    let mut app = self.app.lock().await;
    app.handle_error(e);
  }
}
