use super::Network;
use crate::model::PlaylistPayload;
use log::debug;

pub trait PlaylistNetwork {
  async fn get_playlist(&mut self, generation: u64);
  async fn add_song(&mut self, number: u32, generation: u64);
}

impl PlaylistNetwork for Network {
  /// Token-triggered wholesale refetch. Only ever dispatched by the poller, so
  /// a failure here stays as quiet as a failed poll: the stale list remains and
  /// the still-unchanged last-seen token makes a later poll try again.
  async fn get_playlist(&mut self, generation: u64) {
    match self
      .api
      .get_typed::<PlaylistPayload>(&["api", "playlist", "get"])
      .await
    {
      Ok(payload) => {
        let mut app = self.app.lock().await;
        app.apply_playlist(generation, payload);
      }
      Err(e) => {
        debug!("playlist refetch failed: {}", e);
      }
    }
  }

  /// Server-side add. The response already carries the updated playlist and
  /// token, so no extra round trip is needed.
  async fn add_song(&mut self, number: u32, generation: u64) {
    match self
      .api
      .get_typed::<PlaylistPayload>(&["api", "playlist", "add", &number.to_string()])
      .await
    {
      Ok(payload) => {
        let mut app = self.app.lock().await;
        app.apply_added_playlist(generation, payload);
      }
      Err(e) => self.handle_error(e).await,
    }
  }
}
