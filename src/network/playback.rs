use super::Network;
use crate::model::{PlayCommand, PlayStatus};
use log::debug;

pub trait PlaybackNetwork {
  async fn get_play_status(&mut self);
  async fn play_control(&mut self, command: PlayCommand);
}

impl PlaybackNetwork for Network {
  /// One poll tick. `App::apply_play_status` does the actual comparison work
  /// and decides whether a playlist refetch is due.
  async fn get_play_status(&mut self) {
    let status = self.api.get_typed::<PlayStatus>(&["api", "playstatus"]).await;

    let mut app = self.app.lock().await;
    match status {
      Ok(status) => app.apply_play_status(status),
      Err(e) => {
        // Fail-open: prior indicators stay on screen, the next tick retries.
        app.play_status_fetch_failed();
        debug!("playstatus poll failed: {}", e);
      }
    }
  }

  /// Fire-and-forget: the response body carries nothing we consume, and the
  /// next status poll observes whatever the command changed.
  async fn play_control(&mut self, command: PlayCommand) {
    if let Err(e) = self
      .api
      .post_ignored(&["api", "playctrl", command.as_str()])
      .await
    {
      self.handle_error(e).await;
    }
  }
}
