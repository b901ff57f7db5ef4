use super::Network;
use crate::model::{SearchDirection, Track};

pub trait SearchNetwork {
  async fn get_search_results(&mut self, query: String, generation: u64);
  async fn get_search_page(&mut self, direction: SearchDirection, generation: u64);
}

impl SearchNetwork for Network {
  /// Free-text search. The query is forwarded as-is; an empty result array is
  /// a legal answer, not an error.
  async fn get_search_results(&mut self, query: String, generation: u64) {
    match self
      .api
      .get_typed::<Vec<Track>>(&["api", "search", "text", &query])
      .await
    {
      Ok(songs) => {
        let mut app = self.app.lock().await;
        app.apply_search_results(generation, songs);
      }
      Err(e) => self.handle_error(e).await,
    }
  }

  /// Next/previous result page; the server keeps the paging state, the client
  /// just names the direction.
  async fn get_search_page(&mut self, direction: SearchDirection, generation: u64) {
    match self
      .api
      .get_typed::<Vec<Track>>(&["api", "search", direction.as_str()])
      .await
    {
      Ok(songs) => {
        let mut app = self.app.lock().await;
        app.apply_search_results(generation, songs);
      }
      Err(e) => self.handle_error(e).await,
    }
  }
}
