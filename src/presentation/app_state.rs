// Application state for HTTP handlers
use crate::application::dashboard_service::UserInput;
use crate::presentation::published_view::PublishedView;
use tokio::sync::{mpsc, watch};

#[derive(Clone)]
pub struct AppState {
    pub view: watch::Receiver<PublishedView>,
    pub inputs: mpsc::Sender<UserInput>,
}
