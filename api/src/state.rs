use crate::config::Config;
use crate::directory::Directory;

use std::sync::Arc;

#[derive(Clone)]
pub struct State {
    pub config: Config,
    pub directory: Arc<dyn Directory>,
}

impl State {
    pub fn new(config: Config, directory: Arc<dyn Directory>) -> AppStateRaw {
        Arc::new(State { config, directory })
    }
}

pub type AppStateRaw = Arc<State>;
pub type AppState = actix_web::web::Data<AppStateRaw>;
