use std::sync::Arc;

use burn::prelude::Backend;
use derive_new::new;
use iris_model::ModelStore;

use crate::counter::PredictionCounter;
use crate::result_log::ResultLog;

/// Everything a request handler needs, built once at startup.
#[derive(new)]
pub struct ServeState<B: Backend> {
    pub model: ModelStore<B>,
    pub result_log: Arc<dyn ResultLog>,
    #[new(default)]
    pub counter: PredictionCounter,
}

pub type SharedState<B> = Arc<ServeState<B>>;
