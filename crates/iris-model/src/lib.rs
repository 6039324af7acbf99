//! Iris classifier artifacts and inference on [burn].
//!
//! The flow is:
//! 1. Point a [`ClassifierArtifact`] at the `<stem>.json` / `<stem>.mpk` pair.
//! 2. Load it into a [`ModelStore`], which hosts the model on its own thread.
//! 3. Parse request input into a [`FeatureTable`] and call [`ModelStore::predict`].
//!
//! The resulting [`Prediction`] renders as a bracketed label list.
mod classifier;
mod error;
mod features;
mod host;
mod prediction;
mod store;

#[cfg(any(test, feature = "testing"))]
pub mod testing;

pub use classifier::{ClassifierArtifact, IrisClassifier, IrisClassifierConfig};
pub use error::{FeatureError, ModelStoreError};
pub use features::{Feature, FeatureTable, FeatureVector, NUM_FEATURES};
pub use host::{ModelAccessor, ModelHost};
pub use prediction::{Label, Prediction};
pub use store::ModelStore;
