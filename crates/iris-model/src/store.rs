use std::sync::Arc;

use burn::prelude::Backend;
use burn::tensor::{Tensor, TensorData};

use crate::classifier::{ClassifierArtifact, IrisClassifier, IrisClassifierConfig};
use crate::error::ModelStoreError;
use crate::features::{FeatureTable, NUM_FEATURES};
use crate::host::ModelHost;
use crate::prediction::{Label, Prediction};

/// Read-only access to the loaded classifier, shared by every request.
pub struct ModelStore<B: Backend> {
    host: Arc<ModelHost<IrisClassifier<B>>>,
    config: Arc<IrisClassifierConfig>,
    device: B::Device,
}

impl<B: Backend> Clone for ModelStore<B> {
    fn clone(&self) -> Self {
        Self {
            host: self.host.clone(),
            config: self.config.clone(),
            device: self.device.clone(),
        }
    }
}

impl<B: Backend> ModelStore<B> {
    /// Loads the artifact and starts the model host.
    pub fn load(artifact: &ClassifierArtifact, device: &B::Device) -> Result<Self, ModelStoreError> {
        let (config, model) = artifact.load::<B>(device)?;
        Self::from_model(config, model, device)
    }

    pub fn from_model(
        config: IrisClassifierConfig,
        model: IrisClassifier<B>,
        device: &B::Device,
    ) -> Result<Self, ModelStoreError> {
        if config.num_features != NUM_FEATURES {
            return Err(ModelStoreError::FeatureMismatch {
                expected: NUM_FEATURES,
                found: config.num_features,
            });
        }

        Ok(Self {
            host: Arc::new(ModelHost::spawn(model)),
            config: Arc::new(config),
            device: device.clone(),
        })
    }

    pub fn num_classes(&self) -> usize {
        self.config.num_classes
    }

    pub fn class_names(&self) -> Option<&[String]> {
        self.config.class_names.as_deref()
    }

    /// Predicts one label per row. Blocks until the model host answers.
    pub fn predict(&self, table: &FeatureTable) -> Result<Prediction, ModelStoreError> {
        if table.is_empty() {
            return Ok(Prediction::default());
        }

        let rows = table.len();
        let values = table.to_flat();
        let device = self.device.clone();
        let indices = self.host.with(move |model| {
            let input =
                Tensor::<B, 2>::from_data(TensorData::new(values, [rows, NUM_FEATURES]), &device);
            model.classify(input)
        })?;

        if indices.len() != rows {
            return Err(ModelStoreError::Inference(format!(
                "model returned {} labels for {rows} rows",
                indices.len()
            )));
        }

        indices.into_iter().map(|index| self.label(index)).collect()
    }

    fn label(&self, index: usize) -> Result<Label, ModelStoreError> {
        match self.class_names() {
            None => Ok(Label::Index(index)),
            Some(names) => names
                .get(index)
                .map(|name| Label::Name(name.clone()))
                .ok_or(ModelStoreError::UnknownClass {
                    index,
                    known: names.len(),
                }),
        }
    }
}
