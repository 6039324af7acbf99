use std::ffi::OsString;
use std::path::{Path, PathBuf};

use burn::config::Config;
use burn::module::{Module, Param};
use burn::nn::{Linear, LinearConfig};
use burn::prelude::Backend;
use burn::record::{FullPrecisionSettings, NamedMpkFileRecorder};
use burn::tensor::{Tensor, TensorData};

use crate::error::ModelStoreError;

#[derive(Config, Debug)]
pub struct IrisClassifierConfig {
    #[config(default = 4)]
    pub num_features: usize,
    #[config(default = 3)]
    pub num_classes: usize,
    /// Names reported instead of class indices, one per class.
    pub class_names: Option<Vec<String>>,
}

impl IrisClassifierConfig {
    pub fn init<B: Backend>(&self, device: &B::Device) -> IrisClassifier<B> {
        let linear = LinearConfig::new(self.num_features, self.num_classes).init(device);
        IrisClassifier { linear }
    }

    fn validate(&self) -> Result<(), String> {
        if self.num_features == 0 || self.num_classes == 0 {
            return Err("feature and class counts must be positive".to_string());
        }
        match &self.class_names {
            Some(names) if names.len() != self.num_classes => Err(format!(
                "{} class names given for {} classes",
                names.len(),
                self.num_classes
            )),
            _ => Ok(()),
        }
    }
}

/// Linear classifier over iris measurements: one score per class, highest wins.
#[derive(Module, Debug)]
pub struct IrisClassifier<B: Backend> {
    linear: Linear<B>,
}

impl<B: Backend> IrisClassifier<B> {
    /// Builds a classifier from explicit parameters.
    ///
    /// `weights` is row-major `[num_features, num_classes]`, `bias` has one
    /// entry per class.
    pub fn from_parameters(
        config: &IrisClassifierConfig,
        weights: Vec<f32>,
        bias: Vec<f32>,
        device: &B::Device,
    ) -> Result<Self, ModelStoreError> {
        let expected = config.num_features * config.num_classes;
        if weights.len() != expected || bias.len() != config.num_classes {
            return Err(ModelStoreError::InvalidParameters(format!(
                "expected {expected} weights and {} biases, got {} and {}",
                config.num_classes,
                weights.len(),
                bias.len()
            )));
        }

        let weight = Tensor::<B, 2>::from_data(
            TensorData::new(weights, [config.num_features, config.num_classes]),
            device,
        );
        let bias = Tensor::<B, 1>::from_data(TensorData::new(bias, [config.num_classes]), device);

        let mut linear = LinearConfig::new(config.num_features, config.num_classes).init(device);
        linear.weight = Param::from_tensor(weight);
        linear.bias = Some(Param::from_tensor(bias));

        Ok(Self { linear })
    }

    /// Class scores, shape `[rows, num_classes]`.
    pub fn forward(&self, features: Tensor<B, 2>) -> Tensor<B, 2> {
        self.linear.forward(features)
    }

    /// Index of the best scoring class for every row of `features`.
    pub fn classify(&self, features: Tensor<B, 2>) -> Vec<usize> {
        self.forward(features)
            .argmax(1)
            .into_data()
            .iter::<i64>()
            .map(|index| index as usize)
            .collect()
    }
}

/// Location of a serialized classifier: `<stem>.json` holds the config and
/// `<stem>.mpk` the module record.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ClassifierArtifact {
    stem: PathBuf,
}

impl ClassifierArtifact {
    pub fn new(stem: impl Into<PathBuf>) -> Self {
        Self { stem: stem.into() }
    }

    pub fn stem(&self) -> &Path {
        &self.stem
    }

    pub fn config_path(&self) -> PathBuf {
        self.with_suffix(".json")
    }

    pub fn record_path(&self) -> PathBuf {
        self.with_suffix(".mpk")
    }

    fn with_suffix(&self, suffix: &str) -> PathBuf {
        let mut path = OsString::from(self.stem.as_os_str());
        path.push(suffix);
        PathBuf::from(path)
    }

    pub fn load<B: Backend>(
        &self,
        device: &B::Device,
    ) -> Result<(IrisClassifierConfig, IrisClassifier<B>), ModelStoreError> {
        let config_path = self.config_path();
        let config = IrisClassifierConfig::load(&config_path).map_err(|e| ModelStoreError::Load {
            path: config_path.clone(),
            reason: e.to_string(),
        })?;
        config.validate().map_err(|reason| ModelStoreError::Load {
            path: config_path,
            reason,
        })?;

        let record_path = self.record_path();
        let recorder = NamedMpkFileRecorder::<FullPrecisionSettings>::new();
        let model = config
            .init::<B>(device)
            .load_file(record_path.clone(), &recorder, device)
            .map_err(|e| ModelStoreError::Load {
                path: record_path,
                reason: e.to_string(),
            })?;

        log::debug!("Loaded classifier artifact from {}", self.stem.display());
        Ok((config, model))
    }

    pub fn save<B: Backend>(
        &self,
        config: &IrisClassifierConfig,
        model: IrisClassifier<B>,
    ) -> Result<(), ModelStoreError> {
        let config_path = self.config_path();
        config
            .save(&config_path)
            .map_err(|e| ModelStoreError::Save {
                path: config_path,
                reason: e.to_string(),
            })?;

        let record_path = self.record_path();
        let recorder = NamedMpkFileRecorder::<FullPrecisionSettings>::new();
        model
            .save_file(record_path.clone(), &recorder)
            .map_err(|e| ModelStoreError::Save {
                path: record_path,
                reason: e.to_string(),
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing;
    use burn::backend::NdArray;

    type TestBackend = NdArray;
    type Device = <TestBackend as Backend>::Device;

    #[test]
    fn reference_classifier_separates_the_three_species() {
        let device = Device::default();
        let model = testing::reference_classifier::<TestBackend>(&device);

        let input = Tensor::<TestBackend, 2>::from_data(
            TensorData::new(
                vec![
                    5.1f32, 3.5, 1.4, 0.2, //
                    6.7, 3.1, 4.4, 1.4, //
                    6.3, 3.3, 6.0, 2.5,
                ],
                [3, 4],
            ),
            &device,
        );

        assert_eq!(model.classify(input), vec![0, 1, 2]);
    }

    #[test]
    fn parameters_must_match_the_config_shape() {
        let config = IrisClassifierConfig::new();
        let result = IrisClassifier::<TestBackend>::from_parameters(
            &config,
            vec![0.0; 4],
            vec![0.0; 3],
            &Device::default(),
        );
        assert!(matches!(result, Err(ModelStoreError::InvalidParameters(_))));
    }

    #[test]
    fn artifact_paths_append_extensions_to_the_stem() {
        let artifact = ClassifierArtifact::new("models/iris.v2");
        assert_eq!(artifact.config_path(), PathBuf::from("models/iris.v2.json"));
        assert_eq!(artifact.record_path(), PathBuf::from("models/iris.v2.mpk"));
    }

    #[test]
    fn artifact_round_trips_through_disk() {
        let dir = tempfile::tempdir().unwrap();
        let device = Device::default();
        let artifact = ClassifierArtifact::new(dir.path().join("iris_model"));

        let mut config = IrisClassifierConfig::new();
        config.class_names = Some(testing::species());
        artifact
            .save(&config, testing::reference_classifier::<TestBackend>(&device))
            .unwrap();

        let (loaded_config, model) = artifact.load::<TestBackend>(&device).unwrap();
        assert_eq!(loaded_config.class_names, Some(testing::species()));

        let input = Tensor::<TestBackend, 2>::from_data(
            TensorData::new(vec![6.3f32, 3.3, 6.0, 2.5], [1, 4]),
            &device,
        );
        assert_eq!(model.classify(input), vec![2]);
    }

    #[test]
    fn missing_artifact_fails_to_load() {
        let dir = tempfile::tempdir().unwrap();
        let artifact = ClassifierArtifact::new(dir.path().join("absent"));

        let err = artifact.load::<TestBackend>(&Device::default()).unwrap_err();
        assert!(matches!(err, ModelStoreError::Load { path, .. } if path == artifact.config_path()));
    }

    #[test]
    fn corrupt_record_fails_to_load() {
        let dir = tempfile::tempdir().unwrap();
        let artifact = ClassifierArtifact::new(dir.path().join("iris_model"));
        IrisClassifierConfig::new().save(artifact.config_path()).unwrap();
        std::fs::write(artifact.record_path(), b"not a record").unwrap();

        let err = artifact.load::<TestBackend>(&Device::default()).unwrap_err();
        assert!(matches!(err, ModelStoreError::Load { path, .. } if path == artifact.record_path()));
    }

    #[test]
    fn class_names_must_cover_every_class() {
        let dir = tempfile::tempdir().unwrap();
        let artifact = ClassifierArtifact::new(dir.path().join("iris_model"));
        let mut config = IrisClassifierConfig::new();
        config.class_names = Some(vec!["setosa".to_string()]);
        artifact
            .save(&config, testing::reference_classifier::<TestBackend>(&Default::default()))
            .unwrap();

        let err = artifact.load::<TestBackend>(&Device::default()).unwrap_err();
        assert!(matches!(err, ModelStoreError::Load { .. }));
    }
}
