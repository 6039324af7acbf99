//! Fixed-weight classifier for tests, available with the `testing` feature.

use burn::prelude::Backend;

use crate::classifier::{ClassifierArtifact, IrisClassifier, IrisClassifierConfig};

/// Species names in class index order.
pub fn species() -> Vec<String> {
    ["setosa", "versicolor", "virginica"]
        .into_iter()
        .map(String::from)
        .collect()
}

/// Linear classifier that only looks at petal length: setosa below 2.5 cm,
/// virginica above 4.9 cm, versicolor in between.
pub fn reference_classifier<B: Backend>(device: &B::Device) -> IrisClassifier<B> {
    #[rustfmt::skip]
    let weights = vec![
        0.0, 0.0, 0.0,
        0.0, 0.0, 0.0,
        -1.0, 0.0, 1.0,
        0.0, 0.0, 0.0,
    ];
    let bias = vec![0.0, -2.5, -7.4];

    IrisClassifier::from_parameters(&IrisClassifierConfig::new(), weights, bias, device)
        .expect("reference parameters match the default config")
}

/// Writes the reference classifier as an artifact at `artifact`.
pub fn write_reference_artifact<B: Backend>(
    artifact: &ClassifierArtifact,
    class_names: Option<Vec<String>>,
    device: &B::Device,
) {
    let mut config = IrisClassifierConfig::new();
    config.class_names = class_names;
    artifact
        .save(&config, reference_classifier::<B>(device))
        .expect("reference artifact can be written");
}
