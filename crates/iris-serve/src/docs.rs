//! Swagger document describing the prediction routes.

use iris_model::Feature;
use serde_json::{Value, json};
use strum::IntoEnumIterator;

pub const SPEC_PATH: &str = "apispec_1.json";
pub const UPLOAD_FIELD: &str = "input_file";

pub fn api_spec() -> Value {
    let query_params = Feature::iter()
        .map(|feature| {
            json!({
                "name": feature.name(),
                "in": "query",
                "type": "number",
                "required": true,
                "description": feature.description(),
            })
        })
        .collect::<Vec<_>>();

    json!({
        "swagger": "2.0",
        "info": {
            "title": "iris-serve",
            "version": env!("CARGO_PKG_VERSION"),
            "description": "Predicts iris species from flower measurements.",
        },
        "paths": {
            "/predict": {
                "get": {
                    "summary": "Predict the class of one iris sample",
                    "produces": ["text/plain"],
                    "parameters": query_params,
                    "responses": {
                        "200": { "description": "Index of predicted class" },
                        "400": { "description": "Missing or non-numeric parameter" },
                        "500": { "description": "Inference or result log failure" },
                    },
                },
            },
            "/predict_file": {
                "post": {
                    "summary": "Predict the class of every row of a headerless CSV file",
                    "consumes": ["multipart/form-data"],
                    "produces": ["text/plain"],
                    "parameters": [{
                        "name": UPLOAD_FIELD,
                        "in": "formData",
                        "type": "file",
                        "required": true,
                    }],
                    "responses": {
                        "200": { "description": "Predicted class of every row, in input order" },
                        "400": { "description": "Missing upload or malformed CSV" },
                        "500": { "description": "Inference failure" },
                    },
                },
            },
        },
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn predict_parameters_follow_the_feature_order() {
        let spec = api_spec();
        let names = spec["paths"]["/predict"]["get"]["parameters"]
            .as_array()
            .unwrap()
            .iter()
            .map(|p| p["name"].as_str().unwrap().to_string())
            .collect::<Vec<_>>();
        assert_eq!(names, vec!["s_length", "s_width", "p_length", "p_width"]);
    }

    #[test]
    fn upload_is_a_required_form_file() {
        let spec = api_spec();
        let param = &spec["paths"]["/predict_file"]["post"]["parameters"][0];
        assert_eq!(param["name"], "input_file");
        assert_eq!(param["in"], "formData");
        assert_eq!(param["required"], true);
    }
}
