use std::collections::HashMap;
use std::io::Read;

use strum::{Display, EnumIter, IntoEnumIterator, IntoStaticStr};

use crate::error::FeatureError;

/// Number of measurements in one iris sample.
pub const NUM_FEATURES: usize = 4;

/// The four iris measurements, in the column order the classifier expects.
///
/// The serialized names are the query parameter names of the single-record
/// endpoint.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Display, EnumIter, IntoStaticStr)]
pub enum Feature {
    #[strum(serialize = "s_length")]
    SepalLength,
    #[strum(serialize = "s_width")]
    SepalWidth,
    #[strum(serialize = "p_length")]
    PetalLength,
    #[strum(serialize = "p_width")]
    PetalWidth,
}

impl Feature {
    pub fn name(self) -> &'static str {
        self.into()
    }

    pub fn description(self) -> &'static str {
        match self {
            Feature::SepalLength => "Sepal length in cm",
            Feature::SepalWidth => "Sepal width in cm",
            Feature::PetalLength => "Petal length in cm",
            Feature::PetalWidth => "Petal width in cm",
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct FeatureVector(pub [f32; NUM_FEATURES]);

impl FeatureVector {
    /// Reads every [`Feature`] from a query parameter map.
    ///
    /// Values are trimmed and parsed as floats; the first missing or
    /// non-numeric parameter is reported.
    pub fn from_query(params: &HashMap<String, String>) -> Result<Self, FeatureError> {
        let mut values = [0.0; NUM_FEATURES];
        for (slot, feature) in values.iter_mut().zip(Feature::iter()) {
            let name = feature.name();
            let raw = params
                .get(name)
                .ok_or_else(|| FeatureError::MissingParameter(name.to_string()))?;
            *slot = parse_measurement(raw).ok_or_else(|| FeatureError::InvalidParameter {
                name: name.to_string(),
                value: raw.clone(),
            })?;
        }
        Ok(Self(values))
    }

    pub fn get(&self, feature: Feature) -> f32 {
        self.0[feature as usize]
    }
}

impl From<[f32; NUM_FEATURES]> for FeatureVector {
    fn from(values: [f32; NUM_FEATURES]) -> Self {
        Self(values)
    }
}

/// Rows of features predicted together.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct FeatureTable {
    rows: Vec<FeatureVector>,
}

impl FeatureTable {
    pub fn new(rows: Vec<FeatureVector>) -> Self {
        Self { rows }
    }

    /// Parses headerless comma separated rows of exactly [`NUM_FEATURES`] cells.
    ///
    /// Blank lines are skipped and do not count as records. Row numbers in
    /// errors are 1-based record numbers.
    pub fn from_csv<R: Read>(reader: R) -> Result<Self, FeatureError> {
        let mut reader = csv::ReaderBuilder::new()
            .has_headers(false)
            .flexible(true)
            .trim(csv::Trim::All)
            .from_reader(reader);

        let mut rows = Vec::new();
        for (index, record) in reader.records().enumerate() {
            let record = record?;
            let row = index + 1;

            if record.len() != NUM_FEATURES {
                return Err(FeatureError::ColumnCount {
                    row,
                    found: record.len(),
                    expected: NUM_FEATURES,
                });
            }

            let mut values = [0.0; NUM_FEATURES];
            for (column, (slot, cell)) in values.iter_mut().zip(record.iter()).enumerate() {
                *slot = parse_measurement(cell).ok_or_else(|| FeatureError::NonNumericCell {
                    row,
                    column: column + 1,
                    value: cell.to_string(),
                })?;
            }
            rows.push(FeatureVector(values));
        }

        Ok(Self { rows })
    }

    pub fn rows(&self) -> &[FeatureVector] {
        &self.rows
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Row-major values, `len() * NUM_FEATURES` long.
    pub fn to_flat(&self) -> Vec<f32> {
        self.rows.iter().flat_map(|row| row.0).collect()
    }
}

/// Finite float, surrounding whitespace ignored. `nan` and `inf` are rejected.
fn parse_measurement(raw: &str) -> Option<f32> {
    raw.trim().parse::<f32>().ok().filter(|value| value.is_finite())
}

impl From<FeatureVector> for FeatureTable {
    fn from(row: FeatureVector) -> Self {
        Self { rows: vec![row] }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    fn query(pairs: &[(&str, &str)]) -> HashMap<String, String> {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    #[test]
    fn query_parameters_map_to_feature_order() {
        let params = query(&[
            ("p_width", "0.2"),
            ("s_length", "5.1"),
            ("p_length", " 1.4 "),
            ("s_width", "3.5"),
        ]);
        let features = FeatureVector::from_query(&params).unwrap();
        assert_eq!(features, FeatureVector([5.1, 3.5, 1.4, 0.2]));
        assert_eq!(features.get(Feature::PetalLength), 1.4);
    }

    #[rstest]
    #[case("s_length")]
    #[case("s_width")]
    #[case("p_length")]
    #[case("p_width")]
    fn missing_parameter_is_reported(#[case] missing: &str) {
        let mut params = query(&[
            ("s_length", "5.1"),
            ("s_width", "3.5"),
            ("p_length", "1.4"),
            ("p_width", "0.2"),
        ]);
        params.remove(missing);

        let err = FeatureVector::from_query(&params).unwrap_err();
        assert!(matches!(err, FeatureError::MissingParameter(name) if name == missing));
    }

    #[rstest]
    #[case("wide")]
    #[case("nan")]
    #[case("NaN")]
    #[case("inf")]
    #[case("-infinity")]
    fn non_numeric_parameter_is_rejected(#[case] raw: &str) {
        let params = query(&[
            ("s_length", "5.1"),
            ("s_width", raw),
            ("p_length", "1.4"),
            ("p_width", "0.2"),
        ]);
        let err = FeatureVector::from_query(&params).unwrap_err();
        assert!(
            matches!(err, FeatureError::InvalidParameter { name, value } if name == "s_width" && value == raw)
        );
    }

    #[rstest]
    #[case("nan")]
    #[case("inf")]
    #[case("-Infinity")]
    fn csv_cells_must_be_finite(#[case] cell: &str) {
        let input = format!("5.1,3.5,1.4,0.2\n6.7,3.1,{cell},1.4\n");
        let err = FeatureTable::from_csv(input.as_bytes()).unwrap_err();
        assert!(matches!(
            err,
            FeatureError::NonNumericCell { row: 2, column: 3, value } if value == cell
        ));
    }

    #[rstest]
    #[case::crlf("5.1,3.5,1.4,0.2\r\n6.7,3.1,4.4\r\n")]
    #[case::blank_line("\n5.1,3.5,1.4,0.2\n\n6.7,3.1,4.4\n")]
    fn errors_report_the_record_number(#[case] input: &str) {
        let err = FeatureTable::from_csv(input.as_bytes()).unwrap_err();
        assert!(matches!(err, FeatureError::ColumnCount { row: 2, found: 3, .. }));
        assert_eq!(err.to_string(), "Record 2 has 3 columns, expected 4");
    }

    #[test]
    fn crlf_rows_are_parsed() {
        let input = "5.1,3.5,1.4,0.2\r\n6.3,3.3,6.0,2.5\r\n";
        let table = FeatureTable::from_csv(input.as_bytes()).unwrap();
        assert_eq!(table.rows()[1], FeatureVector([6.3, 3.3, 6.0, 2.5]));
    }

    #[test]
    fn csv_rows_are_parsed_in_order() {
        let input = "5.1,3.5,1.4,0.2\n6.7, 3.1, 4.4, 1.4\n\n6.3,3.3,6.0,2.5\n";
        let table = FeatureTable::from_csv(input.as_bytes()).unwrap();

        assert_eq!(table.len(), 3);
        assert_eq!(table.rows()[1], FeatureVector([6.7, 3.1, 4.4, 1.4]));
        assert_eq!(table.to_flat().len(), 12);
    }

    #[test]
    fn empty_csv_gives_an_empty_table() {
        let table = FeatureTable::from_csv("".as_bytes()).unwrap();
        assert!(table.is_empty());
    }

    #[rstest]
    #[case("5.1,3.5,1.4\n", 3)]
    #[case("5.1,3.5,1.4,0.2,9.9\n", 5)]
    fn csv_with_wrong_width_is_rejected(#[case] input: &str, #[case] width: usize) {
        let err = FeatureTable::from_csv(input.as_bytes()).unwrap_err();
        assert!(matches!(
            err,
            FeatureError::ColumnCount { row: 1, found, expected: NUM_FEATURES } if found == width
        ));
    }

    #[test]
    fn csv_width_is_checked_on_every_row() {
        let input = "5.1,3.5,1.4,0.2\n6.7,3.1,4.4\n";
        let err = FeatureTable::from_csv(input.as_bytes()).unwrap_err();
        assert!(matches!(err, FeatureError::ColumnCount { row: 2, found: 3, .. }));
    }

    #[test]
    fn csv_header_row_is_not_skipped() {
        let input = "s_length,s_width,p_length,p_width\n5.1,3.5,1.4,0.2\n";
        let err = FeatureTable::from_csv(input.as_bytes()).unwrap_err();
        assert!(matches!(
            err,
            FeatureError::NonNumericCell { row: 1, column: 1, value } if value == "s_length"
        ));
    }
}
