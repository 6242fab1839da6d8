//! Maps a [`FlightFeatures`] record onto the column layout a model was fitted on.
//!
//! Column names follow the training export: raw numeric fields keep their
//! name, categorical fields are one-hot encoded as `<field>_<CODE>`. Columns
//! that match nothing are filled with zero, and so are one-hot columns whose
//! category differs from the record's.

use crate::inference::features::FlightFeatures;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum NumericField {
    Month,
    Day,
    Hour,
    SchedDepTime,
    SchedArrTime,
    Distance,
    DepDelay,
}

impl NumericField {
    fn parse(name: &str) -> Option<Self> {
        match name {
            "month" => Some(NumericField::Month),
            "day" => Some(NumericField::Day),
            "hour" => Some(NumericField::Hour),
            "sched_dep_time" => Some(NumericField::SchedDepTime),
            "sched_arr_time" => Some(NumericField::SchedArrTime),
            "distance" => Some(NumericField::Distance),
            "dep_delay" => Some(NumericField::DepDelay),
            _ => None,
        }
    }

    fn value(self, f: &FlightFeatures) -> f64 {
        match self {
            NumericField::Month => f.month as f64,
            NumericField::Day => f.day as f64,
            NumericField::Hour => f.hour as f64,
            NumericField::SchedDepTime => f.sched_dep_time as f64,
            NumericField::SchedArrTime => f.sched_arr_time as f64,
            NumericField::Distance => f.distance,
            NumericField::DepDelay => f.dep_delay,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum CategoricalField {
    Carrier,
    Origin,
    Dest,
}

impl CategoricalField {
    const ALL: [CategoricalField; 3] = [
        CategoricalField::Carrier,
        CategoricalField::Origin,
        CategoricalField::Dest,
    ];

    fn prefix(self) -> &'static str {
        match self {
            CategoricalField::Carrier => "carrier_",
            CategoricalField::Origin => "origin_",
            CategoricalField::Dest => "dest_",
        }
    }

    fn value(self, f: &FlightFeatures) -> &str {
        match self {
            CategoricalField::Carrier => &f.carrier,
            CategoricalField::Origin => &f.origin,
            CategoricalField::Dest => &f.dest,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
enum Column {
    Numeric(NumericField),
    OneHot { field: CategoricalField, code: String },
    Unrecognized(String),
}

impl Column {
    fn parse(name: &str) -> Self {
        if let Some(field) = NumericField::parse(name) {
            return Column::Numeric(field);
        }
        for field in CategoricalField::ALL {
            if let Some(code) = name.strip_prefix(field.prefix()) {
                if !code.is_empty() {
                    return Column::OneHot {
                        field,
                        code: code.to_string(),
                    };
                }
            }
        }
        Column::Unrecognized(name.to_string())
    }
}

/// Precomputed encoding plan for one model's feature layout.
#[derive(Debug, Clone)]
pub struct FeatureEncoder {
    columns: Vec<Column>,
}

impl FeatureEncoder {
    pub fn new(feature_names: &[String]) -> Self {
        Self {
            columns: feature_names.iter().map(|n| Column::parse(n)).collect(),
        }
    }

    /// Number of columns produced by [`encode`](Self::encode).
    pub fn len(&self) -> usize {
        self.columns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.columns.is_empty()
    }

    /// Column names that will always encode to zero.
    pub fn unrecognized(&self) -> Vec<&str> {
        self.columns
            .iter()
            .filter_map(|c| match c {
                Column::Unrecognized(name) => Some(name.as_str()),
                _ => None,
            })
            .collect()
    }

    pub fn encode(&self, features: &FlightFeatures) -> Vec<f64> {
        self.columns
            .iter()
            .map(|column| match column {
                Column::Numeric(field) => field.value(features),
                Column::OneHot { field, code } => {
                    if field.value(features).eq_ignore_ascii_case(code) {
                        1.0
                    } else {
                        0.0
                    }
                }
                Column::Unrecognized(_) => 0.0,
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn names(list: &[&str]) -> Vec<String> {
        list.iter().map(|s| s.to_string()).collect()
    }

    fn sample() -> FlightFeatures {
        FlightFeatures {
            month: 7,
            day: 23,
            hour: 16,
            sched_dep_time: 1630,
            sched_arr_time: 1930,
            origin: "JFK".to_string(),
            dest: "LAX".to_string(),
            carrier: "DL".to_string(),
            distance: 3983.0,
            dep_delay: 10.0,
        }
    }

    #[test]
    fn test_numeric_columns_follow_layout_order() {
        let enc = FeatureEncoder::new(&names(&["dep_delay", "month", "sched_dep_time"]));
        assert_eq!(enc.encode(&sample()), vec![10.0, 7.0, 1630.0]);
    }

    #[test]
    fn test_one_hot_columns() {
        let enc = FeatureEncoder::new(&names(&[
            "carrier_AA",
            "carrier_DL",
            "origin_JFK",
            "origin_EWR",
            "dest_LAX",
        ]));
        assert_eq!(enc.encode(&sample()), vec![0.0, 1.0, 1.0, 0.0, 1.0]);
    }

    #[test]
    fn test_unseen_category_encodes_to_zeros() {
        let enc = FeatureEncoder::new(&names(&["carrier_AA", "carrier_UA"]));
        assert_eq!(enc.encode(&sample()), vec![0.0, 0.0]);
    }

    #[test]
    fn test_unrecognized_columns_are_zero() {
        let enc = FeatureEncoder::new(&names(&["month", "air_time", "carrier_"]));
        assert_eq!(enc.encode(&sample()), vec![7.0, 0.0, 0.0]);
        assert_eq!(enc.unrecognized(), vec!["air_time", "carrier_"]);
        assert_eq!(enc.len(), 3);
    }
}
