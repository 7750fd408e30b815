//! Evaluation summary: dataset -> model -> metric -> value

use std::collections::{BTreeMap, BTreeSet};
use std::fmt;
use std::path::Path;

use serde::de::{Deserialize, Deserializer, MapAccess, Visitor};
use serde_json::Value;
use tracing::debug;

use crate::error::{ErrorContext, ReportError, ReportResult, WithContext};

/// Metric values of one model on one dataset, keyed by metric name.
pub type ModelMetrics = BTreeMap<String, Value>;

/// Results of every model evaluated on a single dataset
#[derive(Debug, Clone, PartialEq)]
pub struct DatasetResults {
    pub name: String,
    pub models: BTreeMap<String, ModelMetrics>,
}

impl DatasetResults {
    pub fn model_names(&self) -> impl Iterator<Item = &str> {
        self.models.keys().map(String::as_str)
    }
}

/// Read-only evaluation summary. Datasets keep the order of the input file.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Summary {
    datasets: Vec<DatasetResults>,
}

impl Summary {
    /// Parse a summary from JSON text.
    pub fn from_json_str(json: &str) -> ReportResult<Self> {
        let entries: OrderedEntries = serde_json::from_str(json)?;
        Self::from_entries(entries.0)
    }

    fn from_entries(entries: Vec<(String, Value)>) -> ReportResult<Self> {
        let mut datasets = Vec::with_capacity(entries.len());

        for (dataset, value) in entries {
            let models_json = match value {
                Value::Object(models_json) => models_json,
                other => {
                    return Err(ReportError::invalid_data(&dataset, "an object of models", &other))
                }
            };

            let mut models = BTreeMap::new();
            for (model, metrics_json) in models_json {
                let metrics = match metrics_json {
                    Value::Object(metrics) => metrics,
                    other => {
                        return Err(ReportError::invalid_data(
                            &format!("{}/{}", dataset, model),
                            "an object of metrics",
                            &other,
                        ))
                    }
                };
                models.insert(model, metrics.into_iter().collect());
            }

            datasets.push(DatasetResults { name: dataset, models });
        }

        Ok(Self { datasets })
    }

    pub fn datasets(&self) -> &[DatasetResults] {
        &self.datasets
    }

    pub fn dataset(&self, name: &str) -> Option<&DatasetResults> {
        self.datasets.iter().find(|d| d.name == name)
    }

    pub fn dataset_names(&self) -> Vec<String> {
        self.datasets.iter().map(|d| d.name.clone()).collect()
    }

    /// Sorted union of model names across every dataset.
    pub fn model_names(&self) -> Vec<String> {
        let models: BTreeSet<&str> = self
            .datasets
            .iter()
            .flat_map(|d| d.model_names())
            .collect();
        debug!("Summary holds {} datasets and {} models", self.datasets.len(), models.len());
        models.into_iter().map(str::to_string).collect()
    }

    pub fn is_empty(&self) -> bool {
        self.datasets.is_empty()
    }

    /// Look up one metric value.
    ///
    /// Returns `Ok(None)` when the dataset, model or metric is absent, or when the
    /// value is `null`. A value that is present but not a number is an error.
    pub fn metric(&self, dataset: &str, model: &str, metric: &str) -> ReportResult<Option<f64>> {
        let value = self
            .dataset(dataset)
            .and_then(|d| d.models.get(model))
            .and_then(|m| m.get(metric));

        match value {
            None | Some(Value::Null) => Ok(None),
            Some(Value::Number(n)) => n.as_f64().map(Some).ok_or_else(|| {
                ReportError::InvalidData(format!(
                    "{}/{}/{}: {} is not representable as f64",
                    dataset, model, metric, n
                ))
            }),
            Some(other) => Err(ReportError::invalid_data(
                &format!("{}/{}/{}", dataset, model, metric),
                "a number",
                other,
            )),
        }
    }
}

/// Load the summary JSON file at `path`.
pub fn load_summary<P: AsRef<Path>>(path: P) -> ReportResult<Summary> {
    let path = path.as_ref();
    let content = std::fs::read_to_string(path).map_err(|e| ReportError::io_error(path, &e))?;

    let summary = Summary::from_json_str(&content).with_context(|| {
        ErrorContext::new("load_summary")
            .with_path(path)
            .with_suggestion("The top level must be an object keyed by dataset name")
    })?;

    tracing::info!("Loaded summary with {} datasets from {:?}", summary.datasets.len(), path);
    Ok(summary)
}

/// Top-level object entries in document order; a repeated key replaces the earlier value.
struct OrderedEntries(Vec<(String, Value)>);

impl<'de> Deserialize<'de> for OrderedEntries {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        struct EntriesVisitor;

        impl<'de> Visitor<'de> for EntriesVisitor {
            type Value = OrderedEntries;

            fn expecting(&self, f: &mut fmt::Formatter) -> fmt::Result {
                f.write_str("a JSON object keyed by dataset name")
            }

            fn visit_map<A>(self, mut map: A) -> Result<Self::Value, A::Error>
            where
                A: MapAccess<'de>,
            {
                let mut entries: Vec<(String, Value)> = Vec::with_capacity(map.size_hint().unwrap_or(0));
                while let Some((key, value)) = map.next_entry::<String, Value>()? {
                    match entries.iter_mut().find(|(k, _)| *k == key) {
                        Some(slot) => slot.1 = value,
                        None => entries.push((key, value)),
                    }
                }
                Ok(OrderedEntries(entries))
            }
        }

        deserializer.deserialize_map(EntriesVisitor)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorCode;
    use tempfile::tempdir;

    const SAMPLE: &str = r#"{
        "voc": {"yolo": {"mAP50": 0.71, "recall": 0.6}, "detr": {"mAP50": 0.68}},
        "coco": {"yolo": {"mAP50": 0.5}, "rcnn": {}}
    }"#;

    #[test]
    fn test_dataset_order_follows_file() {
        let summary = Summary::from_json_str(SAMPLE).unwrap();
        assert_eq!(summary.dataset_names(), vec!["voc", "coco"]);
    }

    #[test]
    fn test_model_names_sorted_union() {
        let summary = Summary::from_json_str(SAMPLE).unwrap();
        assert_eq!(summary.model_names(), vec!["detr", "rcnn", "yolo"]);
    }

    #[test]
    fn test_missing_metric_is_none() {
        let summary = Summary::from_json_str(SAMPLE).unwrap();
        assert_eq!(summary.metric("coco", "yolo", "mAP50").unwrap(), Some(0.5));
        assert_eq!(summary.metric("coco", "rcnn", "mAP50").unwrap(), None);
        assert_eq!(summary.metric("coco", "detr", "mAP50").unwrap(), None);
        assert_eq!(summary.metric("kitti", "yolo", "mAP50").unwrap(), None);
        assert_eq!(summary.metric("voc", "detr", "recall").unwrap(), None);
    }

    #[test]
    fn test_null_and_integer_values() {
        let summary = Summary::from_json_str(
            r#"{"coco": {"yolo": {"mAP50": null, "training_time_seconds": 3600}}}"#,
        )
        .unwrap();
        assert_eq!(summary.metric("coco", "yolo", "mAP50").unwrap(), None);
        assert_eq!(
            summary.metric("coco", "yolo", "training_time_seconds").unwrap(),
            Some(3600.0)
        );
    }

    #[test]
    fn test_non_numeric_metric_errors_only_when_read() {
        let summary = Summary::from_json_str(
            r#"{"coco": {"yolo": {"mAP50": 0.4, "weights": "best.pt"}}}"#,
        )
        .unwrap();
        assert_eq!(summary.metric("coco", "yolo", "mAP50").unwrap(), Some(0.4));

        let err = summary.metric("coco", "yolo", "weights").unwrap_err();
        assert_eq!(err.code(), ErrorCode::MalformedInput);
        assert!(err.to_string().contains("coco/yolo/weights"));
    }

    #[test]
    fn test_duplicate_dataset_key_last_wins_in_place() {
        let summary = Summary::from_json_str(
            r#"{"a": {"m": {"x": 1}}, "b": {}, "a": {"m": {"x": 2}}}"#,
        )
        .unwrap();
        assert_eq!(summary.dataset_names(), vec!["a", "b"]);
        assert_eq!(summary.metric("a", "m", "x").unwrap(), Some(2.0));
    }

    #[test]
    fn test_wrong_shape_is_rejected() {
        let top_level = Summary::from_json_str("[1, 2]").unwrap_err();
        assert!(matches!(top_level, ReportError::SerializationError(_)));

        let dataset = Summary::from_json_str(r#"{"coco": 3}"#).unwrap_err();
        assert!(dataset.to_string().contains("coco: expected an object of models, got a number"));

        let model = Summary::from_json_str(r#"{"coco": {"yolo": [0.5]}}"#).unwrap_err();
        assert!(model.to_string().contains("coco/yolo"));
    }

    #[test]
    fn test_empty_summary() {
        let summary = Summary::from_json_str("{}").unwrap();
        assert!(summary.is_empty());
        assert!(summary.model_names().is_empty());
    }

    #[test]
    fn test_load_summary_from_file() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("model_results_summary.json");
        std::fs::write(&path, SAMPLE).unwrap();

        let summary = load_summary(&path).unwrap();
        assert_eq!(summary.datasets().len(), 2);
        assert_eq!(summary.dataset("voc").unwrap().models.len(), 2);
    }

    #[test]
    fn test_load_summary_missing_file() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("absent.json");
        let err = load_summary(&path).unwrap_err();
        assert_eq!(err.code(), ErrorCode::IoFailed);
        assert!(err.to_string().contains("absent.json"));
    }

    #[test]
    fn test_load_summary_malformed_json() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("broken.json");
        std::fs::write(&path, r#"{"coco": {"#).unwrap();

        let err = load_summary(&path).unwrap_err();
        assert_eq!(err.code(), ErrorCode::MalformedInput);
        assert!(err.to_string().contains("Operation: load_summary"));
    }
}
