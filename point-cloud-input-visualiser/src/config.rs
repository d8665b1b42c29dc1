/// Dataset parameters merged from a base configuration and a user override.
use crate::error::{Result, VisuError};
use clap::ValueEnum;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fs;
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Split {
    Train,
    Test,
}

impl Split {
    pub fn as_str(&self) -> &'static str {
        match self {
            Split::Train => "train",
            Split::Test => "test",
        }
    }
}

/// Dataset-level options read from `default.json` and the user config.
/// Keys the tool does not recognise are ignored.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DatasetParams {
    /// Side of the square sampling column around each seed.
    pub box_size: f64,
    pub use_color: bool,
    /// Upper bound of the random dropout ratio applied to each input.
    pub input_dropout: f64,
    pub data_path: PathBuf,
    pub use_z_feature: bool,
}

impl DatasetParams {
    fn validate(&self) -> Result<()> {
        if !(self.box_size > 0.0) {
            return Err(VisuError::Config(format!(
                "box_size must be positive, got {}",
                self.box_size
            )));
        }
        if !(0.0..1.0).contains(&self.input_dropout) {
            return Err(VisuError::Config(format!(
                "input_dropout must be in [0, 1), got {}",
                self.input_dropout
            )));
        }
        Ok(())
    }
}

/// Shallow key-wise merge, values from `overrides` win on collision.
pub fn merge_overrides(base: &mut Value, overrides: Value) -> Result<()> {
    let base_map = base
        .as_object_mut()
        .ok_or_else(|| VisuError::Config("base configuration is not a JSON object".into()))?;
    let Value::Object(override_map) = overrides else {
        return Err(VisuError::Config(
            "user configuration is not a JSON object".into(),
        ));
    };

    for (key, value) in override_map {
        base_map.insert(key, value);
    }
    Ok(())
}

/// Parse and merge configuration documents already read into memory.
pub fn parse_params(base: &str, user: &str) -> Result<DatasetParams> {
    let mut merged: Value = serde_json::from_str(base)
        .map_err(|e| VisuError::Config(format!("failed to parse base configuration: {e}")))?;
    let overrides: Value = serde_json::from_str(user)
        .map_err(|e| VisuError::Config(format!("failed to parse user configuration: {e}")))?;
    merge_overrides(&mut merged, overrides)?;

    let params: DatasetParams = serde_json::from_value(merged)
        .map_err(|e| VisuError::Config(format!("invalid dataset parameters: {e}")))?;
    params.validate()?;
    Ok(params)
}

pub fn load_params(base_path: &Path, user_path: &Path) -> Result<DatasetParams> {
    let base = read_config(base_path)?;
    let user = read_config(user_path)?;
    parse_params(&base, &user)
}

fn read_config(path: &Path) -> Result<String> {
    fs::read_to_string(path)
        .map_err(|e| VisuError::Config(format!("failed to read {}: {e}", path.display())))
}

#[cfg(test)]
mod tests {
    use super::*;

    const BASE: &str = r#"{
        "box_size": 10.0,
        "use_color": true,
        "input_dropout": 0.875,
        "data_path": "data/base",
        "use_z_feature": false,
        "learning_rate": 0.001
    }"#;

    #[test]
    fn user_values_override_base() {
        let params = parse_params(BASE, r#"{"box_size": 5.0, "data_path": "data/user"}"#).unwrap();
        assert_eq!(params.box_size, 5.0);
        assert_eq!(params.data_path, PathBuf::from("data/user"));
        assert!(params.use_color);
    }

    #[test]
    fn empty_override_keeps_base() {
        let params = parse_params(BASE, "{}").unwrap();
        assert_eq!(params.input_dropout, 0.875);
        assert!(!params.use_z_feature);
    }

    #[test]
    fn non_object_override_is_rejected() {
        let err = parse_params(BASE, "[1, 2]").unwrap_err();
        assert!(matches!(err, VisuError::Config(_)));
    }

    #[test]
    fn missing_key_is_a_config_error() {
        let err = parse_params(r#"{"box_size": 1.0}"#, "{}").unwrap_err();
        assert!(matches!(err, VisuError::Config(_)));
    }

    #[test]
    fn out_of_range_dropout_is_rejected() {
        let err = parse_params(BASE, r#"{"input_dropout": 1.5}"#).unwrap_err();
        assert!(matches!(err, VisuError::Config(_)));
    }

    #[test]
    fn missing_file_is_a_config_error() {
        let err =
            load_params(Path::new("does/not/exist.json"), Path::new("nope.json")).unwrap_err();
        assert!(matches!(err, VisuError::Config(_)));
    }
}
