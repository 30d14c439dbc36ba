use bevy::log::Level;
use bevy::prelude::*;
use constants::loading::PROGRESS_HIDE_DELAY_SECS;
use constants::selection::BRIDGE_CHANNEL_NAME;
use serde::Serialize;

use crate::engine::assets::model_catalog::{ModelSelection, Subject, Variant};

/// Development mode shows the bridge diagnostic panel and logs at debug level.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ViewerMode {
    Dev,
    #[default]
    Prod,
}

impl ViewerMode {
    pub fn from_string(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "dev" | "development" => Some(Self::Dev),
            "prod" | "production" => Some(Self::Prod),
            _ => None,
        }
    }

    pub fn is_dev(&self) -> bool {
        matches!(self, Self::Dev)
    }
}

/// What happens to the selection when the model is swapped.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum SelectionOnSwap {
    /// Re-highlight surviving part identifiers on the new model.
    #[default]
    Carry,
    /// Empty the selection as soon as the old model is removed.
    Clear,
}

impl SelectionOnSwap {
    pub fn from_string(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "carry" | "keep" => Some(Self::Carry),
            "clear" | "reset" => Some(Self::Clear),
            _ => None,
        }
    }
}

/// Error types for configuration overrides.
#[derive(Debug, Clone, PartialEq)]
pub enum ConfigError {
    InvalidValue { key: String, value: String },
}

impl std::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ConfigError::InvalidValue { key, value } => {
                write!(f, "Invalid value '{}' for '{}', keeping default", value, key)
            }
        }
    }
}

impl std::error::Error for ConfigError {}

/// Viewer settings resolved once before the app is built.
#[derive(Resource, Debug, Clone, PartialEq, Serialize)]
pub struct ViewerConfig {
    pub mode: ViewerMode,
    pub asset_base_url: String,
    pub bridge_channel: String,
    pub initial_subject: Subject,
    pub initial_variant: Variant,
    pub selection_on_swap: SelectionOnSwap,
    pub progress_hide_delay: f32,
}

impl Default for ViewerConfig {
    fn default() -> Self {
        #[cfg(target_arch = "wasm32")]
        let asset_base_url = constants::model_catalog::ASSET_BASE_URL.to_string();
        #[cfg(not(target_arch = "wasm32"))]
        let asset_base_url = constants::model_catalog::NATIVE_ASSET_DIR.to_string();

        Self {
            mode: ViewerMode::default(),
            asset_base_url,
            bridge_channel: BRIDGE_CHANNEL_NAME.to_string(),
            initial_subject: Subject::default(),
            initial_variant: Variant::default(),
            selection_on_swap: SelectionOnSwap::default(),
            progress_hide_delay: PROGRESS_HIDE_DELAY_SECS,
        }
    }
}

impl ViewerConfig {
    /// Defaults, overridden by the page query string in web builds.
    pub fn load() -> (Self, Vec<ConfigError>) {
        #[cfg(target_arch = "wasm32")]
        let pairs = page_query_pairs();
        #[cfg(not(target_arch = "wasm32"))]
        let pairs: Vec<(String, String)> = Vec::new();

        Self::from_pairs(pairs)
    }

    pub fn from_pairs(pairs: impl IntoIterator<Item = (String, String)>) -> (Self, Vec<ConfigError>) {
        let mut config = Self::default();
        let errors = pairs
            .into_iter()
            .filter_map(|(key, value)| config.apply_override(&key, &value).err())
            .collect();
        (config, errors)
    }

    /// Apply one `key=value` override. Unknown keys are ignored.
    pub fn apply_override(&mut self, key: &str, value: &str) -> Result<(), ConfigError> {
        let invalid = || ConfigError::InvalidValue {
            key: key.to_string(),
            value: value.to_string(),
        };

        match key {
            "mode" => self.mode = ViewerMode::from_string(value).ok_or_else(invalid)?,
            "subject" => self.initial_subject = Subject::from_string(value).ok_or_else(invalid)?,
            "variant" => self.initial_variant = Variant::from_string(value).ok_or_else(invalid)?,
            "on_swap" => {
                self.selection_on_swap = SelectionOnSwap::from_string(value).ok_or_else(invalid)?
            }
            "channel" => {
                if value.is_empty() {
                    return Err(invalid());
                }
                self.bridge_channel = value.to_string();
            }
            _ => {}
        }
        Ok(())
    }

    pub fn initial_selection(&self) -> ModelSelection {
        ModelSelection::new(self.initial_subject, self.initial_variant)
    }

    /// Absolute location of a model file, as requested from the asset root.
    pub fn model_url(&self, file: &str) -> String {
        format!("{}/{}", self.asset_base_url.trim_end_matches('/'), file)
    }

    pub fn log_level(&self) -> Level {
        if self.mode.is_dev() {
            Level::DEBUG
        } else {
            Level::INFO
        }
    }

    pub fn log_filter(&self) -> String {
        "wgpu=error,naga=warn,bevy_render=info".to_string()
    }
}

/// Split a `?a=b&c=d` query string into key/value pairs.
///
/// `+` becomes a space before `decode` undoes the percent-encoding.
pub fn parse_query(search: &str, decode: impl Fn(&str) -> String) -> Vec<(String, String)> {
    let component = |raw: &str| decode(&raw.replace('+', " "));
    search
        .trim_start_matches('?')
        .split('&')
        .filter(|pair| !pair.is_empty())
        .map(|pair| {
            let (key, value) = pair.split_once('=').unwrap_or((pair, ""));
            (component(key), component(value))
        })
        .collect()
}

/// Percent-decode a query component, keeping it as is when malformed.
#[cfg(target_arch = "wasm32")]
fn decode_component(raw: &str) -> String {
    js_sys::decode_uri_component(raw)
        .ok()
        .and_then(|decoded| decoded.as_string())
        .unwrap_or_else(|| raw.to_string())
}

#[cfg(target_arch = "wasm32")]
fn page_query_pairs() -> Vec<(String, String)> {
    web_sys::window()
        .and_then(|window| window.location().search().ok())
        .map(|search| parse_query(&search, decode_component))
        .unwrap_or_default()
}

/// Overrides rejected while building the configuration, reported once logging is up.
#[derive(Resource, Default)]
pub struct ConfigWarnings(pub Vec<ConfigError>);

pub fn report_config(config: Res<ViewerConfig>, warnings: Res<ConfigWarnings>) {
    match serde_json::to_string(&*config) {
        Ok(json) => info!("Viewer config: {}", json),
        Err(error) => warn!("Viewer config could not be encoded: {}", error),
    }
    for warning in &warnings.0 {
        warn!("{}", warning);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pairs(query: &str) -> Vec<(String, String)> {
        parse_query(query, str::to_string)
    }

    #[test]
    fn defaults_to_production_male_normal() {
        let config = ViewerConfig::default();
        assert_eq!(config.mode, ViewerMode::Prod);
        assert_eq!(config.bridge_channel, "FlutterChannel");
        assert_eq!(config.initial_selection().file(), Some("man_normal.glb"));
        assert_eq!(config.selection_on_swap, SelectionOnSwap::Carry);
    }

    #[test]
    fn query_overrides_apply() {
        let (config, errors) =
            ViewerConfig::from_pairs(pairs("?mode=dev&subject=female&variant=colored&on_swap=clear"));
        assert!(errors.is_empty());
        assert!(config.mode.is_dev());
        assert_eq!(config.initial_selection().file(), Some("woman_colored.glb"));
        assert_eq!(config.selection_on_swap, SelectionOnSwap::Clear);
        assert_eq!(config.log_level(), Level::DEBUG);
    }

    #[test]
    fn invalid_values_keep_defaults_and_are_reported() {
        let (config, errors) = ViewerConfig::from_pairs(pairs("mode=loud&channel=&utm_source=x"));
        assert_eq!(config.mode, ViewerMode::Prod);
        assert_eq!(config.bridge_channel, "FlutterChannel");
        assert_eq!(errors.len(), 2);
        assert_eq!(
            errors[0],
            ConfigError::InvalidValue {
                key: "mode".into(),
                value: "loud".into()
            }
        );
    }

    #[test]
    fn model_url_joins_without_double_slash() {
        let config = ViewerConfig {
            asset_base_url: "https://example.org/assets/".into(),
            ..default()
        };
        assert_eq!(
            config.model_url("man_colored.glb"),
            "https://example.org/assets/man_colored.glb"
        );
    }

    #[test]
    fn parse_query_handles_flags_and_empty_input() {
        assert!(pairs("").is_empty());
        assert!(pairs("?").is_empty());
        assert_eq!(
            pairs("debug&mode=dev"),
            vec![
                ("debug".to_string(), String::new()),
                ("mode".to_string(), "dev".to_string())
            ]
        );
    }

    #[test]
    fn query_components_are_decoded() {
        let decode = |raw: &str| raw.replace("%20", " ").replace("%3D", "=");
        let pairs = parse_query("?channel=My%20Channel&note=a+b%3Dc", decode);
        assert_eq!(
            pairs,
            vec![
                ("channel".to_string(), "My Channel".to_string()),
                ("note".to_string(), "a b=c".to_string())
            ]
        );

        let (config, errors) = ViewerConfig::from_pairs(pairs);
        assert!(errors.is_empty());
        assert_eq!(config.bridge_channel, "My Channel");
    }
}
