use serde::{Deserialize, Serialize};

pub trait ConfigSerializer<TConfig> {
    fn serialize(&self, config: &TConfig) -> Result<String, String>;
    fn deserialize(&self, content: &str) -> Result<TConfig, String>;
}

#[derive(Clone, Copy, Debug, Default)]
pub struct YamlConfigSerializer;

impl<TConfig> ConfigSerializer<TConfig> for YamlConfigSerializer
where
    TConfig: for<'de> Deserialize<'de> + Serialize,
{
    fn serialize(&self, config: &TConfig) -> Result<String, String> {
        serde_yaml_ng::to_string(config).map_err(|e| format!("Failed to write YAML config: {}", e))
    }

    /// A blank or comment-only file reads as an empty mapping, so
    /// `#[serde(default)]` configs come back as their defaults.
    fn deserialize(&self, content: &str) -> Result<TConfig, String> {
        let has_values = content
            .lines()
            .map(str::trim)
            .any(|line| !line.is_empty() && !line.starts_with('#'));
        let content = if has_values { content } else { "{}" };

        serde_yaml_ng::from_str(content).map_err(|e| format!("Invalid YAML config: {}", e))
    }
}
