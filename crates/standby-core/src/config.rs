//! standby.toml configuration parser.

use serde::{Deserialize, Serialize};
use std::path::Path;

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AssignorConfig {
    #[serde(default)]
    pub assignor: AssignorSection,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AssignorSection {
    /// Standby replicas wanted per stateful task.
    #[serde(default)]
    pub num_standby_replicas: u32,
    /// Cap on active + standby tasks per process. No cap when absent.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_tasks_per_process: Option<u32>,
}

impl AssignorConfig {
    pub fn new(num_standby_replicas: u32) -> Self {
        Self {
            assignor: AssignorSection {
                num_standby_replicas,
                max_tasks_per_process: None,
            },
        }
    }

    pub fn with_max_tasks_per_process(mut self, max_tasks: u32) -> Self {
        self.assignor.max_tasks_per_process = Some(max_tasks);
        self
    }

    pub fn num_standby_replicas(&self) -> u32 {
        self.assignor.num_standby_replicas
    }

    pub fn max_tasks_per_process(&self) -> Option<u32> {
        self.assignor.max_tasks_per_process
    }

    pub fn from_file(path: &Path) -> anyhow::Result<Self> {
        let content = std::fs::read_to_string(path)?;
        Self::from_toml_str(&content)
    }

    pub fn from_toml_str(content: &str) -> anyhow::Result<Self> {
        let config: AssignorConfig = toml::from_str(content)?;
        Ok(config)
    }

    pub fn to_toml_string(&self) -> anyhow::Result<String> {
        Ok(toml::to_string_pretty(self)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_full() {
        let toml_str = r#"
[assignor]
num_standby_replicas = 2
max_tasks_per_process = 8
"#;
        let config = AssignorConfig::from_toml_str(toml_str).unwrap();
        assert_eq!(config.num_standby_replicas(), 2);
        assert_eq!(config.max_tasks_per_process(), Some(8));
    }

    #[test]
    fn test_empty_file_uses_defaults() {
        let config = AssignorConfig::from_toml_str("").unwrap();
        assert_eq!(config, AssignorConfig::default());
        assert_eq!(config.num_standby_replicas(), 0);
        assert_eq!(config.max_tasks_per_process(), None);
    }

    #[test]
    fn test_negative_replicas_rejected() {
        let toml_str = "[assignor]\nnum_standby_replicas = -1\n";
        assert!(AssignorConfig::from_toml_str(toml_str).is_err());
    }

    #[test]
    fn test_round_trip_through_toml() {
        let config = AssignorConfig::new(1).with_max_tasks_per_process(4);
        let toml_str = config.to_toml_string().unwrap();
        assert!(toml_str.contains("num_standby_replicas = 1"));
        assert_eq!(AssignorConfig::from_toml_str(&toml_str).unwrap(), config);
    }
}
