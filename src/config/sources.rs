//! Alias dictionary (`sources.yaml`)

use crate::error::{PipelineError, Result};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::Path;

/// Names and brands that identify one ticker in free text
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TickerAliases {
    pub names: Vec<String>,
    pub brands: Vec<String>,
}

impl TickerAliases {
    pub fn is_empty(&self) -> bool {
        self.names.iter().all(|s| s.trim().is_empty())
            && self.brands.iter().all(|s| s.trim().is_empty())
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SourcesConfig {
    /// ticker -> aliases, iterated in ticker order
    pub aliases: BTreeMap<String, Option<TickerAliases>>,
}

impl SourcesConfig {
    /// Load from YAML. A missing file yields an empty dictionary.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        if !path.exists() {
            log::warn!("⚠️  No sources file at {}, alias dictionary is empty", path.display());
            return Ok(Self::default());
        }

        let content = std::fs::read_to_string(path)?;
        if content.trim().is_empty() {
            return Ok(Self::default());
        }
        serde_yaml::from_str(&content).map_err(|source| PipelineError::Yaml {
            path: path.to_path_buf(),
            source,
        })
    }

    /// Tickers that carry at least one name or brand
    pub fn linkable(&self) -> impl Iterator<Item = (&str, &TickerAliases)> {
        self.aliases.iter().filter_map(|(ticker, aliases)| {
            aliases
                .as_ref()
                .filter(|a| !a.is_empty())
                .map(|a| (ticker.as_str(), a))
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_aliases() {
        let yaml = r#"
aliases:
  "005930":
    names: ["삼성전자", "Samsung Electronics"]
    brands: ["갤럭시"]
  "000660":
    names: ["SK하이닉스"]
  "999999": ~
  "111111":
    names: []
"#;
        let sources: SourcesConfig = serde_yaml::from_str(yaml).unwrap();
        let linkable: Vec<&str> = sources.linkable().map(|(t, _)| t).collect();

        assert_eq!(sources.aliases.len(), 4);
        assert_eq!(linkable, vec!["000660", "005930"]);
    }

    #[test]
    fn test_missing_file_is_empty() {
        let dir = tempfile::tempdir().unwrap();
        let sources = SourcesConfig::load(dir.path().join("sources.yaml")).unwrap();
        assert_eq!(sources.linkable().count(), 0);
    }
}
