//! Run configuration, loaded from a YAML file and merged with CLI overrides.

use eyre::{
    eyre,
    Result,
};
use serde::{
    Deserialize,
    Serialize,
};

/// The 6 GHz channel identifiers that denote an 80 MHz-wide channel.
fn default_channels() -> Vec<String> {
    [
        "133E", "53E", "117E", "149E", "165E", "181E", "213E", "37E", "101E", "69E", "197E", "85E", "21E",
    ]
    .iter()
    .map(|channel| channel.to_string())
    .collect()
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CensusConfig {
    /// Management API user, shared by both tiers.
    #[serde(default)]
    pub username: String,
    #[serde(default)]
    pub password: String,
    /// Top-tier mobility conductors to sweep. Controllers are discovered
    /// from these at runtime.
    pub conductors: Vec<String>,
    /// Channel identifiers counted by the aggregation step.
    #[serde(default = "default_channels")]
    pub channels: Vec<String>,
}

pub fn parse_config(path: &std::path::Path) -> Result<CensusConfig> {
    let bytes = std::fs::read(path)?;
    let content = String::from_utf8(bytes)?;
    let cfg = serde_yml::from_str::<CensusConfig>(&content)?;
    Ok(cfg)
}

impl CensusConfig {
    pub fn validate(&self) -> Result<()> {
        if self.conductors.is_empty() {
            return Err(eyre!("config.conductors must be non-empty"));
        }
        if self.username.is_empty() || self.password.is_empty() {
            return Err(eyre!(
                "credentials missing; set them in the config file or via --username/--password"
            ));
        }
        if self.channels.is_empty() {
            return Err(eyre!("config.channels must be non-empty"));
        }
        Ok(())
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn minimal_config_gets_the_default_channel_list() {
        let cfg = serde_yml::from_str::<CensusConfig>(
            "username: admin\npassword: secret\nconductors:\n  - 10.1.1.1\n  - 10.2.2.2\n",
        )
        .unwrap();

        assert_eq!(cfg.conductors, vec!["10.1.1.1", "10.2.2.2"]);
        assert_eq!(cfg.channels.len(), 13);
        assert!(cfg.channels.iter().any(|channel| channel == "149E"));
        cfg.validate().unwrap();
    }

    #[test]
    fn channel_list_can_be_overridden() {
        let cfg = serde_yml::from_str::<CensusConfig>(
            "username: admin\npassword: secret\nconductors: [10.1.1.1]\nchannels: [37E, 53E]\n",
        )
        .unwrap();

        assert_eq!(cfg.channels, vec!["37E", "53E"]);
    }

    #[test]
    fn validation_rejects_incomplete_configs() {
        let no_conductors = serde_yml::from_str::<CensusConfig>("username: a\npassword: b\nconductors: []\n").unwrap();
        assert!(no_conductors.validate().is_err());

        let no_credentials = serde_yml::from_str::<CensusConfig>("conductors: [10.1.1.1]\n").unwrap();
        assert!(no_credentials.validate().is_err());
    }
}
