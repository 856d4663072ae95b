//! Configuration loading
//!
//! Values come from the defaults below, then `sicct.toml` (or the file given
//! with `--config`), then `SICCT_` environment variables with `__` between
//! nested keys, e.g. `SICCT_CONTEXT__USER_ID`.

use std::path::{Path, PathBuf};

use figment::{
    Figment,
    providers::{Env, Format, Toml},
};
use serde::{Deserialize, Serialize};
use sicct_scenario::{ScenarioConfig, SessionContext};

/// Config file read when `--config` is not given
pub(crate) const DEFAULT_CONFIG_FILE: &str = "sicct.toml";

/// Environment variable prefix
pub(crate) const ENV_PREFIX: &str = "SICCT_";

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
#[serde(default)]
pub(crate) struct Config {
    pub(crate) card_handle: String,
    pub(crate) context: ContextConfig,
    pub(crate) scenario: ScenarioConfig,
    pub(crate) signing: SigningConfig,
    pub(crate) test_apdus: Vec<String>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            card_handle: "0000-1111".to_string(),
            context: ContextConfig::default(),
            scenario: ScenarioConfig::default(),
            signing: SigningConfig::default(),
            test_apdus: vec!["00A4040C".to_string()],
        }
    }
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
#[serde(default)]
pub(crate) struct ContextConfig {
    pub(crate) mandant_id: String,
    pub(crate) client_system_id: String,
    pub(crate) workplace_id: String,
    pub(crate) user_id: String,
}

impl Default for ContextConfig {
    fn default() -> Self {
        Self {
            mandant_id: "TestMandant".to_string(),
            client_system_id: "TestClientSystem".to_string(),
            workplace_id: "TestWorkplace".to_string(),
            user_id: "TestUser".to_string(),
        }
    }
}

impl From<ContextConfig> for SessionContext {
    fn from(context: ContextConfig) -> Self {
        Self::new(
            context.mandant_id,
            context.client_system_id,
            context.workplace_id,
            context.user_id,
        )
    }
}

/// PEM paths of the signing key and its certificate chain
#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq, Eq)]
#[serde(default)]
pub(crate) struct SigningConfig {
    pub(crate) key: Option<PathBuf>,
    pub(crate) certificates: Option<PathBuf>,
}

pub(crate) fn load_config(path: Option<&Path>) -> eyre::Result<Config> {
    let path = path.unwrap_or_else(|| Path::new(DEFAULT_CONFIG_FILE));
    Ok(figment(path).extract()?)
}

fn figment(path: &Path) -> Figment {
    Figment::new()
        .merge(Toml::file(path))
        .merge(Env::prefixed(ENV_PREFIX).split("__"))
}

#[cfg(test)]
mod tests {
    use figment::Jail;

    use super::*;

    #[test]
    fn test_defaults_without_file() {
        Jail::expect_with(|_jail| {
            let config: Config = figment(Path::new(DEFAULT_CONFIG_FILE)).extract()?;
            assert_eq!(config, Config::default());
            assert_eq!(config.card_handle, "0000-1111");
            assert_eq!(config.test_apdus, ["00A4040C"]);
            Ok(())
        });
    }

    #[test]
    fn test_file_and_env_layers() {
        Jail::expect_with(|jail| {
            jail.create_file(
                "sicct.toml",
                r#"
                    card_handle = "1234-5678"
                    test_apdus = ["00B00000"]

                    [context]
                    mandant_id = "Mandant-1"

                    [scenario]
                    type = "Custom"
                    expected_status_words = ["9000"]

                    [signing]
                    key = "keys/key.pem"
                "#,
            )?;
            jail.set_env("SICCT_CONTEXT__USER_ID", "env-user");

            let config: Config = figment(Path::new("sicct.toml")).extract()?;
            assert_eq!(config.card_handle, "1234-5678");
            assert_eq!(config.test_apdus, ["00B00000"]);
            assert_eq!(config.context.mandant_id, "Mandant-1");
            assert_eq!(config.context.workplace_id, "TestWorkplace");
            assert_eq!(config.context.user_id, "env-user");
            assert_eq!(config.scenario.doc_type, "Custom");
            assert_eq!(config.scenario.version, "1.0.0");
            assert_eq!(config.scenario.expected_status_words.len(), 1);
            assert_eq!(config.signing.key, Some(PathBuf::from("keys/key.pem")));
            assert_eq!(config.signing.certificates, None);
            Ok(())
        });
    }

    #[test]
    fn test_env_status_words_without_quotes() {
        Jail::expect_with(|jail| {
            jail.set_env("SICCT_SCENARIO__EXPECTED_STATUS_WORDS", "[9000, 6F00]");

            let config: Config = figment(Path::new("sicct.toml")).extract()?;
            let words: Vec<_> = config
                .scenario
                .expected_status_words
                .iter()
                .map(|sw| sw.to_hex())
                .collect();
            assert_eq!(words, ["9000", "6F00"]);
            Ok(())
        });
    }
}
