//! # Configuração do Processo
//!
//! A configuração vem de três camadas, nesta ordem:
//!
//! 1. Valores padrão ([`AppConfig::default`]);
//! 2. Arquivo TOML opcional, apontado por `MAILMASK_CONFIG`;
//! 3. Variáveis de ambiente `MAILMASK_*`, que sobrescrevem o arquivo.
//!
//! ```toml
//! [server]
//! bind = "0.0.0.0:3000"
//!
//! [classifier]
//! artifact = "models/email_classifier.json"
//!
//! [masking]
//! strategy = "offset"          # ou "substring"
//!
//! [recognizer]
//! mode = "hybrid"              # "rules_only", "perceptron_only"
//! perceptron_iterations = 8
//!
//! [[rules]]                    # opcional: substitui a tabela padrão
//! label = "email"
//! pattern = '\b\S+@\S+\b'
//! ```
//!
//! Qualquer valor inválido é [`ConfigError`] e impede a inicialização.

use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;
use crate::masker::MaskStrategy;
use crate::model::DEFAULT_PERCEPTRON_ITERATIONS;
use crate::pattern::RuleSpec;
use crate::recognizer::RecognizerMode;

/// Prefixo das variáveis de ambiente.
pub const ENV_PREFIX: &str = "MAILMASK";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub bind: String,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind: "0.0.0.0:3000".to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ClassifierConfig {
    /// Caminho do artefato JSON do classificador
    pub artifact: PathBuf,
}

impl Default for ClassifierConfig {
    fn default() -> Self {
        Self {
            artifact: PathBuf::from("models/email_classifier.json"),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MaskingConfig {
    pub strategy: MaskStrategy,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RecognizerConfig {
    pub mode: RecognizerMode,
    pub perceptron_iterations: usize,
}

impl Default for RecognizerConfig {
    fn default() -> Self {
        Self {
            mode: RecognizerMode::default(),
            perceptron_iterations: DEFAULT_PERCEPTRON_ITERATIONS,
        }
    }
}

/// Configuração completa do processo.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub server: ServerConfig,
    pub classifier: ClassifierConfig,
    pub masking: MaskingConfig,
    pub recognizer: RecognizerConfig,
    /// Tabela de regras; `None` usa a padrão
    pub rules: Option<Vec<RuleSpec>>,
}

impl AppConfig {
    /// Carrega a configuração a partir das variáveis de ambiente do processo.
    pub fn load() -> Result<Self, ConfigError> {
        Self::load_with(&EnvConfig::default())
    }

    /// Carrega usando um leitor de ambiente específico.
    pub fn load_with(env: &EnvConfig) -> Result<Self, ConfigError> {
        let mut config = match env.get("CONFIG") {
            Some(path) => Self::from_path(path)?,
            None => Self::default(),
        };
        config.apply_env(env)?;
        config.validate()?;
        Ok(config)
    }

    pub fn from_toml_str(content: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(content)?)
    }

    pub fn from_path(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let content = fs::read_to_string(path.as_ref())?;
        Self::from_toml_str(&content)
    }

    /// Sobrescreve campos com as variáveis `MAILMASK_*` definidas.
    pub fn apply_env(&mut self, env: &EnvConfig) -> Result<(), ConfigError> {
        if let Some(bind) = env.get("BIND") {
            self.server.bind = bind;
        }
        if let Some(artifact) = env.get("CLASSIFIER_ARTIFACT") {
            self.classifier.artifact = PathBuf::from(artifact);
        }
        if let Some(strategy) = env.parse_required::<MaskStrategy>("MASK_STRATEGY")? {
            self.masking.strategy = strategy;
        }
        if let Some(mode) = env.parse_required::<RecognizerMode>("RECOGNIZER_MODE")? {
            self.recognizer.mode = mode;
        }
        if let Some(iterations) = env.parse_required::<usize>("PERCEPTRON_ITERATIONS")? {
            self.recognizer.perceptron_iterations = iterations;
        }
        Ok(())
    }

    /// Regras que o modo de operação exige.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.server.bind.trim().is_empty() {
            return Err(invalid("server.bind", &self.server.bind));
        }
        if self.classifier.artifact.as_os_str().is_empty() {
            return Err(invalid("classifier.artifact", ""));
        }
        if self.recognizer.mode != RecognizerMode::RulesOnly && self.recognizer.perceptron_iterations == 0 {
            return Err(invalid("recognizer.perceptron_iterations", "0"));
        }
        if matches!(&self.rules, Some(rules) if rules.is_empty()) {
            return Err(invalid("rules", "[]"));
        }
        Ok(())
    }
}

fn invalid(key: &str, value: &str) -> ConfigError {
    ConfigError::Invalid {
        key: key.to_string(),
        value: value.to_string(),
    }
}

/// Leitor de variáveis de ambiente com prefixo.
///
/// `get("BIND")` lê `MAILMASK_BIND`. Com [`EnvConfig::from_vars`] os valores
/// vêm de um mapa fixo em vez do processo.
#[derive(Debug, Clone)]
pub struct EnvConfig {
    prefix: String,
    vars: Option<HashMap<String, String>>,
}

impl Default for EnvConfig {
    fn default() -> Self {
        Self::new(ENV_PREFIX)
    }
}

impl EnvConfig {
    #[must_use]
    pub fn new(prefix: impl Into<String>) -> Self {
        Self {
            prefix: prefix.into(),
            vars: None,
        }
    }

    /// Leitor isolado do ambiente do processo (nomes completos, com prefixo).
    #[must_use]
    pub fn from_vars<K, V>(prefix: impl Into<String>, vars: impl IntoIterator<Item = (K, V)>) -> Self
    where
        K: Into<String>,
        V: Into<String>,
    {
        Self {
            prefix: prefix.into(),
            vars: Some(vars.into_iter().map(|(k, v)| (k.into(), v.into())).collect()),
        }
    }

    /// Nome completo da variável
    pub fn var_name(&self, name: &str) -> String {
        if self.prefix.is_empty() {
            name.to_uppercase()
        } else {
            format!("{}_{}", self.prefix, name.to_uppercase())
        }
    }

    /// Valor da variável; vazio conta como ausente.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<String> {
        let var_name = self.var_name(name);
        let value = match &self.vars {
            Some(vars) => vars.get(&var_name).cloned(),
            None => std::env::var(&var_name).ok(),
        };
        value.filter(|v| !v.trim().is_empty())
    }

    #[must_use]
    pub fn is_set(&self, name: &str) -> bool {
        self.get(name).is_some()
    }

    /// Valor convertido; valor presente e inválido é erro.
    pub fn parse_required<T: FromStr>(&self, name: &str) -> Result<Option<T>, ConfigError> {
        match self.get(name) {
            None => Ok(None),
            Some(raw) => raw
                .trim()
                .parse()
                .map(Some)
                .map_err(|_| invalid(&self.var_name(name), &raw)),
        }
    }
}
