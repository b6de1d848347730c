//! # Tipos de Erro
//!
//! Erros de configuração (regras, artefatos, arquivo TOML) são fatais na
//! inicialização. Erros por requisição ([`PipelineError`]) sobem até o chamador
//! sem resultados parciais: se o mascaramento falha, nada chega ao classificador.

use thiserror::Error;

/// Falha ao compilar a tabela de regras.
#[derive(Debug, Error)]
pub enum RuleError {
    /// Expressão regular malformada
    #[error("regra '{label}' tem padrão inválido: {source}")]
    InvalidPattern {
        label: String,
        #[source]
        source: regex::Error,
    },

    /// Regra sem rótulo (o placeholder ficaria `[]`)
    #[error("regra na posição {0} sem rótulo")]
    EmptyLabel(usize),
}

/// Falha do reconhecedor de entidades (colaborador NER).
#[derive(Debug, Error)]
pub enum RecognizerError {
    #[error("reconhecedor falhou: {0}")]
    Failed(String),

    /// O reconhecedor devolveu um intervalo fora do texto ou fora de fronteira de char
    #[error("span inválido {start}..{end} para texto de {len} bytes")]
    InvalidSpan { start: usize, end: usize, len: usize },
}

/// Falha ao carregar ou aplicar o classificador.
#[derive(Debug, Error)]
pub enum ClassifierError {
    #[error("erro de I/O ao ler artefato: {0}")]
    Io(#[from] std::io::Error),

    #[error("artefato do classificador malformado: {0}")]
    Artifact(#[from] serde_json::Error),

    #[error("artefato inconsistente: {0}")]
    InvalidArtifact(String),

    #[error("o classificador não tem classes")]
    NoClasses,

    #[error("classificação falhou: {0}")]
    Failed(String),
}

/// Falha ao montar a configuração do processo.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("erro de I/O ao ler configuração: {0}")]
    Io(#[from] std::io::Error),

    #[error("configuração TOML inválida: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("valor inválido para '{key}': {value}")]
    Invalid { key: String, value: String },
}

/// Falha ao montar o pipeline na inicialização (sempre fatal).
#[derive(Debug, Error)]
pub enum BuildError {
    #[error(transparent)]
    Rules(#[from] RuleError),

    #[error(transparent)]
    Classifier(#[from] ClassifierError),
}

/// Falha de uma requisição de classificação.
#[derive(Debug, Error)]
pub enum PipelineError {
    #[error(transparent)]
    Recognizer(#[from] RecognizerError),

    #[error(transparent)]
    Classifier(#[from] ClassifierError),
}

/// Result das operações do pipeline
pub type Result<T> = std::result::Result<T, PipelineError>;
