//! # mailmask-core — Mascaramento de PII e Classificação de E-mails de Suporte
//!
//! Este crate recebe o corpo de um e-mail de suporte, esconde os dados
//! pessoais (e-mail, telefone, cartão, Aadhaar, datas, nomes de pessoas) e
//! classifica o texto mascarado em uma categoria ("Incident", "Request", ...).
//!
//! ## Arquitetura do Sistema
//!
//! O texto passa por um pipeline linear:
//!
//! 1.  **Entrada**: corpo do e-mail (String).
//! 2.  **Regras** ([`pattern`]): tabela ordenada de expressões regulares, cada uma
//!     varrendo o texto original.
//! 3.  **NER** ([`recognizer`], [`model`]): nomes de pessoas, via regras de contexto
//!     ([`rule_based`]) e um perceptron médio ([`perceptron`]) treinado no
//!     [`corpus`] embutido.
//! 4.  **Fusão e máscara** ([`masker`]): troca cada trecho por `[<categoria>]`.
//! 5.  **Classificação** ([`classifier`]): TF-IDF + modelo linear sobre o texto
//!     mascarado.
//! 6.  **Saída**: [`ClassificationResult`].
//!
//! ## Exemplo de Uso
//!
//! ```rust
//! use mailmask_core::{Masker, PatternMatcher, RuleTable};
//!
//! let matcher = PatternMatcher::new(RuleTable::default_table().unwrap());
//! let text = "Contact me at jane.doe@example.com or 9876543210.";
//!
//! let spans = matcher.find_all(text);
//! let masked = Masker::default().mask(text, &spans, &[]);
//!
//! assert_eq!(masked.redacted_text, "Contact me at [email] or [phone_number].");
//! ```
//!
//! ## Módulos Principais
//!
//! - [`pipeline`]: orquestrador que conecta todos os estágios.
//! - [`config`]: configuração por arquivo TOML e variáveis `MAILMASK_*`.
//! - [`error`]: tipos de erro de cada estágio.

pub mod classifier;
pub mod config;
pub mod corpus;
pub mod error;
pub mod features;
pub mod masker;
pub mod model;
pub mod pattern;
pub mod perceptron;
pub mod pipeline;
pub mod recognizer;
pub mod rule_based;
pub mod span;
pub mod tagger;
pub mod tokenizer;

pub use classifier::{Classifier, ClassifierArtifact, LinearTextClassifier};
pub use config::AppConfig;
pub use error::{BuildError, PipelineError};
pub use masker::{MaskStrategy, Masker};
pub use model::NerModel;
pub use pattern::{PatternMatcher, RuleSpec, RuleTable};
pub use pipeline::RedactionPipeline;
pub use recognizer::{EntityRecognizer, RecognizedEntity, RecognizerMode};
pub use span::{ClassificationResult, EntitySpan, MaskedDocument, MaskedEntity};
pub use tokenizer::Token;
