//! # Modelo NER Embutido
//!
//! O modelo encapsula:
//! - **Gazetteers** compilados do corpus + listas fixas de nomes e tratamentos
//! - **Motor de Regras** para pistas de contexto típicas de e-mail
//! - **Perceptron médio** treinado no corpus ao construir o modelo
//!
//! No modo híbrido, a tag de uma regra vence; o perceptron decide os tokens
//! que nenhuma regra cobriu. O treino é determinístico, então duas
//! construções com os mesmos parâmetros produzem o mesmo modelo.

use tracing::{debug, info};

use crate::corpus::{build_gazetteers, get_corpus};
use crate::error::RecognizerError;
use crate::features::Gazetteers;
use crate::perceptron::PerceptronModel;
use crate::recognizer::{EntityRecognizer, RecognizedEntity, RecognizerMode};
use crate::rule_based::RuleEngine;
use crate::tagger::{tokens_to_spans, Tag, TaggedToken};
use crate::tokenizer::tokenize;

/// Iterações de treino quando nada é configurado
pub const DEFAULT_PERCEPTRON_ITERATIONS: usize = 8;

/// O modelo NER completo, agregando regras, perceptron e gazetteers.
pub struct NerModel {
    pub perceptron: PerceptronModel,
    pub rule_engine: RuleEngine,
    gazetteers: Gazetteers,
    mode: RecognizerMode,
}

impl NerModel {
    /// Constrói o modelo e treina o perceptron no corpus embutido.
    ///
    /// Em `RulesOnly` o treino é pulado.
    pub fn build(mode: RecognizerMode, iterations: usize) -> Self {
        let gazetteers = build_gazetteers();
        let rule_engine = RuleEngine::new(&gazetteers);

        let mut perceptron = PerceptronModel::new();
        if mode != RecognizerMode::RulesOnly {
            let corpus = get_corpus();
            perceptron.train(&corpus, iterations, &gazetteers);
            info!(
                sentences = corpus.len(),
                iterations,
                tags = perceptron.tags().len(),
                "perceptron treinado"
            );
        }
        info!(?mode, first_names = gazetteers.first_names.len(), "modelo NER pronto");

        Self {
            perceptron,
            rule_engine,
            gazetteers,
            mode,
        }
    }

    pub fn mode(&self) -> RecognizerMode {
        self.mode
    }

    pub fn gazetteers(&self) -> &Gazetteers {
        &self.gazetteers
    }

    /// Tokeniza e atribui uma tag BIO a cada token, registrando a origem.
    pub fn tag(&self, text: &str) -> Vec<TaggedToken> {
        let tokens = tokenize(text);
        if tokens.is_empty() {
            return Vec::new();
        }

        let rule_matches = match self.mode {
            RecognizerMode::PerceptronOnly => vec![None; tokens.len()],
            _ => self.rule_engine.apply(&tokens),
        };
        let predicted = match self.mode {
            RecognizerMode::RulesOnly => vec![Tag::Outside; tokens.len()],
            _ => self.perceptron.predict(&tokens, &self.gazetteers),
        };

        let rule_hits = rule_matches.iter().filter(|m| m.is_some()).count();
        debug!(tokens = tokens.len(), rule_hits, "tokens rotulados");

        tokens
            .into_iter()
            .zip(rule_matches)
            .zip(predicted)
            .map(|((token, rule), predicted)| match rule {
                Some(rule) => TaggedToken {
                    token,
                    tag: rule.tag,
                    source: rule.rule_name,
                },
                None => TaggedToken {
                    token,
                    tag: predicted,
                    source: "perceptron".to_string(),
                },
            })
            .collect()
    }
}

impl Default for NerModel {
    fn default() -> Self {
        Self::build(RecognizerMode::default(), DEFAULT_PERCEPTRON_ITERATIONS)
    }
}

impl EntityRecognizer for NerModel {
    fn recognize(&self, text: &str) -> Result<Vec<RecognizedEntity>, RecognizerError> {
        let tagged = self.tag(text);
        Ok(tokens_to_spans(&tagged, text))
    }
}
