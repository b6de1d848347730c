//! # Contrato do Reconhecedor de Entidades (NER)
//!
//! O pipeline só precisa de uma coisa do NER: dado o texto bruto, uma lista de
//! entidades com categoria e intervalo `[start, end)` de bytes nesse mesmo
//! texto. Qualquer motor que cumpra [`EntityRecognizer`] serve, inclusive
//! dublês de teste. O motor embutido é o [`crate::model::NerModel`].

use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::RecognizerError;
use crate::span::{EntitySpan, FULL_NAME_LABEL};
use crate::tagger::EntityCategory;

/// Uma entidade devolvida pelo NER.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RecognizedEntity {
    /// Posição de byte inicial no texto (inclusiva)
    pub start: usize,
    /// Posição de byte final no texto (exclusiva)
    pub end: usize,
    pub category: EntityCategory,
    pub text: String,
    /// Origem: nome da regra, "perceptron" ou o nome do motor externo
    pub source: String,
}

/// Reconhecedor de entidades nomeadas.
///
/// Implementações devem ser puras do ponto de vista do chamador e seguras
/// para uso concorrente (o modelo é compartilhado entre requisições).
pub trait EntityRecognizer: Send + Sync {
    fn recognize(&self, text: &str) -> Result<Vec<RecognizedEntity>, RecognizerError>;

    /// Só as pessoas, já como spans `full_name`, na ordem de emissão.
    ///
    /// Um intervalo fora do texto é erro: seguir adiante deixaria o nome
    /// sem máscara.
    fn recognize_persons(&self, text: &str) -> Result<Vec<EntitySpan>, RecognizerError> {
        self.recognize(text)?
            .into_iter()
            .filter(|entity| entity.category == EntityCategory::Per)
            .map(|entity| {
                EntitySpan::from_range(text, entity.start, entity.end, FULL_NAME_LABEL).ok_or(
                    RecognizerError::InvalidSpan {
                        start: entity.start,
                        end: entity.end,
                        len: text.len(),
                    },
                )
            })
            .collect()
    }
}

/// Combinação de algoritmos usada pelo motor embutido.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RecognizerMode {
    /// Regras onde houver match; perceptron no resto
    #[default]
    Hybrid,
    /// Só gazetteers e padrões
    RulesOnly,
    /// Só o modelo estatístico
    PerceptronOnly,
}

impl FromStr for RecognizerMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "hybrid" => Ok(Self::Hybrid),
            "rules_only" | "rules" => Ok(Self::RulesOnly),
            "perceptron_only" | "perceptron" => Ok(Self::PerceptronOnly),
            other => Err(other.to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Fixed(Vec<RecognizedEntity>);

    impl EntityRecognizer for Fixed {
        fn recognize(&self, _text: &str) -> Result<Vec<RecognizedEntity>, RecognizerError> {
            Ok(self.0.clone())
        }
    }

    fn entity(start: usize, end: usize, category: EntityCategory, text: &str) -> RecognizedEntity {
        RecognizedEntity {
            start,
            end,
            category,
            text: text.to_string(),
            source: "fixed".to_string(),
        }
    }

    #[test]
    fn test_recognize_persons_filters_categories() {
        let text = "Bob from Acme";
        let recognizer = Fixed(vec![
            entity(0, 3, EntityCategory::Per, "Bob"),
            entity(9, 13, EntityCategory::Org, "Acme"),
        ]);

        let persons = recognizer.recognize_persons(text).unwrap();
        assert_eq!(persons.len(), 1);
        assert_eq!(persons[0].text, "Bob");
        assert_eq!(persons[0].category, "full_name");
    }

    #[test]
    fn test_out_of_range_span_is_an_error() {
        let recognizer = Fixed(vec![entity(0, 99, EntityCategory::Per, "Bob")]);
        let err = recognizer.recognize_persons("Bob").unwrap_err();
        assert!(matches!(err, RecognizerError::InvalidSpan { end: 99, .. }));
    }

    #[test]
    fn test_mode_from_str() {
        assert_eq!("hybrid".parse::<RecognizerMode>(), Ok(RecognizerMode::Hybrid));
        assert_eq!("rules_only".parse::<RecognizerMode>(), Ok(RecognizerMode::RulesOnly));
        assert_eq!("Perceptron".parse::<RecognizerMode>(), Ok(RecognizerMode::PerceptronOnly));
        assert!("crf".parse::<RecognizerMode>().is_err());
    }
}
