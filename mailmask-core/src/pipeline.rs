//! # Pipeline de Redação — Orquestrador
//!
//! Coordena os quatro estágios para um e-mail:
//!
//! 1. **Regras** ([`PatternMatcher`]) sobre o texto original;
//! 2. **NER** ([`EntityRecognizer`]) sobre o mesmo texto original, só pessoas;
//! 3. **Fusão e máscara** ([`Masker`]);
//! 4. **Classificação** ([`Classifier`]) do texto já mascarado.
//!
//! Se o NER falha, a requisição inteira falha antes de qualquer chamada ao
//! classificador: texto não mascarado nunca sai do pipeline.
//!
//! Todo o estado é somente leitura depois de construído, então um único
//! pipeline atende requisições concorrentes sem travas.

use std::sync::Arc;

use rayon::prelude::*;
use tracing::{debug, info};

use crate::classifier::{Classifier, LinearTextClassifier};
use crate::config::AppConfig;
use crate::error::{BuildError, Result};
use crate::masker::Masker;
use crate::model::NerModel;
use crate::pattern::{PatternMatcher, RuleTable};
use crate::recognizer::EntityRecognizer;
use crate::span::{ClassificationResult, MaskedDocument};

/// O pipeline principal.
pub struct RedactionPipeline {
    matcher: PatternMatcher,
    recognizer: Arc<dyn EntityRecognizer>,
    classifier: Arc<dyn Classifier>,
    masker: Masker,
}

impl RedactionPipeline {
    pub fn new(
        matcher: PatternMatcher,
        recognizer: Arc<dyn EntityRecognizer>,
        classifier: Arc<dyn Classifier>,
        masker: Masker,
    ) -> Self {
        Self {
            matcher,
            recognizer,
            classifier,
            masker,
        }
    }

    /// Monta o pipeline completo: regras, modelo NER treinado e classificador
    /// carregado do artefato configurado.
    pub fn from_config(config: &AppConfig) -> std::result::Result<Self, BuildError> {
        let table = match &config.rules {
            Some(specs) => RuleTable::compile(specs)?,
            None => RuleTable::default_table()?,
        };
        let classifier = LinearTextClassifier::from_path(&config.classifier.artifact)?;
        let model = NerModel::build(config.recognizer.mode, config.recognizer.perceptron_iterations);

        info!(
            rules = table.len(),
            strategy = ?config.masking.strategy,
            "pipeline montado"
        );

        Ok(Self::new(
            PatternMatcher::new(table),
            Arc::new(model),
            Arc::new(classifier),
            Masker::new(config.masking.strategy),
        ))
    }

    pub fn matcher(&self) -> &PatternMatcher {
        &self.matcher
    }

    pub fn masker(&self) -> Masker {
        self.masker
    }

    /// Detecta e mascara a PII de `text`.
    pub fn mask_pii(&self, text: &str) -> Result<MaskedDocument> {
        let pattern_spans = self.matcher.find_all(text);
        let person_spans = self.recognizer.recognize_persons(text)?;
        debug!(
            pattern_spans = pattern_spans.len(),
            person_spans = person_spans.len(),
            "candidatos encontrados"
        );
        Ok(self.masker.mask(text, &pattern_spans, &person_spans))
    }

    /// Mascara e classifica um e-mail.
    pub fn classify_email(&self, text: &str) -> Result<ClassificationResult> {
        let masked = self.mask_pii(text)?;
        let category = self.classifier.classify(&masked.redacted_text)?;

        info!(
            chars = text.chars().count(),
            entities = masked.annotations.len(),
            category = %category,
            "e-mail classificado"
        );

        Ok(ClassificationResult {
            list_of_masked_entities: masked.masked_entities(text),
            input_email_body: text.to_string(),
            masked_email: masked.redacted_text,
            category_of_the_email: category,
        })
    }

    /// Classifica vários e-mails em paralelo.
    ///
    /// Os resultados saem na ordem da entrada; a primeira falha derruba o lote.
    pub fn classify_batch<S>(&self, emails: &[S]) -> Result<Vec<ClassificationResult>>
    where
        S: AsRef<str> + Sync,
    {
        emails
            .par_iter()
            .map(|email| self.classify_email(email.as_ref()))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use std::sync::atomic::{AtomicBool, Ordering};

    use proptest::prelude::*;

    use crate::error::{ClassifierError, PipelineError, RecognizerError};
    use crate::masker::MaskStrategy;
    use crate::recognizer::{RecognizedEntity, RecognizerMode};
    use crate::tagger::EntityCategory;

    /// NER falso: devolve cada nome listado onde ele aparece
    struct Persons(Vec<&'static str>);

    impl EntityRecognizer for Persons {
        fn recognize(&self, text: &str) -> std::result::Result<Vec<RecognizedEntity>, RecognizerError> {
            Ok(self
                .0
                .iter()
                .filter_map(|name| {
                    text.find(name).map(|start| RecognizedEntity {
                        start,
                        end: start + name.len(),
                        category: EntityCategory::Per,
                        text: name.to_string(),
                        source: "fixed".to_string(),
                    })
                })
                .collect())
        }
    }

    struct Failing;

    impl EntityRecognizer for Failing {
        fn recognize(&self, _text: &str) -> std::result::Result<Vec<RecognizedEntity>, RecognizerError> {
            Err(RecognizerError::Failed("modelo indisponível".to_string()))
        }
    }

    /// Classificador que registra se foi chamado
    #[derive(Default)]
    struct Spy {
        called: AtomicBool,
    }

    impl Classifier for Spy {
        fn classify(&self, masked: &str) -> std::result::Result<String, ClassifierError> {
            self.called.store(true, Ordering::SeqCst);
            if masked.contains("password") {
                Ok("Request".to_string())
            } else {
                Ok("Incident".to_string())
            }
        }
    }

    struct Broken;

    impl Classifier for Broken {
        fn classify(&self, _masked: &str) -> std::result::Result<String, ClassifierError> {
            Err(ClassifierError::Failed("sem modelo".to_string()))
        }
    }

    fn pipeline_with(recognizer: Arc<dyn EntityRecognizer>, strategy: MaskStrategy) -> RedactionPipeline {
        RedactionPipeline::new(
            PatternMatcher::new(RuleTable::default_table().unwrap()),
            recognizer,
            Arc::new(Spy::default()),
            Masker::new(strategy),
        )
    }

    fn both_strategies() -> [MaskStrategy; 2] {
        [MaskStrategy::Substring, MaskStrategy::Offset]
    }

    #[test]
    fn test_email_and_phone() {
        for strategy in both_strategies() {
            let pipeline = pipeline_with(Arc::new(Persons(vec![])), strategy);
            let result = pipeline
                .classify_email("Contact me at jane.doe@example.com or 9876543210.")
                .unwrap();

            assert_eq!(result.masked_email, "Contact me at [email] or [phone_number].");
            let entities: Vec<(&str, &str, [usize; 2])> = result
                .list_of_masked_entities
                .iter()
                .map(|e| (e.classification.as_str(), e.entity.as_str(), e.position))
                .collect();
            assert_eq!(
                entities,
                vec![
                    ("email", "jane.doe@example.com", [14, 34]),
                    ("phone_number", "9876543210", [38, 48]),
                ]
            );
        }
    }

    #[test]
    fn test_card_run_masked_once() {
        let pipeline = pipeline_with(Arc::new(Persons(vec![])), MaskStrategy::Offset);
        let result = pipeline
            .classify_email("Please charge 4111 1111 1111 1111 today.")
            .unwrap();

        assert_eq!(result.masked_email, "Please charge [credit_debit_no] today.");
        assert_eq!(result.list_of_masked_entities.len(), 1);
        assert_eq!(result.list_of_masked_entities[0].classification, "credit_debit_no");
        assert_eq!(result.list_of_masked_entities[0].entity, "4111 1111 1111 1111");
    }

    #[test]
    fn test_person_from_recognizer() {
        for strategy in both_strategies() {
            let pipeline = pipeline_with(Arc::new(Persons(vec!["Alice Smith"])), strategy);
            let result = pipeline.classify_email("My name is Alice Smith.").unwrap();

            assert_eq!(result.masked_email, "My name is [full_name].");
            assert_eq!(result.list_of_masked_entities.len(), 1);
            assert_eq!(result.list_of_masked_entities[0].classification, "full_name");
            assert_eq!(result.list_of_masked_entities[0].entity, "Alice Smith");
            assert_eq!(result.list_of_masked_entities[0].position, [11, 22]);
        }
    }

    #[test]
    fn test_person_equal_to_pattern_match_is_suppressed() {
        for strategy in both_strategies() {
            let pipeline = pipeline_with(Arc::new(Persons(vec!["9876543210"])), strategy);
            let result = pipeline.classify_email("Reach me on 9876543210 please").unwrap();

            assert_eq!(result.masked_email, "Reach me on [phone_number] please");
            let labels: Vec<&str> = result
                .list_of_masked_entities
                .iter()
                .map(|e| e.classification.as_str())
                .collect();
            assert_eq!(labels, vec!["phone_number"]);
        }
    }

    #[test]
    fn test_no_pii_returns_input_unchanged() {
        let model = NerModel::build(RecognizerMode::RulesOnly, 0);
        let pipeline = pipeline_with(Arc::new(model), MaskStrategy::Offset);
        let body = "Thanks for the quick fix, everything works now.";
        let result = pipeline.classify_email(body).unwrap();

        assert!(result.list_of_masked_entities.is_empty());
        assert_eq!(result.masked_email, body);
        assert_eq!(result.input_email_body, body);
    }

    #[test]
    fn test_recognizer_failure_never_reaches_classifier() {
        let spy = Arc::new(Spy::default());
        let pipeline = RedactionPipeline::new(
            PatternMatcher::new(RuleTable::default_table().unwrap()),
            Arc::new(Failing),
            spy.clone(),
            Masker::default(),
        );

        let err = pipeline.classify_email("Call 9876543210").unwrap_err();
        assert!(matches!(err, PipelineError::Recognizer(RecognizerError::Failed(_))));
        assert!(!spy.called.load(Ordering::SeqCst));
        assert!(pipeline.mask_pii("Call 9876543210").is_err());
    }

    #[test]
    fn test_classifier_failure_propagates() {
        let pipeline = RedactionPipeline::new(
            PatternMatcher::new(RuleTable::default_table().unwrap()),
            Arc::new(Persons(vec![])),
            Arc::new(Broken),
            Masker::default(),
        );
        let err = pipeline.classify_email("hello").unwrap_err();
        assert!(matches!(err, PipelineError::Classifier(ClassifierError::Failed(_))));
    }

    #[test]
    fn test_classifier_sees_masked_text() {
        let pipeline = pipeline_with(Arc::new(Persons(vec![])), MaskStrategy::Offset);
        let result = pipeline.classify_email("reset my password, I'm at 9876543210").unwrap();
        assert_eq!(result.category_of_the_email, "Request");
        assert!(!result.masked_email.contains("9876543210"));
    }

    #[test]
    fn test_batch_keeps_input_order() {
        let pipeline = pipeline_with(Arc::new(Persons(vec![])), MaskStrategy::Offset);
        let emails = vec![
            "forgot my password",
            "server down since 09/24",
            "please reset password for 9876543210",
            "",
        ];
        let results = pipeline.classify_batch(&emails).unwrap();

        let categories: Vec<&str> = results.iter().map(|r| r.category_of_the_email.as_str()).collect();
        assert_eq!(categories, vec!["Request", "Incident", "Request", "Incident"]);
        for (result, email) in results.iter().zip(&emails) {
            assert_eq!(result.input_email_body, *email);
        }
    }

    #[test]
    fn test_batch_fails_on_first_error() {
        let pipeline = pipeline_with(Arc::new(Failing), MaskStrategy::Offset);
        assert!(pipeline.classify_batch(&["a", "b"]).is_err());
    }

    #[test]
    fn test_from_config_end_to_end() {
        let mut artifact = tempfile::NamedTempFile::new().unwrap();
        write!(
            artifact,
            r#"{{
                "vocabulary": {{ "password": 1.0, "crash": 1.0 }},
                "classes": [
                    {{ "label": "Request", "weights": {{ "password": 1.0 }} }},
                    {{ "label": "Incident", "weights": {{ "crash": 1.0 }} }}
                ]
            }}"#
        )
        .unwrap();

        let mut config = AppConfig::default();
        config.classifier.artifact = artifact.path().to_path_buf();
        config.recognizer.mode = RecognizerMode::RulesOnly;

        let pipeline = RedactionPipeline::from_config(&config).unwrap();
        let result = pipeline
            .classify_email("My name is Alice Smith, please reset my password.")
            .unwrap();

        assert_eq!(result.category_of_the_email, "Request");
        assert_eq!(result.masked_email, "My name is [full_name], please reset my password.");
        assert_eq!(pipeline.matcher().table().len(), 7);
    }

    #[test]
    fn test_from_config_missing_artifact() {
        let mut config = AppConfig::default();
        config.classifier.artifact = "/nonexistent/model.json".into();
        config.recognizer.mode = RecognizerMode::RulesOnly;
        assert!(matches!(
            RedactionPipeline::from_config(&config),
            Err(BuildError::Classifier(ClassifierError::Io(_)))
        ));
    }

    #[test]
    fn test_from_config_bad_rule() {
        let mut config = AppConfig::default();
        config.rules = Some(vec![crate::pattern::RuleSpec::new("broken", "(")]);
        assert!(matches!(
            RedactionPipeline::from_config(&config),
            Err(BuildError::Rules(_))
        ));
    }

    fn char_slice(text: &str, [start, end]: [usize; 2]) -> String {
        text.chars().skip(start).take(end - start).collect()
    }

    fn email_text() -> impl Strategy<Value = String> {
        proptest::string::string_regex("[0-9a-z /.-]{0,60}").unwrap()
    }

    proptest! {
        #[test]
        fn prop_entities_match_input_slice(text in email_text()) {
            for strategy in both_strategies() {
                let pipeline = pipeline_with(Arc::new(Persons(vec![])), strategy);
                let result = pipeline.classify_email(&text).unwrap();
                for entity in &result.list_of_masked_entities {
                    prop_assert_eq!(char_slice(&text, entity.position), entity.entity.clone());
                }
            }
        }

        #[test]
        fn prop_substring_leaves_no_literal(text in email_text()) {
            let pipeline = pipeline_with(Arc::new(Persons(vec![])), MaskStrategy::Substring);
            let result = pipeline.classify_email(&text).unwrap();
            for entity in &result.list_of_masked_entities {
                prop_assert!(!result.masked_email.contains(&entity.entity));
            }
        }

        #[test]
        fn prop_offset_spans_do_not_overlap(text in email_text()) {
            let pipeline = pipeline_with(Arc::new(Persons(vec![])), MaskStrategy::Offset);
            let result = pipeline.classify_email(&text).unwrap();
            let mut positions: Vec<[usize; 2]> =
                result.list_of_masked_entities.iter().map(|e| e.position).collect();
            positions.sort();
            for pair in positions.windows(2) {
                prop_assert!(pair[0][1] <= pair[1][0]);
            }
        }

        #[test]
        fn prop_output_is_deterministic(text in email_text()) {
            let pipeline = pipeline_with(Arc::new(NerModel::build(RecognizerMode::RulesOnly, 0)), MaskStrategy::Offset);
            let first = pipeline.classify_email(&text).unwrap();
            let second = pipeline.classify_email(&text).unwrap();
            prop_assert_eq!(first, second);
        }
    }
}
