//! # Classificador de E-mails Mascarados
//!
//! O classificador recebe só o texto **já mascarado** e devolve uma categoria
//! (ex: "Incident", "Request"). Qualquer implementação de [`Classifier`]
//! serve; a embutida é um modelo linear sobre TF-IDF.
//!
//! ## Modelo
//!
//! 1. **Vetorização TF-IDF**: texto em lowercase, tokens `\b\w\w+\b`,
//!    contagem × idf, normalização L2. Termos fora do vocabulário somem.
//! 2. **Score linear um-contra-todos**: para cada classe,
//!    $s_c = w_c \cdot x + b_c$. Vence o maior score; empate fica com a
//!    classe que aparece primeiro no artefato.
//!
//! Os pesos vêm de um artefato JSON ([`ClassifierArtifact`]) lido uma vez na
//! inicialização. Artefato ilegível ou inconsistente é erro fatal.

use std::collections::{BTreeMap, HashSet};
use std::fs;
use std::path::Path;

use regex::Regex;
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::error::ClassifierError;

/// Padrão de token do vetorizador: palavras com 2+ caracteres de palavra
pub const TOKEN_PATTERN: &str = r"\b\w\w+\b";

/// Classificador de texto mascarado.
///
/// Compartilhado entre requisições; deve ser seguro para uso concorrente.
pub trait Classifier: Send + Sync {
    fn classify(&self, masked: &str) -> Result<String, ClassifierError>;
}

/// Pesos de uma classe no modelo um-contra-todos
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClassWeights {
    pub label: String,
    #[serde(default)]
    pub intercept: f64,
    /// Peso por termo; termos ausentes valem zero
    pub weights: BTreeMap<String, f64>,
}

/// Artefato serializado do classificador.
///
/// ```json
/// {
///   "vocabulary": { "password": 2.1, "crash": 1.7 },
///   "classes": [
///     { "label": "Request", "intercept": -0.1, "weights": { "password": 1.9 } },
///     { "label": "Incident", "intercept": 0.0, "weights": { "crash": 2.2 } }
///   ]
/// }
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClassifierArtifact {
    /// Termo -> idf suavizado
    pub vocabulary: BTreeMap<String, f64>,
    pub classes: Vec<ClassWeights>,
    #[serde(default = "default_true")]
    pub lowercase: bool,
    /// Usa `1 + ln(tf)` em vez da contagem bruta
    #[serde(default)]
    pub sublinear_tf: bool,
}

fn default_true() -> bool {
    true
}

impl ClassifierArtifact {
    pub fn from_json(json: &str) -> Result<Self, ClassifierError> {
        let artifact: Self = serde_json::from_str(json)?;
        artifact.validate()?;
        Ok(artifact)
    }

    pub fn from_path(path: impl AsRef<Path>) -> Result<Self, ClassifierError> {
        let json = fs::read_to_string(path.as_ref())?;
        Self::from_json(&json)
    }

    /// Confere a consistência interna do artefato.
    pub fn validate(&self) -> Result<(), ClassifierError> {
        if self.classes.is_empty() {
            return Err(ClassifierError::NoClasses);
        }
        if self.vocabulary.is_empty() {
            return Err(ClassifierError::InvalidArtifact("vocabulário vazio".to_string()));
        }
        if let Some((term, idf)) = self.vocabulary.iter().find(|(_, idf)| !idf.is_finite() || **idf <= 0.0) {
            return Err(ClassifierError::InvalidArtifact(format!(
                "idf inválido para '{term}': {idf}"
            )));
        }

        let mut seen = HashSet::new();
        for class in &self.classes {
            if class.label.trim().is_empty() {
                return Err(ClassifierError::InvalidArtifact("classe sem rótulo".to_string()));
            }
            if !seen.insert(class.label.as_str()) {
                return Err(ClassifierError::InvalidArtifact(format!(
                    "classe duplicada '{}'",
                    class.label
                )));
            }
            if !class.intercept.is_finite() {
                return Err(ClassifierError::InvalidArtifact(format!(
                    "intercepto inválido em '{}'",
                    class.label
                )));
            }
            for (term, weight) in &class.weights {
                if !self.vocabulary.contains_key(term) {
                    return Err(ClassifierError::InvalidArtifact(format!(
                        "termo '{term}' da classe '{}' fora do vocabulário",
                        class.label
                    )));
                }
                if !weight.is_finite() {
                    return Err(ClassifierError::InvalidArtifact(format!(
                        "peso inválido para '{term}' em '{}'",
                        class.label
                    )));
                }
            }
        }
        Ok(())
    }
}

/// Vetorizador TF-IDF com vocabulário fixo.
#[derive(Debug, Clone)]
pub struct TfidfVectorizer {
    token_pattern: Regex,
    idf: BTreeMap<String, f64>,
    lowercase: bool,
    sublinear_tf: bool,
}

impl TfidfVectorizer {
    pub fn new(idf: BTreeMap<String, f64>, lowercase: bool, sublinear_tf: bool) -> Result<Self, ClassifierError> {
        let token_pattern = Regex::new(TOKEN_PATTERN)
            .map_err(|e| ClassifierError::InvalidArtifact(e.to_string()))?;
        Ok(Self {
            token_pattern,
            idf,
            lowercase,
            sublinear_tf,
        })
    }

    pub fn vocabulary_len(&self) -> usize {
        self.idf.len()
    }

    /// Termos do texto que existem no vocabulário, com repetição
    pub fn analyze(&self, text: &str) -> Vec<String> {
        let text = if self.lowercase {
            std::borrow::Cow::Owned(text.to_lowercase())
        } else {
            std::borrow::Cow::Borrowed(text)
        };
        self.token_pattern
            .find_iter(&text)
            .map(|m| m.as_str())
            .filter(|term| self.idf.contains_key(*term))
            .map(str::to_string)
            .collect()
    }

    /// Vetor esparso normalizado (L2). Texto sem termos conhecidos dá vetor vazio.
    pub fn transform(&self, text: &str) -> BTreeMap<String, f64> {
        let mut counts: BTreeMap<String, f64> = BTreeMap::new();
        for term in self.analyze(text) {
            *counts.entry(term).or_insert(0.0) += 1.0;
        }

        let mut vector: BTreeMap<String, f64> = counts
            .into_iter()
            .map(|(term, tf)| {
                let tf = if self.sublinear_tf { 1.0 + tf.ln() } else { tf };
                let idf = self.idf.get(&term).copied().unwrap_or(0.0);
                (term, tf * idf)
            })
            .collect();

        let norm = vector.values().map(|v| v * v).sum::<f64>().sqrt();
        if norm > 0.0 {
            for value in vector.values_mut() {
                *value /= norm;
            }
        }
        vector
    }
}

/// Classificador linear um-contra-todos sobre TF-IDF.
#[derive(Debug, Clone)]
pub struct LinearTextClassifier {
    vectorizer: TfidfVectorizer,
    classes: Vec<ClassWeights>,
}

impl LinearTextClassifier {
    pub fn from_artifact(artifact: ClassifierArtifact) -> Result<Self, ClassifierError> {
        artifact.validate()?;
        let vectorizer = TfidfVectorizer::new(artifact.vocabulary, artifact.lowercase, artifact.sublinear_tf)?;
        info!(
            classes = artifact.classes.len(),
            vocabulary = vectorizer.vocabulary_len(),
            "classificador carregado"
        );
        Ok(Self {
            vectorizer,
            classes: artifact.classes,
        })
    }

    pub fn from_path(path: impl AsRef<Path>) -> Result<Self, ClassifierError> {
        Self::from_artifact(ClassifierArtifact::from_path(path)?)
    }

    /// Rótulos na ordem do artefato
    pub fn labels(&self) -> Vec<&str> {
        self.classes.iter().map(|c| c.label.as_str()).collect()
    }

    /// Score de cada classe: $w_c \cdot x + b_c$
    pub fn scores(&self, text: &str) -> Vec<(&str, f64)> {
        let x = self.vectorizer.transform(text);
        self.classes
            .iter()
            .map(|class| {
                let dot: f64 = x
                    .iter()
                    .filter_map(|(term, value)| class.weights.get(term).map(|w| w * value))
                    .sum();
                (class.label.as_str(), dot + class.intercept)
            })
            .collect()
    }
}

impl Classifier for LinearTextClassifier {
    fn classify(&self, masked: &str) -> Result<String, ClassifierError> {
        let mut best: Option<(&str, f64)> = None;
        for (label, score) in self.scores(masked) {
            match best {
                Some((_, best_score)) if score <= best_score => {}
                _ => best = Some((label, score)),
            }
        }
        best.map(|(label, _)| label.to_string())
            .ok_or(ClassifierError::NoClasses)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    const ARTIFACT: &str = r#"{
        "vocabulary": { "password": 1.5, "reset": 1.2, "crash": 2.0, "error": 1.4, "full_name": 1.0 },
        "classes": [
            { "label": "Request", "intercept": 0.0, "weights": { "password": 2.0, "reset": 2.0 } },
            { "label": "Incident", "intercept": 0.1, "weights": { "crash": 2.0, "error": 1.5 } }
        ]
    }"#;

    fn classifier() -> LinearTextClassifier {
        LinearTextClassifier::from_artifact(ClassifierArtifact::from_json(ARTIFACT).unwrap()).unwrap()
    }

    #[test]
    fn test_classify_by_terms() {
        let clf = classifier();
        assert_eq!(clf.classify("Please RESET my password, [full_name]").unwrap(), "Request");
        assert_eq!(clf.classify("The app shows an error and then a crash").unwrap(), "Incident");
    }

    #[test]
    fn test_unknown_text_falls_back_to_intercept() {
        // Sem termos conhecidos só o intercepto conta
        assert_eq!(classifier().classify("hello there").unwrap(), "Incident");
        assert_eq!(classifier().classify("").unwrap(), "Incident");
    }

    #[test]
    fn test_tfidf_is_l2_normalized() {
        let clf = classifier();
        let x = clf.vectorizer.transform("password password crash a");
        let norm: f64 = x.values().map(|v| v * v).sum::<f64>().sqrt();
        assert!((norm - 1.0).abs() < 1e-9);
        assert_eq!(x.len(), 2);
    }

    #[test]
    fn test_token_pattern_skips_single_chars() {
        let clf = classifier();
        assert_eq!(clf.vectorizer.analyze("a reset b [full_name]"), vec!["reset", "full_name"]);
    }

    #[test]
    fn test_empty_classes_rejected() {
        let err = ClassifierArtifact::from_json(r#"{ "vocabulary": { "x": 1.0 }, "classes": [] }"#).unwrap_err();
        assert!(matches!(err, ClassifierError::NoClasses));
    }

    #[test]
    fn test_unknown_weight_term_rejected() {
        let json = r#"{
            "vocabulary": { "reset": 1.0 },
            "classes": [ { "label": "Request", "weights": { "refund": 1.0 } } ]
        }"#;
        let err = ClassifierArtifact::from_json(json).unwrap_err();
        assert!(matches!(err, ClassifierError::InvalidArtifact(_)));
    }

    #[test]
    fn test_duplicate_label_rejected() {
        let json = r#"{
            "vocabulary": { "reset": 1.0 },
            "classes": [
                { "label": "Request", "weights": {} },
                { "label": "Request", "weights": {} }
            ]
        }"#;
        assert!(matches!(
            ClassifierArtifact::from_json(json),
            Err(ClassifierError::InvalidArtifact(_))
        ));
    }

    #[test]
    fn test_malformed_json() {
        assert!(matches!(
            ClassifierArtifact::from_json("{ not json"),
            Err(ClassifierError::Artifact(_))
        ));
    }

    #[test]
    fn test_load_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(ARTIFACT.as_bytes()).unwrap();

        let clf = LinearTextClassifier::from_path(file.path()).unwrap();
        assert_eq!(clf.labels(), vec!["Request", "Incident"]);
    }

    #[test]
    fn test_missing_file_is_io_error() {
        let dir = tempfile::tempdir().unwrap();
        let err = LinearTextClassifier::from_path(dir.path().join("missing.json")).unwrap_err();
        assert!(matches!(err, ClassifierError::Io(_)));
    }
}
