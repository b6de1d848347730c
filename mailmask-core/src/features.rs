//! # Engenharia de Features para NER
//!
//! Para cada token, extrai um vetor esparso de features binárias usado pelo
//! perceptron. As features capturam forma da palavra, contexto e presença em
//! gazetteers.
//!
//! ### Token atual
//! - Forma (lowercase), capitalização, prefixos/sufixos de 2 a 4 caracteres
//! - Dígitos, hífen, ponto, pontuação isolada, `@`
//!
//! ### Contexto (janela de 2 tokens)
//! - Palavras anterior e posterior, bigrama de contexto
//! - Capitalização dos vizinhos
//!
//! ### Gazetteers
//! - Primeiro nome conhecido, sobrenome conhecido, título, organização, local

use std::collections::{BTreeMap, HashSet};

use serde::{Deserialize, Serialize};

use crate::tokenizer::Token;

/// Vetor esparso de features de um token.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FeatureVector {
    /// Features ativas. Ex: `{"is_capitalized": 1.0, "word=alice": 1.0}`.
    /// Ordenadas, para que a soma dos pesos seja sempre na mesma ordem.
    pub features: BTreeMap<String, f64>,
    /// Índice do token original na sentença.
    pub token_index: usize,
}

impl FeatureVector {
    pub fn new(token_index: usize) -> Self {
        Self {
            features: BTreeMap::new(),
            token_index,
        }
    }

    /// Adiciona uma feature ao vetor.
    pub fn insert(&mut self, key: impl Into<String>, value: f64) {
        self.features.insert(key.into(), value);
    }

    pub fn contains(&self, key: &str) -> bool {
        self.features.contains_key(key)
    }
}

/// Listas de entidades conhecidas, em lowercase.
#[derive(Debug, Clone, Default)]
pub struct Gazetteers {
    pub first_names: HashSet<String>,
    pub surnames: HashSet<String>,
    pub titles: HashSet<String>,
    pub organizations: HashSet<String>,
    pub locations: HashSet<String>,
}

impl Gazetteers {
    pub fn new() -> Self {
        Self::default()
    }
}

/// Gera vetores de features para toda a sequência de tokens.
///
/// O índice `i` do retorno corresponde ao token `i` da entrada.
pub fn extract_features(tokens: &[Token], gazetteers: &Gazetteers) -> Vec<FeatureVector> {
    (0..tokens.len())
        .map(|i| extract_for_token(tokens, i, gazetteers))
        .collect()
}

fn is_capitalized(word: &str) -> bool {
    word.chars().next().map(|c| c.is_uppercase()).unwrap_or(false)
}

/// Extrai features para um único token em seu contexto
pub fn extract_for_token(tokens: &[Token], i: usize, gazetteers: &Gazetteers) -> FeatureVector {
    let mut fv = FeatureVector::new(i);
    let word = &tokens[i].text;
    let lower = word.to_lowercase();

    fv.insert(format!("word={lower}"), 1.0);
    fv.insert("bias", 1.0);

    // Capitalização
    let all_upper = word.chars().all(|c| c.is_uppercase() || !c.is_alphabetic());
    if is_capitalized(word) {
        fv.insert("is_capitalized", 1.0);
    }
    if all_upper && word.chars().count() > 1 && word.chars().any(char::is_alphabetic) {
        fv.insert("is_all_caps", 1.0);
    }
    if word.chars().skip(1).any(|c| c.is_uppercase()) {
        fv.insert("is_mixed_case", 1.0);
    }

    // Prefixos e sufixos
    let chars: Vec<char> = lower.chars().collect();
    for n in 2..=4 {
        if chars.len() >= n {
            let prefix: String = chars[..n].iter().collect();
            let suffix: String = chars[chars.len() - n..].iter().collect();
            fv.insert(format!("prefix{n}={prefix}"), 1.0);
            fv.insert(format!("suffix{n}={suffix}"), 1.0);
        }
    }

    // Padrões numéricos e de pontuação
    if word.chars().any(char::is_numeric) {
        fv.insert("has_digit", 1.0);
    }
    if word.chars().all(char::is_numeric) {
        fv.insert("is_digit", 1.0);
    }
    if word.contains('-') {
        fv.insert("has_hyphen", 1.0);
    }
    if word.contains('.') {
        fv.insert("has_period", 1.0);
    }
    if word.contains('@') {
        fv.insert("has_at", 1.0);
    }
    if word.chars().count() == 1 && !word.chars().all(char::is_alphanumeric) {
        fv.insert("is_punctuation", 1.0);
    }

    // Posição na sequência
    if i == 0 {
        fv.insert("is_first", 1.0);
    }
    if i + 1 == tokens.len() {
        fv.insert("is_last", 1.0);
    }

    // === Contexto ===
    if i > 0 {
        let prev = &tokens[i - 1].text;
        let prev_lower = prev.to_lowercase();
        fv.insert(format!("prev_word={prev_lower}"), 1.0);
        if is_capitalized(prev) {
            fv.insert("prev_is_capitalized", 1.0);
        }
        if gazetteers.titles.contains(prev_lower.trim_end_matches('.')) {
            fv.insert("prev_is_title", 1.0);
        }
        if gazetteers.first_names.contains(&prev_lower) {
            fv.insert("prev_in_first_names", 1.0);
        }
    } else {
        fv.insert("BOS", 1.0);
    }

    if i > 1 {
        fv.insert(format!("prev2_word={}", tokens[i - 2].text.to_lowercase()), 1.0);
    }

    if i + 1 < tokens.len() {
        let next = &tokens[i + 1].text;
        fv.insert(format!("next_word={}", next.to_lowercase()), 1.0);
        if is_capitalized(next) {
            fv.insert("next_is_capitalized", 1.0);
        }
    } else {
        fv.insert("EOS", 1.0);
    }

    if i + 2 < tokens.len() {
        fv.insert(format!("next2_word={}", tokens[i + 2].text.to_lowercase()), 1.0);
    }

    if i > 0 && i + 1 < tokens.len() {
        fv.insert(
            format!(
                "bigram={}_{}",
                tokens[i - 1].text.to_lowercase(),
                tokens[i + 1].text.to_lowercase()
            ),
            1.0,
        );
    }

    // === Gazetteers ===
    if gazetteers.first_names.contains(&lower) {
        fv.insert("in_first_names", 1.0);
    }
    if gazetteers.surnames.contains(&lower) {
        fv.insert("in_surnames", 1.0);
    }
    if gazetteers.titles.contains(lower.trim_end_matches('.')) {
        fv.insert("is_title", 1.0);
    }
    if gazetteers.organizations.contains(&lower) {
        fv.insert("in_org_gazetteer", 1.0);
    }
    if gazetteers.locations.contains(&lower) {
        fv.insert("in_location_gazetteer", 1.0);
    }

    fv
}
