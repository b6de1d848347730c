//! # Motor de Regras — Gazetteers e Pistas de Contexto
//!
//! Complementa o perceptron com conhecimento explícito sobre como nomes
//! aparecem em e-mails de suporte:
//!
//! - depois de um tratamento ("Mr.", "Dr.");
//! - depois de uma apresentação ("my name is", "this is", "I am");
//! - depois de uma despedida ("Regards,", "Thanks,");
//! - quando a palavra é um primeiro nome conhecido.
//!
//! Em todos os casos o nome só continua por palavras capitalizadas
//! (no máximo três tokens no total). Sufixos societários ("Ltd", "Corp")
//! marcam a palavra anterior como organização.

use std::collections::HashSet;

use serde::{Deserialize, Serialize};

use crate::features::Gazetteers;
use crate::tagger::{EntityCategory, Tag};
use crate::tokenizer::Token;

/// Uma correspondência de regra: qual token foi marcado e com qual tag
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RuleMatch {
    pub token_index: usize,
    pub tag: Tag,
    pub rule_name: String,
    pub confidence: f64,
}

/// Palavras capitalizadas que nunca fazem parte de um nome
const NOT_NAMES: &[&str] = &[
    "i", "hello", "hi", "hey", "dear", "thanks", "thank", "regards", "please", "team",
    "support", "the", "sir", "madam", "monday", "tuesday", "wednesday", "thursday", "friday",
    "saturday", "sunday", "january", "february", "march", "april", "may", "june", "july",
    "august", "september", "october", "november", "december", "urgent", "re", "fw",
];

/// Número máximo de tokens de um nome
const MAX_NAME_TOKENS: usize = 3;

/// Motor de regras para nomes de pessoas
pub struct RuleEngine {
    /// Primeiros nomes conhecidos (lowercase)
    first_names: HashSet<String>,
    /// Tratamentos, sem ponto (lowercase)
    titles: HashSet<String>,
    /// Sequências que antecedem um nome ("my name is")
    intro_cues: Vec<Vec<String>>,
    /// Despedidas que antecedem uma assinatura
    signoff_cues: Vec<String>,
    /// Palavras que indicam organização logo antes
    org_indicators: Vec<String>,
}

impl RuleEngine {
    pub fn new(gazetteers: &Gazetteers) -> Self {
        Self {
            first_names: gazetteers.first_names.clone(),
            titles: gazetteers.titles.clone(),
            intro_cues: [&["name", "is"][..], &["this", "is"], &["i", "am"], &["i'm"]]
                .iter()
                .map(|cue| cue.iter().map(|w| w.to_string()).collect())
                .collect(),
            signoff_cues: [
                "regards", "thanks", "sincerely", "cheers", "best", "warmly", "yours", "from",
            ]
            .iter()
            .map(|s| s.to_string())
            .collect(),
            org_indicators: ["inc", "inc.", "ltd", "ltd.", "llc", "corp", "corp.", "plc", "gmbh"]
                .iter()
                .map(|s| s.to_string())
                .collect(),
        }
    }

    pub fn add_first_name(&mut self, name: &str) {
        self.first_names.insert(name.to_lowercase());
    }

    /// Aplica todas as regras à sequência de tokens.
    ///
    /// Retorna um vetor alinhado com `tokens`; `None` onde nenhuma regra bateu.
    pub fn apply(&self, tokens: &[Token]) -> Vec<Option<RuleMatch>> {
        let mut result: Vec<Option<RuleMatch>> = vec![None; tokens.len()];

        // 1. Tratamento: "Dr. Meera Iyer"
        for i in 0..tokens.len().saturating_sub(1) {
            let lower = tokens[i].text.to_lowercase();
            if self.titles.contains(lower.trim_end_matches('.')) {
                mark_person(tokens, &mut result, i + 1, "title_pattern", 0.90);
            }
        }

        // 2. Apresentação: "my name is Alice Smith"
        for cue in &self.intro_cues {
            for i in 0..tokens.len() {
                let after = i + cue.len();
                if after >= tokens.len() {
                    break;
                }
                let matches = cue
                    .iter()
                    .enumerate()
                    .all(|(j, w)| tokens[i + j].text.to_lowercase() == *w);
                if matches {
                    mark_person(tokens, &mut result, after, "intro_pattern", 0.85);
                }
            }
        }

        // 3. Despedida: "Regards, Tom" (vírgula opcional)
        for i in 0..tokens.len() {
            if !self.signoff_cues.contains(&tokens[i].text.to_lowercase()) {
                continue;
            }
            let name_at = if tokens.get(i + 1).map(|t| t.text == ",").unwrap_or(false) {
                i + 2
            } else {
                i + 1
            };
            mark_person(tokens, &mut result, name_at, "signoff_pattern", 0.85);
        }

        // 4. Gazetteer de primeiros nomes
        for i in 0..tokens.len() {
            if self.first_names.contains(&tokens[i].text.to_lowercase()) {
                mark_person(tokens, &mut result, i, "first_name_gazetteer", 0.80);
            }
        }

        // 5. Sufixo societário: "Globex Ltd" → ORG
        for i in 1..tokens.len() {
            let lower = tokens[i].text.to_lowercase();
            if self.org_indicators.contains(&lower) && result[i - 1].is_none() && result[i].is_none() {
                if !is_capitalized(&tokens[i - 1].text) {
                    continue;
                }
                result[i - 1] = Some(RuleMatch {
                    token_index: i - 1,
                    tag: Tag::Begin(EntityCategory::Org),
                    rule_name: "org_suffix_pattern".to_string(),
                    confidence: 0.85,
                });
                result[i] = Some(RuleMatch {
                    token_index: i,
                    tag: Tag::Inside(EntityCategory::Org),
                    rule_name: "org_suffix_pattern".to_string(),
                    confidence: 0.85,
                });
            }
        }

        result
    }
}

fn is_capitalized(word: &str) -> bool {
    word.chars().next().map(|c| c.is_uppercase()).unwrap_or(false)
}

/// Capitalizada, alfabética (com hífen/apóstrofo) e fora da lista de exceções
fn is_name_like(token: &Token) -> bool {
    let text = &token.text;
    is_capitalized(text)
        && text.chars().all(|c| c.is_alphabetic() || c == '-' || c == '\'' || c == '\u{2019}')
        && !NOT_NAMES.contains(&text.to_lowercase().as_str())
}

/// Marca um nome a partir de `start`, estendendo por palavras capitalizadas.
///
/// Não sobrescreve tokens já marcados por outra regra.
fn mark_person(tokens: &[Token], result: &mut [Option<RuleMatch>], start: usize, rule: &str, confidence: f64) {
    if start >= tokens.len() || result[start].is_some() || !is_name_like(&tokens[start]) {
        return;
    }
    result[start] = Some(RuleMatch {
        token_index: start,
        tag: Tag::Begin(EntityCategory::Per),
        rule_name: rule.to_string(),
        confidence,
    });

    let mut j = start + 1;
    while j < tokens.len() && j < start + MAX_NAME_TOKENS && result[j].is_none() && is_name_like(&tokens[j]) {
        result[j] = Some(RuleMatch {
            token_index: j,
            tag: Tag::Inside(EntityCategory::Per),
            rule_name: rule.to_string(),
            confidence,
        });
        j += 1;
    }
}
