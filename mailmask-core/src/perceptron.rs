//! # Averaged Perceptron para NER
//!
//! Algoritmo online simples e eficiente, treinado no corpus embutido de
//! e-mails de suporte. Utiliza "Lazy Averaging" para evitar custo O(N*T) na
//! atualização dos pesos médios.

use std::collections::{HashMap, HashSet};

use serde::{Deserialize, Serialize};

use crate::corpus::AnnotatedSentence;
use crate::features::{self, FeatureVector, Gazetteers};
use crate::tagger::Tag;
use crate::tokenizer::Token;

/// Modelo Perceptron Médio (Averaged Perceptron).
///
/// O Perceptron é um algoritmo de aprendizado **online** e **mistake-driven**:
/// ele processa um token por vez e só atualiza os pesos se errar a predição.
///
/// # Averaged Perceptron
/// A versão padrão do Perceptron oscila muito. O "Averaged" usa a **média** dos pesos
/// de todos os passos como modelo final, o que reduz overfitting.
///
/// # Lazy Averaging
/// Calcular a média real a cada passo seria $O(N \cdot T)$. Aqui o acumulado de uma
/// feature só é atualizado **quando ela é ativa**, e um acerto final em
/// `finalize_weights` fecha a conta até o último passo.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PerceptronModel {
    /// Pesos atuais $w$: (feature_name, tag) -> weight.
    weights: HashMap<(String, String), f64>,
    /// Soma acumulada dos pesos: (feature_name, tag) -> $\sum w_t$.
    total_weights: HashMap<(String, String), f64>,
    /// Último passo em que o peso foi atualizado (timestamp $t$).
    last_update: HashMap<(String, String), usize>,
    /// Número total de passos de treino (tokens processados).
    steps: usize,
    /// Tags conhecidas: `O` primeiro, depois em ordem alfabética.
    /// Em empate de score vence a primeira.
    tags: Vec<String>,
}

impl PerceptronModel {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn tags(&self) -> &[String] {
        &self.tags
    }

    pub fn is_trained(&self) -> bool {
        self.steps > 0
    }

    /// Treina o modelo (Online Learning).
    ///
    /// O algoritmo itera pelo corpus `iterations` vezes. Para cada token:
    /// 1. Faz uma predição com os pesos atuais.
    /// 2. Se errar, promove a tag correta e penaliza a predita.
    ///
    /// Ao final, substitui os pesos pela média.
    pub fn train(&mut self, corpus: &[AnnotatedSentence], iterations: usize, gazetteers: &Gazetteers) {
        let mut tag_set = HashSet::new();
        for s in corpus {
            for (_, tag) in s.annotations {
                tag_set.insert(tag.to_string());
            }
        }
        self.tags = tag_set.into_iter().collect();
        self.tags.sort_by(|a, b| (a != "O", a).cmp(&(b != "O", b)));

        // Features não dependem dos pesos: extrai uma vez só
        let prepared: Vec<(Vec<FeatureVector>, &AnnotatedSentence)> = corpus
            .iter()
            .map(|sentence| {
                let tokens = annotation_tokens(sentence);
                (features::extract_features(&tokens, gazetteers), sentence)
            })
            .collect();

        for _ in 0..iterations {
            for (feature_vectors, sentence) in &prepared {
                for (fv, (_, true_tag)) in feature_vectors.iter().zip(sentence.annotations) {
                    let pred_tag = self.predict_single(fv);
                    if pred_tag != *true_tag {
                        self.update(fv, true_tag, &pred_tag);
                    }
                    self.steps += 1;
                }
            }
        }

        self.finalize_weights();
    }

    fn predict_single(&self, fv: &FeatureVector) -> String {
        let mut best_tag = self.tags.first().cloned().unwrap_or_else(|| "O".to_string());
        let mut best_score = f64::NEG_INFINITY;

        for tag in &self.tags {
            let score = self.score_tag(fv, tag);
            if score > best_score {
                best_score = score;
                best_tag = tag.clone();
            }
        }
        best_tag
    }

    fn score_tag(&self, fv: &FeatureVector, tag: &str) -> f64 {
        fv.features
            .iter()
            .filter_map(|(fname, fval)| {
                self.weights
                    .get(&(fname.clone(), tag.to_string()))
                    .map(|w| w * fval)
            })
            .sum()
    }

    /// Atualiza os pesos quando o modelo erra.
    ///
    /// $w_{correto} \leftarrow w_{correto} + \phi(x)$
    /// $w_{errado} \leftarrow w_{errado} - \phi(x)$
    fn update(&mut self, fv: &FeatureVector, true_tag: &str, pred_tag: &str) {
        for (fname, fval) in &fv.features {
            self.update_feature(fname, true_tag, *fval);
            self.update_feature(fname, pred_tag, -fval);
        }
    }

    /// Atualiza uma feature específica aplicando Lazy Averaging.
    fn update_feature(&mut self, fname: &str, tag: &str, delta: f64) {
        let key = (fname.to_string(), tag.to_string());

        // O peso antigo valeu de `last_step` até agora
        let current_w = *self.weights.get(&key).unwrap_or(&0.0);
        let last_step = *self.last_update.get(&key).unwrap_or(&0);
        let steps_since_update = (self.steps - last_step) as f64;

        *self.total_weights.entry(key.clone()).or_insert(0.0) += steps_since_update * current_w;
        self.last_update.insert(key.clone(), self.steps);

        *self.weights.entry(key).or_insert(0.0) += delta;
    }

    /// Finaliza o treinamento calculando as médias finais.
    fn finalize_weights(&mut self) {
        let keys: Vec<(String, String)> = self.weights.keys().cloned().collect();

        for key in keys {
            let current_w = *self.weights.get(&key).unwrap_or(&0.0);
            let last_step = *self.last_update.get(&key).unwrap_or(&0);
            let steps_since_update = (self.steps - last_step) as f64;

            *self.total_weights.entry(key).or_insert(0.0) += steps_since_update * current_w;
        }

        let steps_f64 = self.steps as f64;
        if steps_f64 > 0.0 {
            for (key, total) in &self.total_weights {
                self.weights.insert(key.clone(), total / steps_f64);
            }
        }

        self.total_weights.clear();
        self.last_update.clear();
    }

    /// Predição final (usando pesos médios), uma tag por token.
    ///
    /// Um modelo sem treino devolve `O` para tudo.
    pub fn predict(&self, tokens: &[Token], gazetteers: &Gazetteers) -> Vec<Tag> {
        features::extract_features(tokens, gazetteers)
            .iter()
            .map(|fv| Tag::from_label(&self.predict_single(fv)).unwrap_or(Tag::Outside))
            .collect()
    }
}

/// Reconstrói os tokens de uma sentença anotada, com offsets no seu texto
fn annotation_tokens(sentence: &AnnotatedSentence) -> Vec<Token> {
    let mut cursor = 0;
    sentence
        .annotations
        .iter()
        .enumerate()
        .map(|(index, (word, _))| {
            let start = sentence.text[cursor..]
                .find(word)
                .map(|offset| cursor + offset)
                .unwrap_or(cursor);
            let end = start + word.len();
            cursor = end.min(sentence.text.len());
            Token {
                text: word.to_string(),
                start,
                end,
                index,
            }
        })
        .collect()
}
