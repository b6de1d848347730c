//! # Spans de PII e Documento Mascarado
//!
//! Um [`EntitySpan`] marca um trecho do e-mail original com a categoria de PII
//! detectada. Internamente os offsets são posições de **byte** (como os do
//! `regex` e do tokenizador); na saída ([`MaskedEntity`]) viram posições de
//! **caractere**, que é o que o chamador enxerga no texto.

use serde::{Deserialize, Serialize};

/// Rótulo usado para nomes de pessoas vindos do NER.
pub const FULL_NAME_LABEL: &str = "full_name";

/// Um trecho do texto original identificado como PII.
///
/// # Invariantes
/// - `start < end <= documento.len()`, ambos em fronteira de char
/// - `text == &documento[start..end]`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EntitySpan {
    /// Posição de byte inicial no texto original (inclusiva)
    pub start: usize,
    /// Posição de byte final no texto original (exclusiva)
    pub end: usize,
    /// Categoria de PII (ex: "email", "full_name")
    pub category: String,
    /// Substring original
    pub text: String,
}

impl EntitySpan {
    /// Cria um span a partir de um intervalo do documento.
    ///
    /// Retorna `None` se o intervalo for vazio, sair do texto ou cortar um char.
    pub fn from_range(document: &str, start: usize, end: usize, category: impl Into<String>) -> Option<Self> {
        if start >= end {
            return None;
        }
        let text = document.get(start..end)?;
        Some(Self {
            start,
            end,
            category: category.into(),
            text: text.to_string(),
        })
    }

    /// Placeholder que substitui o span no texto mascarado (ex: `[email]`)
    pub fn placeholder(&self) -> String {
        placeholder(&self.category)
    }

    /// Comprimento em bytes
    pub fn len(&self) -> usize {
        self.end - self.start
    }

    pub fn is_empty(&self) -> bool {
        self.start == self.end
    }

    /// Verifica sobreposição de intervalos semiabertos
    pub fn overlaps(&self, other: &EntitySpan) -> bool {
        self.start < other.end && other.start < self.end
    }
}

/// Formata o placeholder de uma categoria.
pub fn placeholder(category: &str) -> String {
    format!("[{category}]")
}

/// Sequência ordenada de spans acumulada numa passada de mascaramento.
pub type AnnotationSet = Vec<EntitySpan>;

/// Resultado do mascaramento de um e-mail. Imutável depois de criado.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MaskedDocument {
    pub redacted_text: String,
    pub annotations: AnnotationSet,
}

impl MaskedDocument {
    /// Converte as anotações para o formato de saída (offsets em caracteres).
    pub fn masked_entities(&self, original: &str) -> Vec<MaskedEntity> {
        let index = CharIndex::new(original);
        self.annotations
            .iter()
            .map(|span| MaskedEntity {
                position: [index.char_offset(span.start), index.char_offset(span.end)],
                classification: span.category.clone(),
                entity: span.text.clone(),
            })
            .collect()
    }
}

/// Entidade mascarada no formato externo.
///
/// `position` é `[início, fim)` em caracteres do corpo original.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MaskedEntity {
    pub position: [usize; 2],
    pub classification: String,
    pub entity: String,
}

/// Objeto de resposta visível ao chamador.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClassificationResult {
    pub input_email_body: String,
    pub list_of_masked_entities: Vec<MaskedEntity>,
    pub masked_email: String,
    pub category_of_the_email: String,
}

/// Tabela byte → caractere para converter offsets em O(log n).
struct CharIndex {
    /// Offset de byte de cada char, em ordem
    starts: Vec<usize>,
    len: usize,
}

impl CharIndex {
    fn new(text: &str) -> Self {
        Self {
            starts: text.char_indices().map(|(i, _)| i).collect(),
            len: text.len(),
        }
    }

    fn char_offset(&self, byte: usize) -> usize {
        if byte >= self.len {
            return self.starts.len();
        }
        match self.starts.binary_search(&byte) {
            Ok(i) => i,
            Err(i) => i,
        }
    }
}
