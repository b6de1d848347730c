//! # Esquema de Tags BIO e Tipos de Entidade
//!
//! O reconhecedor rotula cada token com uma tag **BIO**
//! (Beginning-Inside-Outside) e depois agrupa as tags em entidades.
//!
//! | Prefixo | Significado      | Exemplos                     |
//! |---------|------------------|------------------------------|
//! | PER     | Pessoa           | Alice Smith, Dr. Rao         |
//! | ORG     | Organização      | Acme Corp, Globex Ltd        |
//! | LOC     | Local            | London, Bangalore            |
//! | MISC    | Miscelânea       | Windows, Outlook             |
//! | O       | Fora de entidade | (qualquer outra palavra)     |
//!
//! Só PER interessa ao mascaramento; as outras categorias existem porque o
//! modelo aprende melhor a fronteira de um nome quando sabe o que não é nome.

use serde::{Deserialize, Serialize};

use crate::recognizer::RecognizedEntity;
use crate::tokenizer::Token;

/// Categorias de entidade reconhecidas pelo NER.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EntityCategory {
    /// **Pessoa**: nomes de humanos. Ex: "Alice Smith".
    Per,
    /// **Organização**: empresas, bancos, fornecedores. Ex: "Acme Corp".
    Org,
    /// **Localização**: cidades, países. Ex: "Mumbai".
    Loc,
    /// **Miscelânea**: produtos, sistemas. Ex: "Outlook".
    Misc,
}

impl EntityCategory {
    /// Nome da categoria como string
    pub fn name(&self) -> &'static str {
        match self {
            EntityCategory::Per => "PER",
            EntityCategory::Org => "ORG",
            EntityCategory::Loc => "LOC",
            EntityCategory::Misc => "MISC",
        }
    }

    /// Tenta parsear a partir de string (ex: "PER" → Some(Per))
    pub fn from_name(s: &str) -> Option<Self> {
        match s {
            "PER" => Some(EntityCategory::Per),
            "ORG" => Some(EntityCategory::Org),
            "LOC" => Some(EntityCategory::Loc),
            "MISC" => Some(EntityCategory::Misc),
            _ => None,
        }
    }
}

/// Tag BIO aplicada a um token.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum Tag {
    /// Início de uma entidade. Ex: **Alice** (B-PER) Smith.
    Begin(EntityCategory),
    /// Continuação de uma entidade. Ex: Alice **Smith** (I-PER).
    Inside(EntityCategory),
    /// Fora de entidade.
    Outside,
}

impl Tag {
    /// Representação textual da tag (ex: "B-PER", "I-ORG", "O")
    pub fn label(&self) -> String {
        match self {
            Tag::Begin(cat) => format!("B-{}", cat.name()),
            Tag::Inside(cat) => format!("I-{}", cat.name()),
            Tag::Outside => "O".to_string(),
        }
    }

    /// Retorna a categoria desta tag (se for B- ou I-)
    pub fn category(&self) -> Option<EntityCategory> {
        match self {
            Tag::Begin(c) | Tag::Inside(c) => Some(*c),
            Tag::Outside => None,
        }
    }

    /// Parseia uma tag a partir de string (ex: "B-PER" → Begin(Per))
    pub fn from_label(s: &str) -> Option<Self> {
        if s == "O" {
            return Some(Tag::Outside);
        }
        let (prefix, name) = s.split_once('-')?;
        let cat = EntityCategory::from_name(name)?;
        match prefix {
            "B" => Some(Tag::Begin(cat)),
            "I" => Some(Tag::Inside(cat)),
            _ => None,
        }
    }
}

impl std::fmt::Display for Tag {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.label())
    }
}

/// Um token com sua tag BIO e a origem da decisão
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TaggedToken {
    pub token: Token,
    pub tag: Tag,
    /// Quem decidiu a tag: nome da regra ou "perceptron"
    pub source: String,
}

/// Converte uma sequência de tokens classificados (BIO) em entidades.
///
/// - Inicia uma entidade em `B-X`.
/// - Um `I-X` solto (sem `B-X` antes) também abre entidade.
/// - Continua enquanto houver `I-X` da **mesma** categoria.
///
/// # Exemplo
/// `[B-PER, I-PER, O, B-LOC]` -> `[PER, LOC]`
pub fn tokens_to_spans(tagged: &[TaggedToken], original_text: &str) -> Vec<RecognizedEntity> {
    let mut spans = Vec::new();
    let mut i = 0;

    while i < tagged.len() {
        let cat = match &tagged[i].tag {
            Tag::Begin(cat) | Tag::Inside(cat) => *cat,
            Tag::Outside => {
                i += 1;
                continue;
            }
        };
        let start = tagged[i].token.start;
        let mut end = tagged[i].token.end;

        let mut j = i + 1;
        while j < tagged.len() {
            match &tagged[j].tag {
                Tag::Inside(next_cat) if *next_cat == cat => {
                    end = tagged[j].token.end;
                    j += 1;
                }
                _ => break,
            }
        }

        spans.push(RecognizedEntity {
            start,
            end,
            category: cat,
            text: original_text[start..end].to_string(),
            source: tagged[i].source.clone(),
        });
        i = j;
    }

    spans
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tokenizer::tokenize;

    fn tag_all(text: &str, tags: &[Tag]) -> Vec<TaggedToken> {
        tokenize(text)
            .into_iter()
            .zip(tags.iter().cloned())
            .map(|(token, tag)| TaggedToken { token, tag, source: "test".into() })
            .collect()
    }

    #[test]
    fn test_tag_labels() {
        assert_eq!(Tag::Outside.label(), "O");
        assert_eq!(Tag::Begin(EntityCategory::Per).label(), "B-PER");
        assert_eq!(Tag::Inside(EntityCategory::Loc).label(), "I-LOC");
    }

    #[test]
    fn test_tag_from_label() {
        assert_eq!(Tag::from_label("O"), Some(Tag::Outside));
        assert_eq!(Tag::from_label("B-PER"), Some(Tag::Begin(EntityCategory::Per)));
        assert_eq!(Tag::from_label("I-MISC"), Some(Tag::Inside(EntityCategory::Misc)));
        assert_eq!(Tag::from_label("X-PER"), None);
        assert_eq!(Tag::from_label("B-FOO"), None);
    }

    #[test]
    fn test_tokens_to_spans_keeps_original_slice() {
        let text = "Ask Alice  Smith in Pune.";
        let tags = [
            Tag::Outside,
            Tag::Begin(EntityCategory::Per),
            Tag::Inside(EntityCategory::Per),
            Tag::Outside,
            Tag::Begin(EntityCategory::Loc),
            Tag::Outside,
        ];
        let spans = tokens_to_spans(&tag_all(text, &tags), text);

        assert_eq!(spans.len(), 2);
        assert_eq!(spans[0].text, "Alice  Smith");
        assert_eq!(spans[0].category, EntityCategory::Per);
        assert_eq!(spans[1].text, "Pune");
    }

    #[test]
    fn test_category_change_splits_entity() {
        let text = "Alice Acme";
        let tags = [Tag::Begin(EntityCategory::Per), Tag::Inside(EntityCategory::Org)];
        let spans = tokens_to_spans(&tag_all(text, &tags), text);

        assert_eq!(spans.len(), 2);
        assert_eq!(spans[0].category, EntityCategory::Per);
        assert_eq!(spans[1].category, EntityCategory::Org);
    }
}
