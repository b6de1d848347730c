//! # Tokenizador para E-mails em Inglês
//!
//! Divide o texto bruto em tokens (palavras, números, pontuação) preservando
//! a posição original de cada um. Os offsets são de byte e apontam para o
//! texto de entrada, para que os spans do NER possam ser recortados direto do
//! e-mail original.
//!
//! ## Regras
//!
//! - Palavras: sequências alfanuméricas, com hífen ou apóstrofo internos
//!   ("O'Brien", "Mary-Jane").
//! - Abreviações de tratamento ("Mr.", "Dr.") mantêm o ponto, assim como
//!   pontos internos ("10.50", "jane.doe").
//! - Trechos com `@` (endereços de e-mail) viram um token só.
//! - Qualquer outro caractere não-espaço vira um token de pontuação.
//!
//! ```rust
//! use mailmask_core::tokenizer::tokenize;
//!
//! let tokens = tokenize("Dr. Smith, call me.");
//! let texts: Vec<&str> = tokens.iter().map(|t| t.text.as_str()).collect();
//! assert_eq!(texts, vec!["Dr.", "Smith", ",", "call", "me", "."]);
//! ```

use serde::{Deserialize, Serialize};

/// Um token extraído do texto original.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Token {
    /// O texto do token (ex: "Alice", ",", "refund").
    pub text: String,
    /// Índice de byte inicial no texto original (inclusive).
    pub start: usize,
    /// Índice de byte final no texto original (exclusivo).
    pub end: usize,
    /// Índice sequencial do token na lista (0, 1, 2...).
    pub index: usize,
}

/// Abreviações que não devem ter o ponto tratado como fim de sentença
const ABBREVIATIONS: &[&str] = &[
    "Mr", "Mrs", "Ms", "Dr", "Prof", "Sr", "Jr", "St", "Mx", "Capt", "Lt",
    "Col", "Gen", "Rev", "Hon", "Sgt", "Inc", "Ltd", "Co", "Corp", "vs",
    "etc", "approx", "dept", "tel", "ext",
];

/// Tokeniza um texto.
pub fn tokenize(text: &str) -> Vec<Token> {
    let mut tokens = Vec::new();
    let mut current_start = 0;
    let mut current_text = String::new();
    let chars: Vec<(usize, char)> = text.char_indices().collect();
    let mut i = 0;

    while i < chars.len() {
        let (byte_pos, ch) = chars[i];
        let next = chars.get(i + 1).map(|(_, c)| *c);
        let next_is_alnum = next.map(|c| c.is_alphanumeric()).unwrap_or(false);

        if ch.is_alphanumeric() {
            if current_text.is_empty() {
                current_start = byte_pos;
            }
            current_text.push(ch);
        } else if (ch == '-' || ch == '\'' || ch == '\u{2019}') && !current_text.is_empty() && next_is_alnum {
            current_text.push(ch);
        } else if ch == '@' && !current_text.is_empty() && next_is_alnum {
            // Endereço de e-mail: consome até o próximo espaço
            current_text.push(ch);
            i += 1;
            while i < chars.len() {
                let (_, c) = chars[i];
                let trailing_dot = c == '.'
                    && !chars.get(i + 1).map(|(_, n)| n.is_alphanumeric()).unwrap_or(false);
                if c.is_whitespace() || trailing_dot || !(c.is_alphanumeric() || ".-_".contains(c)) {
                    break;
                }
                current_text.push(c);
                i += 1;
            }
            let end = chars.get(i).map(|(b, _)| *b).unwrap_or(text.len());
            flush_token(&mut tokens, &mut current_text, current_start, end);
            continue;
        } else if ch == '.' && !current_text.is_empty() {
            let is_abbrev = ABBREVIATIONS.contains(&current_text.as_str());

            // "10.50", "jane.doe" ficam juntos; "Mr." também
            if is_abbrev || next_is_alnum {
                current_text.push('.');
            } else {
                flush_token(&mut tokens, &mut current_text, current_start, byte_pos);
                push_token(&mut tokens, ".".to_string(), byte_pos, byte_pos + 1);
            }
        } else if ch.is_whitespace() {
            flush_token(&mut tokens, &mut current_text, current_start, byte_pos);
        } else {
            flush_token(&mut tokens, &mut current_text, current_start, byte_pos);
            push_token(&mut tokens, ch.to_string(), byte_pos, byte_pos + ch.len_utf8());
        }
        i += 1;
    }

    flush_token(&mut tokens, &mut current_text, current_start, text.len());

    for (i, token) in tokens.iter_mut().enumerate() {
        token.index = i;
    }
    tokens
}

/// Fecha o token acumulado e adiciona à lista (se não vazio)
fn flush_token(tokens: &mut Vec<Token>, text: &mut String, start: usize, end: usize) {
    if !text.is_empty() {
        tokens.push(Token {
            text: text.clone(),
            start,
            end,
            index: 0, // será atribuído depois
        });
        text.clear();
    }
}

/// Adiciona um token de pontuação diretamente
fn push_token(tokens: &mut Vec<Token>, text: String, start: usize, end: usize) {
    tokens.push(Token {
        text,
        start,
        end,
        index: 0,
    });
}
