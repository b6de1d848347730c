//! # Detector de Padrões — Tabela Ordenada de Regras Regex
//!
//! Cada regra associa um rótulo de PII a uma expressão regular. A tabela é
//! **dado**, não código: a ordem da lista é a ordem de avaliação, e uma
//! configuração TOML pode trocá-la inteira (ver [`crate::config`]).
//!
//! Todas as regras varrem o texto **original**. Duas regras podem, portanto,
//! marcar trechos sobrepostos (ex: um `dob` dentro de um `aadhar_num`); quem
//! resolve isso é o [`crate::masker`].
//!
//! ## Precisão
//!
//! `dob` (qualquer número de 2 a 4 dígitos) e `cvv_no` (qualquer número de 3
//! dígitos) são muito frouxos e geram falsos positivos. Ficam assim até haver
//! confirmação de que recall vale mais que precisão neste uso.

use regex::Regex;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::RuleError;
use crate::span::EntitySpan;

/// Regra ainda não compilada (forma serializável).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RuleSpec {
    pub label: String,
    pub pattern: String,
}

impl RuleSpec {
    pub fn new(label: impl Into<String>, pattern: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            pattern: pattern.into(),
        }
    }
}

/// Tabela padrão de regras, na ordem de avaliação.
pub fn default_rule_specs() -> Vec<RuleSpec> {
    [
        ("email", r"\b[A-Za-z0-9._%+-]+@[A-Za-z0-9.-]+\.[A-Z|a-z]{2,}\b"),
        ("phone_number", r"\b(?:\+91[\-\s]?)?[6-9]\d{9}\b"),
        ("dob", r"\b(?:\d{1,2}[/-])?(?:\d{1,2}[/-])?\d{2,4}\b"),
        ("aadhar_num", r"\b\d{4}[\s-]?\d{4}[\s-]?\d{4}\b"),
        ("credit_debit_no", r"\b(?:\d[ -]*?){13,16}\b"),
        ("cvv_no", r"\b\d{3}\b"),
        ("expiry_no", r"\b(0[1-9]|1[0-2])[/-]?([0-9]{2})\b"),
    ]
    .iter()
    .map(|(label, pattern)| RuleSpec::new(*label, *pattern))
    .collect()
}

/// Uma regra compilada: rótulo → regex.
#[derive(Debug, Clone)]
pub struct PatternRule {
    pub label: String,
    pub pattern: Regex,
}

/// Sequência ordenada de regras compiladas.
#[derive(Debug, Clone)]
pub struct RuleTable {
    rules: Vec<PatternRule>,
}

impl RuleTable {
    /// Compila uma lista de regras, preservando a ordem.
    ///
    /// Falha na primeira regra com rótulo vazio ou padrão inválido.
    pub fn compile(specs: &[RuleSpec]) -> Result<Self, RuleError> {
        let mut rules = Vec::with_capacity(specs.len());
        for (i, spec) in specs.iter().enumerate() {
            let label = spec.label.trim();
            if label.is_empty() {
                return Err(RuleError::EmptyLabel(i));
            }
            let pattern = Regex::new(&spec.pattern).map_err(|source| RuleError::InvalidPattern {
                label: label.to_string(),
                source,
            })?;
            rules.push(PatternRule {
                label: label.to_string(),
                pattern,
            });
        }
        Ok(Self { rules })
    }

    /// Tabela padrão compilada.
    pub fn default_table() -> Result<Self, RuleError> {
        Self::compile(&default_rule_specs())
    }

    pub fn rules(&self) -> &[PatternRule] {
        &self.rules
    }

    pub fn len(&self) -> usize {
        self.rules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }

    /// Posição de uma regra na tabela (usada como prioridade na fusão por offset)
    pub fn rank(&self, label: &str) -> Option<usize> {
        self.rules.iter().position(|r| r.label == label)
    }
}

/// Aplica a tabela de regras a um texto.
#[derive(Debug, Clone)]
pub struct PatternMatcher {
    table: RuleTable,
}

impl PatternMatcher {
    pub fn new(table: RuleTable) -> Self {
        Self { table }
    }

    pub fn table(&self) -> &RuleTable {
        &self.table
    }

    /// Encontra todos os matches de todas as regras.
    ///
    /// A saída segue a ordem da tabela; dentro de uma regra, a ordem dos
    /// matches no texto. Matches repetidos com o mesmo texto geram spans
    /// separados.
    pub fn find_all(&self, text: &str) -> Vec<EntitySpan> {
        let mut spans = Vec::new();
        for rule in &self.table.rules {
            let before = spans.len();
            for m in rule.pattern.find_iter(text) {
                if m.start() == m.end() {
                    continue;
                }
                spans.push(EntitySpan {
                    start: m.start(),
                    end: m.end(),
                    category: rule.label.clone(),
                    text: m.as_str().to_string(),
                });
            }
            let found = spans.len() - before;
            if found > 0 {
                debug!(rule = %rule.label, matches = found, "regra aplicada");
            }
        }
        spans
    }
}
