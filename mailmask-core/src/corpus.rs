//! # Corpus de E-mails de Suporte com Anotações BIO
//!
//! Sentenças curtas no estilo de chamados de suporte, anotadas à mão no
//! formato BIO. Servem para treinar o perceptron do NER na construção do
//! modelo e para alimentar os gazetteers.
//!
//! O corpus tem muitas palavras capitalizadas que **não** são nomes
//! ("Hello", "Please", "Outlook", "Monday"), para o modelo não aprender que
//! maiúscula basta.

use std::collections::HashSet;

use crate::features::Gazetteers;

/// Uma sentença anotada no formato BIO
pub struct AnnotatedSentence {
    /// O texto completo da sentença
    pub text: &'static str,
    /// Domínio do chamado (usado só para inspeção)
    pub domain: &'static str,
    /// Pares (palavra, tag_BIO). Ex: `[("Alice", "B-PER"), ("wrote", "O")]`
    pub annotations: &'static [(&'static str, &'static str)],
}

/// Retorna o corpus completo
pub fn get_corpus() -> Vec<AnnotatedSentence> {
    vec![
        // ===== APRESENTAÇÃO =====
        AnnotatedSentence {
            text: "My name is Alice Smith and I cannot log in.",
            domain: "account",
            annotations: &[
                ("My", "O"), ("name", "O"), ("is", "O"), ("Alice", "B-PER"), ("Smith", "I-PER"),
                ("and", "O"), ("I", "O"), ("cannot", "O"), ("log", "O"), ("in", "O"), (".", "O"),
            ],
        },
        AnnotatedSentence {
            text: "Hello, this is Rahul Verma from Acme Corp.",
            domain: "account",
            annotations: &[
                ("Hello", "O"), (",", "O"), ("this", "O"), ("is", "O"), ("Rahul", "B-PER"),
                ("Verma", "I-PER"), ("from", "O"), ("Acme", "B-ORG"), ("Corp", "I-ORG"), (".", "O"),
            ],
        },
        AnnotatedSentence {
            text: "I am Priya Nair and my Outlook keeps crashing.",
            domain: "incident",
            annotations: &[
                ("I", "O"), ("am", "O"), ("Priya", "B-PER"), ("Nair", "I-PER"), ("and", "O"),
                ("my", "O"), ("Outlook", "B-MISC"), ("keeps", "O"), ("crashing", "O"), (".", "O"),
            ],
        },
        AnnotatedSentence {
            text: "Dear Support Team, please reset my password.",
            domain: "request",
            annotations: &[
                ("Dear", "O"), ("Support", "O"), ("Team", "O"), (",", "O"), ("please", "O"),
                ("reset", "O"), ("my", "O"), ("password", "O"), (".", "O"),
            ],
        },
        AnnotatedSentence {
            text: "Hi, I spoke with Mr. David Miller yesterday about the refund.",
            domain: "billing",
            annotations: &[
                ("Hi", "O"), (",", "O"), ("I", "O"), ("spoke", "O"), ("with", "O"), ("Mr.", "O"),
                ("David", "B-PER"), ("Miller", "I-PER"), ("yesterday", "O"), ("about", "O"),
                ("the", "O"), ("refund", "O"), (".", "O"),
            ],
        },
        AnnotatedSentence {
            text: "Please forward this to Dr. Meera Iyer in Bangalore.",
            domain: "request",
            annotations: &[
                ("Please", "O"), ("forward", "O"), ("this", "O"), ("to", "O"), ("Dr.", "O"),
                ("Meera", "B-PER"), ("Iyer", "I-PER"), ("in", "O"), ("Bangalore", "B-LOC"), (".", "O"),
            ],
        },
        // ===== ASSINATURAS =====
        AnnotatedSentence {
            text: "Thanks, John Carter",
            domain: "signature",
            annotations: &[("Thanks", "O"), (",", "O"), ("John", "B-PER"), ("Carter", "I-PER")],
        },
        AnnotatedSentence {
            text: "Best regards, Maria Garcia",
            domain: "signature",
            annotations: &[
                ("Best", "O"), ("regards", "O"), (",", "O"), ("Maria", "B-PER"), ("Garcia", "I-PER"),
            ],
        },
        AnnotatedSentence {
            text: "Kind regards, Emma",
            domain: "signature",
            annotations: &[("Kind", "O"), ("regards", "O"), (",", "O"), ("Emma", "B-PER")],
        },
        AnnotatedSentence {
            text: "Sincerely, Arjun Mehta, Globex Ltd",
            domain: "signature",
            annotations: &[
                ("Sincerely", "O"), (",", "O"), ("Arjun", "B-PER"), ("Mehta", "I-PER"), (",", "O"),
                ("Globex", "B-ORG"), ("Ltd", "I-ORG"),
            ],
        },
        // ===== INCIDENTES =====
        AnnotatedSentence {
            text: "The VPN stopped working on Monday in our London office.",
            domain: "incident",
            annotations: &[
                ("The", "O"), ("VPN", "B-MISC"), ("stopped", "O"), ("working", "O"), ("on", "O"),
                ("Monday", "O"), ("in", "O"), ("our", "O"), ("London", "B-LOC"), ("office", "O"),
                (".", "O"),
            ],
        },
        AnnotatedSentence {
            text: "Our Windows laptops cannot connect to the printer.",
            domain: "incident",
            annotations: &[
                ("Our", "O"), ("Windows", "B-MISC"), ("laptops", "O"), ("cannot", "O"),
                ("connect", "O"), ("to", "O"), ("the", "O"), ("printer", "O"), (".", "O"),
            ],
        },
        AnnotatedSentence {
            text: "Since Tuesday the dashboard shows an error for Sarah Johnson.",
            domain: "incident",
            annotations: &[
                ("Since", "O"), ("Tuesday", "O"), ("the", "O"), ("dashboard", "O"), ("shows", "O"),
                ("an", "O"), ("error", "O"), ("for", "O"), ("Sarah", "B-PER"), ("Johnson", "I-PER"),
                (".", "O"),
            ],
        },
        AnnotatedSentence {
            text: "Server outage reported by Kevin Brown at 9 AM.",
            domain: "incident",
            annotations: &[
                ("Server", "O"), ("outage", "O"), ("reported", "O"), ("by", "O"), ("Kevin", "B-PER"),
                ("Brown", "I-PER"), ("at", "O"), ("9", "O"), ("AM", "O"), (".", "O"),
            ],
        },
        AnnotatedSentence {
            text: "Urgent: Payment gateway down for customers in Mumbai.",
            domain: "incident",
            annotations: &[
                ("Urgent", "O"), (":", "O"), ("Payment", "O"), ("gateway", "O"), ("down", "O"),
                ("for", "O"), ("customers", "O"), ("in", "O"), ("Mumbai", "B-LOC"), (".", "O"),
            ],
        },
        // ===== PEDIDOS =====
        AnnotatedSentence {
            text: "Could you add Laura Chen to the billing account?",
            domain: "request",
            annotations: &[
                ("Could", "O"), ("you", "O"), ("add", "O"), ("Laura", "B-PER"), ("Chen", "I-PER"),
                ("to", "O"), ("the", "O"), ("billing", "O"), ("account", "O"), ("?", "O"),
            ],
        },
        AnnotatedSentence {
            text: "Please send the invoice to Ananya Gupta.",
            domain: "billing",
            annotations: &[
                ("Please", "O"), ("send", "O"), ("the", "O"), ("invoice", "O"), ("to", "O"),
                ("Ananya", "B-PER"), ("Gupta", "I-PER"), (".", "O"),
            ],
        },
        AnnotatedSentence {
            text: "We need a new Salesforce licence for the Berlin team.",
            domain: "request",
            annotations: &[
                ("We", "O"), ("need", "O"), ("a", "O"), ("new", "O"), ("Salesforce", "B-MISC"),
                ("licence", "O"), ("for", "O"), ("the", "O"), ("Berlin", "B-LOC"), ("team", "O"),
                (".", "O"),
            ],
        },
        AnnotatedSentence {
            text: "Ms. Fatima Khan asked for a copy of the contract.",
            domain: "request",
            annotations: &[
                ("Ms.", "O"), ("Fatima", "B-PER"), ("Khan", "I-PER"), ("asked", "O"), ("for", "O"),
                ("a", "O"), ("copy", "O"), ("of", "O"), ("the", "O"), ("contract", "O"), (".", "O"),
            ],
        },
        // ===== MUDANÇAS / PROBLEMAS =====
        AnnotatedSentence {
            text: "Change request: upgrade the Oracle database this Friday.",
            domain: "change",
            annotations: &[
                ("Change", "O"), ("request", "O"), (":", "O"), ("upgrade", "O"), ("the", "O"),
                ("Oracle", "B-ORG"), ("database", "O"), ("this", "O"), ("Friday", "O"), (".", "O"),
            ],
        },
        AnnotatedSentence {
            text: "Michael Scott approved the migration to Azure.",
            domain: "change",
            annotations: &[
                ("Michael", "B-PER"), ("Scott", "I-PER"), ("approved", "O"), ("the", "O"),
                ("migration", "O"), ("to", "O"), ("Azure", "B-MISC"), (".", "O"),
            ],
        },
        AnnotatedSentence {
            text: "The same sync problem keeps coming back every week.",
            domain: "problem",
            annotations: &[
                ("The", "O"), ("same", "O"), ("sync", "O"), ("problem", "O"), ("keeps", "O"),
                ("coming", "O"), ("back", "O"), ("every", "O"), ("week", "O"), (".", "O"),
            ],
        },
        AnnotatedSentence {
            text: "Root cause analysis was shared by Vikram Singh of Initech.",
            domain: "problem",
            annotations: &[
                ("Root", "O"), ("cause", "O"), ("analysis", "O"), ("was", "O"), ("shared", "O"),
                ("by", "O"), ("Vikram", "B-PER"), ("Singh", "I-PER"), ("of", "O"),
                ("Initech", "B-ORG"), (".", "O"),
            ],
        },
        AnnotatedSentence {
            text: "Thank you for the quick response.",
            domain: "other",
            annotations: &[
                ("Thank", "O"), ("you", "O"), ("for", "O"), ("the", "O"), ("quick", "O"),
                ("response", "O"), (".", "O"),
            ],
        },
        AnnotatedSentence {
            text: "Regards, Tom",
            domain: "signature",
            annotations: &[("Regards", "O"), (",", "O"), ("Tom", "B-PER")],
        },
        AnnotatedSentence {
            text: "Contact Neha Joshi in HR for access to SAP.",
            domain: "request",
            annotations: &[
                ("Contact", "O"), ("Neha", "B-PER"), ("Joshi", "I-PER"), ("in", "O"), ("HR", "O"),
                ("for", "O"), ("access", "O"), ("to", "O"), ("SAP", "B-MISC"), (".", "O"),
            ],
        },
    ]
}

/// Primeiros nomes comuns (lowercase), somados aos que aparecem no corpus
pub const FIRST_NAMES: &[&str] = &[
    "aaron", "aditya", "alice", "amit", "ananya", "anil", "anjali", "anna", "arjun", "aryan",
    "ben", "carlos", "charlotte", "chris", "daniel", "david", "deepak", "divya", "elena", "emily",
    "emma", "fatima", "george", "hannah", "harry", "isabella", "james", "jane", "jessica", "john",
    "jose", "karan", "kavya", "kevin", "laura", "liam", "lisa", "lucas", "maria", "mark",
    "meera", "michael", "mohammed", "neha", "noah", "olivia", "pooja", "priya", "rahul", "raj",
    "ravi", "robert", "rohan", "sam", "sara", "sarah", "sneha", "sophia", "sunil", "thomas",
    "tom", "vikram", "william", "zoe",
];

/// Sobrenomes comuns (lowercase)
pub const SURNAMES: &[&str] = &[
    "brown", "carter", "chen", "das", "davis", "garcia", "gupta", "iyer", "johnson", "jones",
    "joshi", "khan", "kumar", "lee", "mehta", "miller", "nair", "patel", "reddy", "rodriguez",
    "sharma", "singh", "smith", "taylor", "verma", "williams", "wilson",
];

/// Tratamentos que precedem nomes (sem ponto, lowercase)
pub const TITLES: &[&str] = &["mr", "mrs", "ms", "miss", "mx", "dr", "prof", "sir", "madam"];

/// Monta os gazetteers a partir das listas fixas e das entidades do corpus.
///
/// Em entidades PER, o primeiro token vai para `first_names` e os demais para
/// `surnames`; ORG e LOC entram token a token.
pub fn build_gazetteers() -> Gazetteers {
    let mut gaz = Gazetteers::new();
    gaz.first_names.extend(FIRST_NAMES.iter().map(|s| s.to_string()));
    gaz.surnames.extend(SURNAMES.iter().map(|s| s.to_string()));
    gaz.titles.extend(TITLES.iter().map(|s| s.to_string()));

    for sentence in get_corpus() {
        for (word, tag) in sentence.annotations {
            let lower = word.to_lowercase();
            match *tag {
                "B-PER" => {
                    gaz.first_names.insert(lower);
                }
                "I-PER" => {
                    gaz.surnames.insert(lower);
                }
                "B-ORG" | "I-ORG" => {
                    gaz.organizations.insert(lower);
                }
                "B-LOC" | "I-LOC" => {
                    gaz.locations.insert(lower);
                }
                _ => {}
            }
        }
    }
    gaz
}

/// Conjunto de tags presentes no corpus
pub fn corpus_tags(corpus: &[AnnotatedSentence]) -> Vec<String> {
    let mut tags: Vec<String> = corpus
        .iter()
        .flat_map(|s| s.annotations.iter().map(|(_, t)| t.to_string()))
        .collect::<HashSet<_>>()
        .into_iter()
        .collect();
    tags.sort();
    tags
}

/// E-mails de demonstração para o servidor web
pub fn demo_emails() -> Vec<(&'static str, &'static str)> {
    vec![
        (
            "Incident",
            "Hello, my name is Alice Smith. Since this morning I cannot access the billing portal. You can reach me at alice.smith@example.com or 9876543210. Thanks, Alice Smith",
        ),
        (
            "Request",
            "Hi team, please update my card on file to 4111 1111 1111 1111, expiry 09/27, cvv 123. My date of birth is 12/05/1990. Regards, Rahul Verma",
        ),
        (
            "Change",
            "Dear Support, we would like to migrate our account to the annual plan starting next month. Aadhar for verification: 1234 5678 9012. Best regards, Priya Nair",
        ),
        (
            "Problem",
            "The export job fails every night with the same timeout error. This has happened for three weeks now. Kind regards, David Miller",
        ),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tagger::Tag;

    #[test]
    fn test_annotations_are_valid_tags() {
        for sentence in get_corpus() {
            for (word, tag) in sentence.annotations {
                assert!(Tag::from_label(tag).is_some(), "tag inválida {tag} em '{word}'");
                assert!(sentence.text.contains(word), "'{word}' não está em '{}'", sentence.text);
            }
        }
    }

    #[test]
    fn test_gazetteers_include_corpus_entities() {
        let gaz = build_gazetteers();
        assert!(gaz.first_names.contains("michael"));
        assert!(gaz.surnames.contains("scott"));
        assert!(gaz.organizations.contains("initech"));
        assert!(gaz.locations.contains("mumbai"));
        assert!(gaz.titles.contains("dr"));
    }

    #[test]
    fn test_corpus_tags_sorted() {
        let tags = corpus_tags(&get_corpus());
        assert_eq!(tags.first().map(String::as_str), Some("B-LOC"));
        assert!(tags.contains(&"I-PER".to_string()));
        assert!(tags.contains(&"O".to_string()));
    }
}
