use crate::statement::{Statement, Term};
use ark_std::rand::RngCore;
use serde_json::{Map, Value};
use std::collections::{BTreeMap, HashMap};

/// Rewrites sensitive IRIs into `urn:anon:<token>`, using one token per value
/// across every document of a derivation.
#[derive(Debug, Default)]
pub struct UriAnonymizer {
    tokens: HashMap<Term, String>,
    order: Vec<Term>,
}

impl UriAnonymizer {
    pub fn new() -> Self {
        Self::default()
    }

    /// register a sensitive value, returning its (possibly already assigned) token
    pub fn register<R: RngCore>(&mut self, rng: &mut R, value: Term) -> &str {
        if !self.tokens.contains_key(&value) {
            self.order.push(value.clone());
            self.tokens.insert(value.clone(), generate_token(rng));
        }
        &self.tokens[&value]
    }

    pub fn token(&self, value: &Term) -> Option<&str> {
        self.tokens.get(value).map(String::as_str)
    }

    pub fn contains(&self, value: &Term) -> bool {
        self.tokens.contains_key(value)
    }

    pub fn len(&self) -> usize {
        self.order.len()
    }

    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }

    /// registered values in registration order
    pub fn values(&self) -> impl Iterator<Item = &Term> {
        self.order.iter()
    }

    /// Rewrite every string field of a JSON-LD value that names a registered IRI.
    ///
    /// Literal value objects (those carrying `@value`) are left as they are.
    pub fn anonymize_document(&self, document: &Value) -> Value {
        match document {
            Value::Object(map) if map.contains_key("@value") => document.clone(),
            Value::Object(map) => Value::Object(
                map.iter()
                    .map(|(k, v)| (k.clone(), self.anonymize_document(v)))
                    .collect::<Map<String, Value>>(),
            ),
            Value::Array(values) => Value::Array(
                values
                    .iter()
                    .map(|v| self.anonymize_document(v))
                    .collect(),
            ),
            Value::String(s) => match self.token(&Term::iri(s.as_str())) {
                Some(token) => Value::String(Term::anonymous(token).iri_value().unwrap_or_default()),
                None => document.clone(),
            },
            _ => document.clone(),
        }
    }

    pub fn anonymize_statement(&self, statement: &Statement) -> Statement {
        statement
            .terms()
            .into_iter()
            .filter_map(|term| {
                self.token(term)
                    .map(|token| (term.clone(), Term::anonymous(token)))
            })
            .collect::<Vec<_>>()
            .into_iter()
            .fold(statement.clone(), |s, (from, to)| s.substitute(&from, &to))
    }

    /// verifier-side recognition of an anonymized term
    pub fn extract_token(term: &Term) -> Option<&str> {
        term.anonymous_token()
    }
}

fn generate_token<R: RngCore>(rng: &mut R) -> String {
    let mut bytes = [0u8; 16];
    rng.fill_bytes(&mut bytes);
    uuid::Builder::from_random_bytes(bytes)
        .into_uuid()
        .to_string()
}

/// Locations `(proof index, term index)` of hidden values, keyed by anonymous token.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct EquivalenceTable {
    classes: BTreeMap<String, Vec<(usize, usize)>>,
}

impl EquivalenceTable {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record(&mut self, token: &str, proof_index: usize, term_index: usize) {
        self.classes
            .entry(token.to_string())
            .or_default()
            .push((proof_index, term_index));
    }

    pub fn get(&self, token: &str) -> Option<&Vec<(usize, usize)>> {
        self.classes.get(token)
    }

    pub fn len(&self) -> usize {
        self.classes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.classes.is_empty()
    }

    /// classes ordered by token
    pub fn into_classes(self) -> Vec<Vec<(usize, usize)>> {
        self.classes.into_values().collect()
    }
}

#[cfg(test)]
mod tests {
    use super::{EquivalenceTable, UriAnonymizer};
    use crate::statement::{Statement, Term};
    use ark_std::rand::{rngs::StdRng, SeedableRng};
    use serde_json::json;

    #[test]
    fn register_is_idempotent_and_collision_free() {
        let mut rng = StdRng::seed_from_u64(0u64);
        let mut anonymizer = UriAnonymizer::new();
        let john = anonymizer
            .register(&mut rng, Term::iri("did:example:john"))
            .to_string();
        let again = anonymizer
            .register(&mut rng, Term::iri("did:example:john"))
            .to_string();
        let bnode = anonymizer
            .register(&mut rng, Term::iri("urn:bnid:0:_:c14n0"))
            .to_string();
        assert_eq!(john, again);
        assert_ne!(john, bnode);
        assert_eq!(anonymizer.len(), 2);
        assert_eq!(
            anonymizer.values().cloned().collect::<Vec<_>>(),
            vec![Term::iri("did:example:john"), Term::iri("urn:bnid:0:_:c14n0")]
        );
        assert!(uuid::Uuid::parse_str(&john).is_ok());
    }

    #[test]
    fn anonymize_document_rewrites_matching_strings_only() {
        let mut rng = StdRng::seed_from_u64(0u64);
        let mut anonymizer = UriAnonymizer::new();
        let token = anonymizer
            .register(&mut rng, Term::iri("did:example:john"))
            .to_string();
        let anon = format!("urn:anon:{}", token);

        let document = json!({
            "@graph": [
                {
                    "@id": "did:example:john",
                    "http://schema.org/knows": [{ "@id": "did:example:jane" }],
                    "http://schema.org/sameAs": [{ "@id": "did:example:john" }],
                    "http://schema.org/url": [{ "@value": "did:example:john" }],
                    "http://schema.org/age": [{ "@value": "30", "@type": "http://www.w3.org/2001/XMLSchema#integer" }]
                }
            ]
        });
        let anonymized = anonymizer.anonymize_document(&document);
        assert_eq!(
            anonymized,
            json!({
                "@graph": [
                    {
                        "@id": anon,
                        "http://schema.org/knows": [{ "@id": "did:example:jane" }],
                        "http://schema.org/sameAs": [{ "@id": anon }],
                        "http://schema.org/url": [{ "@value": "did:example:john" }],
                        "http://schema.org/age": [{ "@value": "30", "@type": "http://www.w3.org/2001/XMLSchema#integer" }]
                    }
                ]
            })
        );
    }

    #[test]
    fn anonymize_statement_matches_anonymize_document() {
        let mut rng = StdRng::seed_from_u64(1u64);
        let mut anonymizer = UriAnonymizer::new();
        let token = anonymizer
            .register(&mut rng, Term::iri("urn:bnid:0:_:c14n0"))
            .to_string();
        anonymizer.register(&mut rng, Term::iri("did:example:john"));

        let statement = Statement::parse(
            r#"<did:example:john> <http://schema.org/address> _:c14n0 ."#,
        )
        .unwrap()
        .skolemize(0);
        let anonymized = anonymizer.anonymize_statement(&statement);
        assert_eq!(anonymized.object, Term::anonymous(token.as_str()));
        assert_eq!(
            anonymized.subject.anonymous_token(),
            anonymizer.token(&Term::iri("did:example:john"))
        );
        assert_eq!(
            UriAnonymizer::extract_token(&anonymized.object),
            Some(token.as_str())
        );
        assert_eq!(UriAnonymizer::extract_token(&anonymized.predicate), None);
    }

    #[test]
    fn equivalence_classes_are_ordered_by_token() {
        let mut table = EquivalenceTable::new();
        table.record("b", 0, 2);
        table.record("a", 1, 4);
        table.record("b", 1, 8);
        assert_eq!(table.len(), 2);
        assert_eq!(table.get("b"), Some(&vec![(0, 2), (1, 8)]));
        assert_eq!(table.into_classes(), vec![vec![(1, 4)], vec![(0, 2), (1, 8)]]);
    }
}
