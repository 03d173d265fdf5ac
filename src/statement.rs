use crate::{
    constants::{ANONYMOUS_IRI_PREFIX, CANONICAL_BLANK_NODE_PREFIX, SKOLEM_IRI_PREFIX},
    context::XSD_STRING,
    error::RDFProofsError,
};
use oxrdf::{
    BlankNode, GraphName, Literal as OxLiteral, NamedNode, Quad, Subject, Term as OxTerm,
};
use oxttl::NQuadsParser;
use std::fmt;

/// One position of a canonical quad.
///
/// IRIs minted by this crate are tagged by scheme: `urn:bnid:<d>:_:c14nN` becomes
/// [`Term::Skolem`] and `urn:anon:<token>` becomes [`Term::Anonymous`], so that
/// callers never have to pattern-match serialized text.
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Term {
    Iri(String),
    Skolem {
        document_index: usize,
        label: String,
    },
    Anonymous(String),
    BlankNode(String),
    Literal {
        value: String,
        language: Option<String>,
        datatype: Option<String>,
    },
    DefaultGraph,
}

impl Term {
    /// classify an IRI by scheme
    pub fn iri(iri: impl Into<String>) -> Self {
        let iri = iri.into();
        if let Some(rest) = iri.strip_prefix(SKOLEM_IRI_PREFIX) {
            if let Some((index, label)) = rest.split_once(":_:") {
                if is_canonical_index(index) && is_canonical_blank_node_label(label) {
                    if let Ok(document_index) = index.parse() {
                        return Term::Skolem {
                            document_index,
                            label: label.to_string(),
                        };
                    }
                }
            }
        } else if let Some(token) = iri.strip_prefix(ANONYMOUS_IRI_PREFIX) {
            if !token.is_empty() {
                return Term::Anonymous(token.to_string());
            }
        }
        Term::Iri(iri)
    }

    pub fn blank_node(label: impl Into<String>) -> Self {
        Term::BlankNode(label.into())
    }

    pub fn simple_literal(value: impl Into<String>) -> Self {
        Term::Literal {
            value: value.into(),
            language: None,
            datatype: None,
        }
    }

    pub fn typed_literal(value: impl Into<String>, datatype: impl Into<String>) -> Self {
        let datatype = datatype.into();
        Term::Literal {
            value: value.into(),
            language: None,
            datatype: if datatype == XSD_STRING.as_str() {
                None
            } else {
                Some(datatype)
            },
        }
    }

    pub fn language_tagged_literal(value: impl Into<String>, language: impl Into<String>) -> Self {
        Term::Literal {
            value: value.into(),
            language: Some(language.into()),
            datatype: None,
        }
    }

    pub fn anonymous(token: impl Into<String>) -> Self {
        Term::Anonymous(token.into())
    }

    /// the IRI denoted by this term, for IRI-kind terms
    pub fn iri_value(&self) -> Option<String> {
        match self {
            Term::Iri(iri) => Some(iri.clone()),
            Term::Skolem {
                document_index,
                label,
            } => Some(format!("{}{}:_:{}", SKOLEM_IRI_PREFIX, document_index, label)),
            Term::Anonymous(token) => Some(format!("{}{}", ANONYMOUS_IRI_PREFIX, token)),
            _ => None,
        }
    }

    pub fn anonymous_token(&self) -> Option<&str> {
        match self {
            Term::Anonymous(token) => Some(token),
            _ => None,
        }
    }

    pub fn is_skolem(&self) -> bool {
        matches!(self, Term::Skolem { .. })
    }

    fn is_subject(&self) -> bool {
        matches!(
            self,
            Term::Iri(_) | Term::Skolem { .. } | Term::Anonymous(_) | Term::BlankNode(_)
        )
    }

    fn is_iri(&self) -> bool {
        matches!(self, Term::Iri(_) | Term::Skolem { .. } | Term::Anonymous(_))
    }

    fn skolemize(&self, document_index: usize) -> Self {
        match self {
            Term::BlankNode(label) if is_canonical_blank_node_label(label) => Term::Skolem {
                document_index,
                label: label.clone(),
            },
            _ => self.clone(),
        }
    }

    fn deskolemize(&self) -> Self {
        match self {
            Term::Skolem { label, .. } => Term::BlankNode(label.clone()),
            _ => self.clone(),
        }
    }

    fn to_subject(&self) -> Result<Subject, RDFProofsError> {
        match self {
            Term::BlankNode(label) => Ok(BlankNode::new_unchecked(label).into()),
            _ => Ok(self.to_named_node()?.into()),
        }
    }

    fn to_named_node(&self) -> Result<NamedNode, RDFProofsError> {
        self.iri_value()
            .map(NamedNode::new_unchecked)
            .ok_or_else(|| RDFProofsError::Parse(format!("{:?} is not an IRI", self)))
    }

    fn to_ox_term(&self) -> Result<OxTerm, RDFProofsError> {
        match self {
            Term::Literal {
                value,
                language: Some(language),
                ..
            } => Ok(OxLiteral::new_language_tagged_literal_unchecked(value, language).into()),
            Term::Literal {
                value,
                datatype: Some(datatype),
                ..
            } => Ok(OxLiteral::new_typed_literal(value, NamedNode::new_unchecked(datatype)).into()),
            Term::Literal { value, .. } => Ok(OxLiteral::new_simple_literal(value).into()),
            Term::DefaultGraph => Err(RDFProofsError::Parse("default graph".to_string())),
            _ => Ok(self.to_subject()?.into()),
        }
    }

    fn from_subject(subject: Subject) -> Result<Self, RDFProofsError> {
        match subject {
            Subject::NamedNode(node) => Ok(Term::iri(node.into_string())),
            Subject::BlankNode(node) => Ok(Term::BlankNode(node.into_string())),
            #[allow(unreachable_patterns)]
            other => Err(RDFProofsError::Parse(other.to_string())),
        }
    }

    fn from_ox_term(term: OxTerm) -> Result<Self, RDFProofsError> {
        match term {
            OxTerm::NamedNode(node) => Ok(Term::iri(node.into_string())),
            OxTerm::BlankNode(node) => Ok(Term::BlankNode(node.into_string())),
            OxTerm::Literal(literal) => Ok(Term::from_literal(literal)),
            #[allow(unreachable_patterns)]
            other => Err(RDFProofsError::Parse(other.to_string())),
        }
    }

    fn from_literal(literal: OxLiteral) -> Self {
        match literal.destruct() {
            (value, _, Some(language)) => Term::language_tagged_literal(value, language),
            (value, Some(datatype), None) => Term::typed_literal(value, datatype.into_string()),
            (value, None, None) => Term::simple_literal(value),
        }
    }

    fn from_graph_name(graph_name: GraphName) -> Self {
        match graph_name {
            GraphName::NamedNode(node) => Term::iri(node.into_string()),
            GraphName::BlankNode(node) => Term::BlankNode(node.into_string()),
            GraphName::DefaultGraph => Term::DefaultGraph,
        }
    }

    fn to_graph_name(&self) -> Result<GraphName, RDFProofsError> {
        match self {
            Term::DefaultGraph => Ok(GraphName::DefaultGraph),
            Term::BlankNode(label) => Ok(BlankNode::new_unchecked(label).into()),
            _ => Ok(self.to_named_node()?.into()),
        }
    }
}

/// canonical N-Quads form; literal escaping is the one of `oxrdf`
impl fmt::Display for Term {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Term::DefaultGraph => Ok(()),
            _ => write!(f, "{}", self.to_ox_term().map_err(|_| fmt::Error)?),
        }
    }
}

/// A canonical quad with its fixed subject, predicate, object, graph decomposition.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct Statement {
    pub subject: Term,
    pub predicate: Term,
    pub object: Term,
    pub graph: Term,
}

impl Statement {
    pub fn new(subject: Term, predicate: Term, object: Term, graph: Term) -> Self {
        Self {
            subject,
            predicate,
            object,
            graph,
        }
    }

    /// Parse exactly one N-Quads statement.
    pub fn parse(line: &str) -> Result<Self, RDFProofsError> {
        let mut statements = Self::parse_all(line)?;
        match statements.pop() {
            Some(statement) if statements.is_empty() => Ok(statement),
            _ => Err(RDFProofsError::Parse(line.to_string())),
        }
    }

    /// Parse an N-Quads document; blank and comment lines are skipped.
    pub fn parse_all(nquads: &str) -> Result<Vec<Self>, RDFProofsError> {
        NQuadsParser::new()
            .for_reader(nquads.as_bytes())
            .map(|quad| Self::try_from(quad?))
            .collect()
    }

    pub fn terms(&self) -> [&Term; 4] {
        [&self.subject, &self.predicate, &self.object, &self.graph]
    }

    pub fn to_terms(&self) -> [String; 4] {
        self.terms().map(|t| t.to_string())
    }

    pub fn skolemize(&self, document_index: usize) -> Self {
        Self::new(
            self.subject.skolemize(document_index),
            self.predicate.clone(),
            self.object.skolemize(document_index),
            self.graph.skolemize(document_index),
        )
    }

    pub fn deskolemize(&self) -> Self {
        Self::new(
            self.subject.deskolemize(),
            self.predicate.clone(),
            self.object.deskolemize(),
            self.graph.deskolemize(),
        )
    }

    pub fn substitute(&self, from: &Term, to: &Term) -> Self {
        let replace = |t: &Term| if t == from { to.clone() } else { t.clone() };
        Self::new(
            replace(&self.subject),
            replace(&self.predicate),
            replace(&self.object),
            replace(&self.graph),
        )
    }

    pub fn to_quad(&self) -> Result<Quad, RDFProofsError> {
        Ok(Quad::new(
            self.subject.to_subject()?,
            self.predicate.to_named_node()?,
            self.object.to_ox_term()?,
            self.graph.to_graph_name()?,
        ))
    }
}

impl TryFrom<Quad> for Statement {
    type Error = RDFProofsError;

    fn try_from(quad: Quad) -> Result<Self, Self::Error> {
        Ok(Self::new(
            Term::from_subject(quad.subject)?,
            Term::iri(quad.predicate.into_string()),
            Term::from_ox_term(quad.object)?,
            Term::from_graph_name(quad.graph_name),
        ))
    }
}

impl fmt::Display for Statement {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {} {} ", self.subject, self.predicate, self.object)?;
        if self.graph != Term::DefaultGraph {
            write!(f, "{} ", self.graph)?;
        }
        write!(f, ".")
    }
}

/// Byte serialization of statements, one newline-terminated line each.
pub fn serialize_statements<'a>(statements: impl IntoIterator<Item = &'a Statement>) -> Vec<u8> {
    statements
        .into_iter()
        .flat_map(|s| format!("{}\n", s).into_bytes())
        .collect()
}

/// flat message array, four terms per statement
pub fn statements_to_messages<'a>(
    statements: impl IntoIterator<Item = &'a Statement>,
) -> Vec<Vec<u8>> {
    statements
        .into_iter()
        .flat_map(|s| s.to_terms())
        .map(String::into_bytes)
        .collect()
}

pub(crate) fn is_canonical_blank_node_label(label: &str) -> bool {
    label
        .strip_prefix(CANONICAL_BLANK_NODE_PREFIX)
        .map_or(false, |n| !n.is_empty() && n.bytes().all(|b| b.is_ascii_digit()))
}

fn is_canonical_index(index: &str) -> bool {
    !index.is_empty()
        && index.bytes().all(|b| b.is_ascii_digit())
        && (index == "0" || !index.starts_with('0'))
}

#[cfg(test)]
mod tests {
    use super::{serialize_statements, statements_to_messages, Statement, Term};
    use crate::error::RDFProofsError;
    use oxrdf::{Dataset, GraphName, Literal, NamedNode, Quad};

    const LINES: [&str; 8] = [
        r#"<did:example:john> <http://schema.org/name> "John Smith" ."#,
        r#"<did:example:john> <http://schema.org/name> "Jean"@fr ."#,
        r#"<did:example:john> <http://schema.org/birthDate> "1990-01-01T00:00:00Z"^^<http://www.w3.org/2001/XMLSchema#dateTime> ."#,
        r#"_:c14n0 <http://www.w3.org/1999/02/22-rdf-syntax-ns#type> <http://schema.org/Person> _:c14n1 ."#,
        r#"<did:example:john> <http://schema.org/knows> _:c14n2 <http://example.org/graph> ."#,
        r#"<did:example:john> <http://schema.org/description> "line1\nline2 \"quoted\" \\ back\r" ."#,
        r#"<urn:bnid:3:_:c14n0> <http://schema.org/address> <urn:anon:2a1e5b0f-9f57-4c1b-bd35-5a2a0d6a3d11> ."#,
        r#"<http://example.org/vc/1> <https://w3id.org/security#proof> _:b0 ."#,
    ];

    #[test]
    fn parse_and_serialize_round_trip() {
        for line in LINES {
            let statement = Statement::parse(line).unwrap();
            assert_eq!(statement.to_string(), line);
        }
    }

    #[test]
    fn parse_all_skips_blank_and_comment_lines() {
        let nquads = format!("# comment\n{}\n\n  {}  \n", LINES[0], LINES[1]);
        let statements = Statement::parse_all(&nquads).unwrap();
        assert_eq!(statements.len(), 2);
    }

    #[test]
    fn to_terms_follows_term_kind_rules() {
        let statement = Statement::parse(LINES[2]).unwrap();
        assert_eq!(
            statement.to_terms(),
            [
                "<did:example:john>".to_string(),
                "<http://schema.org/birthDate>".to_string(),
                "\"1990-01-01T00:00:00Z\"^^<http://www.w3.org/2001/XMLSchema#dateTime>"
                    .to_string(),
                "".to_string(),
            ]
        );

        let statement = Statement::parse(LINES[3]).unwrap();
        assert_eq!(statement.to_terms()[0], "_:c14n0");
        assert_eq!(statement.to_terms()[3], "_:c14n1");

        let statement = Statement::parse(LINES[1]).unwrap();
        assert_eq!(statement.to_terms()[2], "\"Jean\"@fr");
    }

    #[test]
    fn explicit_xsd_string_is_omitted() {
        let statement = Statement::parse(
            r#"<did:example:john> <http://schema.org/name> "John"^^<http://www.w3.org/2001/XMLSchema#string> ."#,
        )
        .unwrap();
        assert_eq!(statement.to_terms()[2], "\"John\"");
    }

    #[test]
    fn scheme_tagged_iris() {
        let statement = Statement::parse(LINES[6]).unwrap();
        assert_eq!(
            statement.subject,
            Term::Skolem {
                document_index: 3,
                label: "c14n0".to_string()
            }
        );
        assert_eq!(
            statement.object.anonymous_token(),
            Some("2a1e5b0f-9f57-4c1b-bd35-5a2a0d6a3d11")
        );
        // non-canonical document index stays a plain IRI
        assert_eq!(
            Term::iri("urn:bnid:03:_:c14n0"),
            Term::Iri("urn:bnid:03:_:c14n0".to_string())
        );
        assert_eq!(Term::iri("urn:anon:"), Term::Iri("urn:anon:".to_string()));
    }

    #[test]
    fn skolemize_and_deskolemize_are_inverse() {
        for line in [LINES[3], LINES[4]] {
            let statement = Statement::parse(line).unwrap();
            for document_index in [0, 1, 42] {
                let skolemized = statement.skolemize(document_index);
                assert!(!skolemized.to_string().contains(" _:"));
                assert!(skolemized
                    .to_string()
                    .contains(&format!("<urn:bnid:{}:_:c14n", document_index)));
                assert_eq!(skolemized.deskolemize().to_string(), line);
            }
        }
    }

    #[test]
    fn skolemize_keeps_non_canonical_blank_nodes() {
        let statement = Statement::parse(LINES[7]).unwrap();
        assert_eq!(statement.skolemize(0), statement);
    }

    #[test]
    fn skolemized_documents_do_not_collide() {
        let statement = Statement::parse(LINES[3]).unwrap();
        assert_ne!(statement.skolemize(0), statement.skolemize(1));
    }

    #[test]
    fn substitute_replaces_every_matching_position() {
        let statement = Statement::parse(
            r#"<did:example:john> <http://schema.org/knows> <did:example:john> <did:example:john> ."#,
        )
        .unwrap();
        let substituted = statement.substitute(
            &Term::iri("did:example:john"),
            &Term::anonymous("token"),
        );
        assert_eq!(
            substituted.to_string(),
            "<urn:anon:token> <http://schema.org/knows> <urn:anon:token> <urn:anon:token> ."
        );
        let untouched =
            statement.substitute(&Term::iri("did:example:jane"), &Term::anonymous("token"));
        assert_eq!(untouched, statement);
    }

    #[test]
    fn malformed_lines_are_rejected() {
        for line in [
            r#"<did:example:john> <http://schema.org/name> "John Smith""#,
            r#"<did:example:john> _:b0 "John Smith" ."#,
            r#""John" <http://schema.org/name> "John Smith" ."#,
            r#"<did:example:john> <http://schema.org/name> "John Smith ."#,
            r#"<did:example:john> <http://schema.org/name> "John"@ ."#,
            r#"<did:example:john> <http://schema.org/name> "John" "graph" ."#,
            r#"<did:example:john> <http://schema.org/name> "John" . trailing"#,
            r#"<did:example john> <http://schema.org/name> "John" ."#,
            r#"<did:example:john> <http://schema.org/name> "bad\qescape" ."#,
            "",
            concat!(
                r#"<did:example:john> <http://schema.org/name> "John" ."#,
                "\n",
                r#"<did:example:john> <http://schema.org/name> "Jean" ."#
            ),
        ] {
            assert!(
                matches!(Statement::parse(line), Err(RDFProofsError::Parse(_))),
                "{}",
                line
            );
        }
    }

    #[test]
    fn unicode_escapes_are_decoded() {
        let statement =
            Statement::parse(r#"<did:example:john> <http://schema.org/name> "caf\u00E9" ."#)
                .unwrap();
        assert_eq!(statement.to_terms()[2], "\"café\"");
    }

    #[test]
    fn control_characters_are_escaped_canonically() {
        let statement = Statement::new(
            Term::iri("did:example:john"),
            Term::iri("http://schema.org/name"),
            Term::simple_literal("John\tSmith\u{7F}"),
            Term::DefaultGraph,
        );
        let line = r#"<did:example:john> <http://schema.org/name> "John\tSmith\u007F" ."#;
        assert_eq!(statement.to_string(), line);
        assert_eq!(Statement::parse(line).unwrap(), statement);
    }

    #[test]
    fn tagged_and_typed_literals_escape_control_characters() {
        for (object, expected) in [
            (
                Term::language_tagged_literal("a\u{0}b\u{8}c", "en"),
                r#""a\u0000b\bc"@en"#,
            ),
            (
                Term::typed_literal("1\u{C}2\u{1F}", "http://example.org/datatype"),
                r#""1\f2\u001F"^^<http://example.org/datatype>"#,
            ),
        ] {
            let statement = Statement::new(
                Term::iri("did:example:john"),
                Term::iri("http://schema.org/description"),
                object.clone(),
                Term::DefaultGraph,
            );
            assert_eq!(statement.to_terms()[2], expected);
            let parsed = Statement::parse(&statement.to_string()).unwrap();
            assert_eq!(parsed.object, object);
        }
    }

    #[test]
    fn serialization_matches_canonicalized_output() {
        let quad = Quad::new(
            NamedNode::new_unchecked("did:example:john"),
            NamedNode::new_unchecked("http://schema.org/name"),
            Literal::new_simple_literal("John\tSmith\u{7F}\u{8}"),
            GraphName::DefaultGraph,
        );
        let mut dataset = Dataset::new();
        dataset.insert(&quad);
        let canonicalized = rdf_canon::canonicalize(&dataset).unwrap();

        let statements = Statement::parse_all(&canonicalized).unwrap();
        assert_eq!(
            String::from_utf8(serialize_statements(&statements)).unwrap(),
            canonicalized
        );
        assert_eq!(Statement::try_from(quad).unwrap(), statements[0]);
    }

    #[test]
    fn serialize_statements_terminates_each_line() {
        let statements = vec![
            Statement::parse(LINES[0]).unwrap(),
            Statement::parse(LINES[1]).unwrap(),
        ];
        assert_eq!(
            serialize_statements(&statements),
            format!("{}\n{}\n", LINES[0], LINES[1]).into_bytes()
        );
    }

    #[test]
    fn messages_are_four_terms_per_statement() {
        let statement = Statement::parse(LINES[0]).unwrap();
        let messages = statements_to_messages([&statement, &statement]);
        assert_eq!(messages.len(), 8);
        assert_eq!(messages[4], statement.to_terms()[0].as_bytes().to_vec());
        assert_eq!(messages[3], messages[7]);
    }
}
