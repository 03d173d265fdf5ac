//! Conversion between JSON-LD documents and canonical statements.
//!
//! Only a context-light profile of JSON-LD is supported: local `@context` objects
//! with `@vocab`, term and prefix definitions (optionally with `@type` coercion),
//! node objects, value objects and named graphs. Remote contexts and lists are
//! rejected.

use crate::{
    context::{RDF_TYPE, XSD_BOOLEAN, XSD_DOUBLE, XSD_INTEGER},
    error::RDFProofsError,
    statement::{Statement, Term},
};
use log::{debug, trace};
use oxiri::Iri;
use oxrdf::Dataset;
use serde_json::{json, Map, Number, Value};
use std::collections::{BTreeMap, HashMap};

/// Produces the canonical statements of a JSON-LD document.
pub trait Canonicalizer {
    fn canonicalize(&self, document: &Value) -> Result<Vec<Statement>, RDFProofsError>;
}

/// RDF Dataset Canonicalization over the statements produced by [`to_rdf`].
#[derive(Debug, Default, Clone, Copy)]
pub struct RdfCanonicalizer;

impl Canonicalizer for RdfCanonicalizer {
    fn canonicalize(&self, document: &Value) -> Result<Vec<Statement>, RDFProofsError> {
        let quads = to_rdf(document)?
            .iter()
            .map(Statement::to_quad)
            .collect::<Result<Vec<_>, _>>()?;
        let mut dataset = Dataset::new();
        for quad in &quads {
            dataset.insert(quad);
        }
        let canonicalized = rdf_canon::canonicalize(&dataset)?;
        let statements = Statement::parse_all(&canonicalized)?;
        debug!("canonicalized {} statements", statements.len());
        trace!("canonical statements:\n{}", canonicalized);
        Ok(statements)
    }
}

#[derive(Clone, Debug)]
struct TermDefinition {
    iri: String,
    type_mapping: Option<String>,
}

#[derive(Clone, Debug, Default)]
pub(crate) struct ActiveContext {
    vocab: Option<String>,
    terms: HashMap<String, TermDefinition>,
}

impl ActiveContext {
    pub(crate) fn with(&self, local: &Value) -> Result<Self, RDFProofsError> {
        match local {
            Value::Null => Ok(Self::default()),
            Value::Array(contexts) => contexts
                .iter()
                .try_fold(self.clone(), |ctx, local| ctx.with(local)),
            Value::Object(definitions) => {
                let mut ctx = self.clone();
                if let Some(vocab) = definitions.get("@vocab") {
                    ctx.vocab = match vocab {
                        Value::String(v) => Some(self.expand_iri(v, true)?.unwrap_or(v.clone())),
                        Value::Null => None,
                        _ => return Err(RDFProofsError::JsonLd("invalid @vocab".to_string())),
                    };
                }
                // terms used as prefixes by sibling definitions are defined first
                let uses_local_prefix = |term: &str, definition: &Value| {
                    let id = match definition {
                        Value::String(id) => Some(id.as_str()),
                        Value::Object(d) => d.get("@id").and_then(Value::as_str),
                        _ => None,
                    };
                    id.and_then(|id| id.split_once(':'))
                        .map_or(false, |(prefix, suffix)| {
                            prefix != term
                                && !suffix.starts_with("//")
                                && definitions.contains_key(prefix)
                        })
                };
                let mut ordered: Vec<(&String, &Value)> = definitions
                    .iter()
                    .filter(|(term, _)| !term.starts_with('@'))
                    .collect();
                ordered.sort_by_key(|(term, definition)| uses_local_prefix(term, definition));

                for (term, definition) in ordered {
                    let (id, type_mapping) = match definition {
                        Value::String(id) => (id.as_str(), None),
                        Value::Object(d) => {
                            let id = match d.get("@id") {
                                Some(Value::String(id)) => id.as_str(),
                                _ => term.as_str(),
                            };
                            let type_mapping = match d.get("@type") {
                                Some(Value::String(t)) if t.starts_with('@') => Some(t.clone()),
                                Some(Value::String(t)) => ctx.expand_iri(t, true)?,
                                _ => None,
                            };
                            (id, type_mapping)
                        }
                        Value::Null => {
                            ctx.terms.remove(term);
                            continue;
                        }
                        _ => {
                            return Err(RDFProofsError::JsonLd(format!(
                                "invalid term definition: {}",
                                term
                            )))
                        }
                    };
                    if let Some(iri) = ctx.expand_iri(id, true)? {
                        ctx.terms.insert(term.clone(), TermDefinition { iri, type_mapping });
                    }
                }
                Ok(ctx)
            }
            Value::String(url) => Err(RDFProofsError::JsonLd(format!(
                "remote contexts are not supported: {}",
                url
            ))),
            _ => Err(RDFProofsError::JsonLd("invalid @context".to_string())),
        }
    }

    /// Expand a term, compact IRI or absolute IRI; `None` when it cannot be mapped.
    pub(crate) fn expand_iri(
        &self,
        value: &str,
        vocab: bool,
    ) -> Result<Option<String>, RDFProofsError> {
        if value.starts_with("_:") {
            return Ok(Some(value.to_string()));
        }
        if vocab {
            if let Some(definition) = self.terms.get(value) {
                return Ok(Some(definition.iri.clone()));
            }
        }
        if let Some((prefix, suffix)) = value.split_once(':') {
            if !suffix.starts_with("//") {
                if let Some(definition) = self.terms.get(prefix) {
                    return Ok(Some(format!("{}{}", definition.iri, suffix)));
                }
            }
            Iri::parse(value)?;
            return Ok(Some(value.to_string()));
        }
        match (vocab, &self.vocab) {
            (true, Some(v)) => Ok(Some(format!("{}{}", v, value))),
            _ => Ok(None),
        }
    }

    fn type_mapping(&self, term: &str) -> Option<&str> {
        self.terms
            .get(term)
            .and_then(|d| d.type_mapping.as_deref())
    }
}

fn node_term(id: &str) -> Term {
    match id.strip_prefix("_:") {
        Some(label) => Term::blank_node(label),
        None => Term::iri(id),
    }
}

fn node_id(term: &Term) -> Option<String> {
    match term {
        Term::BlankNode(label) => Some(format!("_:{}", label)),
        _ => term.iri_value(),
    }
}

/// Convert a JSON-LD document into (non-canonical) statements.
pub fn to_rdf(document: &Value) -> Result<Vec<Statement>, RDFProofsError> {
    let mut builder = RdfBuilder::default();
    builder.document(&ActiveContext::default(), document)?;
    Ok(builder.statements)
}

#[derive(Default)]
struct RdfBuilder {
    statements: Vec<Statement>,
    blank_node_counter: usize,
}

impl RdfBuilder {
    fn document(&mut self, ctx: &ActiveContext, document: &Value) -> Result<(), RDFProofsError> {
        match document {
            Value::Array(nodes) => nodes.iter().try_for_each(|n| self.document(ctx, n)),
            Value::Object(map) => {
                let ctx = match map.get("@context") {
                    Some(local) => ctx.with(local)?,
                    None => ctx.clone(),
                };
                if map.contains_key("@graph")
                    && map.keys().all(|k| k == "@context" || k == "@graph")
                {
                    match &map["@graph"] {
                        Value::Array(nodes) => {
                            for node in nodes {
                                self.node(&ctx, node, &Term::DefaultGraph)?;
                            }
                        }
                        node => {
                            self.node(&ctx, node, &Term::DefaultGraph)?;
                        }
                    }
                    Ok(())
                } else {
                    self.node(&ctx, document, &Term::DefaultGraph).map(|_| ())
                }
            }
            _ => Err(RDFProofsError::JsonLd(
                "document must be an object or an array".to_string(),
            )),
        }
    }

    fn fresh_blank_node(&mut self) -> Term {
        let label = format!("jld{}", self.blank_node_counter);
        self.blank_node_counter += 1;
        Term::blank_node(label)
    }

    fn node(
        &mut self,
        ctx: &ActiveContext,
        node: &Value,
        graph: &Term,
    ) -> Result<Term, RDFProofsError> {
        let map = node
            .as_object()
            .ok_or(RDFProofsError::JsonLd("node must be an object".to_string()))?;
        let ctx = match map.get("@context") {
            Some(local) => ctx.with(local)?,
            None => ctx.clone(),
        };

        let subject = match map.get("@id") {
            Some(Value::String(id)) => match ctx.expand_iri(id, false)? {
                Some(id) => node_term(&id),
                None => {
                    return Err(RDFProofsError::JsonLd(format!(
                        "relative IRIs are not supported: {}",
                        id
                    )))
                }
            },
            Some(_) => return Err(RDFProofsError::JsonLd("invalid @id".to_string())),
            None => self.fresh_blank_node(),
        };

        for (key, value) in map {
            match key.as_str() {
                "@context" | "@id" => {}
                "@type" => {
                    for t in as_array(value) {
                        let t = t
                            .as_str()
                            .ok_or(RDFProofsError::JsonLd("invalid @type".to_string()))?;
                        if let Some(iri) = ctx.expand_iri(t, true)? {
                            self.statements.push(Statement::new(
                                subject.clone(),
                                Term::iri(RDF_TYPE.as_str()),
                                node_term(&iri),
                                graph.clone(),
                            ));
                        }
                    }
                }
                "@graph" => {
                    for n in as_array(value) {
                        self.node(&ctx, n, &subject)?;
                    }
                }
                "@list" | "@reverse" => {
                    return Err(RDFProofsError::JsonLd(format!("{} is not supported", key)))
                }
                k if k.starts_with('@') => {}
                property => {
                    let Some(predicate) = ctx.expand_iri(property, true)? else {
                        continue;
                    };
                    let type_mapping = ctx.type_mapping(property).map(str::to_string);
                    for v in as_array(value) {
                        if let Some(object) =
                            self.object(&ctx, v, type_mapping.as_deref(), graph)?
                        {
                            self.statements.push(Statement::new(
                                subject.clone(),
                                Term::iri(predicate.as_str()),
                                object,
                                graph.clone(),
                            ));
                        }
                    }
                }
            }
        }
        Ok(subject)
    }

    fn object(
        &mut self,
        ctx: &ActiveContext,
        value: &Value,
        type_mapping: Option<&str>,
        graph: &Term,
    ) -> Result<Option<Term>, RDFProofsError> {
        match value {
            Value::Null => Ok(None),
            Value::String(s) => match type_mapping {
                Some("@id") | Some("@vocab") => {
                    let id = ctx
                        .expand_iri(s, type_mapping == Some("@vocab"))?
                        .ok_or(RDFProofsError::JsonLd(format!(
                            "relative IRIs are not supported: {}",
                            s
                        )))?;
                    Ok(Some(node_term(&id)))
                }
                Some(datatype) if !datatype.starts_with('@') => {
                    Ok(Some(Term::typed_literal(s.as_str(), datatype)))
                }
                _ => Ok(Some(Term::simple_literal(s.as_str()))),
            },
            Value::Bool(b) => Ok(Some(Term::typed_literal(b.to_string(), XSD_BOOLEAN.as_str()))),
            Value::Number(n) => {
                let (lexical, datatype) = number_to_lexical(n);
                Ok(Some(Term::typed_literal(
                    lexical,
                    type_mapping
                        .filter(|t| !t.starts_with('@'))
                        .unwrap_or(datatype),
                )))
            }
            Value::Object(map) if map.contains_key("@value") => {
                let lexical = match &map["@value"] {
                    Value::String(s) => s.clone(),
                    Value::Bool(b) => b.to_string(),
                    Value::Number(n) => number_to_lexical(n).0,
                    Value::Null => return Ok(None),
                    _ => return Err(RDFProofsError::JsonLd("invalid @value".to_string())),
                };
                match (map.get("@type"), map.get("@language")) {
                    (Some(Value::String(t)), None) => {
                        let datatype = ctx.expand_iri(t, true)?.ok_or(RDFProofsError::JsonLd(
                            format!("invalid datatype: {}", t),
                        ))?;
                        Ok(Some(Term::typed_literal(lexical, datatype)))
                    }
                    (None, Some(Value::String(language))) => Ok(Some(
                        Term::language_tagged_literal(lexical, language.to_lowercase()),
                    )),
                    (None, None) => Ok(Some(Term::simple_literal(lexical))),
                    _ => Err(RDFProofsError::JsonLd("invalid value object".to_string())),
                }
            }
            Value::Object(map) if map.contains_key("@list") => {
                Err(RDFProofsError::JsonLd("@list is not supported".to_string()))
            }
            Value::Object(map)
                if map.len() == 1 && matches!(map.get("@id"), Some(Value::String(_))) =>
            {
                let id = map["@id"].as_str().unwrap_or_default();
                let id = ctx
                    .expand_iri(id, false)?
                    .ok_or(RDFProofsError::JsonLd(format!(
                        "relative IRIs are not supported: {}",
                        id
                    )))?;
                Ok(Some(node_term(&id)))
            }
            Value::Object(_) => Ok(Some(self.node(ctx, value, graph)?)),
            Value::Array(_) => Err(RDFProofsError::JsonLd(
                "nested arrays are not supported".to_string(),
            )),
        }
    }
}

fn as_array(value: &Value) -> Vec<&Value> {
    match value {
        Value::Array(values) => values.iter().collect(),
        Value::Object(map) if map.contains_key("@set") => as_array(&map["@set"]),
        _ => vec![value],
    }
}

fn number_to_lexical(n: &Number) -> (String, &'static str) {
    if let Some(i) = n.as_i64() {
        return (i.to_string(), XSD_INTEGER.as_str());
    }
    if let Some(u) = n.as_u64() {
        return (u.to_string(), XSD_INTEGER.as_str());
    }
    let f = n.as_f64().unwrap_or_default();
    if f.fract() == 0.0 && f.abs() < 1e21 {
        return (format!("{:.0}", f), XSD_INTEGER.as_str());
    }
    let lexical = format!("{:E}", f);
    let lexical = match lexical.split_once('E') {
        Some((mantissa, exponent)) if !mantissa.contains('.') => {
            format!("{}.0E{}", mantissa, exponent)
        }
        _ => lexical,
    };
    (lexical, XSD_DOUBLE.as_str())
}

#[derive(Default)]
struct NodeObject {
    types: Vec<Value>,
    properties: BTreeMap<String, Vec<Value>>,
}

impl NodeObject {
    fn add(&mut self, predicate: &str, object: &Term) {
        let value = object_value(object);
        if predicate == RDF_TYPE.as_str() && !matches!(object, Term::Literal { .. }) {
            if !self.types.contains(&value["@id"]) {
                self.types.push(value["@id"].clone());
            }
        } else {
            let values = self.properties.entry(predicate.to_string()).or_default();
            if !values.contains(&value) {
                values.push(value);
            }
        }
    }

    fn into_value(self, id: String, graph: Option<Vec<Value>>) -> Value {
        let mut map = Map::new();
        map.insert("@id".to_string(), Value::String(id));
        if !self.types.is_empty() {
            map.insert("@type".to_string(), Value::Array(self.types));
        }
        for (property, values) in self.properties {
            map.insert(property, Value::Array(values));
        }
        if let Some(nodes) = graph {
            map.insert("@graph".to_string(), Value::Array(nodes));
        }
        Value::Object(map)
    }
}

fn object_value(term: &Term) -> Value {
    match term {
        Term::Literal {
            value,
            language: Some(language),
            ..
        } => json!({ "@value": value, "@language": language }),
        Term::Literal {
            value,
            datatype: Some(datatype),
            ..
        } => json!({ "@value": value, "@type": datatype }),
        Term::Literal { value, .. } => json!({ "@value": value }),
        _ => json!({ "@id": node_id(term).unwrap_or_default() }),
    }
}

/// Convert statements into a flattened, expanded JSON-LD document `{"@graph": [...]}`.
///
/// Nodes are sorted by `@id`; statements of a named graph are nested under the
/// `@graph` of the node naming that graph.
pub fn from_rdf(statements: &[Statement]) -> Value {
    let mut graphs: BTreeMap<Option<String>, BTreeMap<String, NodeObject>> = BTreeMap::new();
    for statement in statements {
        let (Some(subject), Some(predicate)) =
            (node_id(&statement.subject), statement.predicate.iri_value())
        else {
            continue;
        };
        graphs
            .entry(node_id(&statement.graph))
            .or_default()
            .entry(subject)
            .or_default()
            .add(&predicate, &statement.object);
    }

    let mut default_graph = graphs.remove(&None).unwrap_or_default();
    let mut named_graphs: BTreeMap<String, Vec<Value>> = BTreeMap::new();
    for (graph_name, nodes) in graphs {
        if let Some(graph_name) = graph_name {
            default_graph.entry(graph_name.clone()).or_default();
            named_graphs.insert(
                graph_name,
                nodes
                    .into_iter()
                    .map(|(id, node)| node.into_value(id, None))
                    .collect(),
            );
        }
    }

    let nodes: Vec<Value> = default_graph
        .into_iter()
        .map(|(id, node)| {
            let graph = named_graphs.remove(&id);
            node.into_value(id, graph)
        })
        .collect();
    json!({ "@graph": nodes })
}
