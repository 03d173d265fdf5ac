use crate::{
    context::RDF_TYPE,
    error::RDFProofsError,
    jsonld::{from_rdf, to_rdf, ActiveContext},
    statement::{Statement, Term},
};
use log::debug;
use serde_json::Value;
use std::collections::{BTreeMap, BTreeSet, HashSet};

/// Selects the revealed part of a JSON-LD document.
pub trait Framer {
    fn frame(&self, document: &Value, frame: &Value) -> Result<Value, RDFProofsError>;
}

/// Frame matching by `@id` / `@type` with `@explicit` property selection.
///
/// Only the default graph is framed and the result is returned flattened, one
/// node object per subject.
#[derive(Debug, Default, Clone, Copy)]
pub struct ExplicitFramer;

#[derive(Debug, Default)]
struct FrameNode {
    key: usize,
    ids: Option<Vec<String>>,
    types: Option<Vec<String>>,
    explicit: Option<bool>,
    properties: BTreeMap<String, FrameNode>,
}

impl FrameNode {
    fn parse(
        ctx: &ActiveContext,
        frame: &Value,
        counter: &mut usize,
    ) -> Result<Self, RDFProofsError> {
        *counter += 1;
        let mut node = FrameNode {
            key: *counter,
            ..Default::default()
        };
        let map = match frame {
            Value::Object(map) => map,
            Value::Array(frames) => {
                return match frames.first() {
                    Some(first) => Self::parse(ctx, first, counter),
                    None => Ok(node),
                }
            }
            _ => return Ok(node),
        };
        let ctx = match map.get("@context") {
            Some(local) => ctx.with(local)?,
            None => ctx.clone(),
        };

        for (key, value) in map {
            match key.as_str() {
                "@id" => {
                    let ids = strings(value)
                        .ok_or(RDFProofsError::InvalidFrame("invalid @id in frame".to_string()))?;
                    node.ids = Some(
                        ids.into_iter()
                            .filter_map(|id| ctx.expand_iri(id, false).transpose())
                            .collect::<Result<_, _>>()?,
                    );
                }
                "@type" => {
                    if let Some(types) = strings(value) {
                        node.types = Some(
                            types
                                .into_iter()
                                .filter_map(|t| ctx.expand_iri(t, true).transpose())
                                .collect::<Result<_, _>>()?,
                        );
                    }
                }
                "@explicit" => {
                    node.explicit = Some(value.as_bool().ok_or(RDFProofsError::InvalidFrame(
                        "invalid @explicit in frame".to_string(),
                    ))?);
                }
                k if k.starts_with('@') => {}
                property => {
                    if let Some(iri) = ctx.expand_iri(property, true)? {
                        node.properties
                            .insert(iri, Self::parse(&ctx, value, counter)?);
                    }
                }
            }
        }
        Ok(node)
    }

    fn matches(&self, id: &str, types: &[&str]) -> bool {
        self.ids
            .as_ref()
            .map_or(true, |ids| ids.iter().any(|i| i == id))
            && self
                .types
                .as_ref()
                .map_or(true, |ts| ts.iter().any(|t| types.contains(&t.as_str())))
    }
}

fn strings(value: &Value) -> Option<Vec<&str>> {
    match value {
        Value::String(s) => Some(vec![s.as_str()]),
        Value::Array(values) => values.iter().map(Value::as_str).collect(),
        _ => None,
    }
}

fn node_id(term: &Term) -> Option<String> {
    match term {
        Term::BlankNode(label) => Some(format!("_:{}", label)),
        _ => term.iri_value(),
    }
}

struct Selection<'a> {
    statements: &'a [Statement],
    subjects: BTreeMap<String, Vec<usize>>,
    types: BTreeMap<String, Vec<&'a str>>,
    included: BTreeSet<usize>,
    visited: HashSet<(String, usize)>,
}

static IMPLICIT_FRAME: FrameNode = FrameNode {
    key: 0,
    ids: None,
    types: None,
    explicit: None,
    properties: BTreeMap::new(),
};

impl<'a> Selection<'a> {
    fn new(statements: &'a [Statement]) -> Self {
        let mut subjects: BTreeMap<String, Vec<usize>> = BTreeMap::new();
        let mut types: BTreeMap<String, Vec<&str>> = BTreeMap::new();
        for (i, statement) in statements.iter().enumerate() {
            if statement.graph != Term::DefaultGraph {
                continue;
            }
            let Some(subject) = node_id(&statement.subject) else {
                continue;
            };
            if let (Term::Iri(predicate), Term::Iri(t)) = (&statement.predicate, &statement.object)
            {
                if predicate == RDF_TYPE.as_str() {
                    types.entry(subject.clone()).or_default().push(t);
                }
            }
            subjects.entry(subject).or_default().push(i);
        }
        Self {
            statements,
            subjects,
            types,
            included: BTreeSet::new(),
            visited: HashSet::new(),
        }
    }

    fn matches(&self, id: &str, frame: &FrameNode) -> bool {
        let types = self.types.get(id).map(Vec::as_slice).unwrap_or_default();
        frame.matches(id, types)
    }

    fn frame_node(&mut self, id: &str, frame: &FrameNode, inherited_explicit: bool) {
        if !self.visited.insert((id.to_string(), frame.key)) {
            return;
        }
        let explicit = frame.explicit.unwrap_or(inherited_explicit);
        let statements = self.statements;
        let indices = self.subjects.get(id).cloned().unwrap_or_default();

        for i in indices {
            let statement = &statements[i];
            let Some(predicate) = statement.predicate.iri_value() else {
                continue;
            };
            let object_id = match statement.object {
                Term::Literal { .. } => None,
                _ => node_id(&statement.object),
            };

            if predicate == RDF_TYPE.as_str() && object_id.is_some() {
                if !explicit || frame.types.is_some() {
                    self.included.insert(i);
                }
                continue;
            }

            let subframe = match frame.properties.get(&predicate) {
                Some(subframe) => subframe,
                None if explicit => continue,
                None => &IMPLICIT_FRAME,
            };

            match object_id {
                Some(object_id) if self.subjects.contains_key(&object_id) => {
                    if self.matches(&object_id, subframe) {
                        self.included.insert(i);
                        self.frame_node(&object_id, subframe, explicit);
                    }
                }
                _ => {
                    self.included.insert(i);
                }
            }
        }
    }
}

impl Framer for ExplicitFramer {
    fn frame(&self, document: &Value, frame: &Value) -> Result<Value, RDFProofsError> {
        let statements = to_rdf(document)?;
        let mut counter = 0;
        let frame = FrameNode::parse(&ActiveContext::default(), frame, &mut counter)?;

        let mut selection = Selection::new(&statements);
        let roots: Vec<String> = selection
            .subjects
            .keys()
            .filter(|id| selection.matches(id, &frame))
            .cloned()
            .collect();
        for root in roots {
            selection.frame_node(&root, &frame, false);
        }

        let revealed: Vec<Statement> = selection
            .included
            .iter()
            .map(|&i| statements[i].clone())
            .collect();
        debug!(
            "framed {} of {} statements",
            revealed.len(),
            statements.len()
        );
        Ok(from_rdf(&revealed))
    }
}
