use crate::{
    common::multibase_to_bytes,
    context::{ASSERTION_METHOD, CONTROLLER, PUBLIC_KEY_MULTIBASE, REVOKED, SECRET_KEY_MULTIBASE},
    error::RDFProofsError,
};
use log::debug;
use oxrdf::{Graph, NamedNodeRef, TermRef, Triple, TripleRef};
use oxttl::NTriplesParser;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VerificationMethod {
    pub id: String,
    pub controller: Option<String>,
    pub public_key: Vec<u8>,
}

/// Resolves verification method identifiers into public key material.
pub trait VerificationMethodResolver {
    fn resolve(&self, id: &str) -> Result<VerificationMethod, RDFProofsError>;

    /// whether `controller` lists `verification_method` under `assertionMethod`
    fn has_assertion_method(&self, controller: &str, verification_method: &str) -> bool;

    /// Secret key bytes of `id`, needed for signing only.
    fn secret_key(&self, id: &str) -> Result<Vec<u8>, RDFProofsError> {
        Err(RDFProofsError::MissingVerificationMethod(id.to_string()))
    }
}

/// Key graph holding controllers and their verification methods.
pub struct DocumentLoader {
    inner: Graph,
}

impl From<Graph> for DocumentLoader {
    fn from(value: Graph) -> Self {
        Self { inner: value }
    }
}

impl From<Vec<Triple>> for DocumentLoader {
    fn from(value: Vec<Triple>) -> Self {
        Self {
            inner: Graph::from_iter(value),
        }
    }
}

impl DocumentLoader {
    pub fn from_ntriples(ntriples: &str) -> Result<Self, RDFProofsError> {
        let triples = NTriplesParser::new()
            .for_reader(ntriples.as_bytes())
            .collect::<Result<Vec<_>, _>>()?;
        debug!("loaded key graph with {} triples", triples.len());
        Ok(triples.into())
    }

    fn literal_value(
        &self,
        subject: NamedNodeRef,
        predicate: NamedNodeRef,
    ) -> Result<Option<&str>, RDFProofsError> {
        match self.inner.object_for_subject_predicate(subject, predicate) {
            Some(TermRef::Literal(v)) => Ok(Some(v.value())),
            Some(_) => Err(RDFProofsError::InvalidVerificationMethod),
            None => Ok(None),
        }
    }
}

impl VerificationMethodResolver for DocumentLoader {
    fn resolve(&self, id: &str) -> Result<VerificationMethod, RDFProofsError> {
        let verification_method = NamedNodeRef::new(id)?;

        let public_key_multibase = self
            .literal_value(verification_method, PUBLIC_KEY_MULTIBASE)?
            .ok_or(RDFProofsError::MissingVerificationMethod(id.to_string()))?;
        if self
            .inner
            .object_for_subject_predicate(verification_method, REVOKED)
            .is_some()
        {
            return Err(RDFProofsError::RevokedVerificationMethod(id.to_string()));
        }
        let controller = match self
            .inner
            .object_for_subject_predicate(verification_method, CONTROLLER)
        {
            Some(TermRef::NamedNode(n)) => Some(n.as_str().to_string()),
            Some(_) => return Err(RDFProofsError::InvalidVerificationMethod),
            None => None,
        };

        Ok(VerificationMethod {
            id: id.to_string(),
            controller,
            public_key: multibase_to_bytes(public_key_multibase)?,
        })
    }

    fn has_assertion_method(&self, controller: &str, verification_method: &str) -> bool {
        match (
            NamedNodeRef::new(controller),
            NamedNodeRef::new(verification_method),
        ) {
            (Ok(controller), Ok(verification_method)) => self.inner.contains(TripleRef::new(
                controller,
                ASSERTION_METHOD,
                verification_method,
            )),
            _ => false,
        }
    }

    fn secret_key(&self, id: &str) -> Result<Vec<u8>, RDFProofsError> {
        let verification_method = NamedNodeRef::new(id)?;
        let secret_key_multibase = self
            .literal_value(verification_method, SECRET_KEY_MULTIBASE)?
            .ok_or(RDFProofsError::MissingVerificationMethod(id.to_string()))?;
        multibase_to_bytes(secret_key_multibase)
    }
}
