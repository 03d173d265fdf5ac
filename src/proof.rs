use crate::{
    common::{decode_base64, encode_base64},
    constants::{
        DERIVED_PROOF_TYPE, PROOF_VALUE_SEPARATOR, SIGNATURE_TYPE, SIGNATURE_TYPE_IRI,
        SUPPORTED_DERIVED_PROOF_TYPES, SUPPORTED_SIGNATURE_TYPES,
    },
    context::{CREATED, PROOF_PURPOSE, SECURITY_VOCAB, VERIFICATION_METHOD, XSD_DATE_TIME},
    error::RDFProofsError,
};
use oxsdatatypes::DateTime;
use serde::{Deserialize, Serialize};
use serde_json::{json, Map, Value};
use std::str::FromStr;

const PROOF_KEY: &str = "proof";

/// Linked data proof attached to a document.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct Proof {
    #[serde(rename = "type")]
    pub proof_type: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created: Option<String>,
    pub verification_method: String,
    pub proof_purpose: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub proof_value: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub nonce: Option<String>,
}

impl Proof {
    pub fn is_signature(&self) -> bool {
        SUPPORTED_SIGNATURE_TYPES.contains(&self.proof_type.as_str())
    }

    pub fn is_derived_proof(&self) -> bool {
        SUPPORTED_DERIVED_PROOF_TYPES.contains(&self.proof_type.as_str())
    }

    /// the proof options this derived proof was derived from
    pub fn to_signature_options(&self) -> Result<Self, RDFProofsError> {
        if !self.is_derived_proof() {
            return Err(RDFProofsError::UnsupportedProofType(
                self.proof_type.clone(),
            ));
        }
        Ok(Self {
            proof_type: SIGNATURE_TYPE.to_string(),
            proof_value: None,
            nonce: None,
            ..self.clone()
        })
    }

    /// derived proof carrying the revealed-index header, awaiting its proof bytes
    pub(crate) fn to_derived_skeleton(
        &self,
        nonce: &[u8],
        revealed_statement_indices: &[usize],
    ) -> Result<Self, RDFProofsError> {
        Ok(Self {
            proof_type: DERIVED_PROOF_TYPE.to_string(),
            created: self.created.clone(),
            verification_method: self.verification_method.clone(),
            proof_purpose: self.proof_purpose.clone(),
            proof_value: Some(encode_proof_value_header(revealed_statement_indices)?),
            nonce: Some(encode_base64(nonce)),
        })
    }

    pub fn validate_created(&self) -> Result<(), RDFProofsError> {
        match &self.created {
            Some(created) => DateTime::from_str(created)
                .map(|_| ())
                .map_err(|_| RDFProofsError::InvalidProofDatetime),
            None => Ok(()),
        }
    }

    /// Proof options as a JSON-LD node object, leaving out `proofValue` and `nonce`.
    ///
    /// Only the base suite type is accepted here; derived proofs are mapped with
    /// [`Proof::to_signature_options`] first.
    pub fn to_jsonld(&self) -> Result<Value, RDFProofsError> {
        if !self.is_signature() {
            return Err(RDFProofsError::UnsupportedProofType(
                self.proof_type.clone(),
            ));
        }
        let mut node = Map::new();
        node.insert("@type".to_string(), json!(SIGNATURE_TYPE_IRI));
        if let Some(created) = &self.created {
            node.insert(
                CREATED.as_str().to_string(),
                json!({ "@value": created, "@type": XSD_DATE_TIME.as_str() }),
            );
        }
        node.insert(
            PROOF_PURPOSE.as_str().to_string(),
            json!({ "@id": expand_security_term(&self.proof_purpose) }),
        );
        node.insert(
            VERIFICATION_METHOD.as_str().to_string(),
            json!({ "@id": self.verification_method }),
        );
        Ok(Value::Object(node))
    }
}

fn expand_security_term(term: &str) -> String {
    if term.contains(':') {
        term.to_string()
    } else {
        format!("{}{}", SECURITY_VOCAB, term)
    }
}

/// A `proof` field holding either one proof or an array of them.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
#[serde(untagged)]
pub enum ProofSet {
    Single(Proof),
    Many(Vec<Proof>),
}

impl ProofSet {
    pub fn len(&self) -> usize {
        match self {
            ProofSet::Single(_) => 1,
            ProofSet::Many(proofs) => proofs.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Proof> {
        match self {
            ProofSet::Single(proof) => std::slice::from_ref(proof).iter(),
            ProofSet::Many(proofs) => proofs.iter(),
        }
    }

    pub fn into_vec(self) -> Vec<Proof> {
        match self {
            ProofSet::Single(proof) => vec![proof],
            ProofSet::Many(proofs) => proofs,
        }
    }

    /// `proofs` in the same shape as `self`
    pub(crate) fn reshape(&self, mut proofs: Vec<Proof>) -> Self {
        match (self, proofs.len()) {
            (ProofSet::Single(_), 1) => ProofSet::Single(proofs.remove(0)),
            _ => ProofSet::Many(proofs),
        }
    }
}

impl From<Proof> for ProofSet {
    fn from(value: Proof) -> Self {
        ProofSet::Single(value)
    }
}

impl From<Vec<Proof>> for ProofSet {
    fn from(value: Vec<Proof>) -> Self {
        ProofSet::Many(value)
    }
}

/// A JSON-LD document together with the proofs attached to it.
#[derive(Debug, Clone, PartialEq)]
pub struct DocumentWithProof {
    pub document: Value,
    pub proof: ProofSet,
}

impl DocumentWithProof {
    pub fn new(document: Value, proof: impl Into<ProofSet>) -> Self {
        Self {
            document,
            proof: proof.into(),
        }
    }

    /// split a secured document into its body and its `proof` field
    pub fn from_secured(secured: &Value) -> Result<Self, RDFProofsError> {
        let proof = secured
            .get(PROOF_KEY)
            .cloned()
            .ok_or(RDFProofsError::EmptyProofSet)?;
        Ok(Self {
            document: without_proof(secured),
            proof: serde_json::from_value(proof)?,
        })
    }

    pub fn to_secured(&self) -> Result<Value, RDFProofsError> {
        let mut secured = match &self.document {
            Value::Object(map) => map.clone(),
            _ => return Err(RDFProofsError::JsonLd("document is not an object".to_string())),
        };
        secured.insert(PROOF_KEY.to_string(), serde_json::to_value(&self.proof)?);
        Ok(Value::Object(secured))
    }
}

/// the document with any embedded `proof` removed
pub fn without_proof(document: &Value) -> Value {
    match document {
        Value::Object(map) if map.contains_key(PROOF_KEY) => Value::Object(
            map.iter()
                .filter(|(k, _)| k.as_str() != PROOF_KEY)
                .map(|(k, v)| (k.clone(), v.clone()))
                .collect(),
        ),
        _ => document.clone(),
    }
}

/// Outcome of a verification; failures never surface as `Err`.
#[derive(Debug)]
pub struct VerificationResult {
    pub verified: bool,
    pub error: Option<RDFProofsError>,
}

impl VerificationResult {
    pub fn success() -> Self {
        Self {
            verified: true,
            error: None,
        }
    }

    pub fn failure(error: RDFProofsError) -> Self {
        Self {
            verified: false,
            error: Some(error),
        }
    }
}

impl From<Result<(), RDFProofsError>> for VerificationResult {
    fn from(value: Result<(), RDFProofsError>) -> Self {
        match value {
            Ok(()) => Self::success(),
            Err(e) => Self::failure(e),
        }
    }
}

/// `base64(JSON(indices))` followed by the separator
pub fn encode_proof_value_header(
    revealed_statement_indices: &[usize],
) -> Result<String, RDFProofsError> {
    let header = serde_json::to_vec(revealed_statement_indices)?;
    Ok(format!("{}{}", encode_base64(&header), PROOF_VALUE_SEPARATOR))
}

pub fn decode_proof_value(proof_value: &str) -> Result<(Vec<usize>, Vec<u8>), RDFProofsError> {
    let (header, proof) = proof_value
        .split_once(PROOF_VALUE_SEPARATOR)
        .ok_or(RDFProofsError::MalformedProof)?;
    let revealed_statement_indices = serde_json::from_slice(&decode_base64(header)?)?;
    Ok((revealed_statement_indices, decode_base64(proof)?))
}
