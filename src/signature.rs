use crate::{
    common::{decode_base64, encode_base64},
    constants::{ASSERTION_METHOD_PURPOSE, SIGNATURE_TYPE},
    error::RDFProofsError,
    proof::{without_proof, DocumentWithProof, Proof, VerificationResult},
    statement::{statements_to_messages, Statement},
    suite::ProofSuite,
};
use ark_std::rand::RngCore;
use chrono::{SecondsFormat, Utc};
use log::debug;
use serde_json::Value;

/// Proof options for a new signature.
#[derive(Debug, Clone, Default)]
pub struct SignOptions {
    pub verification_method: String,
    /// defaults to `assertionMethod`
    pub proof_purpose: Option<String>,
    /// defaults to the current time
    pub created: Option<String>,
}

impl SignOptions {
    pub fn new(verification_method: impl Into<String>) -> Self {
        Self {
            verification_method: verification_method.into(),
            ..Default::default()
        }
    }
}

pub fn sign<R: RngCore>(
    suite: &ProofSuite,
    rng: &mut R,
    document: &Value,
    options: &SignOptions,
) -> Result<Proof, RDFProofsError> {
    let mut proof = Proof {
        proof_type: SIGNATURE_TYPE.to_string(),
        created: Some(
            options
                .created
                .clone()
                .unwrap_or_else(|| Utc::now().to_rfc3339_opts(SecondsFormat::Secs, true)),
        ),
        verification_method: options.verification_method.clone(),
        proof_purpose: options
            .proof_purpose
            .clone()
            .unwrap_or_else(|| ASSERTION_METHOD_PURPOSE.to_string()),
        proof_value: None,
        nonce: None,
    };
    proof.validate_created()?;

    // the signing key must be usable for verification as well
    suite.loader.resolve(&proof.verification_method)?;
    let secret_key = suite.loader.secret_key(&proof.verification_method)?;

    let document_statements = suite.canonicalizer.canonicalize(&without_proof(document))?;
    let messages = create_messages(suite, &proof, &document_statements)?;
    debug!("signing {} messages", messages.len());

    let signature = suite.primitive.sign(rng, &messages, &secret_key)?;
    proof.proof_value = Some(encode_base64(&signature));
    Ok(proof)
}

/// Verify the base signatures attached to a document.
///
/// Proofs of other types are skipped. The document is verified as soon as one
/// matching proof verifies.
pub fn verify_signature(suite: &ProofSuite, input: &DocumentWithProof) -> VerificationResult {
    if input.proof.is_empty() {
        return VerificationResult::failure(RDFProofsError::EmptyProofSet);
    }
    let document_statements = match suite
        .canonicalizer
        .canonicalize(&without_proof(&input.document))
    {
        Ok(statements) => statements,
        Err(e) => return VerificationResult::failure(e),
    };

    let mut last_error = None;
    for proof in input.proof.iter() {
        if !proof.is_signature() {
            last_error = Some(RDFProofsError::UnsupportedProofType(
                proof.proof_type.clone(),
            ));
            continue;
        }
        match verify_signature_core(suite, proof, &document_statements) {
            Ok(()) => return VerificationResult::success(),
            Err(e) => {
                debug!("signature by {} not verified: {}", proof.verification_method, e);
                last_error = Some(e);
            }
        }
    }
    VerificationResult::failure(last_error.unwrap_or(RDFProofsError::EmptyProofSet))
}

fn verify_signature_core(
    suite: &ProofSuite,
    proof: &Proof,
    document_statements: &[Statement],
) -> Result<(), RDFProofsError> {
    let signature = decode_base64(
        proof
            .proof_value
            .as_deref()
            .ok_or(RDFProofsError::MalformedProof)?,
    )?;
    proof.validate_created()?;

    let verification_method = suite.loader.resolve(&proof.verification_method)?;
    suite
        .purpose
        .validate(proof, &verification_method, suite.loader)?;

    let messages = create_messages(suite, proof, document_statements)?;
    suite
        .primitive
        .verify_signature(&signature, &messages, &verification_method.public_key)
}

/// canonical statements of the proof options, without `proofValue` and `nonce`
pub(crate) fn canonicalize_proof(
    suite: &ProofSuite,
    proof: &Proof,
) -> Result<Vec<Statement>, RDFProofsError> {
    suite.canonicalizer.canonicalize(&proof.to_jsonld()?)
}

/// terms of the proof options followed by the terms of the document
fn create_messages(
    suite: &ProofSuite,
    proof: &Proof,
    document_statements: &[Statement],
) -> Result<Vec<Vec<u8>>, RDFProofsError> {
    let proof_statements = canonicalize_proof(suite, proof)?;
    Ok(statements_to_messages(
        proof_statements.iter().chain(document_statements),
    ))
}
