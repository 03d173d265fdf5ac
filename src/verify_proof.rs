use crate::{
    anonymizer::{EquivalenceTable, UriAnonymizer},
    common::decode_base64,
    error::RDFProofsError,
    index::reorder_terms,
    primitive::VerifyRequest,
    proof::{decode_proof_value, without_proof, DocumentWithProof, VerificationResult},
    signature::canonicalize_proof,
    statement::{serialize_statements, Statement},
    suite::ProofSuite,
};
use ark_std::rand::RngCore;
use log::debug;

struct SubProof {
    proof_value: Vec<u8>,
    public_key: Vec<u8>,
    messages: Vec<Vec<u8>>,
    revealed_term_indices: Vec<usize>,
    revealed_statements: Vec<Statement>,
}

pub fn verify_proof<R: RngCore>(
    suite: &ProofSuite,
    rng: &mut R,
    input: &DocumentWithProof,
) -> VerificationResult {
    verify_proof_multi(suite, rng, std::slice::from_ref(input))
}

/// Verify a presentation made of one or more derived documents.
///
/// Failures are reported in the returned [`VerificationResult`].
pub fn verify_proof_multi<R: RngCore>(
    suite: &ProofSuite,
    rng: &mut R,
    inputs: &[DocumentWithProof],
) -> VerificationResult {
    let result = verify_proof_multi_core(suite, rng, inputs);
    if let Err(e) = &result {
        debug!("verification failed: {}", e);
    }
    result.into()
}

fn verify_proof_multi_core<R: RngCore>(
    suite: &ProofSuite,
    rng: &mut R,
    inputs: &[DocumentWithProof],
) -> Result<(), RDFProofsError> {
    if inputs.is_empty() {
        return Err(RDFProofsError::EmptyProofSet);
    }
    let mut nonce: Option<&str> = None;
    let mut equivalences = EquivalenceTable::new();
    let mut sub_proofs: Vec<SubProof> = Vec::new();

    for input in inputs {
        if input.proof.is_empty() {
            return Err(RDFProofsError::EmptyProofSet);
        }
        let revealed_statements = suite
            .canonicalizer
            .canonicalize(&without_proof(&input.document))?;

        for proof in input.proof.iter() {
            let proof_nonce = proof
                .nonce
                .as_deref()
                .ok_or(RDFProofsError::MalformedProof)?;
            match nonce {
                Some(previous) if previous != proof_nonce => {
                    return Err(RDFProofsError::NonceMismatch)
                }
                _ => nonce = Some(proof_nonce),
            }

            let (revealed_statement_indices, proof_value) = decode_proof_value(
                proof
                    .proof_value
                    .as_deref()
                    .ok_or(RDFProofsError::MalformedProof)?,
            )?;

            let proof_statements = canonicalize_proof(suite, &proof.to_signature_options()?)?;
            let statements: Vec<Statement> = proof_statements
                .into_iter()
                .chain(revealed_statements.iter().cloned())
                .collect();
            let (revealed_term_indices, terms) =
                reorder_terms(&revealed_statement_indices, &statements)?;

            let proof_index = sub_proofs.len();
            for (term, &term_index) in terms.iter().zip(&revealed_term_indices) {
                if let Some(token) = UriAnonymizer::extract_token(term) {
                    equivalences.record(token, proof_index, term_index);
                }
            }

            let verification_method = suite.loader.resolve(&proof.verification_method)?;
            suite
                .purpose
                .validate(proof, &verification_method, suite.loader)?;
            debug!(
                "proof {}: revealed statements {:?}",
                proof_index, revealed_statement_indices
            );

            sub_proofs.push(SubProof {
                proof_value,
                public_key: verification_method.public_key,
                messages: terms.iter().map(|t| t.to_string().into_bytes()).collect(),
                revealed_term_indices,
                revealed_statements: revealed_statements.clone(),
            });
        }
    }

    let mut merged_nonce = decode_base64(nonce.ok_or(RDFProofsError::MalformedProof)?)?;
    merged_nonce.extend(serialize_statements(
        sub_proofs.iter().flat_map(|p| &p.revealed_statements),
    ));

    let equivalences = equivalences.into_classes();
    debug!("equivalence classes: {:?}", equivalences);

    let requests: Vec<VerifyRequest> = sub_proofs
        .iter()
        .map(|p| VerifyRequest {
            proof_value: &p.proof_value,
            public_key: &p.public_key,
            messages: &p.messages,
            revealed_indices: &p.revealed_term_indices,
        })
        .collect();
    suite
        .primitive
        .verify_proof(rng, &requests, &merged_nonce, &equivalences)
}
