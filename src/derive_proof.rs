use crate::{
    anonymizer::{EquivalenceTable, UriAnonymizer},
    common::{decode_base64, encode_base64},
    constants::DEFAULT_NONCE_LENGTH,
    error::RDFProofsError,
    index::{expand_to_term_indices, resolve_revealed_indices},
    jsonld::from_rdf,
    primitive::ProofRequest,
    proof::{without_proof, DocumentWithProof, Proof, ProofSet},
    signature::canonicalize_proof,
    statement::{serialize_statements, statements_to_messages, Statement, Term},
    suite::ProofSuite,
};
use ark_std::rand::RngCore;
use log::{debug, trace};
use serde_json::Value;
use std::collections::HashSet;

/// A signed document, its proofs and the frame selecting what to reveal.
#[derive(Debug, Clone)]
pub struct DeriveInput {
    pub document: Value,
    pub proof: ProofSet,
    pub reveal_document: Value,
}

impl DeriveInput {
    pub fn new(document: Value, proof: impl Into<ProofSet>, reveal_document: Value) -> Self {
        Self {
            document,
            proof: proof.into(),
            reveal_document,
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct DeriveOptions {
    /// seed of the presentation nonce; random when absent
    pub nonce: Option<Vec<u8>>,
    /// IRIs replaced by anonymous identifiers in every revealed document
    pub hidden_uris: Vec<String>,
}

/// Everything the primitive needs for one sub-proof.
struct SubProof {
    signature: Vec<u8>,
    public_key: Vec<u8>,
    messages: Vec<Vec<u8>>,
    revealed_term_indices: Vec<usize>,
    revealed_statements: Vec<Statement>,
}

struct DerivedDocument {
    document: Value,
    shape: ProofSet,
    proofs: Vec<Proof>,
}

pub fn derive_proof<R: RngCore>(
    suite: &ProofSuite,
    rng: &mut R,
    input: &DeriveInput,
    options: &DeriveOptions,
) -> Result<DocumentWithProof, RDFProofsError> {
    derive_proof_multi(suite, rng, std::slice::from_ref(input), options)?
        .pop()
        .ok_or(RDFProofsError::ProofGeneration(Box::new(
            RDFProofsError::EmptyProofSet,
        )))
}

/// Derive one presentation out of several signed documents.
///
/// Every failure is reported as [`RDFProofsError::ProofGeneration`].
pub fn derive_proof_multi<R: RngCore>(
    suite: &ProofSuite,
    rng: &mut R,
    inputs: &[DeriveInput],
    options: &DeriveOptions,
) -> Result<Vec<DocumentWithProof>, RDFProofsError> {
    derive_proof_multi_core(suite, rng, inputs, options).map_err(|e| {
        debug!("derivation failed: {}", e);
        RDFProofsError::ProofGeneration(Box::new(e))
    })
}

fn derive_proof_multi_core<R: RngCore>(
    suite: &ProofSuite,
    rng: &mut R,
    inputs: &[DeriveInput],
    options: &DeriveOptions,
) -> Result<Vec<DocumentWithProof>, RDFProofsError> {
    let nonce = match &options.nonce {
        Some(nonce) => nonce.clone(),
        None => {
            let mut nonce = vec![0u8; DEFAULT_NONCE_LENGTH];
            rng.fill_bytes(&mut nonce);
            nonce
        }
    };

    let mut anonymizer = UriAnonymizer::new();
    for uri in &options.hidden_uris {
        anonymizer.register(rng, Term::iri(uri.as_str()));
    }
    let mut equivalences = EquivalenceTable::new();
    let mut sub_proofs: Vec<SubProof> = Vec::new();
    let mut derived_documents: Vec<DerivedDocument> = Vec::new();

    for (document_index, input) in inputs.iter().enumerate() {
        if input.proof.is_empty() {
            return Err(RDFProofsError::EmptyProofSet);
        }
        let document_statements = suite
            .canonicalizer
            .canonicalize(&without_proof(&input.document))?;

        let skolemized_statements: Vec<Statement> = document_statements
            .iter()
            .map(|s| s.skolemize(document_index))
            .collect();
        for term in skolemized_statements.iter().flat_map(Statement::terms) {
            if term.is_skolem() {
                anonymizer.register(rng, term.clone());
            }
        }

        let skolemized_document = from_rdf(&skolemized_statements);
        let pre_revealed_document = suite
            .framer
            .frame(&skolemized_document, &input.reveal_document)?;
        let revealed_document = anonymizer.anonymize_document(&pre_revealed_document);

        let anonymized_statements: Vec<Statement> = skolemized_statements
            .iter()
            .map(|s| anonymizer.anonymize_statement(s))
            .collect();
        let revealed_statements = suite.canonicalizer.canonicalize(&revealed_document)?;
        trace!(
            "revealed statements of document {}:\n{}",
            document_index,
            String::from_utf8_lossy(&serialize_statements(&revealed_statements))
        );

        let mut derived_proofs = Vec::with_capacity(input.proof.len());
        for proof in input.proof.iter() {
            if !proof.is_signature() {
                return Err(RDFProofsError::UnsupportedProofType(
                    proof.proof_type.clone(),
                ));
            }
            let signature = decode_base64(
                proof
                    .proof_value
                    .as_deref()
                    .ok_or(RDFProofsError::MalformedProof)?,
            )?;

            let proof_statements = canonicalize_proof(suite, proof)?;
            let offset = proof_statements.len();
            let messages =
                statements_to_messages(proof_statements.iter().chain(&document_statements));

            let revealed_statement_indices: Vec<usize> = (0..offset)
                .chain(resolve_revealed_indices(
                    &anonymized_statements,
                    &revealed_statements,
                    offset,
                )?)
                .collect();
            let revealed_term_indices = expand_to_term_indices(&revealed_statement_indices);

            // anonymized values at revealed positions, in the same flat order the
            // verifier rebuilds them
            let proof_index = sub_proofs.len();
            let revealed: HashSet<usize> = revealed_term_indices.iter().copied().collect();
            for (term_index, term) in proof_statements
                .iter()
                .chain(&anonymized_statements)
                .flat_map(Statement::terms)
                .enumerate()
            {
                if let Some(token) = UriAnonymizer::extract_token(term) {
                    if revealed.contains(&term_index) {
                        equivalences.record(token, proof_index, term_index);
                    }
                }
            }

            let verification_method = suite.loader.resolve(&proof.verification_method)?;
            debug!(
                "proof {}: {} messages, revealed statements {:?}",
                proof_index,
                messages.len(),
                revealed_statement_indices
            );

            derived_proofs.push(proof.to_derived_skeleton(&nonce, &revealed_statement_indices)?);
            sub_proofs.push(SubProof {
                signature,
                public_key: verification_method.public_key,
                messages,
                revealed_term_indices,
                revealed_statements: revealed_statements.clone(),
            });
        }

        derived_documents.push(DerivedDocument {
            document: revealed_document,
            shape: input.proof.clone(),
            proofs: derived_proofs,
        });
    }

    let mut merged_nonce = nonce;
    merged_nonce.extend(serialize_statements(
        sub_proofs.iter().flat_map(|p| &p.revealed_statements),
    ));

    let equivalences = equivalences.into_classes();
    debug!("equivalence classes: {:?}", equivalences);

    let requests: Vec<ProofRequest> = sub_proofs
        .iter()
        .map(|p| ProofRequest {
            signature: &p.signature,
            public_key: &p.public_key,
            messages: &p.messages,
            revealed_indices: &p.revealed_term_indices,
        })
        .collect();
    let proof_values = suite
        .primitive
        .create_proof(rng, &requests, &merged_nonce, &equivalences)?;
    if proof_values.len() != requests.len() {
        return Err(RDFProofsError::MalformedProof);
    }

    let mut proof_values = proof_values.into_iter();
    let mut results = Vec::with_capacity(derived_documents.len());
    for DerivedDocument {
        document,
        shape,
        mut proofs,
    } in derived_documents
    {
        for (proof, value) in proofs.iter_mut().zip(proof_values.by_ref()) {
            if let Some(proof_value) = proof.proof_value.as_mut() {
                proof_value.push_str(&encode_base64(&value));
            }
        }
        results.push(DocumentWithProof {
            document,
            proof: shape.reshape(proofs),
        });
    }
    Ok(results)
}

#[cfg(test)]
mod tests {
    use super::{DeriveInput, DeriveOptions};
    use crate::{
        error::RDFProofsError,
        proof::{decode_proof_value, Proof, ProofSet},
        signature::SignOptions,
        suite::ProofSuite,
        tests::{
            document_loader, person_document, sign_with, ISSUER0_METHOD, ISSUER1_METHOD,
        },
    };
    use ark_std::rand::{rngs::StdRng, SeedableRng};
    use serde_json::json;

    #[test]
    fn derive_keeps_proof_shape_and_metadata() {
        let mut rng = StdRng::seed_from_u64(0u64);
        let loader = document_loader();
        let suite = ProofSuite::new(&loader);
        let document = person_document();
        let proof = sign_with(&suite, &mut rng, &document, ISSUER0_METHOD);

        let derived = suite
            .derive_proof(
                &mut rng,
                &DeriveInput::new(document.clone(), proof.clone(), json!({})),
                &DeriveOptions {
                    nonce: Some(b"abc".to_vec()),
                    ..Default::default()
                },
            )
            .unwrap();
        let derived_proof = match derived.proof {
            ProofSet::Single(p) => p,
            ProofSet::Many(_) => panic!("expected a single proof"),
        };
        assert_eq!(derived_proof.proof_type, "BbsTermwiseSignatureProof2021");
        assert_eq!(derived_proof.created, proof.created);
        assert_eq!(derived_proof.verification_method, proof.verification_method);
        assert_eq!(derived_proof.proof_purpose, proof.proof_purpose);
        assert_eq!(derived_proof.nonce.as_deref(), Some("YWJj"));

        let (indices, proof_bytes) =
            decode_proof_value(derived_proof.proof_value.as_deref().unwrap()).unwrap();
        assert!(!proof_bytes.is_empty());
        let mut sorted = indices.clone();
        sorted.sort_unstable();
        sorted.dedup();
        assert_eq!(sorted.len(), indices.len());
    }

    #[test]
    fn derive_from_many_proofs_keeps_array() {
        let mut rng = StdRng::seed_from_u64(0u64);
        let loader = document_loader();
        let suite = ProofSuite::new(&loader);
        let document = person_document();
        let proof0 = sign_with(&suite, &mut rng, &document, ISSUER0_METHOD);
        let proof1 = sign_with(&suite, &mut rng, &document, ISSUER1_METHOD);

        let derived = suite
            .derive_proof(
                &mut rng,
                &DeriveInput::new(document, vec![proof0, proof1], json!({})),
                &DeriveOptions::default(),
            )
            .unwrap();
        match &derived.proof {
            ProofSet::Many(proofs) => {
                assert_eq!(proofs.len(), 2);
                assert_eq!(proofs[0].nonce, proofs[1].nonce);
            }
            ProofSet::Single(_) => panic!("expected a proof array"),
        }
        assert!(suite.verify_proof(&mut rng, &derived).verified);
    }

    #[test]
    fn derive_from_modified_document_fails() {
        let mut rng = StdRng::seed_from_u64(0u64);
        let loader = document_loader();
        let suite = ProofSuite::new(&loader);
        let proof = sign_with(&suite, &mut rng, &person_document(), ISSUER0_METHOD);

        let mut modified = person_document();
        modified["name"] = json!("Jane Smith");
        let result = suite.derive_proof(
            &mut rng,
            &DeriveInput::new(modified, proof, json!({})),
            &DeriveOptions::default(),
        );
        let error = result.unwrap_err();
        assert_eq!(error.to_string(), "failed to create proof");
        assert!(matches!(error, RDFProofsError::ProofGeneration(_)));
    }

    #[test]
    fn derive_from_unsupported_proof_type_fails() {
        let mut rng = StdRng::seed_from_u64(0u64);
        let loader = document_loader();
        let suite = ProofSuite::new(&loader);
        let proof = sign_with(&suite, &mut rng, &person_document(), ISSUER0_METHOD);
        let proof = Proof {
            proof_type: "BbsTermwiseSignatureProof2021".to_string(),
            ..proof
        };
        let result = suite.derive_proof(
            &mut rng,
            &DeriveInput::new(person_document(), proof, json!({})),
            &DeriveOptions::default(),
        );
        match result {
            Err(RDFProofsError::ProofGeneration(inner)) => {
                assert!(matches!(*inner, RDFProofsError::UnsupportedProofType(_)))
            }
            other => panic!("unexpected result: {:?}", other),
        }
    }

    #[test]
    fn derive_without_proof_fails() {
        let mut rng = StdRng::seed_from_u64(0u64);
        let loader = document_loader();
        let suite = ProofSuite::new(&loader);
        let result = suite.derive_proof(
            &mut rng,
            &DeriveInput::new(person_document(), Vec::<Proof>::new(), json!({})),
            &DeriveOptions::default(),
        );
        assert!(matches!(result, Err(RDFProofsError::ProofGeneration(_))));
    }

    #[test]
    fn derive_with_revoked_verification_method_fails() {
        let mut rng = StdRng::seed_from_u64(0u64);
        let loader = document_loader();
        let suite = ProofSuite::new(&loader);
        let proof = suite
            .sign(
                &mut rng,
                &person_document(),
                &SignOptions::new(ISSUER0_METHOD),
            )
            .unwrap();

        let revoked = crate::tests::revoked_document_loader();
        let suite = ProofSuite::new(&revoked);
        let result = suite.derive_proof(
            &mut rng,
            &DeriveInput::new(person_document(), proof, json!({})),
            &DeriveOptions::default(),
        );
        match result {
            Err(RDFProofsError::ProofGeneration(inner)) => assert!(matches!(
                *inner,
                RDFProofsError::RevokedVerificationMethod(_)
            )),
            other => panic!("unexpected result: {:?}", other),
        }
    }
}
