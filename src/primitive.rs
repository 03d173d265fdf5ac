use crate::{
    common::{
        ark_to_bytes, bytes_to_ark, get_hasher, hash_messages_to_field, BBSPlusHash,
        BBSPlusPublicKey, BBSPlusSecretKey, BBSPlusSignature, Fr, PoKBBSPlusStmt, PoKBBSPlusWit,
        Proof, Statements,
    },
    constants::{DERIVED_PROOF_TYPE, MAX_MESSAGE_COUNT, NUM_OF_TERMS_IN_STATEMENT},
    error::RDFProofsError,
    keygen::generate_params,
};
use ark_std::rand::RngCore;
use log::debug;
use proof_system::{
    prelude::{EqualWitnesses, MetaStatements},
    proof_spec::ProofSpec,
    witness::Witnesses,
};
use serde::{Deserialize, Serialize};
use serde_with::{serde_as, Bytes};
use std::collections::{BTreeMap, BTreeSet};

/// Holder-side input for one sub-proof: a signature and every message it covers.
#[derive(Debug, Clone, Copy)]
pub struct ProofRequest<'a> {
    pub signature: &'a [u8],
    pub public_key: &'a [u8],
    pub messages: &'a [Vec<u8>],
    pub revealed_indices: &'a [usize],
}

/// Verifier-side input for one sub-proof.
///
/// `messages[k]` is the revealed message at `revealed_indices[k]`.
#[derive(Debug, Clone, Copy)]
pub struct VerifyRequest<'a> {
    pub proof_value: &'a [u8],
    pub public_key: &'a [u8],
    pub messages: &'a [Vec<u8>],
    pub revealed_indices: &'a [usize],
}

/// Multi-message signature scheme with selective disclosure and equality proofs.
///
/// Equivalence classes are lists of `(sub-proof index, message index)` whose
/// messages are proven equal without being disclosed.
pub trait ProofPrimitive {
    fn sign(
        &self,
        rng: &mut dyn RngCore,
        messages: &[Vec<u8>],
        secret_key: &[u8],
    ) -> Result<Vec<u8>, RDFProofsError>;

    fn verify_signature(
        &self,
        signature: &[u8],
        messages: &[Vec<u8>],
        public_key: &[u8],
    ) -> Result<(), RDFProofsError>;

    /// one proof value per request, in request order
    fn create_proof(
        &self,
        rng: &mut dyn RngCore,
        requests: &[ProofRequest],
        nonce: &[u8],
        equivalences: &[Vec<(usize, usize)>],
    ) -> Result<Vec<Vec<u8>>, RDFProofsError>;

    fn verify_proof(
        &self,
        rng: &mut dyn RngCore,
        requests: &[VerifyRequest],
        nonce: &[u8],
        equivalences: &[Vec<(usize, usize)>],
    ) -> Result<(), RDFProofsError>;
}

/// BBS+ over BLS12-381, one `PoKBBSSignatureG1` statement per sub-proof.
#[derive(Debug, Default, Clone, Copy)]
pub struct BbsTermwisePrimitive;

#[serde_as]
#[derive(Serialize, Deserialize, Debug, PartialEq, Eq)]
struct TermwiseProofValue {
    #[serde(rename = "a")]
    message_count: u32,
    #[serde(rename = "b")]
    #[serde_as(as = "Option<Bytes>")]
    proof: Option<Vec<u8>>,
}

fn message_count(len: usize) -> Result<u32, RDFProofsError> {
    if len > MAX_MESSAGE_COUNT {
        return Err(RDFProofsError::MessageSizeOverflow);
    }
    len.try_into()
        .map_err(|_| RDFProofsError::MessageSizeOverflow)
}

/// message count announced by a proof value, checked against what the verifier sees
fn announced_message_count(
    message_count: u32,
    revealed_indices: &[usize],
) -> Result<usize, RDFProofsError> {
    let count: usize = message_count
        .try_into()
        .map_err(|_| RDFProofsError::MessageSizeOverflow)?;
    if count > MAX_MESSAGE_COUNT {
        return Err(RDFProofsError::MessageSizeOverflow);
    }
    if count % NUM_OF_TERMS_IN_STATEMENT != 0 {
        return Err(RDFProofsError::MalformedProof);
    }
    if revealed_indices.iter().any(|&index| index >= count) {
        return Err(RDFProofsError::IndexResolution);
    }
    Ok(count)
}

/// hidden positions of each sub-proof, including those of single-position classes
fn hidden_positions(
    equivalences: &[Vec<(usize, usize)>],
    proof_count: usize,
) -> Result<Vec<BTreeSet<usize>>, RDFProofsError> {
    let mut hidden = vec![BTreeSet::new(); proof_count];
    for &(proof_index, term_index) in equivalences.iter().flatten() {
        hidden
            .get_mut(proof_index)
            .ok_or(RDFProofsError::IndexResolution)?
            .insert(term_index);
    }
    Ok(hidden)
}

fn build_meta_statements(equivalences: &[Vec<(usize, usize)>]) -> MetaStatements {
    let mut meta_statements = MetaStatements::new();
    for class in equivalences.iter().filter(|class| class.len() > 1) {
        let equiv_set: BTreeSet<(usize, usize)> = class.iter().copied().collect();
        meta_statements.add_witness_equality(EqualWitnesses(equiv_set));
    }
    meta_statements
}

fn proof_spec_context() -> Option<Vec<u8>> {
    Some(DERIVED_PROOF_TYPE.as_bytes().to_vec())
}

impl ProofPrimitive for BbsTermwisePrimitive {
    fn sign(
        &self,
        mut rng: &mut dyn RngCore,
        messages: &[Vec<u8>],
        secret_key: &[u8],
    ) -> Result<Vec<u8>, RDFProofsError> {
        let params = generate_params(message_count(messages.len())?);
        let hasher = get_hasher();
        let hashed_messages = hash_messages_to_field(messages, &hasher)?;
        let secret_key: BBSPlusSecretKey = bytes_to_ark(secret_key)?;

        let signature = BBSPlusSignature::new(&mut rng, &hashed_messages, &secret_key, &params)?;
        ark_to_bytes(&signature)
    }

    fn verify_signature(
        &self,
        signature: &[u8],
        messages: &[Vec<u8>],
        public_key: &[u8],
    ) -> Result<(), RDFProofsError> {
        let params = generate_params(message_count(messages.len())?);
        let hasher = get_hasher();
        let hashed_messages = hash_messages_to_field(messages, &hasher)?;
        let signature: BBSPlusSignature = bytes_to_ark(signature)?;
        let public_key: BBSPlusPublicKey = bytes_to_ark(public_key)?;

        Ok(signature.verify(&hashed_messages, public_key, params)?)
    }

    fn create_proof(
        &self,
        mut rng: &mut dyn RngCore,
        requests: &[ProofRequest],
        nonce: &[u8],
        equivalences: &[Vec<(usize, usize)>],
    ) -> Result<Vec<Vec<u8>>, RDFProofsError> {
        if requests.is_empty() {
            return Err(RDFProofsError::EmptyProofSet);
        }
        let hasher = get_hasher();
        let hidden = hidden_positions(equivalences, requests.len())?;

        let mut statements = Statements::new();
        let mut witnesses = Witnesses::new();
        let mut message_counts = Vec::with_capacity(requests.len());
        for (request, hidden) in requests.iter().zip(&hidden) {
            let count = message_count(request.messages.len())?;
            let params = generate_params(count);
            let public_key: BBSPlusPublicKey = bytes_to_ark(request.public_key)?;
            let signature: BBSPlusSignature = bytes_to_ark(request.signature)?;
            let hashed_messages = hash_messages_to_field(request.messages, &hasher)?;

            // a tampered document must not reach the prover
            signature.verify(&hashed_messages, public_key.clone(), params.clone())?;

            let revealed: BTreeSet<usize> = request.revealed_indices.iter().copied().collect();
            if revealed.iter().chain(hidden).any(|&index| index >= hashed_messages.len()) {
                return Err(RDFProofsError::IndexResolution);
            }

            let mut disclosed: BTreeMap<usize, Fr> = BTreeMap::new();
            let mut undisclosed: BTreeMap<usize, Fr> = BTreeMap::new();
            for (i, message) in hashed_messages.into_iter().enumerate() {
                if revealed.contains(&i) && !hidden.contains(&i) {
                    disclosed.insert(i, message);
                } else {
                    undisclosed.insert(i, message);
                }
            }

            statements.add(PoKBBSPlusStmt::new_statement_from_params(
                params, public_key, disclosed,
            ));
            witnesses.add(PoKBBSPlusWit::new_as_witness(signature, undisclosed));
            message_counts.push(count);
        }

        let proof_spec = ProofSpec::new(
            statements,
            build_meta_statements(equivalences),
            vec![],
            proof_spec_context(),
        );
        proof_spec.validate()?;

        let mut proof = Proof::new::<_, BBSPlusHash>(
            &mut rng,
            proof_spec,
            witnesses,
            Some(nonce.to_vec()),
            Default::default(),
        )?
        .0;
        // the verifier rebuilds the nonce from the revealed statements
        proof.nonce = None;
        let proof_bytes = ark_to_bytes(&proof)?;
        debug!(
            "created proof over {} signatures ({} bytes)",
            requests.len(),
            proof_bytes.len()
        );

        let mut proof_bytes = Some(proof_bytes);
        message_counts
            .into_iter()
            .map(|message_count| {
                let value = TermwiseProofValue {
                    message_count,
                    proof: proof_bytes.take(),
                };
                Ok(serde_cbor::to_vec(&value)?)
            })
            .collect()
    }

    fn verify_proof(
        &self,
        mut rng: &mut dyn RngCore,
        requests: &[VerifyRequest],
        nonce: &[u8],
        equivalences: &[Vec<(usize, usize)>],
    ) -> Result<(), RDFProofsError> {
        if requests.is_empty() {
            return Err(RDFProofsError::EmptyProofSet);
        }
        let hasher = get_hasher();
        let hidden = hidden_positions(equivalences, requests.len())?;

        let mut statements = Statements::new();
        let mut proof = None;
        for (i, (request, hidden)) in requests.iter().zip(&hidden).enumerate() {
            let TermwiseProofValue {
                message_count,
                proof: proof_bytes,
            } = serde_cbor::from_slice(request.proof_value)?;
            match (i, proof_bytes) {
                (0, Some(bytes)) => proof = Some(bytes_to_ark::<Proof>(&bytes)?),
                (0, None) | (_, Some(_)) => return Err(RDFProofsError::MalformedProof),
                (_, None) => {}
            }

            if request.revealed_indices.len() != request.messages.len() {
                return Err(RDFProofsError::MalformedProof);
            }
            announced_message_count(message_count, request.revealed_indices)?;

            let hashed_messages = hash_messages_to_field(request.messages, &hasher)?;
            let disclosed: BTreeMap<usize, Fr> = request
                .revealed_indices
                .iter()
                .copied()
                .zip(hashed_messages)
                .filter(|(index, _)| !hidden.contains(index))
                .collect();

            let public_key: BBSPlusPublicKey = bytes_to_ark(request.public_key)?;
            statements.add(PoKBBSPlusStmt::new_statement_from_params(
                generate_params(message_count),
                public_key,
                disclosed,
            ));
        }
        let proof = proof.ok_or(RDFProofsError::MalformedProof)?;
        if proof.nonce.is_some() {
            return Err(RDFProofsError::MalformedProof);
        }

        let proof_spec = ProofSpec::new(
            statements,
            build_meta_statements(equivalences),
            vec![],
            proof_spec_context(),
        );
        proof_spec.validate()?;

        Ok(proof.verify::<_, BBSPlusHash>(
            &mut rng,
            proof_spec,
            Some(nonce.to_vec()),
            Default::default(),
        )?)
    }
}
