use crate::{constants::MAP_TO_SCALAR_AS_HASH_DST, error::RDFProofsError};
use ark_bls12_381::{Bls12_381, G1Affine};
use ark_ec::pairing::Pairing;
use ark_ff::field_hashers::{DefaultFieldHasher, HashToField};
use ark_serialize::{CanonicalDeserialize, CanonicalSerialize};
use bbs_plus::{
    setup::{KeypairG2, PublicKeyG2, SecretKey, SignatureParamsG1},
    signature::SignatureG1,
};
use blake2::Blake2b512;
use multibase::Base;
use proof_system::{
    proof::Proof as ProofOrig,
    statement::{bbs_plus::PoKBBSSignatureG1 as PoKBBSSignatureG1Stmt, Statements as StatementsOrig},
    witness::PoKBBSSignatureG1 as PoKBBSSignatureG1Wit,
};

pub type Fr = <Bls12_381 as Pairing>::ScalarField;
pub type Proof = ProofOrig<Bls12_381, G1Affine>;
pub type Statements = StatementsOrig<Bls12_381, <Bls12_381 as Pairing>::G1Affine>;
pub type BBSPlusHash = Blake2b512;
pub type BBSPlusDefaultFieldHasher = DefaultFieldHasher<BBSPlusHash>;
pub type BBSPlusParams = SignatureParamsG1<Bls12_381>;
pub type BBSPlusKeypair = KeypairG2<Bls12_381>;
pub type BBSPlusSecretKey = SecretKey<Fr>;
pub type BBSPlusPublicKey = PublicKeyG2<Bls12_381>;
pub type BBSPlusSignature = SignatureG1<Bls12_381>;
pub type PoKBBSPlusStmt<E> = PoKBBSSignatureG1Stmt<E>;
pub type PoKBBSPlusWit<E> = PoKBBSSignatureG1Wit<E>;

pub fn get_hasher() -> BBSPlusDefaultFieldHasher {
    <BBSPlusDefaultFieldHasher as HashToField<Fr>>::new(MAP_TO_SCALAR_AS_HASH_DST)
}

pub fn hash_byte_to_field(
    byte: &[u8],
    hasher: &BBSPlusDefaultFieldHasher,
) -> Result<Fr, RDFProofsError> {
    hasher
        .hash_to_field(byte, 1)
        .pop()
        .ok_or(RDFProofsError::HashToField)
}

pub fn hash_messages_to_field(
    messages: &[Vec<u8>],
    hasher: &BBSPlusDefaultFieldHasher,
) -> Result<Vec<Fr>, RDFProofsError> {
    messages
        .iter()
        .map(|m| hash_byte_to_field(m, hasher))
        .collect()
}

pub fn ark_to_bytes<A: CanonicalSerialize>(ark: &A) -> Result<Vec<u8>, RDFProofsError> {
    let mut bytes = Vec::new();
    ark.serialize_compressed(&mut bytes)?;
    Ok(bytes)
}

pub fn bytes_to_ark<A: CanonicalDeserialize>(bytes: &[u8]) -> Result<A, RDFProofsError> {
    Ok(A::deserialize_compressed(bytes)?)
}

pub fn ark_to_base64url<A: CanonicalSerialize>(ark: &A) -> Result<String, RDFProofsError> {
    Ok(multibase::encode(Base::Base64Url, ark_to_bytes(ark)?))
}

pub fn multibase_to_bytes(s: &str) -> Result<Vec<u8>, RDFProofsError> {
    let (_, bytes) = multibase::decode(s)?;
    Ok(bytes)
}

/// padded base64 without multibase prefix, as used in `proofValue` and `nonce`
pub fn encode_base64(bytes: &[u8]) -> String {
    Base::Base64Pad.encode(bytes)
}

pub fn decode_base64(s: &str) -> Result<Vec<u8>, RDFProofsError> {
    Ok(Base::Base64Pad.decode(s)?)
}
