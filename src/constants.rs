pub const SIGNATURE_TYPE: &str = "BbsTermwiseSignature2021";
pub const SIGNATURE_TYPE_IRI: &str = "https://www.zkp-ld.org/security#BbsTermwiseSignature2021";
pub const DERIVED_PROOF_TYPE: &str = "BbsTermwiseSignatureProof2021";
pub const DERIVED_PROOF_TYPE_IRI: &str =
    "https://www.zkp-ld.org/security#BbsTermwiseSignatureProof2021";
pub const SUPPORTED_SIGNATURE_TYPES: [&str; 2] = [SIGNATURE_TYPE, SIGNATURE_TYPE_IRI];
pub const SUPPORTED_DERIVED_PROOF_TYPES: [&str; 2] = [DERIVED_PROOF_TYPE, DERIVED_PROOF_TYPE_IRI];
pub const ASSERTION_METHOD_PURPOSE: &str = "assertionMethod";

pub const SKOLEM_IRI_PREFIX: &str = "urn:bnid:";
pub const ANONYMOUS_IRI_PREFIX: &str = "urn:anon:";
pub const CANONICAL_BLANK_NODE_PREFIX: &str = "c14n";

pub const NUM_OF_TERMS_IN_STATEMENT: usize = 4;
/// upper bound on the messages of one signature, checked before deriving generators
pub const MAX_MESSAGE_COUNT: usize = 1 << 14;
pub const DEFAULT_NONCE_LENGTH: usize = 50;
pub const PROOF_VALUE_SEPARATOR: char = '.';

pub const GENERATOR_SEED: &[u8; 28] = b"BBS_*_MESSAGE_GENERATOR_SEED"; // TODO: fix it later
pub const MAP_TO_SCALAR_AS_HASH_DST: &[u8; 32] = b"BBS_*_MAP_MSG_TO_SCALAR_AS_HASH_"; // TODO: fix it later
