use ark_serialize::SerializationError;
use bbs_plus::prelude::BBSPlusError;
use oxiri::IriParseError;
use oxttl::TurtleParseError;
use proof_system::prelude::ProofSystemError;
use rdf_canon::CanonicalizationError;
use std::error::Error;

#[derive(Debug)]
pub enum RDFProofsError {
    Parse(String),
    JsonLd(String),
    InvalidFrame(String),
    Canonicalization(CanonicalizationError),
    IndexResolution,
    UnsupportedProofType(String),
    MissingVerificationMethod(String),
    RevokedVerificationMethod(String),
    InvalidVerificationMethod,
    InvalidProofPurpose(String),
    InvalidProofDatetime,
    NonceMismatch,
    EmptyProofSet,
    MalformedProof,
    BBSPlus(BBSPlusError),
    ProofSystem(ProofSystemError),
    HashToField,
    MessageSizeOverflow,
    ArkSerialization(SerializationError),
    CBORSerialization(serde_cbor::Error),
    JSONSerialization(serde_json::Error),
    Multibase(multibase::Error),
    IriParse(IriParseError),
    ProofGeneration(Box<RDFProofsError>),
}

impl std::fmt::Display for RDFProofsError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            RDFProofsError::Parse(line) => write!(f, "parse error: {}", line),
            RDFProofsError::JsonLd(msg) => write!(f, "JSON-LD error: {}", msg),
            RDFProofsError::InvalidFrame(msg) => write!(f, "invalid frame error: {}", msg),
            RDFProofsError::Canonicalization(_) => write!(f, "canonicalization error"),
            RDFProofsError::IndexResolution => write!(f, "index resolution error"),
            RDFProofsError::UnsupportedProofType(t) => {
                write!(f, "unsupported proof type error: {}", t)
            }
            RDFProofsError::MissingVerificationMethod(id) => {
                write!(f, "missing verification method error: {}", id)
            }
            RDFProofsError::RevokedVerificationMethod(id) => {
                write!(f, "revoked verification method error: {}", id)
            }
            RDFProofsError::InvalidVerificationMethod => {
                write!(f, "invalid verification method error")
            }
            RDFProofsError::InvalidProofPurpose(msg) => {
                write!(f, "invalid proof purpose error: {}", msg)
            }
            RDFProofsError::InvalidProofDatetime => write!(f, "invalid proof datetime error"),
            RDFProofsError::NonceMismatch => write!(f, "nonce mismatch error"),
            RDFProofsError::EmptyProofSet => write!(f, "empty proof set error"),
            RDFProofsError::MalformedProof => write!(f, "malformed proof error"),
            RDFProofsError::BBSPlus(_) => write!(f, "BBS+ error"),
            RDFProofsError::ProofSystem(_) => write!(f, "proof system error"),
            RDFProofsError::HashToField => write!(f, "hash to field is failed"),
            RDFProofsError::MessageSizeOverflow => write!(f, "message size overflow error"),
            RDFProofsError::ArkSerialization(_) => write!(f, "arkworks serialization error"),
            RDFProofsError::CBORSerialization(_) => write!(f, "CBOR serialization error"),
            RDFProofsError::JSONSerialization(_) => write!(f, "JSON serialization error"),
            RDFProofsError::Multibase(_) => write!(f, "multibase error"),
            RDFProofsError::IriParse(_) => write!(f, "IRI parse error"),
            RDFProofsError::ProofGeneration(_) => write!(f, "failed to create proof"),
        }
    }
}

impl Error for RDFProofsError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            RDFProofsError::ProofGeneration(e) => Some(e.as_ref()),
            RDFProofsError::JSONSerialization(e) => Some(e),
            _ => None,
        }
    }
}

impl From<CanonicalizationError> for RDFProofsError {
    fn from(e: CanonicalizationError) -> Self {
        Self::Canonicalization(e)
    }
}

impl From<BBSPlusError> for RDFProofsError {
    fn from(e: BBSPlusError) -> Self {
        Self::BBSPlus(e)
    }
}

impl From<ProofSystemError> for RDFProofsError {
    fn from(e: ProofSystemError) -> Self {
        Self::ProofSystem(e)
    }
}

impl From<SerializationError> for RDFProofsError {
    fn from(e: SerializationError) -> Self {
        Self::ArkSerialization(e)
    }
}

impl From<serde_cbor::Error> for RDFProofsError {
    fn from(e: serde_cbor::Error) -> Self {
        Self::CBORSerialization(e)
    }
}

impl From<serde_json::Error> for RDFProofsError {
    fn from(e: serde_json::Error) -> Self {
        Self::JSONSerialization(e)
    }
}

impl From<multibase::Error> for RDFProofsError {
    fn from(e: multibase::Error) -> Self {
        Self::Multibase(e)
    }
}

impl From<IriParseError> for RDFProofsError {
    fn from(e: IriParseError) -> Self {
        Self::IriParse(e)
    }
}

impl From<TurtleParseError> for RDFProofsError {
    fn from(e: TurtleParseError) -> Self {
        Self::Parse(e.to_string())
    }
}
