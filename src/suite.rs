use crate::{
    derive_proof::{derive_proof, derive_proof_multi, DeriveInput, DeriveOptions},
    error::RDFProofsError,
    frame::{ExplicitFramer, Framer},
    jsonld::{Canonicalizer, RdfCanonicalizer},
    loader::VerificationMethodResolver,
    primitive::{BbsTermwisePrimitive, ProofPrimitive},
    proof::{DocumentWithProof, Proof, VerificationResult},
    purpose::{AssertionProofPurpose, ProofPurpose},
    signature::{sign, verify_signature, SignOptions},
    verify_proof::{verify_proof, verify_proof_multi},
};
use ark_std::rand::RngCore;
use serde_json::Value;

/// `BbsTermwiseSignature2021` and `BbsTermwiseSignatureProof2021` bound to a key resolver.
///
/// The canonicalizer, framer, proof purpose and signature primitive can each be
/// replaced, and the resolver is any [`VerificationMethodResolver`]; [`ProofSuite::new`] picks the implementations of this crate.
pub struct ProofSuite<'a> {
    pub(crate) loader: &'a dyn VerificationMethodResolver,
    pub(crate) canonicalizer: Box<dyn Canonicalizer + 'a>,
    pub(crate) framer: Box<dyn Framer + 'a>,
    pub(crate) purpose: Box<dyn ProofPurpose + 'a>,
    pub(crate) primitive: Box<dyn ProofPrimitive + 'a>,
}

impl<'a> ProofSuite<'a> {
    pub fn new(loader: &'a dyn VerificationMethodResolver) -> Self {
        Self {
            loader,
            canonicalizer: Box::new(RdfCanonicalizer),
            framer: Box::new(ExplicitFramer),
            purpose: Box::new(AssertionProofPurpose),
            primitive: Box::new(BbsTermwisePrimitive),
        }
    }

    pub fn with_canonicalizer(mut self, canonicalizer: impl Canonicalizer + 'a) -> Self {
        self.canonicalizer = Box::new(canonicalizer);
        self
    }

    pub fn with_framer(mut self, framer: impl Framer + 'a) -> Self {
        self.framer = Box::new(framer);
        self
    }

    pub fn with_purpose(mut self, purpose: impl ProofPurpose + 'a) -> Self {
        self.purpose = Box::new(purpose);
        self
    }

    pub fn with_primitive(mut self, primitive: impl ProofPrimitive + 'a) -> Self {
        self.primitive = Box::new(primitive);
        self
    }

    pub fn sign<R: RngCore>(
        &self,
        rng: &mut R,
        document: &Value,
        options: &SignOptions,
    ) -> Result<Proof, RDFProofsError> {
        sign(self, rng, document, options)
    }

    pub fn verify_signature(&self, input: &DocumentWithProof) -> VerificationResult {
        verify_signature(self, input)
    }

    pub fn derive_proof<R: RngCore>(
        &self,
        rng: &mut R,
        input: &DeriveInput,
        options: &DeriveOptions,
    ) -> Result<DocumentWithProof, RDFProofsError> {
        derive_proof(self, rng, input, options)
    }

    pub fn derive_proof_multi<R: RngCore>(
        &self,
        rng: &mut R,
        inputs: &[DeriveInput],
        options: &DeriveOptions,
    ) -> Result<Vec<DocumentWithProof>, RDFProofsError> {
        derive_proof_multi(self, rng, inputs, options)
    }

    pub fn verify_proof<R: RngCore>(
        &self,
        rng: &mut R,
        input: &DocumentWithProof,
    ) -> VerificationResult {
        verify_proof(self, rng, input)
    }

    pub fn verify_proof_multi<R: RngCore>(
        &self,
        rng: &mut R,
        inputs: &[DocumentWithProof],
    ) -> VerificationResult {
        verify_proof_multi(self, rng, inputs)
    }
}
