use crate::{
    constants::ASSERTION_METHOD_PURPOSE,
    context::ASSERTION_METHOD,
    error::RDFProofsError,
    loader::{VerificationMethod, VerificationMethodResolver},
    proof::Proof,
};

/// Checks that a proof was made for the purpose the verifier expects.
pub trait ProofPurpose {
    fn validate(
        &self,
        proof: &Proof,
        verification_method: &VerificationMethod,
        resolver: &dyn VerificationMethodResolver,
    ) -> Result<(), RDFProofsError>;
}

#[derive(Debug, Default, Clone, Copy)]
pub struct AssertionProofPurpose;

impl ProofPurpose for AssertionProofPurpose {
    fn validate(
        &self,
        proof: &Proof,
        verification_method: &VerificationMethod,
        resolver: &dyn VerificationMethodResolver,
    ) -> Result<(), RDFProofsError> {
        if proof.proof_purpose != ASSERTION_METHOD_PURPOSE
            && proof.proof_purpose != ASSERTION_METHOD.as_str()
        {
            return Err(RDFProofsError::InvalidProofPurpose(format!(
                "expected {} but got {}",
                ASSERTION_METHOD_PURPOSE, proof.proof_purpose
            )));
        }
        match &verification_method.controller {
            Some(controller)
                if !resolver.has_assertion_method(controller, &verification_method.id) =>
            {
                Err(RDFProofsError::InvalidProofPurpose(format!(
                    "{} is not an assertion method of {}",
                    verification_method.id, controller
                )))
            }
            _ => Ok(()),
        }
    }
}
