pub mod anonymizer;
pub mod common;
pub mod constants;
pub mod context;
pub mod derive_proof;
pub mod error;
pub mod frame;
pub mod index;
pub mod jsonld;
pub mod keygen;
pub mod loader;
pub mod primitive;
pub mod proof;
pub mod purpose;
pub mod signature;
pub mod statement;
pub mod suite;
pub mod verify_proof;

pub use derive_proof::{DeriveInput, DeriveOptions};
pub use error::RDFProofsError;
pub use keygen::KeyPairBase64Url;
pub use loader::{DocumentLoader, VerificationMethod, VerificationMethodResolver};
pub use proof::{DocumentWithProof, Proof, ProofSet, VerificationResult};
pub use signature::SignOptions;
pub use suite::ProofSuite;

#[cfg(test)]
pub(crate) mod tests {
    use crate::{
        keygen::KeyPairBase64Url, loader::DocumentLoader, proof::Proof, signature::SignOptions,
        suite::ProofSuite,
    };
    use ark_std::rand::{rngs::StdRng, SeedableRng};
    use serde_json::{json, Value};

    pub(crate) const ISSUER0: &str = "did:example:issuer0";
    pub(crate) const ISSUER1: &str = "did:example:issuer1";
    pub(crate) const KEY_ID: &str = "bls12_381-g2-pub001";
    pub(crate) const ISSUER0_METHOD: &str = "did:example:issuer0#bls12_381-g2-pub001";
    pub(crate) const ISSUER1_METHOD: &str = "did:example:issuer1#bls12_381-g2-pub001";

    fn key_graph() -> String {
        let mut rng = StdRng::seed_from_u64(10u64);
        let issuer0 = KeyPairBase64Url::new(&mut rng).unwrap();
        let issuer1 = KeyPairBase64Url::new(&mut rng).unwrap();
        format!(
            "# issuer0\n{}# issuer1\n{}",
            issuer0.to_key_graph(ISSUER0, KEY_ID),
            issuer1.to_key_graph(ISSUER1, KEY_ID)
        )
    }

    pub(crate) fn init_logger() {
        let _ = env_logger::builder().is_test(true).try_init();
    }

    pub(crate) fn document_loader() -> DocumentLoader {
        init_logger();
        DocumentLoader::from_ntriples(&key_graph()).unwrap()
    }

    /// same keys as [`document_loader`], with the key of issuer0 revoked
    pub(crate) fn revoked_document_loader() -> DocumentLoader {
        init_logger();
        let graph = format!(
            "{}<{}> <https://w3id.org/security#revoked> \"2023-01-01T00:00:00Z\"^^<http://www.w3.org/2001/XMLSchema#dateTime> .\n",
            key_graph(),
            ISSUER0_METHOD
        );
        DocumentLoader::from_ntriples(&graph).unwrap()
    }

    pub(crate) fn person_document() -> Value {
        json!({
            "@context": { "@vocab": "http://schema.org/" },
            "@id": "did:example:john",
            "@type": "Person",
            "name": "John Smith",
            "email": "john@example.org",
            "address": {
                "@type": "PostalAddress",
                "addressLocality": "Tokyo"
            }
        })
    }

    pub(crate) fn sign_with(
        suite: &ProofSuite,
        rng: &mut StdRng,
        document: &Value,
        verification_method: &str,
    ) -> Proof {
        let options = SignOptions {
            created: Some("2023-02-09T09:35:07Z".to_string()),
            ..SignOptions::new(verification_method)
        };
        suite.sign(rng, document, &options).unwrap()
    }
}
