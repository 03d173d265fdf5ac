use crate::{
    common::{ark_to_base64url, BBSPlusHash, BBSPlusKeypair, BBSPlusParams},
    constants::GENERATOR_SEED,
    error::RDFProofsError,
};
use ark_std::rand::RngCore;

pub fn generate_params(message_count: u32) -> BBSPlusParams {
    // Note: Parameters here are shared among all the issuers.
    BBSPlusParams::new::<BBSPlusHash>(GENERATOR_SEED, message_count)
}

pub fn generate_keypair<R: RngCore>(rng: &mut R) -> Result<BBSPlusKeypair, RDFProofsError> {
    // `g_2` is all we need here, so a single message generator is enough
    let base_params = generate_params(1);

    Ok(BBSPlusKeypair::generate_using_rng(rng, &base_params))
}

/// Key pair serialized as multibase (base64url) strings, the form stored in key graphs.
#[derive(Debug)]
pub struct KeyPairBase64Url {
    pub secret_key: String,
    pub public_key: String,
}

impl KeyPairBase64Url {
    pub fn new<R: RngCore>(rng: &mut R) -> Result<Self, RDFProofsError> {
        let keypair = generate_keypair(rng)?;
        let secret_key = ark_to_base64url(&keypair.secret_key)?;
        let public_key = ark_to_base64url(&keypair.public_key)?;

        Ok(Self {
            secret_key,
            public_key,
        })
    }

    /// N-Triples describing a verification method `<controller>#<key id>` with this key pair
    pub fn to_key_graph(&self, controller: &str, key_id: &str) -> String {
        let method = format!("{}#{}", controller, key_id);
        format!(
            r#"<{controller}> <https://w3id.org/security#verificationMethod> <{method}> .
<{controller}> <https://w3id.org/security#assertionMethod> <{method}> .
<{method}> <http://www.w3.org/1999/02/22-rdf-syntax-ns#type> <https://w3id.org/security#Multikey> .
<{method}> <https://w3id.org/security#controller> <{controller}> .
<{method}> <https://w3id.org/security#secretKeyMultibase> "{secret_key}" .
<{method}> <https://w3id.org/security#publicKeyMultibase> "{public_key}" .
"#,
            controller = controller,
            method = method,
            secret_key = self.secret_key,
            public_key = self.public_key,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::{generate_keypair, KeyPairBase64Url};
    use crate::{
        common::{
            ark_to_base64url, bytes_to_ark, multibase_to_bytes, BBSPlusPublicKey, BBSPlusSecretKey,
        },
        statement::Statement,
    };
    use ark_std::rand::{rngs::StdRng, SeedableRng};

    #[test]
    fn key_gen_simple() {
        let mut rng = StdRng::seed_from_u64(0u64);

        let keypair = KeyPairBase64Url::new(&mut rng).unwrap();
        assert!(keypair.secret_key.starts_with('u'));
        assert!(keypair.public_key.starts_with('u'));

        let secret_key_bytes = multibase_to_bytes(&keypair.secret_key).unwrap();
        let public_key_bytes = multibase_to_bytes(&keypair.public_key).unwrap();
        assert!(bytes_to_ark::<BBSPlusSecretKey>(&secret_key_bytes).is_ok());
        assert!(bytes_to_ark::<BBSPlusPublicKey>(&public_key_bytes).is_ok());

        let mut rng = StdRng::seed_from_u64(0u64);
        let expected = generate_keypair(&mut rng).unwrap();
        assert_eq!(keypair.secret_key, ark_to_base64url(&expected.secret_key).unwrap());
        assert_eq!(keypair.public_key, ark_to_base64url(&expected.public_key).unwrap());
    }

    #[test]
    fn key_graph_is_valid_ntriples() {
        let mut rng = StdRng::seed_from_u64(0u64);
        let keypair = KeyPairBase64Url::new(&mut rng).unwrap();
        let graph = keypair.to_key_graph("did:example:issuer0", "bls12_381-g2-pub001");
        assert_eq!(Statement::parse_all(&graph).unwrap().len(), 6);
    }
}
