use oxrdf::NamedNodeRef;

// http://www.w3.org/1999/02/22-rdf-syntax-ns#
pub const RDF_TYPE: NamedNodeRef =
    NamedNodeRef::new_unchecked("http://www.w3.org/1999/02/22-rdf-syntax-ns#type");

// http://www.w3.org/2001/XMLSchema#
pub const XSD_STRING: NamedNodeRef =
    NamedNodeRef::new_unchecked("http://www.w3.org/2001/XMLSchema#string");
pub const XSD_INTEGER: NamedNodeRef =
    NamedNodeRef::new_unchecked("http://www.w3.org/2001/XMLSchema#integer");
pub const XSD_DOUBLE: NamedNodeRef =
    NamedNodeRef::new_unchecked("http://www.w3.org/2001/XMLSchema#double");
pub const XSD_BOOLEAN: NamedNodeRef =
    NamedNodeRef::new_unchecked("http://www.w3.org/2001/XMLSchema#boolean");
pub const XSD_DATE_TIME: NamedNodeRef =
    NamedNodeRef::new_unchecked("http://www.w3.org/2001/XMLSchema#dateTime");

// http://purl.org/dc/terms/
pub const CREATED: NamedNodeRef = NamedNodeRef::new_unchecked("http://purl.org/dc/terms/created");

// https://w3id.org/security#
pub const SECURITY_VOCAB: &str = "https://w3id.org/security#";
pub const PROOF_PURPOSE: NamedNodeRef =
    NamedNodeRef::new_unchecked("https://w3id.org/security#proofPurpose");
pub const VERIFICATION_METHOD: NamedNodeRef =
    NamedNodeRef::new_unchecked("https://w3id.org/security#verificationMethod");
pub const ASSERTION_METHOD: NamedNodeRef =
    NamedNodeRef::new_unchecked("https://w3id.org/security#assertionMethod");
pub const CONTROLLER: NamedNodeRef =
    NamedNodeRef::new_unchecked("https://w3id.org/security#controller");
pub const REVOKED: NamedNodeRef = NamedNodeRef::new_unchecked("https://w3id.org/security#revoked");
pub const PUBLIC_KEY_MULTIBASE: NamedNodeRef =
    NamedNodeRef::new_unchecked("https://w3id.org/security#publicKeyMultibase");
pub const SECRET_KEY_MULTIBASE: NamedNodeRef =
    NamedNodeRef::new_unchecked("https://w3id.org/security#secretKeyMultibase");

// https://www.zkp-ld.org/security#
pub const BBS_TERMWISE_SIGNATURE_2021: NamedNodeRef =
    NamedNodeRef::new_unchecked("https://www.zkp-ld.org/security#BbsTermwiseSignature2021");
