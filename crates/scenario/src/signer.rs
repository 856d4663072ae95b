//! Compact token signing of scenario documents
//!
//! The token is `header.payload.signature`, each segment base64url encoded
//! without padding. The header carries the whole certificate chain (`x5c`,
//! standard base64 DER, leaf first) and repeats the leaf as `leafCert` so
//! the receiver can check trust out of band.
//!
//! The algorithm follows the key family: RSA keys sign with RS256
//! (RSASSA-PKCS1-v1_5 over SHA-256), every other key is treated as a P-256
//! key and signs with ES256 (64-byte `r || s`).

use std::{fmt, fs, path::Path};

use base64::prelude::*;
use p256::ecdsa::signature::Signer;
use rsa::{Pkcs1v15Sign, RsaPrivateKey, pkcs1::DecodeRsaPrivateKey, pkcs8::DecodePrivateKey};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use tracing::{debug, warn};
use x509_cert::{Certificate, der::Encode};

use crate::document::{ScenarioDocument, ScenarioMessage};
use crate::error::{BoxError, Error, Result, SignError};

/// Placeholder callers may substitute when no token could be produced
pub const INVALID_TOKEN: &str = "INVALID_JWT";

/// Token type announced in the header
pub const TOKEN_TYPE: &str = "JWT";

/// Token signature algorithm
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Algorithm {
    /// RSASSA-PKCS1-v1_5 with SHA-256
    #[serde(rename = "RS256")]
    Rs256,
    /// ECDSA P-256 with SHA-256
    #[serde(rename = "ES256")]
    Es256,
}

impl Algorithm {
    /// Registered algorithm name
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Rs256 => "RS256",
            Self::Es256 => "ES256",
        }
    }
}

impl fmt::Display for Algorithm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Private key used to sign scenarios
#[derive(Clone)]
pub enum SigningKey {
    /// RSA key
    Rsa(RsaPrivateKey),
    /// P-256 key
    Ec(p256::ecdsa::SigningKey),
}

impl fmt::Debug for SigningKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("SigningKey").field(&self.algorithm()).finish()
    }
}

impl SigningKey {
    /// Parse a PEM private key.
    ///
    /// Accepts PKCS#8 (RSA or P-256), PKCS#1 (RSA) and SEC1 (P-256).
    pub fn from_pem(pem: &str) -> Result<Self> {
        if let Ok(key) = RsaPrivateKey::from_pkcs8_pem(pem) {
            return Ok(Self::Rsa(key));
        }
        if let Ok(key) = RsaPrivateKey::from_pkcs1_pem(pem) {
            return Ok(Self::Rsa(key));
        }
        if let Ok(key) = p256::ecdsa::SigningKey::from_pkcs8_pem(pem) {
            return Ok(Self::Ec(key));
        }
        if let Ok(secret) = p256::SecretKey::from_sec1_pem(pem) {
            return Ok(Self::Ec(secret.into()));
        }
        Err(Error::KeyMaterial(
            "private key is neither a PKCS#8, PKCS#1 RSA nor SEC1 P-256 PEM".to_string(),
        ))
    }

    /// Algorithm selected by the key family
    pub const fn algorithm(&self) -> Algorithm {
        match self {
            Self::Rsa(_) => Algorithm::Rs256,
            Self::Ec(_) => Algorithm::Es256,
        }
    }

    fn sign(&self, message: &[u8]) -> std::result::Result<Vec<u8>, BoxError> {
        match self {
            Self::Rsa(key) => {
                let digest = Sha256::digest(message);
                Ok(key.sign(Pkcs1v15Sign::new::<Sha256>(), &digest)?)
            }
            Self::Ec(key) => {
                let signature: p256::ecdsa::Signature = key.try_sign(message)?;
                Ok(signature.to_bytes().to_vec())
            }
        }
    }
}

impl From<RsaPrivateKey> for SigningKey {
    fn from(key: RsaPrivateKey) -> Self {
        Self::Rsa(key)
    }
}

impl From<p256::ecdsa::SigningKey> for SigningKey {
    fn from(key: p256::ecdsa::SigningKey) -> Self {
        Self::Ec(key)
    }
}

/// A private key with its certificate chain
#[derive(Debug, Clone)]
pub struct SigningMaterial {
    key: SigningKey,
    chain: Vec<Vec<u8>>,
}

impl SigningMaterial {
    /// Combine a key with a DER certificate chain, leaf first
    pub fn new(key: SigningKey, chain: Vec<Vec<u8>>) -> Result<Self> {
        if chain.is_empty() {
            return Err(Error::KeyMaterial("certificate chain is empty".to_string()));
        }
        Ok(Self { key, chain })
    }

    /// Parse a PEM private key and one or more PEM certificates
    pub fn from_pem(key_pem: &str, chain_pem: &str) -> Result<Self> {
        let key = SigningKey::from_pem(key_pem)?;
        Self::new(key, parse_certificate_chain(chain_pem)?)
    }

    /// Read the private key and certificate chain from PEM files
    pub fn load<P, Q>(key_path: P, chain_path: Q) -> Result<Self>
    where
        P: AsRef<Path>,
        Q: AsRef<Path>,
    {
        let (key_path, chain_path) = (key_path.as_ref(), chain_path.as_ref());
        debug!(
            key = %key_path.display(),
            chain = %chain_path.display(),
            "Loading signing material"
        );
        let key_pem = fs::read_to_string(key_path)?;
        let chain_pem = fs::read_to_string(chain_path)?;
        let material = Self::from_pem(&key_pem, &chain_pem)?;
        debug!(
            algorithm = %material.algorithm(),
            certificates = material.chain.len(),
            "Signing material loaded"
        );
        Ok(material)
    }

    /// Algorithm selected by the key
    pub const fn algorithm(&self) -> Algorithm {
        self.key.algorithm()
    }

    /// Private key
    pub const fn key(&self) -> &SigningKey {
        &self.key
    }

    /// DER certificates, leaf first
    pub fn certificate_chain(&self) -> &[Vec<u8>] {
        &self.chain
    }

    /// DER leaf certificate
    pub fn leaf(&self) -> &[u8] {
        self.chain.first().map(Vec::as_slice).unwrap_or_default()
    }
}

fn parse_certificate_chain(pem: &str) -> Result<Vec<Vec<u8>>> {
    if pem.trim().is_empty() {
        return Err(Error::KeyMaterial("certificate chain is empty".to_string()));
    }
    Certificate::load_pem_chain(pem.as_bytes())
        .and_then(|certs| certs.iter().map(Encode::to_der).collect())
        .map_err(|e| Error::KeyMaterial(format!("invalid certificate chain: {e}")))
}

/// Decoded token header
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TokenHeader {
    /// Token type
    pub typ: String,
    /// Signature algorithm
    pub alg: Algorithm,
    /// Certificate chain, standard base64 DER, leaf first
    pub x5c: Vec<String>,
    /// Leaf certificate, standard base64 DER
    pub leaf_cert: String,
}

#[derive(Serialize)]
struct Envelope<'a> {
    message: &'a ScenarioDocument,
}

/// Signs scenario documents with optional key material
#[derive(Debug, Clone, Default)]
pub struct ScenarioSigner {
    material: Option<SigningMaterial>,
}

impl ScenarioSigner {
    /// Signer holding key material
    pub const fn new(material: SigningMaterial) -> Self {
        Self {
            material: Some(material),
        }
    }

    /// Signer without key material; every signing attempt is unavailable
    pub const fn unavailable() -> Self {
        Self { material: None }
    }

    /// Whether a key is loaded
    pub const fn is_available(&self) -> bool {
        self.material.is_some()
    }

    /// Loaded key material
    pub const fn material(&self) -> Option<&SigningMaterial> {
        self.material.as_ref()
    }

    /// Sign a document into a compact token
    pub fn sign(
        &self,
        document: &ScenarioDocument,
    ) -> std::result::Result<SignedScenario, SignError> {
        let Some(material) = &self.material else {
            warn!("No signing key loaded, scenario cannot be signed");
            return Err(SignError::Unavailable);
        };
        let algorithm = material.algorithm();

        let x5c: Vec<String> = material
            .chain
            .iter()
            .map(|der| BASE64_STANDARD.encode(der))
            .collect();
        let header = TokenHeader {
            typ: TOKEN_TYPE.to_string(),
            alg: algorithm,
            leaf_cert: x5c.first().cloned().unwrap_or_default(),
            x5c,
        };

        let header_json = serde_json::to_vec(&header).map_err(SignError::signing)?;
        let payload_json =
            serde_json::to_vec(&Envelope { message: document }).map_err(SignError::signing)?;
        let signing_input = format!(
            "{}.{}",
            BASE64_URL_SAFE_NO_PAD.encode(header_json),
            BASE64_URL_SAFE_NO_PAD.encode(payload_json)
        );

        let signature = material
            .key
            .sign(signing_input.as_bytes())
            .map_err(|source| SignError::Signing { source })?;
        let token = format!("{signing_input}.{}", BASE64_URL_SAFE_NO_PAD.encode(signature));

        debug!(
            %algorithm,
            steps = document.len(),
            len = token.len(),
            "Scenario signed"
        );
        Ok(SignedScenario { token, algorithm })
    }
}

impl From<SigningMaterial> for ScenarioSigner {
    fn from(material: SigningMaterial) -> Self {
        Self::new(material)
    }
}

impl From<Option<SigningMaterial>> for ScenarioSigner {
    fn from(material: Option<SigningMaterial>) -> Self {
        Self { material }
    }
}

/// A signed compact token
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SignedScenario {
    token: String,
    algorithm: Algorithm,
}

impl SignedScenario {
    /// Algorithm the token was signed with
    pub const fn algorithm(&self) -> Algorithm {
        self.algorithm
    }

    /// Compact serialization
    pub fn as_str(&self) -> &str {
        &self.token
    }

    /// Take the compact serialization
    pub fn into_string(self) -> String {
        self.token
    }

    fn segments(&self) -> Result<[&str; 3]> {
        let mut parts = self.token.split('.');
        match (parts.next(), parts.next(), parts.next(), parts.next()) {
            (Some(header), Some(payload), Some(signature), None) => {
                Ok([header, payload, signature])
            }
            _ => Err(Error::MalformedToken("expected three segments".to_string())),
        }
    }

    fn decode_segment(segment: &str) -> Result<Vec<u8>> {
        BASE64_URL_SAFE_NO_PAD
            .decode(segment)
            .map_err(|e| Error::MalformedToken(e.to_string()))
    }

    /// Bytes covered by the signature, `header.payload`
    pub fn signing_input(&self) -> Result<&str> {
        let [header, payload, _] = self.segments()?;
        Ok(&self.token[..header.len() + 1 + payload.len()])
    }

    /// Decoded header
    pub fn header(&self) -> Result<TokenHeader> {
        let [header, _, _] = self.segments()?;
        Ok(serde_json::from_slice(&Self::decode_segment(header)?)?)
    }

    /// Decoded payload
    pub fn decode_payload(&self) -> Result<ScenarioMessage> {
        let [_, payload, _] = self.segments()?;
        Ok(serde_json::from_slice(&Self::decode_segment(payload)?)?)
    }

    /// Raw signature bytes
    pub fn signature(&self) -> Result<Vec<u8>> {
        let [_, _, signature] = self.segments()?;
        Self::decode_segment(signature)
    }
}

impl fmt::Display for SignedScenario {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.token)
    }
}

impl AsRef<str> for SignedScenario {
    fn as_ref(&self) -> &str {
        &self.token
    }
}
