//! Signature authority: recoverable secp256k1 signatures over content hashes.
//!
//! Batches are authorized by an off-ledger keypair. The batch creator stores
//! the hex-encoded public key in the batch record; every claim and refund
//! presents a signature from which the signer's key is recovered and compared
//! byte-for-byte against the stored key.
//!
//! Encoding choices (fixed for interoperability):
//! - Messages are hashed with the host content hash ([`Hash::from_bytes`],
//!   Blake3) before signing.
//! - Public keys are the 65-byte uncompressed SEC1 encoding, lowercase hex.
//! - Signatures are 65 bytes: the 64-byte compact ECDSA signature followed by
//!   one recovery-id byte, lowercase hex.

use crate::{Address, Hash};
use secp256k1::ecdsa::{RecoverableSignature, RecoveryId};
use secp256k1::{Message, Secp256k1, SecretKey};

/// Serialized recoverable signature length: 64 compact bytes + recovery id.
pub const SIGNATURE_BYTES: usize = 65;

/// A secp256k1 key pair for authorizing batches off-ledger.
#[derive(Clone)]
pub struct KeyPair {
    secret: SecretKey,
    public: secp256k1::PublicKey,
}

impl KeyPair {
    /// Generate a new random keypair.
    pub fn generate() -> Self {
        let secp = Secp256k1::new();
        let (secret, public) = secp.generate_keypair(&mut rand::thread_rng());
        Self { secret, public }
    }

    /// Create a keypair from a 32-byte seed (for testing/simulation).
    ///
    /// # Panics
    ///
    /// Panics if the seed is not a valid secp256k1 scalar (all-zero seeds).
    pub fn from_seed(seed: &[u8; 32]) -> Self {
        let secp = Secp256k1::new();
        let secret = SecretKey::from_slice(seed).expect("seed must be a valid scalar");
        let public = secret.public_key(&secp);
        Self { secret, public }
    }

    /// Sign a message, producing a hex-encoded recoverable signature.
    ///
    /// The message is content-hashed first; the signature covers the hash.
    pub fn sign(&self, message: &[u8]) -> String {
        let secp = Secp256k1::new();
        let digest = Message::from_digest(Hash::from_bytes(message).to_bytes());
        let signature = secp.sign_ecdsa_recoverable(&digest, &self.secret);
        let (recovery_id, compact) = signature.serialize_compact();

        let mut bytes = [0u8; SIGNATURE_BYTES];
        bytes[..64].copy_from_slice(&compact);
        bytes[64] = recovery_id.to_i32() as u8;
        hex::encode(bytes)
    }

    /// Hex encoding of the uncompressed public key.
    pub fn public_key_hex(&self) -> String {
        hex::encode(self.public.serialize_uncompressed())
    }

    /// On-ledger address derived from the public key.
    pub fn address(&self) -> Address {
        Address::from_public_key(&self.public.serialize_uncompressed())
    }
}

impl std::fmt::Debug for KeyPair {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "KeyPair({}..)", &self.public_key_hex()[..16])
    }
}

/// Recover the hex-encoded public key that signed `message`.
///
/// Returns `None` if the signature is malformed or recovery fails. The caller
/// compares the result against a stored key; a `None` therefore always fails
/// closed.
pub fn recover_signer(signature_hex: &str, message: &[u8]) -> Option<String> {
    let bytes = hex::decode(signature_hex).ok()?;
    if bytes.len() != SIGNATURE_BYTES {
        return None;
    }

    let recovery_id = RecoveryId::from_i32(bytes[64] as i32).ok()?;
    let signature = RecoverableSignature::from_compact(&bytes[..64], recovery_id).ok()?;

    let secp = Secp256k1::new();
    let digest = Message::from_digest(Hash::from_bytes(message).to_bytes());
    let public = secp.recover_ecdsa(&digest, &signature).ok()?;
    Some(hex::encode(public.serialize_uncompressed()))
}

/// Verify that `message` was signed by the key behind `public_key_hex`.
///
/// Pure and deterministic: recovers the signer from the signature and
/// compares the hex encodings byte-for-byte. Any decode or recovery failure
/// verifies as `false`.
pub fn verify_signature(public_key_hex: &str, signature_hex: &str, message: &[u8]) -> bool {
    match recover_signer(signature_hex, message) {
        Some(recovered) => recovered == public_key_hex,
        None => false,
    }
}
