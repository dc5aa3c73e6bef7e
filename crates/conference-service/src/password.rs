use rand::Rng;
use sha2::{Digest, Sha256};

/// Password hashing and verification contract.
///
/// The stored hash format belongs to the implementation; callers only pass
/// back what [`PasswordVerifier::hash`] produced.
pub trait PasswordVerifier: Send + Sync {
    fn hash(&self, password: &str) -> String;
    fn verify(&self, password: &str, stored_hash: &str) -> bool;
}

const SCHEME: &str = "sha256";
const SALT_LEN: usize = 16;

/// Salted SHA-256, stored as `sha256$<salt hex>$<digest hex>`.
#[derive(Clone, Copy, Debug, Default)]
pub struct Sha256PasswordVerifier;

impl Sha256PasswordVerifier {
    fn digest(salt: &[u8], password: &str) -> Vec<u8> {
        let mut hasher = Sha256::new();
        hasher.update(salt);
        hasher.update(password.as_bytes());
        hasher.finalize().to_vec()
    }
}

impl PasswordVerifier for Sha256PasswordVerifier {
    fn hash(&self, password: &str) -> String {
        let mut salt = [0u8; SALT_LEN];
        rand::rng().fill(&mut salt);
        let digest = Self::digest(&salt, password);
        format!("{SCHEME}${}${}", hex::encode(salt), hex::encode(digest))
    }

    fn verify(&self, password: &str, stored_hash: &str) -> bool {
        let mut parts = stored_hash.splitn(3, '$');
        let (Some(SCHEME), Some(salt), Some(expected)) = (parts.next(), parts.next(), parts.next())
        else {
            return false;
        };
        let (Ok(salt), Ok(expected)) = (hex::decode(salt), hex::decode(expected)) else {
            return false;
        };
        let actual = Self::digest(&salt, password);
        actual.len() == expected.len()
            && actual
                .iter()
                .zip(&expected)
                .fold(0u8, |diff, (a, b)| diff | (a ^ b))
                == 0
    }
}
