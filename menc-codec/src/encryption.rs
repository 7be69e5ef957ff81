//! Composing the codec with AES-256 in CFB mode.
//!
//! CFB turns the block cipher into a self-synchronizing stream: any
//! multiple-of-four byte string decrypts to some same-length weight
//! stream, so a wrong key produces uniformly random-looking weights that
//! still recite to plausible model output. Decryption therefore never
//! fails on a bad key.
//!
//! This is NON-AUTHENTICATED encryption: there is no integrity check of
//! any kind on the ciphertext.

use aes::Aes256;
use aes::cipher::{AsyncStreamCipher, KeyIvInit, generic_array::GenericArray};
use rand::{CryptoRng, Rng};
use sha2::{Digest, Sha256};

use crate::{
    Reason, bail,
    encoding::{decode, encode},
    model::LanguageModel,
};

type Aes256CfbEnc = cfb_mode::Encryptor<Aes256>;
type Aes256CfbDec = cfb_mode::Decryptor<Aes256>;

/// Cipher block size in bytes; also the IV length on the wire.
pub const CIPHER_BLOCK_SIZE: usize = 16;

/// Hashes a passphrase into a 32-byte AES-256 key.
///
/// # Example
///
/// ```rust
/// let key = menc_codec::derive_key("foo");
/// assert_eq!(key.len(), 32);
/// ```
pub fn derive_key(passphrase: &str) -> [u8; 32] {
    Sha256::digest(passphrase.as_bytes()).into()
}

/// Encrypts `plaintext` through the model codec under `passphrase`.
///
/// The plaintext is boundary-terminated when necessary, encoded to a
/// block-aligned weight stream, and encrypted under a fresh random IV. The
/// result is `IV ‖ ciphertext`.
///
/// Propagates codec failures: a plaintext character outside the model's
/// alphabet, or (rarely, non-deterministically) exhausted padding trials.
pub fn encrypt<M, R>(
    model: &M,
    passphrase: &str,
    plaintext: &str,
    rng: &mut R,
) -> Result<Vec<u8>, Reason>
where
    M: LanguageModel + ?Sized,
    R: Rng + CryptoRng + ?Sized,
{
    let mut iv = [0u8; CIPHER_BLOCK_SIZE];
    rng.fill_bytes(&mut iv);

    let mut body = encode(model, plaintext, CIPHER_BLOCK_SIZE, rng)?;
    let key = derive_key(passphrase);
    Aes256CfbEnc::new(&key.into(), &iv.into()).encrypt(&mut body);

    let mut ciphertext = iv.to_vec();
    ciphertext.extend_from_slice(&body);
    Ok(ciphertext)
}

/// Decrypts `ciphertext` back into the plaintext.
///
/// A wrong passphrase is not detectable: the weights decrypt to garbage
/// that still decodes to a model-plausible character sequence, and that
/// decoy text is returned as if it were the plaintext.
///
/// Fails with [`Reason::CiphertextShort`] when the input cannot even hold
/// the IV.
pub fn decrypt<M>(model: &M, passphrase: &str, ciphertext: &[u8]) -> Result<String, Reason>
where
    M: LanguageModel + ?Sized,
{
    bail!(
        ciphertext.len() < CIPHER_BLOCK_SIZE,
        Reason::CiphertextShort(ciphertext.len())
    );

    let (iv, body) = ciphertext.split_at(CIPHER_BLOCK_SIZE);
    let key = derive_key(passphrase);
    let mut body = body.to_vec();
    Aes256CfbDec::new(&key.into(), GenericArray::from_slice(iv)).decrypt(&mut body);

    decode(model, &body)
}
