// Copyright (C) 2020-2025  The Blockhouse Technology Limited (TBTL).
//
// This program is free software: you can redistribute it and/or modify it
// under the terms of the GNU Affero General Public License as published by
// the Free Software Foundation, either version 3 of the License, or (at your
// option) any later version.
//
// This program is distributed in the hope that it will be useful, but
// WITHOUT ANY WARRANTY; without even the implied warranty of MERCHANTABILITY
// or FITNESS FOR A PARTICULAR PURPOSE.  See the GNU Affero General Public
// License for more details.
//
// You should have received a copy of the GNU Affero General Public License
// along with this program.  If not, see <https://www.gnu.org/licenses/>.

//! Password-based JWE with `PBES2` key management and `AES-CBC-HMAC-SHA2`
//! content encryption, as specified in [RFC 7518].
//!
//! [RFC 7518]: https://datatracker.ietf.org/doc/html/rfc7518

use bh_crypto::SecretBytes;
use bherror::{
    traits::{ErrorContext as _, ForeignError as _, PropagateError as _},
    Error,
};
use openssl::{
    aes::{unwrap_key, wrap_key, AesKey},
    hash::MessageDigest,
    memcmp,
    pkey::PKey,
    sign::Signer,
    symm::{self, Cipher},
};

use crate::{
    error::{JweError, Result},
    utils::{base64_url_decode, base64_url_encode, decode_json_part, decode_part, split_compact},
    Header,
};

/// Number of parts of a compact JWE.
const JWE_PARTS: usize = 5;

/// Length of the AES-CBC initialization vector.
const IV_LEN: usize = 16;

/// Length of the integrity check block added by AES key wrap.
const KEY_WRAP_OVERHEAD: usize = 8;

/// `PBES2` key management algorithms.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyAlgorithm {
    /// `PBES2-HS256+A128KW`
    Pbes2Hs256A128Kw,
    /// `PBES2-HS384+A192KW`
    Pbes2Hs384A192Kw,
    /// `PBES2-HS512+A256KW`
    Pbes2Hs512A256Kw,
}

impl KeyAlgorithm {
    /// The `alg` header value.
    pub fn name(&self) -> &'static str {
        match self {
            Self::Pbes2Hs256A128Kw => "PBES2-HS256+A128KW",
            Self::Pbes2Hs384A192Kw => "PBES2-HS384+A192KW",
            Self::Pbes2Hs512A256Kw => "PBES2-HS512+A256KW",
        }
    }

    /// Parses an `alg` header value.
    pub fn from_name(name: &str) -> Option<Self> {
        [
            Self::Pbes2Hs256A128Kw,
            Self::Pbes2Hs384A192Kw,
            Self::Pbes2Hs512A256Kw,
        ]
        .into_iter()
        .find(|algorithm| algorithm.name() == name)
    }

    fn digest(&self) -> MessageDigest {
        match self {
            Self::Pbes2Hs256A128Kw => MessageDigest::sha256(),
            Self::Pbes2Hs384A192Kw => MessageDigest::sha384(),
            Self::Pbes2Hs512A256Kw => MessageDigest::sha512(),
        }
    }

    /// Length of the derived key encryption key.
    fn key_len(&self) -> usize {
        match self {
            Self::Pbes2Hs256A128Kw => 16,
            Self::Pbes2Hs384A192Kw => 24,
            Self::Pbes2Hs512A256Kw => 32,
        }
    }

    /// Derives the key encryption key from `password`.
    ///
    /// The PBKDF2 salt is `alg || 0x00 || p2s`.
    fn derive_key(
        &self,
        password: &[u8],
        salt_input: &[u8],
        count: u32,
    ) -> Result<SecretBytes, JweError> {
        let salt = [self.name().as_bytes(), &[0], salt_input].concat();
        let mut key = SecretBytes::new(vec![0; self.key_len()]);

        openssl::pkcs5::pbkdf2_hmac(password, &salt, count as usize, self.digest(), &mut key)
            .foreign_err(|| JweError::CryptoBackend)
            .ctx(|| "PBKDF2 derivation failed")?;

        Ok(key)
    }
}

/// `AES-CBC-HMAC-SHA2` content encryption methods.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EncryptionMethod {
    /// `A128CBC-HS256`
    A128CbcHs256,
    /// `A192CBC-HS384`
    A192CbcHs384,
    /// `A256CBC-HS512`
    A256CbcHs512,
}

impl EncryptionMethod {
    /// The `enc` header value.
    pub fn name(&self) -> &'static str {
        match self {
            Self::A128CbcHs256 => "A128CBC-HS256",
            Self::A192CbcHs384 => "A192CBC-HS384",
            Self::A256CbcHs512 => "A256CBC-HS512",
        }
    }

    /// Parses an `enc` header value.
    pub fn from_name(name: &str) -> Option<Self> {
        [Self::A128CbcHs256, Self::A192CbcHs384, Self::A256CbcHs512]
            .into_iter()
            .find(|method| method.name() == name)
    }

    fn digest(&self) -> MessageDigest {
        match self {
            Self::A128CbcHs256 => MessageDigest::sha256(),
            Self::A192CbcHs384 => MessageDigest::sha384(),
            Self::A256CbcHs512 => MessageDigest::sha512(),
        }
    }

    fn cipher(&self) -> Cipher {
        match self {
            Self::A128CbcHs256 => Cipher::aes_128_cbc(),
            Self::A192CbcHs384 => Cipher::aes_192_cbc(),
            Self::A256CbcHs512 => Cipher::aes_256_cbc(),
        }
    }

    /// Length of each of the MAC and encryption halves of the content
    /// encryption key, and of the authentication tag.
    fn key_len(&self) -> usize {
        match self {
            Self::A128CbcHs256 => 16,
            Self::A192CbcHs384 => 24,
            Self::A256CbcHs512 => 32,
        }
    }

    /// Computes the truncated `HMAC(aad || iv || ciphertext || AL)`, where
    /// `AL` is the big-endian bit length of `aad`.
    fn authentication_tag(
        &self,
        mac_key: &[u8],
        aad: &[u8],
        iv: &[u8],
        cipher_text: &[u8],
    ) -> Result<Vec<u8>, JweError> {
        let aad_bits = (aad.len() as u64 * 8).to_be_bytes();

        let compute = || -> std::result::Result<Vec<u8>, openssl::error::ErrorStack> {
            let key = PKey::hmac(mac_key)?;
            let mut signer = Signer::new(self.digest(), &key)?;
            signer.update(aad)?;
            signer.update(iv)?;
            signer.update(cipher_text)?;
            signer.update(&aad_bits)?;
            signer.sign_to_vec()
        };

        let mut tag = compute().foreign_err(|| JweError::CryptoBackend)?;
        tag.truncate(self.key_len());
        Ok(tag)
    }
}

/// Validated PBES2 parameters of a JWE header.
struct Pbes2Parameters {
    algorithm: KeyAlgorithm,
    method: EncryptionMethod,
    salt_input: Vec<u8>,
    count: u32,
}

fn algorithm(headers: &Header) -> Result<KeyAlgorithm, JweError> {
    headers
        .alg
        .as_deref()
        .and_then(KeyAlgorithm::from_name)
        .ok_or_else(|| Error::root(JweError::InvalidAlgorithm))
        .ctx(|| format!("alg {:?}", headers.alg))
}

fn method(headers: &Header) -> Result<EncryptionMethod, JweError> {
    headers
        .enc
        .as_deref()
        .and_then(EncryptionMethod::from_name)
        .ok_or_else(|| Error::root(JweError::InvalidEncryptionMethod))
        .ctx(|| format!("enc {:?}", headers.enc))
}

fn salt(headers: &Header) -> Result<(Vec<u8>, u32), JweError> {
    let salt_input = headers
        .p2s
        .as_deref()
        .map(base64_url_decode)
        .and_then(std::result::Result::ok)
        .ok_or_else(|| Error::root(JweError::InvalidSaltInput))
        .ctx(|| "p2s is missing or not base64url")?;

    let count = headers
        .p2c
        .filter(|count| *count > 0)
        .ok_or_else(|| Error::root(JweError::InvalidSaltInput))
        .ctx(|| "p2c is missing or zero")?;

    Ok((salt_input, count))
}

impl Pbes2Parameters {
    fn for_encryption(headers: &Header) -> Result<Self, JweError> {
        let method = method(headers)?;
        let algorithm = algorithm(headers)?;
        let (salt_input, count) = salt(headers)?;

        Ok(Self {
            algorithm,
            method,
            salt_input,
            count,
        })
    }

    fn for_decryption(headers: &Header) -> Result<Self, JweError> {
        let algorithm = algorithm(headers)?;
        let (salt_input, count) = salt(headers)?;
        let method = method(headers)?;

        Ok(Self {
            algorithm,
            method,
            salt_input,
            count,
        })
    }

    fn key_encryption_key(&self, password: &[u8]) -> Result<SecretBytes, JweError> {
        self.algorithm
            .derive_key(password, &self.salt_input, self.count)
    }
}

/// AES key wrap ([RFC 3394]) of `key` under `kek`, with the default IV.
///
/// [RFC 3394]: https://datatracker.ietf.org/doc/html/rfc3394
fn aes_wrap(kek: &[u8], key: &[u8]) -> Result<Vec<u8>, JweError> {
    let kek = AesKey::new_encrypt(kek)
        .map_err(|_| Error::root(JweError::CryptoBackend))
        .ctx(|| "invalid key encryption key")?;

    let mut wrapped = vec![0; key.len() + KEY_WRAP_OVERHEAD];
    wrap_key(&kek, None, &mut wrapped, key)
        .map_err(|_| Error::root(JweError::CryptoBackend))
        .ctx(|| "key wrap failed")?;

    Ok(wrapped)
}

/// Reverses [`aes_wrap`], failing when the integrity check does not hold.
fn aes_unwrap(kek: &[u8], wrapped: &[u8]) -> Result<SecretBytes, JweError> {
    if wrapped.len() < 2 * KEY_WRAP_OVERHEAD || wrapped.len() % KEY_WRAP_OVERHEAD != 0 {
        return Err(Error::root(JweError::Unauthenticatable))
            .ctx(|| format!("wrapped key of invalid length {}", wrapped.len()));
    }

    let kek = AesKey::new_decrypt(kek)
        .map_err(|_| Error::root(JweError::CryptoBackend))
        .ctx(|| "invalid key encryption key")?;

    let mut key = SecretBytes::new(vec![0; wrapped.len() - KEY_WRAP_OVERHEAD]);
    unwrap_key(&kek, None, &mut key, wrapped)
        .map_err(|_| Error::root(JweError::Unauthenticatable))
        .ctx(|| "key unwrap failed")?;

    Ok(key)
}

fn random_bytes(len: usize) -> Result<Vec<u8>, JweError> {
    let mut bytes = vec![0; len];
    openssl::rand::rand_bytes(&mut bytes).foreign_err(|| JweError::CryptoBackend)?;
    Ok(bytes)
}

fn random_key(len: usize) -> Result<SecretBytes, JweError> {
    random_bytes(len).map(SecretBytes::new)
}

/// A JSON Web Encryption token encrypted under a password.
///
/// The additional authenticated data is the ASCII of the `base64url`-encoded
/// header, exactly as it appears in the compact form.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct JweToken {
    headers: Header,
    aad: Vec<u8>,
    encrypted_key: Vec<u8>,
    iv: Vec<u8>,
    cipher_text: Vec<u8>,
    authentication_tag: Vec<u8>,
}

impl JweToken {
    /// Encrypts `plaintext` under `password`.
    ///
    /// The header must carry a supported `enc` and `alg` together with the
    /// `p2s` salt input and `p2c` iteration count.
    pub fn encrypt(plaintext: &[u8], password: &[u8], headers: Header) -> Result<Self, JweError> {
        let parameters = Pbes2Parameters::for_encryption(&headers)?;
        let key_len = parameters.method.key_len();

        let content_key = random_key(2 * key_len)?;
        let (mac_key, encryption_key) = content_key.split_at(key_len);

        let kek = parameters.key_encryption_key(password)?;
        let encrypted_key = aes_wrap(&kek, &content_key)?;

        let aad = crate::utils::encode_json_part(&headers, "header")
            .with_err(|| JweError::Format)?
            .into_bytes();
        let iv = random_bytes(IV_LEN)?;

        let cipher_text = symm::encrypt(
            parameters.method.cipher(),
            encryption_key,
            Some(iv.as_slice()),
            plaintext,
        )
        .foreign_err(|| JweError::CryptoBackend)?;

        let authentication_tag =
            parameters
                .method
                .authentication_tag(mac_key, &aad, &iv, &cipher_text)?;

        Ok(Self {
            headers,
            aad,
            encrypted_key,
            iv,
            cipher_text,
            authentication_tag,
        })
    }

    /// Decrypts the token with `password`.
    ///
    /// A wrong password or any modification of the token yields
    /// [`JweError::Unauthenticatable`].
    pub fn decrypt(&self, password: &[u8]) -> Result<Vec<u8>, JweError> {
        let parameters = Pbes2Parameters::for_decryption(&self.headers)?;
        let key_len = parameters.method.key_len();

        let kek = parameters.key_encryption_key(password)?;
        let content_key = aes_unwrap(&kek, &self.encrypted_key)?;
        if content_key.len() != 2 * key_len {
            return Err(Error::root(JweError::Unauthenticatable))
                .ctx(|| format!("content key of invalid length {}", content_key.len()));
        }
        let (mac_key, encryption_key) = content_key.split_at(key_len);

        let expected_tag =
            parameters
                .method
                .authentication_tag(mac_key, &self.aad, &self.iv, &self.cipher_text)?;
        if expected_tag.len() != self.authentication_tag.len()
            || !memcmp::eq(&expected_tag, &self.authentication_tag)
        {
            return Err(Error::root(JweError::Unauthenticatable))
                .ctx(|| "authentication tag mismatch");
        }

        symm::decrypt(
            parameters.method.cipher(),
            encryption_key,
            Some(self.iv.as_slice()),
            &self.cipher_text,
        )
        .foreign_err(|| JweError::CryptoBackend)
    }

    /// Returns the compact serialization
    /// `header.encryptedKey.iv.ciphertext.tag`.
    pub fn to_compact(&self) -> String {
        [
            String::from_utf8_lossy(&self.aad).into_owned(),
            base64_url_encode(&self.encrypted_key),
            base64_url_encode(&self.iv),
            base64_url_encode(&self.cipher_text),
            base64_url_encode(&self.authentication_tag),
        ]
        .join(".")
    }

    /// Parses the compact serialization.
    pub fn from_compact(compact: &str) -> Result<Self, JweError> {
        let parts = split_compact(compact, JWE_PARTS).with_err(|| JweError::Format)?;
        let decode = |index: usize, component| {
            decode_part(parts[index], component).with_err(|| JweError::Format)
        };

        Ok(Self {
            headers: decode_json_part(parts[0], "header").with_err(|| JweError::Format)?,
            aad: parts[0].as_bytes().to_vec(),
            encrypted_key: decode(1, "encrypted key")?,
            iv: decode(2, "initialization vector")?,
            cipher_text: decode(3, "ciphertext")?,
            authentication_tag: decode(4, "authentication tag")?,
        })
    }

    /// The protected header.
    pub fn headers(&self) -> &Header {
        &self.headers
    }

    /// The additional authenticated data.
    pub fn aad(&self) -> &[u8] {
        &self.aad
    }

    /// The wrapped content encryption key.
    pub fn encrypted_key(&self) -> &[u8] {
        &self.encrypted_key
    }

    /// The initialization vector.
    pub fn iv(&self) -> &[u8] {
        &self.iv
    }

    /// The ciphertext.
    pub fn cipher_text(&self) -> &[u8] {
        &self.cipher_text
    }

    /// The authentication tag.
    pub fn authentication_tag(&self) -> &[u8] {
        &self.authentication_tag
    }
}
