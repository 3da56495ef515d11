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

/// An identifier of the algorithm used for hashing.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, strum_macros::Display)]
pub enum HashingAlgorithm {
    /// SHA-256, the default.
    #[default]
    #[strum(to_string = "sha-256")]
    Sha256,

    /// SHA-512.
    #[strum(to_string = "sha-512")]
    Sha512,
}

impl HashingAlgorithm {
    /// Length of the digest in bytes.
    pub fn digest_len(&self) -> usize {
        match self {
            HashingAlgorithm::Sha256 => 32,
            HashingAlgorithm::Sha512 => 64,
        }
    }
}

/// The trait used for calculating hash digest.
///
/// The algorithm used for calculating the digest needs to be the one returned
/// from the [`Hasher::algorithm`] method.
pub trait Hasher: Send + Sync {
    /// Returns the algorithm used within [`Hasher::digest`].
    fn algorithm(&self) -> HashingAlgorithm;

    /// Computes the hash digest of the given `input`.
    fn digest(&self, input: &[u8]) -> Vec<u8>;
}

impl<H: Hasher + ?Sized> Hasher for &H {
    fn algorithm(&self) -> HashingAlgorithm {
        (**self).algorithm()
    }

    fn digest(&self, input: &[u8]) -> Vec<u8> {
        (**self).digest(input)
    }
}

impl<H: Hasher + ?Sized> Hasher for Box<H> {
    fn algorithm(&self) -> HashingAlgorithm {
        self.as_ref().algorithm()
    }

    fn digest(&self, input: &[u8]) -> Vec<u8> {
        self.as_ref().digest(input)
    }
}

/// [`Hasher`] computing SHA-256 digests with `openssl`.
#[derive(Debug, Default, Clone, Copy)]
pub struct Sha256;

impl Hasher for Sha256 {
    fn algorithm(&self) -> HashingAlgorithm {
        HashingAlgorithm::Sha256
    }

    fn digest(&self, input: &[u8]) -> Vec<u8> {
        openssl::sha::sha256(input).to_vec()
    }
}

/// [`Hasher`] computing SHA-512 digests with `openssl`.
#[derive(Debug, Default, Clone, Copy)]
pub struct Sha512;

impl Hasher for Sha512 {
    fn algorithm(&self) -> HashingAlgorithm {
        HashingAlgorithm::Sha512
    }

    fn digest(&self, input: &[u8]) -> Vec<u8> {
        openssl::sha::sha512(input).to_vec()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sha256_known_answer() {
        assert_eq!(
            hex::encode(Sha256.digest(b"abc")),
            "ba7816bf8f01cfea414140de5dae2223b00361a396177a9cb410ff61f20015ad"
        );
    }

    #[test]
    fn sha512_known_answer() {
        assert_eq!(
            hex::encode(Sha512.digest(b"abc")),
            "ddaf35a193617abacc417349ae20413112e6fa4e89a97ea20a9eeee64b55d39a\
             2192992a274fc1a836ba3c23a3feebbd454d4423643ce80e2a9ac94fa54ca49f"
        );
    }

    #[test]
    fn digest_len_matches_algorithm() {
        let hashers: [&dyn Hasher; 2] = [&Sha256, &Sha512];
        for hasher in hashers {
            assert_eq!(hasher.digest(b"").len(), hasher.algorithm().digest_len());
        }
    }
}
