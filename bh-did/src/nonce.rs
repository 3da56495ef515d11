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

use bh_crypto::{EphemeralSecret, Hasher as _, SecretExt as _, Sha512};
use bh_jose::base64_url_encode;
use bherror::traits::PropagateError as _;

use crate::error::{IdentifierError, Result};

/// Number of random bytes in a nonce.
pub const NONCE_RANDOM_LEN: usize = 32;

/// Computes request nonces bound to a DID.
#[derive(Debug, Clone, Copy, Default)]
pub struct NonceComputer;

impl NonceComputer {
    /// Returns `base64url(random) "." base64url(SHA-512(did))`.
    pub fn create_nonce(&self, did: &str) -> Result<String> {
        let random = EphemeralSecret::generate(NONCE_RANDOM_LEN)
            .and_then(|secret| secret.with_unprotected_bytes(|bytes| Ok(base64_url_encode(bytes))))
            .with_err(|| IdentifierError::NonceGeneration)?;

        let did_hash = base64_url_encode(Sha512.digest(did.as_bytes()));

        Ok(format!("{random}.{did_hash}"))
    }
}

#[cfg(test)]
mod tests {
    use bh_jose::base64_url_decode;

    use super::*;

    #[test]
    fn nonce_binds_the_did() {
        let nonce = NonceComputer.create_nonce("did:ion:abc").unwrap();
        let (random, did_hash) = nonce.split_once('.').unwrap();

        assert_eq!(base64_url_decode(random).unwrap().len(), NONCE_RANDOM_LEN);
        assert_eq!(
            base64_url_decode(did_hash).unwrap(),
            Sha512.digest(b"did:ion:abc")
        );
    }

    #[test]
    fn nonces_are_fresh() {
        let first = NonceComputer.create_nonce("did:ion:abc").unwrap();
        let second = NonceComputer.create_nonce("did:ion:abc").unwrap();

        assert_ne!(first, second);
        assert_eq!(first.split_once('.').unwrap().1, second.split_once('.').unwrap().1);
    }
}
