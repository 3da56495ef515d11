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

use bh_crypto::{Hasher, Sha256};

/// Multihash function code of `sha2-256`.
pub const SHA2_256_CODE: u8 = 0x12;

/// [Multihash] over SHA-256.
///
/// [Multihash]: https://multiformats.io/multihash/
#[derive(Debug, Clone, Copy, Default)]
pub struct Multihash;

impl Multihash {
    /// Returns `0x12 || 0x20 || SHA-256(data)`.
    pub fn compute(&self, data: &[u8]) -> Vec<u8> {
        let digest = Sha256.digest(data);

        // Digests of up to 127 bytes encode their length in a single varint byte.
        let mut multihash = Vec::with_capacity(digest.len() + 2);
        multihash.push(SHA2_256_CODE);
        multihash.push(digest.len() as u8);
        multihash.extend_from_slice(&digest);
        multihash
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn multihash_prefixes_the_digest() {
        let multihash = Multihash.compute(b"abc");

        assert_eq!(multihash.len(), 34);
        assert_eq!(&multihash[..2], &[0x12, 0x20]);
        assert_eq!(&multihash[2..], Sha256.digest(b"abc").as_slice());
    }
}
