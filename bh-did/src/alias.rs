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

use base64::{engine::general_purpose::STANDARD, Engine as _};
use bh_crypto::{Hasher as _, Sha256};

/// Number of characters of an alias.
pub const ALIAS_LEN: usize = 10;

/// Computes the alias of the identifier created for subject `id` at
/// `relying_party`.
///
/// The alias is the first [`ALIAS_LEN`] alphanumeric characters of the
/// standard `base64` encoding of `SHA-256(id || relying_party)`.
pub fn compute_alias(id: &str, relying_party: &str) -> String {
    let digest = Sha256.digest(format!("{id}{relying_party}").as_bytes());

    STANDARD
        .encode(digest)
        .chars()
        .filter(char::is_ascii_alphanumeric)
        .take(ALIAS_LEN)
        .collect()
}
