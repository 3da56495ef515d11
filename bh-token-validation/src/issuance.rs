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

use std::sync::Arc;

use bh_crypto::Logger;
use bh_jose::{JwsToken, TokenVerifying};

use crate::{error::Result, verify_with_document_keys, IdentifierDocumentPublicKey};

/// Validates signed credential issuance requests.
///
/// Only the signature is checked; the claims of an issuance request are
/// opaque to the validator.
pub struct IssuanceRequestValidator {
    verifier: Arc<dyn TokenVerifying>,
    logger: Arc<Logger>,
}

impl IssuanceRequestValidator {
    /// Creates a validator checking signatures with `verifier`.
    pub fn new(verifier: Arc<dyn TokenVerifying>, logger: Arc<Logger>) -> Self {
        Self { verifier, logger }
    }

    /// Verifies `request` against the keys of the DID document of its
    /// signer.
    pub fn validate<T>(
        &self,
        request: &JwsToken<T>,
        keys: &[IdentifierDocumentPublicKey],
    ) -> Result<()> {
        verify_with_document_keys(request, keys, self.verifier.as_ref(), &self.logger)
    }
}
