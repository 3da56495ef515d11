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

use std::{fmt, sync::Arc};

use bherror::traits::{ForeignError, PropagateError};
use rand::{rngs::OsRng, RngCore};
use uuid::Uuid;
use zeroize::Zeroizing;

use crate::{
    error::{CryptoError, Result, SecretStoreError},
    secret_store::{normalize_access_group, SecretBytes, SecretStore},
};

/// Opaque handle to secret key material.
///
/// The raw bytes are never handed out by value. They are lent to a visitor for
/// the duration of one call and wiped afterwards.
pub trait Secret: Send + Sync {
    /// Identifier of the secret.
    fn id(&self) -> Uuid;

    /// Access group the secret lives in, `None` for the default one.
    fn access_group(&self) -> Option<&str>;

    /// Lends the raw bytes to `visitor`.
    ///
    /// Any copy made for the visit is wiped before this method returns.
    fn unprotected_bytes(&self, visitor: &mut dyn FnMut(&[u8])) -> Result<(), SecretStoreError>;
}

/// Convenience methods available on every [`Secret`].
pub trait SecretExt {
    /// Runs `f` over the raw bytes of the secret and returns its result.
    ///
    /// Failing to read the secret results in [`CryptoError::SecretAccess`].
    fn with_unprotected_bytes<T, F>(&self, f: F) -> Result<T, CryptoError>
    where
        F: FnOnce(&[u8]) -> Result<T, CryptoError>;
}

impl<S: Secret + ?Sized> SecretExt for S {
    fn with_unprotected_bytes<T, F>(&self, f: F) -> Result<T, CryptoError>
    where
        F: FnOnce(&[u8]) -> Result<T, CryptoError>,
    {
        let mut f = Some(f);
        let mut outcome = None;

        self.unprotected_bytes(&mut |bytes| {
            if let Some(f) = f.take() {
                outcome = Some(f(bytes));
            }
        })
        .with_err(|| CryptoError::SecretAccess)?;

        outcome.unwrap_or_else(|| Err(bherror::Error::root(CryptoError::SecretAccess)))
    }
}

/// Secret persisted in a [`SecretStore`].
///
/// The bytes are read from the store on every access.
#[derive(Clone)]
pub struct StoredSecret {
    id: Uuid,
    item_type_code: String,
    access_group: Option<String>,
    store: Arc<dyn SecretStore>,
}

impl StoredSecret {
    /// Creates a handle to an item of the `store`, without touching the store.
    pub fn new(
        id: Uuid,
        item_type_code: impl Into<String>,
        access_group: Option<&str>,
        store: Arc<dyn SecretStore>,
    ) -> Self {
        Self {
            id,
            item_type_code: item_type_code.into(),
            access_group: normalize_access_group(access_group).map(str::to_owned),
            store,
        }
    }

    /// Type code the item is saved under.
    pub fn item_type_code(&self) -> &str {
        &self.item_type_code
    }

    /// Checks that the secret can be read from the store.
    ///
    /// The bytes are wiped right after reading. Fails with
    /// [`SecretStoreError::ItemNotFound`] if the item is missing.
    pub fn is_valid_key(&self) -> Result<(), SecretStoreError> {
        self.load().map(drop)
    }

    pub(crate) fn load(&self) -> Result<SecretBytes, SecretStoreError> {
        self.store
            .get_secret(&self.id, &self.item_type_code, self.access_group())
    }

    pub(crate) fn store(&self) -> &Arc<dyn SecretStore> {
        &self.store
    }
}

impl fmt::Debug for StoredSecret {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("StoredSecret")
            .field("id", &self.id)
            .field("item_type_code", &self.item_type_code)
            .field("access_group", &self.access_group)
            .finish_non_exhaustive()
    }
}

impl PartialEq for StoredSecret {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
            && self.item_type_code == other.item_type_code
            && self.access_group == other.access_group
    }
}

impl Secret for StoredSecret {
    fn id(&self) -> Uuid {
        self.id
    }

    fn access_group(&self) -> Option<&str> {
        self.access_group.as_deref()
    }

    fn unprotected_bytes(&self, visitor: &mut dyn FnMut(&[u8])) -> Result<(), SecretStoreError> {
        let bytes = self.load()?;
        visitor(&bytes);
        Ok(())
    }
}

/// Secret living only in process memory, wiped when dropped.
pub struct EphemeralSecret {
    id: Uuid,
    value: SecretBytes,
}

impl EphemeralSecret {
    /// Creates a secret of `size` zero bytes.
    pub fn new(size: usize) -> Self {
        Self::from_bytes(vec![0; size])
    }

    /// Creates a secret of `size` cryptographically random bytes.
    pub fn generate(size: usize) -> Result<Self, CryptoError> {
        let mut value = Zeroizing::new(vec![0; size]);
        OsRng
            .try_fill_bytes(&mut value)
            .foreign_err(|| CryptoError::KeyGenerationFailed)?;

        Ok(Self {
            id: Uuid::new_v4(),
            value,
        })
    }

    /// Takes ownership of `bytes` as the secret value.
    pub fn from_bytes(bytes: Vec<u8>) -> Self {
        Self {
            id: Uuid::new_v4(),
            value: Zeroizing::new(bytes),
        }
    }

    /// Length of the secret in bytes.
    pub fn len(&self) -> usize {
        self.value.len()
    }

    /// Whether the secret holds no bytes.
    pub fn is_empty(&self) -> bool {
        self.value.is_empty()
    }
}

impl fmt::Debug for EphemeralSecret {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EphemeralSecret")
            .field("id", &self.id)
            .field("len", &self.value.len())
            .finish_non_exhaustive()
    }
}

impl Secret for EphemeralSecret {
    fn id(&self) -> Uuid {
        self.id
    }

    fn access_group(&self) -> Option<&str> {
        None
    }

    fn unprotected_bytes(&self, visitor: &mut dyn FnMut(&[u8])) -> Result<(), SecretStoreError> {
        visitor(&self.value);
        Ok(())
    }
}
