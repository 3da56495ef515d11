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

use bh_crypto::{CryptoOperations, KeyManagement, Logger, WalletConfiguration};
use bh_jose::{EcPublicJwk, Secp256k1Signer};
use bherror::traits::{ErrorContext as _, PropagateError as _};

use crate::{
    compute_alias,
    error::{IdentifierError, Result},
    Identifier, IdentifierFormatter, KeyContainer,
};

/// Key id prefix of the signing key.
pub const SIGNING_KEY_ID_PREFIX: &str = "sign_";
/// Key id prefix of the update key.
pub const UPDATE_KEY_ID_PREFIX: &str = "update_";
/// Key id prefix of the recovery key.
pub const RECOVERY_KEY_ID_PREFIX: &str = "recover_";

/// Creates identifiers backed by freshly generated `secp256k1` keys.
pub struct IdentifierCreator {
    key_management: KeyManagement,
    signer: Secp256k1Signer,
    formatter: IdentifierFormatter,
    logger: Arc<Logger>,
}

impl IdentifierCreator {
    /// Creates an identifier creator from its collaborators.
    pub fn new(
        key_management: KeyManagement,
        crypto_operations: Arc<CryptoOperations>,
        logger: Arc<Logger>,
    ) -> Self {
        Self {
            key_management,
            signer: Secp256k1Signer::new(crypto_operations),
            formatter: IdentifierFormatter::new(),
            logger,
        }
    }

    /// Creates an identifier creator wired to `configuration`.
    pub fn from_configuration(configuration: &WalletConfiguration) -> Self {
        Self::new(
            configuration.key_management(),
            configuration.crypto_operations().clone(),
            configuration.logger().clone(),
        )
    }

    /// Creates the identifier of subject `id` at `relying_party`.
    ///
    /// Generates independent signing, update and recovery keys, labelled
    /// with their role prefix followed by the alias of the pair.
    pub fn create(&self, id: &str, relying_party: &str) -> Result<Identifier> {
        let alias = compute_alias(id, relying_party);

        let signing_key = self.generate_key(SIGNING_KEY_ID_PREFIX, &alias)?;
        let update_key = self.generate_key(UPDATE_KEY_ID_PREFIX, &alias)?;
        let recovery_key = self.generate_key(RECOVERY_KEY_ID_PREFIX, &alias)?;

        let long_form_did = self.formatter.create_ion_long_form_did(
            &self.public_jwk(&recovery_key)?,
            &self.public_jwk(&update_key)?,
            &[self.public_jwk(&signing_key)?],
            &[],
        )?;

        self.logger
            .info(format!("created identifier with alias {alias}"));

        Ok(Identifier::new(
            long_form_did,
            vec![signing_key],
            update_key,
            recovery_key,
            alias,
        ))
    }

    /// Derives the public JWK published for `key`.
    pub fn public_jwk(&self, key: &KeyContainer) -> Result<EcPublicJwk> {
        self.signer
            .public_jwk(key.key_reference(), key.key_id())
            .with_err(|| IdentifierError::PublicKeyDerivation(key.key_id().to_owned()))
    }

    fn generate_key(&self, prefix: &str, alias: &str) -> Result<KeyContainer> {
        let secret = self
            .key_management
            .generate_key()
            .with_err(|| IdentifierError::KeyManagement)
            .ctx(|| format!("generating the {prefix} key"))?;

        Ok(KeyContainer::new(secret, format!("{prefix}{alias}")))
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashSet;

    use bh_crypto::{InMemorySecretStore, SecretStore, StoredSecret};

    use super::*;
    use crate::ION_PREFIX;

    fn configuration(store: Arc<dyn SecretStore>, access_group: &str) -> WalletConfiguration {
        WalletConfiguration::builder(store)
            .access_group(access_group)
            .build()
    }

    #[test]
    fn creates_three_independent_keys() {
        let store: Arc<dyn SecretStore> = Arc::new(InMemorySecretStore::new());
        let creator = IdentifierCreator::from_configuration(&configuration(store, "group"));

        let identifier = creator.create("master", "https://rp.example.com").unwrap();
        let alias = compute_alias("master", "https://rp.example.com");

        assert_eq!(identifier.alias(), alias);
        assert!(identifier.long_form_did().starts_with(ION_PREFIX));
        assert_eq!(identifier.did_document_keys().len(), 1);

        let signing_key = identifier.signing_key().unwrap();
        assert_eq!(signing_key.key_id(), format!("sign_{alias}"));
        assert_eq!(identifier.update_key().key_id(), format!("update_{alias}"));
        assert_eq!(identifier.recovery_key().key_id(), format!("recover_{alias}"));

        let ids: HashSet<_> = [
            signing_key.id(),
            identifier.update_key().id(),
            identifier.recovery_key().id(),
        ]
        .into_iter()
        .collect();
        assert_eq!(ids.len(), 3);

        identifier.validate_keys().unwrap();
    }

    #[test]
    fn did_is_reproducible_from_the_keys() {
        let store: Arc<dyn SecretStore> = Arc::new(InMemorySecretStore::new());
        let creator = IdentifierCreator::from_configuration(&configuration(store, ""));
        let identifier = creator.create("master", "rp").unwrap();

        let did = IdentifierFormatter::new()
            .create_ion_long_form_did(
                &creator.public_jwk(identifier.recovery_key()).unwrap(),
                &creator.public_jwk(identifier.update_key()).unwrap(),
                &[creator.public_jwk(identifier.signing_key().unwrap()).unwrap()],
                &[],
            )
            .unwrap();

        assert_eq!(did, identifier.long_form_did());
    }

    #[test]
    fn identifiers_for_different_parties_differ() {
        let store: Arc<dyn SecretStore> = Arc::new(InMemorySecretStore::new());
        let creator = IdentifierCreator::from_configuration(&configuration(store, ""));

        let first = creator.create("master", "rp-1").unwrap();
        let second = creator.create("master", "rp-2").unwrap();

        assert_ne!(first.alias(), second.alias());
        assert_ne!(first.long_form_did(), second.long_form_did());
    }

    #[test]
    fn deleted_key_fails_validation() {
        let store: Arc<dyn SecretStore> = Arc::new(InMemorySecretStore::new());
        let configuration = configuration(store, "");
        let identifier = IdentifierCreator::from_configuration(&configuration)
            .create("master", "rp")
            .unwrap();

        configuration
            .key_management()
            .delete_key(&identifier.update_key().id())
            .unwrap();

        let err = identifier.validate_keys().unwrap_err();
        assert_eq!(err.error, IdentifierError::KeyManagement);
    }

    #[test]
    fn keys_migrate_between_access_groups() {
        let store: Arc<dyn SecretStore> = Arc::new(InMemorySecretStore::new());
        let old = configuration(store.clone(), "old.group");
        let new = configuration(store.clone(), "new.group");

        let mut identifier = IdentifierCreator::from_configuration(&old)
            .create("master", "rp")
            .unwrap();
        let before = identifier.clone();

        identifier
            .migrate_keys(&new.key_management(), Some("old.group"))
            .unwrap();

        identifier.validate_keys().unwrap();
        assert_eq!(identifier.long_form_did(), before.long_form_did());
        assert_eq!(
            identifier.recovery_key().key_reference(),
            &StoredSecret::new(
                before.recovery_key().id(),
                before.recovery_key().key_reference().item_type_code(),
                Some("new.group"),
                store,
            )
        );
        assert!(before.validate_keys().is_err());
    }
}
