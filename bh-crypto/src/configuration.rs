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

use crate::{
    algorithm::{CryptoOperations, SigningAlgorithm},
    key_management::KeyManagement,
    logging::{LogConsumer, Logger, TracingLogConsumer},
    secret_store::{normalize_access_group, SecretStore},
};

/// Process-wide wallet settings, immutable once built.
///
/// Use [`WalletConfigurationBuilder`] to construct one.
pub struct WalletConfiguration {
    access_group: Option<String>,
    store: Arc<dyn SecretStore>,
    logger: Arc<Logger>,
    crypto_operations: Arc<CryptoOperations>,
}

impl WalletConfiguration {
    /// Starts building a configuration backed by `store`.
    pub fn builder(store: Arc<dyn SecretStore>) -> WalletConfigurationBuilder {
        WalletConfigurationBuilder::new(store)
    }

    /// Access group new keys are placed into.
    pub fn access_group(&self) -> Option<&str> {
        self.access_group.as_deref()
    }

    /// Shared logger.
    pub fn logger(&self) -> &Arc<Logger> {
        &self.logger
    }

    /// Shared algorithm registry.
    pub fn crypto_operations(&self) -> &Arc<CryptoOperations> {
        &self.crypto_operations
    }

    /// Creates a [`KeyManagement`] over the configured store and access group.
    pub fn key_management(&self) -> KeyManagement {
        KeyManagement::new(
            self.store.clone(),
            self.access_group(),
            self.logger.clone(),
        )
    }
}

/// A builder for constructing a [`WalletConfiguration`].
///
/// Without any added consumer, the logger forwards to `tracing` through
/// [`TracingLogConsumer`].
pub struct WalletConfigurationBuilder {
    access_group: Option<String>,
    store: Arc<dyn SecretStore>,
    log_consumers: Vec<Arc<dyn LogConsumer>>,
    signing_algorithms: Vec<SigningAlgorithm>,
}

impl WalletConfigurationBuilder {
    /// Create a new builder over `store`.
    pub fn new(store: Arc<dyn SecretStore>) -> Self {
        Self {
            access_group: None,
            store,
            log_consumers: Vec::new(),
            signing_algorithms: Vec::new(),
        }
    }

    /// Set the access group. An empty string means no group.
    pub fn access_group(mut self, access_group: impl Into<String>) -> Self {
        let access_group = access_group.into();
        self.access_group = normalize_access_group(Some(&access_group)).map(str::to_owned);
        self
    }

    /// Add a consumer to the logger.
    pub fn log_consumer(mut self, consumer: Arc<dyn LogConsumer>) -> Self {
        self.log_consumers.push(consumer);
        self
    }

    /// Add an algorithm to the registry.
    ///
    /// Built-in algorithms cannot be replaced.
    pub fn signing_algorithm(mut self, algorithm: SigningAlgorithm) -> Self {
        self.signing_algorithms.push(algorithm);
        self
    }

    /// Finalize the configuration.
    pub fn build(self) -> WalletConfiguration {
        let logger = if self.log_consumers.is_empty() {
            let consumer: Arc<dyn LogConsumer> = Arc::new(TracingLogConsumer);
            Logger::new(vec![consumer])
        } else {
            Logger::new(self.log_consumers)
        };
        let logger = Arc::new(logger);

        let crypto_operations = Arc::new(CryptoOperations::new(
            self.signing_algorithms,
            logger.clone(),
        ));

        WalletConfiguration {
            access_group: self.access_group,
            store: self.store,
            logger,
            crypto_operations,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        logging::{tests::RecordingConsumer, TraceLevel},
        public_key,
        secret::Secret,
        secret_store::InMemorySecretStore,
    };

    #[test]
    fn builds_key_management_in_access_group() {
        let configuration = WalletConfiguration::builder(Arc::new(InMemorySecretStore::new()))
            .access_group("com.example.wallet")
            .build();

        let key = configuration.key_management().generate_key().unwrap();

        assert_eq!(configuration.access_group(), Some("com.example.wallet"));
        assert_eq!(key.access_group(), Some("com.example.wallet"));
    }

    #[test]
    fn empty_access_group_means_none() {
        let configuration = WalletConfiguration::builder(Arc::new(InMemorySecretStore::new()))
            .access_group("")
            .build();

        assert_eq!(configuration.access_group(), None);
    }

    #[test]
    fn registry_contains_builtin_algorithms() {
        let configuration =
            WalletConfiguration::builder(Arc::new(InMemorySecretStore::new())).build();

        let ops = configuration.crypto_operations();
        for curve in [public_key::SECP256K1, public_key::P256, public_key::ED25519] {
            ops.algorithm(curve).unwrap();
        }
    }

    #[test]
    fn overriding_builtin_is_logged() {
        let consumer = Arc::new(RecordingConsumer::default());
        WalletConfiguration::builder(Arc::new(InMemorySecretStore::new()))
            .log_consumer(consumer.clone())
            .signing_algorithm(SigningAlgorithm::new(public_key::ED25519))
            .build();

        let messages = consumer.messages.lock().unwrap();
        assert_eq!(messages.len(), 1);
        assert_eq!(messages[0].0, TraceLevel::Warning);
    }
}
