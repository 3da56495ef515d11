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

use std::{collections::HashMap, panic::Location, sync::Arc};

/// Severity of a log message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, strum_macros::Display)]
pub enum TraceLevel {
    /// Very detailed diagnostic output.
    #[strum(to_string = "VERBOSE")]
    Verbose,
    /// Diagnostic output.
    #[strum(to_string = "DEBUG")]
    Debug,
    /// Regular operation.
    #[strum(to_string = "INFO")]
    Info,
    /// Unexpected but recoverable condition.
    #[strum(to_string = "WARN")]
    Warning,
    /// Failed operation.
    #[strum(to_string = "ERROR")]
    Error,
    /// Failure the wallet cannot recover from.
    #[strum(to_string = "FAILURE")]
    Failure,
}

/// A sink receiving the messages and events of a [`Logger`].
pub trait LogConsumer: Send + Sync {
    /// Receives a message logged at `location`.
    fn log(&self, level: TraceLevel, message: &str, location: &Location<'_>);

    /// Receives a named event with its properties.
    fn event(&self, name: &str, properties: &HashMap<String, String>);
}

/// [`LogConsumer`] forwarding everything to `tracing`.
///
/// [`TraceLevel::Verbose`] maps to `TRACE`, [`TraceLevel::Failure`] to
/// `ERROR`.
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingLogConsumer;

impl LogConsumer for TracingLogConsumer {
    fn log(&self, level: TraceLevel, message: &str, location: &Location<'_>) {
        let (file, line) = (location.file(), location.line());
        match level {
            TraceLevel::Verbose => tracing::trace!(file, line, "{message}"),
            TraceLevel::Debug => tracing::debug!(file, line, "{message}"),
            TraceLevel::Info => tracing::info!(file, line, "{message}"),
            TraceLevel::Warning => tracing::warn!(file, line, "{message}"),
            TraceLevel::Error => tracing::error!(file, line, "{message}"),
            TraceLevel::Failure => tracing::error!(file, line, failure = true, "{message}"),
        }
    }

    fn event(&self, name: &str, properties: &HashMap<String, String>) {
        tracing::info!(event = name, ?properties, "event");
    }
}

/// Fans log messages and events out to a fixed list of consumers.
#[derive(Clone)]
pub struct Logger {
    consumers: Vec<Arc<dyn LogConsumer>>,
}

impl Logger {
    /// Creates a logger over the given consumers.
    pub fn new(consumers: Vec<Arc<dyn LogConsumer>>) -> Self {
        Self { consumers }
    }

    /// Creates a logger without any consumer.
    pub fn silent() -> Self {
        Self::new(Vec::new())
    }

    /// Logs `message` at `level`, attributed to the caller.
    #[track_caller]
    pub fn log(&self, level: TraceLevel, message: impl AsRef<str>) {
        let location = Location::caller();
        for consumer in &self.consumers {
            consumer.log(level, message.as_ref(), location);
        }
    }

    /// Logs at [`TraceLevel::Verbose`].
    #[track_caller]
    pub fn verbose(&self, message: impl AsRef<str>) {
        self.log(TraceLevel::Verbose, message);
    }

    /// Logs at [`TraceLevel::Debug`].
    #[track_caller]
    pub fn debug(&self, message: impl AsRef<str>) {
        self.log(TraceLevel::Debug, message);
    }

    /// Logs at [`TraceLevel::Info`].
    #[track_caller]
    pub fn info(&self, message: impl AsRef<str>) {
        self.log(TraceLevel::Info, message);
    }

    /// Logs at [`TraceLevel::Warning`].
    #[track_caller]
    pub fn warning(&self, message: impl AsRef<str>) {
        self.log(TraceLevel::Warning, message);
    }

    /// Logs at [`TraceLevel::Error`].
    #[track_caller]
    pub fn error(&self, message: impl AsRef<str>) {
        self.log(TraceLevel::Error, message);
    }

    /// Logs at [`TraceLevel::Failure`].
    #[track_caller]
    pub fn failure(&self, message: impl AsRef<str>) {
        self.log(TraceLevel::Failure, message);
    }

    /// Sends a named event to every consumer.
    pub fn event(&self, name: &str, properties: &HashMap<String, String>) {
        for consumer in &self.consumers {
            consumer.event(name, properties);
        }
    }
}

impl Default for Logger {
    fn default() -> Self {
        let consumer: Arc<dyn LogConsumer> = Arc::new(TracingLogConsumer);
        Self::new(vec![consumer])
    }
}

impl std::fmt::Debug for Logger {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Logger")
            .field("consumers", &self.consumers.len())
            .finish()
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use std::sync::Mutex;

    use super::*;

    /// Consumer recording everything it receives.
    #[derive(Default)]
    pub(crate) struct RecordingConsumer {
        pub(crate) messages: Mutex<Vec<(TraceLevel, String, u32)>>,
        pub(crate) events: Mutex<Vec<(String, HashMap<String, String>)>>,
    }

    impl LogConsumer for RecordingConsumer {
        fn log(&self, level: TraceLevel, message: &str, location: &Location<'_>) {
            self.messages
                .lock()
                .unwrap()
                .push((level, message.to_owned(), location.line()));
        }

        fn event(&self, name: &str, properties: &HashMap<String, String>) {
            self.events
                .lock()
                .unwrap()
                .push((name.to_owned(), properties.clone()));
        }
    }

    #[test]
    fn messages_reach_every_consumer() {
        let first = Arc::new(RecordingConsumer::default());
        let second = Arc::new(RecordingConsumer::default());
        let logger = Logger::new(vec![
            first.clone() as Arc<dyn LogConsumer>,
            second.clone(),
        ]);

        logger.info("hello");
        logger.failure(format!("{} failed", "operation"));

        for consumer in [first, second] {
            let messages = consumer.messages.lock().unwrap();
            assert_eq!(messages.len(), 2);
            assert_eq!(messages[0].0, TraceLevel::Info);
            assert_eq!(messages[0].1, "hello");
            assert_eq!(messages[1].0, TraceLevel::Failure);
            assert_eq!(messages[1].1, "operation failed");
        }
    }

    #[test]
    fn location_is_the_caller() {
        let consumer = Arc::new(RecordingConsumer::default());
        let logger = Logger::new(vec![consumer.clone() as Arc<dyn LogConsumer>]);

        let line = line!() + 1;
        logger.warning("here");

        assert_eq!(consumer.messages.lock().unwrap()[0].2, line);
    }

    #[test]
    fn events_carry_properties() {
        let consumer = Arc::new(RecordingConsumer::default());
        let logger = Logger::new(vec![consumer.clone() as Arc<dyn LogConsumer>]);
        let properties = HashMap::from([("did".to_owned(), "did:ion:abc".to_owned())]);

        logger.event("identifierCreated", &properties);

        let events = consumer.events.lock().unwrap();
        assert_eq!(events.as_slice(), &[("identifierCreated".to_owned(), properties)]);
    }

    #[test]
    fn silent_logger_accepts_messages() {
        Logger::silent().error("nobody listens");
    }
}
