/* This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, You can obtain one at https://mozilla.org/MPL/2.0/. */

//! Fire-and-forget reporting of failures, breadcrumbs and usage events.
//!
//! Callers hold an [`ExceptionSink`] and never look at a result: sinks do not
//! fail and do not panic. [`LogSink`] writes through the `log` facade;
//! [`ChannelSink`] forwards [`DiagnosticEvent`]s to whoever owns the receiving
//! end of a crossbeam channel. A process-wide sender can be installed once
//! with [`install_global_sender`], after which [`emit_event`] and
//! [`GlobalSink`] route there.

use std::sync::OnceLock;

use crossbeam_channel::{Receiver, Sender, unbounded};
use serde_json::{Map, Value, json};

static GLOBAL_DIAGNOSTICS_TX: OnceLock<Sender<DiagnosticEvent>> = OnceLock::new();
static SESSION_ID: OnceLock<String> = OnceLock::new();

/// Random per-process id attached to every logged event.
pub fn session_id() -> &'static str {
    SESSION_ID.get_or_init(|| uuid::Uuid::new_v4().simple().to_string())
}

#[derive(Debug, Clone, PartialEq)]
pub enum DiagnosticEvent {
    Exception {
        error: String,
        context: String,
    },
    Message {
        message: String,
        extra: Map<String, Value>,
    },
    Breadcrumb {
        message: String,
        data: Map<String, Value>,
    },
    Event {
        payload: Value,
    },
}

pub trait ExceptionSink: Send + Sync {
    fn capture_exception(&self, error: &dyn std::error::Error, context: &str);

    fn capture_message(&self, message: &str, extra: Map<String, Value>);

    fn capture_breadcrumb(&self, message: &str, data: Map<String, Value>);

    fn log_event(&self, name: &str, extra: Map<String, Value>);
}

/// `{event, data: {...extra, beacon, session}}`, as sent to the usage log.
pub fn event_payload(name: &str, mut extra: Map<String, Value>) -> Value {
    extra.insert("beacon".to_string(), Value::Bool(true));
    extra.insert("session".to_string(), Value::from(session_id()));
    json!({
        "event": name,
        "data": Value::Object(extra),
    })
}

fn error_chain(error: &dyn std::error::Error) -> String {
    let mut rendered = error.to_string();
    let mut source = error.source();
    while let Some(cause) = source {
        rendered.push_str(": ");
        rendered.push_str(&cause.to_string());
        source = cause.source();
    }
    rendered
}

#[derive(Debug, Clone, Copy, Default)]
pub struct LogSink;

impl ExceptionSink for LogSink {
    fn capture_exception(&self, error: &dyn std::error::Error, context: &str) {
        log::error!("{context}: {}", error_chain(error));
    }

    fn capture_message(&self, message: &str, extra: Map<String, Value>) {
        log::warn!("{message} {}", Value::Object(extra));
    }

    fn capture_breadcrumb(&self, message: &str, data: Map<String, Value>) {
        log::debug!("{message} {}", Value::Object(data));
    }

    fn log_event(&self, name: &str, extra: Map<String, Value>) {
        log::info!("{}", event_payload(name, extra));
    }
}

#[derive(Debug, Clone)]
pub struct ChannelSink {
    tx: Sender<DiagnosticEvent>,
}

impl ChannelSink {
    pub fn new(tx: Sender<DiagnosticEvent>) -> Self {
        Self { tx }
    }

    /// Sink plus the receiver its events arrive on.
    pub fn unbounded() -> (Self, Receiver<DiagnosticEvent>) {
        let (tx, rx) = unbounded();
        (Self::new(tx), rx)
    }
}

impl ExceptionSink for ChannelSink {
    fn capture_exception(&self, error: &dyn std::error::Error, context: &str) {
        let _ = self.tx.send(DiagnosticEvent::Exception {
            error: error_chain(error),
            context: context.to_string(),
        });
    }

    fn capture_message(&self, message: &str, extra: Map<String, Value>) {
        let _ = self.tx.send(DiagnosticEvent::Message {
            message: message.to_string(),
            extra,
        });
    }

    fn capture_breadcrumb(&self, message: &str, data: Map<String, Value>) {
        let _ = self.tx.send(DiagnosticEvent::Breadcrumb {
            message: message.to_string(),
            data,
        });
    }

    fn log_event(&self, name: &str, extra: Map<String, Value>) {
        let _ = self.tx.send(DiagnosticEvent::Event {
            payload: event_payload(name, extra),
        });
    }
}

/// Returns `false` when a sender was already installed.
pub fn install_global_sender(sender: Sender<DiagnosticEvent>) -> bool {
    GLOBAL_DIAGNOSTICS_TX.set(sender).is_ok()
}

/// Send to the installed global channel, or log when there is none.
pub fn emit_event(event: DiagnosticEvent) {
    if let Some(tx) = GLOBAL_DIAGNOSTICS_TX.get()
        && tx.send(event.clone()).is_ok()
    {
        return;
    }
    match event {
        DiagnosticEvent::Exception { error, context } => log::error!("{context}: {error}"),
        DiagnosticEvent::Message { message, extra } => {
            log::warn!("{message} {}", Value::Object(extra))
        }
        DiagnosticEvent::Breadcrumb { message, data } => {
            log::debug!("{message} {}", Value::Object(data))
        }
        DiagnosticEvent::Event { payload } => log::info!("{payload}"),
    }
}

/// Sink backed by [`emit_event`].
#[derive(Debug, Clone, Copy, Default)]
pub struct GlobalSink;

impl ExceptionSink for GlobalSink {
    fn capture_exception(&self, error: &dyn std::error::Error, context: &str) {
        emit_event(DiagnosticEvent::Exception {
            error: error_chain(error),
            context: context.to_string(),
        });
    }

    fn capture_message(&self, message: &str, extra: Map<String, Value>) {
        emit_event(DiagnosticEvent::Message {
            message: message.to_string(),
            extra,
        });
    }

    fn capture_breadcrumb(&self, message: &str, data: Map<String, Value>) {
        emit_event(DiagnosticEvent::Breadcrumb {
            message: message.to_string(),
            data,
        });
    }

    fn log_event(&self, name: &str, extra: Map<String, Value>) {
        emit_event(DiagnosticEvent::Event {
            payload: event_payload(name, extra),
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug)]
    struct Outer(std::io::Error);

    impl std::fmt::Display for Outer {
        fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
            f.write_str("lookup failed")
        }
    }

    impl std::error::Error for Outer {
        fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
            Some(&self.0)
        }
    }

    #[test]
    fn channel_sink_forwards_exception_with_its_cause_chain() {
        let (sink, rx) = ChannelSink::unbounded();
        let error = Outer(std::io::Error::other("connection reset"));

        sink.capture_exception(&error, "failed to get elevation");

        assert_eq!(
            rx.try_recv().expect("one event"),
            DiagnosticEvent::Exception {
                error: "lookup failed: connection reset".to_string(),
                context: "failed to get elevation".to_string(),
            }
        );
        assert!(rx.try_recv().is_err());
    }

    #[test]
    fn event_payload_carries_beacon_and_session() {
        let mut extra = Map::new();
        extra.insert("target".to_string(), Value::from("JOSM"));

        let payload = event_payload("external_link", extra);

        assert_eq!(payload["event"], "external_link");
        assert_eq!(payload["data"]["target"], "JOSM");
        assert_eq!(payload["data"]["beacon"], true);
        assert_eq!(payload["data"]["session"], session_id());
        assert_eq!(session_id().len(), 32);
    }

    #[test]
    fn sinks_ignore_a_closed_receiver() {
        let (sink, rx) = ChannelSink::unbounded();
        drop(rx);

        sink.capture_breadcrumb("layer toggled", Map::new());
        sink.log_event("noop", Map::new());
        LogSink.capture_message("still fine", Map::new());
    }
}
