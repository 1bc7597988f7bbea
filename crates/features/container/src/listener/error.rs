use cfgd_event_bus::EventBusError;
use std::borrow::Cow;

/// Failure inside a listener. Logged by the broadcaster, never returned to a client.
#[cfgd_derive::cfgd_error]
pub enum ListenerError {
    #[error("Listener I/O error{}: {source}", format_context(.context))]
    Io { source: std::io::Error, context: Option<Cow<'static, str>> },

    #[error("Listener serialization error{}: {source}", format_context(.context))]
    Serialize { source: serde_json::Error, context: Option<Cow<'static, str>> },

    #[error("Listener event bus error{}: {source}", format_context(.context))]
    Bus { source: EventBusError, context: Option<Cow<'static, str>> },

    #[error("Listener error{}: {message}", format_context(.context))]
    Internal { message: Cow<'static, str>, context: Option<Cow<'static, str>> },
}
