use std::borrow::Cow;

/// Request-scoped dispatch failures. None of them is fatal to the process.
#[cfgd_derive::cfgd_error]
pub enum DispatchError {
    #[error("Unknown command{}: {message}", format_context(.context))]
    UnknownCommand { message: Cow<'static, str>, context: Option<Cow<'static, str>> },

    /// `id` is `None` when the request named no configuration.
    #[error("Configuration not found{}: {}", format_context(.context), describe_id(.id))]
    ConfigNotFound { id: Option<String>, context: Option<Cow<'static, str>> },

    #[error("Invalid command{}: {message}", format_context(.context))]
    InvalidCommand { message: Cow<'static, str>, context: Option<Cow<'static, str>> },
}

#[allow(clippy::ref_option)]
fn describe_id(id: &Option<String>) -> Cow<'_, str> {
    match id {
        Some(id) => Cow::Owned(format!("'{id}'")),
        None => Cow::Borrowed("no identifier given"),
    }
}
