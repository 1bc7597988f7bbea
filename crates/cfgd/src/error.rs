use cfgd_container::ListenerError;
use std::borrow::Cow;

#[cfgd_derive::cfgd_error]
pub enum BootstrapError {
    #[error("Bootstrap validation error{}: {message}", format_context(.context))]
    Validation { message: Cow<'static, str>, context: Option<Cow<'static, str>> },

    #[error("Bootstrap listener error{}: {source}", format_context(.context))]
    Listener { source: ListenerError, context: Option<Cow<'static, str>> },
}
