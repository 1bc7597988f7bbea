#![allow(unreachable_pub)]
#![allow(clippy::needless_pass_by_value)]

//! # Macros
//!
//! Procedural macros shared by the `cfgd` workspace.
//!
//! * [`macro@cfgd_error`] turns a plain enum into a context-aware error type.
//! * [`macro@main`] bootstraps the tuned Tokio runtime from `cfgd-runtime`.
//! * [`macro@api_model`] and [`macro@api_handler`] keep HTTP DTOs and handlers
//!   consistent with the `OpenAPI` documentation.
//!
//! The examples are `ignore`d here because a proc-macro crate cannot use its own macros;
//! consuming crates carry the compiled versions in their tests.

mod macros;

use proc_macro::TokenStream;
use syn::{DeriveInput, ItemFn, ItemStruct, parse_macro_input};

/// Attribute macro to bootstrap the `cfgd-runtime` Tokio runtime.
///
/// Turns an `async fn main` returning a `Result` into a synchronous `main` that
/// builds the runtime for the selected profile and blocks on the body.
///
/// # Arguments
///
/// * `high_performance` - server profile (larger stacks, long keep-alive).
/// * `memory_efficient` - reduced worker count and stacks.
/// * `default` or nothing - auto-detected worker threads.
///
/// # Examples
///
/// ```rust,ignore
/// #[cfgd_runtime::main(high_performance)]
/// async fn main() -> anyhow::Result<()> {
///     Ok(())
/// }
/// ```
#[proc_macro_attribute]
pub fn main(args: TokenStream, item: TokenStream) -> TokenStream {
    let input = parse_macro_input!(item as ItemFn);
    macros::runtime::expand_main(args.into(), input).into()
}

/// Attribute macro for HTTP data transfer objects.
///
/// Adds `Debug`, `Serialize` and `Deserialize` when they are not derived already,
/// `utoipa::ToSchema` behind the `server` feature, and `#[serde(rename_all = "camelCase")]`
/// unless another policy is given.
///
/// # Arguments
///
/// * `rename_all = "snake_case"` - overrides the serde rename policy.
///
/// # Example
///
/// ```rust,ignore
/// #[cfgd_derive::api_model]
/// pub struct HealthResponse {
///     pub status: String,
/// }
/// ```
#[proc_macro_attribute]
pub fn api_model(attr: TokenStream, item: TokenStream) -> TokenStream {
    let input = parse_macro_input!(item as ItemStruct);
    macros::api::expand_api_model(attr.into(), input).into()
}

/// Attribute macro pairing an axum handler with its `utoipa::path` documentation.
///
/// The arguments are forwarded verbatim to `utoipa::path` when the `server` feature
/// of the consuming crate is enabled.
///
/// # Example
///
/// ```rust,ignore
/// #[cfgd_derive::api_handler(get, path = "/health", responses((status = OK)))]
/// pub async fn health_handler() -> impl IntoResponse { "up" }
/// ```
#[proc_macro_attribute]
pub fn api_handler(args: TokenStream, item: TokenStream) -> TokenStream {
    let input = parse_macro_input!(item as ItemFn);
    macros::api::expand_api_handler(args.into(), input).into()
}

/// Attribute macro for error enums.
///
/// # Generated Items
///
/// * `#[derive(Debug, thiserror::Error)]` unless already present.
/// * `Result<T>` alias bound to the enum.
/// * `<Name>Ext` trait adding `.context(...)` to `Result<T, Name>` and to
///   `Result<T, Source>` for every variant with a `source` field.
/// * `From<Source>` for every variant with a `source` field.
/// * `From<&'static str>` / `From<String>` when an `Internal` variant exists.
/// * `fn kind(&self) -> &'static str` returning the variant name, for log fields.
///
/// # Requirements
///
/// Variants must use named fields. A variant with a `source` (or `#[source]`/`#[from]`)
/// field must also carry `context: Option<Cow<'static, str>>`.
///
/// # Example
///
/// ```rust,ignore
/// use std::borrow::Cow;
///
/// #[cfgd_derive::cfgd_error]
/// pub enum SnapshotError {
///     #[error("I/O error{}: {source}", format_context(.context))]
///     Io { source: std::io::Error, context: Option<Cow<'static, str>> },
///
///     #[error("Internal error{}: {message}", format_context(.context))]
///     Internal { message: Cow<'static, str>, context: Option<Cow<'static, str>> },
/// }
///
/// fn write() -> Result<()> {
///     std::fs::write("a", b"b").context("Writing snapshot")?;
///     Ok(())
/// }
/// ```
#[proc_macro_attribute]
pub fn cfgd_error(_args: TokenStream, item: TokenStream) -> TokenStream {
    let input = parse_macro_input!(item as DeriveInput);
    macros::error::expand_derive(input).into()
}
