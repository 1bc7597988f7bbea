use super::derived_trait_names;
use proc_macro2::TokenStream;
use quote::quote;
use syn::{Attribute, ItemFn, ItemStruct, LitStr, MetaNameValue};

/// Expands `#[api_model]`.
pub fn expand_api_model(args: TokenStream, input: ItemStruct) -> TokenStream {
    let rename_all = match parse_rename_all(args) {
        Ok(rename_all) => rename_all,
        Err(err) => return err.to_compile_error(),
    };

    let existing = derived_trait_names(&input.attrs);
    let mut derives = Vec::new();
    if !existing.contains("Debug") {
        derives.push(quote! { Debug });
    }
    if !existing.contains("Serialize") {
        derives.push(quote! { ::serde::Serialize });
    }
    if !existing.contains("Deserialize") {
        derives.push(quote! { ::serde::Deserialize });
    }
    let derive_attr = if derives.is_empty() { quote! {} } else { quote! { #[derive(#(#derives),*)] } };

    let schema_attr = if existing.contains("ToSchema") {
        quote! {}
    } else {
        quote! { #[cfg_attr(feature = "server", derive(::utoipa::ToSchema))] }
    };

    let rename_attr = if has_serde_rename_all(&input.attrs) {
        quote! {}
    } else {
        let policy = rename_all
            .unwrap_or_else(|| LitStr::new("camelCase", proc_macro2::Span::call_site()));
        quote! { #[serde(rename_all = #policy)] }
    };

    quote! {
        #derive_attr
        #schema_attr
        #rename_attr
        #input
    }
}

/// Expands `#[api_handler]`.
pub fn expand_api_handler(args: TokenStream, input: ItemFn) -> TokenStream {
    quote! {
        #[allow(clippy::unused_async)]
        #[cfg_attr(feature = "server", ::utoipa::path(#args))]
        #input
    }
}

fn parse_rename_all(args: TokenStream) -> syn::Result<Option<LitStr>> {
    if args.is_empty() {
        return Ok(None);
    }

    let arg: MetaNameValue = syn::parse2(args)?;
    if !arg.path.is_ident("rename_all") {
        return Err(syn::Error::new_spanned(arg.path, "expected `rename_all = \"...\"`"));
    }
    match arg.value {
        syn::Expr::Lit(syn::ExprLit { lit: syn::Lit::Str(lit), .. }) => Ok(Some(lit)),
        other => Err(syn::Error::new_spanned(other, "rename_all must be a string literal")),
    }
}

fn has_serde_rename_all(attrs: &[Attribute]) -> bool {
    let mut found = false;
    for attr in attrs.iter().filter(|attr| attr.path().is_ident("serde")) {
        let _ = attr.parse_nested_meta(|meta| {
            if meta.path.is_ident("rename_all") {
                found = true;
                let _: LitStr = meta.value()?.parse()?;
            }
            Ok(())
        });
    }
    found
}
