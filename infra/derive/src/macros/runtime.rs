use proc_macro2::TokenStream;
use quote::quote;
use syn::{Error, Ident, ItemFn, ReturnType, Type};

/// Expands `#[cfgd_runtime::main]`.
pub fn expand_main(args: TokenStream, mut input: ItemFn) -> TokenStream {
    if input.sig.asyncness.take().is_none() {
        return Error::new_spanned(
            &input.sig.fn_token,
            "#[cfgd_runtime::main] can only be applied to async functions",
        )
        .to_compile_error();
    }

    if !returns_result(&input.sig.output) {
        return Error::new_spanned(
            &input.sig.output,
            "#[cfgd_runtime::main] requires the function to return a Result",
        )
        .to_compile_error();
    }

    let profile = match profile_config(args) {
        Ok(profile) => profile,
        Err(err) => return err.to_compile_error(),
    };

    let attrs = &input.attrs;
    let vis = &input.vis;
    let sig = &input.sig;
    let body = &input.block;

    quote! {
        #(#attrs)*
        #vis #sig {
            let config = #profile;
            let runtime = ::cfgd_runtime::build_runtime_with_config(&config)?;
            runtime.block_on(async #body)
        }
    }
}

fn profile_config(args: TokenStream) -> syn::Result<TokenStream> {
    if args.is_empty() {
        return Ok(quote! { ::cfgd_runtime::RuntimeConfig::default() });
    }

    let profile: Ident = syn::parse2(args)?;
    let constructor = match profile.to_string().as_str() {
        "high_performance" => quote! { high_performance },
        "memory_efficient" => quote! { memory_efficient },
        "default" => quote! { default },
        _ => {
            return Err(Error::new_spanned(
                profile,
                "unknown runtime profile; expected high_performance, memory_efficient or default",
            ));
        },
    };

    Ok(quote! { ::cfgd_runtime::RuntimeConfig::#constructor() })
}

fn returns_result(output: &ReturnType) -> bool {
    let ReturnType::Type(_, ty) = output else { return false };
    let Type::Path(path) = ty.as_ref() else { return false };
    path.path.segments.last().is_some_and(|segment| segment.ident == "Result")
}
