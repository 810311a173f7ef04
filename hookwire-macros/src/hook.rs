//! The `#[hook]` attribute.

use proc_macro::TokenStream;
use proc_macro2::TokenStream as TokenStream2;
use quote::{format_ident, quote};
use syn::{
    Expr, ExprLit, ExprUnary, FnArg, Ident, ItemFn, Lit, LitStr, Token, Type, UnOp,
    parse::{Parse, ParseStream},
    parse_macro_input,
};

/// Arguments for the `#[hook]` macro.
pub(crate) struct HookArgs {
    /// Hook name, possibly with wildcards.
    pub name: LitStr,
    /// Priority bucket (lower = earlier).
    pub priority: Option<i32>,
    /// Remove after the first invocation.
    pub once: bool,
    /// Explicit id.
    pub id: Option<LitStr>,
}

impl Parse for HookArgs {
    fn parse(input: ParseStream) -> syn::Result<Self> {
        if input.is_empty() {
            return Err(input.error("expected a hook name: #[hook(\"name\")]"));
        }
        let name: LitStr = input.parse()?;
        let mut priority = None;
        let mut once = false;
        let mut id = None;

        while !input.is_empty() {
            input.parse::<Token![,]>()?;
            if input.is_empty() {
                break;
            }

            let ident: Ident = input.parse()?;
            match ident.to_string().as_str() {
                "once" => once = true,
                "priority" => {
                    input.parse::<Token![=]>()?;
                    let expr: Expr = input.parse()?;
                    priority = Some(parse_priority(&expr)?);
                }
                "id" => {
                    input.parse::<Token![=]>()?;
                    id = Some(input.parse()?);
                }
                other => {
                    return Err(syn::Error::new(
                        ident.span(),
                        format!("unknown attribute: {}", other),
                    ));
                }
            }
        }

        Ok(HookArgs {
            name,
            priority,
            once,
            id,
        })
    }
}

/// Accepts `10` and `-10`, down to `i32::MIN`.
fn parse_priority(expr: &Expr) -> syn::Result<i32> {
    let value = parse_signed(expr)?;
    i32::try_from(value).map_err(|_| syn::Error::new_spanned(expr, "priority must fit in i32"))
}

fn parse_signed(expr: &Expr) -> syn::Result<i64> {
    match expr {
        Expr::Lit(ExprLit {
            lit: Lit::Int(lit), ..
        }) => lit.base10_parse(),
        Expr::Unary(ExprUnary {
            op: UnOp::Neg(_),
            expr: inner,
            ..
        }) => parse_signed(inner)?
            .checked_neg()
            .ok_or_else(|| syn::Error::new_spanned(expr, "priority must fit in i32")),
        _ => Err(syn::Error::new_spanned(
            expr,
            "priority must be an integer literal",
        )),
    }
}

/// Register an async function as a hook handler at startup.
///
/// The function keeps its name and stays callable. Alongside it the macro
/// submits a `HookRegistration` that `Dispatcher::register_collected` picks up.
///
/// ```rust,ignore
/// #[hookwire::hook("post.saved", priority = 10)]
/// async fn reindex(post: Post, ctx: HookContext) -> Result<Post, BoxError> {
///     Ok(post)
/// }
/// ```
pub fn hook_impl(attr: TokenStream, item: TokenStream) -> TokenStream {
    let args = parse_macro_input!(attr as HookArgs);
    let input = parse_macro_input!(item as ItemFn);
    let fn_name = &input.sig.ident;

    if input.sig.asyncness.is_none() {
        return syn::Error::new_spanned(&input.sig.fn_token, "hook handler must be async")
            .to_compile_error()
            .into();
    }

    if input.sig.inputs.len() != 2 {
        return syn::Error::new_spanned(
            &input.sig.inputs,
            "hook handler must take (value, HookContext)",
        )
        .to_compile_error()
        .into();
    }

    let value_type: &Type = match input.sig.inputs.first() {
        Some(FnArg::Typed(pat_type)) => &pat_type.ty,
        _ => {
            return syn::Error::new_spanned(&input.sig.inputs, "hook handler cannot take self")
                .to_compile_error()
                .into();
        }
    };

    let hook_name = &args.name;
    let once = args.once;
    let priority: TokenStream2 = match args.priority {
        Some(p) => quote! { #p },
        None => quote! { ::hookwire::DEFAULT_PRIORITY },
    };
    let id: TokenStream2 = match &args.id {
        Some(id) => quote! { #id },
        None => quote! {
            ::core::concat!(::core::module_path!(), "::", ::core::stringify!(#fn_name))
        },
    };
    let factory_name = format_ident!("__hookwire_factory_{}", fn_name);

    let expanded = quote! {
        #input

        #[doc(hidden)]
        #[allow(non_snake_case)]
        fn #factory_name()
            -> ::std::boxed::Box<dyn ::std::any::Any + ::core::marker::Send + ::core::marker::Sync>
        {
            let handler: ::hookwire::SharedHandler<#value_type> = ::hookwire::shared(#fn_name);
            ::std::boxed::Box::new(handler)
        }

        ::hookwire::inventory::submit! {
            ::hookwire::HookRegistration::new(
                #hook_name,
                #priority,
                #once,
                #id,
                #factory_name,
            )
        }
    };

    TokenStream::from(expanded)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn args(src: &str) -> syn::Result<HookArgs> {
        syn::parse_str::<HookArgs>(src)
    }

    #[test]
    fn test_priority_accepts_negative_literals() {
        assert_eq!(args("\"x\", priority = -5").unwrap().priority, Some(-5));
        assert_eq!(args("\"x\", priority = 7").unwrap().priority, Some(7));
    }

    #[test]
    fn test_priority_accepts_full_i32_range() {
        let min = args("\"x\", priority = -2147483648").unwrap();
        assert_eq!(min.priority, Some(i32::MIN));
        let max = args("\"x\", priority = 2147483647").unwrap();
        assert_eq!(max.priority, Some(i32::MAX));
    }

    #[test]
    fn test_priority_rejects_out_of_range() {
        let err = args("\"x\", priority = 2147483648").err().unwrap();
        assert_eq!(err.to_string(), "priority must fit in i32");
        assert!(args("\"x\", priority = -2147483649").is_err());
    }

    #[test]
    fn test_priority_rejects_non_literal() {
        let err = args("\"x\", priority = LEVEL").err().unwrap();
        assert_eq!(err.to_string(), "priority must be an integer literal");
    }

    #[test]
    fn test_flags_and_id() {
        let parsed = args("\"post.*\", once, id = \"posts::trim\"").unwrap();
        assert_eq!(parsed.name.value(), "post.*");
        assert!(parsed.once);
        assert_eq!(parsed.id.map(|id| id.value()).as_deref(), Some("posts::trim"));
        assert_eq!(parsed.priority, None);
    }
}
