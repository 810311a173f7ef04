//! Procedural macros for hookwire.

use proc_macro::TokenStream;

mod hook;

/// Register an async function as a hook handler at startup.
///
/// # Arguments
///
/// - `"name"`: the hook name, wildcards allowed (required, first)
/// - `priority = N`: priority bucket, lower runs earlier (default 50)
/// - `once`: remove the entry after its first invocation
/// - `id = "..."`: explicit id (default: the function's module path)
///
/// # Example
///
/// ```rust,ignore
/// #[hookwire::hook("user.*", priority = -5, once)]
/// async fn audit(event: Event, ctx: HookContext) -> Result<Event, BoxError> {
///     Ok(event)
/// }
///
/// dispatcher.register_collected();
/// ```
#[proc_macro_attribute]
pub fn hook(attr: TokenStream, item: TokenStream) -> TokenStream {
    hook::hook_impl(attr, item)
}
