// Zinc, the bare metal stack for rust.
// Copyright 2014 Matt "mcoffin" Coffin <mcoffin13@gmail.com>
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

extern crate proc_macro;

use proc_macro::TokenStream;
use quote::quote;
use syn::parse_macro_input;
use syn::spanned::Spanned;

/// Mark a board's boot hook.
///
/// The annotated `fn()` is kept as is and a `cortex-m-rt` pre-init entry is
/// generated that runs the RT1064 boot sequence with it as the final step.
/// The hook runs before `.data` and `.bss` are set up, so it must not touch
/// statics. At most one function per binary may carry this attribute.
#[proc_macro_attribute]
pub fn system_init(attr: TokenStream, item: TokenStream) -> TokenStream {
    let input = parse_macro_input!(item as syn::ItemFn);
    match build_system_init(attr.into(), &input) {
        Ok(ts) => TokenStream::from(ts),
        Err(e) => TokenStream::from(e.to_compile_error()),
    }
}

/// Boot entry for boards without a hook: `default_system_init!();` at crate
/// level runs the boot sequence from `cortex-m-rt`'s pre-init slot.
///
/// Use either this or `#[system_init]`, not both.
#[proc_macro]
pub fn default_system_init(input: TokenStream) -> TokenStream {
    let input = proc_macro2::TokenStream::from(input);
    if !input.is_empty() {
        let e = syn::Error::new(input.span(), "default_system_init!() takes no arguments");
        return TokenStream::from(e.to_compile_error());
    }
    TokenStream::from(pre_init_entry(quote!(None)))
}

fn pre_init_entry(hook: proc_macro2::TokenStream) -> proc_macro2::TokenStream {
    quote! {
        #[::cortex_m_rt::pre_init]
        #[link_section = ".init_text"]
        unsafe fn __rtboot_system_init() {
            ::rtboot::hal::imxrt1064::system::system_init(#hook);
        }
    }
}

fn build_system_init(attr: proc_macro2::TokenStream, input: &syn::ItemFn) -> syn::Result<proc_macro2::TokenStream> {
    if !attr.is_empty() {
        return Err(syn::Error::new(attr.span(), "#[system_init] takes no arguments"));
    }
    let sig = &input.sig;
    if !sig.inputs.is_empty() || !matches!(sig.output, syn::ReturnType::Default) {
        return Err(syn::Error::new(sig.span(), "the boot hook must have the signature `fn()`"));
    }
    if sig.asyncness.is_some() || sig.unsafety.is_some() || !sig.generics.params.is_empty() {
        return Err(syn::Error::new(sig.span(), "the boot hook must be a plain safe `fn()`"));
    }
    let hook_ident = &sig.ident;
    let entry = pre_init_entry(quote!(Some(#hook_ident as fn())));
    Ok(quote! {
        #input

        #entry
    })
}
