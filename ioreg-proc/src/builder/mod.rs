use super::{Register, RegisterType, RegisterField, RegisterFieldOffset};
use quote::{ToTokens, quote};
use std::collections::HashMap;
use self::casing::ToCasing;

pub mod alignment;
pub mod union;
pub mod casing;

pub(crate) trait RegisterExt {
    fn is_write_only(&self) -> bool;
    fn byte_start(&self) -> u64;
}

impl RegisterExt for Register {
    fn is_write_only(&self) -> bool {
        self.fields.iter().all(RegisterField::is_write_only)
    }

    fn byte_start(&self) -> u64 {
        self.offset_value
    }
}

fn unsuffixed(value: u64, span: proc_macro2::Span) -> syn::LitInt {
    syn::LitInt::new(&value.to_string(), span)
}

fn hex_unsuffixed(value: u64, span: proc_macro2::Span) -> syn::LitInt {
    syn::LitInt::new(&format!("{:#x}", value), span)
}

trait RegisterFieldExt {
    fn shift_expr(&self) -> syn::LitInt;
    fn mask_value(&self) -> u64;
    fn mask_expr(&self) -> syn::LitInt;
    fn primitive_extract_expr<T: ToTokens>(&self, value_expr: &T) -> proc_macro2::TokenStream;
}

impl RegisterFieldExt for RegisterField {
    fn shift_expr(&self) -> syn::LitInt {
        unsuffixed(self.offset.shift(), self.offset.span())
    }

    fn mask_value(&self) -> u64 {
        match self.offset.bit_size() {
            64 => u64::MAX,
            bits => (1u64 << bits) - 1,
        }
    }

    fn mask_expr(&self) -> syn::LitInt {
        hex_unsuffixed(self.mask_value(), self.offset.span())
    }

    fn primitive_extract_expr<T: ToTokens>(&self, value_expr: &T) -> proc_macro2::TokenStream {
        let shift = self.shift_expr();
        let mask = self.mask_expr();
        quote!(((#value_expr >> #shift) & #mask))
    }
}

fn register_field_primitive(field: &RegisterField) -> syn::Result<proc_macro2::TokenStream> {
    match &field.offset {
        &RegisterFieldOffset::Bit(..) => Ok(quote!(bool)),
        &RegisterFieldOffset::BitRange(ref range) => {
            let size = range.bit_size();
            if size <= 8 {
                Ok(quote!(u8))
            } else if size <= 16 {
                Ok(quote!(u16))
            } else if size <= 32 {
                Ok(quote!(u32))
            } else if size <= 64 {
                Ok(quote!(u64))
            } else {
                Err(syn::Error::new(range.span(), format!("Invalid register field size: {}", size)))
            }
        },
    }
}

/// A field enum whose variants name every possible encoding can be read
/// without a fallible conversion.
fn variants_are_exhaustive(field: &RegisterField) -> bool {
    let variants = match field.variants.as_ref() {
        Some(v) => v,
        None => return false,
    };
    if field.offset.bit_size() > 16 {
        return false;
    }
    let mut seen: Vec<u64> = variants.variants.iter().map(|v| v.value_parsed).collect();
    seen.sort();
    seen.dedup();
    seen.len() as u64 == 1u64 << field.offset.bit_size()
}

fn build_register_field_enum(field: &RegisterField, register_ty: RegisterType) -> Option<(syn::Ident, proc_macro2::TokenStream)> {
    let variants = field.variants.as_ref()?;
    let enum_ident = field.ident.to_camel_case();
    let variant_idents: Vec<&syn::Ident> = variants.variants.iter().map(|v| &v.ident).collect();
    let variant_values: Vec<&syn::LitInt> = variants.variants.iter().map(|v| &v.value).collect();
    let definition = quote! {
        #[derive(Debug, Clone, Copy, PartialEq, Eq)]
        #[repr(#register_ty)]
        pub enum #enum_ident {
            #( #variant_idents = #variant_values ),*
        }

        impl ::core::convert::TryFrom<#register_ty> for #enum_ident {
            type Error = #register_ty;

            #[inline(always)]
            fn try_from(primitive: #register_ty) -> ::core::result::Result<Self, <Self as ::core::convert::TryFrom<#register_ty>>::Error> {
                match primitive {
                    #( #variant_values => Ok(#enum_ident::#variant_idents), )*
                    v => Err(v),
                }
            }
        }
    };
    Some((enum_ident, definition))
}

pub struct RegisterStructIdents {
    pub base: syn::Ident,
    pub update: syn::Ident,
    pub get: syn::Ident,
}

pub(crate) fn build_register_struct(register: &Register) -> syn::Result<(RegisterStructIdents, proc_macro2::TokenStream)> {
    let struct_idents = {
        let struct_ident = register.ident.to_camel_case();
        let struct_ident_str = struct_ident.to_string();
        let update_ident = syn::Ident::new(&format!("{}{}", &struct_ident_str, "Update"), register.ident.span());
        let get_ident = syn::Ident::new(&format!("{}{}", &struct_ident_str, "Get"), register.ident.span());
        RegisterStructIdents {
            base: struct_ident,
            update: update_ident,
            get: get_ident,
        }
    };
    let mod_ident = register.ident.to_snake_case();
    let register_ty = register.ty;

    let mut enum_register_definitions = Vec::new();
    let mut enum_register_paths: HashMap<String, syn::Path> = HashMap::new();
    for field in register.fields.iter() {
        if let Some((enum_ident, ts)) = build_register_field_enum(field, register_ty) {
            let enum_path: syn::Path = syn::parse2(quote!(#mod_ident::#enum_ident))?;
            enum_register_paths.insert(field.ident.to_string(), enum_path);
            enum_register_definitions.push(ts);
        }
    }
    let mod_definition = quote! {
        pub mod #mod_ident {
            #( #enum_register_definitions )*
        }
    };

    let struct_ident = &struct_idents.base;
    let update_ident = &struct_idents.update;
    let get_ident = &struct_idents.get;
    let struct_definition = quote! {
        #[repr(transparent)]
        pub struct #struct_ident {
            value: ::volatile_cell::VolatileCell<#register_ty>,
        }

        impl #struct_ident {
            #[doc="Create a new updater; fields not set keep their current value"]
            #[inline(always)]
            pub fn update<'a>(&'a self) -> #update_ident<'a> {
                #update_ident::new(self)
            }

            #[doc="Create a new updater that does not read the register; fields not set are written as zero"]
            #[inline(always)]
            pub fn write<'a>(&'a self) -> #update_ident<'a> {
                #update_ident::new_ignoring_state(self)
            }

            #[doc="Create a getter representing the current state of the register"]
            #[inline(always)]
            pub fn get(&self) -> #get_ident {
                #get_ident::new(self)
            }

            #[doc="Raw value of the register"]
            #[inline(always)]
            pub fn raw(&self) -> #register_ty {
                self.value.get()
            }

            #[doc="Address of the register"]
            #[inline(always)]
            pub fn address(&self) -> usize {
                self.value.address()
            }
        }
    };

    let mut get_function_definitions = Vec::new();
    for field in register.fields.iter().filter(|f| !f.is_write_only()) {
        let getter_ident = field.ident.to_snake_case();
        let primitive_expr = field.primitive_extract_expr(&quote!(self.value));
        let getter = match enum_register_paths.get(&field.ident.to_string()) {
            Some(enum_path) if variants_are_exhaustive(field) => {
                let variants = field.variants.as_ref().map(|v| &v.variants);
                let mut arms: Vec<proc_macro2::TokenStream> = variants
                    .into_iter()
                    .flat_map(|v| v.iter())
                    .map(|v| {
                        let value = &v.value;
                        let ident = &v.ident;
                        quote!(#value => #enum_path::#ident,)
                    })
                    .collect();
                // The mask makes the last encoding the only one left.
                if let Some(last) = variants.and_then(|v| v.iter().last()) {
                    let ident = &last.ident;
                    arms.pop();
                    arms.push(quote!(_ => #enum_path::#ident,));
                }
                quote! {
                    #[inline(always)]
                    pub fn #getter_ident(&self) -> #enum_path {
                        match #primitive_expr {
                            #( #arms )*
                        }
                    }
                }
            },
            Some(enum_path) => quote! {
                #[doc="Encodings without a named variant come back as `Err(raw)`"]
                #[inline(always)]
                pub fn #getter_ident(&self) -> ::core::result::Result<#enum_path, #register_ty> {
                    <#enum_path as ::core::convert::TryFrom<#register_ty>>::try_from(#primitive_expr)
                }
            },
            None if field.offset.bit_size() == 1 => quote! {
                #[inline(always)]
                pub fn #getter_ident(&self) -> bool {
                    #primitive_expr != 0x0
                }
            },
            None => quote! {
                #[inline(always)]
                pub fn #getter_ident(&self) -> #register_ty {
                    #primitive_expr
                }
            },
        };
        get_function_definitions.push(getter);
    }

    let mut update_function_definitions = Vec::new();
    for field in register.fields.iter().filter(|f| !f.is_read_only()) {
        let setter_ident = syn::Ident::new(&format!("set_{}", field.ident.to_snake_case()), field.ident.span());
        let field_ty = match enum_register_paths.get(&field.ident.to_string()) {
            Some(enum_path) => enum_path.into_token_stream(),
            None => register_field_primitive(field)?,
        };
        let shift = field.shift_expr();
        let mask = field.mask_expr();
        update_function_definitions.push(quote! {
            #[inline(always)]
            pub fn #setter_ident<'b>(&'b mut self, new_value: #field_ty) -> &'b mut Self {
                let context_mask: #register_ty = #mask << #shift;
                self.value = (self.value & !context_mask) | (((new_value as #register_ty) & #mask) << #shift);
                self.mask |= context_mask;
                self
            }
        });
    }

    let get_definition = quote! {
        #[derive(Clone, Copy)]
        pub struct #get_ident {
            value: #register_ty,
        }

        impl #get_ident {
            #[doc = "Create a getter reflecting the current value of the register"]
            #[inline(always)]
            pub fn new(reg: & #struct_ident) -> #get_ident {
                #get_ident {
                    value: reg.value.get(),
                }
            }

            #[doc = "Raw value captured by this getter"]
            #[inline(always)]
            pub fn raw(&self) -> #register_ty {
                self.value
            }

            #( #get_function_definitions )*
        }
    };

    let update_definition = {
        let clear: u64 = register.fields
            .iter()
            .filter(|f| f.is_set_to_clear())
            .fold(0, |clear, f| clear | (f.mask_value() << f.offset.shift()));
        let clear = hex_unsuffixed(clear, register.ident.span());
        let initial_value = if register.is_write_only() {
            quote!(0)
        } else {
            quote! {
                if self.write_only {
                    0
                } else {
                    self.reg.value.get()
                }
            }
        };
        quote! {
            pub struct #update_ident<'a> {
                value: #register_ty,
                mask: #register_ty,
                write_only: bool,
                reg: &'a #struct_ident,
            }

            impl<'a> #update_ident<'a> {
                #[inline(always)]
                pub fn new(reg: &'a #struct_ident) -> #update_ident<'a> {
                    #update_ident {
                        value: 0,
                        mask: 0,
                        write_only: false,
                        reg: reg,
                    }
                }

                #[inline(always)]
                pub fn new_ignoring_state(reg: &'a #struct_ident) -> #update_ident<'a> {
                    #update_ident {
                        value: 0,
                        mask: 0,
                        write_only: true,
                        reg: reg,
                    }
                }

                #[inline(always)]
                const fn clear_mask() -> #register_ty {
                    #clear
                }

                #( #update_function_definitions )*
            }

            impl<'a> Drop for #update_ident<'a> {
                #[inline(always)]
                fn drop(&mut self) {
                    let clear_mask = Self::clear_mask();
                    if self.mask != 0 {
                        let v: #register_ty = (#initial_value) & (!clear_mask) & (!self.mask);
                        self.reg.value.set(self.value | v);
                    }
                }
            }
        }
    };

    let ret = quote! {
        #mod_definition
        #struct_definition
        #update_definition
        #get_definition
    };
    Ok((struct_idents, ret))
}
