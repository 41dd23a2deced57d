use crate::IoRegs;
use quote::quote;
use super::RegisterExt;
use super::alignment::AlignmentTest;
use super::casing::ToCasing;

pub(crate) fn build_union(union: &IoRegs) -> syn::Result<proc_macro2::TokenStream> {
    let union_ident = union.name.to_camel_case();
    let mod_ident = union.name.to_snake_case();
    let mut field_definitions = Vec::new();
    let mut register_definitions = Vec::new();
    let mut alignment_tests = Vec::new();
    let mut offset: u64 = 0;
    let mut padding_count: usize = 0;
    for reg in union.registers.iter() {
        let start = reg.byte_start();
        if start < offset {
            return Err(syn::Error::new(reg.offset.span(), format!("register {} overlaps the previous register", reg.ident)));
        }
        if start != offset {
            let padding_ident = syn::Ident::new(&format!("_padding{}", padding_count), reg.offset.span());
            padding_count += 1;
            let padding_size = syn::LitInt::new(&(start - offset).to_string(), reg.offset.span());
            field_definitions.push(quote! {
                #padding_ident: [u8; #padding_size]
            });
            offset = start;
        }
        offset += reg.byte_length();
        let (idents, struct_definition) = super::build_register_struct(reg)?;
        let reg_ident = &reg.ident;
        let reg_ty = &idents.base;
        field_definitions.push(quote! {
            pub #reg_ident: #reg_ty
        });
        register_definitions.push(struct_definition);
        if cfg!(feature = "alignment_tests") {
            alignment_tests.push(AlignmentTest {
                test_ident: syn::Ident::new(&format!("{}_offset", reg_ident), reg_ident.span()),
                struct_ident: union_ident.clone(),
                field_ident: reg_ident.clone(),
                field_ty: reg_ty.clone(),
                field_offset: syn::LitInt::new(&start.to_string(), reg.offset.span()),
            });
        }
    }
    let location = union.location.as_ref().map(|location| {
        let address = &location.address;
        quote! {
            pub const BASE: usize = #address;

            impl #union_ident {
                #[doc = "The block at its fixed bus address."]
                #[doc = ""]
                #[doc = "Unsafe because nothing stops two owners from driving the same hardware."]
                #[inline(always)]
                pub unsafe fn iomem() -> &'static #union_ident {
                    &*(BASE as *const #union_ident)
                }
            }
        }
    });
    Ok(quote! {
        pub mod #mod_ident {
            #( #register_definitions )*

            #[repr(C)]
            pub struct #union_ident {
                #( #field_definitions ),*
            }

            #location

            #( #alignment_tests )*
        }
    })
}
