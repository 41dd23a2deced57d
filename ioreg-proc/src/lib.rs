//! `ioregs!` describes a block of memory-mapped registers and expands to a
//! `#[repr(C)]` struct of volatile cells with typed field accessors.
//!
//! ```ignore
//! ioregs!(CCM @ 0x400F_C000 = {
//!     0x14 => reg32 cbcdr {
//!         10..12 => ahb_podf,
//!         25     => periph_clk_sel {
//!             0 => PrePeriphClk,
//!             1 => PeriphClk2,
//!         },
//!     },
//!     0x18 => reg32 cbcmr {
//!         16     => lock: ro,
//!     },
//! });
//! ```
//!
//! expands to `pub mod ccm` holding `Ccm` (the block), one struct per
//! register with `get()`, `update()` and `write()`, one module per register
//! for its variant enums, and `BASE` / `Ccm::iomem()` when a location is
//! given.

#![recursion_limit="128"]
#![allow(dead_code)]

extern crate proc_macro;

mod builder;
pub(crate) mod util;

use proc_macro::TokenStream;
use syn::{parse_macro_input, braced, parenthesized, token, Token};
use syn::parse::{Parse, ParseStream};
use syn::punctuated::Punctuated;
use std::iter;
use util::ParseOptional;

pub(crate) struct IoRegs {
    pub(crate) name: syn::Ident,
    pub(crate) location: Option<Location>,
    pub(crate) equals_token: Token![=],
    pub(crate) brace_token: token::Brace,
    pub(crate) registers: Punctuated<Register, Token![,]>,
}

impl Parse for IoRegs {
    fn parse(input: ParseStream) -> syn::Result<Self> {
        let content;
        Ok(IoRegs {
            name: input.parse()?,
            location: input.call(ParseOptional::parse_optional)?,
            equals_token: input.parse()?,
            brace_token: braced!(content in input),
            registers: content.parse_terminated(Register::parse)?,
        })
    }
}

/// `@ 0x4000_0000`: fixed base address of the block.
pub(crate) struct Location {
    pub(crate) at_token: Token![@],
    pub(crate) address: syn::LitInt,
}

impl ParseOptional for Location {
    fn parse_optional(input: ParseStream) -> syn::Result<Option<Self>> {
        if !input.peek(Token![@]) {
            return Ok(None);
        }
        let at_token = input.parse()?;
        let address: syn::LitInt = input.parse()?;
        address.base10_parse::<u64>()?;
        Ok(Some(Location {
            at_token: at_token,
            address: address,
        }))
    }
}

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub(crate) enum RegisterType {
    Reg8,
    Reg16,
    Reg32,
    Reg64,
}

impl RegisterType {
    pub(crate) fn byte_length(self) -> u64 {
        use RegisterType::*;
        match self {
            Reg8 => 1,
            Reg16 => 2,
            Reg32 => 4,
            Reg64 => 8,
        }
    }

    pub(crate) fn bit_length(self) -> u64 {
        self.byte_length() * 8
    }
}

impl quote::ToTokens for RegisterType {
    fn to_tokens(&self, output: &mut proc_macro2::TokenStream) {
        use RegisterType::*;
        let tokens = match *self {
            Reg8 => quote::quote!(u8),
            Reg16 => quote::quote!(u16),
            Reg32 => quote::quote!(u32),
            Reg64 => quote::quote!(u64),
        };
        output.extend(tokens);
    }
}

impl Parse for RegisterType {
    fn parse(input: ParseStream) -> syn::Result<Self> {
        let ty: syn::Ident = input.parse()?;
        match ty.to_string().as_ref() {
            "reg8" => Ok(RegisterType::Reg8),
            "reg16" => Ok(RegisterType::Reg16),
            "reg32" => Ok(RegisterType::Reg32),
            "reg64" => Ok(RegisterType::Reg64),
            _ => Err(syn::Error::new(ty.span(), format!("Invalid ioregs register type: {}", &ty))),
        }
    }
}

pub(crate) struct Register {
    pub(crate) offset: syn::LitInt,
    pub(crate) offset_value: u64,
    pub(crate) arrow_token: Token![=>],
    pub(crate) ty: RegisterType,
    pub(crate) ident: syn::Ident,
    pub(crate) brace_token: token::Brace,
    pub(crate) fields: Punctuated<RegisterField, Token![,]>,
}

impl Register {
    pub(crate) fn byte_length(&self) -> u64 {
        self.ty.byte_length()
    }

    fn validate(&self) -> syn::Result<()> {
        if self.offset_value % self.ty.byte_length() != 0 {
            return Err(syn::Error::new(self.offset.span(), "register offset is not aligned to its width"));
        }
        for field in self.fields.iter() {
            if field.offset.end() >= self.ty.bit_length() {
                return Err(syn::Error::new(field.offset.span(), format!("field {} does not fit in a {}-bit register", field.ident, self.ty.bit_length())));
            }
        }
        Ok(())
    }
}

impl Parse for Register {
    fn parse(input: ParseStream) -> syn::Result<Self> {
        let content;
        let offset: syn::LitInt = input.parse()?;
        let offset_value = offset.base10_parse::<u64>()?;
        let register = Register {
            offset: offset,
            offset_value: offset_value,
            arrow_token: input.parse()?,
            ty: input.parse()?,
            ident: input.parse()?,
            brace_token: braced!(content in input),
            fields: content.parse_terminated(RegisterField::parse)?,
        };
        register.validate()?;
        Ok(register)
    }
}

/// `low..high` bit range. Written either way round; stored low first.
#[derive(Clone)]
pub(crate) struct LitIntRange {
    pub(crate) start: syn::LitInt,
    pub(crate) range_sep: Token![..],
    pub(crate) end: syn::LitInt,
    low: u64,
    high: u64,
}

impl LitIntRange {
    pub(crate) fn bit_size(&self) -> u64 {
        self.high - self.low + 1
    }

    pub(crate) fn span(&self) -> proc_macro2::Span {
        self.start.span()
    }
}

impl Parse for LitIntRange {
    fn parse(input: ParseStream) -> syn::Result<Self> {
        let start: syn::LitInt = input.parse()?;
        let range_sep = input.parse()?;
        let end: syn::LitInt = input.parse()?;
        let a = start.base10_parse::<u64>()?;
        let b = end.base10_parse::<u64>()?;
        Ok(LitIntRange {
            start: start,
            range_sep: range_sep,
            end: end,
            low: a.min(b),
            high: a.max(b),
        })
    }
}

#[derive(Clone)]
pub(crate) enum RegisterFieldOffset {
    Bit(syn::LitInt, u64),
    BitRange(LitIntRange),
}

impl RegisterFieldOffset {
    pub(crate) fn bit_size(&self) -> u64 {
        match self {
            &RegisterFieldOffset::Bit(..) => 1,
            &RegisterFieldOffset::BitRange(ref range) => range.bit_size(),
        }
    }

    /// Lowest bit of the field.
    pub(crate) fn shift(&self) -> u64 {
        match self {
            &RegisterFieldOffset::Bit(_, bit) => bit,
            &RegisterFieldOffset::BitRange(ref range) => range.low,
        }
    }

    /// Highest bit of the field.
    pub(crate) fn end(&self) -> u64 {
        self.shift() + self.bit_size() - 1
    }

    pub(crate) fn span(&self) -> proc_macro2::Span {
        match self {
            &RegisterFieldOffset::Bit(ref v, _) => v.span(),
            &RegisterFieldOffset::BitRange(ref range) => range.span(),
        }
    }
}

impl Parse for RegisterFieldOffset {
    fn parse(input: ParseStream) -> syn::Result<Self> {
        if input.peek2(Token![..]) {
            Ok(RegisterFieldOffset::BitRange(input.parse()?))
        } else {
            let bit: syn::LitInt = input.parse()?;
            let value = bit.base10_parse::<u64>()?;
            Ok(RegisterFieldOffset::Bit(bit, value))
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum RegisterPropertyValue {
    SetToClear,
    WriteOnly,
    ReadOnly,
    ReadWrite
}

impl RegisterPropertyValue {
    fn is_access_modifier(self) -> bool {
        use RegisterPropertyValue::*;
        match self {
            WriteOnly | ReadOnly | ReadWrite => true,
            SetToClear => false,
        }
    }
}

pub(crate) struct RegisterProperty {
    pub(crate) value: RegisterPropertyValue,
    span: proc_macro2::Span,
}

impl RegisterProperty {
    #[inline(always)]
    fn is_access_modifier(&self) -> bool {
        self.value.is_access_modifier()
    }
}

impl Parse for RegisterProperty {
    fn parse(input: ParseStream) -> syn::Result<Self> {
        let ident: syn::Ident = input.parse()?;
        use RegisterPropertyValue::*;
        let value = match ident.to_string().as_ref() {
            "set_to_clear" => Ok(SetToClear),
            "wo" => Ok(WriteOnly),
            "ro" => Ok(ReadOnly),
            "rw" => Ok(ReadWrite),
            _ => Err(syn::Error::new(ident.span(), format!("Invalid ioregs register property: {}", ident))),
        };
        value.map(|v| RegisterProperty {
            value: v,
            span: ident.span(),
        })
    }
}

pub(crate) enum RegisterPropertyList {
    Single(RegisterProperty),
    Multiple {
        paren_token: token::Paren,
        properties: Punctuated<RegisterProperty, Token![,]>,
    }
}

impl RegisterPropertyList {
    fn parse_multiple(input: ParseStream) -> syn::Result<RegisterPropertyList> {
        let content;
        let paren_token: token::Paren = parenthesized!(content in input);
        let properties: Punctuated<RegisterProperty, Token![,]> =
            content.parse_terminated(RegisterProperty::parse)?;
        let ret = RegisterPropertyList::Multiple {
            paren_token: paren_token,
            properties: properties,
        };
        ret.validate()?;
        Ok(ret)
    }

    fn span(&self) -> proc_macro2::Span {
        match self {
            &RegisterPropertyList::Single(ref prop) => prop.span,
            &RegisterPropertyList::Multiple { ref paren_token, .. } => paren_token.span,
        }
    }

    fn validate(&self) -> syn::Result<()> {
        let access_modifiers = self.iter()
            .filter(|&prop| prop.is_access_modifier())
            .count();
        if access_modifiers > 1 {
            return Err(syn::Error::new(self.span(), "more than one access modifier found for register field"));
        }
        let set_to_clear_conflicts = self.iter()
            .filter(|&prop| prop.value == RegisterPropertyValue::SetToClear || prop.value == RegisterPropertyValue::ReadOnly)
            .count();
        if set_to_clear_conflicts >= 2 {
            return Err(syn::Error::new(self.span(), "set_to_clear and ro cannot be set on the same register field"));
        }
        Ok(())
    }

    pub(crate) fn iter<'a>(&'a self) -> Box<dyn Iterator<Item=&'a RegisterProperty> + 'a> {
        match self {
            &RegisterPropertyList::Single(ref prop) => Box::new(iter::once(prop)),
            &RegisterPropertyList::Multiple { ref properties, .. } => Box::new(properties.iter()),
        }
    }
}

impl Parse for RegisterPropertyList {
    fn parse(input: ParseStream) -> syn::Result<Self> {
        if input.peek(token::Paren) {
            RegisterPropertyList::parse_multiple(input)
        } else {
            Ok(RegisterPropertyList::Single(input.parse()?))
        }
    }
}

pub(crate) struct RegisterProperties {
    colon_token: Token![:],
    pub(crate) properties: RegisterPropertyList,
}

impl ParseOptional for RegisterProperties {
    fn parse_optional(input: ParseStream) -> syn::Result<Option<Self>> {
        if !input.peek(Token![:]) {
            return Ok(None);
        }
        Ok(Some(RegisterProperties {
            colon_token: input.parse()?,
            properties: input.parse()?,
        }))
    }
}

pub(crate) struct RegisterVariant {
    pub(crate) value: syn::LitInt,
    pub(crate) value_parsed: u64,
    arrow_token: Token![=>],
    pub(crate) ident: syn::Ident,
}

impl Parse for RegisterVariant {
    fn parse(input: ParseStream) -> syn::Result<Self> {
        let value: syn::LitInt = input.parse()?;
        let value_parsed = value.base10_parse::<u64>()?;
        Ok(RegisterVariant {
            value: value,
            value_parsed: value_parsed,
            arrow_token: input.parse()?,
            ident: input.parse()?,
        })
    }
}

pub(crate) struct RegisterVariants {
    brace_token: token::Brace,
    pub(crate) variants: Punctuated<RegisterVariant, Token![,]>,
}

impl ParseOptional for RegisterVariants {
    fn parse_optional(input: ParseStream) -> syn::Result<Option<Self>> {
        if !input.peek(token::Brace) {
            return Ok(None)
        }
        let content;
        Ok(Some(RegisterVariants {
            brace_token: braced!(content in input),
            variants: content.parse_terminated(RegisterVariant::parse)?,
        }))
    }
}

pub(crate) struct RegisterField {
    pub(crate) offset: RegisterFieldOffset,
    arrow_token: Token![=>],
    pub(crate) ident: syn::Ident,
    pub(crate) variants: Option<RegisterVariants>,
    pub(crate) properties: Option<RegisterProperties>,
}

impl RegisterField {
    fn has_property(&self, value: RegisterPropertyValue) -> bool {
        self.properties
            .as_ref()
            .map(|p| p.properties.iter().any(|p| p.value == value))
            .unwrap_or(false)
    }

    pub(crate) fn is_read_only(&self) -> bool {
        self.has_property(RegisterPropertyValue::ReadOnly)
    }

    pub(crate) fn is_write_only(&self) -> bool {
        self.has_property(RegisterPropertyValue::WriteOnly)
    }

    pub(crate) fn is_set_to_clear(&self) -> bool {
        self.has_property(RegisterPropertyValue::SetToClear)
    }

    fn validate(&self) -> syn::Result<()> {
        if let Some(ref variants) = self.variants {
            let limit = 1u128 << self.offset.bit_size();
            for variant in variants.variants.iter() {
                if (variant.value_parsed as u128) >= limit {
                    return Err(syn::Error::new(variant.value.span(), format!("variant {} does not fit in field {}", variant.ident, self.ident)));
                }
            }
        }
        Ok(())
    }
}

impl Parse for RegisterField {
    fn parse(input: ParseStream) -> syn::Result<Self> {
        let field = RegisterField {
            offset: input.parse()?,
            arrow_token: input.parse()?,
            ident: input.parse()?,
            variants: input.call(ParseOptional::parse_optional)?,
            properties: input.call(ParseOptional::parse_optional)?,
        };
        field.validate()?;
        Ok(field)
    }
}

#[proc_macro]
pub fn ioregs(item: TokenStream) -> TokenStream {
    let input = parse_macro_input!(item as IoRegs);
    let output = builder::union::build_union(&input)
        .unwrap_or_else(|e| e.to_compile_error());
    TokenStream::from(output)
}
