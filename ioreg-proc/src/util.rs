use syn::parse::ParseStream;

/// Syntax that may be absent; decided by peeking at the next token.
pub trait ParseOptional: Sized {
    fn parse_optional(input: ParseStream) -> syn::Result<Option<Self>>;
}
