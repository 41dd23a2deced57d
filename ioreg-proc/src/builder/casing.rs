use heck::{ToSnakeCase, ToUpperCamelCase};

pub trait ToCasing {
    fn to_snake_case(&self) -> Self;
    fn to_camel_case(&self) -> Self;
}

impl ToCasing for syn::Ident {
    fn to_snake_case(&self) -> Self {
        let s = ToSnakeCase::to_snake_case(self.to_string().as_str());
        syn::Ident::new(&s, self.span())
    }

    fn to_camel_case(&self) -> Self {
        let s = ToUpperCamelCase::to_upper_camel_case(self.to_string().as_str());
        syn::Ident::new(&s, self.span())
    }
}
