//! `#[derive(FilterModel)]` expansion.

use crate::common::syn_types::value_ident;
use heck::{ToKebabCase, ToLowerCamelCase, ToShoutySnakeCase, ToSnakeCase, ToUpperCamelCase};
use proc_macro2::TokenStream;
use quote::quote;
use syn::ext::IdentExt;
use syn::parse::{Parse, ParseStream};
use syn::{Data, DeriveInput, Fields, LitStr, Result};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Kind {
    Text,
    Int,
    Float,
    Bool,
    Any,
}

impl Kind {
    fn parse_lit(lit: &LitStr) -> Result<Self> {
        match lit.value().as_str() {
            "text" => Ok(Kind::Text),
            "int" => Ok(Kind::Int),
            "float" => Ok(Kind::Float),
            "bool" => Ok(Kind::Bool),
            "any" => Ok(Kind::Any),
            other => Err(syn::Error::new(
                lit.span(),
                format!("unknown kind `{other}`, expected one of: text, int, float, bool, any"),
            )),
        }
    }

    /// Infer the kind from a field type, looking through `Option` and references.
    fn infer(ty: &syn::Type) -> Self {
        let Some(ident) = value_ident(ty) else {
            return Kind::Any;
        };
        match ident.to_string().as_str() {
            "i8" | "i16" | "i32" | "i64" | "i128" | "isize" | "u8" | "u16" | "u32" | "u64"
            | "u128" | "usize" => Kind::Int,
            "f32" | "f64" => Kind::Float,
            "bool" => Kind::Bool,
            "String" | "str" => Kind::Text,
            _ => Kind::Any,
        }
    }

    fn to_tokens(self) -> TokenStream {
        match self {
            Kind::Text => quote!(::pgfilter::FieldKind::Text),
            Kind::Int => quote!(::pgfilter::FieldKind::Int),
            Kind::Float => quote!(::pgfilter::FieldKind::Float),
            Kind::Bool => quote!(::pgfilter::FieldKind::Bool),
            Kind::Any => quote!(::pgfilter::FieldKind::Any),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum RenameRule {
    Lower,
    Upper,
    Snake,
    Camel,
    Pascal,
    Kebab,
    ScreamingSnake,
}

impl RenameRule {
    fn parse_lit(lit: &LitStr) -> Result<Self> {
        match lit.value().as_str() {
            "lowercase" => Ok(RenameRule::Lower),
            "UPPERCASE" => Ok(RenameRule::Upper),
            "snake_case" => Ok(RenameRule::Snake),
            "camelCase" => Ok(RenameRule::Camel),
            "PascalCase" => Ok(RenameRule::Pascal),
            "kebab-case" => Ok(RenameRule::Kebab),
            "SCREAMING_SNAKE_CASE" => Ok(RenameRule::ScreamingSnake),
            other => Err(syn::Error::new(
                lit.span(),
                format!("unknown rename_all rule `{other}`"),
            )),
        }
    }

    fn apply(self, name: &str) -> String {
        match self {
            RenameRule::Lower => name.to_lowercase(),
            RenameRule::Upper => name.to_uppercase(),
            RenameRule::Snake => name.to_snake_case(),
            RenameRule::Camel => name.to_lower_camel_case(),
            RenameRule::Pascal => name.to_upper_camel_case(),
            RenameRule::Kebab => name.to_kebab_case(),
            RenameRule::ScreamingSnake => name.to_shouty_snake_case(),
        }
    }
}

/// Parses `key = "value"` pairs, rejecting unknown and repeated keys.
fn parse_pairs(
    input: ParseStream,
    allowed: &[&str],
    mut visit: impl FnMut(&str, LitStr) -> Result<()>,
) -> Result<()> {
    let mut seen: Vec<String> = Vec::new();
    while !input.is_empty() {
        let key = syn::Ident::parse_any(input)?;
        let name = key.unraw().to_string();
        if !allowed.contains(&name.as_str()) {
            return Err(syn::Error::new(
                key.span(),
                format!(
                    "unknown filter attribute `{name}`, expected one of: {}",
                    allowed.join(", ")
                ),
            ));
        }
        if seen.contains(&name) {
            return Err(syn::Error::new(
                key.span(),
                format!("duplicate filter attribute `{name}`"),
            ));
        }

        let _: syn::Token![=] = input.parse()?;
        let value: LitStr = input.parse()?;
        visit(&name, value)?;
        seen.push(name);

        if input.peek(syn::Token![,]) {
            let _: syn::Token![,] = input.parse()?;
        } else {
            break;
        }
    }
    if !input.is_empty() {
        return Err(input.error("expected `,`"));
    }
    Ok(())
}

/// Field-level `#[filter(...)]`.
#[derive(Default)]
struct FieldAttr {
    column: Option<String>,
    expose: Option<String>,
    kind: Option<Kind>,
}

impl Parse for FieldAttr {
    fn parse(input: ParseStream) -> Result<Self> {
        let mut attr = FieldAttr::default();
        parse_pairs(input, &["column", "expose", "kind"], |key, value| {
            match key {
                "column" => attr.column = Some(value.value()),
                "expose" => attr.expose = Some(value.value()),
                _ => attr.kind = Some(Kind::parse_lit(&value)?),
            }
            Ok(())
        })?;
        Ok(attr)
    }
}

/// Struct-level `#[filter(...)]`.
#[derive(Default)]
struct StructAttr {
    rename_all: Option<RenameRule>,
}

impl Parse for StructAttr {
    fn parse(input: ParseStream) -> Result<Self> {
        let mut attr = StructAttr::default();
        parse_pairs(input, &["rename_all"], |_, value| {
            attr.rename_all = Some(RenameRule::parse_lit(&value)?);
            Ok(())
        })?;
        Ok(attr)
    }
}

fn filter_attrs<T: Parse + Default>(attrs: &[syn::Attribute]) -> Result<T> {
    let mut found = None;
    for attr in attrs.iter().filter(|a| a.path().is_ident("filter")) {
        if found.is_some() {
            return Err(syn::Error::new_spanned(
                attr,
                "combine filter options into a single #[filter(...)] attribute",
            ));
        }
        found = Some(attr.parse_args::<T>()?);
    }
    Ok(found.unwrap_or_default())
}

pub fn expand(input: DeriveInput) -> Result<TokenStream> {
    let name = &input.ident;
    let (impl_generics, ty_generics, where_clause) = input.generics.split_for_impl();
    let struct_attr: StructAttr = filter_attrs(&input.attrs)?;

    let mut fields = Vec::new();
    if let Data::Struct(data) = &input.data
        && let Fields::Named(named) = &data.fields
    {
        for field in &named.named {
            let attr: FieldAttr = filter_attrs(&field.attrs)?;
            let Some(ident) = &field.ident else {
                continue;
            };
            let field_name = ident.unraw().to_string();

            let column = attr.column.map(|column| quote!(.column(#column)));
            let expose = attr
                .expose
                .or_else(|| struct_attr.rename_all.map(|rule| rule.apply(&field_name)))
                .map(|expose| quote!(.expose(#expose)));
            let kind = attr
                .kind
                .unwrap_or_else(|| Kind::infer(&field.ty))
                .to_tokens();

            fields.push(quote! {
                ::pgfilter::FieldDescriptor::new(#field_name)
                    #column
                    #expose
                    .kind(#kind)
            });
        }
    }

    Ok(quote! {
        impl #impl_generics ::pgfilter::FilterModel for #name #ty_generics #where_clause {
            fn descriptor() -> ::pgfilter::ModelDescriptor {
                ::pgfilter::ModelDescriptor::new()
                    #(.field(#fields))*
            }
        }
    })
}
