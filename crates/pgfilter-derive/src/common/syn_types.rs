//! Type helper utilities for syn type analysis.

/// Extract the inner type T from Option<T>, or return None if not an Option type.
///
/// Recognizes `Option<T>`, `std::option::Option<T>`, and `core::option::Option<T>`.
pub fn option_inner(ty: &syn::Type) -> Option<&syn::Type> {
    let syn::Type::Path(type_path) = ty else {
        return None;
    };
    let seg = type_path.path.segments.last()?;
    if seg.ident != "Option" {
        return None;
    }
    let syn::PathArguments::AngleBracketed(args) = &seg.arguments else {
        return None;
    };
    if args.args.len() != 1 {
        return None;
    }
    let syn::GenericArgument::Type(inner) = args.args.first()? else {
        return None;
    };
    Some(inner)
}

/// Peel references and parentheses: `&'a T`, `&mut T`, `(T)` all become `T`.
pub fn strip_reference(mut ty: &syn::Type) -> &syn::Type {
    loop {
        match ty {
            syn::Type::Reference(r) => ty = &*r.elem,
            syn::Type::Paren(p) => ty = &*p.elem,
            syn::Type::Group(g) => ty = &*g.elem,
            _ => return ty,
        }
    }
}

/// The last path segment of a type, after unwrapping `Option` and references.
///
/// `Option<&'a str>` gives `str`, `std::string::String` gives `String`.
pub fn value_ident(ty: &syn::Type) -> Option<&syn::Ident> {
    let ty = strip_reference(ty);
    let ty = option_inner(ty).map(strip_reference).unwrap_or(ty);
    let syn::Type::Path(type_path) = ty else {
        return None;
    };
    if type_path.qself.is_some() {
        return None;
    }
    type_path.path.segments.last().map(|seg| &seg.ident)
}

#[cfg(test)]
mod tests {
    use super::*;
    use syn::parse_quote;

    #[test]
    fn test_option_inner() {
        let ty: syn::Type = parse_quote!(Option<String>);
        assert!(option_inner(&ty).is_some());

        let ty: syn::Type = parse_quote!(std::option::Option<i32>);
        assert!(option_inner(&ty).is_some());

        let ty: syn::Type = parse_quote!(String);
        assert!(option_inner(&ty).is_none());

        let ty: syn::Type = parse_quote!(Vec<String>);
        assert!(option_inner(&ty).is_none());
    }

    #[test]
    fn test_value_ident() {
        let ident = |ty: syn::Type| value_ident(&ty).map(|i| i.to_string());

        assert_eq!(ident(parse_quote!(i64)).as_deref(), Some("i64"));
        assert_eq!(ident(parse_quote!(Option<f32>)).as_deref(), Some("f32"));
        assert_eq!(ident(parse_quote!(&'static str)).as_deref(), Some("str"));
        assert_eq!(ident(parse_quote!(Option<&'a str>)).as_deref(), Some("str"));
        assert_eq!(
            ident(parse_quote!(std::string::String)).as_deref(),
            Some("String")
        );
        assert_eq!(ident(parse_quote!((i32, i32))), None);
        assert_eq!(ident(parse_quote!(<T as Trait>::Assoc)), None);
    }
}
