use darling::{FromDeriveInput, ast};
use proc_macro2::TokenStream;
use quote::quote;
use syn::{DeriveInput, Field, GenericArgument, Ident, LitStr, Meta, PathArguments, Type};

#[derive(FromDeriveInput)]
#[darling(attributes(component), supports(struct_named, struct_unit))]
struct ComponentArgs {
    ident: Ident,
    generics: syn::Generics,
    data: ast::Data<(), Field>,
    #[darling(default)]
    name: Option<String>,
    #[darling(default)]
    prototype: bool,
    #[darling(default)]
    init: Option<String>,
}

/// One `#[autowired]` field.
struct Autowired<'a> {
    field: &'a Ident,
    dependency: String,
    bean_type: &'a Type,
}

pub(crate) fn expand(input: &DeriveInput) -> darling::Result<TokenStream> {
    let args = ComponentArgs::from_derive_input(input)?;

    if !args.generics.params.is_empty() {
        return Err(darling::Error::custom("#[derive(Component)] does not support generic types")
            .with_span(&args.generics));
    }

    let ident = &args.ident;
    let bean_name = args.name.clone().unwrap_or_else(|| lower_camel(&ident.to_string()));

    let fields = args
        .data
        .as_ref()
        .take_struct()
        .map(|fields| fields.fields)
        .unwrap_or_default();

    let mut errors = darling::Error::accumulator();
    let autowired: Vec<Autowired<'_>> = fields
        .into_iter()
        .filter_map(|field| errors.handle(autowired(field)).flatten())
        .collect();

    let init = args
        .init
        .as_deref()
        .map(|method| errors.handle(syn::parse_str::<Ident>(method).map_err(darling::Error::from)))
        .flatten();
    errors.finish()?;

    let injections = autowired.iter().map(|a| {
        let field = a.field;
        let attribute = field.to_string();
        let dependency = &a.dependency;
        let bean_type = a.bean_type;
        quote! {
            .inject_named(
                #attribute,
                #dependency,
                |bean: &mut Self, dependency: ::std::sync::Arc<#bean_type>| {
                    bean.#field = ::core::option::Option::Some(dependency);
                },
            )
        }
    });

    let (routine, with_init) = match &init {
        Some(method) => {
            let method_name = method.to_string();
            (
                quote! { .method(#method_name, |bean: &mut Self| bean.#method()) },
                quote! { .with_init_method(#method_name) },
            )
        }
        None => (TokenStream::new(), TokenStream::new()),
    };

    let scope = if args.prototype {
        quote! { ::beanbox::Scope::Prototype }
    } else {
        quote! { ::beanbox::Scope::Singleton }
    };

    Ok(quote! {
        impl ::beanbox::BeanComponent for #ident {
            const BEAN_NAME: &'static str = #bean_name;

            fn bean_definition() -> ::beanbox::BeanDefinition {
                let class = ::beanbox::BeanClass::builder::<Self>()
                    .constructor(<Self as ::core::default::Default>::default)
                    #(#injections)*
                    #routine
                    .build();
                ::beanbox::BeanDefinition::new(class)
                    .with_scope(#scope)
                    #with_init
            }
        }

        ::beanbox::inventory::submit! {
            ::beanbox::Component::new(
                <#ident as ::beanbox::BeanComponent>::BEAN_NAME,
                ::core::module_path!(),
                <#ident as ::beanbox::BeanComponent>::bean_definition,
            )
        }
    })
}

/// Parses the field's `#[autowired]` attribute, if any.
fn autowired(field: &Field) -> darling::Result<Option<Autowired<'_>>> {
    let Some(attr) = field.attrs.iter().find(|a| a.path().is_ident("autowired")) else {
        return Ok(None);
    };

    let Some(ident) = field.ident.as_ref() else {
        return Err(darling::Error::custom("#[autowired] requires a named field").with_span(field));
    };

    let mut name = None;
    match &attr.meta {
        Meta::Path(_) => {}
        Meta::List(_) => attr.parse_nested_meta(|meta| {
            if meta.path.is_ident("name") {
                let value: LitStr = meta.value()?.parse()?;
                name = Some(value.value());
                Ok(())
            } else {
                Err(meta.error("unsupported #[autowired] option, expected `name = \"...\"`"))
            }
        })?,
        Meta::NameValue(_) => {
            return Err(darling::Error::custom("expected #[autowired] or #[autowired(name = \"...\")]")
                .with_span(attr));
        }
    }

    let bean_type = option_arc_inner(&field.ty).ok_or_else(|| {
        darling::Error::custom("#[autowired] fields must have type Option<Arc<T>>").with_span(&field.ty)
    })?;

    Ok(Some(Autowired {
        field: ident,
        dependency: name.unwrap_or_else(|| lower_camel(&ident.to_string())),
        bean_type,
    }))
}

/// `Option<Arc<T>>` → `T`.
fn option_arc_inner(ty: &Type) -> Option<&Type> {
    single_generic_arg(ty, "Option").and_then(|arc| single_generic_arg(arc, "Arc"))
}

fn single_generic_arg<'a>(ty: &'a Type, wrapper: &str) -> Option<&'a Type> {
    let Type::Path(path) = ty else {
        return None;
    };
    let segment = path.path.segments.last()?;
    if segment.ident != wrapper {
        return None;
    }
    let PathArguments::AngleBracketed(args) = &segment.arguments else {
        return None;
    };
    match (args.args.len(), args.args.first()) {
        (1, Some(GenericArgument::Type(inner))) => Some(inner),
        _ => None,
    }
}

/// `UserService` → `userService`, `user_repository` → `userRepository`.
///
/// Names opening with two capitals are kept as written (`HTTPClient`).
fn lower_camel(name: &str) -> String {
    let name = name.trim_start_matches("r#");
    let mut leading = name.chars();
    if let (Some(first), Some(second)) = (leading.next(), leading.next()) {
        if first.is_uppercase() && second.is_uppercase() {
            return name.to_string();
        }
    }

    let mut out = String::with_capacity(name.len());
    let mut upper_next = false;
    for (i, c) in name.chars().enumerate() {
        if c == '_' {
            upper_next = !out.is_empty();
        } else if i == 0 || out.is_empty() {
            out.extend(c.to_lowercase());
        } else if upper_next {
            out.extend(c.to_uppercase());
            upper_next = false;
        } else {
            out.push(c);
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use syn::parse_quote;

    #[test]
    fn lower_camel_names() {
        assert_eq!(lower_camel("UserService"), "userService");
        assert_eq!(lower_camel("user_repository"), "userRepository");
        assert_eq!(lower_camel("repo"), "repo");
        assert_eq!(lower_camel("_private_field"), "privateField");
        assert_eq!(lower_camel("Db"), "db");
    }

    #[test]
    fn leading_acronyms_are_kept() {
        assert_eq!(lower_camel("HTTPClient"), "HTTPClient");
        assert_eq!(lower_camel("URL"), "URL");
        assert_eq!(lower_camel("X"), "x");
        assert_eq!(lower_camel("http_client"), "httpClient");
    }

    #[test]
    fn extracts_option_arc_inner_type() {
        let ty: Type = parse_quote!(Option<std::sync::Arc<UserRepository>>);
        let expected: Type = parse_quote!(UserRepository);
        assert_eq!(option_arc_inner(&ty), Some(&expected));

        let bare: Type = parse_quote!(Arc<UserRepository>);
        assert!(option_arc_inner(&bare).is_none());
    }

    #[test]
    fn expands_definition_and_registration() {
        let input: DeriveInput = parse_quote! {
            #[component(prototype, init = "start")]
            struct UserService {
                #[autowired]
                user_repository: Option<Arc<UserRepository>>,
                #[autowired(name = "auditLog")]
                audit: Option<Arc<AuditLog>>,
                ready: bool,
            }
        };

        let output = expand(&input).unwrap().to_string();
        assert!(output.contains("\"userService\""));
        assert!(output.contains("\"userRepository\""));
        assert!(output.contains("\"auditLog\""));
        assert!(output.contains("Scope :: Prototype"));
        assert!(output.contains("with_init_method (\"start\")"));
        assert!(output.contains("inventory :: submit"));
        assert!(output.contains("BeanComponent > :: BEAN_NAME"));
        assert!(!output.contains("ready"));
    }

    #[test]
    fn explicit_name_wins() {
        let input: DeriveInput = parse_quote! {
            #[component(name = "repo")]
            struct UserRepository;
        };
        let output = expand(&input).unwrap().to_string();
        assert!(output.contains("\"repo\""));
        assert!(!output.contains("\"userRepository\""));
        assert!(output.contains("Scope :: Singleton"));
    }

    #[test]
    fn rejects_tuple_structs() {
        let input: DeriveInput = parse_quote! {
            struct Wrapper(u32);
        };
        assert!(expand(&input).is_err());
    }

    #[test]
    fn rejects_non_arc_autowired_field() {
        let input: DeriveInput = parse_quote! {
            struct UserService {
                #[autowired]
                repository: UserRepository,
            }
        };
        let err = expand(&input).unwrap_err();
        assert!(err.to_string().contains("Option<Arc<T>>"));
    }

    #[test]
    fn rejects_generics() {
        let input: DeriveInput = parse_quote! {
            struct Holder<T> {
                value: T,
            }
        };
        assert!(expand(&input).is_err());
    }
}
