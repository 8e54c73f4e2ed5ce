// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

extern crate proc_macro;

use proc_macro::TokenStream;
use proc_macro2::Span;
use quote::{format_ident, quote};
use syn::ext::IdentExt;
use syn::{parse_macro_input, Data, DataEnum, DataStruct, DeriveInput, Fields, Ident};

/// `#[derive(Flat)]` macro: generates the type model and field accessors
/// used by the `flatwire` serializer.
///
/// Supports:
/// - Structs with named fields, encoded as tables (default, or
///   `#[flat(table)]`) or as fixed structs (`#[flat(fixed)]`)
/// - Fieldless enums, encoded as their `#[repr]` integer (`i32` if none)
///
/// Field attributes:
/// - `#[flat(id = N)]`: explicit vtable slot (all fields or none)
/// - `#[flat(default = expr)]`: schema default of a scalar field
///
/// Structs must implement `Default`; decoding starts from the default value
/// and assigns each field.
///
/// Example:
/// ```ignore
/// use flatwire::Flat;
///
/// #[derive(Default, Flat)]
/// struct Monster {
///     #[flat(default = 150)]
///     mana: i16,
///     name: Option<String>,
///     inventory: Vec<u8>,
/// }
/// ```
#[proc_macro_derive(Flat, attributes(flat))]
pub fn derive_flat(input: TokenStream) -> TokenStream {
    let input = parse_macro_input!(input as DeriveInput);

    if !input.generics.params.is_empty() {
        return syn::Error::new_spanned(&input.generics, "Flat cannot be derived for generic types")
            .to_compile_error()
            .into();
    }

    let expanded = match &input.data {
        Data::Struct(data) => derive_struct(&input, data),
        Data::Enum(data) => derive_enum(&input, data),
        Data::Union(_) => Err(syn::Error::new_spanned(
            &input.ident,
            "Flat cannot be derived for unions",
        )),
    };
    expanded.unwrap_or_else(syn::Error::into_compile_error).into()
}

struct FieldInfo {
    ident: Ident,
    ty: syn::Type,
    id: Option<usize>,
    default: Option<syn::Expr>,
}

fn derive_struct(input: &DeriveInput, data: &DataStruct) -> syn::Result<proc_macro2::TokenStream> {
    let name = &input.ident;
    let name_str = name.to_string();
    let fixed = parse_container_kind(input)?;

    let Fields::Named(named) = &data.fields else {
        return Err(syn::Error::new_spanned(
            name,
            "Flat can only be derived for structs with named fields",
        ));
    };

    let mut fields = Vec::with_capacity(named.named.len());
    for field in &named.named {
        let Some(ident) = field.ident.clone() else {
            return Err(syn::Error::new_spanned(field, "Field must have a name"));
        };
        let (id, default) = parse_field_attrs(field)?;
        if fixed && id.is_some() {
            return Err(syn::Error::new_spanned(
                field,
                "fixed struct fields cannot carry an id",
            ));
        }
        fields.push(FieldInfo {
            ident,
            ty: field.ty.clone(),
            id,
            default,
        });
    }

    let accessors = fields.iter().map(|f| {
        let ident = &f.ident;
        let ty = &f.ty;
        let get = format_ident!("__flat_get_{}", ident);
        let set = format_ident!("__flat_set_{}", ident);
        quote! {
            fn #get<'a>(
                container: &'a dyn ::core::any::Any,
            ) -> ::core::option::Option<::flatwire::Value<'a>> {
                container
                    .downcast_ref::<#name>()
                    .map(|c| ::flatwire::Flat::as_value(&c.#ident))
            }

            fn #set(
                container: &mut dyn ::core::any::Any,
                value: ::flatwire::OwnedValue,
            ) -> ::core::result::Result<(), ::flatwire::DecodeError> {
                let ::core::option::Option::Some(container) = container.downcast_mut::<#name>() else {
                    return ::core::result::Result::Err(
                        ::flatwire::DecodeError::ContainerMismatch { expected: #name_str },
                    );
                };
                container.#ident = <#ty as ::flatwire::Flat>::from_value(value)?;
                ::core::result::Result::Ok(())
            }
        }
    });

    // Defaults are evaluated against the field type so literals infer it.
    let defaults = fields.iter().filter_map(|f| {
        let expr = f.default.as_ref()?;
        let ty = &f.ty;
        let binding = format_ident!("__flat_default_{}", f.ident);
        Some(quote! { let #binding: #ty = #expr; })
    });

    let specs = fields.iter().map(|f| {
        let ident = &f.ident;
        let ty = &f.ty;
        let field_name = ident.unraw().to_string();
        let get = format_ident!("__flat_get_{}", ident);
        let set = format_ident!("__flat_set_{}", ident);
        let id = f.id.map(|id| quote! { .id(#id) });
        let default = f.default.as_ref().map(|_| {
            let binding = format_ident!("__flat_default_{}", ident);
            quote! { .default_value(::flatwire::Flat::as_value(&#binding)) }
        });
        quote! {
            .field(
                ::flatwire::FieldSpec::new(
                    #field_name,
                    cx.resolve::<#ty>()?,
                    ::flatwire::FieldAccessor::new(#get, #set),
                )
                .nullable(<#ty as ::flatwire::Flat>::NULLABLE)
                #id
                #default
            )
        }
    });

    let kind = if fixed {
        Ident::new("fixed", Span::call_site())
    } else {
        Ident::new("table", Span::call_site())
    };

    Ok(quote! {
        impl ::flatwire::Flat for #name {
            fn type_model(
                cx: &mut ::flatwire::ModelContext<'_>,
            ) -> ::core::result::Result<::std::sync::Arc<::flatwire::TypeModel>, ::flatwire::ModelError> {
                #(#accessors)*
                #(#defaults)*
                let model = ::flatwire::StructDefBuilder::#kind(#name_str)
                    #(#specs)*
                    .build()?;
                ::core::result::Result::Ok(::std::sync::Arc::new(model))
            }

            fn as_value(&self) -> ::flatwire::Value<'_> {
                ::flatwire::Value::Object(self)
            }

            fn from_value(
                value: ::flatwire::OwnedValue,
            ) -> ::core::result::Result<Self, ::flatwire::DecodeError> {
                ::flatwire::decode_object::<Self>(value)
            }
        }
    })
}

/// `true` for `#[flat(fixed)]`, `false` for tables.
fn parse_container_kind(input: &DeriveInput) -> syn::Result<bool> {
    let mut fixed = false;
    for attr in input.attrs.iter().filter(|a| a.path().is_ident("flat")) {
        attr.parse_nested_meta(|meta| {
            if meta.path.is_ident("table") {
                fixed = false;
                Ok(())
            } else if meta.path.is_ident("fixed") {
                fixed = true;
                Ok(())
            } else {
                Err(meta.error("expected `table` or `fixed`"))
            }
        })?;
    }
    Ok(fixed)
}

fn parse_field_attrs(field: &syn::Field) -> syn::Result<(Option<usize>, Option<syn::Expr>)> {
    let mut id = None;
    let mut default = None;
    for attr in field.attrs.iter().filter(|a| a.path().is_ident("flat")) {
        attr.parse_nested_meta(|meta| {
            if meta.path.is_ident("id") {
                let lit: syn::LitInt = meta.value()?.parse()?;
                id = Some(lit.base10_parse::<usize>()?);
                Ok(())
            } else if meta.path.is_ident("default") {
                default = Some(meta.value()?.parse::<syn::Expr>()?);
                Ok(())
            } else {
                Err(meta.error("expected `id = N` or `default = expr`"))
            }
        })?;
    }
    Ok((id, default))
}

fn derive_enum(input: &DeriveInput, data: &DataEnum) -> syn::Result<proc_macro2::TokenStream> {
    let name = &input.ident;
    let name_str = name.to_string();

    if data.variants.is_empty() {
        return Err(syn::Error::new_spanned(
            name,
            "Flat cannot be derived for enums without variants",
        ));
    }
    if let Some(v) = data.variants.iter().find(|v| !matches!(v.fields, Fields::Unit)) {
        return Err(syn::Error::new_spanned(
            v,
            "Flat enums must be fieldless",
        ));
    }

    let repr = parse_repr(input)?;
    let Some(scalar) = scalar_variant(&repr) else {
        return Err(syn::Error::new_spanned(
            &repr,
            "Flat enums need an integer repr of at most 64 bits",
        ));
    };

    let variants: Vec<_> = data.variants.iter().map(|v| &v.ident).collect();

    Ok(quote! {
        impl ::flatwire::Flat for #name {
            fn type_model(
                _cx: &mut ::flatwire::ModelContext<'_>,
            ) -> ::core::result::Result<::std::sync::Arc<::flatwire::TypeModel>, ::flatwire::ModelError> {
                let model = ::flatwire::TypeModel::scalar(::flatwire::BaseType::#scalar)?
                    .with_name(#name_str);
                ::core::result::Result::Ok(::std::sync::Arc::new(model))
            }

            fn as_value(&self) -> ::flatwire::Value<'_> {
                let raw = match self {
                    #(Self::#variants => Self::#variants as #repr,)*
                };
                ::flatwire::Value::Scalar(::flatwire::Scalar::#scalar(raw))
            }

            fn from_value(
                value: ::flatwire::OwnedValue,
            ) -> ::core::result::Result<Self, ::flatwire::DecodeError> {
                let raw = match value {
                    ::flatwire::OwnedValue::Scalar(::flatwire::Scalar::#scalar(raw)) => raw,
                    other => return ::core::result::Result::Err(
                        ::flatwire::DecodeError::mismatch(#name_str, &other),
                    ),
                };
                #(
                    if raw == Self::#variants as #repr {
                        return ::core::result::Result::Ok(Self::#variants);
                    }
                )*
                ::core::result::Result::Err(::flatwire::DecodeError::UnknownEnumValue {
                    type_name: #name_str,
                    value: raw as i64,
                })
            }
        }
    })
}

/// Integer type named by `#[repr(..)]`, or `i32`.
fn parse_repr(input: &DeriveInput) -> syn::Result<Ident> {
    let mut repr = None;
    for attr in input.attrs.iter().filter(|a| a.path().is_ident("repr")) {
        attr.parse_nested_meta(|meta| {
            if let Some(ident) = meta.path.get_ident() {
                if scalar_variant(ident).is_some() {
                    repr = Some(ident.clone());
                }
            }
            // skip arguments such as `align(4)`
            if meta.input.peek(syn::token::Paren) {
                let _args;
                syn::parenthesized!(_args in meta.input);
            }
            Ok(())
        })?;
    }
    Ok(repr.unwrap_or_else(|| Ident::new("i32", Span::call_site())))
}

/// `Scalar`/`BaseType` variant for an integer repr.
fn scalar_variant(repr: &Ident) -> Option<Ident> {
    let variant = match repr.to_string().as_str() {
        "i8" => "Char",
        "u8" => "UChar",
        "i16" => "Short",
        "u16" => "UShort",
        "i32" => "Int",
        "u32" => "UInt",
        "i64" => "Long",
        "u64" => "ULong",
        _ => return None,
    };
    Some(Ident::new(variant, repr.span()))
}
