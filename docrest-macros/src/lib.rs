//! Procedural macros for the docrest project.
//!
//! Provides `#[derive(Model)]`, which describes where a resource's documents
//! live:
//!
//! ```ignore
//! #[derive(Model)]
//! #[model(name = "Person", collection = "people", database = "crm")]
//! pub struct Person;
//! ```
//!
//! `name` defaults to the type name, `collection` to the lowercased type name,
//! and `database` to none (the manager configuration must then supply one).

#[allow(unused_extern_crates)]
extern crate self as docrest_macros;

use proc_macro::TokenStream;
use quote::quote;
use syn::{DeriveInput, LitStr, parse_macro_input};

#[proc_macro_derive(Model, attributes(model))]
pub fn derive_model(input: TokenStream) -> TokenStream {
    let input = parse_macro_input!(input as DeriveInput);

    match expand_model(&input) {
        Ok(expanded) => expanded.into(),
        Err(err) => err.to_compile_error().into(),
    }
}

#[derive(Default)]
struct ModelArgs {
    name: Option<String>,
    collection: Option<String>,
    database: Option<String>,
}

fn parse_model_args(input: &DeriveInput) -> syn::Result<ModelArgs> {
    let mut args = ModelArgs::default();

    for attr in input.attrs.iter().filter(|attr| attr.path().is_ident("model")) {
        attr.parse_nested_meta(|meta| {
            let slot = if meta.path.is_ident("name") {
                &mut args.name
            } else if meta.path.is_ident("collection") {
                &mut args.collection
            } else if meta.path.is_ident("database") {
                &mut args.database
            } else {
                return Err(meta.error("expected `name`, `collection` or `database`"));
            };

            let value: LitStr = meta.value()?.parse()?;
            if value.value().is_empty() {
                return Err(syn::Error::new(value.span(), "model attribute values must not be empty"));
            }

            *slot = Some(value.value());
            Ok(())
        })?;
    }

    Ok(args)
}

fn expand_model(input: &DeriveInput) -> syn::Result<proc_macro2::TokenStream> {
    let ident = &input.ident;
    let args = parse_model_args(input)?;

    let name = args.name.unwrap_or_else(|| ident.to_string());
    let collection = args.collection.unwrap_or_else(|| ident.to_string().to_lowercase());
    let database = match args.database {
        Some(database) => quote! { ::core::option::Option::Some(#database) },
        None => quote! { ::core::option::Option::None },
    };

    let (impl_generics, ty_generics, where_clause) = input.generics.split_for_impl();

    Ok(quote! {
        impl #impl_generics ::docrest::model::Model for #ident #ty_generics #where_clause {
            fn model_name() -> &'static str {
                #name
            }

            fn collection_name() -> &'static str {
                #collection
            }

            fn database_name() -> ::core::option::Option<&'static str> {
                #database
            }
        }
    })
}
