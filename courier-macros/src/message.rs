//! Shared expansion for the message derives.

use proc_macro2::TokenStream;
use quote::quote;
use syn::{Data, DeriveInput, Fields, Index, Member, Type};

/// Find the field marked `#[envelope]`, if any.
fn envelope_field(input: &DeriveInput) -> syn::Result<Option<Member>> {
    let fields = match &input.data {
        Data::Struct(data) => &data.fields,
        _ => return Ok(None),
    };

    let mut found = None;
    for (index, field) in fields.iter().enumerate() {
        let Some(attr) = field.attrs.iter().find(|a| a.path().is_ident("envelope")) else {
            continue;
        };
        if found.is_some() {
            return Err(syn::Error::new_spanned(
                attr,
                "only one field can be marked `#[envelope]`",
            ));
        }
        found = Some(match (&field.ident, fields) {
            (Some(ident), Fields::Named(_)) => Member::Named(ident.clone()),
            _ => Member::Unnamed(Index::from(index)),
        });
    }
    Ok(found)
}

/// `impl Message for T`, wiring `envelope()` to a marked field.
pub(crate) fn impl_message(input: &DeriveInput) -> syn::Result<TokenStream> {
    let name = &input.ident;
    let (impl_generics, ty_generics, where_clause) = input.generics.split_for_impl();

    let envelope = envelope_field(input)?.map(|member| {
        quote! {
            fn envelope(&self) -> ::core::option::Option<&::courier::Envelope> {
                ::core::option::Option::Some(&self.#member)
            }
        }
    });

    Ok(quote! {
        impl #impl_generics ::courier::Message for #name #ty_generics #where_clause {
            #envelope
        }
    })
}

/// Read `output = T` from `#[<attr>(...)]`.
pub(crate) fn output_type(input: &DeriveInput, attr: &str) -> syn::Result<Option<Type>> {
    let mut output = None;
    for a in input.attrs.iter().filter(|a| a.path().is_ident(attr)) {
        a.parse_nested_meta(|meta| {
            if meta.path.is_ident("output") {
                output = Some(meta.value()?.parse::<Type>()?);
                Ok(())
            } else {
                Err(meta.error(format!("unsupported `{attr}` attribute, expected `output = T`")))
            }
        })?;
    }
    Ok(output)
}
