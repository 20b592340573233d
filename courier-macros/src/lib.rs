use proc_macro::TokenStream;
use quote::quote;
use syn::{DeriveInput, parse_macro_input};

mod message;

/// Derive macro for implementing `Message`.
///
/// Mark a field of type `Envelope` with `#[envelope]` to expose it through
/// `Message::envelope`.
#[proc_macro_derive(Message, attributes(envelope))]
pub fn derive_message(input: TokenStream) -> TokenStream {
    let input = parse_macro_input!(input as DeriveInput);

    message::impl_message(&input)
        .unwrap_or_else(syn::Error::into_compile_error)
        .into()
}

/// Derive macro for implementing `Message` and `Event`.
#[proc_macro_derive(Event, attributes(envelope))]
pub fn derive_event(input: TokenStream) -> TokenStream {
    let input = parse_macro_input!(input as DeriveInput);
    let name = &input.ident;
    let (impl_generics, ty_generics, where_clause) = input.generics.split_for_impl();

    let message = match message::impl_message(&input) {
        Ok(tokens) => tokens,
        Err(err) => return err.into_compile_error().into(),
    };

    let expanded = quote! {
        #message

        impl #impl_generics ::courier::Event for #name #ty_generics #where_clause {}
    };

    TokenStream::from(expanded)
}

/// Derive macro for implementing `Message` and `Command`.
///
/// The result type is given with `#[command(output = T)]` and defaults to
/// `()` for commands without a result.
///
/// ```rust,ignore
/// #[derive(Command)]
/// #[command(output = Uuid)]
/// struct RegisterUser {
///     email: String,
///     password: String,
/// }
/// ```
#[proc_macro_derive(Command, attributes(command, envelope))]
pub fn derive_command(input: TokenStream) -> TokenStream {
    let input = parse_macro_input!(input as DeriveInput);
    let name = &input.ident;
    let (impl_generics, ty_generics, where_clause) = input.generics.split_for_impl();

    let (message, output) = match message::impl_message(&input)
        .and_then(|m| Ok((m, message::output_type(&input, "command")?)))
    {
        Ok(parts) => parts,
        Err(err) => return err.into_compile_error().into(),
    };
    let output = output.map_or_else(|| quote!(()), |ty| quote!(#ty));

    let expanded = quote! {
        #message

        impl #impl_generics ::courier::Command for #name #ty_generics #where_clause {
            type Output = #output;
        }
    };

    TokenStream::from(expanded)
}

/// Derive macro for implementing `Message` and `Query`.
///
/// The result type is required: `#[query(output = T)]`.
#[proc_macro_derive(Query, attributes(query, envelope))]
pub fn derive_query(input: TokenStream) -> TokenStream {
    let input = parse_macro_input!(input as DeriveInput);
    let name = &input.ident;
    let (impl_generics, ty_generics, where_clause) = input.generics.split_for_impl();

    let (message, output) = match message::impl_message(&input)
        .and_then(|m| Ok((m, message::output_type(&input, "query")?)))
    {
        Ok(parts) => parts,
        Err(err) => return err.into_compile_error().into(),
    };
    let Some(output) = output else {
        return syn::Error::new_spanned(name, "queries must declare `#[query(output = T)]`")
            .to_compile_error()
            .into();
    };

    let expanded = quote! {
        #message

        impl #impl_generics ::courier::Query for #name #ty_generics #where_clause {
            type Output = #output;
        }
    };

    TokenStream::from(expanded)
}
