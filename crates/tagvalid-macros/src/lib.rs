//! Procedural macros for tagvalid
//!
//! This crate provides `#[derive(Record)]`, which turns field attributes
//! into the runtime field table walked by `tagvalid::Validation`:
//!
//! - `#[valid("Required;Min(3)")]` - rule tag
//! - `#[label("年龄")]` - label used in messages
//! - `#[serde(rename = "...")]` - external name; without one the field
//!   identifier is used
//! - `#[serde(flatten)]` - no external name, the nested record's fields are
//!   validated as if they were declared inline
//! - `#[serde(skip)]` or `#[record(skip)]` - field is left out
//! - `#[record(hook = "method")]` on the struct - cross-field checks run by
//!   `Record::valid`

use proc_macro::TokenStream;
use proc_macro2::TokenStream as TokenStream2;
use quote::quote;
use syn::meta::ParseNestedMeta;
use syn::{parse_macro_input, Data, DeriveInput, Fields, LitStr, Token};

/// Derive `tagvalid::Record` and `tagvalid::ToValue`.
///
/// # Example
///
/// ```rust,ignore
/// use tagvalid::Record;
///
/// #[derive(Record)]
/// #[record(hook = "check_passwords")]
/// struct SignUp {
///     #[valid("Required;MinSize(8)")]
///     #[label("密码")]
///     password: String,
///
///     #[label("确认密码")]
///     confirm: String,
/// }
///
/// impl SignUp {
///     fn check_passwords(&self, v: &mut tagvalid::Validation) {
///         if self.password != self.confirm {
///             v.set_error("confirm", "两次密码不一致");
///         }
///     }
/// }
/// ```
#[proc_macro_derive(Record, attributes(valid, label, record))]
pub fn derive_record(input: TokenStream) -> TokenStream {
    let input = parse_macro_input!(input as DeriveInput);
    expand_record(&input)
        .unwrap_or_else(syn::Error::into_compile_error)
        .into()
}

/// What the attributes of one field say.
#[derive(Default)]
struct FieldAttrs {
    rules: Option<LitStr>,
    label: Option<LitStr>,
    rename: Option<LitStr>,
    inline: bool,
    skip: bool,
}

fn expand_record(input: &DeriveInput) -> syn::Result<TokenStream2> {
    let name = &input.ident;
    let type_name = name.to_string();

    let fields = match &input.data {
        Data::Struct(data) => match &data.fields {
            Fields::Named(fields) => &fields.named,
            _ => {
                return Err(syn::Error::new_spanned(
                    name,
                    "Record can only be derived for structs with named fields",
                ))
            }
        },
        _ => {
            return Err(syn::Error::new_spanned(
                name,
                "Record can only be derived for structs",
            ))
        }
    };

    let mut entries = Vec::new();
    for field in fields {
        let attrs = field_attrs(field)?;
        if attrs.skip {
            continue;
        }

        let Some(ident) = field.ident.as_ref() else {
            continue;
        };
        let field_name = ident.to_string();

        let mut entry = quote! {
            ::tagvalid::Field::new(#field_name, ::tagvalid::ToValue::to_value(&self.#ident))
        };
        if !attrs.inline {
            let external = attrs
                .rename
                .as_ref()
                .map(LitStr::value)
                .unwrap_or_else(|| field_name.clone());
            entry = quote! { #entry.external_name(#external) };
        }
        if let Some(rules) = &attrs.rules {
            entry = quote! { #entry.rules(#rules) };
        }
        if let Some(label) = &attrs.label {
            entry = quote! { #entry.label(#label) };
        }
        entries.push(entry);
    }

    let hook = match record_hook(input)? {
        Some(method) => quote! {
            fn valid(&self, v: &mut ::tagvalid::Validation) {
                self.#method(v)
            }
        },
        None => quote!(),
    };

    let (impl_generics, ty_generics, where_clause) = input.generics.split_for_impl();

    Ok(quote! {
        impl #impl_generics ::tagvalid::Record for #name #ty_generics #where_clause {
            fn type_name(&self) -> &'static str {
                #type_name
            }

            fn fields(&self) -> ::std::vec::Vec<::tagvalid::Field<'_>> {
                ::std::vec![#(#entries),*]
            }

            #hook
        }

        impl #impl_generics ::tagvalid::ToValue for #name #ty_generics #where_clause {
            fn to_value(&self) -> ::tagvalid::Value<'_> {
                ::tagvalid::Value::Record(self)
            }
        }
    })
}

fn field_attrs(field: &syn::Field) -> syn::Result<FieldAttrs> {
    let mut attrs = FieldAttrs::default();

    for attr in &field.attrs {
        let path = attr.path();
        if path.is_ident("valid") {
            attrs.rules = Some(attr.parse_args::<LitStr>()?);
        } else if path.is_ident("label") {
            attrs.label = Some(attr.parse_args::<LitStr>()?);
        } else if path.is_ident("record") {
            attr.parse_nested_meta(|meta| {
                if meta.path.is_ident("skip") {
                    attrs.skip = true;
                    Ok(())
                } else {
                    Err(meta.error("unsupported record field attribute, expected `skip`"))
                }
            })?;
        } else if path.is_ident("serde") {
            attr.parse_nested_meta(|meta| {
                if meta.path.is_ident("rename") && meta.input.peek(Token![=]) {
                    attrs.rename = Some(meta.value()?.parse()?);
                } else if meta.path.is_ident("flatten") {
                    attrs.inline = true;
                } else if meta.path.is_ident("skip") {
                    attrs.skip = true;
                } else {
                    skip_meta(&meta)?;
                }
                Ok(())
            })?;
        }
    }

    Ok(attrs)
}

/// Consume the arguments of a serde attribute we don't interpret.
fn skip_meta(meta: &ParseNestedMeta) -> syn::Result<()> {
    if meta.input.peek(Token![=]) {
        meta.value()?.parse::<syn::Expr>()?;
    } else if meta.input.peek(syn::token::Paren) {
        meta.parse_nested_meta(|nested| skip_meta(&nested))?;
    }
    Ok(())
}

fn record_hook(input: &DeriveInput) -> syn::Result<Option<syn::Ident>> {
    let mut hook = None;
    for attr in input.attrs.iter().filter(|a| a.path().is_ident("record")) {
        attr.parse_nested_meta(|meta| {
            if meta.path.is_ident("hook") {
                let method: LitStr = meta.value()?.parse()?;
                hook = Some(method.parse::<syn::Ident>()?);
                Ok(())
            } else {
                Err(meta.error("unsupported record attribute, expected `hook`"))
            }
        })?;
    }
    Ok(hook)
}
