use proc_macro::TokenStream;
use quote::quote;
use syn::{parse_macro_input, FnArg, ImplItem, ItemImpl, LitStr, Pat, ReturnType, Type};

/// Attribute macro generating a constructor table for a result type.
///
/// Placed on an inherent `impl` block. Every associated function without a
/// receiver that returns `Self` (or the type by name) becomes a constructor
/// of the generated `AutoConstruct` impl, in declaration order.
///
/// Helper attributes:
///
/// - `#[automap]` on a function: the explicit mapping target.
/// - `#[skip]` on a function: not a constructor.
/// - `#[column("name")]` on a parameter: bind it to column `name`.
///
/// Parameter types must implement `rowbind_api::FromValue`.
///
/// # Example
///
/// ```ignore
/// #[auto_constructors]
/// impl Subject {
///     #[automap]
///     pub fn new(id: i32, #[column("name")] label: String, height: Option<i32>) -> Self {
///         Self { id, label, height }
///     }
/// }
/// ```
///
/// The descriptor type name defaults to the last path segment of the type;
/// override it with `#[auto_constructors(name = "...")]`.
#[proc_macro_attribute]
pub fn auto_constructors(attr: TokenStream, item: TokenStream) -> TokenStream {
    let mut type_name: Option<LitStr> = None;
    let parser = syn::meta::parser(|meta| {
        if meta.path.is_ident("name") {
            type_name = Some(meta.value()?.parse()?);
            Ok(())
        } else {
            Err(meta.error("unsupported auto_constructors property (expected `name`)"))
        }
    });
    parse_macro_input!(attr with parser);

    let input = parse_macro_input!(item as ItemImpl);
    match expand(input, type_name) {
        Ok(tokens) => tokens,
        Err(e) => e.to_compile_error().into(),
    }
}

fn expand(mut input: ItemImpl, type_name: Option<LitStr>) -> Result<TokenStream, syn::Error> {
    if let Some((_, path, _)) = &input.trait_ {
        return Err(syn::Error::new_spanned(
            path,
            "auto_constructors only supports inherent impl blocks",
        ));
    }
    if !input.generics.params.is_empty() {
        return Err(syn::Error::new_spanned(
            &input.generics,
            "auto_constructors does not support generic types",
        ));
    }

    let self_ty = input.self_ty.clone();
    let self_name = type_ident_name(&self_ty)
        .ok_or_else(|| syn::Error::new_spanned(&self_ty, "expected a named type"))?;
    let type_name = type_name.map_or(self_name.clone(), |lit| lit.value());

    let mut constructor_tokens = Vec::new();

    for item in &mut input.items {
        let ImplItem::Fn(func) = item else {
            continue;
        };

        let automap = take_flag(&mut func.attrs, "automap");
        if take_flag(&mut func.attrs, "skip") {
            if automap {
                return Err(syn::Error::new_spanned(
                    &func.sig.ident,
                    "#[automap] and #[skip] are mutually exclusive",
                ));
            }
            continue;
        }

        let is_constructor = func.sig.receiver().is_none()
            && func.sig.generics.params.is_empty()
            && func.sig.asyncness.is_none()
            && returns_self(&func.sig.output, &self_name);
        if !is_constructor {
            if automap {
                return Err(syn::Error::new_spanned(
                    &func.sig.ident,
                    "#[automap] requires a non-generic associated function returning Self",
                ));
            }
            continue;
        }

        let fn_ident = func.sig.ident.clone();
        let fn_name_str = fn_ident.to_string();

        let mut param_tokens = Vec::new();
        let mut param_types = Vec::new();

        for input in &mut func.sig.inputs {
            let FnArg::Typed(pat_type) = input else {
                continue;
            };

            // Parse and strip #[column("...")].
            let mut column: Option<LitStr> = None;
            let mut kept = Vec::with_capacity(pat_type.attrs.len());
            for attr in pat_type.attrs.drain(..) {
                if attr.path().is_ident("column") {
                    column = Some(attr.parse_args()?);
                } else {
                    kept.push(attr);
                }
            }
            pat_type.attrs = kept;

            let ty = &pat_type.ty;
            let param_type = quote! {
                <#ty as ::rowbind_api::convert::FromValue>::PARAM_TYPE
            };
            let mut param = match pat_type.pat.as_ref() {
                Pat::Ident(pat_ident) => {
                    let name = pat_ident.ident.to_string();
                    let name = name.strip_prefix("r#").unwrap_or(&name).to_string();
                    quote! { ::rowbind_api::descriptor::ParamDescriptor::new(#name, #param_type) }
                }
                _ => quote! { ::rowbind_api::descriptor::ParamDescriptor::positional(#param_type) },
            };
            if let Some(column) = column {
                param = quote! { #param.column(#column) };
            }

            param_tokens.push(param);
            param_types.push(ty.as_ref().clone());
        }

        let build = if param_types.is_empty() {
            quote! {
                |_: ::rowbind_api::descriptor::Args| ::std::result::Result::Ok(<#self_ty>::#fn_ident())
            }
        } else {
            quote! {
                |mut __args: ::rowbind_api::descriptor::Args| {
                    ::std::result::Result::Ok(<#self_ty>::#fn_ident(
                        #(__args.next::<#param_types>()?),*
                    ))
                }
            }
        };

        let mut constructor = quote! {
            ::rowbind_api::descriptor::ConstructorDescriptor::new(
                #fn_name_str,
                ::std::vec![#(#param_tokens),*],
                #build,
            )
        };
        if automap {
            constructor = quote! { #constructor.automap() };
        }
        constructor_tokens.push(constructor);
    }

    if constructor_tokens.is_empty() {
        return Err(syn::Error::new_spanned(
            &self_ty,
            "auto_constructors found no associated function returning Self",
        ));
    }

    let expanded = quote! {
        #input

        impl ::rowbind_api::descriptor::AutoConstruct for #self_ty {
            fn descriptor() -> &'static ::rowbind_api::descriptor::TypeDescriptor<Self> {
                static DESCRIPTOR: ::std::sync::OnceLock<
                    ::rowbind_api::descriptor::TypeDescriptor<#self_ty>,
                > = ::std::sync::OnceLock::new();
                DESCRIPTOR.get_or_init(|| {
                    ::rowbind_api::descriptor::TypeDescriptor::builder(#type_name)
                        #(.constructor(#constructor_tokens))*
                        .build()
                })
            }
        }
    };

    Ok(TokenStream::from(expanded))
}

/// Remove a bare `#[name]` helper attribute, reporting whether it was present.
fn take_flag(attrs: &mut Vec<syn::Attribute>, name: &str) -> bool {
    let before = attrs.len();
    attrs.retain(|attr| !attr.path().is_ident(name));
    attrs.len() != before
}

fn returns_self(output: &ReturnType, self_name: &str) -> bool {
    match output {
        ReturnType::Type(_, ty) => match type_ident_name(ty) {
            Some(name) => name == "Self" || name == self_name,
            None => false,
        },
        ReturnType::Default => false,
    }
}

/// Extract the last path segment ident name from a type (e.g. `Subject`, `Self`).
fn type_ident_name(ty: &Type) -> Option<String> {
    if let Type::Path(type_path) = ty {
        type_path
            .path
            .segments
            .last()
            .map(|seg| seg.ident.to_string())
    } else {
        None
    }
}
