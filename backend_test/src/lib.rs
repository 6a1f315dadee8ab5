use proc_macro::TokenStream;
use proc_macro2::TokenStream as TokenStream2;
use quote::{format_ident, quote};
use syn::{parse_macro_input, spanned::Spanned, FnArg, Ident, ItemFn, Pat, Signature, Type};

/// Transform an asynchronous test into a synchronous one and inject
/// dependencies.
///
/// Every test gets a fresh server over its own in-memory spreadsheet store and
/// a fixed-token identity provider. Injectable dependencies are
/// [`rocket::local::asynchronous::Client`] and `crate::sheets::InMemorySheets`,
/// the latter sharing state with the server.
///
/// `#[backend_test(signed_in)]` signs the client in as Alice first.
#[proc_macro_attribute]
pub fn backend_test(args: TokenStream, input: TokenStream) -> TokenStream {
    let mut item_fn = parse_macro_input!(input as ItemFn);

    // Extract injected parameters and reject invalid function signatures.
    let test_args = match check_sig(item_fn.sig.clone()) {
        Ok(args) => args,
        Err(err) => {
            return err.into_compile_error().into();
        }
    };

    // Rename the future so the test can have its original name.
    let name = item_fn.sig.ident.clone();
    let new_name = format_ident!("{}_fut", name);
    item_fn.sig.ident = new_name.clone();

    // Sign the client in if needed.
    let maybe_sign_in = match parse_macro_input!(args as Option<Ident>) {
        None => quote! {},
        Some(arg) if arg == "signed_in" => quote! {{
            // Scoped so the response's borrow of the client ends here.
            let response = rocket_client
                .post(uri!(crate::api::auth::sign_in))
                .header(rocket::http::ContentType::JSON)
                .body(rocket::serde::json::json!(crate::model::api::auth::SignInRequest::example()).to_string())
                .dispatch()
                .await;
            assert_eq!(response.status(), rocket::http::Status::Ok, "test sign-in failed");
        }},
        Some(arg) => {
            return syn::Error::new(arg.span(), "Expected no argument or `signed_in`")
                .into_compile_error()
                .into();
        }
    };

    // Rewrite the test function.
    quote! {
        #[test]
        fn #name() {
            /// Test setup.
            async fn setup() -> (rocket::local::asynchronous::Client, crate::sheets::InMemorySheets) {
                let sheets = crate::sheets::InMemorySheets::default();
                let fetcher = crate::model::metadata::PageFetcher::new(std::time::Duration::from_secs(1)).unwrap();
                let rocket = crate::rocket_for_services(
                    crate::sheets::Sheets::new(sheets.clone()),
                    crate::identity::Identity::new(crate::identity::StaticIdentity),
                    fetcher,
                );
                let rocket_client = rocket::local::asynchronous::Client::tracked(rocket)
                    .await
                    .unwrap();

                #maybe_sign_in

                (rocket_client, sheets)
            }

            /// The test itself.
            #item_fn

            let runtime = rocket::tokio::runtime::Builder::new_multi_thread()
                .thread_name("rocket-worker-test-thread")
                .worker_threads(1)
                .enable_all()
                .build()
                .unwrap();

            runtime.block_on(async {
                #[allow(unused_variables)]
                let (rocket_client, sheets) = setup().await;
                #new_name(#(#test_args),*).await;
            });
        }
    }
    .into()
}

/// Ensure the wrapped test is async, extract parameters to inject, and reject unknown parameters.
fn check_sig(sig: Signature) -> Result<Vec<TokenStream2>, syn::Error> {
    if sig.asyncness.is_none() {
        return Err(syn::Error::new(sig.span(), "Test must be marked `async`"));
    }

    let mut has_client = false;
    let mut has_sheets = false;
    let mut args = vec![];

    for input in &sig.inputs {
        if let FnArg::Typed(pat_type) = input {
            if let (Pat::Ident(_), Type::Path(type_path)) = (&*pat_type.pat, &*pat_type.ty) {
                // Valid as the last path segment for any type is itself
                let type_ident = &type_path.path.segments.last().unwrap().ident;
                if type_ident == "Client" {
                    if has_client {
                        return Err(syn::Error::new(
                            input.span(),
                            "Test cannot accept more than one `rocket::local::asynchronous::Client`",
                        ));
                    }
                    has_client = true;
                    args.push(quote! { rocket_client });
                    continue;
                } else if type_ident == "InMemorySheets" {
                    if has_sheets {
                        return Err(syn::Error::new(
                            input.span(),
                            "Test cannot accept more than one `InMemorySheets`",
                        ));
                    }
                    has_sheets = true;
                    args.push(quote! { sheets });
                    continue;
                }
            }
        }

        return Err(syn::Error::new(
            input.span(),
            "Expected one of `client_ident: Client` or `sheets_ident: InMemorySheets`",
        ));
    }

    Ok(args)
}
