mod message;

use proc_macro::TokenStream;

#[proc_macro_derive(Message)]
pub fn derive_message(item: TokenStream) -> TokenStream {
    message::derive_message(item)
}
