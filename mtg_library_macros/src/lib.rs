mod document;

use proc_macro::TokenStream;

// ============================================================================
// #[derive(Document)] derive macro
// ============================================================================

/// Derive macro for the `Document` trait.
///
/// # Usage
///
/// ```ignore
/// #[derive(Clone, Serialize, Deserialize, Document)]
/// #[document(collection = "views")]
/// struct SavedView {
///     #[document(id)]
///     pub id: String,
///     pub name: String,
/// }
/// ```
///
/// - `#[document(collection = "...")]` sets the collection name.
///   If omitted, defaults to snake_case struct name + "s".
/// - `#[document(id)]` marks the field used as the document identifier.
///   If omitted, defaults to a field named `id`.
#[proc_macro_derive(Document, attributes(document))]
pub fn derive_document(input: TokenStream) -> TokenStream {
    document::derive_document(input)
}
