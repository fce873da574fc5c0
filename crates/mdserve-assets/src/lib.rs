//! Embedded stylesheets for mdserve.
//!
//! The local renderer links two stylesheets from every page it produces. Their
//! payloads are compiled into the binary via `rust-embed` and written next to
//! the served documents on demand, so a rendered page works without network
//! access.
//!
//! - [`get`] fetches a payload by name
//! - [`names`] enumerates every embedded payload
//! - [`STYLESHEETS`] lists the payloads in the order pages link them

use std::borrow::Cow;

/// Embedded stylesheet payloads.
#[derive(rust_embed::Embed)]
#[folder = "assets/"]
struct Assets;

/// Stylesheets linked from locally rendered pages, in link order.
pub const STYLESHEETS: [&str; 2] = ["github-flavored-markdown.css", "octicons.css"];

/// Get an embedded asset by name.
///
/// Returns the payload if the asset exists, `None` otherwise.
pub fn get(name: &str) -> Option<Cow<'static, [u8]>> {
    Assets::get(name).map(|f| f.data)
}

/// Iterate the names of all embedded assets.
pub fn names() -> impl Iterator<Item = Cow<'static, str>> {
    Assets::iter()
}

/// Return the MIME type string for the given file path.
///
/// Falls back to `application/octet-stream` for unknown extensions.
pub fn mime_for(path: &str) -> &'static str {
    mime_guess::from_path(path)
        .first_raw()
        .unwrap_or("application/octet-stream")
}
