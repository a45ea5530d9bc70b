//! Company name → ordered candidate slugs.
//!
//! `normalize` cleans a display name into a token stream, `generate_variants`
//! expands that stream into the slugs the resolver probes, in priority order.

pub mod normalize;
pub mod variants;

pub use normalize::normalize;
pub use variants::generate_variants;

/// Convenience: normalize then generate, the way the resolver consumes names.
pub fn candidates_for(name: &str) -> Vec<String> {
    generate_variants(&normalize(name))
}
