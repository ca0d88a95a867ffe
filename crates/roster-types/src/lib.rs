/// Roster shared types.
///
/// Data model for the remote user collection plus the wire-level contract
/// every roster operation speaks: the `Response` envelope and its error
/// code taxonomy. Canonical definitions live here so the client crate and
/// any backend stub agree on field names and casing.
pub mod api;
pub mod models;
