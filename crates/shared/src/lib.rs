//! Shared model for the innovation pipeline dashboard: the static entity
//! metadata catalog, the record shape every entity shares, the API error
//! model and the request/response payloads exchanged over HTTP.

pub mod domain;
pub mod error;
pub mod metadata;
pub mod protocol;
pub mod record;
