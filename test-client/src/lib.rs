//! generated graphql bindings

pub mod nodes;
