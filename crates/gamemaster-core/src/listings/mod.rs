//! Entity-specific listings built on the generic [`query`](crate::query)
//! helpers.
//!
//! # Submodules
//!
//! - [`games`] -- Catalog filters for providers and the client storefront.
//! - [`contracts`] -- Contract filters and candidate developers.
//! - [`purchases`] -- Filters and comparators over a client's library.
//! - [`wishlists`] -- Filters and comparators over wishlist entries.
//! - [`users`] -- Account filters by kind and provider subtype.

pub mod contracts;
pub mod games;
pub mod purchases;
pub mod users;
pub mod wishlists;
