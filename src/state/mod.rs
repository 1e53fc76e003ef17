//! Client-side state kept between API calls.
//!
//! DESIGN
//! ======
//! - `auth`: the signed-in session and its storage mirror
//! - `listings`: browse filters and sort order over fetched properties
//! - `wishlist`: favourited property ids

pub mod auth;
pub mod listings;
pub mod wishlist;
