//! # Conversions
//!
//! Hex/byte string helpers and flattening of structs and maps into string maps.

pub mod hex_string;
pub mod string_map;

pub use hex_string::{char_bytes_to_upper_string, hex_bytes_to_upper_string, string_to_hex_bytes};
pub use string_map::to_string_map;
