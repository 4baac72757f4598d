//! # decant
//!
//! Core trait for the decant extraction pipeline.
//!
//! This crate defines the fundamental `Decoder` trait that establishes a
//! type-safe conversion pattern used throughout decant.
//!
//! ## Overview
//!
//! The conversion pattern flows like this:
//! ```text
//! String → Pem → Vec<u8> → Der → ContentInfo
//! ```
//!
//! Each step uses the `Decoder` trait to convert from one representation
//! to the next.
//!
//! ## Type Safety
//!
//! The trait uses a marker trait (`DecodableFrom`) to ensure type safety
//! at compile time. This prevents invalid conversions and catches errors
//! early in the development process.
//!
//! ## Example
//!
//! The following example demonstrates the decoding pattern. Note that
//! specific implementations are provided by the `pem`, `der` and `cms`
//! crates:
//!
//! ```ignore
//! use decant::decoder::Decoder;
//! use pem::Pem;
//! use der::Der;
//!
//! // Decode an armored block to raw bytes
//! let pem: Pem = "-----BEGIN CMS-----\nMAA=\n-----END CMS-----".decode().unwrap();
//! let bytes: Vec<u8> = pem.decode().unwrap();
//!
//! // Decode raw bytes to DER
//! let der: Der = bytes.decode().unwrap();
//! ```

#![forbid(unsafe_code)]

pub mod decoder;
