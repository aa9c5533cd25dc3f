//! HTTP fetching behind a mockable trait.
//!
//! Blob storage downloads generated images through [`HttpClient`], so tests
//! can substitute [`MockClient`] and never touch the network.

mod client;

pub use client::{HttpClient, MockClient, MockResponse, ReqwestClient};
