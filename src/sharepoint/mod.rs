pub mod auth;
pub mod client;

pub use client::{FileFormat, RemoteFile, SharePointClient, SharePointSettings};
