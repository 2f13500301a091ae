pub mod client;
pub mod submitter;

pub use client::CrptClient;
pub use submitter::DocumentSubmitter;
