pub mod model;
pub mod payload;

pub use model::{Certificate, Document, Product, UnitCode};
pub use payload::DocumentPayload;
