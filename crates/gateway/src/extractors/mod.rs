//! Request extractors that reject with the API envelope.

mod validated_json;

pub use validated_json::{AppJson, ValidatedJson};
