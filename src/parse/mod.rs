mod deserialize;
mod serialize;

pub use deserialize::{extract, sample};
pub use serialize::to_ndjson;
