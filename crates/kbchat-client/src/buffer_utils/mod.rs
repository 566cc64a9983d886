mod buffering;
mod decoder;

pub use buffering::CircularLineBuffer;
pub use decoder::{StreamDecoder, DATA_PREFIX, DONE_MARKER};
