//! Data model: loaded rows and the key index over them

mod index;
mod key;
mod table;

pub use index::{KeyIndex, KeyIndexEntry};
pub use key::{
    normalize_number, normalize_number_pad, pad_left, pad_right, KeyBuilder, KeyKind, KeyPart,
    KeySpecError,
};
pub use table::{Cell, Row, Table};
