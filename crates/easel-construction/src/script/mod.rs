//! Opcode scripts: the line codec and script replay.

mod opcode;
mod replay;

pub use opcode::{
    escape, format_number, format_vector, unescape, OpcodeRecord, DECIMAL_PLACES,
    FIELD_SEPARATOR, KEY_VALUE_SEPARATOR, LIST_SEPARATOR,
};
pub use replay::{replay, script_lines, COMMENT_PREFIX};
