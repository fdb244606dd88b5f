pub mod position;
pub mod sync;

pub use position::{
    PositionMapper, compute_line_starts, convert_byte_to_utf16_in_line,
    convert_utf16_to_byte_in_line,
};
pub use sync::apply_content_changes;
