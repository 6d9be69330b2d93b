pub mod humanize;
pub use humanize::format_bytes;
