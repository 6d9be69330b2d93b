//! src/view/icons.rs
//! ============================================================================
//! # File Icons (Font Awesome)
//!
//! Icon classes for file categories and the picker's action buttons.

use crate::fs::mime_type::FileCategory;

pub const SELECT_ICON: &str = "fas fa-plus fa-fw";
pub const MODIFY_ICON: &str = "fas fa-pen fa-fw";
pub const REMOVE_ICON: &str = "fas fa-times fa-fw";
pub const FILE_ICON: &str = "far fa-file fa-fw";

#[must_use]
pub const fn icon_for(category: FileCategory) -> &'static str {
    match category {
        FileCategory::Image => "far fa-file-image fa-fw",
        FileCategory::Video => "far fa-file-video fa-fw",
        FileCategory::Audio => "far fa-file-audio fa-fw",
        FileCategory::Pdf => "far fa-file-pdf fa-fw",
        FileCategory::Word => "far fa-file-word fa-fw",
        FileCategory::Excel => "far fa-file-excel fa-fw",
        FileCategory::Powerpoint => "far fa-file-powerpoint fa-fw",
        FileCategory::Archive => "far fa-file-archive fa-fw",
        FileCategory::Code | FileCategory::Xml => "far fa-file-code fa-fw",
        FileCategory::Font => "fas fa-font fa-fw",
        FileCategory::Csv => "fas fa-file-csv fa-fw",
        FileCategory::File => FILE_ICON,
    }
}
