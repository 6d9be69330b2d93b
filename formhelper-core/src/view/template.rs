//! src/view/template.rs
//! ============================================================================
//! # Picker and File-Box Templates
//!
//! View models built from picker state, plus the override hooks a host can
//! install. With no hook the default markup is produced; a static hook
//! replaces it verbatim; a computed hook receives the view model.

use std::fmt::Write as _;
use std::sync::Arc;

use compact_str::CompactString;
use serde::Serialize;

use crate::config::LanguageConfig;
use crate::fs::file_record::{FileRecord, RecordId};
use crate::model::picker::{PickerId, PickerInstance};
use crate::view::icons::{MODIFY_ICON, REMOVE_ICON, SELECT_ICON, icon_for};

/// Everything a file-box template needs for one record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FileBoxView {
    pub record: RecordId,
    pub name: CompactString,
    pub formatted_size: String,
    /// `"name (size)"`
    pub label: String,
    pub icon: &'static str,
    pub link: Option<String>,
    pub input_name: String,
    pub can_modify: bool,
    pub can_remove: bool,
    pub is_invalid: bool,
    pub invalid_msg: Option<String>,
    pub hidden_fields: Vec<(CompactString, String)>,
}

impl FileBoxView {
    #[must_use]
    pub fn from_record(
        picker: &PickerInstance,
        record: &FileRecord,
        language: &LanguageConfig,
    ) -> Self {
        let is_invalid: bool = !picker.accepts(record);
        let config = picker.config();

        Self {
            record: record.id(),
            name: record.name.clone(),
            formatted_size: record.formatted_size(),
            label: record.display_label(),
            icon: icon_for(record.category),
            link: record.link.clone(),
            input_name: config.file_input.name.clone(),
            // existing files have no input to re-select through
            can_modify: config.can_modify && !record.is_remote(),
            can_remove: config.can_remove,
            is_invalid,
            invalid_msg: is_invalid.then(|| language.invalid_msg.clone()),
            hidden_fields: record.hidden_fields.clone(),
        }
    }
}

/// Everything a picker template needs.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PickerView {
    pub picker: PickerId,
    pub select_label: String,
    pub limit_hint: String,
    pub unselect_msg: String,
    pub accept: String,
    pub multiple: bool,
    pub can_drag_drop: bool,
    pub select_disabled: bool,
    pub show_unselected: bool,
    pub formatted_size: String,
    pub files: Vec<FileBoxView>,
}

impl PickerView {
    #[must_use]
    pub fn from_picker(picker: &PickerInstance, language: &LanguageConfig) -> Self {
        let config = picker.config();
        let ui = picker.ui_state();

        Self {
            picker: picker.id(),
            select_label: language.select_file.clone(),
            limit_hint: picker.limit_hint(language),
            unselect_msg: language.unselect_file.clone(),
            accept: config.accepted_types().to_accept_attr(),
            multiple: config.allow_multiple(),
            can_drag_drop: config.can_drag_drop,
            select_disabled: ui.select_disabled,
            show_unselected: ui.show_unselected,
            formatted_size: picker.formatted_size(),
            files: picker
                .files()
                .iter()
                .map(|record| FileBoxView::from_record(picker, record, language))
                .collect(),
        }
    }
}

/// Optional template override.
pub enum TemplateHook<T> {
    NotProvided,

    /// Fixed markup, used as is
    Static(String),

    /// Markup computed from the view model
    Computed(Arc<dyn Fn(&T) -> String + Send + Sync>),
}

impl<T> TemplateHook<T> {
    pub fn computed(f: impl Fn(&T) -> String + Send + Sync + 'static) -> Self {
        Self::Computed(Arc::new(f))
    }

    /// Hook output, or `None` when nothing was provided.
    pub fn apply(&self, view: &T) -> Option<String> {
        match self {
            Self::NotProvided => None,
            Self::Static(markup) => Some(markup.clone()),
            Self::Computed(f) => Some(f(view)),
        }
    }
}

impl<T> Default for TemplateHook<T> {
    fn default() -> Self {
        Self::NotProvided
    }
}

impl<T> Clone for TemplateHook<T> {
    fn clone(&self) -> Self {
        match self {
            Self::NotProvided => Self::NotProvided,
            Self::Static(markup) => Self::Static(markup.clone()),
            Self::Computed(f) => Self::Computed(Arc::clone(f)),
        }
    }
}

impl<T> std::fmt::Debug for TemplateHook<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::NotProvided => f.write_str("NotProvided"),
            Self::Static(markup) => f.debug_tuple("Static").field(markup).finish(),
            Self::Computed(_) => f.write_str("Computed(..)"),
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct Templates {
    pub file_picker: TemplateHook<PickerView>,
    pub file_box: TemplateHook<FileBoxView>,
}

impl Templates {
    #[must_use]
    pub fn render_picker(&self, view: &PickerView) -> String {
        self.file_picker
            .apply(view)
            .unwrap_or_else(|| self.default_picker(view))
    }

    #[must_use]
    pub fn render_file_box(&self, view: &FileBoxView) -> String {
        self.file_box
            .apply(view)
            .unwrap_or_else(|| default_file_box(view))
    }

    fn default_picker(&self, view: &PickerView) -> String {
        let mut out: String = String::new();

        let _ = write!(
            out,
            r#"<div class="fh-file-picker" data-picker="{}">"#,
            view.picker.get(),
        );
        let _ = write!(
            out,
            r#"<button type="button" class="btn btn-success fh-file-select"{}>"#,
            if view.select_disabled { " disabled" } else { "" },
        );
        let _ = write!(
            out,
            r#"<span><i class="{SELECT_ICON}"></i>{}</span></button>"#,
            escape(&view.select_label),
        );
        let _ = write!(
            out,
            r#"<div class="fh-file-block"><span class="fh-file-limit">{}</span>"#,
            escape(&view.limit_hint),
        );
        if view.show_unselected {
            let _ = write!(
                out,
                r#"<span class="fh-file-unselect">{}</span>"#,
                escape(&view.unselect_msg),
            );
        }

        out.push_str(r#"<div class="fh-file-list">"#);
        for file in &view.files {
            out.push_str(&self.render_file_box(file));
        }
        out.push_str("</div></div></div>");

        out
    }
}

fn default_file_box(view: &FileBoxView) -> String {
    let mut out: String = String::from(r#"<div class="fh-file-box">"#);

    for (name, value) in &view.hidden_fields {
        let _ = write!(
            out,
            r#"<input type="hidden" name="{}" value="{}">"#,
            escape(name),
            escape(value),
        );
    }

    let label: String = escape(&view.label);
    match &view.link {
        Some(link) => {
            let _ = write!(
                out,
                r#"<a class="fh-file-info" href="{}" target="_blank">"#,
                escape(link),
            );
            let _ = write!(out, r#"<i class="{}"></i>{label}</a>"#, view.icon);
        }
        None => {
            let _ = write!(
                out,
                r#"<span class="fh-file-info"><i class="{}"></i>{label}</span>"#,
                view.icon,
            );
        }
    }

    if let Some(msg) = &view.invalid_msg {
        let _ = write!(out, r#"<span class="fh-file-invalid">{}</span>"#, escape(msg));
    }

    if view.can_modify || view.can_remove {
        out.push_str(r#"<div class="fh-file-toolbar">"#);
        if view.can_modify {
            let _ = write!(
                out,
                r#"<span class="fh-file-modify"><i class="{MODIFY_ICON}"></i></span>"#
            );
        }
        if view.can_remove {
            let _ = write!(
                out,
                r#"<span class="fh-file-remove"><i class="{REMOVE_ICON}"></i></span>"#
            );
        }
        out.push_str("</div>");
    }

    out.push_str("</div>");
    out
}

fn escape(text: &str) -> String {
    let mut out: String = String::with_capacity(text.len());

    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }

    out
}
