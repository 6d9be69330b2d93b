//! ``src/model/picker.rs``
//! ============================================================================
//! # `PickerInstance`: One File-Selection Widget
//!
//! Owns the ordered list of selected files for one picker, its merged
//! configuration and its callbacks. Every mutation follows the same order:
//! change the file list, recompute the derived UI state, then run callbacks,
//! so callbacks always observe settled state.
//!
//! Ingestion never enforces limits. A picker may hold more than it allows;
//! the UI state reflects that and the form check reports it at submit time.

use std::sync::Arc;

use tracing::debug;

use crate::config::{LanguageConfig, PickerConfig};
use crate::error::{FormError, FormResult, PickerAction};
use crate::fs::file_record::{ExistingFile, FileHandle, FileRecord, RecordId};
use crate::util::humanize::format_bytes;

/// Identity of a picker within its registry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, serde::Serialize)]
pub struct PickerId(pub(crate) u64);

impl PickerId {
    #[must_use]
    pub const fn get(self) -> u64 {
        self.0
    }
}

impl std::fmt::Display for PickerId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "picker-{}", self.0)
    }
}

pub type ChangeCallback = Arc<dyn Fn(&PickerInstance) + Send + Sync>;
pub type RecordCallback = Arc<dyn Fn(&PickerInstance, &FileRecord) + Send + Sync>;
pub type DropCallback = Arc<dyn Fn(&PickerInstance, &[FileRecord]) + Send + Sync>;

/// Optional hooks; an empty slot is a no-op.
#[derive(Clone, Default)]
pub struct PickerCallbacks {
    pub on_change: Option<ChangeCallback>,
    pub on_create: Option<RecordCallback>,
    pub on_remove: Option<RecordCallback>,
    pub on_drop: Option<DropCallback>,
}

impl PickerCallbacks {
    #[must_use]
    pub fn on_change(mut self, f: impl Fn(&PickerInstance) + Send + Sync + 'static) -> Self {
        self.on_change = Some(Arc::new(f));
        self
    }

    #[must_use]
    pub fn on_create(
        mut self,
        f: impl Fn(&PickerInstance, &FileRecord) + Send + Sync + 'static,
    ) -> Self {
        self.on_create = Some(Arc::new(f));
        self
    }

    #[must_use]
    pub fn on_remove(
        mut self,
        f: impl Fn(&PickerInstance, &FileRecord) + Send + Sync + 'static,
    ) -> Self {
        self.on_remove = Some(Arc::new(f));
        self
    }

    #[must_use]
    pub fn on_drop(
        mut self,
        f: impl Fn(&PickerInstance, &[FileRecord]) + Send + Sync + 'static,
    ) -> Self {
        self.on_drop = Some(Arc::new(f));
        self
    }
}

impl std::fmt::Debug for PickerCallbacks {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PickerCallbacks")
            .field("on_change", &self.on_change.is_some())
            .field("on_create", &self.on_create.is_some())
            .field("on_remove", &self.on_remove.is_some())
            .field("on_drop", &self.on_drop.is_some())
            .finish()
    }
}

/// Derived display state, recomputed after every mutation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct PickerUiState {
    /// The select button is disabled once a limit is reached
    pub select_disabled: bool,

    /// The "no files selected" message is shown
    pub show_unselected: bool,
}

#[derive(Debug, Clone)]
pub struct PickerInstance {
    id: PickerId,
    config: PickerConfig,
    callbacks: PickerCallbacks,
    files: Vec<FileRecord>,
    ui: PickerUiState,
}

impl PickerInstance {
    /// Create an empty picker from an already merged configuration.
    #[must_use]
    pub fn new(id: PickerId, config: PickerConfig, callbacks: PickerCallbacks) -> Self {
        let mut picker = Self {
            id,
            config,
            callbacks,
            files: Vec::new(),
            ui: PickerUiState::default(),
        };

        picker.refresh_ui();
        picker
    }

    #[inline]
    #[must_use]
    pub const fn id(&self) -> PickerId {
        self.id
    }

    /// Read-only view of the configuration.
    #[inline]
    #[must_use]
    pub const fn config(&self) -> &PickerConfig {
        &self.config
    }

    #[inline]
    #[must_use]
    pub fn files(&self) -> &[FileRecord] {
        &self.files
    }

    #[must_use]
    pub fn file(&self, id: RecordId) -> Option<&FileRecord> {
        self.files.iter().find(|record| record.id() == id)
    }

    #[inline]
    #[must_use]
    pub const fn ui_state(&self) -> PickerUiState {
        self.ui
    }

    /// Sum of file sizes, recomputed on every call.
    #[must_use]
    pub fn size(&self) -> u64 {
        self.files
            .iter()
            .fold(0u64, |total, record| total.saturating_add(record.size))
    }

    #[must_use]
    pub fn count(&self) -> u32 {
        u32::try_from(self.files.len()).unwrap_or(u32::MAX)
    }

    #[must_use]
    pub fn formatted_size(&self) -> String {
        format_bytes(self.size())
    }

    /// Whether the picker currently holds more than its own limits allow.
    #[must_use]
    pub fn is_over_limit(&self) -> bool {
        self.size() > self.config.max_bytes() || self.count() > self.config.max_files
    }

    /// Whether a record satisfies the picker's accepted types. Advisory only.
    #[must_use]
    pub fn accepts(&self, record: &FileRecord) -> bool {
        record.is_remote() || self.config.accepted_types().accepts(&record.name)
    }

    /// Text for the limit hint, e.g. `"File size limit (MB): 10.00 MB"`.
    #[must_use]
    pub fn limit_hint(&self, language: &LanguageConfig) -> String {
        format!("{}: {}", language.limit_msg, format_bytes(self.config.max_bytes()))
    }

    // ------------------------------------------------------------
    // Mutations
    // ------------------------------------------------------------

    /// Append one selection batch in the order supplied.
    ///
    /// Fires `on_create` per new record and `on_change` once. An empty batch
    /// (cancelled dialog) changes nothing and fires nothing.
    pub fn add_files<I>(&mut self, handles: I) -> Vec<FileRecord>
    where
        I: IntoIterator<Item = FileHandle>,
    {
        let added: Vec<FileRecord> = handles.into_iter().map(FileRecord::from_handle).collect();

        if added.is_empty() {
            return added;
        }

        self.files.extend(added.iter().cloned());
        self.refresh_ui();

        debug!(
            picker = %self.id,
            added = added.len(),
            count = self.count(),
            size = self.size(),
            "files added"
        );

        for record in &added {
            self.fire_create(record);
        }
        self.fire_change();

        added
    }

    /// Register a file uploaded earlier (shown with its link, submitted as
    /// hidden fields only).
    pub fn add_existing(&mut self, existing: ExistingFile) -> FileRecord {
        let record: FileRecord = FileRecord::from_existing(existing);

        self.files.push(record.clone());
        self.refresh_ui();

        debug!(picker = %self.id, record = %record.id(), "existing file attached");

        self.fire_create(&record);
        self.fire_change();

        record
    }

    /// Drag-and-drop intake: [`Self::add_files`] followed by `on_drop`.
    pub fn drop_files<I>(&mut self, handles: I) -> FormResult<Vec<FileRecord>>
    where
        I: IntoIterator<Item = FileHandle>,
    {
        self.ensure_allowed(PickerAction::DragDrop, self.config.can_drag_drop)?;

        let added: Vec<FileRecord> = self.add_files(handles);

        if !added.is_empty() {
            if let Some(on_drop) = self.callbacks.on_drop.clone() {
                on_drop(self, &added);
            }
        }

        Ok(added)
    }

    /// Remove by identity. Other records keep their order.
    pub fn remove_file(&mut self, id: RecordId) -> FormResult<FileRecord> {
        self.ensure_allowed(PickerAction::Remove, self.config.can_remove)?;
        self.take_file(id)
    }

    /// Re-select a file in place.
    ///
    /// An empty selection degrades to a removal (`on_remove` + `on_change`);
    /// otherwise the new records take the old one's position and only
    /// `on_change` fires.
    pub fn replace_file<I>(&mut self, id: RecordId, handles: I) -> FormResult<Vec<FileRecord>>
    where
        I: IntoIterator<Item = FileHandle>,
    {
        self.ensure_allowed(PickerAction::Modify, self.config.can_modify)?;

        let position: usize = self.position_of(id)?;
        let replacement: Vec<FileRecord> =
            handles.into_iter().map(FileRecord::from_handle).collect();

        if replacement.is_empty() {
            self.take_file(id)?;
            return Ok(replacement);
        }

        self.files
            .splice(position..=position, replacement.iter().cloned());
        self.refresh_ui();

        debug!(
            picker = %self.id,
            replaced = %id,
            with = replacement.len(),
            "file replaced"
        );

        self.fire_change();

        Ok(replacement)
    }

    // ------------------------------------------------------------
    // Internals
    // ------------------------------------------------------------

    fn take_file(&mut self, id: RecordId) -> FormResult<FileRecord> {
        let position: usize = self.position_of(id)?;
        let removed: FileRecord = self.files.remove(position);
        self.refresh_ui();

        debug!(picker = %self.id, record = %id, count = self.count(), "file removed");

        if let Some(on_remove) = self.callbacks.on_remove.clone() {
            on_remove(self, &removed);
        }
        self.fire_change();

        Ok(removed)
    }

    fn position_of(&self, id: RecordId) -> FormResult<usize> {
        self.files
            .iter()
            .position(|record| record.id() == id)
            .ok_or(FormError::RecordNotFound {
                picker: self.id,
                record: id,
            })
    }

    const fn ensure_allowed(&self, action: PickerAction, allowed: bool) -> FormResult<()> {
        if allowed {
            Ok(())
        } else {
            Err(FormError::ActionNotAllowed {
                picker: self.id,
                action,
            })
        }
    }

    fn refresh_ui(&mut self) {
        let count: u32 = self.count();

        self.ui = PickerUiState {
            select_disabled: count >= self.config.max_files
                || self.size() >= self.config.max_bytes(),
            show_unselected: count == 0,
        };
    }

    fn fire_create(&self, record: &FileRecord) {
        if let Some(on_create) = &self.callbacks.on_create {
            on_create(self, record);
        }
    }

    fn fire_change(&self) {
        if let Some(on_change) = &self.callbacks.on_change {
            on_change(self);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{Merge, PickerOverrides};
    use bytesize::ByteSize;
    use std::sync::atomic::{AtomicUsize, Ordering};

    fn picker_with(overrides: PickerOverrides, callbacks: PickerCallbacks) -> PickerInstance {
        PickerInstance::new(
            PickerId(1),
            PickerConfig::default().merged(&overrides),
            callbacks,
        )
    }

    fn handle(name: &str, size: u64) -> FileHandle {
        FileHandle::metadata_only(name, size)
    }

    fn assert_no_drift(picker: &PickerInstance) {
        let expected: u64 = picker.files().iter().map(|f| f.size).sum();
        assert_eq!(picker.size(), expected);
        assert_eq!(picker.count() as usize, picker.files().len());
    }

    #[test]
    fn test_add_appends_in_order() {
        let mut picker = picker_with(PickerOverrides::default(), PickerCallbacks::default());

        let first = picker.add_files([handle("a.pdf", 10), handle("b.zip", 20)]);
        let second = picker.add_files([handle("c.sh", 30)]);

        let names: Vec<&str> = picker.files().iter().map(|f| f.name.as_str()).collect();
        assert_eq!(names, ["a.pdf", "b.zip", "c.sh"]);
        assert_eq!(first.len(), 2);
        assert_eq!(second[0].id(), picker.files()[2].id());
        assert_eq!(picker.size(), 60);
        assert_eq!(picker.count(), 3);
    }

    #[test]
    fn test_size_and_count_never_drift() {
        let mut picker = picker_with(PickerOverrides::default(), PickerCallbacks::default());
        assert_no_drift(&picker);

        let added = picker.add_files((0..6).map(|i| handle(&format!("f{i}.txt"), 100 + i)));
        assert_no_drift(&picker);

        picker.remove_file(added[1].id()).unwrap();
        assert_no_drift(&picker);

        picker
            .replace_file(added[3].id(), [handle("big.bin", 5000), handle("x.bin", 1)])
            .unwrap();
        assert_no_drift(&picker);

        picker.replace_file(added[0].id(), []).unwrap();
        assert_no_drift(&picker);

        picker.add_existing(ExistingFile {
            name: "old.pdf".into(),
            size: 77,
            ..ExistingFile::default()
        });
        assert_no_drift(&picker);
        assert_eq!(picker.count(), 6);
    }

    #[test]
    fn test_remove_keeps_order_and_identity() {
        let mut picker = picker_with(PickerOverrides::default(), PickerCallbacks::default());
        let added = picker.add_files([
            handle("a", 1),
            handle("b", 2),
            handle("c", 3),
            handle("d", 4),
        ]);

        let removed = picker.remove_file(added[1].id()).unwrap();

        assert_eq!(removed.name, "b");
        let remaining: Vec<RecordId> = picker.files().iter().map(FileRecord::id).collect();
        assert_eq!(remaining, [added[0].id(), added[2].id(), added[3].id()]);
        assert!(matches!(
            picker.remove_file(added[1].id()),
            Err(FormError::RecordNotFound { .. })
        ));
    }

    #[test]
    fn test_replace_in_place() {
        let mut picker = picker_with(PickerOverrides::default(), PickerCallbacks::default());
        let added = picker.add_files([handle("a", 1), handle("b", 2), handle("c", 3)]);

        let new = picker.replace_file(added[1].id(), [handle("b2", 20)]).unwrap();

        let names: Vec<&str> = picker.files().iter().map(|f| f.name.as_str()).collect();
        assert_eq!(names, ["a", "b2", "c"]);
        assert!(picker.file(added[1].id()).is_none());
        assert!(picker.file(new[0].id()).is_some());
    }

    #[test]
    fn test_callback_order_and_counts() {
        let creates = Arc::new(AtomicUsize::new(0));
        let changes = Arc::new(AtomicUsize::new(0));
        let removes = Arc::new(AtomicUsize::new(0));
        let seen_count = Arc::new(AtomicUsize::new(0));

        let callbacks = PickerCallbacks::default()
            .on_create({
                let creates = creates.clone();
                move |_, _| {
                    creates.fetch_add(1, Ordering::SeqCst);
                }
            })
            .on_change({
                let changes = changes.clone();
                let seen_count = seen_count.clone();
                move |picker| {
                    changes.fetch_add(1, Ordering::SeqCst);
                    // callbacks observe settled state
                    seen_count.store(picker.count() as usize, Ordering::SeqCst);
                }
            })
            .on_remove({
                let removes = removes.clone();
                move |picker, record| {
                    assert!(picker.file(record.id()).is_none());
                    removes.fetch_add(1, Ordering::SeqCst);
                }
            });

        let mut picker = picker_with(PickerOverrides::default(), callbacks);

        let added = picker.add_files([handle("a", 1), handle("b", 2), handle("c", 3)]);
        assert_eq!(creates.load(Ordering::SeqCst), 3);
        assert_eq!(changes.load(Ordering::SeqCst), 1);
        assert_eq!(seen_count.load(Ordering::SeqCst), 3);

        picker.remove_file(added[0].id()).unwrap();
        assert_eq!(removes.load(Ordering::SeqCst), 1);
        assert_eq!(changes.load(Ordering::SeqCst), 2);
        assert_eq!(seen_count.load(Ordering::SeqCst), 2);

        // non-empty replace: change only
        picker.replace_file(added[1].id(), [handle("b2", 2)]).unwrap();
        assert_eq!(removes.load(Ordering::SeqCst), 1);
        assert_eq!(changes.load(Ordering::SeqCst), 3);

        // cancelled replace: remove + change
        picker.replace_file(added[2].id(), []).unwrap();
        assert_eq!(removes.load(Ordering::SeqCst), 2);
        assert_eq!(changes.load(Ordering::SeqCst), 4);

        // empty batch: nothing fires
        picker.add_files(std::iter::empty());
        assert_eq!(changes.load(Ordering::SeqCst), 4);
        assert_eq!(creates.load(Ordering::SeqCst), 3);
    }

    #[test]
    fn test_ui_state_tracks_limits() {
        let mut picker = picker_with(
            PickerOverrides {
                max_files: Some(2),
                max_bytes: Some(ByteSize::b(100)),
                ..PickerOverrides::default()
            },
            PickerCallbacks::default(),
        );
        assert_eq!(
            picker.ui_state(),
            PickerUiState {
                select_disabled: false,
                show_unselected: true
            }
        );

        let added = picker.add_files([handle("a", 10)]);
        assert!(!picker.ui_state().select_disabled);
        assert!(!picker.ui_state().show_unselected);

        picker.add_files([handle("b", 10)]);
        assert!(picker.ui_state().select_disabled);

        picker.remove_file(added[0].id()).unwrap();
        assert!(!picker.ui_state().select_disabled);

        // size limit alone also disables; ingestion still succeeds past it
        picker.add_files([handle("huge", 500)]);
        assert!(picker.ui_state().select_disabled);
        assert!(picker.is_over_limit());
        assert_eq!(picker.count(), 2);
    }

    #[test]
    fn test_disabled_actions() {
        let mut picker = picker_with(
            PickerOverrides {
                can_remove: Some(false),
                can_modify: Some(false),
                can_drag_drop: Some(false),
                ..PickerOverrides::default()
            },
            PickerCallbacks::default(),
        );
        let added = picker.add_files([handle("a", 1)]);

        assert!(matches!(
            picker.remove_file(added[0].id()),
            Err(FormError::ActionNotAllowed {
                action: PickerAction::Remove,
                ..
            })
        ));
        assert!(matches!(
            picker.replace_file(added[0].id(), []),
            Err(FormError::ActionNotAllowed {
                action: PickerAction::Modify,
                ..
            })
        ));
        assert!(matches!(
            picker.drop_files([handle("b", 1)]),
            Err(FormError::ActionNotAllowed {
                action: PickerAction::DragDrop,
                ..
            })
        ));
        assert_eq!(picker.count(), 1);
    }

    #[test]
    fn test_drop_fires_on_drop_after_ingest() {
        let dropped = Arc::new(AtomicUsize::new(0));
        let callbacks = PickerCallbacks::default().on_drop({
            let dropped = dropped.clone();
            move |picker, records| {
                assert_eq!(picker.count() as usize, records.len());
                dropped.fetch_add(records.len(), Ordering::SeqCst);
            }
        });
        let mut picker = picker_with(PickerOverrides::default(), callbacks);

        let added = picker
            .drop_files([handle("a.png", 1), handle("b.png", 2)])
            .unwrap();

        assert_eq!(added.len(), 2);
        assert_eq!(dropped.load(Ordering::SeqCst), 2);
    }

    #[test]
    fn test_accepts_is_advisory() {
        let mut picker = picker_with(
            PickerOverrides {
                file_input: crate::config::FileInputOverrides {
                    accept: Some(".pdf".into()),
                    ..Default::default()
                },
                ..PickerOverrides::default()
            },
            PickerCallbacks::default(),
        );

        let added = picker.add_files([handle("ok.pdf", 1), handle("nope.exe", 1)]);

        assert!(picker.accepts(&added[0]));
        assert!(!picker.accepts(&added[1]));
        assert_eq!(picker.count(), 2);
    }
}
