//! Dynamic multi-value input lists: trip destinations (text rows) and
//! photo upload slots (file rows).
//!
//! A [`ListManager`] owns the ordered rows of one container and enforces
//! its cardinality rules. It never touches a rendering surface: after every
//! call the host reads [`ListManager::rows`], [`ListManager::focused`] and
//! [`ListManager::add_enabled`] and mirrors them onto whatever it draws.
//!
//! No operation here fails. Structural conflicts (removing the last row of
//! a required list, adding past capacity) resolve to a corrective action or
//! a no-op instead of an error.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::CoreError;
use crate::types::RowId;

// ---------------------------------------------------------------------------
// Constants
// ---------------------------------------------------------------------------

/// Default upper bound on upload slots for a file-mode list.
pub const DEFAULT_MAX_FILE_ROWS: usize = 8;

/// Image extensions accepted in an upload slot (lowercase, no dot).
pub const ACCEPTED_IMAGE_EXTENSIONS: &[&str] = &["png", "jpg", "jpeg", "gif", "webp"];

// ---------------------------------------------------------------------------
// Row model
// ---------------------------------------------------------------------------

/// Payload kind carried by every row of a list.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ListMode {
    #[default]
    Text,
    File,
}

impl ListMode {
    /// Parse the value of a list marker attribute. Anything other than
    /// `file` is a text list.
    pub fn from_attr(value: &str) -> Self {
        if value.trim().eq_ignore_ascii_case("file") {
            Self::File
        } else {
            Self::Text
        }
    }
}

/// A file picked into an upload slot.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FileSelection {
    /// Base name shown next to the slot and sent as the upload file name.
    pub file_name: String,
    /// Where the bytes live on the host.
    pub path: PathBuf,
}

impl FileSelection {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        let file_name = path
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_default();
        Self { file_name, path }
    }

    /// Lowercased extension of the file name, if any.
    pub fn extension(&self) -> Option<String> {
        Path::new(&self.file_name)
            .extension()
            .map(|ext| ext.to_string_lossy().to_ascii_lowercase())
    }

    /// Whether the file is one of the [`ACCEPTED_IMAGE_EXTENSIONS`].
    pub fn is_accepted_image(&self) -> bool {
        self.extension()
            .is_some_and(|ext| ACCEPTED_IMAGE_EXTENSIONS.contains(&ext.as_str()))
    }
}

/// The input held by one row.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RowSlot {
    Text(String),
    File(Option<FileSelection>),
}

impl RowSlot {
    /// A text slot is empty when it holds only whitespace; a file slot when
    /// nothing is selected.
    pub fn is_empty(&self) -> bool {
        match self {
            Self::Text(value) => value.trim().is_empty(),
            Self::File(selection) => selection.is_none(),
        }
    }
}

/// One input row. `required` and `removable` are derived from the owning
/// list's configuration and row count and are recomputed after every
/// structural change.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Row {
    id: RowId,
    slot: RowSlot,
    required: bool,
    removable: bool,
    datalist: Option<String>,
}

impl Row {
    pub fn id(&self) -> RowId {
        self.id
    }

    pub fn slot(&self) -> &RowSlot {
        &self.slot
    }

    /// Text value of a text row, `None` for file rows.
    pub fn value(&self) -> Option<&str> {
        match &self.slot {
            RowSlot::Text(value) => Some(value),
            RowSlot::File(_) => None,
        }
    }

    /// Selected file of a file row, `None` for empty slots and text rows.
    pub fn file(&self) -> Option<&FileSelection> {
        match &self.slot {
            RowSlot::File(selection) => selection.as_ref(),
            RowSlot::Text(_) => None,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.slot.is_empty()
    }

    /// Whether the row's input carries the mandatory constraint.
    pub fn is_required(&self) -> bool {
        self.required
    }

    /// Whether the row's remove action is enabled.
    /// Autocomplete source of a text row, taken from the list's
    /// configuration. Always `None` for file rows.
    pub fn datalist(&self) -> Option<&str> {
        self.datalist.as_deref()
    }

    pub fn is_removable(&self) -> bool {
        self.removable
    }
}

// ---------------------------------------------------------------------------
// Configuration
// ---------------------------------------------------------------------------

/// Construction options for a [`ListManager`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ListConfig {
    /// Name under which every row's value is submitted.
    pub field_name: String,
    pub mode: ListMode,
    /// Text mode only: keep at least one row and make the first mandatory.
    pub required: bool,
    /// File mode only: slot capacity. `0` disables adding and clears rows.
    pub max_rows: usize,
    /// Text mode only: values seeded when the container starts empty.
    pub initial_values: Vec<String>,
    /// Autocomplete source attached to every text row.
    pub datalist: Option<String>,
    /// Element that triggers [`ListManager::add_row`].
    pub add_button: Option<String>,
}

impl ListConfig {
    pub fn text(field_name: impl Into<String>) -> Self {
        Self {
            field_name: field_name.into(),
            mode: ListMode::Text,
            required: false,
            max_rows: DEFAULT_MAX_FILE_ROWS,
            initial_values: Vec::new(),
            datalist: None,
            add_button: None,
        }
    }

    pub fn file(field_name: impl Into<String>) -> Self {
        Self {
            mode: ListMode::File,
            ..Self::text(field_name)
        }
    }

    pub fn with_required(mut self, required: bool) -> Self {
        self.required = required;
        self
    }

    pub fn with_max_rows(mut self, max_rows: usize) -> Self {
        self.max_rows = max_rows;
        self
    }

    pub fn with_initial_values(mut self, values: Vec<String>) -> Self {
        self.initial_values = values;
        self
    }

    pub fn with_datalist(mut self, datalist: impl Into<String>) -> Self {
        self.datalist = Some(datalist.into());
        self
    }

    /// Whether the minimum-row and first-row-mandatory rules apply.
    fn enforces_required(&self) -> bool {
        self.mode == ListMode::Text && self.required
    }
}

/// Floor a signed capacity at zero.
fn clamp_capacity(n: i64) -> usize {
    usize::try_from(n.max(0)).unwrap_or(usize::MAX)
}

// ---------------------------------------------------------------------------
// Manager
// ---------------------------------------------------------------------------

/// Ordered rows of one dynamic-list container plus its derived affordances.
#[derive(Debug, Clone)]
pub struct ListManager {
    config: ListConfig,
    rows: Vec<Row>,
    next_id: RowId,
    focused: Option<RowId>,
    add_enabled: bool,
}

impl ListManager {
    /// Bind an empty container.
    pub fn bind(config: ListConfig) -> Self {
        Self::bind_with_markup(config, Vec::new())
    }

    /// Bind a container that may already hold rows in markup.
    ///
    /// Existing rows are adopted and normalized. Otherwise a text list is
    /// seeded from `initial_values` (only the last seed is focused) or gets
    /// one empty unfocused row. A file list then gets its spare slot.
    pub fn bind_with_markup(config: ListConfig, existing: Vec<RowSlot>) -> Self {
        let mut manager = Self {
            config,
            rows: Vec::new(),
            next_id: 0,
            focused: None,
            add_enabled: true,
        };
        manager.populate(existing);
        manager
    }

    fn populate(&mut self, existing: Vec<RowSlot>) {
        let mode = self.config.mode;
        if !existing.is_empty() {
            for slot in existing {
                let slot = match (mode, slot) {
                    (ListMode::Text, RowSlot::File(_)) => RowSlot::Text(String::new()),
                    (ListMode::File, RowSlot::Text(_)) => RowSlot::File(None),
                    (_, slot) => slot,
                };
                self.push_row(slot);
            }
        } else if mode == ListMode::Text {
            let seeds = self.config.initial_values.clone();
            if seeds.is_empty() {
                self.push_row(RowSlot::Text(String::new()));
            } else {
                let last = seeds.len() - 1;
                for (index, seed) in seeds.iter().enumerate() {
                    self.add_row(Some(seed.as_str()), index == last);
                }
            }
        }

        if mode == ListMode::File {
            self.ensure_spare();
        } else {
            self.refresh();
        }
    }

    // ---- queries ----

    pub fn config(&self) -> &ListConfig {
        &self.config
    }

    pub fn mode(&self) -> ListMode {
        self.config.mode
    }

    pub fn field_name(&self) -> &str {
        &self.config.field_name
    }

    pub fn rows(&self) -> &[Row] {
        &self.rows
    }

    pub fn row(&self, id: RowId) -> Option<&Row> {
        self.rows.iter().find(|row| row.id == id)
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Row that should hold input focus after the last operation.
    pub fn focused(&self) -> Option<RowId> {
        self.focused
    }

    /// Whether the add affordance is enabled.
    pub fn add_enabled(&self) -> bool {
        self.add_enabled
    }

    pub fn max_rows(&self) -> usize {
        self.config.max_rows
    }

    /// Number of rows whose slot is empty.
    pub fn empty_row_count(&self) -> usize {
        self.rows.iter().filter(|row| row.is_empty()).count()
    }

    /// Files currently selected, in row order.
    pub fn selected_files(&self) -> Vec<&FileSelection> {
        self.rows.iter().filter_map(Row::file).collect()
    }

    /// Non-blank text values, in row order.
    pub fn text_values(&self) -> Vec<&str> {
        self.rows
            .iter()
            .filter_map(Row::value)
            .map(str::trim)
            .filter(|value| !value.is_empty())
            .collect()
    }

    /// `(field_name, value)` pairs as a form submission would carry them.
    /// Blank text rows and empty file slots are skipped; file rows submit
    /// their file name.
    pub fn submitted_values(&self) -> Vec<(String, String)> {
        let name = &self.config.field_name;
        self.rows
            .iter()
            .filter(|row| !row.is_empty())
            .map(|row| match &row.slot {
                RowSlot::Text(value) => (name.clone(), value.trim().to_string()),
                RowSlot::File(selection) => (
                    name.clone(),
                    selection
                        .as_ref()
                        .map(|file| file.file_name.clone())
                        .unwrap_or_default(),
                ),
            })
            .collect()
    }

    /// Check the mandatory first value of a required text list.
    pub fn validate(&self) -> Result<(), CoreError> {
        if !self.config.enforces_required() {
            return Ok(());
        }
        match self.rows.first() {
            Some(row) if !row.is_empty() => Ok(()),
            _ => Err(CoreError::Validation(format!(
                "'{}' requires at least one value",
                self.config.field_name
            ))),
        }
    }

    // ---- operations ----

    /// Append a row.
    ///
    /// Text mode pre-fills `value`. File mode ignores `value`, does nothing
    /// once the list holds `max_rows` rows, and focuses the existing spare
    /// slot instead of appending a second empty one. The new (or spare) row
    /// takes focus iff `focus`.
    pub fn add_row(&mut self, value: Option<&str>, focus: bool) -> Option<RowId> {
        let id = match self.config.mode {
            ListMode::Text => {
                self.push_row(RowSlot::Text(value.unwrap_or_default().to_string()))
            }
            ListMode::File => {
                if self.rows.len() >= self.config.max_rows {
                    tracing::debug!(
                        field = %self.config.field_name,
                        max_rows = self.config.max_rows,
                        "Upload list is full, add ignored",
                    );
                    self.refresh();
                    return None;
                }
                match self.rows.iter().find(|row| row.is_empty()) {
                    Some(spare) => spare.id,
                    None => self.push_row(RowSlot::File(None)),
                }
            }
        };
        if focus {
            self.focused = Some(id);
        }
        self.refresh();
        Some(id)
    }

    /// Remove a row. Returns `true` if a row was actually removed.
    ///
    /// The sole row of a required text list is cleared and refocused
    /// instead. File lists re-establish their spare slot afterwards.
    /// Unknown ids are ignored.
    pub fn remove_row(&mut self, id: RowId) -> bool {
        let Some(index) = self.position(id) else {
            return false;
        };

        if self.config.enforces_required() && self.rows.len() == 1 {
            self.rows[index].slot = RowSlot::Text(String::new());
            self.focused = Some(id);
            self.refresh();
            return false;
        }

        self.rows.remove(index);
        if self.focused == Some(id) {
            self.focused = None;
        }

        if self.config.mode == ListMode::File {
            self.ensure_spare();
        } else {
            self.refresh();
        }
        true
    }

    /// Replace the text of a text row. No-op for file rows and unknown ids.
    pub fn set_value(&mut self, id: RowId, value: impl Into<String>) {
        if let Some(row) = self.rows.iter_mut().find(|row| row.id == id) {
            if let RowSlot::Text(current) = &mut row.slot {
                *current = value.into();
            }
        }
    }

    /// Record a file-selection change on a file row, then re-establish the
    /// spare slot. A file that is not an accepted image leaves the slot
    /// empty. Returns `true` if the selection was stored.
    pub fn select_file(&mut self, id: RowId, selection: Option<FileSelection>) -> bool {
        if self.config.mode != ListMode::File {
            return false;
        }
        let Some(index) = self.position(id) else {
            return false;
        };

        let selection = selection.filter(|file| {
            let accepted = file.is_accepted_image();
            if !accepted {
                tracing::debug!(file = %file.file_name, "Rejected non-image upload");
            }
            accepted
        });
        let stored = selection.is_some();
        self.rows[index].slot = RowSlot::File(selection);
        self.ensure_spare();
        stored
    }

    /// Guarantee exactly one empty upload slot while fewer than `max_rows`
    /// rows hold a file, and none once the list is full.
    ///
    /// Filled rows keep their order; the spare slot is always last. Filled
    /// rows beyond `max_rows` are dropped. A capacity of zero clears the
    /// list, including selected files. Idempotent. No-op for text lists.
    pub fn ensure_spare(&mut self) {
        if self.config.mode != ListMode::File {
            return;
        }
        let max = self.config.max_rows;

        if max == 0 {
            let discarded = self.rows.iter().filter(|row| !row.is_empty()).count();
            if discarded > 0 {
                tracing::warn!(
                    field = %self.config.field_name,
                    discarded,
                    "Upload capacity is zero, discarding selected files",
                );
            }
            self.rows.clear();
            self.focused = None;
            self.refresh();
            return;
        }

        let mut kept = Vec::with_capacity(max);
        let mut spare = None;
        let mut dropped = 0usize;
        for row in std::mem::take(&mut self.rows) {
            if row.is_empty() {
                spare.get_or_insert(row);
            } else if kept.len() < max {
                kept.push(row);
            } else {
                dropped += 1;
            }
        }
        if dropped > 0 {
            tracing::debug!(
                field = %self.config.field_name,
                dropped,
                max_rows = max,
                "Upload capacity shrank below selection count",
            );
        }

        let filled = kept.len();
        self.rows = kept;
        if filled < max {
            let spare = match spare {
                Some(row) => row,
                None => self.new_row(RowSlot::File(None)),
            };
            self.rows.push(spare);
        }

        if let Some(focused) = self.focused {
            if self.position(focused).is_none() {
                self.focused = None;
            }
        }
        self.refresh();
    }

    /// Clear every upload slot, optionally apply a new capacity, then seed
    /// a single empty slot. Used when the list is rebound to another record.
    pub fn reset(&mut self, new_max: Option<i64>) {
        if self.config.mode != ListMode::File {
            return;
        }
        self.rows.clear();
        self.focused = None;
        if let Some(max) = new_max {
            self.config.max_rows = clamp_capacity(max);
        }
        self.push_row(RowSlot::File(None));
        self.ensure_spare();
    }

    /// Change upload capacity (floored at zero) and re-establish the spare
    /// slot.
    pub fn set_max(&mut self, max: i64) {
        if self.config.mode != ListMode::File {
            return;
        }
        self.config.max_rows = clamp_capacity(max);
        self.ensure_spare();
    }

    /// Discard all text rows and re-run the seeding policy with `values`.
    /// Used when a text list is repopulated for another record.
    pub fn reseed(&mut self, values: Vec<String>) {
        if self.config.mode != ListMode::Text {
            return;
        }
        self.rows.clear();
        self.focused = None;
        self.config.initial_values = values;
        self.populate(Vec::new());
    }

    // ---- private helpers ----

    fn position(&self, id: RowId) -> Option<usize> {
        self.rows.iter().position(|row| row.id == id)
    }

    fn new_row(&mut self, slot: RowSlot) -> Row {
        let id = self.next_id;
        self.next_id += 1;
        Row {
            id,
            slot,
            required: false,
            removable: true,
            datalist: None,
        }
    }

    fn push_row(&mut self, slot: RowSlot) -> RowId {
        let row = self.new_row(slot);
        let id = row.id;
        self.rows.push(row);
        id
    }

    /// Recompute per-row flags and the add affordance from the current row
    /// count and configuration.
    fn refresh(&mut self) {
        let count = self.rows.len();
        let required = self.config.enforces_required();
        let datalist = match self.config.mode {
            ListMode::Text => self.config.datalist.as_deref(),
            ListMode::File => None,
        };
        for (index, row) in self.rows.iter_mut().enumerate() {
            row.required = required && index == 0;
            row.removable = !(required && count == 1);
            row.datalist = datalist.map(str::to_string);
        }
        self.add_enabled = match self.config.mode {
            ListMode::Text => true,
            ListMode::File => count < self.config.max_rows,
        };
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
