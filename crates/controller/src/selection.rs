use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ItemKind {
    File,
    Folder,
}

/// One row of a directory listing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Item {
    pub path: String,
    pub kind: ItemKind,
}
impl Item {
    pub fn file(path: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            kind: ItemKind::File,
        }
    }

    pub fn folder(path: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            kind: ItemKind::Folder,
        }
    }
}

/// When the download button lights up.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum DownloadPolicy {
    /// Anything selected.
    AnySelection,
    /// At least one selected item is a file.
    #[default]
    FilesOnly,
}

/// Which bulk actions are available for the current selection.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Buttons {
    pub download: bool,
    pub delete: bool,
    pub rename: bool,
    pub move_to: bool,
}

/// Checked rows of a listing.
///
/// "Select all" is never stored; it is derived from the rows every time.
#[derive(Debug, Clone, Default)]
pub struct Selection {
    items: Vec<Item>,
    checked: BTreeSet<usize>,
}
impl Selection {
    pub fn new(items: impl IntoIterator<Item = Item>) -> Self {
        Self {
            items: items.into_iter().collect(),
            checked: BTreeSet::new(),
        }
    }

    pub fn items(&self) -> &[Item] {
        &self.items
    }

    /// Check or uncheck the row for `path`. Returns `false` if no row has that path.
    pub fn set(&mut self, path: &str, checked: bool) -> bool {
        let Some(index) = self.items.iter().position(|item| item.path == path) else {
            return false;
        };
        match checked {
            true => self.checked.insert(index),
            false => self.checked.remove(&index),
        };
        true
    }

    pub fn toggle(&mut self, path: &str) -> bool {
        let checked = self.is_checked(path);
        self.set(path, !checked)
    }

    pub fn is_checked(&self, path: &str) -> bool {
        self.items.iter().position(|item| item.path == path).is_some_and(|index| self.checked.contains(&index))
    }

    /// The "select all" checkbox being clicked.
    pub fn set_all(&mut self, checked: bool) {
        self.checked = match checked {
            true => (0..self.items.len()).collect(),
            false => BTreeSet::new(),
        };
    }

    /// Whether "select all" shows as checked: every row is checked, and there
    /// is at least one row.
    pub fn all_checked(&self) -> bool {
        !self.items.is_empty() && self.checked.len() == self.items.len()
    }

    pub fn clear(&mut self) {
        self.checked.clear();
    }

    /// Checked rows, in listing order.
    pub fn selected(&self) -> Vec<&Item> {
        self.checked.iter().filter_map(|index| self.items.get(*index)).collect()
    }

    pub fn selected_paths(&self) -> Vec<String> {
        self.selected().into_iter().map(|item| item.path.clone()).collect()
    }

    pub fn len(&self) -> usize {
        self.checked.len()
    }

    pub fn is_empty(&self) -> bool {
        self.checked.is_empty()
    }

    pub fn buttons(&self, policy: DownloadPolicy) -> Buttons {
        let any = !self.is_empty();
        let download = match policy {
            DownloadPolicy::AnySelection => any,
            DownloadPolicy::FilesOnly => self.selected().iter().any(|item| item.kind == ItemKind::File),
        };
        Buttons {
            download,
            delete: any,
            rename: self.len() == 1,
            move_to: any,
        }
    }
}
