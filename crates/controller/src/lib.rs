//! Headless controllers behind the file browser: the metadata drawer, bulk
//! actions on a listing, and the move-destination picker. Each one owns its
//! state and talks to the server only through an [`ApiHandle`](filestation_client::ApiHandle).

mod bulk;
mod drawer;
pub mod error;
mod notice;
mod picker;
mod render;
mod selection;
pub mod status;
mod summary;

pub use crate::bulk::{Bulk, DeleteConfirmation};
pub use crate::drawer::{DiscardTarget, Drawer, DrawerSession, DrawerState, SaveOutcome};
pub use crate::notice::Notice;
pub use crate::picker::MovePicker;
pub use crate::render::Views;
pub use crate::selection::{Buttons, DownloadPolicy, Item, ItemKind, Selection};
pub use crate::status::{RowReport, row_status, row_statuses};
pub use crate::summary::{HashLine, Summary};
