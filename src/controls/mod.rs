//! Reusable presentation state, independent of any rendering backend.
//!
//! Everything here is plain data plus pure transitions so it can be driven
//! by the TUI, by tests, or by anything else that can deliver key presses
//! and pointer events.

pub mod modal;
pub mod overlay;
pub mod pager;
pub mod select;
pub mod spinner;
pub mod toast;

pub use modal::{ModalAction, ModalConfig, ModalHit, ModalState};
pub use overlay::{menu_position, Bounds, MenuPosition, ScrollOffset};
pub use pager::{PageRequest, Pager};
pub use select::{KeyResult, SelectConfig, SelectKey, SelectOption, SelectState, Selection};
pub use spinner::Spinner;
pub use toast::{Toast, ToastLevel, ToastQueue};
