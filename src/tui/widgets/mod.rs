pub mod dropdown;
pub mod form;
pub mod modal;
pub mod status;
pub mod table;
pub mod toasts;

pub use form::{FieldKind, FormEvent, FormField, FormState};
pub use modal::{classify, modal_key, render_message, render_modal};
pub use status::StatusBar;
pub use table::ResourceTable;
pub use toasts::ToastStack;
