//! Field binding controllers for metadata-driven forms.
//!
//! A [`BoundField`] connects a widget to a metadata node and a [`Monitor`].
//! It turns toolkit events (shown, focus gained/lost, edits, cancel) into
//! the monitor protocol: load the initial value once, ask before saving a
//! change, verify input before focus leaves, and restore the committed
//! value on rollback.
//!
//! ```
//! use std::rc::Rc;
//! use metaform_binding::{BoundField, CatalogLocalizer, FieldHandle, MemoryWidget, NumericKind};
//! use metaform_binding::monitor::AcceptAll;
//! use metaform_types::{FieldMetadata, ValueType};
//!
//! let metadata = FieldMetadata::new("price", ValueType::Double);
//! let mut field: BoundField<NumericKind, _> =
//!     BoundField::new(metadata, Rc::new(AcceptAll), Rc::new(CatalogLocalizer::new()), MemoryWidget::new())?;
//! field.on_shown();
//! field.on_focus_gained();
//! field.widget_mut().type_text("12.5");
//! field.on_edit();
//! field.on_focus_lost();
//! assert_eq!(field.raw_data().as_deref(), Some("12.50"));
//! # Ok::<(), metaform_binding::FieldError>(())
//! ```

pub mod builder;
pub mod error;
pub mod field;
pub mod form;
pub mod form_monitor;
pub mod kind;
pub mod localizer;
pub mod monitor;
pub mod record;
pub mod widget;

pub use builder::{DescriptionError, bind_control, load_description};
pub use error::{FieldError, FormError, LocalizationError, MonitorError};
pub use field::{BoundField, FieldPhase};
pub use form::{Form, FormControl};
pub use form_monitor::{ActionHandler, FieldAccessor, FormManager, FormMonitor, StatusMessage, expect_value};
pub use kind::{BooleanKind, DateKind, EnumKind, FieldKind, IntegerKind, NumericKind, TextKind, UriKind};
pub use localizer::{CatalogLocalizer, LocaleChangeListener, Localizer};
pub use monitor::{AcceptAll, FieldHandle, Monitor, StandardValidation};
pub use record::{AcceptingManager, JsonRecord, json_form_monitor};
pub use widget::{FieldStyle, Highlight, MemoryWidget, Presentation, WidgetAdapter};
