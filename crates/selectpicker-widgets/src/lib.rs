//! Searchable, virtualized select picker.
//!
//! [`SelectPicker`] decorates a [`NativeSelect`] with a custom menu: option
//! rows flattened from options and groups, live search, chunked windowing
//! for long lists, selection limits, and paged loading from a
//! [`DataSource`].

pub mod config;
pub mod dropdown;
pub mod layout;
pub mod messages;
pub mod model;
pub mod native;
pub mod picker;
pub mod position;
pub mod render;
pub mod row;
pub mod search;
pub mod selection;
pub mod source;
pub mod timers;
pub mod viewport;

pub use config::{AllowList, MaxOptions, PickerConfig, Plural, SelectedTextFormat, SizeMode};
pub use dropdown::{DropdownLifecycle, DropdownToggle};
pub use layout::{
    ChromeConfig, DefaultProbe, LayoutProbe, MenuPlacement, PlacementRequest, ProbeReport,
    SizeInfo, SizingOracle,
};
pub use messages::{ButtonText, ChangeDetail, LimitNotice, PickerEvent};
pub use model::OptionModelBuilder;
pub use native::{NativeGroup, NativeNode, NativeOption, NativeSelect};
pub use picker::{PickerBuilder, SelectPicker};
pub use position::{Direction, PositionIndex};
pub use render::{
    BootstrapTemplates, EscapeSanitizer, PickerView, RowRenderer, Sanitizer, TemplateProvider,
};
pub use row::{ElementId, RowDescriptor, RowElement, RowKind};
pub use search::{SearchQuery, SearchStyle};
pub use selection::{Activation, Limit, Selection};
pub use source::{DataSource, FetchRequest, FetchResponse, PageKey, PagingState, SourceItem};
pub use timers::{Deferred, TimerQueue, NOTICE_DURATION, REVERT_DELAY, TYPE_AHEAD_RESET};
pub use viewport::{MountedRun, ViewportController};
