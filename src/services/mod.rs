pub mod browser;
pub mod chart;
pub mod export;
pub mod history;
pub mod mapping;
pub mod row_editor;
pub mod upload;
pub mod validation;

pub use browser::SheetBrowser;
pub use chart::ChartPanel;
pub use mapping::MappingEditor;
pub use row_editor::RowEditor;
pub use validation::{HeaderPicker, HeaderValidation, ValidationWorkflow};
