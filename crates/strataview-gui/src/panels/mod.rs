/// Panels making up the main window layout.
pub mod chart_panel;
pub mod details_panel;
pub mod monitor_panel;
pub mod scan_panel;
pub mod tree_panel;
