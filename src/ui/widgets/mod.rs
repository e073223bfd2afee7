// src/ui/widgets/mod.rs

pub mod footer; // Key bindings.
pub mod input; // The target domain field.
pub mod report_view; // The scrollable JSON report.
pub mod status; // Feedback from the last action.
pub mod summary; // Counts and probe outcomes at a glance.
