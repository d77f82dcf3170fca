//! UI components.

pub mod flow_chart;
pub mod graph_view;
