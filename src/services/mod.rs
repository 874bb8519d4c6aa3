// Services layer - orchestration over stores and external seams
pub mod report_manager;

pub use report_manager::ReportManager;
