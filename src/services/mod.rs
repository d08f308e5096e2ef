pub mod result_presenter;
pub mod upload_service;
pub mod workflow_service;

pub use result_presenter::{present, ResultView};
pub use upload_service::UploadService;
pub use workflow_service::{WorkflowOutcome, WorkflowService, WORKFLOW_FAILED_MESSAGE};
