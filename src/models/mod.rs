pub mod file;
pub mod workflow;

pub use file::{
    BatchUploadResponse, FileUploadEntry, FileUploadSuccess, UploadError, UploadFile,
    UploadResponse, UploadResult, ERROR_CODES,
};
pub use workflow::{
    ResponseMode, WorkflowData, WorkflowInputFile, WorkflowInputs, WorkflowOutputs,
    WorkflowRequest, WorkflowResponse, WorkflowRunPayload,
};
