// ==========================================
// Dual Meet APS - API layer
// ==========================================
// Entry points used by the CLI and by embedding applications
// ==========================================

pub mod error;
pub mod meet_api;
pub mod validator;

pub use error::{ApiError, ApiResult, ErrorKind};
pub use meet_api::{
    AssignMatsResponse, GeneratePairingsResponse, MeetApi, MeetLockGrant, ReorderBoutsResponse,
    RestPenaltyReport,
};
