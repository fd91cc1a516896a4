//! `#[repr(C)]` types for the FFI boundary.
//!
//! # Design
//! Results cross the boundary as a borrowed `FfiResult` that lives on the
//! worker's stack for the duration of the callback. The host copies what it
//! needs; nothing has to be freed on the C side. Argument decoding helpers
//! also live here to keep `lib.rs` focused on the `extern "C"` surface.

use std::ffi::{c_void, CStr, CString};
use std::os::raw::c_char;

use developool_core::client::ILLEGAL_ARGUMENTS;
use developool_core::{ApiError, ApiResult, ErrorKind};
use developool_middleware::Middleware;
use serde::de::DeserializeOwned;

/// Opaque handle to a `Middleware`. C callers receive a pointer to this and
/// pass it back into every `dp_*` operation.
pub struct DpMiddleware {
    pub(crate) inner: Middleware,
}

/// Outcome category delivered in `FfiResult::error_code`.
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FfiErrorCode {
    Ok = 0,
    InvalidArgument = 1,
    Serialization = 2,
    Transport = 3,
    EmptyResponse = 4,
    InvalidParameter = 5,
    InvalidCredentials = 6,
    EmailNotVerified = 7,
    UserAlreadyExists = 8,
    ProjectAlreadyExists = 9,
    ProfileAlreadyExists = 10,
    NotAuthenticated = 11,
    NotFound = 12,
    IllegalAccess = 13,
    ServerError = 14,
    UnexpectedStatus = 15,
    Deserialization = 16,
}

impl From<ErrorKind> for FfiErrorCode {
    fn from(kind: ErrorKind) -> Self {
        match kind {
            ErrorKind::InvalidParameter => FfiErrorCode::InvalidParameter,
            ErrorKind::InvalidCredentials => FfiErrorCode::InvalidCredentials,
            ErrorKind::EmailNotVerified => FfiErrorCode::EmailNotVerified,
            ErrorKind::UserAlreadyExists => FfiErrorCode::UserAlreadyExists,
            ErrorKind::ProjectAlreadyExists => FfiErrorCode::ProjectAlreadyExists,
            ErrorKind::ProfileAlreadyExists => FfiErrorCode::ProfileAlreadyExists,
            ErrorKind::NotAuthenticated => FfiErrorCode::NotAuthenticated,
            ErrorKind::NotFound => FfiErrorCode::NotFound,
            ErrorKind::IllegalAccess => FfiErrorCode::IllegalAccess,
            ErrorKind::ServerError => FfiErrorCode::ServerError,
        }
    }
}

impl From<&ApiError> for FfiErrorCode {
    fn from(err: &ApiError) -> Self {
        match err {
            ApiError::InvalidArgument(_) => FfiErrorCode::InvalidArgument,
            ApiError::SerializationError(_) => FfiErrorCode::Serialization,
            ApiError::TransportError(_) => FfiErrorCode::Transport,
            ApiError::EmptyResponse => FfiErrorCode::EmptyResponse,
            ApiError::Status { kind, .. } => (*kind).into(),
            ApiError::UnexpectedStatus { .. } => FfiErrorCode::UnexpectedStatus,
            ApiError::DeserializationError(_) => FfiErrorCode::Deserialization,
        }
    }
}

/// The outcome of one operation, as seen by the callback.
///
/// On success `error_code` is `Ok`, `error_message` is null and `body` holds
/// the raw response text. On failure `error_message` is set, `body` carries
/// the server's text for `UnexpectedStatus` and is null otherwise.
/// `http_status` is the rejecting status for `Status`-derived codes and
/// `UnexpectedStatus`, 0 otherwise. Every pointer is valid only until the
/// callback returns.
#[repr(C)]
pub struct FfiResult {
    pub error_code: FfiErrorCode,
    pub error_message: *const c_char,
    pub http_status: u16,
    pub body: *const c_char,
}

/// Completion callback. Invoked exactly once per accepted operation, from a
/// worker thread.
pub type DpCallback = Option<extern "C" fn(result: *const FfiResult, user_data: *mut c_void)>;

/// Host context pointer handed back untouched to the callback.
#[derive(Clone, Copy)]
pub(crate) struct UserData(pub(crate) *mut c_void);

// The host owns `user_data` and promises it may be used from any thread.
unsafe impl Send for UserData {}

/// A callback bound to its `user_data`, ready to receive one result.
#[derive(Clone, Copy)]
pub(crate) struct Completion {
    pub(crate) callback: extern "C" fn(*const FfiResult, *mut c_void),
    pub(crate) user_data: UserData,
}

impl Completion {
    pub(crate) fn deliver(self, result: ApiResult) {
        let owned = OwnedResult::from(result);
        let ffi = owned.as_ffi();
        (self.callback)(&ffi, self.user_data.0);
    }
}

/// Owns the C strings an `FfiResult` points into.
struct OwnedResult {
    error_code: FfiErrorCode,
    error_message: Option<CString>,
    http_status: u16,
    body: Option<CString>,
}

impl OwnedResult {
    fn as_ffi(&self) -> FfiResult {
        FfiResult {
            error_code: self.error_code,
            error_message: as_ptr(&self.error_message),
            http_status: self.http_status,
            body: as_ptr(&self.body),
        }
    }
}

impl From<ApiResult> for OwnedResult {
    fn from(result: ApiResult) -> Self {
        match result {
            Ok(payload) => OwnedResult {
                error_code: FfiErrorCode::Ok,
                error_message: None,
                http_status: 0,
                body: payload.body().map(c_string),
            },
            Err(err) => {
                let body = match &err {
                    ApiError::UnexpectedStatus { body, .. } => Some(c_string(body)),
                    _ => None,
                };
                OwnedResult {
                    error_code: FfiErrorCode::from(&err),
                    error_message: Some(c_string(&err.to_string())),
                    http_status: err.http_status().unwrap_or(0),
                    body,
                }
            }
        }
    }
}

fn as_ptr(value: &Option<CString>) -> *const c_char {
    value.as_ref().map_or(std::ptr::null(), |s| s.as_ptr())
}

/// Interior NULs cannot cross as C strings; they are dropped.
fn c_string(text: &str) -> CString {
    CString::new(text.replace('\0', "")).unwrap_or_default()
}

// ---------------------------------------------------------------------------
// Argument decoding
// ---------------------------------------------------------------------------

/// Read a C string argument. Null and non-UTF-8 input read as empty, which
/// the client then rejects as an invalid argument.
///
/// # Safety
/// `ptr` must be null or point to a NUL-terminated string.
pub(crate) unsafe fn text(ptr: *const c_char) -> String {
    if ptr.is_null() {
        return String::new();
    }
    let raw = unsafe { CStr::from_ptr(ptr) };
    raw.to_str().map(str::to_owned).unwrap_or_default()
}

/// Decode a required JSON argument.
///
/// # Safety
/// `ptr` must be null or point to a NUL-terminated string.
pub(crate) unsafe fn json<T: DeserializeOwned>(ptr: *const c_char) -> Result<T, ApiError> {
    let value = unsafe { optional_json(ptr) }?;
    value.ok_or_else(|| ApiError::InvalidArgument(ILLEGAL_ARGUMENTS.to_string()))
}

/// Decode an optional JSON argument; null means absent.
///
/// # Safety
/// `ptr` must be null or point to a NUL-terminated string.
pub(crate) unsafe fn optional_json<T: DeserializeOwned>(
    ptr: *const c_char,
) -> Result<Option<T>, ApiError> {
    if ptr.is_null() {
        return Ok(None);
    }
    let raw = unsafe { text(ptr) };
    serde_json::from_str(&raw)
        .map(Some)
        .map_err(|e| ApiError::InvalidArgument(format!("malformed JSON argument: {e}")))
}

#[cfg(test)]
mod tests {
    use developool_core::{Payload, Project, ProjectFilter};

    use super::*;

    #[test]
    fn status_errors_keep_kind_and_status() {
        let err = ApiError::Status {
            status: 409,
            kind: ErrorKind::ProfileAlreadyExists,
            message: "Profile already exists, try updating instead".to_string(),
        };
        let owned = OwnedResult::from(Err(err));
        assert_eq!(owned.error_code, FfiErrorCode::ProfileAlreadyExists);
        assert_eq!(owned.http_status, 409);
        assert!(owned.body.is_none());
        assert_eq!(
            owned.error_message.unwrap().to_str().unwrap(),
            "Profile already exists, try updating instead (HTTP 409)"
        );
    }

    #[test]
    fn unexpected_status_carries_body() {
        let owned = OwnedResult::from(Err(ApiError::UnexpectedStatus {
            status: 418,
            body: "teapot".to_string(),
        }));
        assert_eq!(owned.error_code, FfiErrorCode::UnexpectedStatus);
        assert_eq!(owned.http_status, 418);
        assert_eq!(owned.body.unwrap().to_str().unwrap(), "teapot");
    }

    #[test]
    fn success_exposes_body_only() {
        let owned = OwnedResult::from(Ok(Payload::Body("[]".to_string())));
        let ffi = owned.as_ffi();
        assert_eq!(ffi.error_code, FfiErrorCode::Ok);
        assert!(ffi.error_message.is_null());
        assert_eq!(unsafe { CStr::from_ptr(ffi.body) }.to_str().unwrap(), "[]");
    }

    #[test]
    fn transport_errors_have_no_status() {
        let owned = OwnedResult::from(Err(ApiError::TransportError("refused".to_string())));
        assert_eq!(owned.error_code, FfiErrorCode::Transport);
        assert_eq!(owned.http_status, 0);
    }

    #[test]
    fn nul_bytes_are_dropped() {
        assert_eq!(c_string("a\0b").to_str().unwrap(), "ab");
    }

    #[test]
    fn null_text_reads_empty() {
        assert_eq!(unsafe { text(std::ptr::null()) }, "");
    }

    #[test]
    fn json_arguments() {
        let raw = CString::new(r#"{"title":"Chess","private":false}"#).unwrap();
        let project: Project = unsafe { json(raw.as_ptr()) }.unwrap();
        assert_eq!(project, Project::new("Chess", false));

        let missing: Result<Project, _> = unsafe { json(std::ptr::null()) };
        assert!(matches!(missing, Err(ApiError::InvalidArgument(_))));

        let bad = CString::new("{not json").unwrap();
        let malformed: Result<Project, _> = unsafe { json(bad.as_ptr()) };
        assert!(matches!(malformed, Err(ApiError::InvalidArgument(_))));

        let absent: Option<ProjectFilter> = unsafe { optional_json(std::ptr::null()) }.unwrap();
        assert!(absent.is_none());
    }
}
