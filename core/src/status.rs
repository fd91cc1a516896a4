//! Per-operation status-to-error tables.
//!
//! Each table is an ordered literal of `(status, kind, message)` entries and
//! is consulted by `client::interpret_response` for non-2xx responses. A
//! status appears at most once per table.

use crate::endpoints::Operation;
use crate::error::{ApiError, ErrorKind};

/// One documented error status of an operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StatusMapping {
    pub status: u16,
    pub kind: ErrorKind,
    pub message: &'static str,
}

pub type StatusTable = &'static [StatusMapping];

const fn map(status: u16, kind: ErrorKind, message: &'static str) -> StatusMapping {
    StatusMapping {
        status,
        kind,
        message,
    }
}

use ErrorKind::*;

pub const AUTHENTICATE: StatusTable = &[
    map(400, InvalidParameter, "Please provide a valid email"),
    map(401, InvalidCredentials, "Please provide valid credentials"),
    map(403, EmailNotVerified, "Email hasn't been verified"),
];

pub const REGISTER: StatusTable = &[
    map(
        400,
        InvalidParameter,
        "The email provided isn't valid or the passwords don't match",
    ),
    map(409, UserAlreadyExists, "An account with the same email already exists"),
];

pub const GET_OWN_PROJECTS: StatusTable = &[map(401, NotAuthenticated, "User not authenticated")];

pub const CREATE_NEW_PROJECT: StatusTable = &[
    map(400, InvalidParameter, "One or more of the fields are incorrectly formatted"),
    map(
        409,
        ProjectAlreadyExists,
        "Another project with the same title already exists",
    ),
];

pub const GET_PROJECT_BY_ID: StatusTable = &[map(404, NotFound, "Project with that ID wasn't found")];

pub const GET_ALL_PROJECTS: StatusTable = &[map(500, ServerError, "Server error")];

pub const UPDATE_PROJECT: StatusTable = &[
    map(
        400,
        InvalidParameter,
        "One or more of the fields in the updated project is invalid",
    ),
    map(401, NotAuthenticated, "User didn't provide a token"),
    map(404, NotFound, "Project with such ID doesn't exist"),
];

pub const DELETE_PROJECT: StatusTable = &[
    map(401, NotAuthenticated, "User hasn't been authenticated"),
    map(404, NotFound, "Project with that ID wasn't found"),
];

pub const JOIN_PROJECT: StatusTable = &[
    map(
        400,
        IllegalAccess,
        "You can't join the project as the owner of the project",
    ),
    map(401, NotAuthenticated, "User hasn't been authenticated"),
    map(403, IllegalAccess, "You can't join this project"),
    map(404, NotFound, "Project with that ID wasn't found"),
    map(409, IllegalAccess, "You're already a member of this project"),
];

pub const LEAVE_PROJECT: StatusTable = &[
    map(400, IllegalAccess, "You can't leave the project as the owner"),
    map(401, NotAuthenticated, "User not authenticated"),
    map(403, IllegalAccess, "User not a member of the project"),
    map(404, NotFound, "Project with that ID wasn't found"),
];

pub const GET_OWN_PROFILE: StatusTable = &[
    map(401, NotAuthenticated, "User not authenticated"),
    map(404, NotFound, "Profile hasn't been created yet"),
];

pub const GET_PROFILE_BY_ACCOUNT_ID: StatusTable = &[
    map(400, IllegalAccess, "Profile of that account hasn't been created yet"),
    map(404, NotFound, "Account with such ID wasn't found"),
];

pub const CREATE_OWN_PROFILE: StatusTable = &[
    map(404, NotFound, "Account wasn't found"),
    map(409, ProfileAlreadyExists, "Profile already exists, try updating instead"),
];

pub const UPDATE_OWN_PROFILE: StatusTable = &[map(404, NotFound, "Account wasn't found")];

/// The status table of `op`.
pub const fn table_for(op: Operation) -> StatusTable {
    match op {
        Operation::Authenticate => AUTHENTICATE,
        Operation::Register => REGISTER,
        Operation::GetOwnProjects => GET_OWN_PROJECTS,
        Operation::CreateNewProject => CREATE_NEW_PROJECT,
        Operation::GetProjectById => GET_PROJECT_BY_ID,
        Operation::GetAllProjects => GET_ALL_PROJECTS,
        Operation::UpdateProject => UPDATE_PROJECT,
        Operation::DeleteProject => DELETE_PROJECT,
        Operation::JoinProject => JOIN_PROJECT,
        Operation::LeaveProject => LEAVE_PROJECT,
        Operation::GetOwnProfile => GET_OWN_PROFILE,
        Operation::GetProfileByAccountId => GET_PROFILE_BY_ACCOUNT_ID,
        Operation::CreateOwnProfile => CREATE_OWN_PROFILE,
        Operation::UpdateOwnProfile => UPDATE_OWN_PROFILE,
    }
}

/// Find the entry for `status`, scanning the whole table.
pub fn lookup(table: StatusTable, status: u16) -> Option<&'static StatusMapping> {
    table.iter().find(|entry| entry.status == status)
}

impl StatusMapping {
    pub fn to_error(&self) -> ApiError {
        ApiError::Status {
            status: self.status,
            kind: self.kind,
            message: self.message.to_string(),
        }
    }
}
