//! Static endpoint table for the Developool API.
//!
//! Every logical operation resolves to exactly one `(method, route)` pair.
//! Routes are relative to the client's base URL and several operations share
//! a route, differing only by method or by the path segment appended to it.

use crate::http::HttpMethod;

/// Base URL of the production API.
pub const DEFAULT_BASE_URL: &str = "http://developool.com/api";

/// An immutable `(method, route)` pair.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Endpoint {
    pub method: HttpMethod,
    pub route: &'static str,
}

impl Endpoint {
    const fn new(method: HttpMethod, route: &'static str) -> Self {
        Self { method, route }
    }
}

pub const AUTH: &str = "/auth/";
pub const REGISTER: &str = "/register/";
pub const OWN_PROJECTS: &str = "/accounts/projects/";
pub const PROJECT: &str = "/project/";
pub const PROJECT_JOIN: &str = "/project/join/";
pub const PROJECT_LEAVE: &str = "/project/leave/";
pub const PROFILE: &str = "/profile/";

/// The domain operations this client can perform.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Operation {
    Authenticate,
    Register,
    GetOwnProjects,
    CreateNewProject,
    GetProjectById,
    GetAllProjects,
    UpdateProject,
    DeleteProject,
    JoinProject,
    LeaveProject,
    GetOwnProfile,
    GetProfileByAccountId,
    CreateOwnProfile,
    UpdateOwnProfile,
}

impl Operation {
    pub const ALL: [Operation; 14] = [
        Operation::Authenticate,
        Operation::Register,
        Operation::GetOwnProjects,
        Operation::CreateNewProject,
        Operation::GetProjectById,
        Operation::GetAllProjects,
        Operation::UpdateProject,
        Operation::DeleteProject,
        Operation::JoinProject,
        Operation::LeaveProject,
        Operation::GetOwnProfile,
        Operation::GetProfileByAccountId,
        Operation::CreateOwnProfile,
        Operation::UpdateOwnProfile,
    ];

    pub const fn endpoint(self) -> Endpoint {
        use HttpMethod::{Delete, Get, Post, Put};
        match self {
            Operation::Authenticate => Endpoint::new(Post, AUTH),
            Operation::Register => Endpoint::new(Post, REGISTER),
            Operation::GetOwnProjects => Endpoint::new(Get, OWN_PROJECTS),
            Operation::CreateNewProject => Endpoint::new(Post, PROJECT),
            Operation::GetProjectById => Endpoint::new(Get, PROJECT),
            Operation::GetAllProjects => Endpoint::new(Get, PROJECT),
            Operation::UpdateProject => Endpoint::new(Put, PROJECT),
            Operation::DeleteProject => Endpoint::new(Delete, PROJECT),
            Operation::JoinProject => Endpoint::new(Post, PROJECT_JOIN),
            Operation::LeaveProject => Endpoint::new(Post, PROJECT_LEAVE),
            Operation::GetOwnProfile => Endpoint::new(Get, PROFILE),
            Operation::GetProfileByAccountId => Endpoint::new(Get, PROFILE),
            Operation::CreateOwnProfile => Endpoint::new(Post, PROFILE),
            Operation::UpdateOwnProfile => Endpoint::new(Put, PROFILE),
        }
    }

    /// Whether the operation sends the caller's token.
    pub const fn requires_token(self) -> bool {
        !matches!(
            self,
            Operation::Authenticate
                | Operation::Register
                | Operation::GetAllProjects
                | Operation::GetProfileByAccountId
        )
    }

    pub const fn name(self) -> &'static str {
        match self {
            Operation::Authenticate => "authenticate",
            Operation::Register => "register",
            Operation::GetOwnProjects => "get_own_projects",
            Operation::CreateNewProject => "create_new_project",
            Operation::GetProjectById => "get_project_by_id",
            Operation::GetAllProjects => "get_all_projects",
            Operation::UpdateProject => "update_project",
            Operation::DeleteProject => "delete_project",
            Operation::JoinProject => "join_project",
            Operation::LeaveProject => "leave_project",
            Operation::GetOwnProfile => "get_own_profile",
            Operation::GetProfileByAccountId => "get_profile_by_account_id",
            Operation::CreateOwnProfile => "create_own_profile",
            Operation::UpdateOwnProfile => "update_own_profile",
        }
    }
}
