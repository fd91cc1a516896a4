//! Stateless request builder and response classifier for the Developool API.
//!
//! # Design
//! `DevelopoolClient` holds only a `base_url` and carries no mutable state
//! between calls. Each domain operation has a `build_*` method that validates
//! its arguments, then assembles the URL, JSON body, headers and status table
//! into a `PreparedCall`. Whoever executes the call hands the `HttpResponse`
//! back to `PreparedCall::interpret`, which is the single place response
//! statuses are turned into results.

use serde::de::DeserializeOwned;
use serde::Serialize;

use crate::endpoints::Operation;
use crate::error::ApiError;
use crate::http::{HttpRequest, HttpResponse};
use crate::status::{self, StatusTable};
use crate::types::{
    present, CredentialsBody, Profile, ProfileBody, Project, ProjectBody, ProjectFilter,
    RegistrationBody,
};

pub const ILLEGAL_ARGUMENTS: &str = "Please provide valid arguments";
pub const INVALID_NEW_PROJECT: &str = "Please provide valid title and privacy fields";

pub const AUTHORIZATION_HEADER: &str = "Authorization";
pub const CONTENT_TYPE_HEADER: &str = "Content-type";
pub const JSON_CONTENT_TYPE: &str = "application/json";

/// Outcome of one operation: the raw body on success or a classified error.
pub type ApiResult = Result<Payload, ApiError>;

/// A successful response.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Payload {
    /// The response body, verbatim.
    Body(String),
    /// The server accepted a call that does not read a response body.
    Acknowledged,
}

impl Payload {
    pub fn body(&self) -> Option<&str> {
        match self {
            Payload::Body(body) => Some(body),
            Payload::Acknowledged => None,
        }
    }

    /// Decode the body into `T`.
    pub fn parse<T: DeserializeOwned>(&self) -> Result<T, ApiError> {
        let body = self
            .body()
            .ok_or_else(|| ApiError::DeserializationError("no body to decode".to_string()))?;
        serde_json::from_str(body).map_err(|e| ApiError::DeserializationError(e.to_string()))
    }
}

/// A fully-formed request plus everything needed to interpret its response.
#[derive(Debug, Clone)]
pub struct PreparedCall {
    pub operation: Operation,
    pub request: HttpRequest,
    pub expect_response_body: bool,
    pub status_errors: StatusTable,
}

impl PreparedCall {
    pub fn interpret(&self, response: HttpResponse) -> ApiResult {
        interpret_response(self.expect_response_body, self.status_errors, response)
    }
}

/// Classify a response against a status table.
///
/// Non-2xx statuses become the table's error, or `UnexpectedStatus` when the
/// table has no entry. A 2xx with an empty body is `EmptyResponse` when a
/// body is expected.
pub fn interpret_response(
    expect_response_body: bool,
    status_errors: StatusTable,
    response: HttpResponse,
) -> ApiResult {
    if !response.is_success() {
        return Err(match status::lookup(status_errors, response.status) {
            Some(mapping) => mapping.to_error(),
            None => ApiError::UnexpectedStatus {
                status: response.status,
                body: response.body,
            },
        });
    }
    if !expect_response_body {
        return Ok(Payload::Acknowledged);
    }
    if response.body.trim().is_empty() {
        return Err(ApiError::EmptyResponse);
    }
    Ok(Payload::Body(response.body))
}

/// Synchronous, stateless client for the Developool API.
#[derive(Debug, Clone)]
pub struct DevelopoolClient {
    base_url: String,
}

impl DevelopoolClient {
    pub fn new(base_url: &str) -> Self {
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn build_authenticate(&self, email: &str, password: &str) -> Result<PreparedCall, ApiError> {
        require(&[email, password])?;
        let body = to_json(&CredentialsBody { email, password })?;
        Ok(self.prepare(Operation::Authenticate, "", None, Some(body)))
    }

    pub fn build_register(
        &self,
        username: &str,
        email: &str,
        password: &str,
        password_confirmation: &str,
    ) -> Result<PreparedCall, ApiError> {
        require(&[username, email, password, password_confirmation])?;
        let body = to_json(&RegistrationBody {
            username,
            email,
            password,
            password_confirmation,
        })?;
        Ok(self.prepare(Operation::Register, "", None, Some(body)))
    }

    pub fn build_get_own_projects(&self, token: &str) -> Result<PreparedCall, ApiError> {
        require(&[token])?;
        Ok(self.prepare(Operation::GetOwnProjects, "", Some(token), None))
    }

    pub fn build_create_new_project(
        &self,
        token: &str,
        new_project: &Project,
    ) -> Result<PreparedCall, ApiError> {
        require(&[token])?;
        if present(&new_project.title).is_none() || new_project.is_private.is_none() {
            return Err(ApiError::InvalidArgument(INVALID_NEW_PROJECT.to_string()));
        }
        let body = to_json(&ProjectBody::from(new_project))?;
        Ok(self.prepare(Operation::CreateNewProject, "", Some(token), Some(body)))
    }

    pub fn build_get_project_by_id(
        &self,
        token: &str,
        project_id: &str,
    ) -> Result<PreparedCall, ApiError> {
        require(&[token, project_id])?;
        Ok(self.prepare(Operation::GetProjectById, &segment(project_id), Some(token), None))
    }

    /// List every project, optionally narrowed by `filter`.
    pub fn build_get_all_projects(
        &self,
        filter: Option<&ProjectFilter>,
    ) -> Result<PreparedCall, ApiError> {
        let query = filter.map(ProjectFilter::to_query_string).unwrap_or_default();
        let suffix = if query.is_empty() {
            query
        } else {
            format!("?{query}")
        };
        Ok(self.prepare(Operation::GetAllProjects, &suffix, None, None))
    }

    pub fn build_update_project(
        &self,
        token: &str,
        project_id: &str,
        updated_project: &Project,
    ) -> Result<PreparedCall, ApiError> {
        require(&[token, project_id])?;
        let body = to_json(&ProjectBody::from(updated_project))?;
        Ok(self.prepare(
            Operation::UpdateProject,
            &segment(project_id),
            Some(token),
            Some(body),
        ))
    }

    pub fn build_delete_project(
        &self,
        token: &str,
        project_id: &str,
    ) -> Result<PreparedCall, ApiError> {
        require(&[token, project_id])?;
        Ok(self.prepare(Operation::DeleteProject, &segment(project_id), Some(token), None))
    }

    pub fn build_join_project(&self, token: &str, project_id: &str) -> Result<PreparedCall, ApiError> {
        require(&[token, project_id])?;
        Ok(self.prepare(Operation::JoinProject, &segment(project_id), Some(token), None))
    }

    pub fn build_leave_project(&self, token: &str, project_id: &str) -> Result<PreparedCall, ApiError> {
        require(&[token, project_id])?;
        Ok(self.prepare(Operation::LeaveProject, &segment(project_id), Some(token), None))
    }

    pub fn build_get_own_profile(&self, token: &str) -> Result<PreparedCall, ApiError> {
        require(&[token])?;
        Ok(self.prepare(Operation::GetOwnProfile, "", Some(token), None))
    }

    pub fn build_get_profile_by_account_id(&self, account_id: &str) -> Result<PreparedCall, ApiError> {
        require(&[account_id])?;
        Ok(self.prepare(Operation::GetProfileByAccountId, &segment(account_id), None, None))
    }

    pub fn build_create_own_profile(
        &self,
        token: &str,
        profile: &Profile,
    ) -> Result<PreparedCall, ApiError> {
        require(&[token])?;
        let body = to_json(&ProfileBody::from(profile))?;
        Ok(self.prepare(Operation::CreateOwnProfile, "", Some(token), Some(body)))
    }

    pub fn build_update_own_profile(
        &self,
        token: &str,
        new_profile: &Profile,
    ) -> Result<PreparedCall, ApiError> {
        require(&[token])?;
        let body = to_json(&ProfileBody::from(new_profile))?;
        Ok(self.prepare(Operation::UpdateOwnProfile, "", Some(token), Some(body)))
    }

    fn prepare(
        &self,
        operation: Operation,
        suffix: &str,
        token: Option<&str>,
        body: Option<String>,
    ) -> PreparedCall {
        let endpoint = operation.endpoint();
        let mut headers = Vec::new();
        if body.is_some() {
            headers.push((CONTENT_TYPE_HEADER.to_string(), JSON_CONTENT_TYPE.to_string()));
        }
        if let Some(token) = token {
            headers.push((AUTHORIZATION_HEADER.to_string(), token.to_string()));
        }
        PreparedCall {
            operation,
            request: HttpRequest {
                method: endpoint.method,
                url: format!("{}{}{suffix}", self.base_url, endpoint.route),
                headers,
                body,
            },
            expect_response_body: true,
            status_errors: status::table_for(operation),
        }
    }
}

fn require(values: &[&str]) -> Result<(), ApiError> {
    if values.iter().any(|v| v.is_empty()) {
        return Err(ApiError::InvalidArgument(ILLEGAL_ARGUMENTS.to_string()));
    }
    Ok(())
}

fn segment(id: &str) -> String {
    urlencoding::encode(id).into_owned()
}

fn to_json<T: Serialize>(body: &T) -> Result<String, ApiError> {
    serde_json::to_string(body).map_err(|e| ApiError::SerializationError(e.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;
    use crate::http::HttpMethod;

    fn client() -> DevelopoolClient {
        DevelopoolClient::new("http://localhost:3000/api")
    }

    fn response(status: u16, body: &str) -> HttpResponse {
        HttpResponse {
            status,
            headers: Vec::new(),
            body: body.to_string(),
        }
    }

    fn json_body(call: &PreparedCall) -> serde_json::Value {
        serde_json::from_str(call.request.body.as_deref().unwrap()).unwrap()
    }

    #[test]
    fn trailing_slash_is_stripped() {
        let client = DevelopoolClient::new("http://localhost:3000/api/");
        let call = client.build_get_own_projects("t").unwrap();
        assert_eq!(call.request.url, "http://localhost:3000/api/accounts/projects/");
    }

    #[test]
    fn authenticate_posts_credentials_without_token() {
        let call = client().build_authenticate("a@b.c", "pw").unwrap();
        assert_eq!(call.operation, Operation::Authenticate);
        assert_eq!(call.request.method, HttpMethod::Post);
        assert_eq!(call.request.url, "http://localhost:3000/api/auth/");
        assert_eq!(
            call.request.headers,
            vec![("Content-type".to_string(), "application/json".to_string())]
        );
        let body = json_body(&call);
        assert_eq!(body["email"], "a@b.c");
        assert_eq!(body["password"], "pw");
    }

    #[test]
    fn register_sends_password2() {
        let call = client().build_register("ada", "a@b.c", "pw", "pw").unwrap();
        let body = json_body(&call);
        assert_eq!(body["username"], "ada");
        assert_eq!(body["password2"], "pw");
        assert!(call.request.header("Authorization").is_none());
    }

    #[test]
    fn empty_required_arguments_are_rejected() {
        let c = client();
        let project = Project::new("X", false);
        let profile = Profile::default();
        let results = vec![
            c.build_authenticate("", "pw"),
            c.build_authenticate("a@b.c", ""),
            c.build_register("ada", "a@b.c", "pw", ""),
            c.build_get_own_projects(""),
            c.build_create_new_project("", &project),
            c.build_get_project_by_id("t", ""),
            c.build_update_project("", "p1", &project),
            c.build_delete_project("t", ""),
            c.build_join_project("", "p1"),
            c.build_leave_project("t", ""),
            c.build_get_own_profile(""),
            c.build_get_profile_by_account_id(""),
            c.build_create_own_profile("", &profile),
            c.build_update_own_profile("", &profile),
        ];
        for result in results {
            assert_eq!(
                result.unwrap_err(),
                ApiError::InvalidArgument(ILLEGAL_ARGUMENTS.to_string())
            );
        }
    }

    #[test]
    fn create_new_project_requires_title_and_privacy() {
        let c = client();
        let untitled = Project {
            is_private: Some(false),
            ..Project::default()
        };
        let no_privacy = Project {
            title: Some("X".to_string()),
            ..Project::default()
        };
        for project in [untitled, no_privacy] {
            let err = c.build_create_new_project("t", &project).unwrap_err();
            assert_eq!(err, ApiError::InvalidArgument(INVALID_NEW_PROJECT.to_string()));
        }
    }

    #[test]
    fn create_new_project_sends_only_present_fields() {
        let call = client()
            .build_create_new_project("tok", &Project::new("X", false))
            .unwrap();
        assert_eq!(call.request.body.as_deref(), Some(r#"{"title":"X","private":false}"#));
        assert_eq!(
            call.request.headers,
            vec![
                ("Content-type".to_string(), "application/json".to_string()),
                ("Authorization".to_string(), "tok".to_string()),
            ]
        );
    }

    #[test]
    fn create_new_project_sends_skills_from_skills() {
        let project = Project {
            interests: vec!["music".to_string()],
            skills: vec!["rust".to_string()],
            ..Project::new("X", true)
        };
        let body = json_body(&client().build_create_new_project("t", &project).unwrap());
        assert_eq!(body["interests"], serde_json::json!(["music"]));
        assert_eq!(body["skills"], serde_json::json!(["rust"]));
    }

    #[test]
    fn get_all_projects_without_filter_has_no_query() {
        let call = client().build_get_all_projects(None).unwrap();
        assert_eq!(call.request.url, "http://localhost:3000/api/project/");
        assert!(call.request.headers.is_empty());
    }

    #[test]
    fn get_all_projects_repeats_list_parameters() {
        let filter = ProjectFilter {
            interests: vec!["go".to_string(), "rust".to_string()],
            ..ProjectFilter::default()
        };
        let call = client().build_get_all_projects(Some(&filter)).unwrap();
        assert_eq!(
            call.request.url,
            "http://localhost:3000/api/project/?interests[]=go&interests[]=rust"
        );
    }

    #[test]
    fn update_project_puts_to_project_id() {
        let update = Project {
            public_description: Some("new".to_string()),
            is_private: Some(true),
            ..Project::default()
        };
        let call = client().build_update_project("t", "p1", &update).unwrap();
        assert_eq!(call.request.method, HttpMethod::Put);
        assert_eq!(call.request.url, "http://localhost:3000/api/project/p1");
        assert_eq!(
            call.request.body.as_deref(),
            Some(r#"{"publicDescription":"new","private":true}"#)
        );
    }

    #[test]
    fn join_and_leave_append_project_id() {
        let c = client();
        let join = c.build_join_project("t", "p1").unwrap();
        let leave = c.build_leave_project("t", "p1").unwrap();
        assert_eq!(join.request.url, "http://localhost:3000/api/project/join/p1");
        assert_eq!(leave.request.url, "http://localhost:3000/api/project/leave/p1");
        assert!(leave.request.body.is_none());
        assert_eq!(leave.request.header("authorization"), Some("t"));
    }

    #[test]
    fn profile_by_account_id_is_anonymous() {
        let call = client().build_get_profile_by_account_id("acc 1").unwrap();
        assert_eq!(call.request.url, "http://localhost:3000/api/profile/acc%201");
        assert!(call.request.headers.is_empty());
    }

    #[test]
    fn empty_profile_update_sends_empty_object() {
        let call = client().build_update_own_profile("t", &Profile::default()).unwrap();
        assert_eq!(call.request.body.as_deref(), Some("{}"));
    }

    #[test]
    fn interpret_returns_raw_body() {
        let call = client().build_get_own_profile("t").unwrap();
        let result = call.interpret(response(200, "{\"firstName\":\"Ada\"}\n"));
        assert_eq!(result, Ok(Payload::Body("{\"firstName\":\"Ada\"}\n".to_string())));
    }

    #[test]
    fn interpret_treats_blank_body_as_empty_response() {
        let call = client().build_get_own_profile("t").unwrap();
        assert_eq!(call.interpret(response(200, "")), Err(ApiError::EmptyResponse));
        assert_eq!(call.interpret(response(201, " \n")), Err(ApiError::EmptyResponse));
    }

    #[test]
    fn interpret_maps_documented_statuses() {
        let call = client().build_authenticate("a@b.c", "pw").unwrap();
        let kinds: Vec<Option<ErrorKind>> = [400, 401, 403]
            .into_iter()
            .map(|status| call.interpret(response(status, "")).unwrap_err().kind())
            .collect();
        assert_eq!(
            kinds,
            vec![
                Some(ErrorKind::InvalidParameter),
                Some(ErrorKind::InvalidCredentials),
                Some(ErrorKind::EmailNotVerified),
            ]
        );
    }

    #[test]
    fn interpret_keeps_unmapped_status_and_body() {
        let call = client().build_get_project_by_id("t", "p1").unwrap();
        let err = call.interpret(response(502, "bad gateway")).unwrap_err();
        assert_eq!(
            err,
            ApiError::UnexpectedStatus {
                status: 502,
                body: "bad gateway".to_string(),
            }
        );
    }

    #[test]
    fn interpret_without_body_acknowledges() {
        let result = interpret_response(false, status::DELETE_PROJECT, response(204, ""));
        assert_eq!(result, Ok(Payload::Acknowledged));
        let err = interpret_response(false, status::DELETE_PROJECT, response(404, "")).unwrap_err();
        assert_eq!(err.kind(), Some(ErrorKind::NotFound));
    }

    #[test]
    fn payload_parse_decodes_projects() {
        let payload = Payload::Body(r#"[{"id":"p1","title":"A","private":false}]"#.to_string());
        let projects: Vec<Project> = payload.parse().unwrap();
        assert_eq!(projects[0].id.as_deref(), Some("p1"));

        let err = Payload::Body("not json".to_string()).parse::<Project>().unwrap_err();
        assert!(matches!(err, ApiError::DeserializationError(_)));
        assert!(Payload::Acknowledged.parse::<Project>().is_err());
    }

    #[test]
    fn every_declared_status_maps_to_its_kind() {
        use ErrorKind::*;

        let c = client();
        let project = Project::new("X", false);
        let profile = Profile::default();
        let cases: [(PreparedCall, &[(u16, ErrorKind)]); 14] = [
            (
                c.build_authenticate("a@b.c", "pw").unwrap(),
                &[(400, InvalidParameter), (401, InvalidCredentials), (403, EmailNotVerified)],
            ),
            (
                c.build_register("u", "a@b.c", "pw", "pw").unwrap(),
                &[(400, InvalidParameter), (409, UserAlreadyExists)],
            ),
            (c.build_get_own_projects("t").unwrap(), &[(401, NotAuthenticated)]),
            (
                c.build_create_new_project("t", &project).unwrap(),
                &[(400, InvalidParameter), (409, ProjectAlreadyExists)],
            ),
            (c.build_get_project_by_id("t", "p1").unwrap(), &[(404, NotFound)]),
            (c.build_get_all_projects(None).unwrap(), &[(500, ServerError)]),
            (
                c.build_update_project("t", "p1", &project).unwrap(),
                &[(400, InvalidParameter), (401, NotAuthenticated), (404, NotFound)],
            ),
            (
                c.build_delete_project("t", "p1").unwrap(),
                &[(401, NotAuthenticated), (404, NotFound)],
            ),
            (
                c.build_join_project("t", "p1").unwrap(),
                &[
                    (400, IllegalAccess),
                    (401, NotAuthenticated),
                    (403, IllegalAccess),
                    (404, NotFound),
                    (409, IllegalAccess),
                ],
            ),
            (
                c.build_leave_project("t", "p1").unwrap(),
                &[
                    (400, IllegalAccess),
                    (401, NotAuthenticated),
                    (403, IllegalAccess),
                    (404, NotFound),
                ],
            ),
            (
                c.build_get_own_profile("t").unwrap(),
                &[(401, NotAuthenticated), (404, NotFound)],
            ),
            (
                c.build_get_profile_by_account_id("a1").unwrap(),
                &[(400, IllegalAccess), (404, NotFound)],
            ),
            (
                c.build_create_own_profile("t", &profile).unwrap(),
                &[(404, NotFound), (409, ProfileAlreadyExists)],
            ),
            (c.build_update_own_profile("t", &profile).unwrap(), &[(404, NotFound)]),
        ];

        for (call, expected) in &cases {
            for &(status, kind) in *expected {
                let err = call.interpret(response(status, "")).unwrap_err();
                assert_eq!(
                    err.kind(),
                    Some(kind),
                    "{:?} answered {status}",
                    call.operation
                );
                assert_eq!(err.http_status(), Some(status));
            }
        }

        let missing = c
            .build_update_own_profile("t", &profile)
            .unwrap()
            .interpret(response(404, ""))
            .unwrap_err();
        assert!(
            matches!(&missing, ApiError::Status { message, .. } if message == "Account wasn't found"),
            "{missing:?}"
        );
    }
}
