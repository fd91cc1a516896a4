//! Asynchronous domain API: one method per Developool operation.
//!
//! # Design
//! Every method copies its arguments into an owned closure and schedules it
//! on the tokio blocking pool. The closure validates, builds, executes and
//! classifies the call, then invokes the caller's callback exactly once from
//! that worker thread. The caller never blocks. Calls share nothing but the
//! read-only client and transport, so they complete in any order.

use std::sync::Arc;

use developool_core::{
    ApiError, ApiResult, DevelopoolClient, Operation, PreparedCall, Profile, Project,
    ProjectFilter,
};
use tokio::runtime::{Builder, Handle, Runtime};

use crate::config::MiddlewareConfig;
use crate::error::MiddlewareError;
use crate::executor::{self, Transport, UreqTransport};

enum Workers {
    Owned(Runtime),
    Shared(Handle),
}

impl Workers {
    fn handle(&self) -> &Handle {
        match self {
            Workers::Owned(runtime) => runtime.handle(),
            Workers::Shared(handle) => handle,
        }
    }
}

/// Entry point for the mobile application.
///
/// A `Middleware` built with [`Middleware::new`] owns its worker runtime and
/// must be dropped outside of any async context. Dropping it waits for
/// running calls to deliver their callbacks; calls that have not started yet
/// are discarded. Use
/// [`Middleware::with_handle`] to run on an existing runtime instead.
pub struct Middleware {
    client: DevelopoolClient,
    transport: Arc<dyn Transport>,
    workers: Workers,
}

impl Middleware {
    pub fn new(config: MiddlewareConfig) -> Result<Self, MiddlewareError> {
        Self::with_transport(config, Arc::new(UreqTransport::new()))
    }

    /// Build from `developool.toml` and `DEVELOPOOL_*` environment variables.
    pub fn from_env() -> Result<Self, MiddlewareError> {
        Self::new(MiddlewareConfig::load()?)
    }

    pub fn with_transport(
        config: MiddlewareConfig,
        transport: Arc<dyn Transport>,
    ) -> Result<Self, MiddlewareError> {
        let runtime = Builder::new_multi_thread()
            .worker_threads(1)
            .thread_name("developool-worker")
            .build()?;
        tracing::debug!(base_url = %config.base_url, "middleware started");
        Ok(Self {
            client: DevelopoolClient::new(&config.base_url),
            transport,
            workers: Workers::Owned(runtime),
        })
    }

    pub fn with_handle(
        config: MiddlewareConfig,
        transport: Arc<dyn Transport>,
        handle: Handle,
    ) -> Self {
        Self {
            client: DevelopoolClient::new(&config.base_url),
            transport,
            workers: Workers::Shared(handle),
        }
    }

    pub fn base_url(&self) -> &str {
        self.client.base_url()
    }

    pub fn authenticate<F>(&self, email: &str, password: &str, callback: F)
    where
        F: FnOnce(ApiResult) + Send + 'static,
    {
        let (email, password) = (email.to_owned(), password.to_owned());
        self.dispatch(
            Operation::Authenticate,
            move |c| c.build_authenticate(&email, &password),
            callback,
        );
    }

    pub fn register<F>(
        &self,
        username: &str,
        email: &str,
        password: &str,
        password_confirmation: &str,
        callback: F,
    ) where
        F: FnOnce(ApiResult) + Send + 'static,
    {
        let (username, email) = (username.to_owned(), email.to_owned());
        let (password, confirmation) = (password.to_owned(), password_confirmation.to_owned());
        self.dispatch(
            Operation::Register,
            move |c| c.build_register(&username, &email, &password, &confirmation),
            callback,
        );
    }

    pub fn get_own_projects<F>(&self, token: &str, callback: F)
    where
        F: FnOnce(ApiResult) + Send + 'static,
    {
        let token = token.to_owned();
        self.dispatch(
            Operation::GetOwnProjects,
            move |c| c.build_get_own_projects(&token),
            callback,
        );
    }

    pub fn create_new_project<F>(&self, token: &str, new_project: &Project, callback: F)
    where
        F: FnOnce(ApiResult) + Send + 'static,
    {
        let (token, project) = (token.to_owned(), new_project.clone());
        self.dispatch(
            Operation::CreateNewProject,
            move |c| c.build_create_new_project(&token, &project),
            callback,
        );
    }

    pub fn get_project_by_id<F>(&self, token: &str, project_id: &str, callback: F)
    where
        F: FnOnce(ApiResult) + Send + 'static,
    {
        let (token, project_id) = (token.to_owned(), project_id.to_owned());
        self.dispatch(
            Operation::GetProjectById,
            move |c| c.build_get_project_by_id(&token, &project_id),
            callback,
        );
    }

    pub fn get_all_projects<F>(&self, filter: Option<&ProjectFilter>, callback: F)
    where
        F: FnOnce(ApiResult) + Send + 'static,
    {
        let filter = filter.cloned();
        self.dispatch(
            Operation::GetAllProjects,
            move |c| c.build_get_all_projects(filter.as_ref()),
            callback,
        );
    }

    pub fn update_project<F>(
        &self,
        token: &str,
        project_id: &str,
        updated_project: &Project,
        callback: F,
    ) where
        F: FnOnce(ApiResult) + Send + 'static,
    {
        let (token, project_id) = (token.to_owned(), project_id.to_owned());
        let project = updated_project.clone();
        self.dispatch(
            Operation::UpdateProject,
            move |c| c.build_update_project(&token, &project_id, &project),
            callback,
        );
    }

    pub fn delete_project<F>(&self, token: &str, project_id: &str, callback: F)
    where
        F: FnOnce(ApiResult) + Send + 'static,
    {
        let (token, project_id) = (token.to_owned(), project_id.to_owned());
        self.dispatch(
            Operation::DeleteProject,
            move |c| c.build_delete_project(&token, &project_id),
            callback,
        );
    }

    pub fn join_project<F>(&self, token: &str, project_id: &str, callback: F)
    where
        F: FnOnce(ApiResult) + Send + 'static,
    {
        let (token, project_id) = (token.to_owned(), project_id.to_owned());
        self.dispatch(
            Operation::JoinProject,
            move |c| c.build_join_project(&token, &project_id),
            callback,
        );
    }

    pub fn leave_project<F>(&self, token: &str, project_id: &str, callback: F)
    where
        F: FnOnce(ApiResult) + Send + 'static,
    {
        let (token, project_id) = (token.to_owned(), project_id.to_owned());
        self.dispatch(
            Operation::LeaveProject,
            move |c| c.build_leave_project(&token, &project_id),
            callback,
        );
    }

    pub fn get_own_profile<F>(&self, token: &str, callback: F)
    where
        F: FnOnce(ApiResult) + Send + 'static,
    {
        let token = token.to_owned();
        self.dispatch(
            Operation::GetOwnProfile,
            move |c| c.build_get_own_profile(&token),
            callback,
        );
    }

    pub fn get_profile_by_account_id<F>(&self, account_id: &str, callback: F)
    where
        F: FnOnce(ApiResult) + Send + 'static,
    {
        let account_id = account_id.to_owned();
        self.dispatch(
            Operation::GetProfileByAccountId,
            move |c| c.build_get_profile_by_account_id(&account_id),
            callback,
        );
    }

    pub fn create_own_profile<F>(&self, token: &str, profile: &Profile, callback: F)
    where
        F: FnOnce(ApiResult) + Send + 'static,
    {
        let (token, profile) = (token.to_owned(), profile.clone());
        self.dispatch(
            Operation::CreateOwnProfile,
            move |c| c.build_create_own_profile(&token, &profile),
            callback,
        );
    }

    pub fn update_own_profile<F>(&self, token: &str, new_profile: &Profile, callback: F)
    where
        F: FnOnce(ApiResult) + Send + 'static,
    {
        let (token, profile) = (token.to_owned(), new_profile.clone());
        self.dispatch(
            Operation::UpdateOwnProfile,
            move |c| c.build_update_own_profile(&token, &profile),
            callback,
        );
    }

    /// Deliver `err` through the worker pool, for callers that fail before
    /// they can hand arguments to an operation. The callback fires exactly
    /// once, never on the calling thread.
    pub fn reject<F>(&self, err: ApiError, callback: F)
    where
        F: FnOnce(ApiResult) + Send + 'static,
    {
        self.workers.handle().spawn_blocking(move || {
            tracing::debug!("rejected before dispatch: {err}");
            callback(Err(err));
        });
    }

    fn dispatch<B, F>(&self, operation: Operation, build: B, callback: F)
    where
        B: FnOnce(&DevelopoolClient) -> Result<PreparedCall, ApiError> + Send + 'static,
        F: FnOnce(ApiResult) + Send + 'static,
    {
        let client = self.client.clone();
        let transport = Arc::clone(&self.transport);
        // Fire-and-forget: the JoinHandle is dropped, the task keeps running.
        self.workers.handle().spawn_blocking(move || {
            let result = run(operation, &client, transport.as_ref(), build);
            callback(result);
        });
    }
}

fn run<B>(
    operation: Operation,
    client: &DevelopoolClient,
    transport: &dyn Transport,
    build: B,
) -> ApiResult
where
    B: FnOnce(&DevelopoolClient) -> Result<PreparedCall, ApiError>,
{
    let span = tracing::info_span!("developool_request", operation = operation.name());
    let _entered = span.enter();

    let call = match build(client) {
        Ok(call) => call,
        Err(err) => {
            tracing::debug!("rejected before sending: {err}");
            return Err(err);
        }
    };

    tracing::debug!(method = %call.request.method, url = %call.request.url, "sending request");
    let result = executor::execute(transport, &call);
    match &result {
        Ok(_) => tracing::debug!("request succeeded"),
        Err(ApiError::TransportError(reason)) => {
            tracing::warn!(%reason, "request failed without a response")
        }
        Err(err) => tracing::warn!(
            status = ?err.http_status(),
            kind = ?err.kind(),
            "request failed"
        ),
    }
    result
}
