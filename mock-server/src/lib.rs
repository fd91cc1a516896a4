//! In-memory Developool API used by the integration tests.
//!
//! Every route lives under `/api` and answers with the status codes the
//! client's status tables expect. Accounts authenticate with an opaque token
//! sent verbatim in the `Authorization` header.

use std::{collections::HashMap, sync::Arc};

use axum::{
    extract::{Path, Query, State},
    http::{HeaderMap, StatusCode},
    routing::{get, post},
    Json, Router,
};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use tokio::{net::TcpListener, sync::RwLock};
use uuid::Uuid;

/// Verified account present in every fresh server.
pub const SEEDED_EMAIL: &str = "alice@developool.com";
/// Account present in every fresh server whose email was never verified.
pub const UNVERIFIED_EMAIL: &str = "bob@developool.com";
/// Password of both seeded accounts.
pub const SEEDED_PASSWORD: &str = "developool";

#[derive(Clone, Debug)]
struct Account {
    id: Uuid,
    username: String,
    email: String,
    password: String,
    verified: bool,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProjectRecord {
    pub id: String,
    pub title: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub public_description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub private_description: Option<String>,
    #[serde(default)]
    pub interests: Vec<String>,
    #[serde(default)]
    pub skills: Vec<String>,
    #[serde(rename = "private")]
    pub is_private: bool,
    pub owner: String,
    #[serde(default)]
    pub members: Vec<String>,
}

impl ProjectRecord {
    /// What someone outside the project gets to see.
    fn public_view(&self) -> Self {
        Self {
            private_description: None,
            members: Vec::new(),
            ..self.clone()
        }
    }

    fn involves(&self, account: &str) -> bool {
        self.owner == account || self.members.iter().any(|m| m == account)
    }
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProjectInput {
    pub title: Option<String>,
    pub public_description: Option<String>,
    pub private_description: Option<String>,
    pub interests: Option<Vec<String>>,
    pub skills: Option<Vec<String>>,
    #[serde(rename = "private")]
    pub is_private: Option<bool>,
}

#[derive(Deserialize)]
pub struct Credentials {
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub password: String,
}

#[derive(Deserialize)]
pub struct Registration {
    #[serde(default)]
    pub username: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub password: String,
    #[serde(default)]
    pub password2: String,
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Session {
    pub token: String,
    pub account_id: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct AccountView {
    pub id: String,
    pub username: String,
    pub email: String,
}

#[derive(Default)]
struct Store {
    accounts: HashMap<Uuid, Account>,
    tokens: HashMap<String, Uuid>,
    projects: HashMap<String, ProjectRecord>,
    /// Profiles are stored as the JSON object the client sent, keyed by
    /// account.
    profiles: HashMap<Uuid, Map<String, Value>>,
}

impl Store {
    fn seeded() -> Self {
        let mut store = Self::default();
        store.add_account("alice", SEEDED_EMAIL, SEEDED_PASSWORD, true);
        store.add_account("bob", UNVERIFIED_EMAIL, SEEDED_PASSWORD, false);
        store
    }

    fn add_account(
        &mut self,
        username: &str,
        email: &str,
        password: &str,
        verified: bool,
    ) -> Account {
        let account = Account {
            id: Uuid::new_v4(),
            username: username.to_string(),
            email: email.to_string(),
            password: password.to_string(),
            verified,
        };
        self.accounts.insert(account.id, account.clone());
        account
    }

    fn account_by_email(&self, email: &str) -> Option<&Account> {
        self.accounts.values().find(|a| a.email.eq_ignore_ascii_case(email))
    }

    /// Account behind the `Authorization` header, or 401.
    fn caller(&self, headers: &HeaderMap) -> Result<Uuid, StatusCode> {
        headers
            .get("authorization")
            .and_then(|v| v.to_str().ok())
            .and_then(|token| self.tokens.get(token))
            .copied()
            .ok_or(StatusCode::UNAUTHORIZED)
    }
}

type Db = Arc<RwLock<Store>>;

pub fn app() -> Router {
    let db: Db = Arc::new(RwLock::new(Store::seeded()));
    let api = Router::new()
        .route("/auth/", post(authenticate))
        .route("/register/", post(register))
        .route("/accounts/projects/", get(own_projects))
        .route("/project/", get(list_projects).post(create_project))
        .route(
            "/project/{id}",
            get(get_project).put(update_project).delete(delete_project),
        )
        .route("/project/join/{id}", post(join_project))
        .route("/project/leave/{id}", post(leave_project))
        .route(
            "/profile/",
            get(own_profile).post(create_profile).put(update_profile),
        )
        .route("/profile/{account_id}", get(profile_by_account))
        .with_state(db);
    Router::new().nest("/api", api)
}

pub async fn run(listener: TcpListener) -> Result<(), std::io::Error> {
    axum::serve(listener, app()).await
}

type Reply<T> = Result<(StatusCode, Json<T>), StatusCode>;

fn ok<T>(body: T) -> Reply<T> {
    Ok((StatusCode::OK, Json(body)))
}

fn created<T>(body: T) -> Reply<T> {
    Ok((StatusCode::CREATED, Json(body)))
}

// --- accounts ---

async fn authenticate(State(db): State<Db>, Json(input): Json<Credentials>) -> Reply<Session> {
    if !input.email.contains('@') || input.password.is_empty() {
        return Err(StatusCode::BAD_REQUEST);
    }
    let mut store = db.write().await;
    let account = store
        .account_by_email(&input.email)
        .filter(|a| a.password == input.password)
        .cloned()
        .ok_or(StatusCode::UNAUTHORIZED)?;
    if !account.verified {
        return Err(StatusCode::FORBIDDEN);
    }
    let token = Uuid::new_v4().simple().to_string();
    store.tokens.insert(token.clone(), account.id);
    tracing::info!(account = %account.id, "issued token");
    ok(Session {
        token,
        account_id: account.id.to_string(),
    })
}

async fn register(State(db): State<Db>, Json(input): Json<Registration>) -> Reply<AccountView> {
    if input.username.is_empty()
        || !input.email.contains('@')
        || input.password.is_empty()
        || input.password != input.password2
    {
        return Err(StatusCode::BAD_REQUEST);
    }
    let mut store = db.write().await;
    if store.account_by_email(&input.email).is_some() {
        return Err(StatusCode::CONFLICT);
    }
    // No mail round-trip here: new accounts are verified on creation.
    let account = store.add_account(&input.username, &input.email, &input.password, true);
    tracing::info!(account = %account.id, "registered account");
    created(AccountView {
        id: account.id.to_string(),
        username: account.username,
        email: account.email,
    })
}

// --- projects ---

async fn own_projects(State(db): State<Db>, headers: HeaderMap) -> Reply<Vec<ProjectRecord>> {
    let store = db.read().await;
    let caller = store.caller(&headers)?.to_string();
    ok(store
        .projects
        .values()
        .filter(|p| p.involves(&caller))
        .cloned()
        .collect())
}

async fn list_projects(
    State(db): State<Db>,
    Query(params): Query<Vec<(String, String)>>,
) -> Reply<Vec<ProjectRecord>> {
    let filter = ListFilter::from_pairs(&params)?;
    let store = db.read().await;
    let mut projects: Vec<ProjectRecord> = store
        .projects
        .values()
        .filter(|p| filter.matches(p))
        .map(ProjectRecord::public_view)
        .collect();
    projects.sort_by(|a, b| a.title.cmp(&b.title));
    ok(projects)
}

#[derive(Default)]
struct ListFilter {
    title: Option<String>,
    public: Option<bool>,
    private: Option<bool>,
    interests: Vec<String>,
    skills: Vec<String>,
}

impl ListFilter {
    fn from_pairs(pairs: &[(String, String)]) -> Result<Self, StatusCode> {
        let flag = |value: &str| {
            value
                .parse::<bool>()
                .map_err(|_| StatusCode::INTERNAL_SERVER_ERROR)
        };
        let mut filter = Self::default();
        for (key, value) in pairs {
            match key.as_str() {
                "title" => filter.title = Some(value.to_lowercase()),
                "public" => filter.public = Some(flag(value)?),
                "private" => filter.private = Some(flag(value)?),
                "interests[]" => filter.interests.push(value.clone()),
                "skills[]" => filter.skills.push(value.clone()),
                _ => {}
            }
        }
        Ok(filter)
    }

    fn matches(&self, project: &ProjectRecord) -> bool {
        if let Some(title) = &self.title {
            if !project.title.to_lowercase().contains(title.as_str()) {
                return false;
            }
        }
        // public=true/private=true each admit their kind; neither set admits all.
        let visibility = match (self.public, self.private) {
            (Some(true), Some(true)) | (None, None) => true,
            (Some(true), _) => !project.is_private,
            (_, Some(true)) => project.is_private,
            _ => true,
        };
        visibility
            && self.interests.iter().all(|i| project.interests.contains(i))
            && self.skills.iter().all(|s| project.skills.contains(s))
    }
}

async fn create_project(
    State(db): State<Db>,
    headers: HeaderMap,
    Json(input): Json<ProjectInput>,
) -> Reply<ProjectRecord> {
    let mut store = db.write().await;
    let caller = store.caller(&headers)?;
    let (Some(title), Some(is_private)) = (input.title.filter(|t| !t.is_empty()), input.is_private)
    else {
        return Err(StatusCode::BAD_REQUEST);
    };
    if store.projects.values().any(|p| p.title == title) {
        return Err(StatusCode::CONFLICT);
    }
    let project = ProjectRecord {
        id: Uuid::new_v4().to_string(),
        title,
        public_description: input.public_description,
        private_description: input.private_description,
        interests: input.interests.unwrap_or_default(),
        skills: input.skills.unwrap_or_default(),
        is_private,
        owner: caller.to_string(),
        members: Vec::new(),
    };
    store.projects.insert(project.id.clone(), project.clone());
    tracing::info!(project = %project.id, "created project");
    created(project)
}

async fn get_project(
    State(db): State<Db>,
    headers: HeaderMap,
    Path(id): Path<String>,
) -> Reply<ProjectRecord> {
    let store = db.read().await;
    let project = store.projects.get(&id).ok_or(StatusCode::NOT_FOUND)?;
    let insider = store
        .caller(&headers)
        .is_ok_and(|caller| project.involves(&caller.to_string()));
    ok(if insider {
        project.clone()
    } else {
        project.public_view()
    })
}

async fn update_project(
    State(db): State<Db>,
    headers: HeaderMap,
    Path(id): Path<String>,
    Json(input): Json<ProjectInput>,
) -> Reply<ProjectRecord> {
    let mut store = db.write().await;
    let caller = store.caller(&headers)?.to_string();
    let project = store.projects.get_mut(&id).ok_or(StatusCode::NOT_FOUND)?;
    if project.owner != caller {
        return Err(StatusCode::FORBIDDEN);
    }
    if input.title.as_deref() == Some("") {
        return Err(StatusCode::BAD_REQUEST);
    }
    if let Some(title) = input.title {
        project.title = title;
    }
    if let Some(description) = input.public_description {
        project.public_description = Some(description);
    }
    if let Some(description) = input.private_description {
        project.private_description = Some(description);
    }
    if let Some(interests) = input.interests {
        project.interests = interests;
    }
    if let Some(skills) = input.skills {
        project.skills = skills;
    }
    if let Some(is_private) = input.is_private {
        project.is_private = is_private;
    }
    ok(project.clone())
}

async fn delete_project(
    State(db): State<Db>,
    headers: HeaderMap,
    Path(id): Path<String>,
) -> Reply<ProjectRecord> {
    let mut store = db.write().await;
    let caller = store.caller(&headers)?.to_string();
    let project = store.projects.get(&id).ok_or(StatusCode::NOT_FOUND)?;
    if project.owner != caller {
        return Err(StatusCode::FORBIDDEN);
    }
    let removed = store.projects.remove(&id).ok_or(StatusCode::NOT_FOUND)?;
    tracing::info!(project = %removed.id, "deleted project");
    ok(removed)
}

async fn join_project(
    State(db): State<Db>,
    headers: HeaderMap,
    Path(id): Path<String>,
) -> Reply<ProjectRecord> {
    let mut store = db.write().await;
    let caller = store.caller(&headers)?.to_string();
    let project = store.projects.get_mut(&id).ok_or(StatusCode::NOT_FOUND)?;
    if project.owner == caller {
        return Err(StatusCode::BAD_REQUEST);
    }
    if project.is_private {
        return Err(StatusCode::FORBIDDEN);
    }
    if project.members.contains(&caller) {
        return Err(StatusCode::CONFLICT);
    }
    project.members.push(caller);
    ok(project.clone())
}

async fn leave_project(
    State(db): State<Db>,
    headers: HeaderMap,
    Path(id): Path<String>,
) -> Reply<ProjectRecord> {
    let mut store = db.write().await;
    let caller = store.caller(&headers)?.to_string();
    let project = store.projects.get_mut(&id).ok_or(StatusCode::NOT_FOUND)?;
    if project.owner == caller {
        return Err(StatusCode::BAD_REQUEST);
    }
    let before = project.members.len();
    project.members.retain(|m| *m != caller);
    if project.members.len() == before {
        return Err(StatusCode::FORBIDDEN);
    }
    ok(project.public_view())
}

// --- profiles ---

/// Fields a client may not set on its own profile.
const SERVER_FIELDS: [&str; 1] = ["accountId"];

fn profile_view(account: Uuid, fields: &Map<String, Value>) -> Map<String, Value> {
    let mut view = fields.clone();
    view.insert("accountId".to_string(), Value::String(account.to_string()));
    view
}

fn client_fields(mut input: Map<String, Value>) -> Map<String, Value> {
    for field in SERVER_FIELDS {
        input.remove(field);
    }
    input
}

async fn own_profile(State(db): State<Db>, headers: HeaderMap) -> Reply<Map<String, Value>> {
    let store = db.read().await;
    let caller = store.caller(&headers)?;
    let profile = store.profiles.get(&caller).ok_or(StatusCode::NOT_FOUND)?;
    ok(profile_view(caller, profile))
}

async fn create_profile(
    State(db): State<Db>,
    headers: HeaderMap,
    Json(input): Json<Map<String, Value>>,
) -> Reply<Map<String, Value>> {
    let mut store = db.write().await;
    let caller = store.caller(&headers)?;
    if !store.accounts.contains_key(&caller) {
        return Err(StatusCode::NOT_FOUND);
    }
    if store.profiles.contains_key(&caller) {
        return Err(StatusCode::CONFLICT);
    }
    let fields = client_fields(input);
    let view = profile_view(caller, &fields);
    store.profiles.insert(caller, fields);
    created(view)
}

async fn update_profile(
    State(db): State<Db>,
    headers: HeaderMap,
    Json(input): Json<Map<String, Value>>,
) -> Reply<Map<String, Value>> {
    let mut store = db.write().await;
    let caller = store.caller(&headers)?;
    let profile = store.profiles.get_mut(&caller).ok_or(StatusCode::NOT_FOUND)?;
    // Missing keys leave the stored value unchanged.
    profile.extend(client_fields(input));
    ok(profile_view(caller, profile))
}

async fn profile_by_account(
    State(db): State<Db>,
    Path(account_id): Path<String>,
) -> Reply<Map<String, Value>> {
    let account = Uuid::parse_str(&account_id).map_err(|_| StatusCode::NOT_FOUND)?;
    let store = db.read().await;
    if !store.accounts.contains_key(&account) {
        return Err(StatusCode::NOT_FOUND);
    }
    let profile = store.profiles.get(&account).ok_or(StatusCode::BAD_REQUEST)?;
    ok(profile_view(account, profile))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(title: &str, is_private: bool) -> ProjectRecord {
        ProjectRecord {
            id: "p1".to_string(),
            title: title.to_string(),
            public_description: Some("open".to_string()),
            private_description: Some("secret".to_string()),
            interests: vec!["games".to_string()],
            skills: vec!["rust".to_string(), "sql".to_string()],
            is_private,
            owner: "owner".to_string(),
            members: vec!["member".to_string()],
        }
    }

    fn pairs(raw: &[(&str, &str)]) -> Vec<(String, String)> {
        raw.iter().map(|(k, v)| (k.to_string(), v.to_string())).collect()
    }

    #[test]
    fn project_uses_wire_keys() {
        let json = serde_json::to_value(record("Alpha", true)).unwrap();
        assert_eq!(json["private"], true);
        assert_eq!(json["publicDescription"], "open");
        assert_eq!(json["privateDescription"], "secret");
    }

    #[test]
    fn public_view_hides_insider_fields() {
        let view = record("Alpha", false).public_view();
        assert!(view.private_description.is_none());
        assert!(view.members.is_empty());
        assert_eq!(view.public_description.as_deref(), Some("open"));
    }

    #[test]
    fn involvement_covers_owner_and_members() {
        let project = record("Alpha", false);
        assert!(project.involves("owner"));
        assert!(project.involves("member"));
        assert!(!project.involves("stranger"));
    }

    #[test]
    fn empty_filter_matches_everything() {
        let filter = ListFilter::from_pairs(&[]).unwrap();
        assert!(filter.matches(&record("Alpha", true)));
        assert!(filter.matches(&record("Beta", false)));
    }

    #[test]
    fn filter_by_title_is_case_insensitive_substring() {
        let filter = ListFilter::from_pairs(&pairs(&[("title", "ALP")])).unwrap();
        assert!(filter.matches(&record("Alpha", false)));
        assert!(!filter.matches(&record("Beta", false)));
    }

    #[test]
    fn filter_by_visibility() {
        let public = ListFilter::from_pairs(&pairs(&[("public", "true")])).unwrap();
        assert!(public.matches(&record("A", false)));
        assert!(!public.matches(&record("A", true)));

        let private = ListFilter::from_pairs(&pairs(&[("private", "true")])).unwrap();
        assert!(private.matches(&record("A", true)));
        assert!(!private.matches(&record("A", false)));

        let both = ListFilter::from_pairs(&pairs(&[("public", "true"), ("private", "true")])).unwrap();
        assert!(both.matches(&record("A", true)));
        assert!(both.matches(&record("A", false)));
    }

    #[test]
    fn filter_requires_every_listed_skill() {
        let filter =
            ListFilter::from_pairs(&pairs(&[("skills[]", "rust"), ("skills[]", "sql")])).unwrap();
        assert!(filter.matches(&record("A", false)));

        let filter =
            ListFilter::from_pairs(&pairs(&[("skills[]", "rust"), ("skills[]", "go")])).unwrap();
        assert!(!filter.matches(&record("A", false)));
    }

    #[test]
    fn malformed_flag_is_a_server_error() {
        let result = ListFilter::from_pairs(&pairs(&[("public", "maybe")]));
        assert_eq!(result.err(), Some(StatusCode::INTERNAL_SERVER_ERROR));
    }

    #[test]
    fn client_cannot_set_account_id() {
        let mut input = Map::new();
        input.insert("firstName".to_string(), Value::from("Ada"));
        input.insert("accountId".to_string(), Value::from("forged"));
        let account = Uuid::new_v4();
        let view = profile_view(account, &client_fields(input));
        assert_eq!(view["accountId"], account.to_string());
        assert_eq!(view["firstName"], "Ada");
    }

    #[test]
    fn store_is_seeded() {
        let store = Store::seeded();
        assert!(store.account_by_email(SEEDED_EMAIL).unwrap().verified);
        assert!(!store.account_by_email(UNVERIFIED_EMAIL).unwrap().verified);
    }
}
