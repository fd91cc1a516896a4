//! Domain models for the Developool API.
//!
//! # Design
//! The public models mirror what the server returns and derive both serde
//! directions so callers can decode response bodies with `Payload::parse`.
//! Request bodies are built from the borrowed `*Body` structs below, which
//! drop every field that is absent or empty. The server treats a missing key
//! as "leave unchanged", so an empty string must never be sent.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// A project as returned by the server. `id` is server-assigned and absent
/// on create; `title` and `is_private` are required on create.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Project {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub public_description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub private_description: Option<String>,
    #[serde(default)]
    pub interests: Vec<String>,
    #[serde(default)]
    pub skills: Vec<String>,
    #[serde(rename = "private", default, skip_serializing_if = "Option::is_none")]
    pub is_private: Option<bool>,
}

impl Project {
    /// The minimum a new project needs.
    pub fn new(title: impl Into<String>, is_private: bool) -> Self {
        Self {
            title: Some(title.into()),
            is_private: Some(is_private),
            ..Self::default()
        }
    }
}

/// An education entry of a profile.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Education {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub institute_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub degree: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub field_of_study: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub from_date: Option<NaiveDate>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub end_date: Option<NaiveDate>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

/// A past job of a profile.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PastExperience {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub company: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub job_title: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub location: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub from_date: Option<NaiveDate>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub end_date: Option<NaiveDate>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

/// A user profile. Every field is optional on create and update;
/// `account_id` is assigned by the server and never sent.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Profile {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub first_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_name: Option<String>,
    #[serde(default)]
    pub interests: Vec<String>,
    #[serde(default)]
    pub skills: Vec<String>,
    #[serde(rename = "education", default)]
    pub educations: Vec<Education>,
    #[serde(rename = "pastExperience", default)]
    pub past_experiences: Vec<PastExperience>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub github: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub facebook: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub linkedin: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub twitter: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub instagram: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub account_id: Option<String>,
}

/// Optional predicate for listing all projects. Only set fields become
/// query parameters.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProjectFilter {
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub is_public: Option<bool>,
    #[serde(default)]
    pub is_private: Option<bool>,
    #[serde(default)]
    pub skills: Vec<String>,
    #[serde(default)]
    pub interests: Vec<String>,
}

impl ProjectFilter {
    /// Query parameters in wire order: title, public, private, interests,
    /// skills. List fields repeat their key once per element.
    pub fn query_pairs(&self) -> Vec<(&'static str, String)> {
        let mut pairs = Vec::new();
        if let Some(title) = present(&self.title) {
            pairs.push(("title", title.to_string()));
        }
        if let Some(public) = self.is_public {
            pairs.push(("public", public.to_string()));
        }
        if let Some(private) = self.is_private {
            pairs.push(("private", private.to_string()));
        }
        pairs.extend(self.interests.iter().map(|i| ("interests[]", i.clone())));
        pairs.extend(self.skills.iter().map(|s| ("skills[]", s.clone())));
        pairs
    }

    /// `key=value` pairs joined by `&`, values percent-encoded. Empty when no
    /// field is set.
    pub fn to_query_string(&self) -> String {
        self.query_pairs()
            .into_iter()
            .map(|(key, value)| format!("{key}={}", urlencoding::encode(&value)))
            .collect::<Vec<_>>()
            .join("&")
    }
}

// ---------------------------------------------------------------------------
// Request bodies
// ---------------------------------------------------------------------------

pub(crate) fn present(value: &Option<String>) -> Option<&str> {
    value.as_deref().filter(|s| !s.is_empty())
}

fn present_list<T>(values: &[T]) -> Option<&[T]> {
    (!values.is_empty()).then_some(values)
}

#[derive(Serialize)]
pub(crate) struct CredentialsBody<'a> {
    pub email: &'a str,
    pub password: &'a str,
}

#[derive(Serialize)]
pub(crate) struct RegistrationBody<'a> {
    pub username: &'a str,
    pub email: &'a str,
    pub password: &'a str,
    #[serde(rename = "password2")]
    pub password_confirmation: &'a str,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct ProjectBody<'a> {
    #[serde(skip_serializing_if = "Option::is_none")]
    title: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    public_description: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    private_description: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    interests: Option<&'a [String]>,
    #[serde(skip_serializing_if = "Option::is_none")]
    skills: Option<&'a [String]>,
    #[serde(rename = "private", skip_serializing_if = "Option::is_none")]
    is_private: Option<bool>,
}

impl<'a> From<&'a Project> for ProjectBody<'a> {
    fn from(project: &'a Project) -> Self {
        Self {
            title: present(&project.title),
            public_description: present(&project.public_description),
            private_description: present(&project.private_description),
            interests: present_list(&project.interests),
            skills: present_list(&project.skills),
            is_private: project.is_private,
        }
    }
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct ProfileBody<'a> {
    #[serde(skip_serializing_if = "Option::is_none")]
    first_name: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    last_name: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    interests: Option<&'a [String]>,
    #[serde(skip_serializing_if = "Option::is_none")]
    skills: Option<&'a [String]>,
    #[serde(rename = "education", skip_serializing_if = "Option::is_none")]
    educations: Option<&'a [Education]>,
    #[serde(rename = "pastExperience", skip_serializing_if = "Option::is_none")]
    past_experiences: Option<&'a [PastExperience]>,
    #[serde(skip_serializing_if = "Option::is_none")]
    github: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    facebook: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    instagram: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    linkedin: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    twitter: Option<&'a str>,
}

impl<'a> From<&'a Profile> for ProfileBody<'a> {
    fn from(profile: &'a Profile) -> Self {
        Self {
            first_name: present(&profile.first_name),
            last_name: present(&profile.last_name),
            interests: present_list(&profile.interests),
            skills: present_list(&profile.skills),
            educations: present_list(&profile.educations),
            past_experiences: present_list(&profile.past_experiences),
            github: present(&profile.github),
            facebook: present(&profile.facebook),
            instagram: present(&profile.instagram),
            linkedin: present(&profile.linkedin),
            twitter: present(&profile.twitter),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn project_deserializes_server_shape() {
        let project: Project = serde_json::from_str(
            r#"{"id":"p1","title":"Lume","publicDescription":"hi","private":true,"skills":["rust"]}"#,
        )
        .unwrap();
        assert_eq!(project.id.as_deref(), Some("p1"));
        assert_eq!(project.public_description.as_deref(), Some("hi"));
        assert_eq!(project.is_private, Some(true));
        assert_eq!(project.skills, vec!["rust"]);
        assert!(project.interests.is_empty());
    }

    #[test]
    fn project_body_skips_empty_strings_and_lists() {
        let project = Project {
            id: Some("ignored".to_string()),
            title: Some("X".to_string()),
            public_description: Some(String::new()),
            interests: Vec::new(),
            skills: vec!["go".to_string()],
            ..Project::default()
        };
        let json = serde_json::to_string(&ProjectBody::from(&project)).unwrap();
        assert_eq!(json, r#"{"title":"X","skills":["go"]}"#);
    }

    #[test]
    fn profile_body_uses_wire_keys() {
        let profile = Profile {
            first_name: Some("Ada".to_string()),
            linkedin: Some("ada-l".to_string()),
            educations: vec![Education {
                institute_name: Some("KCL".to_string()),
                from_date: NaiveDate::from_ymd_opt(1833, 6, 5),
                ..Education::default()
            }],
            account_id: Some("acc-1".to_string()),
            ..Profile::default()
        };
        let body = serde_json::to_value(ProfileBody::from(&profile)).unwrap();
        assert_eq!(body["firstName"], "Ada");
        assert_eq!(body["linkedin"], "ada-l");
        assert_eq!(body["education"][0]["instituteName"], "KCL");
        assert_eq!(body["education"][0]["fromDate"], "1833-06-05");
        assert!(body.get("accountId").is_none());
        assert!(body.get("pastExperience").is_none());
    }

    #[test]
    fn empty_filter_has_no_query() {
        assert_eq!(ProjectFilter::default().to_query_string(), "");
    }

    #[test]
    fn filter_orders_and_repeats_parameters() {
        let filter = ProjectFilter {
            title: Some("web app".to_string()),
            is_public: Some(true),
            is_private: None,
            skills: vec!["c++".to_string()],
            interests: vec!["go".to_string(), "rust".to_string()],
        };
        assert_eq!(
            filter.to_query_string(),
            "title=web%20app&public=true&interests[]=go&interests[]=rust&skills[]=c%2B%2B"
        );
    }
}
