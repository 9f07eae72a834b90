use super::{decode, join_url, null_as_default, send, OpenProjectApi};
use crate::libs::config::OpenProjectConfig;
use crate::libs::date_range::DateRange;
use crate::libs::error::{Error, Result};
use reqwest::{header::CONTENT_TYPE, Client, RequestBuilder, StatusCode};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

const API_USER: &str = "apikey";
const PAGE_SIZE: &str = "3000";

/// Work package the time is booked against.
#[derive(Serialize, Deserialize, Clone, Debug, Default, PartialEq)]
pub struct WorkPackage {
    /// Numeric id, shown as `#<id>` in Tmetric links
    #[serde(default)]
    pub id: u64,
    /// Title of the work package
    #[serde(default, deserialize_with = "null_as_default")]
    pub subject: String,
}

impl WorkPackage {
    pub fn new(id: u64, subject: &str) -> Self {
        Self {
            id,
            subject: subject.to_string(),
        }
    }
}

/// Time booking activity such as "Development" or "Management".
#[derive(Serialize, Deserialize, Clone, Debug, Default, PartialEq)]
pub struct Activity {
    /// Id used in the activity link of a booking
    #[serde(default)]
    pub id: u64,
    /// Name matched against Tmetric work types
    #[serde(default, deserialize_with = "null_as_default")]
    pub name: String,
}

/// Principal of type `User`.
#[derive(Serialize, Deserialize, Clone, Debug, Default, PartialEq)]
pub struct User {
    /// Id used in the user link when booking on behalf of someone
    #[serde(default)]
    pub id: u64,
    /// Full name as shown in OpenProject
    #[serde(default, deserialize_with = "null_as_default")]
    pub name: String,
}

/// Formattable text of a booking.
#[derive(Serialize, Deserialize, Clone, Debug, Default, PartialEq)]
pub struct Comment {
    /// Text as entered, without markup rendering
    #[serde(default, deserialize_with = "null_as_default")]
    pub raw: String,
}

/// HAL link to another resource.
#[derive(Serialize, Deserialize, Clone, Debug, Default, PartialEq)]
pub struct Link {
    /// API path of the resource, e.g. `/api/v3/work_packages/42`
    #[serde(default, deserialize_with = "null_as_default")]
    pub href: String,
    /// Display name; only sent by the server
    #[serde(default, deserialize_with = "null_as_default", skip_serializing_if = "String::is_empty")]
    pub title: String,
}

impl Link {
    pub fn new(href: String) -> Self {
        Self {
            href,
            title: String::new(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.href.is_empty() && self.title.is_empty()
    }
}

/// The `_links` object of a booking.
#[derive(Serialize, Deserialize, Clone, Debug, Default, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Links {
    /// Work package the time is booked on
    #[serde(default, deserialize_with = "null_as_default")]
    pub work_package: Link,
    /// Activity of the booking
    #[serde(default, deserialize_with = "null_as_default")]
    pub activity: Link,
    /// Project of the work package; derived by the server when omitted
    #[serde(default, deserialize_with = "null_as_default", skip_serializing_if = "Link::is_empty")]
    pub project: Link,
    /// Owner of the booking; the token owner when omitted
    #[serde(default, deserialize_with = "null_as_default", skip_serializing_if = "Link::is_empty")]
    pub user: Link,
}

/// Time booking in OpenProject.
#[derive(Serialize, Deserialize, Clone, Debug, Default, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct TimeEntry {
    /// Set by the server; absent on new bookings
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<u64>,
    /// Whether a timer is still running
    #[serde(default)]
    pub ongoing: bool,
    #[serde(default, deserialize_with = "null_as_default")]
    pub comment: Comment,
    /// Day of the booking, `YYYY-MM-DD`.
    #[serde(default, deserialize_with = "null_as_default")]
    pub spent_on: String,
    /// ISO 8601 duration, e.g. `PT2H30M`.
    #[serde(default, deserialize_with = "null_as_default")]
    pub hours: String,
    #[serde(rename = "_links", default)]
    pub links: Links,
}

#[derive(Deserialize, Debug)]
struct Collection<T> {
    #[serde(rename = "_embedded")]
    embedded: Elements<T>,
}

#[derive(Deserialize, Debug)]
struct Elements<T> {
    #[serde(default = "Vec::new")]
    elements: Vec<T>,
}

pub fn work_package_href(id: u64) -> String {
    format!("/api/v3/work_packages/{id}")
}

pub fn activity_href(id: u64) -> String {
    format!("/api/v3/time_entries/activities/{id}")
}

pub fn user_href(id: u64) -> String {
    format!("/api/v3/users/{id}")
}

#[derive(Debug)]
pub struct OpenProject {
    client: Client,
    config: OpenProjectConfig,
}

impl OpenProject {
    pub fn new(config: &OpenProjectConfig) -> Self {
        Self {
            client: Client::new(),
            config: config.clone(),
        }
    }

    fn url(&self, path: &str) -> String {
        join_url(&self.config.url, path)
    }

    fn get(&self, path: &str) -> RequestBuilder {
        self.client
            .get(self.url(path))
            .basic_auth(API_USER, Some(&self.config.token))
    }

    fn post(&self, path: &str) -> RequestBuilder {
        self.client
            .post(self.url(path))
            .basic_auth(API_USER, Some(&self.config.token))
    }

    /// Time entries of `user` (the token owner when `None`) spent between
    /// the range boundaries, newest first.
    ///
    /// A non-empty `work_package_ids` restricts the result to those work
    /// packages.
    pub async fn time_entries(&self, user: Option<&User>, range: &DateRange, work_package_ids: &[u64]) -> Result<Vec<TimeEntry>> {
        let user_value = user.map_or_else(|| "me".to_string(), |user| user.id.to_string());
        let mut filters = vec![
            json!({"user": {"operator": "=", "values": [user_value]}}),
            json!({"spent_on": {"operator": "<>d", "values": [range.start_str(), range.end_str()]}}),
        ];
        if !work_package_ids.is_empty() {
            let ids: Vec<String> = work_package_ids.iter().map(u64::to_string).collect();
            filters.push(json!({"work_package": {"operator": "=", "values": ids}}));
        }

        let request = self.get("/api/v3/time_entries").query(&[
            ("pageSize", PAGE_SIZE.to_string()),
            ("sortBy", r#"[["updated_at","desc"]]"#.to_string()),
            ("filters", Value::Array(filters).to_string()),
        ]);
        let user_name = user.map_or("me", |user| user.name.as_str());
        let body = send(request, StatusCode::OK, || {
            format!("cannot read timeentries from OpenProject for user '{user_name}'")
        })
        .await?;
        elements(&body, "error parsing time entries response")
    }

    /// First active user whose name matches `search`.
    pub async fn find_user_by_name(&self, search: &str) -> Result<User> {
        let filters = json!([
            {"status": {"operator": "!", "values": ["3"]}},
            {"type": {"operator": "=", "values": ["User"]}},
            {"name": {"operator": "~", "values": [search]}},
        ]);
        let request = self.get("/api/v3/principals").query(&[
            ("sortBy", r#"[["name","desc"]]"#.to_string()),
            ("filters", filters.to_string()),
        ]);
        let body = send(request, StatusCode::OK, || "cannot lookup users in OpenProject".to_string()).await?;
        let users: Vec<User> = elements(&body, "error parsing user search response from OpenProject")?;

        users
            .into_iter()
            .next()
            .ok_or_else(|| Error::not_found(format!("cannot find a user in OpenProject with a name matching '{search}'")))
    }

    /// Activities that may be booked on the work package.
    pub async fn allowed_activities(&self, work_package_id: u64) -> Result<Vec<Activity>> {
        let form = json!({"_links": {"workPackage": {"href": work_package_href(work_package_id)}}});
        let request = self.post("/api/v3/time_entries/form").json(&form);
        let body = send(request, StatusCode::OK, || {
            format!(
                "could not fetch allowed activities for work package '{}' from '{}'. Are 'Time and costs' activated for the project?",
                work_package_id, self.config.url
            )
        })
        .await?;

        let form: Value = decode(&body, "error parsing time entry form response")?;
        if let Some(message) = form.pointer("/_embedded/validationErrors/workPackage/message") {
            let message = message.as_str().map_or_else(|| message.to_string(), str::to_string);
            return Err(Error::not_found(format!("work package '{work_package_id}' not found. Error: {message}")));
        }

        let allowed = form
            .pointer("/_embedded/schema/activity/_embedded/allowedValues")
            .cloned()
            .unwrap_or(Value::Null);
        serde_json::from_value(allowed).map_err(|source| Error::Decode {
            context: "error parsing allowed activities response".to_string(),
            source,
        })
    }
}

impl OpenProjectApi for OpenProject {
    async fn work_package(&self, id: u64) -> Result<WorkPackage> {
        let body = send(self.get(&work_package_href(id)), StatusCode::OK, || {
            format!("could not find WP in {}", self.config.url)
        })
        .await?;
        decode(&body, "error parsing work packages response or no work packages found")
    }

    async fn activity_for_work_type(&self, work_package_id: u64, work_type: &str) -> Result<Activity> {
        self.allowed_activities(work_package_id)
            .await?
            .into_iter()
            .find(|activity| activity.name == work_type)
            .ok_or_else(|| Error::validation(format!("Work Type '{work_type}' is not a valid activity in OpenProject")))
    }

    async fn save_time_entry(&self, entry: &TimeEntry) -> Result<()> {
        let body = serde_json::to_vec(entry).map_err(|source| Error::Decode {
            context: "error marshalling OpenProject time entry to JSON".to_string(),
            source,
        })?;
        let request = self
            .post("/api/v3/time_entries/")
            .header(CONTENT_TYPE, "application/hal+json; charset=utf-8")
            .body(body);
        send(request, StatusCode::CREATED, || "could not save time entry in OpenProject".to_string()).await?;
        Ok(())
    }
}

fn elements<T: DeserializeOwned>(body: &str, context: &str) -> Result<Vec<T>> {
    let collection: Collection<T> = decode(body, context)?;
    Ok(collection.embedded.elements)
}
