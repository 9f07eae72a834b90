use super::{decode, join_url, null_as_default, send, send_success, TmetricApi};
use crate::api::openproject::WorkPackage;
use crate::libs::config::TmetricConfig;
use crate::libs::date_range::DateRange;
use crate::libs::error::{Error, Result};
use crate::libs::formatter::format_duration;
use chrono::{Duration, NaiveDateTime};
use reqwest::{Client as HttpClient, RequestBuilder, StatusCode};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Note of the throwaway entries created to materialise external tasks.
pub const DUMMY_ENTRY_DESCRIPTION: &str = "to-delete-only-created-to-create-an-external-task";

const REPORT_TIME_FORMAT: &str = "%Y-%m-%dT%H:%M:%SZ";

/// Tmetric user profile.
#[derive(Serialize, Deserialize, Clone, Debug, Default, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct User {
    /// User profile id, used as `userId` in queries
    #[serde(default)]
    pub id: u64,
    /// Display name, searched by `--user`
    #[serde(default, deserialize_with = "null_as_default")]
    pub name: String,
    /// Account every account-scoped request goes to
    #[serde(default)]
    pub active_account_id: u64,
}

/// Account member as returned by the v2 members endpoint.
#[derive(Deserialize, Debug)]
#[serde(rename_all = "camelCase")]
struct AccountMember {
    #[serde(default)]
    user_profile: UserProfile,
}

#[derive(Deserialize, Debug, Default)]
#[serde(rename_all = "camelCase")]
struct UserProfile {
    #[serde(default)]
    user_profile_id: u64,
    #[serde(default)]
    active_account_id: u64,
    #[serde(default, deserialize_with = "null_as_default")]
    user_name: String,
}

impl From<AccountMember> for User {
    fn from(member: AccountMember) -> Self {
        Self {
            id: member.user_profile.user_profile_id,
            name: member.user_profile.user_name,
            active_account_id: member.user_profile.active_account_id,
        }
    }
}

/// Link of a task to an external issue tracker.
#[derive(Serialize, Deserialize, Clone, Debug, Default, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ExternalLink {
    /// Text shown in Tmetric for the link
    #[serde(default, deserialize_with = "null_as_default")]
    pub caption: String,
    /// URL of the external task host
    #[serde(default, deserialize_with = "null_as_default")]
    pub link: String,
    /// OpenProject work package reference in the form `#1234`.
    #[serde(default, deserialize_with = "null_as_default")]
    pub issue_id: String,
}

/// Task an entry is logged on.
#[derive(Serialize, Deserialize, Clone, Debug, Default, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Task {
    /// Zero for entries without a task
    #[serde(default)]
    pub id: u64,
    /// Task name, usually the work package subject
    #[serde(default, deserialize_with = "null_as_default")]
    pub name: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub external_link: ExternalLink,
}

/// Customer a project is billed to.
#[derive(Serialize, Deserialize, Clone, Debug, Default, PartialEq)]
pub struct Client {
    /// Compared with `tmetric.clientId` to select entries
    #[serde(default)]
    pub id: u64,
    /// Client name
    #[serde(default, deserialize_with = "null_as_default")]
    pub name: String,
}

/// Tmetric project.
#[derive(Serialize, Deserialize, Clone, Debug, Default, PartialEq)]
pub struct Project {
    /// Project id, also selects the allowed work types
    #[serde(default)]
    pub id: u64,
    /// Project name
    #[serde(default, deserialize_with = "null_as_default")]
    pub name: String,
    /// Owning client; empty for internal projects
    #[serde(default, deserialize_with = "null_as_default")]
    pub client: Client,
}

/// Tag on a time entry.
#[derive(Serialize, Deserialize, Clone, Debug, Default, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Tag {
    /// Tag id
    #[serde(default)]
    pub id: u64,
    /// Tag name, also the activity name for work types
    #[serde(default, deserialize_with = "null_as_default")]
    pub name: String,
    /// Marks the tag as a work type
    #[serde(default)]
    pub is_work_type: bool,
}

/// Tag shape of the account-wide tag listing.
#[derive(Deserialize, Debug)]
#[serde(rename_all = "camelCase")]
struct AccountTag {
    #[serde(default)]
    tag_id: u64,
    #[serde(default, deserialize_with = "null_as_default")]
    name: String,
    #[serde(default)]
    is_work_type: bool,
}

impl From<AccountTag> for Tag {
    fn from(tag: AccountTag) -> Self {
        Self {
            id: tag.tag_id,
            name: tag.name,
            is_work_type: tag.is_work_type,
        }
    }
}

/// Team of the account, sent as `GroupList` in reports.
#[derive(Serialize, Deserialize, Clone, Debug, Default, PartialEq)]
pub struct Team {
    /// Team id
    #[serde(default)]
    pub id: u64,
    /// Team name
    #[serde(default, deserialize_with = "null_as_default")]
    pub name: String,
}

/// Tracked time in Tmetric.
#[derive(Serialize, Deserialize, Clone, Debug, Default, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct TimeEntry {
    /// Entry id
    #[serde(default)]
    pub id: u64,
    /// Local time without offset, `YYYY-MM-DDTHH:MM:SS`.
    #[serde(default, deserialize_with = "null_as_default")]
    pub start_time: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub end_time: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub task: Task,
    #[serde(default, deserialize_with = "null_as_default")]
    pub project: Project,
    #[serde(default, deserialize_with = "null_as_default")]
    pub note: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub tags: Vec<Tag>,
}

/// Body of the timer request that creates an external task.
#[derive(Serialize, Debug, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct DummyTimeEntry {
    pub is_started: bool,
    pub show_issue_id: bool,
    pub duration: u64,
    pub issue_id: String,
    pub issue_name: String,
    pub issue_url: String,
    pub service_url: String,
    pub service_type: String,
    pub description: String,
    pub tag_names: Vec<String>,
    pub project_id: u64,
}

impl DummyTimeEntry {
    pub fn new(work_package: &WorkPackage, service_url: &str, project_id: u64) -> Self {
        Self {
            is_started: true,
            show_issue_id: true,
            duration: 0,
            issue_id: format!("#{}", work_package.id),
            issue_name: work_package.subject.clone(),
            issue_url: format!("/work_packages/{}", work_package.id),
            service_url: service_url.to_string(),
            service_type: "OpenProject".to_string(),
            description: DUMMY_ENTRY_DESCRIPTION.to_string(),
            tag_names: Vec::new(),
            project_id,
        }
    }
}

/// Row of the detailed report.
///
/// Only the times are interpreted; every other field of the row is kept as
/// is so templates can use it.
#[derive(Serialize, Deserialize, Clone, Debug, Default, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ReportItem {
    #[serde(default, deserialize_with = "null_as_default")]
    pub start_time: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub end_time: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub description: String,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl ReportItem {
    pub fn duration(&self) -> Result<Duration> {
        let parse = |value: &str| {
            NaiveDateTime::parse_from_str(value, REPORT_TIME_FORMAT)
                .map_err(|err| Error::validation(format!("failed to parse time: {err}")))
        };
        let duration = parse(&self.end_time)? - parse(&self.start_time)?;
        if duration < Duration::zero() {
            return Err(Error::validation("end time is before start time"));
        }
        Ok(duration)
    }
}

/// Detailed report with the summed duration of its items.
#[derive(Serialize, Clone, Debug, Default, PartialEq)]
pub struct Report {
    pub items: Vec<ReportItem>,
    pub seconds: i64,
    pub hours: f64,
    /// Summed duration as `HH:MM`.
    pub duration: String,
}

impl Report {
    pub fn from_items(items: Vec<ReportItem>) -> Self {
        let mut total = Duration::zero();
        for item in &items {
            match item.duration() {
                Ok(duration) => total += duration,
                Err(err) => tracing::warn!(start = %item.start_time, end = %item.end_time, "skipping report item: {err}"),
            }
        }
        let seconds = total.num_seconds();
        Self {
            items,
            seconds,
            hours: seconds as f64 / 3600.0,
            duration: format_duration(&total),
        }
    }
}

/// Names to filter the detailed report by. Empty names are not filtered.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ReportFilter {
    pub client: String,
    pub tag: String,
    pub team: String,
    pub project: String,
}

#[derive(Debug)]
pub struct Tmetric {
    client: HttpClient,
    config: TmetricConfig,
}

impl Tmetric {
    pub fn new(config: &TmetricConfig) -> Self {
        Self {
            client: HttpClient::new(),
            config: config.clone(),
        }
    }

    fn v2_url(&self, path: &str) -> String {
        join_url(&self.config.api_url, path)
    }

    fn v3_url(&self, path: &str) -> String {
        join_url(&self.config.api_v3_url, path)
    }

    fn get(&self, url: String) -> RequestBuilder {
        self.client.get(url).bearer_auth(&self.config.token)
    }

    /// The owner of the API token.
    pub async fn current_user(&self) -> Result<User> {
        let body = send(self.get(self.v3_url("user")), StatusCode::OK, || {
            "cannot reach tmetric server".to_string()
        })
        .await?;
        decode(&body, "error parsing user response")
    }

    /// First account member whose name contains `search`, ignoring case.
    pub async fn find_user_by_name(&self, me: &User, search: &str) -> Result<User> {
        let url = self.v2_url(&format!("accounts/{}/members", me.active_account_id));
        let body = send(self.get(url), StatusCode::OK, || {
            format!("cannot get members for tmetric account '{}'", me.active_account_id)
        })
        .await?;
        let members: Vec<AccountMember> = decode(&body, "error parsing users response")?;

        let needle = search.to_lowercase();
        members
            .into_iter()
            .map(User::from)
            .find(|user| user.name.to_lowercase().contains(&needle))
            .ok_or_else(|| Error::not_found(format!("cannot find a user in tmetric with a name matching '{search}'")))
    }

    pub async fn all_tags(&self, user: &User) -> Result<Vec<Tag>> {
        let url = self.v2_url(&format!("accounts/{}/tags", user.active_account_id));
        let body = send(self.get(url), StatusCode::OK, || "could not get tags from t-metric".to_string()).await?;
        let tags: Vec<AccountTag> = decode(&body, "error parsing tags response")?;
        Ok(tags.into_iter().map(Tag::from).collect())
    }

    pub async fn all_work_types(&self, user: &User) -> Result<Vec<Tag>> {
        let tags = self.all_tags(user).await?;
        Ok(tags.into_iter().filter(|tag| tag.is_work_type).collect())
    }

    pub async fn work_type_by_name(&self, user: &User, name: &str) -> Result<Tag> {
        first_named(self.all_work_types(user).await?, name, "work type", |tag| tag.name.as_str())
    }

    pub async fn all_teams(&self, user: &User) -> Result<Vec<Team>> {
        let url = self.v3_url(&format!("accounts/{}/teams", user.active_account_id));
        let body = send(self.get(url), StatusCode::OK, || "could not get teams from t-metric".to_string()).await?;
        decode(&body, "error parsing teams response")
    }

    pub async fn team_by_name(&self, user: &User, name: &str) -> Result<Team> {
        first_named(self.all_teams(user).await?, name, "team", |team| team.name.as_str())
    }

    pub async fn all_projects(&self, user: &User) -> Result<Vec<Project>> {
        let url = self.v3_url(&format!("accounts/{}/projects", user.active_account_id));
        let body = send(self.get(url), StatusCode::OK, || {
            "could not get projects from t-metric".to_string()
        })
        .await?;
        decode(&body, "error parsing projects response")
    }

    pub async fn project_by_name(&self, user: &User, name: &str) -> Result<Project> {
        first_named(self.all_projects(user).await?, name, "project", |project| project.name.as_str())
    }

    pub async fn all_clients(&self, user: &User) -> Result<Vec<Client>> {
        let url = self.v3_url(&format!("accounts/{}/clients", user.active_account_id));
        let body = send(self.get(url), StatusCode::OK, || "could not get clients from t-metric".to_string()).await?;
        decode(&body, "error parsing clients response")
    }

    pub async fn client_by_name(&self, user: &User, name: &str) -> Result<Client> {
        first_named(self.all_clients(user).await?, name, "client", |client| client.name.as_str())
    }

    /// Detailed report of the account, filtered by the names in `filter`.
    pub async fn detailed_report(&self, user: &User, filter: &ReportFilter, range: &DateRange) -> Result<Report> {
        let mut query: Vec<(&str, String)> = vec![("AccountId", user.active_account_id.to_string())];

        if !filter.client.is_empty() {
            let client = self.client_by_name(user, &filter.client).await?;
            query.push(("ClientList", client.id.to_string()));
        }
        if !filter.team.is_empty() {
            let team = self.team_by_name(user, &filter.team).await?;
            query.push(("GroupList", team.id.to_string()));
        }
        if !filter.tag.is_empty() {
            let work_type = self.work_type_by_name(user, &filter.tag).await?;
            query.push(("TagList", work_type.id.to_string()));
        }
        if !filter.project.is_empty() {
            let project = self.project_by_name(user, &filter.project).await?;
            query.push(("ProjectList", project.id.to_string()));
        }

        // The report endpoint treats the end date as exclusive.
        query.push(("StartDate", range.start_str()));
        query.push(("EndDate", range.exclusive_end_str()));

        let request = self.get(self.v2_url("reports/detailed")).query(&query);
        let body = send(request, StatusCode::OK, || "cannot read report from tmetric".to_string()).await?;
        let items: Vec<ReportItem> = decode(&body, "error parsing report response")?;
        Ok(Report::from_items(items))
    }

    fn time_entry_url(&self, user: &User, entry: &TimeEntry) -> String {
        self.v3_url(&format!("accounts/{}/timeentries/{}", user.active_account_id, entry.id))
    }
}

impl TmetricApi for Tmetric {
    async fn time_entries(&self, user: &User, range: &DateRange) -> Result<Vec<TimeEntry>> {
        let url = self.v3_url(&format!("accounts/{}/timeentries", user.active_account_id));
        let request = self.get(url).query(&[
            ("userId", user.id.to_string()),
            ("startDate", range.start_str()),
            ("endDate", range.end_str()),
        ]);
        let body = send(request, StatusCode::OK, || "cannot read timeentries".to_string()).await?;
        let entries: Vec<TimeEntry> = decode(&body, "error parsing time entries response")?;

        Ok(entries
            .into_iter()
            .filter(|entry| entry.project.client.id == self.config.client_id)
            .collect())
    }

    async fn possible_work_types(&self, user: &User, entry: &TimeEntry) -> Result<Vec<Tag>> {
        let url = self.v3_url(&format!("accounts/{}/timeentries/tags", user.active_account_id));
        let request = self.get(url).query(&[("projectId", entry.project.id.to_string())]);
        let body = send(request, StatusCode::OK, || "could not get tags from t-metric".to_string()).await?;
        let tags: Vec<Tag> = decode(&body, "error parsing tags response")?;
        Ok(tags.into_iter().filter(|tag| tag.is_work_type).collect())
    }

    async fn update_time_entry(&self, user: &User, entry: &TimeEntry) -> Result<()> {
        let request = self
            .client
            .put(self.time_entry_url(user, entry))
            .bearer_auth(&self.config.token)
            .json(entry);
        send(request, StatusCode::OK, || "could not update time entry".to_string()).await?;
        Ok(())
    }

    async fn delete_time_entry(&self, user: &User, entry: &TimeEntry) -> Result<()> {
        let request = self
            .client
            .delete(self.time_entry_url(user, entry))
            .bearer_auth(&self.config.token);
        send_success(request, || format!("could not delete time entry '{}'", entry.id)).await?;
        Ok(())
    }

    async fn create_dummy_time_entry(&self, user: &User, work_package: &WorkPackage) -> Result<TimeEntry> {
        let dummy = DummyTimeEntry::new(work_package, &self.config.external_task_link, self.config.dummy_project_id);
        let url = self.v2_url(&format!("accounts/{}/timer/issue", user.active_account_id));
        let request = self.client.post(url).bearer_auth(&self.config.token).json(&dummy);
        send(request, StatusCode::OK, || {
            "could not create dummy time entry. Is 'tmetric.dummyProjectId' set correctly in the config?".to_string()
        })
        .await?;

        let url = self.v3_url(&format!("accounts/{}/timeentries/latest", user.active_account_id));
        let request = self.get(url).query(&[("userId", user.id.to_string())]);
        let body = send(request, StatusCode::OK, || "could not find latest time entry".to_string()).await?;

        match serde_json::from_str::<TimeEntry>(&body) {
            Ok(entry) if entry.note == DUMMY_ENTRY_DESCRIPTION => Ok(entry),
            _ => Err(Error::not_found("could not find dummy time entry")),
        }
    }
}

/// First item whose name equals `name` exactly.
fn first_named<T>(items: Vec<T>, name: &str, kind: &str, name_of: impl Fn(&T) -> &str) -> Result<T> {
    items
        .into_iter()
        .find(|item| name_of(item) == name)
        .ok_or_else(|| Error::not_found(format!("cannot find {kind} '{name}' in tmetric")))
}
