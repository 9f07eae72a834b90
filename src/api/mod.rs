//! API clients for the two services tmop reconciles.
//!
//! Both clients are thin wrappers over `reqwest`: every operation is a single
//! awaited request whose unexpected status or transport failure becomes an
//! [`Error`] carrying the context of the call. Nothing is retried.
//!
//! The workflow in [`crate::libs::sync`] only depends on the [`TmetricApi`] and
//! [`OpenProjectApi`] traits so it can be driven by in-memory fakes.
//!
//! ## Usage
//!
//! ```rust,no_run
//! use tmop::api::{openproject::OpenProject, tmetric::Tmetric};
//! use tmop::libs::config::Config;
//!
//! # async fn run() -> anyhow::Result<()> {
//! let config = Config::load(None)?;
//! let tmetric = Tmetric::new(config.tmetric()?);
//! let openproject = OpenProject::new(config.openproject()?);
//! let me = tmetric.current_user().await?;
//! # Ok(())
//! # }
//! ```

use crate::libs::date_range::DateRange;
use crate::libs::error::{Error, Result};
use reqwest::{RequestBuilder, StatusCode};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Deserializer};

pub mod openproject;
pub mod tmetric;

/// Tmetric operations used by the copy and check workflows.
#[allow(async_fn_in_trait)]
pub trait TmetricApi {
    /// Entries of `user` in the range that belong to the configured client.
    async fn time_entries(&self, user: &tmetric::User, range: &DateRange) -> Result<Vec<tmetric::TimeEntry>>;

    /// Work-type tags that may be assigned to entries of the entry's project.
    async fn possible_work_types(&self, user: &tmetric::User, entry: &tmetric::TimeEntry) -> Result<Vec<tmetric::Tag>>;

    async fn update_time_entry(&self, user: &tmetric::User, entry: &tmetric::TimeEntry) -> Result<()>;

    async fn delete_time_entry(&self, user: &tmetric::User, entry: &tmetric::TimeEntry) -> Result<()>;

    /// Creates a throwaway entry linked to the work package and returns it.
    ///
    /// Tmetric offers no other way of creating an external task, so the
    /// caller copies the task of the returned entry and deletes the entry.
    async fn create_dummy_time_entry(
        &self,
        user: &tmetric::User,
        work_package: &openproject::WorkPackage,
    ) -> Result<tmetric::TimeEntry>;
}

/// OpenProject operations used by the copy and check workflows.
#[allow(async_fn_in_trait)]
pub trait OpenProjectApi {
    async fn work_package(&self, id: u64) -> Result<openproject::WorkPackage>;

    /// Resolves a Tmetric work-type name to an activity allowed for the
    /// work package.
    async fn activity_for_work_type(&self, work_package_id: u64, work_type: &str) -> Result<openproject::Activity>;

    async fn save_time_entry(&self, entry: &openproject::TimeEntry) -> Result<()>;
}

/// Joins a base URL and a path with exactly one slash between them.
pub fn join_url(base: &str, path: &str) -> String {
    format!("{}/{}", base.trim_end_matches('/'), path.trim_start_matches('/'))
}

/// Sends the request and returns the body if the status is `expected`.
pub(crate) async fn send(request: RequestBuilder, expected: StatusCode, context: impl Fn() -> String) -> Result<String> {
    execute(request, |status| status == expected, context).await
}

/// Sends the request and returns the body for any 2xx status.
pub(crate) async fn send_success(request: RequestBuilder, context: impl Fn() -> String) -> Result<String> {
    execute(request, |status| status.is_success(), context).await
}

async fn execute(
    request: RequestBuilder,
    accept: impl Fn(StatusCode) -> bool,
    context: impl Fn() -> String,
) -> Result<String> {
    let (client, request) = request.build_split();
    let request = request.map_err(|source| Error::Transport { context: context(), source })?;
    let method = request.method().clone();
    let url = request.url().clone();

    let response = client
        .execute(request)
        .await
        .map_err(|source| Error::Transport { context: context(), source })?;
    let status = response.status();
    tracing::debug!(%method, %url, status = status.as_u16(), "request finished");

    if !accept(status) {
        return Err(Error::Status { context: context(), status });
    }

    response
        .text()
        .await
        .map_err(|source| Error::Transport { context: context(), source })
}

pub(crate) fn decode<T: DeserializeOwned>(body: &str, context: &str) -> Result<T> {
    serde_json::from_str(body).map_err(|source| Error::Decode {
        context: context.to_string(),
        source,
    })
}

/// Decodes `null` as the default value of the field type.
pub(crate) fn null_as_default<'de, D, T>(deserializer: D) -> std::result::Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}
