//! Template rendering for the `bill` and `export` commands.
//!
//! Templates are plain `minijinja` templates. The data is pulled by the
//! template itself through global functions:
//!
//! | function | result |
//! |----------|--------|
//! | `detailed_report(client, tag, team[, project])` | Tmetric report with `items`, `seconds`, `hours`, `duration` |
//! | `all_work_types()` | work-type tags of the account |
//! | `all_teams()` | teams of the account |
//! | `all_time_entries_from_openproject(user)` | bookings of the named OpenProject user |
//! | `assigned_work_types()` | sorted work-type names used by the Tmetric entries in range |
//! | `arbitrary_string(i)` | i-th `--arbitraryString` value |
//! | `bill_number()` | the `--billNumber` value |
//! | `service_date()` | `MM/YYYY` of the start date |
//! | `format_float(f)` | `f` with two decimals and a comma |
//!
//! Empty names passed to `detailed_report` do not filter.
//!
//! ```text
//! Invoice {{ bill_number() }} for {{ service_date() }}
//! {% set report = detailed_report("ACME", "", "Developers") %}
//! Development: {{ format_float(report.hours) }} h
//! ```

use crate::api::openproject::{self, OpenProject};
use crate::api::tmetric::{self, Report, ReportFilter, Tag, Team, Tmetric};
use crate::api::TmetricApi;
use crate::libs::date_range::DateRange;
use crate::libs::error::{Error, Result};
use crate::libs::formatter::format_float;
use crate::libs::time_entry::assigned_work_types;
use minijinja::{context, Environment, ErrorKind, Value};
use std::future::Future;
use std::sync::Arc;
use tokio::runtime::Handle;

/// Data the template functions read from.
#[allow(async_fn_in_trait)]
pub trait ExportSource {
    async fn detailed_report(&self, filter: &ReportFilter, range: &DateRange) -> Result<Report>;

    async fn all_work_types(&self) -> Result<Vec<Tag>>;

    async fn all_teams(&self) -> Result<Vec<Team>>;

    async fn openproject_time_entries(&self, user_name: &str, range: &DateRange) -> Result<Vec<openproject::TimeEntry>>;

    async fn tmetric_time_entries(&self, range: &DateRange) -> Result<Vec<tmetric::TimeEntry>>;
}

/// [`ExportSource`] backed by both services, acting as the Tmetric token owner.
#[derive(Debug)]
pub struct ServiceSource {
    pub tmetric: Tmetric,
    pub openproject: OpenProject,
    pub user: tmetric::User,
}

impl ExportSource for ServiceSource {
    async fn detailed_report(&self, filter: &ReportFilter, range: &DateRange) -> Result<Report> {
        self.tmetric.detailed_report(&self.user, filter, range).await
    }

    async fn all_work_types(&self) -> Result<Vec<Tag>> {
        self.tmetric.all_work_types(&self.user).await
    }

    async fn all_teams(&self) -> Result<Vec<Team>> {
        self.tmetric.all_teams(&self.user).await
    }

    async fn openproject_time_entries(&self, user_name: &str, range: &DateRange) -> Result<Vec<openproject::TimeEntry>> {
        let user = self.openproject.find_user_by_name(user_name).await?;
        self.openproject.time_entries(Some(&user), range, &[]).await
    }

    async fn tmetric_time_entries(&self, range: &DateRange) -> Result<Vec<tmetric::TimeEntry>> {
        self.tmetric.time_entries(&self.user, range).await
    }
}

/// Command line values available to templates.
#[derive(Debug, Clone)]
pub struct TemplateContext {
    pub range: DateRange,
    pub bill_number: Option<String>,
    pub arbitrary_strings: Vec<String>,
}

/// Renders `source_text` with the export functions registered.
///
/// Must be called from within a multi-threaded tokio runtime; the template
/// functions block on it to reach the services.
pub fn render<S>(name: &str, source_text: &str, source: Arc<S>, context: TemplateContext) -> Result<String>
where
    S: ExportSource + Send + Sync + 'static,
{
    let handle = Handle::try_current().map_err(|err| Error::Template(format!("no async runtime available: {err}")))?;
    let env = environment(source, context, handle);

    let template = env
        .template_from_named_str(name, source_text)
        .map_err(|err| Error::Template(format!("could not parse template file '{name}': {err}")))?;
    template
        .render(context! {})
        .map_err(|err| Error::Template(format!("could not execute template: {err}")))
}

fn environment<'a, S>(source: Arc<S>, context: TemplateContext, handle: Handle) -> Environment<'a>
where
    S: ExportSource + Send + Sync + 'static,
{
    let mut env = Environment::new();
    let context = Arc::new(context);

    {
        let (source, context, handle) = (source.clone(), context.clone(), handle.clone());
        env.add_function(
            "detailed_report",
            move |client: String, tag: String, team: String, project: Option<String>| -> std::result::Result<Value, minijinja::Error> {
                let filter = ReportFilter {
                    client,
                    tag,
                    team,
                    project: project.unwrap_or_default(),
                };
                let report = block_on(&handle, source.detailed_report(&filter, &context.range)).map_err(template_error)?;
                Ok(Value::from_serialize(&report))
            },
        );
    }

    {
        let (source, handle) = (source.clone(), handle.clone());
        env.add_function("all_work_types", move || -> std::result::Result<Value, minijinja::Error> {
            let work_types = block_on(&handle, source.all_work_types()).map_err(template_error)?;
            Ok(Value::from_serialize(&work_types))
        });
    }

    {
        let (source, handle) = (source.clone(), handle.clone());
        env.add_function("all_teams", move || -> std::result::Result<Value, minijinja::Error> {
            let teams = block_on(&handle, source.all_teams()).map_err(template_error)?;
            Ok(Value::from_serialize(&teams))
        });
    }

    {
        let (source, context, handle) = (source.clone(), context.clone(), handle.clone());
        env.add_function(
            "all_time_entries_from_openproject",
            move |user: String| -> std::result::Result<Value, minijinja::Error> {
                let entries =
                    block_on(&handle, source.openproject_time_entries(&user, &context.range)).map_err(template_error)?;
                Ok(Value::from_serialize(&entries))
            },
        );
    }

    {
        let (source, context, handle) = (source.clone(), context.clone(), handle.clone());
        env.add_function("assigned_work_types", move || -> std::result::Result<Vec<String>, minijinja::Error> {
            let entries = block_on(&handle, source.tmetric_time_entries(&context.range)).map_err(template_error)?;
            Ok(assigned_work_types(&entries))
        });
    }

    {
        let context = context.clone();
        env.add_function("arbitrary_string", move |index: usize| -> std::result::Result<String, minijinja::Error> {
            context.arbitrary_strings.get(index).cloned().ok_or_else(|| {
                minijinja::Error::new(
                    ErrorKind::InvalidOperation,
                    format!("arbitrary string {index} was not given on the command line"),
                )
            })
        });
    }

    {
        let context = context.clone();
        env.add_function("bill_number", move || -> std::result::Result<String, minijinja::Error> {
            context
                .bill_number
                .clone()
                .ok_or_else(|| minijinja::Error::new(ErrorKind::InvalidOperation, "no bill number given"))
        });
    }

    {
        let context = context.clone();
        env.add_function("service_date", move || context.range.start.format("%m/%Y").to_string());
    }

    env.add_function("format_float", format_float);

    env
}

fn block_on<F: Future>(handle: &Handle, future: F) -> F::Output {
    tokio::task::block_in_place(|| handle.block_on(future))
}

fn template_error(err: Error) -> minijinja::Error {
    minijinja::Error::new(ErrorKind::InvalidOperation, err.to_string())
}
