#[cfg(test)]
mod tests {
    use chrono::NaiveDate;
    use std::sync::{Arc, Mutex};
    use tmop::api::openproject::{self, Comment};
    use tmop::api::tmetric::{self, Report, ReportFilter, ReportItem, Tag, Team};
    use tmop::libs::date_range::DateRange;
    use tmop::libs::error::{Error, Result};
    use tmop::libs::template::{render, ExportSource, TemplateContext};

    #[derive(Default)]
    struct FakeSource {
        filters: Mutex<Vec<ReportFilter>>,
    }

    impl ExportSource for FakeSource {
        async fn detailed_report(&self, filter: &ReportFilter, _range: &DateRange) -> Result<Report> {
            self.filters.lock().unwrap().push(filter.clone());
            if filter.client == "unknown" {
                return Err(Error::not_found("cannot find client 'unknown' in tmetric"));
            }
            Ok(Report::from_items(vec![
                ReportItem {
                    start_time: "2024-01-02T09:00:00Z".to_string(),
                    end_time: "2024-01-02T17:00:00Z".to_string(),
                    description: "Development".to_string(),
                    ..Default::default()
                },
                ReportItem {
                    start_time: "2024-01-03T09:00:00Z".to_string(),
                    end_time: "2024-01-03T13:30:00Z".to_string(),
                    description: "Review".to_string(),
                    ..Default::default()
                },
            ]))
        }

        async fn all_work_types(&self) -> Result<Vec<Tag>> {
            Ok(vec![
                Tag {
                    id: 1,
                    name: "Development".to_string(),
                    is_work_type: true,
                },
                Tag {
                    id: 2,
                    name: "Testing".to_string(),
                    is_work_type: true,
                },
            ])
        }

        async fn all_teams(&self) -> Result<Vec<Team>> {
            Ok(vec![Team {
                id: 8,
                name: "Developers".to_string(),
            }])
        }

        async fn openproject_time_entries(&self, user_name: &str, _range: &DateRange) -> Result<Vec<openproject::TimeEntry>> {
            Ok(vec![openproject::TimeEntry {
                comment: Comment {
                    raw: format!("booked by {user_name}"),
                },
                hours: "PT2H".to_string(),
                ..Default::default()
            }])
        }

        async fn tmetric_time_entries(&self, _range: &DateRange) -> Result<Vec<tmetric::TimeEntry>> {
            let tagged = |names: &[&str]| tmetric::TimeEntry {
                tags: names
                    .iter()
                    .map(|name| Tag {
                        name: name.to_string(),
                        is_work_type: *name != "billable",
                        ..Default::default()
                    })
                    .collect(),
                ..Default::default()
            };
            Ok(vec![
                tagged(&["Testing", "billable"]),
                tagged(&["Development"]),
                tagged(&["Testing"]),
                tagged(&[]),
            ])
        }
    }

    fn context(bill_number: Option<&str>, arbitrary_strings: &[&str]) -> TemplateContext {
        TemplateContext {
            range: DateRange::new(
                NaiveDate::from_ymd_opt(2024, 1, 1).unwrap(),
                NaiveDate::from_ymd_opt(2024, 1, 31).unwrap(),
            )
            .unwrap(),
            bill_number: bill_number.map(str::to_string),
            arbitrary_strings: arbitrary_strings.iter().map(|value| value.to_string()).collect(),
        }
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn test_render_bill() {
        let source = Arc::new(FakeSource::default());
        let template = "Bill {{ bill_number() }} for {{ service_date() }}\n\
            {% set report = detailed_report(\"ACME\", \"\", \"Developers\") %}\
            {{ report.duration }} = {{ format_float(report.hours) }} h";

        let output = render("bill.tmpl", template, source.clone(), context(Some("2024-007"), &[])).unwrap();

        assert_eq!(output, "Bill 2024-007 for 01/2024\n12:30 = 12,50 h");
        let filters = source.filters.lock().unwrap();
        assert_eq!(
            filters[0],
            ReportFilter {
                client: "ACME".to_string(),
                tag: String::new(),
                team: "Developers".to_string(),
                project: String::new(),
            }
        );
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn test_render_with_project_filter() {
        let source = Arc::new(FakeSource::default());
        let template = r#"{{ detailed_report("ACME", "Development", "", "Website").items | length }}"#;

        let output = render("export.tmpl", template, source.clone(), context(None, &[])).unwrap();

        assert_eq!(output, "2");
        assert_eq!(source.filters.lock().unwrap()[0].project, "Website");
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn test_render_lists_and_arbitrary_strings() {
        let source = Arc::new(FakeSource::default());
        let template = r#"{{ arbitrary_string(0) }}/{{ arbitrary_string(1) }}: {% for tag in all_work_types() %}{{ tag.name }} {% endfor %}{% for team in all_teams() %}[{{ team.name }}]{% endfor %} {{ all_time_entries_from_openproject("Jane")[0].comment.raw }}"#;

        let output = render("export.tmpl", template, source, context(None, &["Q1", "internal"])).unwrap();

        assert_eq!(output, "Q1/internal: Development Testing [Developers] booked by Jane");
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn test_render_assigned_work_types() {
        let source = Arc::new(FakeSource::default());
        let template = r#"{{ assigned_work_types() | join(", ") }}"#;

        let output = render("export.tmpl", template, source, context(None, &[])).unwrap();

        assert_eq!(output, "Development, Testing");
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn test_missing_values_fail_rendering() {
        let source = Arc::new(FakeSource::default());

        let err = render("export.tmpl", "{{ arbitrary_string(2) }}", source.clone(), context(None, &["only"])).unwrap_err();
        assert!(matches!(err, Error::Template(_)));
        assert!(err.to_string().starts_with("could not execute template"));
        assert!(err.to_string().contains("arbitrary string 2 was not given on the command line"));

        let err = render("export.tmpl", "{{ bill_number() }}", source, context(None, &[])).unwrap_err();
        assert!(err.to_string().contains("no bill number given"));
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn test_service_errors_fail_rendering() {
        let source = Arc::new(FakeSource::default());
        let template = r#"{{ detailed_report("unknown", "", "").hours }}"#;

        let err = render("bill.tmpl", template, source, context(Some("1"), &[])).unwrap_err();
        assert!(err.to_string().contains("cannot find client 'unknown' in tmetric"));
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn test_syntax_errors_name_the_template() {
        let source = Arc::new(FakeSource::default());
        let err = render("broken.tmpl", "{% if %}", source, context(None, &[])).unwrap_err();
        assert!(err.to_string().starts_with("could not parse template file 'broken.tmpl'"));
    }

    #[test]
    fn test_render_requires_runtime() {
        let source = Arc::new(FakeSource::default());
        let err = render("bill.tmpl", "{{ bill_number() }}", source, context(Some("1"), &[])).unwrap_err();
        assert!(err.to_string().starts_with("no async runtime available"));
    }
}
