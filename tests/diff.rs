#[cfg(test)]
mod tests {
    use chrono::NaiveDate;
    use tmop::api::openproject::{self, Comment, Link, Links};
    use tmop::api::tmetric::{Project, Tag, TimeEntry};
    use tmop::libs::date_range::DateRange;
    use tmop::libs::diff::Diff;
    use tmop::libs::view::{content_width, View, DEFAULT_TERMINAL_WIDTH};

    fn day(d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 3, d).unwrap()
    }

    fn tmetric_entry(note: &str, start: &str, end: &str) -> TimeEntry {
        TimeEntry {
            note: note.to_string(),
            start_time: start.to_string(),
            end_time: end.to_string(),
            project: Project {
                name: "Website".to_string(),
                ..Default::default()
            },
            tags: vec![Tag {
                id: 1,
                name: "Development".to_string(),
                is_work_type: true,
            }],
            ..Default::default()
        }
    }

    fn booking(comment: &str, spent_on: &str, hours: &str) -> openproject::TimeEntry {
        openproject::TimeEntry {
            comment: Comment { raw: comment.to_string() },
            spent_on: spent_on.to_string(),
            hours: hours.to_string(),
            links: Links {
                work_package: Link {
                    href: "/api/v3/work_packages/42".to_string(),
                    title: "Fix login".to_string(),
                },
                activity: Link {
                    href: "/api/v3/time_entries/activities/3".to_string(),
                    title: "Development".to_string(),
                },
                ..Default::default()
            },
            ..Default::default()
        }
    }

    fn sample() -> Diff {
        let range = DateRange::new(day(1), day(3)).unwrap();
        let tmetric = vec![
            tmetric_entry("Review", "2024-03-01T13:00:00", "2024-03-01T14:00:00"),
            tmetric_entry("Coding", "2024-03-01T09:00:00", "2024-03-01T11:30:00"),
            tmetric_entry("Deploy", "2024-03-03T09:00:00", "2024-03-03T09:45:00"),
            tmetric_entry("Broken", "2024-03-03T10:00:00", "2024-03-03T09:00:00"),
        ];
        let openproject = vec![
            booking("Review", "2024-03-01", "PT1H"),
            booking("Coding", "2024-03-01", "PT2H30M"),
            booking("Meeting", "2024-03-02", "PT0.5H"),
        ];
        Diff::build(&range, &tmetric, &openproject)
    }

    #[test]
    fn test_one_row_per_day() {
        let diff = sample();
        let dates: Vec<NaiveDate> = diff.rows.iter().map(|row| row.date).collect();
        assert_eq!(dates, vec![day(1), day(2), day(3)]);
    }

    #[test]
    fn test_entries_sorted_by_text() {
        let diff = sample();
        let notes: Vec<&str> = diff.rows[0].tmetric.iter().map(|entry| entry.note.as_str()).collect();
        assert_eq!(notes, vec!["Coding", "Review"]);
        let comments: Vec<&str> = diff.rows[0]
            .openproject
            .iter()
            .map(|entry| entry.comment.raw.as_str())
            .collect();
        assert_eq!(comments, vec!["Coding", "Review"]);
    }

    #[test]
    fn test_minutes_and_deltas() {
        let diff = sample();

        assert_eq!(diff.rows[0].tmetric_minutes, 210);
        assert_eq!(diff.rows[0].openproject_minutes, 210);
        assert_eq!(diff.rows[0].delta_minutes(), 0);

        assert_eq!(diff.rows[1].tmetric_minutes, 0);
        assert_eq!(diff.rows[1].openproject_minutes, 30);
        assert_eq!(diff.rows[1].delta_minutes(), 30);

        // The broken entry counts as zero.
        assert_eq!(diff.rows[2].tmetric.len(), 2);
        assert_eq!(diff.rows[2].tmetric_minutes, 45);
        assert_eq!(diff.rows[2].delta_minutes(), 45);

        assert_eq!(diff.tmetric_minutes(), 255);
        assert_eq!(diff.openproject_minutes(), 240);
        assert_eq!(diff.delta_minutes(), 15);
    }

    #[test]
    fn test_entries_outside_range_are_ignored() {
        let range = DateRange::new(day(2), day(2)).unwrap();
        let tmetric = vec![tmetric_entry("Coding", "2024-03-01T09:00:00", "2024-03-01T11:30:00")];
        let diff = Diff::build(&range, &tmetric, &[]);
        assert_eq!(diff.rows.len(), 1);
        assert!(diff.rows[0].tmetric.is_empty());
        assert_eq!(diff.tmetric_minutes(), 0);
    }

    #[test]
    fn test_table_layout() {
        let table = View::diff_table(&sample(), DEFAULT_TERMINAL_WIDTH);

        assert_eq!(table.len(), 4);
        let first = table.get_row(0).unwrap();
        assert_eq!(first.get_cell(0).unwrap().get_content(), "2024-03-01");
        assert!(first.get_cell(1).unwrap().get_content().starts_with("Description: Coding"));
        assert_eq!(first.get_cell(2).unwrap().get_content(), "02:30\n\n\n\n\n\n01:00");
        assert!(first.get_cell(3).unwrap().get_content().contains("- WP ID: #42"));
        assert_eq!(first.get_cell(5).unwrap().get_content(), "0");

        let total = table.get_row(3).unwrap();
        assert_eq!(total.get_cell(0).unwrap().get_content(), "total");
        assert_eq!(total.get_cell(2).unwrap().get_content(), "04:15");
        assert_eq!(total.get_cell(4).unwrap().get_content(), "04:00");
        assert_eq!(total.get_cell(5).unwrap().get_content(), "15");
    }

    #[test]
    fn test_long_lines_are_snipped() {
        let width = content_width(DEFAULT_TERMINAL_WIDTH);
        let table = View::diff_table(&sample(), DEFAULT_TERMINAL_WIDTH);
        let cell = table.get_row(0).unwrap().get_cell(3).unwrap().get_content();

        assert!(cell.lines().all(|line| line.chars().count() <= width));
        assert!(cell.lines().any(|line| line.ends_with('~')));
    }

    #[test]
    fn test_content_width_has_minimum() {
        assert_eq!(content_width(20), 10);
        assert_eq!(content_width(145), 50);
    }
}
