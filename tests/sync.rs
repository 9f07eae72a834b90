#[cfg(test)]
mod tests {
    use chrono::NaiveDate;
    use std::cell::RefCell;
    use std::collections::{HashMap, VecDeque};
    use tmop::api::openproject::{self, Activity, WorkPackage};
    use tmop::api::tmetric::{ExternalLink, Project, Tag, Task, TimeEntry, User};
    use tmop::api::{OpenProjectApi, TmetricApi};
    use tmop::libs::config::TmetricConfig;
    use tmop::libs::date_range::DateRange;
    use tmop::libs::error::{Error, Result};
    use tmop::libs::messages::Message;
    use tmop::libs::prompt::Prompter;
    use tmop::libs::sync::{attach_work_package, check_tmetric, copy_entries, pending_copies, CheckSummary};

    const TRANSFERRED: &str = "transferred-to-openproject";

    #[derive(Default)]
    struct FakeTmetric {
        entries: Vec<TimeEntry>,
        work_types: Vec<Tag>,
        dummy_task: Task,
        updated: RefCell<Vec<TimeEntry>>,
        deleted: RefCell<Vec<u64>>,
        dummies: RefCell<Vec<u64>>,
    }

    impl TmetricApi for FakeTmetric {
        async fn time_entries(&self, _user: &User, _range: &DateRange) -> Result<Vec<TimeEntry>> {
            Ok(self.entries.clone())
        }

        async fn possible_work_types(&self, _user: &User, _entry: &TimeEntry) -> Result<Vec<Tag>> {
            Ok(self.work_types.clone())
        }

        async fn update_time_entry(&self, _user: &User, entry: &TimeEntry) -> Result<()> {
            self.updated.borrow_mut().push(entry.clone());
            Ok(())
        }

        async fn delete_time_entry(&self, _user: &User, entry: &TimeEntry) -> Result<()> {
            self.deleted.borrow_mut().push(entry.id);
            Ok(())
        }

        async fn create_dummy_time_entry(&self, _user: &User, work_package: &WorkPackage) -> Result<TimeEntry> {
            self.dummies.borrow_mut().push(work_package.id);
            Ok(TimeEntry {
                id: 9000,
                note: "dummy".to_string(),
                task: self.dummy_task.clone(),
                ..Default::default()
            })
        }
    }

    #[derive(Default)]
    struct FakeOpenProject {
        work_packages: HashMap<u64, WorkPackage>,
        activities: Vec<Activity>,
        saved: RefCell<Vec<openproject::TimeEntry>>,
    }

    impl OpenProjectApi for FakeOpenProject {
        async fn work_package(&self, id: u64) -> Result<WorkPackage> {
            self.work_packages
                .get(&id)
                .cloned()
                .ok_or_else(|| Error::not_found(format!("no work package {id}")))
        }

        async fn activity_for_work_type(&self, _work_package_id: u64, work_type: &str) -> Result<Activity> {
            self.activities
                .iter()
                .find(|activity| activity.name == work_type)
                .cloned()
                .ok_or_else(|| Error::validation(format!("Work Type '{work_type}' is not a valid activity in OpenProject")))
        }

        async fn save_time_entry(&self, entry: &openproject::TimeEntry) -> Result<()> {
            self.saved.borrow_mut().push(entry.clone());
            Ok(())
        }
    }

    /// Replays prepared answers; running out of answers fails the test.
    #[derive(Default)]
    struct ScriptedPrompter {
        work_types: RefCell<VecDeque<Option<usize>>>,
        work_packages: RefCell<VecDeque<Option<u64>>>,
        confirmations: RefCell<VecDeque<bool>>,
    }

    impl Prompter for ScriptedPrompter {
        fn select_work_type(&self, _entry: &TimeEntry, _work_types: &[Tag]) -> Result<Option<usize>> {
            Ok(self.work_types.borrow_mut().pop_front().expect("unexpected work type prompt"))
        }

        fn work_package_id(&self, _entry: &TimeEntry) -> Result<Option<u64>> {
            Ok(self.work_packages.borrow_mut().pop_front().expect("unexpected work package prompt"))
        }

        fn confirm_work_package(&self, _entry: &TimeEntry, _work_package: &WorkPackage) -> Result<bool> {
            Ok(self.confirmations.borrow_mut().pop_front().expect("unexpected confirmation"))
        }
    }

    fn config() -> TmetricConfig {
        TmetricConfig {
            token: "t".to_string(),
            client_id: 5,
            dummy_project_id: 77,
            ..Default::default()
        }
    }

    fn user() -> User {
        User {
            id: 10,
            name: "Me".to_string(),
            active_account_id: 500,
        }
    }

    fn range() -> DateRange {
        DateRange::new(
            NaiveDate::from_ymd_opt(2024, 1, 1).unwrap(),
            NaiveDate::from_ymd_opt(2024, 1, 31).unwrap(),
        )
        .unwrap()
    }

    fn work_type(id: u64, name: &str) -> Tag {
        Tag {
            id,
            name: name.to_string(),
            is_work_type: true,
        }
    }

    fn linked_task(work_package_id: u64) -> Task {
        Task {
            id: 300 + work_package_id,
            name: format!("WP {work_package_id}"),
            external_link: ExternalLink {
                caption: String::new(),
                link: format!("https://community.openproject.org/work_packages/{work_package_id}"),
                issue_id: format!("#{work_package_id}"),
            },
        }
    }

    fn entry(id: u64, note: &str) -> TimeEntry {
        TimeEntry {
            id,
            start_time: "2024-01-02T09:00:00".to_string(),
            end_time: "2024-01-02T10:30:00".to_string(),
            note: note.to_string(),
            project: Project {
                id: 3,
                name: "Website".to_string(),
                ..Default::default()
            },
            ..Default::default()
        }
    }

    fn complete_entry(id: u64, note: &str, work_package_id: u64) -> TimeEntry {
        TimeEntry {
            task: linked_task(work_package_id),
            tags: vec![work_type(1, "Development")],
            ..entry(id, note)
        }
    }

    fn development() -> Activity {
        Activity {
            id: 3,
            name: "Development".to_string(),
        }
    }

    #[tokio::test]
    async fn test_check_with_valid_data_changes_nothing() {
        let tmetric = FakeTmetric {
            entries: vec![complete_entry(1, "Review", 42)],
            ..Default::default()
        };
        let openproject = FakeOpenProject::default();
        let prompter = ScriptedPrompter::default();

        let summary = check_tmetric(&tmetric, &openproject, &prompter, &config(), &user(), &range())
            .await
            .unwrap();

        assert_eq!(
            summary,
            CheckSummary {
                checked: 1,
                ..Default::default()
            }
        );
        assert!(tmetric.updated.borrow().is_empty());
    }

    #[tokio::test]
    async fn test_check_assigns_selected_work_type() {
        let mut untyped = complete_entry(1, "Review", 42);
        untyped.tags.clear();
        let tmetric = FakeTmetric {
            entries: vec![untyped],
            work_types: vec![work_type(1, "Development"), work_type(2, "Testing")],
            ..Default::default()
        };
        let prompter = ScriptedPrompter::default();
        prompter.work_types.borrow_mut().push_back(Some(1));

        let summary = check_tmetric(&tmetric, &FakeOpenProject::default(), &prompter, &config(), &user(), &range())
            .await
            .unwrap();

        assert_eq!(summary.work_types_assigned, 1);
        assert_eq!(summary.skipped, 0);
        let updated = tmetric.updated.borrow();
        assert_eq!(updated.len(), 1);
        assert_eq!(updated[0].work_type().unwrap(), "Testing");
    }

    #[tokio::test]
    async fn test_check_skips_entries_without_choice() {
        let mut untyped = complete_entry(1, "Review", 42);
        untyped.tags.clear();
        let mut no_options = complete_entry(2, "Planning", 42);
        no_options.tags.clear();
        let tmetric = FakeTmetric {
            entries: vec![untyped],
            work_types: vec![work_type(1, "Development")],
            ..Default::default()
        };
        let prompter = ScriptedPrompter::default();
        prompter.work_types.borrow_mut().push_back(None);

        let summary = check_tmetric(&tmetric, &FakeOpenProject::default(), &prompter, &config(), &user(), &range())
            .await
            .unwrap();
        assert_eq!(summary.skipped, 1);
        assert!(tmetric.updated.borrow().is_empty());

        let tmetric = FakeTmetric {
            entries: vec![no_options],
            ..Default::default()
        };
        let summary = check_tmetric(&tmetric, &FakeOpenProject::default(), &prompter, &config(), &user(), &range())
            .await
            .unwrap();
        assert_eq!(summary.skipped, 1);
        assert!(tmetric.updated.borrow().is_empty());
    }

    #[tokio::test]
    async fn test_check_links_work_package_after_retry() {
        let mut unlinked = complete_entry(1, "Review", 42);
        unlinked.task = Task::default();
        let mut transferred = unlinked.clone();
        transferred.id = 2;
        transferred.tags.push(Tag {
            id: 9,
            name: TRANSFERRED.to_string(),
            is_work_type: false,
        });

        let tmetric = FakeTmetric {
            entries: vec![unlinked, transferred],
            dummy_task: linked_task(42),
            ..Default::default()
        };
        let openproject = FakeOpenProject {
            work_packages: HashMap::from([(42, WorkPackage::new(42, "Fix login"))]),
            ..Default::default()
        };
        let prompter = ScriptedPrompter::default();
        prompter.work_packages.borrow_mut().extend([Some(999), Some(42)]);
        prompter.confirmations.borrow_mut().push_back(true);

        let summary = check_tmetric(&tmetric, &openproject, &prompter, &config(), &user(), &range())
            .await
            .unwrap();

        assert_eq!(summary.checked, 1);
        assert_eq!(summary.links_created, 1);
        assert_eq!(*tmetric.dummies.borrow(), vec![42]);
        assert_eq!(*tmetric.deleted.borrow(), vec![9000]);
        let updated = tmetric.updated.borrow();
        assert_eq!(updated.len(), 1);
        assert_eq!(updated[0].id, 1);
        assert_eq!(updated[0].task, linked_task(42));
        assert!(updated[0].has_valid_link(&config().external_task_link));
    }

    #[tokio::test]
    async fn test_check_declined_or_empty_answer_skips() {
        let mut unlinked = complete_entry(1, "Review", 42);
        unlinked.task = Task::default();
        let mut other = unlinked.clone();
        other.id = 2;

        let tmetric = FakeTmetric {
            entries: vec![unlinked, other],
            dummy_task: linked_task(42),
            ..Default::default()
        };
        let openproject = FakeOpenProject {
            work_packages: HashMap::from([(42, WorkPackage::new(42, "Fix login"))]),
            ..Default::default()
        };
        let prompter = ScriptedPrompter::default();
        prompter.work_packages.borrow_mut().extend([Some(42), None]);
        prompter.confirmations.borrow_mut().push_back(false);

        let summary = check_tmetric(&tmetric, &openproject, &prompter, &config(), &user(), &range())
            .await
            .unwrap();

        assert_eq!(summary.skipped, 2);
        assert_eq!(summary.links_created, 0);
        assert!(tmetric.dummies.borrow().is_empty());
        assert!(tmetric.updated.borrow().is_empty());
    }

    #[tokio::test]
    async fn test_attach_work_package_copies_dummy_task() {
        let tmetric = FakeTmetric {
            dummy_task: linked_task(7),
            ..Default::default()
        };
        let mut target = entry(1, "Review");

        attach_work_package(&tmetric, &user(), &mut target, &WorkPackage::new(7, "Docs"))
            .await
            .unwrap();

        assert_eq!(target.task, linked_task(7));
        assert_eq!(*tmetric.deleted.borrow(), vec![9000]);
        assert_eq!(tmetric.updated.borrow()[0].task, linked_task(7));
    }

    #[tokio::test]
    async fn test_copy_refuses_incomplete_entries() {
        let mut untyped = complete_entry(1, "Review", 42);
        untyped.tags.clear();
        let tmetric = FakeTmetric {
            entries: vec![untyped],
            ..Default::default()
        };
        let err = pending_copies(&tmetric, &config(), &user(), &range()).await.unwrap_err();
        assert_eq!(err.to_string(), Message::CopyMissingWorkType.to_string());

        let mut unlinked = complete_entry(1, "Review", 42);
        unlinked.task = Task::default();
        let tmetric = FakeTmetric {
            entries: vec![unlinked],
            ..Default::default()
        };
        let err = pending_copies(&tmetric, &config(), &user(), &range()).await.unwrap_err();
        assert_eq!(err.to_string(), Message::CopyMissingLink.to_string());
    }

    #[tokio::test]
    async fn test_copy_books_and_tags_entries() {
        let mut done = complete_entry(1, "Already there", 42);
        done.tag_as_transferred(TRANSFERRED);
        let tmetric = FakeTmetric {
            entries: vec![done, complete_entry(2, "Review", 42), complete_entry(3, "Deploy", 43)],
            ..Default::default()
        };
        let openproject = FakeOpenProject {
            activities: vec![development()],
            ..Default::default()
        };

        let pending = pending_copies(&tmetric, &config(), &user(), &range()).await.unwrap();
        assert_eq!(pending.len(), 2);
        assert_eq!(pending.already_transferred, 1);

        let mut reported = Vec::new();
        let copied = copy_entries(&tmetric, &openproject, &config(), &user(), None, pending, |entry| {
            reported.push(entry.id)
        })
        .await
        .unwrap();

        assert_eq!(copied, 2);
        assert_eq!(reported, vec![2, 3]);

        let saved = openproject.saved.borrow();
        assert_eq!(saved.len(), 2);
        assert_eq!(saved[0].comment.raw, "Review");
        assert_eq!(saved[0].spent_on, "2024-01-02");
        assert_eq!(saved[0].hours, "P0DT1H30M0S");
        assert_eq!(saved[0].links.work_package.href, "/api/v3/work_packages/42");
        assert_eq!(saved[0].links.activity.href, "/api/v3/time_entries/activities/3");
        assert_eq!(saved[1].links.work_package.href, "/api/v3/work_packages/43");

        let updated = tmetric.updated.borrow();
        assert!(updated.iter().all(|entry| entry.has_tag(TRANSFERRED)));
    }

    #[tokio::test]
    async fn test_copy_on_behalf_of_user() {
        let tmetric = FakeTmetric {
            entries: vec![complete_entry(2, "Review", 42)],
            ..Default::default()
        };
        let openproject = FakeOpenProject {
            activities: vec![development()],
            ..Default::default()
        };
        let op_user = openproject::User {
            id: 17,
            name: "Jane Doe".to_string(),
        };

        let pending = pending_copies(&tmetric, &config(), &user(), &range()).await.unwrap();
        copy_entries(&tmetric, &openproject, &config(), &user(), Some(&op_user), pending, |_| {})
            .await
            .unwrap();

        assert_eq!(openproject.saved.borrow()[0].links.user.href, "/api/v3/users/17");
    }

    #[tokio::test]
    async fn test_copy_stops_at_first_failure() {
        let mut testing = complete_entry(2, "Unit tests", 42);
        testing.tags = vec![work_type(2, "Testing")];
        let tmetric = FakeTmetric {
            entries: vec![complete_entry(1, "Review", 42), testing, complete_entry(3, "Deploy", 42)],
            ..Default::default()
        };
        let openproject = FakeOpenProject {
            activities: vec![development()],
            ..Default::default()
        };

        let pending = pending_copies(&tmetric, &config(), &user(), &range()).await.unwrap();
        let err = copy_entries(&tmetric, &openproject, &config(), &user(), None, pending, |_| {})
            .await
            .unwrap_err();

        assert!(matches!(err, Error::Entry { .. }));
        assert_eq!(
            err.to_string(),
            "Error with time entry 'Unit tests' in project 'Website'\nError: Work Type 'Testing' is not a valid activity in OpenProject"
        );
        assert_eq!(openproject.saved.borrow().len(), 1);
        assert_eq!(tmetric.updated.borrow().len(), 1);
    }
}
