// End-to-end board behavior over the file-backed store

use chrono::NaiveDate;
use std::fs;
use taskboard::{FileKv, KvStore, Priority, Status, TASKS_KEY, TaskDraft, TaskFilter, TaskManager, TaskUpdate};
use tempfile::TempDir;

fn open(temp: &TempDir) -> TaskManager<FileKv> {
    TaskManager::new(FileKv::open(temp.path()).unwrap())
}

fn titles(tasks: &[&taskboard::Task]) -> Vec<String> {
    tasks.iter().map(|t| t.title.clone()).collect()
}

#[test]
fn test_create_then_move_scenario() {
    let temp = TempDir::new().unwrap();
    let mut board = open(&temp);

    let draft = TaskDraft::new("Write spec", Status::Todo)
        .priority(Priority::High)
        .tags(["docs"]);
    let id = board.create_task(draft).unwrap();

    let visible = board.filtered_tasks();
    assert_eq!(visible.len(), 1);
    assert_eq!(visible[0].title, "Write spec");
    assert_eq!(visible[0].status, Status::Todo);

    board.move_task(&id, Status::Done).unwrap();

    board.set_filter(TaskFilter::new().status(Status::Done));
    assert_eq!(titles(&board.filtered_tasks()), vec!["Write spec"]);

    board.set_filter(TaskFilter::new().status(Status::Todo));
    assert!(board.filtered_tasks().is_empty());
}

#[test]
fn test_round_trip_through_reopen() {
    let temp = TempDir::new().unwrap();

    let saved = {
        let mut board = open(&temp);
        let a = board
            .create_task(
                TaskDraft::new("Plan release", Status::InProgress)
                    .description("cut the branch")
                    .notes("after QA")
                    .tags(["release", "ops"])
                    .due_date(NaiveDate::from_ymd_opt(2025, 3, 14).unwrap()),
            )
            .unwrap();
        board.create_task(TaskDraft::new("Tidy backlog", Status::Todo)).unwrap();
        let sub = board.add_subtask(&a, "tag build").unwrap().unwrap();
        board.toggle_subtask(&a, &sub).unwrap();
        board.tasks().to_vec()
    };

    let board = open(&temp);
    assert_eq!(board.tasks(), saved.as_slice());
    assert_eq!(board.all_tags(), vec!["release", "ops"]);
}

#[test]
fn test_filter_is_not_persisted() {
    let temp = TempDir::new().unwrap();
    {
        let mut board = open(&temp);
        board.create_task(TaskDraft::new("A", Status::Todo)).unwrap();
        board.set_filter(TaskFilter::new().status(Status::Done));
        assert!(board.filtered_tasks().is_empty());
    }

    let board = open(&temp);
    assert_eq!(board.filter(), &TaskFilter::default());
    assert_eq!(board.filtered_tasks().len(), 1);
}

#[test]
fn test_corrupt_slot_loads_empty_board() {
    let temp = TempDir::new().unwrap();
    let kv = FileKv::open(temp.path()).unwrap();
    fs::write(kv.slot_path(TASKS_KEY), "[{\"id\": 42").unwrap();

    let mut board = TaskManager::new(kv);
    assert!(board.is_empty());

    // The next write replaces the corrupt slot
    board.create_task(TaskDraft::new("Fresh start", Status::Todo)).unwrap();
    let board = open(&temp);
    assert_eq!(board.len(), 1);
}

#[test]
fn test_unknown_status_in_slot_loads_empty_board() {
    let temp = TempDir::new().unwrap();
    let mut kv = FileKv::open(temp.path()).unwrap();
    let json = r#"[{"id":"t1","title":"T","description":"","status":"blocked","priority":"low","tags":[],
        "createdAt":"2024-01-01T00:00:00Z","updatedAt":"2024-01-01T00:00:00Z","subtasks":[],"notes":""}]"#;
    kv.write(TASKS_KEY, json.as_bytes()).unwrap();

    let board = TaskManager::new(kv);
    assert!(board.is_empty());
}

#[test]
fn test_reads_slot_written_in_camel_case() {
    let temp = TempDir::new().unwrap();
    let mut kv = FileKv::open(temp.path()).unwrap();
    let json = r#"[{"id":"t1","title":"Ship it","description":"","status":"in-progress","priority":"high",
        "tags":["a"],"dueDate":"2024-06-01","createdAt":"2024-01-01T00:00:00Z",
        "updatedAt":"2024-01-02T00:00:00Z","notes":"",
        "subtasks":[{"id":"s1","title":"check","completed":true,"createdAt":"2024-01-01T00:00:00Z"}]}]"#;
    kv.write(TASKS_KEY, json.as_bytes()).unwrap();

    let board = TaskManager::new(kv);
    let task = board.get("t1").unwrap();
    assert_eq!(task.status, Status::InProgress);
    assert_eq!(task.due_date, NaiveDate::from_ymd_opt(2024, 6, 1));
    assert_eq!(task.subtask_progress(), (1, 1));
}

#[test]
fn test_every_mutation_writes_through() {
    let temp = TempDir::new().unwrap();
    let mut board = open(&temp);

    let id = board.create_task(TaskDraft::new("A", Status::Todo)).unwrap();
    assert_eq!(open(&temp).len(), 1);

    board.update_task(&id, TaskUpdate::title("B")).unwrap();
    assert_eq!(open(&temp).get(&id).unwrap().title, "B");

    board.move_task(&id, Status::InProgress).unwrap();
    assert_eq!(open(&temp).get(&id).unwrap().status, Status::InProgress);

    let sub = board.add_subtask(&id, "step").unwrap().unwrap();
    assert_eq!(open(&temp).get(&id).unwrap().subtasks.len(), 1);

    board.toggle_subtask(&id, &sub).unwrap();
    assert!(open(&temp).get(&id).unwrap().subtasks[0].completed);

    board.delete_task(&id).unwrap();
    assert!(open(&temp).is_empty());
}

#[test]
fn test_tag_filter_or_semantics_across_board() {
    let temp = TempDir::new().unwrap();
    let mut board = open(&temp);
    board.create_task(TaskDraft::new("A", Status::Todo).tags(["urgent", "ui"])).unwrap();
    board.create_task(TaskDraft::new("B", Status::Todo).tags(["backend"])).unwrap();
    board.create_task(TaskDraft::new("C", Status::Done).tags(["ui"])).unwrap();

    board.toggle_filter_tag("urgent");
    assert_eq!(titles(&board.filtered_tasks()), vec!["A"]);

    board.toggle_filter_tag("backend");
    assert_eq!(titles(&board.filtered_tasks()), vec!["A", "B"]);

    board.set_filter(TaskFilter::new().search("a").tag("ui"));
    assert_eq!(titles(&board.filtered_tasks()), vec!["A"]);

    board.clear_filters();
    assert_eq!(titles(&board.filtered_tasks()), vec!["A"]);
}
