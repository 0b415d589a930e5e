//! End-to-end sync tests: mock API on one side, a temp folder on the other.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use chrono::{Days, Local};
use serde_json::json;
use tempfile::TempDir;
use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

use habitica::{ClientConfig, HabiticaClient, TaskCategory};
use notes::{
    EventHub, EventKind, FileNoteStore, RenderSettings, SubscriberGroup, SyncError,
    SyncOrchestrator,
};

struct Harness {
    orchestrator: SyncOrchestrator<FileNoteStore>,
    hub: Arc<EventHub>,
    temp_dir: TempDir,
}

impl Harness {
    fn folder(&self) -> std::path::PathBuf {
        self.temp_dir.path().join("habitica")
    }

    fn note(&self, name: &str) -> Option<String> {
        std::fs::read_to_string(self.folder().join(name)).ok()
    }
}

fn harness(server: &MockServer) -> Harness {
    let config = ClientConfig {
        base_url: server.uri(),
        timeout: Duration::from_secs(5),
        rate_limit_buffer: Duration::from_millis(0),
        ..ClientConfig::new("user-1", "key-1")
    };
    let client = HabiticaClient::new(&config).unwrap();
    let hub = Arc::new(EventHub::new());
    let temp_dir = TempDir::new().unwrap();
    let store = FileNoteStore::new(temp_dir.path().join("habitica"));
    let orchestrator = SyncOrchestrator::new(
        client,
        Arc::clone(&hub),
        store,
        RenderSettings::default(),
    );
    Harness {
        orchestrator,
        hub,
        temp_dir,
    }
}

async fn mount_tasks(server: &MockServer, tasks: serde_json::Value) {
    Mock::given(method("GET"))
        .and(path("/api/v3/tasks/user"))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(json!({ "success": true, "data": tasks })),
        )
        .mount(server)
        .await;
}

fn counter(hub: &EventHub, event: EventKind, group: SubscriberGroup) -> Arc<AtomicUsize> {
    let count = Arc::new(AtomicUsize::new(0));
    let clone = Arc::clone(&count);
    hub.subscribe(event, group, move |tasks| {
        clone.fetch_add(tasks.len(), Ordering::SeqCst);
    });
    count
}

#[tokio::test]
async fn sync_writes_one_note_per_persisted_category() {
    let server = MockServer::start().await;
    let today = Local::now().date_naive();
    let tomorrow = today + Days::new(1);

    mount_tasks(
        &server,
        json!([
            { "id": "d1", "type": "daily", "text": "Water the plants" },
            { "id": "d2", "type": "daily", "text": "Journal", "completed": true },
            { "id": "t1", "type": "todo", "text": "File taxes",
              "date": format!("{}T12:00:00Z", tomorrow.format("%Y-%m-%d")) },
            { "id": "r1", "type": "reward", "text": "Ice cream" },
            { "id": "c1", "type": "completedTodo", "text": "Old chore", "completed": true }
        ]),
    )
    .await;

    let h = harness(&server);
    h.orchestrator.sync_all().await.unwrap();

    let daily = h.note("daily.md").expect("daily note written");
    assert_eq!(
        daily,
        format!(
            "- [ ] Water the plants 🔽 📅 {today}\n- [x] Journal 🔽 📅 {today}",
            today = today.format("%Y-%m-%d")
        )
    );

    let todo = h.note("todo.md").expect("todo note written");
    assert_eq!(
        todo,
        format!("- [ ] File taxes 🔽 📅 {}", tomorrow.format("%Y-%m-%d"))
    );

    // Exactly the two artifacts: nothing for the empty habit bucket and
    // nothing for the excluded categories.
    let entries: Vec<String> = std::fs::read_dir(h.folder())
        .unwrap()
        .map(|entry| entry.unwrap().file_name().to_string_lossy().into_owned())
        .collect();
    assert_eq!(entries.len(), 2, "unexpected notes: {entries:?}");
}

#[tokio::test]
async fn sync_drops_unknown_categories_and_continues() {
    let server = MockServer::start().await;
    mount_tasks(
        &server,
        json!([
            { "id": "x1", "type": "challengeQuest", "text": "???" },
            { "id": "h1", "type": "habit", "text": "Stretch" }
        ]),
    )
    .await;

    let h = harness(&server);
    h.orchestrator.sync_all().await.unwrap();

    let habit = h.note("habit.md").expect("habit note written");
    assert_eq!(habit, "- [ ] Stretch 🔽");
    assert!(h.note("todo.md").is_none());
}

#[tokio::test]
async fn file_sync_listeners_are_suspended_during_sync() {
    let server = MockServer::start().await;
    mount_tasks(
        &server,
        json!([
            { "id": "d1", "type": "daily", "text": "One" },
            { "id": "d2", "type": "daily", "text": "Two" }
        ]),
    )
    .await;

    let h = harness(&server);
    let file_sync = counter(&h.hub, EventKind::Dailies, SubscriberGroup::FileSync);
    let panel = counter(&h.hub, EventKind::Dailies, SubscriberGroup::Panel);

    h.orchestrator.sync_all().await.unwrap();

    // The bulk fan-out reached the panel but not the suspended group.
    assert_eq!(panel.load(Ordering::SeqCst), 2);
    assert_eq!(file_sync.load(Ordering::SeqCst), 0);

    // After the sync the group is live again.
    h.orchestrator.refresh().await.unwrap();
    assert_eq!(file_sync.load(Ordering::SeqCst), 2);
}

#[tokio::test]
async fn transport_failure_writes_nothing() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/v3/tasks/user"))
        .respond_with(ResponseTemplate::new(500).set_body_string("boom"))
        .mount(&server)
        .await;

    let h = harness(&server);
    let err = h.orchestrator.sync_all().await.unwrap_err();

    assert!(matches!(err, SyncError::Fetch(_)));
    assert!(!h.folder().exists(), "no artifact may exist after a failed fetch");
}

#[tokio::test]
async fn application_failure_writes_nothing() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/v3/tasks/user"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "success": false,
            "message": "maintenance window"
        })))
        .mount(&server)
        .await;

    let h = harness(&server);
    h.orchestrator.sync_all().await.unwrap_err();
    assert!(!h.folder().exists());
}

#[tokio::test]
async fn refresh_category_fetches_one_kind_and_fans_out() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/v3/tasks/user"))
        .and(query_param("type", "todos"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "success": true,
            "data": [ { "id": "t1", "type": "todo", "text": "Only todos" } ]
        })))
        .expect(1)
        .mount(&server)
        .await;

    let h = harness(&server);
    let panel = counter(&h.hub, EventKind::Todos, SubscriberGroup::Panel);

    let tasks = h.orchestrator.refresh_category(TaskCategory::Todo).await.unwrap();
    assert_eq!(tasks.len(), 1);
    assert_eq!(panel.load(Ordering::SeqCst), 1);
}
