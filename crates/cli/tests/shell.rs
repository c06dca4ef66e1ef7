use cli::prompt::TerminalPrompt;
use cli::shell::{parse, Flow, Shell, ShellCommand};
use providers::memory::MemoryServer;
use providers::{AnnotationServer, ImageRecord};
use std::sync::Arc;
use tagger_core::config::AppConfig;
use tagger_core::theme::{Theme, ThemePreference};

fn server() -> Arc<MemoryServer> {
    Arc::new(MemoryServer::new(vec![
        ImageRecord::new("/pics/a.jpg", "/pics/a.txt", "cat, dog"),
        ImageRecord::new("/pics/b.jpg", "/pics/b.txt", "dog"),
    ]))
}

async fn shell_for(
    memory: &Arc<MemoryServer>,
    db: &std::path::Path,
) -> Shell<storage::Preferences> {
    let cfg = AppConfig::default();
    let server: Arc<dyn AnnotationServer> = memory.clone();
    let session = cli::app::session(&cfg, server, Arc::new(TerminalPrompt::new(true)));
    let prefs = storage::open_preferences(&db.to_string_lossy())
        .await
        .unwrap();
    let theme = ThemePreference::init(prefs).await.unwrap();
    Shell::new(session, theme)
}

async fn run(shell: &mut Shell<storage::Preferences>, line: &str) -> (Flow, String) {
    let cmd = parse(line).unwrap().unwrap();
    let mut out = Vec::new();
    let flow = shell.execute(cmd, &mut out).await.unwrap();
    (flow, String::from_utf8(out).unwrap())
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn shell_flow_scans_filters_and_edits() {
    let dir = tempfile::tempdir().unwrap();
    let memory = server();
    let mut shell = shell_for(&memory, &dir.path().join("prefs.db")).await;

    let (_, listing) = run(&mut shell, "scan /pics").await;
    assert!(listing.contains("2 of 2 images"));
    assert!(listing.contains("tags: dog 2 | cat 1"));

    let (_, filtered) = run(&mut shell, "filter cat").await;
    assert!(filtered.contains("1 of 2 images (filter: cat)"));

    let (_, opened) = run(&mut shell, "open 1").await;
    assert!(opened.contains("/pics/a.jpg"));
    assert!(opened.contains("annotation: cat, dog"));

    // navigation walks the full registry, not the filtered list
    let (_, next) = run(&mut shell, "n").await;
    assert!(next.contains("#2 /pics/b.jpg"));

    let (_, saved) = run(&mut shell, "save dog, puppy").await;
    assert_eq!(saved, "saved\n");
    assert_eq!(memory.annotation_of("/pics/b.txt").as_deref(), Some("dog, puppy"));

    let (_, deleted) = run(&mut shell, "del dog").await;
    assert!(deleted.contains("tags: [cat 1] | puppy 1"));

    let (flow, _) = run(&mut shell, "quit").await;
    assert_eq!(flow, Flow::Quit);

    let summary = shell.finish().await;
    assert_eq!(summary.sent, 2);
    assert_eq!(summary.failed, 0);
    assert_eq!(memory.annotation_of("/pics/a.txt").as_deref(), Some("cat"));
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn bare_save_sends_the_live_edit() {
    let dir = tempfile::tempdir().unwrap();
    let memory = server();
    let mut shell = shell_for(&memory, &dir.path().join("prefs.db")).await;

    run(&mut shell, "scan /pics").await;
    run(&mut shell, "open 1").await;
    run(&mut shell, "edit cat, bird").await;
    let (_, listing) = run(&mut shell, "ls").await;
    assert!(listing.contains("annotation: cat, bird"));

    let (_, saved) = run(&mut shell, "save").await;
    assert_eq!(saved, "saved\n");
    let explicit = memory.saves();
    assert_eq!(explicit.last().unwrap().content, "cat, bird");
    assert_eq!(
        shell.session().state().registry().records()[0].annotation,
        "cat, bird"
    );
    assert_eq!(shell.session().state().tag_index().count_of("bird"), Some(1));

    shell.finish().await;
    assert!(memory.saves().iter().all(|s| s.content == "cat, bird"));
    assert_eq!(memory.annotation_of("/pics/a.txt").as_deref(), Some("cat, bird"));
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn theme_toggle_survives_restart() {
    let dir = tempfile::tempdir().unwrap();
    let db = dir.path().join("prefs.db");
    let memory = server();

    let mut shell = shell_for(&memory, &db).await;
    assert_eq!(shell.theme().current(), Theme::Light);
    let (_, out) = run(&mut shell, "theme").await;
    assert!(out.contains("theme: dark"));
    shell.finish().await;

    let shell = shell_for(&memory, &db).await;
    assert_eq!(shell.theme().current(), Theme::Dark);
    assert_eq!(shell.theme().marker(), "☀️");
    shell.finish().await;
}

#[test]
fn unknown_commands_are_reported() {
    assert!(parse("open").is_err());
    assert_eq!(parse("?").unwrap(), Some(ShellCommand::Help));
}
