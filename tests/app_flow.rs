use std::thread;
use std::time::{Duration, Instant};

use lectern::App;
use lectern::event_source::SimulatedEventSource;
use lectern::pdf::{DocStatus, LoadError};
use ratatui::{Terminal, backend::TestBackend};
use tempfile::TempDir;

const MANIFEST: &str = "\
lessons:
  - title: Unit one
    document: unit1.pdf
    recordings:
      - title: Reading of unit one
        path: unit1.mp3
        duration_secs: 120.0
  - title: Unit two
    document: unit2.pdf
    recordings:
      - title: Reading of unit two
        path: unit2.mp3
        duration_secs: 90.0
";

fn lessons_dir() -> TempDir {
    let dir = tempfile::tempdir().unwrap();
    std::fs::write(dir.path().join("lessons.yaml"), MANIFEST).unwrap();
    // The referenced documents intentionally do not exist
    dir
}

fn app_for(dir: &TempDir) -> App {
    let mut app = App::new(dir.path());
    app.skip_intro();
    app
}

fn press(app: &mut App, c: char) {
    app.handle_event(SimulatedEventSource::char_key(c));
    app.pump();
}

#[test]
fn expand_all_and_collapse_all_force_every_section() {
    let dir = lessons_dir();
    let mut app = app_for(&dir);

    // Open one section locally so states differ before the broadcast
    press(&mut app, ' ');
    assert!(app.accordions()[0].is_open());
    assert!(!app.accordions()[1].is_open());

    press(&mut app, 'E');
    assert!(app.accordions().iter().all(|a| a.is_open()));
    assert!(app.accordions().iter().all(|a| a.indicator() == "−"));

    press(&mut app, 'C');
    assert!(app.accordions().iter().all(|a| !a.is_open()));
    assert!(app.accordions().iter().all(|a| a.indicator() == "+"));
}

#[test]
fn starting_a_second_recording_pauses_the_first() {
    let dir = lessons_dir();
    let mut app = app_for(&dir);

    press(&mut app, 'E');

    // Rows after expand-all: lesson 0, its recording, lesson 1, its recording
    press(&mut app, 'j'); // recording of lesson 0
    press(&mut app, ' ');
    assert_eq!(app.players().playing_count(), 1);
    assert!(app.players().get(0).unwrap().is_playing());

    press(&mut app, 'j'); // lesson 1
    press(&mut app, 'j'); // recording of lesson 1
    press(&mut app, ' ');

    assert_eq!(app.players().playing_count(), 1);
    assert!(!app.players().get(0).unwrap().is_playing());
    assert!(app.players().get(1).unwrap().is_playing());
}

#[test]
fn quit_key_ends_the_loop() {
    let dir = lessons_dir();
    let mut app = app_for(&dir);

    assert!(!app.should_quit());
    press(&mut app, 'q');
    assert!(app.should_quit());
}

#[cfg(feature = "pdf")]
#[test]
fn missing_document_surfaces_not_found_without_breaking_the_app() {
    let dir = lessons_dir();
    let mut app = app_for(&dir);

    let backend = TestBackend::new(80, 24);
    let mut terminal = Terminal::new(backend).unwrap();

    // Drawing creates the session for the selected lesson
    terminal.draw(|f| app.draw(f)).unwrap();

    let deadline = Instant::now() + Duration::from_secs(2);
    loop {
        app.pump();
        if let Some(session) = app.sessions().get(0) {
            if let DocStatus::Failed(error) = &session.state().status {
                assert!(matches!(error, LoadError::NotFound { .. }));
                break;
            }
        }
        assert!(Instant::now() < deadline, "load failure never surfaced");
        thread::sleep(Duration::from_millis(10));
    }

    // The failure stays local: drawing and navigation still work
    terminal.draw(|f| app.draw(f)).unwrap();
    press(&mut app, 'E');
    assert!(app.accordions().iter().all(|a| a.is_open()));
}
