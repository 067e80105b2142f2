use clap::Parser;
use crossterm::event::{Event, KeyCode, KeyEvent, KeyModifiers};
use ratatui::Terminal;
use ratatui::backend::TestBackend;
use ratatui::layout::Rect;

use eventurer::app::{App, WidgetId};
use eventurer::config::{AppConfig, Cli};
use eventurer::forum::ForumStore;
use eventurer::ui::UiFrame;

fn build(dir: &tempfile::TempDir, width: u16, height: u16) -> App {
    let cli = Cli::parse_from([
        "eventurer",
        "--data-dir",
        dir.path().to_str().unwrap(),
        "-e",
        "gig",
        "--event-title",
        "Jazz night",
        "--event-start",
        "2999-01-01T00:00:00Z",
    ]);
    let config = AppConfig::try_from(&cli).unwrap();
    let mut store = ForumStore::new(&config.data_dir);
    assert!(store.init());
    App::new(config, store, Rect::new(0, 0, width, height))
}

fn screen(terminal: &Terminal<TestBackend>) -> String {
    let buffer = terminal.backend().buffer();
    let area = buffer.area;
    (0..area.height)
        .map(|y| {
            (0..area.width)
                .filter_map(|x| buffer.cell((x, y)).map(|c| c.symbol().to_string()))
                .collect::<String>()
        })
        .collect::<Vec<_>>()
        .join("\n")
}

#[test]
fn renders_countdown_over_forum() {
    let dir = tempfile::tempdir().unwrap();
    let mut app = build(&dir, 80, 24);
    let mut terminal = Terminal::new(TestBackend::new(80, 24)).unwrap();
    terminal
        .draw(|frame| {
            let mut ui = UiFrame::new(frame);
            app.render(&mut ui);
        })
        .unwrap();
    let text = screen(&terminal);
    assert!(text.contains("Forum · Jazz night"));
    assert!(text.contains("Jazz night in"));
    assert!(text.contains("? Ask us"));
}

#[test]
fn shrinking_the_terminal_keeps_widgets_inside() {
    let dir = tempfile::tempdir().unwrap();
    let mut app = build(&dir, 80, 24);
    app.handle_event(&Event::Resize(50, 12));
    let body = Rect::new(0, 0, 50, 11);
    for id in [WidgetId::Countdown, WidgetId::Faq] {
        let rect = app.widget_rect(id);
        assert_eq!(rect.intersection(body), rect, "{id:?} escaped the body");
    }
}

fn type_line(app: &mut App, text: &str) {
    for c in text.chars() {
        app.handle_event(&Event::Key(KeyEvent::new(KeyCode::Char(c), KeyModifiers::NONE)));
    }
    app.handle_event(&Event::Key(KeyEvent::new(KeyCode::Enter, KeyModifiers::NONE)));
}

#[test]
fn reply_via_keys_is_nested_under_selection() {
    let dir = tempfile::tempdir().unwrap();
    let mut app = build(&dir, 80, 24);
    type_line(&mut app, "nfirst");
    type_line(&mut app, "rsecond");
    let threads = app.store().get_posts_by_event("gig");
    assert_eq!(threads.len(), 1);
    assert_eq!(threads[0].replies.len(), 1);
    assert_eq!(threads[0].replies[0].post.text, "second");
    assert_eq!(app.forum().row_count(), 2);
}
