use crossterm::event::DisableMouseCapture;
use crossterm::event::EnableMouseCapture;
use crossterm::terminal::EnterAlternateScreen;
use crossterm::terminal::LeaveAlternateScreen;
use crossterm::terminal::disable_raw_mode;
use crossterm::terminal::enable_raw_mode;
use futures::executor::block_on;
use ratatui::Terminal;
use ratatui::backend::CrosstermBackend;
use ratatui::layout::Constraint;
use ratatui::layout::Direction;
use ratatui::layout::Layout;
use ratatui::style::Style;
use ratatui::text::Span;
use ratatui::widgets::Block;
use ratatui::widgets::Borders;
use ratatui_remote_list::controller::FetchFuture;
use ratatui_remote_list::controller::PageResponse;
use ratatui_remote_list::controller::RemoteListController;
use ratatui_remote_list::crossterm_input::input_event_from_crossterm;
use ratatui_remote_list::input::InputEvent;
use ratatui_remote_list::picker::PickerOptions;
use ratatui_remote_list::picker::PickerView;
use ratatui_remote_list::query::PAGE_SIZE;
use ratatui_remote_list::query::PageRequest;
use ratatui_remote_list::query::Query;
use ratatui_remote_list::theme::Theme;
use std::cell::RefCell;
use std::io;
use std::rc::Rc;
use std::time::Duration;
use std::time::Instant;

fn directory() -> Vec<String> {
    let first = [
        "ada", "alan", "anna", "edsger", "grace", "john", "kathleen", "ken", "linus", "margaret",
    ];
    let last = [
        "antonelli", "backus", "hamilton", "hopper", "kernighan", "lovelace", "mccarthy",
        "ritchie", "thompson", "torvalds",
    ];
    let mut names = Vec::new();
    for f in first {
        for l in last {
            names.push(format!("{f} {l}"));
        }
    }
    names
}

/// Stands in for a remote API: substring match plus paging over an in-memory directory.
fn directory_fetch(data: Vec<String>) -> impl Fn(PageRequest, Option<String>) -> FetchFuture<String> {
    move |request, search| {
        let data = data.clone();
        Box::pin(async move {
            let matches: Vec<String> = data
                .iter()
                .filter(|name| search.as_deref().is_none_or(|s| name.contains(s)))
                .cloned()
                .collect();
            let total = matches.len() as u64;
            let start = (request.page as usize - 1) * PAGE_SIZE as usize;
            let items = matches
                .into_iter()
                .skip(start)
                .take(PAGE_SIZE as usize)
                .collect();
            Ok(PageResponse { items, total })
        })
    }
}

fn main() -> io::Result<()> {
    let mut stdout = io::stdout();
    enable_raw_mode()?;
    crossterm::execute!(stdout, EnterAlternateScreen, EnableMouseCapture)?;

    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let res = run(&mut terminal);

    disable_raw_mode()?;
    crossterm::execute!(terminal.backend_mut(), LeaveAlternateScreen, DisableMouseCapture)?;
    terminal.show_cursor()?;
    res
}

fn run<B: ratatui::backend::Backend<Error = io::Error>>(
    terminal: &mut Terminal<B>,
) -> io::Result<()> {
    let theme = Theme::default();
    let status: Rc<RefCell<String>> = Rc::new(RefCell::new("pick someone".into()));

    let controller = RemoteListController::new(directory_fetch(directory()), Query::default());
    let submitted = status.clone();
    let cancelled = status.clone();
    let mut picker = PickerView::new(
        controller,
        |name: &String| name.clone(),
        |name: &String| name.clone(),
    )
    .with_options(PickerOptions {
        placeholder: "search the directory".into(),
        ..PickerOptions::default()
    })
    .on_submit(move |name| *submitted.borrow_mut() = format!("submitted: {name}"))
    .on_cancel(move || *cancelled.borrow_mut() = "cancelled".into());

    picker.handle_event(InputEvent::FocusGained, Instant::now());

    loop {
        // The picker says which page it wants; the demo backend answers instantly, so
        // driving the future with a plain block_on is fine here.
        while let Some(key) = picker.missing_page() {
            match block_on(picker.controller().page(key.page)) {
                Ok(items) => {
                    picker.insert_page(key, items);
                }
                Err(err) => {
                    *status.borrow_mut() = err.to_string();
                    break;
                }
            }
        }

        terminal.draw(|f| {
            let area = f.area();
            let [main, status_line] = Layout::default()
                .direction(Direction::Vertical)
                .constraints([Constraint::Min(1), Constraint::Length(1)])
                .areas(area);

            let block = Block::default()
                .title("remote-list picker (type to search, Enter to pick/submit, ctrl-c quits)")
                .borders(Borders::ALL);
            let inner = block.inner(main);
            f.render_widget(block, main);

            let buf = f.buffer_mut();
            picker.render(inner, buf, &theme);
            let span = Span::styled(status.borrow().clone(), Style::default());
            buf.set_span(status_line.x, status_line.y, &span, status_line.width);
        })?;

        if crossterm::event::poll(Duration::from_millis(50))? {
            let ev = crossterm::event::read()?;
            if let crossterm::event::Event::Key(key) = &ev {
                if key.code == crossterm::event::KeyCode::Char('c')
                    && key
                        .modifiers
                        .contains(crossterm::event::KeyModifiers::CONTROL)
                {
                    return Ok(());
                }
            }
            if let Some(event) = input_event_from_crossterm(ev) {
                picker.handle_event(event, Instant::now());
            }
        }
        picker.tick(Instant::now());
    }
}
