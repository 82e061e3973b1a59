use std::io::{Stdout, stdout};
use std::time::Duration;

use anyhow::Result;
use crossterm::{
    event::{self, Event, KeyCode, KeyEventKind},
    execute,
    terminal::{EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode},
};
use ratatui::{
    Terminal,
    backend::CrosstermBackend,
    layout::{Constraint, Direction, Layout},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, List, ListItem, ListState, Paragraph, Wrap},
};
use todostore::{Todo, TodoRepository};

use crate::app::{App, InputMode};

pub fn run<R: TodoRepository>(mut app: App<R>, tick_rate: Duration) -> Result<()> {
    enable_raw_mode()?;
    let mut stdout = stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let res = event_loop(&mut terminal, &mut app, tick_rate);

    cleanup_terminal(&mut terminal)?;
    res
}

fn event_loop<R: TodoRepository>(
    terminal: &mut Terminal<CrosstermBackend<Stdout>>,
    app: &mut App<R>,
    tick_rate: Duration,
) -> Result<()> {
    loop {
        terminal.draw(|f| draw(f, app))?;

        if event::poll(tick_rate)?
            && let Event::Key(key) = event::read()?
            && key.kind == KeyEventKind::Press
            && handle_key(app, key.code)
        {
            return Ok(());
        }
    }
}

/// Returns `true` when the user asked to quit.
fn handle_key<R: TodoRepository>(app: &mut App<R>, code: KeyCode) -> bool {
    match app.mode {
        InputMode::Normal => match code {
            KeyCode::Char('q') => return true,
            KeyCode::Char('j') | KeyCode::Down => app.select_next(),
            KeyCode::Char('k') | KeyCode::Up => app.select_previous(),
            KeyCode::Char('a') | KeyCode::Char('n') => app.start_add(),
            KeyCode::Char('e') => app.start_edit(),
            KeyCode::Enter | KeyCode::Char(' ') => app.toggle_selected(),
            KeyCode::Char('d') | KeyCode::Delete => app.delete_selected(),
            KeyCode::Char('r') => {
                app.reload();
                app.set_status("Reloaded");
            }
            _ => {}
        },
        InputMode::Title | InputMode::Description => match code {
            KeyCode::Esc => app.cancel_input(),
            KeyCode::Enter => app.submit_input(),
            KeyCode::Backspace => {
                app.input.pop();
            }
            KeyCode::Char(c) => app.input.push(c),
            _ => {}
        },
    }

    false
}

fn draw<R: TodoRepository>(f: &mut ratatui::Frame, app: &App<R>) {
    let rows = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3),
            Constraint::Min(1),
            Constraint::Length(3),
        ])
        .split(f.area());

    f.render_widget(render_header(app), rows[0]);

    let body = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(60), Constraint::Percentage(40)])
        .split(rows[1]);

    let mut list_state = ListState::default();
    if !app.todos.is_empty() {
        list_state.select(Some(app.selected));
    }
    f.render_stateful_widget(
        render_list(&app.todos, app.selected),
        body[0],
        &mut list_state,
    );
    f.render_widget(render_details(app.selected_todo()), body[1]);

    f.render_widget(render_footer(app), rows[2]);
}

fn render_header<R: TodoRepository>(app: &App<R>) -> Paragraph<'static> {
    let total = app.todos.len();
    let done = app.todos.iter().filter(|t| t.done_status).count();
    let summary = format!("Open: {} / All: {}", total.saturating_sub(done), total);
    let line = Line::from(vec![
        Span::styled("todostore", Style::default().fg(Color::Cyan)),
        Span::raw("  |  "),
        Span::styled(summary, Style::default().fg(Color::Yellow)),
    ]);
    Paragraph::new(line)
        .block(Block::default().title("Overview").borders(Borders::ALL))
        .wrap(Wrap { trim: true })
}

fn render_list(todos: &[Todo], selected: usize) -> List<'_> {
    let items: Vec<ListItem> = todos
        .iter()
        .enumerate()
        .map(|(idx, todo)| {
            let symbol = if todo.done_status { "✔" } else { "•" };
            let mut line = vec![Span::raw(format!(" {symbol} {}", todo.title))];
            if todo.done_status {
                line.push(Span::styled("  done", Style::default().fg(Color::Green)));
            }

            let style = if idx == selected {
                Style::default()
                    .fg(Color::Cyan)
                    .add_modifier(Modifier::BOLD | Modifier::REVERSED)
            } else if todo.done_status {
                Style::default()
                    .fg(Color::DarkGray)
                    .add_modifier(Modifier::CROSSED_OUT)
            } else {
                Style::default()
            };

            ListItem::new(Line::from(line)).style(style)
        })
        .collect();

    List::new(items)
        .block(
            Block::default()
                .title("Todos (j/k move ; a add ; e edit ; Space/Enter toggle ; d delete)")
                .borders(Borders::ALL),
        )
        .highlight_symbol("➤ ")
}

fn render_details(todo: Option<&Todo>) -> Paragraph<'_> {
    let block = Block::default().title("Details").borders(Borders::ALL);
    let Some(todo) = todo else {
        return Paragraph::new("No todos yet. Press 'a' to add one.").block(block);
    };
    let label = Style::default().fg(Color::DarkGray);
    let lines = vec![
        Line::from(vec![Span::styled("id: ", label), Span::raw(todo.id.as_str())]),
        Line::from(vec![Span::styled("title: ", label), Span::raw(&todo.title)]),
        Line::from(vec![
            Span::styled("done: ", label),
            Span::raw(if todo.done_status { "yes" } else { "no" }),
        ]),
        Line::from(""),
        Line::from(todo.description.as_str()),
    ];
    Paragraph::new(lines).block(block).wrap(Wrap { trim: false })
}

fn render_footer<R: TodoRepository>(app: &App<R>) -> Paragraph<'_> {
    let prompt = match app.mode {
        InputMode::Normal => {
            let msg = app
                .status
                .as_deref()
                .unwrap_or("q quit ; a add ; e edit ; r reload");
            return Paragraph::new(msg)
                .block(Block::default().title("Normal").borders(Borders::ALL));
        }
        InputMode::Title => "Title: ",
        InputMode::Description => "Description: ",
    };
    let kind = if app.is_editing_existing() {
        "Edit"
    } else {
        "New todo"
    };
    let title = match app.status.as_deref() {
        Some(status) => format!("{kind}: {status} (Esc to cancel)"),
        None => format!("{kind} (Enter to continue / Esc to cancel)"),
    };
    let line = Line::from(vec![
        Span::raw(prompt),
        Span::styled(app.input.as_str(), Style::default().fg(Color::Yellow)),
        Span::raw("█"),
    ]);
    Paragraph::new(line).block(Block::default().title(title).borders(Borders::ALL))
}

fn cleanup_terminal(terminal: &mut Terminal<CrosstermBackend<Stdout>>) -> Result<()> {
    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;
    Ok(())
}
