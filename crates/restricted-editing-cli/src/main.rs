mod app;

use anyhow::Result;
use app::App;
use crossterm::{
    event::{
        self, DisableMouseCapture, EnableMouseCapture, Event, KeyCode, KeyEventKind, KeyModifiers,
    },
    execute,
    terminal::{EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode},
};
use ratatui::{
    Frame, Terminal,
    backend::CrosstermBackend,
    layout::{Constraint, Direction, Layout},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph},
};
use restricted_editing_config::Config;
use restricted_editing_engine::GateState;
use std::{
    env,
    io::{Stdout, stdout},
    ops::Range,
    path::PathBuf,
    process,
};

fn main() -> Result<()> {
    env_logger::init();

    // Determine document path from CLI args or config file
    let args: Vec<String> = env::args().collect();
    let config_path = Config::config_path();

    let config = match Config::load() {
        Ok(config) => config.unwrap_or_default(),
        Err(e) => {
            eprintln!("Error: Failed to load config file: {e}");
            process::exit(1);
        }
    };

    let document_path = match args.len() {
        2 => PathBuf::from(&args[1]),
        1 => match config.document_path.clone() {
            Some(path) => path,
            None => {
                eprintln!("Error: No document path provided and none configured");
                eprintln!("Usage: {} <document.html>", args[0]);
                eprintln!(
                    "Or set document_path in a config file at {}",
                    config_path.display()
                );
                process::exit(1);
            }
        },
        _ => {
            eprintln!("Usage: {} [document.html]", args[0]);
            process::exit(1);
        }
    };

    if document_path.is_dir() {
        eprintln!(
            "Error: Document path '{}' is a directory",
            document_path.display()
        );
        process::exit(1);
    }

    // Load before touching the terminal so errors print normally
    let mut app = App::new(document_path, &config.restricted_editing)?;

    // Setup terminal
    enable_raw_mode()?;
    let mut stdout = stdout();
    execute!(stdout, EnterAlternateScreen, EnableMouseCapture)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    // Main loop
    let res = run_app(&mut terminal, &mut app);

    // Restore terminal
    disable_raw_mode()?;
    execute!(
        terminal.backend_mut(),
        LeaveAlternateScreen,
        DisableMouseCapture
    )?;
    terminal.show_cursor()?;

    if let Err(err) = res {
        println!("{err:?}");
    }

    Ok(())
}

fn run_app(terminal: &mut Terminal<CrosstermBackend<Stdout>>, app: &mut App) -> Result<()> {
    loop {
        terminal.draw(|f| ui(f, app))?;

        if let Event::Key(key) = event::read()? {
            if key.kind != KeyEventKind::Press {
                continue;
            }
            let ctrl = key.modifiers.contains(KeyModifiers::CONTROL);
            match key.code {
                KeyCode::Esc => return Ok(()),
                KeyCode::Char('q') if ctrl => return Ok(()),
                KeyCode::Char('z') if ctrl => app.undo(),
                KeyCode::Char('y') if ctrl => app.redo(),
                KeyCode::Char('s') if ctrl => app.save(),
                KeyCode::Char(c) if !ctrl => app.insert_char(c),
                KeyCode::Enter => app.enter(),
                KeyCode::Backspace => app.backspace(),
                KeyCode::Delete => app.delete_forward(),
                KeyCode::Left => app.move_left(),
                KeyCode::Right => app.move_right(),
                KeyCode::Up => app.move_up(),
                KeyCode::Down => app.move_down(),
                KeyCode::Home => app.move_home(),
                KeyCode::End => app.move_end(),
                KeyCode::Tab => app.next_zone(),
                KeyCode::BackTab => app.previous_zone(),
                _ => {}
            }
        }
    }
}

/// Split one block into styled spans, highlighting exception zone content
fn block_line<'a>(text: &'a str, block: Range<usize>, zones: &[Range<usize>]) -> Line<'a> {
    let zone_style = Style::default().bg(Color::Yellow).fg(Color::Black);
    let mut spans = Vec::new();
    let mut run_start = block.start;
    let mut run_in_zone = false;

    for (offset, _) in text[block.clone()].char_indices() {
        let position = block.start + offset;
        let in_zone = zones.iter().any(|zone| zone.contains(&position));
        if in_zone != run_in_zone && position > run_start {
            let style = if run_in_zone { zone_style } else { Style::default() };
            spans.push(Span::styled(&text[run_start..position], style));
            run_start = position;
        }
        run_in_zone = in_zone;
    }
    if run_start < block.end {
        let style = if run_in_zone { zone_style } else { Style::default() };
        spans.push(Span::styled(&text[run_start..block.end], style));
    }

    Line::from(spans)
}

fn ui(f: &mut Frame, app: &mut App) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .margin(1)
        .constraints([Constraint::Min(0), Constraint::Length(1), Constraint::Length(1)].as_ref())
        .split(f.area());

    // Document panel
    let text = app.editor.document().text();
    let zones = app.zones();
    let lines: Vec<Line> = app
        .editor
        .document()
        .blocks()
        .into_iter()
        .map(|block| block_line(&text, block, &zones))
        .collect();

    let title = format!(
        "{}{}",
        app.path.display(),
        if app.dirty { " [+]" } else { "" }
    );
    let document = Paragraph::new(lines).block(Block::default().borders(Borders::ALL).title(title));
    f.render_widget(document, chunks[0]);

    let (line, column) = app.caret_line_col();
    f.set_cursor_position((
        chunks[0].x + 1 + column as u16,
        chunks[0].y + 1 + line as u16,
    ));

    // Status line
    let (label, style) = match app.gate_state() {
        GateState::Restricted => ("RESTRICTED", Style::default().fg(Color::Red)),
        GateState::Unrestricted => ("UNRESTRICTED", Style::default().fg(Color::Green)),
    };
    let status = Line::from(vec![
        Span::styled(label, style.add_modifier(Modifier::BOLD)),
        Span::raw(format!(" | {}:{} | {}", line + 1, column + 1, app.status)),
    ]);
    f.render_widget(Paragraph::new(vec![status]), chunks[1]);

    // Instructions
    let help_text = Line::from(vec![
        Span::raw("Esc: Quit | "),
        Span::raw("Tab/Shift-Tab: Next/Previous zone | "),
        Span::raw("Ctrl-Z/Ctrl-Y: Undo/Redo | "),
        Span::raw("Ctrl-S: Save"),
    ]);
    f.render_widget(Paragraph::new(vec![help_text]), chunks[2]);
}
