use std::{io, thread, time::Duration};

use anyhow::{Context, Result};
use crossterm::{
    event::{self, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{
    backend::CrosstermBackend,
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph, Wrap},
    Frame, Terminal,
};
use rentshop_core::{menu::Step, AppConfig, Menu, MenuSystem, RentalDesk, Store};
use tokio::sync::mpsc;
use tracing::{debug, info};

use crate::menus::{ShopContext, ShopMenu};

const TICK_RATE: Duration = Duration::from_millis(250);
const MAX_INPUT_LEN: usize = 64;

#[derive(Debug, Clone)]
struct Theme {
    primary_fg: Color,
    accent: Color,
    muted: Color,
    warning: Color,
}

impl Default for Theme {
    fn default() -> Self {
        Self {
            primary_fg: Color::White,
            accent: Color::Cyan,
            muted: Color::DarkGray,
            warning: Color::Yellow,
        }
    }
}

/// Single-line text input with a cursor, counted in characters.
#[derive(Debug, Clone, Default)]
struct LineEditor {
    input: String,
    cursor: usize,
}

impl LineEditor {
    fn len(&self) -> usize {
        self.input.chars().count()
    }

    fn byte_index(&self, cursor: usize) -> usize {
        self.input
            .char_indices()
            .nth(cursor)
            .map(|(idx, _)| idx)
            .unwrap_or(self.input.len())
    }

    fn move_cursor(&mut self, delta: isize) {
        let len = self.len() as isize;
        let next = (self.cursor as isize + delta).clamp(0, len);
        self.cursor = next as usize;
    }

    fn move_home(&mut self) {
        self.cursor = 0;
    }

    fn move_end(&mut self) {
        self.cursor = self.len();
    }

    fn insert(&mut self, ch: char) {
        if self.len() >= MAX_INPUT_LEN || ch.is_control() {
            return;
        }
        let idx = self.byte_index(self.cursor);
        self.input.insert(idx, ch);
        self.cursor += 1;
    }

    fn backspace(&mut self) {
        if self.cursor > 0 {
            self.cursor -= 1;
            let idx = self.byte_index(self.cursor);
            self.input.remove(idx);
        }
    }

    fn delete(&mut self) {
        if self.cursor < self.len() {
            let idx = self.byte_index(self.cursor);
            self.input.remove(idx);
        }
    }

    fn clear(&mut self) {
        self.input.clear();
        self.cursor = 0;
    }

    fn take(&mut self) -> String {
        self.cursor = 0;
        std::mem::take(&mut self.input)
    }
}

enum AppEvent {
    Input(Event),
    Tick,
}

/// Terminal front-end driving the shop menus.
pub struct RentShopApp {
    menus: MenuSystem<ShopMenu>,
    ctx: ShopContext,
    editor: LineEditor,
    theme: Theme,
    should_quit: bool,
}

impl RentShopApp {
    pub fn new(config: &AppConfig) -> Self {
        let store = Store::new(config.shop.skis, config.shop.snowboards);
        let ctx = ShopContext::new(RentalDesk::new(store), config.clock.clock());
        let mut menus = MenuSystem::new(ShopMenu::Main, config.navigation.keys());
        if config.navigation.show_headers {
            menus.set_default_headers();
        }
        Self {
            menus,
            ctx,
            editor: LineEditor::default(),
            theme: Theme::default(),
            should_quit: false,
        }
    }

    pub async fn run(&mut self) -> Result<()> {
        let inventory = self.ctx.desk.inventory();
        info!(
            skis = inventory.skis,
            snowboards = inventory.snowboards,
            manual_clock = self.ctx.clock.is_manual(),
            "Shop opened"
        );
        self.ctx.status = format!(
            "Shop opened with {} skis and {} snowboards",
            inventory.skis, inventory.snowboards
        );

        let mut stdout = io::stdout();
        enable_raw_mode().context("failed to enter raw mode")?;
        execute!(stdout, EnterAlternateScreen).context("failed to enter alternate screen")?;
        let backend = CrosstermBackend::new(stdout);
        let mut terminal = Terminal::new(backend).context("failed to create terminal")?;
        terminal.clear()?;

        let (event_tx, mut event_rx) = mpsc::channel::<AppEvent>(128);
        spawn_input_thread(event_tx);

        loop {
            terminal.draw(|frame| self.draw(frame))?;
            if self.should_quit {
                break;
            }
            let maybe_event = event_rx.recv().await;
            if !self.process_app_event(maybe_event) {
                break;
            }
        }

        restore_terminal(&mut terminal)?;
        let report = self.ctx.desk.day_report();
        println!("{report}");
        println!("Thank you for using the rental system! Goodbye!");
        Ok(())
    }

    fn process_app_event(&mut self, maybe_event: Option<AppEvent>) -> bool {
        match maybe_event {
            Some(AppEvent::Input(Event::Key(key))) => {
                self.handle_key(key);
                !self.should_quit
            }
            Some(AppEvent::Input(_)) | Some(AppEvent::Tick) => true,
            None => false,
        }
    }

    fn handle_key(&mut self, key: KeyEvent) {
        if key.kind != KeyEventKind::Press {
            return;
        }
        match key.code {
            KeyCode::Char('c') if key.modifiers == KeyModifiers::CONTROL => {
                info!("Interrupted by user");
                self.should_quit = true;
            }
            KeyCode::Enter => self.submit_line(),
            KeyCode::Esc => self.editor.clear(),
            KeyCode::Left => self.editor.move_cursor(-1),
            KeyCode::Right => self.editor.move_cursor(1),
            KeyCode::Home => self.editor.move_home(),
            KeyCode::End => self.editor.move_end(),
            KeyCode::Backspace => self.editor.backspace(),
            KeyCode::Delete => self.editor.delete(),
            KeyCode::Char(ch) => {
                if key.modifiers.is_empty() || key.modifiers == KeyModifiers::SHIFT {
                    self.editor.insert(ch);
                }
            }
            _ => {}
        }
    }

    fn submit_line(&mut self) {
        let line = self.editor.take();
        let before = self.menus.current().title().to_string();
        match self.menus.submit(&line, &mut self.ctx) {
            Step::Navigated(navigation) => {
                debug!(?navigation, from = %before, to = self.menus.current().title(), "Navigated");
            }
            Step::Handled => {}
            Step::Exit => {
                info!("Exit requested from {before}");
                self.should_quit = true;
            }
        }
    }

    fn draw(&self, frame: &mut Frame) {
        let area = frame.size();
        let rows = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Min(8),
                Constraint::Length(3),
                Constraint::Length(3),
            ])
            .split(area);
        let columns = Layout::default()
            .direction(Direction::Horizontal)
            .constraints([Constraint::Percentage(50), Constraint::Percentage(50)])
            .split(rows[0]);

        self.render_menu(frame, columns[0]);
        self.render_output(frame, columns[1]);
        self.render_prompt(frame, rows[1]);
        self.render_status(frame, rows[2]);
    }

    fn render_menu(&self, frame: &mut Frame, area: Rect) {
        let menu = self.menus.current();
        let headers = if menu.show_headers() {
            self.menus.headers().len()
        } else {
            0
        };
        let lines: Vec<Line> = self
            .menus
            .screen(&self.ctx)
            .into_iter()
            .enumerate()
            .map(|(idx, line)| {
                let style = if idx < headers {
                    Style::default().fg(self.theme.muted)
                } else {
                    Style::default().fg(self.theme.primary_fg)
                };
                Line::from(Span::styled(line, style))
            })
            .collect();
        let title = format!(
            "{} ({}/{})",
            menu.title(),
            self.menus.position() + 1,
            self.menus.depth()
        );
        let paragraph = Paragraph::new(lines)
            .block(Block::default().borders(Borders::ALL).title(title))
            .wrap(Wrap { trim: false });
        frame.render_widget(paragraph, area);
    }

    fn render_output(&self, frame: &mut Frame, area: Rect) {
        let lines: Vec<Line> = if self.ctx.output.is_empty() {
            vec![Line::from(Span::styled(
                "Estimates, receipts and invoices appear here.",
                Style::default().fg(self.theme.muted),
            ))]
        } else {
            self.ctx
                .output
                .iter()
                .map(|line| Line::from(line.clone()))
                .collect()
        };
        let paragraph = Paragraph::new(lines)
            .block(Block::default().borders(Borders::ALL).title("Output"))
            .wrap(Wrap { trim: false });
        frame.render_widget(paragraph, area);
    }

    fn render_prompt(&self, frame: &mut Frame, area: Rect) {
        let input_line = Line::from(vec![
            Span::styled(
                "> ",
                Style::default()
                    .fg(self.theme.accent)
                    .add_modifier(Modifier::BOLD),
            ),
            Span::raw(self.editor.input.clone()),
        ]);
        let paragraph = Paragraph::new(input_line)
            .block(Block::default().borders(Borders::ALL).title("Input"));
        frame.render_widget(paragraph, area);

        let cursor_x = (area.x + 3 + self.editor.cursor as u16)
            .min(area.x + area.width.saturating_sub(2));
        frame.set_cursor(cursor_x, area.y + 1);
    }

    fn render_status(&self, frame: &mut Frame, area: Rect) {
        let keys = self.menus.keys();
        let hint = format!(
            "{} back  {} forward  {} main  Enter submit  Esc clear  Ctrl-C quit",
            keys.back, keys.forward, keys.main_menu
        );
        let paragraph = Paragraph::new(Line::from(vec![
            Span::styled(
                self.ctx.status.clone(),
                Style::default().fg(self.theme.warning),
            ),
            Span::raw("  |  "),
            Span::styled(hint, Style::default().fg(self.theme.muted)),
        ]))
        .block(Block::default().borders(Borders::ALL).title("Status"))
        .wrap(Wrap { trim: true });
        frame.render_widget(paragraph, area);
    }
}

fn restore_terminal(terminal: &mut Terminal<CrosstermBackend<io::Stdout>>) -> Result<()> {
    disable_raw_mode().context("failed to disable raw mode")?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)
        .context("failed to leave alternate screen")?;
    terminal.show_cursor()?;
    Ok(())
}

fn spawn_input_thread(sender: mpsc::Sender<AppEvent>) {
    thread::spawn(move || loop {
        match event::poll(TICK_RATE) {
            Ok(true) => match event::read() {
                Ok(evt) => {
                    if sender.blocking_send(AppEvent::Input(evt)).is_err() {
                        break;
                    }
                }
                Err(_) => break,
            },
            Ok(false) => {
                if sender.blocking_send(AppEvent::Tick).is_err() {
                    break;
                }
            }
            Err(_) => break,
        }
    });
}
