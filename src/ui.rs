use anyhow::Result;
use bmi_tracker::{
    gauge_segments, needle_column, trend_bounds, trend_points, trend_series, BmiCalculator,
    BmiResult, Category, GaugeSegment, HistoryRecord, SegmentColor, GAUGE_MAX, GAUGE_MIN,
};
use crossterm::{
    event::{self, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{
    backend::CrosstermBackend,
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    symbols,
    text::{Line, Span},
    widgets::{Axis, Block, Borders, Cell, Chart, Dataset, GraphType, Paragraph, Row, Table, TableState},
    Frame, Terminal,
};
use std::io;
use tracing::error;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Page {
    Calculator,
    History,
    Trend,
}

impl Page {
    pub fn next(&self) -> Self {
        match self {
            Page::Calculator => Page::History,
            Page::History => Page::Trend,
            Page::Trend => Page::Calculator,
        }
    }

    pub fn previous(&self) -> Self {
        match self {
            Page::Calculator => Page::Trend,
            Page::History => Page::Calculator,
            Page::Trend => Page::History,
        }
    }

    pub fn title(&self) -> &str {
        match self {
            Page::Calculator => "Calculator",
            Page::History => "History",
            Page::Trend => "BMI Trend",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputField {
    Name,
    Weight,
    Height,
}

impl InputField {
    pub fn next(&self) -> Self {
        match self {
            InputField::Name => InputField::Weight,
            InputField::Weight => InputField::Height,
            InputField::Height => InputField::Name,
        }
    }

    pub fn previous(&self) -> Self {
        match self {
            InputField::Name => InputField::Height,
            InputField::Weight => InputField::Name,
            InputField::Height => InputField::Weight,
        }
    }

    pub fn label(&self) -> &str {
        match self {
            InputField::Name => "Name:",
            InputField::Weight => "Weight (kg):",
            InputField::Height => "Height (cm):",
        }
    }
}

/// Raw text as typed; parsing happens on submit
#[derive(Debug, Clone, Default)]
pub struct Form {
    pub name: String,
    pub weight: String,
    pub height: String,
}

impl Form {
    fn field_mut(&mut self, field: InputField) -> &mut String {
        match field {
            InputField::Name => &mut self.name,
            InputField::Weight => &mut self.weight,
            InputField::Height => &mut self.height,
        }
    }

    fn field(&self, field: InputField) -> &str {
        match field {
            InputField::Name => &self.name,
            InputField::Weight => &self.weight,
            InputField::Height => &self.height,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum Message {
    Info(String),
    Error(String),
}

pub struct App {
    calculator: BmiCalculator,
    pub records: Vec<HistoryRecord>,
    pub state: TableState,
    pub current_page: Page,
    pub form: Form,
    pub focus: InputField,
    pub last_result: Option<BmiResult>,
    pub message: Option<Message>,
    pub show_detail: bool,
}

impl App {
    pub fn new(calculator: BmiCalculator) -> Self {
        let mut app = Self {
            calculator,
            records: Vec::new(),
            state: TableState::default(),
            current_page: Page::Calculator,
            form: Form::default(),
            focus: InputField::Name,
            last_result: None,
            message: None,
            show_detail: false,
        };
        app.refresh();
        app
    }

    /// Hand the session back so the caller can shut it down
    pub fn into_calculator(self) -> BmiCalculator {
        self.calculator
    }

    /// Reload every record from the store
    pub fn refresh(&mut self) {
        match self.calculator.history() {
            Ok(records) => {
                self.records = records;
                if self.records.is_empty() {
                    self.state.select(None);
                } else {
                    self.state.select(Some(self.records.len() - 1));
                }
            }
            Err(e) => {
                error!("failed to read history: {}", e);
                self.message = Some(Message::Error(e.to_string()));
            }
        }
    }

    pub fn submit(&mut self) {
        let result = self
            .calculator
            .calculate(&self.form.name, &self.form.weight, &self.form.height);

        match result {
            Ok(calculation) => {
                self.last_result = Some(calculation.result);
                self.message = Some(Message::Info(format!(
                    "Saved record #{}",
                    calculation.record.id
                )));
                self.refresh();
            }
            Err(e) => {
                if e.is_persistence_failure() {
                    error!("calculation not saved: {}", e);
                }
                self.message = Some(Message::Error(e.to_string()));
            }
        }
    }

    pub fn selected_record(&self) -> Option<&HistoryRecord> {
        self.state.selected().and_then(|i| self.records.get(i))
    }

    pub fn next_page(&mut self) {
        self.current_page = self.current_page.next();
    }

    pub fn previous_page(&mut self) {
        self.current_page = self.current_page.previous();
    }

    pub fn toggle_detail(&mut self) {
        self.show_detail = !self.show_detail;
    }

    pub fn next(&mut self) {
        let len = self.records.len();
        if len == 0 {
            return;
        }
        let i = match self.state.selected() {
            Some(i) if i >= len - 1 => 0,
            Some(i) => i + 1,
            None => 0,
        };
        self.state.select(Some(i));
    }

    pub fn previous(&mut self) {
        let len = self.records.len();
        if len == 0 {
            return;
        }
        let i = match self.state.selected() {
            Some(0) => len - 1,
            Some(i) => i - 1,
            None => 0,
        };
        self.state.select(Some(i));
    }

    pub fn page_down(&mut self) {
        let len = self.records.len();
        if len == 0 {
            return;
        }
        let i = match self.state.selected() {
            Some(i) => (i + 20).min(len - 1),
            None => 0,
        };
        self.state.select(Some(i));
    }

    pub fn page_up(&mut self) {
        if self.records.is_empty() {
            return;
        }
        let i = self.state.selected().map(|i| i.saturating_sub(20)).unwrap_or(0);
        self.state.select(Some(i));
    }

    /// Returns true when the app should exit
    pub fn handle_key(&mut self, key: KeyEvent) -> bool {
        if key.modifiers.contains(KeyModifiers::CONTROL) && key.code == KeyCode::Char('c') {
            return true;
        }

        match key.code {
            KeyCode::Esc => return true,
            KeyCode::BackTab => {
                self.previous_page();
                return false;
            }
            KeyCode::Tab => {
                if key.modifiers.contains(KeyModifiers::SHIFT) {
                    self.previous_page();
                } else {
                    self.next_page();
                }
                return false;
            }
            _ => {}
        }

        match self.current_page {
            Page::Calculator => self.handle_form_key(key),
            Page::History => match key.code {
                KeyCode::Char('q') => return true,
                KeyCode::Char('r') => self.refresh(),
                KeyCode::Enter => self.toggle_detail(),
                KeyCode::Down | KeyCode::Char('j') => self.next(),
                KeyCode::Up | KeyCode::Char('k') => self.previous(),
                KeyCode::PageDown => self.page_down(),
                KeyCode::PageUp => self.page_up(),
                KeyCode::Home if !self.records.is_empty() => self.state.select(Some(0)),
                KeyCode::End if !self.records.is_empty() => {
                    self.state.select(Some(self.records.len() - 1))
                }
                _ => {}
            },
            Page::Trend => match key.code {
                KeyCode::Char('q') => return true,
                KeyCode::Char('r') => self.refresh(),
                _ => {}
            },
        }

        false
    }

    fn handle_form_key(&mut self, key: KeyEvent) {
        match key.code {
            KeyCode::Enter => self.submit(),
            KeyCode::Down => self.focus = self.focus.next(),
            KeyCode::Up => self.focus = self.focus.previous(),
            KeyCode::Backspace => {
                self.form.field_mut(self.focus).pop();
            }
            KeyCode::Char(c) => self.form.field_mut(self.focus).push(c),
            _ => {}
        }
    }
}

pub fn run_ui(app: &mut App) -> Result<()> {
    // Setup terminal
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let res = run_app(&mut terminal, app);

    // Restore terminal
    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;

    if let Err(err) = res {
        error!("terminal UI stopped: {:?}", err);
        return Err(err.into());
    }

    Ok(())
}

fn run_app<B: ratatui::backend::Backend>(
    terminal: &mut Terminal<B>,
    app: &mut App,
) -> io::Result<()> {
    loop {
        terminal.draw(|f| ui(f, app))?;

        if let Event::Key(key) = event::read()? {
            if key.kind != KeyEventKind::Press {
                continue;
            }
            if app.handle_key(key) {
                return Ok(());
            }
        }
    }
}

fn ui(f: &mut Frame, app: &mut App) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3), // Header with navigation
            Constraint::Min(0),    // Content area
            Constraint::Length(3), // Status bar
        ])
        .split(f.size());

    render_header(f, chunks[0], app);

    match app.current_page {
        Page::Calculator => render_calculator(f, chunks[1], app),
        Page::History if app.show_detail => {
            let content_chunks = Layout::default()
                .direction(Direction::Horizontal)
                .constraints([Constraint::Percentage(65), Constraint::Percentage(35)])
                .split(chunks[1]);

            render_table(f, content_chunks[0], app);
            render_detail_panel(f, content_chunks[1], app);
        }
        Page::History => render_table(f, chunks[1], app),
        Page::Trend => render_trend(f, chunks[1], app),
    }

    render_status_bar(f, chunks[2], app);
}

fn render_header(f: &mut Frame, area: Rect, app: &App) {
    let pages = [Page::Calculator, Page::History, Page::Trend];

    let mut tab_spans = vec![Span::styled(
        " BMI Calculator ",
        Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD),
    )];
    tab_spans.push(Span::raw(" │ "));
    for (i, page) in pages.iter().enumerate() {
        if i > 0 {
            tab_spans.push(Span::raw(" │ "));
        }

        let style = if *page == app.current_page {
            Style::default()
                .fg(Color::Yellow)
                .add_modifier(Modifier::BOLD | Modifier::UNDERLINED)
        } else {
            Style::default().fg(Color::DarkGray)
        };

        tab_spans.push(Span::styled(page.title().to_string(), style));
    }

    tab_spans.push(Span::raw("  |  "));
    tab_spans.push(Span::styled(
        format!("Records: {}", app.records.len()),
        Style::default().fg(Color::White),
    ));

    let header = Paragraph::new(vec![Line::from(tab_spans)]).block(
        Block::default()
            .borders(Borders::ALL)
            .border_style(Style::default().fg(Color::Cyan)),
    );

    f.render_widget(header, area);
}

// ============================================================================
// CALCULATOR PAGE
// ============================================================================

fn render_calculator(f: &mut Frame, area: Rect, app: &App) {
    let columns = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(45), Constraint::Percentage(55)])
        .split(area);

    let left = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Length(9), Constraint::Min(0)])
        .split(columns[0]);

    render_form(f, left[0], app);
    render_result(f, left[1], app);
    render_gauge(f, columns[1], app.last_result.as_ref());
}

fn render_form(f: &mut Frame, area: Rect, app: &App) {
    let label_style = Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD);

    let mut content = vec![Line::from("")];
    for field in [InputField::Name, InputField::Weight, InputField::Height] {
        let focused = field == app.focus;
        let marker = if focused { "→ " } else { "  " };
        let value_style = if focused {
            Style::default().fg(Color::Yellow).add_modifier(Modifier::BOLD)
        } else {
            Style::default().fg(Color::White)
        };

        content.push(Line::from(vec![
            Span::styled(marker, Style::default().fg(Color::Green)),
            Span::styled(format!("{:<13}", field.label()), label_style),
            Span::styled(app.form.field(field).to_string(), value_style),
            Span::styled(if focused { "▏" } else { "" }, value_style),
        ]));
    }
    content.push(Line::from(""));
    content.push(Line::from(vec![
        Span::raw("  "),
        Span::styled("Enter", Style::default().fg(Color::Yellow)),
        Span::raw(" Calculate BMI   "),
        Span::styled("Tab", Style::default().fg(Color::Yellow)),
        Span::raw(" View BMI Trend / History"),
    ]));

    let form = Paragraph::new(content).block(
        Block::default()
            .borders(Borders::ALL)
            .border_style(Style::default().fg(Color::White))
            .title(" Measurement "),
    );

    f.render_widget(form, area);
}

fn render_result(f: &mut Frame, area: Rect, app: &App) {
    let (bmi_text, category_text, color) = match &app.last_result {
        Some(result) => (
            format!("Your BMI: {:.2}", result.bmi),
            format!("Category: {}", result.label()),
            category_color(result.category),
        ),
        None => ("Your BMI: ".to_string(), "Category: ".to_string(), Color::White),
    };

    let content = vec![
        Line::from(""),
        Line::from(Span::styled(
            format!("  {}", bmi_text),
            Style::default().fg(Color::White).add_modifier(Modifier::BOLD),
        )),
        Line::from(Span::styled(
            format!("  {}", category_text),
            Style::default().fg(color).add_modifier(Modifier::BOLD),
        )),
    ];

    let result = Paragraph::new(content).block(
        Block::default()
            .borders(Borders::ALL)
            .border_style(Style::default().fg(Color::White))
            .title(" Result "),
    );

    f.render_widget(result, area);
}

fn render_gauge(f: &mut Frame, area: Rect, result: Option<&BmiResult>) {
    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::White))
        .title(" BMI Gauge ");
    let inner = block.inner(area);
    f.render_widget(block, area);

    let width = inner.width.saturating_sub(4);
    if width < 8 || inner.height < 4 {
        return;
    }

    let segments = gauge_segments();
    let pad = "  ";

    // Needle row
    let needle_line = match result {
        Some(r) => {
            let col = needle_column(r.bmi, width) as usize;
            Line::from(vec![
                Span::raw(pad),
                Span::raw(" ".repeat(col)),
                Span::styled("▼", Style::default().fg(Color::White).add_modifier(Modifier::BOLD)),
                Span::raw(format!(" {:.2}", r.bmi)),
            ])
        }
        None => Line::from(""),
    };

    // Colored band, one cell per step along the scale
    let mut bar = vec![Span::raw(pad)];
    for col in 0..width {
        let bmi = GAUGE_MIN + f64::from(col) / f64::from(width - 1) * (GAUGE_MAX - GAUGE_MIN);
        let color = segment_at(&segments, bmi)
            .map(|s| segment_color(s.color))
            .unwrap_or(Color::DarkGray);
        bar.push(Span::styled("█", Style::default().fg(color)));
    }

    let content = vec![
        Line::from(""),
        needle_line,
        Line::from(bar.clone()),
        Line::from(bar),
        Line::from(vec![Span::raw(pad), Span::raw(scale_labels(&segments, width))]),
        Line::from(""),
        Line::from(
            segments
                .iter()
                .flat_map(|s| {
                    [
                        Span::raw("  "),
                        Span::styled("■ ", Style::default().fg(segment_color(s.color))),
                        Span::raw(s.label),
                    ]
                })
                .collect::<Vec<_>>(),
        ),
    ];

    f.render_widget(Paragraph::new(content), inner);
}

fn segment_at(segments: &[GaugeSegment], bmi: f64) -> Option<&GaugeSegment> {
    segments
        .iter()
        .find(|s| bmi >= s.start && bmi < s.end)
        .or_else(|| segments.last().filter(|s| bmi >= s.end))
}

/// Boundary values placed under their column on a `width`-cell scale
fn scale_labels(segments: &[GaugeSegment], width: u16) -> String {
    let mut stops: Vec<f64> = segments.iter().map(|s| s.start).collect();
    if let Some(last) = segments.last() {
        stops.push(last.end);
    }

    let mut line = String::new();
    for stop in stops {
        let label = format!("{}", stop);
        let col = needle_column(stop, width) as usize;
        let start = col.saturating_sub(label.len() / 2).max(line.chars().count());
        let start = start.min((width as usize).saturating_sub(label.len()));
        while line.chars().count() < start {
            line.push(' ');
        }
        if line.chars().count() == start {
            line.push_str(&label);
        }
    }
    line
}

fn segment_color(color: SegmentColor) -> Color {
    match color {
        SegmentColor::Red => Color::Red,
        SegmentColor::Yellow => Color::Yellow,
        SegmentColor::Green => Color::Green,
        SegmentColor::Orange => Color::Rgb(255, 165, 0),
    }
}

fn category_color(category: Category) -> Color {
    gauge_segments()
        .iter()
        .find(|s| s.category == category)
        .map(|s| segment_color(s.color))
        .unwrap_or(Color::White)
}

// ============================================================================
// HISTORY PAGE
// ============================================================================

fn render_table(f: &mut Frame, area: Rect, app: &mut App) {
    let header_cells = ["ID", "Date", "Name", "Weight", "Height", "BMI", "Category"]
        .iter()
        .map(|h| {
            Cell::from(*h).style(
                Style::default()
                    .fg(Color::Yellow)
                    .add_modifier(Modifier::BOLD),
            )
        });

    let header = Row::new(header_cells)
        .style(Style::default().bg(Color::DarkGray))
        .height(1);

    let rows = app.records.iter().map(|r| {
        let color = r
            .category
            .parse::<Category>()
            .map(category_color)
            .unwrap_or(Color::White);

        let cells = vec![
            Cell::from(r.id.to_string()),
            Cell::from(r.timestamp.format(bmi_tracker::TIMESTAMP_FORMAT).to_string()),
            Cell::from(truncate(&r.name, 20)),
            Cell::from(format!("{:.1}", r.weight)),
            Cell::from(format!("{:.2}", r.height)),
            Cell::from(format!("{:.2}", r.bmi)).style(Style::default().fg(color)),
            Cell::from(r.category.clone()).style(Style::default().fg(color)),
        ];

        Row::new(cells).height(1)
    });

    let table = Table::new(
        rows,
        [
            Constraint::Length(6),
            Constraint::Length(20),
            Constraint::Length(22),
            Constraint::Length(8),
            Constraint::Length(8),
            Constraint::Length(8),
            Constraint::Length(15),
        ],
    )
    .header(header)
    .block(
        Block::default()
            .borders(Borders::ALL)
            .border_style(Style::default().fg(Color::White))
            .title(" Historical Data "),
    )
    .highlight_style(
        Style::default()
            .bg(Color::DarkGray)
            .add_modifier(Modifier::BOLD),
    )
    .highlight_symbol("→ ");

    f.render_stateful_widget(table, area, &mut app.state);
}

fn render_detail_panel(f: &mut Frame, area: Rect, app: &App) {
    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::Yellow))
        .title(" Record Details ");

    let record = match app.selected_record() {
        Some(r) => r,
        None => {
            f.render_widget(Paragraph::new("No record selected").block(block), area);
            return;
        }
    };

    let label = Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD);
    let field = |name: &'static str, value: String| {
        Line::from(vec![Span::styled(format!("  {}: ", name), label), Span::raw(value)])
    };

    let content = vec![
        Line::from(""),
        field("ID", record.id.to_string()),
        field("Date", record.timestamp.format(bmi_tracker::TIMESTAMP_FORMAT).to_string()),
        field("Name", record.name.clone()),
        Line::from(""),
        field("Weight", format!("{} kg", record.weight)),
        field("Height", format!("{} m ({:.1} cm)", record.height, record.height * 100.0)),
        Line::from(""),
        field("BMI", format!("{:.2}", record.bmi)),
        field("Category", record.category.clone()),
        Line::from(""),
        Line::from(Span::styled(
            "  Press Enter to close",
            Style::default()
                .fg(Color::DarkGray)
                .add_modifier(Modifier::ITALIC),
        )),
    ];

    f.render_widget(Paragraph::new(content).block(block), area);
}

// ============================================================================
// TREND PAGE
// ============================================================================

fn render_trend(f: &mut Frame, area: Rect, app: &App) {
    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::White))
        .title(" BMI Trend Over Time ");

    let points = trend_points(&app.records);
    let series = trend_series(&points);

    let (x_bounds, y_bounds) = match trend_bounds(&series) {
        Some(bounds) => bounds,
        None => {
            let empty = Paragraph::new(vec![
                Line::from(""),
                Line::from(Span::styled(
                    "  No BMI data to display.",
                    Style::default().fg(Color::DarkGray).add_modifier(Modifier::ITALIC),
                )),
            ])
            .block(block);
            f.render_widget(empty, area);
            return;
        }
    };

    let date_label = |i: usize| {
        points
            .get(i)
            .map(|p| p.timestamp.format("%Y-%m-%d").to_string())
            .unwrap_or_default()
    };
    let x_labels = vec![
        Span::raw(date_label(0)),
        Span::raw(date_label(points.len().saturating_sub(1))),
    ];
    let y_labels = vec![
        Span::raw(format!("{:.1}", y_bounds[0])),
        Span::raw(format!("{:.1}", (y_bounds[0] + y_bounds[1]) / 2.0)),
        Span::raw(format!("{:.1}", y_bounds[1])),
    ];

    let dataset = Dataset::default()
        .name("BMI")
        .marker(symbols::Marker::Braille)
        .graph_type(GraphType::Line)
        .style(Style::default().fg(Color::Blue))
        .data(&series);

    let chart = Chart::new(vec![dataset])
        .block(block)
        .x_axis(
            Axis::default()
                .title("Date")
                .style(Style::default().fg(Color::Gray))
                .bounds(x_bounds)
                .labels(x_labels),
        )
        .y_axis(
            Axis::default()
                .title("BMI")
                .style(Style::default().fg(Color::Gray))
                .bounds(y_bounds)
                .labels(y_labels),
        );

    f.render_widget(chart, area);
}

fn render_status_bar(f: &mut Frame, area: Rect, app: &App) {
    let mut status_spans = Vec::new();

    match &app.message {
        Some(Message::Error(text)) => {
            status_spans.push(Span::styled(
                format!(" {} ", text),
                Style::default().fg(Color::Red).add_modifier(Modifier::BOLD),
            ));
            status_spans.push(Span::raw(" | "));
        }
        Some(Message::Info(text)) => {
            status_spans.push(Span::styled(format!(" {} ", text), Style::default().fg(Color::Green)));
            status_spans.push(Span::raw(" | "));
        }
        None => {}
    }

    match app.current_page {
        Page::Calculator => {
            status_spans.push(Span::styled("↑/↓", Style::default().fg(Color::Yellow)));
            status_spans.push(Span::raw(" Field | "));
            status_spans.push(Span::styled("Enter", Style::default().fg(Color::Yellow)));
            status_spans.push(Span::raw(" Calculate | "));
        }
        Page::History => {
            let selected = app.state.selected().map(|i| i + 1).unwrap_or(0);
            status_spans.push(Span::styled(
                format!("Row: {}/{}", selected, app.records.len()),
                Style::default().fg(Color::Cyan),
            ));
            status_spans.push(Span::raw(" | "));
            status_spans.push(Span::styled("Enter", Style::default().fg(Color::Yellow)));
            status_spans.push(Span::raw(" Details | "));
            status_spans.push(Span::styled("r", Style::default().fg(Color::Yellow)));
            status_spans.push(Span::raw(" Refresh | "));
        }
        Page::Trend => {
            status_spans.push(Span::styled("r", Style::default().fg(Color::Yellow)));
            status_spans.push(Span::raw(" Refresh | "));
        }
    }

    status_spans.push(Span::styled("Tab", Style::default().fg(Color::Yellow)));
    status_spans.push(Span::raw(" Page | "));
    status_spans.push(Span::styled("Esc", Style::default().fg(Color::Red)));
    status_spans.push(Span::raw(" Quit"));

    let status_bar = Paragraph::new(vec![Line::from(status_spans)]).block(
        Block::default()
            .borders(Borders::ALL)
            .border_style(Style::default().fg(Color::White)),
    );

    f.render_widget(status_bar, area);
}

fn truncate(s: &str, max_len: usize) -> String {
    if s.chars().count() <= max_len {
        s.to_string()
    } else {
        let head: String = s.chars().take(max_len.saturating_sub(3)).collect();
        format!("{}...", head)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use bmi_tracker::HistoryStore;

    fn app() -> App {
        App::new(BmiCalculator::new(HistoryStore::open_in_memory().unwrap()))
    }

    fn key(code: KeyCode) -> KeyEvent {
        KeyEvent::new(code, KeyModifiers::NONE)
    }

    fn type_text(app: &mut App, text: &str) {
        for c in text.chars() {
            app.handle_key(key(KeyCode::Char(c)));
        }
    }

    #[test]
    fn test_form_submit_records_and_refreshes() {
        let mut app = app();

        type_text(&mut app, "Ana");
        app.handle_key(key(KeyCode::Down));
        type_text(&mut app, "70");
        app.handle_key(key(KeyCode::Down));
        type_text(&mut app, "175");
        app.handle_key(key(KeyCode::Enter));

        let result = app.last_result.expect("calculation should succeed");
        assert_eq!(result.category, Category::NormalWeight);
        assert_eq!(app.records.len(), 1);
        assert_eq!(app.records[0].name, "Ana");
        assert_eq!(app.state.selected(), Some(0));
    }

    #[test]
    fn test_invalid_input_shows_error_and_saves_nothing() {
        let mut app = app();
        app.form.weight = "-5".to_string();
        app.form.height = "170".to_string();

        app.submit();

        assert!(matches!(app.message, Some(Message::Error(ref m)) if m.starts_with("Invalid input")));
        assert!(app.last_result.is_none());
        assert!(app.records.is_empty());
    }

    #[test]
    fn test_q_is_text_on_form_but_quits_elsewhere() {
        let mut app = app();

        assert!(!app.handle_key(key(KeyCode::Char('q'))));
        assert_eq!(app.form.name, "q");

        app.handle_key(key(KeyCode::Tab));
        assert_eq!(app.current_page, Page::History);
        assert!(app.handle_key(key(KeyCode::Char('q'))));
    }

    #[test]
    fn test_page_cycle() {
        let mut app = app();
        app.handle_key(key(KeyCode::Tab));
        app.handle_key(key(KeyCode::Tab));
        assert_eq!(app.current_page, Page::Trend);
        app.handle_key(key(KeyCode::BackTab));
        assert_eq!(app.current_page, Page::History);
        assert!(app.handle_key(key(KeyCode::Esc)));
    }

    #[test]
    fn test_history_navigation_wraps() {
        let mut app = app();
        for w in ["60", "65", "70"] {
            app.form.weight = w.to_string();
            app.form.height = "170".to_string();
            app.submit();
        }
        app.current_page = Page::History;

        assert_eq!(app.state.selected(), Some(2));
        app.handle_key(key(KeyCode::Down));
        assert_eq!(app.state.selected(), Some(0));
        app.handle_key(key(KeyCode::Up));
        assert_eq!(app.state.selected(), Some(2));
        app.handle_key(key(KeyCode::Home));
        assert_eq!(app.selected_record().map(|r| r.weight), Some(60.0));
    }

    #[test]
    fn test_scale_labels_in_order() {
        let labels = scale_labels(&gauge_segments(), 48);
        let found: Vec<&str> = labels.split_whitespace().collect();
        assert_eq!(found, vec!["16", "18.5", "25", "30", "40"]);
    }

    #[test]
    fn test_segment_lookup_includes_upper_end() {
        let segments = gauge_segments();
        assert_eq!(segment_at(&segments, 16.0).map(|s| s.category), Some(Category::Underweight));
        assert_eq!(segment_at(&segments, 25.0).map(|s| s.category), Some(Category::Overweight));
        assert_eq!(segment_at(&segments, 40.0).map(|s| s.category), Some(Category::Obesity));
    }
}
