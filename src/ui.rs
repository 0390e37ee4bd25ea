use anyhow::Result;
use chrono::{Datelike, Local, NaiveDate};
use crossterm::{
    event::{self, Event, KeyCode, KeyModifiers},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use kharcha::{
    analytics, calc, category, format, Expense, ExpenseInput, ExpensePatch, ExpenseStore, Storage,
    CATEGORIES,
};
use ratatui::{
    backend::CrosstermBackend,
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Cell, Paragraph, Row, Table, TableState, Wrap},
    Frame, Terminal,
};
use std::io;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Page {
    Dashboard,
    AddExpense,
    Expenses,
    Analytics,
}

impl Page {
    pub fn next(&self) -> Self {
        match self {
            Page::Dashboard => Page::AddExpense,
            Page::AddExpense => Page::Expenses,
            Page::Expenses => Page::Analytics,
            Page::Analytics => Page::Dashboard,
        }
    }

    pub fn previous(&self) -> Self {
        match self {
            Page::Dashboard => Page::Analytics,
            Page::AddExpense => Page::Dashboard,
            Page::Expenses => Page::AddExpense,
            Page::Analytics => Page::Expenses,
        }
    }

    pub fn title(&self) -> &str {
        match self {
            Page::Dashboard => "Dashboard",
            Page::AddExpense => "Add Expense",
            Page::Expenses => "Expenses",
            Page::Analytics => "Analytics",
        }
    }
}

/// Which form field has focus on the add/edit page.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Field {
    Amount,
    Description,
    Category,
    Date,
}

impl Field {
    fn next(&self) -> Self {
        match self {
            Field::Amount => Field::Description,
            Field::Description => Field::Category,
            Field::Category => Field::Date,
            Field::Date => Field::Amount,
        }
    }

    fn previous(&self) -> Self {
        match self {
            Field::Amount => Field::Date,
            Field::Description => Field::Amount,
            Field::Category => Field::Description,
            Field::Date => Field::Category,
        }
    }
}

/// Add/edit form buffers. The amount buffer doubles as the calculator: it
/// accepts + - * / and '=' evaluates it in place.
#[derive(Debug, Clone)]
pub struct ExpenseForm {
    pub amount: String,
    pub description: String,
    pub category: Option<usize>,
    pub date: String,
    pub focus: Field,
    pub editing_id: Option<String>,
    pub errors: Vec<String>,
}

impl ExpenseForm {
    fn empty(today: NaiveDate) -> Self {
        ExpenseForm {
            amount: String::new(),
            description: String::new(),
            category: None,
            date: today.to_string(),
            focus: Field::Amount,
            editing_id: None,
            errors: Vec::new(),
        }
    }

    fn for_edit(expense: &Expense) -> Self {
        ExpenseForm {
            amount: format!("{}", expense.amount),
            description: expense.description.clone(),
            category: CATEGORIES.iter().position(|c| *c == expense.category),
            date: expense.date.to_string(),
            focus: Field::Amount,
            editing_id: Some(expense.id.clone()),
            errors: Vec::new(),
        }
    }

    fn buffer_mut(&mut self) -> Option<&mut String> {
        match self.focus {
            Field::Amount => Some(&mut self.amount),
            Field::Description => Some(&mut self.description),
            Field::Date => Some(&mut self.date),
            Field::Category => None,
        }
    }

    fn cycle_category(&mut self, step: isize) {
        let len = CATEGORIES.len() as isize;
        let current = self.category.map(|i| i as isize).unwrap_or(-1);
        let next = (current + step).rem_euclid(len);
        self.category = Some(next as usize);
    }

    /// Validate the buffers into a store input. The amount buffer is run
    /// through the calculator so "120+30" is as valid as "150".
    fn to_input(&self) -> Result<ExpenseInput, Vec<String>> {
        let mut errors = Vec::new();

        let amount = match calc::evaluate(&self.amount) {
            Ok(value) if value > 0.0 => value,
            Ok(_) => {
                errors.push("Please enter a valid amount".to_string());
                0.0
            }
            Err(_) => {
                errors.push("Please enter a valid amount".to_string());
                0.0
            }
        };

        if self.description.trim().is_empty() {
            errors.push("Please enter a description".to_string());
        }

        let category = match self.category {
            Some(index) => CATEGORIES[index].to_string(),
            None => {
                errors.push("Please select a category".to_string());
                String::new()
            }
        };

        let date: NaiveDate = match self.date.parse() {
            Ok(d) => d,
            Err(_) => {
                errors.push("Please select a valid date (YYYY-MM-DD)".to_string());
                NaiveDate::default()
            }
        };

        if errors.is_empty() {
            Ok(ExpenseInput {
                amount,
                description: self.description.trim().to_string(),
                category,
                date,
            })
        } else {
            Err(errors)
        }
    }
}

/// List-page filters, all applied together.
#[derive(Debug, Clone, Default)]
pub struct FilterState {
    pub search: String,
    pub category: Option<usize>,
    /// "YYYY-MM" prefix match against the record date.
    pub month: String,
}

impl FilterState {
    fn is_active(&self) -> bool {
        !self.search.is_empty() || self.category.is_some() || !self.month.is_empty()
    }

    fn matches(&self, expense: &Expense) -> bool {
        let search = self.search.to_lowercase();
        let matches_search = search.is_empty()
            || expense.description.to_lowercase().contains(&search)
            || expense.category.to_lowercase().contains(&search);
        let matches_category = match self.category {
            Some(index) => expense.category == CATEGORIES[index],
            None => true,
        };
        let matches_month =
            self.month.is_empty() || expense.date.to_string().starts_with(&self.month);

        matches_search && matches_category && matches_month
    }
}

/// Where typed characters go.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum InputMode {
    Normal,
    Search,
    MonthFilter,
}

pub struct App {
    pub store: ExpenseStore,
    storage: Option<Storage>,
    pub current_page: Page,
    pub state: TableState,
    pub filtered: Vec<Expense>,
    pub filter_state: FilterState,
    pub form: ExpenseForm,
    pub selected_year: i32,
    pub today: NaiveDate,
    pub toast: Option<String>,
    pending_delete: Option<String>,
    input_mode: InputMode,
}

impl App {
    pub fn new(store: ExpenseStore, storage: Option<Storage>) -> Self {
        let today = Local::now().date_naive();
        let filtered = store.all().to_vec();

        let mut state = TableState::default();
        if !filtered.is_empty() {
            state.select(Some(0));
        }

        Self {
            store,
            storage,
            current_page: Page::Dashboard,
            state,
            filtered,
            filter_state: FilterState::default(),
            form: ExpenseForm::empty(today),
            selected_year: today.year(),
            today,
            toast: None,
            pending_delete: None,
            input_mode: InputMode::Normal,
        }
    }

    /// Flush the current collection to durable storage. Failure degrades to
    /// a toast; the in-memory session keeps working.
    fn persist(&mut self) {
        if let Some(storage) = self.storage.as_mut() {
            if let Err(e) = storage.save(&self.store.snapshot()) {
                self.toast = Some(format!("⚠ Could not save: {}", e));
            }
        }
    }

    pub fn apply_filters(&mut self) {
        self.filtered = self
            .store
            .all()
            .iter()
            .filter(|e| self.filter_state.matches(e))
            .cloned()
            .collect();

        // Reset selection to first item
        if self.filtered.is_empty() {
            self.state.select(None);
        } else {
            self.state.select(Some(0));
        }
    }

    pub fn clear_filters(&mut self) {
        self.filter_state = FilterState::default();
        self.apply_filters();
    }

    pub fn selected_expense(&self) -> Option<&Expense> {
        self.state.selected().and_then(|i| self.filtered.get(i))
    }

    pub fn next(&mut self) {
        let len = self.filtered.len();
        if len == 0 {
            return;
        }
        let i = match self.state.selected() {
            Some(i) => {
                if i >= len - 1 {
                    0
                } else {
                    i + 1
                }
            }
            None => 0,
        };
        self.state.select(Some(i));
    }

    pub fn previous(&mut self) {
        let len = self.filtered.len();
        if len == 0 {
            return;
        }
        let i = match self.state.selected() {
            Some(i) => {
                if i == 0 {
                    len - 1
                } else {
                    i - 1
                }
            }
            None => 0,
        };
        self.state.select(Some(i));
    }

    fn submit_form(&mut self) {
        let input = match self.form.to_input() {
            Ok(input) => input,
            Err(errors) => {
                self.form.errors = errors;
                return;
            }
        };

        let outcome = match self.form.editing_id.clone() {
            Some(id) => {
                let patch = ExpensePatch {
                    amount: Some(input.amount),
                    description: Some(input.description),
                    category: Some(input.category),
                    date: Some(input.date),
                };
                self.store
                    .update(&id, patch)
                    .map(|found| {
                        if found {
                            "Expense updated successfully!"
                        } else {
                            "Expense no longer exists"
                        }
                    })
                    .map_err(|errors| errors.iter().map(|e| e.to_string()).collect())
            }
            None => self
                .store
                .add(input)
                .map(|_| "Expense added successfully!")
                .map_err(|errors| errors.iter().map(|e| e.to_string()).collect::<Vec<_>>()),
        };

        match outcome {
            Ok(message) => {
                self.persist();
                self.toast = Some(message.to_string());
                let was_edit = self.form.editing_id.is_some();
                self.form = ExpenseForm::empty(self.today);
                self.apply_filters();
                if was_edit {
                    self.current_page = Page::Expenses;
                }
            }
            Err(errors) => self.form.errors = errors,
        }
    }

    fn delete_selected(&mut self) {
        if let Some(id) = self.pending_delete.take() {
            self.store.delete(&id);
            self.persist();
            self.apply_filters();
            self.toast = Some("Expense deleted successfully!".to_string());
        }
    }

    fn cycle_year(&mut self, step: i32) {
        let years = analytics::available_years(self.store.all(), self.today);
        let current = years
            .iter()
            .position(|y| *y == self.selected_year)
            .unwrap_or(0);
        let next = (current as i32 + step).rem_euclid(years.len() as i32) as usize;
        self.selected_year = years[next];
    }
}

pub fn run_ui(app: &mut App) -> Result<()> {
    // Setup terminal
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    // Run the app
    let res = run_app(&mut terminal, app);

    // Restore terminal
    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;

    if let Err(err) = res {
        println!("Error: {:?}", err);
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
            // Typed characters go to whichever buffer owns the mode
            match app.input_mode {
                InputMode::Search => {
                    match key.code {
                        KeyCode::Esc | KeyCode::Enter => app.input_mode = InputMode::Normal,
                        KeyCode::Backspace => {
                            app.filter_state.search.pop();
                            app.apply_filters();
                        }
                        KeyCode::Char(c) => {
                            app.filter_state.search.push(c);
                            app.apply_filters();
                        }
                        _ => {}
                    }
                    continue;
                }
                InputMode::MonthFilter => {
                    match key.code {
                        KeyCode::Esc | KeyCode::Enter => app.input_mode = InputMode::Normal,
                        KeyCode::Backspace => {
                            app.filter_state.month.pop();
                            app.apply_filters();
                        }
                        KeyCode::Char(c) if c.is_ascii_digit() || c == '-' => {
                            app.filter_state.month.push(c);
                            app.apply_filters();
                        }
                        _ => {}
                    }
                    continue;
                }
                InputMode::Normal => {}
            }

            // The add/edit form consumes printable keys itself
            if app.current_page == Page::AddExpense {
                if handle_form_key(app, key.code) {
                    continue;
                }
            }

            match key.code {
                KeyCode::Char('q') | KeyCode::Esc => return Ok(()),
                KeyCode::Tab => {
                    if key.modifiers.contains(KeyModifiers::SHIFT) {
                        app.current_page = app.current_page.previous();
                    } else {
                        app.current_page = app.current_page.next();
                    }
                    app.toast = None;
                }
                KeyCode::BackTab => {
                    app.current_page = app.current_page.previous();
                    app.toast = None;
                }
                KeyCode::Down | KeyCode::Char('j') => app.next(),
                KeyCode::Up | KeyCode::Char('k') => app.previous(),
                KeyCode::Home => app.state.select(Some(0)),
                KeyCode::End => {
                    if !app.filtered.is_empty() {
                        app.state.select(Some(app.filtered.len() - 1));
                    }
                }
                KeyCode::Char('/') if app.current_page == Page::Expenses => {
                    app.input_mode = InputMode::Search;
                }
                KeyCode::Char('m') if app.current_page == Page::Expenses => {
                    app.input_mode = InputMode::MonthFilter;
                }
                KeyCode::Char('f') if app.current_page == Page::Expenses => {
                    // Cycle category filter: none -> each category -> none
                    app.filter_state.category = match app.filter_state.category {
                        None => Some(0),
                        Some(i) if i + 1 < CATEGORIES.len() => Some(i + 1),
                        Some(_) => None,
                    };
                    app.apply_filters();
                }
                KeyCode::Char('c') if app.current_page == Page::Expenses => {
                    app.clear_filters();
                }
                KeyCode::Char('e') if app.current_page == Page::Expenses => {
                    let form = app.selected_expense().map(ExpenseForm::for_edit);
                    if let Some(form) = form {
                        app.form = form;
                        app.current_page = Page::AddExpense;
                    }
                }
                KeyCode::Char('d') if app.current_page == Page::Expenses => {
                    app.pending_delete = app.selected_expense().map(|e| e.id.clone());
                }
                KeyCode::Char('y') if app.pending_delete.is_some() => {
                    app.delete_selected();
                }
                KeyCode::Char('n') if app.pending_delete.is_some() => {
                    app.pending_delete = None;
                }
                KeyCode::Left if app.current_page == Page::Analytics => app.cycle_year(1),
                KeyCode::Right if app.current_page == Page::Analytics => app.cycle_year(-1),
                _ => {}
            }
        }
    }
}

/// Key handling for the add/edit form. Returns true when the key was
/// consumed so globals (q, j/k, ...) do not fire while typing.
fn handle_form_key(app: &mut App, code: KeyCode) -> bool {
    match code {
        KeyCode::Esc => {
            // Cancel an edit back to the list; on a fresh form just reset
            let was_edit = app.form.editing_id.is_some();
            app.form = ExpenseForm::empty(app.today);
            if was_edit {
                app.current_page = Page::Expenses;
            }
            true
        }
        KeyCode::Enter => {
            app.submit_form();
            true
        }
        KeyCode::Down => {
            app.form.focus = app.form.focus.next();
            true
        }
        KeyCode::Up => {
            app.form.focus = app.form.focus.previous();
            true
        }
        KeyCode::Left if app.form.focus == Field::Category => {
            app.form.cycle_category(-1);
            true
        }
        KeyCode::Right if app.form.focus == Field::Category => {
            app.form.cycle_category(1);
            true
        }
        KeyCode::Backspace => {
            if let Some(buffer) = app.form.buffer_mut() {
                buffer.pop();
            }
            true
        }
        KeyCode::Char('=') if app.form.focus == Field::Amount => {
            // The calculator: evaluate the amount buffer in place
            match calc::evaluate(&app.form.amount) {
                Ok(value) => app.form.amount = format!("{}", value),
                Err(_) => app.form.amount.clear(),
            }
            true
        }
        KeyCode::Char(c) => {
            // All printable keys are consumed while the form is up so that
            // globals like 'q' cannot fire mid-typing
            let accepted = match app.form.focus {
                Field::Amount => c.is_ascii_digit() || matches!(c, '.' | '+' | '-' | '*' | '/'),
                Field::Date => c.is_ascii_digit() || c == '-',
                Field::Description => true,
                Field::Category => false,
            };
            if accepted {
                if let Some(buffer) = app.form.buffer_mut() {
                    buffer.push(c);
                }
            }
            true
        }
        _ => false,
    }
}

// ============================================================================
// RENDERING
// ============================================================================

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
        Page::Dashboard => render_dashboard(f, chunks[1], app),
        Page::AddExpense => render_form(f, chunks[1], app),
        Page::Expenses => render_expenses(f, chunks[1], app),
        Page::Analytics => render_analytics(f, chunks[1], app),
    }

    render_status_bar(f, chunks[2], app);
}

fn render_header(f: &mut Frame, area: Rect, app: &App) {
    let pages = [
        Page::Dashboard,
        Page::AddExpense,
        Page::Expenses,
        Page::Analytics,
    ];

    let mut tab_spans = vec![];
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

        tab_spans.push(Span::styled(page.title(), style));
    }

    tab_spans.push(Span::raw("  |  "));
    tab_spans.push(Span::styled(
        format!("{} expenses", app.store.len()),
        Style::default().fg(Color::White),
    ));

    let header = Paragraph::new(vec![Line::from(tab_spans)]).block(
        Block::default()
            .borders(Borders::ALL)
            .border_style(Style::default().fg(Color::Cyan))
            .title(" 💸 kharcha "),
    );

    f.render_widget(header, area);
}

fn render_dashboard(f: &mut Frame, area: Rect, app: &App) {
    let stats = analytics::dashboard_stats(app.store.all(), app.today);

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Length(6), Constraint::Min(0)])
        .split(area);

    // Stat cards
    let change_color = if stats.monthly_change >= 0.0 {
        Color::Red
    } else {
        Color::Green
    };
    let cards = vec![
        Line::from(vec![
            Span::styled("This Month:     ", Style::default().fg(Color::DarkGray)),
            Span::styled(
                format::format_inr(stats.month_total),
                Style::default().fg(Color::White).add_modifier(Modifier::BOLD),
            ),
        ]),
        Line::from(vec![
            Span::styled("All Time:       ", Style::default().fg(Color::DarkGray)),
            Span::styled(
                format::format_inr(stats.all_time_total),
                Style::default().fg(Color::White).add_modifier(Modifier::BOLD),
            ),
        ]),
        Line::from(vec![
            Span::styled("Transactions:   ", Style::default().fg(Color::DarkGray)),
            Span::styled(
                format!("{}", stats.transaction_count),
                Style::default().fg(Color::White).add_modifier(Modifier::BOLD),
            ),
        ]),
        Line::from(vec![
            Span::styled("Monthly Change: ", Style::default().fg(Color::DarkGray)),
            Span::styled(
                format!(
                    "{}{:.1}%",
                    if stats.monthly_change >= 0.0 { "+" } else { "" },
                    stats.monthly_change
                ),
                Style::default().fg(change_color).add_modifier(Modifier::BOLD),
            ),
        ]),
    ];
    let summary = Paragraph::new(cards).block(
        Block::default()
            .borders(Borders::ALL)
            .title(" This Month at a Glance "),
    );
    f.render_widget(summary, chunks[0]);

    let columns = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(50), Constraint::Percentage(50)])
        .split(chunks[1]);

    // Recent expenses (insertion order)
    let recent_lines: Vec<Line> = if stats.recent.is_empty() {
        vec![Line::from(Span::styled(
            "No expenses yet",
            Style::default().fg(Color::DarkGray),
        ))]
    } else {
        stats
            .recent
            .iter()
            .map(|e| {
                Line::from(vec![
                    Span::raw(format!("{} ", category::icon(&e.category))),
                    Span::styled(
                        format!("{:<22}", truncate(&e.description, 22)),
                        Style::default().fg(Color::White),
                    ),
                    Span::styled(
                        format!("{:>10}", format::format_inr(e.amount)),
                        Style::default().fg(Color::Red),
                    ),
                    Span::styled(
                        format!("  {}", format::format_date_short(e.date)),
                        Style::default().fg(Color::DarkGray),
                    ),
                ])
            })
            .collect()
    };
    let recent = Paragraph::new(recent_lines)
        .block(Block::default().borders(Borders::ALL).title(" Recent Expenses "));
    f.render_widget(recent, columns[0]);

    // Top categories with share bars
    let top_lines: Vec<Line> = if stats.top_categories.is_empty() {
        vec![Line::from(Span::styled(
            "No data available",
            Style::default().fg(Color::DarkGray),
        ))]
    } else {
        stats
            .top_categories
            .iter()
            .map(|share| {
                Line::from(vec![
                    Span::raw(format!("{} ", category::icon(&share.category))),
                    Span::styled(
                        format!("{:<18}", share.category),
                        Style::default().fg(Color::White),
                    ),
                    Span::styled(bar(share.percentage, 12), Style::default().fg(Color::Cyan)),
                    Span::styled(
                        format!(
                            " {:>10} {:>5.1}%",
                            format::format_inr(share.amount),
                            share.percentage
                        ),
                        Style::default().fg(Color::DarkGray),
                    ),
                ])
            })
            .collect()
    };
    let top = Paragraph::new(top_lines).block(
        Block::default()
            .borders(Borders::ALL)
            .title(" Top Spending Categories "),
    );
    f.render_widget(top, columns[1]);
}

fn render_form(f: &mut Frame, area: Rect, app: &App) {
    let form = &app.form;
    let title = if form.editing_id.is_some() {
        " Edit Expense "
    } else {
        " Add New Expense "
    };

    let focus_style = Style::default().fg(Color::Yellow).add_modifier(Modifier::BOLD);
    let blur_style = Style::default().fg(Color::White);
    let label_style = Style::default().fg(Color::DarkGray);

    let field_line = |label: &str, value: String, focused: bool| {
        let marker = if focused { "→ " } else { "  " };
        Line::from(vec![
            Span::styled(marker.to_string(), focus_style),
            Span::styled(format!("{:<14}", label), label_style),
            Span::styled(value, if focused { focus_style } else { blur_style }),
        ])
    };

    // Live preview of the amount, as the web form shows under the input
    let amount_preview = match calc::evaluate(&form.amount) {
        Ok(value) if value > 0.0 => format!("  = {}", format::format_inr(value)),
        _ => String::new(),
    };

    let category_value = match form.category {
        Some(index) => format!(
            "{} {}  (←/→ to change)",
            category::icon(CATEGORIES[index]),
            CATEGORIES[index]
        ),
        None => "— select with ←/→ —".to_string(),
    };

    let mut lines = vec![
        Line::from(Span::raw("")),
        field_line(
            "Amount (₹)",
            format!("{}{}", form.amount, amount_preview),
            form.focus == Field::Amount,
        ),
        Line::from(Span::styled(
            "                type digits and + - * /, press = to calculate",
            Style::default().fg(Color::DarkGray),
        )),
        Line::from(Span::raw("")),
        field_line(
            "Description",
            form.description.clone(),
            form.focus == Field::Description,
        ),
        Line::from(Span::raw("")),
        field_line("Category", category_value, form.focus == Field::Category),
        Line::from(Span::raw("")),
        field_line("Date", form.date.clone(), form.focus == Field::Date),
        Line::from(Span::raw("")),
        Line::from(Span::styled(
            "  ↑/↓ move between fields · Enter save · Esc cancel",
            Style::default().fg(Color::DarkGray),
        )),
    ];

    for error in &form.errors {
        lines.push(Line::from(Span::styled(
            format!("  ✗ {}", error),
            Style::default().fg(Color::Red),
        )));
    }

    let paragraph = Paragraph::new(lines)
        .wrap(Wrap { trim: false })
        .block(
            Block::default()
                .borders(Borders::ALL)
                .border_style(Style::default().fg(Color::White))
                .title(title),
        );
    f.render_widget(paragraph, area);
}

fn render_expenses(f: &mut Frame, area: Rect, app: &mut App) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Length(3), Constraint::Min(0)])
        .split(area);

    // Filter bar
    let category_name = app
        .filter_state
        .category
        .map(|i| CATEGORIES[i])
        .unwrap_or("All Categories");
    let total: f64 = app.filtered.iter().map(|e| e.amount).sum();

    let filter_line = Line::from(vec![
        Span::styled("Search: ", Style::default().fg(Color::DarkGray)),
        Span::styled(
            if app.filter_state.search.is_empty() && app.input_mode != InputMode::Search {
                "—".to_string()
            } else {
                format!("{}_", app.filter_state.search)
            },
            Style::default().fg(Color::White),
        ),
        Span::raw("  |  "),
        Span::styled("Category: ", Style::default().fg(Color::DarkGray)),
        Span::styled(category_name, Style::default().fg(Color::White)),
        Span::raw("  |  "),
        Span::styled("Month: ", Style::default().fg(Color::DarkGray)),
        Span::styled(
            if app.filter_state.month.is_empty() && app.input_mode != InputMode::MonthFilter {
                "—".to_string()
            } else {
                format!("{}_", app.filter_state.month)
            },
            Style::default().fg(Color::White),
        ),
        Span::raw("  |  "),
        Span::styled(
            format!("Showing {} · Total {}", app.filtered.len(), format::format_inr(total)),
            Style::default().fg(Color::Cyan),
        ),
    ]);
    let filter_title = if app.filter_state.is_active() {
        " Filters (/ search · f category · m month · c clear) "
    } else {
        " Filters (/ search · f category · m month) "
    };
    let filters = Paragraph::new(vec![filter_line]).block(
        Block::default().borders(Borders::ALL).title(filter_title),
    );
    f.render_widget(filters, chunks[0]);

    // Expense table
    let header_cells = ["Date", "Description", "Category", "Amount"].iter().map(|h| {
        Cell::from(*h).style(
            Style::default()
                .fg(Color::Yellow)
                .add_modifier(Modifier::BOLD),
        )
    });
    let header = Row::new(header_cells)
        .style(Style::default().bg(Color::DarkGray))
        .height(1);

    let rows = app.filtered.iter().map(|e| {
        let cells = vec![
            Cell::from(format::format_date(e.date)),
            Cell::from(truncate(&e.description, 34)),
            Cell::from(format!("{} {}", category::icon(&e.category), e.category)),
            Cell::from(format::format_inr(e.amount)).style(Style::default().fg(Color::Red)),
        ];
        Row::new(cells).height(1)
    });

    let table = Table::new(
        rows,
        [
            Constraint::Length(13),
            Constraint::Length(36),
            Constraint::Length(24),
            Constraint::Length(14),
        ],
    )
    .header(header)
    .block(
        Block::default()
            .borders(Borders::ALL)
            .border_style(Style::default().fg(Color::White))
            .title(" Expenses (e edit · d delete) "),
    )
    .highlight_style(
        Style::default()
            .bg(Color::DarkGray)
            .add_modifier(Modifier::BOLD),
    )
    .highlight_symbol("→ ");

    f.render_stateful_widget(table, chunks[1], &mut app.state);
}

fn render_analytics(f: &mut Frame, area: Rect, app: &App) {
    let report = analytics::year_report(app.store.all(), app.selected_year, app.today);

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Length(6), Constraint::Min(0)])
        .split(area);

    // Key metrics
    let highest = match report.highest_month {
        Some((month, amount)) => format!(
            "{} ({})",
            format::month_name(month),
            format::format_inr(amount)
        ),
        None => "No data".to_string(),
    };
    let trend_color = if report.monthly_trend >= 0.0 {
        Color::Red
    } else {
        Color::Green
    };
    let metrics = vec![
        Line::from(vec![
            Span::styled(
                format!("Total Spent ({}):  ", report.year),
                Style::default().fg(Color::DarkGray),
            ),
            Span::styled(
                format::format_inr(report.total),
                Style::default().fg(Color::White).add_modifier(Modifier::BOLD),
            ),
            Span::raw("      "),
            Span::styled("Transactions: ", Style::default().fg(Color::DarkGray)),
            Span::styled(
                format!("{}", report.transaction_count),
                Style::default().fg(Color::White),
            ),
        ]),
        Line::from(vec![
            Span::styled("Monthly Average:   ", Style::default().fg(Color::DarkGray)),
            Span::styled(
                format::format_inr(report.monthly_average),
                Style::default().fg(Color::White),
            ),
        ]),
        Line::from(vec![
            Span::styled("Highest Month:     ", Style::default().fg(Color::DarkGray)),
            Span::styled(highest, Style::default().fg(Color::White)),
        ]),
        Line::from(vec![
            Span::styled("Monthly Trend:     ", Style::default().fg(Color::DarkGray)),
            Span::styled(
                format!(
                    "{}{:.1}%",
                    if report.monthly_trend >= 0.0 { "+" } else { "" },
                    report.monthly_trend
                ),
                Style::default().fg(trend_color),
            ),
        ]),
    ];
    let summary = Paragraph::new(metrics).block(
        Block::default()
            .borders(Borders::ALL)
            .title(format!(" Analytics — {} (←/→ year) ", report.year)),
    );
    f.render_widget(summary, chunks[0]);

    let columns = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(50), Constraint::Percentage(50)])
        .split(chunks[1]);

    // Category breakdown
    let breakdown_lines: Vec<Line> = if report.breakdown.is_empty() {
        vec![Line::from(Span::styled(
            format!("No data available for {}", report.year),
            Style::default().fg(Color::DarkGray),
        ))]
    } else {
        report
            .breakdown
            .iter()
            .enumerate()
            .map(|(rank, share)| {
                Line::from(vec![
                    Span::styled(
                        format!("{:>2}. ", rank + 1),
                        Style::default().fg(Color::DarkGray),
                    ),
                    Span::raw(format!("{} ", category::icon(&share.category))),
                    Span::styled(
                        format!("{:<18}", share.category),
                        Style::default().fg(Color::White),
                    ),
                    Span::styled(bar(share.percentage, 14), Style::default().fg(Color::Cyan)),
                    Span::styled(
                        format!(
                            " {:>10} {:>5.1}%",
                            format::format_inr(share.amount),
                            share.percentage
                        ),
                        Style::default().fg(Color::DarkGray),
                    ),
                ])
            })
            .collect()
    };
    let breakdown = Paragraph::new(breakdown_lines).block(
        Block::default()
            .borders(Borders::ALL)
            .title(" Category Breakdown "),
    );
    f.render_widget(breakdown, columns[0]);

    // Monthly spending
    let monthly_lines: Vec<Line> = report
        .monthly
        .iter()
        .enumerate()
        .map(|(month, bucket)| {
            let share = if report.total > 0.0 {
                (bucket.amount / report.total) * 100.0
            } else {
                0.0
            };
            let is_current =
                report.year == app.today.year() && month == app.today.month0() as usize;
            let name_style = if is_current {
                Style::default().fg(Color::Yellow).add_modifier(Modifier::BOLD)
            } else {
                Style::default().fg(Color::White)
            };
            Line::from(vec![
                Span::styled(format!("{:<10}", format::month_name(month)), name_style),
                Span::styled(bar(share, 14), Style::default().fg(Color::Blue)),
                Span::styled(
                    format!(
                        " {:>10}  {} expense{}",
                        format::format_inr(bucket.amount),
                        bucket.count,
                        if bucket.count == 1 { "" } else { "s" }
                    ),
                    Style::default().fg(Color::DarkGray),
                ),
            ])
        })
        .collect();
    let monthly = Paragraph::new(monthly_lines).block(
        Block::default()
            .borders(Borders::ALL)
            .title(" Monthly Spending "),
    );
    f.render_widget(monthly, columns[1]);
}

fn render_status_bar(f: &mut Frame, area: Rect, app: &App) {
    let mut status_spans = vec![];

    if let Some(id) = &app.pending_delete {
        let description = app
            .store
            .get(id)
            .map(|e| e.description.clone())
            .unwrap_or_default();
        status_spans.push(Span::styled(
            format!(" Delete \"{}\"? ", truncate(&description, 30)),
            Style::default().fg(Color::Red).add_modifier(Modifier::BOLD),
        ));
        status_spans.push(Span::styled("y", Style::default().fg(Color::Yellow)));
        status_spans.push(Span::raw(" confirm | "));
        status_spans.push(Span::styled("n", Style::default().fg(Color::Yellow)));
        status_spans.push(Span::raw(" cancel"));
    } else if let Some(toast) = &app.toast {
        status_spans.push(Span::styled(
            format!(" ✓ {} ", toast),
            Style::default().fg(Color::Green),
        ));
    } else {
        status_spans.push(Span::styled("Tab", Style::default().fg(Color::Yellow)));
        status_spans.push(Span::raw(" Page | "));
        status_spans.push(Span::styled("↑/↓", Style::default().fg(Color::Yellow)));
        status_spans.push(Span::raw(" Nav | "));
        match app.current_page {
            Page::Expenses => {
                status_spans.push(Span::styled("e", Style::default().fg(Color::Yellow)));
                status_spans.push(Span::raw(" Edit | "));
                status_spans.push(Span::styled("d", Style::default().fg(Color::Yellow)));
                status_spans.push(Span::raw(" Delete | "));
            }
            Page::AddExpense => {
                status_spans.push(Span::styled("Enter", Style::default().fg(Color::Yellow)));
                status_spans.push(Span::raw(" Save | "));
            }
            Page::Analytics => {
                status_spans.push(Span::styled("←/→", Style::default().fg(Color::Yellow)));
                status_spans.push(Span::raw(" Year | "));
            }
            Page::Dashboard => {}
        }
        if app.current_page == Page::AddExpense {
            status_spans.push(Span::styled("Esc", Style::default().fg(Color::Red)));
            status_spans.push(Span::raw(" Cancel (quit from another page)"));
        } else {
            status_spans.push(Span::styled("q", Style::default().fg(Color::Red)));
            status_spans.push(Span::raw(" Quit"));
        }
    }

    let status_bar = Paragraph::new(vec![Line::from(status_spans)]).block(
        Block::default()
            .borders(Borders::ALL)
            .border_style(Style::default().fg(Color::White)),
    );

    f.render_widget(status_bar, area);
}

/// Proportional text bar for percentage displays.
fn bar(percentage: f64, width: usize) -> String {
    let filled = ((percentage / 100.0) * width as f64).round() as usize;
    let filled = filled.min(width);
    format!("{}{}", "█".repeat(filled), "░".repeat(width - filled))
}

fn truncate(s: &str, max_len: usize) -> String {
    if s.chars().count() <= max_len {
        s.to_string()
    } else {
        let cut: String = s.chars().take(max_len.saturating_sub(3)).collect();
        format!("{}...", cut)
    }
}
