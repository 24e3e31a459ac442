//! Terminal rendering of a pane and the load confirmation dialog.

use crossterm::event::{KeyCode, KeyEvent};
use ratatui::Frame;
use ratatui::layout::{Alignment, Constraint, Layout, Rect};
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Clear, Paragraph, Wrap};

use crate::collaborators::{ConfirmAction, UiTree};
use crate::config::HeaderAlign;
use crate::drivers::MemoryDrivers;
use crate::manager::PaneManager;
use crate::pane::PaneStatus;
use crate::selector::Selector;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldView {
    pub id: String,
    pub value: String,
    pub modified: bool,
    pub highlighted: bool,
}

/// Everything needed to draw one pane, read from the manager and drivers.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PaneView {
    pub id: String,
    pub header: Option<(String, HeaderAlign)>,
    pub status: PaneStatus,
    pub busy: bool,
    pub disabled: bool,
    pub readonly: bool,
    pub group_box: bool,
    pub content: String,
    pub fields: Vec<FieldView>,
}

impl PaneView {
    pub fn capture(manager: &mut PaneManager, drivers: &MemoryDrivers, id: &str) -> Option<Self> {
        let mut pane = manager.pane_mut(id)?;
        let modified: Vec<String> = pane
            .modified_columns(None)
            .into_iter()
            .map(|c| c.id)
            .collect();
        let config = pane.config();
        let selector = Selector::pane(id);
        let tree = &drivers.tree;
        let busy = tree.has_class(&selector, &config.pane_progress_indicator_class)
            || tree.has_class(&selector, &config.disabled_class);
        let header = tree
            .header(&selector)
            .map(|h| (h.title, config.pane_header_align));
        let settings = drivers.disablers.settings(&selector).unwrap_or_default();
        let highlighted = drivers.form.highlighted(id);
        let fields = drivers
            .form
            .field_ids(id)
            .into_iter()
            .map(|field| FieldView {
                value: drivers.form.value(id, &field).unwrap_or_default(),
                modified: modified.contains(&field),
                highlighted: highlighted.contains(&field),
                id: field,
            })
            .collect();
        Some(Self {
            id: id.to_string(),
            header,
            status: pane.status(),
            busy,
            disabled: settings.disable,
            readonly: settings.readonly,
            group_box: tree.has_group_box(&selector),
            content: plain_text(&tree.content(&selector).unwrap_or_default()),
            fields,
        })
    }
}

/// Markup with tags dropped and blank lines collapsed.
pub fn plain_text(markup: &str) -> String {
    let mut out = String::with_capacity(markup.len());
    let mut in_tag = false;
    for ch in markup.chars() {
        match ch {
            '<' => in_tag = true,
            '>' if in_tag => {
                in_tag = false;
                out.push(' ');
            }
            _ if !in_tag => out.push(ch),
            _ => {}
        }
    }
    out.lines()
        .map(|l| l.split_whitespace().collect::<Vec<_>>().join(" "))
        .filter(|l| !l.is_empty())
        .collect::<Vec<_>>()
        .join("\n")
}

fn alignment(align: HeaderAlign) -> Alignment {
    match align {
        HeaderAlign::Left => Alignment::Left,
        HeaderAlign::Center => Alignment::Center,
        HeaderAlign::Right => Alignment::Right,
    }
}

fn status_label(status: PaneStatus) -> &'static str {
    match status {
        PaneStatus::Idle => "idle",
        PaneStatus::AwaitingConfirmation => "awaiting confirmation",
        PaneStatus::Loading => "loading",
        PaneStatus::Loaded => "loaded",
        PaneStatus::Failed => "failed",
    }
}

/// Rows reserved for the field list, saturating at the widest a layout can ask.
fn field_rows(count: usize) -> u16 {
    u16::try_from(count).unwrap_or(u16::MAX)
}

pub fn render_pane(frame: &mut Frame, area: Rect, view: &PaneView) {
    if area.width < 4 || area.height < 3 {
        return;
    }
    let mut block = Block::bordered().title(format!(" #{} ", view.id));
    if view.group_box {
        block = block.border_type(ratatui::widgets::BorderType::Double);
    }
    let mut flags = vec![status_label(view.status)];
    if view.disabled {
        flags.push("disabled");
    }
    if view.readonly {
        flags.push("read-only");
    }
    block = block.title_bottom(Line::from(format!(" {} ", flags.join(" | "))).alignment(Alignment::Right));
    let inner = block.inner(area);
    let base = if view.disabled || view.busy {
        Style::default().add_modifier(Modifier::DIM)
    } else {
        Style::default()
    };
    frame.render_widget(block.style(base), area);

    let header_height = u16::from(view.header.is_some());
    let field_height = field_rows(view.fields.len());
    let [header_area, content_area, fields_area] = Layout::vertical([
        Constraint::Length(header_height),
        Constraint::Min(1),
        Constraint::Length(field_height),
    ])
    .areas(inner);

    if let Some((title, align)) = &view.header {
        let header = Paragraph::new(title.as_str())
            .alignment(alignment(*align))
            .style(Style::default().add_modifier(Modifier::BOLD | Modifier::REVERSED));
        frame.render_widget(header, header_area);
    }

    let content = Paragraph::new(view.content.as_str())
        .style(base)
        .wrap(Wrap { trim: true });
    frame.render_widget(content, content_area);

    let lines: Vec<Line> = view
        .fields
        .iter()
        .map(|field| {
            let marker = if field.modified { "*" } else { " " };
            let style = if field.highlighted {
                Style::default().bg(Color::Yellow).fg(Color::Black)
            } else {
                base
            };
            Line::from(vec![
                Span::raw(format!("{marker} {}: ", field.id)),
                Span::styled(field.value.clone(), style),
            ])
        })
        .collect();
    frame.render_widget(Paragraph::new(lines), fields_area);
}

/// Modal confirm/cancel dialog drawn over the pane.
#[derive(Debug, Clone)]
pub struct ConfirmOverlay {
    width: u16,
    height: u16,
    selected_confirm: bool,
}

impl Default for ConfirmOverlay {
    fn default() -> Self {
        Self::new()
    }
}

impl ConfirmOverlay {
    pub fn new() -> Self {
        Self {
            width: 60,
            height: 10,
            selected_confirm: true,
        }
    }

    /// Select the confirm button again; called whenever the dialog opens.
    pub fn reset(&mut self) {
        self.selected_confirm = true;
    }

    pub fn selected_confirm(&self) -> bool {
        self.selected_confirm
    }

    /// Clamp the dialog to `area` and center it.
    pub fn rect_for(&self, area: Rect) -> Rect {
        let mut width = area.width.min(self.width).max(1);
        let mut height = area.height.min(self.height).max(1);
        if area.width >= 24 {
            width = width.max(24);
        }
        if area.height >= 5 {
            height = height.max(5);
        }
        let x = area.x.saturating_add(area.width.saturating_sub(width) / 2);
        let y = area.y.saturating_add(area.height.saturating_sub(height) / 2);
        Rect {
            x,
            y,
            width,
            height,
        }
    }

    pub fn handle_key(&mut self, key: &KeyEvent) -> Option<ConfirmAction> {
        match key.code {
            KeyCode::Tab | KeyCode::BackTab => {
                self.selected_confirm = !self.selected_confirm;
                None
            }
            KeyCode::Left => {
                self.selected_confirm = false;
                None
            }
            KeyCode::Right => {
                self.selected_confirm = true;
                None
            }
            KeyCode::Enter => Some(if self.selected_confirm {
                ConfirmAction::Confirm
            } else {
                ConfirmAction::Cancel
            }),
            KeyCode::Esc => Some(ConfirmAction::Cancel),
            _ => None,
        }
    }

    pub fn render(&self, frame: &mut Frame, area: Rect, title: &str, body: &str) {
        if area.width == 0 || area.height == 0 {
            return;
        }
        let rect = self.rect_for(area);
        frame.render_widget(Clear, rect);
        let block = Block::bordered().title(format!(" {title} "));
        let inner = block.inner(rect);
        frame.render_widget(block, rect);
        if inner.height < 3 || inner.width < 4 {
            return;
        }
        let [body_area, button_area] =
            Layout::vertical([Constraint::Min(1), Constraint::Length(1)]).areas(inner);
        frame.render_widget(
            Paragraph::new(body).wrap(Wrap { trim: true }),
            body_area,
        );

        let selected = Style::default().add_modifier(Modifier::BOLD | Modifier::REVERSED);
        let (cancel_style, confirm_style) = if self.selected_confirm {
            (Style::default(), selected)
        } else {
            (selected, Style::default())
        };
        let buttons = Line::from(vec![
            Span::styled("[ Cancel ]", cancel_style),
            Span::raw(" "),
            Span::styled("[ Reload ]", confirm_style),
        ])
        .alignment(Alignment::Right);
        frame.render_widget(Paragraph::new(buttons), button_area);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crossterm::event::KeyModifiers;
    use ratatui::Terminal;
    use ratatui::backend::TestBackend;

    fn screen(terminal: &Terminal<TestBackend>) -> String {
        let buffer = terminal.backend().buffer();
        let mut out = String::new();
        for y in 0..buffer.area.height {
            for x in 0..buffer.area.width {
                out.push_str(buffer[(x, y)].symbol());
            }
            out.push('\n');
        }
        out
    }

    fn view() -> PaneView {
        PaneView {
            id: "p1".into(),
            header: Some(("Customer".into(), HeaderAlign::Left)),
            status: PaneStatus::Loaded,
            busy: false,
            disabled: false,
            readonly: true,
            group_box: false,
            content: "Hello".into(),
            fields: vec![FieldView {
                id: "name".into(),
                value: "Grace".into(),
                modified: true,
                highlighted: true,
            }],
        }
    }

    #[test]
    fn pane_shows_header_content_fields_and_flags() {
        let mut terminal = Terminal::new(TestBackend::new(40, 8)).unwrap();
        terminal
            .draw(|f| render_pane(f, f.area(), &view()))
            .unwrap();
        let text = screen(&terminal);
        assert!(text.contains("#p1"));
        assert!(text.contains("Customer"));
        assert!(text.contains("Hello"));
        assert!(text.contains("* name: Grace"));
        assert!(text.contains("loaded | read-only"));
    }

    #[test]
    fn field_rows_saturate() {
        assert_eq!(field_rows(3), 3);
        assert_eq!(field_rows(usize::from(u16::MAX) + 1), u16::MAX);
    }

    #[test]
    fn tiny_areas_are_skipped() {
        let mut terminal = Terminal::new(TestBackend::new(3, 2)).unwrap();
        terminal
            .draw(|f| render_pane(f, f.area(), &view()))
            .unwrap();
        assert!(!screen(&terminal).contains("p1"));
    }

    #[test]
    fn dialog_renders_title_body_and_buttons() {
        let overlay = ConfirmOverlay::new();
        let mut terminal = Terminal::new(TestBackend::new(70, 12)).unwrap();
        terminal
            .draw(|f| overlay.render(f, f.area(), "Reload Pane", "Continue?"))
            .unwrap();
        let text = screen(&terminal);
        assert!(text.contains("Reload Pane"));
        assert!(text.contains("Continue?"));
        assert!(text.contains("[ Cancel ] [ Reload ]"));
    }

    #[test]
    fn rect_for_clamps_to_small_areas() {
        let overlay = ConfirmOverlay::new();
        let r = overlay.rect_for(Rect::new(0, 0, 10, 2));
        assert!(r.width <= 10 && r.height <= 2);
        let r = overlay.rect_for(Rect::new(0, 0, 100, 40));
        assert_eq!((r.width, r.height), (60, 10));
        assert_eq!((r.x, r.y), (20, 15));
    }

    #[test]
    fn keys_drive_the_selection() {
        let mut overlay = ConfirmOverlay::new();
        let key = |code| KeyEvent::new(code, KeyModifiers::NONE);
        assert_eq!(overlay.handle_key(&key(KeyCode::Tab)), None);
        assert!(!overlay.selected_confirm());
        assert_eq!(
            overlay.handle_key(&key(KeyCode::Enter)),
            Some(ConfirmAction::Cancel)
        );
        overlay.handle_key(&key(KeyCode::Right));
        assert_eq!(
            overlay.handle_key(&key(KeyCode::Enter)),
            Some(ConfirmAction::Confirm)
        );
        assert_eq!(
            overlay.handle_key(&key(KeyCode::Esc)),
            Some(ConfirmAction::Cancel)
        );
    }

    #[test]
    fn plain_text_drops_markup() {
        assert_eq!(plain_text("<div>X</div>"), "X");
        assert_eq!(plain_text("<p>a</p>\n\n<p>b  c</p>"), "a\nb c");
    }
}
