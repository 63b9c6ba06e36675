//! TUI views and rendering
//!
//! Draws the page and, when open, the contact dialog. Rendering only reads
//! state, except for recording where clickable elements ended up.

use ratatui::Frame;
use ratatui::layout::{Alignment, Constraint, Direction, Layout, Position, Rect};
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, Clear, Paragraph, Wrap};
use tracing::trace;

use crate::form::{Field, SubmissionRecord};

use super::dialog::{DialogFocus, FormDialog};
use super::state::{AppState, DialogLayout, PageFocus};

mod colors {
    use ratatui::style::Color;

    pub const HEADER: Color = Color::Rgb(0, 255, 255); // Cyan
    pub const KEYBIND: Color = Color::Rgb(0, 255, 255);
    pub const FOCUS: Color = Color::Rgb(100, 149, 237); // Cornflower blue
    pub const ERROR: Color = Color::Rgb(220, 20, 60); // Crimson
    pub const SUBMITTED: Color = Color::Rgb(50, 205, 50); // Lime green
    pub const DIM: Color = Color::DarkGray;
}

const OPEN_BUTTON_LABEL: &str = "[ Open Modal ]";
const DIALOG_HEIGHT: u16 = 25;

/// Render the whole screen
pub fn render(state: &mut AppState, frame: &mut Frame) {
    trace!("render: called");
    let area = frame.area();
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Length(3), Constraint::Min(5), Constraint::Length(1)])
        .split(area);

    render_header(frame, chunks[0]);
    render_page(state, frame, chunks[1]);
    render_footer(state, frame, chunks[2]);

    if state.modal_open {
        let layout = render_dialog(&state.dialog, state.dialog_width_percent, frame, area);
        state.dialog_layout = Some(layout);
    } else {
        state.dialog_layout = None;
    }
}

fn render_header(frame: &mut Frame, area: Rect) {
    let title = Paragraph::new(Line::from(Span::styled(
        "Modal Form",
        Style::default().fg(colors::HEADER).add_modifier(Modifier::BOLD),
    )))
    .block(Block::default().borders(Borders::BOTTOM));
    frame.render_widget(title, area);
}

fn render_page(state: &mut AppState, frame: &mut Frame, area: Rect) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Length(2), Constraint::Min(0)])
        .split(area.inner(ratatui::layout::Margin {
            horizontal: 2,
            vertical: 1,
        }));

    let button_style = if state.focus == PageFocus::OpenButton && !state.modal_open {
        Style::default()
            .fg(Color::Black)
            .bg(colors::FOCUS)
            .add_modifier(Modifier::BOLD)
    } else {
        Style::default().fg(colors::FOCUS)
    };
    let button_area = Rect {
        width: (OPEN_BUTTON_LABEL.chars().count() as u16).min(chunks[0].width),
        height: chunks[0].height.min(1),
        ..chunks[0]
    };
    frame.render_widget(Paragraph::new(Span::styled(OPEN_BUTTON_LABEL, button_style)), button_area);
    state.open_button_area = Some(button_area);

    if let Some(record) = &state.submitted {
        render_submitted(record, frame, chunks[1]);
    }
}

fn render_submitted(record: &SubmissionRecord, frame: &mut Frame, area: Rect) {
    let mut lines = Vec::new();
    for field in Field::ALL {
        lines.push(Line::from(Span::styled(
            format!("{}:", field.label()),
            Style::default().add_modifier(Modifier::BOLD),
        )));
        for value_line in record.get(field).lines() {
            lines.push(Line::from(format!("  {}", value_line)));
        }
        lines.push(Line::from(""));
    }

    let panel = Paragraph::new(lines).wrap(Wrap { trim: false }).block(
        Block::default()
            .borders(Borders::ALL)
            .border_style(Style::default().fg(colors::SUBMITTED))
            .title(" Submitted Information "),
    );
    frame.render_widget(panel, area);
}

fn render_footer(state: &AppState, frame: &mut Frame, area: Rect) {
    let hints: &[(&str, &str)] = if state.modal_open {
        &[
            ("[Tab]", "Next"),
            ("[Enter]", "Submit"),
            ("[Ctrl+S]", "Submit"),
            ("[Esc]", "Cancel"),
        ]
    } else {
        &[("[Enter]", "Open Modal"), ("[q]", "Quit")]
    };

    let mut spans = Vec::new();
    if let Some(status) = &state.status {
        spans.push(Span::styled(format!("{}  ", status), Style::default().fg(colors::ERROR)));
    }
    for (key, desc) in hints {
        spans.push(Span::styled(*key, Style::default().fg(colors::KEYBIND)));
        spans.push(Span::styled(format!(" {}  ", desc), Style::default().fg(colors::DIM)));
    }
    frame.render_widget(Paragraph::new(Line::from(spans)), area);
}

/// Draw the dialog over everything and report where its parts landed
fn render_dialog(dialog: &FormDialog, width_percent: u16, frame: &mut Frame, area: Rect) -> DialogLayout {
    trace!("render_dialog: called");
    let popup = centered_rect(width_percent, DIALOG_HEIGHT, area);
    frame.render_widget(Clear, popup);

    let block = Block::default()
        .borders(Borders::ALL)
        .title(" Contact Information ")
        .style(Style::default().bg(Color::Black));
    let inner = block.inner(popup);
    frame.render_widget(block, popup);

    let close = Rect {
        x: popup.right().saturating_sub(5),
        y: popup.y,
        width: 3u16.min(popup.width),
        height: 1,
    };
    frame.render_widget(
        Paragraph::new(Span::styled("[x]", button_style(dialog.focus() == DialogFocus::Close, Color::Gray))),
        close,
    );

    let rows = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(2), // description
            Constraint::Length(5), // name
            Constraint::Length(5), // email
            Constraint::Length(8), // message
            Constraint::Length(1), // buttons
            Constraint::Min(0),
        ])
        .split(inner);

    frame.render_widget(
        Paragraph::new(Span::styled(
            "Fill out the form below to submit your information.",
            Style::default().fg(colors::DIM),
        ))
        .wrap(Wrap { trim: true }),
        rows[0],
    );

    for (field, row) in Field::ALL.into_iter().zip(rows[1..4].iter()) {
        render_field(dialog, field, frame, *row);
    }

    let (cancel, submit) = render_buttons(dialog, frame, rows[4]);
    DialogLayout {
        dialog: popup,
        close,
        cancel,
        submit,
    }
}

fn render_field(dialog: &FormDialog, field: Field, frame: &mut Frame, area: Rect) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Length(1), Constraint::Min(3), Constraint::Length(1)])
        .split(area);

    let label = Line::from(vec![
        Span::raw(field.label()),
        Span::styled(" *", Style::default().fg(colors::ERROR)),
    ]);
    frame.render_widget(Paragraph::new(label), chunks[0]);

    let focused = dialog.focus() == DialogFocus::Field(field);
    let error = dialog.errors().first(field);
    let border = match (error, focused) {
        (Some(_), _) => colors::ERROR,
        (None, true) => colors::FOCUS,
        (None, false) => colors::DIM,
    };
    let value = dialog.input().get(field);
    let input_block = Block::default().borders(Borders::ALL).border_style(Style::default().fg(border));
    let input_inner = input_block.inner(chunks[1]);

    // Keep the end of long input visible
    let lines: Vec<&str> = value.split('\n').collect();
    let scroll = (lines.len() as u16).saturating_sub(input_inner.height.max(1));
    let text: Vec<Line> = lines.iter().map(|l| Line::from(*l)).collect();
    frame.render_widget(Paragraph::new(text).block(input_block).scroll((scroll, 0)), chunks[1]);

    if focused {
        let last = lines.last().copied().unwrap_or("");
        let row = (lines.len() as u16).saturating_sub(1).saturating_sub(scroll);
        let col = (last.chars().count() as u16).min(input_inner.width.saturating_sub(1));
        frame.set_cursor_position(Position::new(input_inner.x + col, input_inner.y + row));
    }

    if let Some(message) = error {
        frame.render_widget(
            Paragraph::new(Span::styled(message, Style::default().fg(colors::ERROR))),
            chunks[2],
        );
    }
}

fn render_buttons(dialog: &FormDialog, frame: &mut Frame, area: Rect) -> (Rect, Rect) {
    const CANCEL: &str = " Cancel ";
    const SUBMIT: &str = " Submit ";
    let cancel_width = CANCEL.len() as u16;
    let submit_width = SUBMIT.len() as u16;

    let submit = Rect {
        x: area.right().saturating_sub(submit_width),
        y: area.y,
        width: submit_width.min(area.width),
        height: area.height.min(1),
    };
    let cancel = Rect {
        x: submit.x.saturating_sub(cancel_width + 2),
        y: area.y,
        width: cancel_width.min(area.width),
        height: area.height.min(1),
    };

    frame.render_widget(
        Paragraph::new(Span::styled(
            CANCEL,
            button_style(dialog.focus() == DialogFocus::Cancel, Color::Gray),
        ))
        .alignment(Alignment::Center),
        cancel,
    );
    frame.render_widget(
        Paragraph::new(Span::styled(
            SUBMIT,
            button_style(dialog.focus() == DialogFocus::Submit, colors::FOCUS),
        ))
        .alignment(Alignment::Center),
        submit,
    );
    (cancel, submit)
}

fn button_style(focused: bool, color: Color) -> Style {
    if focused {
        Style::default().fg(Color::Black).bg(color).add_modifier(Modifier::BOLD)
    } else {
        Style::default().fg(color)
    }
}

/// Helper to create a horizontally proportional, fixed-height centered rect
fn centered_rect(percent_x: u16, height: u16, area: Rect) -> Rect {
    trace!(percent_x, height, "centered_rect: called");
    let percent_x = percent_x.min(100);
    let height = height.min(area.height);
    let popup_layout = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length((area.height - height) / 2),
            Constraint::Length(height),
            Constraint::Min(0),
        ])
        .split(area);

    Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Percentage((100 - percent_x) / 2),
            Constraint::Percentage(percent_x),
            Constraint::Percentage((100 - percent_x) / 2),
        ])
        .split(popup_layout[1])[1]
}
