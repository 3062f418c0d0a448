use crate::styles;
use anyhow::Result;
use credo_crawler::CreatorRow;
use ratatui::{
    Terminal,
    backend::CrosstermBackend,
    layout::{Constraint, Direction, Layout},
    text::{Line, Span},
    widgets::{Block, Borders, Cell, Paragraph, Row, Table, TableState, Wrap},
};
use std::io::Stdout;

/// Immutable snapshot of UI state for one draw pass.
pub struct ViewSnap {
    /// `None` means no report file exists yet.
    pub rows: Option<Vec<CreatorRow>>,
    pub selected: usize,
    pub status: String,
    pub status_is_error: bool,
    pub busy: bool,
    pub spinner: &'static str,
}

pub fn draw(term: &mut Terminal<CrosstermBackend<Stdout>>, snap: &ViewSnap) -> Result<()> {
    term.draw(|frame| {
        let area = frame.area();

        let layout = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Length(1),
                Constraint::Min(5),
                Constraint::Length(7),
                Constraint::Length(3),
            ])
            .split(area);

        // Header
        let header = Paragraph::new(Line::from(vec![
            Span::styled(" Credo ", styles::header()),
            Span::styled("— creator credibility report", styles::dim()),
        ]));
        frame.render_widget(header, layout[0]);

        // Table or prompt
        match &snap.rows {
            Some(rows) if !rows.is_empty() => {
                render_table(frame, layout[1], rows, snap.selected);
                render_detail(frame, layout[2], rows.get(snap.selected));
            }
            Some(_) => {
                let empty = Paragraph::new(
                    "The last crawl found no creators. Press r to crawl again.",
                )
                .style(styles::dim())
                .block(Block::default().borders(Borders::ALL).title(" Creators "));
                frame.render_widget(empty, layout[1]);
                render_detail(frame, layout[2], None);
            }
            None => {
                let prompt =
                    Paragraph::new("No report found. Press r to run the crawl first.")
                        .style(styles::dim())
                        .block(Block::default().borders(Borders::ALL).title(" Creators "));
                frame.render_widget(prompt, layout[1]);
                render_detail(frame, layout[2], None);
            }
        }

        // Status bar
        let state_span = if snap.busy {
            Span::styled("Crawling…", styles::busy())
        } else {
            Span::styled("Idle", styles::idle())
        };
        let status_style = if snap.status_is_error {
            styles::error()
        } else {
            styles::dim()
        };
        let status_line = Line::from(vec![
            Span::raw(" "),
            Span::styled(snap.spinner, styles::busy()),
            Span::raw(" "),
            state_span,
            Span::raw(" • "),
            Span::styled(snap.status.clone(), status_style),
            Span::styled("  [r] crawl  [l] reload  [q] quit", styles::dim()),
        ]);
        let status = Paragraph::new(status_line)
            .block(Block::default().borders(Borders::ALL).title(" Status "));
        frame.render_widget(status, layout[3]);
    })?;

    Ok(())
}

fn render_table(
    frame: &mut ratatui::Frame,
    area: ratatui::layout::Rect,
    rows: &[CreatorRow],
    selected: usize,
) {
    let header = Row::new(
        ["Channel", "Subs", "Videos", "Views", "Avg views", "Up/wk", "Like %", "Score"]
            .into_iter()
            .map(|h| Cell::from(Span::styled(h, styles::column_header()))),
    );

    let body = rows.iter().map(|row| {
        Row::new(vec![
            Cell::from(row.channel_title.clone()),
            Cell::from(format_count(row.subscriber_count)),
            Cell::from(row.video_count.to_string()),
            Cell::from(format_count(row.view_count)),
            Cell::from(format_count(row.avg_views_last_5)),
            Cell::from(format!("{:.2}", row.upload_per_week)),
            Cell::from(format!("{:.2}", row.avg_like_view_ratio)),
            Cell::from(Span::styled(
                format!("{}/3", row.credibility_score),
                styles::score(row.credibility_score),
            )),
        ])
    });

    let widths = [
        Constraint::Min(20),
        Constraint::Length(8),
        Constraint::Length(7),
        Constraint::Length(9),
        Constraint::Length(10),
        Constraint::Length(6),
        Constraint::Length(7),
        Constraint::Length(6),
    ];
    let table = Table::new(body, widths)
        .header(header)
        .row_highlight_style(styles::selected_row())
        .block(Block::default().borders(Borders::ALL).title(" Creators "));

    let mut state = TableState::default();
    state.select(Some(selected));
    frame.render_stateful_widget(table, area, &mut state);
}

fn render_detail(
    frame: &mut ratatui::Frame,
    area: ratatui::layout::Rect,
    row: Option<&CreatorRow>,
) {
    let content = match row {
        Some(row) => vec![
            Line::from(vec![
                Span::styled("Channel: ", styles::label()),
                Span::raw(row.channel_title.clone()),
                Span::styled(format!("  ({})", row.channel_id), styles::dim()),
            ]),
            Line::from(vec![
                Span::styled("Score: ", styles::label()),
                Span::styled(
                    format!("{}/3", row.credibility_score),
                    styles::score(row.credibility_score),
                ),
            ]),
            Line::from(vec![
                Span::styled("Description: ", styles::label()),
                Span::raw(row.description.replace('\n', " ")),
            ]),
        ],
        None => vec![Line::from(Span::styled("No creator selected.", styles::dim()))],
    };

    let detail = Paragraph::new(content)
        .wrap(Wrap { trim: true })
        .block(Block::default().borders(Borders::ALL).title(" Detail "));
    frame.render_widget(detail, area);
}

fn format_count(n: u64) -> String {
    match n {
        0..=9_999 => n.to_string(),
        10_000..=999_999 => format!("{:.1}k", n as f64 / 1_000.0),
        _ => format!("{:.1}M", n as f64 / 1_000_000.0),
    }
}
