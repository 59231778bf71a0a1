use std::time::Instant;

use ratatui::{
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Clear, List, ListItem, ListState, Paragraph, Wrap},
    Frame,
};
use ratatui_image::StatefulImage;

use super::image::{ThumbnailState, Thumbnails};
use super::results::ResultsView;
use super::state::AppState;
use super::zoom::ZoomOverlay;

/// Height of one result row when thumbnails are shown.
const IMAGE_ROW_HEIGHT: u16 = 6;
/// Columns given to the thumbnail in a result row.
const IMAGE_COLUMNS: u16 = 16;
/// The zoomed picture appears once the overlay is at least this opaque.
const IMAGE_MIN_OPACITY: f32 = 0.5;

/// Main render function.
pub fn render(f: &mut Frame, state: &mut AppState, now: Instant) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .margin(1)
        .constraints([
            Constraint::Length(3),
            Constraint::Length(3),
            Constraint::Min(3),
            Constraint::Length(1),
            Constraint::Length(2),
        ])
        .split(f.area());

    let title = Paragraph::new("Wikipedia Images")
        .style(Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD))
        .alignment(Alignment::Center)
        .block(Block::default().borders(Borders::ALL));
    f.render_widget(title, chunks[0]);

    render_search_input(f, state, chunks[1]);
    render_results(f, state, chunks[2]);

    let help = Paragraph::new("Type to search | ↑/↓: Select | Enter: Zoom | Ctrl-U: Clear | Esc: Quit")
        .style(Style::default().fg(Color::DarkGray))
        .alignment(Alignment::Center);
    f.render_widget(help, chunks[3]);

    render_status_bar(f, chunks[4], state);

    let thumb_size = state.thumb_size();
    if let Some(overlay) = state.zoom.overlay() {
        render_zoom(f, overlay, &mut state.thumbnails, thumb_size, now);
    }
}

/// Render the search box and place the cursor in it.
fn render_search_input(f: &mut Frame, state: &AppState, area: Rect) {
    let input_block = Block::default()
        .title(" Search ")
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::Yellow));

    let input_text = Paragraph::new(state.query.as_str())
        .style(Style::default().fg(Color::White))
        .block(input_block);
    f.render_widget(input_text, area);

    if !state.zoom.is_active() {
        let cursor_chars = state.query[..state.cursor_position].chars().count();
        let cursor_chars = u16::try_from(cursor_chars).unwrap_or(u16::MAX);
        let cursor_x = area
            .x
            .saturating_add(cursor_chars)
            .saturating_add(1)
            .min(area.right().saturating_sub(2));
        f.set_cursor_position((cursor_x, area.y + 1));
    }
}

/// Render one entry per image that has a thumbnail.
fn render_results(f: &mut Frame, state: &mut AppState, area: Rect) {
    let rows = state.results.rows();
    let block = Block::default()
        .borders(Borders::ALL)
        .title(format!(" Images [{}] ", rows.len()));

    if rows.is_empty() {
        let message = if state.query.is_empty() {
            "Start typing to search Wikipedia".to_string()
        } else if state.results.total() > 0 {
            format!("No thumbnails among {} pages", state.results.total())
        } else {
            "No images".to_string()
        };
        let empty = Paragraph::new(message)
            .style(Style::default().fg(Color::DarkGray))
            .alignment(Alignment::Center)
            .block(block);
        f.render_widget(empty, area);
        return;
    }

    if state.thumbnails.is_enabled() {
        render_image_rows(f, &state.results, &mut state.thumbnails, block, area);
        return;
    }

    let items: Vec<ListItem> = rows
        .iter()
        .map(|image| {
            ListItem::new(vec![
                Line::from(Span::styled(
                    image.title.clone(),
                    Style::default().add_modifier(Modifier::BOLD),
                )),
                Line::from(Span::styled(
                    image.url.clone(),
                    Style::default().fg(Color::DarkGray),
                )),
            ])
        })
        .collect();

    let list = List::new(items)
        .block(block)
        .highlight_style(selected_style())
        .highlight_symbol("> ");

    let mut list_state = ListState::default().with_selected(Some(state.results.selected_index()));
    f.render_stateful_widget(list, area, &mut list_state);
}

fn selected_style() -> Style {
    Style::default()
        .fg(Color::Black)
        .bg(Color::Cyan)
        .add_modifier(Modifier::BOLD)
}

/// Rows with the picture on the left, scrolled so the selection is visible.
fn render_image_rows(
    f: &mut Frame,
    results: &ResultsView,
    thumbnails: &mut Thumbnails,
    block: Block,
    area: Rect,
) {
    let inner = block.inner(area);
    f.render_widget(block, area);

    let visible = usize::from((inner.height / IMAGE_ROW_HEIGHT).max(1));
    let selected = results.selected_index();
    let first = selected.saturating_sub(visible - 1);

    let rows = results.rows().iter().enumerate().skip(first).take(visible);
    for (slot, (index, image)) in rows.enumerate() {
        let y = inner.y + slot as u16 * IMAGE_ROW_HEIGHT;
        let height = IMAGE_ROW_HEIGHT.min(inner.bottom().saturating_sub(y));
        if height == 0 {
            break;
        }
        let row = Rect::new(inner.x, y, inner.width, height);
        let [picture, text] =
            Layout::horizontal([Constraint::Length(IMAGE_COLUMNS), Constraint::Min(1)]).areas(row);

        render_row_thumbnail(f, thumbnails, &image.url, picture);

        let (marker, title_style) = if index == selected {
            ("> ", selected_style())
        } else {
            ("  ", Style::default().add_modifier(Modifier::BOLD))
        };
        let lines = vec![
            Line::from(Span::styled(format!("{marker}{}", image.title), title_style)),
            Line::from(Span::styled(
                format!("  {}", image.url),
                Style::default().fg(Color::DarkGray),
            )),
        ];
        f.render_widget(Paragraph::new(lines), text);
    }
}

fn render_row_thumbnail(f: &mut Frame, thumbnails: &mut Thumbnails, url: &str, area: Rect) {
    let label = match thumbnails.state(url) {
        ThumbnailState::Ready => {
            if let Some(protocol) = thumbnails.row_protocol(url) {
                f.render_stateful_widget(StatefulImage::default(), area, protocol);
            }
            return;
        }
        ThumbnailState::Failed => "no image",
        ThumbnailState::Loading | ThumbnailState::Missing => "loading",
    };

    let placeholder = Paragraph::new(label)
        .style(Style::default().fg(Color::DarkGray))
        .alignment(Alignment::Center);
    f.render_widget(placeholder, area);
}

/// Render the status bar at the bottom.
fn render_status_bar(f: &mut Frame, area: Rect, state: &AppState) {
    let (status_text, style) = if let Some(toast) = state.results.toast() {
        (
            format!(" Error: {}", toast.message),
            Style::default().fg(Color::Red),
        )
    } else if state.results.is_searching() {
        (" Searching...".to_string(), Style::default().fg(Color::Yellow))
    } else {
        (
            format!(
                " {} images | {}",
                state.results.rows().len(),
                state.api_url
            ),
            Style::default().fg(Color::Green),
        )
    };

    let status = Paragraph::new(status_text)
        .style(style)
        .alignment(Alignment::Left)
        .block(Block::default().borders(Borders::TOP));
    f.render_widget(status, area);
}

/// Scale an RGB colour by the overlay's opacity, fading towards black.
fn faded(rgb: (u8, u8, u8), opacity: f32) -> Color {
    let scale = |c: u8| (f32::from(c) * opacity.clamp(0.0, 1.0)).round() as u8;
    Color::Rgb(scale(rgb.0), scale(rgb.1), scale(rgb.2))
}

/// Render the full-screen zoom overlay: the picture, when there is one,
/// above the page details.
fn render_zoom(
    f: &mut Frame,
    overlay: &ZoomOverlay,
    thumbnails: &mut Thumbnails,
    thumb_size: u32,
    now: Instant,
) {
    let area = f.area();
    let opacity = overlay.opacity(now);
    let text = faded((255, 255, 255), opacity);
    let accent = faded((0, 255, 255), opacity);
    let image = overlay.image();

    let lines = vec![
        Line::from(Span::styled(
            image.title.clone(),
            Style::default().fg(accent).add_modifier(Modifier::BOLD),
        )),
        Line::from(Span::styled(image.url.clone(), Style::default().fg(text))),
        Line::from(Span::styled(
            format!("Thumbnail up to {thumb_size}px"),
            Style::default().fg(text),
        )),
        Line::from(""),
        Line::from(Span::styled(
            "Press any key to close",
            Style::default().fg(faded((128, 128, 128), opacity)),
        )),
    ];
    let details_height = lines.len() as u16;

    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(accent))
        .title(" Image ");
    let inner = block.inner(area);

    f.render_widget(Clear, area);
    f.render_widget(block, area);

    let [picture, details] =
        Layout::vertical([Constraint::Min(0), Constraint::Length(details_height)]).areas(inner);

    let protocol = if opacity >= IMAGE_MIN_OPACITY {
        thumbnails.zoomed_protocol(&image.url)
    } else {
        None
    };
    let details = match protocol {
        Some(protocol) if picture.height > 0 => {
            f.render_stateful_widget(StatefulImage::default(), picture, protocol);
            details
        }
        // Without a picture the details sit in the middle.
        _ => {
            let [_, middle, _] = Layout::vertical([
                Constraint::Min(0),
                Constraint::Length(details_height),
                Constraint::Min(0),
            ])
            .areas(inner);
            middle
        }
    };

    let zoomed = Paragraph::new(lines)
        .alignment(Alignment::Center)
        .wrap(Wrap { trim: true });
    f.render_widget(zoomed, details);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::{ErrorKind, FetchFailure};
    use crate::fetch::FetchEvent;
    use crate::tui::image::test_support::{red_thumbnails, settle};
    use crate::tui::test_support::{sample_images, static_service};
    use crate::Config;
    use ratatui::{backend::TestBackend, buffer::Buffer, Terminal};
    use std::time::Duration;

    fn draw_buffer(state: &mut AppState, now: Instant) -> Buffer {
        let mut terminal = Terminal::new(TestBackend::new(100, 30)).unwrap();
        terminal.draw(|f| render(f, state, now)).unwrap();
        terminal.backend().buffer().clone()
    }

    fn draw(state: &mut AppState, now: Instant) -> String {
        let buffer = draw_buffer(state, now);
        let mut text = String::new();
        for y in 0..buffer.area.height {
            for x in 0..buffer.area.width {
                text.push_str(buffer[(x, y)].symbol());
            }
            text.push('\n');
        }
        text
    }

    /// Cells painted with the red test thumbnail.
    fn red_cells(buffer: &Buffer) -> usize {
        let is_red = |color: Color| matches!(color, Color::Rgb(r, g, b) if r > 200 && g < 60 && b < 60);
        buffer
            .content()
            .iter()
            .filter(|cell| is_red(cell.fg) || is_red(cell.bg))
            .count()
    }

    fn state_with_results() -> AppState {
        let (service, _) = static_service(Vec::new());
        let mut state = AppState::new(service, &Config::default());
        state.results.apply(
            FetchEvent::Completed {
                cycle: 1,
                images: sample_images(),
            },
            Instant::now(),
        );
        state
    }

    /// Results whose first row has a loaded thumbnail; the second row's
    /// download fails.
    fn state_with_thumbnails() -> AppState {
        let wheel = sample_images()[0].url.clone();
        let mut state = state_with_results().with_thumbnails(red_thumbnails(&[wheel.as_str()]));
        state.thumbnails.sync(state.results.rows());
        settle(&mut state.thumbnails);
        state
    }

    #[test]
    fn renders_a_row_per_thumbnail() {
        let mut state = state_with_results();
        let screen = draw(&mut state, Instant::now());

        assert_eq!(screen.matches("https://upload.wikimedia.org/").count(), 2);
        assert!(screen.contains("Ferris wheel"));
        assert!(screen.contains("Ferrari"));
        assert!(!screen.contains("Ferrite"));
        assert!(screen.contains("Images [2]"));
    }

    #[test]
    fn thumbnails_are_drawn_beside_their_rows() {
        let mut state = state_with_thumbnails();
        let buffer = draw_buffer(&mut state, Instant::now());
        let screen = draw(&mut state, Instant::now());

        assert!(red_cells(&buffer) > 0);
        assert!(screen.contains("Ferris wheel"));
        assert!(screen.contains("Ferrari"));
        assert!(screen.contains("no image"));
    }

    #[test]
    fn text_rows_without_image_support() {
        let mut state = state_with_results();
        let buffer = draw_buffer(&mut state, Instant::now());
        assert_eq!(red_cells(&buffer), 0);
        assert!(!draw(&mut state, Instant::now()).contains("loading"));
    }

    #[test]
    fn empty_state_invites_typing() {
        let (service, _) = static_service(Vec::new());
        let mut state = AppState::new(service, &Config::default());
        let screen = draw(&mut state, Instant::now());
        assert!(screen.contains("Start typing to search Wikipedia"));
        assert!(screen.contains("https://en.wikipedia.org/w/api.php"));
    }

    #[test]
    fn error_toast_shows_in_the_status_bar() {
        let mut state = state_with_results();
        state.results.apply(
            FetchEvent::Failed {
                cycle: 2,
                failure: FetchFailure {
                    kind: ErrorKind::Network,
                    message: "timed out".into(),
                },
            },
            Instant::now(),
        );
        let screen = draw(&mut state, Instant::now());
        assert!(screen.contains("Error: Could not fetch images"));
        assert!(screen.contains("Ferris wheel"));
    }

    #[test]
    fn very_long_query_keeps_the_cursor_in_the_box() {
        let mut state = state_with_results();
        state.query = "x".repeat(70_000);
        state.cursor_position = state.query.len();

        let mut terminal = Terminal::new(TestBackend::new(100, 30)).unwrap();
        terminal
            .draw(|f| render(f, &mut state, Instant::now()))
            .unwrap();
        let cursor = terminal.get_cursor_position().unwrap();
        assert!(cursor.x < 100);
    }

    #[test]
    fn zoom_overlay_covers_the_list() {
        let mut state = state_with_results();
        let t0 = Instant::now();
        assert!(state.show_selected_image(t0));

        let screen = draw(&mut state, t0 + Duration::from_millis(300));
        assert!(screen.contains("Ferris wheel"));
        assert!(screen.contains("Press any key to close"));
        assert!(!screen.contains("Ferrari"));
    }

    #[test]
    fn zoomed_picture_appears_as_the_overlay_fades_in() {
        let mut state = state_with_thumbnails();
        let t0 = Instant::now();
        assert!(state.show_selected_image(t0));

        let early = draw_buffer(&mut state, t0 + Duration::from_millis(30));
        assert_eq!(red_cells(&early), 0);

        let opaque = draw_buffer(&mut state, t0 + Duration::from_millis(300));
        assert!(red_cells(&opaque) > 0);
        assert!(draw(&mut state, t0 + Duration::from_millis(300)).contains("Press any key to close"));
    }

    #[test]
    fn fade_scales_towards_black() {
        assert_eq!(faded((255, 255, 255), 1.0), Color::Rgb(255, 255, 255));
        assert_eq!(faded((255, 128, 0), 0.0), Color::Rgb(0, 0, 0));
        assert_eq!(faded((200, 100, 0), 0.5), Color::Rgb(100, 50, 0));
    }
}
