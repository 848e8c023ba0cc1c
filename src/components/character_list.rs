use crossterm::event::KeyCode;
use ratatui::{
    Frame,
    layout::{Constraint, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::Paragraph,
};
use tui_dispatch::EventKind;
use tui_dispatch_components::{
    BaseStyle, Padding, ScrollbarStyle, SelectList, SelectListBehavior, SelectListProps,
    SelectListStyle, SelectionStyle, StatusBar, StatusBarHint, StatusBarProps, StatusBarSection,
    StatusBarStyle,
};

use super::Component;
use crate::action::Action;
use crate::state::{AppState, Character, CharacterStatus, FilterTab};

/// The main character list view
pub struct CharacterList {
    list: SelectList,
}

pub struct CharacterListProps<'a> {
    pub state: &'a AppState,
    pub is_focused: bool,
}

impl Default for CharacterList {
    fn default() -> Self {
        Self {
            list: SelectList::new(),
        }
    }
}

impl CharacterList {
    pub fn new() -> Self {
        Self::default()
    }

    fn row(state: &AppState, character: &Character) -> Line<'static> {
        let star = if state.favorites.is_favorite(character.id) {
            Span::styled("★ ", Style::default().fg(Color::Yellow))
        } else {
            Span::raw("  ")
        };
        let status = Span::styled(
            format!("● {} ", character.status.as_str()),
            Style::default().fg(status_color(character.status)),
        );
        Line::from(vec![
            star,
            Span::styled(
                character.name.clone(),
                Style::default().add_modifier(Modifier::BOLD),
            ),
            Span::raw("  "),
            status,
            Span::styled(
                character.species.clone(),
                Style::default().fg(Color::DarkGray),
            ),
        ])
    }

    fn header(state: &AppState) -> Line<'static> {
        let mut spans = vec![
            Span::styled(
                format!(" {} ", state.filters.current_tab.label()),
                Style::default()
                    .fg(Color::Black)
                    .bg(Color::Cyan)
                    .add_modifier(Modifier::BOLD),
            ),
            Span::raw(" "),
            Span::styled(
                format!("{}/{}", state.characters.len(), state.total_count),
                Style::default().fg(Color::Gray),
            ),
        ];
        if state.filters.has_active_filters() {
            spans.push(Span::styled(
                format!("  [{}]", active_filter_summary(state)),
                Style::default().fg(Color::Yellow),
            ));
        }
        if state.list_loading {
            spans.push(Span::styled(
                "  loading...",
                Style::default().fg(Color::DarkGray),
            ));
        }
        if let Some(message) = &state.message {
            spans.push(Span::styled(
                format!("  {message}"),
                Style::default().fg(Color::Red),
            ));
        }
        Line::from(spans)
    }
}

fn status_color(status: CharacterStatus) -> Color {
    match status {
        CharacterStatus::Alive => Color::Green,
        CharacterStatus::Dead => Color::Red,
        CharacterStatus::Unknown => Color::DarkGray,
    }
}

fn active_filter_summary(state: &AppState) -> String {
    let filters = &state.filters;
    let mut parts = Vec::new();
    let term = filters.search_term.trim();
    if !term.is_empty() {
        parts.push(format!("name: {term}"));
    }
    if let Some(status) = filters.active.status {
        parts.push(format!("status: {}", status.as_str()));
    }
    if let Some(species) = &filters.active.species {
        parts.push(format!("species: {species}"));
    }
    if let Some(gender) = filters.active.gender {
        parts.push(format!("gender: {}", gender.as_str()));
    }
    parts.join(", ")
}

fn list_style() -> SelectListStyle {
    SelectListStyle {
        base: BaseStyle {
            border: None,
            padding: Padding::xy(1, 0),
            bg: None,
            fg: None,
        },
        selection: SelectionStyle::default(),
        scrollbar: ScrollbarStyle::default(),
    }
}

impl Component<Action> for CharacterList {
    type Props<'a> = CharacterListProps<'a>;

    fn handle_event(
        &mut self,
        event: &EventKind,
        props: Self::Props<'_>,
    ) -> impl IntoIterator<Item = Action> {
        if !props.is_focused {
            return Vec::new();
        }

        let EventKind::Key(key) = event else {
            return Vec::new();
        };

        let state = props.state;
        match key.code {
            KeyCode::Up | KeyCode::Down | KeyCode::PageUp | KeyCode::PageDown | KeyCode::Home
            | KeyCode::End => {
                // Past the last loaded row: pull the next page.
                if key.code == KeyCode::Down
                    && state.has_more
                    && !state.characters.is_empty()
                    && state.selected_index + 1 == state.characters.len()
                {
                    return vec![Action::LoadMore];
                }
                let items: Vec<Line<'static>> = state
                    .characters
                    .iter()
                    .map(|character| Self::row(state, character))
                    .collect();
                self.list
                    .handle_event(
                        event,
                        SelectListProps {
                            items: &items,
                            count: items.len(),
                            selected: state.selected_index,
                            is_focused: true,
                            style: list_style(),
                            behavior: SelectListBehavior::default(),
                            on_select: Action::CharacterSelect,
                            render_item: &|item| item.clone(),
                        },
                    )
                    .into_iter()
                    .collect()
            }
            KeyCode::Enter => vec![Action::DetailOpen],
            KeyCode::Char('f') => vec![Action::ToggleFavorite],
            KeyCode::Char('/') => vec![Action::SearchOpen],
            KeyCode::Char('t') => vec![Action::TabToggle],
            KeyCode::Char('n') => vec![Action::LoadMore],
            KeyCode::Char('r') | KeyCode::F(5) => vec![Action::Refresh],
            KeyCode::Char('s') => vec![Action::FilterCycleStatus],
            KeyCode::Char('g') => vec![Action::FilterCycleGender],
            KeyCode::Char('c') => vec![Action::FilterCycleSpecies],
            KeyCode::Char('x') => vec![Action::FiltersClear],
            _ => Vec::new(),
        }
    }

    fn render(&mut self, frame: &mut Frame, area: Rect, props: Self::Props<'_>) {
        let state = props.state;
        let chunks = Layout::vertical([
            Constraint::Length(1), // Header
            Constraint::Min(1),    // List
            Constraint::Length(1), // Help bar
        ])
        .split(area);

        frame.render_widget(Paragraph::new(Self::header(state)), chunks[0]);

        if let Some(error) = &state.list_error {
            let line = Line::from(vec![
                Span::styled("Error: ", Style::default().fg(Color::Red)),
                Span::raw(error.clone()),
                Span::styled("  (r to retry)", Style::default().fg(Color::DarkGray)),
            ]);
            frame.render_widget(Paragraph::new(line), chunks[1]);
        } else if state.characters.is_empty() {
            let text = if state.list_loading {
                "Loading characters..."
            } else if state.filters.current_tab == FilterTab::Favorites {
                "No favorites yet. Press f on a character to add one."
            } else {
                "No characters found."
            };
            frame.render_widget(
                Paragraph::new(Line::from(Span::styled(
                    text,
                    Style::default().fg(Color::DarkGray),
                ))),
                chunks[1],
            );
        } else {
            let items: Vec<Line<'static>> = state
                .characters
                .iter()
                .map(|character| Self::row(state, character))
                .collect();
            self.list.render(
                frame,
                chunks[1],
                SelectListProps {
                    items: &items,
                    count: items.len(),
                    selected: state.selected_index,
                    is_focused: props.is_focused,
                    style: list_style(),
                    behavior: SelectListBehavior::default(),
                    on_select: Action::CharacterSelect,
                    render_item: &|item| item.clone(),
                },
            );
        }

        let mut status_bar = StatusBar::new();
        <StatusBar as Component<Action>>::render(
            &mut status_bar,
            frame,
            chunks[2],
            StatusBarProps {
                left: StatusBarSection::empty(),
                center: StatusBarSection::hints(&[
                    StatusBarHint::new("/", "search"),
                    StatusBarHint::new("f", "favorite"),
                    StatusBarHint::new("t", "tab"),
                    StatusBarHint::new("s/g/c", "filters"),
                    StatusBarHint::new("x", "clear"),
                    StatusBarHint::new("q", "quit"),
                ]),
                right: StatusBarSection::empty(),
                style: StatusBarStyle::default(),
                is_focused: false,
            },
        );
    }
}
