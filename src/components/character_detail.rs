use crossterm::event::KeyCode;
use ratatui::{
    Frame,
    layout::Rect,
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::Paragraph,
};
use tui_dispatch::EventKind;
use tui_dispatch_components::{
    BaseStyle, Modal, ModalBehavior, ModalProps, ModalStyle, Padding, centered_rect,
};

use super::Component;
use crate::action::Action;
use crate::state::{AppState, Character, CharacterStatus};

/// Modal showing the selected character's details
#[derive(Default)]
pub struct CharacterDetail {
    modal: Modal,
}

pub struct CharacterDetailProps<'a> {
    pub state: &'a AppState,
    pub is_focused: bool,
}

impl CharacterDetail {
    pub fn new() -> Self {
        Self::default()
    }

    fn lines(state: &AppState, character: &Character) -> Vec<Line<'static>> {
        let field = |label: &str, value: String| {
            Line::from(vec![
                Span::styled(format!("{label:<12}"), Style::default().fg(Color::DarkGray)),
                Span::raw(value),
            ])
        };
        let status_color = match character.status {
            CharacterStatus::Alive => Color::Green,
            CharacterStatus::Dead => Color::Red,
            CharacterStatus::Unknown => Color::DarkGray,
        };
        let species = if character.kind.is_empty() {
            character.species.clone()
        } else {
            format!("{} ({})", character.species, character.kind)
        };
        let first_seen = state
            .episode_name_for(character)
            .map(String::from)
            .unwrap_or_else(|| "loading...".to_string());
        let favorite = if state.favorites.is_favorite(character.id) {
            "★ yes"
        } else {
            "no"
        };

        vec![
            Line::from(Span::styled(
                character.name.clone(),
                Style::default().add_modifier(Modifier::BOLD),
            )),
            Line::default(),
            Line::from(vec![
                Span::styled("Status      ", Style::default().fg(Color::DarkGray)),
                Span::styled(
                    character.status.as_str().to_string(),
                    Style::default().fg(status_color),
                ),
            ]),
            field("Species", species),
            field("Gender", character.gender.as_str().to_string()),
            field("Origin", character.origin.name.clone()),
            field("Location", character.location.name.clone()),
            field("First seen", first_seen),
            field("Favorite", favorite.to_string()),
            Line::default(),
            Line::from(Span::styled(
                "Esc close  f favorite",
                Style::default().fg(Color::DarkGray),
            )),
        ]
    }
}

impl Component<Action> for CharacterDetail {
    type Props<'a> = CharacterDetailProps<'a>;

    fn handle_event(
        &mut self,
        event: &EventKind,
        props: Self::Props<'_>,
    ) -> impl IntoIterator<Item = Action> {
        if !props.is_focused {
            return None;
        }

        match event {
            EventKind::Key(key) => match key.code {
                KeyCode::Esc | KeyCode::Enter => Some(Action::DetailClose),
                KeyCode::Char('f') => Some(Action::ToggleFavorite),
                _ => None,
            },
            _ => None,
        }
    }

    fn render(&mut self, frame: &mut Frame, area: Rect, props: Self::Props<'_>) {
        let Some(character) = props.state.selected_character() else {
            return;
        };
        if area.width < 30 || area.height < 14 {
            return;
        }

        let lines = Self::lines(props.state, character);
        let modal_area = centered_rect(50, 14, area);
        let mut render_content = |frame: &mut Frame, content_area: Rect| {
            frame.render_widget(Paragraph::new(lines.clone()), content_area);
        };

        self.modal.render(
            frame,
            area,
            ModalProps {
                is_open: true,
                is_focused: props.is_focused,
                area: modal_area,
                style: ModalStyle {
                    base: BaseStyle {
                        bg: Some(Color::Rgb(35, 35, 45)),
                        padding: Padding::all(1),
                        border: None,
                        fg: None,
                    },
                    ..Default::default()
                },
                behavior: ModalBehavior::default(),
                on_close: || Action::DetailClose,
                render_content: &mut render_content,
            },
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::state::{CharacterGender, LocationRef};
    use tui_dispatch::testing::*;

    fn state() -> AppState {
        let mut state = AppState::default();
        state.characters = vec![Character {
            id: 1,
            name: "Rick Sanchez".into(),
            status: CharacterStatus::Alive,
            species: "Human".into(),
            kind: String::new(),
            gender: CharacterGender::Male,
            origin: LocationRef {
                name: "Earth (C-137)".into(),
                url: String::new(),
            },
            location: LocationRef {
                name: "Citadel of Ricks".into(),
                url: String::new(),
            },
            image: String::new(),
            episode: vec!["https://rickandmortyapi.com/api/episode/1".into()],
        }];
        state.detail_open = true;
        state
    }

    #[test]
    fn test_escape_closes() {
        let mut component = CharacterDetail::new();
        let state = state();
        let esc = crossterm::event::KeyEvent::new(
            KeyCode::Esc,
            crossterm::event::KeyModifiers::NONE,
        );

        let actions: Vec<_> = component
            .handle_event(
                &EventKind::Key(esc),
                CharacterDetailProps {
                    state: &state,
                    is_focused: true,
                },
            )
            .into_iter()
            .collect();
        actions.assert_first(Action::DetailClose);
    }

    #[test]
    fn test_render_shows_episode_name_once_resolved() {
        let mut render = RenderHarness::new(80, 24);
        let mut component = CharacterDetail::new();
        let mut state = state();
        state.episode_names.insert(
            "https://rickandmortyapi.com/api/episode/1".into(),
            "Pilot".into(),
        );

        let output = render.render_to_string_plain(|frame| {
            component.render(
                frame,
                frame.area(),
                CharacterDetailProps {
                    state: &state,
                    is_focused: true,
                },
            );
        });
        assert!(output.contains("Rick Sanchez"));
        assert!(output.contains("Pilot"));
        assert!(output.contains("Citadel of Ricks"));
    }

    #[test]
    fn test_render_pending_episode_shows_loading() {
        let mut render = RenderHarness::new(80, 24);
        let mut component = CharacterDetail::new();
        let state = state();

        let output = render.render_to_string_plain(|frame| {
            component.render(
                frame,
                frame.area(),
                CharacterDetailProps {
                    state: &state,
                    is_focused: true,
                },
            );
        });
        assert!(output.contains("loading..."));
    }
}
