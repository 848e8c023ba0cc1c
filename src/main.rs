//! mortydex - Rick and Morty character browser TUI

use std::cell::RefCell;
use std::io;
use std::path::PathBuf;
use std::rc::Rc;
use std::time::Duration;

use clap::Parser;
use crossterm::{
    event::{DisableMouseCapture, EnableMouseCapture},
    execute,
    terminal::{EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode},
};
use ratatui::{Frame, Terminal, backend::CrosstermBackend, layout::Rect};
use tui_dispatch::{
    EffectContext, EffectStoreLike, EffectStoreWithMiddleware, EventBus, EventContext, EventKind,
    EventRoutingState, HandlerResponse, Keybindings, RenderContext, TaskKey,
};
use tui_dispatch_components::centered_rect;
use tui_dispatch_debug::debug::DebugLayer;
use tui_dispatch_debug::{
    DebugCliArgs, DebugRunOutput, DebugSession, DebugSessionError, ReplayItem,
};

use mortydex::action::Action;
use mortydex::api::{ApiClient, CharacterGateway, EpisodeGateway};
use mortydex::components::{
    CharacterDetail, CharacterDetailProps, CharacterList, CharacterListProps, Component,
    SearchOverlay, SearchOverlayProps,
};
use mortydex::effect::Effect;
use mortydex::episode_cache::EpisodeNameCache;
use mortydex::reducer::reducer;
use mortydex::state::AppState;
use mortydex::storage;

/// Keyed task shared by every character list fetch. Issuing a new fetch
/// under the same key aborts the in-flight one.
const CHARACTERS_TASK: &str = "characters";

const SEARCH_DEBOUNCE_MS: u64 = 300;

#[derive(Parser, Debug)]
#[command(name = "mortydex")]
#[command(about = "Browse Rick and Morty characters from the terminal")]
struct Args {
    /// Initial name search term
    #[arg(long, short)]
    name: Option<String>,

    /// Path to the favorites file (defaults to ~/.local/share/mortydex/favorites.json)
    #[arg(long)]
    favorites_path: Option<PathBuf>,

    #[command(flatten)]
    debug: DebugCliArgs,
}

#[derive(tui_dispatch::ComponentId, Clone, Copy, PartialEq, Eq, Hash, Debug)]
enum MortyComponentId {
    List,
    Detail,
    Search,
}

#[derive(tui_dispatch::BindingContext, Clone, Copy, PartialEq, Eq, Hash)]
enum MortyContext {
    List,
    Detail,
    Search,
}

impl EventRoutingState<MortyComponentId, MortyContext> for AppState {
    fn focused(&self) -> Option<MortyComponentId> {
        if self.search_active {
            Some(MortyComponentId::Search)
        } else if self.detail_open {
            Some(MortyComponentId::Detail)
        } else {
            Some(MortyComponentId::List)
        }
    }

    fn modal(&self) -> Option<MortyComponentId> {
        if self.search_active {
            Some(MortyComponentId::Search)
        } else if self.detail_open {
            Some(MortyComponentId::Detail)
        } else {
            None
        }
    }

    fn binding_context(&self, id: MortyComponentId) -> MortyContext {
        match id {
            MortyComponentId::List => MortyContext::List,
            MortyComponentId::Detail => MortyContext::Detail,
            MortyComponentId::Search => MortyContext::Search,
        }
    }

    fn default_context(&self) -> MortyContext {
        MortyContext::List
    }
}

#[tokio::main]
async fn main() -> io::Result<()> {
    let Args {
        name,
        favorites_path,
        debug: debug_args,
    } = Args::parse();

    let debug = DebugSession::new(debug_args);

    let state = debug
        .load_state_or_else_async(move || async move {
            let mut state = AppState::default();
            if let Some(name) = name {
                state.filters.search_term = name;
            }
            Ok::<AppState, io::Error>(state)
        })
        .await
        .map_err(debug_error)?;

    let replay_actions = debug.load_replay_items().map_err(debug_error)?;

    let (middleware, action_recorder) = debug.middleware_with_recorder();
    let store = EffectStoreWithMiddleware::new(state, reducer, middleware);

    let client = ApiClient::new();
    let characters = CharacterGateway::new(client.clone());
    let episodes = EpisodeGateway::new(client);
    let episode_cache = EpisodeNameCache::new(episodes);
    let favorites_path = favorites_path.unwrap_or_else(storage::default_favorites_path);

    // ===== Terminal setup =====
    let use_alt_screen = debug.use_alt_screen();
    let mut stdout = io::stdout();
    if use_alt_screen {
        enable_raw_mode()?;
        execute!(stdout, EnterAlternateScreen, EnableMouseCapture)?;
    }
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let result = run_app(
        &mut terminal,
        &debug,
        store,
        characters,
        episode_cache.clone(),
        favorites_path,
        replay_actions,
    )
    .await;

    episode_cache.shutdown();

    // ===== Cleanup =====
    if use_alt_screen {
        disable_raw_mode()?;
        execute!(
            terminal.backend_mut(),
            LeaveAlternateScreen,
            DisableMouseCapture
        )?;
        terminal.show_cursor()?;
    }

    let run_output = result?;
    run_output.write_render_output()?;
    debug
        .save_actions(action_recorder.as_ref())
        .map_err(debug_error)?;

    Ok(())
}

struct MortyUi {
    list: CharacterList,
    detail: CharacterDetail,
    search: SearchOverlay,
}

impl MortyUi {
    fn new() -> Self {
        Self {
            list: CharacterList::new(),
            detail: CharacterDetail::new(),
            search: SearchOverlay::new(),
        }
    }

    fn render(
        &mut self,
        frame: &mut Frame,
        area: Rect,
        state: &AppState,
        render_ctx: RenderContext,
        event_ctx: &mut EventContext<MortyComponentId>,
    ) {
        event_ctx.set_component_area(MortyComponentId::List, area);

        let overlay_open = state.search_active || state.detail_open;
        self.list.render(
            frame,
            area,
            CharacterListProps {
                state,
                is_focused: render_ctx.is_focused() && !overlay_open,
            },
        );

        if state.detail_open {
            let modal_area = centered_rect(50, 14, area);
            event_ctx.set_component_area(MortyComponentId::Detail, modal_area);
            self.detail.render(
                frame,
                area,
                CharacterDetailProps {
                    state,
                    is_focused: render_ctx.is_focused() && !state.search_active,
                },
            );
        } else {
            event_ctx.component_areas.remove(&MortyComponentId::Detail);
        }

        self.search.set_open(state.search_active);
        if state.search_active {
            let modal_area = centered_rect(60, 6, area);
            event_ctx.set_component_area(MortyComponentId::Search, modal_area);
            self.search.render(
                frame,
                area,
                SearchOverlayProps {
                    query: &state.filters.search_term,
                    is_focused: render_ctx.is_focused(),
                    on_query_change: Action::SearchQueryChange,
                    on_query_submit: Action::SearchQuerySubmit,
                },
            );
        } else {
            event_ctx.component_areas.remove(&MortyComponentId::Search);
        }
    }

    fn handle_list_event(&mut self, event: &EventKind, state: &AppState) -> HandlerResponse<Action> {
        let actions: Vec<_> = self
            .list
            .handle_event(
                event,
                CharacterListProps {
                    state,
                    is_focused: true,
                },
            )
            .into_iter()
            .collect();
        if actions.is_empty() {
            HandlerResponse::ignored()
        } else {
            HandlerResponse {
                actions,
                consumed: true,
                needs_render: false,
            }
        }
    }

    fn handle_detail_event(
        &mut self,
        event: &EventKind,
        state: &AppState,
    ) -> HandlerResponse<Action> {
        let actions: Vec<_> = self
            .detail
            .handle_event(
                event,
                CharacterDetailProps {
                    state,
                    is_focused: true,
                },
            )
            .into_iter()
            .collect();
        HandlerResponse {
            actions,
            consumed: true,
            needs_render: false,
        }
    }

    fn handle_search_event(
        &mut self,
        event: &EventKind,
        state: &AppState,
    ) -> HandlerResponse<Action> {
        self.search.set_open(state.search_active);
        let actions: Vec<_> = self
            .search
            .handle_event(
                event,
                SearchOverlayProps {
                    query: &state.filters.search_term,
                    is_focused: true,
                    on_query_change: Action::SearchQueryChange,
                    on_query_submit: Action::SearchQuerySubmit,
                },
            )
            .into_iter()
            .collect();
        HandlerResponse {
            actions,
            consumed: true,
            needs_render: false,
        }
    }
}

fn debug_error(error: DebugSessionError) -> io::Error {
    io::Error::other(format!("debug session error: {error}"))
}

#[allow(clippy::too_many_arguments)]
async fn run_app<B: ratatui::backend::Backend>(
    terminal: &mut Terminal<B>,
    debug: &DebugSession,
    store: impl EffectStoreLike<AppState, Action, Effect>,
    characters: CharacterGateway,
    episode_cache: EpisodeNameCache,
    favorites_path: PathBuf,
    replay_actions: Vec<ReplayItem<Action>>,
) -> io::Result<DebugRunOutput<AppState>> {
    let ui = Rc::new(RefCell::new(MortyUi::new()));
    let mut bus: EventBus<AppState, Action, MortyComponentId, MortyContext> = EventBus::new();
    let keybindings: Keybindings<MortyContext> = Keybindings::new();

    let ui_list = Rc::clone(&ui);
    bus.register(MortyComponentId::List, move |event, state| {
        ui_list.borrow_mut().handle_list_event(&event.kind, state)
    });

    let ui_detail = Rc::clone(&ui);
    bus.register(MortyComponentId::Detail, move |event, state| {
        ui_detail
            .borrow_mut()
            .handle_detail_event(&event.kind, state)
    });

    let ui_search = Rc::clone(&ui);
    bus.register(MortyComponentId::Search, move |event, state| {
        ui_search
            .borrow_mut()
            .handle_search_event(&event.kind, state)
    });

    bus.register_global(|event, state| match event.kind {
        EventKind::Resize(width, height) => {
            HandlerResponse::action(Action::UiTerminalResize(width, height)).with_render()
        }
        EventKind::Key(key) => match key.code {
            crossterm::event::KeyCode::Char('q') if !state.search_active => {
                HandlerResponse::action(Action::Quit)
            }
            _ => HandlerResponse::ignored(),
        },
        _ => HandlerResponse::ignored(),
    });

    let handle_effect = move |effect: Effect, ctx: &mut EffectContext<Action>| {
        match effect {
            Effect::LoadCharacters {
                seq,
                filters,
                page,
                append,
            } => {
                let gateway = characters.clone();
                ctx.tasks().spawn(TaskKey::new(CHARACTERS_TASK), async move {
                    match gateway.get_characters(&filters, page, None).await {
                        Ok(result) => Action::CharactersDidLoad {
                            seq,
                            page,
                            append,
                            info: result.info,
                            characters: result.characters,
                        },
                        Err(error) => Action::CharactersDidError {
                            seq,
                            error: error.to_string(),
                        },
                    }
                });
            }
            Effect::SearchCharacters { seq, filters } => {
                let gateway = characters.clone();
                ctx.tasks().debounce(
                    CHARACTERS_TASK,
                    Duration::from_millis(SEARCH_DEBOUNCE_MS),
                    async move {
                        match gateway.get_characters(&filters, 1, None).await {
                            Ok(result) => Action::CharactersDidLoad {
                                seq,
                                page: 1,
                                append: false,
                                info: result.info,
                                characters: result.characters,
                            },
                            Err(error) => Action::CharactersDidError {
                                seq,
                                error: error.to_string(),
                            },
                        }
                    },
                );
            }
            Effect::LoadFavoriteCharacters { seq, ids } => {
                let gateway = characters.clone();
                ctx.tasks().spawn(TaskKey::new(CHARACTERS_TASK), async move {
                    match gateway.get_characters_by_ids(&ids, None).await {
                        Ok(characters) => Action::FavoriteCharactersDidLoad { seq, characters },
                        Err(error) => Action::CharactersDidError {
                            seq,
                            error: error.to_string(),
                        },
                    }
                });
            }
            Effect::CancelFetch => {
                ctx.tasks().cancel(&TaskKey::new(CHARACTERS_TASK));
            }
            Effect::LoadEpisodeName { url } => {
                let cache = episode_cache.clone();
                let key = format!("episode_{url}");
                ctx.tasks().spawn(TaskKey::new(key), async move {
                    let name = cache.episode_name(&url).await;
                    Action::EpisodeNameDidLoad { url, name }
                });
            }
            Effect::LoadFavorites => {
                let path = favorites_path.clone();
                ctx.tasks().spawn(TaskKey::new("favorites_load"), async move {
                    match storage::load_favorites(&path).await {
                        Ok(ids) => Action::FavoritesDidLoad(ids),
                        Err(error) => Action::FavoritesDidError(error),
                    }
                });
            }
            Effect::SaveFavorites { ids } => {
                let path = favorites_path.clone();
                ctx.tasks().spawn(TaskKey::new("favorites_save"), async move {
                    match storage::save_favorites(&path, &ids).await {
                        Ok(()) => Action::FavoritesDidSave,
                        Err(error) => Action::FavoritesSaveDidError(error),
                    }
                });
            }
        }
    };

    debug
        .run_effect_app_with_bus(
            terminal,
            store,
            DebugLayer::simple(),
            replay_actions,
            Some(Action::Init),
            Some(Action::Quit),
            |_runtime| {},
            &mut bus,
            &keybindings,
            |frame, area, state, render_ctx, event_ctx| {
                ui.borrow_mut()
                    .render(frame, area, state, render_ctx, event_ctx);
            },
            |action| matches!(action, Action::Quit),
            handle_effect,
        )
        .await
}
