use std::fs::File;
use std::path::PathBuf;
use std::sync::Mutex;
use std::time::Duration;

use anyhow::{Context, Result};
use clap::Parser;
use tokio::sync::mpsc;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

use logpane_core::{
    AutoScrollPolicy, Control, FilterHistory, LogSink, LogView, SinkLayer, ViewEvent,
};
use logpane_tui::{
    Action, AppState, Event, EventHandler, KeyBindings, KeyContext, LogViewerScreen,
    StyleEditorState, StyleField, Tui,
};

mod config;
mod demo;

use config::{Config, Overrides, Settings};
use demo::Generator;

/// Logpane - a live, filterable terminal view over an application's own logs
#[derive(Parser, Debug)]
#[command(name = "logpane")]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Config file (default: <config dir>/logpane/config.toml if present)
    #[arg(long, value_name = "PATH")]
    config: Option<PathBuf>,

    /// Maximum number of entries kept, 0 for unbounded
    #[arg(long)]
    max_entries: Option<usize>,

    /// Auto-scroll policy: manual, always or smart
    #[arg(long, value_name = "POLICY")]
    auto_scroll: Option<AutoScrollPolicy>,

    /// Filter history file
    #[arg(long, value_name = "PATH")]
    history: Option<PathBuf>,

    /// Tracing filter directive (overrides RUST_LOG)
    #[arg(long, value_name = "DIRECTIVE")]
    log_level: Option<String>,

    /// Also write tracing output to this file
    #[arg(long, value_name = "PATH")]
    log_file: Option<PathBuf>,

    /// Refresh interval in milliseconds
    #[arg(long, default_value = "100")]
    tick_ms: u64,

    /// Demo threads spawned by `M`
    #[arg(long, default_value = "4")]
    threads: usize,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    // Run the application
    let result = run(args).await;

    // Handle any errors
    if let Err(e) = &result {
        eprintln!("Error: {:#}", e);
    }

    result
}

async fn run(args: Args) -> Result<()> {
    let config = Config::discover(args.config.as_deref())?;
    let settings = Settings::resolve(
        config,
        Overrides {
            max_entries: args.max_entries,
            auto_scroll: args.auto_scroll,
            history_path: args.history.clone(),
        },
    )?;

    let sink = LogSink::new();
    init_tracing(&args, sink.clone())?;

    run_app(settings, sink, &args).await
}

/// Route tracing into the viewer; nothing goes to stderr while the
/// terminal is in raw mode.
fn init_tracing(args: &Args, sink: LogSink) -> Result<()> {
    let filter = match &args.log_level {
        Some(directive) => EnvFilter::try_new(directive)
            .with_context(|| format!("Invalid log level '{directive}'"))?,
        None => EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
    };

    let file_layer = match &args.log_file {
        Some(path) => {
            let file = File::create(path)
                .with_context(|| format!("Failed to create log file {}", path.display()))?;
            Some(
                tracing_subscriber::fmt::layer()
                    .with_writer(Mutex::new(file))
                    .with_ansi(false),
            )
        }
        None => None,
    };

    tracing_subscriber::registry()
        .with(filter)
        .with(SinkLayer::new(sink))
        .with(file_layer)
        .try_init()
        .context("Failed to install tracing subscriber")?;
    Ok(())
}

async fn run_app(settings: Settings, sink: LogSink, args: &Args) -> Result<()> {
    // Create action channel
    let (action_tx, mut action_rx) = mpsc::unbounded_channel::<Action>();

    // Initialize state
    let mut state = AppState::new();
    let mut view = LogView::new(settings.max_entries, settings.auto_scroll);
    view.attach_sink(&sink);
    for edit in &settings.styles {
        view.apply_style_edit(edit)?;
    }
    view.sync_toolbar(&mut state.ui_state.filter_bar);
    view.drain_events();

    let mut history = FilterHistory::load(&settings.history_path);
    let generator = Generator::new(sink.clone());

    // Initialize TUI
    let mut tui = Tui::new()?;

    // Initialize event handler
    let mut events = EventHandler::new(Duration::from_millis(args.tick_ms.max(10)));

    // Initialize keybindings
    let keybindings = KeyBindings::new();

    info!(
        max_entries = ?settings.max_entries,
        policy = settings.auto_scroll.label(),
        history = history.len(),
        "logpane started"
    );

    // Initial render
    render(&mut tui, &mut state, &view, &sink)?;

    // Main event loop
    loop {
        tokio::select! {
            // Handle terminal events
            Some(event) = events.next() => {
                match event {
                    Event::Key(key) => {
                        let action = if state.ui_state.style_editor.is_some() {
                            keybindings.get_style_editor_action(&key)
                        } else if state.ui_state.filter_bar.focused {
                            keybindings.get_filter_input_action(&key)
                        } else {
                            keybindings.get_action(KeyContext::LogViewer, &key)
                        };

                        if let Some(action) = action {
                            let _ = action_tx.send(action);
                        }
                    }
                    Event::Tick => {
                        let _ = action_tx.send(Action::Tick);
                    }
                    Event::Resize(_, _) => {
                        let _ = action_tx.send(Action::Render);
                    }
                    Event::Error(e) => {
                        state.show_error(e);
                    }
                }
            }

            // Handle user actions
            Some(action) = action_rx.recv() => {
                let mut ctx = ActionContext {
                    state: &mut state,
                    view: &mut view,
                    history: &mut history,
                    generator: &generator,
                    threads: args.threads,
                };
                ctx.handle(action);
                ctx.apply_view_events();
            }
        }

        if state.should_quit {
            break;
        }

        render(&mut tui, &mut state, &view, &sink)?;
    }

    // Cleanup
    view.detach_sink();
    events.shutdown();
    tui.restore()?;

    Ok(())
}

/// Everything an action may touch
struct ActionContext<'a> {
    state: &'a mut AppState,
    view: &'a mut LogView,
    history: &'a mut FilterHistory,
    generator: &'a Generator,
    threads: usize,
}

impl ActionContext<'_> {
    fn handle(&mut self, action: Action) {
        let ui = &mut self.state.ui_state;

        match action {
            Action::Quit => {
                self.state.should_quit = true;
            }
            Action::ToggleHelp => {
                ui.help_visible = !ui.help_visible;
            }
            Action::GoBack => {
                if ui.help_visible {
                    ui.help_visible = false;
                } else if ui.style_editor.is_some() {
                    ui.style_editor = None;
                } else if ui.filter_bar.focused {
                    ui.filter_bar.unfocus();
                } else if ui.error_message.is_some() {
                    self.state.dismiss_error();
                }
            }

            // Scrolling
            Action::ScrollUp(n) => {
                ui.scroll.scroll_up(n);
            }
            Action::ScrollDown(n) => {
                ui.scroll.scroll_down(n, self.view.visible_count());
            }
            Action::PageUp => {
                let page = ui.scroll.page();
                ui.scroll.scroll_up(page);
            }
            Action::PageDown => {
                let page = ui.scroll.page();
                ui.scroll.scroll_down(page, self.view.visible_count());
            }
            Action::ScrollToTop => {
                ui.scroll.to_top();
            }
            Action::ScrollToBottom => {
                ui.scroll.to_bottom(self.view.visible_count());
            }
            Action::CycleAutoScroll => {
                let next = self.view.auto_scroll_policy().next();
                self.control(Control::AutoScrollPolicyIndex(next.index()));
            }

            // Filter bar
            Action::OpenFilter => {
                ui.filter_bar.focus();
            }
            Action::CloseFilter => {
                ui.filter_bar.unfocus();
            }
            Action::FilterInput(c) => {
                ui.filter_bar.input_char(c);
                self.apply_filter();
            }
            Action::FilterBackspace => {
                ui.filter_bar.backspace();
                self.apply_filter();
            }
            Action::FilterClear => {
                ui.filter_bar.clear();
                self.apply_filter();
            }
            Action::FilterComplete => {
                if ui.filter_bar.complete(self.history) {
                    self.apply_filter();
                }
            }
            Action::CommitFilter => {
                ui.filter_bar.unfocus();
                let text = ui.filter_bar.input.clone();
                self.control(Control::FilterCommitted(text));
            }
            Action::ClearFilter => {
                ui.filter_bar.clear();
                self.apply_filter();
            }
            Action::ToggleRegex => {
                ui.filter_bar.toggle_regex();
                self.apply_filter();
            }
            Action::ToggleCaseSensitive => {
                ui.filter_bar.toggle_case_sensitive();
                self.apply_filter();
            }
            Action::ClearHistory => {
                self.control(Control::ClearHistory);
            }

            // Display
            Action::ToggleColumn(column) => {
                if !ui.columns.toggle(column) {
                    self.state.show_error("At least one column must stay visible");
                }
            }
            Action::ToggleStats => {
                ui.stats_visible = !ui.stats_visible;
            }
            Action::ClearEntries => {
                ui.scroll.to_top();
                self.control(Control::ClearEntries);
            }

            // Style editor, opened on the top row's logger
            Action::OpenStyleEditor => {
                let logger = self
                    .view
                    .visible(ui.scroll.offset)
                    .map(|entry| entry.logger_name.clone())
                    .unwrap_or_default();
                ui.style_editor = Some(StyleEditorState::open(&logger, self.view.styles()));
            }
            Action::StyleEditorNextField => {
                if let Some(editor) = &mut ui.style_editor {
                    if editor.focus == StyleField::Logger {
                        editor.reload(self.view.styles());
                    }
                    editor.next_field();
                }
            }
            Action::StyleEditorPrevField => {
                if let Some(editor) = &mut ui.style_editor {
                    editor.prev_field();
                }
            }
            Action::StyleEditorInput(c) => {
                if let Some(editor) = &mut ui.style_editor {
                    editor.input_char(c);
                }
            }
            Action::StyleEditorBackspace => {
                if let Some(editor) = &mut ui.style_editor {
                    editor.backspace();
                }
            }
            Action::StyleEditorToggleBold => {
                if let Some(editor) = &mut ui.style_editor {
                    editor.toggle_bold();
                }
            }
            Action::StyleEditorCommit => {
                let edit = ui.style_editor.as_mut().and_then(|editor| editor.commit());
                if let Some(edit) = edit {
                    ui.style_editor = None;
                    self.control(Control::StyleEditCommitted(edit));
                }
            }
            Action::StyleEditorClose => {
                ui.style_editor = None;
            }

            // Demo traffic
            Action::Generate => {
                self.generator.burst();
            }
            Action::GenerateMultiple => {
                if let Err(e) = self.generator.spawn_threads(self.threads) {
                    self.state.show_error(format!("Failed to spawn threads: {e}"));
                }
            }

            Action::ShowError(msg) => {
                self.state.show_error(msg);
            }
            Action::DismissError => {
                self.state.dismiss_error();
            }
            Action::Tick => {
                self.view.pump(&self.state.ui_state.scroll);
            }
            Action::Render => {
                // Render happens after every action
            }
        }
    }

    fn apply_filter(&mut self) {
        self.view.apply_toolbar_filter(&self.state.ui_state.filter_bar);
    }

    fn control(&mut self, control: Control) {
        if let Err(e) = self.view.handle(control, self.history) {
            warn!("{e}");
            self.state.show_error(e.to_string());
        }
    }

    /// Reflect view notifications in the UI state
    fn apply_view_events(&mut self) {
        let ui = &mut self.state.ui_state;
        for event in self.view.drain_events() {
            match event {
                ViewEvent::ScrollToNewest => {
                    ui.scroll.to_bottom(self.view.visible_count());
                }
                ViewEvent::FilterChanged(status) => {
                    ui.filter_bar.set_status(&status);
                }
                ViewEvent::AutoScrollPolicyChanged(_) => {
                    self.view.sync_toolbar(&mut ui.filter_bar);
                }
                // Rows and styles are redrawn every frame
                ViewEvent::Rows(_) | ViewEvent::StyleChanged { .. } => {}
            }
        }
    }
}

fn render(tui: &mut Tui, state: &mut AppState, view: &LogView, sink: &LogSink) -> Result<()> {
    let dropped = sink.dropped();
    tui.terminal().draw(|frame| {
        LogViewerScreen::render(frame, state, view, dropped);
    })?;
    Ok(())
}
