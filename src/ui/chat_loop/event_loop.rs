//! Event polling, dispatching, and UI rendering loop.
//!
//! Terminal input is read on a background task and forwarded over a channel.
//! Each loop iteration drains input, stream updates and queued actions, then
//! redraws at most once per frame.

use std::{
    error::Error,
    io,
    time::{Duration, Instant},
};

use ratatui::crossterm::event::{self, Event, KeyEvent, KeyEventKind};
use ratatui::layout::Rect;
use ratatui::prelude::Size;
use tokio::sync::mpsc;
use tracing::{debug, warn};

use crate::core::app::{
    apply_actions, AppAction, AppActionContext, AppActionDispatcher, AppActionEnvelope, AppCommand,
    AppInitConfig, ComposerKey,
};
use crate::core::chat_stream::{ChatStreamService, StreamMessage};
use crate::ui::renderer::{overlay_inner_area, ui};
use crate::utils::clipboard::copy_to_clipboard;

use super::keybindings::{resolve_key, resolve_mouse, KeyContext, KeyResult};
use super::lifecycle::{restore_terminal, setup_terminal, SharedTerminal};
use super::setup::bootstrap_app;
use super::AppHandle;

const MAX_FPS: u64 = 60;

#[derive(Debug)]
pub enum UiEvent {
    Crossterm(Event),
}

async fn current_terminal_size(terminal: &SharedTerminal) -> Size {
    let terminal_guard = terminal.lock().await;
    terminal_guard.size().unwrap_or_default()
}

async fn try_draw_frame(
    app: &AppHandle,
    terminal: &SharedTerminal,
    request_redraw: &mut bool,
    last_draw: &mut Instant,
    frame_duration: Duration,
) -> io::Result<()> {
    if !*request_redraw {
        return Ok(());
    }

    let now = Instant::now();
    if now.duration_since(*last_draw) < frame_duration {
        return Ok(());
    }

    let mut terminal_guard = terminal.lock().await;
    app.update(|app| terminal_guard.draw(|f| ui(f, app)).map(|_| ()))
        .await?;
    *last_draw = now;
    *request_redraw = false;
    Ok(())
}

struct EventProcessingOutcome {
    events_processed: bool,
    request_redraw: bool,
}

async fn process_ui_events(
    app: &AppHandle,
    event_rx: &mut mpsc::UnboundedReceiver<UiEvent>,
    dispatcher: &AppActionDispatcher,
    term_size: Size,
) -> EventProcessingOutcome {
    let mut outcome = EventProcessingOutcome {
        events_processed: false,
        request_redraw: false,
    };
    let ctx = AppActionContext {
        term_width: term_size.width,
        term_height: term_size.height,
    };

    while let Ok(ev) = event_rx.try_recv() {
        outcome.events_processed = true;
        match ev {
            UiEvent::Crossterm(Event::Key(key)) if key.kind == KeyEventKind::Press => {
                route_keyboard_event(app, dispatcher, key, ctx).await;
            }
            UiEvent::Crossterm(Event::Mouse(mouse)) => {
                let overlay = app
                    .read(|app| {
                        app.comparison.visible.then(|| {
                            overlay_inner_area(
                                Rect::new(0, 0, term_size.width, term_size.height),
                                app.input_area_height(term_size.width),
                            )
                        })
                    })
                    .await;
                if let Some(action) = resolve_mouse(&mouse, overlay) {
                    dispatcher.dispatch(action, ctx);
                }
            }
            UiEvent::Crossterm(Event::Paste(text)) => {
                handle_paste_event(dispatcher, ctx, text);
            }
            UiEvent::Crossterm(_) => {}
        }
    }

    if outcome.events_processed {
        outcome.request_redraw = true;
    }
    outcome
}

async fn route_keyboard_event(
    app: &AppHandle,
    dispatcher: &AppActionDispatcher,
    key: KeyEvent,
    ctx: AppActionContext,
) {
    let context = app.read(KeyContext::for_app).await;
    match resolve_key(context, &key) {
        KeyResult::Actions(actions) => dispatcher.dispatch_many(actions, ctx),
        KeyResult::Composer => {
            let outcome = app.update(|app| app.composer.handle_key(&key)).await;
            if outcome == ComposerKey::Submit {
                dispatcher.dispatch(AppAction::SubmitDraft, ctx);
            }
        }
        KeyResult::Ignored => {}
    }
}

pub(crate) fn sanitize_pasted_text(text: &str) -> String {
    let without_crlf = text.replace("\r\n", "\n");
    let without_cr = without_crlf.replace('\r', "\n");
    let expanded_tabs = without_cr.replace('\t', "    ");
    expanded_tabs
        .chars()
        .filter(|&c| c == '\n' || !c.is_control())
        .collect()
}

fn handle_paste_event(dispatcher: &AppActionDispatcher, ctx: AppActionContext, text: String) {
    let sanitized_text = sanitize_pasted_text(&text);
    if sanitized_text.is_empty() {
        return;
    }
    dispatcher.dispatch(
        AppAction::InsertIntoInput {
            text: sanitized_text,
        },
        ctx,
    );
}

/// Drain transport messages, coalescing chunks into one append per frame.
fn process_stream_updates(
    dispatcher: &AppActionDispatcher,
    rx: &mut mpsc::UnboundedReceiver<(StreamMessage, u64)>,
    term_width: u16,
    term_height: u16,
    current_stream_id: u64,
) -> bool {
    let mut received_any = false;
    let mut coalesced_chunks = String::new();
    let mut followup_actions = Vec::new();

    while let Ok((message, msg_stream_id)) = rx.try_recv() {
        if msg_stream_id != current_stream_id {
            debug!(stream_id = msg_stream_id, "Dropping message from stale stream");
            continue;
        }

        match message {
            StreamMessage::Chunk(content) => coalesced_chunks.push_str(&content),
            StreamMessage::Error(err) => followup_actions.push(AppAction::StreamErrored {
                message: err,
                stream_id: msg_stream_id,
            }),
            StreamMessage::End => followup_actions.push(AppAction::StreamCompleted {
                stream_id: msg_stream_id,
            }),
        }

        received_any = true;
    }

    if !received_any {
        return false;
    }

    let ctx = AppActionContext {
        term_width,
        term_height,
    };

    let mut actions = Vec::with_capacity(1 + followup_actions.len());
    if !coalesced_chunks.is_empty() {
        actions.push(AppAction::AppendResponseChunk {
            content: coalesced_chunks,
            stream_id: current_stream_id,
        });
    }
    actions.extend(followup_actions);
    dispatcher.dispatch_many(actions, ctx);

    true
}

async fn drain_action_queue(
    app: &AppHandle,
    stream_service: &ChatStreamService,
    action_rx: &mut mpsc::UnboundedReceiver<AppActionEnvelope>,
) -> bool {
    let mut pending = Vec::new();
    while let Ok(envelope) = action_rx.try_recv() {
        pending.push(envelope);
    }

    if pending.is_empty() {
        return false;
    }

    let commands = app.update(|app| apply_actions(app, pending)).await;
    for cmd in commands {
        match cmd {
            AppCommand::SpawnStream(params) => {
                stream_service.spawn_stream(params);
            }
            AppCommand::CopyToClipboard(text) => {
                let result = copy_to_clipboard(&text);
                app.update(|app| match result {
                    Ok(()) => app.ui.set_status("Copied code block to clipboard"),
                    Err(err) => {
                        warn!(error = %err, "Clipboard copy failed");
                        app.ui.set_error(format!("Clipboard error: {err}"));
                    }
                })
                .await;
            }
        }
    }
    true
}

fn spawn_event_reader(event_tx: mpsc::UnboundedSender<UiEvent>) -> tokio::task::JoinHandle<()> {
    tokio::spawn(async move {
        loop {
            if let Ok(true) = event::poll(Duration::from_millis(10)) {
                match event::read() {
                    Ok(ev) => {
                        if event_tx.send(UiEvent::Crossterm(ev)).is_err() {
                            break;
                        }
                    }
                    Err(_) => {
                        continue;
                    }
                }
            } else {
                tokio::task::yield_now().await;
            }
        }
    })
}

pub async fn run_chat(init: AppInitConfig) -> Result<(), Box<dyn Error>> {
    let app = bootstrap_app(init)?;

    let (action_tx, mut action_rx) = mpsc::unbounded_channel::<AppActionEnvelope>();
    let action_dispatcher = AppActionDispatcher::new(action_tx);

    let terminal = setup_terminal()?;

    let (stream_service, mut rx) = ChatStreamService::new();

    let (event_tx, mut event_rx) = mpsc::unbounded_channel::<UiEvent>();
    let event_reader_handle = spawn_event_reader(event_tx);

    let result = main_loop(
        &app,
        &terminal,
        &action_dispatcher,
        &stream_service,
        &mut action_rx,
        &mut rx,
        &mut event_rx,
    )
    .await;

    event_reader_handle.abort();
    app.update(|app| app.conversation().cancel_current_stream())
        .await;
    let restored = restore_terminal(&terminal).await;

    result?;
    restored
}

async fn main_loop(
    app: &AppHandle,
    terminal: &SharedTerminal,
    dispatcher: &AppActionDispatcher,
    stream_service: &ChatStreamService,
    action_rx: &mut mpsc::UnboundedReceiver<AppActionEnvelope>,
    stream_rx: &mut mpsc::UnboundedReceiver<(StreamMessage, u64)>,
    event_rx: &mut mpsc::UnboundedReceiver<UiEvent>,
) -> Result<(), Box<dyn Error>> {
    let frame_duration = Duration::from_millis(1000 / MAX_FPS);
    let mut last_draw = Instant::now() - frame_duration;
    let mut request_redraw = true;
    let mut indicator_visible = false;
    let mut last_term_size = Size::default();

    loop {
        if app.read(|app| app.ui.exit_requested).await {
            return Ok(());
        }

        try_draw_frame(
            app,
            terminal,
            &mut request_redraw,
            &mut last_draw,
            frame_duration,
        )
        .await?;

        let term_size = current_terminal_size(terminal).await;
        if term_size != last_term_size {
            last_term_size = term_size;
            request_redraw = true;
            let ctx = AppActionContext {
                term_width: term_size.width,
                term_height: term_size.height,
            };
            app.update(|app| {
                let viewport = app.transcript_height(ctx.term_width, ctx.term_height);
                app.ui.follow_transcript(viewport, ctx.term_width);
            })
            .await;
        }

        let event_outcome = process_ui_events(app, event_rx, dispatcher, term_size).await;
        if event_outcome.request_redraw {
            request_redraw = true;
        }

        let current_stream_id = app.read(|app| app.session.current_stream_id).await;
        let received_any = process_stream_updates(
            dispatcher,
            stream_rx,
            term_size.width,
            term_size.height,
            current_stream_id,
        );
        if received_any {
            request_redraw = true;
        }

        if drain_action_queue(app, stream_service, action_rx).await {
            request_redraw = true;
        }

        if app.update(|app| app.ui.expire_status(Instant::now())).await {
            request_redraw = true;
        }

        // The pulse animates every frame while a response is in flight.
        let indicator_now = app.read(|app| app.ui.is_typing_indicator_visible()).await;
        if indicator_now || indicator_now != indicator_visible {
            indicator_visible = indicator_now;
            request_redraw = true;
        }

        let idle = !event_outcome.events_processed && !received_any && !request_redraw;
        if idle {
            tokio::time::sleep(Duration::from_millis(16)).await;
        } else if request_redraw {
            tokio::time::sleep(
                frame_duration.saturating_sub(Instant::now().duration_since(last_draw)),
            )
            .await;
        }
    }
}
