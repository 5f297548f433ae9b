use std::rc::Rc;

use wasm_bindgen::prelude::*;
use web_sys::{console, KeyboardEvent};
use yew::platform::spawn_local;
use yew::prelude::*;

use crate::api::ApiClient;
use crate::components::{format_local, HistoryView, MovementTable};
use crate::config::{progress_pct, Config};
use crate::storage::{now_iso, LastMovementMirror, SessionLedger};
use crate::sync::{SyncBus, SyncSubscription};
use crate::types::{HistoryEntry, Movement, ServerRecord, SessionEntry, SyncEnvelope, MOVEMENTS};
use crate::voice::{contains_keyword, resolve_intent, speak, SpeechRecognizer, VoicePhase};

/// Session-scoped UI state, driven by one dispatcher so that listeners
/// installed at mount (keyboard, storage events, speech callbacks) never
/// act on stale captures.
#[derive(Clone)]
struct SessionState {
    history: Vec<HistoryEntry>,
    count: usize,
    /// Latest movement label + timestamp shown in the status card.
    status: Option<(String, Option<String>)>,
    /// One-line feedback under the controls.
    action: String,
    goal: usize,
    cap: usize,
    restore_window: usize,
}

enum SessionMsg {
    /// Replay of the ledger at startup.
    Restore(Vec<SessionEntry>),
    /// A command was accepted locally or observed from another tab.
    Recorded {
        label: String,
        icon: String,
        ts: String,
        count: usize,
    },
    Status {
        label: String,
        ts: Option<String>,
    },
    Action(String),
    Cleared,
}

impl SessionState {
    fn new(config: &Config) -> Self {
        Self {
            history: Vec::new(),
            count: 0,
            status: None,
            action: String::new(),
            goal: config.progress_goal,
            cap: config.history_cap,
            restore_window: config.restore_window,
        }
    }

}

impl Reducible for SessionState {
    type Action = SessionMsg;

    fn reduce(self: Rc<Self>, msg: SessionMsg) -> Rc<Self> {
        let mut next = (*self).clone();
        match msg {
            SessionMsg::Restore(entries) => {
                next.count = entries.len();
                let pct = progress_pct(next.count, next.goal);
                next.history = entries
                    .iter()
                    .rev()
                    .take(next.restore_window)
                    .map(|entry| {
                        let movement = Movement::from_id(entry.id);
                        HistoryEntry {
                            label: movement
                                .map(|m| m.label.to_string())
                                .unwrap_or_else(|| format!("Movimiento {}", entry.id)),
                            icon: movement
                                .map(|m| m.icon.to_string())
                                .unwrap_or_else(|| "👉".to_string()),
                            ts: entry.ts.clone(),
                            pct,
                        }
                    })
                    .collect();
            }
            SessionMsg::Recorded { label, icon, ts, count } => {
                next.count = count;
                let pct = progress_pct(count, next.goal);
                next.history.insert(0, HistoryEntry { label, icon, ts, pct });
                next.history.truncate(next.cap);
            }
            SessionMsg::Status { label, ts } => {
                next.status = Some((label, ts));
            }
            SessionMsg::Action(text) => {
                next.action = text;
            }
            SessionMsg::Cleared => {
                next.history.clear();
                next.count = 0;
                next.action = "🗑️ Historial (sesión) limpiado".to_string();
            }
        }
        Rc::new(next)
    }
}

/// Keyboard shortcuts: one key per movement, space for "Detener".
fn movement_for_key(key: &str, code: &str) -> Option<u32> {
    if code == "Space" {
        return Some(3);
    }
    match key.to_lowercase().as_str() {
        "w" => Some(1),
        "s" => Some(2),
        "e" => Some(4),
        "q" => Some(5),
        "c" => Some(6),
        "z" => Some(7),
        "d" => Some(8),
        "a" => Some(9),
        "x" => Some(10),
        "y" => Some(11),
        _ => None,
    }
}

/// The dispatch path shared by buttons, keyboard and voice: optimistic
/// local update (ledger, mirror, history) before the submission, status
/// repaint after it settles, broadcast to other tabs on success. Local
/// state is never rolled back on remote failure.
fn dispatch_movement(
    movement: Movement,
    distinct_only: bool,
    session: UseReducerDispatcher<SessionState>,
    client: Rc<ApiClient>,
) {
    let ts = now_iso();
    let recorded = if distinct_only {
        SessionLedger::append_if_distinct(movement.id)
    } else {
        SessionLedger::append(movement.id);
        true
    };
    LastMovementMirror::set(movement.id, Some(&ts));
    session.dispatch(SessionMsg::Status {
        label: movement.label.to_string(),
        ts: Some(ts.clone()),
    });
    if recorded {
        session.dispatch(SessionMsg::Recorded {
            label: movement.label.to_string(),
            icon: movement.icon.to_string(),
            ts: ts.clone(),
            count: SessionLedger::count(),
        });
    }
    session.dispatch(SessionMsg::Action(format!(
        "Guardando movimiento {}...",
        movement.id
    )));

    spawn_local(async move {
        match client.submit_movement(movement.id).await {
            Ok(server_ts) => {
                let fecha = server_ts.unwrap_or(ts);
                LastMovementMirror::set(movement.id, Some(&fecha));
                session.dispatch(SessionMsg::Action(format!(
                    "✅ Movimiento guardado: {}",
                    movement.label
                )));
                SyncBus::publish(&SyncEnvelope {
                    id_movimiento: Some(movement.id),
                    movimiento: movement.label.to_string(),
                    fecha: Some(fecha),
                    ts: now_iso(),
                });
                match client.fetch_latest().await {
                    Ok(Some(record)) => {
                        LastMovementMirror::set(record.id, record.timestamp.as_deref());
                        session.dispatch(SessionMsg::Status {
                            label: record.label,
                            ts: record.timestamp,
                        });
                    }
                    Ok(None) => {}
                    Err(err) => {
                        console::warn_1(
                            &format!("no se pudo consultar el último movimiento: {err}").into(),
                        );
                    }
                }
            }
            Err(err) => {
                console::error_1(&format!("error al guardar el movimiento: {err}").into());
                session.dispatch(SessionMsg::Action(format!(
                    "⚠️ Error guardando movimiento: {err}"
                )));
            }
        }
    });
}

/// Polling timer handle; dropping it cancels the interval.
struct PollTimer {
    id: i32,
    _closure: Closure<dyn FnMut()>,
}

impl Drop for PollTimer {
    fn drop(&mut self) {
        if let Some(window) = web_sys::window() {
            window.clear_interval_with_handle(self.id);
        }
    }
}

/// Toggle decision for the polling slot: a running timer is always taken
/// out (and dropped) first, and `start` only runs on an empty slot, so no
/// sequence of toggles can leave two timers alive. Returns whether a timer
/// is running afterwards.
fn toggle_poll_slot<T>(slot: &mut Option<T>, start: impl FnOnce() -> Option<T>) -> bool {
    if slot.take().is_some() {
        return false;
    }
    *slot = start();
    slot.is_some()
}

#[function_component(App)]
pub fn app() -> Html {
    let config = use_memo((), |_| Config::default());
    let client = use_memo(config.clone(), |cfg| ApiClient::new(cfg));

    let session = use_reducer({
        let config = config.clone();
        move || SessionState::new(&config)
    });
    let records = use_state(Vec::<ServerRecord>::new);
    let polling = use_state(|| false);
    let poll_timer = use_mut_ref(|| Option::<PollTimer>::None);
    let listening = use_state(|| false);
    let voice_phase = use_state(VoicePhase::default);
    let voice_ready = use_state(|| false);
    let recognizer = use_mut_ref(|| Option::<SpeechRecognizer>::None);
    let sync_sub = use_mut_ref(|| Option::<SyncSubscription>::None);

    // Startup: repaint from the mirror and the ledger, then ask the API
    // for the real latest record.
    {
        let session = session.dispatcher();
        let client = client.clone();
        use_effect_with((), move |_| {
            if let Some((id, ts)) = LastMovementMirror::get() {
                if let Some(movement) = Movement::from_id(id) {
                    session.dispatch(SessionMsg::Status {
                        label: movement.label.to_string(),
                        ts,
                    });
                }
            }
            session.dispatch(SessionMsg::Restore(SessionLedger::entries()));
            spawn_local(async move {
                match client.fetch_latest().await {
                    Ok(Some(record)) => {
                        LastMovementMirror::set(record.id, record.timestamp.as_deref());
                        session.dispatch(SessionMsg::Status {
                            label: record.label,
                            ts: record.timestamp,
                        });
                    }
                    Ok(None) => {}
                    Err(err) => {
                        // The mirror repaint above stays in place.
                        console::warn_1(
                            &format!("no se pudo consultar el último movimiento: {err}").into(),
                        );
                    }
                }
            });
            || ()
        });
    }

    // Cross-tab sync: replay broadcast movements into this tab's history,
    // ledger and mirror without touching the submission path.
    {
        let session = session.dispatcher();
        let sync_sub = sync_sub.clone();
        use_effect_with((), move |_| {
            let on_envelope = Callback::from(move |envelope: SyncEnvelope| {
                let movement = envelope.movement();
                let (label, icon) = match movement {
                    Some(m) => (m.label.to_string(), m.icon.to_string()),
                    None => (envelope.movimiento.clone(), "👉".to_string()),
                };
                if let Some(m) = movement {
                    SessionLedger::append_if_distinct(m.id);
                    LastMovementMirror::set(
                        m.id,
                        envelope.fecha.as_deref().or(Some(envelope.ts.as_str())),
                    );
                }
                session.dispatch(SessionMsg::Recorded {
                    label: label.clone(),
                    icon,
                    ts: envelope.ts.clone(),
                    count: SessionLedger::count(),
                });
                session.dispatch(SessionMsg::Status {
                    label,
                    ts: envelope.fecha.clone().or(Some(envelope.ts)),
                });
            });
            *sync_sub.borrow_mut() = SyncBus::subscribe(on_envelope);
            let sync_sub = sync_sub.clone();
            move || {
                sync_sub.borrow_mut().take();
            }
        });
    }

    // Keyboard shortcuts on the document; space is intercepted so the page
    // does not scroll.
    {
        let session = session.dispatcher();
        let client = client.clone();
        use_effect_with((), move |_| {
            let document = web_sys::window().and_then(|w| w.document());
            let listener = Closure::wrap(Box::new(move |event: KeyboardEvent| {
                if event.code() == "Space" {
                    event.prevent_default();
                }
                if let Some(id) = movement_for_key(&event.key(), &event.code()) {
                    if let Some(movement) = Movement::from_id(id) {
                        dispatch_movement(movement, false, session.clone(), client.clone());
                    }
                }
            }) as Box<dyn FnMut(KeyboardEvent)>);
            if let Some(doc) = &document {
                let _ = doc
                    .add_event_listener_with_callback("keydown", listener.as_ref().unchecked_ref());
            }
            move || {
                if let Some(doc) = document {
                    let _ = doc.remove_event_listener_with_callback(
                        "keydown",
                        listener.as_ref().unchecked_ref(),
                    );
                }
            }
        });
    }

    // Speech engine setup. The transcript callback runs the rest of the
    // pipeline: keyword gate, remote classification, dispatch.
    {
        let session = session.dispatcher();
        let client = client.clone();
        let config = config.clone();
        let recognizer = recognizer.clone();
        let listening = listening.setter();
        let phase = voice_phase.setter();
        let voice_ready = voice_ready.setter();
        use_effect_with((), move |_| {
            let on_transcript = {
                let session = session.clone();
                let client = client.clone();
                let config = config.clone();
                let phase = phase.clone();
                Callback::from(move |transcript: String| {
                    phase.set(VoicePhase::Transcribed);
                    if !contains_keyword(&transcript, &config.activation_keyword) {
                        session.dispatch(SessionMsg::Action(
                            "⚠️ Debes decir la palabra clave primero".to_string(),
                        ));
                        speak("Debes decir la palabra clave primero", &config.speech_lang);
                        phase.set(VoicePhase::Idle);
                        return;
                    }
                    phase.set(VoicePhase::KeywordChecked);
                    let session = session.clone();
                    let client = client.clone();
                    let config = config.clone();
                    let phase = phase.clone();
                    spawn_local(async move {
                        let reply = client
                            .classify_intent(&transcript, &config.activation_keyword)
                            .await;
                        match reply.as_deref().and_then(resolve_intent) {
                            Some(movement) => {
                                phase.set(VoicePhase::IntentResolved);
                                session.dispatch(SessionMsg::Action(format!(
                                    "{} {}",
                                    movement.icon, movement.label
                                )));
                                speak(
                                    &format!("Ejecutando: {}", movement.label),
                                    &config.speech_lang,
                                );
                                dispatch_movement(
                                    movement,
                                    true,
                                    session.clone(),
                                    client.clone(),
                                );
                                phase.set(VoicePhase::Dispatched);
                                phase.set(VoicePhase::Idle);
                            }
                            None => {
                                session.dispatch(SessionMsg::Action(
                                    "❌ No se reconoció ningún movimiento válido".to_string(),
                                ));
                                speak(
                                    "No se reconoció ningún movimiento válido",
                                    &config.speech_lang,
                                );
                                phase.set(VoicePhase::Idle);
                            }
                        }
                    });
                })
            };
            let on_listening = {
                let listening = listening.clone();
                let phase = phase.clone();
                Callback::from(move |active: bool| {
                    listening.set(active);
                    if active {
                        phase.set(VoicePhase::Listening);
                    } else {
                        // The engine stopped; a transcript callback that
                        // already fired keeps driving the later phases.
                        phase.set(VoicePhase::Idle);
                    }
                })
            };
            let on_error = {
                let session = session.clone();
                let phase = phase.clone();
                Callback::from(move |message: String| {
                    session.dispatch(SessionMsg::Action(format!("⚠️ {message}")));
                    phase.set(VoicePhase::Idle);
                })
            };
            match SpeechRecognizer::new(&config.speech_lang, on_transcript, on_listening, on_error)
            {
                Ok(rec) => {
                    *recognizer.borrow_mut() = Some(rec);
                    voice_ready.set(true);
                }
                Err(err) => {
                    console::warn_1(&format!("reconocimiento de voz no disponible: {err:?}").into());
                    session.dispatch(SessionMsg::Action(
                        "⚠️ Reconocimiento de voz no disponible".to_string(),
                    ));
                }
            }
            || ()
        });
    }

    let on_movement = {
        let session = session.dispatcher();
        let client = client.clone();
        Callback::from(move |id: u32| {
            if let Some(movement) = Movement::from_id(id) {
                dispatch_movement(movement, false, session.clone(), client.clone());
            }
        })
    };

    let on_voice = {
        let session = session.dispatcher();
        let recognizer = recognizer.clone();
        Callback::from(move |_: MouseEvent| {
            match &*recognizer.borrow() {
                Some(rec) => {
                    if let Err(err) = rec.start() {
                        console::error_1(&format!("no se pudo iniciar la escucha: {err:?}").into());
                        session.dispatch(SessionMsg::Action(
                            "⚠️ No se pudo iniciar el reconocimiento".to_string(),
                        ));
                    }
                }
                None => {
                    session.dispatch(SessionMsg::Action(
                        "⚠️ Reconocimiento de voz no disponible".to_string(),
                    ));
                }
            }
        })
    };

    let load_records = {
        let records = records.clone();
        let client = client.clone();
        let n = config.poll_window;
        Callback::from(move |_: ()| {
            let records = records.clone();
            let client = client.clone();
            spawn_local(async move {
                match client.fetch_latest_n(n).await {
                    Ok(list) => records.set(list),
                    Err(err) => {
                        console::error_1(
                            &format!("error cargando últimos movimientos: {err}").into(),
                        );
                    }
                }
            });
        })
    };

    let on_toggle_poll = {
        let poll_timer = poll_timer.clone();
        let polling = polling.clone();
        let load_records = load_records.clone();
        let interval_ms = config.poll_interval_ms;
        Callback::from(move |_: MouseEvent| {
            let active = toggle_poll_slot(&mut *poll_timer.borrow_mut(), || {
                load_records.emit(());
                let tick = load_records.clone();
                let closure =
                    Closure::wrap(Box::new(move || tick.emit(())) as Box<dyn FnMut()>);
                let window = web_sys::window()?;
                match window.set_interval_with_callback_and_timeout_and_arguments_0(
                    closure.as_ref().unchecked_ref(),
                    interval_ms,
                ) {
                    Ok(id) => Some(PollTimer { id, _closure: closure }),
                    Err(err) => {
                        console::error_1(
                            &format!("no se pudo iniciar el polling: {err:?}").into(),
                        );
                        None
                    }
                }
            });
            polling.set(active);
        })
    };

    let on_clear = {
        let session = session.dispatcher();
        let records = records.clone();
        let polling = polling.clone();
        let poll_timer = poll_timer.clone();
        Callback::from(move |_: MouseEvent| {
            if poll_timer.borrow_mut().take().is_some() {
                polling.set(false);
            }
            records.set(Vec::new());
            SessionLedger::clear();
            SyncBus::clear();
            session.dispatch(SessionMsg::Cleared);
        })
    };

    let on_toggle_dark = Callback::from(move |_: MouseEvent| {
        if let Some(body) = web_sys::window()
            .and_then(|w| w.document())
            .and_then(|d| d.body())
        {
            let _ = body.class_list().toggle("dark-mode");
        }
    });

    let pct = progress_pct(session.count, session.goal);
    let goal_reached = session.count >= session.goal;
    let status_line = match &session.status {
        Some((label, _)) => label.to_uppercase(),
        None => "—".to_string(),
    };
    let status_ts = session
        .status
        .as_ref()
        .and_then(|(_, ts)| ts.as_deref())
        .map(format_local)
        .unwrap_or_default();

    html! {
        <div style="display:flex; flex-direction:row; min-height:100vh; font-family:Arial,sans-serif;">
            <div style="width:360px; min-width:360px; padding:1.5em; background:#f8f9fa; border-right:1px solid #ddd; display:flex; flex-direction:column; gap:1em;">
                <h1 style="margin:0; color:#333;">{ "Control del carrito" }</h1>

                <div style="padding:1em; background:#fff; border:1px solid #ddd; border-radius:4px;">
                    <div style="font-size:0.8em; color:#777;">{ "Último movimiento" }</div>
                    <div style="font-size:1.3em; font-weight:bold;">{ status_line }</div>
                    <div style="font-size:0.85em; color:#777;">{ status_ts }</div>
                </div>

                <div style="min-height:1.4em; color:#0056b3; font-size:0.9em;">
                    { &session.action }
                </div>

                <div>
                    <div style="display:flex; justify-content:space-between; font-size:0.85em; color:#555;">
                        <span>{ "Progreso de la sesión" }</span>
                        <span>{ format!("{}/{}", session.count, session.goal) }</span>
                    </div>
                    <div style="height:8px; background:#e3e3e3; border-radius:4px; margin-top:0.3em;">
                        <div style={format!(
                            "height:100%; border-radius:4px; background:#28a745; width:{pct}%; transition:width 0.3s;"
                        )} />
                    </div>
                    <div style="font-size:0.85em; margin-top:0.3em; color:#555;">
                        { if goal_reached {
                            format!("✨ Ya hiciste {} movimientos (sesión): {}/{}",
                                session.goal, session.count, session.goal)
                        } else {
                            format!("Aún no alcanzas {} movimientos (sesión): {}/{}",
                                session.goal, session.count, session.goal)
                        }}
                    </div>
                </div>

                <div style="display:grid; grid-template-columns:1fr 1fr; gap:0.4em;">
                    { for MOVEMENTS.iter().map(|movement| {
                        let on_movement = on_movement.clone();
                        let id = movement.id;
                        html! {
                            <button
                                onclick={Callback::from(move |_| on_movement.emit(id))}
                                style="padding:0.5em; border:1px solid #ccc; border-radius:4px; background:#fff; cursor:pointer; text-align:left;"
                            >
                                { format!("{} {}", movement.icon, movement.label) }
                            </button>
                        }
                    })}
                </div>

                <button
                    onclick={on_voice}
                    disabled={*listening || !*voice_ready}
                    style={format!(
                        "padding:0.7em; font-size:1em; border-radius:4px; border:none; {}",
                        if *listening {
                            "background:#dc3545; color:white; cursor:not-allowed;"
                        } else {
                            "background:#007bff; color:white; cursor:pointer;"
                        }
                    )}
                >
                    { if *listening {
                        "🟢 Escuchando...".to_string()
                    } else {
                        format!("🎙️ Hablar (di \"{}\" + movimiento)", config.activation_keyword)
                    }}
                </button>
                <div style="font-size:0.8em; color:#777;">
                    { if *listening { "🟢 Escuchando..." } else { "🔴 Inactivo" } }
                    { format!(" · {}", voice_phase.label()) }
                </div>

                <button onclick={on_toggle_poll} style="padding:0.6em; border-radius:4px; border:1px solid #ccc; background:#fff; cursor:pointer;">
                    { if *polling { "Detener actualizaciones" } else { "Ver últimos movimientos" } }
                </button>
                <button onclick={on_clear} style="padding:0.6em; border-radius:4px; border:1px solid #ccc; background:#fff; cursor:pointer;">
                    { "🗑️ Limpiar sesión" }
                </button>
                <button onclick={on_toggle_dark} style="padding:0.6em; border-radius:4px; border:1px solid #ccc; background:#fff; cursor:pointer;">
                    { "🌓 Modo oscuro" }
                </button>
            </div>

            <div style="flex:1; padding:1.5em; display:flex; flex-direction:column; gap:1.5em; overflow-y:auto;">
                <div>
                    <h2 style="margin:0 0 0.5em 0; font-size:1.1em; color:#333;">{ "Historial (sesión)" }</h2>
                    <HistoryView entries={session.history.clone()} />
                </div>
                <div>
                    <h2 style="margin:0 0 0.5em 0; font-size:1.1em; color:#333;">
                        { format!("Últimos {} movimientos", config.poll_window) }
                    </h2>
                    <MovementTable records={(*records).clone()} active={*polling} />
                </div>
            </div>
        </div>
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn every_movement_has_a_key() {
        let keys = ["w", "s", "e", "q", "c", "z", "d", "a", "x", "y"];
        let mut ids: Vec<u32> = keys
            .iter()
            .filter_map(|k| movement_for_key(k, ""))
            .collect();
        ids.push(movement_for_key("", "Space").unwrap());
        ids.sort_unstable();
        assert_eq!(ids, (1..=11).collect::<Vec<u32>>());
    }

    #[test]
    fn space_maps_to_stop() {
        assert_eq!(movement_for_key(" ", "Space"), Some(3));
    }

    #[test]
    fn keys_are_case_insensitive() {
        assert_eq!(movement_for_key("W", "KeyW"), Some(1));
        assert_eq!(movement_for_key("w", "KeyW"), Some(1));
    }

    #[test]
    fn unmapped_keys_do_nothing() {
        assert_eq!(movement_for_key("p", "KeyP"), None);
        assert_eq!(movement_for_key("", ""), None);
    }

    fn state() -> Rc<SessionState> {
        Rc::new(SessionState::new(&Config::default()))
    }

    fn recorded(id: u32, count: usize) -> SessionMsg {
        let movement = Movement::from_id(id).unwrap();
        SessionMsg::Recorded {
            label: movement.label.to_string(),
            icon: movement.icon.to_string(),
            ts: "2025-11-05T10:00:00Z".to_string(),
            count,
        }
    }

    #[test]
    fn recorded_prepends_newest_first() {
        let state = state()
            .reduce(recorded(1, 1))
            .reduce(recorded(3, 2));
        assert_eq!(state.count, 2);
        assert_eq!(state.history[0].label, "Detener");
        assert_eq!(state.history[1].label, "Adelante");
        assert_eq!(state.history[0].pct, 40);
    }

    #[test]
    fn history_is_capped() {
        let mut state = state();
        for i in 0u32..60 {
            state = state.reduce(recorded(1 + (i % 11), i as usize + 1));
        }
        assert_eq!(state.history.len(), Config::default().history_cap);
        assert_eq!(state.count, 60);
    }

    #[test]
    fn cleared_resets_count_and_history() {
        let state = state()
            .reduce(recorded(1, 1))
            .reduce(recorded(2, 2))
            .reduce(SessionMsg::Cleared);
        assert_eq!(state.count, 0);
        assert!(state.history.is_empty());
    }

    #[test]
    fn restore_shows_last_entries_newest_first() {
        let entries: Vec<SessionEntry> = (1..=10)
            .map(|id| SessionEntry { id, ts: format!("2025-11-05T10:00:{id:02}Z") })
            .collect();
        let state = state().reduce(SessionMsg::Restore(entries));
        assert_eq!(state.count, 10);
        // restore window is 8, newest (id 10) first
        assert_eq!(state.history.len(), 8);
        assert_eq!(state.history[0].label, "Giro 360° derecha");
        assert_eq!(state.history[7].label, "Detener");
        // progress is clamped at the goal
        assert_eq!(state.history[0].pct, 100);
    }

    struct FakeTimer(Rc<std::cell::Cell<usize>>);

    impl Drop for FakeTimer {
        fn drop(&mut self) {
            self.0.set(self.0.get() - 1);
        }
    }

    #[test]
    fn rapid_toggling_never_leaves_two_timers_running() {
        let live = Rc::new(std::cell::Cell::new(0));
        let mut slot: Option<FakeTimer> = None;
        for i in 0..7 {
            let active = toggle_poll_slot(&mut slot, || {
                live.set(live.get() + 1);
                Some(FakeTimer(live.clone()))
            });
            assert_eq!(active, i % 2 == 0);
            assert_eq!(live.get(), if active { 1 } else { 0 });
        }
    }

    #[test]
    fn failed_timer_start_leaves_the_slot_empty() {
        let mut slot: Option<u32> = None;
        assert!(!toggle_poll_slot(&mut slot, || None));
        assert!(slot.is_none());
        assert!(toggle_poll_slot(&mut slot, || Some(7)));
        assert_eq!(slot, Some(7));
    }

    #[test]
    fn restore_of_unknown_id_keeps_a_placeholder_label() {
        let state = state().reduce(SessionMsg::Restore(vec![SessionEntry {
            id: 42,
            ts: "2025-11-05T10:00:00Z".to_string(),
        }]));
        assert_eq!(state.history[0].label, "Movimiento 42");
    }
}
