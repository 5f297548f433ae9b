use yew::prelude::*;

use crate::components::format_local;
use crate::types::HistoryEntry;

#[derive(Properties, PartialEq)]
pub struct HistoryViewProps {
    /// Newest first, already capped by the app.
    pub entries: Vec<HistoryEntry>,
}

#[function_component(HistoryView)]
pub fn history_view(props: &HistoryViewProps) -> Html {
    if props.entries.is_empty() {
        return html! {
            <div style="color:#888; padding:1em 0;">
                { "Sin movimientos en esta sesión" }
            </div>
        };
    }
    html! {
        <ul style="list-style:none; margin:0; padding:0;">
            { for props.entries.iter().map(|entry| {
                html! {
                    <li style="padding:0.4em 0; border-bottom:1px solid #eee;">
                        <div style="display:flex; justify-content:space-between; align-items:center; gap:0.8em;">
                            <div style="display:flex; align-items:center; gap:0.5em;">
                                <span style="font-size:1.2em;">{ &entry.icon }</span>
                                <span style="font-weight:bold;">{ &entry.label }</span>
                            </div>
                            <span style="color:#777; font-size:0.85em;">
                                { format_local(&entry.ts) }
                            </span>
                        </div>
                        <div style="height:4px; background:#eee; border-radius:2px; margin-top:0.3em;">
                            <div style={format!(
                                "height:100%; border-radius:2px; background:#007bff; width:{}%; transition:width 0.3s;",
                                entry.pct
                            )} />
                        </div>
                    </li>
                }
            })}
        </ul>
    }
}
