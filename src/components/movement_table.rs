use yew::prelude::*;

use crate::components::format_local;
use crate::types::ServerRecord;

#[derive(Properties, PartialEq)]
pub struct MovementTableProps {
    /// Most recent first, as delivered by the backend.
    pub records: Vec<ServerRecord>,
    /// Whether the polling timer is running.
    pub active: bool,
}

#[function_component(MovementTable)]
pub fn movement_table(props: &MovementTableProps) -> Html {
    if !props.active && props.records.is_empty() {
        return html! {
            <div style="color:#888; padding:1em 0;">
                { "Activa las actualizaciones para ver los últimos movimientos" }
            </div>
        };
    }
    html! {
        <table style="width:100%; border-collapse:collapse; font-size:0.9em;">
            <thead>
                <tr style="text-align:left; border-bottom:2px solid #ddd;">
                    <th style="padding:0.4em;">{ "Id" }</th>
                    <th style="padding:0.4em;">{ "Movimiento" }</th>
                    <th style="padding:0.4em;">{ "Fecha" }</th>
                </tr>
            </thead>
            <tbody>
                { for props.records.iter().map(|record| {
                    html! {
                        <tr style="border-bottom:1px solid #eee;">
                            <td style="padding:0.4em;">{ record.id }</td>
                            <td style="padding:0.4em;">{ &record.label }</td>
                            <td style="padding:0.4em;">
                                { record.timestamp.as_deref().map(format_local).unwrap_or_default() }
                            </td>
                        </tr>
                    }
                })}
            </tbody>
        </table>
    }
}
