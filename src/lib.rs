mod api;
mod app;
mod components;
mod config;
mod error;
mod parse;
mod storage;
mod sync;
mod types;
mod voice;

use wasm_bindgen::prelude::*;

use crate::app::App;

#[wasm_bindgen(start)]
pub fn run_app() {
    let document = web_sys::window().unwrap().document().unwrap();
    let root = document.get_element_by_id("root").unwrap();
    yew::Renderer::<App>::with_root(root).render();
}
