pub mod core;
pub mod services;
pub mod ui;
pub mod utils;

#[cfg(target_arch = "wasm32")]
use leptos::*;
#[cfg(target_arch = "wasm32")]
use wasm_bindgen::prelude::*;

#[cfg(target_arch = "wasm32")]
#[wasm_bindgen]
pub fn start() {
    crate::core::init_logging();

    leptos::mount_to_body(|| {
        use crate::ui::App;
        view! { <App/> }
    });
}
