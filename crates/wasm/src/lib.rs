//! OrderCo WASM Frontend
//!
//! Browser client for the OrderCo voting and ordering service. All state
//! decisions live in `orderco-core`; this crate draws pages with egui and
//! carries out the controller's requests and timers.

#![cfg(target_arch = "wasm32")]

mod app;
mod http_client;
mod panels;
mod storage;

use orderco_core::Config;
use wasm_bindgen::prelude::*;
use wasm_bindgen::JsCast;

const CONFIG_TOML: &str = include_str!("../config.toml");

#[wasm_bindgen(start)]
pub fn main() {
    // Set up panic hook for better error messages
    console_error_panic_hook::set_once();

    let config = Config::load_or_default(CONFIG_TOML);

    let level = if config.enable_debug {
        tracing::Level::DEBUG
    } else {
        tracing::Level::INFO
    };
    tracing_wasm::set_as_global_default_with_config(
        tracing_wasm::WASMLayerConfigBuilder::new()
            .set_max_level(level)
            .build(),
    );
    tracing::info!("{} v{} starting against {}", config.app_name, config.app_version, config.api_base_url);

    let Some(canvas) = web_sys::window()
        .and_then(|w| w.document())
        .and_then(|d| d.get_element_by_id("canvas"))
        .and_then(|e| e.dyn_into::<web_sys::HtmlCanvasElement>().ok())
    else {
        tracing::error!("No canvas element to render into");
        return;
    };

    let web_options = eframe::WebOptions::default();

    wasm_bindgen_futures::spawn_local(async move {
        let started = eframe::WebRunner::new()
            .start(
                canvas,
                web_options,
                Box::new(|cc| {
                    let mut fonts = egui::FontDefinitions::default();
                    egui_phosphor::add_to_fonts(&mut fonts, egui_phosphor::Variant::Regular);
                    cc.egui_ctx.set_fonts(fonts);
                    Ok(Box::new(app::OrderCoApp::new(config, cc.egui_ctx.clone())))
                }),
            )
            .await;
        if let Err(e) = started {
            tracing::error!("Failed to start eframe: {:?}", e);
        }
    });
}
