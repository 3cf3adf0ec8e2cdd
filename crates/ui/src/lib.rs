mod app;
mod renderer;
mod theme;

pub use app::GpuVizApp;

// WASM entry point
#[cfg(target_arch = "wasm32")]
use wasm_bindgen::prelude::*;
#[cfg(target_arch = "wasm32")]
use wasm_bindgen::JsCast;

#[cfg(target_arch = "wasm32")]
const CANVAS_ID: &str = "gpuviz_canvas";

#[cfg(target_arch = "wasm32")]
fn find_canvas() -> Result<web_sys::HtmlCanvasElement, String> {
    let document = web_sys::window()
        .and_then(|w| w.document())
        .ok_or("no document")?;
    document
        .get_element_by_id(CANVAS_ID)
        .ok_or_else(|| format!("no canvas element with id '{CANVAS_ID}'"))?
        .dyn_into::<web_sys::HtmlCanvasElement>()
        .map_err(|_| format!("element '{CANVAS_ID}' is not a canvas"))
}

#[cfg(target_arch = "wasm32")]
#[wasm_bindgen(start)]
pub fn start() -> Result<(), JsValue> {
    // Panics go to the browser console
    console_error_panic_hook::set_once();

    let web_options = eframe::WebOptions::default();
    wasm_bindgen_futures::spawn_local(async {
        let canvas = match find_canvas() {
            Ok(canvas) => canvas,
            Err(e) => {
                web_sys::console::error_1(&format!("gpuviz: {e}").into());
                return;
            }
        };
        let config = gpuviz_core::config::AppConfig::default();
        let start_result = eframe::WebRunner::new()
            .start(
                canvas,
                web_options,
                Box::new(move |cc| Ok(Box::new(GpuVizApp::new(cc, &config)))),
            )
            .await;
        if let Err(e) = start_result {
            web_sys::console::error_1(&format!("Failed to start eframe: {e:?}").into());
        }
    });
    Ok(())
}
