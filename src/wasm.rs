//! WebAssembly bindings for the XOR visualizer.
//!
//! The page owns the timers: after every call it should read
//! [`WasmVisualizer::drain_events`], arm a `setTimeout` for each
//! `tick_scheduled` event, `clearTimeout` for each `tick_cancelled` one, and
//! call [`WasmVisualizer::fire_tick`] with the token's `session` and `seq` when a
//! timer fires.

use serde::Serialize;
use wasm_bindgen::prelude::*;

use crate::animation::{SoundCue, SoundHookAdapter, SoundSink, TickToken};
use crate::schema::{InputArray, RandomInput, Speed, VisualizerConfig};
use crate::visualizer::Visualizer;

/// Initialize WASM module with panic hook and logging.
#[wasm_bindgen(start)]
pub fn init() {
    console_error_panic_hook::set_once();
    wasm_logger::init(wasm_logger::Config::default());
}

fn to_js<T: Serialize + ?Sized>(value: &T) -> Result<JsValue, JsValue> {
    serde_wasm_bindgen::to_value(value)
        .map_err(|e| JsValue::from_str(&format!("Serialization error: {e}")))
}

fn parse_input(input: &str) -> Result<InputArray, JsValue> {
    input
        .parse()
        .map_err(|e| JsValue::from_str(&format!("Invalid input: {e}")))
}

/// Forwards cues to a JavaScript callback as `"init" | "xor" | "result"`.
struct JsSoundSink(js_sys::Function);

impl SoundSink for JsSoundSink {
    fn emit(&mut self, cue: SoundCue) {
        if let Err(e) = self.0.call1(&JsValue::NULL, &JsValue::from_str(cue.as_str())) {
            log::warn!("Sound callback failed for {}: {e:?}", cue.as_str());
        }
    }
}

/// Browser handle on a [`Visualizer`].
#[wasm_bindgen]
pub struct WasmVisualizer {
    inner: Visualizer,
    sound: Option<SoundHookAdapter<JsSoundSink>>,
}

#[wasm_bindgen]
impl WasmVisualizer {
    /// Create a visualizer from a JSON `VisualizerConfig` (empty string for
    /// defaults) and a comma separated input such as `"4,1,2,1,2"`.
    #[wasm_bindgen(constructor)]
    pub fn new(config_json: &str, input: &str) -> Result<WasmVisualizer, JsValue> {
        let config: VisualizerConfig = if config_json.trim().is_empty() {
            VisualizerConfig::default()
        } else {
            serde_json::from_str(config_json)
                .map_err(|e| JsValue::from_str(&format!("Invalid config JSON: {e}")))?
        };
        let input = parse_input(input)?;
        let inner = Visualizer::new(config, input)
            .map_err(|e| JsValue::from_str(&format!("Invalid config: {e}")))?;

        Ok(WasmVisualizer { inner, sound: None })
    }

    /// Replace the input array with a comma separated list.
    #[wasm_bindgen(js_name = setInput)]
    pub fn set_input(&mut self, input: &str) -> Result<(), JsValue> {
        let input = parse_input(input)?;
        self.inner.set_input(input);
        Ok(())
    }

    /// Replace the input with a random valid array. Returns the new values.
    #[wasm_bindgen(js_name = randomInput)]
    pub fn random_input(&mut self, pairs: Option<usize>, seed: Option<u64>) -> Vec<u32> {
        let input = RandomInput { pairs, seed }.generate();
        let values = input.values().to_vec();
        self.inner.set_input(input);
        values
    }

    #[wasm_bindgen(js_name = setCanvasWidth)]
    pub fn set_canvas_width(&mut self, width: f32) -> Result<(), JsValue> {
        self.inner
            .set_canvas_width(width)
            .map_err(|e| JsValue::from_str(&e.to_string()))
    }

    #[wasm_bindgen(js_name = setCanvasHeight)]
    pub fn set_canvas_height(&mut self, height: f32) -> Result<(), JsValue> {
        self.inner
            .set_canvas_height(height)
            .map_err(|e| JsValue::from_str(&e.to_string()))
    }

    #[wasm_bindgen]
    pub fn play(&mut self) {
        self.inner.play();
    }

    #[wasm_bindgen]
    pub fn pause(&mut self) {
        self.inner.pause();
    }

    #[wasm_bindgen]
    pub fn next(&mut self) {
        self.inner.next();
    }

    #[wasm_bindgen]
    pub fn prev(&mut self) {
        self.inner.prev();
    }

    #[wasm_bindgen]
    pub fn reset(&mut self) {
        self.inner.reset();
    }

    /// Set speed from `"slow" | "medium" | "fast"`.
    #[wasm_bindgen(js_name = setSpeed)]
    pub fn set_speed(&mut self, speed: &str) -> Result<(), JsValue> {
        let speed: Speed = speed
            .parse()
            .map_err(|e: crate::schema::ConfigError| JsValue::from_str(&e.to_string()))?;
        self.inner.set_speed(speed);
        Ok(())
    }

    /// Deliver a fired timer with the `session` and `seq` of its token, as
    /// read from the `tick_scheduled` event. Returns `false` when the token
    /// is stale or malformed.
    #[wasm_bindgen(js_name = fireTick)]
    pub fn fire_tick(&mut self, session: f64, seq: f64) -> bool {
        match TickToken::from_f64(session, seq) {
            Some(token) => self.inner.on_tick(token),
            None => {
                log::warn!("Ignoring malformed tick token ({session}, {seq})");
                false
            }
        }
    }

    /// Register the function receiving sound cues. `null` removes it.
    #[wasm_bindgen(js_name = setSoundCallback)]
    pub fn set_sound_callback(&mut self, callback: Option<js_sys::Function>) {
        self.sound = callback.map(|f| SoundHookAdapter::new(JsSoundSink(f)));
    }

    #[wasm_bindgen(js_name = setMuted)]
    pub fn set_muted(&mut self, muted: bool) {
        if let Some(adapter) = self.sound.as_mut() {
            adapter.set_muted(muted);
        }
    }

    /// Timeline events since the last call. Sound cues are also forwarded
    /// to the sound callback.
    #[wasm_bindgen(js_name = drainEvents)]
    pub fn drain_events(&mut self) -> Result<JsValue, JsValue> {
        let events = self.inner.drain_events();
        if let Some(adapter) = self.sound.as_mut() {
            adapter.dispatch(&events);
        }
        to_js(&events)
    }

    /// Scene of the current frame.
    #[wasm_bindgen(js_name = getScene)]
    pub fn get_scene(&self) -> Result<JsValue, JsValue> {
        to_js(&self.inner.scene())
    }

    /// Scene of any frame, clamped to the terminal frame.
    #[wasm_bindgen(js_name = getSceneAt)]
    pub fn get_scene_at(&self, frame: usize) -> Result<JsValue, JsValue> {
        to_js(&self.inner.scene_at(frame))
    }

    /// Playback state: frame, total frames, status and speed.
    #[wasm_bindgen(js_name = getState)]
    pub fn get_state(&self) -> Result<JsValue, JsValue> {
        to_js(&self.inner.state())
    }

    #[wasm_bindgen(js_name = getProgress)]
    pub fn get_progress(&self) -> f32 {
        self.inner.state().progress()
    }

    #[wasm_bindgen(js_name = getInput)]
    pub fn get_input(&self) -> Vec<u32> {
        self.inner.input().values().to_vec()
    }

    #[wasm_bindgen(js_name = getSteps)]
    pub fn get_steps(&self) -> Vec<u32> {
        self.inner.steps().as_slice().to_vec()
    }

    #[wasm_bindgen(js_name = isValid)]
    pub fn is_valid(&self) -> bool {
        self.inner.analysis().is_valid()
    }
}

/// Default configuration as JSON, for populating a settings form.
#[wasm_bindgen(js_name = defaultConfig)]
pub fn default_config() -> Result<String, JsValue> {
    serde_json::to_string_pretty(&VisualizerConfig::default())
        .map_err(|e| JsValue::from_str(&format!("Serialization error: {e}")))
}
