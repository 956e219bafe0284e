//! WASM bindings for morris-core
//!
//! A JavaScript-friendly wrapper around [`Game`]. The page resolves pointer
//! events to position letters and redraws from `snapshot()`.

use wasm_bindgen::prelude::*;

use crate::{Game, Player, Pos, RuleSet};

/// WASM-friendly wrapper around Game
#[wasm_bindgen]
pub struct WasmGame {
    inner: Game,
}

#[wasm_bindgen]
impl WasmGame {
    /// Create a new game. Pass `true` to allow captures out of mills when
    /// the opponent has nothing else left.
    #[wasm_bindgen(constructor)]
    pub fn new(capture_from_full_mills: Option<bool>) -> WasmGame {
        let rules = RuleSet {
            capture_from_full_mills: capture_from_full_mills.unwrap_or(false),
        };
        WasmGame {
            inner: Game::with_rules(rules),
        }
    }

    /// Start over with the same rules
    pub fn reset(&mut self) {
        self.inner = Game::with_rules(self.inner.rules());
    }

    /// Feed one click. `label` is the hit position letter, or null for a
    /// miss. Returns true if the click changed the game.
    pub fn click(&mut self, label: Option<String>) -> bool {
        let pos = label.and_then(|label| label.parse::<Pos>().ok());
        self.inner.click(pos).is_ok()
    }

    /// Full render state as a JS object
    pub fn snapshot(&self) -> Result<JsValue, JsValue> {
        serde_wasm_bindgen::to_value(&self.inner.snapshot()).map_err(Into::into)
    }

    /// Legal actions as an array of `{ kind, ... }` objects
    #[wasm_bindgen(js_name = legalActions)]
    pub fn legal_actions(&self) -> Result<JsValue, JsValue> {
        serde_wasm_bindgen::to_value(&self.inner.legal_actions()).map_err(Into::into)
    }

    #[wasm_bindgen(js_name = isGameOver)]
    pub fn is_game_over(&self) -> bool {
        self.inner.is_over()
    }

    /// Player expected to click next: 0 (White) or 1 (Black)
    #[wasm_bindgen(js_name = currentPlayer)]
    pub fn current_player(&self) -> u8 {
        self.inner.actor() as u8
    }

    /// Winner: 0 (none), 1 (White), or 2 (Black)
    pub fn winner(&self) -> u8 {
        match self.inner.winner() {
            None => 0,
            Some(Player::White) => 1,
            Some(Player::Black) => 2,
        }
    }
}

impl Default for WasmGame {
    fn default() -> Self {
        Self::new(None)
    }
}
