use wasm_bindgen::prelude::*;

use crate::config::SolverConfig;
use crate::interchange::{palette_from_json, walls_from_json, walls_to_json};

fn to_js_error(err: impl ToString) -> JsValue {
    js_sys::Error::new(&err.to_string()).into()
}

/// Solve a wall layout for a browser front end.
///
/// Takes a palette document and a wall document, and returns the wall document with every route colored.
/// Throws an `Error` carrying the diagnostic if no coloring was found.
#[wasm_bindgen(js_name = solveWalls)]
pub fn solve_walls(palette_json: &str, walls_json: &str) -> Result<String, JsValue> {
    let palette = palette_from_json(palette_json).map_err(to_js_error)?;
    let mut walls = walls_from_json(walls_json).map_err(to_js_error)?;

    let solution = walls.solve(palette, &SolverConfig::default());
    if let Some(diagnostic) = solution.diagnostic() {
        return Err(to_js_error(diagnostic));
    }

    walls_to_json(&walls).map_err(to_js_error)
}
