use napi::Result as NapiResult;
use napi_derive::napi;
use serde::de::DeserializeOwned;
use serde::Serialize;

use bizcase_core::projection::break_even;
use bizcase_core::scenarios::{engine, scenario, sensitivity};
use bizcase_core::{BizCaseResult, CalculationInput, FloatCalculationInput};

/// Convert any Display error into a napi::Error.
fn to_napi_error(e: impl std::fmt::Display) -> napi::Error {
    napi::Error::from_reason(e.to_string())
}

/// Parse a JSON input, run `f`, and serialise its output back to JSON.
fn json_call<I, O>(input_json: &str, f: impl FnOnce(&I) -> BizCaseResult<O>) -> NapiResult<String>
where
    I: DeserializeOwned,
    O: Serialize,
{
    let input: I = serde_json::from_str(input_json).map_err(to_napi_error)?;
    let output = f(&input).map_err(to_napi_error)?;
    serde_json::to_string(&output).map_err(to_napi_error)
}

// ---------------------------------------------------------------------------
// Single case
// ---------------------------------------------------------------------------

#[napi]
pub fn calculate_case(input_json: String) -> NapiResult<String> {
    json_call(&input_json, engine::calculate_case)
}

/// Same as `calculate_case` but takes plain JS numbers; NaN and Infinity are rejected.
#[napi]
pub fn calculate_case_from_numbers(input_json: String) -> NapiResult<String> {
    json_call(&input_json, |raw: &FloatCalculationInput| {
        engine::calculate_case(&CalculationInput::try_from(*raw)?)
    })
}

#[napi]
pub fn break_even_analysis(input_json: String) -> NapiResult<String> {
    json_call(&input_json, break_even::analyze_break_even)
}

// ---------------------------------------------------------------------------
// Scenarios
// ---------------------------------------------------------------------------

#[napi]
pub fn run_scenarios(input_json: String) -> NapiResult<String> {
    json_call(&input_json, scenario::run_scenarios)
}

#[napi]
pub fn compare_scenarios(input_json: String) -> NapiResult<String> {
    json_call(&input_json, scenario::compare_scenarios)
}

// ---------------------------------------------------------------------------
// Sensitivity
// ---------------------------------------------------------------------------

#[napi]
pub fn sensitivity_analysis(input_json: String) -> NapiResult<String> {
    json_call(&input_json, sensitivity::analyze_sensitivity)
}

#[napi]
pub fn tornado_analysis(input_json: String) -> NapiResult<String> {
    json_call(&input_json, sensitivity::tornado_analysis)
}
