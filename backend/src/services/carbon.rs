use serde::Serialize;

pub const SECONDS_PER_HOUR: f64 = 3600.0;
/// Assumed average draw of one hosted runner, in kW.
pub const RUNNER_POWER_KW: f64 = 0.2;
/// Grid carbon intensity, in grams of CO2 per kWh.
pub const CARBON_INTENSITY_G_PER_KWH: f64 = 400.0;

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CarbonEstimate {
    pub total_duration_seconds: f64,
    #[serde(rename = "estimatedCO2Grams")]
    pub estimated_co2_grams: f64,
}

/// Linear estimate of the CO2 emitted by `total_duration_seconds` of runner
/// time. Callers pass non-negative durations.
pub fn estimate(total_duration_seconds: f64) -> CarbonEstimate {
    let duration_hours = total_duration_seconds / SECONDS_PER_HOUR;
    let energy_kwh = duration_hours * RUNNER_POWER_KW;
    let estimated_co2_grams = energy_kwh * CARBON_INTENSITY_G_PER_KWH;

    CarbonEstimate {
        total_duration_seconds,
        estimated_co2_grams,
    }
}
