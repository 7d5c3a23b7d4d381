//! Change summary between two snapshots.

use crate::state::StateSnapshot;

/// Returned by [`diff_state`] when nothing observable changed.
pub const NO_MATERIAL_CHANGES: &str = "No material changes";

fn on_off(b: bool) -> &'static str {
    if b {
        "ON"
    } else {
        "OFF"
    }
}

// Two NaN readings count as unchanged.
fn float_changed(a: f64, b: f64) -> bool {
    a != b && !(a.is_nan() && b.is_nan())
}

/// Return a one-line summary of what changed between `prev` and `curr`.
///
/// Fragments are `field: before→after` and are joined with `"; "`.
pub fn diff_state(prev: &StateSnapshot, curr: &StateSnapshot) -> String {
    let mut parts = Vec::new();

    let sensors = [
        ("temperature", prev.temperature, curr.temperature, "°C"),
        ("humidity", prev.humidity, curr.humidity, "%"),
        ("soil_moisture", prev.soil_moisture, curr.soil_moisture, "%"),
        ("light_level", prev.light_level, curr.light_level, " lux"),
    ];
    for (name, before, after, unit) in sensors {
        if float_changed(before, after) {
            parts.push(format!("{}: {}→{}{}", name, before, after, unit));
        }
    }

    let actuators = [
        ("Heater", prev.heater_on, curr.heater_on),
        ("Fan", prev.fan_on, curr.fan_on),
        ("Pump", prev.water_pump_on, curr.water_pump_on),
        ("Lights", prev.grow_lights_on, curr.grow_lights_on),
    ];
    for (label, before, after) in actuators {
        if before != after {
            parts.push(format!("{}: {}→{}", label, on_off(before), on_off(after)));
        }
    }

    let targets = [
        ("TargetTemp", prev.target_temperature, curr.target_temperature),
        ("TargetRH", prev.target_humidity, curr.target_humidity),
        ("TargetSoil", prev.target_soil_moisture, curr.target_soil_moisture),
    ];
    for (label, before, after) in targets {
        if float_changed(before, after) {
            parts.push(format!("{}: {}→{}", label, before, after));
        }
    }
    if prev.target_light_hours != curr.target_light_hours {
        parts.push(format!(
            "TargetLightHours: {}→{}",
            prev.target_light_hours, curr.target_light_hours
        ));
    }

    if prev.alert_level != curr.alert_level {
        parts.push(format!(
            "Alert: {}→{}",
            prev.alert_level.as_str().to_uppercase(),
            curr.alert_level.as_str().to_uppercase()
        ));
    }

    if parts.is_empty() {
        NO_MATERIAL_CHANGES.to_string()
    } else {
        parts.join("; ")
    }
}
