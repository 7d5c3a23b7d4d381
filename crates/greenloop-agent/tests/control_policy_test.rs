//! Control policy tests covering both decision paths.

mod common;

use std::sync::Arc;

use common::{shared, snapshot_with, ScriptedOracle};
use greenloop_agent::{ControlPolicy, DecisionMode};
use greenloop_core::oracle::OracleError;
use greenloop_core::state::{AlertLevel, StateSnapshot};
use greenloop_devices::{Actuator, RecordingActuatorBank};

const SCENARIO_D: &str = r#"{"heater_on":true,"fan_on":false,"water_pump_on":false,"grow_lights_on":false,"alert_level":"warning","reason":"x"}"#;

fn deterministic() -> ControlPolicy {
    ControlPolicy::new(DecisionMode::Deterministic, Arc::new(RecordingActuatorBank::new()))
}

fn oracle_backed(oracle: ScriptedOracle) -> (ControlPolicy, Arc<ScriptedOracle>, Arc<RecordingActuatorBank>) {
    let (handle, dyn_oracle) = shared(oracle);
    let actuators = Arc::new(RecordingActuatorBank::new());
    let policy = ControlPolicy::new(DecisionMode::OracleBacked(dyn_oracle), actuators.clone());
    (policy, handle, actuators)
}

#[tokio::test]
async fn test_unparseable_response_matches_fallback_exactly() {
    let state = snapshot_with(19.0, 88.0, 15.0, 400.0);
    let expected = deterministic().fallback(state.clone());

    for response in ["not json", "{heater_on: yes}", "[1, 2]", "{\"heater_on\": \"on\"}", "{\"alert_level\": \"severe\"}"] {
        let (policy, oracle, _) = oracle_backed(ScriptedOracle::replies(&[response]));
        let out = policy.run(state.clone()).await;
        assert_eq!(out, expected, "response {:?}", response);
        assert_eq!(oracle.calls(), 1);
    }
}

#[tokio::test]
async fn test_oracle_error_matches_fallback_exactly() {
    let state = snapshot_with(27.0, 60.0, 58.0, 5000.0);
    let expected = deterministic().fallback(state.clone());

    let (policy, _, _) = oracle_backed(ScriptedOracle::new(vec![Err(OracleError::Timeout(30))]));
    assert_eq!(policy.run(state).await, expected);
}

#[tokio::test]
async fn test_oracle_decision_applied_verbatim() {
    let state = snapshot_with(22.0, 60.0, 50.0, 5000.0);
    let (policy, _, actuators) = oracle_backed(ScriptedOracle::replies(&[SCENARIO_D]));

    let out = policy.run(state.clone()).await;

    assert!(out.heater_on);
    assert!(!out.fan_on);
    assert!(!out.water_pump_on);
    assert!(!out.grow_lights_on);
    assert_eq!(out.alert_level, AlertLevel::Warning);
    assert_eq!(out.soil_moisture, 50.0);
    assert_eq!(out.temperature, state.temperature);

    assert_eq!(out.control_log.len(), 2);
    assert!(out.control_log.iter().all(|l| !l.contains("fallback")));
    assert!(out.control_log[0].ends_with(
        "Control actions (oracle): Heater ON, Fan OFF, Water pump OFF, Grow lights OFF"
    ));
    assert!(out.control_log[1].contains("Oracle reason: x (alert_level=warning, soil_before=50, soil_after=50)"));

    assert_eq!(actuators.last_state(Actuator::Heater), Some(true));
    assert_eq!(actuators.last_state(Actuator::Fan), Some(false));
    assert_eq!(actuators.last_state(Actuator::WaterPump), Some(false));
    assert_eq!(actuators.last_state(Actuator::GrowLights), Some(false));
}

#[tokio::test]
async fn test_decision_wrapped_in_prose() {
    let state = snapshot_with(22.0, 60.0, 50.0, 5000.0);
    let reply = format!("Sure! Here is my decision:\n```json\n{}\n```", SCENARIO_D);
    let (policy, _, _) = oracle_backed(ScriptedOracle::replies(&[reply.as_str()]));

    let out = policy.run(state).await;
    assert!(out.heater_on);
    assert_eq!(out.alert_level, AlertLevel::Warning);
}

#[tokio::test]
async fn test_partial_decision_defaults() {
    let mut state = snapshot_with(22.0, 60.0, 50.0, 5000.0);
    state.fan_on = true;
    state.grow_lights_on = true;
    state.alert_level = AlertLevel::Critical;

    let (policy, _, _) = oracle_backed(ScriptedOracle::replies(&[r#"{"heater_on": true}"#]));
    let out = policy.run(state).await;

    assert!(out.heater_on);
    // unspecified actuators keep their current state
    assert!(out.fan_on);
    assert!(out.grow_lights_on);
    assert!(!out.water_pump_on);
    // unspecified alert level resets to normal
    assert_eq!(out.alert_level, AlertLevel::Normal);
    assert!(out.control_log[1].contains("Oracle policy decision"));
}

#[tokio::test]
async fn test_oracle_pump_irrigates_with_clamp() {
    let (policy, _, _) = oracle_backed(ScriptedOracle::always(r#"{"water_pump_on": true}"#));

    let out = policy.run(snapshot_with(22.0, 60.0, 40.0, 5000.0)).await;
    assert!(out.water_pump_on);
    assert_eq!(out.soil_moisture, 55.0);
    assert!(out.control_log[1].contains("soil_before=40, soil_after=55"));

    let out = policy.run(snapshot_with(22.0, 60.0, 93.0, 5000.0)).await;
    assert_eq!(out.soil_moisture, 100.0);
}

#[tokio::test]
async fn test_fallback_pump_effect_for_all_soil_levels() {
    let policy = deterministic();
    let mut s = 0.0;
    while s <= 100.0 {
        let mut state = snapshot_with(24.0, 60.0, s, 5000.0);
        state.target_soil_moisture = 110.0;
        let out = policy.fallback(state);
        assert!(out.water_pump_on);
        assert_eq!(out.soil_moisture, (s + 15.0).min(100.0), "s={}", s);
        s += 2.5;
    }
}

#[tokio::test]
async fn test_scenario_b_dry_soil() {
    let mut state = StateSnapshot::initial();
    state.soil_moisture = 15.0;
    state.target_soil_moisture = 60.0;

    let out = deterministic().run(state).await;
    assert!(out.water_pump_on);
    assert_eq!(out.soil_moisture, 30.0);
}

#[tokio::test]
async fn test_heater_for_cold_regardless_of_humidity() {
    for humidity in [10.0, 60.0, 95.0] {
        let mut state = snapshot_with(0.0, humidity, 60.0, 5000.0);
        state.temperature = state.target_temperature - 3.0;
        let out = deterministic().fallback(state);
        assert!(out.heater_on, "humidity={}", humidity);
    }

    let mut state = snapshot_with(0.0, 60.0, 60.0, 5000.0);
    state.temperature = state.target_temperature - 3.0;
    assert!(!deterministic().fallback(state).fan_on);
}

#[tokio::test]
async fn test_fallback_sends_every_chosen_command() {
    let actuators = Arc::new(RecordingActuatorBank::new());
    let policy = ControlPolicy::new(DecisionMode::Deterministic, actuators.clone());

    let out = policy.run(snapshot_with(30.0, 60.0, 60.0, 200.0)).await;

    assert_eq!(actuators.last_state(Actuator::Heater), Some(out.heater_on));
    assert_eq!(actuators.last_state(Actuator::Fan), Some(out.fan_on));
    assert_eq!(actuators.last_state(Actuator::WaterPump), Some(out.water_pump_on));
    assert_eq!(actuators.last_state(Actuator::GrowLights), Some(out.grow_lights_on));
}

#[tokio::test]
async fn test_prompt_carries_readings_and_history() {
    let mut state = snapshot_with(18.5, 60.0, 50.0, 5000.0);
    state.monitoring_log.push("[t] Temp: 18.5°C".to_string());
    state.alert_level = AlertLevel::Warning;

    let (policy, oracle, _) = oracle_backed(ScriptedOracle::replies(&[SCENARIO_D]));
    policy.run(state).await;

    let prompt = &oracle.prompts()[0];
    assert!(prompt.contains("temperature_c: 18.5"));
    assert!(prompt.contains("Previous alert_level: warning"));
    assert!(prompt.contains("[t] Temp: 18.5°C"));
}

#[tokio::test]
async fn test_logs_only_grow() {
    let (policy, _, _) = oracle_backed(ScriptedOracle::new(vec![
        Ok(SCENARIO_D.to_string()),
        Ok("garbage".to_string()),
    ]));

    let state = StateSnapshot::initial();
    let first = policy.run(state).await;
    let second = policy.run(first.clone()).await;

    assert_eq!(second.control_log.len(), 4);
    assert_eq!(&second.control_log[..2], &first.control_log[..]);
    assert_eq!(&second.messages[..2], &first.messages[..]);
}
