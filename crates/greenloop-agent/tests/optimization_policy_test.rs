//! Optimization policy tests covering both decision paths.

mod common;

use common::{shared, ScriptedOracle};
use greenloop_agent::{DecisionMode, OptimizationPolicy};
use greenloop_core::oracle::OracleError;
use greenloop_core::state::StateSnapshot;

fn oracle_backed(oracle: ScriptedOracle) -> (OptimizationPolicy, std::sync::Arc<ScriptedOracle>) {
    let (handle, dyn_oracle) = shared(oracle);
    (OptimizationPolicy::new(DecisionMode::OracleBacked(dyn_oracle)), handle)
}

fn busy_snapshot() -> StateSnapshot {
    let mut state = StateSnapshot::initial();
    state.temperature = 24.4;
    for i in 0..6 {
        state.control_log.push(format!("[t] entry {} Heater ON", i));
    }
    state
}

#[tokio::test]
async fn test_oracle_targets_applied_with_clamping() {
    let (policy, _) = oracle_backed(ScriptedOracle::replies(&[
        r#"{"target_temperature": 40, "target_humidity": 55.55, "target_soil_moisture": 5, "target_light_hours": 16, "reason": "cooler nights"}"#,
    ]));

    let out = policy.run(StateSnapshot::initial()).await;

    assert_eq!(out.target_temperature, 35.0);
    assert_eq!(out.target_humidity, 55.6);
    assert_eq!(out.target_soil_moisture, 10.0);
    assert_eq!(out.target_light_hours, 16);
    assert_eq!(out.optimization_log.len(), 2);
    assert!(out.optimization_log[0]
        .ends_with("Oracle optimization: T=35°C, RH=55.6%, Soil=10%, LightHours=16"));
    assert!(out.optimization_log[1].ends_with("Oracle optimization reason: cooler nights"));
    assert!(out.messages[1].starts_with("OptimizationWhy: "));
}

#[tokio::test]
async fn test_invalid_fields_keep_current_values() {
    let (policy, _) = oracle_backed(ScriptedOracle::replies(&[
        r#"{"target_temperature": "warm", "target_humidity": null, "target_light_hours": "many", "target_soil_moisture": "58.0"}"#,
    ]));

    let out = policy.run(StateSnapshot::initial()).await;

    assert_eq!(out.target_temperature, 24.0);
    assert_eq!(out.target_humidity, 65.0);
    assert_eq!(out.target_light_hours, 12);
    assert_eq!(out.target_soil_moisture, 58.0);
    assert!(out.optimization_log[0].contains("Oracle optimization"));
}

#[tokio::test]
async fn test_light_hours_stay_in_domain() {
    for (reply, expected) in [
        (r#"{"target_light_hours": 2}"#, 4),
        (r#"{"target_light_hours": 24}"#, 20),
        (r#"{"target_light_hours": 9.9}"#, 9),
        (r#"{"target_light_hours": "15"}"#, 15),
    ] {
        let (policy, _) = oracle_backed(ScriptedOracle::replies(&[reply]));
        let out = policy.run(StateSnapshot::initial()).await;
        assert_eq!(out.target_light_hours, expected, "reply {}", reply);
    }
}

#[tokio::test]
async fn test_unparseable_response_matches_fallback_exactly() {
    let state = busy_snapshot();
    let expected = OptimizationPolicy::new(DecisionMode::Deterministic).fallback(state.clone());
    assert_eq!(expected.target_temperature, 24.5);

    for response in ["not json", "{target_temperature: 22}", "\"22\""] {
        let (policy, _) = oracle_backed(ScriptedOracle::replies(&[response]));
        assert_eq!(policy.run(state.clone()).await, expected, "response {:?}", response);
    }

    let (policy, _) = oracle_backed(ScriptedOracle::new(vec![Err(OracleError::Network(
        "connection reset".to_string(),
    ))]));
    assert_eq!(policy.run(state).await, expected);
}

#[tokio::test]
async fn test_prompt_uses_last_ten_lines() {
    let mut state = StateSnapshot::initial();
    for i in 0..15 {
        state.monitoring_log.push(format!("monitor line {:02}", i));
        state.control_log.push(format!("control line {:02}", i));
    }
    let (policy, oracle) = oracle_backed(ScriptedOracle::replies(&["{}"]));
    policy.run(state).await;

    let prompt = &oracle.prompts()[0];
    assert!(!prompt.contains("monitor line 04"));
    assert!(prompt.contains("monitor line 05"));
    assert!(prompt.contains("control line 14"));
    assert!(prompt.contains("target_temperature_c: 24"));
}

#[tokio::test]
async fn test_empty_object_changes_nothing_but_logs() {
    let (policy, _) = oracle_backed(ScriptedOracle::replies(&["{}"]));
    let state = StateSnapshot::initial();
    let out = policy.run(state.clone()).await;

    assert_eq!(out.target_temperature, state.target_temperature);
    assert_eq!(out.target_light_hours, state.target_light_hours);
    assert_eq!(out.optimization_log.len(), 2);
    assert!(out.optimization_log[1].contains("Oracle optimization decision"));
}

#[tokio::test]
async fn test_fallback_bump_is_bounded_per_cycle() {
    let policy = OptimizationPolicy::new(DecisionMode::Deterministic);
    let mut state = busy_snapshot();
    let mut previous = state.target_temperature;
    for _ in 0..40 {
        state.temperature = state.target_temperature;
        state = policy.fallback(state);
        assert!(state.target_temperature - previous <= 0.5 + 1e-9);
        assert!(state.target_temperature <= 35.0);
        previous = state.target_temperature;
    }
}
