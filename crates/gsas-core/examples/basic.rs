// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 MuVeraAI Corporation

//! # Basic Governance Engine Example
//!
//! Registers a few primitives (one of them a composite), evaluates two
//! actions and prints the decisions and their proofs.  Run with:
//!
//! ```bash
//! RUST_LOG=gsas_core=debug cargo run --example basic
//! ```

use std::sync::Arc;

use gsas_core::{
    compliance::ComplianceChecker,
    composition::threshold,
    config::{Config, TraceLevel},
    context::DeterministicContext,
    engine::GovernanceEngine,
    primitive::{FnPrimitive, GovernancePrimitive, PrimitiveRef},
    types::{EvaluationResult, GovernanceDecision},
};
use serde_json::{json, Map, Value};
use tracing_subscriber::EnvFilter;

fn approver(name: &'static str) -> PrimitiveRef {
    Arc::new(FnPrimitive::new(name, "1.0.0", move |ctx: &DeterministicContext| {
        let approvals = ctx.get("approvals", json!([]));
        let approved = approvals
            .as_array()
            .is_some_and(|list| list.iter().any(|v| v == name));
        if approved {
            EvaluationResult::pass()
        } else {
            EvaluationResult::fail(format!("{name} has not approved"))
        }
    }))
}

fn print_decision(label: &str, decision: &GovernanceDecision) {
    println!("{label}: permitted = {}", decision.permitted);
    for signal in &decision.signals {
        println!("  signal {:<12} valid = {:?}", signal.primitive_id, signal.valid);
    }
    for reason in &decision.failure_reasons {
        println!("  reason: {reason}");
    }
    for (id, commitment) in decision.proof.evaluation_order.iter().zip(&decision.proof.signal_commitments) {
        println!("  commit {id:<12} {commitment}");
    }
    println!();
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    println!("GSAS - Basic Example\n");

    // -----------------------------------------------------------------------
    // 1. Construct the engine
    // -----------------------------------------------------------------------
    let engine = GovernanceEngine::with_config(Config {
        trace_level: TraceLevel::Detailed,
        validate_contract_on_register: true,
    });

    // -----------------------------------------------------------------------
    // 2. Define primitives and check them before registration
    // -----------------------------------------------------------------------
    let spend_limit = FnPrimitive::new("spend_limit", "1.0.0", |ctx: &DeterministicContext| {
        match ctx.get("amount", Value::Null).as_f64() {
            Some(amount) if amount <= 1_000.0 => EvaluationResult::pass(),
            Some(amount) => EvaluationResult::fail(format!("amount {amount} exceeds 1000")),
            None => EvaluationResult::fail("amount missing"),
        }
    });
    let two_of_three = threshold(vec![approver("alice"), approver("bob"), approver("carol")], 2)
        .with_name("two_of_three");

    let checker = ComplianceChecker::new();
    for primitive in [&spend_limit as &dyn GovernancePrimitive, &two_of_three] {
        match checker.check_primitive(Some(primitive)) {
            Ok(report) if report.compliant => {}
            Ok(report) => {
                for violation in &report.violations {
                    eprintln!("compliance: {violation}");
                }
            }
            Err(err) => eprintln!("compliance check failed: {err}"),
        }
    }

    // -----------------------------------------------------------------------
    // 3. Register in evaluation order
    // -----------------------------------------------------------------------
    for (id, result) in [
        ("spend_limit", engine.register("spend_limit", spend_limit)),
        ("approvals", engine.register("approvals", two_of_three)),
    ] {
        if let Err(err) = result {
            eprintln!("could not register {id}: {err}");
            return;
        }
    }
    println!("{} primitives registered\n", engine.primitive_count());

    // -----------------------------------------------------------------------
    // 4. Evaluate
    // -----------------------------------------------------------------------
    let mut data = Map::new();
    data.insert("amount".into(), json!(250));
    data.insert("approvals".into(), json!(["alice", "carol"]));
    let decision = engine.evaluate_with_logical_time(&DeterministicContext::new(&data, 1), 1);
    print_decision("payment of 250", &decision);

    data.insert("approvals".into(), json!(["bob"]));
    let decision = engine.evaluate_with_logical_time(&DeterministicContext::new(&data, 2), 2);
    print_decision("payment of 250 with one approval", &decision);

    // -----------------------------------------------------------------------
    // 5. Emit the proof document
    // -----------------------------------------------------------------------
    match serde_json::to_string_pretty(&decision.proof) {
        Ok(document) => println!("{document}"),
        Err(err) => eprintln!("could not serialise proof: {err}"),
    }
}
