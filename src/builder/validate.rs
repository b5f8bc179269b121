//! Configuration validation using Validation.
//!
//! Every check runs; all violations are reported together.

use super::controller::ControllerBuilder;
use super::error::ConfigViolation;
use crate::core::{State, TransitionDecision};
use std::collections::HashSet;
use stillwater::validation::Validation;
use stillwater::NonEmptyVec;

/// Result of one configuration check.
pub(crate) type ConfigCheck = Validation<(), NonEmptyVec<ConfigViolation>>;

fn require(ok: bool, violation: impl FnOnce() -> ConfigViolation) -> ConfigCheck {
    if ok {
        Validation::success(())
    } else {
        Validation::fail(violation())
    }
}

/// Check a builder's configuration, accumulating ALL violations.
pub(crate) fn validate_config<S: State>(builder: &ControllerBuilder<S>) -> ConfigCheck {
    let mut checks = Vec::new();
    checks.extend(check_lights(builder));
    checks.extend(check_patterns(builder));
    checks.extend(check_rules(builder));
    checks.extend(check_approaches(builder));
    checks.extend(check_start(builder));

    Validation::all_vec(checks).map(|_| ())
}

fn check_lights<S: State>(builder: &ControllerBuilder<S>) -> Vec<ConfigCheck> {
    let mut seen = HashSet::new();
    let mut checks = vec![require(!builder.lights.is_empty(), || {
        ConfigViolation::NoLights
    })];
    for light in &builder.lights {
        checks.push(require(seen.insert(light.as_str()), || {
            ConfigViolation::DuplicateLight {
                light: light.clone(),
            }
        }));
    }
    checks
}

fn check_patterns<S: State>(builder: &ControllerBuilder<S>) -> Vec<ConfigCheck> {
    let mut seen = HashSet::new();
    let mut checks = vec![require(!builder.patterns.is_empty(), || {
        ConfigViolation::NoPatterns
    })];

    for (state, pattern) in &builder.patterns {
        checks.push(require(seen.insert(*state), || {
            ConfigViolation::DuplicatePattern {
                state: state.name().to_string(),
            }
        }));
        for light in &builder.lights {
            checks.push(require(pattern.state_of(light).is_some(), || {
                ConfigViolation::IncompletePattern {
                    state: state.name().to_string(),
                    light: light.clone(),
                }
            }));
        }
        for (lamp, _) in pattern.iter() {
            checks.push(require(builder.lights.iter().any(|l| l == lamp), || {
                ConfigViolation::UnknownLight {
                    state: state.name().to_string(),
                    light: lamp.to_string(),
                }
            }));
        }
    }
    checks
}

fn check_rules<S: State>(builder: &ControllerBuilder<S>) -> Vec<ConfigCheck> {
    let mut checks = Vec::new();

    for ((from, to), rule) in builder.table.rules() {
        let named = [Some(from), Some(to), rule.redirect_to];
        for state in named.into_iter().flatten() {
            checks.push(require(builder.has_pattern(state), || {
                ConfigViolation::RuleUnknownState {
                    from: from.name().to_string(),
                    to: to.name().to_string(),
                    state: state.name().to_string(),
                }
            }));
        }

        checks.push(require(!to.is_transient(), || ConfigViolation::RuleToTransient {
            from: from.name().to_string(),
            to: to.name().to_string(),
        }));

        if let (true, Some(via)) = (rule.allowed, rule.redirect_to) {
            let chained = matches!(
                builder.table.resolve(from, via),
                TransitionDecision::Redirect(_)
            );
            checks.push(require(!chained, || ConfigViolation::RedirectChain {
                from: from.name().to_string(),
                to: to.name().to_string(),
                via: via.name().to_string(),
            }));
            checks.push(require(!via.is_transient(), || {
                ConfigViolation::RedirectToTransient {
                    from: from.name().to_string(),
                    to: to.name().to_string(),
                    via: via.name().to_string(),
                }
            }));
        }
    }
    checks
}

fn check_approaches<S: State>(builder: &ControllerBuilder<S>) -> Vec<ConfigCheck> {
    let mut checks = Vec::new();

    for (target, via) in builder.sequencing.approaches() {
        checks.push(require(builder.has_pattern(target), || {
            ConfigViolation::ApproachUnknownState {
                target: target.name().to_string(),
                state: target.name().to_string(),
            }
        }));
        for state in via {
            checks.push(require(builder.has_pattern(*state), || {
                ConfigViolation::ApproachUnknownState {
                    target: target.name().to_string(),
                    state: state.name().to_string(),
                }
            }));
            checks.push(require(state.is_transient(), || {
                ConfigViolation::ApproachNotTransient {
                    target: target.name().to_string(),
                    state: state.name().to_string(),
                }
            }));
        }
    }
    checks
}

fn check_start<S: State>(builder: &ControllerBuilder<S>) -> Vec<ConfigCheck> {
    let mut checks = Vec::new();

    if let Some((start, _)) = builder.patterns.first() {
        checks.push(require(!start.is_transient(), || {
            ConfigViolation::TransientStart {
                state: start.name().to_string(),
            }
        }));
    }
    if let Some(initial) = builder.initial {
        checks.push(require(builder.has_pattern(initial), || {
            ConfigViolation::UnknownInitial {
                state: initial.name().to_string(),
            }
        }));
        checks.push(require(!initial.is_transient(), || {
            ConfigViolation::TransientInitial {
                state: initial.name().to_string(),
            }
        }));
    }
    checks
}
