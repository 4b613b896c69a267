//! Matcher evaluation.
//!
//! Every function here is pure: the same matcher and response always give the
//! same answer. Unknown matcher kinds and unknown response parts are false.

use std::time::Duration;
use crate::errors::StepFailure;
use crate::models::{HttpResponse, StepEvaluation, StepResult, Verdict};
use crate::template::{Condition, Matcher, ResponsePart, Step, TimeThreshold};

pub fn evaluate(matcher: &Matcher, response: &HttpResponse) -> bool {
    match matcher {
        Matcher::Word { part: ResponsePart::Body, words } => {
            words.iter().all(|word| response.body.contains(word.as_str()))
        }
        Matcher::Word { part: ResponsePart::Other(_), .. } => false,
        Matcher::Status { codes } => codes.contains(&response.status),
        Matcher::Time(threshold) => evaluate_time(threshold, response.latency),
        Matcher::Unsupported { .. } => false,
    }
}

/// Every comparator present must hold. An empty threshold never matches.
pub fn evaluate_time(threshold: &TimeThreshold, latency: Duration) -> bool {
    if threshold.is_empty() {
        return false;
    }
    let secs = latency.as_secs_f64();
    threshold.gt.map_or(true, |v| secs > v)
        && threshold.lt.map_or(true, |v| secs < v)
        && threshold.gte.map_or(true, |v| secs >= v)
        && threshold.lte.map_or(true, |v| secs <= v)
}

pub fn evaluate_step(step: &Step, response: &HttpResponse) -> StepEvaluation {
    if step.matchers.is_empty() {
        return StepEvaluation::NoRule;
    }

    let matched = match step.condition {
        Condition::And => step.matchers.iter().all(|m| evaluate(m, response)),
        Condition::Or => step.matchers.iter().any(|m| evaluate(m, response)),
    };

    if matched {
        StepEvaluation::Matched
    } else {
        StepEvaluation::NotMatched
    }
}

/// Score a whole template from the per-step results, in step order.
pub fn evaluate_template(steps: &[Step], results: &[StepResult]) -> Verdict {
    combine_steps(steps.iter().zip(results).map(|(step, result)| match result {
        StepResult::Response(response) => Ok(evaluate_step(step, response)),
        StepResult::Failed(failure) => Err(failure),
    }))
}

/// AND across every step that produced a response and carried matchers.
///
/// Failed steps and `NoRule` steps are left out of the AND. If no step got a
/// response at all the verdict is an error; if responses came back but none
/// had rules, `NoRule`.
pub fn combine_steps<'a, I>(outcomes: I) -> Verdict
where
    I: IntoIterator<Item = Result<StepEvaluation, &'a StepFailure>>,
{
    let mut failures = Vec::new();
    let mut responded = 0usize;
    let mut scored = 0usize;
    let mut all_matched = true;

    for (index, outcome) in outcomes.into_iter().enumerate() {
        match outcome {
            Err(failure) => {
                failures.push(format!("step {} {}: {}", index + 1, failure.kind(), failure));
            }
            Ok(evaluation) => {
                responded += 1;
                match evaluation {
                    StepEvaluation::NoRule => {}
                    StepEvaluation::Matched => scored += 1,
                    StepEvaluation::NotMatched => {
                        scored += 1;
                        all_matched = false;
                    }
                }
            }
        }
    }

    if responded == 0 && !failures.is_empty() {
        return Verdict::Error(failures.join("; "));
    }
    if scored == 0 {
        return Verdict::NoRule;
    }
    if all_matched {
        Verdict::Vulnerable
    } else {
        Verdict::NotVulnerable
    }
}
