use std::collections::BTreeMap;
use crate::config::ScanConfig;
use crate::errors::StepFailure;
use crate::models::PreparedRequest;
use crate::template::{HttpMethod, Step, BASE_URL_PLACEHOLDER};

/// Turn one step into a concrete request against `base_url`.
///
/// The placeholder is replaced with the literal target URL, no normalization.
/// GET appends the step body to the query string; POST sends it verbatim.
pub fn build_request(
    step: &Step,
    base_url: &str,
    config: &ScanConfig,
) -> Result<PreparedRequest, StepFailure> {
    let method = match &step.method {
        HttpMethod::Get => HttpMethod::Get,
        HttpMethod::Post => HttpMethod::Post,
        HttpMethod::Other(name) => return Err(StepFailure::UnsupportedMethod(name.clone())),
    };

    let mut url = step.path.replace(BASE_URL_PLACEHOLDER, base_url);
    let headers = resolve_headers(&config.headers, &step.headers);

    let body = match method {
        HttpMethod::Get => {
            if let Some(query) = step.body.as_deref().filter(|b| !b.is_empty()) {
                append_query(&mut url, query);
            }
            None
        }
        _ => step.body.clone(),
    };

    Ok(PreparedRequest { method, url, headers, body })
}

/// Config headers overlaid by step headers. Names compare case-insensitively and
/// the step's value wins; a colliding name keeps the config's position.
///
/// Each name appears at most once in the result, even when the config map
/// itself holds the same name in two spellings.
pub fn resolve_headers(
    config_headers: &BTreeMap<String, String>,
    step_headers: &[(String, String)],
) -> Vec<(String, String)> {
    let mut resolved = Vec::with_capacity(config_headers.len() + step_headers.len());
    for (name, value) in config_headers.iter().chain(step_headers.iter().map(|(k, v)| (k, v))) {
        overlay(&mut resolved, name, value);
    }
    resolved
}

fn overlay(headers: &mut Vec<(String, String)>, name: &str, value: &str) {
    let entry = (name.to_string(), value.to_string());
    match headers.iter_mut().find(|(k, _)| k.eq_ignore_ascii_case(name)) {
        Some(existing) => *existing = entry,
        None => headers.push(entry),
    }
}

fn append_query(url: &mut String, query: &str) {
    let query = query.trim_start_matches(['?', '&']);
    if query.is_empty() {
        return;
    }
    let fragment = url.find('#').map(|pos| url.split_off(pos));
    if url.contains('?') {
        if !url.ends_with('?') && !url.ends_with('&') {
            url.push('&');
        }
    } else {
        url.push('?');
    }
    url.push_str(query);
    if let Some(fragment) = fragment {
        url.push_str(&fragment);
    }
}
