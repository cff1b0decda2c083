use std::sync::Arc;

use ncube_core::{ApplicationId, CoreError, CubeRegistry, ExpressionHost, NCubeContext, ResourceFetcher, Sha1Digest};
use ncube_model::{ExpressionDescriptor, NameMap, Value};

/// A minimal [`ExpressionHost`] for tests: interprets a descriptor's source
/// as a tiny comparison language (`"field<N"`, `"field>=N"`, optionally
/// joined with `&&`), since dynamic expression compilation is an
/// out-of-scope external collaborator.
#[derive(Debug, Default)]
pub struct ComparisonHost;

impl ExpressionHost for ComparisonHost {
    fn compile(&self, descriptor: &ExpressionDescriptor) -> Result<Sha1Digest, CoreError> {
        Ok(Sha1Digest::of(descriptor.source.as_bytes()))
    }

    fn invoke(&self, descriptor: &ExpressionDescriptor, input: &NameMap) -> Result<Value, CoreError> {
        if descriptor.source == "RULESTOP" {
            return Err(CoreError::RuleStop);
        }
        let truthy = descriptor.source.split("&&").all(|clause| evaluate_clause(clause.trim(), input));
        Ok(Value::Boolean(truthy))
    }
}

fn evaluate_clause(clause: &str, input: &NameMap) -> bool {
    if let Some((field, literal)) = clause.split_once("==") {
        let literal = literal.trim().trim_matches('\'').trim_matches('"');
        return input.get(field.trim()).and_then(as_str).is_some_and(|v| v == literal);
    }
    let Some(split) = clause.find(|c: char| !c.is_alphabetic()) else {
        return false;
    };
    let (field, rest) = clause.split_at(split);
    let Some(field_value) = input.get(field).and_then(as_i64) else {
        return false;
    };
    if let Some(bound) = rest.strip_prefix(">=") {
        bound.trim().parse::<i64>().is_ok_and(|n| field_value >= n)
    } else if let Some(bound) = rest.strip_prefix('<') {
        bound.trim().parse::<i64>().is_ok_and(|n| field_value < n)
    } else {
        false
    }
}

fn as_i64(value: &Value) -> Option<i64> {
    match value {
        Value::Long(n) => Some(*n),
        Value::Double(d) => Some(*d as i64),
        _ => None,
    }
}

fn as_str(value: &Value) -> Option<&str> {
    match value {
        Value::String(s) => Some(s.as_str()),
        _ => None,
    }
}

#[derive(Debug, Default)]
pub struct NoopRegistry;

impl CubeRegistry for NoopRegistry {
    fn lookup(&self, _app: &ApplicationId, cube_name: &str, _coordinate: &NameMap) -> Result<Value, CoreError> {
        Err(CoreError::Lookup(format!("no cube registered under '{cube_name}'")))
    }
}

#[derive(Debug, Default)]
pub struct NoopFetcher;

impl ResourceFetcher for NoopFetcher {
    fn fetch(&self, url: &str) -> Result<String, CoreError> {
        Err(CoreError::Fetch(format!("no resource available at '{url}'")))
    }
}

pub fn test_context() -> NCubeContext {
    NCubeContext::new(Arc::new(NoopRegistry), Arc::new(ComparisonHost), Arc::new(NoopFetcher))
}

pub fn app() -> ApplicationId {
    ApplicationId::new("acme", "rates", "1.0.0", "SNAPSHOT", "HEAD")
}
