//! Named parameter rules and the guard handler built from them.

use std::collections::HashMap;
use std::sync::Arc;

use serde_json::json;

use crate::error::{HandlerResult, Result, RouterError};
use crate::handler::{BoxFuture, Handler};
use crate::request::Request;
use crate::response::Response;

/// A predicate over a raw parameter string.
pub type Rule = Arc<dyn Fn(&str) -> bool + Send + Sync>;

/// A registry of named parameter rules.
///
/// Starts with `int`, `float`, `string` and `boolean`. Names are unique:
/// adding an existing name fails instead of replacing the rule.
///
/// ```
/// use sourcebit_router::RuleRegistry;
///
/// let mut rules = RuleRegistry::new();
/// rules.add("slug", |v| v.chars().all(|c| c.is_ascii_lowercase() || c == '-')).unwrap();
/// assert!(rules.check("slug", "hello-world").unwrap());
/// assert!(rules.add("int", |_| true).is_err());
/// ```
#[derive(Clone)]
pub struct RuleRegistry {
    rules: HashMap<String, Rule>,
}

impl RuleRegistry {
    /// Creates a registry with the built-in rules.
    pub fn new() -> Self {
        let mut rules: HashMap<String, Rule> = HashMap::new();
        rules.insert("int".into(), Arc::new(|v: &str| v.parse::<i64>().is_ok()));
        rules.insert("float".into(), Arc::new(|v: &str| v.parse::<f64>().is_ok()));
        rules.insert("string".into(), Arc::new(|_: &str| true));
        rules.insert(
            "boolean".into(),
            Arc::new(|v: &str| v == "true" || v == "false"),
        );
        Self { rules }
    }

    /// Registers a rule under a new name.
    pub fn add<F>(&mut self, name: impl Into<String>, rule: F) -> Result<()>
    where
        F: Fn(&str) -> bool + Send + Sync + 'static,
    {
        let name = name.into();
        if self.rules.contains_key(&name) {
            return Err(RouterError::DuplicateRule(name));
        }
        self.rules.insert(name, Arc::new(rule));
        Ok(())
    }

    /// Looks up a rule.
    pub fn get(&self, name: &str) -> Option<&Rule> {
        self.rules.get(name)
    }

    /// Returns whether a rule is registered.
    pub fn contains(&self, name: &str) -> bool {
        self.rules.contains_key(name)
    }

    /// Applies a rule to a value.
    pub fn check(&self, name: &str, value: &str) -> Result<bool> {
        let rule = self
            .get(name)
            .ok_or_else(|| RouterError::UnknownRule(name.to_string()))?;
        Ok(rule(value))
    }

    /// Builds a handler that checks path parameters against rules.
    ///
    /// `checks` pairs a parameter name with a rule name. Every rule must
    /// already be registered.
    pub fn guard(&self, checks: &[(&str, &str)]) -> Result<ParamGuard> {
        let checks = checks
            .iter()
            .map(|&(param, rule_name)| {
                let rule = self
                    .get(rule_name)
                    .cloned()
                    .ok_or_else(|| RouterError::UnknownRule(rule_name.to_string()))?;
                Ok(ParamCheck {
                    param: param.to_string(),
                    rule_name: rule_name.to_string(),
                    rule,
                })
            })
            .collect::<Result<Vec<_>>>()?;
        Ok(ParamGuard { checks })
    }
}

impl Default for RuleRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for RuleRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let mut names: Vec<&str> = self.rules.keys().map(String::as_str).collect();
        names.sort_unstable();
        f.debug_struct("RuleRegistry").field("rules", &names).finish()
    }
}

#[derive(Clone)]
struct ParamCheck {
    param: String,
    rule_name: String,
    rule: Rule,
}

/// A handler that rejects requests whose path parameters fail their rules.
///
/// On the first failure it commits a 400 response, which stops the chain.
/// A missing parameter counts as a failure.
#[derive(Clone)]
pub struct ParamGuard {
    checks: Vec<ParamCheck>,
}

impl ParamGuard {
    fn first_failure(&self, req: &Request) -> Option<&ParamCheck> {
        self.checks.iter().find(|check| {
            req.params
                .get(&check.param)
                .map_or(true, |value| !(check.rule)(value))
        })
    }
}

impl Handler for ParamGuard {
    fn call<'a>(
        &'a self,
        req: &'a mut Request,
        res: &'a mut Response,
    ) -> BoxFuture<'a, HandlerResult> {
        Box::pin(async move {
            if let Some(check) = self.first_failure(req) {
                let message = format!(
                    "Invalid type for parameter {}. Expected {}.",
                    check.param, check.rule_name
                );
                res.status(400).json(&json!({ "error": message }))?;
            }
            Ok(())
        })
    }
}

impl std::fmt::Debug for ParamGuard {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let checks: Vec<(&str, &str)> = self
            .checks
            .iter()
            .map(|c| (c.param.as_str(), c.rule_name.as_str()))
            .collect();
        f.debug_struct("ParamGuard").field("checks", &checks).finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builtin_rules() {
        let rules = RuleRegistry::new();
        assert!(rules.check("int", "42").unwrap());
        assert!(!rules.check("int", "4.2").unwrap());
        assert!(rules.check("float", "4.2").unwrap());
        assert!(rules.check("boolean", "false").unwrap());
        assert!(!rules.check("boolean", "yes").unwrap());
        assert!(rules.check("string", "").unwrap());
        assert!(matches!(
            rules.check("uuid", "x"),
            Err(RouterError::UnknownRule(_))
        ));
    }

    #[test]
    fn test_duplicate_rule_is_rejected() {
        let mut rules = RuleRegistry::new();
        rules.add("even", |v| v.parse::<i64>().is_ok_and(|n| n % 2 == 0)).unwrap();
        let err = rules.add("even", |_| true).unwrap_err();
        assert!(matches!(err, RouterError::DuplicateRule(name) if name == "even"));
        assert!(rules.check("even", "4").unwrap());
        assert!(!rules.check("even", "3").unwrap());
    }

    #[test]
    fn test_guard_requires_known_rules() {
        let rules = RuleRegistry::new();
        assert!(rules.guard(&[("id", "int")]).is_ok());
        assert!(matches!(
            rules.guard(&[("id", "nope")]),
            Err(RouterError::UnknownRule(_))
        ));
    }

    #[tokio::test]
    async fn test_guard_passes_valid_params() {
        let guard = RuleRegistry::new().guard(&[("id", "int")]).unwrap();
        let mut req = Request::get("/users/7");
        req.params.insert("id", "7");
        let mut res = Response::new();
        guard.call(&mut req, &mut res).await.unwrap();
        assert!(!res.is_committed());
    }

    #[tokio::test]
    async fn test_guard_rejects_invalid_params() {
        let guard = RuleRegistry::new().guard(&[("id", "int")]).unwrap();
        let mut req = Request::get("/users/abc");
        req.params.insert("id", "abc");
        let mut res = Response::new();
        guard.call(&mut req, &mut res).await.unwrap();
        assert!(res.is_committed());
        assert_eq!(res.status, 400);
        assert_eq!(
            res.body_json(),
            Some(json!({"error": "Invalid type for parameter id. Expected int."}))
        );
    }

    #[tokio::test]
    async fn test_guard_rejects_missing_params() {
        let guard = RuleRegistry::new().guard(&[("id", "string")]).unwrap();
        let mut req = Request::get("/");
        let mut res = Response::new();
        guard.call(&mut req, &mut res).await.unwrap();
        assert_eq!(res.status, 400);
    }
}
