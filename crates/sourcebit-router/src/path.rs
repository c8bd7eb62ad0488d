//! Path template compilation and matching.

use std::collections::HashMap;

use regex::Regex;

use crate::error::{Result, RouterError};
use crate::request::PathParams;

/// Parameter name recorded for a wildcard segment.
pub const WILDCARD: &str = "*";

/// A segment in a path template.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PathSegment {
    /// A literal string segment.
    Literal(String),
    /// A parameter segment (e.g., `:id`). Matches exactly one segment.
    Param(String),
    /// A wildcard segment (`*`). Matches the remainder of the path.
    Wildcard,
}

/// What a route is registered with: a template, or a regex used verbatim.
#[derive(Debug, Clone)]
pub enum RoutePattern {
    /// A path template such as `/users/:id` or `/files/*`.
    Template(String),
    /// A pre-built regex. Captures nothing by name and has specificity 0.
    Raw(Regex),
}

impl From<&str> for RoutePattern {
    fn from(template: &str) -> Self {
        Self::Template(template.to_string())
    }
}

impl From<String> for RoutePattern {
    fn from(template: String) -> Self {
        Self::Template(template)
    }
}

impl From<&String> for RoutePattern {
    fn from(template: &String) -> Self {
        Self::Template(template.clone())
    }
}

impl From<Regex> for RoutePattern {
    fn from(regex: Regex) -> Self {
        Self::Raw(regex)
    }
}

/// A compiled path pattern for matching URLs.
#[derive(Debug, Clone)]
pub struct PathPattern {
    /// The template string, or the regex source for raw patterns.
    source: String,
    /// Parsed segments; `None` for raw patterns.
    segments: Option<Vec<PathSegment>>,
    /// Compiled regex for matching.
    regex: Regex,
    /// Parameter names in template order. A wildcard is recorded as `*`.
    param_names: Vec<String>,
    /// Number of literal segments.
    specificity: usize,
    /// Path prefix a raw pattern was mounted under; empty for templates.
    mount: String,
}

impl PathPattern {
    /// Compiles a path template.
    ///
    /// Template syntax:
    /// - `/users` - Literal path
    /// - `/users/:id` - Path with parameter
    /// - `/files/*` - Wildcard (matches the rest of the path, must be last)
    ///
    /// Empty segments are ignored, so `//users/` compiles like `/users`.
    /// The empty template and `/` match only the root.
    ///
    /// # Example
    ///
    /// ```
    /// use sourcebit_router::PathPattern;
    ///
    /// let pattern = PathPattern::compile("/posts/:id/comments/:comment_id").unwrap();
    /// let params = pattern.match_path("/posts/123/comments/456").unwrap();
    /// assert_eq!(params.get("id"), Some("123"));
    /// assert_eq!(params.get("comment_id"), Some("456"));
    /// assert_eq!(pattern.specificity(), 2);
    /// ```
    pub fn compile(template: &str) -> Result<Self> {
        let parts: Vec<&str> = template.split('/').filter(|s| !s.is_empty()).collect();
        let mut segments = Vec::with_capacity(parts.len());
        let mut param_names: Vec<String> = Vec::new();
        let mut regex_str = String::from("^");

        for (i, part) in parts.iter().enumerate() {
            if *part == WILDCARD {
                if i + 1 != parts.len() {
                    return Err(RouterError::template(
                        template,
                        "wildcard must be the final segment",
                    ));
                }
                segments.push(PathSegment::Wildcard);
                param_names.push(WILDCARD.to_string());
                regex_str.push_str("(?:/(.*))?");
            } else if let Some(name) = part.strip_prefix(':') {
                validate_param_name(template, name)?;
                if param_names.iter().any(|n| n == name) {
                    return Err(RouterError::template(
                        template,
                        format!("duplicate parameter name '{name}'"),
                    ));
                }
                segments.push(PathSegment::Param(name.to_string()));
                param_names.push(name.to_string());
                regex_str.push_str("/([^/]+)");
            } else {
                segments.push(PathSegment::Literal((*part).to_string()));
                regex_str.push('/');
                regex_str.push_str(&regex::escape(part));
            }
        }

        regex_str.push_str("/?$");

        let specificity = segments
            .iter()
            .filter(|s| matches!(s, PathSegment::Literal(_)))
            .count();

        Ok(Self {
            source: template.to_string(),
            segments: Some(segments),
            regex: Regex::new(&regex_str)?,
            param_names,
            specificity,
            mount: String::new(),
        })
    }

    /// Wraps a pre-built regex. It is used verbatim: no parameter names,
    /// specificity 0.
    pub fn raw(regex: Regex) -> Self {
        Self {
            source: regex.as_str().to_string(),
            segments: None,
            regex,
            param_names: Vec::new(),
            specificity: 0,
            mount: String::new(),
        }
    }

    /// Compiles either form of [`RoutePattern`].
    pub fn from_pattern(pattern: RoutePattern) -> Result<Self> {
        match pattern {
            RoutePattern::Template(template) => Self::compile(&template),
            RoutePattern::Raw(regex) => Ok(Self::raw(regex)),
        }
    }

    /// Returns a copy of this pattern rooted under `prefix`.
    ///
    /// Templates are recompiled from `prefix + template`. Raw patterns
    /// keep their regex and only see the part of the path after `prefix`,
    /// so every alternative of the regex stays under the mount.
    pub fn prefixed(&self, prefix: &str) -> Result<Self> {
        if self.segments.is_some() {
            return Self::compile(&format!("{prefix}{}", self.source));
        }
        let mut mounted = self.clone();
        mounted.mount = format!("{}{}", prefix.trim_end_matches('/'), self.mount);
        Ok(mounted)
    }

    /// Returns the path prefix a raw pattern is mounted under.
    pub fn mount_prefix(&self) -> &str {
        &self.mount
    }

    /// Strips the mount prefix. The prefix must end at a segment boundary;
    /// the bare prefix is seen as `/`.
    fn local<'p>(&self, path: &'p str) -> Option<&'p str> {
        if self.mount.is_empty() {
            return Some(path);
        }
        match path.strip_prefix(self.mount.as_str())? {
            "" => Some("/"),
            rest if rest.starts_with('/') => Some(rest),
            _ => None,
        }
    }

    /// Returns whether the path is accepted by this pattern.
    pub fn is_match(&self, path: &str) -> bool {
        self.local(path).is_some_and(|p| self.regex.is_match(p))
    }

    /// Returns the captured strings in template order.
    ///
    /// Groups that did not participate in the match yield `""`.
    pub fn extract(&self, path: &str) -> Option<Vec<String>> {
        let caps = self.regex.captures(self.local(path)?)?;
        Some(
            caps.iter()
                .skip(1)
                .map(|m| m.map_or_else(String::new, |m| m.as_str().to_string()))
                .collect(),
        )
    }

    /// Attempts to match a path against this pattern.
    ///
    /// Returns the named parameters if the path matches.
    pub fn match_path(&self, path: &str) -> Option<PathParams> {
        let values = self.extract(path)?;
        let mut params = PathParams::new();
        for (name, value) in self.param_names.iter().zip(values) {
            params.insert(name.clone(), value);
        }
        Some(params)
    }

    /// Returns the original template (or regex source).
    pub fn template(&self) -> &str {
        &self.source
    }

    /// Returns the parameter names.
    pub fn param_names(&self) -> &[String] {
        &self.param_names
    }

    /// Returns the number of literal segments.
    pub fn specificity(&self) -> usize {
        self.specificity
    }

    /// Returns whether this pattern wraps a raw regex.
    pub fn is_raw(&self) -> bool {
        self.segments.is_none()
    }

    /// Generates a path from parameters.
    ///
    /// A missing `*` value or an empty one drops the wildcard segment.
    /// Raw patterns cannot be reversed.
    ///
    /// # Example
    ///
    /// ```
    /// use std::collections::HashMap;
    /// use sourcebit_router::PathPattern;
    ///
    /// let pattern = PathPattern::compile("/posts/:id").unwrap();
    /// let params: HashMap<String, String> =
    ///     [("id".to_string(), "123".to_string())]
    ///     .into_iter()
    ///     .collect();
    /// let path = pattern.reverse(&params).unwrap();
    /// assert_eq!(path, "/posts/123");
    /// ```
    pub fn reverse(&self, params: &HashMap<String, String>) -> Option<String> {
        let mut path = String::new();

        for segment in self.segments.as_ref()? {
            match segment {
                PathSegment::Literal(s) => {
                    path.push('/');
                    path.push_str(s);
                }
                PathSegment::Param(name) => {
                    path.push('/');
                    path.push_str(params.get(name)?);
                }
                PathSegment::Wildcard => match params.get(WILDCARD) {
                    Some(rest) if !rest.is_empty() => {
                        path.push('/');
                        path.push_str(rest.trim_start_matches('/'));
                    }
                    _ => {}
                },
            }
        }

        if path.is_empty() {
            path.push('/');
        }

        Some(path)
    }
}

fn validate_param_name(template: &str, name: &str) -> Result<()> {
    if name.is_empty() {
        return Err(RouterError::template(template, "empty parameter name"));
    }
    if !name.chars().all(|c| c.is_ascii_alphanumeric() || c == '_') {
        return Err(RouterError::template(
            template,
            format!("invalid parameter name '{name}'"),
        ));
    }
    Ok(())
}
