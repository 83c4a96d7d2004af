use std::collections::HashSet;

use actix_web::http::Method;
use anyhow::{bail, Context, Result};

/// Routes served without any credential. Entries are written as
/// `"METHOD /path"`; a path ending in `/*` matches the prefix and everything
/// below it.
const DEFAULT_ENTRIES: &[&str] = &[
    "GET /",
    "GET /healthz",
    "GET /readyz",
    "POST /auth",
    "GET /auth/login",
    "GET /auth/callback",
    "GET /public",
    "GET /public/*",
];

#[derive(Debug, Clone)]
pub struct BypassList {
    exact: HashSet<(Method, String)>,
    prefixes: Vec<(Method, String)>,
}

impl BypassList {
    pub fn new(extra: &[String]) -> Result<Self> {
        let mut list = Self {
            exact: HashSet::new(),
            prefixes: Vec::new(),
        };
        for entry in DEFAULT_ENTRIES {
            list.add(entry)?;
        }
        for entry in extra {
            list.add(entry)
                .with_context(|| format!("parse public path '{entry}'"))?;
        }
        Ok(list)
    }

    fn add(&mut self, entry: &str) -> Result<()> {
        let mut fields = entry.split_whitespace();
        let (method, path) = match (fields.next(), fields.next(), fields.next()) {
            (Some(method), Some(path), None) => (method, path),
            _ => bail!("expect 'METHOD /path'"),
        };
        let method = Method::from_bytes(method.to_uppercase().as_bytes())
            .with_context(|| format!("invalid method '{method}'"))?;
        if !path.starts_with('/') {
            bail!("path must start with '/'");
        }

        match path.strip_suffix("/*") {
            Some(prefix) => self.prefixes.push((method, format!("{prefix}/"))),
            None => {
                self.exact.insert((method, String::from(path)));
            }
        }
        Ok(())
    }

    pub fn contains(&self, method: &Method, path: &str) -> bool {
        if self.exact.contains(&(method.clone(), String::from(path))) {
            return true;
        }
        self.prefixes
            .iter()
            .any(|(m, prefix)| m == method && path.starts_with(prefix.as_str()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let list = BypassList::new(&[]).unwrap();

        assert!(list.contains(&Method::GET, "/"));
        assert!(list.contains(&Method::GET, "/healthz"));
        assert!(list.contains(&Method::POST, "/auth"));
        assert!(list.contains(&Method::GET, "/public"));
        assert!(list.contains(&Method::GET, "/public/a/b"));

        assert!(!list.contains(&Method::GET, "/auth"));
        assert!(!list.contains(&Method::POST, "/healthz"));
        assert!(!list.contains(&Method::GET, "/publicity"));
        assert!(!list.contains(&Method::GET, "/healthz/"));
        assert!(!list.contains(&Method::GET, "/api/v1/todos"));
        assert!(!list.contains(&Method::POST, "/api/v1/todos"));
    }

    #[test]
    fn test_extra() {
        let extra = vec![
            String::from("get /docs"),
            String::from("POST /hooks/*"),
        ];
        let list = BypassList::new(&extra).unwrap();
        assert!(list.contains(&Method::GET, "/docs"));
        assert!(list.contains(&Method::POST, "/hooks/github"));
        assert!(!list.contains(&Method::GET, "/hooks/github"));

        for bad in ["/docs", "GET", "GET docs", "GET /a /b"] {
            assert!(BypassList::new(&[String::from(bad)]).is_err(), "{bad}");
        }
    }
}
