//! View collaborator for `request` events.
//!
//! Route keys are matched exactly first. Keys starting with `^` are regexes,
//! tried in key order. A markup, controller or table value that is exactly
//! `$N` is replaced by capture group N of the matching path (empty when the
//! group did not participate); any other text is kept verbatim.

use std::collections::{BTreeMap, HashMap};

use regex::{Captures, Regex};

use rtbroker_core::error::{BrokerError, Result};

use crate::config::RouteConfig;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderedView {
    pub markup: String,
    pub controller: Option<String>,
    /// Table whose objects are listed into the response.
    pub table: Option<String>,
}

pub trait ViewRenderer: Send + Sync {
    /// `None` when no route matches `path`.
    fn render(&self, path: &str) -> Option<RenderedView>;
}

pub struct RouteTable {
    exact: HashMap<String, RouteConfig>,
    patterns: Vec<(Regex, RouteConfig)>,
}

impl RouteTable {
    pub fn empty() -> Self {
        Self {
            exact: HashMap::new(),
            patterns: Vec::new(),
        }
    }

    /// Compile every pattern up front; a bad pattern is a config error.
    pub fn from_config(routes: &BTreeMap<String, RouteConfig>) -> Result<Self> {
        let mut table = Self::empty();
        for (key, route) in routes {
            if key.starts_with('^') {
                let re = Regex::new(key)
                    .map_err(|e| BrokerError::Config(format!("invalid route pattern {key}: {e}")))?;
                table.patterns.push((re, route.clone()));
            } else {
                table.exact.insert(key.clone(), route.clone());
            }
        }
        Ok(table)
    }
}

impl ViewRenderer for RouteTable {
    fn render(&self, path: &str) -> Option<RenderedView> {
        if let Some(route) = self.exact.get(path) {
            return Some(RenderedView {
                markup: route.markup.clone(),
                controller: route.controller.clone(),
                table: route.table.clone(),
            });
        }

        self.patterns.iter().find_map(|(re, route)| {
            let caps = re.captures(path)?;
            let sub = |v: &str| substitute(v, &caps);
            Some(RenderedView {
                markup: sub(&route.markup),
                controller: route.controller.as_deref().map(sub),
                table: route.table.as_deref().map(sub),
            })
        })
    }
}

/// `$N` (the whole value) -> N.
fn group_index(value: &str) -> Option<usize> {
    let digits = value.strip_prefix('$')?;
    if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    digits.parse().ok()
}

fn substitute(value: &str, caps: &Captures<'_>) -> String {
    match group_index(value) {
        Some(i) => caps.get(i).map(|m| m.as_str().to_string()).unwrap_or_default(),
        None => value.to_string(),
    }
}
