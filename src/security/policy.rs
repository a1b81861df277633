//! Ordered mapping from request paths to security policies.
//!
//! A [`SecurityPolicyRouter`] holds an ordered list of path-scoped policies
//! plus a catch-all, and resolves every request path to exactly one policy.
//! Each [`SecurityPolicy`] carries its enforcement mode (bearer token vs
//! session), a method-aware allowlist for endpoints that skip authentication,
//! and per-path role requirements.

use crate::security::types::{Principal, Role};

/// A path pattern: either an exact path or a subtree rooted at a prefix.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PathMatcher {
    Exact(String),
    Subtree(String),
}

impl PathMatcher {
    /// Parse a pattern string. A trailing `/**` denotes the subtree rooted at
    /// the preceding prefix (the root itself included); anything else matches
    /// exactly.
    pub fn parse(pattern: &str) -> Self {
        match pattern.strip_suffix("/**") {
            Some(prefix) => PathMatcher::Subtree(prefix.to_string()),
            None => PathMatcher::Exact(pattern.to_string()),
        }
    }

    pub fn matches(&self, path: &str) -> bool {
        match self {
            PathMatcher::Exact(exact) => path == exact,
            PathMatcher::Subtree(prefix) => {
                path == prefix || (path.starts_with(prefix) && path[prefix.len()..].starts_with('/'))
            }
        }
    }
}

/// How a policy authenticates requests.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PolicyMode {
    /// Bearer token per request, no session state, failures answered in JSON.
    Stateless,
    /// Server-side session via cookie, failures redirected to the login page.
    Stateful,
}

#[derive(Debug, Clone)]
struct AllowRule {
    matcher: PathMatcher,
    /// `None` allows every method.
    method: Option<String>,
}

/// What an authenticated principal must hold to pass a path.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RoleRequirement {
    /// Any authenticated principal, regardless of roles.
    Authenticated,
    /// At least one of the listed roles.
    AnyOf(Vec<Role>),
}

impl RoleRequirement {
    pub fn satisfied_by(&self, principal: &Principal) -> bool {
        match self {
            RoleRequirement::Authenticated => true,
            RoleRequirement::AnyOf(roles) => roles.iter().any(|role| principal.has_role(role)),
        }
    }
}

/// One enforcement regime: a mode, an allowlist, and role requirements.
#[derive(Debug, Clone)]
pub struct SecurityPolicy {
    name: &'static str,
    mode: PolicyMode,
    allow: Vec<AllowRule>,
    role_rules: Vec<(PathMatcher, RoleRequirement)>,
}

impl SecurityPolicy {
    pub fn stateless(name: &'static str) -> Self {
        Self::with_mode(name, PolicyMode::Stateless)
    }

    pub fn stateful(name: &'static str) -> Self {
        Self::with_mode(name, PolicyMode::Stateful)
    }

    fn with_mode(name: &'static str, mode: PolicyMode) -> Self {
        Self {
            name,
            mode,
            allow: Vec::new(),
            role_rules: Vec::new(),
        }
    }

    /// Allow `method` requests to `pattern` without authentication.
    pub fn allow(mut self, method: &str, pattern: &str) -> Self {
        self.allow.push(AllowRule {
            matcher: PathMatcher::parse(pattern),
            method: Some(method.to_string()),
        });
        self
    }

    /// Allow every method on `pattern` without authentication.
    pub fn allow_any_method(mut self, pattern: &str) -> Self {
        self.allow.push(AllowRule {
            matcher: PathMatcher::parse(pattern),
            method: None,
        });
        self
    }

    /// Require one of `roles` on paths matching `pattern`. Rules are checked
    /// in registration order; the first match wins.
    pub fn require_any_of(mut self, pattern: &str, roles: &[&str]) -> Self {
        self.role_rules.push((
            PathMatcher::parse(pattern),
            RoleRequirement::AnyOf(roles.iter().map(|role| role.to_string()).collect()),
        ));
        self
    }

    pub fn name(&self) -> &'static str {
        self.name
    }

    pub fn mode(&self) -> PolicyMode {
        self.mode
    }

    /// Whether `method path` may pass without any authentication at all.
    pub fn is_allowlisted(&self, method: &str, path: &str) -> bool {
        self.allow.iter().any(|rule| {
            rule.matcher.matches(path)
                && rule
                    .method
                    .as_deref()
                    .map_or(true, |allowed| allowed.eq_ignore_ascii_case(method))
        })
    }

    /// The requirement an authenticated principal must satisfy for `path`.
    /// Paths with no explicit rule fall back to plain authentication.
    pub fn required_roles(&self, path: &str) -> &RoleRequirement {
        self.role_rules
            .iter()
            .find(|(matcher, _)| matcher.matches(path))
            .map(|(_, requirement)| requirement)
            .unwrap_or(&RoleRequirement::Authenticated)
    }
}

/// Ordered policy table. Every path resolves to exactly one policy: scoped
/// entries are consulted in order and the catch-all absorbs the rest, so
/// routing is total and never fails.
pub struct SecurityPolicyRouter {
    scoped: Vec<(PathMatcher, SecurityPolicy)>,
    catch_all: SecurityPolicy,
}

impl SecurityPolicyRouter {
    pub fn new(scoped: Vec<(PathMatcher, SecurityPolicy)>, catch_all: SecurityPolicy) -> Self {
        Self { scoped, catch_all }
    }

    /// Resolve `path` to its governing policy.
    pub fn route(&self, path: &str) -> &SecurityPolicy {
        self.scoped
            .iter()
            .find(|(matcher, _)| matcher.matches(path))
            .map(|(_, policy)| policy)
            .unwrap_or(&self.catch_all)
    }

    /// The storefront's policy table: bearer tokens over `/api/**`, sessions
    /// everywhere else.
    pub fn storefront_defaults() -> Self {
        use crate::security::types::{ROLE_ADMIN, ROLE_CUSTOMER, ROLE_EMPLOYEE};

        let api = SecurityPolicy::stateless("api")
            .allow_any_method("/api/authenticate")
            .allow("GET", "/api/book-reviews/**");

        let web = SecurityPolicy::stateful("web")
            .allow_any_method("/")
            .allow_any_method("/login")
            .allow_any_method("/common/**")
            .require_any_of("/admin/**", &[ROLE_ADMIN])
            .require_any_of("/user/**", &[ROLE_CUSTOMER, ROLE_EMPLOYEE, ROLE_ADMIN]);

        Self::new(vec![(PathMatcher::parse("/api/**"), api)], web)
    }
}
