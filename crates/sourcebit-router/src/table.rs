//! Per-method route tables ordered by specificity.

use crate::handler::HandlerChain;
use crate::path::PathPattern;
use crate::request::Method;

/// A single route definition.
#[derive(Clone, Debug)]
pub struct Route {
    /// HTTP method.
    pub method: Method,
    /// Compiled path pattern.
    pub pattern: PathPattern,
    /// Handlers run when the route matches.
    pub chain: HandlerChain,
    /// Optional route name for reverse URL lookup.
    pub name: Option<String>,
    /// Position in registration order across the whole table.
    pub index: usize,
}

impl Route {
    /// Returns the number of literal segments in the route's template.
    pub fn specificity(&self) -> usize {
        self.pattern.specificity()
    }

    /// Returns the template (or raw regex source) the route was built from.
    pub fn template(&self) -> &str {
        self.pattern.template()
    }
}

const METHODS: usize = Method::ALL.len();

/// Routes grouped by method.
///
/// Each method's list is kept sorted by descending specificity. Routes of
/// equal specificity stay in registration order, so [`find`](Self::find)
/// returns the most specific match and breaks ties by whichever route was
/// added first.
#[derive(Clone, Debug, Default)]
pub struct RouteTable {
    routes: [Vec<Route>; METHODS],
    registered: usize,
}

fn slot(method: Method) -> usize {
    match method {
        Method::Get => 0,
        Method::Post => 1,
        Method::Put => 2,
        Method::Patch => 3,
        Method::Delete => 4,
        Method::Head => 5,
        Method::Options => 6,
    }
}

impl RouteTable {
    /// Creates an empty table.
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a route and returns it.
    pub fn add(
        &mut self,
        method: Method,
        pattern: PathPattern,
        chain: HandlerChain,
        name: Option<String>,
    ) -> &Route {
        let route = Route {
            method,
            pattern,
            chain,
            name,
            index: self.registered,
        };
        self.registered += 1;

        let list = &mut self.routes[slot(method)];
        let at = list.partition_point(|r| r.specificity() >= route.specificity());
        list.insert(at, route);
        &list[at]
    }

    /// Returns the first route for `method` whose pattern accepts `path`.
    pub fn find(&self, method: Method, path: &str) -> Option<&Route> {
        self.routes[slot(method)]
            .iter()
            .find(|r| r.pattern.is_match(path))
    }

    /// Returns the routes for one method in match order.
    pub fn routes(&self, method: Method) -> &[Route] {
        &self.routes[slot(method)]
    }

    /// Iterates over every route, method by method, in match order.
    pub fn iter(&self) -> impl Iterator<Item = &Route> {
        Method::ALL.into_iter().flat_map(|m| self.routes(m).iter())
    }

    /// Returns the total number of routes.
    pub fn len(&self) -> usize {
        self.routes.iter().map(Vec::len).sum()
    }

    /// Returns whether no route has been added.
    pub fn is_empty(&self) -> bool {
        self.routes.iter().all(Vec::is_empty)
    }
}
