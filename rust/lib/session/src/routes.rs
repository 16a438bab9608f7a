//! Routing table: paths map one-to-one to views, each behind a guard.

use std::collections::BTreeMap;

use serde::Serialize;

use crate::guard::{self, GuardDecision, LOGIN_PATH};
use crate::identity::Role;
use crate::state::Session;

/// Upper bound on redirects followed by `Router::settle`.
pub const MAX_REDIRECTS: usize = 8;

const STAFF: &[Role] = &[Role::Admin, Role::Manager, Role::Employee];

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "view", rename_all = "camelCase")]
pub enum View {
    Login,
    AdminDashboard,
    EmployeeDashboard,
    CustomerShop,
    Reports,
    Inventory,
    EmployeeManagement,
    EmployeeCreate,
    EmployeeDetail { id: String },
    CustomerManagement,
    PointOfSale,
    UsersThisMonth,
    MlDashboard,
    ProductRecommendations,
    CustomerSegmentation,
    MlModelAdmin,
    Profile,
    AuthDebug,
    /// "Access Denied", with a link back to the login page.
    Unauthorized,
    NotFound,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Navigation {
    Render(View),
    Redirect(String),
    Loading,
}

#[derive(Debug, Clone, Copy)]
enum Access {
    Public,
    /// The login screen: signed-in users go home.
    LoginScreen,
    Authenticated,
    Role(Role),
    AnyRole(&'static [Role]),
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum Segment {
    Static(String),
    Param(String),
}

type Params = BTreeMap<String, String>;

enum Target {
    View(fn(&Params) -> View),
    /// No view of its own: the signed-in identity's home, or login.
    Home,
}

struct Route {
    segments: Vec<Segment>,
    access: Access,
    target: Target,
}

impl Route {
    fn new(pattern: &str, access: Access, view: fn(&Params) -> View) -> Self {
        Self::build(pattern, access, Target::View(view))
    }

    fn home(pattern: &str) -> Self {
        Self::build(pattern, Access::Public, Target::Home)
    }

    fn build(pattern: &str, access: Access, target: Target) -> Self {
        let segments = split(pattern)
            .map(|seg| match seg.strip_prefix(':') {
                Some(name) => Segment::Param(name.to_string()),
                None => Segment::Static(seg.to_string()),
            })
            .collect();
        Self {
            segments,
            access,
            target,
        }
    }

    /// Captured params when `parts` matches this route.
    fn matches(&self, parts: &[&str]) -> Option<Params> {
        if parts.len() != self.segments.len() {
            return None;
        }
        let mut params = Params::new();
        for (segment, part) in self.segments.iter().zip(parts) {
            match segment {
                Segment::Static(s) if s == part => {}
                Segment::Static(_) => return None,
                Segment::Param(name) => {
                    params.insert(name.clone(), (*part).to_string());
                }
            }
        }
        Some(params)
    }

    /// Static segments rank above params, left to right.
    fn specificity(&self) -> Vec<bool> {
        self.segments
            .iter()
            .map(|s| matches!(s, Segment::Static(_)))
            .collect()
    }
}

fn split(path: &str) -> impl Iterator<Item = &str> {
    path.split('/').filter(|s| !s.is_empty())
}

/// Strip query and fragment.
fn path_only(path: &str) -> &str {
    let end = path.find(|c| c == '?' || c == '#').unwrap_or(path.len());
    &path[..end]
}

pub struct Router {
    routes: Vec<Route>,
}

impl Default for Router {
    fn default() -> Self {
        Self::new()
    }
}

impl Router {
    pub fn new() -> Self {
        let routes = vec![
            Route::new("/login", Access::LoginScreen, |_| View::Login),
            Route::home("/"),
            Route::new("/admin", admin(), |_| View::AdminDashboard),
            Route::new("/employee", Access::AnyRole(STAFF), |_| View::EmployeeDashboard),
            Route::new("/shop", Access::Authenticated, |_| View::CustomerShop),
            Route::new("/reports", Access::AnyRole(STAFF), |_| View::Reports),
            Route::new("/inventory", Access::AnyRole(STAFF), |_| View::Inventory),
            Route::new("/employees", admin(), |_| View::EmployeeManagement),
            Route::new("/admin/employees", admin(), |_| View::EmployeeManagement),
            Route::new("/admin/employees/new", admin(), |_| View::EmployeeCreate),
            Route::new("/admin/employees/:id", admin(), |p| View::EmployeeDetail {
                id: p.get("id").cloned().unwrap_or_default(),
            }),
            Route::new("/customers", admin(), |_| View::CustomerManagement),
            Route::new("/pos", Access::AnyRole(STAFF), |_| View::PointOfSale),
            Route::new("/auth/users-this-month", admin(), |_| View::UsersThisMonth),
            Route::new("/ml-dashboard", admin(), |_| View::MlDashboard),
            Route::new("/ml/product-recommendations", admin(), |_| View::ProductRecommendations),
            Route::new("/ml/customer-segmentation", admin(), |_| View::CustomerSegmentation),
            Route::new("/ml/model-admin", admin(), |_| View::MlModelAdmin),
            Route::new("/profile", Access::Authenticated, |_| View::Profile),
            Route::new("/debug", Access::Public, |_| View::AuthDebug),
            Route::new("/unauthorized", Access::Public, |_| View::Unauthorized),
        ];
        Self { routes }
    }

    fn lookup(&self, path: &str) -> Option<(&Route, Params)> {
        let parts: Vec<&str> = split(path_only(path)).collect();
        self.routes
            .iter()
            .filter_map(|route| route.matches(&parts).map(|params| (route, params)))
            .max_by(|(a, _), (b, _)| a.specificity().cmp(&b.specificity()))
    }

    /// What to show for `path` given one session snapshot.
    pub fn resolve(&self, path: &str, session: &Session) -> Navigation {
        let Some((route, params)) = self.lookup(path) else {
            return Navigation::Render(View::NotFound);
        };
        let view = match route.target {
            Target::View(view) => view,
            Target::Home => return root(session),
        };
        let decision = match route.access {
            Access::Public => GuardDecision::Render,
            Access::LoginScreen => guard::decide_login(session),
            Access::Authenticated => guard::decide(session, None, None),
            Access::Role(role) => guard::decide(session, Some(role), None),
            Access::AnyRole(roles) => guard::decide(session, None, Some(roles)),
        };
        match decision {
            GuardDecision::Render => Navigation::Render(view(&params)),
            GuardDecision::Redirect(to) => Navigation::Redirect(to),
            GuardDecision::Loading => Navigation::Loading,
        }
    }

    /// Follow redirects from `path` until something renders or loads.
    /// Returns the final path and navigation.
    pub fn settle(&self, path: &str, session: &Session) -> (String, Navigation) {
        let mut current = path.to_string();
        let mut navigation = self.resolve(&current, session);
        for _ in 0..MAX_REDIRECTS {
            match navigation {
                Navigation::Redirect(ref next) if *next != current => {
                    current = next.clone();
                    navigation = self.resolve(&current, session);
                }
                _ => break,
            }
        }
        (current, navigation)
    }
}

fn admin() -> Access {
    Access::Role(Role::Admin)
}

fn root(session: &Session) -> Navigation {
    if session.is_settling() {
        return Navigation::Loading;
    }
    match session.identity() {
        Some(identity) if session.is_authenticated() => {
            Navigation::Redirect(guard::home_for(identity).to_string())
        }
        _ => Navigation::Redirect(LOGIN_PATH.to_string()),
    }
}
