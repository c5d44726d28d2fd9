use serde::{Deserialize, Serialize};
use tokio::sync::watch;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Route {
    Login,
    SelectStudent,
    Dashboard,
    Subjects,
    Absences,
    Profile,
}

impl Route {
    pub fn path(&self) -> &'static str {
        match self {
            Route::Login => "/login",
            Route::SelectStudent => "/select-student",
            Route::Dashboard => "/dashboard",
            Route::Subjects => "/subjects",
            Route::Absences => "/absences",
            Route::Profile => "/profile",
        }
    }
}

/// Active view of the session
pub struct Navigator {
    route: watch::Sender<Route>,
}

impl Navigator {
    pub fn new(initial: Route) -> Self {
        let (route, _) = watch::channel(initial);
        Self { route }
    }

    pub fn navigate(&self, route: Route) {
        let previous = self.route.send_replace(route);
        if previous != route {
            tracing::debug!("Navigating {} -> {}", previous.path(), route.path());
        }
    }

    pub fn current(&self) -> Route {
        *self.route.borrow()
    }
}
