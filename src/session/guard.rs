use crate::session::{Route, Session};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Access {
    Granted,
    /// No credential; `login` is where the fallback should send the user
    Denied { login: Route },
}

/// Outcome of rendering through the guard with the default fallback
#[derive(Debug, Clone, PartialEq)]
pub enum Guarded<T> {
    View(T),
    AccessDenied { login: Route },
}

/// Gate in front of protected views.
///
/// Purely a decision over the session's current credential: nothing is
/// cleared or navigated here, and every render asks again.
pub struct AccessGuard<'a> {
    session: &'a Session,
}

impl<'a> AccessGuard<'a> {
    pub fn new(session: &'a Session) -> Self {
        Self { session }
    }

    pub fn check(&self) -> Access {
        if self.session.credentials().is_present() {
            Access::Granted
        } else {
            Access::Denied { login: Route::Login }
        }
    }

    /// Render `view` when allowed, otherwise the default access-denied fallback
    pub fn render<T>(&self, view: impl FnOnce() -> T) -> Guarded<T> {
        match self.check() {
            Access::Granted => Guarded::View(view()),
            Access::Denied { login } => Guarded::AccessDenied { login },
        }
    }

    /// Render `view` when allowed, otherwise the caller's alternative
    pub fn render_or<T>(&self, view: impl FnOnce() -> T, alternative: impl FnOnce(Route) -> T) -> T {
        match self.check() {
            Access::Granted => view(),
            Access::Denied { login } => alternative(login),
        }
    }
}
