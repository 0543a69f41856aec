//! Route guard: decides whether a protected view renders, waits, or redirects.

use tokio::sync::watch;
use tracing::debug;

use crate::navigation::{Navigator, Route};

use super::state::Session;

/// What a view requires of the session
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Access {
    /// Reachable without a session (the login view itself)
    Public,
    Authenticated,
    Admin,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GuardDecision {
    /// Session still bootstrapping; show a neutral loading state
    Loading,
    /// Leave the view. `replace` drops the guarded entry from history.
    Redirect { to: &'static str, replace: bool },
    Render,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RouteGuard {
    access: Access,
}

impl RouteGuard {
    pub fn new(access: Access) -> Self {
        Self { access }
    }

    /// Any authenticated user
    pub fn protected() -> Self {
        Self::new(Access::Authenticated)
    }

    pub fn admin_only() -> Self {
        Self::new(Access::Admin)
    }

    pub fn for_route(route: Route) -> Self {
        Self::new(route.access())
    }

    pub fn access(&self) -> Access {
        self.access
    }

    pub fn evaluate(&self, session: &Session) -> GuardDecision {
        if self.access == Access::Public {
            return GuardDecision::Render;
        }
        if session.loading() {
            return GuardDecision::Loading;
        }
        if !session.is_authenticated() {
            return GuardDecision::Redirect {
                to: Route::Login.path(),
                replace: true,
            };
        }
        if self.access == Access::Admin && !session.is_admin() {
            return GuardDecision::Redirect {
                to: Route::Unauthorized.path(),
                replace: true,
            };
        }
        GuardDecision::Render
    }

    /// Evaluate and carry out any redirect through `navigator`
    pub fn enforce(&self, session: &Session, navigator: &dyn Navigator) -> GuardDecision {
        let decision = self.evaluate(session);
        if let GuardDecision::Redirect { to, replace } = decision {
            debug!(to, replace, access = ?self.access, "Route guard redirecting");
            if replace {
                navigator.replace(to);
            } else {
                navigator.push(to);
            }
        }
        decision
    }

    /// Wait until the session has bootstrapped, then enforce.
    ///
    /// Blocks for as long as the session check is pending.
    pub async fn resolve(
        &self,
        sessions: &mut watch::Receiver<Session>,
        navigator: &dyn Navigator,
    ) -> GuardDecision {
        let ready = sessions
            .wait_for(|s| !s.loading())
            .await
            .map(|session| (*session).clone());
        let session = match ready {
            Ok(session) => session,
            // Sender gone; decide on the last value seen
            Err(_) => sessions.borrow().clone(),
        };
        self.enforce(&session, navigator)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::Role;
    use crate::models::User;
    use crate::navigation::{NavigationEvent, RecordingNavigator};

    fn session_with_role(role: &str) -> Session {
        Session::authenticated(User {
            id: 10,
            email: "user@dayflow.test".to_string(),
            role: Role::new(role),
            first_name: None,
            last_name: None,
            employee_id: None,
            department: None,
        })
    }

    #[test]
    fn test_bootstrapping_renders_loading() {
        let boot = Session::bootstrapping();
        assert_eq!(RouteGuard::protected().evaluate(&boot), GuardDecision::Loading);
        assert_eq!(RouteGuard::admin_only().evaluate(&boot), GuardDecision::Loading);
    }

    #[test]
    fn test_anonymous_redirects_to_login() {
        let anon = Session::anonymous();
        let expected = GuardDecision::Redirect {
            to: "/login",
            replace: true,
        };
        assert_eq!(RouteGuard::protected().evaluate(&anon), expected);
        assert_eq!(RouteGuard::admin_only().evaluate(&anon), expected);
    }

    #[test]
    fn test_employee_on_admin_route_redirects_to_unauthorized() {
        let employee = session_with_role("employee");
        assert_eq!(
            RouteGuard::admin_only().evaluate(&employee),
            GuardDecision::Redirect {
                to: "/unauthorized",
                replace: true
            }
        );
        assert_eq!(
            RouteGuard::protected().evaluate(&employee),
            GuardDecision::Render
        );
    }

    #[test]
    fn test_substring_role_does_not_pass_admin_guard() {
        let almost = session_with_role("HR_ADMIN_TRAINEE");
        assert_eq!(
            RouteGuard::admin_only().evaluate(&almost),
            GuardDecision::Redirect {
                to: "/unauthorized",
                replace: true
            }
        );
    }

    #[test]
    fn test_admin_renders() {
        for role in ["HR_ADMIN", "admin", "hr"] {
            let admin = session_with_role(role);
            assert_eq!(RouteGuard::admin_only().evaluate(&admin), GuardDecision::Render);
        }
    }

    #[test]
    fn test_public_always_renders() {
        let guard = RouteGuard::new(Access::Public);
        assert_eq!(guard.evaluate(&Session::bootstrapping()), GuardDecision::Render);
        assert_eq!(guard.evaluate(&Session::anonymous()), GuardDecision::Render);
    }

    #[test]
    fn test_enforce_navigates_with_replace() {
        let nav = RecordingNavigator::new();
        RouteGuard::admin_only().enforce(&session_with_role("employee"), &nav);
        RouteGuard::protected().enforce(&Session::anonymous(), &nav);
        RouteGuard::protected().enforce(&Session::bootstrapping(), &nav);
        RouteGuard::admin_only().enforce(&session_with_role("admin"), &nav);

        assert_eq!(
            nav.events(),
            vec![
                NavigationEvent::Replace("/unauthorized".to_string()),
                NavigationEvent::Replace("/login".to_string()),
            ]
        );
    }

    #[tokio::test]
    async fn test_resolve_waits_for_bootstrap() {
        let (tx, mut rx) = watch::channel(Session::bootstrapping());
        let nav = RecordingNavigator::new();

        let waiter = tokio::spawn(async move {
            let nav = RecordingNavigator::new();
            let decision = RouteGuard::protected().resolve(&mut rx, &nav).await;
            (decision, nav.events())
        });

        tokio::task::yield_now().await;
        tx.send_replace(Session::anonymous());

        let (decision, events) = waiter.await.unwrap();
        assert_eq!(
            decision,
            GuardDecision::Redirect {
                to: "/login",
                replace: true
            }
        );
        assert_eq!(events, vec![NavigationEvent::Replace("/login".to_string())]);
        assert!(nav.events().is_empty());
    }
}
