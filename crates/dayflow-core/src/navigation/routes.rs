use crate::auth::{Access, Session};

/// Views of the HRMS admin frontend
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Route {
    Login,
    Unauthorized,
    Dashboard,
    Employees,
    Attendance,
    Leave,
    Payroll,
    Reports,
    Settings,
    Profile,
}

impl Route {
    pub const ALL: [Route; 10] = [
        Route::Login,
        Route::Unauthorized,
        Route::Dashboard,
        Route::Employees,
        Route::Attendance,
        Route::Leave,
        Route::Payroll,
        Route::Reports,
        Route::Settings,
        Route::Profile,
    ];

    pub fn path(&self) -> &'static str {
        match self {
            Route::Login => "/login",
            Route::Unauthorized => "/unauthorized",
            Route::Dashboard => "/dashboard",
            Route::Employees => "/employees",
            Route::Attendance => "/attendance",
            Route::Leave => "/leave",
            Route::Payroll => "/payroll",
            Route::Reports => "/reports",
            Route::Settings => "/settings",
            Route::Profile => "/profile",
        }
    }

    pub fn title(&self) -> &'static str {
        match self {
            Route::Login => "Sign in",
            Route::Unauthorized => "Access denied",
            Route::Dashboard => "Dashboard",
            Route::Employees => "Employees",
            Route::Attendance => "Attendance",
            Route::Leave => "Leave",
            Route::Payroll => "Payroll",
            Route::Reports => "Reports",
            Route::Settings => "Settings",
            Route::Profile => "My Profile",
        }
    }

    pub fn access(&self) -> Access {
        match self {
            Route::Login | Route::Unauthorized => Access::Public,
            Route::Dashboard | Route::Attendance | Route::Leave | Route::Profile => {
                Access::Authenticated
            }
            Route::Employees | Route::Payroll | Route::Reports | Route::Settings => Access::Admin,
        }
    }

    /// Resolve a location to its view.
    ///
    /// `/` is the dashboard, sub-paths belong to their section
    /// (`/employees/42/edit` is `Employees`), query and fragment are ignored.
    pub fn from_path(path: &str) -> Option<Route> {
        let path = path.split(['?', '#']).next().unwrap_or_default();
        let section = path
            .trim_start_matches('/')
            .split('/')
            .next()
            .unwrap_or_default();

        if section.is_empty() {
            return Some(Route::Dashboard);
        }
        Route::ALL
            .into_iter()
            .find(|route| route.path().trim_start_matches('/') == section)
    }
}

/// One entry of the sidebar
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NavItem {
    pub route: Route,
    pub title: &'static str,
    pub path: &'static str,
}

/// Sidebar entries for the session, in display order.
///
/// Empty until the session is authenticated; admin sections only for admins.
pub fn nav_items(session: &Session) -> Vec<NavItem> {
    if !session.is_authenticated() {
        return Vec::new();
    }
    let is_admin = session.is_admin();

    Route::ALL
        .into_iter()
        .filter(|route| match route.access() {
            Access::Public => false,
            Access::Authenticated => true,
            Access::Admin => is_admin,
        })
        .map(|route| NavItem {
            route,
            title: route.title(),
            path: route.path(),
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::Role;
    use crate::models::User;

    fn session(role: &str) -> Session {
        Session::authenticated(User {
            id: 5,
            email: "nav@dayflow.test".to_string(),
            role: Role::new(role),
            first_name: None,
            last_name: None,
            employee_id: None,
            department: None,
        })
    }

    #[test]
    fn test_from_path() {
        assert_eq!(Route::from_path("/"), Some(Route::Dashboard));
        assert_eq!(Route::from_path(""), Some(Route::Dashboard));
        assert_eq!(Route::from_path("/login"), Some(Route::Login));
        assert_eq!(Route::from_path("/payroll/"), Some(Route::Payroll));
        assert_eq!(Route::from_path("/employees/42/edit"), Some(Route::Employees));
        assert_eq!(Route::from_path("/leave?status=pending"), Some(Route::Leave));
        assert_eq!(Route::from_path("/reports#q3"), Some(Route::Reports));
        assert_eq!(Route::from_path("/nope"), None);
        assert_eq!(Route::from_path("/employeesx"), None);
    }

    #[test]
    fn test_paths_round_trip() {
        for route in Route::ALL {
            assert_eq!(Route::from_path(route.path()), Some(route));
        }
    }

    #[test]
    fn test_access_table() {
        assert_eq!(Route::Login.access(), Access::Public);
        assert_eq!(Route::Unauthorized.access(), Access::Public);
        assert_eq!(Route::Leave.access(), Access::Authenticated);
        assert_eq!(Route::Payroll.access(), Access::Admin);
        assert_eq!(Route::Employees.access(), Access::Admin);
    }

    #[test]
    fn test_nav_items_by_role() {
        assert!(nav_items(&Session::bootstrapping()).is_empty());
        assert!(nav_items(&Session::anonymous()).is_empty());

        let employee: Vec<Route> = nav_items(&session("employee"))
            .into_iter()
            .map(|i| i.route)
            .collect();
        assert_eq!(
            employee,
            vec![Route::Dashboard, Route::Attendance, Route::Leave, Route::Profile]
        );

        let admin = nav_items(&session("hr"));
        assert_eq!(admin.len(), 8);
        assert!(admin.iter().any(|i| i.route == Route::Payroll));
        assert!(admin.iter().all(|i| i.route.access() != Access::Public));
    }
}
