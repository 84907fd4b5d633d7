//! Navigation targets produced by the guard and the auth flows.

use std::fmt;

use crate::models::Role;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Route {
    Home,
    PatientAuth,
    ProviderAuth,
    PatientDashboard,
    /// Profile page opened in completion mode after registration.
    PatientProfileCompletion,
    ProviderDashboard,
}

impl Route {
    pub fn path(&self) -> &'static str {
        match self {
            Route::Home => "/",
            Route::PatientAuth => "/auth/patient",
            Route::ProviderAuth => "/auth/provider",
            Route::PatientDashboard => "/patient/dashboard",
            Route::PatientProfileCompletion => "/patient/profile?complete=true",
            Route::ProviderDashboard => "/provider/dashboard",
        }
    }

    pub fn login_for(role: Role) -> Self {
        match role {
            Role::Patient => Route::PatientAuth,
            Role::Provider => Route::ProviderAuth,
        }
    }

    pub fn is_login(&self) -> bool {
        matches!(self, Route::PatientAuth | Route::ProviderAuth)
    }

    pub fn dashboard_for(role: Role) -> Self {
        match role {
            Role::Patient => Route::PatientDashboard,
            Role::Provider => Route::ProviderDashboard,
        }
    }
}

impl fmt::Display for Route {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.path())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn login_route_per_role() {
        assert_eq!(Route::login_for(Role::Patient).path(), "/auth/patient");
        assert_eq!(Route::login_for(Role::Provider).path(), "/auth/provider");
        assert!(Route::login_for(Role::Patient).is_login());
        assert!(!Route::Home.is_login());
        assert!(!Route::PatientDashboard.is_login());
    }

    #[test]
    fn completion_route_carries_query() {
        assert_eq!(Route::PatientProfileCompletion.to_string(), "/patient/profile?complete=true");
        assert_eq!(Route::dashboard_for(Role::Provider), Route::ProviderDashboard);
    }
}
