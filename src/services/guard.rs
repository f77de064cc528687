// src/services/guard.rs

use crate::models::user::{CurrentUser, UserType};

pub const LOGIN_PATH: &str = "/login";
pub const CUSTOMER_LOGIN_PATH: &str = "/customer-login";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RouteDecision {
    // O estado ainda está carregando: nada de redirecionar
    Wait,
    Allow,
    Redirect(String),
}

/// Decide o que fazer com quem tenta abrir uma rota restrita a `allowed`.
pub fn resolve(loading: bool, user: Option<&CurrentUser>, allowed: &[UserType]) -> RouteDecision {
    if loading {
        return RouteDecision::Wait;
    }

    match user {
        None => {
            let login = if allowed.contains(&UserType::Customer) {
                CUSTOMER_LOGIN_PATH
            } else {
                LOGIN_PATH
            };
            RouteDecision::Redirect(login.to_string())
        }
        Some(user) if !allowed.contains(&user.user_type) => {
            RouteDecision::Redirect(user.user_type.home_path().to_string())
        }
        Some(_) => RouteDecision::Allow,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn user(user_type: UserType) -> CurrentUser {
        CurrentUser { auth_uid: "u".into(), id: "x".into(), user_type, avatar_url: None }
    }

    #[test]
    fn loading_always_waits() {
        assert_eq!(resolve(true, None, &[UserType::Associate]), RouteDecision::Wait);
    }

    #[test]
    fn anonymous_users_go_to_the_matching_login() {
        assert_eq!(
            resolve(false, None, &[UserType::Customer]),
            RouteDecision::Redirect("/customer-login".into())
        );
        assert_eq!(
            resolve(false, None, &[UserType::Associate, UserType::Corporate]),
            RouteDecision::Redirect("/login".into())
        );
    }

    #[test]
    fn wrong_role_goes_home() {
        let cases = [
            (UserType::Associate, "/associate"),
            (UserType::Corporate, "/corporate"),
            (UserType::Customer, "/customer-dashboard"),
        ];
        for (role, home) in cases {
            let allowed: Vec<UserType> = [UserType::Associate, UserType::Corporate, UserType::Customer]
                .into_iter()
                .filter(|r| *r != role)
                .collect();
            assert_eq!(
                resolve(false, Some(&user(role)), &allowed),
                RouteDecision::Redirect(home.into())
            );
        }
        assert_eq!(
            resolve(false, Some(&user(UserType::Corporate)), &[UserType::Corporate]),
            RouteDecision::Allow
        );
    }
}
