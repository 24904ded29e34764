//! Message composition for the emails Clubdesk sends

use crate::EmailMessage;

/// Invitation to join the club. The link carries the one-time token and
/// leads to the frontend's acceptance page.
pub fn invitation_email(
    frontend_url: &str,
    to: &str,
    first_name: &str,
    role: &str,
    team_name: Option<&str>,
    token: &str,
) -> EmailMessage {
    let link = format!(
        "{}/accept-invitation?token={}",
        frontend_url.trim_end_matches('/'),
        token
    );
    let team_line = match team_name {
        Some(name) => format!(" for team {name}"),
        None => String::new(),
    };

    let text = format!(
        "Hi {first_name},\n\n\
         You have been invited to join the club as {role}{team_line}.\n\n\
         Accept your invitation here: {link}\n\n\
         This link expires in 7 days. If you did not expect this invitation, \
         you can ignore this email."
    );
    let html = format!(
        "<p>Hi {first_name},</p>\
         <p>You have been invited to join the club as <strong>{role}</strong>{team_line}.</p>\
         <p><a href=\"{link}\">Accept your invitation</a></p>\
         <p>This link expires in 7 days. If you did not expect this invitation, \
         you can ignore this email.</p>"
    );

    EmailMessage::new(to, "You're invited to join the club")
        .text(text)
        .html(html)
}

/// Credentials for a parent account created alongside a player.
pub fn parent_credentials_email(
    frontend_url: &str,
    to: &str,
    child_name: &str,
    password: &str,
) -> EmailMessage {
    let login_url = format!("{}/login", frontend_url.trim_end_matches('/'));

    let text = format!(
        "An account has been created for you to follow {child_name}.\n\n\
         Sign in at {login_url} with this email address and the temporary \
         password: {password}\n\n\
         Please change your password after your first login."
    );
    let html = format!(
        "<p>An account has been created for you to follow <strong>{child_name}</strong>.</p>\
         <p>Sign in at <a href=\"{login_url}\">{login_url}</a> with this email address \
         and the temporary password: <code>{password}</code></p>\
         <p>Please change your password after your first login.</p>"
    );

    EmailMessage::new(to, format!("Your parent account for {child_name}"))
        .text(text)
        .html(html)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_invitation_email_carries_token_link() {
        let msg = invitation_email(
            "https://app.club.example/",
            "new@club.example",
            "Nora",
            "player",
            Some("U16 Tigers"),
            "tok123",
        );
        assert_eq!(msg.to, "new@club.example");
        assert!(msg.body_text.starts_with("Hi Nora,"));
        assert!(msg
            .body_text
            .contains("https://app.club.example/accept-invitation?token=tok123"));
        assert!(msg.body_text.contains("U16 Tigers"));
        assert!(msg.body_html.as_deref().unwrap_or("").contains("tok123"));
    }

    #[test]
    fn test_invitation_email_without_team() {
        let msg = invitation_email(
            "http://localhost:5173",
            "c@club.example",
            "Sam",
            "coach",
            None,
            "tok",
        );
        assert!(!msg.body_text.contains("for team"));
    }

    #[test]
    fn test_parent_credentials_email() {
        let msg = parent_credentials_email(
            "http://localhost:5173",
            "parent@club.example",
            "Kim Miller",
            "temp-pass-1",
        );
        assert!(msg.subject.contains("Kim Miller"));
        assert!(msg.body_text.contains("temp-pass-1"));
        assert!(msg.body_text.contains("http://localhost:5173/login"));
    }
}
