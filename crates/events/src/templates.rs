//! HTML mail templates, rendered with askama. Substituted values are
//! HTML-escaped; only `base_url`, which comes from configuration, is marked
//! safe in the templates.

use std::collections::BTreeMap;

use askama::Template;

#[derive(Template)]
#[template(path = "confirm_account.html")]
struct ConfirmAccountMail<'a> {
    name: &'a str,
    token: &'a str,
    base_url: &'a str,
}

#[derive(Template)]
#[template(path = "confirm_email.html")]
struct ConfirmEmailMail<'a> {
    name: &'a str,
    token: &'a str,
    base_url: &'a str,
}

#[derive(Template)]
#[template(path = "reset_password.html")]
struct ResetPasswordMail<'a> {
    name: &'a str,
    token: &'a str,
    base_url: &'a str,
}

/// Every mail the backend sends.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MailTemplate {
    /// New account created by the import or by an administrator.
    ConfirmAccount,
    /// Email address changed on an existing account.
    ConfirmEmail,
    ResetPassword,
}

impl MailTemplate {
    pub fn file_name(self) -> &'static str {
        match self {
            Self::ConfirmAccount => "confirm_account.html",
            Self::ConfirmEmail => "confirm_email.html",
            Self::ResetPassword => "reset_password.html",
        }
    }

    pub fn subject(self) -> &'static str {
        match self {
            Self::ConfirmAccount => "Confirm Account",
            Self::ConfirmEmail => "Confirm Email",
            Self::ResetPassword => "Reset Password",
        }
    }

    /// Render the HTML body. Missing variables render empty.
    pub fn render(self, variables: &BTreeMap<String, String>) -> Result<String, askama::Error> {
        let name = variable(variables, "name");
        let token = variable(variables, "token");
        let base_url = variable(variables, "base_url");
        match self {
            Self::ConfirmAccount => ConfirmAccountMail { name, token, base_url }.render(),
            Self::ConfirmEmail => ConfirmEmailMail { name, token, base_url }.render(),
            Self::ResetPassword => ResetPasswordMail { name, token, base_url }.render(),
        }
    }
}

fn variable<'a>(variables: &'a BTreeMap<String, String>, key: &str) -> &'a str {
    variables.get(key).map(String::as_str).unwrap_or_default()
}
