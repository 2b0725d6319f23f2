//! Email/password pair for the sign-in endpoint.

use std::fmt;

use serde_json::{Value, json};

/// What the user typed into the sign-in form.
///
/// `{:?}` shows the email and masks the password.
///
/// ```
/// use fintrack::Credentials;
///
/// let creds = Credentials::new(" alice@example.com ", "hunter2");
/// assert_eq!(creds.email(), "alice@example.com");
/// assert!(!format!("{creds:?}").contains("hunter2"));
/// ```
#[derive(Clone)]
pub struct Credentials {
    email: String,
    password: String,
}

impl Credentials {
    /// Surrounding whitespace is trimmed from the email; the password is
    /// taken verbatim.
    pub fn new(email: impl Into<String>, password: impl Into<String>) -> Self {
        let email: String = email.into();
        Self {
            email: email.trim().to_string(),
            password: password.into(),
        }
    }

    pub fn email(&self) -> &str {
        &self.email
    }

    /// JSON body posted to the login endpoint.
    pub(crate) fn login_body(&self) -> Value {
        json!({
            "email": self.email,
            "password": self.password,
        })
    }
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Credentials {{ email: {:?}, password: *** }}", self.email)
    }
}
