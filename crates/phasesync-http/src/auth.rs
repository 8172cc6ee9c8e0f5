use std::fmt;

/// What the client needs to set the Authorization header
#[derive(Clone, PartialEq, Eq)]
pub enum AuthHeader {
    Basic { username: String, password: String },
    Bearer { token: String },
}

impl AuthHeader {
    pub fn apply(&self, req: reqwest::RequestBuilder) -> reqwest::RequestBuilder {
        match self {
            AuthHeader::Basic { username, password } => req.basic_auth(username, Some(password)),
            AuthHeader::Bearer { token } => req.bearer_auth(token),
        }
    }
}

// Credentials stay out of logs.
impl fmt::Debug for AuthHeader {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AuthHeader::Basic { username, .. } => f
                .debug_struct("Basic")
                .field("username", username)
                .field("password", &"***")
                .finish(),
            AuthHeader::Bearer { .. } => f.debug_struct("Bearer").field("token", &"***").finish(),
        }
    }
}
