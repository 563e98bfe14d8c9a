/// Short-lived secret the browser uses to open its own connection upstream.
/// Only this field of the upstream session object ever leaves the relay.
#[derive(Debug, Clone, PartialEq)]
pub struct SessionCredential {
    pub client_secret: String,
}
