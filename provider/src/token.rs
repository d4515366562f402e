/// Where the bearer token comes from. Obtaining and refreshing it is the
/// login flow's job; the client only asks for the current value per request.
pub trait TokenSource: Send + Sync + 'static {
    fn access_token(&self) -> Option<String>;
}

/// Token fixed at construction, typically from configuration.
#[derive(Clone, Debug, Default)]
pub struct StaticToken(Option<String>);

impl StaticToken {
    pub fn new(token: Option<String>) -> Self {
        Self(token.filter(|t| !t.is_empty()))
    }
}

impl TokenSource for StaticToken {
    fn access_token(&self) -> Option<String> {
        self.0.clone()
    }
}
