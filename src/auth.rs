/// Checks the secret typed into the login form.
///
/// Login is a single shared secret today. Keeping the check behind this
/// trait lets per-representative credentials replace it without touching
/// marking or export.
pub trait CredentialVerifier: Send + Sync {
    fn verify(&self, secret: &str) -> bool;
}

/// One PIN shared by whoever runs the class register
#[derive(Debug, Clone)]
pub struct SharedPin {
    pin: String,
}

impl SharedPin {
    pub fn new(pin: impl Into<String>) -> Self {
        Self { pin: pin.into() }
    }
}

impl CredentialVerifier for SharedPin {
    fn verify(&self, secret: &str) -> bool {
        !self.pin.is_empty() && secret == self.pin
    }
}
