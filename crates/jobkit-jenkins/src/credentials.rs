//! Username/password credentials for source-repository access.

use serde_json::json;

/// A username/password secret to store in Jenkins' system credential
/// store, used by jobs to check out their source repository.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Credential {
    id: Option<String>,
    username: String,
    password: String,
}

impl Credential {
    pub fn new(username: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            id: None,
            username: username.into(),
            password: password.into(),
        }
    }

    /// Pin the credential to an explicit store id. Without one, the
    /// job service derives an id from the job name.
    pub fn with_id(mut self, id: impl Into<String>) -> Self {
        self.id = Some(id.into());
        self
    }

    pub fn id(&self) -> Option<&str> {
        self.id.as_deref()
    }

    pub fn username(&self) -> &str {
        &self.username
    }

    /// JSON document for the credential-store `createCredentials`
    /// endpoint, with the resolved `id` substituted in.
    pub(crate) fn store_payload(&self, id: &str) -> serde_json::Value {
        json!({
            "": "0",
            "credentials": {
                "scope": "GLOBAL",
                "id": id,
                "username": self.username,
                "password": self.password,
                "description": "",
                "$class": "com.cloudbees.plugins.credentials.impl.UsernamePasswordCredentialsImpl",
            },
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_store_payload_shape() {
        let credential = Credential::new("builder", "s3cret");
        let payload = credential.store_payload("app-gitRepoCredential");

        let entry = &payload["credentials"];
        assert_eq!(entry["scope"], "GLOBAL");
        assert_eq!(entry["id"], "app-gitRepoCredential");
        assert_eq!(entry["username"], "builder");
        assert_eq!(entry["password"], "s3cret");
        assert_eq!(
            entry["$class"],
            "com.cloudbees.plugins.credentials.impl.UsernamePasswordCredentialsImpl"
        );
    }

    #[test]
    fn test_explicit_id_is_exposed() {
        let credential = Credential::new("builder", "s3cret").with_id("shared-cred");
        assert_eq!(credential.id(), Some("shared-cred"));
        assert_eq!(Credential::new("builder", "s3cret").id(), None);
    }
}
