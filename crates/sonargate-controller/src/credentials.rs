//! Token resolution for the SonarQube connection.
//!
//! The credential provider never logs or embeds the token itself; errors
//! name the source that failed, not the value.

use std::path::PathBuf;

use crate::config::SonarQubeSettings;

#[derive(Debug, thiserror::Error)]
pub enum CredentialsError {
    #[error("no token source configured; set token, token_env, or token_file")]
    Missing,

    #[error("environment variable {0} is not set")]
    EnvMissing(String),

    #[error("cannot read token file {path}: {source}")]
    FileUnreadable {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("resolved token is empty")]
    Empty,
}

/// Resolves the access token from the configured source, in precedence
/// order: inline value, environment variable, token file.
pub fn resolve_token(settings: &SonarQubeSettings) -> Result<String, CredentialsError> {
    let token = if let Some(token) = &settings.token {
        token.clone()
    } else if let Some(var) = &settings.token_env {
        std::env::var(var).map_err(|_| CredentialsError::EnvMissing(var.clone()))?
    } else if let Some(path) = &settings.token_file {
        std::fs::read_to_string(path)
            .map_err(|source| CredentialsError::FileUnreadable {
                path: path.clone(),
                source,
            })?
            .trim()
            .to_string()
    } else {
        return Err(CredentialsError::Missing);
    };

    if token.is_empty() {
        return Err(CredentialsError::Empty);
    }
    Ok(token)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn settings() -> SonarQubeSettings {
        SonarQubeSettings {
            base_url: "https://sonar.example.com".to_string(),
            ..SonarQubeSettings::default()
        }
    }

    #[test]
    fn inline_token_wins() {
        let mut s = settings();
        s.token = Some("inline".to_string());
        s.token_file = Some("/does/not/exist".into());
        assert_eq!(resolve_token(&s).unwrap(), "inline");
    }

    #[test]
    fn token_file_is_read_and_trimmed() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("token");
        std::fs::write(&path, "secret-token\n").unwrap();

        let mut s = settings();
        s.token_file = Some(path);
        assert_eq!(resolve_token(&s).unwrap(), "secret-token");
    }

    #[test]
    fn unreadable_token_file_fails() {
        let mut s = settings();
        s.token_file = Some("/does/not/exist".into());
        assert!(matches!(
            resolve_token(&s),
            Err(CredentialsError::FileUnreadable { .. })
        ));
    }

    #[test]
    fn no_source_fails() {
        assert!(matches!(
            resolve_token(&settings()),
            Err(CredentialsError::Missing)
        ));
    }

    #[test]
    fn empty_token_fails() {
        let mut s = settings();
        s.token = Some(String::new());
        assert!(matches!(resolve_token(&s), Err(CredentialsError::Empty)));
    }
}
