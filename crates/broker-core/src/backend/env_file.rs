//! `{destination}.env` session files

use async_trait::async_trait;
use base64::Engine as _;
use base64::engine::general_purpose::STANDARD as BASE64;
use broker_content::{EnvCodec, EnvFile, Format, SaveMode};
use broker_fs::{FileKind, NormalizedPath, PathResolver, RobustnessConfig, io};
use broker_meta::{AuthType, KeyNamespace, Session, SessionField};

use super::SessionBackend;
use crate::Result;

/// Session records persisted as env files under a [`PathResolver`].
///
/// Reads take the first file found across the search directories.
/// Writes always land in the write directory, carrying over keys this
/// backend does not manage from whichever copy was read. Session cookies
/// are stored base64-encoded.
#[derive(Debug)]
pub struct EnvFileBackend {
    resolver: PathResolver,
    codec: EnvCodec,
}

impl EnvFileBackend {
    pub fn new(resolver: PathResolver) -> Self {
        Self {
            resolver,
            codec: EnvCodec::new(),
        }
    }

    pub fn with_robustness(resolver: PathResolver, robustness: RobustnessConfig) -> Self {
        Self {
            resolver,
            codec: EnvCodec::with_robustness(robustness),
        }
    }

    pub fn resolver(&self) -> &PathResolver {
        &self.resolver
    }

    /// Path the record for `destination` is written to.
    pub fn session_path(&self, destination: &str) -> NormalizedPath {
        self.resolver
            .write_path(&FileKind::Session.file_name(destination))
    }

    fn decode(&self, file: &EnvFile, namespace: KeyNamespace, source: &NormalizedPath) -> Result<Session> {
        let mut session = Session::new();

        for &(field, key) in namespace.entries() {
            let Some(value) = file.get(key) else {
                continue;
            };
            match field {
                SessionField::AuthType => match AuthType::parse(value) {
                    Some(auth_type) => session.auth_type = Some(auth_type),
                    None if value.is_empty() => {}
                    None => tracing::warn!(%source, key, value, "Ignoring unknown auth type"),
                },
                SessionField::SessionCookies => {
                    session.session_cookies = Some(decode_cookies(value, key, source)?);
                }
                _ => {
                    if let Some(slot) = field.slot(&mut session) {
                        *slot = Some(value.to_string());
                    }
                }
            }
        }

        Ok(session)
    }

    fn encode(&self, session: &Session, namespace: KeyNamespace) -> EnvFile {
        let mut values = EnvFile::new();
        for &(field, key) in namespace.entries() {
            let Some(text) = field.text(session) else {
                continue;
            };
            match field {
                SessionField::SessionCookies if !text.is_empty() => {
                    values.set(key, BASE64.encode(text.as_bytes()))
                }
                _ => values.set(key, text),
            }
        }
        values
    }
}

fn decode_cookies(value: &str, key: &str, source: &NormalizedPath) -> Result<String> {
    if value.is_empty() {
        return Ok(String::new());
    }
    let bytes = BASE64.decode(value.trim()).map_err(|e| {
        broker_content::Error::parse(Format::Env.name(), source.as_str(), format!("{key}: {e}"))
    })?;
    String::from_utf8(bytes).map_err(|e| {
        broker_content::Error::parse(Format::Env.name(), source.as_str(), format!("{key}: {e}")).into()
    })
}

#[async_trait]
impl SessionBackend for EnvFileBackend {
    fn name(&self) -> &'static str {
        "env-file"
    }

    async fn read(&self, destination: &str, namespace: KeyNamespace) -> Result<Option<Session>> {
        let Some(path) = self.resolver.find_file(&FileKind::Session.file_name(destination)) else {
            return Ok(None);
        };
        let Some(file) = self.codec.load(&path)? else {
            return Ok(None);
        };
        Ok(Some(self.decode(&file, namespace, &path)?))
    }

    async fn write(&self, destination: &str, namespace: KeyNamespace, session: &Session) -> Result<()> {
        let file_name = FileKind::Session.file_name(destination);
        let target = self.resolver.write_path(&file_name);

        // A copy read from a lower-priority directory seeds the new file so
        // its unmanaged keys are not lost when the write lands elsewhere.
        let mut values = match self.resolver.find_file(&file_name) {
            Some(found) if found != target => self
                .codec
                .load(&found)?
                .map(|file| {
                    file.iter()
                        .filter(|(key, _)| !KeyNamespace::all_keys().any(|k| k == *key))
                        .collect::<EnvFile>()
                })
                .unwrap_or_default(),
            _ => EnvFile::new(),
        };
        values.merge(&self.encode(session, namespace));

        let remove: Vec<&str> = KeyNamespace::all_keys()
            .filter(|key| !values.contains_key(key))
            .collect();

        self.resolver.ensure_write_dir()?;
        self.codec
            .save(&target, &values, &remove, SaveMode::PreserveExisting)?;
        tracing::debug!(path = %target, namespace = %namespace, "Persisted session");
        Ok(())
    }

    async fn remove(&self, destination: &str) -> Result<bool> {
        let mut removed = false;
        for path in self.resolver.find_all(&FileKind::Session.file_name(destination)) {
            removed |= io::remove_atomic(&path)?;
        }
        Ok(removed)
    }

    async fn list(&self) -> Result<Vec<String>> {
        Ok(self.resolver.list_stems(FileKind::Session.extension())?)
    }
}
