use thiserror::Error;

/// Reasons a scene cannot be mounted.
///
/// A zero-sized container is not among them: the scene mounts and waits for
/// a resize.
#[derive(Debug, Error)]
pub enum SceneError {
    #[error("no suitable graphics adapter found")]
    NoAdapter,
    #[error("failed to acquire a graphics device: {0}")]
    Device(String),
    #[error("failed to create the drawing surface: {0}")]
    Surface(String),
    #[error("host environment error: {0}")]
    Host(String),
    #[error(transparent)]
    Backend(#[from] anyhow::Error),
}

impl SceneError {
    /// Recover a typed error a backend raised through `anyhow`, wrapping
    /// anything else as [`SceneError::Backend`].
    pub fn from_backend(err: anyhow::Error) -> Self {
        match err.downcast::<SceneError>() {
            Ok(err) => err,
            Err(err) => SceneError::Backend(err),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn typed_errors_survive_anyhow() {
        let err = anyhow::Error::from(SceneError::NoAdapter);
        assert!(matches!(SceneError::from_backend(err), SceneError::NoAdapter));
    }

    #[test]
    fn other_errors_become_backend_errors() {
        let err = anyhow::anyhow!("out of memory");
        let scene = SceneError::from_backend(err);
        assert!(matches!(scene, SceneError::Backend(_)));
        assert_eq!(scene.to_string(), "out of memory");
    }
}
