use std::fmt;

/// Shader stage a compilation error refers to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    Vertex,
    Fragment,
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Stage::Vertex => f.write_str("vertex"),
            Stage::Fragment => f.write_str("fragment"),
        }
    }
}

/// Every failure here is fatal: nothing is retried and nothing is rolled back.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("no supported native presentation surface for this window")]
    PlatformUnsupported,

    #[error("graphics backend is not available on this system")]
    BackendUnavailable,

    #[error("no adapter can both render and present to the window surface")]
    NoSuitableAdapter,

    #[error("failed to create window: {0}")]
    Window(String),

    #[error("failed to create {resource}: {reason}")]
    ResourceCreation {
        resource: &'static str,
        reason: String,
    },

    #[error("failed to compile {stage} shader:\n{log}")]
    ShaderCompilation { stage: Stage, log: String },

    #[error("frame submission failed: {0}")]
    Submission(String),
}

impl Error {
    pub(crate) fn resource(resource: &'static str, reason: impl Into<String>) -> Self {
        Error::ResourceCreation {
            resource,
            reason: reason.into(),
        }
    }

    /// Wraps a backend error, which only exposes `Debug`.
    pub(crate) fn resource_failed(resource: &'static str, err: impl fmt::Debug) -> Self {
        Error::resource(resource, format!("{:?}", err))
    }

    pub(crate) fn submission(reason: impl Into<String>) -> Self {
        Error::Submission(reason.into())
    }

    pub(crate) fn submission_failed(err: impl fmt::Debug) -> Self {
        Error::Submission(format!("{:?}", err))
    }
}
