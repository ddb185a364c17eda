//! User-facing outcome notices.

use cfupload_publish::{PublishError, PublishReport};

/// The visual category of a notice.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NoticeKind {
    Success,
    Failure,
}

/// A single line shown to the user when a command finishes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notice {
    pub kind: NoticeKind,
    pub text: String,
    /// Follow-up hint printed under the main line.
    pub hint: Option<String>,
}

impl Notice {
    pub fn success(text: impl Into<String>) -> Self {
        Self {
            kind: NoticeKind::Success,
            text: text.into(),
            hint: None,
        }
    }

    pub fn failure(text: impl Into<String>) -> Self {
        Self {
            kind: NoticeKind::Failure,
            text: text.into(),
            hint: None,
        }
    }

    fn with_hint(mut self, hint: impl Into<String>) -> Self {
        self.hint = Some(hint.into());
        self
    }

    /// Notice for a finished publication run.
    pub fn from_report(report: &PublishReport) -> Self {
        match &report.result {
            Ok(_) => Self::success(report.message()),
            Err(e) => Self::from_error(e),
        }
    }

    /// Notice for an error raised before or during publication.
    pub fn from_error(err: &PublishError) -> Self {
        let notice = Self::failure(format!("Upload failed: {err}"));
        match err {
            PublishError::ConfigurationMissing { .. } => {
                notice.with_hint("Run `cfupload configure` to set the space, token and model.")
            }
            PublishError::ProcessingTimeout { .. } => notice
                .with_hint("The asset exists as a draft; check it in the Contentful web app."),
            _ => notice,
        }
    }

    pub fn is_success(&self) -> bool {
        self.kind == NoticeKind::Success
    }

    /// Prints the notice: successes to stdout, failures to stderr.
    pub fn emit(&self) {
        match self.kind {
            NoticeKind::Success => println!("✓ {}", self.text),
            NoticeKind::Failure => eprintln!("✗ {}", self.text),
        }
        if let Some(hint) = &self.hint {
            eprintln!("  {hint}");
        }
    }
}
