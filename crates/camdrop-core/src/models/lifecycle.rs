use crate::error::UploadError;
use crate::models::upload::UploadResult;

/// Lifecycle of one widget: idle → previewing → uploading → uploaded, with `Failed`
/// reachable from uploading (or from confirm itself) and discard returning to idle.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum LifecycleState {
    #[default]
    Idle,
    Previewing,
    /// Percent of the payload handed to the network, 0–100.
    Uploading { progress: u8 },
    Uploaded(UploadResult),
    Failed(UploadError),
}

impl LifecycleState {
    pub fn name(&self) -> &'static str {
        match self {
            LifecycleState::Idle => "idle",
            LifecycleState::Previewing => "previewing",
            LifecycleState::Uploading { .. } => "uploading",
            LifecycleState::Uploaded(_) => "uploaded",
            LifecycleState::Failed(_) => "failed",
        }
    }

    pub fn is_idle(&self) -> bool {
        matches!(self, LifecycleState::Idle)
    }

    pub fn is_uploading(&self) -> bool {
        matches!(self, LifecycleState::Uploading { .. })
    }

    pub fn progress(&self) -> Option<u8> {
        match self {
            LifecycleState::Uploading { progress } => Some(*progress),
            _ => None,
        }
    }

    pub fn hosted_url(&self) -> Option<&str> {
        match self {
            LifecycleState::Uploaded(result) => Some(&result.hosted_url),
            _ => None,
        }
    }

    pub fn error(&self) -> Option<&UploadError> {
        match self {
            LifecycleState::Failed(err) => Some(err),
            _ => None,
        }
    }
}

/// Convert a (loaded, total) byte count into a percentage clamped to 0–100.
///
/// Returns `None` when the total is unknown, which callers treat as "no update".
pub fn progress_percent(loaded: u64, total: u64) -> Option<u8> {
    if total == 0 {
        return None;
    }
    let percent = loaded.saturating_mul(100) / total;
    Some(percent.min(100) as u8)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_progress_percent_clamped() {
        assert_eq!(progress_percent(0, 200), Some(0));
        assert_eq!(progress_percent(50, 200), Some(25));
        assert_eq!(progress_percent(200, 200), Some(100));
        assert_eq!(progress_percent(500, 200), Some(100));
        assert_eq!(progress_percent(u64::MAX, 1), Some(100));
    }

    #[test]
    fn test_progress_percent_unknown_total() {
        assert_eq!(progress_percent(10, 0), None);
    }

    #[test]
    fn test_state_accessors() {
        assert!(LifecycleState::default().is_idle());

        let uploading = LifecycleState::Uploading { progress: 40 };
        assert!(uploading.is_uploading());
        assert_eq!(uploading.progress(), Some(40));
        assert_eq!(uploading.name(), "uploading");

        let uploaded = LifecycleState::Uploaded(UploadResult::new("https://host/a.jpg"));
        assert_eq!(uploaded.hosted_url(), Some("https://host/a.jpg"));
        assert_eq!(uploaded.progress(), None);

        let failed = LifecycleState::Failed(UploadError::Network("reset".to_string()));
        assert!(failed.error().is_some());
        assert_eq!(failed.name(), "failed");
    }
}
