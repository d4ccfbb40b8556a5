use crate::estimation::Prediction;
use std::sync::RwLock;

/// What the presentation layer sees. Always replaced as a whole.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct PublishedState {
    /// Latest completed estimate, `None` until the first success
    pub prediction: Option<Prediction>,
    pub face_found: bool,
    /// Bumped on every publication
    pub version: u64,
}

/// Single-record store shared between the worker and readers
#[derive(Debug, Default)]
pub struct SharedState {
    current: RwLock<PublishedState>,
}

impl SharedState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn snapshot(&self) -> PublishedState {
        *self.current.read().unwrap_or_else(|e| e.into_inner())
    }

    /// Face lookup finished; the previous prediction stays published
    pub fn publish_face_found(&self, face_found: bool) -> PublishedState {
        self.replace(|prev| PublishedState {
            prediction: prev.prediction,
            face_found,
            version: prev.version + 1,
        })
    }

    /// Cycle completed with a fresh estimate
    pub fn publish_prediction(&self, prediction: Prediction) -> PublishedState {
        self.replace(|prev| PublishedState {
            prediction: Some(prediction),
            face_found: true,
            version: prev.version + 1,
        })
    }

    fn replace(&self, next: impl FnOnce(&PublishedState) -> PublishedState) -> PublishedState {
        let mut current = self.current.write().unwrap_or_else(|e| e.into_inner());
        let updated = next(&current);
        *current = updated;
        updated
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn starts_empty() {
        let state = SharedState::new();
        assert_eq!(state.snapshot(), PublishedState::default());
        assert!(!state.snapshot().face_found);
    }

    #[test]
    fn no_face_keeps_last_prediction() {
        let state = SharedState::new();
        state.publish_prediction(Prediction { age: 31 });
        let after = state.publish_face_found(false);

        assert_eq!(after.prediction, Some(Prediction { age: 31 }));
        assert!(!after.face_found);
        assert_eq!(after.version, 2);
    }

    #[test]
    fn prediction_replaces_previous() {
        let state = SharedState::new();
        state.publish_prediction(Prediction { age: 31 });
        state.publish_prediction(Prediction { age: 44 });

        let current = state.snapshot();
        assert_eq!(current.prediction, Some(Prediction { age: 44 }));
        assert!(current.face_found);
    }
}
