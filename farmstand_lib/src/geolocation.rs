//! Device location lookup.

use std::sync::{Mutex, PoisonError};
use std::time::Duration;

use async_trait::async_trait;
use farmstand_data::types::Coordinates;
use serde::Serialize;
use thiserror::Error;

use crate::request::RequestGate;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum GeolocationError {
    #[error("Geolocation is not supported by your browser")]
    Unsupported,
    #[error("Unable to retrieve your location: {0}")]
    Failed(String),
    #[error("Unable to retrieve your location: Timeout expired")]
    Timeout,
}

/// Source of the device position. Errors are plain messages.
#[async_trait]
pub trait Locator: Send + Sync {
    async fn locate(&self) -> Result<Coordinates, String>;
}

/// Always reports the same position.
#[derive(Debug, Clone, Copy)]
pub struct FixedLocator(pub Coordinates);

#[async_trait]
impl Locator for FixedLocator {
    async fn locate(&self) -> Result<Coordinates, String> {
        Ok(self.0)
    }
}

/// Snapshot of a location lookup.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct GeolocationState {
    pub location: Option<Coordinates>,
    pub error: Option<String>,
    pub loading: bool,
}

/// Looks up the device location through an optional [`Locator`], keeping the
/// latest outcome as a [`GeolocationState`].
pub struct Geolocation {
    locator: Option<Box<dyn Locator>>,
    timeout: Duration,
    gate: RequestGate,
    state: Mutex<GeolocationState>,
}

impl Geolocation {
    pub fn new(locator: Option<Box<dyn Locator>>, timeout: Duration) -> Self {
        Self {
            locator,
            timeout,
            gate: RequestGate::new(),
            state: Mutex::new(GeolocationState::default()),
        }
    }

    pub fn state(&self) -> GeolocationState {
        self.state
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    fn update(&self, f: impl FnOnce(&mut GeolocationState)) {
        let mut state = self.state.lock().unwrap_or_else(PoisonError::into_inner);
        f(&mut state);
    }

    /// Requests the current position. A request superseded by a newer one
    /// leaves the state to the newer request.
    pub async fn get_location(&self) -> GeolocationState {
        let Some(locator) = self.locator.as_deref() else {
            self.update(|s| s.error = Some(GeolocationError::Unsupported.to_string()));
            return self.state();
        };

        self.update(|s| {
            s.loading = true;
            s.error = None;
        });

        let lookup = async {
            match tokio::time::timeout(self.timeout, locator.locate()).await {
                Ok(Ok(coords)) => Ok(coords),
                Ok(Err(msg)) => Err(GeolocationError::Failed(msg)),
                Err(_) => Err(GeolocationError::Timeout),
            }
        };

        match self.gate.run(lookup).await {
            Some(Ok(coords)) => self.update(|s| {
                s.location = Some(coords);
                s.loading = false;
            }),
            Some(Err(e)) => {
                tracing::warn!("{}", e);
                self.update(|s| {
                    s.error = Some(e.to_string());
                    s.loading = false;
                });
            }
            None => {}
        }
        self.state()
    }
}

#[cfg(test)]
mod tests {
    use tokio::time::sleep;

    use super::*;

    struct SlowLocator {
        delay: Duration,
        at: Coordinates,
    }

    #[async_trait]
    impl Locator for SlowLocator {
        async fn locate(&self) -> Result<Coordinates, String> {
            sleep(self.delay).await;
            Ok(self.at)
        }
    }

    struct DeniedLocator;

    #[async_trait]
    impl Locator for DeniedLocator {
        async fn locate(&self) -> Result<Coordinates, String> {
            Err("User denied Geolocation".to_string())
        }
    }

    #[tokio::test]
    async fn unsupported_without_locator() {
        let geo = Geolocation::new(None, Duration::from_secs(10));
        let state = geo.get_location().await;
        assert_eq!(
            state.error.as_deref(),
            Some("Geolocation is not supported by your browser")
        );
        assert!(!state.loading);
        assert!(state.location.is_none());
    }

    #[tokio::test]
    async fn fixed_locator_resolves() {
        let home = Coordinates::new(45.52, -122.68);
        let geo = Geolocation::new(Some(Box::new(FixedLocator(home))), Duration::from_secs(10));
        let state = geo.get_location().await;
        assert_eq!(state.location, Some(home));
        assert_eq!(state.error, None);
        assert!(!state.loading);
    }

    #[tokio::test]
    async fn locator_error_is_prefixed() {
        let geo = Geolocation::new(Some(Box::new(DeniedLocator)), Duration::from_secs(10));
        let state = geo.get_location().await;
        assert_eq!(
            state.error.as_deref(),
            Some("Unable to retrieve your location: User denied Geolocation")
        );
    }

    #[tokio::test(start_paused = true)]
    async fn timeout_becomes_error_state() {
        let slow = SlowLocator {
            delay: Duration::from_secs(30),
            at: Coordinates::new(0.0, 0.0),
        };
        let geo = Geolocation::new(Some(Box::new(slow)), Duration::from_secs(10));
        let state = geo.get_location().await;
        assert_eq!(
            state.error.as_deref(),
            Some("Unable to retrieve your location: Timeout expired")
        );
        assert!(state.location.is_none());
        assert!(!state.loading);
    }

    #[tokio::test(start_paused = true)]
    async fn loading_while_in_flight() {
        let slow = SlowLocator {
            delay: Duration::from_secs(2),
            at: Coordinates::new(1.0, 2.0),
        };
        let geo = Geolocation::new(Some(Box::new(slow)), Duration::from_secs(10));
        let probe = async {
            sleep(Duration::from_secs(1)).await;
            geo.state()
        };
        let (done, mid) = tokio::join!(geo.get_location(), probe);
        assert!(mid.loading);
        assert!(!done.loading);
        assert_eq!(done.location, Some(Coordinates::new(1.0, 2.0)));
    }
}
