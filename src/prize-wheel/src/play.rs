//! Client-side play flow
//!
//! Drives one visitor's session through `Idle -> Spinning -> Revealed`.
//! The drawn ticket is written to a per-session continuity store as soon as
//! the draw succeeds, so rebuilding the view re-displays the same prize
//! instead of allowing a second spin. The gate is advisory; nothing on the
//! server side enforces one play per visitor.

use crate::selector::{DrawResult, RedemptionCode};
use crate::wheel::{Rotation, WheelLayout, SPIN_DURATION};
use rand::Rng;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::time::{Duration, Instant};

pub const SPIN_STORAGE_KEY: &str = "wheel_has_spun";
pub const PRIZE_STORAGE_KEY: &str = "wheel_prize";
pub const CODE_STORAGE_KEY: &str = "wheel_code";

/// Shown when the result could not be logged remotely
pub const LOG_FAILURE_NOTICE: &str =
    "Your prize was saved on this device, but we could not confirm it was recorded.";

/// Per-session key/value store that survives view reconstruction
pub trait SessionStore {
    fn get(&self, key: &str) -> Option<String>;
    fn set(&mut self, key: &str, value: &str);
}

impl<S: SessionStore + ?Sized> SessionStore for &mut S {
    fn get(&self, key: &str) -> Option<String> {
        (**self).get(key)
    }

    fn set(&mut self, key: &str, value: &str) {
        (**self).set(key, value)
    }
}

/// In-process session store
#[derive(Debug, Clone, Default)]
pub struct MemorySessionStore {
    entries: HashMap<String, String>,
}

impl MemorySessionStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl SessionStore for MemorySessionStore {
    fn get(&self, key: &str) -> Option<String> {
        self.entries.get(key).cloned()
    }

    fn set(&mut self, key: &str, value: &str) {
        self.entries.insert(key.to_string(), value.to_string());
    }
}

/// What the visitor won, as the client knows it
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Ticket {
    /// Display label of the prize category
    pub prize: String,
    pub code: RedemptionCode,
}

impl From<DrawResult> for Ticket {
    fn from(result: DrawResult) -> Self {
        Self {
            prize: result.category.label,
            code: result.code,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum PlayState {
    Idle,
    Spinning {
        ticket: Ticket,
        rotation: Rotation,
        started: Instant,
    },
    /// Terminal for the session
    Revealed { ticket: Ticket },
}

#[derive(Debug, thiserror::Error)]
pub enum PlayError<E> {
    #[error("The wheel has already been spun in this session")]
    AlreadySpun,

    #[error("The wheel is already spinning")]
    AlreadySpinning,

    #[error("Draw request failed: {0}")]
    Draw(E),
}

/// One visitor's pass through the wheel
#[derive(Debug)]
pub struct PlaySession<S: SessionStore> {
    store: S,
    layout: WheelLayout,
    state: PlayState,
    log_failed: bool,
}

impl<S: SessionStore> PlaySession<S> {
    /// Start a session, re-entering `Revealed` if the store already holds a result
    pub fn restore(store: S, layout: WheelLayout) -> Self {
        let state = match Self::stored_ticket(&store, &layout) {
            Some(ticket) => PlayState::Revealed { ticket },
            None => PlayState::Idle,
        };
        Self {
            store,
            layout,
            state,
            log_failed: false,
        }
    }

    fn stored_ticket(store: &S, layout: &WheelLayout) -> Option<Ticket> {
        if store.get(SPIN_STORAGE_KEY).as_deref() != Some("true") {
            return None;
        }
        let prize = store.get(PRIZE_STORAGE_KEY)?;
        layout.category_of(&prize)?;
        let code = store.get(CODE_STORAGE_KEY)?.parse().ok()?;
        Some(Ticket { prize, code })
    }

    pub fn state(&self) -> &PlayState {
        &self.state
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn into_store(self) -> S {
        self.store
    }

    /// The revealed result, once the spin has landed
    pub fn ticket(&self) -> Option<&Ticket> {
        match &self.state {
            PlayState::Revealed { ticket } => Some(ticket),
            _ => None,
        }
    }

    /// Request a draw and start spinning toward its segment
    ///
    /// A failed draw leaves the session idle with nothing stored, so the
    /// visitor can retry.
    pub fn begin<R, F, E>(
        &mut self,
        now: Instant,
        rng: &mut R,
        draw: F,
    ) -> Result<Rotation, PlayError<E>>
    where
        R: Rng + ?Sized,
        F: FnOnce() -> Result<Ticket, E>,
    {
        match self.state {
            PlayState::Revealed { .. } => return Err(PlayError::AlreadySpun),
            PlayState::Spinning { .. } => return Err(PlayError::AlreadySpinning),
            PlayState::Idle => {}
        }

        let ticket = draw().map_err(PlayError::Draw)?;
        let rotation = self.layout.rotation_for_label(&ticket.prize, rng);

        self.store.set(SPIN_STORAGE_KEY, "true");
        self.store.set(PRIZE_STORAGE_KEY, &ticket.prize);
        self.store.set(CODE_STORAGE_KEY, ticket.code.as_str());

        self.state = PlayState::Spinning {
            ticket,
            rotation,
            started: now,
        };
        Ok(rotation)
    }

    /// Time left before the result may be revealed
    pub fn remaining(&self, now: Instant) -> Option<Duration> {
        match &self.state {
            PlayState::Spinning { started, .. } => {
                Some(SPIN_DURATION.saturating_sub(now.saturating_duration_since(*started)))
            }
            _ => None,
        }
    }

    /// Advance the animation clock, revealing the ticket once the spin has landed
    pub fn poll(&mut self, now: Instant) -> Option<&Ticket> {
        if self.remaining(now) == Some(Duration::ZERO) {
            let state = std::mem::replace(&mut self.state, PlayState::Idle);
            if let PlayState::Spinning { ticket, .. } = state {
                self.state = PlayState::Revealed { ticket };
            }
        }
        self.ticket()
    }

    /// Note that the result could not be persisted remotely; the prize stands
    pub fn record_log_failure(&mut self) {
        self.log_failed = true;
    }

    pub fn notice(&self) -> Option<&'static str> {
        self.log_failed.then_some(LOG_FAILURE_NOTICE)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::Catalog;
    use crate::selector::PrizeSelector;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn layout() -> WheelLayout {
        WheelLayout::new(&Catalog::default())
    }

    fn ticket(prize: &str, code: &str) -> Ticket {
        Ticket {
            prize: prize.to_string(),
            code: code.parse().unwrap(),
        }
    }

    #[test]
    fn test_full_flow() {
        let mut store = MemorySessionStore::new();
        let mut session = PlaySession::restore(&mut store, layout());
        let mut rng = StdRng::seed_from_u64(11);
        let start = Instant::now();

        let rotation = session
            .begin(start, &mut rng, || {
                Ok::<_, String>(ticket("Presente CDPI Pharma", "123456"))
            })
            .unwrap();
        assert!([2, 6].contains(&rotation.segment));
        assert!(session.ticket().is_none());

        // Still spinning before the animation completes
        assert!(session.poll(start + Duration::from_millis(3999)).is_none());
        assert_eq!(
            session.remaining(start + Duration::from_millis(1000)),
            Some(Duration::from_millis(3000))
        );

        let revealed = session.poll(start + SPIN_DURATION).cloned();
        assert_eq!(revealed, Some(ticket("Presente CDPI Pharma", "123456")));
        assert!(matches!(session.state(), PlayState::Revealed { .. }));
    }

    #[test]
    fn test_rejects_second_spin() {
        let mut session = PlaySession::restore(MemorySessionStore::new(), layout());
        let mut rng = StdRng::seed_from_u64(2);
        let start = Instant::now();
        let draw = || Ok::<_, String>(ticket("Kit Premium CDPI Pharma", "222222"));

        session.begin(start, &mut rng, draw).unwrap();
        assert!(matches!(
            session.begin(start, &mut rng, draw),
            Err(PlayError::AlreadySpinning)
        ));

        session.poll(start + SPIN_DURATION);
        let mut called = false;
        let result = session.begin(start, &mut rng, || {
            called = true;
            draw()
        });
        assert!(matches!(result, Err(PlayError::AlreadySpun)));
        assert!(!called);
    }

    #[test]
    fn test_failed_draw_is_retryable() {
        let mut session = PlaySession::restore(MemorySessionStore::new(), layout());
        let mut rng = StdRng::seed_from_u64(4);
        let start = Instant::now();

        let err = session
            .begin(start, &mut rng, || Err::<Ticket, _>("connection reset"))
            .unwrap_err();
        assert!(matches!(err, PlayError::Draw("connection reset")));
        assert_eq!(session.state(), &PlayState::Idle);
        assert_eq!(session.store().get(SPIN_STORAGE_KEY), None);

        session
            .begin(start, &mut rng, || {
                Ok::<_, &str>(ticket("E-book Digital Exclusive", "100001"))
            })
            .unwrap();
        assert!(matches!(session.state(), PlayState::Spinning { .. }));
    }

    #[test]
    fn test_restore_is_idempotent() {
        let selector = PrizeSelector::default();
        let mut rng = StdRng::seed_from_u64(8);
        let start = Instant::now();

        let mut session = PlaySession::restore(MemorySessionStore::new(), layout());
        let mut draws = 0;
        session
            .begin(start, &mut rng, || {
                draws += 1;
                Ok::<_, String>(selector.draw(&mut StdRng::seed_from_u64(1)).into())
            })
            .unwrap();
        let won = match session.state() {
            PlayState::Spinning { ticket, .. } => ticket.clone(),
            other => panic!("unexpected state {other:?}"),
        };

        // View torn down mid-spin; the stored result is shown again
        let store = session.into_store();
        for _ in 0..3 {
            let again = PlaySession::restore(store.clone(), layout());
            assert_eq!(again.ticket(), Some(&won));
        }
        assert_eq!(draws, 1);
    }

    #[test]
    fn test_restore_ignores_incomplete_store() {
        let mut store = MemorySessionStore::new();
        store.set(SPIN_STORAGE_KEY, "true");
        store.set(PRIZE_STORAGE_KEY, "E-book Digital Exclusive");
        assert_eq!(
            PlaySession::restore(store.clone(), layout()).state(),
            &PlayState::Idle
        );

        store.set(CODE_STORAGE_KEY, "12");
        assert_eq!(
            PlaySession::restore(store.clone(), layout()).state(),
            &PlayState::Idle
        );

        store.set(PRIZE_STORAGE_KEY, "Unknown prize");
        store.set(CODE_STORAGE_KEY, "123456");
        assert_eq!(
            PlaySession::restore(store, layout()).state(),
            &PlayState::Idle
        );
    }

    #[test]
    fn test_unknown_label_still_spins() {
        let mut session = PlaySession::restore(MemorySessionStore::new(), layout());
        let rotation = session
            .begin(Instant::now(), &mut StdRng::seed_from_u64(6), || {
                Ok::<_, String>(ticket("Mystery Box", "555555"))
            })
            .unwrap();
        assert!(rotation.fallback);
        assert!([0, 4].contains(&rotation.segment));
    }

    #[test]
    fn test_log_failure_notice() {
        let mut session = PlaySession::restore(MemorySessionStore::new(), layout());
        assert_eq!(session.notice(), None);
        session.record_log_failure();
        assert_eq!(session.notice(), Some(LOG_FAILURE_NOTICE));
    }
}
