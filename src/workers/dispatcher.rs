//! Command dispatch
//!
//! Confirmed, user-initiated mutations of the rig. Every command asks first,
//! calls the rig once, reports the outcome through the transient message and,
//! on success, refreshes the snapshot straight away.

use super::core::EventSender;
use super::poller;
use crate::api::error::ApiError;
use crate::api::{PumpState, RigApi};
use crate::confirm::Confirm;
use crate::consts::cli_consts::dosing;
use crate::error_classifier::{ErrorClassifier, LogLevel};
use crate::events::EventType;
use crate::store::DashboardStore;
use std::fmt;
use std::str::FromStr;
use std::sync::Arc;
use thiserror::Error;

/// A nutrient dose that the rig accepts: 10..=1000 ml in steps of 10.
#[derive(Debug, Copy, Clone, PartialEq, Eq, PartialOrd, Ord)]
pub struct DoseAmount(u32);

#[derive(Debug, Error, PartialEq, Eq)]
pub enum DoseError {
    #[error("Dose must be between {min}ml and {max}ml", min = dosing::MIN_DOSE_ML, max = dosing::MAX_DOSE_ML)]
    OutOfRange(u32),

    #[error("Dose must be a multiple of {step}ml", step = dosing::DOSE_STEP_ML)]
    NotAStep(u32),

    #[error("Dose must be a whole number of ml")]
    NotANumber,
}

impl DoseAmount {
    pub fn new(ml: u32) -> Result<Self, DoseError> {
        if !(dosing::MIN_DOSE_ML..=dosing::MAX_DOSE_ML).contains(&ml) {
            return Err(DoseError::OutOfRange(ml));
        }
        if ml % dosing::DOSE_STEP_ML != 0 {
            return Err(DoseError::NotAStep(ml));
        }
        Ok(Self(ml))
    }

    pub fn ml(self) -> u32 {
        self.0
    }

    /// One step up, saturating at the maximum.
    pub fn increase(self) -> Self {
        Self((self.0 + dosing::DOSE_STEP_ML).min(dosing::MAX_DOSE_ML))
    }

    /// One step down, saturating at the minimum.
    pub fn decrease(self) -> Self {
        Self(self.0.saturating_sub(dosing::DOSE_STEP_ML).max(dosing::MIN_DOSE_ML))
    }
}

impl Default for DoseAmount {
    fn default() -> Self {
        Self(dosing::DEFAULT_DOSE_ML)
    }
}

impl fmt::Display for DoseAmount {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}ml", self.0)
    }
}

impl FromStr for DoseAmount {
    type Err = DoseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let ml = s
            .trim()
            .trim_end_matches("ml")
            .parse::<u32>()
            .map_err(|_| DoseError::NotANumber)?;
        Self::new(ml)
    }
}

#[derive(Debug, Error)]
pub enum DispatchError {
    /// The operator said no; nothing was sent.
    #[error("Cancelled")]
    Declined,

    #[error(transparent)]
    InvalidDose(#[from] DoseError),

    #[error("{message}: {source}")]
    Command {
        message: &'static str,
        #[source]
        source: ApiError,
    },
}

/// Executes confirmed commands against the rig on behalf of one operator.
#[derive(Clone)]
pub struct CommandDispatcher {
    api: Arc<dyn RigApi>,
    store: DashboardStore,
    confirm: Arc<dyn Confirm>,
    events: EventSender,
    user: String,
    classifier: ErrorClassifier,
}

impl CommandDispatcher {
    pub fn new(
        api: Arc<dyn RigApi>,
        store: DashboardStore,
        confirm: Arc<dyn Confirm>,
        events: EventSender,
        user: String,
    ) -> Self {
        Self {
            api,
            store,
            confirm,
            events,
            user,
            classifier: ErrorClassifier::new(),
        }
    }

    pub fn user(&self) -> &str {
        &self.user
    }

    /// Turns the pump on or off after confirmation.
    pub async fn set_pump(&self, state: PumpState) -> Result<(), DispatchError> {
        if !self.confirm.confirm(&format!("Turn pump {}?", state)).await {
            return Err(DispatchError::Declined);
        }

        self.store.begin_command();
        let result = self.api.set_pump(state, &self.user).await;
        self.store.end_command();

        match result {
            Ok(_) => {
                self.succeed(format!("Pump turned {}", state)).await;
                Ok(())
            }
            Err(e) => Err(self.fail("Error controlling pump", e)),
        }
    }

    /// Doses nutrients after confirmation. Invalid amounts never reach the prompt.
    pub async fn dose(&self, amount_ml: u32) -> Result<(), DispatchError> {
        let amount = match DoseAmount::new(amount_ml) {
            Ok(amount) => amount,
            Err(e) => {
                self.store.set_message(e.to_string());
                return Err(e.into());
            }
        };

        let prompt = format!("Add {}ml of nutrients?", amount.ml());
        if !self.confirm.confirm(&prompt).await {
            return Err(DispatchError::Declined);
        }

        self.store.begin_command();
        let result = self.api.dose(amount.ml(), &self.user).await;
        self.store.end_command();

        match result {
            Ok(_) => {
                self.succeed(format!("Dosed {}ml successfully", amount.ml()))
                    .await;
                Ok(())
            }
            Err(e) => Err(self.fail("Error dosing nutrients", e)),
        }
    }

    /// Starts the simulator if the last snapshot says it is stopped, otherwise stops it.
    pub async fn toggle_simulator(&self) -> Result<(), DispatchError> {
        let running = self.store.snapshot().simulator.running;
        self.set_simulator(!running).await
    }

    /// Starts or stops the simulator explicitly, without consulting the snapshot.
    pub async fn set_simulator(&self, run: bool) -> Result<(), DispatchError> {
        self.store.begin_command();
        let result = if run {
            self.api.start_simulator().await
        } else {
            self.api.stop_simulator().await
        };
        self.store.end_command();

        match result {
            Ok(_) => {
                let msg = if run { "Simulator started" } else { "Simulator stopped" };
                self.succeed(msg.to_string()).await;
                Ok(())
            }
            Err(e) => Err(self.fail("Error toggling simulator", e)),
        }
    }

    /// Fetches a fresh snapshot outside the poll schedule. Failures are logged only.
    pub async fn refresh(&self) {
        if let Err(e) = poller::refresh_now(self.api.as_ref(), &self.store).await {
            self.events.send_dispatcher_event(
                format!("Refresh after command failed: {}", e),
                EventType::Error,
                self.classifier.classify_snapshot_error(&e),
            );
        }
    }

    async fn succeed(&self, msg: String) {
        self.store.set_message(msg.clone());
        self.events
            .send_dispatcher_event(msg, EventType::Success, LogLevel::Info);
        self.refresh().await;
    }

    fn fail(&self, message: &'static str, source: ApiError) -> DispatchError {
        self.store.set_message(message);
        self.events.send_dispatcher_event(
            format!("{}: {}", message, source),
            EventType::Error,
            self.classifier.classify_api_error(&source),
        );
        DispatchError::Command { message, source }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::{ControlAction, MockRigApi, SimulatorStatus};
    use crate::confirm::{AutoConfirm, MockConfirm};
    use crate::store::fixtures;
    use crate::workers::testing::FakeRig;
    use chrono::Utc;
    use mockall::Sequence;
    use mockall::predicate::eq;

    fn ack(action_type: &str) -> ControlAction {
        ControlAction {
            id: 7,
            timestamp: Utc::now(),
            action_type: action_type.to_string(),
            action_value: String::new(),
            user: "tester".to_string(),
        }
    }

    fn expect_refresh(mock: &mut MockRigApi, running: bool) {
        mock.expect_latest_reading()
            .times(1)
            .returning(|| Ok(Some(fixtures::reading(800.0, PumpState::On))));
        mock.expect_latest_alerts().times(1).returning(|| Ok(Vec::new()));
        mock.expect_simulator_status().times(1).returning(move || {
            Ok(SimulatorStatus {
                running,
                message: String::new(),
            })
        });
    }

    fn dispatcher(mock: MockRigApi, confirm: impl Confirm + 'static) -> (CommandDispatcher, DashboardStore) {
        let store = DashboardStore::new();
        let (events, _receiver) = EventSender::channel();
        let dispatcher = CommandDispatcher::new(
            Arc::new(mock),
            store.clone(),
            Arc::new(confirm),
            events,
            "tester".to_string(),
        );
        (dispatcher, store)
    }

    #[test]
    fn dose_amount_domain() {
        assert!(DoseAmount::new(10).is_ok());
        assert!(DoseAmount::new(1000).is_ok());
        assert_eq!(DoseAmount::new(0), Err(DoseError::OutOfRange(0)));
        assert_eq!(DoseAmount::new(1010), Err(DoseError::OutOfRange(1010)));
        assert_eq!(DoseAmount::new(55), Err(DoseError::NotAStep(55)));
        assert_eq!("120ml".parse::<DoseAmount>().map(DoseAmount::ml), Ok(120));
        assert_eq!("lots".parse::<DoseAmount>(), Err(DoseError::NotANumber));
    }

    #[test]
    fn dose_steps_saturate() {
        let max = DoseAmount::new(1000).unwrap();
        let min = DoseAmount::new(10).unwrap();
        assert_eq!(max.increase(), max);
        assert_eq!(min.decrease(), min);
        assert_eq!(DoseAmount::default().increase().ml(), 110);
    }

    #[tokio::test]
    async fn declined_pump_makes_no_calls() {
        let mut confirm = MockConfirm::new();
        confirm
            .expect_confirm()
            .with(eq("Turn pump ON?"))
            .times(1)
            .returning(|_| false);
        // No expectations: any rig call would panic.
        let (dispatcher, store) = dispatcher(MockRigApi::new(), confirm);

        let result = dispatcher.set_pump(PumpState::On).await;
        assert!(matches!(result, Err(DispatchError::Declined)));
        assert_eq!(store.message(), None);
        assert!(store.state().last_updated.is_none());
    }

    #[tokio::test]
    async fn confirmed_pump_sets_message_and_refreshes() {
        let mut mock = MockRigApi::new();
        mock.expect_set_pump()
            .with(eq(PumpState::Off), eq("tester"))
            .times(1)
            .returning(|_, _| Ok(ack("pump")));
        expect_refresh(&mut mock, true);
        let (dispatcher, store) = dispatcher(mock, AutoConfirm(true));

        dispatcher.set_pump(PumpState::Off).await.unwrap();

        assert_eq!(store.message().as_deref(), Some("Pump turned OFF"));
        assert_eq!(store.snapshot().reading.unwrap().tds_ppm, 800.0);
        assert!(!store.busy());
    }

    #[tokio::test]
    async fn failed_pump_leaves_snapshot_alone() {
        let mut mock = MockRigApi::new();
        mock.expect_set_pump().times(1).returning(|_, _| {
            Err(ApiError::Http {
                status: 500,
                message: "relay fault".to_string(),
            })
        });
        let (dispatcher, store) = dispatcher(mock, AutoConfirm(true));
        store.replace_snapshot(fixtures::snapshot(700.0, false));
        let before = store.snapshot();

        let result = dispatcher.set_pump(PumpState::On).await;
        assert!(matches!(result, Err(DispatchError::Command { .. })));
        assert_eq!(store.message().as_deref(), Some("Error controlling pump"));
        assert_eq!(store.snapshot(), before);
    }

    #[tokio::test]
    async fn out_of_range_dose_is_rejected_before_confirmation() {
        let mut confirm = MockConfirm::new();
        confirm.expect_confirm().never();
        let (dispatcher, store) = dispatcher(MockRigApi::new(), confirm);

        let result = dispatcher.dose(2000).await;
        assert!(matches!(
            result,
            Err(DispatchError::InvalidDose(DoseError::OutOfRange(2000)))
        ));
        assert_eq!(
            store.message().as_deref(),
            Some("Dose must be between 10ml and 1000ml")
        );
    }

    #[tokio::test]
    async fn valid_dose_reaches_confirmation() {
        let mut confirm = MockConfirm::new();
        confirm
            .expect_confirm()
            .with(eq("Add 250ml of nutrients?"))
            .times(1)
            .returning(|_| false);
        let (dispatcher, _store) = dispatcher(MockRigApi::new(), confirm);

        let result = dispatcher.dose(250).await;
        assert!(matches!(result, Err(DispatchError::Declined)));
    }

    #[tokio::test]
    async fn confirmed_dose_is_sent_once() {
        let mut mock = MockRigApi::new();
        mock.expect_dose()
            .with(eq(250), eq("tester"))
            .times(1)
            .returning(|_, _| Ok(ack("dose")));
        expect_refresh(&mut mock, false);
        let (dispatcher, store) = dispatcher(mock, AutoConfirm(true));

        dispatcher.dose(250).await.unwrap();
        assert_eq!(store.message().as_deref(), Some("Dosed 250ml successfully"));
    }

    #[tokio::test]
    async fn failed_dose_is_not_retried() {
        let mut mock = MockRigApi::new();
        mock.expect_dose().times(1).returning(|_, _| {
            Err(ApiError::Http {
                status: 503,
                message: "busy".to_string(),
            })
        });
        let (dispatcher, store) = dispatcher(mock, AutoConfirm(true));

        assert!(dispatcher.dose(100).await.is_err());
        assert_eq!(store.message().as_deref(), Some("Error dosing nutrients"));
    }

    #[tokio::test]
    async fn toggle_stops_a_running_simulator_then_refreshes() {
        let mut seq = Sequence::new();
        let mut mock = MockRigApi::new();
        mock.expect_stop_simulator()
            .times(1)
            .in_sequence(&mut seq)
            .returning(|| Ok(SimulatorStatus::default()));
        mock.expect_latest_reading()
            .times(1)
            .in_sequence(&mut seq)
            .returning(|| Ok(None));
        mock.expect_latest_alerts().times(1).returning(|| Ok(Vec::new()));
        mock.expect_simulator_status()
            .times(1)
            .returning(|| Ok(SimulatorStatus::default()));
        mock.expect_start_simulator().never();

        let (dispatcher, store) = dispatcher(mock, AutoConfirm(false));
        store.replace_snapshot(fixtures::snapshot(700.0, true));

        dispatcher.toggle_simulator().await.unwrap();
        assert_eq!(store.message().as_deref(), Some("Simulator stopped"));
        assert!(!store.snapshot().simulator.running);
    }

    #[tokio::test]
    async fn toggle_starts_a_stopped_simulator_then_refreshes() {
        let mut seq = Sequence::new();
        let mut mock = MockRigApi::new();
        mock.expect_start_simulator()
            .times(1)
            .in_sequence(&mut seq)
            .returning(|| {
                Ok(SimulatorStatus {
                    running: true,
                    message: String::new(),
                })
            });
        mock.expect_simulator_status()
            .times(1)
            .in_sequence(&mut seq)
            .returning(|| {
                Ok(SimulatorStatus {
                    running: true,
                    message: String::new(),
                })
            });
        mock.expect_latest_reading().times(1).returning(|| Ok(None));
        mock.expect_latest_alerts().times(1).returning(|| Ok(Vec::new()));
        mock.expect_stop_simulator().never();

        let (dispatcher, store) = dispatcher(mock, AutoConfirm(false));
        dispatcher.toggle_simulator().await.unwrap();

        assert_eq!(store.message().as_deref(), Some("Simulator started"));
        assert!(store.snapshot().simulator.running);
    }

    #[tokio::test]
    async fn failed_refresh_keeps_success_message() {
        let mut mock = MockRigApi::new();
        mock.expect_set_pump().times(1).returning(|_, _| Ok(ack("pump")));
        mock.expect_latest_reading().returning(|| Ok(None));
        mock.expect_latest_alerts().returning(|| {
            Err(ApiError::Http {
                status: 502,
                message: "gateway".to_string(),
            })
        });
        mock.expect_simulator_status()
            .returning(|| Ok(SimulatorStatus::default()));
        let (dispatcher, store) = dispatcher(mock, AutoConfirm(true));

        dispatcher.set_pump(PumpState::On).await.unwrap();
        assert_eq!(store.message().as_deref(), Some("Pump turned ON"));
        assert!(store.state().last_updated.is_none());
    }

    #[tokio::test]
    async fn busy_while_command_is_pending() {
        let rig = Arc::new(FakeRig::holding_commands(820.0));
        let store = DashboardStore::new();
        let (events, _receiver) = EventSender::channel();
        let dispatcher = CommandDispatcher::new(
            rig.clone(),
            store.clone(),
            Arc::new(AutoConfirm(true)),
            events,
            "tester".to_string(),
        );

        let pending = tokio::spawn({
            let dispatcher = dispatcher.clone();
            async move { dispatcher.set_pump(PumpState::On).await }
        });
        rig.command_entered.notified().await;
        assert!(store.busy());

        rig.release(1);
        pending.await.unwrap().unwrap();
        assert!(!store.busy());
        assert_eq!(store.message().as_deref(), Some("Pump turned ON"));
    }
}
