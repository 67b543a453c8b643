//! BB84 session orchestration.
//!
//! [`ProtocolOrchestrator`] runs the session state machine described in
//! [`crate::stage`] against injected collaborators: three random bit
//! sources (one per stream) and a quantum channel.
//!
//! The three draws are issued concurrently in `GENERATE_BITS` and joined
//! before anything else happens. Each stream comes from its own source and
//! is bound to its role by construction, so the order in which the draws
//! complete cannot change the result.

use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use tracing::{debug, info, instrument, warn};
use uuid::Uuid;

use qkd_hal::{QuantumChannel, RandomBitSource};
use qkd_ir::{Basis, Bit, MeasurementRequest, codec};

use crate::error::{ProtocolError, ProtocolResult, SessionFailure};
use crate::qber::analyze;
use crate::session::SessionResult;
use crate::sift::SiftMask;
use crate::stage::Stage;

/// Random bit sources, one per stream.
#[derive(Clone)]
pub struct SessionSources {
    /// Bits the sender encodes.
    pub sender_bits: Arc<dyn RandomBitSource>,
    /// Sender encoding bases (0 → Z, 1 → X).
    pub sender_bases: Arc<dyn RandomBitSource>,
    /// Receiver measurement bases (0 → Z, 1 → X).
    pub receiver_bases: Arc<dyn RandomBitSource>,
}

impl SessionSources {
    /// Draw all three streams from one source.
    pub fn shared(source: Arc<dyn RandomBitSource>) -> Self {
        Self {
            sender_bits: Arc::clone(&source),
            sender_bases: Arc::clone(&source),
            receiver_bases: source,
        }
    }

    /// Draw each stream from its own source.
    pub fn per_role(
        sender_bits: Arc<dyn RandomBitSource>,
        sender_bases: Arc<dyn RandomBitSource>,
        receiver_bases: Arc<dyn RandomBitSource>,
    ) -> Self {
        Self {
            sender_bits,
            sender_bases,
            receiver_bases,
        }
    }
}

/// Per-session parameters.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SessionConfig {
    /// Qubits generated per session.
    pub n_bits: usize,
    /// Deadline for the joined random draws.
    pub draw_timeout: Option<Duration>,
    /// Deadline for transmission and measurement.
    pub transmit_timeout: Option<Duration>,
}

impl SessionConfig {
    /// Sessions of `n_bits` qubits with no deadlines.
    ///
    /// `n_bits` must be positive: a session of zero qubits fails at `INIT`
    /// with [`ProtocolError::InvalidRequest`](crate::ProtocolError::InvalidRequest).
    pub fn new(n_bits: usize) -> Self {
        Self {
            n_bits,
            draw_timeout: None,
            transmit_timeout: None,
        }
    }

    /// Abort when the random draws take longer than `timeout`.
    pub fn with_draw_timeout(mut self, timeout: Duration) -> Self {
        self.draw_timeout = Some(timeout);
        self
    }

    /// Abort when transmission takes longer than `timeout`.
    pub fn with_transmit_timeout(mut self, timeout: Duration) -> Self {
        self.transmit_timeout = Some(timeout);
        self
    }
}

/// Stage bookkeeping for one session.
struct Tracker {
    session_id: Uuid,
    stage: Stage,
}

impl Tracker {
    fn start() -> Self {
        let tracker = Self {
            session_id: Uuid::new_v4(),
            stage: Stage::Init,
        };
        debug!("Session {}: {}", tracker.session_id, tracker.stage);
        tracker
    }

    fn advance(&mut self, to: Stage) {
        debug_assert_eq!(self.stage.next(), Some(to));
        debug!("Session {}: {} -> {}", self.session_id, self.stage, to);
        self.stage = to;
    }

    fn fail(&self, error: ProtocolError) -> SessionFailure {
        warn!(
            "Session {}: {} -> {} ({})",
            self.session_id,
            self.stage,
            Stage::Failed,
            error
        );
        SessionFailure {
            session_id: self.session_id,
            stage: self.stage,
            error,
        }
    }
}

/// Runs BB84 sessions against injected collaborators.
pub struct ProtocolOrchestrator {
    sources: SessionSources,
    channel: Arc<dyn QuantumChannel>,
    config: SessionConfig,
}

impl ProtocolOrchestrator {
    pub fn new(
        sources: SessionSources,
        channel: Arc<dyn QuantumChannel>,
        config: SessionConfig,
    ) -> Self {
        Self {
            sources,
            channel,
            config,
        }
    }

    pub fn config(&self) -> &SessionConfig {
        &self.config
    }

    /// Run one session to `DONE` or `FAILED`.
    #[instrument(skip(self), fields(n_bits = self.config.n_bits, channel = %self.channel.name()))]
    pub async fn run(&self) -> Result<SessionResult, SessionFailure> {
        let mut tracker = Tracker::start();
        match self.execute(&mut tracker).await {
            Ok(result) => {
                info!(
                    "Session {} done: {} sifted bits, QBER {}",
                    result.session_id(),
                    result.sender_key().len(),
                    result.qber()
                );
                Ok(result)
            }
            Err(error) => Err(tracker.fail(error)),
        }
    }

    /// Run `count` independent sessions concurrently.
    ///
    /// Results are returned in launch order; each session owns its streams.
    pub async fn run_many(&self, count: usize) -> Vec<Result<SessionResult, SessionFailure>> {
        futures::future::join_all((0..count).map(|_| self.run())).await
    }

    async fn execute(&self, tracker: &mut Tracker) -> ProtocolResult<SessionResult> {
        let n = self.config.n_bits;
        if n == 0 {
            return Err(ProtocolError::InvalidRequest(
                "n_bits must be positive".into(),
            ));
        }
        let started_at = Utc::now();

        tracker.advance(Stage::GenerateBits);
        let draws = async {
            tokio::try_join!(
                draw(self.sources.sender_bits.as_ref(), n),
                draw(self.sources.sender_bases.as_ref(), n),
                draw(self.sources.receiver_bases.as_ref(), n),
            )
        };
        let (sender_bits, sender_basis_bits, receiver_basis_bits) =
            with_deadline(self.config.draw_timeout, "random bit draws", draws).await?;

        tracker.advance(Stage::GenerateBases);
        let sender_bases: Vec<Basis> = sender_basis_bits.into_iter().map(Basis::from_bit).collect();
        let receiver_bases: Vec<Basis> =
            receiver_basis_bits.into_iter().map(Basis::from_bit).collect();

        tracker.advance(Stage::Encode);
        let requests: Vec<MeasurementRequest> = sender_bits
            .iter()
            .zip(&sender_bases)
            .zip(&receiver_bases)
            .map(|((bit, prep), meas)| MeasurementRequest::new(codec::encode(*bit, *prep), *meas))
            .collect();

        tracker.advance(Stage::TransmitMeasure);
        let transmit = async {
            self.channel
                .transmit(&requests)
                .await
                .map_err(ProtocolError::from)
        };
        let transmission =
            with_deadline(self.config.transmit_timeout, "transmission", transmit).await?;
        if transmission.outcomes.len() != n {
            return Err(ProtocolError::JobFailed(format!(
                "channel returned {} outcomes for {} qubits",
                transmission.outcomes.len(),
                n
            )));
        }

        tracker.advance(Stage::Sift);
        let mask = SiftMask::new(&sender_bases, &receiver_bases)?;
        let sender_key = mask.apply(&sender_bits)?;
        let receiver_key = mask.apply(&transmission.outcomes)?;

        tracker.advance(Stage::Analyze);
        let analysis = analyze(&sender_key, &receiver_key, n)?;

        tracker.advance(Stage::Done);
        Ok(SessionResult {
            session_id: tracker.session_id,
            started_at,
            finished_at: Utc::now(),
            channel: self.channel.name().to_string(),
            job_id: transmission.job_id,
            sender_bits,
            sender_bases,
            receiver_bases,
            receiver_outcomes: transmission.outcomes,
            mask,
            sender_key,
            receiver_key,
            analysis,
        })
    }
}

/// Draw exactly `n` bits from `source`.
async fn draw(source: &dyn RandomBitSource, n: usize) -> ProtocolResult<Vec<Bit>> {
    let bits = source
        .next_bits(n)
        .await
        .map_err(ProtocolError::from_source)?;
    if bits.len() != n {
        return Err(ProtocolError::SourceUnavailable(format!(
            "{} returned {} bits for a draw of {}",
            source.name(),
            bits.len(),
            n
        )));
    }
    Ok(bits)
}

async fn with_deadline<T>(
    deadline: Option<Duration>,
    what: &str,
    fut: impl Future<Output = ProtocolResult<T>>,
) -> ProtocolResult<T> {
    match deadline {
        Some(limit) => tokio::time::timeout(limit, fut)
            .await
            .map_err(|_| ProtocolError::Timeout(format!("{what} exceeded {limit:?}")))?,
        None => fut.await,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use qkd_adapter_sim::{SampledChannel, SeededBitSource};

    fn orchestrator(n_bits: usize) -> ProtocolOrchestrator {
        ProtocolOrchestrator::new(
            SessionSources::shared(Arc::new(SeededBitSource::new(84))),
            Arc::new(SampledChannel::with_seed(84)),
            SessionConfig::new(n_bits),
        )
    }

    #[tokio::test]
    async fn test_noiseless_session_has_matching_keys() {
        let result = orchestrator(64).run().await.unwrap();

        assert_eq!(result.n_bits(), 64);
        assert_eq!(result.sender_key(), result.receiver_key());
        assert_eq!(result.mismatches(), 0);
        assert_eq!(result.sender_key().len(), result.mask().retained());
        assert!(result.job_id().as_str().starts_with("sampled-"));
    }

    #[tokio::test]
    async fn test_zero_bits_rejected_at_init() {
        let failure = orchestrator(0).run().await.unwrap_err();
        assert_eq!(failure.stage, Stage::Init);
        assert_eq!(failure.kind(), crate::error::FailureKind::InvalidRequest);
    }

    #[tokio::test]
    async fn test_sessions_get_distinct_ids() {
        let orchestrator = orchestrator(8);
        let a = orchestrator.run().await.unwrap();
        let b = orchestrator.run().await.unwrap();
        assert_ne!(a.session_id(), b.session_id());
    }
}
